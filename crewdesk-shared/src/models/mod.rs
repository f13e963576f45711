/// Database models for crewdesk
///
/// # Models
///
/// - `user`: Accounts with a global role and an account-level active flag
/// - `project`: Projects with their coupled status/stage fields
/// - `project_member`: User-project pivot with a per-project active flag
///
/// Lifecycle rules for projects are enforced by [`crate::lifecycle`], not here;
/// these types only map rows.

pub mod project;
pub mod project_member;
pub mod user;
