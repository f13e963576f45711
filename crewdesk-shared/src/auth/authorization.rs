/// Role-based access control
///
/// Every protected route is guarded by a [`PolicyChain`]. Policies are asked
/// in order; the first one that returns [`Decision::Allow`] or
/// [`Decision::Deny`] settles the request. If every policy abstains the
/// request is denied.
///
/// The chain built by [`PolicyChain::for_roles`] is:
///
/// 1. [`ActiveAccount`]: deny deactivated accounts
/// 2. [`SuperadminOverride`]: allow superadmins
/// 3. [`RoleAllowList`]: allow the listed roles, deny the rest
///
/// # Example
///
/// ```
/// use crewdesk_shared::auth::authorization::require_roles;
/// use crewdesk_shared::auth::middleware::AuthContext;
/// use crewdesk_shared::models::user::UserRole;
/// use uuid::Uuid;
///
/// let leader = AuthContext::new(Uuid::new_v4(), UserRole::Leader, true);
/// assert!(require_roles(&leader, &[UserRole::Leader]).is_ok());
/// assert!(require_roles(&leader, &[UserRole::Admin]).is_err());
///
/// let root = AuthContext::new(Uuid::new_v4(), UserRole::Superadmin, true);
/// assert!(require_roles(&root, &[UserRole::Admin]).is_ok());
/// ```

use super::middleware::AuthContext;
use crate::models::user::UserRole;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthzError {
    #[error("Account is inactive")]
    InactiveAccount,

    #[error("Insufficient permissions: role '{actual}' is not allowed here")]
    InsufficientRole { allowed: Vec<UserRole>, actual: UserRole },

    #[error("Access denied by {0}")]
    Denied(&'static str),

    /// No policy in the chain reached a decision
    #[error("Access denied")]
    NoDecision,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allow,
    Deny,
    Abstain,
}

/// A single access rule
pub trait AccessPolicy: Send + Sync {
    fn name(&self) -> &'static str;

    fn decide(&self, auth: &AuthContext) -> Result<Decision, AuthzError>;
}

/// Denies deactivated accounts, abstains otherwise
#[derive(Debug, Clone, Copy, Default)]
pub struct ActiveAccount;

impl AccessPolicy for ActiveAccount {
    fn name(&self) -> &'static str {
        "active_account"
    }

    fn decide(&self, auth: &AuthContext) -> Result<Decision, AuthzError> {
        if auth.is_active {
            Ok(Decision::Abstain)
        } else {
            Err(AuthzError::InactiveAccount)
        }
    }
}

/// Allows superadmins, abstains otherwise
#[derive(Debug, Clone, Copy, Default)]
pub struct SuperadminOverride;

impl AccessPolicy for SuperadminOverride {
    fn name(&self) -> &'static str {
        "superadmin_override"
    }

    fn decide(&self, auth: &AuthContext) -> Result<Decision, AuthzError> {
        Ok(if auth.is_superadmin() {
            Decision::Allow
        } else {
            Decision::Abstain
        })
    }
}

/// Allows the listed roles and denies every other role
#[derive(Debug, Clone)]
pub struct RoleAllowList {
    roles: Vec<UserRole>,
}

impl RoleAllowList {
    pub fn new(roles: &[UserRole]) -> Self {
        Self { roles: roles.to_vec() }
    }
}

impl AccessPolicy for RoleAllowList {
    fn name(&self) -> &'static str {
        "role_allow_list"
    }

    fn decide(&self, auth: &AuthContext) -> Result<Decision, AuthzError> {
        if self.roles.contains(&auth.role) {
            Ok(Decision::Allow)
        } else {
            Err(AuthzError::InsufficientRole {
                allowed: self.roles.clone(),
                actual: auth.role,
            })
        }
    }
}

/// Ordered list of policies; the first decision wins
#[derive(Default)]
pub struct PolicyChain {
    policies: Vec<Box<dyn AccessPolicy>>,
}

impl PolicyChain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, policy: impl AccessPolicy + 'static) -> Self {
        self.policies.push(Box::new(policy));
        self
    }

    /// The standard chain for a route open to `roles`
    pub fn for_roles(roles: &[UserRole]) -> Self {
        Self::new()
            .with(ActiveAccount)
            .with(SuperadminOverride)
            .with(RoleAllowList::new(roles))
    }

    pub fn authorize(&self, auth: &AuthContext) -> Result<(), AuthzError> {
        for policy in &self.policies {
            match policy.decide(auth) {
                Ok(Decision::Allow) => {
                    tracing::trace!(policy = policy.name(), user_id = %auth.user_id, "Access allowed");
                    return Ok(());
                }
                Ok(Decision::Deny) => {
                    tracing::debug!(policy = policy.name(), user_id = %auth.user_id, "Access denied");
                    return Err(AuthzError::Denied(policy.name()));
                }
                Ok(Decision::Abstain) => continue,
                Err(e) => {
                    tracing::debug!(
                        policy = policy.name(),
                        user_id = %auth.user_id,
                        role = %auth.role,
                        error = %e,
                        "Access denied"
                    );
                    return Err(e);
                }
            }
        }

        Err(AuthzError::NoDecision)
    }
}

/// Runs [`PolicyChain::for_roles`] against the caller
pub fn require_roles(auth: &AuthContext, roles: &[UserRole]) -> Result<(), AuthzError> {
    PolicyChain::for_roles(roles).authorize(auth)
}
