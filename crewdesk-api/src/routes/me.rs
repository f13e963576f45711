/// Current caller
///
/// ```text
/// GET /v1/me
/// Authorization: Bearer <jwt_token>
/// ```
///
/// Returns the caller's user record as loaded by the auth middleware, which
/// has already refused unknown and deactivated accounts.

use axum::{Extension, Json};
use crewdesk_shared::models::user::User;

pub async fn current_user(Extension(user): Extension<User>) -> Json<User> {
    Json(user)
}
