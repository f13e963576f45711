/// User endpoints
///
/// Accounts are provisioned by the identity provider; this service lists
/// them (e.g. to pick a project leader) and lets admins toggle them.
///
/// # Endpoints
///
/// - `GET   /v1/users?role=leader&limit=&offset=` (admin, coordinator, leader)
/// - `PATCH /v1/users/:id/active` (admin)

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    routes::Pagination,
};
use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use crewdesk_shared::{
    auth::{authorization::require_roles, middleware::AuthContext},
    models::user::{User, UserRole},
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

const USER_READERS: &[UserRole] = &[UserRole::Admin, UserRole::Coordinator, UserRole::Leader];
const USER_ADMINS: &[UserRole] = &[UserRole::Admin];

#[derive(Debug, Default, Deserialize)]
pub struct ListUsersQuery {
    pub role: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

impl ListUsersQuery {
    fn role(&self) -> ApiResult<Option<UserRole>> {
        self.role
            .as_deref()
            .map(|r| r.trim().to_ascii_lowercase().parse::<UserRole>())
            .transpose()
            .map_err(|message| ApiError::field("role", message))
    }

    fn page(&self) -> Pagination {
        Pagination {
            limit: self.limit,
            offset: self.offset,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct SetUserActiveRequest {
    pub is_active: bool,
}

#[derive(Debug, Serialize)]
pub struct ListUsersResponse {
    pub users: Vec<User>,
}

pub async fn list_users(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Query(query): Query<ListUsersQuery>,
) -> ApiResult<Json<ListUsersResponse>> {
    require_roles(&auth, USER_READERS)?;

    let role = query.role()?;
    let page = query.page();
    let users = User::list(&state.db, role, page.limit(), page.offset()).await?;

    Ok(Json(ListUsersResponse { users }))
}

/// Activate or deactivate an account
///
/// Deactivated users are refused on their next request. Admins can't
/// deactivate themselves.
pub async fn set_user_active(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
    Json(req): Json<SetUserActiveRequest>,
) -> ApiResult<Json<User>> {
    require_roles(&auth, USER_ADMINS)?;

    if id == auth.user_id && !req.is_active {
        return Err(ApiError::field("is_active", "You cannot deactivate your own account"));
    }

    let user = User::set_active(&state.db, id, req.is_active)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    tracing::info!(
        user_id = %user.id,
        is_active = user.is_active,
        changed_by = %auth.user_id,
        "User account updated"
    );
    Ok(Json(user))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_filter_parsing() {
        let query = ListUsersQuery {
            role: Some("Leader".to_string()),
            ..Default::default()
        };
        assert_eq!(query.role().unwrap(), Some(UserRole::Leader));

        assert_eq!(ListUsersQuery::default().role().unwrap(), None);

        let query = ListUsersQuery {
            role: Some("owner".to_string()),
            ..Default::default()
        };
        assert!(matches!(query.role(), Err(ApiError::ValidationError(_))));
    }

    #[test]
    fn test_page_from_query() {
        let query = ListUsersQuery {
            limit: Some(5),
            offset: Some(10),
            ..Default::default()
        };
        let page = query.page();
        assert_eq!((page.limit(), page.offset()), (5, 10));
    }
}
