/// Project team endpoints
///
/// # Endpoints
///
/// - `GET   /v1/projects/:id/members` (admin, coordinator, leader)
/// - `POST  /v1/projects/:id/members` (leader): assign a user
/// - `PATCH /v1/projects/:id/members/:user_id` (leader): toggle the member's
///   per-project flag
///
/// The per-project flag is independent of the account-level `is_active`.

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    routes::projects::{PROJECT_EDITORS, PROJECT_READERS},
};
use axum::{
    extract::{Path, State},
    Extension, Json,
};
use crewdesk_shared::{
    auth::{authorization::require_roles, middleware::AuthContext},
    models::{
        project_member::{ProjectMember, TeamMember},
        user::User,
    },
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Deserialize)]
pub struct AssignMemberRequest {
    pub user_id: Uuid,
}

#[derive(Debug, Deserialize)]
pub struct SetMemberActiveRequest {
    pub is_active_in_project: bool,
}

#[derive(Debug, Serialize)]
pub struct ListMembersResponse {
    pub members: Vec<TeamMember>,
}

pub async fn list_members(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(project_id): Path<Uuid>,
) -> ApiResult<Json<ListMembersResponse>> {
    require_roles(&auth, PROJECT_READERS)?;
    state.projects.get(project_id).await?;

    let members = ProjectMember::list_team(&state.db, project_id).await?;
    Ok(Json(ListMembersResponse { members }))
}

/// Assign a user to a project
///
/// Re-assigning an existing member reactivates them.
///
/// # Errors
///
/// - `404 Not Found`: unknown project or user
/// - `422 Unprocessable Entity`: the user's account is inactive
pub async fn assign_member(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(project_id): Path<Uuid>,
    Json(req): Json<AssignMemberRequest>,
) -> ApiResult<Json<ProjectMember>> {
    require_roles(&auth, PROJECT_EDITORS)?;
    state.projects.get(project_id).await?;

    let user = User::find_by_id(&state.db, req.user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    if !user.is_active {
        return Err(ApiError::field(
            "user_id",
            format!("User {} is inactive and cannot join a project", user.id),
        ));
    }

    let member = ProjectMember::assign(&state.db, project_id, user.id).await?;

    tracing::info!(
        project_id = %project_id,
        user_id = %user.id,
        assigned_by = %auth.user_id,
        "Member assigned to project"
    );
    Ok(Json(member))
}

pub async fn set_member_active(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path((project_id, user_id)): Path<(Uuid, Uuid)>,
    Json(req): Json<SetMemberActiveRequest>,
) -> ApiResult<Json<ProjectMember>> {
    require_roles(&auth, PROJECT_EDITORS)?;

    let member = ProjectMember::set_active(&state.db, project_id, user_id, req.is_active_in_project)
        .await?
        .ok_or_else(|| ApiError::NotFound("Project member not found".to_string()))?;

    tracing::info!(
        project_id = %project_id,
        user_id = %user_id,
        is_active_in_project = member.is_active_in_project,
        "Project membership updated"
    );
    Ok(Json(member))
}
