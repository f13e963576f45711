/// Project endpoints
///
/// Every lifecycle change goes through [`LifecycleManager`], so the
/// status/stage coupling holds whichever endpoint is used.
///
/// # Endpoints
///
/// - `POST  /v1/projects` (leader, coordinator)
/// - `GET   /v1/projects` (admin, coordinator, leader)
/// - `GET   /v1/projects/summary` (admin, coordinator, leader)
/// - `GET   /v1/projects/mine` (developer, leader)
/// - `GET   /v1/projects/:id` (admin, coordinator, leader)
/// - `PUT   /v1/projects/:id` (leader)
/// - `PATCH /v1/projects/:id/status` (leader)
/// - `PATCH /v1/projects/:id/stage` (leader)
///
/// Superadmins may call all of them.
///
/// [`LifecycleManager`]: crewdesk_shared::lifecycle::LifecycleManager

use crate::{
    app::AppState,
    error::{ApiError, ApiResult, ValidationErrorDetail},
    routes::Pagination,
};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use chrono::NaiveDate;
use crewdesk_shared::{
    auth::{authorization::require_roles, middleware::AuthContext},
    lifecycle::ProjectUpdate,
    models::{
        project::{Project, ProjectFields, ProjectStage, ProjectStatus},
        user::UserRole,
    },
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

pub(crate) const PROJECT_READERS: &[UserRole] = &[UserRole::Admin, UserRole::Coordinator, UserRole::Leader];
const PROJECT_CREATORS: &[UserRole] = &[UserRole::Leader, UserRole::Coordinator];
pub(crate) const PROJECT_EDITORS: &[UserRole] = &[UserRole::Leader];
const TEAM_DASHBOARD: &[UserRole] = &[UserRole::Developer, UserRole::Leader];

/// Create project request
#[derive(Debug, Deserialize, Validate)]
pub struct CreateProjectRequest {
    #[validate(length(max = 255, message = "Name must be at most 255 characters"))]
    pub name: String,

    #[validate(length(max = 5000, message = "Description must be at most 5000 characters"))]
    pub description: Option<String>,

    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,

    /// Defaults to the caller when the caller is a leader
    pub leader_id: Option<Uuid>,
}

/// Full-record edit
///
/// `status` and `stage` are plain strings so unknown values come back as
/// field errors next to any other validation problem.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateProjectRequest {
    #[validate(length(max = 255, message = "Name must be at most 255 characters"))]
    pub name: String,

    #[validate(length(max = 5000, message = "Description must be at most 5000 characters"))]
    pub description: Option<String>,

    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub leader_id: Option<Uuid>,
    pub status: String,
    pub stage: String,
}

#[derive(Debug, Deserialize)]
pub struct SetStatusRequest {
    pub status: String,
}

#[derive(Debug, Deserialize)]
pub struct SetStageRequest {
    pub stage: String,
}

#[derive(Debug, Serialize)]
pub struct ListProjectsResponse {
    pub projects: Vec<Project>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusCount {
    pub status: ProjectStatus,
    pub count: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StageCount {
    pub stage: ProjectStage,
    pub count: i64,
}

/// Dashboard counts; every status and stage is listed, zero or not
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProjectSummary {
    pub total: i64,
    pub by_status: Vec<StatusCount>,
    pub by_stage: Vec<StageCount>,
}

impl ProjectSummary {
    pub fn from_counts(statuses: &[(ProjectStatus, i64)], stages: &[(ProjectStage, i64)]) -> Self {
        let count_of = |status: ProjectStatus| {
            statuses
                .iter()
                .find(|(s, _)| *s == status)
                .map_or(0, |(_, n)| *n)
        };
        let by_status: Vec<StatusCount> = ProjectStatus::ALL
            .into_iter()
            .map(|status| StatusCount {
                status,
                count: count_of(status),
            })
            .collect();

        let by_stage = ProjectStage::ORDER
            .into_iter()
            .map(|stage| StageCount {
                stage,
                count: stages.iter().find(|(s, _)| *s == stage).map_or(0, |(_, n)| *n),
            })
            .collect();

        Self {
            total: by_status.iter().map(|c| c.count).sum(),
            by_status,
            by_stage,
        }
    }
}

fn parse_status(raw: &str) -> Result<ProjectStatus, ValidationErrorDetail> {
    raw.trim()
        .parse()
        .map_err(|message: String| ValidationErrorDetail::new("status", message))
}

fn parse_stage(raw: &str) -> Result<ProjectStage, ValidationErrorDetail> {
    raw.trim()
        .parse()
        .map_err(|message: String| ValidationErrorDetail::new("stage", message))
}

impl UpdateProjectRequest {
    /// Validates the body and resolves status and stage, reporting every
    /// problem at once
    fn into_update(self) -> ApiResult<ProjectUpdate> {
        let mut errors = match self.validate() {
            Ok(()) => Vec::new(),
            Err(e) => match ApiError::from(e) {
                ApiError::ValidationError(details) => details,
                other => return Err(other),
            },
        };

        let status = parse_status(&self.status).map_err(|e| errors.push(e)).ok();
        let stage = parse_stage(&self.stage).map_err(|e| errors.push(e)).ok();

        match (status, stage) {
            (Some(status), Some(stage)) if errors.is_empty() => Ok(ProjectUpdate {
                fields: ProjectFields {
                    name: self.name,
                    description: self.description,
                    start_date: self.start_date,
                    end_date: self.end_date,
                    leader_id: self.leader_id,
                },
                status,
                stage,
            }),
            _ => Err(ApiError::ValidationError(errors)),
        }
    }
}

/// Create a project
///
/// New projects start active in `Pendiente`.
///
/// ```text
/// POST /v1/projects
/// Authorization: Bearer <jwt_token>
///
/// { "name": "Intranet", "start_date": "2025-03-01", "end_date": "2025-06-30" }
/// ```
///
/// # Errors
///
/// - `403 Forbidden`: caller is not a leader or coordinator
/// - `422 Unprocessable Entity`: empty or duplicate name, end before start,
///   `leader_id` not a leader
pub async fn create_project(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(req): Json<CreateProjectRequest>,
) -> ApiResult<(StatusCode, Json<Project>)> {
    require_roles(&auth, PROJECT_CREATORS)?;
    req.validate()?;

    let leader_id = match (req.leader_id, auth.role) {
        (None, UserRole::Leader) => Some(auth.user_id),
        (leader_id, _) => leader_id,
    };

    let project = state
        .projects
        .create(ProjectFields {
            name: req.name,
            description: req.description,
            start_date: req.start_date,
            end_date: req.end_date,
            leader_id,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(project)))
}

/// List projects, newest first (`?limit=&offset=`)
pub async fn list_projects(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Query(page): Query<Pagination>,
) -> ApiResult<Json<ListProjectsResponse>> {
    require_roles(&auth, PROJECT_READERS)?;

    let projects = Project::list(&state.db, page.limit(), page.offset()).await?;
    Ok(Json(ListProjectsResponse { projects }))
}

/// Project counts by status and by stage
///
/// ```json
/// {
///   "total": 3,
///   "by_status": [{ "status": "active", "count": 2 }, ...],
///   "by_stage": [{ "stage": "Pendiente", "count": 1 }, ...]
/// }
/// ```
pub async fn project_summary(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<ProjectSummary>> {
    require_roles(&auth, PROJECT_READERS)?;

    let statuses = Project::count_by_status(&state.db).await?;
    let stages = Project::count_by_stage(&state.db).await?;

    Ok(Json(ProjectSummary::from_counts(&statuses, &stages)))
}

/// Projects in which the caller is an active team member
pub async fn my_projects(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<ListProjectsResponse>> {
    require_roles(&auth, TEAM_DASHBOARD)?;

    let projects = Project::list_for_member(&state.db, auth.user_id).await?;
    Ok(Json(ListProjectsResponse { projects }))
}

pub async fn get_project(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Project>> {
    require_roles(&auth, PROJECT_READERS)?;

    Ok(Json(state.projects.get(id).await?))
}

/// Full-record edit
///
/// Status and stage are reconciled with each other: an inactive or finished
/// project always ends up in `Cierre`, an active one never does.
///
/// # Errors
///
/// - `404 Not Found`: unknown project
/// - `422 Unprocessable Entity`: any field problem, including unknown
///   status or stage values
pub async fn update_project(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateProjectRequest>,
) -> ApiResult<Json<Project>> {
    require_roles(&auth, PROJECT_EDITORS)?;
    let update = req.into_update()?;

    Ok(Json(state.projects.update(id, update).await?))
}

/// Change the status; the stage follows
///
/// `inactive` and `finished` close the project (`Cierre`); `active`
/// reopens a closed project in `Seguimiento`.
pub async fn set_project_status(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
    Json(req): Json<SetStatusRequest>,
) -> ApiResult<Json<Project>> {
    require_roles(&auth, PROJECT_EDITORS)?;
    let status = parse_status(&req.status).map_err(|e| ApiError::ValidationError(vec![e]))?;

    Ok(Json(state.projects.set_status(id, status).await?))
}

/// Change the stage; the status follows
///
/// # Errors
///
/// - `409 Conflict`: the project is finished
pub async fn set_project_stage(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
    Json(req): Json<SetStageRequest>,
) -> ApiResult<Json<Project>> {
    require_roles(&auth, PROJECT_EDITORS)?;
    let stage = parse_stage(&req.stage).map_err(|e| ApiError::ValidationError(vec![e]))?;

    Ok(Json(state.projects.set_stage(id, stage).await?))
}
