/// Lifecycle operations on projects
///
/// [`LifecycleManager`] is what request handlers call. Each operation is a
/// single read-modify-write: load the project, validate, compute the next
/// state with [`next_state`], persist.
///
/// Two concurrent writes to the same project are not coordinated; the last
/// save wins.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::error::{FieldError, LifecycleError};
use super::store::ProjectStore;
use super::transition::{next_state, Change, LifecycleState};
use crate::models::project::{Project, ProjectFields, ProjectStage, ProjectStatus};
use crate::models::user::UserRole;

/// Maximum project name length, matching the column width
pub const MAX_NAME_LEN: usize = 255;

/// Full-record edit: every plain field plus both lifecycle fields
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectUpdate {
    #[serde(flatten)]
    pub fields: ProjectFields,
    pub status: ProjectStatus,
    pub stage: ProjectStage,
}

pub struct LifecycleManager<S> {
    store: S,
}

impl<S: ProjectStore> LifecycleManager<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Creates a project in the initial state (active, Pendiente)
    pub async fn create(&self, fields: ProjectFields) -> Result<Project, LifecycleError> {
        let fields = self.validate_fields(fields, None).await?;
        let project = self.store.insert(&fields, LifecycleState::initial()).await?;

        info!(
            project_id = %project.id,
            name = %project.name,
            leader_id = ?project.leader_id,
            "Project created"
        );
        Ok(project)
    }

    pub async fn get(&self, id: Uuid) -> Result<Project, LifecycleError> {
        self.store.find(id).await?.ok_or(LifecycleError::NotFound(id))
    }

    /// Changes the status, moving the stage along with it
    pub async fn set_status(&self, id: Uuid, status: ProjectStatus) -> Result<Project, LifecycleError> {
        let project = self.get(id).await?;
        self.transition(project, Change::Status(status), None).await
    }

    /// Changes the stage, moving the status along with it
    ///
    /// # Errors
    ///
    /// `TerminalState` if the project is finished, whatever the requested stage.
    pub async fn set_stage(&self, id: Uuid, stage: ProjectStage) -> Result<Project, LifecycleError> {
        let project = self.get(id).await?;
        self.transition(project, Change::Stage(stage), None).await
    }

    /// Applies a full-record edit
    ///
    /// Plain fields are validated first (name, dates, leader); then status and
    /// stage are reconciled against each other and the stored stage.
    pub async fn update(&self, id: Uuid, update: ProjectUpdate) -> Result<Project, LifecycleError> {
        let project = self.get(id).await?;
        let fields = self.validate_fields(update.fields, Some(id)).await?;
        let change = Change::Replace {
            status: update.status,
            stage: update.stage,
        };
        self.transition(project, change, Some(fields)).await
    }

    async fn transition(
        &self,
        mut project: Project,
        change: Change,
        fields: Option<ProjectFields>,
    ) -> Result<Project, LifecycleError> {
        let current = LifecycleState::of(&project);
        let next = next_state(current, change).map_err(|e| {
            warn!(project_id = %project.id, ?change, "Lifecycle change refused: {}", e);
            LifecycleError::from_transition(project.id, e)
        })?;

        let before = project.clone();
        project.status = next.status;
        project.stage = next.stage;
        if let Some(fields) = fields {
            project.apply_fields(fields);
        }

        if project == before {
            debug!(project_id = %project.id, ?change, "Lifecycle change is a no-op");
            return Ok(project);
        }

        let saved = self
            .store
            .save(&project)
            .await?
            .ok_or(LifecycleError::NotFound(project.id))?;

        info!(
            project_id = %saved.id,
            from_status = %current.status,
            from_stage = %current.stage,
            to_status = %saved.status,
            to_stage = %saved.stage,
            "Project lifecycle updated"
        );
        Ok(saved)
    }

    /// Normalizes and checks the plain fields
    ///
    /// Collects every problem before returning so callers can show them all.
    async fn validate_fields(
        &self,
        mut fields: ProjectFields,
        exclude_id: Option<Uuid>,
    ) -> Result<ProjectFields, LifecycleError> {
        let mut errors = Vec::new();

        fields.name = fields.name.trim().to_string();
        fields.description = fields
            .description
            .map(|d| d.trim().to_string())
            .filter(|d| !d.is_empty());

        if fields.name.is_empty() {
            errors.push(FieldError::new("name", "Name is required"));
        } else if fields.name.chars().count() > MAX_NAME_LEN {
            errors.push(FieldError::new(
                "name",
                format!("Name must be at most {} characters", MAX_NAME_LEN),
            ));
        } else if self.store.name_taken(&fields.name, exclude_id).await? {
            errors.push(FieldError::new(
                "name",
                format!("A project named '{}' already exists", fields.name),
            ));
        }

        if let Some(message) = date_order_error(fields.start_date, fields.end_date) {
            errors.push(FieldError::new("end_date", message));
        }

        if let Some(leader_id) = fields.leader_id {
            match self.store.user_role(leader_id).await? {
                Some(UserRole::Leader) => {}
                Some(role) => errors.push(FieldError::new(
                    "leader_id",
                    format!("User {} has role '{}', expected 'leader'", leader_id, role),
                )),
                None => errors.push(FieldError::new(
                    "leader_id",
                    format!("User {} does not exist", leader_id),
                )),
            }
        }

        if errors.is_empty() {
            Ok(fields)
        } else {
            debug!(errors = errors.len(), "Project fields rejected");
            Err(LifecycleError::Validation(errors))
        }
    }
}

fn date_order_error(start: Option<NaiveDate>, end: Option<NaiveDate>) -> Option<&'static str> {
    match (start, end) {
        (Some(start), Some(end)) if end < start => Some("End date must not be before start date"),
        _ => None,
    }
}
