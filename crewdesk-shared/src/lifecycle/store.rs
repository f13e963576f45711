/// Project persistence seam
///
/// The lifecycle manager only needs to read a project, write it back, insert
/// new ones and answer two lookups (name uniqueness and a user's role).
/// [`PgProjectStore`] implements that against PostgreSQL; the in-memory
/// implementation lives in [`super::memory`].

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use super::transition::LifecycleState;
use crate::models::project::{Project, ProjectFields};
use crate::models::user::{User, UserRole};

/// Name of the unique constraint on `projects.name`
const PROJECT_NAME_CONSTRAINT: &str = "projects_name_key";

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Another project already uses this name
    #[error("Project name already taken: {0}")]
    DuplicateName(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Persistence operations used by the lifecycle manager
#[async_trait]
pub trait ProjectStore: Send + Sync {
    async fn find(&self, id: Uuid) -> Result<Option<Project>, StoreError>;

    async fn insert(&self, fields: &ProjectFields, state: LifecycleState) -> Result<Project, StoreError>;

    /// Writes the project back; None if it no longer exists
    async fn save(&self, project: &Project) -> Result<Option<Project>, StoreError>;

    /// Whether a project other than `exclude_id` uses `name`
    async fn name_taken(&self, name: &str, exclude_id: Option<Uuid>) -> Result<bool, StoreError>;

    /// Role of a user, None if the user doesn't exist
    async fn user_role(&self, user_id: Uuid) -> Result<Option<UserRole>, StoreError>;
}

/// PostgreSQL-backed store
#[derive(Debug, Clone)]
pub struct PgProjectStore {
    pool: PgPool,
}

impl PgProjectStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

/// Turns a unique violation on the project name into `DuplicateName`
///
/// The manager checks names up front; this covers two requests racing for
/// the same name.
fn map_write_error(err: sqlx::Error, name: &str) -> StoreError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.constraint() == Some(PROJECT_NAME_CONSTRAINT) {
            return StoreError::DuplicateName(name.to_string());
        }
    }
    StoreError::Database(err)
}

#[async_trait]
impl ProjectStore for PgProjectStore {
    async fn find(&self, id: Uuid) -> Result<Option<Project>, StoreError> {
        Ok(Project::find_by_id(&self.pool, id).await?)
    }

    async fn insert(&self, fields: &ProjectFields, state: LifecycleState) -> Result<Project, StoreError> {
        Project::insert(&self.pool, fields, state.status, state.stage)
            .await
            .map_err(|e| map_write_error(e, &fields.name))
    }

    async fn save(&self, project: &Project) -> Result<Option<Project>, StoreError> {
        Project::save(&self.pool, project)
            .await
            .map_err(|e| map_write_error(e, &project.name))
    }

    async fn name_taken(&self, name: &str, exclude_id: Option<Uuid>) -> Result<bool, StoreError> {
        Ok(Project::name_taken(&self.pool, name, exclude_id).await?)
    }

    async fn user_role(&self, user_id: Uuid) -> Result<Option<UserRole>, StoreError> {
        Ok(User::find_by_id(&self.pool, user_id).await?.map(|u| u.role))
    }
}
