/// Project model and database operations
///
/// A project carries two coupled lifecycle fields, `status` and `stage`.
/// The functions here persist whatever they are given; callers go through
/// [`crate::lifecycle::LifecycleManager`] so the coupling always holds.
///
/// # Schema
///
/// ```sql
/// CREATE TYPE project_status AS ENUM ('active', 'inactive', 'finished');
/// CREATE TYPE project_stage AS ENUM (
///     'Pendiente', 'Inicio', 'Planeacion', 'Ejecucion', 'Seguimiento', 'Cierre'
/// );
///
/// CREATE TABLE projects (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     name VARCHAR(255) NOT NULL,
///     description TEXT,
///     status project_status NOT NULL DEFAULT 'active',
///     stage project_stage NOT NULL DEFAULT 'Pendiente',
///     start_date DATE,
///     end_date DATE,
///     leader_id UUID REFERENCES users(id) ON DELETE SET NULL,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     CONSTRAINT projects_name_key UNIQUE (name),
///     CONSTRAINT projects_dates_ordered CHECK (
///         start_date IS NULL OR end_date IS NULL OR end_date >= start_date
///     ),
///     CONSTRAINT projects_stage_status_coupled CHECK (
///         (stage = 'Cierre') = (status IN ('inactive', 'finished'))
///     )
/// );
/// ```
///
/// `PgProjectStore` maps violations of `projects_name_key` to a duplicate
/// name error; the two checks back the lifecycle rules in the database.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Coarse lifecycle flag of a project
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "project_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ProjectStatus {
    #[default]
    Active,
    Inactive,
    Finished,
}

impl ProjectStatus {
    pub const ALL: [ProjectStatus; 3] = [
        ProjectStatus::Active,
        ProjectStatus::Inactive,
        ProjectStatus::Finished,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ProjectStatus::Active => "active",
            ProjectStatus::Inactive => "inactive",
            ProjectStatus::Finished => "finished",
        }
    }
}

impl fmt::Display for ProjectStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProjectStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ProjectStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| {
                format!(
                    "Unknown status '{}', expected one of: active, inactive, finished",
                    s
                )
            })
    }
}

/// Ordered project phase
///
/// `Cierre` (closure) is the terminal stage.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, sqlx::Type,
)]
#[sqlx(type_name = "project_stage")]
pub enum ProjectStage {
    #[default]
    Pendiente,
    Inicio,
    Planeacion,
    Ejecucion,
    Seguimiento,
    Cierre,
}

impl ProjectStage {
    /// Every stage in lifecycle order
    pub const ORDER: [ProjectStage; 6] = [
        ProjectStage::Pendiente,
        ProjectStage::Inicio,
        ProjectStage::Planeacion,
        ProjectStage::Ejecucion,
        ProjectStage::Seguimiento,
        ProjectStage::Cierre,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ProjectStage::Pendiente => "Pendiente",
            ProjectStage::Inicio => "Inicio",
            ProjectStage::Planeacion => "Planeacion",
            ProjectStage::Ejecucion => "Ejecucion",
            ProjectStage::Seguimiento => "Seguimiento",
            ProjectStage::Cierre => "Cierre",
        }
    }

    pub fn is_closure(&self) -> bool {
        matches!(self, ProjectStage::Cierre)
    }
}

impl fmt::Display for ProjectStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProjectStage {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ProjectStage::ORDER
            .into_iter()
            .find(|stage| stage.as_str() == s)
            .ok_or_else(|| {
                format!(
                    "Unknown stage '{}', expected one of: Pendiente, Inicio, Planeacion, Ejecucion, Seguimiento, Cierre",
                    s
                )
            })
    }
}

/// Project row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Project {
    pub id: Uuid,

    /// Unique across all projects
    pub name: String,

    pub description: Option<String>,
    pub status: ProjectStatus,
    pub stage: ProjectStage,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,

    /// User with the `leader` role responsible for the project
    pub leader_id: Option<Uuid>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// The fields of a project that are not part of the lifecycle
///
/// Shared by creation and full-record edits.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProjectFields {
    pub name: String,
    pub description: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub leader_id: Option<Uuid>,
}

impl Project {
    /// Overwrites the non-lifecycle fields from `fields`
    pub fn apply_fields(&mut self, fields: ProjectFields) {
        self.name = fields.name;
        self.description = fields.description;
        self.start_date = fields.start_date;
        self.end_date = fields.end_date;
        self.leader_id = fields.leader_id;
    }

    /// Inserts a new project with the given lifecycle state
    pub async fn insert(
        pool: &PgPool,
        fields: &ProjectFields,
        status: ProjectStatus,
        stage: ProjectStage,
    ) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Project>(
            r#"
            INSERT INTO projects (name, description, status, stage, start_date, end_date, leader_id)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id, name, description, status, stage, start_date, end_date,
                      leader_id, created_at, updated_at
            "#,
        )
        .bind(&fields.name)
        .bind(&fields.description)
        .bind(status)
        .bind(stage)
        .bind(fields.start_date)
        .bind(fields.end_date)
        .bind(fields.leader_id)
        .fetch_one(pool)
        .await
    }

    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Project>(
            r#"
            SELECT id, name, description, status, stage, start_date, end_date,
                   leader_id, created_at, updated_at
            FROM projects
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await
    }

    /// Writes every mutable column of `project` back to its row
    ///
    /// Returns None if the row no longer exists.
    pub async fn save(pool: &PgPool, project: &Project) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Project>(
            r#"
            UPDATE projects
            SET name = $2,
                description = $3,
                status = $4,
                stage = $5,
                start_date = $6,
                end_date = $7,
                leader_id = $8,
                updated_at = NOW()
            WHERE id = $1
            RETURNING id, name, description, status, stage, start_date, end_date,
                      leader_id, created_at, updated_at
            "#,
        )
        .bind(project.id)
        .bind(&project.name)
        .bind(&project.description)
        .bind(project.status)
        .bind(project.stage)
        .bind(project.start_date)
        .bind(project.end_date)
        .bind(project.leader_id)
        .fetch_optional(pool)
        .await
    }

    /// Checks whether another project already uses `name`
    pub async fn name_taken(
        pool: &PgPool,
        name: &str,
        exclude_id: Option<Uuid>,
    ) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT EXISTS (SELECT 1 FROM projects WHERE name = $1 AND ($2::uuid IS NULL OR id <> $2))",
        )
        .bind(name)
        .bind(exclude_id)
        .fetch_one(pool)
        .await
    }

    /// Lists projects, newest first
    pub async fn list(pool: &PgPool, limit: i64, offset: i64) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Project>(
            r#"
            SELECT id, name, description, status, stage, start_date, end_date,
                   leader_id, created_at, updated_at
            FROM projects
            ORDER BY created_at DESC
            LIMIT $1 OFFSET $2
            "#,
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(pool)
        .await
    }

    /// Lists projects where `user_id` is an active team member
    pub async fn list_for_member(pool: &PgPool, user_id: Uuid) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Project>(
            r#"
            SELECT p.id, p.name, p.description, p.status, p.stage, p.start_date, p.end_date,
                   p.leader_id, p.created_at, p.updated_at
            FROM projects p
            JOIN project_members pm ON pm.project_id = p.id
            WHERE pm.user_id = $1 AND pm.is_active_in_project
            ORDER BY p.name ASC
            "#,
        )
        .bind(user_id)
        .fetch_all(pool)
        .await
    }

    /// Project counts per status
    pub async fn count_by_status(pool: &PgPool) -> Result<Vec<(ProjectStatus, i64)>, sqlx::Error> {
        sqlx::query_as("SELECT status, COUNT(*) FROM projects GROUP BY status ORDER BY status")
            .fetch_all(pool)
            .await
    }

    /// Project counts per stage, in stage order
    pub async fn count_by_stage(pool: &PgPool) -> Result<Vec<(ProjectStage, i64)>, sqlx::Error> {
        sqlx::query_as("SELECT stage, COUNT(*) FROM projects GROUP BY stage ORDER BY stage")
            .fetch_all(pool)
            .await
    }

    /// Deletes a project (test cleanup only; the API never deletes projects)
    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM projects WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
