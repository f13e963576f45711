/// Project team membership (user-project pivot)
///
/// Each row links a user to a project and carries `is_active_in_project`,
/// which is independent of the user's account-level `is_active` flag.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE project_members (
///     project_id UUID NOT NULL REFERENCES projects(id) ON DELETE CASCADE,
///     user_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     is_active_in_project BOOLEAN NOT NULL DEFAULT TRUE,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     PRIMARY KEY (project_id, user_id)
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use super::user::UserRole;

/// Pivot row
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct ProjectMember {
    pub project_id: Uuid,
    pub user_id: Uuid,
    pub is_active_in_project: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Team member as listed on a project page
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct TeamMember {
    pub user_id: Uuid,
    pub name: String,
    pub email: String,
    pub role: UserRole,

    /// Account-level flag from `users`
    pub is_active: bool,

    /// Per-project flag from the pivot
    pub is_active_in_project: bool,

    /// When the user joined the project
    pub joined_at: DateTime<Utc>,
}

impl ProjectMember {
    /// Adds a user to a project, or reactivates an existing pivot row
    pub async fn assign(pool: &PgPool, project_id: Uuid, user_id: Uuid) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, ProjectMember>(
            r#"
            INSERT INTO project_members (project_id, user_id)
            VALUES ($1, $2)
            ON CONFLICT (project_id, user_id)
            DO UPDATE SET is_active_in_project = TRUE, updated_at = NOW()
            RETURNING project_id, user_id, is_active_in_project, created_at, updated_at
            "#,
        )
        .bind(project_id)
        .bind(user_id)
        .fetch_one(pool)
        .await
    }

    /// Sets the per-project active flag
    ///
    /// Returns None if the user is not on the project.
    pub async fn set_active(
        pool: &PgPool,
        project_id: Uuid,
        user_id: Uuid,
        active: bool,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, ProjectMember>(
            r#"
            UPDATE project_members
            SET is_active_in_project = $3, updated_at = NOW()
            WHERE project_id = $1 AND user_id = $2
            RETURNING project_id, user_id, is_active_in_project, created_at, updated_at
            "#,
        )
        .bind(project_id)
        .bind(user_id)
        .bind(active)
        .fetch_optional(pool)
        .await
    }

    /// Lists the team of a project with user details
    pub async fn list_team(pool: &PgPool, project_id: Uuid) -> Result<Vec<TeamMember>, sqlx::Error> {
        sqlx::query_as::<_, TeamMember>(
            r#"
            SELECT u.id AS user_id, u.name, u.email, u.role, u.is_active,
                   pm.is_active_in_project, pm.created_at AS joined_at
            FROM project_members pm
            JOIN users u ON u.id = pm.user_id
            WHERE pm.project_id = $1
            ORDER BY u.name ASC
            "#,
        )
        .bind(project_id)
        .fetch_all(pool)
        .await
    }
}
