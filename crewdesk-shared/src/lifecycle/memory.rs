/// In-memory project store
///
/// Behaves like [`super::PgProjectStore`] (including the unique name rule)
/// without a database. It also counts writes, which lets tests assert that
/// no-op transitions don't persist anything.
///
/// # Example
///
/// ```
/// use crewdesk_shared::lifecycle::{LifecycleManager, MemoryProjectStore};
/// use crewdesk_shared::models::project::{ProjectFields, ProjectStage};
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let manager = LifecycleManager::new(MemoryProjectStore::new());
/// let project = manager
///     .create(ProjectFields { name: "Demo".to_string(), ..Default::default() })
///     .await?;
/// assert_eq!(project.stage, ProjectStage::Pendiente);
/// # Ok(())
/// # }
/// ```

use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::RwLock;
use uuid::Uuid;

use super::store::{ProjectStore, StoreError};
use super::transition::LifecycleState;
use crate::models::project::{Project, ProjectFields};
use crate::models::user::UserRole;

#[derive(Debug, Default)]
pub struct MemoryProjectStore {
    projects: RwLock<HashMap<Uuid, Project>>,
    users: RwLock<HashMap<Uuid, UserRole>>,
    writes: AtomicUsize,
}

impl MemoryProjectStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a user with `role` and returns its id
    pub async fn add_user(&self, role: UserRole) -> Uuid {
        let id = Uuid::new_v4();
        self.users.write().await.insert(id, role);
        id
    }

    /// Number of inserts and saves performed so far
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

}

/// Checked under the same write guard as the mutation that follows
fn ensure_unique(
    projects: &HashMap<Uuid, Project>,
    name: &str,
    exclude_id: Option<Uuid>,
) -> Result<(), StoreError> {
    if projects.values().any(|p| p.name == name && Some(p.id) != exclude_id) {
        return Err(StoreError::DuplicateName(name.to_string()));
    }
    Ok(())
}

#[async_trait]
impl ProjectStore for MemoryProjectStore {
    async fn find(&self, id: Uuid) -> Result<Option<Project>, StoreError> {
        Ok(self.projects.read().await.get(&id).cloned())
    }

    async fn insert(&self, fields: &ProjectFields, state: LifecycleState) -> Result<Project, StoreError> {
        let mut projects = self.projects.write().await;
        ensure_unique(&projects, &fields.name, None)?;

        let now = Utc::now();
        let project = Project {
            id: Uuid::new_v4(),
            name: fields.name.clone(),
            description: fields.description.clone(),
            status: state.status,
            stage: state.stage,
            start_date: fields.start_date,
            end_date: fields.end_date,
            leader_id: fields.leader_id,
            created_at: now,
            updated_at: now,
        };

        projects.insert(project.id, project.clone());
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(project)
    }

    async fn save(&self, project: &Project) -> Result<Option<Project>, StoreError> {
        let mut projects = self.projects.write().await;
        ensure_unique(&projects, &project.name, Some(project.id))?;

        let Some(stored) = projects.get_mut(&project.id) else {
            return Ok(None);
        };

        *stored = Project {
            updated_at: Utc::now(),
            ..project.clone()
        };
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(Some(stored.clone()))
    }

    async fn name_taken(&self, name: &str, exclude_id: Option<Uuid>) -> Result<bool, StoreError> {
        Ok(self
            .projects
            .read()
            .await
            .values()
            .any(|p| p.name == name && Some(p.id) != exclude_id))
    }

    async fn user_role(&self, user_id: Uuid) -> Result<Option<UserRole>, StoreError> {
        Ok(self.users.read().await.get(&user_id).copied())
    }
}
