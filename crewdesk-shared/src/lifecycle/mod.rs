/// Project lifecycle management
///
/// A project's `status` and `stage` are coupled:
///
/// ```text
/// stage == Cierre    =>  status in {inactive, finished}
/// status == inactive =>  stage == Cierre
/// status == active   =>  stage != Cierre
/// status == finished =>  stage == Cierre
/// ```
///
/// Every mutation computes its target state with [`transition::next_state`],
/// so changing the status, changing the stage and editing the whole record
/// all land on the same fixed point.
///
/// # Modules
///
/// - [`transition`]: Pure state transition function
/// - [`store`]: Persistence trait and the PostgreSQL implementation
/// - [`memory`]: In-memory store for tests and local tooling
/// - [`manager`]: Operations callers use (create, set status, set stage, update)
/// - [`error`]: Error taxonomy surfaced to callers
///
/// # Example
///
/// ```no_run
/// use crewdesk_shared::lifecycle::{LifecycleManager, PgProjectStore};
/// use crewdesk_shared::models::project::{ProjectFields, ProjectStatus};
/// use sqlx::PgPool;
///
/// # async fn example(pool: PgPool) -> Result<(), Box<dyn std::error::Error>> {
/// let manager = LifecycleManager::new(PgProjectStore::new(pool));
///
/// let project = manager
///     .create(ProjectFields {
///         name: "Intranet".to_string(),
///         ..Default::default()
///     })
///     .await?;
///
/// // Closing the project moves it to the Cierre stage
/// let closed = manager.set_status(project.id, ProjectStatus::Inactive).await?;
/// assert!(closed.stage.is_closure());
/// # Ok(())
/// # }
/// ```

pub mod error;
pub mod manager;
pub mod memory;
pub mod store;
pub mod transition;

pub use error::{FieldError, LifecycleError};
pub use manager::{LifecycleManager, ProjectUpdate};
pub use memory::MemoryProjectStore;
pub use store::{PgProjectStore, ProjectStore, StoreError};
pub use transition::{next_state, Change, LifecycleState, TransitionError};
