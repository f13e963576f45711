/// Errors surfaced by lifecycle operations
///
/// None of these leave a partial write behind: validation and state checks
/// run before the store is touched.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::store::StoreError;
use super::transition::TransitionError;

/// A single field-level validation message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum LifecycleError {
    /// Input outside its declared domain (unknown value, duplicate name,
    /// dates out of order, leader without the leader role)
    #[error("Validation failed: {}", summarize(.0))]
    Validation(Vec<FieldError>),

    /// Stage change attempted on a finished project
    #[error("Project {0} is finished; its stage can no longer be changed")]
    TerminalState(Uuid),

    #[error("Project {0} not found")]
    NotFound(Uuid),

    #[error("Storage error: {0}")]
    Storage(#[source] sqlx::Error),
}

impl LifecycleError {
    pub fn field(field: impl Into<String>, message: impl Into<String>) -> Self {
        LifecycleError::Validation(vec![FieldError::new(field, message)])
    }

    /// Maps a transition refusal onto the project it was computed for
    pub fn from_transition(project_id: Uuid, err: TransitionError) -> Self {
        match err {
            TransitionError::StageFrozen => LifecycleError::TerminalState(project_id),
        }
    }
}

impl From<StoreError> for LifecycleError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::DuplicateName(name) => {
                LifecycleError::field("name", format!("A project named '{}' already exists", name))
            }
            StoreError::Database(e) => LifecycleError::Storage(e),
        }
    }
}

fn summarize(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(|e| format!("{}: {}", e.field, e.message))
        .collect::<Vec<_>>()
        .join("; ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_display_lists_fields() {
        let err = LifecycleError::Validation(vec![
            FieldError::new("name", "Name is required"),
            FieldError::new("end_date", "End date must not be before start date"),
        ]);

        let message = err.to_string();
        assert!(message.contains("name: Name is required"));
        assert!(message.contains("end_date"));
    }

    #[test]
    fn test_duplicate_name_becomes_field_error() {
        let err: LifecycleError = StoreError::DuplicateName("Intranet".to_string()).into();
        match err {
            LifecycleError::Validation(errors) => {
                assert_eq!(errors.len(), 1);
                assert_eq!(errors[0].field, "name");
                assert!(errors[0].message.contains("Intranet"));
            }
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_frozen_stage_maps_to_terminal_state() {
        let id = Uuid::new_v4();
        let err = LifecycleError::from_transition(id, TransitionError::StageFrozen);
        assert!(matches!(err, LifecycleError::TerminalState(got) if got == id));
    }
}
