/// Status/stage transition function
///
/// [`next_state`] is the only place the coupling rules live. It performs no
/// I/O; the manager loads the current state, asks for the next one and
/// persists the result.

use serde::{Deserialize, Serialize};

use crate::models::project::{Project, ProjectStage, ProjectStatus};

/// The lifecycle-relevant part of a project
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LifecycleState {
    pub status: ProjectStatus,
    pub stage: ProjectStage,
}

impl LifecycleState {
    pub fn new(status: ProjectStatus, stage: ProjectStage) -> Self {
        Self { status, stage }
    }

    /// State of a newly created project: active, Pendiente
    pub fn initial() -> Self {
        Self::default()
    }

    pub fn of(project: &Project) -> Self {
        Self::new(project.status, project.stage)
    }

    /// Checks all four coupling rules at once
    pub fn is_consistent(&self) -> bool {
        let closed = self.stage.is_closure();
        match self.status {
            ProjectStatus::Active => !closed,
            ProjectStatus::Inactive | ProjectStatus::Finished => closed,
        }
    }

    /// Every combination of status and stage, consistent or not
    pub fn all() -> impl Iterator<Item = LifecycleState> {
        ProjectStatus::ALL.into_iter().flat_map(|status| {
            ProjectStage::ORDER
                .into_iter()
                .map(move |stage| LifecycleState::new(status, stage))
        })
    }
}

/// A change a caller asks for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Change {
    /// Status toggle
    Status(ProjectStatus),

    /// Stage dropdown
    Stage(ProjectStage),

    /// Full-record edit supplying both fields
    Replace {
        status: ProjectStatus,
        stage: ProjectStage,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum TransitionError {
    /// Stage changes are refused once a project is finished
    #[error("Project is finished; its stage can no longer change")]
    StageFrozen,
}

/// Computes the state that results from applying `change` to `current`
///
/// # Rules
///
/// Status change:
/// - `inactive` or `finished` moves the stage to `Cierre`
/// - `active` moves a `Cierre` stage back to `Seguimiento`
///
/// Stage change (refused when `finished`):
/// - `Cierre` makes the project `inactive`
/// - any other stage reactivates an `inactive` project
///
/// Full replace, applied in order:
/// 1. `inactive` with a stage other than `Cierre`: stage becomes `Cierre`
/// 2. `active` with `Cierre`: stage becomes `Seguimiento`
/// 3. `finished` with a stage other than `Cierre`: stage becomes `Cierre`
/// 4. `Cierre` with a status other than `finished`/`inactive`: status becomes `inactive`
/// 5. otherwise, a non-`Cierre` stage with `inactive` status and a stored
///    stage of `Cierre`: status becomes `active`
pub fn next_state(current: LifecycleState, change: Change) -> Result<LifecycleState, TransitionError> {
    match change {
        Change::Status(status) => Ok(apply_status(current, status)),
        Change::Stage(stage) => apply_stage(current, stage),
        Change::Replace { status, stage } => Ok(apply_replace(current, status, stage)),
    }
}

fn apply_status(current: LifecycleState, status: ProjectStatus) -> LifecycleState {
    let stage = match status {
        ProjectStatus::Inactive | ProjectStatus::Finished => ProjectStage::Cierre,
        ProjectStatus::Active if current.stage.is_closure() => ProjectStage::Seguimiento,
        ProjectStatus::Active => current.stage,
    };

    LifecycleState::new(status, stage)
}

fn apply_stage(current: LifecycleState, stage: ProjectStage) -> Result<LifecycleState, TransitionError> {
    if current.status == ProjectStatus::Finished {
        return Err(TransitionError::StageFrozen);
    }

    let status = if stage.is_closure() {
        ProjectStatus::Inactive
    } else if current.status == ProjectStatus::Inactive {
        // Leaving Cierre reactivates, whatever made the project inactive
        ProjectStatus::Active
    } else {
        current.status
    };

    Ok(LifecycleState::new(status, stage))
}

fn apply_replace(current: LifecycleState, status: ProjectStatus, stage: ProjectStage) -> LifecycleState {
    let mut next = LifecycleState::new(status, stage);

    match (next.status, next.stage.is_closure()) {
        (ProjectStatus::Inactive, false) | (ProjectStatus::Finished, false) => {
            next.stage = ProjectStage::Cierre;
        }
        (ProjectStatus::Active, true) => {
            next.stage = ProjectStage::Seguimiento;
        }
        _ => {}
    }

    if next.stage.is_closure() && next.status == ProjectStatus::Active {
        next.status = ProjectStatus::Inactive;
    } else if !next.stage.is_closure()
        && next.status == ProjectStatus::Inactive
        && current.stage.is_closure()
    {
        next.status = ProjectStatus::Active;
    }

    next
}
