//! Engine error taxonomy.

use thiserror::Error;

use crate::db::DbError;
use crate::teeth::ToothError;

/// Errors raised by the plan engines (split, flow, generation, review).
#[derive(Error, Debug)]
pub enum PlanError {
    #[error("Invalid split: {0}")]
    InvalidSplit(String),

    #[error("Invalid state: {0}")]
    InvalidState(String),

    #[error("Not found: {0}")]
    NotFound(String),

    /// A batch stopped partway; the store now holds `completed` of `attempted` changes.
    #[error("Batch failed after {completed} of {attempted} changes: {source}")]
    PartialBatchFailure {
        completed: usize,
        attempted: usize,
        #[source]
        source: DbError,
    },

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("{0} choice proposal(s) still need a restoration choice")]
    UnresolvedChoices(usize),

    #[error(transparent)]
    Tooth(#[from] ToothError),

    #[error("Store error: {0}")]
    Store(DbError),
}

impl PlanError {
    /// Validation failures the clinician can fix by re-prompting.
    ///
    /// Everything else means stored data may be inconsistent or unreachable.
    pub fn is_user_correctable(&self) -> bool {
        matches!(
            self,
            PlanError::InvalidSplit(_)
                | PlanError::InvalidState(_)
                | PlanError::InvalidInput(_)
                | PlanError::UnresolvedChoices(_)
                | PlanError::Tooth(_)
        )
    }
}

impl From<DbError> for PlanError {
    fn from(e: DbError) -> Self {
        match e {
            DbError::NotFound(what) => PlanError::NotFound(what),
            other => PlanError::Store(other),
        }
    }
}

pub type PlanResult<T> = Result<T, PlanError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classification() {
        assert!(PlanError::InvalidSplit("nothing selected".into()).is_user_correctable());
        assert!(PlanError::UnresolvedChoices(1).is_user_correctable());
        assert!(PlanError::Tooth(ToothError::Unknown(19)).is_user_correctable());
        assert!(!PlanError::Store(DbError::Constraint("x".into())).is_user_correctable());
        assert!(!PlanError::PartialBatchFailure {
            completed: 1,
            attempted: 3,
            source: DbError::Constraint("disk full".into()),
        }
        .is_user_correctable());
    }

    #[test]
    fn test_store_not_found_maps_to_not_found() {
        let err: PlanError = DbError::NotFound("plan p1".into()).into();
        assert!(matches!(err, PlanError::NotFound(ref what) if what == "plan p1"));
    }

    #[test]
    fn test_partial_failure_message() {
        let err = PlanError::PartialBatchFailure {
            completed: 2,
            attempted: 5,
            source: DbError::Constraint("locked".into()),
        };
        assert_eq!(
            err.to_string(),
            "Batch failed after 2 of 5 changes: Constraint violation: locked"
        );
    }
}
