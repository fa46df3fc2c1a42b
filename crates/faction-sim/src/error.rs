//! Simulation Errors
//!
//! Every fallible operation returns `Result<T, SimError>`. A returned error
//! means no mutation was performed.

use thiserror::Error;

/// Broad class of a [`SimError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    ValidationFailure,
    InsufficientResource,
    InvalidState,
    NotFound,
}

/// Errors reported by simulation operations.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SimError {
    #[error("Parent faction not found: {parent} (parent of {faction})")]
    ParentNotFound { faction: String, parent: String },

    #[error("Circular dependency detected in hierarchy at {faction}")]
    CircularDependency { faction: String },

    #[error("Faction not found: {0}")]
    MissingActor(String),

    #[error("Relationship too low: {actual} (requires {required})")]
    RelationshipTooLow { required: i32, actual: i32 },

    #[error("Insufficient {resource}: need {required}, have {available}")]
    InsufficientResource {
        resource: String,
        required: f64,
        available: f64,
    },

    #[error("Insufficient supply of {resource}: requested {requested}, available {available}")]
    InsufficientSupply {
        resource: String,
        requested: f64,
        available: f64,
    },

    #[error("{0} has no resources")]
    NoResources(String),

    #[error("Cannot {operation} {entity}: status is {status}")]
    InvalidState {
        entity: String,
        status: String,
        operation: &'static str,
    },

    #[error("{kind} not found: {id}")]
    NotFound { kind: &'static str, id: String },
}

impl SimError {
    pub fn not_found(kind: &'static str, id: impl Into<String>) -> Self {
        SimError::NotFound {
            kind,
            id: id.into(),
        }
    }

    pub fn insufficient(resource: impl Into<String>, required: f64, available: f64) -> Self {
        SimError::InsufficientResource {
            resource: resource.into(),
            required,
            available,
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            SimError::ParentNotFound { .. }
            | SimError::CircularDependency { .. }
            | SimError::MissingActor(_)
            | SimError::RelationshipTooLow { .. } => ErrorCategory::ValidationFailure,
            SimError::InsufficientResource { .. }
            | SimError::InsufficientSupply { .. }
            | SimError::NoResources(_) => ErrorCategory::InsufficientResource,
            SimError::InvalidState { .. } => ErrorCategory::InvalidState,
            SimError::NotFound { .. } => ErrorCategory::NotFound,
        }
    }
}
