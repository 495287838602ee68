//! Instantiation service contract implemented by hosts.

use glam::Vec3;
use thiserror::Error;
use whack_core::{BindingError, DiscardReason, SpawnFailure, TargetId};

/// Failure reported by a host while materialising a target.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum InstantiationError {
    /// The host could not create the object.
    #[error("failed to instantiate target: {0}")]
    Failed(String),
    /// The host created an object that cannot act as a target.
    #[error("instantiated object lacks the target capability")]
    MissingCapability,
}

impl InstantiationError {
    /// Reason recorded when the half-created target is discarded.
    #[must_use]
    pub fn discard_reason(&self) -> DiscardReason {
        match self {
            Self::Failed(_) => DiscardReason::Spawn(SpawnFailure::Instantiation),
            Self::MissingCapability => DiscardReason::Binding(BindingError::MissingCapability),
        }
    }
}

/// Host service that creates and removes the on-screen objects for targets.
pub trait TargetFactory {
    /// Creates the object for `target` at `position`.
    fn instantiate(&mut self, target: TargetId, position: Vec3) -> Result<(), InstantiationError>;

    /// Removes the object for a target that was hit.
    fn remove(&mut self, target: TargetId);
}
