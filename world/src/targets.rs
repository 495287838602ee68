//! Spawned, clickable targets.

use glam::Vec3;
use whack_core::{BindingError, HoleId, SessionId, TargetId};

/// Outcome of delivering an activation to a target.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Activation {
    /// The target was already deactivated; nothing happened.
    Ignored,
    /// The target deactivated and the hit belongs to the bound session.
    Hit {
        /// Session that should be credited.
        session: SessionId,
    },
}

/// One spawn occurrence sitting in a hole.
#[derive(Clone, Debug, PartialEq)]
pub struct Target {
    id: TargetId,
    hole: HoleId,
    position: Vec3,
    binding: Option<SessionId>,
    alive: bool,
}

impl Target {
    /// Creates a live, unbound target at the provided hole.
    #[must_use]
    pub const fn new(id: TargetId, hole: HoleId, position: Vec3) -> Self {
        Self {
            id,
            hole,
            position,
            binding: None,
            alive: true,
        }
    }

    /// Associates the target with a session, replacing any previous binding.
    pub fn bind(&mut self, session: SessionId) {
        self.binding = Some(session);
    }

    /// Handles a click or tap.
    ///
    /// Activation happens at most once: the first successful call deactivates
    /// the target and every later call returns [`Activation::Ignored`]. An
    /// unbound target stays alive and reports [`BindingError::Unbound`].
    pub fn on_activated(&mut self) -> Result<Activation, BindingError> {
        if !self.alive {
            return Ok(Activation::Ignored);
        }

        let session = self.binding.ok_or(BindingError::Unbound)?;
        self.alive = false;
        Ok(Activation::Hit { session })
    }

    /// Identifier of the target.
    #[must_use]
    pub const fn id(&self) -> TargetId {
        self.id
    }

    /// Hole the target was spawned into.
    #[must_use]
    pub const fn hole(&self) -> HoleId {
        self.hole
    }

    /// World-space position of the target.
    #[must_use]
    pub const fn position(&self) -> Vec3 {
        self.position
    }

    /// Session the target reports hits to, if bound.
    #[must_use]
    pub const fn binding(&self) -> Option<SessionId> {
        self.binding
    }

    /// Whether the target can still be activated.
    #[must_use]
    pub const fn is_alive(&self) -> bool {
        self.alive
    }
}
