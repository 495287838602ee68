#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Whack-a-Mole session engine.
//!
//! This crate defines the message surface that connects hosts, the
//! authoritative world, and pure systems. Hosts submit [`Command`] values
//! describing desired mutations, the world executes those commands via its
//! `apply` entry point, and then broadcasts [`Event`] values for systems to
//! react to deterministically. Systems consume event streams, query immutable
//! snapshots, and respond exclusively with new command batches.

use std::time::Duration;

use glam::Vec3;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Canonical banner emitted when the experience boots.
pub const WELCOME_BANNER: &str = "Welcome to Whack-a-Mole.";

/// Length of a session when the host does not configure one.
pub const DEFAULT_SESSION_DURATION: Duration = Duration::from_secs(10);

/// Fixed cadence at which targets spawn while a session is active.
pub const DEFAULT_SPAWN_PERIOD: Duration = Duration::from_secs(1);

/// Shortest spawn period a session accepts.
pub const MIN_SPAWN_PERIOD: Duration = Duration::from_millis(100);

/// Upper bound on spawns a single batch of time events may trigger.
pub const MAX_SPAWNS_PER_TICK: usize = 4;

/// Coarse state of a session.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Phase {
    /// The session was created but has not started yet.
    #[default]
    Idle,
    /// The countdown is running and targets spawn.
    Active,
    /// The session finished. Terminal.
    Ended,
}

/// Reason a session transitioned into [`Phase::Ended`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EndReason {
    /// The countdown reached zero.
    TimeExpired,
    /// The host requested an explicit stop.
    Stopped,
    /// The host stopped a session that never started.
    Abandoned,
}

/// Describes where the current set of holes came from.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HoleLayout {
    /// No holes have been configured.
    #[default]
    Unconfigured,
    /// Holes were supplied explicitly by the host.
    Explicit,
    /// Holes were synthesised as the deterministic 3x3 fallback grid.
    FallbackGrid,
}

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Replaces the hole set. An empty list produces the fallback grid.
    ConfigureHoles {
        /// Explicit hole positions in world space.
        positions: Vec<Vec3>,
    },
    /// Starts a session with the provided countdown.
    StartSession {
        /// Length of the countdown.
        duration: Duration,
    },
    /// Advances the session clock by the provided delta time.
    Tick {
        /// Duration of simulated time that elapsed since the previous tick.
        dt: Duration,
    },
    /// Requests that a target spawn at the provided hole.
    SpawnTarget {
        /// Hole selected for the spawn.
        hole: HoleId,
    },
    /// Discards a target the host failed to materialise.
    DiscardTarget {
        /// Identifier of the malformed target.
        target: TargetId,
        /// Failure that caused the discard.
        reason: DiscardReason,
    },
    /// Delivers a click or tap to a target.
    ActivateTarget {
        /// Identifier of the activated target.
        target: TargetId,
    },
    /// Credits a hit to the session without an associated target.
    RegisterHit,
    /// Forces the session into [`Phase::Ended`].
    StopSession,
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// Confirms that the hole set was replaced.
    HolesConfigured {
        /// Number of holes now available.
        count: usize,
        /// Origin of the hole set.
        layout: HoleLayout,
    },
    /// Reports that a hole configuration request was refused.
    HolesConfigurationRejected {
        /// Reason the configuration was refused.
        error: ConfigurationError,
    },
    /// Announces that a session began.
    SessionStarted {
        /// Identifier of the session.
        session: SessionId,
        /// Length of the countdown.
        duration: Duration,
    },
    /// Reports that a session could not be started.
    SessionRejected {
        /// Reason the start request was refused.
        error: ConfigurationError,
    },
    /// Indicates that the session clock advanced.
    TimeAdvanced {
        /// Duration of simulated time that elapsed in the tick.
        dt: Duration,
    },
    /// Publishes the remaining countdown after a tick.
    CountdownUpdated {
        /// Time left before the session ends.
        remaining: Duration,
    },
    /// Announces that the session finished.
    SessionEnded {
        /// Final score.
        score: u32,
        /// Cause of the transition.
        reason: EndReason,
    },
    /// Confirms that a target was created at a hole.
    TargetSpawned {
        /// Identifier assigned to the new target.
        target: TargetId,
        /// Hole the target occupies.
        hole: HoleId,
        /// World-space position of the hole.
        position: Vec3,
    },
    /// Reports that a spawn request could not be honoured.
    SpawnSkipped {
        /// Hole named in the request.
        hole: HoleId,
        /// Reason the spawn was skipped.
        reason: SpawnFailure,
    },
    /// Confirms that a malformed target was discarded.
    TargetDiscarded {
        /// Identifier of the discarded target.
        target: TargetId,
        /// Failure that caused the discard.
        reason: DiscardReason,
    },
    /// Confirms that a hit was credited.
    HitRegistered {
        /// Score after the hit.
        score: u32,
    },
    /// Signals the host to remove an activated target.
    TargetRemoved {
        /// Identifier of the removed target.
        target: TargetId,
    },
    /// Reports that an activation could not be credited.
    ActivationRejected {
        /// Identifier of the activated target.
        target: TargetId,
        /// Reason the activation was refused.
        error: BindingError,
    },
}

/// Index of a hole within the registry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct HoleId(u32);

impl HoleId {
    /// Creates a new hole identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }

    /// Position of the hole within the registry order.
    #[must_use]
    pub const fn index(&self) -> usize {
        self.0 as usize
    }
}

/// Unique identifier assigned to a spawned target.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TargetId(u32);

impl TargetId {
    /// Creates a new target identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Identifier of the session a target reports hits to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SessionId(u32);

impl SessionId {
    /// Creates a new session identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Invalid configuration detected before an operation could run.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ConfigurationError {
    /// The hole registry contains no holes.
    #[error("no holes are available")]
    EmptyRegistry,
    /// No instantiation service was installed for targets.
    #[error("target prototype is not assigned")]
    MissingPrototype,
    /// The requested countdown was zero.
    #[error("session duration must be positive")]
    ZeroDuration,
    /// The spawn period is shorter than [`MIN_SPAWN_PERIOD`].
    #[error("spawn period {0:?} is shorter than the minimum")]
    SpawnPeriodTooShort(Duration),
    /// The session already left the idle phase.
    #[error("session was already started")]
    AlreadyStarted,
    /// Holes cannot change while a session is active.
    #[error("holes cannot be reconfigured while a session is active")]
    SessionInProgress,
}

/// A target could not be associated with its session.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BindingError {
    /// The target was activated before being bound to a session.
    #[error("target is not bound to a session")]
    Unbound,
    /// The instantiated object does not carry the target capability.
    #[error("instantiated object lacks the target capability")]
    MissingCapability,
}

/// A single spawn attempt failed; the next period retries naturally.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SpawnFailure {
    /// The selected hole does not exist in the registry.
    #[error("selected hole {0:?} does not exist")]
    UnknownHole(HoleId),
    /// The host failed to instantiate the target.
    #[error("failed to instantiate target")]
    Instantiation,
}

/// Reason a freshly spawned target was thrown away.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DiscardReason {
    /// The instantiation service reported a failure.
    #[error(transparent)]
    Spawn(#[from] SpawnFailure),
    /// The instantiated object could not be bound.
    #[error(transparent)]
    Binding(#[from] BindingError),
}

/// Any failure reported by session operations.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
pub enum SessionError {
    /// See [`ConfigurationError`].
    #[error("configuration error: {0}")]
    Configuration(#[from] ConfigurationError),
    /// See [`BindingError`].
    #[error("binding error: {0}")]
    Binding(#[from] BindingError),
    /// See [`SpawnFailure`].
    #[error("spawn failure: {0}")]
    TransientSpawn(#[from] SpawnFailure),
}

impl From<DiscardReason> for SessionError {
    fn from(reason: DiscardReason) -> Self {
        match reason {
            DiscardReason::Spawn(failure) => Self::TransientSpawn(failure),
            DiscardReason::Binding(error) => Self::Binding(error),
        }
    }
}
