#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative session state management for Whack-a-Mole.

mod holes;
mod targets;

use std::time::Duration;

use glam::Vec3;
use whack_core::{
    Command, ConfigurationError, EndReason, Event, Phase, SessionId, SpawnFailure, TargetId,
    WELCOME_BANNER,
};

pub use holes::{Hole, HoleRegistry};
pub use targets::{Activation, Target};

/// Represents the authoritative Whack-a-Mole world state.
#[derive(Debug)]
pub struct World {
    banner: &'static str,
    origin: Vec3,
    holes: HoleRegistry,
    session_id: SessionId,
    session: SessionState,
    targets: Vec<Target>,
    next_target_id: u32,
}

#[derive(Clone, Copy, Debug, Default)]
struct SessionState {
    phase: Phase,
    score: u32,
    remaining: Duration,
}

impl World {
    /// Creates an idle world with no holes, anchored at the world origin.
    #[must_use]
    pub fn new() -> Self {
        Self::with_holes(Vec3::ZERO, HoleRegistry::new())
    }

    /// Creates an idle world around `origin` using the provided hole registry.
    ///
    /// The registry is taken as-is; an empty registry is not replaced by the
    /// fallback grid until a [`Command::ConfigureHoles`] arrives.
    #[must_use]
    pub fn with_holes(origin: Vec3, holes: HoleRegistry) -> Self {
        Self {
            banner: WELCOME_BANNER,
            origin,
            holes,
            session_id: SessionId::new(0),
            session: SessionState::default(),
            targets: Vec::new(),
            next_target_id: 0,
        }
    }

    fn validate_start(&self, duration: Duration) -> Result<(), ConfigurationError> {
        if self.session.phase != Phase::Idle {
            return Err(ConfigurationError::AlreadyStarted);
        }
        if duration.is_zero() {
            return Err(ConfigurationError::ZeroDuration);
        }
        if !self.holes.is_valid() {
            return Err(ConfigurationError::EmptyRegistry);
        }
        Ok(())
    }

    fn allocate_target_id(&mut self) -> TargetId {
        let id = TargetId::new(self.next_target_id);
        self.next_target_id = self.next_target_id.wrapping_add(1);
        id
    }

    fn target_index(&self, target: TargetId) -> Option<usize> {
        self.targets.iter().position(|candidate| candidate.id() == target)
    }

    fn register_hit(&mut self, out_events: &mut Vec<Event>) {
        if self.session.phase != Phase::Active {
            return;
        }

        self.session.score = self.session.score.saturating_add(1);
        tracing::debug!(score = self.session.score, "mole hit");
        out_events.push(Event::HitRegistered {
            score: self.session.score,
        });
    }

    fn end_session(&mut self, reason: EndReason, out_events: &mut Vec<Event>) {
        self.session.phase = Phase::Ended;
        tracing::info!(score = self.session.score, ?reason, "game over");
        out_events.push(Event::SessionEnded {
            score: self.session.score,
            reason,
        });
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::ConfigureHoles { positions } => {
            if world.session.phase == Phase::Active {
                let error = ConfigurationError::SessionInProgress;
                tracing::error!(%error, "rejected hole configuration");
                out_events.push(Event::HolesConfigurationRejected { error });
                return;
            }

            world.holes = HoleRegistry::from_positions(positions).or_fallback(world.origin);
            tracing::info!(
                count = world.holes.len(),
                layout = ?world.holes.layout(),
                "holes configured"
            );
            out_events.push(Event::HolesConfigured {
                count: world.holes.len(),
                layout: world.holes.layout(),
            });
        }
        Command::StartSession { duration } => {
            if let Err(error) = world.validate_start(duration) {
                tracing::error!(%error, "cannot start game");
                out_events.push(Event::SessionRejected { error });
                return;
            }

            world.session_id = SessionId::new(world.session_id.get().wrapping_add(1));
            world.session = SessionState {
                phase: Phase::Active,
                score: 0,
                remaining: duration,
            };
            tracing::info!(
                session = world.session_id.get(),
                duration_secs = duration.as_secs_f32(),
                holes = world.holes.len(),
                "game started"
            );
            out_events.push(Event::SessionStarted {
                session: world.session_id,
                duration,
            });
        }
        Command::Tick { dt } => {
            if world.session.phase != Phase::Active {
                return;
            }

            world.session.remaining = world.session.remaining.saturating_sub(dt);
            out_events.push(Event::TimeAdvanced { dt });
            out_events.push(Event::CountdownUpdated {
                remaining: world.session.remaining,
            });

            if world.session.remaining.is_zero() {
                world.end_session(EndReason::TimeExpired, out_events);
            }
        }
        Command::SpawnTarget { hole } => {
            if world.session.phase != Phase::Active || !world.holes.is_valid() {
                return;
            }

            let Some(position) = world.holes.get(hole).map(Hole::position) else {
                let reason = SpawnFailure::UnknownHole(hole);
                tracing::error!(%reason, "cannot spawn mole");
                out_events.push(Event::SpawnSkipped { hole, reason });
                return;
            };

            let id = world.allocate_target_id();
            let mut target = Target::new(id, hole, position);
            target.bind(world.session_id);
            world.targets.push(target);
            tracing::debug!(target = id.get(), hole = hole.get(), "mole spawned");
            out_events.push(Event::TargetSpawned {
                target: id,
                hole,
                position,
            });
        }
        Command::DiscardTarget { target, reason } => {
            let Some(index) = world.target_index(target) else {
                return;
            };

            let _ = world.targets.remove(index);
            tracing::warn!(target = target.get(), %reason, "discarded invalid mole");
            out_events.push(Event::TargetDiscarded { target, reason });
        }
        Command::ActivateTarget { target } => {
            let Some(index) = world.target_index(target) else {
                return;
            };

            match world.targets[index].on_activated() {
                Ok(Activation::Ignored) => {}
                Ok(Activation::Hit { .. }) => {
                    world.register_hit(out_events);
                    let _ = world.targets.remove(index);
                    out_events.push(Event::TargetRemoved { target });
                }
                Err(error) => {
                    tracing::error!(target = target.get(), %error, "cannot credit mole hit");
                    out_events.push(Event::ActivationRejected { target, error });
                }
            }
        }
        Command::RegisterHit => world.register_hit(out_events),
        Command::StopSession => match world.session.phase {
            Phase::Idle => world.end_session(EndReason::Abandoned, out_events),
            Phase::Active => world.end_session(EndReason::Stopped, out_events),
            Phase::Ended => {}
        },
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use std::time::Duration;

    use super::{HoleRegistry, Target, World};
    use whack_core::{HoleId, Phase, SessionId, TargetId};

    /// Retrieves the welcome banner that hosts may display to players.
    #[must_use]
    pub fn welcome_banner(world: &World) -> &'static str {
        world.banner
    }

    /// Current phase of the session.
    #[must_use]
    pub fn phase(world: &World) -> Phase {
        world.session.phase
    }

    /// Hits credited in the current session.
    #[must_use]
    pub fn score(world: &World) -> u32 {
        world.session.score
    }

    /// Time left on the countdown.
    #[must_use]
    pub fn remaining(world: &World) -> Duration {
        world.session.remaining
    }

    /// Identifier of the most recently started session.
    #[must_use]
    pub fn session_id(world: &World) -> SessionId {
        world.session_id
    }

    /// Provides read-only access to the hole registry.
    #[must_use]
    pub fn holes(world: &World) -> &HoleRegistry {
        &world.holes
    }

    /// Identifiers of every hole in registry order.
    #[must_use]
    pub fn hole_ids(world: &World) -> Vec<HoleId> {
        world.holes.ids()
    }

    /// Live targets in spawn order.
    #[must_use]
    pub fn targets(world: &World) -> &[Target] {
        &world.targets
    }

    /// Looks up a live target by identifier.
    #[must_use]
    pub fn target(world: &World, target: TargetId) -> Option<&Target> {
        world.targets.iter().find(|candidate| candidate.id() == target)
    }

    /// Number of live targets occupying the provided hole.
    #[must_use]
    pub fn occupants(world: &World, hole: HoleId) -> usize {
        world
            .targets
            .iter()
            .filter(|candidate| candidate.hole() == hole)
            .count()
    }
}
