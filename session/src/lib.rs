#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Session controller that hosts drive once per frame.
//!
//! The controller owns the authoritative [`World`], the spawn timer and the
//! HUD. Hosts inject the hole layout, the display sinks and a
//! [`TargetFactory`] up front, then call [`SessionController::tick`] every
//! frame and [`SessionController::activate`] whenever a target is clicked.

mod config;
mod factory;

use std::{fmt, time::Duration};

use glam::Vec3;
use whack_core::{
    Command, ConfigurationError, DiscardReason, Event, HoleId, Phase, SessionError, SpawnFailure,
    TargetId, MIN_SPAWN_PERIOD,
};
use whack_system_hud::Hud;
use whack_system_spawning::{Config as SpawningConfig, Spawning};
use whack_world::{self as world, query, HoleRegistry, Target, World};

pub use config::SessionConfig;
pub use factory::{InstantiationError, TargetFactory};

/// Owns one session and routes host calls through the world and systems.
pub struct SessionController {
    world: World,
    spawning: Spawning,
    hud: Hud,
    factory: Option<Box<dyn TargetFactory>>,
    journal: Vec<Event>,
}

impl SessionController {
    /// Creates a controller from host configuration.
    ///
    /// Holes listed in the configuration are used verbatim; an empty list
    /// produces the 3x3 fallback grid around the configured origin.
    #[must_use]
    pub fn new(config: &SessionConfig) -> Self {
        let mut controller = Self::with_registry(
            config.origin(),
            HoleRegistry::new(),
            config.spawning(),
        );
        let _ = controller.dispatch(Command::ConfigureHoles {
            positions: config.hole_positions(),
        });
        controller
    }

    /// Creates a controller around an explicitly constructed hole registry.
    ///
    /// The registry is not replaced by the fallback grid, so an empty
    /// registry makes [`SessionController::start`] fail.
    #[must_use]
    pub fn with_registry(origin: Vec3, holes: HoleRegistry, spawning: SpawningConfig) -> Self {
        Self {
            world: World::with_holes(origin, holes),
            spawning: Spawning::new(spawning),
            hud: Hud::new(),
            factory: None,
            journal: Vec::new(),
        }
    }

    /// Installs the host instantiation service.
    #[must_use]
    pub fn with_factory(mut self, factory: impl TargetFactory + 'static) -> Self {
        self.factory = Some(Box::new(factory));
        self
    }

    /// Installs the display sinks.
    #[must_use]
    pub fn with_hud(mut self, hud: Hud) -> Self {
        self.hud = hud;
        self
    }

    /// Replaces the hole set before the session starts.
    pub fn configure_holes(&mut self, positions: Vec<Vec3>) -> Result<(), SessionError> {
        let events = self.dispatch(Command::ConfigureHoles { positions });
        for event in &events {
            if let Event::HolesConfigurationRejected { error } = event {
                return Err((*error).into());
            }
        }
        Ok(())
    }

    /// Starts the countdown and arms periodic spawning with an immediate first spawn.
    ///
    /// Fails without changing the phase when no factory is installed, the
    /// spawn period is shorter than [`MIN_SPAWN_PERIOD`] or the world rejects
    /// the start.
    pub fn start(&mut self, duration: Duration) -> Result<(), SessionError> {
        if let Err(error) = self.validate_host_setup() {
            tracing::error!(%error, "cannot start game");
            self.journal.push(Event::SessionRejected { error });
            return Err(error.into());
        }

        self.hud.report_missing_sinks();
        let events = self.dispatch(Command::StartSession { duration });
        for event in &events {
            if let Event::SessionRejected { error } = event {
                return Err((*error).into());
            }
        }

        self.run_spawning(&events);
        Ok(())
    }

    /// Advances the countdown. The countdown runs whether or not a time display is attached.
    pub fn tick(&mut self, dt: Duration) {
        let events = self.dispatch(Command::Tick { dt });
        self.run_spawning(&events);
    }

    /// Spawns a target at a uniformly selected hole.
    ///
    /// Returns `Ok(None)` when the session is not active. Instantiation
    /// failures discard the target and leave score and time untouched.
    pub fn spawn_target(&mut self) -> Result<Option<TargetId>, SessionError> {
        if query::phase(&self.world) != Phase::Active {
            return Ok(None);
        }

        let holes = query::hole_ids(&self.world);
        let Some(hole) = self.spawning.select_hole(&holes) else {
            return Ok(None);
        };
        self.spawn_at(hole)
    }

    /// Credits one hit while the session is active.
    pub fn register_hit(&mut self) {
        let _ = self.dispatch(Command::RegisterHit);
    }

    /// Delivers a click to a target.
    ///
    /// Repeated activations of the same target are ignored.
    pub fn activate(&mut self, target: TargetId) -> Result<(), SessionError> {
        let events = self.dispatch(Command::ActivateTarget { target });
        for event in &events {
            if let Event::ActivationRejected { error, .. } = event {
                return Err((*error).into());
            }
        }
        Ok(())
    }

    /// Ends the session immediately. Idempotent.
    pub fn stop(&mut self) {
        let events = self.dispatch(Command::StopSession);
        self.run_spawning(&events);
    }

    /// Current phase of the session.
    #[must_use]
    pub fn phase(&self) -> Phase {
        query::phase(&self.world)
    }

    /// Hits credited so far.
    #[must_use]
    pub fn score(&self) -> u32 {
        query::score(&self.world)
    }

    /// Time left on the countdown.
    #[must_use]
    pub fn remaining(&self) -> Duration {
        query::remaining(&self.world)
    }

    /// Hole set used by the session.
    #[must_use]
    pub fn holes(&self) -> &HoleRegistry {
        query::holes(&self.world)
    }

    /// Live targets in spawn order.
    #[must_use]
    pub fn targets(&self) -> &[Target] {
        query::targets(&self.world)
    }

    /// Read-only access to the underlying world.
    #[must_use]
    pub fn world(&self) -> &World {
        &self.world
    }

    /// Reports whether the spawn timer will keep firing.
    #[must_use]
    pub fn is_spawning(&self) -> bool {
        self.spawning.is_armed()
    }

    /// Drains every event produced since the previous call.
    pub fn take_events(&mut self) -> Vec<Event> {
        std::mem::take(&mut self.journal)
    }

    /// Welcome text hosts show before the session starts.
    #[must_use]
    pub fn welcome_banner(&self) -> &'static str {
        query::welcome_banner(&self.world)
    }

    fn validate_host_setup(&self) -> Result<(), ConfigurationError> {
        if self.factory.is_none() {
            return Err(ConfigurationError::MissingPrototype);
        }
        let period = self.spawning.spawn_period();
        if period < MIN_SPAWN_PERIOD {
            return Err(ConfigurationError::SpawnPeriodTooShort(period));
        }
        Ok(())
    }

    fn dispatch(&mut self, command: Command) -> Vec<Event> {
        let mut events = Vec::new();
        world::apply(&mut self.world, command, &mut events);
        self.hud.handle(&events);

        if let Some(factory) = self.factory.as_mut() {
            for event in &events {
                if let Event::TargetRemoved { target } = event {
                    factory.remove(*target);
                }
            }
        }

        self.journal.extend(events.iter().cloned());
        events
    }

    fn run_spawning(&mut self, events: &[Event]) {
        let holes = query::hole_ids(&self.world);
        let mut commands = Vec::new();
        self.spawning
            .handle(events, query::phase(&self.world), &holes, &mut commands);

        for command in commands {
            if let Command::SpawnTarget { hole } = command {
                if let Err(error) = self.spawn_at(hole) {
                    tracing::warn!(
                        %error,
                        hole = hole.get(),
                        "spawn skipped, waiting for next period"
                    );
                }
            }
        }
    }

    fn spawn_at(&mut self, hole: HoleId) -> Result<Option<TargetId>, SessionError> {
        let events = self.dispatch(Command::SpawnTarget { hole });

        let mut spawned = None;
        for event in &events {
            match event {
                Event::TargetSpawned {
                    target, position, ..
                } => spawned = Some((*target, *position)),
                Event::SpawnSkipped { reason, .. } => return Err((*reason).into()),
                _ => {}
            }
        }
        let Some((target, position)) = spawned else {
            return Ok(None);
        };

        let Some(factory) = self.factory.as_mut() else {
            let _ = self.dispatch(Command::DiscardTarget {
                target,
                reason: DiscardReason::Spawn(SpawnFailure::Instantiation),
            });
            return Err(ConfigurationError::MissingPrototype.into());
        };

        match factory.instantiate(target, position) {
            Ok(()) => {
                tracing::debug!(
                    target = target.get(),
                    hole = hole.get(),
                    "mole spawned successfully"
                );
                Ok(Some(target))
            }
            Err(error) => {
                tracing::error!(target = target.get(), %error, "error spawning mole");
                let reason = error.discard_reason();
                let _ = self.dispatch(Command::DiscardTarget { target, reason });
                Err(reason.into())
            }
        }
    }
}

impl fmt::Debug for SessionController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionController")
            .field("world", &self.world)
            .field("spawning", &self.spawning)
            .field("hud", &self.hud)
            .field("factory", &self.factory.is_some())
            .finish()
    }
}
