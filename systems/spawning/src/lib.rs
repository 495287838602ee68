#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Spawn-timing system responsible for emitting target spawn commands.
//!
//! The timer fires once immediately when a session starts and then once per
//! elapsed spawn period while the session stays active. Each firing selects a
//! hole uniformly at random from a seeded generator, so replays with the same
//! seed and event stream produce identical spawn sequences.

use std::time::Duration;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use whack_core::{
    Command, Event, HoleId, Phase, DEFAULT_SPAWN_PERIOD, MAX_SPAWNS_PER_TICK, MIN_SPAWN_PERIOD,
};

const DEFAULT_RNG_SEED: u64 = 0x6d6f_6c65_5f73_7077;

/// Configuration parameters required to construct the spawning system.
#[derive(Clone, Copy, Debug)]
pub struct Config {
    spawn_period: Duration,
    rng_seed: u64,
}

impl Config {
    /// Creates a new configuration using the provided spawn cadence and seed.
    #[must_use]
    pub const fn new(spawn_period: Duration, rng_seed: u64) -> Self {
        Self {
            spawn_period,
            rng_seed,
        }
    }

    /// Interval between successive spawns.
    #[must_use]
    pub const fn spawn_period(&self) -> Duration {
        self.spawn_period
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(DEFAULT_SPAWN_PERIOD, DEFAULT_RNG_SEED)
    }
}

/// Pure system that emits spawn commands while a session is active.
#[derive(Debug)]
pub struct Spawning {
    spawn_period: Duration,
    accumulator: Duration,
    armed: bool,
    immediate_pending: bool,
    rng: ChaCha8Rng,
}

impl Spawning {
    /// Creates a new, disarmed spawning system using the supplied configuration.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            spawn_period: config.spawn_period,
            accumulator: Duration::ZERO,
            armed: false,
            immediate_pending: false,
            rng: ChaCha8Rng::seed_from_u64(config.rng_seed),
        }
    }

    /// Interval between successive spawns.
    #[must_use]
    pub const fn spawn_period(&self) -> Duration {
        self.spawn_period
    }

    /// Reports whether the timer will fire on future ticks.
    #[must_use]
    pub const fn is_armed(&self) -> bool {
        self.armed
    }

    /// Stops the timer. Later time events are ignored until the next session starts.
    pub fn cancel(&mut self) {
        self.armed = false;
        self.immediate_pending = false;
        self.accumulator = Duration::ZERO;
    }

    /// Consumes events and the current phase to emit spawn commands.
    pub fn handle(
        &mut self,
        events: &[Event],
        phase: Phase,
        holes: &[HoleId],
        out: &mut Vec<Command>,
    ) {
        let mut accumulated = Duration::ZERO;
        for event in events {
            match event {
                Event::SessionStarted { .. } if self.spawn_period < MIN_SPAWN_PERIOD => {
                    tracing::error!(
                        period = ?self.spawn_period,
                        "spawn period is too short, spawning stays disarmed"
                    );
                    self.cancel();
                }
                Event::SessionStarted { .. } => {
                    self.armed = true;
                    self.immediate_pending = true;
                    self.accumulator = Duration::ZERO;
                    accumulated = Duration::ZERO;
                }
                Event::SessionEnded { .. } => self.cancel(),
                Event::TimeAdvanced { dt } if self.armed => {
                    accumulated = accumulated.saturating_add(*dt);
                }
                _ => {}
            }
        }

        if phase != Phase::Active {
            self.cancel();
            return;
        }

        if !self.armed {
            return;
        }

        self.accumulator = self.accumulator.saturating_add(accumulated);
        let mut spawn_attempts = self.elapsed_periods();
        if std::mem::take(&mut self.immediate_pending) {
            spawn_attempts += 1;
        }

        if spawn_attempts == 0 {
            return;
        }

        if holes.is_empty() {
            tracing::error!("cannot spawn mole, holes array is empty");
            return;
        }

        for _ in 0..spawn_attempts {
            if let Some(hole) = self.select_hole(holes) {
                out.push(Command::SpawnTarget { hole });
            }
        }
    }

    /// Draws a hole uniformly at random, or `None` when no holes exist.
    pub fn select_hole(&mut self, holes: &[HoleId]) -> Option<HoleId> {
        if holes.is_empty() {
            return None;
        }

        let index = self.rng.gen_range(0..holes.len());
        Some(holes[index])
    }

    fn elapsed_periods(&mut self) -> usize {
        let period = self.spawn_period.as_nanos();
        if period == 0 {
            return 0;
        }

        let elapsed = self.accumulator.as_nanos();
        let due = elapsed / period;
        self.accumulator =
            u64::try_from(elapsed % period).map_or(Duration::ZERO, Duration::from_nanos);

        let due = usize::try_from(due).unwrap_or(usize::MAX);
        if due > MAX_SPAWNS_PER_TICK {
            tracing::warn!(
                due,
                limit = MAX_SPAWNS_PER_TICK,
                "tick spans too many spawn periods, dropping the excess"
            );
            return MAX_SPAWNS_PER_TICK;
        }
        due
    }
}
