//! Host-facing session configuration.

use std::time::Duration;

use glam::Vec3;
use serde::{Deserialize, Serialize};
use whack_core::{DEFAULT_SESSION_DURATION, DEFAULT_SPAWN_PERIOD};
use whack_system_spawning::Config as SpawningConfig;

const DEFAULT_SEED: u64 = 0x7768_6163_6b21;

/// Settings a host supplies when creating a session.
///
/// Every field has a default, so an empty TOML document yields a ten second
/// session on the fallback hole grid.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SessionConfig {
    /// Countdown length in seconds.
    pub duration_secs: f32,
    /// Interval between spawns in seconds.
    pub spawn_period_secs: f32,
    /// Seed for hole selection.
    pub seed: u64,
    /// Owner origin the fallback grid is centred on.
    pub origin: [f32; 3],
    /// Explicit hole positions. Empty selects the fallback grid.
    pub holes: Vec<[f32; 3]>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            duration_secs: DEFAULT_SESSION_DURATION.as_secs_f32(),
            spawn_period_secs: DEFAULT_SPAWN_PERIOD.as_secs_f32(),
            seed: DEFAULT_SEED,
            origin: [0.0; 3],
            holes: Vec::new(),
        }
    }
}

impl SessionConfig {
    /// Countdown length. Negative or non-finite values collapse to zero,
    /// which `start` then rejects.
    #[must_use]
    pub fn duration(&self) -> Duration {
        seconds(self.duration_secs)
    }

    /// Spawning system configuration derived from the period and seed.
    #[must_use]
    pub fn spawning(&self) -> SpawningConfig {
        SpawningConfig::new(seconds(self.spawn_period_secs), self.seed)
    }

    /// Owner origin as a vector.
    #[must_use]
    pub fn origin(&self) -> Vec3 {
        Vec3::from_array(self.origin)
    }

    /// Explicit hole positions as vectors.
    #[must_use]
    pub fn hole_positions(&self) -> Vec<Vec3> {
        self.holes.iter().copied().map(Vec3::from_array).collect()
    }
}

fn seconds(value: f32) -> Duration {
    Duration::try_from_secs_f32(value).unwrap_or(Duration::ZERO)
}
