//! Headless host that plays a session with a scripted player.

use std::{cell::RefCell, rc::Rc, time::Duration};

use anyhow::{bail, Context, Result};
use glam::Vec3;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use whack_core::{Phase, TargetId};
use whack_session::{InstantiationError, SessionConfig, SessionController, TargetFactory};
use whack_system_hud::{Hud, TextSink};

/// Behaviour of the simulated player.
#[derive(Clone, Copy, Debug)]
pub(crate) struct PlayerConfig {
    /// Probability in `0.0..=1.0` that a spawned mole gets whacked.
    pub hit_rate: f64,
    /// Delay between a mole appearing and the player's click.
    pub reaction: Duration,
    /// Seed for the player's decisions.
    pub seed: u64,
}

/// Summary of a finished headless session.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Outcome {
    /// Final score reported by the session.
    pub score: u32,
    /// Moles that were materialised.
    pub spawned: usize,
    /// Clicks the player delivered.
    pub whacked: usize,
}

/// Plays one session to completion, advancing time in `frame` steps.
pub(crate) fn run_session(
    config: &SessionConfig,
    player: PlayerConfig,
    frame: Duration,
    hud: Hud,
) -> Result<Outcome> {
    if frame.is_zero() {
        bail!("frame duration must be positive");
    }

    let spawned = Rc::new(RefCell::new(Vec::new()));
    let factory = HeadlessFactory {
        spawned: Rc::clone(&spawned),
    };
    let mut session = SessionController::new(config)
        .with_factory(factory)
        .with_hud(hud);
    println!("{}", session.welcome_banner());
    session
        .start(config.duration())
        .context("failed to start session")?;

    let mut player = ScriptedPlayer::new(player);
    let mut total_spawned = 0;
    let mut now = Duration::ZERO;
    loop {
        let fresh: Vec<TargetId> = spawned.borrow_mut().drain(..).collect();
        total_spawned += fresh.len();
        player.observe(now, fresh);
        player.strike(now, &mut session);

        if session.phase() != Phase::Active {
            break;
        }
        session.tick(frame);
        now += frame;
    }

    Ok(Outcome {
        score: session.score(),
        spawned: total_spawned,
        whacked: player.whacked,
    })
}

/// Text sink that prints each distinct line to stdout.
#[derive(Debug, Default)]
pub(crate) struct ConsoleSink {
    last: Option<String>,
}

impl TextSink for ConsoleSink {
    fn set_text(&mut self, text: &str) {
        if self.last.as_deref() == Some(text) {
            return;
        }
        println!("{text}");
        self.last = Some(text.to_owned());
    }
}

#[derive(Debug)]
struct HeadlessFactory {
    spawned: Rc<RefCell<Vec<TargetId>>>,
}

impl TargetFactory for HeadlessFactory {
    fn instantiate(&mut self, target: TargetId, position: Vec3) -> Result<(), InstantiationError> {
        tracing::trace!(target = target.get(), ?position, "mole appeared");
        self.spawned.borrow_mut().push(target);
        Ok(())
    }

    fn remove(&mut self, target: TargetId) {
        tracing::trace!(target = target.get(), "mole removed");
    }
}

#[derive(Debug)]
struct ScriptedPlayer {
    hit_rate: f64,
    reaction: Duration,
    rng: ChaCha8Rng,
    pending: Vec<(Duration, TargetId)>,
    whacked: usize,
}

impl ScriptedPlayer {
    fn new(config: PlayerConfig) -> Self {
        let hit_rate = if (0.0..=1.0).contains(&config.hit_rate) {
            config.hit_rate
        } else {
            0.0
        };
        Self {
            hit_rate,
            reaction: config.reaction,
            rng: ChaCha8Rng::seed_from_u64(config.seed),
            pending: Vec::new(),
            whacked: 0,
        }
    }

    fn observe(&mut self, now: Duration, targets: Vec<TargetId>) {
        for target in targets {
            if self.rng.gen_bool(self.hit_rate) {
                self.pending.push((now + self.reaction, target));
            }
        }
    }

    fn strike(&mut self, now: Duration, session: &mut SessionController) {
        let (due, waiting): (Vec<_>, Vec<_>) =
            self.pending.drain(..).partition(|(at, _)| *at <= now);
        self.pending = waiting;

        for (_, target) in due {
            match session.activate(target) {
                Ok(()) => self.whacked += 1,
                Err(error) => {
                    tracing::warn!(target = target.get(), %error, "click was not credited");
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn player(hit_rate: f64) -> PlayerConfig {
        PlayerConfig {
            hit_rate,
            reaction: Duration::from_millis(400),
            seed: 3,
        }
    }

    #[test]
    fn perfect_player_whacks_every_mole() {
        let outcome = run_session(
            &SessionConfig::default(),
            player(1.0),
            Duration::from_millis(16),
            Hud::new(),
        )
        .expect("session runs");

        assert_eq!(outcome.spawned, 10, "immediate spawn plus one per second");
        assert_eq!(outcome.whacked, 10);
        assert_eq!(outcome.score, 10);
    }

    #[test]
    fn idle_player_scores_nothing() {
        let outcome = run_session(
            &SessionConfig::default(),
            player(0.0),
            Duration::from_millis(16),
            Hud::new(),
        )
        .expect("session runs");

        assert_eq!(outcome.score, 0);
        assert_eq!(outcome.whacked, 0);
        assert_eq!(outcome.spawned, 10);
    }

    #[test]
    fn same_seed_replays_identically() {
        let config = SessionConfig {
            seed: 42,
            ..SessionConfig::default()
        };
        let first = run_session(&config, player(0.5), Duration::from_millis(20), Hud::new())
            .expect("first run");
        let second = run_session(&config, player(0.5), Duration::from_millis(20), Hud::new())
            .expect("second run");

        assert_eq!(first, second);
        assert_eq!(first.score as usize, first.whacked);
    }

    #[test]
    fn zero_frame_is_rejected() {
        let result = run_session(
            &SessionConfig::default(),
            player(1.0),
            Duration::ZERO,
            Hud::new(),
        );
        assert!(result.is_err());
    }

    #[test]
    fn zero_duration_config_fails_to_start() {
        let config = SessionConfig {
            duration_secs: 0.0,
            ..SessionConfig::default()
        };
        let result = run_session(&config, player(1.0), Duration::from_millis(16), Hud::new());
        assert!(result.is_err());
    }
}
