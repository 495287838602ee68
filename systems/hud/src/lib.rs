#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Heads-up display system that mirrors session events onto host text sinks.
//!
//! Both sinks are optional. Game logic never depends on them: a missing time
//! sink does not pause the countdown and a missing score sink does not stop
//! hits from counting.

use std::{fmt, time::Duration};

use whack_core::{EndReason, Event};

/// Text shown on the time display once the session ends.
pub const GAME_OVER_TEXT: &str = "Game Over!";

/// Host-provided destination for a line of display text.
pub trait TextSink {
    /// Replaces the text currently shown.
    fn set_text(&mut self, text: &str);
}

/// Formats the countdown the way the time display shows it.
#[must_use]
pub fn time_text(remaining: Duration) -> String {
    format!("Time: {}", remaining.as_secs_f64().ceil() as u64)
}

/// Formats the score the way the score display shows it.
#[must_use]
pub fn score_text(score: u32) -> String {
    format!("Score: {score}")
}

/// Routes session events to the attached display sinks.
#[derive(Default)]
pub struct Hud {
    time: Option<Box<dyn TextSink>>,
    score: Option<Box<dyn TextSink>>,
}

impl Hud {
    /// Creates a HUD without any sinks attached.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Attaches the sink that shows the countdown.
    #[must_use]
    pub fn with_time_sink(mut self, sink: impl TextSink + 'static) -> Self {
        self.time = Some(Box::new(sink));
        self
    }

    /// Attaches the sink that shows the score.
    #[must_use]
    pub fn with_score_sink(mut self, sink: impl TextSink + 'static) -> Self {
        self.score = Some(Box::new(sink));
        self
    }

    /// Logs an error for every sink the host forgot to attach.
    pub fn report_missing_sinks(&self) {
        if self.time.is_none() {
            tracing::error!("time display is not assigned, countdown will not be shown");
        }
        if self.score.is_none() {
            tracing::error!("score display is not assigned, score will not be shown");
        }
    }

    /// Consumes world events and updates the attached sinks.
    pub fn handle(&mut self, events: &[Event]) {
        for event in events {
            match event {
                Event::SessionStarted { .. } => self.show_score(&score_text(0)),
                Event::CountdownUpdated { remaining } => {
                    if let Some(sink) = self.time.as_mut() {
                        sink.set_text(&time_text(*remaining));
                    }
                }
                Event::SessionEnded {
                    reason: EndReason::Abandoned,
                    ..
                } => {}
                Event::SessionEnded { .. } => {
                    if let Some(sink) = self.time.as_mut() {
                        sink.set_text(GAME_OVER_TEXT);
                    }
                }
                Event::HitRegistered { score } => {
                    if self.score.is_none() {
                        tracing::warn!(score, "score display is missing, cannot update score");
                    }
                    self.show_score(&score_text(*score));
                }
                _ => {}
            }
        }
    }

    fn show_score(&mut self, text: &str) {
        if let Some(sink) = self.score.as_mut() {
            sink.set_text(text);
        }
    }
}

impl fmt::Debug for Hud {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Hud")
            .field("time_sink", &self.time.is_some())
            .field("score_sink", &self.score.is_some())
            .finish()
    }
}
