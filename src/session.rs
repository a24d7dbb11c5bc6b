use std::time::Instant;

use log::debug;

use crate::evaluator::{self, Highlight};

/// Lifecycle stage of a typing session
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
pub enum Phase {
    NotStarted,
    Typing,
    Finished,
}

/// Everything that can happen to a session
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    /// The input now reads this text
    Keystroke(String),
    /// Periodic clock read while typing
    Tick,
    /// Start over with a freshly picked sentence
    Reset(String),
}

/// State of one attempt at typing one sentence
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    pub phase: Phase,
    pub sentence: String,
    pub input: String,
    pub elapsed_secs: f64,
    pub started_at: Option<Instant>,
}

impl Session {
    pub fn new(sentence: impl Into<String>) -> Self {
        Self {
            phase: Phase::NotStarted,
            sentence: sentence.into(),
            input: String::new(),
            elapsed_secs: 0.0,
            started_at: None,
        }
    }

    /// Apply `event` as observed at `now` and return the next state.
    pub fn reduce(self, event: SessionEvent, now: Instant) -> Self {
        match event {
            SessionEvent::Keystroke(value) => self.on_keystroke(value, now),
            SessionEvent::Tick => self.on_tick(now),
            SessionEvent::Reset(sentence) => {
                debug!("session reset from {}", self.phase);
                Session::new(sentence)
            }
        }
    }

    fn on_keystroke(mut self, value: String, now: Instant) -> Self {
        if self.phase == Phase::Finished {
            return self;
        }

        if self.phase == Phase::NotStarted {
            debug!("first keystroke, starting timer");
            self.phase = Phase::Typing;
            self.started_at = Some(now);
        }

        self.input = value;

        if self.input == self.sentence {
            self.elapsed_secs = self.elapsed_at(now);
            self.phase = Phase::Finished;
            debug!("sentence completed in {:.2}s", self.elapsed_secs);
        }

        self
    }

    fn on_tick(mut self, now: Instant) -> Self {
        if self.phase == Phase::Typing {
            self.elapsed_secs = self.elapsed_at(now);
        }
        self
    }

    fn elapsed_at(&self, now: Instant) -> f64 {
        let secs = self
            .started_at
            .map(|start| now.saturating_duration_since(start).as_secs_f64())
            .unwrap_or(0.0);

        secs.max(self.elapsed_secs)
    }

    /// Whether the refresh timer should be running
    pub fn is_ticking(&self) -> bool {
        self.phase == Phase::Typing
    }

    pub fn has_finished(&self) -> bool {
        self.phase == Phase::Finished
    }

    pub fn highlight(&self) -> Highlight<'_> {
        evaluator::highlight(&self.sentence, &self.input)
    }

    /// Words per minute, only meaningful once finished
    pub fn speed(&self) -> f64 {
        match self.phase {
            Phase::Finished => evaluator::typing_speed(&self.sentence, self.elapsed_secs),
            _ => 0.0,
        }
    }
}
