use crate::{BreakConfig, RngState};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum BreakPhase {
    Active,
    OnBreak,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct BreakState {
    pub on_break: bool,
    pub break_started_at: u64,
    pub break_duration_ms: u64,
    pub next_break_at: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BreakTransition {
    Started { duration_ms: u64 },
    Ended { next_break_at: u64 },
}

/// Timer-driven gate that periodically pauses all actions.
///
/// Times are caller-supplied milliseconds so the state machine stays
/// deterministic under test.
#[derive(Debug, Clone)]
pub struct BreakScheduler {
    config: BreakConfig,
    state: BreakState,
}

impl BreakScheduler {
    pub fn new(config: BreakConfig, now_ms: u64, rng: &mut RngState) -> Self {
        let mut scheduler = Self {
            config,
            state: BreakState {
                on_break: false,
                break_started_at: 0,
                break_duration_ms: 0,
                next_break_at: 0,
            },
        };
        scheduler.schedule_next(now_ms, rng);
        scheduler
    }

    pub fn state(&self) -> BreakState {
        self.state
    }

    pub fn phase(&self) -> BreakPhase {
        if self.state.on_break {
            BreakPhase::OnBreak
        } else {
            BreakPhase::Active
        }
    }

    pub fn is_on_break(&self) -> bool {
        self.state.on_break
    }

    pub fn update(&mut self, now_ms: u64, rng: &mut RngState) -> Option<BreakTransition> {
        if self.state.on_break {
            let ends_at = self.state.break_started_at + self.state.break_duration_ms;
            if now_ms >= ends_at {
                self.state.on_break = false;
                self.schedule_next(now_ms, rng);
                return Some(BreakTransition::Ended {
                    next_break_at: self.state.next_break_at,
                });
            }
        } else if now_ms >= self.state.next_break_at {
            let duration_ms =
                rng.range_u64(self.config.min_duration_ms, self.config.max_duration_ms);
            self.state.on_break = true;
            self.state.break_started_at = now_ms;
            self.state.break_duration_ms = duration_ms;
            return Some(BreakTransition::Started { duration_ms });
        }
        None
    }

    /// Leaves any break in progress and starts a fresh interval.
    pub fn reset(&mut self, now_ms: u64, rng: &mut RngState) {
        self.state.on_break = false;
        self.schedule_next(now_ms, rng);
    }

    pub fn break_remaining_ms(&self, now_ms: u64) -> u64 {
        if !self.state.on_break {
            return 0;
        }
        (self.state.break_started_at + self.state.break_duration_ms).saturating_sub(now_ms)
    }

    pub fn next_break_in_ms(&self, now_ms: u64) -> u64 {
        self.state.next_break_at.saturating_sub(now_ms)
    }

    fn schedule_next(&mut self, now_ms: u64, rng: &mut RngState) {
        // max(1) keeps the next break strictly in the future
        let interval = rng
            .range_u64(self.config.min_interval_ms, self.config.max_interval_ms)
            .max(1);
        self.state.next_break_at = now_ms + interval;
    }
}
