//! Re-entry gating per (date, direction).

use chrono::NaiveDate;
use std::collections::HashMap;

use super::config::{ReentryMode, SimulationConfig};
use super::position::Direction;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReentryState {
    pub count: u32,
    pub next_eligible: usize,
}

#[derive(Debug, Clone, Default)]
pub struct ReentryTracker {
    states: HashMap<(NaiveDate, Direction), ReentryState>,
}

impl ReentryTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decides whether a candidate may open and records the admission.
    ///
    /// The first candidate for a key always opens. Later ones are refused
    /// once the entry cap is reached, or in delayed mode while the bar index
    /// is before the next eligible bar.
    pub fn admit(
        &mut self,
        date: NaiveDate,
        direction: Direction,
        bar_index: usize,
        config: &SimulationConfig,
    ) -> bool {
        let Some(state) = self.states.get_mut(&(date, direction)) else {
            self.states.insert(
                (date, direction),
                ReentryState {
                    count: 1,
                    next_eligible: bar_index + 1,
                },
            );
            return true;
        };

        if state.count >= config.max_entries_per_key() {
            return false;
        }
        if config.reentry_mode == Some(ReentryMode::Delayed) && bar_index < state.next_eligible {
            return false;
        }

        state.count += 1;
        state.next_eligible = bar_index + config.reentry_step();
        true
    }

    pub fn state(&self, date: NaiveDate, direction: Direction) -> Option<ReentryState> {
        self.states.get(&(date, direction)).copied()
    }
}
