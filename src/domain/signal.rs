//! Entry signal evaluation.
//!
//! long  = fast_avg < close && oscillator > 50
//! short = fast_avg > close && oscillator < 50
//!
//! Both may fire on the same bar; each yields an independent candidate.

use super::bar::Bar;
use super::position::Direction;

const OSCILLATOR_MIDLINE: f64 = 50.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Signals {
    pub long: bool,
    pub short: bool,
}

impl Signals {
    /// Candidate directions in evaluation order: LONG before SHORT.
    pub fn candidates(self) -> impl Iterator<Item = Direction> {
        [
            (self.long, Direction::Long),
            (self.short, Direction::Short),
        ]
        .into_iter()
        .filter_map(|(fired, direction)| fired.then_some(direction))
    }
}

/// A bar missing either indicator produces no signal.
pub fn evaluate(bar: &Bar) -> Signals {
    let (Some(fast_avg), Some(oscillator)) = (bar.fast_avg, bar.oscillator) else {
        return Signals::default();
    };
    Signals {
        long: fast_avg < bar.close && oscillator > OSCILLATOR_MIDLINE,
        short: fast_avg > bar.close && oscillator < OSCILLATOR_MIDLINE,
    }
}
