//! Bar source port.

use crate::domain::bar::Bar;
use crate::domain::error::TradesimError;

pub trait DataPort {
    /// Loads the full bar stream in file order. Indicator values may be
    /// absent; the run loop's validation rejects such bars.
    fn load_bars(&self) -> Result<Vec<Bar>, TradesimError>;
}
