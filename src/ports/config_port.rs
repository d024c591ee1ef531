//! Configuration access port.

use crate::domain::error::TradesimError;

/// Section/key lookups over a configuration source.
///
/// Absent keys are `Ok(None)`; a key that is present but cannot be read as the
/// requested type is an error rather than a silent default.
pub trait ConfigPort {
    fn get_string(&self, section: &str, key: &str) -> Option<String>;
    fn get_int(&self, section: &str, key: &str) -> Result<Option<i64>, TradesimError>;
    fn get_double(&self, section: &str, key: &str) -> Result<Option<f64>, TradesimError>;

    /// Name of the source, used in error messages.
    fn source_name(&self) -> &str;
}
