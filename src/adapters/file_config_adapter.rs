//! INI file configuration adapter.

use crate::domain::error::TradesimError;
use crate::ports::config_port::ConfigPort;
use configparser::ini::Ini;
use std::fs;
use std::path::Path;

pub struct FileConfigAdapter {
    config: Ini,
    source: String,
}

impl FileConfigAdapter {
    /// An unreadable file is an I/O error; malformed content is `ConfigParse`.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, TradesimError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)?;
        Self::parse(&content, path.display().to_string())
    }

    pub fn from_string(content: &str) -> Result<Self, TradesimError> {
        Self::parse(content, "<string>".to_string())
    }

    fn parse(content: &str, source: String) -> Result<Self, TradesimError> {
        let mut config = Ini::new();
        config
            .read(content.to_string())
            .map_err(|reason| TradesimError::ConfigParse {
                file: source.clone(),
                reason,
            })?;
        Ok(Self { config, source })
    }

    fn invalid(&self, section: &str, key: &str, reason: String) -> TradesimError {
        TradesimError::ConfigParse {
            file: self.source.clone(),
            reason: format!("[{section}] {key}: {reason}"),
        }
    }
}

impl ConfigPort for FileConfigAdapter {
    fn get_string(&self, section: &str, key: &str) -> Option<String> {
        self.config
            .get(section, key)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }

    fn get_int(&self, section: &str, key: &str) -> Result<Option<i64>, TradesimError> {
        if self.get_string(section, key).is_none() {
            return Ok(None);
        }
        self.config
            .getint(section, key)
            .map_err(|reason| self.invalid(section, key, reason))
    }

    fn get_double(&self, section: &str, key: &str) -> Result<Option<f64>, TradesimError> {
        if self.get_string(section, key).is_none() {
            return Ok(None);
        }
        self.config
            .getfloat(section, key)
            .map_err(|reason| self.invalid(section, key, reason))
    }

    fn source_name(&self) -> &str {
        &self.source
    }
}
