//! INI settings file adapter.

use crate::domain::error::ScanEqError;
use crate::ports::config_port::ConfigPort;
use configparser::ini::Ini;
use std::path::Path;

/// Settings parsed by `configparser`. Section and key names are
/// case-insensitive; values keep their case.
pub struct FileConfigAdapter {
    ini: Ini,
}

impl Default for FileConfigAdapter {
    fn default() -> Self {
        Self { ini: Ini::new() }
    }
}

impl FileConfigAdapter {
    pub fn from_file(path: &Path) -> Result<Self, ScanEqError> {
        let mut ini = Ini::new();
        ini.load(path).map_err(|reason| ScanEqError::ConfigParse {
            file: path.display().to_string(),
            reason,
        })?;
        Ok(Self { ini })
    }

    pub fn from_string(content: &str) -> Result<Self, ScanEqError> {
        let mut ini = Ini::new();
        ini.read(content.to_string())
            .map_err(|reason| ScanEqError::ConfigParse {
                file: "<inline>".into(),
                reason,
            })?;
        Ok(Self { ini })
    }

    /// Every `(section, key)` present, sorted.
    pub fn keys(&self) -> Vec<(String, String)> {
        let mut keys: Vec<(String, String)> = self
            .ini
            .get_map_ref()
            .iter()
            .flat_map(|(section, entries)| {
                entries
                    .keys()
                    .map(move |key| (section.clone(), key.clone()))
            })
            .collect();
        keys.sort();
        keys
    }
}

impl ConfigPort for FileConfigAdapter {
    fn get_string(&self, section: &str, key: &str) -> Option<String> {
        self.ini.get(section, key)
    }
}
