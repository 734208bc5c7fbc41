use crate::error::PagemarkError;
use crate::geometry::{CoordinateMapper, NATIVE_UNITS_PER_INCH};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default ledger file name, relative to the working directory.
pub const DEFAULT_LEDGER_FILE: &str = "extracted.json";

/// Session settings. Every field has a default, so a config file only needs
/// the fields it changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Page index every document starts on.
    pub start_page: usize,
    pub ledger_path: PathBuf,
    /// Raster resolution. At 72 dpi one pixel is one native unit.
    pub dpi: f64,
    pub templates_path: Option<PathBuf>,
    /// Load the existing ledger and skip documents already recorded in it.
    pub resume: bool,
    pub raster_dir: Option<PathBuf>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        SessionConfig {
            start_page: 0,
            ledger_path: PathBuf::from(DEFAULT_LEDGER_FILE),
            dpi: NATIVE_UNITS_PER_INCH,
            templates_path: None,
            resume: false,
            raster_dir: None,
        }
    }
}

impl SessionConfig {
    pub fn mapper(&self) -> CoordinateMapper {
        CoordinateMapper::for_dpi(self.dpi)
    }

    pub fn validate(&self) -> Result<(), PagemarkError> {
        if !self.dpi.is_finite() || self.dpi <= 0.0 {
            return Err(PagemarkError::ConfigInvalid(format!(
                "dpi must be a positive number, got {}",
                self.dpi
            )));
        }
        if self.ledger_path.as_os_str().is_empty() {
            return Err(PagemarkError::ConfigInvalid(
                "ledger_path must not be empty".into(),
            ));
        }
        Ok(())
    }
}

/// Load a session config from a JSON file.
pub fn load_config(path: &Path) -> Result<SessionConfig, PagemarkError> {
    let content = std::fs::read_to_string(path).map_err(|e| PagemarkError::ConfigLoad {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    let config: SessionConfig =
        serde_json::from_str(&content).map_err(|e| PagemarkError::ConfigLoad {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
    config.validate()?;
    Ok(config)
}
