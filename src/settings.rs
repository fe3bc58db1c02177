//! Persistent tool settings
//!
//! Machine paths and pack names live in a `.uvhelper.toml` next to the
//! project file so a checkout works without retyping them. Environment
//! variables override the file for the two machine-local install paths,
//! and command-line flags override both.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use log::debug;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Settings file name looked up in the project directory.
pub const SETTINGS_FILE: &str = ".uvhelper.toml";

/// Environment override for the ST software install path.
pub const ENV_ST_SOFTWARE: &str = "ARG_STSOFTWARE";

/// Environment override for the Keil pack root.
pub const ENV_KEIL_PACK: &str = "ARG_KEILPACK";

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("malformed settings file {}: {message}", .path.display())]
    Parse { path: PathBuf, message: String },
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Tool configuration shared by the staging and mirroring commands.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Root of the ST standard peripheral software distribution.
    pub st_software_dir: Option<PathBuf>,
    /// Root of the Keil pack installation.
    pub keil_pack_dir: Option<PathBuf>,
    /// Device family pack directory name under the pack root.
    pub dfp_name: String,
    /// Standard peripheral library directory name under `Libraries/`.
    pub spl_name: String,
    /// Mirror directory, resolved against the project directory when
    /// relative.
    pub stub_dir: PathBuf,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            st_software_dir: None,
            keil_pack_dir: None,
            dfp_name: "STM32F1xx_DFP".to_string(),
            spl_name: "STM32F10x_StdPeriph_Driver".to_string(),
            stub_dir: PathBuf::from("stub"),
        }
    }
}

impl Settings {
    /// Reads settings from the project directory and applies environment
    /// overrides. A missing file yields the defaults.
    pub fn load(project_dir: &Path) -> Result<Self, SettingsError> {
        let path = project_dir.join(SETTINGS_FILE);
        let mut settings = if path.is_file() {
            debug!("loading settings from {}", path.display());
            let text = fs::read_to_string(&path)?;
            toml::from_str(&text).map_err(|err| SettingsError::Parse {
                path: path.clone(),
                message: err.to_string(),
            })?
        } else {
            debug!("no {} in {}, using defaults", SETTINGS_FILE, project_dir.display());
            Self::default()
        };
        settings.apply_overrides(|name| env::var(name).ok());
        Ok(settings)
    }

    /// Resolves the stub directory against `project_dir` when relative.
    pub fn stub_dir_in(&self, project_dir: &Path) -> PathBuf {
        if self.stub_dir.is_absolute() {
            self.stub_dir.clone()
        } else {
            project_dir.join(&self.stub_dir)
        }
    }

    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(value) = lookup(ENV_ST_SOFTWARE).filter(|v| !v.is_empty()) {
            self.st_software_dir = Some(PathBuf::from(value));
        }
        if let Some(value) = lookup(ENV_KEIL_PACK).filter(|v| !v.is_empty()) {
            self.keil_pack_dir = Some(PathBuf::from(value));
        }
    }
}
