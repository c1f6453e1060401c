//! Project settings read from `l10n.toml`.
//!
//! ```toml
//! res_dir = "app/src/main/res"
//! source_dir = "app/src"
//! reference_variant = "en-rUS"
//!
//! [check]
//! near_threshold = 2
//!
//! [check.exemptions]
//! terms = ["WebView", "Android"]
//! id_prefixes = ["agent_"]
//! ids = ["jsoup"]
//! max_exempt_length = 3
//! ```
//!
//! Every key is optional. Command-line flags override what the file says.

use std::{
    fs,
    path::{Path, PathBuf},
};

use droidl10n::{CheckMode, CheckOptions, Exemptions};
use serde::{Deserialize, Serialize};

pub const DEFAULT_CONFIG_FILE: &str = "l10n.toml";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub res_dir: PathBuf,
    pub source_dir: PathBuf,
    pub reference_variant: String,
    pub check: CheckConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            res_dir: PathBuf::from("app/src/main/res"),
            source_dir: PathBuf::from("app/src"),
            reference_variant: "en-rUS".to_string(),
            check: CheckConfig::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CheckConfig {
    pub near_threshold: usize,
    pub exemptions: Exemptions,
}

impl Default for CheckConfig {
    fn default() -> Self {
        Self {
            near_threshold: CheckOptions::default().near_threshold,
            exemptions: Exemptions::default(),
        }
    }
}

impl Config {
    pub fn from_toml_str(data: &str) -> Result<Self, String> {
        toml::from_str(data).map_err(|e| format!("toml parse error: {}", e))
    }

    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self, String> {
        let path = path.as_ref();
        let data = fs::read_to_string(path)
            .map_err(|e| format!("Cannot read config file {}: {}", path.display(), e))?;
        Self::from_toml_str(&data).map_err(|e| format!("{}: {}", path.display(), e))
    }

    /// Loads `explicit` when given, else `l10n.toml` from the working directory when it
    /// exists, else the defaults.
    pub fn load(explicit: Option<&Path>) -> Result<Self, String> {
        match explicit {
            Some(path) => Self::load_from_file(path),
            None if Path::new(DEFAULT_CONFIG_FILE).is_file() => {
                tracing::debug!("using {}", DEFAULT_CONFIG_FILE);
                Self::load_from_file(DEFAULT_CONFIG_FILE)
            }
            None => Ok(Self::default()),
        }
    }

    pub fn check_options(&self, mode: CheckMode, near: Option<usize>) -> CheckOptions {
        CheckOptions {
            mode,
            near_threshold: near.unwrap_or(self.check.near_threshold),
            exemptions: self.check.exemptions.clone(),
        }
    }
}
