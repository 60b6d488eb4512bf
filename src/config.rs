use crate::util;
use qu::ick_use::*;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

/// Where the config file is looked for when none is given.
pub const DEFAULT_CONFIG_PATH: &str = "vte-tabulator.toml";

/// Settings shared by the binaries, read from a toml file.
///
/// Every field has a default, and a missing file gives the defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// The booking export to read.
    pub data_path: PathBuf,
    /// Use the built-in sample when `data_path` doesn't exist.
    pub fallback_to_sample: bool,
    /// Where exports are written.
    pub export_dir: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            data_path: PathBuf::from("data/vte_booking.csv"),
            fallback_to_sample: true,
            export_dir: PathBuf::from("data/output"),
        }
    }
}

impl Config {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        fn inner(path: &Path) -> Result<Config> {
            if !util::path_exists(path)? {
                event!(
                    Level::DEBUG,
                    "no config at \"{}\", using defaults",
                    path.display()
                );
                return Ok(Config::default());
            }
            let text = fs::read_to_string(path)?;
            Config::from_toml(&text)
        }
        let path = path.as_ref();
        inner(path).with_context(|| format!("loading config from \"{}\"", path.display()))
    }

    pub fn from_toml(text: &str) -> Result<Self> {
        toml::from_str(text).map_err(Error::from)
    }

    /// Save the config, e.g. to give users a file to edit.
    pub fn save(&self, path: impl AsRef<Path>, overwrite: bool) -> Result {
        let path = path.as_ref();
        ensure!(
            overwrite || !util::path_exists(path)?,
            "file already exists"
        );
        let text = toml::to_string_pretty(self).context("serializing config")?;
        fs::write(path, text).with_context(|| format!("saving config to \"{}\"", path.display()))
    }

    /// Apply command line overrides.
    pub fn with_overrides(mut self, data_path: Option<PathBuf>, no_fallback: bool) -> Self {
        if let Some(data_path) = data_path {
            self.data_path = data_path;
        }
        if no_fallback {
            self.fallback_to_sample = false;
        }
        self
    }
}
