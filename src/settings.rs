//! Program-wide settings, read from `settings.toml` in the user's config folder.
//!
//! These apply to every dashboard. Per-dashboard options live in `dashboard.toml` instead.
use crate::get_autodengue_config_dir;
use crate::input::read_toml;
use crate::log::LogLevel;
use anyhow::{Context, Result};
use documented::DocumentedFields;
use serde::{Deserialize, Serialize};
use std::fmt::Write;
use std::path::{Path, PathBuf};

const SETTINGS_FILE_NAME: &str = "settings.toml";

/// Where the settings file is read from
pub fn get_settings_file_path() -> PathBuf {
    get_autodengue_config_dir().join(SETTINGS_FILE_NAME)
}

/// Settings shared by every dashboard run
#[derive(Debug, Default, DocumentedFields, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    /// How much to report (off, error, warn, info, debug or trace)
    pub log_level: LogLevel,
    /// Whether `run` may replace the contents of an existing output folder
    pub overwrite: bool,
}

impl Settings {
    /// Read the user's settings, or the defaults if they have no settings file
    pub fn load() -> Result<Settings> {
        Self::load_from_path(&get_settings_file_path())
    }

    fn load_from_path(file_path: &Path) -> Result<Settings> {
        if file_path.is_file() {
            read_toml(file_path)
        } else {
            Ok(Settings::default())
        }
    }

    /// A settings file with every option commented out at its default, each preceded by its
    /// description
    pub fn default_file_contents() -> Result<String> {
        let defaults: toml::Table = toml::from_str(&toml::to_string(&Settings::default())?)?;

        let mut contents = String::from(
            "# AutoDengue program settings\n# Remove the leading '# ' from a line to change it\n",
        );
        for (field, value) in &defaults {
            let docs = Settings::get_field_docs(field)
                .ok()
                .with_context(|| format!("No description for setting {field}"))?;
            writeln!(contents, "\n# # {docs}\n# {field} = {value}")?;
        }

        Ok(contents)
    }
}
