//! Common functionality for AutoDengue.
//!
//! The library classifies district dengue forecasts into risk tiers and projects how weather
//! conditions would move a forecast. The `autodengue` binary wraps it in a command-line program.
#![warn(missing_docs)]
use std::path::PathBuf;

pub mod cli;
pub mod dashboard;
pub mod district;
pub mod forecast;
pub mod input;
pub mod log;
pub mod output;
pub mod risk;
pub mod settings;
pub mod status;
pub mod weather;

#[cfg(test)]
mod fixture;

/// Get config dir for program.
///
/// Falls back on the current directory if the platform has no config dir.
pub fn get_autodengue_config_dir() -> PathBuf {
    let Some(mut config_dir) = dirs::config_dir() else {
        return PathBuf::new();
    };
    config_dir.push("autodengue");

    config_dir
}
