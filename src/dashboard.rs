//! The dashboard configuration: districts, risk breakpoints and weather calibration.
//!
//! A dashboard is loaded once from a directory and then passed by reference to everything that
//! needs it.
use crate::district::{DistrictConfig, DistrictMap};
use crate::input::{input_err_msg, read_districts, read_toml};
use crate::risk::RiskBreakpoints;
use crate::weather::Calibration;
use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

const DASHBOARD_FILE_NAME: &str = "dashboard.toml";

/// Default dashboard title
fn default_title() -> String {
    "AutoDengue".into()
}

/// Represents the contents of the dashboard file
#[derive(Debug, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct DashboardFile {
    /// Title shown in reports
    #[serde(default = "default_title")]
    pub title: String,
    /// Where the risk tiers begin
    #[serde(default)]
    pub risk: RiskBreakpoints,
    /// Weather projector calibration
    #[serde(default)]
    pub calibration: Calibration,
}

impl DashboardFile {
    /// Read a dashboard file from the specified directory.
    ///
    /// The file is optional; defaults are used if it is absent.
    pub fn from_path(dashboard_dir: &Path) -> Result<DashboardFile> {
        let file_path = dashboard_dir.join(DASHBOARD_FILE_NAME);
        if !file_path.is_file() {
            return Ok(toml::from_str("")?);
        }

        let dashboard_file: DashboardFile = read_toml(&file_path)?;
        dashboard_file
            .risk
            .validate()
            .with_context(|| input_err_msg(&file_path))?;
        dashboard_file
            .calibration
            .validate()
            .with_context(|| input_err_msg(&file_path))?;

        Ok(dashboard_file)
    }
}

/// A fully loaded dashboard
#[derive(Debug, PartialEq)]
pub struct Dashboard {
    /// Folder the dashboard was loaded from
    pub dashboard_dir: PathBuf,
    /// Title shown in reports
    pub title: String,
    /// Monitored districts
    pub districts: DistrictMap,
    /// Where the risk tiers begin
    pub risk: RiskBreakpoints,
    /// Weather projector calibration
    pub calibration: Calibration,
}

impl Dashboard {
    /// Read a dashboard from the specified directory.
    ///
    /// # Arguments
    ///
    /// * `dashboard_dir` - Folder containing dashboard configuration files
    pub fn from_path<P: AsRef<Path>>(dashboard_dir: P) -> Result<Dashboard> {
        let dashboard_dir = dashboard_dir.as_ref();
        let dashboard_file = DashboardFile::from_path(dashboard_dir)?;
        let districts = read_districts(dashboard_dir)?;

        Ok(Dashboard {
            dashboard_dir: dashboard_dir.to_path_buf(),
            title: dashboard_file.title,
            districts,
            risk: dashboard_file.risk,
            calibration: dashboard_file.calibration,
        })
    }

    /// The full path to a district's forecast file
    pub fn forecast_path(&self, district: &DistrictConfig) -> PathBuf {
        self.dashboard_dir.join(&district.forecast_file)
    }
}
