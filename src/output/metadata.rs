//! `metadata.toml`: what was run, with which configuration, by which build of the program.
//!
//! Together with the input files, this is enough to reproduce the classification of a run.
use crate::dashboard::Dashboard;
use crate::district::DistrictID;
use crate::risk::RiskBreakpoints;
use crate::weather::Calibration;
use anyhow::{Context, Result};
use chrono::Local;
use platform_info::{PlatformInfo, PlatformInfoAPI, UNameAPI};
use serde::Serialize;
use std::fs;
use std::path::Path;

const METADATA_FILE_NAME: &str = "metadata.toml";

/// Build information, generated by the build script
mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

#[derive(Serialize)]
struct Metadata<'a> {
    run: RunMetadata<'a>,
    dashboard: DashboardMetadata<'a>,
    program: ProgramMetadata,
    platform: PlatformMetadata,
}

#[derive(Serialize)]
struct RunMetadata<'a> {
    /// Folder the dashboard was loaded from
    dashboard_path: &'a Path,
    /// Local start time of the run (RFC 3339)
    started: String,
}

/// The configuration every district was assessed with
#[derive(Serialize)]
struct DashboardMetadata<'a> {
    title: &'a str,
    district_count: usize,
    districts: Vec<&'a DistrictID>,
    risk: &'a RiskBreakpoints,
    calibration: &'a Calibration,
}

impl<'a> DashboardMetadata<'a> {
    fn new(dashboard: &'a Dashboard) -> Self {
        Self {
            title: &dashboard.title,
            district_count: dashboard.districts.len(),
            districts: dashboard.districts.keys().collect(),
            risk: &dashboard.risk,
            calibration: &dashboard.calibration,
        }
    }
}

#[derive(Serialize)]
struct ProgramMetadata {
    version: &'static str,
    /// Short git hash with a `-dirty` suffix for uncommitted changes, or "unknown"
    git_commit: String,
    built: &'static str,
    target: &'static str,
}

impl ProgramMetadata {
    fn current() -> Self {
        let git_commit = match (built_info::GIT_COMMIT_HASH_SHORT, built_info::GIT_DIRTY) {
            (Some(hash), Some(true)) => format!("{hash}-dirty"),
            (Some(hash), _) => hash.to_string(),
            (None, _) => "unknown".to_string(),
        };

        Self {
            version: built_info::PKG_VERSION,
            git_commit,
            built: built_info::BUILT_TIME_UTC,
            target: built_info::TARGET,
        }
    }
}

/// The operating system, blank where it can't be determined
#[derive(Serialize, Default)]
struct PlatformMetadata {
    os: String,
    release: String,
    machine: String,
}

impl PlatformMetadata {
    fn query() -> Self {
        PlatformInfo::new()
            .map(|info| Self {
                os: info.osname().to_string_lossy().into(),
                release: info.release().to_string_lossy().into(),
                machine: info.machine().to_string_lossy().into(),
            })
            .unwrap_or_default()
    }
}

/// Write `metadata.toml` for a run of `dashboard` into `output_path`
pub fn write_metadata(output_path: &Path, dashboard: &Dashboard) -> Result<()> {
    let metadata = Metadata {
        run: RunMetadata {
            dashboard_path: &dashboard.dashboard_dir,
            started: Local::now().to_rfc3339(),
        },
        dashboard: DashboardMetadata::new(dashboard),
        program: ProgramMetadata::current(),
        platform: PlatformMetadata::query(),
    };

    let file_path = output_path.join(METADATA_FILE_NAME);
    fs::write(&file_path, toml::to_string(&metadata)?)
        .with_context(|| format!("Could not write {}", file_path.display()))
}
