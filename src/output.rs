//! The module responsible for writing output data to disk.
use crate::district::DistrictID;
use crate::forecast::TrendPoint;
use crate::risk::Colour;
use crate::status::DistrictStatus;
use anyhow::{Context, Result, ensure};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

pub mod metadata;

/// The root folder in which dashboard-specific output folders will be created
const OUTPUT_DIRECTORY_ROOT: &str = "autodengue_results";

/// The output file name for district statuses
const DISTRICT_STATUS_FILE_NAME: &str = "district_status.csv";

/// The status written for districts without a forecast
const UNAVAILABLE_STATUS: &str = "UNAVAILABLE";

/// Get the default output directory for the dashboard at `dashboard_dir`
pub fn get_output_dir(dashboard_dir: &Path) -> Result<PathBuf> {
    // Canonicalise in case the user has specified "."
    let dashboard_dir = dashboard_dir
        .canonicalize()
        .context("Could not resolve path to dashboard")?;

    let dashboard_name = dashboard_dir
        .file_name()
        .context("Dashboard cannot be in root folder")?
        .to_str()
        .context("Invalid chars in dashboard dir name")?;

    Ok([OUTPUT_DIRECTORY_ROOT, dashboard_name].iter().collect())
}

/// Create a new output directory, if it doesn't already exist.
///
/// An existing, non-empty directory is only reused if `allow_overwrite` is set.
///
/// # Returns
///
/// `true` if existing output files may be overwritten, `false` otherwise.
pub fn create_output_directory(output_dir: &Path, allow_overwrite: bool) -> Result<bool> {
    if output_dir.is_dir() {
        let is_empty = output_dir.read_dir()?.next().is_none();
        if is_empty {
            return Ok(false);
        }

        ensure!(
            allow_overwrite,
            "Output folder already exists and is not empty. Use --overwrite to overwrite it."
        );

        return Ok(true);
    }

    fs::create_dir_all(output_dir)?;

    Ok(false)
}

/// Represents a row in the district status CSV file
#[derive(Serialize, Debug, PartialEq)]
struct DistrictStatusRow<'a> {
    district: &'a DistrictID,
    latitude: f64,
    longitude: f64,
    status: String,
    colour: Option<Colour>,
    predicted_cases: Option<u64>,
    model_name: &'a str,
    accuracy: &'a str,
    error: Option<String>,
}

impl<'a> DistrictStatusRow<'a> {
    fn new(status: &'a DistrictStatus) -> Self {
        let (tier, colour, predicted_cases, error) = match &status.forecast {
            Ok(forecast) => (
                forecast.assessment.tier.to_string(),
                Some(forecast.assessment.colour),
                Some(forecast.cases),
                None,
            ),
            Err(err) => (
                UNAVAILABLE_STATUS.to_string(),
                None,
                None,
                Some(err.to_string()),
            ),
        };

        Self {
            district: &status.district,
            latitude: status.latitude,
            longitude: status.longitude,
            status: tier,
            colour,
            predicted_cases,
            model_name: &status.model_name,
            accuracy: &status.accuracy,
            error,
        }
    }
}

/// The file name of the trend CSV file for a district
fn trend_file_name(district: &DistrictID) -> String {
    let slug: String = district
        .as_str()
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_lowercase()
            } else {
                '_'
            }
        })
        .collect();

    format!("trend_{slug}.csv")
}

/// Writes the outputs of a dashboard run
pub struct DataWriter {
    output_path: PathBuf,
}

impl DataWriter {
    /// Create a new writer for the given output directory
    pub fn create(output_path: &Path) -> Self {
        Self {
            output_path: output_path.to_path_buf(),
        }
    }

    /// Write the status of every district
    pub fn write_district_statuses(&self, statuses: &[DistrictStatus]) -> Result<()> {
        let file_path = self.output_path.join(DISTRICT_STATUS_FILE_NAME);
        let mut writer = csv::Writer::from_path(&file_path)?;
        for status in statuses {
            writer.serialize(DistrictStatusRow::new(status))?;
        }
        writer.flush()?;

        Ok(())
    }

    /// Write the chart series for one district
    pub fn write_trend(&self, district: &DistrictID, series: &[TrendPoint]) -> Result<()> {
        let file_path = self.output_path.join(trend_file_name(district));
        let mut writer = csv::Writer::from_path(&file_path)?;
        for point in series {
            writer.serialize(point)?;
        }
        writer.flush()?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::forecast::ForecastUnavailable;
    use crate::risk::RiskTier;
    use crate::status::DistrictForecast;
    use tempfile::tempdir;

    fn status(
        name: &str,
        forecast: Result<DistrictForecast, ForecastUnavailable>,
    ) -> DistrictStatus {
        DistrictStatus {
            district: name.into(),
            latitude: 6.9,
            longitude: 79.8,
            model_name: "XGBoost ML".into(),
            accuracy: "84.9%".into(),
            forecast,
        }
    }

    #[test]
    fn test_write_district_statuses() {
        let dir = tempdir().unwrap();
        let statuses = [
            status(
                "Colombo",
                Ok(DistrictForecast {
                    cases: 2001,
                    assessment: RiskTier::Critical.into(),
                    trend: Vec::new(),
                }),
            ),
            status("Jaffna", Err(ForecastUnavailable::Empty)),
        ];
        DataWriter::create(dir.path())
            .write_district_statuses(&statuses)
            .unwrap();

        let contents = fs::read_to_string(dir.path().join(DISTRICT_STATUS_FILE_NAME)).unwrap();
        assert_eq!(
            contents,
            "district,latitude,longitude,status,colour,predicted_cases,model_name,accuracy,error
Colombo,6.9,79.8,CRITICAL,#dc2626,2001,XGBoost ML,84.9%,
Jaffna,6.9,79.8,UNAVAILABLE,,,XGBoost ML,84.9%,Forecast contains no records
"
        );
    }

    #[test]
    fn test_write_trend() {
        let dir = tempdir().unwrap();
        let series = [TrendPoint {
            date: "2024-01-07".parse().unwrap(),
            actual: 10,
            predicted: 12,
        }];
        DataWriter::create(dir.path())
            .write_trend(&"Nuwara Eliya".into(), &series)
            .unwrap();

        let contents = fs::read_to_string(dir.path().join("trend_nuwara_eliya.csv")).unwrap();
        assert_eq!(contents, "date,actual,predicted\n2024-01-07,10,12\n");
    }

    #[test]
    fn test_create_output_directory() {
        let dir = tempdir().unwrap();
        let output_dir = dir.path().join("results");

        // New directory
        assert!(!create_output_directory(&output_dir, false).unwrap());
        assert!(output_dir.is_dir());

        // Existing empty directory
        assert!(!create_output_directory(&output_dir, false).unwrap());

        // Existing non-empty directory
        fs::write(output_dir.join("file.txt"), "").unwrap();
        assert!(create_output_directory(&output_dir, false).is_err());
        assert!(create_output_directory(&output_dir, true).unwrap());
    }

    #[test]
    fn test_get_output_dir() {
        let dir = tempdir().unwrap();
        let dashboard_dir = dir.path().join("sri_lanka");
        fs::create_dir(&dashboard_dir).unwrap();
        assert_eq!(
            get_output_dir(&dashboard_dir).unwrap(),
            PathBuf::from("autodengue_results/sri_lanka")
        );
    }
}
