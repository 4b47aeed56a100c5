//! Fixtures for tests
use crate::dashboard::Dashboard;
use crate::district::{DistrictConfig, DistrictMap};
use crate::risk::RiskBreakpoints;
use crate::weather::Calibration;
use rstest::fixture;
use std::fs;
use tempfile::{TempDir, tempdir};

/// Assert that an error with the given message occurs
macro_rules! assert_error {
    ($result:expr, $msg:expr) => {
        assert_eq!(
            $result.unwrap_err().chain().next().unwrap().to_string(),
            $msg
        );
    };
}
pub(crate) use assert_error;

fn district(id: &str, latitude: f64, longitude: f64, alert_threshold: f64) -> DistrictConfig {
    DistrictConfig {
        id: id.into(),
        latitude,
        longitude,
        alert_threshold,
        model_name: "Test Model".into(),
        accuracy: "50.0%".into(),
        forecast_file: format!("{}.csv", id.to_lowercase()).into(),
    }
}

#[fixture]
pub fn districts() -> DistrictMap {
    [
        district("Colombo", 6.9271, 79.8612, 2000.0),
        district("Katugastota", 7.3256, 80.6211, 300.0),
        district("Ratnapura", 6.6828, 80.399, 400.0),
        district("Jaffna", 9.6615, 80.0255, 250.0),
    ]
    .into_iter()
    .map(|district| (district.id.clone(), district))
    .collect()
}

/// A dashboard in a temporary directory.
///
/// Colombo is critical, Katugastota is exactly at its threshold and Ratnapura is normal. Jaffna
/// has no forecast file.
#[fixture]
pub fn dashboard(districts: DistrictMap) -> (TempDir, Dashboard) {
    let dir = tempdir().unwrap();
    let forecasts = [
        (
            "colombo.csv",
            "date,dengue_cases,predicted_cases\n2024-01-07,1800,1750.2\n2024-01-14,,2000.6\n",
        ),
        (
            "katugastota.csv",
            "date,actual,predicted\n2024-01-07,280,290\n2024-01-14,,300\n",
        ),
        ("ratnapura.csv", "date,predicted\n2024-01-14,150.3\n"),
    ];
    for (file_name, contents) in forecasts {
        fs::write(dir.path().join(file_name), contents).unwrap();
    }

    let dashboard = Dashboard {
        dashboard_dir: dir.path().to_path_buf(),
        title: "Test".into(),
        districts,
        risk: RiskBreakpoints::default(),
        calibration: Calibration::default(),
    };

    (dir, dashboard)
}
