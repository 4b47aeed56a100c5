//! Districts are the monitored regions, each with its own forecast file and alert threshold.
use crate::input::deserialise_finite;
use anyhow::{Context, Result, ensure};
use derive_more::Display;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::path::PathBuf;
use std::rc::Rc;
use unicase::UniCase;

/// The name of a district, as written in `districts.csv`
#[derive(Clone, Debug, Display, Hash, PartialEq, Eq, Deserialize, Serialize)]
pub struct DistrictID(Rc<str>);

impl DistrictID {
    /// The name as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether a user-supplied name refers to this district (case and surrounding whitespace
    /// are ignored)
    pub fn matches(&self, name: &str) -> bool {
        UniCase::new(self.as_str()) == UniCase::new(name.trim())
    }
}

impl Borrow<str> for DistrictID {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for DistrictID {
    fn from(name: &str) -> Self {
        Self(Rc::from(name))
    }
}

impl From<String> for DistrictID {
    fn from(name: String) -> Self {
        Self(Rc::from(name))
    }
}

/// A map of [`DistrictConfig`]s, keyed by district ID, in the order they were defined
pub type DistrictMap = IndexMap<DistrictID, DistrictConfig>;

/// Static configuration for a monitored district.
#[derive(Debug, Deserialize, PartialEq, Clone)]
pub struct DistrictConfig {
    /// A unique name for the district (e.g. "Colombo")
    pub id: DistrictID,
    /// Latitude of the map marker, in degrees
    #[serde(deserialize_with = "deserialise_finite")]
    pub latitude: f64,
    /// Longitude of the map marker, in degrees
    #[serde(deserialize_with = "deserialise_finite")]
    pub longitude: f64,
    /// Predicted case count above which the district is critical
    #[serde(deserialize_with = "deserialise_finite")]
    pub alert_threshold: f64,
    /// Display name of the model which produced the forecast
    pub model_name: String,
    /// Display accuracy of that model (e.g. "72.4%")
    pub accuracy: String,
    /// Forecast CSV file, relative to the dashboard directory
    pub forecast_file: PathBuf,
}

impl DistrictConfig {
    /// Check the configuration values are usable
    pub fn validate(&self) -> Result<()> {
        ensure!(
            self.alert_threshold > 0.0,
            "Alert threshold for district {} must be positive",
            self.id
        );
        ensure!(
            (-90.0..=90.0).contains(&self.latitude),
            "Latitude for district {} must be between -90 and 90",
            self.id
        );
        ensure!(
            (-180.0..=180.0).contains(&self.longitude),
            "Longitude for district {} must be between -180 and 180",
            self.id
        );

        Ok(())
    }
}

/// Look up a district by name, ignoring case
pub fn find_district<'a>(districts: &'a DistrictMap, name: &str) -> Result<&'a DistrictConfig> {
    districts
        .values()
        .find(|district| district.id.matches(name))
        .with_context(|| format!("Unknown district: {}", name.trim()))
}
