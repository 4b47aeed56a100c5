//! Reading district forecast files.
//!
//! Forecast files come from an external modelling pipeline, and the column names vary between
//! them. The predicted column is `predicted_cases` or `predicted`; the optional observed column is
//! `actual` or `dengue_cases`. Failures are reported as a [`ForecastUnavailable`] reason rather
//! than being replaced with a default.
use chrono::NaiveDate;
use csv::StringRecord;
use derive_more::Display;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Accepted names for the predicted column, in order of preference
const PREDICTED_COLUMNS: [&str; 2] = ["predicted_cases", "predicted"];

/// Accepted names for the observed column, in order of preference
const ACTUAL_COLUMNS: [&str; 2] = ["actual", "dengue_cases"];

/// Why a forecast value could not be obtained
#[derive(Debug, Clone, PartialEq, Display)]
pub enum ForecastUnavailable {
    /// The forecast file does not exist
    #[display("Forecast file not found: {_0}")]
    FileNotFound(String),
    /// The forecast file exists but could not be read
    #[display("Could not read forecast file {path}: {reason}")]
    Unreadable {
        /// Path to the file
        path: String,
        /// The underlying error
        reason: String,
    },
    /// No column holds predicted values
    #[display("Forecast has no predicted column (expected predicted_cases or predicted)")]
    MissingPredictedColumn,
    /// A record could not be parsed
    #[display("Malformed forecast record: {_0}")]
    Malformed(String),
    /// The forecast has no records
    #[display("Forecast contains no records")]
    Empty,
    /// The latest prediction is negative or not a finite number
    #[display("Latest prediction is not a non-negative number: {_0}")]
    InvalidValue(f64),
}

impl std::error::Error for ForecastUnavailable {}

/// Either the latest predicted case count or the reason it is unavailable
pub type ForecastLookup = Result<f64, ForecastUnavailable>;

/// One dated record of a district forecast
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ForecastPoint {
    /// The date the record applies to
    pub date: NaiveDate,
    /// Observed cases, if known
    pub actual_cases: Option<f64>,
    /// Cases predicted by the model
    pub predicted_cases: f64,
}

/// A point of the historical/predicted chart series
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendPoint {
    /// The date of the point
    pub date: NaiveDate,
    /// Observed cases, zero where unknown
    pub actual: u64,
    /// Predicted cases
    pub predicted: u64,
}

/// Round a case count to a whole number, clamping at zero.
///
/// NaN becomes zero and values too large for a `u64` saturate.
pub fn round_cases(cases: f64) -> u64 {
    cases.round().max(0.0) as u64
}

/// Drop the fractional part of a case count, clamping at zero
fn truncate_cases(cases: f64) -> u64 {
    cases.trunc().max(0.0) as u64
}

/// Rename the columns we understand to the field names of [`ForecastPoint`].
///
/// Where more than one accepted name is present, the preferred one is used and the others are
/// ignored.
fn normalise_headers(headers: &StringRecord) -> Result<StringRecord, ForecastUnavailable> {
    let find = |names: &[&str]| {
        names
            .iter()
            .find_map(|name| headers.iter().position(|header| header == *name))
    };
    let predicted =
        find(&PREDICTED_COLUMNS[..]).ok_or(ForecastUnavailable::MissingPredictedColumn)?;
    let actual = find(&ACTUAL_COLUMNS[..]);

    Ok(headers
        .iter()
        .enumerate()
        .map(|(idx, header)| {
            if idx == predicted {
                "predicted_cases"
            } else if Some(idx) == actual {
                "actual_cases"
            } else if header == "date" {
                "date"
            } else {
                // Unknown and non-preferred columns are skipped by the deserialiser
                ""
            }
        })
        .collect())
}

/// Read all records from a forecast CSV file, in file order.
///
/// Empty cells in the observed column are read as `None`.
pub fn read_forecast(file_path: &Path) -> Result<Vec<ForecastPoint>, ForecastUnavailable> {
    let path_str = || file_path.display().to_string();
    if !file_path.is_file() {
        return Err(ForecastUnavailable::FileNotFound(path_str()));
    }

    let unreadable = |err: csv::Error| ForecastUnavailable::Unreadable {
        path: path_str(),
        reason: err.to_string(),
    };
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(file_path)
        .map_err(unreadable)?;
    let headers = normalise_headers(reader.headers().map_err(unreadable)?)?;
    reader.set_headers(headers);

    reader
        .deserialize()
        .collect::<Result<Vec<ForecastPoint>, _>>()
        .map_err(|err| ForecastUnavailable::Malformed(err.to_string()))
}

/// Get the predicted value of the chronologically last record.
///
/// Ties on date go to the record which appears later.
pub fn latest_prediction(points: &[ForecastPoint]) -> ForecastLookup {
    let latest = points
        .iter()
        .max_by_key(|point| point.date)
        .ok_or(ForecastUnavailable::Empty)?;

    let value = latest.predicted_cases;
    if !value.is_finite() || value < 0.0 {
        return Err(ForecastUnavailable::InvalidValue(value));
    }

    Ok(value)
}

/// Read a forecast file and get its latest predicted value
pub fn lookup_latest_prediction(file_path: &Path) -> ForecastLookup {
    latest_prediction(&read_forecast(file_path)?)
}

/// The chart series for a forecast, sorted by date.
///
/// Values are truncated to whole cases and unknown observed values are shown as zero.
pub fn trend_series(points: &[ForecastPoint]) -> Vec<TrendPoint> {
    let mut series: Vec<_> = points
        .iter()
        .map(|point| TrendPoint {
            date: point.date,
            actual: point.actual_cases.map_or(0, truncate_cases),
            predicted: truncate_cases(point.predicted_cases),
        })
        .collect();
    series.sort_by_key(|point| point.date);

    series
}
