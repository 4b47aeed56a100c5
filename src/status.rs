//! Assessing the current state of each district and simulating weather scenarios.
use crate::dashboard::Dashboard;
use crate::district::{DistrictConfig, DistrictID};
use crate::forecast::{
    ForecastUnavailable, TrendPoint, latest_prediction, lookup_latest_prediction, read_forecast,
    round_cases, trend_series,
};
use crate::risk::{RiskAssessment, RiskTier, classify};
use crate::weather::{SimulationResult, WeatherInputs, WeatherTerms, project};
use anyhow::{Context, Result};
use log::warn;

/// The classified forecast for an available district
#[derive(Debug, Clone, PartialEq)]
pub struct DistrictForecast {
    /// The latest prediction, rounded to whole cases
    pub cases: u64,
    /// The risk classification of `cases`
    pub assessment: RiskAssessment,
    /// Observed and predicted cases over time
    pub trend: Vec<TrendPoint>,
}

/// The status of one district, as shown on the map and in the regional list
#[derive(Debug, Clone, PartialEq)]
pub struct DistrictStatus {
    /// The district
    pub district: DistrictID,
    /// Map marker latitude
    pub latitude: f64,
    /// Map marker longitude
    pub longitude: f64,
    /// Display name of the forecasting model
    pub model_name: String,
    /// Display accuracy of the forecasting model
    pub accuracy: String,
    /// The classified forecast, or why there isn't one
    pub forecast: Result<DistrictForecast, ForecastUnavailable>,
}

/// Assess a single district against its alert threshold.
///
/// The prediction is rounded to whole cases before it is classified, so the tier always agrees
/// with the case count shown and with a simulation at the reference weather.
pub fn assess_district(district: &DistrictConfig, dashboard: &Dashboard) -> DistrictStatus {
    let forecast = read_forecast(&dashboard.forecast_path(district)).and_then(|points| {
        let cases = round_cases(latest_prediction(&points)?);
        Ok(DistrictForecast {
            cases,
            assessment: classify(cases as f64, district.alert_threshold, &dashboard.risk),
            trend: trend_series(&points),
        })
    });

    if let Err(err) = &forecast {
        warn!("Forecast unavailable for district {}: {err}", district.id);
    }

    DistrictStatus {
        district: district.id.clone(),
        latitude: district.latitude,
        longitude: district.longitude,
        model_name: district.model_name.clone(),
        accuracy: district.accuracy.clone(),
        forecast,
    }
}

/// Assess every district, in the order they are defined.
///
/// Districts whose forecast is unavailable are kept, with the reason.
pub fn assess_all(dashboard: &Dashboard) -> Vec<DistrictStatus> {
    dashboard
        .districts
        .values()
        .map(|district| assess_district(district, dashboard))
        .collect()
}

/// Headline figures across all districts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Overview {
    /// Sum of the latest predictions of available districts
    pub total_forecast_cases: u64,
    /// Number of districts in the critical tier
    pub high_risk_districts: usize,
    /// Number of districts with a forecast
    pub available: usize,
    /// Number of districts without a forecast
    pub unavailable: usize,
}

impl Overview {
    /// Summarise a set of district statuses
    pub fn from_statuses(statuses: &[DistrictStatus]) -> Self {
        statuses
            .iter()
            .fold(Self::default(), |mut overview, status| {
                match &status.forecast {
                    Ok(forecast) => {
                        overview.available += 1;
                        overview.total_forecast_cases =
                            overview.total_forecast_cases.saturating_add(forecast.cases);
                        if forecast.assessment.tier == RiskTier::Critical {
                            overview.high_risk_districts += 1;
                        }
                    }
                    Err(_) => overview.unavailable += 1,
                }
                overview
            })
    }
}

/// The outcome of a weather simulation for a district
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Simulation {
    /// The latest prediction before adjustment
    pub baseline: f64,
    /// The weather which was simulated
    pub weather: WeatherInputs,
    /// Each parameter's contribution
    pub terms: WeatherTerms,
    /// The projected case count and change
    pub result: SimulationResult,
    /// Risk classification of the projected case count
    pub assessment: RiskAssessment,
}

/// Simulate the effect of weather on a district's latest forecast
pub fn simulate_district(
    dashboard: &Dashboard,
    district_id: &DistrictID,
    weather: &WeatherInputs,
) -> Result<Simulation> {
    let district = dashboard
        .districts
        .get(district_id)
        .with_context(|| format!("Unknown district: {district_id}"))?;
    let baseline = lookup_latest_prediction(&dashboard.forecast_path(district))
        .with_context(|| format!("No baseline forecast for district {district_id}"))?;
    let result = project(baseline, weather, &dashboard.calibration);

    Ok(Simulation {
        baseline,
        weather: *weather,
        terms: dashboard.calibration.terms(weather),
        result,
        assessment: classify(
            result.adjusted_cases as f64,
            district.alert_threshold,
            &dashboard.risk,
        ),
    })
}
