//! The weather impact projector.
//!
//! Adjusts a baseline forecast by a sum of independent per-parameter terms. Each term compares a
//! weather parameter with its calibration reference:
//!
//! * rainfall, humidity and wind are linear in `(value - reference)`
//! * temperature uses the absolute deviation, so heat and cold both increase cases
//!
//! Wind has a negative weight, so stronger wind never increases the estimate.
use crate::forecast::round_cases;
use anyhow::{Result, ensure};
use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;

/// The rainfall range (mm) offered by the simulator controls
pub const RAINFALL_RANGE: RangeInclusive<f64> = 0.0..=600.0;
/// The temperature range (°C) offered by the simulator controls
pub const TEMPERATURE_RANGE: RangeInclusive<f64> = 20.0..=40.0;
/// The humidity range (%) offered by the simulator controls
pub const HUMIDITY_RANGE: RangeInclusive<f64> = 40.0..=100.0;
/// The wind speed range (km/h) offered by the simulator controls
pub const WIND_RANGE: RangeInclusive<f64> = 0.0..=50.0;

/// Weather conditions to simulate
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WeatherInputs {
    /// Rainfall in mm
    pub rainfall_mm: f64,
    /// Temperature in °C
    pub temperature_c: f64,
    /// Relative humidity in %
    pub humidity_pct: f64,
    /// Wind speed in km/h
    pub wind_kph: f64,
}

impl WeatherInputs {
    /// Inputs with every parameter at its calibration reference, i.e. no adjustment
    pub fn reference(calibration: &Calibration) -> Self {
        Self {
            rainfall_mm: calibration.rainfall.reference,
            temperature_c: calibration.temperature.reference,
            humidity_pct: calibration.humidity.reference,
            wind_kph: calibration.wind.reference,
        }
    }

    /// The names of any parameters lying outside the simulator control ranges
    pub fn out_of_range(&self) -> Vec<&'static str> {
        [
            ("rainfall", self.rainfall_mm, RAINFALL_RANGE),
            ("temperature", self.temperature_c, TEMPERATURE_RANGE),
            ("humidity", self.humidity_pct, HUMIDITY_RANGE),
            ("wind", self.wind_kph, WIND_RANGE),
        ]
        .into_iter()
        .filter(|(_, value, range)| !range.contains(value))
        .map(|(name, _, _)| name)
        .collect()
    }
}

/// The reference point and weight for one weather parameter
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ParameterCalibration {
    /// The value at which the parameter has no effect
    pub reference: f64,
    /// Cases added per unit of deviation from the reference
    pub weight: f64,
}

impl ParameterCalibration {
    const fn new(reference: f64, weight: f64) -> Self {
        Self { reference, weight }
    }

    /// Signed linear term
    fn linear(&self, value: f64) -> f64 {
        (value - self.reference) * self.weight
    }

    /// Term on the absolute deviation from the reference
    fn symmetric(&self, value: f64) -> f64 {
        (value - self.reference).abs() * self.weight
    }

    fn check_finite(&self, name: &str) -> Result<()> {
        ensure!(
            self.reference.is_finite() && self.weight.is_finite(),
            "Calibration for {name} must be finite"
        );
        Ok(())
    }
}

/// Calibration constants for the projector
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Calibration {
    /// Rainfall (mm)
    pub rainfall: ParameterCalibration,
    /// Temperature (°C); weight applies to the absolute deviation
    pub temperature: ParameterCalibration,
    /// Relative humidity (%)
    pub humidity: ParameterCalibration,
    /// Wind speed (km/h); weight must be negative
    pub wind: ParameterCalibration,
}

impl Default for Calibration {
    fn default() -> Self {
        Self {
            rainfall: ParameterCalibration::new(150.0, 0.5),
            temperature: ParameterCalibration::new(29.0, 2.0),
            humidity: ParameterCalibration::new(75.0, 2.0),
            wind: ParameterCalibration::new(10.0, -1.5),
        }
    }
}

/// The contribution of each weather parameter to the projected change in cases
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WeatherTerms {
    /// Rainfall contribution
    pub rainfall: f64,
    /// Temperature contribution
    pub temperature: f64,
    /// Humidity contribution
    pub humidity: f64,
    /// Wind contribution
    pub wind: f64,
}

impl WeatherTerms {
    /// The total change in cases
    pub fn total(&self) -> f64 {
        self.rainfall + self.temperature + self.humidity + self.wind
    }
}

impl Calibration {
    /// Check the calibration keeps the direction of each effect
    pub fn validate(&self) -> Result<()> {
        self.rainfall.check_finite("rainfall")?;
        self.temperature.check_finite("temperature")?;
        self.humidity.check_finite("humidity")?;
        self.wind.check_finite("wind")?;
        ensure!(
            self.rainfall.weight >= 0.0,
            "Rainfall weight cannot be negative"
        );
        ensure!(
            self.temperature.weight >= 0.0,
            "Temperature weight cannot be negative"
        );
        ensure!(
            self.humidity.weight >= 0.0,
            "Humidity weight cannot be negative"
        );
        ensure!(self.wind.weight < 0.0, "Wind weight must be negative");

        Ok(())
    }

    /// Compute each parameter's contribution for the given weather
    pub fn terms(&self, weather: &WeatherInputs) -> WeatherTerms {
        WeatherTerms {
            rainfall: self.rainfall.linear(weather.rainfall_mm),
            temperature: self.temperature.symmetric(weather.temperature_c),
            humidity: self.humidity.linear(weather.humidity_pct),
            wind: self.wind.linear(weather.wind_kph),
        }
    }
}

/// The projected case count for some weather
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SimulationResult {
    /// Projected cases, never negative
    pub adjusted_cases: u64,
    /// Change from the rounded baseline to `adjusted_cases`
    pub delta: i64,
}

/// Project the case count for the given weather.
///
/// Total over all inputs: the estimate is clamped at zero and `delta` is measured after the clamp.
///
/// # Arguments
///
/// * `baseline` - The latest predicted case count
/// * `weather` - The weather conditions to simulate
/// * `calibration` - The projector's reference points and weights
pub fn project(
    baseline: f64,
    weather: &WeatherInputs,
    calibration: &Calibration,
) -> SimulationResult {
    let adjusted_cases = round_cases(baseline + calibration.terms(weather).total());
    let delta = i128::from(adjusted_cases) - i128::from(round_cases(baseline));

    SimulationResult {
        adjusted_cases,
        delta: i64::try_from(delta).unwrap_or(if delta < 0 { i64::MIN } else { i64::MAX }),
    }
}

/// Parse weather inputs given on the command line, filling omitted values with the references
pub fn weather_from_options(
    calibration: &Calibration,
    rainfall: Option<f64>,
    temperature: Option<f64>,
    humidity: Option<f64>,
    wind: Option<f64>,
) -> Result<WeatherInputs> {
    let reference = WeatherInputs::reference(calibration);
    let weather = WeatherInputs {
        rainfall_mm: rainfall.unwrap_or(reference.rainfall_mm),
        temperature_c: temperature.unwrap_or(reference.temperature_c),
        humidity_pct: humidity.unwrap_or(reference.humidity_pct),
        wind_kph: wind.unwrap_or(reference.wind_kph),
    };
    ensure!(
        [
            weather.rainfall_mm,
            weather.temperature_c,
            weather.humidity_pct,
            weather.wind_kph
        ]
        .iter()
        .all(|value| value.is_finite()),
        "Weather values must be finite numbers"
    );

    Ok(weather)
}

/// Describe the simulator control ranges, for help text and warnings
pub fn describe_ranges() -> String {
    let describe = |name: &str, range: &RangeInclusive<f64>, unit: &str| {
        format!("{name} {}-{} {unit}", range.start(), range.end())
    };
    [
        describe("rainfall", &RAINFALL_RANGE, "mm"),
        describe("temperature", &TEMPERATURE_RANGE, "°C"),
        describe("humidity", &HUMIDITY_RANGE, "%"),
        describe("wind", &WIND_RANGE, "km/h"),
    ]
    .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixture::assert_error;
    use rstest::{fixture, rstest};

    #[fixture]
    fn calibration() -> Calibration {
        Calibration::default()
    }

    fn weather(rain: f64, temp: f64, humidity: f64, wind: f64) -> WeatherInputs {
        WeatherInputs {
            rainfall_mm: rain,
            temperature_c: temp,
            humidity_pct: humidity,
            wind_kph: wind,
        }
    }

    #[rstest]
    fn test_project_at_reference(calibration: Calibration) {
        let result = project(300.0, &weather(150.0, 29.0, 75.0, 10.0), &calibration);
        assert_eq!(
            result,
            SimulationResult {
                adjusted_cases: 300,
                delta: 0
            }
        );
        assert_eq!(
            project(300.0, &WeatherInputs::reference(&calibration), &calibration),
            result
        );
    }

    #[rstest]
    fn test_project_extreme_clamps_at_zero(calibration: Calibration) {
        // 0 + (0-150)*0.5 + 11*2 + (40-75)*2 + (50-10)*-1.5 = -183
        let result = project(0.0, &weather(0.0, 40.0, 40.0, 50.0), &calibration);
        assert_eq!(
            result,
            SimulationResult {
                adjusted_cases: 0,
                delta: 0
            }
        );
    }

    #[rstest]
    fn test_project_delta_after_clamp(calibration: Calibration) {
        // 100 - 183 clamps to 0, so the reported change is -100
        let result = project(100.0, &weather(0.0, 40.0, 40.0, 50.0), &calibration);
        assert_eq!(result.adjusted_cases, 0);
        assert_eq!(result.delta, -100);
    }

    #[rstest]
    fn test_project_combined(calibration: Calibration) {
        // 300 + (250-150)*0.5 + |26-29|*2 + (85-75)*2 + (4-10)*-1.5 = 300 + 50 + 6 + 20 + 9
        let result = project(300.0, &weather(250.0, 26.0, 85.0, 4.0), &calibration);
        assert_eq!(
            result,
            SimulationResult {
                adjusted_cases: 385,
                delta: 85
            }
        );
    }

    #[rstest]
    #[case(1.0)]
    #[case(3.0)]
    #[case(7.5)]
    fn test_temperature_symmetric(calibration: Calibration, #[case] deviation: f64) {
        let reference = WeatherInputs::reference(&calibration);
        let hot = WeatherInputs {
            temperature_c: reference.temperature_c + deviation,
            ..reference
        };
        let cold = WeatherInputs {
            temperature_c: reference.temperature_c - deviation,
            ..reference
        };
        let hot = project(500.0, &hot, &calibration);
        assert_eq!(hot, project(500.0, &cold, &calibration));
        assert!(hot.adjusted_cases > 500);
    }

    #[rstest]
    fn test_wind_never_increases_cases(calibration: Calibration) {
        let reference = WeatherInputs::reference(&calibration);
        let mut previous = u64::MAX;
        for wind in 0..=50 {
            let inputs = WeatherInputs {
                wind_kph: f64::from(wind),
                ..reference
            };
            let result = project(200.0, &inputs, &calibration);
            assert!(result.adjusted_cases <= previous);
            previous = result.adjusted_cases;
        }
    }

    #[rstest]
    fn test_rain_and_humidity_increase_cases(calibration: Calibration) {
        let reference = WeatherInputs::reference(&calibration);
        let wetter = WeatherInputs {
            rainfall_mm: 400.0,
            ..reference
        };
        let humid = WeatherInputs {
            humidity_pct: 95.0,
            ..reference
        };
        assert!(project(200.0, &wetter, &calibration).delta > 0);
        assert!(project(200.0, &humid, &calibration).delta > 0);
    }

    #[rstest]
    fn test_project_never_negative_over_ranges(calibration: Calibration) {
        for rain in [0.0, 150.0, 600.0] {
            for temp in [20.0, 29.0, 40.0] {
                for humidity in [40.0, 75.0, 100.0] {
                    for wind in [0.0, 10.0, 50.0] {
                        let inputs = weather(rain, temp, humidity, wind);
                        let result = project(0.0, &inputs, &calibration);
                        assert!(result.delta >= 0);
                        assert_eq!(result, project(0.0, &inputs, &calibration));
                    }
                }
            }
        }
    }

    #[rstest]
    fn test_project_non_finite(calibration: Calibration) {
        let nan = project(f64::NAN, &WeatherInputs::reference(&calibration), &calibration);
        assert_eq!(nan.adjusted_cases, 0);
        let inf = project(
            100.0,
            &weather(f64::INFINITY, 29.0, 75.0, 10.0),
            &calibration,
        );
        assert_eq!(inf.adjusted_cases, u64::MAX);
    }

    #[rstest]
    fn test_out_of_range(calibration: Calibration) {
        assert!(WeatherInputs::reference(&calibration).out_of_range().is_empty());
        assert_eq!(
            weather(700.0, 29.0, 30.0, 10.0).out_of_range(),
            vec!["rainfall", "humidity"]
        );
    }

    #[rstest]
    fn test_weather_from_options(calibration: Calibration) {
        let inputs =
            weather_from_options(&calibration, Some(300.0), None, None, Some(25.0)).unwrap();
        assert_eq!(inputs, weather(300.0, 29.0, 75.0, 25.0));
        assert_error!(
            weather_from_options(&calibration, Some(f64::NAN), None, None, None),
            "Weather values must be finite numbers"
        );
    }

    #[rstest]
    fn test_calibration_validate(mut calibration: Calibration) {
        assert!(calibration.validate().is_ok());

        calibration.wind.weight = 0.5;
        assert_error!(calibration.validate(), "Wind weight must be negative");

        calibration = Calibration::default();
        calibration.rainfall.weight = -0.1;
        assert_error!(calibration.validate(), "Rainfall weight cannot be negative");

        calibration = Calibration::default();
        calibration.humidity.reference = f64::NAN;
        assert_error!(
            calibration.validate(),
            "Calibration for humidity must be finite"
        );
    }

    #[test]
    fn test_calibration_partial_toml() {
        let calibration: Calibration =
            toml::from_str("[wind]\nreference = 12.0\nweight = -2.0").unwrap();
        assert_eq!(calibration.wind, ParameterCalibration::new(12.0, -2.0));
        assert_eq!(calibration.rainfall, Calibration::default().rainfall);
    }
}
