//! Classification of a forecast value into a risk tier.
//!
//! A district is critical once its prediction is strictly above the alert threshold, and in
//! warning once it is strictly above a fixed fraction of it. Equality always falls to the lower
//! tier.
use anyhow::{Result, ensure};
use serde::{Deserialize, Serialize};
use std::fmt;
use strum::{Display, EnumIter};

/// The default fraction of the alert threshold above which a district is in warning
const DEFAULT_WARNING_FRACTION: f64 = 0.7;

/// Discrete risk tiers, in ascending order of severity.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Display, EnumIter, Serialize,
)]
#[strum(serialize_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum RiskTier {
    /// At or below the warning breakpoint
    Normal,
    /// Above the warning breakpoint, at or below the alert threshold
    Warning,
    /// Above the alert threshold
    Critical,
}

impl RiskTier {
    /// The display colour for this tier
    pub fn colour(self) -> Colour {
        match self {
            RiskTier::Critical => Colour::rgb(220, 38, 38),
            RiskTier::Warning => Colour::rgb(249, 115, 22),
            RiskTier::Normal => Colour::rgb(34, 197, 94),
        }
    }
}

/// An RGBA colour
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Colour {
    /// Red
    pub r: u8,
    /// Green
    pub g: u8,
    /// Blue
    pub b: u8,
    /// Alpha
    pub a: u8,
}

impl Colour {
    /// An opaque colour
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }
}

impl fmt::Display for Colour {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl Serialize for Colour {
    fn serialize<S>(&self, serialiser: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serialiser.collect_str(self)
    }
}

/// The breakpoints used to classify a forecast against a district's alert threshold
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RiskBreakpoints {
    /// Fraction of the alert threshold above which a district is in warning
    #[serde(default = "default_warning_fraction")]
    pub warning_fraction: f64,
}

fn default_warning_fraction() -> f64 {
    DEFAULT_WARNING_FRACTION
}

impl Default for RiskBreakpoints {
    fn default() -> Self {
        Self {
            warning_fraction: DEFAULT_WARNING_FRACTION,
        }
    }
}

impl RiskBreakpoints {
    /// Check that the warning breakpoint lies strictly between zero and the alert threshold
    pub fn validate(&self) -> Result<()> {
        ensure!(
            self.warning_fraction > 0.0 && self.warning_fraction < 1.0,
            "warning_fraction must be between 0 and 1 (exclusive), got {}",
            self.warning_fraction
        );

        Ok(())
    }
}

/// The result of classifying a forecast
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RiskAssessment {
    /// The risk tier
    pub tier: RiskTier,
    /// The display colour for the tier
    pub colour: Colour,
}

impl From<RiskTier> for RiskAssessment {
    fn from(tier: RiskTier) -> Self {
        Self {
            tier,
            colour: tier.colour(),
        }
    }
}

/// Classify a predicted case count against a district's alert threshold.
///
/// Any value is accepted, including negative and non-finite ones. NaN is classified as normal.
///
/// # Arguments
///
/// * `predicted_cases` - The forecast value
/// * `alert_threshold` - The district's alert threshold (expected to be positive)
/// * `breakpoints` - Where the warning tier begins
pub fn classify(
    predicted_cases: f64,
    alert_threshold: f64,
    breakpoints: &RiskBreakpoints,
) -> RiskAssessment {
    let tier = if predicted_cases > alert_threshold {
        RiskTier::Critical
    } else if predicted_cases > breakpoints.warning_fraction * alert_threshold {
        RiskTier::Warning
    } else {
        RiskTier::Normal
    };

    tier.into()
}
