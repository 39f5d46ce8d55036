//! Danger-rating forecast documents.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

use crate::band::ElevationBand;
use crate::lenient;

/// Five-point avalanche danger scale, ordered low to extreme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", try_from = "Value")]
pub enum DangerLevel {
    Low = 1,
    Moderate = 2,
    Considerable = 3,
    High = 4,
    Extreme = 5,
}

impl DangerLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            DangerLevel::Low => "low",
            DangerLevel::Moderate => "moderate",
            DangerLevel::Considerable => "considerable",
            DangerLevel::High => "high",
            DangerLevel::Extreme => "extreme",
        }
    }

    pub fn rank(&self) -> u8 {
        *self as u8
    }

    pub fn from_rank(rank: u64) -> Option<Self> {
        match rank {
            1 => Some(DangerLevel::Low),
            2 => Some(DangerLevel::Moderate),
            3 => Some(DangerLevel::Considerable),
            4 => Some(DangerLevel::High),
            5 => Some(DangerLevel::Extreme),
            _ => None,
        }
    }

    /// Parse labels like "High", "4", or "4 - High".
    pub fn parse(label: &str) -> Option<Self> {
        let label = label.trim().to_lowercase();
        let word = label
            .trim_start_matches(|c: char| c.is_ascii_digit() || c == '-' || c.is_whitespace());
        match word {
            "low" => Some(DangerLevel::Low),
            "moderate" => Some(DangerLevel::Moderate),
            "considerable" => Some(DangerLevel::Considerable),
            "high" => Some(DangerLevel::High),
            "extreme" => Some(DangerLevel::Extreme),
            "" => label.parse().ok().and_then(Self::from_rank),
            _ => None,
        }
    }
}

impl TryFrom<Value> for DangerLevel {
    type Error = String;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        let parsed = match &value {
            Value::String(s) => DangerLevel::parse(s),
            Value::Number(n) => n.as_u64().and_then(DangerLevel::from_rank),
            _ => None,
        };
        parsed.ok_or_else(|| format!("unrecognized danger level: {}", value))
    }
}

impl fmt::Display for DangerLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Danger rating per elevation band. A band with a blank or unknown rating
/// reads as unrated.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DangerRatings {
    #[serde(default, alias = "alpine", deserialize_with = "lenient::danger_level")]
    pub above_treeline: Option<DangerLevel>,
    #[serde(default, deserialize_with = "lenient::danger_level")]
    pub treeline: Option<DangerLevel>,
    #[serde(default, alias = "below", deserialize_with = "lenient::danger_level")]
    pub below_treeline: Option<DangerLevel>,
}

impl DangerRatings {
    pub fn get(&self, band: ElevationBand) -> Option<DangerLevel> {
        match band {
            ElevationBand::AboveTreeline => self.above_treeline,
            ElevationBand::Treeline => self.treeline,
            ElevationBand::BelowTreeline => self.below_treeline,
        }
    }
}

/// An avalanche problem affecting one or more elevation bands.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AvalancheProblem {
    #[serde(rename = "type", alias = "problem_type", alias = "problemType")]
    pub problem_type: String,

    #[serde(default, deserialize_with = "lenient::string_or_number")]
    pub likelihood: Option<String>,

    #[serde(default, deserialize_with = "lenient::string_or_number")]
    pub size: Option<String>,

    #[serde(
        default,
        alias = "elevation_bands",
        alias = "elevationBands",
        deserialize_with = "lenient::band_list"
    )]
    pub elevations: Vec<ElevationBand>,
}

/// Structured danger-rating document for one region.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Forecast {
    #[serde(default, alias = "danger_ratings")]
    pub danger_ratings: DangerRatings,

    #[serde(default)]
    pub problems: Vec<AvalancheProblem>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub issued: Option<String>,

    #[serde(default, alias = "valid_until", skip_serializing_if = "Option::is_none")]
    pub valid_until: Option<String>,
}

impl Forecast {
    /// Highest rating across all bands.
    pub fn max_danger(&self) -> Option<DangerLevel> {
        ElevationBand::ALL
            .iter()
            .filter_map(|band| self.danger_ratings.get(*band))
            .max()
    }
}
