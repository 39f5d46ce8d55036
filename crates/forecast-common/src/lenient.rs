//! Tolerant field deserializers for inconsistently-typed source documents.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::band::ElevationBand;
use crate::forecast::DangerLevel;

pub(crate) fn value_to_string(value: Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Accept a string, number or bool; anything else becomes `None`.
pub(crate) fn string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(value_to_string(Value::deserialize(deserializer)?))
}

/// Accept any danger label or rank; blank or unrecognized values become
/// `None` so one unrated band does not void the rest of the document.
pub(crate) fn danger_level<'de, D>(deserializer: D) -> Result<Option<DangerLevel>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(DangerLevel::try_from(Value::deserialize(deserializer)?).ok())
}

/// Accept a single band label or a list of them, dropping unknown labels.
pub(crate) fn band_list<'de, D>(deserializer: D) -> Result<Vec<ElevationBand>, D::Error>
where
    D: Deserializer<'de>,
{
    let bands = match Value::deserialize(deserializer)? {
        Value::Array(items) => items
            .iter()
            .filter_map(Value::as_str)
            .filter_map(ElevationBand::parse)
            .collect(),
        Value::String(s) => ElevationBand::parse(&s).into_iter().collect(),
        _ => Vec::new(),
    };
    Ok(bands)
}
