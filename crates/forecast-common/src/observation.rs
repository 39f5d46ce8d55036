//! Field observations of avalanche activity.

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::band::ElevationBand;
use crate::lenient;
use crate::region::RegionKey;

/// A single observed avalanche.
///
/// Source records spell fields several ways and sometimes carry more than one
/// spelling at once, so reading goes through [`AvalancheObservation::from_map`]
/// rather than serde aliases.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AvalancheObservation {
    pub date: Option<String>,
    pub region: Option<String>,
    pub location: Option<String>,
    pub elevation_band: Option<ElevationBand>,
    pub avalanche_type: Option<String>,
    pub size: Option<String>,
    pub notes: Option<String>,
}

const BAND_KEYS: [&str; 4] = ["elevationBand", "elevation_band", "band", "elevation"];
const TYPE_KEYS: [&str; 3] = ["avalancheType", "avalanche_type", "type"];
const NOTE_KEYS: [&str; 2] = ["notes", "comments"];

/// First key in `keys` whose value reads as a non-empty scalar.
fn first_scalar(obj: &Map<String, Value>, keys: &[&str]) -> Option<String> {
    keys.iter()
        .filter_map(|key| obj.get(*key))
        .find_map(|value| lenient::value_to_string(value.clone()))
}

impl AvalancheObservation {
    /// Read an observation from a JSON object. Every field is optional and
    /// unknown keys are ignored. When several spellings of a field are
    /// present, the first one that yields a usable value wins.
    pub fn from_map(obj: &Map<String, Value>) -> Self {
        Self {
            date: first_scalar(obj, &["date"]),
            region: first_scalar(obj, &["region"]),
            location: first_scalar(obj, &["location"]),
            elevation_band: BAND_KEYS
                .iter()
                .filter_map(|key| obj.get(*key).and_then(Value::as_str))
                .find_map(ElevationBand::parse),
            avalanche_type: first_scalar(obj, &TYPE_KEYS),
            size: first_scalar(obj, &["size"]),
            notes: first_scalar(obj, &NOTE_KEYS),
        }
    }

    /// True when the record is tagged with `region`.
    pub fn is_tagged(&self, region: &RegionKey) -> bool {
        self.region.as_deref().is_some_and(|tag| region.matches(tag))
    }

    /// True when the record is untagged or tagged with `region`.
    pub fn belongs_to(&self, region: &RegionKey) -> bool {
        self.region.is_none() || self.is_tagged(region)
    }
}

impl<'de> Deserialize<'de> for AvalancheObservation {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Value::deserialize(deserializer)? {
            Value::Object(obj) => Ok(Self::from_map(&obj)),
            other => Err(D::Error::custom(format!(
                "expected an avalanche record object, found {}",
                other
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_snake_case_aliases() {
        let obs: AvalancheObservation = serde_json::from_value(json!({
            "date": "2024-02-01",
            "region": "South_Rockies",
            "elevation_band": "Alpine",
            "avalanche_type": "storm slab",
            "size": 2.5,
            "comments": "skier triggered"
        }))
        .unwrap();

        assert_eq!(obs.elevation_band, Some(ElevationBand::AboveTreeline));
        assert_eq!(obs.avalanche_type.as_deref(), Some("storm slab"));
        assert_eq!(obs.size.as_deref(), Some("2.5"));
        assert_eq!(obs.notes.as_deref(), Some("skier triggered"));
    }

    #[test]
    fn test_duplicate_spellings_keep_record() {
        let obs: Vec<AvalancheObservation> = serde_json::from_value(json!([
            {"region": "whistler", "elevation": "2100m", "elevation_band": "alpine"},
            {"region": "whistler", "type": "storm slab", "avalanche_type": "wind slab"},
            {"region": "whistler", "elevationBand": "", "band": "valley", "notes": "", "comments": "cornice"}
        ]))
        .unwrap();

        assert_eq!(obs.len(), 3);
        assert_eq!(obs[0].elevation_band, Some(ElevationBand::AboveTreeline));
        assert_eq!(obs[1].avalanche_type.as_deref(), Some("wind slab"));
        assert_eq!(obs[2].elevation_band, Some(ElevationBand::BelowTreeline));
        assert_eq!(obs[2].notes.as_deref(), Some("cornice"));
    }

    #[test]
    fn test_non_object_is_rejected() {
        assert!(serde_json::from_value::<AvalancheObservation>(json!("slide")).is_err());
    }

    #[test]
    fn test_serializes_camel_case() {
        let obs = AvalancheObservation {
            elevation_band: Some(ElevationBand::Treeline),
            avalanche_type: Some("persistent slab".into()),
            ..Default::default()
        };
        let value = serde_json::to_value(&obs).unwrap();
        assert_eq!(value["elevationBand"], "treeline");
        assert_eq!(value["avalancheType"], "persistent slab");
        assert!(value["notes"].is_null());
    }

    #[test]
    fn test_region_membership() {
        let key = RegionKey::parse("south_rockies").unwrap();
        let tagged = AvalancheObservation {
            region: Some("South Rockies".into()),
            ..Default::default()
        };
        let other = AvalancheObservation {
            region: Some("north_rockies".into()),
            ..Default::default()
        };
        let untagged = AvalancheObservation::default();

        assert!(tagged.is_tagged(&key));
        assert!(!other.belongs_to(&key));
        assert!(!untagged.is_tagged(&key));
        assert!(untagged.belongs_to(&key));
    }
}
