//! Elevation bands and band-keyed collections.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// One of the three avalanche-terrain elevation zones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ElevationBand {
    AboveTreeline,
    Treeline,
    BelowTreeline,
}

/// Free-form band labels seen in source data, mapped to canonical bands.
pub const BAND_ALIASES: &[(&str, ElevationBand)] = &[
    ("above_treeline", ElevationBand::AboveTreeline),
    ("above-treeline", ElevationBand::AboveTreeline),
    ("alpine", ElevationBand::AboveTreeline),
    ("upper", ElevationBand::AboveTreeline),
    ("above", ElevationBand::AboveTreeline),
    ("treeline", ElevationBand::Treeline),
    ("mid", ElevationBand::Treeline),
    ("middle", ElevationBand::Treeline),
    ("midline", ElevationBand::Treeline),
    ("between", ElevationBand::Treeline),
    ("below_treeline", ElevationBand::BelowTreeline),
    ("below-treeline", ElevationBand::BelowTreeline),
    ("below", ElevationBand::BelowTreeline),
    ("valley", ElevationBand::BelowTreeline),
    ("lower", ElevationBand::BelowTreeline),
];

impl ElevationBand {
    /// All bands, highest first.
    pub const ALL: [ElevationBand; 3] = [
        ElevationBand::AboveTreeline,
        ElevationBand::Treeline,
        ElevationBand::BelowTreeline,
    ];

    /// Canonical key used in band-keyed JSON maps.
    pub fn as_str(&self) -> &'static str {
        match self {
            ElevationBand::AboveTreeline => "above_treeline",
            ElevationBand::Treeline => "treeline",
            ElevationBand::BelowTreeline => "below_treeline",
        }
    }

    /// Canonicalize a free-form band label (case-insensitive, spaces allowed).
    pub fn parse(label: &str) -> Option<Self> {
        let key = label.trim().to_lowercase().replace(' ', "_");
        BAND_ALIASES
            .iter()
            .find(|(alias, _)| *alias == key)
            .map(|(_, band)| *band)
    }
}

impl fmt::Display for ElevationBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A collection keyed by elevation band.
///
/// Always serializes with exactly the three canonical band keys; an empty
/// band is an empty list, never a missing key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BandMap<T> {
    #[serde(default = "Vec::new")]
    pub above_treeline: Vec<T>,
    #[serde(default = "Vec::new")]
    pub treeline: Vec<T>,
    #[serde(default = "Vec::new")]
    pub below_treeline: Vec<T>,
}

impl<T> Default for BandMap<T> {
    fn default() -> Self {
        Self {
            above_treeline: Vec::new(),
            treeline: Vec::new(),
            below_treeline: Vec::new(),
        }
    }
}

impl<T> BandMap<T> {
    pub fn get(&self, band: ElevationBand) -> &Vec<T> {
        match band {
            ElevationBand::AboveTreeline => &self.above_treeline,
            ElevationBand::Treeline => &self.treeline,
            ElevationBand::BelowTreeline => &self.below_treeline,
        }
    }

    pub fn get_mut(&mut self, band: ElevationBand) -> &mut Vec<T> {
        match band {
            ElevationBand::AboveTreeline => &mut self.above_treeline,
            ElevationBand::Treeline => &mut self.treeline,
            ElevationBand::BelowTreeline => &mut self.below_treeline,
        }
    }

    pub fn push(&mut self, band: ElevationBand, item: T) {
        self.get_mut(band).push(item);
    }

    /// Iterate bands in canonical order.
    pub fn iter(&self) -> impl Iterator<Item = (ElevationBand, &Vec<T>)> {
        ElevationBand::ALL.into_iter().map(move |band| (band, self.get(band)))
    }

    /// Mutably visit every item in every band.
    pub fn for_each_mut(&mut self, mut f: impl FnMut(&mut T)) {
        for band in ElevationBand::ALL {
            self.get_mut(band).iter_mut().for_each(&mut f);
        }
    }

    /// Total number of items across all bands.
    pub fn len(&self) -> usize {
        self.above_treeline.len() + self.treeline.len() + self.below_treeline.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Build a band map from a loosely-shaped JSON object.
    ///
    /// Keys are canonicalized through [`BAND_ALIASES`]; unknown keys are
    /// dropped. Each band value may be a list or a single item. Items that
    /// `parse` rejects are skipped.
    pub fn from_value(value: &Value, parse: impl Fn(&Value) -> Option<T>) -> Self {
        let mut map = Self::default();
        let Some(obj) = value.as_object() else {
            return map;
        };

        for (key, items) in obj {
            let Some(band) = ElevationBand::parse(key) else {
                continue;
            };
            match items {
                Value::Array(list) => {
                    for item in list {
                        if let Some(parsed) = parse(item) {
                            map.push(band, parsed);
                        }
                    }
                }
                Value::Null => {}
                single => {
                    if let Some(parsed) = parse(single) {
                        map.push(band, parsed);
                    }
                }
            }
        }
        map
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_band_aliases() {
        assert_eq!(ElevationBand::parse("Alpine"), Some(ElevationBand::AboveTreeline));
        assert_eq!(ElevationBand::parse(" mid "), Some(ElevationBand::Treeline));
        assert_eq!(ElevationBand::parse("below treeline"), Some(ElevationBand::BelowTreeline));
        assert_eq!(ElevationBand::parse("below-treeline"), Some(ElevationBand::BelowTreeline));
        assert_eq!(ElevationBand::parse("summit"), None);
    }

    #[test]
    fn test_empty_map_serializes_all_bands() {
        let map: BandMap<u32> = BandMap::default();
        let json = serde_json::to_value(&map).unwrap();
        assert_eq!(
            json,
            json!({"above_treeline": [], "treeline": [], "below_treeline": []})
        );
    }

    #[test]
    fn test_from_value_canonicalizes_keys() {
        let value = json!({
            "alpine": [1, 2],
            "treeline": 3,
            "legacy": [9],
            "valley": ["not a number", 4]
        });
        let map = BandMap::from_value(&value, |v| v.as_u64());
        assert_eq!(map.above_treeline, vec![1, 2]);
        assert_eq!(map.treeline, vec![3]);
        assert_eq!(map.below_treeline, vec![4]);
        assert_eq!(map.len(), 4);
    }

    #[test]
    fn test_from_value_non_object() {
        let map = BandMap::from_value(&json!([1, 2, 3]), |v| v.as_u64());
        assert!(map.is_empty());
    }
}
