//! Region identifiers.
//!
//! Source data tags regions inconsistently ("South_Rockies", "south rockies",
//! "south-rockies"). Every comparison goes through [`slugify_region`], and the
//! canonical stored form is lowercase words joined by underscores.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{BundleError, BundleResult};

/// Collapse case, `_`/`-` separators and whitespace runs to single spaces.
pub fn normalize_region_name(value: &str) -> String {
    value
        .to_lowercase()
        .replace(['_', '-'], " ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Canonical slug form of a region name.
pub fn slugify_region(value: &str) -> String {
    normalize_region_name(value).replace(' ', "_")
}

/// Directory names under the data root that hold cross-region data and are
/// never regions themselves.
pub const RESERVED_REGION_NAMES: [&str; 1] = ["shared"];

/// A validated, canonical region identifier.
///
/// Region keys double as directory names under the data root, so only
/// alphanumerics and underscores survive parsing, and reserved directory
/// names are refused.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RegionKey(String);

impl RegionKey {
    pub fn parse(raw: &str) -> BundleResult<Self> {
        let slug = slugify_region(raw);
        if slug.is_empty()
            || !slug.chars().all(|c| c.is_alphanumeric() || c == '_')
            || RESERVED_REGION_NAMES.contains(&slug.as_str())
        {
            return Err(BundleError::InvalidRegion(raw.to_string()));
        }
        Ok(Self(slug))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Case- and separator-insensitive comparison against a raw region tag.
    pub fn matches(&self, tag: &str) -> bool {
        slugify_region(tag) == self.0
    }
}

impl fmt::Display for RegionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for RegionKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
