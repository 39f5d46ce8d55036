//! Temporary data roots.

use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Builds a throwaway data root on disk.
///
/// Removed when dropped. Write helpers panic on I/O failure since they only
/// run inside tests.
///
/// ```ignore
/// let root = DataRootBuilder::new()
///     .region_json("whistler", "summary.json", &fixtures::whistler_summary());
/// let layout = DataLayout::new(root.path());
/// ```
pub struct DataRootBuilder {
    dir: TempDir,
}

impl DataRootBuilder {
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().expect("create temp data root"),
        }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Write `contents` at `relative` under the root, creating parents.
    pub fn write_text(self, relative: impl AsRef<Path>, contents: &str) -> Self {
        self.put_text(relative, contents);
        self
    }

    pub fn write_json(self, relative: impl AsRef<Path>, value: &Value) -> Self {
        self.put_json(relative, value);
        self
    }

    pub fn region_json(self, region: &str, file: &str, value: &Value) -> Self {
        self.write_json(Path::new(region).join(file), value)
    }

    pub fn region_text(self, region: &str, file: &str, contents: &str) -> Self {
        self.write_text(Path::new(region).join(file), contents)
    }

    pub fn shared_json(self, file: &str, value: &Value) -> Self {
        self.write_json(Path::new("shared").join(file), value)
    }

    pub fn shared_text(self, file: &str, contents: &str) -> Self {
        self.write_text(Path::new("shared").join(file), contents)
    }

    /// Create an empty directory under the root.
    pub fn dir(self, relative: impl AsRef<Path>) -> Self {
        fs::create_dir_all(self.dir.path().join(relative)).expect("create directory");
        self
    }

    /// Write a file without consuming the builder, e.g. to edit data between
    /// two resolutions.
    pub fn put_text(&self, relative: impl AsRef<Path>, contents: &str) -> PathBuf {
        let path = self.dir.path().join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("create parent directory");
        }
        fs::write(&path, contents).expect("write fixture file");
        path
    }

    pub fn put_json(&self, relative: impl AsRef<Path>, value: &Value) -> PathBuf {
        let text = serde_json::to_string_pretty(value).expect("serialize fixture");
        self.put_text(relative, &text)
    }
}

impl Default for DataRootBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_builder_writes_nested_files() {
        let root = DataRootBuilder::new()
            .region_json("whistler", "summary.json", &json!({"region": "whistler"}))
            .shared_text("weather_station.csv", "region,temp_c\n")
            .dir("empty_region");

        assert!(root.path().join("whistler/summary.json").is_file());
        assert!(root.path().join("shared/weather_station.csv").is_file());
        assert!(root.path().join("empty_region").is_dir());
    }

    #[test]
    fn test_put_overwrites() {
        let root = DataRootBuilder::new().write_text("a.txt", "one");
        let path = root.put_text("a.txt", "two");
        assert_eq!(fs::read_to_string(path).unwrap(), "two");
    }
}
