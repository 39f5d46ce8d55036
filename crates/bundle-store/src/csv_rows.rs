//! Header-keyed CSV parsing for weather-station exports.

use serde_json::{Number, Value};

use forecast_common::{BundleError, BundleResult, RegionKey, Row};

/// Column that tags rows in cross-region files.
pub const REGION_COLUMN: &str = "region";

/// Parsed CSV: header order plus one sparse object per data row.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CsvRows {
    pub headers: Vec<String>,
    pub rows: Vec<Row>,
}

impl CsvRows {
    pub fn has_column(&self, name: &str) -> bool {
        self.headers.iter().any(|h| h == name)
    }

    /// Keep rows whose region cell names `region`.
    ///
    /// With `allow_untagged`, rows with no region cell are kept too.
    pub fn retain_region(&mut self, region: &RegionKey, allow_untagged: bool) {
        self.rows.retain(|row| match row.get(REGION_COLUMN) {
            Some(Value::String(tag)) => region.matches(tag),
            Some(Value::Number(n)) => region.matches(&n.to_string()),
            _ => allow_untagged,
        });
    }
}

/// Typed cell value: number when it parses as a finite number, null when
/// empty, string otherwise.
pub fn cell_value(field: &str) -> Value {
    let field = field.trim();
    if field.is_empty() {
        return Value::Null;
    }
    if let Ok(i) = field.parse::<i64>() {
        return Value::Number(i.into());
    }
    match field.parse::<f64>().ok().and_then(Number::from_f64) {
        Some(n) => Value::Number(n),
        None => Value::String(field.to_string()),
    }
}

/// Parse CSV text whose first row is the header. Blank lines are skipped and
/// short rows leave their trailing cells absent.
pub fn parse_csv(text: &str) -> BundleResult<CsvRows> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(text.as_bytes());

    let headers: Vec<String> = rdr
        .headers()
        .map_err(|e| BundleError::Parse(format!("CSV header: {}", e)))?
        .iter()
        .map(|h| h.trim_start_matches('\u{feff}').trim().to_string())
        .collect();

    let mut rows = Vec::new();
    for record in rdr.records() {
        let record = record.map_err(|e| BundleError::Parse(format!("CSV record: {}", e)))?;
        if record.iter().all(|field| field.trim().is_empty()) {
            continue;
        }

        let row: Row = headers
            .iter()
            .zip(record.iter())
            .filter(|(header, _)| !header.is_empty())
            .map(|(header, field)| (header.clone(), cell_value(field)))
            .collect();
        rows.push(row);
    }

    Ok(CsvRows { headers, rows })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_cell_values() {
        assert_eq!(cell_value("12"), json!(12));
        assert_eq!(cell_value(" -3.5 "), json!(-3.5));
        assert_eq!(cell_value(""), Value::Null);
        assert_eq!(cell_value("NaN"), json!("NaN"));
        assert_eq!(cell_value("Whistler Peak"), json!("Whistler Peak"));
    }

    #[test]
    fn test_parse_skips_blank_lines_and_tolerates_short_rows() {
        let text = "station_id,temp_c,hs_cm\nWHI,-4.5,210\n\n   \nBLK,-2\n";
        let parsed = parse_csv(text).unwrap();

        assert_eq!(parsed.headers, vec!["station_id", "temp_c", "hs_cm"]);
        assert_eq!(parsed.rows.len(), 2);
        assert_eq!(parsed.rows[0]["hs_cm"], json!(210));
        assert!(parsed.rows[1].get("hs_cm").is_none());
    }

    #[test]
    fn test_parse_strips_bom() {
        let parsed = parse_csv("\u{feff}region,temp_c\nwhistler,1\n").unwrap();
        assert!(parsed.has_column("region"));
    }

    #[test]
    fn test_retain_region() {
        let text = "region,temp_c\nWhistler,1\nsouth rockies,2\n,3\n";
        let key = RegionKey::parse("south_rockies").unwrap();

        let mut strict = parse_csv(text).unwrap();
        strict.retain_region(&key, false);
        assert_eq!(strict.rows.len(), 1);

        let mut lenient = parse_csv(text).unwrap();
        lenient.retain_region(&key, true);
        assert_eq!(lenient.rows.len(), 2);
    }
}
