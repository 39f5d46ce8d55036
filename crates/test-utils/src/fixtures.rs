//! Common test fixtures for avalanche dashboard tests.
//!
//! Documents mirror what the publishing pipeline writes for a region, with
//! small enough payloads to assert on directly.

use serde_json::{json, Value};

/// Danger ratings used by the `whistler` scenario.
pub fn whistler_ratings() -> Value {
    json!({
        "above_treeline": "high",
        "treeline": "considerable",
        "below_treeline": "moderate"
    })
}

/// Structured summary for `whistler` with no companion timeseries.
pub fn whistler_summary() -> Value {
    json!({
        "region": "whistler",
        "run_time_utc": "2024-01-15T12:00:00Z",
        "version": "202401151200",
        "tiles_base": "https://tile.openstreetmap.org/",
        "forecast": {
            "dangerRatings": whistler_ratings(),
            "problems": [
                {
                    "type": "wind slab",
                    "likelihood": "likely",
                    "size": "2",
                    "elevations": ["above_treeline", "treeline"]
                }
            ],
            "summary": "Fresh wind slabs on lee slopes.",
            "issued": "2024-01-15T06:00:00Z"
        },
        "avalanches": [
            {
                "date": "2024-01-14",
                "location": "Spanky's Ladder",
                "elevationBand": "above_treeline",
                "avalancheType": "wind slab",
                "size": "2",
                "notes": "Skier triggered"
            }
        ],
        "stations": {
            "treeline": [
                {
                    "id": "WHI",
                    "columns": ["station_id", "obs_time", "temp_c"],
                    "rows": [{"station_id": "WHI", "obs_time": "2024-01-15T11:00:00Z", "temp_c": -6.5}]
                }
            ]
        },
        "model": {
            "above_treeline": [
                {
                    "columns": ["valid_date", "TMP mean"],
                    "rows": [{"valid_date": "2024-01-15T12:00:00Z", "TMP mean": -12.25}],
                    "metadata": {"variable": "TMP", "level": "700 mb"}
                }
            ]
        }
    })
}

/// Structured timeseries for `whistler`.
pub fn whistler_timeseries() -> Value {
    json!({
        "region": "whistler",
        "generated_at": "2024-01-15T12:05:00Z",
        "stations": {
            "treeline": [
                {
                    "station_id": "WHI",
                    "station_name": "Whistler Roundhouse",
                    "x": ["2024-01-15T10:00:00Z", "2024-01-15T11:00:00Z"],
                    "series": [{"name": "temp_c", "values": [-7.0, -6.5], "yAxis": "y"}]
                }
            ]
        },
        "model": {
            "above_treeline": [
                {
                    "variable": "TMP",
                    "level": "700 mb",
                    "x": ["2024-01-15T12:00:00Z"],
                    "series": [{"name": "TMP mean", "values": [-12.25], "yAxis": "y"}]
                }
            ]
        }
    })
}

/// Older single-file bundle for `whistler`.
pub fn legacy_bundle() -> Value {
    json!({
        "region": "whistler",
        "run_time_utc": "2023-12-01T00:00:00Z",
        "version": "legacy-1",
        "forecast": {
            "dangerRatings": {
                "above_treeline": "low",
                "treeline": "low",
                "below_treeline": "low"
            }
        },
        "timeseries": {
            "x": ["2023-12-01T00:00:00Z", "2023-12-01T06:00:00Z"],
            "series": [{"name": "TMP", "values": [-3.0]}]
        },
        "model_table": {
            "columns": ["time", "TMP"],
            "rows": [{"time": "2023-12-01T00:00:00Z", "TMP": -3.0}],
            "elevation_band": "alpine"
        },
        "weather_station": [
            {"station": "WHI", "temp_c": -2.0, "elevation_band": "treeline"},
            {"station": "PEM", "temp_c": 1.5, "elevation_band": "valley"}
        ]
    })
}

/// Shared observation file with records for two regions plus an untagged
/// one that belongs to neither.
pub fn shared_avalanches() -> Value {
    json!([
        {"date": "2024-01-10", "region": "South_Rockies", "location": "Crowsnest", "size": 2},
        {"date": "2024-01-11", "region": "south rockies", "location": "Flathead", "size": 1.5},
        {"date": "2024-01-12", "region": "South Rockies", "location": "Fernie", "size": 3},
        {"date": "2024-01-12", "region": "north_rockies", "location": "Pine Pass", "size": 2},
        {"date": "2024-01-13", "location": "Unknown", "size": 1}
    ])
}

/// Per-region observation file for `south_rockies`, wrapped in `items`.
pub fn regional_avalanches() -> Value {
    json!({
        "items": [
            {"date": "2024-01-14", "location": "Island Lake", "elevation_band": "treeline", "size": 2}
        ]
    })
}

/// Shared station CSV with a region column.
pub const SHARED_STATIONS_CSV: &str = "\
region,station_id,station_name,elevation_band,obs_time,temp_c,hs_cm
South_Rockies,FER,Fernie Upper,alpine,2024-01-15T11:00:00Z,-9.5,185
south rockies,FLT,Flathead,below treeline,2024-01-15T11:00:00Z,-3.0,
North_Rockies,PIN,Pine Pass,treeline,2024-01-15T11:00:00Z,-15.0,140
";

/// Per-region station CSV without a region column.
pub const REGION_STATIONS_CSV: &str = "\
station_id,station_name,obs_time,temp_c
WHI,Whistler Roundhouse,2024-01-15T11:00:00Z,-6.5

BLK,Blackcomb Base,2024-01-15T11:00:00Z
";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixture_shapes() {
        assert!(whistler_summary()["forecast"]["dangerRatings"].is_object());
        assert_eq!(shared_avalanches().as_array().map(Vec::len), Some(5));
        assert!(SHARED_STATIONS_CSV.starts_with("region,"));
    }
}
