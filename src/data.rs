//! Dataset decoding: raw JSON items into activities and markers.
//!
//! Malformed items never reach the engine. Anything without a usable id or
//! begin time is logged and skipped here, so a layout pass can assume every
//! activity it sees is well-formed.

use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDateTime};
use iced::Color;
use serde_json::Value;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::path::Path;

/// Field accessors and initial viewport dimensions for a chart.
///
/// The field names mirror the flat shape emitted by the usual producers:
/// `beginTime`/`endTime` instants, a `title` and an optional `color` per
/// item. Override them to ingest differently shaped records.
#[derive(Debug, Clone)]
pub struct ChartConfig {
    pub width: f64,
    pub height: f64,
    pub begin_field: String,
    pub end_field: String,
    pub label_field: String,
    pub color_field: String,
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            width: 800.0,
            height: 600.0,
            begin_field: "beginTime".to_string(),
            end_field: "endTime".to_string(),
            label_field: "title".to_string(),
            color_field: "color".to_string(),
        }
    }
}

/// A time interval rendered as one horizontal bar.
#[derive(Debug, Clone, PartialEq)]
pub struct Activity {
    pub id: u64,
    pub begin_ms: i64,
    /// `None` means ongoing; the bar's right edge tracks "now".
    pub end_ms: Option<i64>,
    pub label: String,
    pub color: Color,
}

impl Activity {
    pub fn effective_end(&self, now_ms: i64) -> i64 {
        self.end_ms.unwrap_or(now_ms)
    }
}

/// A point-in-time marker sharing the activity time scale.
#[derive(Debug, Clone, PartialEq)]
pub struct Marker {
    pub id: u64,
    pub at_ms: i64,
    pub label: String,
}

#[derive(Debug, Clone, Default)]
pub struct Dataset {
    pub activities: Vec<Activity>,
    pub markers: Vec<Marker>,
    /// Items dropped during decoding; surfaced in the load summary.
    pub skipped: usize,
}

pub fn load_dataset(path: &Path, config: &ChartConfig) -> Result<Dataset> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let value: Value = serde_json::from_str(&text)
        .with_context(|| format!("{} is not valid JSON", path.display()))?;
    Ok(decode_dataset(&value, config))
}

/// Decode a bare activity array or an `{"activities": [], "markers": []}`
/// envelope.
pub fn decode_dataset(value: &Value, config: &ChartConfig) -> Dataset {
    let mut dataset = Dataset::default();

    let (activity_items, marker_items) = match value {
        Value::Array(items) => (Some(items), None),
        Value::Object(map) => (
            map.get("activities").and_then(Value::as_array),
            map.get("markers").and_then(Value::as_array),
        ),
        _ => (None, None),
    };

    let Some(activity_items) = activity_items else {
        log::warn!("dataset is neither an activity array nor an envelope with one");
        return dataset;
    };

    for (index, item) in activity_items.iter().enumerate() {
        match decode_activity(item, index, config) {
            Some(activity) => dataset.activities.push(activity),
            None => dataset.skipped += 1,
        }
    }

    for (index, item) in marker_items.into_iter().flatten().enumerate() {
        match decode_marker(item, index, config) {
            Some(marker) => dataset.markers.push(marker),
            None => dataset.skipped += 1,
        }
    }

    dataset
}

fn decode_activity(item: &Value, index: usize, config: &ChartConfig) -> Option<Activity> {
    let Some(map) = item.as_object() else {
        log::warn!("activity {index} is not an object; skipping");
        return None;
    };

    let Some(id) = item_id(item) else {
        log::warn!("activity {index} has no usable id; skipping");
        return None;
    };

    let Some(begin_ms) = map.get(&config.begin_field).and_then(parse_instant) else {
        log::warn!(
            "activity {index} has a missing or unparseable {}; skipping",
            config.begin_field
        );
        return None;
    };

    let end_ms = match map.get(&config.end_field) {
        None | Some(Value::Null) => None,
        Some(raw) => match parse_instant(raw) {
            Some(ms) => Some(ms),
            None => {
                log::warn!(
                    "activity {index} has an unparseable {}; treating as ongoing",
                    config.end_field
                );
                None
            }
        },
    };

    if let Some(end_ms) = end_ms {
        if end_ms < begin_ms {
            log::warn!("activity {index} ends before it begins; skipping");
            return None;
        }
    }

    let label = map
        .get(&config.label_field)
        .and_then(Value::as_str)
        .unwrap_or("no title")
        .to_string();

    let color = map
        .get(&config.color_field)
        .and_then(Value::as_str)
        .and_then(parse_color)
        .unwrap_or_else(|| palette_color(index));

    Some(Activity { id, begin_ms, end_ms, label, color })
}

fn decode_marker(item: &Value, index: usize, config: &ChartConfig) -> Option<Marker> {
    let Some(map) = item.as_object() else {
        log::warn!("marker {index} is not an object; skipping");
        return None;
    };

    let Some(id) = item_id(item) else {
        log::warn!("marker {index} has no usable id; skipping");
        return None;
    };

    let at = map
        .get("timestamp")
        .or_else(|| map.get(&config.begin_field))
        .and_then(parse_instant);
    let Some(at_ms) = at else {
        log::warn!("marker {index} has no usable timestamp; skipping");
        return None;
    };

    let label = map
        .get(&config.label_field)
        .and_then(Value::as_str)
        .unwrap_or("")
        .to_string();

    Some(Marker { id, at_ms, label })
}

/// Stable identity for an item: an `id` (or legacy `_id`) field, numeric or
/// string. String ids are hashed into the `u64` key space.
fn item_id(item: &Value) -> Option<u64> {
    let raw = item.get("id").or_else(|| item.get("_id"))?;
    match raw {
        Value::Number(n) => n.as_u64(),
        Value::String(s) if !s.is_empty() => {
            let mut hasher = DefaultHasher::new();
            s.hash(&mut hasher);
            Some(hasher.finish())
        }
        _ => None,
    }
}

/// Parse an instant: integer epoch milliseconds, or an ISO-8601 string
/// (with or without offset and seconds).
pub fn parse_instant(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => {
            if let Ok(parsed) = DateTime::parse_from_rfc3339(s) {
                return Some(parsed.timestamp_millis());
            }
            for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M"] {
                if let Ok(naive) = NaiveDateTime::parse_from_str(s, format) {
                    return Some(naive.and_utc().timestamp_millis());
                }
            }
            None
        }
        _ => None,
    }
}

/// Parse `#rgb` / `#rrggbb` hex colors.
pub fn parse_color(s: &str) -> Option<Color> {
    let hex = s.strip_prefix('#')?;
    let (r, g, b) = match hex.len() {
        3 => {
            let digit = |i: usize| u8::from_str_radix(&hex[i..i + 1], 16).ok().map(|v| v * 17);
            (digit(0)?, digit(1)?, digit(2)?)
        }
        6 => {
            let byte = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
            (byte(0)?, byte(2)?, byte(4)?)
        }
        _ => return None,
    };
    Some(Color::from_rgb8(r, g, b))
}

/// Deterministic categorical color for items without an explicit color.
///
/// Hues start at green and step by the golden angle so nearby rows stay
/// visually distinct regardless of how many items the dataset holds.
pub fn palette_color(index: usize) -> Color {
    let hue = (120.0 + index as f32 * 137.5) % 360.0;
    color_from_hsl(hue, 0.45, 0.62)
}

pub fn color_from_hsl(hue: f32, saturation: f32, lightness: f32) -> Color {
    let c = (1.0 - (2.0 * lightness - 1.0).abs()) * saturation;
    let h = hue / 60.0;
    let x = c * (1.0 - (h % 2.0 - 1.0).abs());
    let (r, g, b) = match h as u32 {
        0 => (c, x, 0.0),
        1 => (x, c, 0.0),
        2 => (0.0, c, x),
        3 => (0.0, x, c),
        4 => (x, 0.0, c),
        _ => (c, 0.0, x),
    };
    let m = lightness - c / 2.0;
    Color::from_rgb(r + m, g + m, b + m)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn decodes_a_bare_activity_array() {
        let value = json!([
            {"id": 1, "beginTime": "2024-01-01T00:00", "endTime": "2024-01-01T02:00", "title": "build"},
            {"id": 2, "beginTime": "2024-01-01T01:00"}
        ]);
        let dataset = decode_dataset(&value, &ChartConfig::default());

        assert_eq!(dataset.skipped, 0);
        assert_eq!(dataset.activities.len(), 2);
        let first = &dataset.activities[0];
        assert_eq!(first.label, "build");
        assert_eq!(first.end_ms.unwrap() - first.begin_ms, 2 * 60 * 60 * 1000);
        assert_eq!(dataset.activities[1].end_ms, None);
        assert_eq!(dataset.activities[1].label, "no title");
    }

    #[test]
    fn envelope_carries_markers() {
        let value = json!({
            "activities": [{"id": 1, "beginTime": 1000}],
            "markers": [{"id": 7, "timestamp": 2500, "title": "deploy"}]
        });
        let dataset = decode_dataset(&value, &ChartConfig::default());
        assert_eq!(dataset.activities.len(), 1);
        assert_eq!(
            dataset.markers,
            vec![Marker { id: 7, at_ms: 2500, label: "deploy".into() }]
        );
    }

    #[test]
    fn malformed_items_are_skipped_not_fatal() {
        let value = json!([
            {"id": 1, "beginTime": "not a time"},
            {"beginTime": 1000},
            {"id": 3, "beginTime": 5000, "endTime": 1000},
            {"id": 4, "beginTime": 1000, "endTime": 2000}
        ]);
        let dataset = decode_dataset(&value, &ChartConfig::default());
        assert_eq!(dataset.skipped, 3);
        assert_eq!(dataset.activities.len(), 1);
        assert_eq!(dataset.activities[0].id, 4);
    }

    #[test]
    fn unparseable_end_degrades_to_ongoing() {
        let value = json!([{"id": 1, "beginTime": 1000, "endTime": "???"}]);
        let dataset = decode_dataset(&value, &ChartConfig::default());
        assert_eq!(dataset.activities[0].end_ms, None);
    }

    #[test]
    fn custom_field_names_are_honored() {
        let config = ChartConfig {
            begin_field: "from".into(),
            end_field: "to".into(),
            label_field: "name".into(),
            ..ChartConfig::default()
        };
        let value = json!([{"id": 1, "from": 10, "to": 20, "name": "x"}]);
        let dataset = decode_dataset(&value, &config);
        assert_eq!(dataset.activities[0].label, "x");
        assert_eq!(dataset.activities[0].end_ms, Some(20));
    }

    #[test]
    fn string_ids_hash_stably() {
        let a = item_id(&json!({"_id": "abc"})).unwrap();
        let b = item_id(&json!({"_id": "abc"})).unwrap();
        let c = item_id(&json!({"_id": "abd"})).unwrap();
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn instants_accept_numbers_and_iso_strings() {
        assert_eq!(parse_instant(&json!(1500)), Some(1500));
        assert_eq!(
            parse_instant(&json!("2024-01-01T00:00:00Z")),
            Some(1_704_067_200_000)
        );
        assert_eq!(
            parse_instant(&json!("2024-01-01T00:00")),
            Some(1_704_067_200_000)
        );
        assert_eq!(parse_instant(&json!("yesterday-ish")), None);
    }

    #[test]
    fn explicit_colors_win_over_the_palette() {
        let value = json!([{"id": 1, "beginTime": 0, "color": "#ff0000"}]);
        let dataset = decode_dataset(&value, &ChartConfig::default());
        assert_eq!(dataset.activities[0].color, Color::from_rgb8(255, 0, 0));
    }

    #[test]
    fn palette_is_deterministic_and_varied() {
        assert_eq!(palette_color(3), palette_color(3));
        assert_ne!(palette_color(0), palette_color(1));
        assert_ne!(palette_color(1), palette_color(2));
    }
}
