//! Snapshot projections
//!
//! One extractor per sensor. Each reads fields out of the raw payloads and
//! falls back to a fixed default when a field is missing.

use crate::coordinator::{Snapshot, SnapshotKey};
use serde_json::{json, Map, Value};

use super::SensorValue;

/// Daily average above which productivity is "High" (4 hours)
pub const HIGH_PRODUCTIVITY_SECS: f64 = 14_400.0;

/// Daily average above which productivity is "Medium" (2 hours)
pub const MEDIUM_PRODUCTIVITY_SECS: f64 = 7_200.0;

/// Number of runner-up entries reported next to a top value
const RUNNER_UPS: usize = 4;

const UNKNOWN: &str = "Unknown";

/// Value and attributes computed for one sensor
#[derive(Debug, Clone, PartialEq)]
pub struct Projection {
    pub value: SensorValue,
    pub attributes: Map<String, Value>,
}

impl Projection {
    fn value(value: SensorValue) -> Self {
        Self {
            value,
            attributes: Map::new(),
        }
    }

    fn with(mut self, name: &str, value: Value) -> Self {
        self.attributes.insert(name.to_string(), value);
        self
    }
}

fn data_list<'a>(snapshot: &'a Snapshot, key: SnapshotKey, field: Option<&str>) -> &'a [Value] {
    let data = snapshot.data(key);
    let list = match field {
        Some(field) => data.and_then(|d| d.get(field)),
        None => data,
    };

    list.and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or_default()
}

fn seconds(value: Option<&Value>) -> f64 {
    value.and_then(Value::as_f64).unwrap_or(0.0)
}

fn top_name(items: &[Value]) -> SensorValue {
    let name = items
        .first()
        .and_then(|item| item.get("name"))
        .and_then(Value::as_str)
        .unwrap_or(UNKNOWN);

    SensorValue::Text(name.to_string())
}

fn runner_ups(items: &[Value]) -> Option<Value> {
    if items.len() <= 1 {
        return None;
    }

    let entries = items
        .iter()
        .skip(1)
        .take(RUNNER_UPS)
        .map(|item| {
            json!({
                "name": item.get("name").cloned().unwrap_or(Value::Null),
                "percent": item.get("percent").cloned().unwrap_or(Value::Null),
            })
        })
        .collect();

    Some(Value::Array(entries))
}

fn top_with_runner_ups(snapshot: &Snapshot, field: &str, attribute: &str) -> Projection {
    let items = data_list(snapshot, SnapshotKey::Stats, Some(field));
    let projection = Projection::value(top_name(items));

    match runner_ups(items) {
        Some(others) => projection.with(attribute, others),
        None => projection,
    }
}

fn top_only(snapshot: &Snapshot, field: &str) -> Projection {
    Projection::value(top_name(data_list(snapshot, SnapshotKey::Stats, Some(field))))
}

/// Coding time from the first summary day that has a grand total.
///
/// The readable text comes from the last such day, matching how the
/// summaries range (yesterday, today) has always been reported.
pub fn daily_total(snapshot: &Snapshot) -> Projection {
    let mut totals = data_list(snapshot, SnapshotKey::Summary, None)
        .iter()
        .filter_map(|day| day.get("grand_total"));

    let Some(first) = totals.next() else {
        return Projection::value(SensorValue::Integer(0));
    };
    let last = totals.last().unwrap_or(first);

    let text = last
        .get("text")
        .and_then(Value::as_str)
        .unwrap_or("0 mins")
        .to_string();

    Projection::value(SensorValue::Integer(seconds(first.get("total_seconds")) as i64))
        .with("human_readable_time", Value::String(text))
}

pub fn top_language(snapshot: &Snapshot) -> Projection {
    top_with_runner_ups(snapshot, "languages", "other_languages")
}

pub fn top_project(snapshot: &Snapshot) -> Projection {
    top_with_runner_ups(snapshot, "projects", "other_projects")
}

pub fn top_editor(snapshot: &Snapshot) -> Projection {
    top_only(snapshot, "editors")
}

pub fn top_os(snapshot: &Snapshot) -> Projection {
    top_only(snapshot, "operating_systems")
}

pub fn top_category(snapshot: &Snapshot) -> Projection {
    top_only(snapshot, "categories")
}

/// Average daily coding time over the last seven days, in whole seconds
pub fn weekly_average(snapshot: &Snapshot) -> Projection {
    let days = data_list(snapshot, SnapshotKey::Last7Days, None);
    if days.is_empty() {
        return Projection::value(SensorValue::Integer(0));
    }

    let total: f64 = days
        .iter()
        .filter_map(|day| day.get("grand_total"))
        .map(|grand_total| seconds(grand_total.get("total_seconds")))
        .sum();

    let active = days
        .iter()
        .filter(|day| seconds(day.get("grand_total").and_then(|g| g.get("total_seconds"))) > 0.0)
        .count();

    Projection::value(SensorValue::Integer((total / 7.0) as i64))
        .with(
            "human_readable_time",
            Value::String(format!("{} mins", (total / 7.0 / 60.0) as i64)),
        )
        .with("days_with_activity", json!(active))
}

/// Bucket the all-time daily average into Low / Medium / High
pub fn productivity_level(snapshot: &Snapshot) -> Projection {
    let daily_average = seconds(
        snapshot
            .data(SnapshotKey::AllTime)
            .and_then(|data| data.get("daily_average")),
    );

    let level = if daily_average == 0.0 {
        UNKNOWN
    } else if daily_average > HIGH_PRODUCTIVITY_SECS {
        "High"
    } else if daily_average > MEDIUM_PRODUCTIVITY_SECS {
        "Medium"
    } else {
        "Low"
    };

    Projection::value(SensorValue::Text(level.to_string()))
}

pub fn current_streak(snapshot: &Snapshot) -> Projection {
    let Some(all_time) = snapshot.data(SnapshotKey::AllTime) else {
        return Projection::value(SensorValue::Integer(0));
    };

    let streak = match all_time.get("current_streak") {
        Some(value) => value.as_i64().unwrap_or_else(|| seconds(Some(value)) as i64),
        None => 0,
    };

    Projection::value(SensorValue::Integer(streak))
        .with(
            "best_streak",
            all_time.get("best_streak").cloned().unwrap_or(json!(0)),
        )
        .with(
            "best_streak_range",
            all_time
                .get("best_streak_range")
                .cloned()
                .unwrap_or(json!([])),
        )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot_with(key: SnapshotKey, payload: Value) -> Snapshot {
        let mut snapshot = Snapshot::empty();
        match key {
            SnapshotKey::Summary => snapshot.summary = payload,
            SnapshotKey::Stats => snapshot.stats = payload,
            SnapshotKey::UserInfo => snapshot.user_info = payload,
            SnapshotKey::Last7Days => snapshot.last_7_days = payload,
            SnapshotKey::AllTime => snapshot.all_time = payload,
        }
        snapshot
    }

    fn days(totals: &[f64]) -> Value {
        let data: Vec<Value> = totals
            .iter()
            .map(|t| json!({ "grand_total": { "total_seconds": t } }))
            .collect();
        json!({ "data": data })
    }

    fn level(daily_average: Value) -> SensorValue {
        let snapshot = snapshot_with(
            SnapshotKey::AllTime,
            json!({ "data": { "daily_average": daily_average } }),
        );
        productivity_level(&snapshot).value
    }

    fn text(s: &str) -> SensorValue {
        SensorValue::Text(s.to_string())
    }

    #[test]
    fn test_weekly_average_truncates() {
        let snapshot = snapshot_with(
            SnapshotKey::Last7Days,
            days(&[0.0, 3600.0, 7200.0, 0.0, 0.0, 0.0, 0.0]),
        );

        let projection = weekly_average(&snapshot);
        assert_eq!(projection.value, SensorValue::Integer(1542));
        assert_eq!(projection.attributes["human_readable_time"], "25 mins");
        assert_eq!(projection.attributes["days_with_activity"], 2);
    }

    #[test]
    fn test_weekly_average_divides_by_seven_for_short_ranges() {
        let snapshot = snapshot_with(SnapshotKey::Last7Days, days(&[700.0]));
        assert_eq!(weekly_average(&snapshot).value, SensorValue::Integer(100));
    }

    #[test]
    fn test_weekly_average_defaults() {
        let projection = weekly_average(&Snapshot::empty());
        assert_eq!(projection.value, SensorValue::Integer(0));
        assert!(projection.attributes.is_empty());
    }

    #[test]
    fn test_productivity_boundaries() {
        assert_eq!(level(json!(3600)), text("Low"));
        assert_eq!(level(json!(7200)), text("Low"));
        assert_eq!(level(json!(7200.5)), text("Medium"));
        assert_eq!(level(json!(14400)), text("Medium"));
        assert_eq!(level(json!(14401)), text("High"));
    }

    #[test]
    fn test_productivity_unknown_without_average() {
        assert_eq!(level(json!(0)), text("Unknown"));
        assert_eq!(productivity_level(&Snapshot::empty()).value, text("Unknown"));
    }

    #[test]
    fn test_top_values_default_to_unknown() {
        let empty_lists = snapshot_with(
            SnapshotKey::Stats,
            json!({ "data": {
                "languages": [], "projects": [], "editors": [],
                "operating_systems": [], "categories": []
            } }),
        );

        let extractors: [fn(&Snapshot) -> Projection; 5] =
            [top_language, top_project, top_editor, top_os, top_category];

        for snapshot in [Snapshot::empty(), empty_lists] {
            for extract in extractors {
                assert_eq!(extract(&snapshot).value, text("Unknown"));
            }
        }
    }

    #[test]
    fn test_top_language_with_runner_ups() {
        let languages: Vec<Value> = ["Rust", "Python", "Go", "TOML", "YAML", "Bash"]
            .iter()
            .enumerate()
            .map(|(i, name)| json!({ "name": name, "percent": 50.0 - i as f64 * 5.0 }))
            .collect();
        let snapshot = snapshot_with(
            SnapshotKey::Stats,
            json!({ "data": { "languages": languages } }),
        );

        let projection = top_language(&snapshot);
        assert_eq!(projection.value, text("Rust"));

        let others = projection.attributes["other_languages"].as_array().unwrap();
        assert_eq!(others.len(), 4);
        assert_eq!(others[0], json!({ "name": "Python", "percent": 45.0 }));
        assert_eq!(others[3]["name"], "YAML");
    }

    #[test]
    fn test_single_project_has_no_runner_ups() {
        let snapshot = snapshot_with(
            SnapshotKey::Stats,
            json!({ "data": { "projects": [{ "name": "home", "percent": 100.0 }] } }),
        );

        let projection = top_project(&snapshot);
        assert_eq!(projection.value, text("home"));
        assert!(projection.attributes.is_empty());
    }

    #[test]
    fn test_daily_total_uses_first_grand_total() {
        let snapshot = snapshot_with(
            SnapshotKey::Summary,
            json!({ "data": [
                { "range": {} },
                { "grand_total": { "total_seconds": 5400.9, "text": "1 hr 30 mins" } },
                { "grand_total": { "total_seconds": 600, "text": "10 mins" } }
            ] }),
        );

        let projection = daily_total(&snapshot);
        assert_eq!(projection.value, SensorValue::Integer(5400));
        assert_eq!(projection.attributes["human_readable_time"], "10 mins");
    }

    #[test]
    fn test_daily_total_defaults() {
        let projection = daily_total(&Snapshot::empty());
        assert_eq!(projection.value, SensorValue::Integer(0));
        assert!(projection.attributes.is_empty());

        let no_text = snapshot_with(SnapshotKey::Summary, days(&[60.0]));
        assert_eq!(daily_total(&no_text).attributes["human_readable_time"], "0 mins");
    }

    #[test]
    fn test_current_streak() {
        let snapshot = snapshot_with(
            SnapshotKey::AllTime,
            json!({ "data": {
                "current_streak": 5,
                "best_streak": 12,
                "best_streak_range": ["2024-01-01", "2024-01-12"]
            } }),
        );

        let projection = current_streak(&snapshot);
        assert_eq!(projection.value, SensorValue::Integer(5));
        assert_eq!(projection.attributes["best_streak"], 12);
        assert_eq!(
            projection.attributes["best_streak_range"],
            json!(["2024-01-01", "2024-01-12"])
        );
    }

    #[test]
    fn test_current_streak_accepts_floats() {
        let snapshot = snapshot_with(
            SnapshotKey::AllTime,
            json!({ "data": { "current_streak": 5.0 } }),
        );
        assert_eq!(current_streak(&snapshot).value, SensorValue::Integer(5));

        let snapshot = snapshot_with(
            SnapshotKey::AllTime,
            json!({ "data": { "current_streak": 3.7 } }),
        );
        assert_eq!(current_streak(&snapshot).value, SensorValue::Integer(3));
    }

    #[test]
    fn test_current_streak_defaults() {
        let projection = current_streak(&Snapshot::empty());
        assert_eq!(projection.value, SensorValue::Integer(0));
        assert!(projection.attributes.is_empty());

        let bare = snapshot_with(SnapshotKey::AllTime, json!({ "data": {} }));
        let projection = current_streak(&bare);
        assert_eq!(projection.value, SensorValue::Integer(0));
        assert_eq!(projection.attributes["best_streak"], 0);
        assert_eq!(projection.attributes["best_streak_range"], json!([]));
    }
}
