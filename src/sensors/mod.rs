//! Sensor Views
//!
//! Nine read-only sensors derived from the current snapshot. Nothing is
//! cached: every read projects the values again from whichever snapshot is
//! current.
//!
//! Each sensor is an entry in [`SENSORS`]: static metadata plus the
//! extractor that computes its value and attributes.

pub mod extract;

use crate::coordinator::{Snapshot, SnapshotKey};
use extract::Projection;
use serde::Serialize;
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

/// Prefix for sensor unique ids
pub const DOMAIN: &str = "wakatime";

/// Identifies one sensor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SensorKey {
    DailyTotal,
    TopLanguage,
    TopProject,
    TopEditor,
    TopOs,
    TopCategory,
    WeeklyAverage,
    ProductivityLevel,
    CurrentStreak,
}

impl SensorKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            SensorKey::DailyTotal => "daily_total",
            SensorKey::TopLanguage => "top_language",
            SensorKey::TopProject => "top_project",
            SensorKey::TopEditor => "top_editor",
            SensorKey::TopOs => "top_os",
            SensorKey::TopCategory => "top_category",
            SensorKey::WeeklyAverage => "weekly_average",
            SensorKey::ProductivityLevel => "productivity_level",
            SensorKey::CurrentStreak => "current_streak",
        }
    }

    /// Stable id of the form `wakatime_{key}`
    pub fn unique_id(&self) -> String {
        format!("{}_{}", DOMAIN, self.as_str())
    }
}

impl fmt::Display for SensorKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SensorKey {
    type Err = UnknownSensor;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SENSORS
            .iter()
            .map(|sensor| sensor.description.key)
            .find(|key| key.as_str() == s)
            .ok_or_else(|| UnknownSensor(s.to_string()))
    }
}

/// Returned when parsing a name that is not a sensor key
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown sensor: {0}")]
pub struct UnknownSensor(pub String);

/// How a numeric sensor behaves over time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StateClass {
    Total,
    Measurement,
}

/// Static metadata of a sensor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SensorDescription {
    pub key: SensorKey,
    pub name: &'static str,
    pub icon: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub device_class: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state_class: Option<StateClass>,
}

/// A sensor: metadata plus the projection that computes it
pub struct SensorDefinition {
    pub description: SensorDescription,
    pub extract: fn(&Snapshot) -> Projection,
}

const fn text_sensor(key: SensorKey, name: &'static str, icon: &'static str) -> SensorDescription {
    SensorDescription {
        key,
        name,
        icon,
        unit: None,
        device_class: None,
        state_class: None,
    }
}

const fn duration_sensor(
    key: SensorKey,
    name: &'static str,
    icon: &'static str,
    state_class: StateClass,
) -> SensorDescription {
    SensorDescription {
        key,
        name,
        icon,
        unit: Some("s"),
        device_class: Some("duration"),
        state_class: Some(state_class),
    }
}

/// Every sensor, in display order (the order of [`SensorKey`])
pub static SENSORS: [SensorDefinition; 9] = [
    SensorDefinition {
        description: duration_sensor(
            SensorKey::DailyTotal,
            "Daily total",
            "mdi:code-braces",
            StateClass::Total,
        ),
        extract: extract::daily_total,
    },
    SensorDefinition {
        description: text_sensor(SensorKey::TopLanguage, "Top language", "mdi:code-tags"),
        extract: extract::top_language,
    },
    SensorDefinition {
        description: text_sensor(SensorKey::TopProject, "Top project", "mdi:folder"),
        extract: extract::top_project,
    },
    SensorDefinition {
        description: text_sensor(SensorKey::TopEditor, "Top editor", "mdi:laptop"),
        extract: extract::top_editor,
    },
    SensorDefinition {
        description: text_sensor(SensorKey::TopOs, "Top operating system", "mdi:laptop"),
        extract: extract::top_os,
    },
    SensorDefinition {
        description: text_sensor(SensorKey::TopCategory, "Top category", "mdi:shape"),
        extract: extract::top_category,
    },
    SensorDefinition {
        description: duration_sensor(
            SensorKey::WeeklyAverage,
            "Weekly average",
            "mdi:calendar-week",
            StateClass::Measurement,
        ),
        extract: extract::weekly_average,
    },
    SensorDefinition {
        description: text_sensor(
            SensorKey::ProductivityLevel,
            "Productivity level",
            "mdi:trending-up",
        ),
        extract: extract::productivity_level,
    },
    SensorDefinition {
        description: SensorDescription {
            key: SensorKey::CurrentStreak,
            name: "Current streak",
            icon: "mdi:fire",
            unit: Some("days"),
            device_class: None,
            state_class: Some(StateClass::Measurement),
        },
        extract: extract::current_streak,
    },
];

/// Primary value of a sensor
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum SensorValue {
    Integer(i64),
    Text(String),
}

impl fmt::Display for SensorValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SensorValue::Integer(v) => write!(f, "{}", v),
            SensorValue::Text(v) => f.write_str(v),
        }
    }
}

/// A sensor evaluated against a snapshot
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SensorState {
    pub unique_id: String,
    #[serde(flatten)]
    pub description: SensorDescription,
    /// `None` while no snapshot has been published
    pub value: Option<SensorValue>,
    #[serde(skip_serializing_if = "Map::is_empty")]
    pub attributes: Map<String, Value>,
}

/// Look up a sensor definition
pub fn definition(key: SensorKey) -> &'static SensorDefinition {
    // SENSORS is ordered by SensorKey discriminant
    &SENSORS[key as usize]
}

/// Evaluate one sensor
pub fn evaluate(key: SensorKey, snapshot: Option<&Snapshot>) -> SensorState {
    project(definition(key), snapshot)
}

/// Evaluate every sensor, in display order
pub fn evaluate_all(snapshot: Option<&Snapshot>) -> Vec<SensorState> {
    SENSORS
        .iter()
        .map(|sensor| project(sensor, snapshot))
        .collect()
}

fn project(sensor: &SensorDefinition, snapshot: Option<&Snapshot>) -> SensorState {
    let (value, attributes) = match snapshot {
        Some(snapshot) => {
            let projection = (sensor.extract)(snapshot);
            (Some(projection.value), projection.attributes)
        }
        None => (None, Map::new()),
    };

    SensorState {
        unique_id: sensor.description.key.unique_id(),
        description: sensor.description,
        value,
        attributes,
    }
}

/// The account the sensors belong to
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeviceInfo {
    pub identifier: String,
    pub name: String,
    pub manufacturer: &'static str,
    pub model: &'static str,
}

impl DeviceInfo {
    /// Build device details from the user profile, if the snapshot has one
    pub fn from_snapshot(snapshot: &Snapshot) -> Option<Self> {
        let user = snapshot.data(SnapshotKey::UserInfo)?;
        let field = |name: &str| user.get(name).and_then(Value::as_str);

        Some(Self {
            identifier: field("id").unwrap_or_default().to_string(),
            name: field("display_name").unwrap_or("WakaTime").to_string(),
            manufacturer: "WakaTime",
            model: "API",
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_sensor_table_covers_every_key() {
        let keys: Vec<&str> = SENSORS.iter().map(|s| s.description.key.as_str()).collect();
        assert_eq!(
            keys,
            vec![
                "daily_total",
                "top_language",
                "top_project",
                "top_editor",
                "top_os",
                "top_category",
                "weekly_average",
                "productivity_level",
                "current_streak",
            ]
        );

        for key in keys {
            let parsed: SensorKey = key.parse().unwrap();
            assert_eq!(definition(parsed).description.key, parsed);
        }
    }

    #[test]
    fn test_parse_unknown_sensor() {
        let err = "most_active_time".parse::<SensorKey>().unwrap_err();
        assert_eq!(err.to_string(), "Unknown sensor: most_active_time");
    }

    #[test]
    fn test_unique_id() {
        assert_eq!(SensorKey::TopOs.unique_id(), "wakatime_top_os");
    }

    #[test]
    fn test_no_snapshot_means_no_value() {
        let states = evaluate_all(None);
        assert_eq!(states.len(), 9);
        assert!(states.iter().all(|s| s.value.is_none() && s.attributes.is_empty()));
    }

    #[test]
    fn test_evaluate_against_snapshot() {
        let snapshot = Snapshot {
            stats: json!({ "data": { "languages": [{ "name": "Rust", "percent": 80.0 }] } }),
            ..Snapshot::empty()
        };

        let state = evaluate(SensorKey::TopLanguage, Some(&snapshot));
        assert_eq!(state.value, Some(SensorValue::Text("Rust".into())));
        assert_eq!(state.unique_id, "wakatime_top_language");

        let state = evaluate(SensorKey::TopEditor, Some(&snapshot));
        assert_eq!(state.value, Some(SensorValue::Text("Unknown".into())));
    }

    #[test]
    fn test_state_serialization() {
        let state = evaluate(SensorKey::DailyTotal, Some(&Snapshot::empty()));
        let value = serde_json::to_value(&state).unwrap();

        assert_eq!(value["key"], "daily_total");
        assert_eq!(value["unit"], "s");
        assert_eq!(value["device_class"], "duration");
        assert_eq!(value["state_class"], "total");
        assert_eq!(value["value"], 0);
        assert!(value.get("attributes").is_none());
    }

    #[test]
    fn test_device_info() {
        let snapshot = Snapshot {
            user_info: json!({ "data": { "id": "u-1", "display_name": "Ada" } }),
            ..Snapshot::empty()
        };

        let device = DeviceInfo::from_snapshot(&snapshot).unwrap();
        assert_eq!(device.identifier, "u-1");
        assert_eq!(device.name, "Ada");
        assert_eq!(device.manufacturer, "WakaTime");

        let anonymous = Snapshot {
            user_info: json!({ "data": {} }),
            ..Snapshot::empty()
        };
        let device = DeviceInfo::from_snapshot(&anonymous).unwrap();
        assert_eq!(device.identifier, "");
        assert_eq!(device.name, "WakaTime");

        assert!(DeviceInfo::from_snapshot(&Snapshot::empty()).is_none());
    }
}
