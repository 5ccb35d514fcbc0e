//! Refresh snapshots
//!
//! One immutable bundle of the five raw API payloads, produced per
//! successful refresh cycle.

use crate::client::AccountInfo;
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{Map, Value};
use std::fmt;

/// Logical names of the payloads in a snapshot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SnapshotKey {
    Summary,
    Stats,
    UserInfo,
    Last7Days,
    AllTime,
}

impl SnapshotKey {
    pub const ALL: [SnapshotKey; 5] = [
        SnapshotKey::Summary,
        SnapshotKey::Stats,
        SnapshotKey::UserInfo,
        SnapshotKey::Last7Days,
        SnapshotKey::AllTime,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SnapshotKey::Summary => "summary",
            SnapshotKey::Stats => "stats",
            SnapshotKey::UserInfo => "user_info",
            SnapshotKey::Last7Days => "last_7_days",
            SnapshotKey::AllTime => "all_time",
        }
    }
}

impl fmt::Display for SnapshotKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raw payloads from one refresh cycle.
///
/// An endpoint that answered with a non-200 status is stored as an empty
/// object. Snapshots are shared as `Arc<Snapshot>` and never mutated.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Snapshot {
    pub summary: Value,
    pub stats: Value,
    pub user_info: Value,
    pub last_7_days: Value,
    pub all_time: Value,
    pub fetched_at: DateTime<Utc>,
}

impl Snapshot {
    /// Snapshot with every payload empty
    pub fn empty() -> Self {
        let empty = || Value::Object(Map::new());
        Self {
            summary: empty(),
            stats: empty(),
            user_info: empty(),
            last_7_days: empty(),
            all_time: empty(),
            fetched_at: Utc::now(),
        }
    }

    /// Payload for a logical name
    pub fn get(&self, key: SnapshotKey) -> &Value {
        match key {
            SnapshotKey::Summary => &self.summary,
            SnapshotKey::Stats => &self.stats,
            SnapshotKey::UserInfo => &self.user_info,
            SnapshotKey::Last7Days => &self.last_7_days,
            SnapshotKey::AllTime => &self.all_time,
        }
    }

    /// The `data` member of a payload, if present
    pub fn data(&self, key: SnapshotKey) -> Option<&Value> {
        self.get(key).get("data")
    }

    /// Account details from the user profile; `None` unless it carries an email
    pub fn account(&self) -> Option<AccountInfo> {
        AccountInfo::from_user_info(&self.user_info)
    }

    /// Logical names whose payload came back empty
    pub fn empty_payloads(&self) -> Vec<SnapshotKey> {
        SnapshotKey::ALL
            .into_iter()
            .filter(|key| match self.get(*key) {
                Value::Object(map) => map.is_empty(),
                Value::Null => true,
                _ => false,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_empty_snapshot() {
        let snapshot = Snapshot::empty();
        assert_eq!(snapshot.empty_payloads().len(), 5);
        assert!(snapshot.data(SnapshotKey::Stats).is_none());
    }

    #[test]
    fn test_get_and_data() {
        let snapshot = Snapshot {
            stats: json!({ "data": { "languages": [] } }),
            ..Snapshot::empty()
        };

        assert_eq!(snapshot.data(SnapshotKey::Stats), Some(&json!({ "languages": [] })));
        assert_eq!(
            snapshot.empty_payloads(),
            vec![
                SnapshotKey::Summary,
                SnapshotKey::UserInfo,
                SnapshotKey::Last7Days,
                SnapshotKey::AllTime
            ]
        );
    }

    #[test]
    fn test_account_requires_email() {
        let snapshot = Snapshot {
            user_info: json!({ "data": { "id": "u-7", "email": "dev@example.com" } }),
            ..Snapshot::empty()
        };
        let account = snapshot.account().unwrap();
        assert_eq!(account.id, "u-7");
        assert_eq!(account.email, "dev@example.com");

        let anonymous = Snapshot {
            user_info: json!({ "data": { "id": "u-7" } }),
            ..Snapshot::empty()
        };
        assert!(anonymous.account().is_none());
        assert!(Snapshot::empty().account().is_none());
    }

    #[test]
    fn test_serializes_with_logical_names() {
        let value = serde_json::to_value(Snapshot::empty()).unwrap();
        for key in SnapshotKey::ALL {
            assert_eq!(value[key.as_str()], json!({}));
        }
    }
}
