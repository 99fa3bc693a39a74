//! # Leaderboard Store
//!
//! A capped, score-ordered list of submissions persisted as one JSON array under a
//! single key of a [`KvStore`].
//!
//! ## Invariants
//!
//! - At most [`HALL_CAPACITY`] entries
//! - Sorted by `percentage`, highest first, after every insert
//! - The sort is stable: equal scores keep insertion order, older entries first
//! - Nothing is merged or de-duplicated; entries leave only by falling off the tail
//!
//! ## Storage
//!
//! [`JsonFileStore`] keeps every key in one JSON object on disk, the server-side
//! equivalent of browser local storage. A missing or corrupt value reads as an empty
//! list.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Datelike, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{StudioError, StudioResult};

/// Maximum number of retained entries.
pub const HALL_CAPACITY: usize = 50;

/// Name recorded when a submission has none.
pub const ANONYMOUS: &str = "Anonymous";

/// One leaderboard row.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    /// Creation time in milliseconds; not guaranteed unique.
    pub id: i64,
    pub name: String,
    /// Externally supplied score, stored as given.
    pub percentage: i64,
    /// Small thumbnail as a data URI.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    /// RFC 3339 timestamp.
    pub date: String,
}

/// A submission before it gets an id and date.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct NewEntry {
    #[serde(default)]
    pub name: Option<String>,
    pub percentage: i64,
    #[serde(default)]
    pub image: Option<String>,
}

/// String key-value persistence.
pub trait KvStore: Send {
    fn get(&self, key: &str) -> StudioResult<Option<String>>;
    fn set(&mut self, key: &str, value: String) -> StudioResult<()>;
}

/// Volatile store, mainly for tests.
#[derive(Debug, Default)]
pub struct MemoryStore {
    values: BTreeMap<String, String>,
}

impl KvStore for MemoryStore {
    fn get(&self, key: &str) -> StudioResult<Option<String>> {
        Ok(self.values.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: String) -> StudioResult<()> {
        self.values.insert(key.to_string(), value);
        Ok(())
    }
}

/// All keys in one JSON object file: `{"key": "<value>", ...}`.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_all(&self) -> StudioResult<BTreeMap<String, String>> {
        match fs::read_to_string(&self.path) {
            Ok(text) if text.trim().is_empty() => Ok(BTreeMap::new()),
            Ok(text) => serde_json::from_str(&text).or_else(|e| {
                warn!(path = %self.path.display(), "store file is not a JSON object: {e}");
                Ok(BTreeMap::new())
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(e) => Err(StudioError::io("read store", e)),
        }
    }
}

impl KvStore for JsonFileStore {
    fn get(&self, key: &str) -> StudioResult<Option<String>> {
        Ok(self.read_all()?.remove(key))
    }

    fn set(&mut self, key: &str, value: String) -> StudioResult<()> {
        let mut all = self.read_all()?;
        all.insert(key.to_string(), value);
        let text = serde_json::to_string_pretty(&all)?;

        // write-then-rename so a crash never leaves a half-written file
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, text).map_err(|e| StudioError::io("write store", e))?;
        fs::rename(&tmp, &self.path).map_err(|e| StudioError::io("replace store", e))?;
        Ok(())
    }
}

/// The leaderboard, stored under `key` in `store`.
pub struct Leaderboard<S: KvStore> {
    store: S,
    key: String,
}

impl<S: KvStore> Leaderboard<S> {
    pub fn new(store: S, key: impl Into<String>) -> Self {
        Self {
            store,
            key: key.into(),
        }
    }

    /// Current ordered snapshot. Unreadable stored data reads as empty.
    pub fn list(&self) -> StudioResult<Vec<LeaderboardEntry>> {
        let Some(raw) = self.store.get(&self.key)? else {
            return Ok(Vec::new());
        };
        match serde_json::from_str(&raw) {
            Ok(entries) => Ok(entries),
            Err(e) => {
                warn!(key = %self.key, "discarding unreadable leaderboard: {e}");
                Ok(Vec::new())
            }
        }
    }

    /// Insert a submission stamped with the current time.
    pub fn insert(&mut self, entry: NewEntry) -> StudioResult<LeaderboardEntry> {
        self.insert_at(entry, Utc::now())
    }

    /// Insert a submission stamped with `now`: append, sort, truncate, persist.
    pub fn insert_at(&mut self, entry: NewEntry, now: DateTime<Utc>) -> StudioResult<LeaderboardEntry> {
        let name = entry
            .name
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| ANONYMOUS.to_string());

        let created = LeaderboardEntry {
            id: now.timestamp_millis(),
            name,
            percentage: entry.percentage,
            image: entry.image,
            date: now.to_rfc3339_opts(SecondsFormat::Millis, true),
        };

        let mut entries = self.list()?;
        entries.push(created.clone());
        entries.sort_by(|a, b| b.percentage.cmp(&a.percentage));
        entries.truncate(HALL_CAPACITY);

        self.store.set(&self.key, serde_json::to_string(&entries)?)?;
        debug!(len = entries.len(), score = created.percentage, "leaderboard updated");
        Ok(created)
    }

    pub fn into_store(self) -> S {
        self.store
    }
}


/// Human-friendly age of an entry's date: "Just now", "5m ago", "3h ago", "2d ago", or
/// "Mar 4" after a week. Unparsable dates are returned unchanged.
pub fn relative_age(date: &str, now: DateTime<Utc>) -> String {
    let Ok(then) = DateTime::parse_from_rfc3339(date) else {
        return date.to_string();
    };
    let then = then.with_timezone(&Utc);
    let elapsed = now.signed_duration_since(then);

    let minutes = elapsed.num_minutes();
    let hours = elapsed.num_hours();
    let days = elapsed.num_days();

    if minutes < 1 {
        "Just now".to_string()
    } else if minutes < 60 {
        format!("{minutes}m ago")
    } else if hours < 24 {
        format!("{hours}h ago")
    } else if days < 7 {
        format!("{days}d ago")
    } else {
        format!("{} {}", then.format("%b"), then.day())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn board() -> Leaderboard<MemoryStore> {
        Leaderboard::new(MemoryStore::default(), "hall")
    }

    fn entry(name: &str, percentage: i64) -> NewEntry {
        NewEntry {
            name: Some(name.to_string()),
            percentage,
            image: None,
        }
    }

    fn at(ms: i64) -> DateTime<Utc> {
        Utc.timestamp_millis_opt(1_700_000_000_000 + ms).unwrap()
    }

    #[test]
    fn test_insert_sorts_descending() {
        let mut hall = board();
        for (i, score) in [12, 97, 45, 45, 3, 88].into_iter().enumerate() {
            hall.insert_at(entry(&format!("p{i}"), score), at(i as i64)).unwrap();
        }
        let scores: Vec<i64> = hall.list().unwrap().iter().map(|e| e.percentage).collect();
        assert_eq!(scores, vec![97, 88, 45, 45, 12, 3]);
    }

    #[test]
    fn test_ties_keep_insertion_order() {
        let mut hall = board();
        hall.insert_at(entry("first", 50), at(0)).unwrap();
        hall.insert_at(entry("second", 50), at(1)).unwrap();
        hall.insert_at(entry("top", 90), at(2)).unwrap();
        hall.insert_at(entry("third", 50), at(3)).unwrap();
        let names: Vec<String> = hall.list().unwrap().into_iter().map(|e| e.name).collect();
        assert_eq!(names, vec!["top", "first", "second", "third"]);
    }

    #[test]
    fn test_capacity_evicts_lowest() {
        let mut hall = board();
        for i in 0..50 {
            hall.insert_at(entry(&format!("p{i}"), 10 + i), at(i)).unwrap();
        }
        hall.insert_at(entry("late", 5), at(100)).unwrap();
        let list = hall.list().unwrap();
        assert_eq!(list.len(), HALL_CAPACITY);
        assert!(list.iter().all(|e| e.name != "late"));

        hall.insert_at(entry("winner", 99), at(101)).unwrap();
        let list = hall.list().unwrap();
        assert_eq!(list.len(), HALL_CAPACITY);
        assert_eq!(list[0].name, "winner");
        assert!(list.iter().all(|e| e.percentage != 10));
    }

    #[test]
    fn test_defaults_and_stamps() {
        let mut hall = board();
        let created = hall
            .insert_at(
                NewEntry {
                    name: Some("   ".into()),
                    percentage: 140,
                    image: Some("data:image/png;base64,AAAA".into()),
                },
                at(0),
            )
            .unwrap();
        assert_eq!(created.name, ANONYMOUS);
        assert_eq!(created.percentage, 140);
        assert_eq!(created.id, 1_700_000_000_000);
        assert_eq!(created.date, "2023-11-14T22:13:20.000Z");
    }

    #[test]
    fn test_duplicates_are_kept() {
        let mut hall = board();
        hall.insert_at(entry("same", 70), at(0)).unwrap();
        hall.insert_at(entry("same", 70), at(0)).unwrap();
        assert_eq!(hall.list().unwrap().len(), 2);
    }

    #[test]
    fn test_corrupt_value_reads_as_empty() {
        let mut store = MemoryStore::default();
        store.set("hall", "not json".into()).unwrap();
        let mut hall = Leaderboard::new(store, "hall");
        assert!(hall.list().unwrap().is_empty());
        hall.insert_at(entry("fresh", 1), at(0)).unwrap();
        assert_eq!(hall.list().unwrap().len(), 1);
    }

    #[test]
    fn test_json_file_store_persists() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("hall.json");

        let mut hall = Leaderboard::new(JsonFileStore::new(&path), "hall_of_fame");
        hall.insert_at(entry("a", 10), at(0)).unwrap();
        hall.insert_at(entry("b", 20), at(1)).unwrap();

        let reopened = Leaderboard::new(JsonFileStore::new(&path), "hall_of_fame");
        let names: Vec<String> = reopened.list().unwrap().into_iter().map(|e| e.name).collect();
        assert_eq!(names, vec!["b", "a"]);

        let other_key = Leaderboard::new(JsonFileStore::new(&path), "other");
        assert!(other_key.list().unwrap().is_empty());
    }

    #[test]
    fn test_relative_age() {
        let now = Utc.with_ymd_and_hms(2024, 3, 20, 12, 0, 0).unwrap();
        let ago = |d: Duration| (now - d).to_rfc3339();
        assert_eq!(relative_age(&ago(Duration::seconds(30)), now), "Just now");
        assert_eq!(relative_age(&ago(Duration::minutes(5)), now), "5m ago");
        assert_eq!(relative_age(&ago(Duration::hours(3)), now), "3h ago");
        assert_eq!(relative_age(&ago(Duration::days(2)), now), "2d ago");
        assert_eq!(relative_age("2024-03-04T10:00:00Z", now), "Mar 4");
        assert_eq!(relative_age("yesterday", now), "yesterday");
    }
}
