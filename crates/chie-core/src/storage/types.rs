//! Core data types for the storage layer.
//!
//! Records serialize with camelCase field names; that JSON is both the
//! plaintext sealed inside each envelope and the shape of exported backups.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Local, NaiveDateTime, TimeZone, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

use crate::crypto::Envelope;
use crate::error::{ChieError, Result};

/// Backend-assigned row identifier (distinct from a record's own id).
pub type RowId = i64;

/// One opaque row as held by the backend.
#[derive(Debug, Clone)]
pub struct StoredRow {
    pub row_id: RowId,
    pub envelope: Envelope,
}

/// The three encrypted record collections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    Journals,
    Tasks,
    Events,
}

impl Collection {
    pub const ALL: [Collection; 3] = [Collection::Journals, Collection::Tasks, Collection::Events];

    /// Table holding this collection's envelopes.
    pub fn table_name(self) -> &'static str {
        match self {
            Collection::Journals => "journals",
            Collection::Tasks => "tasks",
            Collection::Events => "events",
        }
    }

    /// File name of this collection in the legacy plaintext layout.
    pub fn legacy_file_name(self) -> &'static str {
        match self {
            Collection::Journals => "journalEntries.json",
            Collection::Tasks => "tasks.json",
            Collection::Events => "events.json",
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.table_name())
    }
}

/// A domain record that lives encrypted in one collection.
pub trait Record: Serialize + DeserializeOwned + Clone {
    /// Collection this record type is stored in.
    const COLLECTION: Collection;

    /// Caller-assigned unique identifier.
    fn id(&self) -> Uuid;

    /// Order records the way `load_all` returns them.
    fn sort(records: &mut [Self]);
}

/// Zone-less layouts accepted by [`parse_timestamp`], as written by a
/// `datetime-local` form field.
const LOCAL_LAYOUTS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M"];

/// Parse an RFC 3339 timestamp, or a zone-less `YYYY-MM-DDTHH:MM[:SS]`
/// read as local wall-clock time.
///
/// A local time that falls in a DST gap is taken as UTC.
pub fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Ok(parsed.with_timezone(&Utc));
    }

    let naive = LOCAL_LAYOUTS
        .iter()
        .find_map(|layout| NaiveDateTime::parse_from_str(raw, layout).ok())
        .ok_or_else(|| ChieError::InvalidInput(format!("Invalid timestamp: {}", raw)))?;

    Ok(match Local.from_local_datetime(&naive).earliest() {
        Some(local) => local.with_timezone(&Utc),
        None => Utc.from_utc_datetime(&naive),
    })
}

fn deserialize_timestamp<'de, D>(deserializer: D) -> std::result::Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_timestamp(&raw).map_err(serde::de::Error::custom)
}

/// Mood scores attached to a journal entry: pleasure, arousal and dominance,
/// each nominally in `-1.0..=1.0`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sentiment {
    pub pleasure: f64,
    pub arousal: f64,
    pub dominance: f64,
}

impl Sentiment {
    pub fn new(pleasure: f64, arousal: f64, dominance: f64) -> Result<Self> {
        for (name, value) in [
            ("pleasure", pleasure),
            ("arousal", arousal),
            ("dominance", dominance),
        ] {
            if !(-1.0..=1.0).contains(&value) {
                return Err(ChieError::InvalidInput(format!(
                    "{} must be between -1 and 1 (got {})",
                    name, value
                )));
            }
        }
        Ok(Self {
            pleasure,
            arousal,
            dominance,
        })
    }
}

impl FromStr for Sentiment {
    type Err = ChieError;

    /// Parse `pleasure,arousal,dominance`, e.g. `0.6,-0.2,0.1`.
    fn from_str(s: &str) -> Result<Self> {
        let invalid = || {
            ChieError::InvalidInput(format!(
                "Invalid sentiment '{}' (expected pleasure,arousal,dominance)",
                s
            ))
        };

        let values = s
            .split(',')
            .map(|part| part.trim().parse::<f64>().map_err(|_| invalid()))
            .collect::<Result<Vec<_>>>()?;
        match values.as_slice() {
            [pleasure, arousal, dominance] => Self::new(*pleasure, *arousal, *dominance),
            _ => Err(invalid()),
        }
    }
}

impl fmt::Display for Sentiment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "P {:+.2} A {:+.2} D {:+.2}",
            self.pleasure, self.arousal, self.dominance
        )
    }
}

/// A journal entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Journal {
    pub id: Uuid,
    pub title: String,
    pub content: String,
    pub date: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sentiment: Option<Sentiment>,
}

impl Journal {
    /// Untitled entries get this title.
    pub const DEFAULT_TITLE: &'static str = "Untitled Entry";

    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        let title = title.into();
        let title = if title.trim().is_empty() {
            Self::DEFAULT_TITLE.to_string()
        } else {
            title
        };
        Self {
            id: Uuid::now_v7(),
            title,
            content: content.into(),
            date: Utc::now(),
            sentiment: None,
        }
    }

    pub fn with_date(mut self, date: DateTime<Utc>) -> Self {
        self.date = date;
        self
    }

    pub fn with_sentiment(mut self, sentiment: Sentiment) -> Self {
        self.sentiment = Some(sentiment);
        self
    }
}

impl Record for Journal {
    const COLLECTION: Collection = Collection::Journals;

    fn id(&self) -> Uuid {
        self.id
    }

    /// Newest first.
    fn sort(records: &mut [Self]) {
        records.sort_by(|a, b| b.date.cmp(&a.date));
    }
}

/// A to-do item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: Uuid,
    pub text: String,
    pub completed: bool,
    pub created_at: DateTime<Utc>,
}

impl Task {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            id: Uuid::now_v7(),
            text: text.into(),
            completed: false,
            created_at: Utc::now(),
        }
    }
}

impl Record for Task {
    const COLLECTION: Collection = Collection::Tasks;

    fn id(&self) -> Uuid {
        self.id
    }

    fn sort(records: &mut [Self]) {
        records.sort_by(|a, b| a.created_at.cmp(&b.created_at));
    }
}

/// A calendar event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub id: Uuid,
    pub title: String,
    /// Legacy events carry a zone-less local time here.
    #[serde(deserialize_with = "deserialize_timestamp")]
    pub date_time: DateTime<Utc>,
    #[serde(default)]
    pub description: String,
    pub created_at: DateTime<Utc>,
}

impl Event {
    pub fn new(
        title: impl Into<String>,
        date_time: DateTime<Utc>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::now_v7(),
            title: title.into(),
            date_time,
            description: description.into(),
            created_at: Utc::now(),
        }
    }
}

impl Record for Event {
    const COLLECTION: Collection = Collection::Events;

    fn id(&self) -> Uuid {
        self.id
    }

    /// Oldest scheduled time first.
    fn sort(records: &mut [Self]) {
        records.sort_by(|a, b| a.date_time.cmp(&b.date_time));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_journal_defaults_untitled() {
        let entry = Journal::new("   ", "body");
        assert_eq!(entry.title, Journal::DEFAULT_TITLE);
        assert!(entry.sentiment.is_none());
    }

    #[test]
    fn test_record_json_uses_camel_case() {
        let task = Task::new("water plants");
        let value = serde_json::to_value(&task).unwrap();
        assert!(value.get("createdAt").is_some());
        assert_eq!(value["completed"], serde_json::json!(false));

        let event = Event::new("Dentist", Utc::now(), "");
        let value = serde_json::to_value(&event).unwrap();
        assert!(value.get("dateTime").is_some());
    }

    #[test]
    fn test_journal_sort_newest_first() {
        let now = Utc::now();
        let mut entries = vec![
            Journal::new("old", "a").with_date(now - Duration::days(2)),
            Journal::new("new", "b").with_date(now),
            Journal::new("mid", "c").with_date(now - Duration::days(1)),
        ];
        Journal::sort(&mut entries);
        let titles: Vec<&str> = entries.iter().map(|e| e.title.as_str()).collect();
        assert_eq!(titles, ["new", "mid", "old"]);
    }

    #[test]
    fn test_event_sort_oldest_first() {
        let now = Utc::now();
        let mut events = vec![
            Event::new("later", now + Duration::hours(5), ""),
            Event::new("sooner", now + Duration::hours(1), ""),
        ];
        Event::sort(&mut events);
        assert_eq!(events[0].title, "sooner");
    }

    #[test]
    fn test_new_records_get_distinct_ids() {
        let a = Task::new("a");
        let b = Task::new("b");
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn test_collection_names() {
        assert_eq!(Collection::Journals.to_string(), "journals");
        assert_eq!(Collection::Events.legacy_file_name(), "events.json");
    }

    #[test]
    fn test_legacy_journal_with_mood_object_parses() {
        let raw = serde_json::json!({
            "id": Uuid::now_v7(),
            "title": "Morning",
            "content": "slept well",
            "date": "2024-01-02T09:00:00.000Z",
            "sentiment": {"pleasure": 0.5, "arousal": -0.25, "dominance": 0}
        });
        let journal: Journal = serde_json::from_value(raw).unwrap();
        let sentiment = journal.sentiment.unwrap();
        assert_eq!(sentiment.pleasure, 0.5);
        assert_eq!(sentiment.arousal, -0.25);
        assert_eq!(sentiment.dominance, 0.0);

        let value = serde_json::to_value(&journal).unwrap();
        assert_eq!(value["sentiment"]["arousal"], serde_json::json!(-0.25));
    }

    #[test]
    fn test_event_with_zoneless_time_read_as_local() {
        let raw = serde_json::json!({
            "id": Uuid::now_v7(),
            "title": "Dentist",
            "dateTime": "2024-02-01T15:30",
            "description": "",
            "createdAt": "2024-01-20T08:00:00.000Z"
        });
        let event: Event = serde_json::from_value(raw).unwrap();

        let naive = NaiveDateTime::parse_from_str("2024-02-01T15:30", "%Y-%m-%dT%H:%M").unwrap();
        let expected = Local
            .from_local_datetime(&naive)
            .earliest()
            .unwrap()
            .with_timezone(&Utc);
        assert_eq!(event.date_time, expected);

        let value = serde_json::to_value(&event).unwrap();
        let again: Event = serde_json::from_value(value).unwrap();
        assert_eq!(again.date_time, expected);
    }

    #[test]
    fn test_parse_timestamp_forms() {
        let utc = parse_timestamp("2024-05-01T10:30:00Z").unwrap();
        assert_eq!(utc.to_rfc3339(), "2024-05-01T10:30:00+00:00");
        assert!(parse_timestamp("2024-05-01T10:30:45").is_ok());
        assert!(matches!(
            parse_timestamp("next tuesday"),
            Err(ChieError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_sentiment_from_str() {
        let sentiment: Sentiment = "0.6, -0.2,0.1".parse().unwrap();
        assert_eq!(sentiment, Sentiment::new(0.6, -0.2, 0.1).unwrap());
        assert_eq!(sentiment.to_string(), "P +0.60 A -0.20 D +0.10");

        assert!("0.6,-0.2".parse::<Sentiment>().is_err());
        assert!("happy".parse::<Sentiment>().is_err());
        assert!("1.5,0,0".parse::<Sentiment>().is_err());
    }
}
