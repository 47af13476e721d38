//! Calendar event records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalendarEvent {
    pub id: i64,
    pub title: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    #[serde(default)]
    pub description: Option<String>,
}

impl CalendarEvent {
    pub fn is_multi_day(&self) -> bool {
        self.start.date_naive() != self.end.date_naive()
    }
}

/// Payload for creating a calendar event.
#[derive(Debug, Clone, Serialize)]
pub struct NewEvent {
    pub title: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_event() {
        let json = r#"{
            "id": 5,
            "title": "client onboarding call",
            "start": "2026-08-10T09:00:00Z",
            "end": "2026-08-10T10:30:00Z"
        }"#;

        let event: CalendarEvent = serde_json::from_str(json).expect("event should parse");
        assert_eq!(event.id, 5);
        assert!(!event.is_multi_day());
        assert!(event.description.is_none());
    }

    #[test]
    fn test_is_multi_day() {
        let json = r#"{
            "id": 6,
            "title": "annual offsite",
            "start": "2026-09-01T08:00:00Z",
            "end": "2026-09-03T17:00:00Z"
        }"#;

        let event: CalendarEvent = serde_json::from_str(json).unwrap();
        assert!(event.is_multi_day());
    }
}
