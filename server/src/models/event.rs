use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Column list for `events`, shared by every query that returns the root.
pub const EVENT_COLUMNS: &str = "id, title, short_description, description, event_type, \
     timezone_id, start_date, end_date, contact, email, currency_code, is_private, \
     is_redacted, is_active, created_by, created_at, updated_at";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "event_type", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum EventType {
    Virtual,
    #[default]
    Offline,
    Other,
}

impl std::fmt::Display for EventType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Virtual => write!(f, "virtual"),
            Self::Offline => write!(f, "offline"),
            Self::Other => write!(f, "other"),
        }
    }
}

/// A row from the `events` table: the aggregate root.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub id: Uuid,
    pub title: String,
    pub short_description: Option<String>,
    pub description: Option<String>,
    pub event_type: EventType,
    pub timezone_id: Option<i32>,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub contact: Option<String>,
    pub email: Option<String>,
    pub currency_code: Option<String>,
    pub is_private: bool,
    pub is_redacted: bool,
    pub is_active: bool,
    pub created_by: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// An event joined with a readable rendering of its location rows.
#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct EventDetails {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub event: Event,
    pub location: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_type_uses_lowercase_on_the_wire() {
        let json = serde_json::to_string(&EventType::Virtual).unwrap();
        assert_eq!(json, "\"virtual\"");

        let parsed: EventType = serde_json::from_str("\"other\"").unwrap();
        assert_eq!(parsed, EventType::Other);
        assert_eq!(EventType::Offline.to_string(), "offline");
    }

    #[test]
    fn unknown_event_type_is_rejected() {
        assert!(serde_json::from_str::<EventType>("\"hybrid\"").is_err());
    }
}
