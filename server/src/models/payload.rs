//! Request bodies for the aggregate write operations.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};

use crate::models::children::{
    EventCategory, EventPrice, EventQuestion, EventSpeaker, EventTag, LocationInput,
};
use crate::models::event::EventType;
use crate::utils::error::{AppError, AppResult};

/// The seven optional child collections carried by create and update bodies.
///
/// `None` means the field was absent from the request. On update an absent
/// collection is left alone, while `Some(vec![])` clears it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventCollections {
    pub prices: Option<Vec<EventPrice>>,
    pub categories: Option<Vec<EventCategory>>,
    pub location: Option<LocationInput>,
    pub gallery: Option<Vec<String>>,
    pub questionnaire: Option<Vec<EventQuestion>>,
    pub speakers: Option<Vec<EventSpeaker>>,
    pub tags: Option<Vec<EventTag>>,
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateEventPayload {
    pub title: String,
    pub short_description: Option<String>,
    pub description: Option<String>,
    #[serde(default)]
    pub event_type: EventType,
    pub timezone_id: Option<i32>,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub contact: Option<String>,
    pub email: Option<String>,
    pub currency_code: Option<String>,
    #[serde(default)]
    pub is_private: bool,
    #[serde(default)]
    pub is_redacted: bool,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(flatten)]
    pub collections: EventCollections,
}

/// Partial update: only the fields present are applied.
///
/// Nullable columns use `Option<Option<_>>`: an absent field keeps the stored
/// value, `null` clears it. For the non-nullable columns `null` is the same
/// as absent.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateEventPayload {
    pub title: Option<String>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub short_description: Option<Option<String>>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub description: Option<Option<String>>,
    pub event_type: Option<EventType>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub timezone_id: Option<Option<i32>>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub contact: Option<Option<String>>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub email: Option<Option<String>>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub currency_code: Option<Option<String>>,
    pub is_private: Option<bool>,
    pub is_redacted: Option<bool>,
    pub is_active: Option<bool>,
    #[serde(flatten)]
    pub collections: EventCollections,
}

/// Only runs when the key is in the body; `#[serde(default)]` covers absence.
fn present<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

impl CreateEventPayload {
    pub fn validate(&self) -> AppResult<()> {
        validate_title(Some(&self.title))?;
        validate_window(Some(self.start_date), Some(self.end_date))?;
        validate_email(self.email.as_deref())?;
        self.collections.validate()
    }
}

impl UpdateEventPayload {
    pub fn validate(&self) -> AppResult<()> {
        validate_title(self.title.as_ref())?;
        validate_window(self.start_date, self.end_date)?;
        validate_email(self.email.as_ref().and_then(|e| e.as_deref()))?;
        self.collections.validate()
    }
}

impl EventCollections {
    pub fn validate(&self) -> AppResult<()> {
        for price in self.prices.iter().flatten() {
            if price.price < Decimal::ZERO {
                return Err(invalid(format!(
                    "price for currency {} must not be negative",
                    price.currency_id
                )));
            }
        }
        if self
            .gallery
            .iter()
            .flatten()
            .any(|path| path.trim().is_empty())
        {
            return Err(invalid("gallery image paths must not be empty"));
        }
        if self
            .questionnaire
            .iter()
            .flatten()
            .any(|q| q.q_key.trim().is_empty())
        {
            return Err(invalid("questionnaire keys must not be empty"));
        }
        if self
            .speakers
            .iter()
            .flatten()
            .any(|s| s.name.trim().is_empty())
        {
            return Err(invalid("speaker names must not be empty"));
        }
        Ok(())
    }
}

fn invalid(message: impl Into<String>) -> AppError {
    AppError::ValidationError(message.into())
}

fn validate_title(title: Option<&String>) -> AppResult<()> {
    match title {
        Some(title) if title.trim().is_empty() => Err(invalid("title must not be empty")),
        _ => Ok(()),
    }
}

fn validate_window(start: Option<DateTime<Utc>>, end: Option<DateTime<Utc>>) -> AppResult<()> {
    match (start, end) {
        (Some(start), Some(end)) if end < start => {
            Err(invalid("endDate must not be earlier than startDate"))
        }
        _ => Ok(()),
    }
}

fn validate_email(email: Option<&str>) -> AppResult<()> {
    match email {
        Some(email) if !email.contains('@') => Err(invalid(format!(
            "'{}' is not a valid email address",
            email
        ))),
        _ => Ok(()),
    }
}
