//! Row shapes for the seven collections owned by an event.
//!
//! None of these carry `event_id`: the writer stamps it onto every row at
//! insert time, and reads are always scoped to a single event.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct EventPrice {
    pub currency_id: i32,
    pub price: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct EventCategory {
    pub category_id: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct EventLocation {
    pub country_id: i32,
    pub state_id: i32,
    pub city_id: i32,
}

/// Location as submitted by a client. Any of the ids may be missing, in which
/// case nothing is written.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationInput {
    pub country_id: Option<i32>,
    pub state_id: Option<i32>,
    pub city_id: Option<i32>,
}

impl LocationInput {
    /// The storable row, only when all three geographic ids are present.
    pub fn complete(&self) -> Option<EventLocation> {
        Some(EventLocation {
            country_id: self.country_id?,
            state_id: self.state_id?,
            city_id: self.city_id?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct GalleryImage {
    pub image_path: String,
    pub position: i32,
}

impl GalleryImage {
    /// Number a list of stored image paths in request order.
    pub fn from_paths(paths: &[String]) -> Vec<GalleryImage> {
        paths
            .iter()
            .enumerate()
            .map(|(index, path)| GalleryImage {
                image_path: path.clone(),
                position: index as i32,
            })
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct EventQuestion {
    pub q_key: String,
    pub question: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct EventSpeaker {
    pub name: String,
    pub designation: Option<String>,
    pub profile_link: Option<String>,
    pub image: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct EventTag {
    pub tag_id: i32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn location_requires_all_three_ids() {
        let full = LocationInput {
            country_id: Some(1),
            state_id: Some(2),
            city_id: Some(3),
        };
        assert_eq!(
            full.complete(),
            Some(EventLocation {
                country_id: 1,
                state_id: 2,
                city_id: 3
            })
        );

        let missing_city = LocationInput {
            city_id: None,
            ..full.clone()
        };
        assert_eq!(missing_city.complete(), None);
        assert_eq!(LocationInput::default().complete(), None);
    }

    #[test]
    fn gallery_positions_follow_request_order() {
        let paths = vec!["events/a.png".to_string(), "events/b.png".to_string()];
        let images = GalleryImage::from_paths(&paths);

        assert_eq!(images.len(), 2);
        assert_eq!(images[0].image_path, "events/a.png");
        assert_eq!(images[0].position, 0);
        assert_eq!(images[1].position, 1);
    }

    #[test]
    fn price_accepts_numeric_json() {
        let price: EventPrice =
            serde_json::from_str(r#"{"currencyId": 2, "price": 20}"#).unwrap();
        assert_eq!(price.currency_id, 2);
        assert_eq!(price.price, Decimal::from(20));
    }
}
