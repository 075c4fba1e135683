#![allow(dead_code)]

use std::str::FromStr;

use chrono::{Duration, Utc};
use rust_decimal::Decimal;
use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use sqlx::PgPool;
use uuid::Uuid;

use event_aggregate_server::models::{
    CreateEventPayload, EventCategory, EventCollections, EventPrice, EventQuestion, EventSpeaker,
    EventTag, EventType, LocationInput,
};
use event_aggregate_server::utils::caller::VerifiedCaller;
use event_aggregate_server::MIGRATOR;

/// A pool bound to a fresh schema with migrations applied, or `None` when
/// `TEST_DATABASE_URL` is not set.
pub async fn isolated_pool() -> Option<PgPool> {
    let url = match std::env::var("TEST_DATABASE_URL") {
        Ok(url) if !url.trim().is_empty() => url,
        _ => {
            eprintln!("TEST_DATABASE_URL not set; skipping database test");
            return None;
        }
    };

    let schema = format!("events_test_{}", Uuid::new_v4().simple());
    let admin = PgPool::connect(&url).await.expect("connect to test database");
    sqlx::query(&format!("CREATE SCHEMA {schema}"))
        .execute(&admin)
        .await
        .expect("create test schema");
    admin.close().await;

    let options = PgConnectOptions::from_str(&url)
        .expect("parse TEST_DATABASE_URL")
        .options([("search_path", schema.as_str())]);
    let pool = PgPoolOptions::new()
        .max_connections(4)
        .connect_with(options)
        .await
        .expect("connect to test schema");

    MIGRATOR.run(&pool).await.expect("run migrations");
    seed_geography(&pool).await;
    Some(pool)
}

async fn seed_geography(pool: &PgPool) {
    sqlx::query("INSERT INTO countries (id, name) VALUES (1, 'India'), (2, 'Germany')")
        .execute(pool)
        .await
        .expect("seed countries");
    sqlx::query("INSERT INTO states (id, country_id, name) VALUES (10, 1, 'Karnataka'), (20, 2, 'Bavaria')")
        .execute(pool)
        .await
        .expect("seed states");
    sqlx::query("INSERT INTO cities (id, state_id, name) VALUES (100, 10, 'Bengaluru'), (200, 20, 'Munich')")
        .execute(pool)
        .await
        .expect("seed cities");
}

pub fn caller() -> VerifiedCaller {
    VerifiedCaller::new("user-42")
}

pub fn price(currency_id: i32, amount: i64) -> EventPrice {
    EventPrice {
        currency_id,
        price: Decimal::from(amount),
    }
}

pub fn bengaluru() -> LocationInput {
    LocationInput {
        country_id: Some(1),
        state_id: Some(10),
        city_id: Some(100),
    }
}

/// An event starting `days_from_now` days out with no child collections.
pub fn bare_event(title: &str, days_from_now: i64) -> CreateEventPayload {
    let start = Utc::now() + Duration::days(days_from_now);
    CreateEventPayload {
        title: title.to_string(),
        short_description: None,
        description: Some(format!("{title} description")),
        event_type: EventType::Offline,
        timezone_id: Some(1),
        start_date: start,
        end_date: start + Duration::hours(3),
        contact: None,
        email: Some("organizer@example.org".to_string()),
        currency_code: Some("INR".to_string()),
        is_private: false,
        is_redacted: false,
        is_active: true,
        collections: EventCollections::default(),
    }
}

/// 2 prices, 1 category, 1 location, 3 gallery images, 2 questions,
/// 1 speaker and 2 tags.
pub fn full_event(title: &str) -> CreateEventPayload {
    let mut payload = bare_event(title, 30);
    payload.collections = EventCollections {
        prices: Some(vec![price(1, 10), price(2, 25)]),
        categories: Some(vec![EventCategory { category_id: 5 }]),
        location: Some(bengaluru()),
        gallery: Some(vec![
            "events/cover.png".to_string(),
            "events/stage.png".to_string(),
            "events/crowd.png".to_string(),
        ]),
        questionnaire: Some(vec![
            EventQuestion {
                q_key: "diet".to_string(),
                question: "Any dietary requirements?".to_string(),
            },
            EventQuestion {
                q_key: "tshirt".to_string(),
                question: "T-shirt size?".to_string(),
            },
        ]),
        speakers: Some(vec![EventSpeaker {
            name: "Ferris".to_string(),
            designation: Some("Mascot".to_string()),
            profile_link: None,
            image: Some("speakers/ferris.png".to_string()),
        }]),
        tags: Some(vec![EventTag { tag_id: 7 }, EventTag { tag_id: 8 }]),
    };
    payload
}

/// Row counts for the root and every child table, for one event.
pub async fn row_counts(pool: &PgPool, event_id: Uuid) -> [i64; 8] {
    let mut counts = [0i64; 8];
    counts[0] = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM events WHERE id = $1")
        .bind(event_id)
        .fetch_one(pool)
        .await
        .unwrap();
    let tables = [
        "event_prices",
        "event_categories",
        "event_locations",
        "event_gallery",
        "event_questions",
        "event_speakers",
        "event_tags",
    ];
    for (slot, table) in tables.iter().enumerate() {
        counts[slot + 1] = sqlx::query_scalar::<_, i64>(&format!(
            "SELECT COUNT(*) FROM {table} WHERE event_id = $1"
        ))
        .bind(event_id)
        .fetch_one(pool)
        .await
        .unwrap();
    }
    counts
}

pub async fn total_rows(pool: &PgPool, table: &str) -> i64 {
    sqlx::query_scalar::<_, i64>(&format!("SELECT COUNT(*) FROM {table}"))
        .fetch_one(pool)
        .await
        .unwrap()
}
