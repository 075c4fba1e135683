//! Scalar reads and writes on the `events` table.

use sqlx::postgres::PgConnection;
use sqlx::{Executor, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::models::event::EVENT_COLUMNS;
use crate::models::{CreateEventPayload, Event, UpdateEventPayload};
use crate::utils::caller::VerifiedCaller;

pub async fn insert_event(
    conn: &mut PgConnection,
    event_id: Uuid,
    caller: &VerifiedCaller,
    payload: &CreateEventPayload,
) -> Result<Event, sqlx::Error> {
    let sql = format!(
        "INSERT INTO events (id, title, short_description, description, event_type, \
         timezone_id, start_date, end_date, contact, email, currency_code, is_private, \
         is_redacted, is_active, created_by) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15) \
         RETURNING {EVENT_COLUMNS}"
    );

    sqlx::query_as::<_, Event>(&sql)
        .bind(event_id)
        .bind(payload.title.trim())
        .bind(&payload.short_description)
        .bind(&payload.description)
        .bind(payload.event_type)
        .bind(payload.timezone_id)
        .bind(payload.start_date)
        .bind(payload.end_date)
        .bind(&payload.contact)
        .bind(&payload.email)
        .bind(&payload.currency_code)
        .bind(payload.is_private)
        .bind(payload.is_redacted)
        .bind(payload.is_active)
        .bind(caller.user_id())
        .fetch_one(&mut *conn)
        .await
}

pub async fn find_event<'c, E>(executor: E, event_id: Uuid) -> Result<Option<Event>, sqlx::Error>
where
    E: Executor<'c, Database = Postgres>,
{
    let sql = format!("SELECT {EVENT_COLUMNS} FROM events WHERE id = $1");
    sqlx::query_as::<_, Event>(&sql)
        .bind(event_id)
        .fetch_optional(executor)
        .await
}

pub async fn event_exists(conn: &mut PgConnection, event_id: Uuid) -> Result<bool, sqlx::Error> {
    sqlx::query_scalar::<_, bool>("SELECT EXISTS (SELECT 1 FROM events WHERE id = $1)")
        .bind(event_id)
        .fetch_one(&mut *conn)
        .await
}

/// Apply the scalar fields present in `payload`; absent fields keep their
/// stored value and an explicit `null` clears a nullable column. Returns the
/// row as it stands after the update.
pub async fn update_event(
    conn: &mut PgConnection,
    event_id: Uuid,
    payload: &UpdateEventPayload,
) -> Result<Option<Event>, sqlx::Error> {
    let mut builder = update_statement(event_id, payload);
    builder
        .build_query_as::<Event>()
        .fetch_optional(&mut *conn)
        .await
}

fn update_statement(event_id: Uuid, payload: &UpdateEventPayload) -> QueryBuilder<'_, Postgres> {
    let mut builder = QueryBuilder::new("UPDATE events SET ");
    let mut set = builder.separated(", ");

    if let Some(title) = &payload.title {
        set.push("title = ").push_bind_unseparated(title.trim());
    }
    if let Some(value) = &payload.short_description {
        set.push("short_description = ").push_bind_unseparated(value);
    }
    if let Some(value) = &payload.description {
        set.push("description = ").push_bind_unseparated(value);
    }
    if let Some(value) = payload.event_type {
        set.push("event_type = ").push_bind_unseparated(value);
    }
    if let Some(value) = payload.timezone_id {
        set.push("timezone_id = ").push_bind_unseparated(value);
    }
    if let Some(value) = payload.start_date {
        set.push("start_date = ").push_bind_unseparated(value);
    }
    if let Some(value) = payload.end_date {
        set.push("end_date = ").push_bind_unseparated(value);
    }
    if let Some(value) = &payload.contact {
        set.push("contact = ").push_bind_unseparated(value);
    }
    if let Some(value) = &payload.email {
        set.push("email = ").push_bind_unseparated(value);
    }
    if let Some(value) = &payload.currency_code {
        set.push("currency_code = ").push_bind_unseparated(value);
    }
    if let Some(value) = payload.is_private {
        set.push("is_private = ").push_bind_unseparated(value);
    }
    if let Some(value) = payload.is_redacted {
        set.push("is_redacted = ").push_bind_unseparated(value);
    }
    if let Some(value) = payload.is_active {
        set.push("is_active = ").push_bind_unseparated(value);
    }
    set.push("updated_at = now()");

    builder
        .push(" WHERE id = ")
        .push_bind(event_id)
        .push(" RETURNING ")
        .push(EVENT_COLUMNS);
    builder
}

pub async fn delete_event(conn: &mut PgConnection, event_id: Uuid) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("DELETE FROM events WHERE id = $1")
        .bind(event_id)
        .execute(&mut *conn)
        .await?;
    Ok(result.rows_affected())
}
