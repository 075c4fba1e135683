//! Atomic create / update / delete of an event and its child collections.
//!
//! Each operation owns exactly one transaction. Child writers only ever see
//! the transaction's connection, and every failure rolls back the root write
//! along with whatever children were already written.

use sqlx::postgres::PgConnection;
use sqlx::{PgPool, Postgres, Transaction};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::models::{CreateEventPayload, Event, EventCollections, GalleryImage, UpdateEventPayload};
use crate::repository::{events, purge_children, write_collection, write_location, WriteMode};
use crate::utils::caller::VerifiedCaller;
use crate::utils::error::{AggregateOp, AppError, AppResult};

#[derive(Clone)]
pub struct EventAggregateService {
    pool: PgPool,
}

impl EventAggregateService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    #[instrument(skip(self, caller, payload), fields(user_id = %caller.user_id()))]
    pub async fn create_event_aggregate(
        &self,
        caller: &VerifiedCaller,
        payload: CreateEventPayload,
    ) -> AppResult<Event> {
        payload.validate()?;

        let event_id = Uuid::new_v4();
        let mut tx = self.begin(AggregateOp::Create).await?;
        let outcome = create_in(&mut tx, event_id, caller, &payload).await;
        let event = finish(tx, outcome, AggregateOp::Create).await?;

        info!(%event_id, "Event aggregate created");
        Ok(event)
    }

    #[instrument(skip(self, caller, payload), fields(user_id = %caller.user_id()))]
    pub async fn update_event_aggregate(
        &self,
        caller: &VerifiedCaller,
        event_id: Uuid,
        payload: UpdateEventPayload,
    ) -> AppResult<Event> {
        payload.validate()?;

        let mut tx = self.begin(AggregateOp::Update).await?;
        let outcome = update_in(&mut tx, event_id, &payload).await;
        let event = finish(tx, outcome, AggregateOp::Update).await?;

        info!(%event_id, "Event aggregate updated");
        Ok(event)
    }

    #[instrument(skip(self, caller), fields(user_id = %caller.user_id()))]
    pub async fn delete_event_aggregate(
        &self,
        caller: &VerifiedCaller,
        event_id: Uuid,
    ) -> AppResult<()> {
        let mut tx = self.begin(AggregateOp::Delete).await?;
        let outcome = delete_in(&mut tx, event_id).await;
        let removed_children = finish(tx, outcome, AggregateOp::Delete).await?;

        info!(%event_id, removed_children, "Event aggregate deleted");
        Ok(())
    }

    async fn begin(&self, op: AggregateOp) -> AppResult<Transaction<'static, Postgres>> {
        self.pool
            .begin()
            .await
            .map_err(|e| AppError::from(e).into_persistence(op))
    }
}

/// Commit on success, roll back on failure. The connection goes back to the
/// pool when `tx` is dropped on either path; a dropped, unfinished
/// transaction is rolled back by sqlx itself.
async fn finish<T>(
    tx: Transaction<'static, Postgres>,
    outcome: AppResult<T>,
    op: AggregateOp,
) -> AppResult<T> {
    match outcome {
        Ok(value) => {
            tx.commit()
                .await
                .map_err(|e| AppError::from(e).into_persistence(op))?;
            Ok(value)
        }
        Err(err) => {
            if let Err(rollback_err) = tx.rollback().await {
                warn!(operation = %op, error = %rollback_err, "Rollback failed");
            }
            Err(err.into_persistence(op))
        }
    }
}

async fn create_in(
    conn: &mut PgConnection,
    event_id: Uuid,
    caller: &VerifiedCaller,
    payload: &CreateEventPayload,
) -> AppResult<Event> {
    let event = events::insert_event(conn, event_id, caller, payload).await?;
    write_collections(conn, event_id, &payload.collections, WriteMode::Insert).await?;
    Ok(event)
}

async fn update_in(
    conn: &mut PgConnection,
    event_id: Uuid,
    payload: &UpdateEventPayload,
) -> AppResult<Event> {
    if !events::event_exists(conn, event_id).await? {
        return Err(AppError::event_not_found(event_id));
    }

    let event = events::update_event(conn, event_id, payload)
        .await?
        .ok_or_else(|| AppError::event_not_found(event_id))?;
    write_collections(conn, event_id, &payload.collections, WriteMode::Replace).await?;
    Ok(event)
}

async fn delete_in(conn: &mut PgConnection, event_id: Uuid) -> AppResult<u64> {
    if !events::event_exists(conn, event_id).await? {
        return Err(AppError::event_not_found(event_id));
    }

    let removed = purge_children(conn, event_id).await?;
    if events::delete_event(conn, event_id).await? == 0 {
        return Err(AppError::event_not_found(event_id));
    }
    Ok(removed)
}

/// Hand every collection present in the request to its writer. Collections
/// that are `None` are skipped in both modes.
async fn write_collections(
    conn: &mut PgConnection,
    event_id: Uuid,
    collections: &EventCollections,
    mode: WriteMode,
) -> Result<(), sqlx::Error> {
    if let Some(prices) = &collections.prices {
        write_collection(conn, event_id, prices, mode).await?;
    }
    if let Some(categories) = &collections.categories {
        write_collection(conn, event_id, categories, mode).await?;
    }
    write_location(conn, event_id, collections.location.as_ref(), mode).await?;
    if let Some(paths) = &collections.gallery {
        let gallery = GalleryImage::from_paths(paths);
        write_collection(conn, event_id, &gallery, mode).await?;
    }
    if let Some(questions) = &collections.questionnaire {
        write_collection(conn, event_id, questions, mode).await?;
    }
    if let Some(speakers) = &collections.speakers {
        write_collection(conn, event_id, speakers, mode).await?;
    }
    if let Some(tags) = &collections.tags {
        write_collection(conn, event_id, tags, mode).await?;
    }
    Ok(())
}
