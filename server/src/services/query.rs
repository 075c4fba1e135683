//! Read-only queries over `events`. These run on the pool directly and never
//! join an aggregate write transaction.

use chrono::Utc;
use sqlx::PgPool;
use tracing::{debug, instrument};
use uuid::Uuid;

use crate::models::event::EVENT_COLUMNS;
use crate::models::{Event, EventDetails};
use crate::repository::events;
use crate::utils::error::{AppError, AppResult};
use crate::utils::pagination::{Page, PageRequest};

/// Which side of "now" an event's end date falls on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeWindow {
    Upcoming,
    Previous,
}

impl TimeWindow {
    fn condition(self) -> &'static str {
        match self {
            TimeWindow::Upcoming => "end_date >= $1",
            TimeWindow::Previous => "end_date < $1",
        }
    }
}

#[derive(Clone)]
pub struct EventQueryService {
    pool: PgPool,
}

impl EventQueryService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    #[instrument(skip(self))]
    pub async fn find_all(&self, active_only: bool, request: PageRequest) -> AppResult<Page<Event>> {
        let sql = format!(
            "SELECT {EVENT_COLUMNS} FROM events \
             WHERE ($1 = FALSE OR is_active = TRUE) \
             ORDER BY start_date ASC \
             LIMIT $2 OFFSET $3"
        );
        let items = sqlx::query_as::<_, Event>(&sql)
            .bind(active_only)
            .bind(i64::from(request.limit()))
            .bind(request.offset())
            .fetch_all(&self.pool)
            .await?;

        let total = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM events WHERE ($1 = FALSE OR is_active = TRUE)",
        )
        .bind(active_only)
        .fetch_one(&self.pool)
        .await?;

        Ok(Page::new(items, total, request))
    }

    pub async fn find_by_id(&self, event_id: Uuid) -> AppResult<Event> {
        events::find_event(&self.pool, event_id)
            .await?
            .ok_or_else(|| AppError::event_not_found(event_id))
    }

    pub async fn upcoming_events(&self, request: PageRequest) -> AppResult<Page<Event>> {
        self.by_window(TimeWindow::Upcoming, request).await
    }

    pub async fn previous_events(&self, request: PageRequest) -> AppResult<Page<Event>> {
        self.by_window(TimeWindow::Previous, request).await
    }

    #[instrument(skip(self))]
    async fn by_window(&self, window: TimeWindow, request: PageRequest) -> AppResult<Page<Event>> {
        let now = Utc::now();
        let condition = window.condition();

        let sql = format!(
            "SELECT {EVENT_COLUMNS} FROM events WHERE {condition} \
             ORDER BY created_at DESC \
             LIMIT $2 OFFSET $3"
        );
        let items = sqlx::query_as::<_, Event>(&sql)
            .bind(now)
            .bind(i64::from(request.limit()))
            .bind(request.offset())
            .fetch_all(&self.pool)
            .await?;

        let count_sql = format!("SELECT COUNT(*) FROM events WHERE {condition}");
        let total = sqlx::query_scalar::<_, i64>(&count_sql)
            .bind(now)
            .fetch_one(&self.pool)
            .await?;

        Ok(Page::new(items, total, request))
    }

    /// Active events whose title contains `keyword`, ignoring case.
    ///
    /// Unlike the other listings, no match at all is reported as `NotFound`.
    /// A page past the last match is an empty page.
    #[instrument(skip(self))]
    pub async fn search_events(
        &self,
        request: PageRequest,
        keyword: Option<&str>,
    ) -> AppResult<Page<Event>> {
        let pattern = keyword
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .map(like_pattern);

        let total = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM events \
             WHERE is_active = TRUE AND ($1::text IS NULL OR title ILIKE $1)",
        )
        .bind(&pattern)
        .fetch_one(&self.pool)
        .await?;

        if total == 0 {
            debug!(?pattern, "Search matched no events");
            return Err(AppError::NotFound(
                "No events matched the search".to_string(),
            ));
        }

        let sql = format!(
            "SELECT {EVENT_COLUMNS} FROM events \
             WHERE is_active = TRUE AND ($1::text IS NULL OR title ILIKE $1) \
             ORDER BY start_date ASC \
             LIMIT $2 OFFSET $3"
        );
        let items = sqlx::query_as::<_, Event>(&sql)
            .bind(&pattern)
            .bind(i64::from(request.limit()))
            .bind(request.offset())
            .fetch_all(&self.pool)
            .await?;

        Ok(Page::new(items, total, request))
    }

    /// The event plus its location rows rendered as
    /// `"City, State, Country"`, several locations separated by `"; "`.
    pub async fn event_details(&self, event_id: Uuid) -> AppResult<EventDetails> {
        let sql = format!(
            "SELECT {EVENT_COLUMNS}, \
                 (SELECT string_agg(concat_ws(', ', ci.name, st.name, co.name), '; ' \
                         ORDER BY l.country_id, l.state_id, l.city_id) \
                  FROM event_locations l \
                  LEFT JOIN cities ci ON ci.id = l.city_id \
                  LEFT JOIN states st ON st.id = l.state_id \
                  LEFT JOIN countries co ON co.id = l.country_id \
                  WHERE l.event_id = events.id) AS location \
             FROM events WHERE id = $1"
        );

        sqlx::query_as::<_, EventDetails>(&sql)
            .bind(event_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::event_not_found(event_id))
    }

    /// Every matching event, ordered by start date, as CSV.
    #[instrument(skip(self))]
    pub async fn download(&self, active_only: bool) -> AppResult<Vec<u8>> {
        let sql = format!(
            "SELECT {EVENT_COLUMNS} FROM events \
             WHERE ($1 = FALSE OR is_active = TRUE) \
             ORDER BY start_date ASC"
        );
        let items = sqlx::query_as::<_, Event>(&sql)
            .bind(active_only)
            .fetch_all(&self.pool)
            .await?;

        render_csv(&items)
    }
}

/// Build an `ILIKE` pattern matching `keyword` anywhere, with the pattern
/// metacharacters in the keyword taken literally.
pub fn like_pattern(keyword: &str) -> String {
    let mut pattern = String::with_capacity(keyword.len() + 2);
    pattern.push('%');
    for ch in keyword.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(ch);
    }
    pattern.push('%');
    pattern
}

const CSV_HEADER: [&str; 10] = [
    "id",
    "title",
    "eventType",
    "startDate",
    "endDate",
    "contact",
    "email",
    "currencyCode",
    "isActive",
    "createdAt",
];

pub fn render_csv(items: &[Event]) -> AppResult<Vec<u8>> {
    let csv_error = |e: csv::Error| AppError::InternalServerError(format!("csv export: {e}"));

    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(CSV_HEADER).map_err(csv_error)?;

    for event in items {
        writer
            .write_record([
                event.id.to_string(),
                event.title.clone(),
                event.event_type.to_string(),
                event.start_date.to_rfc3339(),
                event.end_date.to_rfc3339(),
                event.contact.clone().unwrap_or_default(),
                event.email.clone().unwrap_or_default(),
                event.currency_code.clone().unwrap_or_default(),
                event.is_active.to_string(),
                event.created_at.to_rfc3339(),
            ])
            .map_err(csv_error)?;
    }

    writer
        .into_inner()
        .map_err(|e| AppError::InternalServerError(format!("csv export: {e}")))
}
