//! One writer for all seven child tables of an event.
//!
//! Every table is keyed by `event_id`. Writers run on a connection that is
//! already inside the caller's transaction and return `sqlx::Error` untouched.

use sqlx::postgres::{PgConnection, PgRow};
use sqlx::query_builder::Separated;
use sqlx::{Executor, FromRow, Postgres, QueryBuilder};
use tracing::debug;
use uuid::Uuid;

use crate::models::{
    EventCategory, EventLocation, EventPrice, EventQuestion, EventSpeaker, EventTag,
    GalleryImage, LocationInput,
};

/// Postgres caps a single statement at 65535 bind parameters.
const BIND_LIMIT: usize = 65_535;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteMode {
    /// Append rows; used when the event was created in this transaction.
    Insert,
    /// Delete every existing row for the event first, then insert.
    Replace,
}

/// A row shape stored in one of the event's child tables.
pub trait ChildRow: for<'r> FromRow<'r, PgRow> + Send + Sync + Unpin {
    const TABLE: &'static str;
    /// Columns written and read, excluding `event_id`.
    const COLUMNS: &'static [&'static str];
    const ORDER_BY: &'static str;

    /// Push one bind per entry of `COLUMNS`, in the same order.
    fn bind_values<'args>(&self, row: &mut Separated<'_, 'args, Postgres, &'static str>);
}

impl ChildRow for EventPrice {
    const TABLE: &'static str = "event_prices";
    const COLUMNS: &'static [&'static str] = &["currency_id", "price"];
    const ORDER_BY: &'static str = "currency_id";

    fn bind_values<'args>(&self, row: &mut Separated<'_, 'args, Postgres, &'static str>) {
        row.push_bind(self.currency_id).push_bind(self.price);
    }
}

impl ChildRow for EventCategory {
    const TABLE: &'static str = "event_categories";
    const COLUMNS: &'static [&'static str] = &["category_id"];
    const ORDER_BY: &'static str = "category_id";

    fn bind_values<'args>(&self, row: &mut Separated<'_, 'args, Postgres, &'static str>) {
        row.push_bind(self.category_id);
    }
}

impl ChildRow for EventLocation {
    const TABLE: &'static str = "event_locations";
    const COLUMNS: &'static [&'static str] = &["country_id", "state_id", "city_id"];
    const ORDER_BY: &'static str = "country_id, state_id, city_id";

    fn bind_values<'args>(&self, row: &mut Separated<'_, 'args, Postgres, &'static str>) {
        row.push_bind(self.country_id)
            .push_bind(self.state_id)
            .push_bind(self.city_id);
    }
}

impl ChildRow for GalleryImage {
    const TABLE: &'static str = "event_gallery";
    const COLUMNS: &'static [&'static str] = &["image_path", "position"];
    const ORDER_BY: &'static str = "position";

    fn bind_values<'args>(&self, row: &mut Separated<'_, 'args, Postgres, &'static str>) {
        row.push_bind(self.image_path.clone())
            .push_bind(self.position);
    }
}

impl ChildRow for EventQuestion {
    const TABLE: &'static str = "event_questions";
    const COLUMNS: &'static [&'static str] = &["q_key", "question"];
    const ORDER_BY: &'static str = "q_key";

    fn bind_values<'args>(&self, row: &mut Separated<'_, 'args, Postgres, &'static str>) {
        row.push_bind(self.q_key.clone())
            .push_bind(self.question.clone());
    }
}

impl ChildRow for EventSpeaker {
    const TABLE: &'static str = "event_speakers";
    const COLUMNS: &'static [&'static str] = &["name", "designation", "profile_link", "image"];
    const ORDER_BY: &'static str = "id";

    fn bind_values<'args>(&self, row: &mut Separated<'_, 'args, Postgres, &'static str>) {
        row.push_bind(self.name.clone())
            .push_bind(self.designation.clone())
            .push_bind(self.profile_link.clone())
            .push_bind(self.image.clone());
    }
}

impl ChildRow for EventTag {
    const TABLE: &'static str = "event_tags";
    const COLUMNS: &'static [&'static str] = &["tag_id"];
    const ORDER_BY: &'static str = "tag_id";

    fn bind_values<'args>(&self, row: &mut Separated<'_, 'args, Postgres, &'static str>) {
        row.push_bind(self.tag_id);
    }
}

/// Delete every row of `R`'s table belonging to `event_id`.
pub async fn clear_collection<R: ChildRow>(
    conn: &mut PgConnection,
    event_id: Uuid,
) -> Result<u64, sqlx::Error> {
    let sql = format!("DELETE FROM {} WHERE event_id = $1", R::TABLE);
    let result = sqlx::query(&sql).bind(event_id).execute(&mut *conn).await?;
    Ok(result.rows_affected())
}

/// Write `rows` into `R`'s table for `event_id`.
///
/// In `Replace` mode the table is cleared for the event even when `rows` is
/// empty, which is how a client empties a collection.
pub async fn write_collection<R: ChildRow>(
    conn: &mut PgConnection,
    event_id: Uuid,
    rows: &[R],
    mode: WriteMode,
) -> Result<(), sqlx::Error> {
    if mode == WriteMode::Replace {
        let removed = clear_collection::<R>(conn, event_id).await?;
        debug!(table = R::TABLE, %event_id, removed, "cleared child collection");
    }

    if rows.is_empty() {
        return Ok(());
    }

    let insert = format!(
        "INSERT INTO {} (event_id, {}) ",
        R::TABLE,
        R::COLUMNS.join(", ")
    );
    let rows_per_statement = BIND_LIMIT / (R::COLUMNS.len() + 1);

    for chunk in rows.chunks(rows_per_statement) {
        let mut builder: QueryBuilder<Postgres> = QueryBuilder::new(insert.as_str());
        builder.push_values(chunk, |mut values, row| {
            values.push_bind(event_id);
            row.bind_values(&mut values);
        });
        builder.build().execute(&mut *conn).await?;
    }

    debug!(table = R::TABLE, %event_id, inserted = rows.len(), ?mode, "wrote child collection");
    Ok(())
}

/// The location link is a single row and is only written when the input
/// names a country, state and city. Anything less is ignored in both modes,
/// so an incomplete location on update keeps the stored one.
pub async fn write_location(
    conn: &mut PgConnection,
    event_id: Uuid,
    location: Option<&LocationInput>,
    mode: WriteMode,
) -> Result<(), sqlx::Error> {
    let Some(row) = location.and_then(LocationInput::complete) else {
        return Ok(());
    };
    write_collection(conn, event_id, std::slice::from_ref(&row), mode).await
}

/// Remove the event's rows from all seven child tables. Returns the number of
/// rows deleted.
pub async fn purge_children(conn: &mut PgConnection, event_id: Uuid) -> Result<u64, sqlx::Error> {
    let mut removed = 0;
    removed += clear_collection::<EventPrice>(conn, event_id).await?;
    removed += clear_collection::<EventCategory>(conn, event_id).await?;
    removed += clear_collection::<EventLocation>(conn, event_id).await?;
    removed += clear_collection::<GalleryImage>(conn, event_id).await?;
    removed += clear_collection::<EventQuestion>(conn, event_id).await?;
    removed += clear_collection::<EventSpeaker>(conn, event_id).await?;
    removed += clear_collection::<EventTag>(conn, event_id).await?;
    Ok(removed)
}

/// Read one child collection for an event in its natural order.
pub async fn fetch_collection<'c, R, E>(executor: E, event_id: Uuid) -> Result<Vec<R>, sqlx::Error>
where
    R: ChildRow,
    E: Executor<'c, Database = Postgres>,
{
    let sql = format!(
        "SELECT {} FROM {} WHERE event_id = $1 ORDER BY {}",
        R::COLUMNS.join(", "),
        R::TABLE,
        R::ORDER_BY
    );
    sqlx::query_as::<_, R>(&sql)
        .bind(event_id)
        .fetch_all(executor)
        .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    fn insert_sql<R: ChildRow>(rows: &[R]) -> String {
        let mut builder: QueryBuilder<Postgres> = QueryBuilder::new(format!(
            "INSERT INTO {} (event_id, {}) ",
            R::TABLE,
            R::COLUMNS.join(", ")
        ));
        builder.push_values(rows, |mut values, row| {
            values.push_bind(Uuid::nil());
            row.bind_values(&mut values);
        });
        builder.sql().to_string()
    }

    #[test]
    fn price_insert_binds_every_column() {
        let rows = vec![
            EventPrice {
                currency_id: 1,
                price: Decimal::from(10),
            },
            EventPrice {
                currency_id: 2,
                price: Decimal::from(20),
            },
        ];

        assert_eq!(
            insert_sql(&rows),
            "INSERT INTO event_prices (event_id, currency_id, price) VALUES ($1, $2, $3), ($4, $5, $6)"
        );
    }

    #[test]
    fn speaker_insert_covers_optional_fields() {
        let rows = vec![EventSpeaker {
            name: "Ferris".into(),
            designation: None,
            profile_link: Some("https://example.org/ferris".into()),
            image: None,
        }];

        assert_eq!(
            insert_sql(&rows),
            "INSERT INTO event_speakers (event_id, name, designation, profile_link, image) VALUES ($1, $2, $3, $4, $5)"
        );
    }

    #[test]
    fn every_table_binds_as_many_values_as_columns() {
        fn placeholders<R: ChildRow>(row: R) -> usize {
            insert_sql(std::slice::from_ref(&row)).matches('$').count()
        }

        assert_eq!(placeholders(EventCategory { category_id: 1 }), 2);
        assert_eq!(
            placeholders(EventLocation {
                country_id: 1,
                state_id: 1,
                city_id: 1
            }),
            4
        );
        assert_eq!(
            placeholders(GalleryImage {
                image_path: "a.png".into(),
                position: 0
            }),
            3
        );
        assert_eq!(
            placeholders(EventQuestion {
                q_key: "diet".into(),
                question: "Any dietary needs?".into()
            }),
            3
        );
        assert_eq!(placeholders(EventTag { tag_id: 3 }), 2);
    }
}
