use sqlx::PgPool;

use crate::services::{EventAggregateService, EventQueryService};

/// Shared handler state. Both services hold clones of the same pool.
#[derive(Clone)]
pub struct AppState {
    pub aggregates: EventAggregateService,
    pub queries: EventQueryService,
}

impl AppState {
    pub fn new(pool: PgPool) -> Self {
        Self {
            aggregates: EventAggregateService::new(pool.clone()),
            queries: EventQueryService::new(pool),
        }
    }
}
