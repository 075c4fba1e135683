pub mod aggregate;
pub mod query;

pub use aggregate::EventAggregateService;
pub use query::EventQueryService;
