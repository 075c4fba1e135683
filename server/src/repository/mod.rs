pub mod children;
pub mod events;

pub use children::{
    clear_collection, fetch_collection, purge_children, write_collection, write_location,
    ChildRow, WriteMode,
};
