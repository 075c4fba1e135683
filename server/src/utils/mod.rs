pub mod caller;
pub mod error;
pub mod pagination;
pub mod response;
