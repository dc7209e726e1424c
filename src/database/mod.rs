pub mod manager;
pub mod record;
pub mod repository;

pub use manager::{DatabaseError, DatabaseManager};
pub use record::{Record, RecordError};
pub use repository::Repository;
