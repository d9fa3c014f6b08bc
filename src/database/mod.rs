pub mod error;
pub mod manager;
pub mod models;
pub mod query_builder;
pub mod repository;

pub use error::DatabaseError;
pub use manager::DatabaseManager;
pub use repository::Repository;
