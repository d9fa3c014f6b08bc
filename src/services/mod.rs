pub mod collection_service;
pub mod user_service;

pub use collection_service::CollectionService;
pub use user_service::UserService;
