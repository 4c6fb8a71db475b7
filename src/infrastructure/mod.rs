pub mod cache;
pub mod database;
pub mod error;
pub mod scylla;
pub mod search;
pub mod storage;

pub use cache::CacheClient;
pub use database::{Database, UserRepository, UserStore};
pub use error::{AppError, AppResult};
pub use scylla::{AuthEvent, AuthEventStore};
pub use search::SearchClient;
pub use storage::ObjectStorage;
