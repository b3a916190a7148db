pub mod app_config;
pub mod database;
pub mod memory_repo;
pub mod order_repo;

pub use database::DbClient;
pub use memory_repo::MemoryStore;
pub use order_repo::PgFulfillmentStore;
