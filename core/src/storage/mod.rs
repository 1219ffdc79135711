mod database;
mod kv;
mod kv_repository;

pub use database::{Database, Connection};
pub use kv::{KeyValueStorage, MemoryStorage, SqliteStorage};
pub use kv_repository::{KvRecord, KvRepository};
