//! Storage subsystem
//!
//! This module owns persistence of user records.
//!
//! Components:
//! - `storage_trait`: the `UserStorage` trait the record service is written against.
//! - `types`: the normalized `User` record shape returned by every backend.
//! - `database_storage`: SQLite implementation using SeaORM over a sqlx pool.
//! - `db_entities`: SeaORM entity model for the `users` table.

pub mod database_storage;
pub mod db_entities;
pub mod storage_trait;
pub mod types;

pub use database_storage::DatabaseStorage;
pub use storage_trait::UserStorage;
pub use types::User;
