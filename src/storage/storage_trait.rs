//! Storage Trait
//!
//! This module defines the `UserStorage` trait, the interface between the record
//! service and a persistent store of user records.
//!
//! Implementors of this trait are responsible for:
//! - Bootstrapping their schema on an empty store
//! - Assigning ids on creation (monotonic, never reused)
//! - Reporting how many rows a write actually touched
//!
//! No method holds a connection past its own return.

use std::future::Future;

use crate::error_handling::types::StorageError;
use crate::storage::types::User;

/// The `UserStorage` trait defines the primitive operations over the user table.
///
/// Absence is not an error here: `get` yields `None`, and `update`/`delete` yield
/// an affected-row count of zero. Deciding what that means for a request is the
/// caller's job.
pub trait UserStorage: Send + Sync {
    /// Creates the user table if it does not exist yet. Idempotent.
    fn ensure_schema(&self) -> impl Future<Output = Result<(), StorageError>> + Send;

    /// Returns every record ordered by ascending id.
    fn list_all(&self) -> impl Future<Output = Result<Vec<User>, StorageError>> + Send;

    /// Looks up a record by primary key.
    fn get(&self, id: i64) -> impl Future<Output = Result<Option<User>, StorageError>> + Send;

    /// Inserts a record and returns it with its store-assigned id.
    fn create(
        &self,
        name: &str,
        email: &str,
    ) -> impl Future<Output = Result<User, StorageError>> + Send;

    /// Overwrites name and email of `id`, returning the affected-row count.
    fn update(
        &self,
        id: i64,
        name: &str,
        email: &str,
    ) -> impl Future<Output = Result<u64, StorageError>> + Send;

    /// Removes `id`, returning the affected-row count.
    fn delete(&self, id: i64) -> impl Future<Output = Result<u64, StorageError>> + Send;

    /// Returns records whose name or email contains `keyword`, ordered by ascending id.
    fn search(&self, keyword: &str)
        -> impl Future<Output = Result<Vec<User>, StorageError>> + Send;

    /// Number of stored records.
    fn count(&self) -> impl Future<Output = Result<u64, StorageError>> + Send;
}
