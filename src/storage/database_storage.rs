use std::path::{Path, PathBuf};

use log::{debug, error, info};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ColumnTrait, Condition, ConnectOptions, ConnectionTrait, Database, DatabaseConnection,
    EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, Set,
};

use crate::error_handling::types::StorageError;
use crate::storage::db_entities as users;
use crate::storage::storage_trait::UserStorage;
use crate::storage::types::User;

const CREATE_USERS_TABLE: &str = "CREATE TABLE IF NOT EXISTS users (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    email TEXT NOT NULL
);";

/// SQLite-backed user storage.
///
/// Holds a connection pool rather than a connection: every operation checks a
/// connection out for a single statement and hands it back when the statement
/// completes or fails. Writers are serialized by SQLite itself.
pub struct DatabaseStorage {
    conn: DatabaseConnection,
    path: PathBuf,
}

impl DatabaseStorage {
    /// Default database filename used in the application's working directory
    pub const DEFAULT_DB_FILE: &'static str = "users.db";

    /// Default upper bound on pooled connections
    pub const DEFAULT_MAX_CONNECTIONS: u32 = 5;

    /// Create or open the database at `path` with the default pool size
    pub async fn open<P: AsRef<Path>>(path: P) -> Result<Self, StorageError> {
        Self::open_with(path, Self::DEFAULT_MAX_CONNECTIONS).await
    }

    /// Create or open the database at `path`, creating parent directories as needed
    pub async fn open_with<P: AsRef<Path>>(
        path: P,
        max_connections: u32,
    ) -> Result<Self, StorageError> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| {
                error!("Failed to create database dir {}: {}", parent.display(), e);
                StorageError::WriteFailed
            })?;
        }

        let mut opts = ConnectOptions::new(format!("sqlite://{}?mode=rwc", path.display()));
        opts.max_connections(max_connections).sqlx_logging(false);
        let conn = Database::connect(opts).await.map_err(|e| {
            error!("Failed to open database {}: {}", path.display(), e);
            StorageError::ConnectionFailed
        })?;

        info!("Database opened at {}", path.display());
        Ok(Self { conn, path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl UserStorage for DatabaseStorage {
    async fn ensure_schema(&self) -> Result<(), StorageError> {
        self.conn
            .execute_unprepared(CREATE_USERS_TABLE)
            .await
            .map_err(|e| {
                error!("Failed to create users table: {}", e);
                StorageError::WriteFailed
            })?;
        debug!("Schema ensured for {}", self.path.display());
        Ok(())
    }

    async fn list_all(&self) -> Result<Vec<User>, StorageError> {
        let rows = users::Entity::find()
            .order_by_asc(users::Column::Id)
            .all(&self.conn)
            .await
            .map_err(|e| {
                error!("Failed to list users: {}", e);
                StorageError::ReadFailed
            })?;
        Ok(rows.into_iter().map(User::from).collect())
    }

    async fn get(&self, id: i64) -> Result<Option<User>, StorageError> {
        let row = users::Entity::find_by_id(id)
            .one(&self.conn)
            .await
            .map_err(|e| {
                error!("Failed to load user {}: {}", id, e);
                StorageError::ReadFailed
            })?;
        Ok(row.map(User::from))
    }

    async fn create(&self, name: &str, email: &str) -> Result<User, StorageError> {
        let row = users::ActiveModel {
            name: Set(name.to_owned()),
            email: Set(email.to_owned()),
            ..Default::default()
        };
        let inserted = users::Entity::insert(row)
            .exec(&self.conn)
            .await
            .map_err(|e| {
                error!("Failed to insert user: {}", e);
                StorageError::WriteFailed
            })?;
        Ok(User {
            id: inserted.last_insert_id,
            name: name.to_owned(),
            email: email.to_owned(),
        })
    }

    async fn update(&self, id: i64, name: &str, email: &str) -> Result<u64, StorageError> {
        let result = users::Entity::update_many()
            .col_expr(users::Column::Name, Expr::value(name))
            .col_expr(users::Column::Email, Expr::value(email))
            .filter(users::Column::Id.eq(id))
            .exec(&self.conn)
            .await
            .map_err(|e| {
                error!("Failed to update user {}: {}", id, e);
                StorageError::WriteFailed
            })?;
        Ok(result.rows_affected)
    }

    async fn delete(&self, id: i64) -> Result<u64, StorageError> {
        let result = users::Entity::delete_by_id(id)
            .exec(&self.conn)
            .await
            .map_err(|e| {
                error!("Failed to delete user {}: {}", id, e);
                StorageError::WriteFailed
            })?;
        Ok(result.rows_affected)
    }

    async fn search(&self, keyword: &str) -> Result<Vec<User>, StorageError> {
        // LIKE wildcards in the keyword are passed through unescaped
        let rows = users::Entity::find()
            .filter(
                Condition::any()
                    .add(users::Column::Name.contains(keyword))
                    .add(users::Column::Email.contains(keyword)),
            )
            .order_by_asc(users::Column::Id)
            .all(&self.conn)
            .await
            .map_err(|e| {
                error!("Failed to search users for {:?}: {}", keyword, e);
                StorageError::ReadFailed
            })?;
        Ok(rows.into_iter().map(User::from).collect())
    }

    async fn count(&self) -> Result<u64, StorageError> {
        users::Entity::find().count(&self.conn).await.map_err(|e| {
            error!("Failed to count users: {}", e);
            StorageError::ReadFailed
        })
    }
}
