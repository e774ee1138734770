//! SeaORM entity model used by the database storage backend.
//!
//! Maps to the `users` table created by `DatabaseStorage::ensure_schema`.

use sea_orm::entity::prelude::*;

/// Users table entity model.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "users")]
pub struct Model {
    /// Auto-increment row id, assigned by SQLite
    #[sea_orm(primary_key)]
    pub id: i64,
    pub name: String,
    pub email: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
