use serde::{Deserialize, Serialize};

use crate::storage::db_entities;

/// A stored user record as seen by callers of the storage layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub email: String,
}

impl From<db_entities::Model> for User {
    fn from(model: db_entities::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            email: model.email,
        }
    }
}
