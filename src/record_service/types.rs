use serde::{Deserialize, Serialize};

/// Name/email pair as submitted by a client. Either field may be absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct UserForm {
    pub name: Option<String>,
    pub email: Option<String>,
}

impl UserForm {
    pub fn new<N: Into<String>, E: Into<String>>(name: N, email: E) -> Self {
        Self {
            name: Some(name.into()),
            email: Some(email.into()),
        }
    }
}

/// Search query string. `keyword` is required but checked by the service.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct SearchQuery {
    pub keyword: Option<String>,
}

/// Acknowledgement returned by write operations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Confirmation {
    pub id: i64,
    pub message: String,
}

impl Confirmation {
    pub fn created(id: i64) -> Self {
        Self { id, message: "user created".to_string() }
    }

    pub fn updated(id: i64) -> Self {
        Self { id, message: "user updated".to_string() }
    }

    pub fn deleted(id: i64) -> Self {
        Self { id, message: "user deleted".to_string() }
    }
}
