use log::{debug, info, warn};

use crate::error_handling::types::ServiceError;
use crate::record_service::types::{Confirmation, SearchQuery, UserForm};
use crate::storage::storage_trait::UserStorage;
use crate::storage::types::User;

/// Request-facing operations over user records.
///
/// Every method makes exactly one storage call and keeps nothing between calls,
/// so a single instance can be shared by all request handlers.
pub struct UserService<S: UserStorage> {
    storage: S,
}

impl<S: UserStorage> UserService<S> {
    pub fn new(storage: S) -> Self {
        Self { storage }
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// All users ordered by id. An empty store is not an error.
    pub async fn list(&self) -> Result<Vec<User>, ServiceError> {
        let users = self.storage.list_all().await?;
        debug!("Listed {} users", users.len());
        Ok(users)
    }

    pub async fn get(&self, id: i64) -> Result<User, ServiceError> {
        match self.storage.get(id).await? {
            Some(user) => Ok(user),
            None => {
                warn!("User {} not found", id);
                Err(ServiceError::NotFound(id))
            }
        }
    }

    pub async fn create(&self, form: UserForm) -> Result<Confirmation, ServiceError> {
        let (name, email) = validate(form)?;
        let user = self.storage.create(&name, &email).await?;
        info!("Created user {}", user.id);
        Ok(Confirmation::created(user.id))
    }

    pub async fn update(&self, id: i64, form: UserForm) -> Result<Confirmation, ServiceError> {
        let (name, email) = validate(form)?;
        if self.storage.update(id, &name, &email).await? == 0 {
            warn!("Update of missing user {}", id);
            return Err(ServiceError::NotFound(id));
        }
        info!("Updated user {}", id);
        Ok(Confirmation::updated(id))
    }

    pub async fn delete(&self, id: i64) -> Result<Confirmation, ServiceError> {
        if self.storage.delete(id).await? == 0 {
            warn!("Delete of missing user {}", id);
            return Err(ServiceError::NotFound(id));
        }
        info!("Deleted user {}", id);
        Ok(Confirmation::deleted(id))
    }

    /// Substring search over name and email. An empty keyword matches everyone,
    /// an absent one is rejected.
    pub async fn search(&self, query: SearchQuery) -> Result<Vec<User>, ServiceError> {
        let keyword = query.keyword.ok_or_else(|| {
            warn!("Search without keyword");
            ServiceError::BadRequest("missing query parameter `keyword`".to_string())
        })?;
        let users = self.storage.search(&keyword).await?;
        debug!("Search {:?} matched {} users", keyword, users.len());
        Ok(users)
    }
}

fn validate(form: UserForm) -> Result<(String, String), ServiceError> {
    Ok((required("name", form.name)?, required("email", form.email)?))
}

fn required(field: &str, value: Option<String>) -> Result<String, ServiceError> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => {
            warn!("Rejected request with missing `{}`", field);
            Err(ServiceError::BadRequest(format!("missing field `{}`", field)))
        }
    }
}
