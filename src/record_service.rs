//! Record service module.
//!
//! Adapts storage outcomes to request/response semantics: an absent id becomes
//! `ServiceError::NotFound`, missing input becomes `ServiceError::BadRequest`,
//! and anything the store fails on is passed up as `ServiceError::Storage`.

pub mod types;
pub mod user_service;

pub use types::{Confirmation, SearchQuery, UserForm};
pub use user_service::UserService;
