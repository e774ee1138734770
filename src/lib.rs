pub mod configuration;
pub use configuration::{CliArgs, Config};

pub mod controller;
pub use controller::Controller;

pub mod error_handling;
pub use error_handling::types::{
    ConfigError, ControllerError, ServiceError, StorageError, WebError,
};

pub mod record_service;
pub use record_service::{Confirmation, SearchQuery, UserForm, UserService};

pub mod storage;
pub use storage::{DatabaseStorage, User, UserStorage};

pub mod web_interface;
