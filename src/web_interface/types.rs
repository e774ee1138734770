use log::error;
use serde::{Deserialize, Serialize};
use warp::{http::StatusCode, reply, Reply};

use crate::error_handling::types::ServiceError;

/// API error payload
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiError {
    pub message: String,
}

impl ApiError {
    pub fn reply(status: StatusCode, message: impl Into<String>) -> reply::Response {
        reply::with_status(
            reply::json(&ApiError {
                message: message.into(),
            }),
            status,
        )
        .into_response()
    }
}

/// Turns a service outcome into an HTTP response: JSON body with 200 on success,
/// 404/400 for client errors, and an opaque 500 for storage faults.
pub fn respond<T: Serialize>(result: Result<T, ServiceError>) -> reply::Response {
    match result {
        Ok(body) => reply::with_status(reply::json(&body), StatusCode::OK).into_response(),
        Err(ServiceError::NotFound(id)) => {
            ApiError::reply(StatusCode::NOT_FOUND, format!("user {} not found", id))
        }
        Err(ServiceError::BadRequest(reason)) => ApiError::reply(StatusCode::BAD_REQUEST, reason),
        Err(ServiceError::Storage(e)) => {
            error!("Request failed on storage: {}", e);
            ApiError::reply(StatusCode::INTERNAL_SERVER_ERROR, "internal server error")
        }
    }
}
