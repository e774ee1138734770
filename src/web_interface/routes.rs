use std::convert::Infallible;
use std::sync::Arc;

use log::error;
use warp::filters::path::Tail;
use warp::{http::StatusCode, reply, Filter, Rejection, Reply};

use super::assets::serve_asset;
use super::types::{respond, ApiError};
use crate::record_service::{SearchQuery, UserForm, UserService};
use crate::storage::storage_trait::UserStorage;

/// Largest accepted request body, in bytes
const MAX_FORM_BYTES: u64 = 16 * 1024;

type SharedService<S> = Arc<UserService<S>>;

fn with_service<S: UserStorage + 'static>(
    service: SharedService<S>,
) -> impl Filter<Extract = (SharedService<S>,), Error = Infallible> + Clone {
    warp::any().map(move || service.clone())
}

/// `name`/`email` body, urlencoded or JSON; absent fields are left to the service to reject
fn user_form() -> impl Filter<Extract = (UserForm,), Error = Rejection> + Clone {
    warp::body::content_length_limit(MAX_FORM_BYTES).and(
        warp::body::form()
            .or(warp::body::json())
            .unify(),
    )
}

/// GET /
pub fn index_route() -> impl Filter<Extract = (reply::Response,), Error = Rejection> + Clone {
    warp::path::end()
        .and(warp::get())
        .map(|| serve_asset("index.html"))
}

/// GET /static/*
pub fn static_route() -> impl Filter<Extract = (reply::Response,), Error = Rejection> + Clone {
    warp::path("static")
        .and(warp::path::tail())
        .and(warp::get())
        .map(|tail: Tail| serve_asset(tail.as_str()))
}

/// GET /users
pub fn list_users_route<S: UserStorage + 'static>(
    service: SharedService<S>,
) -> impl Filter<Extract = (reply::Response,), Error = Rejection> + Clone {
    warp::path!("users")
        .and(warp::get())
        .and(with_service(service))
        .and_then(|service: SharedService<S>| async move {
            Ok::<_, Rejection>(respond(service.list().await))
        })
}

/// GET /users/:id
pub fn get_user_route<S: UserStorage + 'static>(
    service: SharedService<S>,
) -> impl Filter<Extract = (reply::Response,), Error = Rejection> + Clone {
    warp::path!("users" / i64)
        .and(warp::get())
        .and(with_service(service))
        .and_then(|id: i64, service: SharedService<S>| async move {
            Ok::<_, Rejection>(respond(service.get(id).await))
        })
}

/// POST /users
pub fn create_user_route<S: UserStorage + 'static>(
    service: SharedService<S>,
) -> impl Filter<Extract = (reply::Response,), Error = Rejection> + Clone {
    warp::path!("users")
        .and(warp::post())
        .and(user_form())
        .and(with_service(service))
        .and_then(|form: UserForm, service: SharedService<S>| async move {
            Ok::<_, Rejection>(respond(service.create(form).await))
        })
}

/// PUT /users/:id
pub fn update_user_route<S: UserStorage + 'static>(
    service: SharedService<S>,
) -> impl Filter<Extract = (reply::Response,), Error = Rejection> + Clone {
    warp::path!("users" / i64)
        .and(warp::put())
        .and(user_form())
        .and(with_service(service))
        .and_then(|id: i64, form: UserForm, service: SharedService<S>| async move {
            Ok::<_, Rejection>(respond(service.update(id, form).await))
        })
}

/// DELETE /users/:id
pub fn delete_user_route<S: UserStorage + 'static>(
    service: SharedService<S>,
) -> impl Filter<Extract = (reply::Response,), Error = Rejection> + Clone {
    warp::path!("users" / i64)
        .and(warp::delete())
        .and(with_service(service))
        .and_then(|id: i64, service: SharedService<S>| async move {
            Ok::<_, Rejection>(respond(service.delete(id).await))
        })
}

/// GET /search?keyword=
pub fn search_route<S: UserStorage + 'static>(
    service: SharedService<S>,
) -> impl Filter<Extract = (reply::Response,), Error = Rejection> + Clone {
    warp::path!("search")
        .and(warp::get())
        .and(warp::query::<SearchQuery>())
        .and(with_service(service))
        .and_then(|query: SearchQuery, service: SharedService<S>| async move {
            Ok::<_, Rejection>(respond(service.search(query).await))
        })
}

fn cors(origins: &[String]) -> warp::cors::Cors {
    let builder = warp::cors()
        .allow_methods(vec!["GET", "POST", "PUT", "DELETE"])
        .allow_header("content-type");
    if origins.is_empty() {
        builder.allow_any_origin().build()
    } else {
        builder
            .allow_origins(origins.iter().map(String::as_str))
            .build()
    }
}

/// Renders rejections that no route turned into a response as JSON errors.
pub async fn handle_rejection(err: Rejection) -> Result<reply::Response, Infallible> {
    let (status, message) = if err.is_not_found() {
        (StatusCode::NOT_FOUND, "not found".to_string())
    } else if let Some(e) = err.find::<warp::filters::body::BodyDeserializeError>() {
        (StatusCode::BAD_REQUEST, e.to_string())
    } else if let Some(e) = err.find::<warp::reject::InvalidQuery>() {
        (StatusCode::BAD_REQUEST, e.to_string())
    } else if let Some(e) = err.find::<warp::reject::LengthRequired>() {
        (StatusCode::LENGTH_REQUIRED, e.to_string())
    } else if let Some(e) = err.find::<warp::reject::PayloadTooLarge>() {
        (StatusCode::PAYLOAD_TOO_LARGE, e.to_string())
    } else if let Some(e) = err.find::<warp::cors::CorsForbidden>() {
        (StatusCode::FORBIDDEN, e.to_string())
    } else if let Some(e) = err.find::<warp::reject::UnsupportedMediaType>() {
        (StatusCode::UNSUPPORTED_MEDIA_TYPE, e.to_string())
    } else if let Some(e) = err.find::<warp::reject::MethodNotAllowed>() {
        (StatusCode::METHOD_NOT_ALLOWED, e.to_string())
    } else {
        error!("Unhandled rejection: {:?}", err);
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            "internal server error".to_string(),
        )
    };
    Ok(ApiError::reply(status, message))
}

/// The complete HTTP surface: landing page, static assets and the user API,
/// with CORS, JSON error rendering and request logging.
pub fn routes<S: UserStorage + 'static>(
    service: SharedService<S>,
    cors_origins: &[String],
) -> impl Filter<Extract = (impl Reply,), Error = Infallible> + Clone {
    let users = list_users_route(service.clone())
        .or(get_user_route(service.clone()))
        .unify()
        .or(create_user_route(service.clone()))
        .unify()
        .or(update_user_route(service.clone()))
        .unify()
        .or(delete_user_route(service.clone()))
        .unify()
        .or(search_route(service))
        .unify();

    index_route()
        .or(static_route())
        .unify()
        .or(users)
        .unify()
        .recover(handle_rejection)
        .with(cors(cors_origins))
        .recover(handle_rejection)
        .with(warp::log("roster"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::database_storage::DatabaseStorage;
    use crate::storage::types::User;
    use sea_orm::{ConnectionTrait, Database};
    use tempfile::TempDir;

    async fn temp_service() -> (TempDir, SharedService<DatabaseStorage>) {
        let dir = TempDir::new().unwrap();
        let storage = DatabaseStorage::open(dir.path().join("test.db")).await.unwrap();
        storage.ensure_schema().await.unwrap();
        (dir, Arc::new(UserService::new(storage)))
    }

    fn form_request(method: &str, path: &str, body: &str) -> warp::test::RequestBuilder {
        warp::test::request()
            .method(method)
            .path(path)
            .header("content-type", "application/x-www-form-urlencoded")
            .body(body.to_string())
    }

    fn message(body: &[u8]) -> String {
        serde_json::from_slice::<ApiError>(body).unwrap().message
    }

    #[tokio::test]
    async fn test_list_empty_returns_empty_array() {
        let (_dir, service) = temp_service().await;
        let api = routes(service, &[]);

        let res = warp::test::request().path("/users/").reply(&api).await;
        assert_eq!(res.status(), StatusCode::OK);
        let users: Vec<User> = serde_json::from_slice(res.body()).unwrap();
        assert!(users.is_empty());
    }

    #[tokio::test]
    async fn test_paths_match_with_and_without_trailing_slash() {
        let (_dir, service) = temp_service().await;
        let api = routes(service, &[]);

        for path in ["/users", "/users/", "/search?keyword=", "/search/?keyword="] {
            let res = warp::test::request().path(path).reply(&api).await;
            assert_eq!(res.status(), StatusCode::OK, "{}", path);
        }
    }

    #[tokio::test]
    async fn test_create_and_fetch() {
        let (_dir, service) = temp_service().await;
        let api = routes(service, &[]);

        let res = form_request("POST", "/users/", "name=Ann&email=a%40x.com")
            .reply(&api)
            .await;
        assert_eq!(res.status(), StatusCode::OK);
        let created: serde_json::Value = serde_json::from_slice(res.body()).unwrap();
        assert_eq!(created["message"], "user created");
        let id = created["id"].as_i64().unwrap();

        let res = warp::test::request()
            .path(&format!("/users/{}", id))
            .reply(&api)
            .await;
        assert_eq!(res.status(), StatusCode::OK);
        let user: User = serde_json::from_slice(res.body()).unwrap();
        assert_eq!(
            user,
            User {
                id,
                name: "Ann".into(),
                email: "a@x.com".into()
            }
        );
    }

    #[tokio::test]
    async fn test_create_missing_field_is_bad_request() {
        let (_dir, service) = temp_service().await;
        let api = routes(service.clone(), &[]);

        let res = form_request("POST", "/users/", "name=Ann").reply(&api).await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        assert!(message(res.body()).contains("email"));

        let res = form_request("POST", "/users/", "name=&email=a%40x.com")
            .reply(&api)
            .await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        assert!(message(res.body()).contains("name"));

        assert!(service.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_unknown_id_is_not_found_for_get_put_delete() {
        let (_dir, service) = temp_service().await;
        let api = routes(service, &[]);

        let res = warp::test::request().path("/users/99").reply(&api).await;
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
        assert_eq!(message(res.body()), "user 99 not found");

        let res = form_request("PUT", "/users/99", "name=X&email=y")
            .reply(&api)
            .await;
        assert_eq!(res.status(), StatusCode::NOT_FOUND);

        let res = warp::test::request()
            .method("DELETE")
            .path("/users/99")
            .reply(&api)
            .await;
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_non_numeric_id_is_not_found() {
        let (_dir, service) = temp_service().await;
        let api = routes(service, &[]);

        let res = warp::test::request().path("/users/abc").reply(&api).await;
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_wrong_method_is_method_not_allowed() {
        let (_dir, service) = temp_service().await;
        let api = routes(service, &[]);

        let res = warp::test::request()
            .method("DELETE")
            .path("/users/")
            .reply(&api)
            .await;
        assert_eq!(res.status(), StatusCode::METHOD_NOT_ALLOWED);
    }

    #[tokio::test]
    async fn test_search() {
        let (_dir, service) = temp_service().await;
        let api = routes(service, &[]);
        form_request("POST", "/users/", "name=Ann&email=a%40x.com")
            .reply(&api)
            .await;
        form_request("POST", "/users/", "name=Bob&email=b%40x.com")
            .reply(&api)
            .await;

        let res = warp::test::request().path("/search/").reply(&api).await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        assert!(message(res.body()).contains("keyword"));

        let res = warp::test::request()
            .path("/search/?keyword=an")
            .reply(&api)
            .await;
        assert_eq!(res.status(), StatusCode::OK);
        let found: Vec<User> = serde_json::from_slice(res.body()).unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].name, "Ann");

        let res = warp::test::request()
            .path("/search/?keyword=")
            .reply(&api)
            .await;
        let found: Vec<User> = serde_json::from_slice(res.body()).unwrap();
        assert_eq!(found.len(), 2);
        assert!(found[0].id < found[1].id);

        let res = warp::test::request()
            .path("/search/?keyword=nobody")
            .reply(&api)
            .await;
        assert_eq!(res.status(), StatusCode::OK);
        let found: Vec<User> = serde_json::from_slice(res.body()).unwrap();
        assert!(found.is_empty());
    }

    #[tokio::test]
    async fn test_storage_fault_is_opaque_server_error() {
        let (dir, service) = temp_service().await;
        let api = routes(service, &[]);

        let url = format!("sqlite://{}?mode=rwc", dir.path().join("test.db").display());
        let conn = Database::connect(url).await.unwrap();
        conn.execute_unprepared("DROP TABLE users;").await.unwrap();

        let res = warp::test::request().path("/users/").reply(&api).await;
        assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(message(res.body()), "internal server error");
    }

    #[tokio::test]
    async fn test_landing_page_and_static_assets() {
        let (_dir, service) = temp_service().await;
        let api = routes(service, &[]);

        let res = warp::test::request().path("/").reply(&api).await;
        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(res.headers()["content-type"], "text/html");
        assert!(String::from_utf8_lossy(res.body()).contains("<html"));

        let res = warp::test::request().path("/static/style.css").reply(&api).await;
        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(res.headers()["content-type"], "text/css");

        let res = warp::test::request()
            .path("/static/missing.css")
            .reply(&api)
            .await;
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_cors_headers() {
        let (_dir, service) = temp_service().await;
        let api = routes(service.clone(), &[]);

        let res = warp::test::request()
            .path("/users/")
            .header("origin", "http://elsewhere.test")
            .reply(&api)
            .await;
        assert_eq!(res.status(), StatusCode::OK);
        assert!(res.headers().contains_key("access-control-allow-origin"));

        let restricted = routes(service, &["http://allowed.test".to_string()]);
        let res = warp::test::request()
            .path("/users/")
            .header("origin", "http://elsewhere.test")
            .reply(&restricted)
            .await;
        assert_eq!(res.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_json_body_is_accepted_for_create_and_update() {
        let (_dir, service) = temp_service().await;
        let api = routes(service.clone(), &[]);

        let res = warp::test::request()
            .method("POST")
            .path("/users/")
            .json(&serde_json::json!({"name": "Ann", "email": "a@x.com"}))
            .reply(&api)
            .await;
        assert_eq!(res.status(), StatusCode::OK);
        let created: serde_json::Value = serde_json::from_slice(res.body()).unwrap();
        let id = created["id"].as_i64().unwrap();

        let res = warp::test::request()
            .method("PUT")
            .path(&format!("/users/{}", id))
            .json(&serde_json::json!({"name": "Ann2", "email": "a@x.com"}))
            .reply(&api)
            .await;
        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(service.get(id).await.unwrap().name, "Ann2");

        let res = warp::test::request()
            .method("POST")
            .path("/users/")
            .json(&serde_json::json!({"name": "Bob"}))
            .reply(&api)
            .await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        assert!(message(res.body()).contains("email"));
    }

    #[tokio::test]
    async fn test_unsupported_body_type_is_rejected_as_such() {
        let (_dir, service) = temp_service().await;
        let api = routes(service.clone(), &[]);

        let res = warp::test::request()
            .method("POST")
            .path("/users/")
            .header("content-type", "multipart/form-data; boundary=x")
            .body("--x--")
            .reply(&api)
            .await;
        assert_eq!(res.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);

        let res = warp::test::request()
            .method("PUT")
            .path("/users/1")
            .header("content-type", "text/plain")
            .body("name=Ann")
            .reply(&api)
            .await;
        assert_eq!(res.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
        assert!(service.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_error_responses_carry_cors_headers() {
        let (_dir, service) = temp_service().await;
        let api = routes(service, &[]);

        for (method, path) in [("GET", "/users/99"), ("GET", "/nowhere"), ("DELETE", "/users/")] {
            let res = warp::test::request()
                .method(method)
                .path(path)
                .header("origin", "http://elsewhere.test")
                .reply(&api)
                .await;
            assert!(res.status().is_client_error(), "{} {}", method, path);
            assert!(
                res.headers().contains_key("access-control-allow-origin"),
                "{} {}",
                method,
                path
            );
        }
    }
}
