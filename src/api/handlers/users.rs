//! User CRUD handlers: create, list, get, update, delete.
//!
//! Each handler calls the store exactly once. Body and path rejections are
//! mapped onto [`ServiceError`] so every failure uses the service's JSON
//! shapes instead of Axum's plain-text defaults.

use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};

use crate::api::dto::{MessageResponse, UserPayload};
use crate::app_state::AppState;
use crate::error::{ErrorResponse, ServiceError};
use crate::persistence::User;

/// `POST /users` — Create a user.
///
/// # Errors
///
/// Returns [`ServiceError::InvalidRequest`] on a malformed body and
/// [`ServiceError::Store`] when the insert fails.
#[utoipa::path(
    post,
    path = "/users",
    tag = "Users",
    summary = "Create a user",
    request_body = UserPayload,
    responses(
        (status = 201, description = "User created", body = MessageResponse),
        (status = 400, description = "Invalid body or store failure", body = ErrorResponse),
    )
)]
pub async fn create_user(
    State(state): State<AppState>,
    payload: Result<Json<UserPayload>, JsonRejection>,
) -> Result<impl IntoResponse, ServiceError> {
    let Json(payload) = payload.map_err(invalid_body)?;
    state.users.create(&payload.into()).await?;
    Ok((
        StatusCode::CREATED,
        Json(MessageResponse::new("User created")),
    ))
}

/// `GET /users` — List all users.
///
/// # Errors
///
/// Returns [`ServiceError::Store`] when the query fails.
#[utoipa::path(
    get,
    path = "/users",
    tag = "Users",
    summary = "List users",
    responses(
        (status = 200, description = "All users ordered by id", body = Vec<User>),
        (status = 400, description = "Store failure", body = ErrorResponse),
    )
)]
pub async fn list_users(State(state): State<AppState>) -> Result<Json<Vec<User>>, ServiceError> {
    Ok(Json(state.users.list().await?))
}

/// `GET /users/{id}` — Get one user.
///
/// # Errors
///
/// Returns [`ServiceError::UserNotFound`] if no such user exists and
/// [`ServiceError::Store`] when the query fails.
#[utoipa::path(
    get,
    path = "/users/{id}",
    tag = "Users",
    summary = "Get a user",
    params(
        ("id" = i32, Path, description = "User id"),
    ),
    responses(
        (status = 200, description = "The user", body = User),
        (status = 404, description = "User not found", body = MessageResponse),
        (status = 400, description = "Store failure", body = ErrorResponse),
    )
)]
pub async fn get_user(
    State(state): State<AppState>,
    id: Result<Path<i32>, PathRejection>,
) -> Result<Json<User>, ServiceError> {
    let Path(id) = id.map_err(unmatched_id)?;
    state
        .users
        .get(id)
        .await?
        .map(Json)
        .ok_or(ServiceError::UserNotFound)
}

/// `PUT /users/{id}` — Replace a user's name and email.
///
/// Answers 200 even when no user has the given id.
///
/// # Errors
///
/// Returns [`ServiceError::InvalidRequest`] on a malformed body and
/// [`ServiceError::Store`] when the update fails.
#[utoipa::path(
    put,
    path = "/users/{id}",
    tag = "Users",
    summary = "Update a user",
    params(
        ("id" = i32, Path, description = "User id"),
    ),
    request_body = UserPayload,
    responses(
        (status = 200, description = "User updated", body = MessageResponse),
        (status = 400, description = "Invalid body or store failure", body = ErrorResponse),
    )
)]
pub async fn update_user(
    State(state): State<AppState>,
    id: Result<Path<i32>, PathRejection>,
    payload: Result<Json<UserPayload>, JsonRejection>,
) -> Result<Json<MessageResponse>, ServiceError> {
    let Path(id) = id.map_err(unmatched_id)?;
    let Json(payload) = payload.map_err(invalid_body)?;
    state.users.update(id, &payload.into()).await?;
    Ok(Json(MessageResponse::new("User updated")))
}

/// `DELETE /users/{id}` — Delete a user.
///
/// Answers 200 even when no user has the given id.
///
/// # Errors
///
/// Returns [`ServiceError::Store`] when the delete fails.
#[utoipa::path(
    delete,
    path = "/users/{id}",
    tag = "Users",
    summary = "Delete a user",
    params(
        ("id" = i32, Path, description = "User id"),
    ),
    responses(
        (status = 200, description = "User deleted", body = MessageResponse),
        (status = 400, description = "Store failure", body = ErrorResponse),
    )
)]
pub async fn delete_user(
    State(state): State<AppState>,
    id: Result<Path<i32>, PathRejection>,
) -> Result<Json<MessageResponse>, ServiceError> {
    let Path(id) = id.map_err(unmatched_id)?;
    state.users.delete(id).await?;
    Ok(Json(MessageResponse::new("User deleted")))
}

/// User routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/users", post(create_user).get(list_users))
        .route(
            "/users/{id}",
            get(get_user).put(update_user).delete(delete_user),
        )
}

fn invalid_body(rejection: JsonRejection) -> ServiceError {
    ServiceError::InvalidRequest(rejection.body_text())
}

/// A non-integer id never names a user.
fn unmatched_id(_: PathRejection) -> ServiceError {
    ServiceError::UserNotFound
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use std::sync::Arc;

    use axum::body::Body;
    use axum::http::Request;
    use http_body_util::BodyExt;
    use serde_json::{Value, json};
    use tower::ServiceExt;

    use super::*;
    use crate::persistence::memory::MemoryUserStore;

    fn app_with(store: MemoryUserStore) -> Router {
        routes().with_state(AppState::new(Arc::new(store), None))
    }

    async fn send(app: &Router, method: &str, uri: &str, body: Option<&str>) -> (StatusCode, String) {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(json) => builder
                .header("content-type", "application/json")
                .body(Body::from(json.to_string())),
            None => builder.body(Body::empty()),
        };
        let Ok(request) = request else {
            panic!("request must build");
        };
        let Ok(response) = app.clone().oneshot(request).await else {
            panic!("router is infallible");
        };
        let status = response.status();
        let Ok(collected) = response.into_body().collect().await else {
            panic!("body must be readable");
        };
        let Ok(text) = String::from_utf8(collected.to_bytes().to_vec()) else {
            panic!("body must be UTF-8");
        };
        (status, text)
    }

    fn parse(text: &str) -> Value {
        let Ok(value) = serde_json::from_str(text) else {
            panic!("body must be JSON: {text}");
        };
        value
    }

    #[tokio::test]
    async fn crud_round_trip() {
        let app = app_with(MemoryUserStore::new());

        let (status, body) = send(
            &app,
            "POST",
            "/users",
            Some(r#"{"name":"Alice","email":"a@x.com"}"#),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(parse(&body), json!({ "message": "User created" }));

        let (status, body) = send(&app, "GET", "/users", None).await;
        assert_eq!(status, StatusCode::OK);
        let listed = parse(&body);
        let Some(id) = listed.get(0).and_then(|u| u["id"].as_i64()) else {
            panic!("listed user must carry an id");
        };

        let (status, body) = send(&app, "GET", &format!("/users/{id}"), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body,
            format!(r#"{{"id":{id},"name":"Alice","email":"a@x.com"}}"#)
        );

        let (status, body) = send(
            &app,
            "PUT",
            &format!("/users/{id}"),
            Some(r#"{"name":"Bob","email":"b@x.com"}"#),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(parse(&body), json!({ "message": "User updated" }));

        let (_, body) = send(&app, "GET", &format!("/users/{id}"), None).await;
        assert_eq!(parse(&body), json!({ "id": id, "name": "Bob", "email": "b@x.com" }));

        let (status, body) = send(&app, "DELETE", &format!("/users/{id}"), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(parse(&body), json!({ "message": "User deleted" }));

        let (status, body) = send(&app, "GET", &format!("/users/{id}"), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(parse(&body), json!({ "message": "User not found" }));
    }

    #[tokio::test]
    async fn list_preserves_id_order() {
        let app = app_with(MemoryUserStore::new());
        for name in ["a", "b", "c"] {
            let body = format!(r#"{{"name":"{name}","email":"{name}@x.com"}}"#);
            let (status, _) = send(&app, "POST", "/users", Some(&body)).await;
            assert_eq!(status, StatusCode::CREATED);
        }

        let (status, body) = send(&app, "GET", "/users", None).await;
        assert_eq!(status, StatusCode::OK);
        let Some(users) = parse(&body).as_array().cloned() else {
            panic!("list must be an array");
        };
        let names: Vec<&str> = users.iter().filter_map(|u| u["name"].as_str()).collect();
        assert_eq!(names, ["a", "b", "c"]);
    }

    #[tokio::test]
    async fn unknown_id_is_not_found() {
        let app = app_with(MemoryUserStore::new());
        let (status, body) = send(&app, "GET", "/users/999999", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(parse(&body), json!({ "message": "User not found" }));
    }

    #[tokio::test]
    async fn non_integer_id_is_not_found() {
        let app = app_with(MemoryUserStore::new());
        let (status, body) = send(&app, "GET", "/users/abc", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(parse(&body), json!({ "message": "User not found" }));
    }

    #[tokio::test]
    async fn writes_on_missing_id_still_succeed() {
        let app = app_with(MemoryUserStore::new());

        let (status, _) = send(
            &app,
            "PUT",
            "/users/42",
            Some(r#"{"name":"Nobody","email":"n@x.com"}"#),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let (status, _) = send(&app, "DELETE", "/users/42", None).await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn missing_field_is_bad_request() {
        let app = app_with(MemoryUserStore::new());
        let (status, body) = send(&app, "POST", "/users", Some(r#"{"name":"Alice"}"#)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        let Some(message) = parse(&body)["error"].as_str().map(str::to_string) else {
            panic!("error body must carry a message");
        };
        assert!(message.contains("missing field `email`"));
    }

    #[tokio::test]
    async fn explicit_null_field_is_stored_as_null() {
        let app = app_with(MemoryUserStore::new());

        let (status, _) = send(
            &app,
            "POST",
            "/users",
            Some(r#"{"name":null,"email":"n@x.com"}"#),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);

        let (status, body) = send(&app, "GET", "/users/1", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, r#"{"id":1,"name":null,"email":"n@x.com"}"#);
    }

    #[tokio::test]
    async fn malformed_json_is_bad_request() {
        let app = app_with(MemoryUserStore::new());
        let (status, body) = send(&app, "PUT", "/users/1", Some("{not json")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(parse(&body)["error"].is_string());
    }

    #[tokio::test]
    async fn missing_content_type_is_bad_request() {
        let app = app_with(MemoryUserStore::new());
        let Ok(request) = Request::builder()
            .method("POST")
            .uri("/users")
            .body(Body::from(r#"{"name":"Alice","email":"a@x.com"}"#))
        else {
            panic!("request must build");
        };
        let Ok(response) = app.oneshot(request).await else {
            panic!("router is infallible");
        };
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn store_failure_surfaces_raw_message_as_bad_request() {
        let raw = "relation \"users\" does not exist";
        let app = app_with(MemoryUserStore::failing(raw));

        let (status, body) = send(&app, "GET", "/users", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(parse(&body), json!({ "error": raw }));

        let (status, body) = send(&app, "GET", "/users/1", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(parse(&body), json!({ "error": raw }));

        let (status, _) = send(
            &app,
            "POST",
            "/users",
            Some(r#"{"name":"Alice","email":"a@x.com"}"#),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = send(&app, "DELETE", "/users/1", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}
