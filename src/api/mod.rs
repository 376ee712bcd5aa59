//! REST API layer: route handlers, DTOs, OpenAPI document and router
//! composition.

pub mod dto;
pub mod handlers;

use axum::Router;
use utoipa::OpenApi;

use crate::app_state::AppState;

/// OpenAPI description of every REST endpoint.
#[derive(Debug, OpenApi)]
#[openapi(
    info(title = "users-service", description = "Users CRUD over PostgreSQL"),
    paths(
        handlers::users::create_user,
        handlers::users::list_users,
        handlers::users::get_user,
        handlers::users::update_user,
        handlers::users::delete_user,
        handlers::system::health_handler,
    ),
    components(schemas(
        dto::UserPayload,
        dto::MessageResponse,
        crate::error::ErrorResponse,
        crate::persistence::User,
        handlers::system::HealthResponse,
    )),
    tags(
        (name = "Users", description = "User CRUD"),
        (name = "System", description = "Service status"),
    )
)]
pub struct ApiDoc;

/// Builds the complete API router with all REST endpoints.
///
/// With the `swagger-ui` feature the interactive docs are served at
/// `/swagger-ui` and the raw document at `/api-docs/openapi.json`.
pub fn build_router() -> Router<AppState> {
    let router = Router::new().merge(handlers::routes());

    #[cfg(feature = "swagger-ui")]
    let router = router.merge(
        utoipa_swagger_ui::SwaggerUi::new("/swagger-ui")
            .url("/api-docs/openapi.json", ApiDoc::openapi()),
    );

    router
}
