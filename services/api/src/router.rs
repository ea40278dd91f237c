//! Axum Router Configuration
//!
//! This module defines the HTTP routing for the proxy, including the chat
//! endpoint and the OpenAPI documentation.

use crate::{handlers, models::ErrorResponse, state::AppState};

use axum::{Router, routing::get};
use movie_genius_core::protocol::CHAT_PATH;
use std::sync::Arc;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(
    paths(handlers::chat),
    components(schemas(ErrorResponse)),
    tags(
        (name = "MovieGenius Proxy", description = "Forwards chat messages to the movie recommendation agent")
    )
)]
pub struct ApiDoc;

/// Creates the main Axum router for the application.
pub fn create_router(app_state: Arc<AppState>) -> Router {
    let api_router = Router::new()
        .route(CHAT_PATH, get(handlers::chat))
        .with_state(app_state);

    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .merge(api_router)
}
