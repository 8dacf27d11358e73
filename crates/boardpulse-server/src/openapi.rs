use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Json};
use axum::routing::get;
use axum::Router;
use std::sync::Arc;
use utoipa::openapi::OpenApi;

/// `/v1/openapi.json` and `/v1/openapi.yaml` serving the merged document.
pub fn spec_routes(spec: Arc<OpenApi>) -> Router {
    let json_spec = spec.clone();
    Router::new()
        .route(
            "/v1/openapi.json",
            get(move || {
                let spec = json_spec.clone();
                async move { Json(spec.as_ref().clone()) }
            }),
        )
        .route(
            "/v1/openapi.yaml",
            get(move || {
                let spec = spec.clone();
                async move { openapi_yaml(spec).await }
            }),
        )
}

async fn openapi_yaml(spec: Arc<OpenApi>) -> impl IntoResponse {
    match serde_yaml::to_string(spec.as_ref()) {
        Ok(yaml) => (StatusCode::OK, [(header::CONTENT_TYPE, "text/yaml")], yaml).into_response(),
        Err(e) => {
            tracing::error!(error = %e, "Failed to serialize OpenAPI YAML");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to serialize YAML".to_string(),
            )
                .into_response()
        }
    }
}
