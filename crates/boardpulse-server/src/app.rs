use crate::state::AppState;
use crate::{agent, api, logging, openapi};
use axum::http::HeaderValue;
use axum::middleware;
use axum::Router;
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "boardpulse API",
        description = "Trello board status reports written by an AI narrator",
    ),
    tags(
        (name = "Health", description = "Server health"),
        (name = "Boards", description = "Trello boards"),
        (name = "Reports", description = "Generated board reports"),
        (name = "Agent", description = "Scheduled report agent"),
        (name = "Chat", description = "Free-form assistant chat")
    )
)]
struct ApiDoc;

fn cors_layer(origins: &[String]) -> CorsLayer {
    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);
    if origins.is_empty() {
        return layer.allow_origin(Any);
    }

    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|o| match HeaderValue::from_str(o) {
            Ok(v) => Some(v),
            Err(_) => {
                tracing::warn!(origin = %o, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();
    layer.allow_origin(AllowOrigin::list(allowed))
}

pub fn build_http_app(state: AppState) -> Router {
    let (public_router, public_spec) = api::public_routes().split_for_parts();
    let (report_router, report_spec) = agent::api::report_routes().split_for_parts();
    let (agent_router, agent_spec) = agent::api::agent_routes().split_for_parts();

    let mut merged_spec = ApiDoc::openapi();
    merged_spec.merge(public_spec);
    merged_spec.merge(report_spec);
    merged_spec.merge(agent_spec);
    let spec = Arc::new(merged_spec);

    let cors = cors_layer(&state.config.cors_allowed_origins);

    public_router
        .merge(report_router)
        .merge(agent_router)
        .with_state(state)
        .merge(openapi::spec_routes(spec))
        .layer(cors)
        .layer(middleware::from_fn(logging::request_logging))
}
