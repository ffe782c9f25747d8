mod callsets;
mod service_info;
mod variants;

pub use callsets::get_callsets;
pub use service_info::service_info;
pub use variants::get_variants;

use crate::VariantDataSource;
use crate::types::SourceInfo;
use axum::{Router, routing::get};
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub source: VariantDataSource,
    pub info: SourceInfo,
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/variants", get(get_variants))
        .route("/callsets", get(get_callsets))
        .route("/", get(service_info))
        .route("/service-info", get(service_info))
        .with_state(state)
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()))
}
