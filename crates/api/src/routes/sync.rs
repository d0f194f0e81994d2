//! Sync routes.

use std::sync::Arc;
use std::time::Duration;

use axum::{
    Router,
    routing::{get, post, put},
};
use tower_governor::{
    GovernorLayer, governor::GovernorConfigBuilder, key_extractor::SmartIpKeyExtractor,
};

use crate::AppState;
use crate::handlers::sync::{clear_handle, set_handle, sync_status, trigger_sync};

/// Builds sync routes.
pub fn router(_state: Arc<AppState>) -> Router<Arc<AppState>> {
    let trigger_router = match GovernorConfigBuilder::default()
        .key_extractor(SmartIpKeyExtractor)
        .period(Duration::from_secs(60))
        .burst_size(10)
        .finish()
    {
        Some(config) => post(trigger_sync).route_layer(GovernorLayer {
            config: Arc::new(config),
        }),
        None => {
            tracing::error!("Invalid sync rate-limit config; rate limit disabled");
            post(trigger_sync)
        }
    };

    Router::new()
        .route("/v1/sync/handle", put(set_handle).delete(clear_handle))
        .route("/v1/sync/run", trigger_router)
        .route("/v1/sync/status", get(sync_status))
}
