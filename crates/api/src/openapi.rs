use utoipa::{
    Modify, OpenApi,
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Leettrack Backend API",
        version = env!("CARGO_PKG_VERSION"),
        description = "REST API for the leettrack coding-practice tracker"
    ),
    paths(
        crate::handlers::sync::set_handle,
        crate::handlers::sync::clear_handle,
        crate::handlers::sync::trigger_sync,
        crate::handlers::sync::sync_status
    ),
    components(
        schemas(
            leettrack_domain::ApiError,
            leettrack_domain::UserId,
            leettrack_domain::LeetCodeHandle,
            leettrack_domain::Difficulty,
            leettrack_domain::SyncOutcome,
            leettrack_domain::SetHandleRequest,
            leettrack_domain::SetHandleResponse,
            leettrack_domain::SyncScheduledResponse,
            leettrack_domain::SyncRunSummary,
            leettrack_domain::SyncStatusResponse
        )
    ),
    modifiers(&SecuritySchemes),
    tags(
        (name = "sync", description = "LeetCode synchronisation")
    )
)]
pub struct ApiDoc;

struct SecuritySchemes;

impl Modify for SecuritySchemes {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}
