//! Sync handlers.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
};
use validator::Validate;

use crate::AppState;
use crate::middleware::auth::AuthUser;
use leettrack_config::MAX_FETCH_LIMIT;
use leettrack_domain::{
    DomainError, LeetCodeHandle, SYNC_PLATFORM, SetHandleRequest, SetHandleResponse,
    SyncScheduledResponse, SyncStatusResponse,
};

/// Registers a LeetCode handle for the current user, verifying it upstream.
#[utoipa::path(
    put,
    path = "/v1/sync/handle",
    tag = "sync",
    request_body = SetHandleRequest,
    responses(
        (status = 200, description = "Handle stored", body = SetHandleResponse),
        (status = 404, description = "No such LeetCode user"),
        (status = 502, description = "LeetCode unreachable")
    ),
    security(("bearer_auth" = []))
)]
pub async fn set_handle(
    State(state): State<Arc<AppState>>,
    AuthUser(user_id): AuthUser,
    Json(req): Json<SetHandleRequest>,
) -> Result<Json<SetHandleResponse>, DomainError> {
    req.validate().map_err(DomainError::from_validation_errors)?;

    let handle =
        LeetCodeHandle::new(req.handle).map_err(|e| DomainError::Validation(e.to_string()))?;

    let exists = state
        .leetcode
        .handle_exists(&handle)
        .await
        .map_err(|e| DomainError::Upstream(e.to_string()))?;
    if !exists {
        return Err(DomainError::NotFound(format!(
            "LeetCode user '{handle}' not found"
        )));
    }

    let updated = state
        .user_repo
        .set_leetcode_handle(user_id, Some(handle.clone()))
        .await
        .map_err(|e| DomainError::Database(e.to_string()))?;
    if !updated {
        return Err(DomainError::NotFound("User not found".to_string()));
    }

    tracing::info!(user_id = %user_id, handle = %handle, "LeetCode handle updated");
    Ok(Json(SetHandleResponse { handle }))
}

/// Clears the handle, revoking background sync eligibility.
#[utoipa::path(
    delete,
    path = "/v1/sync/handle",
    tag = "sync",
    responses(
        (status = 204, description = "Handle cleared"),
        (status = 404, description = "User not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn clear_handle(
    State(state): State<Arc<AppState>>,
    AuthUser(user_id): AuthUser,
) -> Result<StatusCode, DomainError> {
    let updated = state
        .user_repo
        .set_leetcode_handle(user_id, None)
        .await
        .map_err(|e| DomainError::Database(e.to_string()))?;
    if !updated {
        return Err(DomainError::NotFound("User not found".to_string()));
    }

    tracing::info!(user_id = %user_id, "LeetCode handle cleared");
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Debug, serde::Deserialize)]
pub struct TriggerSyncQuery {
    pub limit: Option<u32>,
}

/// Schedules a one-shot sync for the current user.
///
/// The run executes in the background; the returned `run_id` can be resolved
/// through the status endpoint once it finishes.
#[utoipa::path(
    post,
    path = "/v1/sync/run",
    tag = "sync",
    params(("limit" = Option<u32>, Query, description = "Max submissions to fetch (1-100)")),
    responses(
        (status = 202, description = "Sync scheduled", body = SyncScheduledResponse),
        (status = 422, description = "No LeetCode handle set")
    ),
    security(("bearer_auth" = []))
)]
pub async fn trigger_sync(
    State(state): State<Arc<AppState>>,
    AuthUser(user_id): AuthUser,
    Query(query): Query<TriggerSyncQuery>,
) -> Result<(StatusCode, Json<SyncScheduledResponse>), DomainError> {
    let limit = query.limit.unwrap_or(MAX_FETCH_LIMIT).clamp(1, MAX_FETCH_LIMIT);

    let user = state
        .user_repo
        .get_by_id(user_id)
        .await
        .map_err(|e| DomainError::Database(e.to_string()))?
        .ok_or_else(|| DomainError::NotFound("User not found".to_string()))?;

    let Some(handle) = user.leetcode_handle else {
        return Err(DomainError::BusinessLogic(
            "LeetCode handle not set. Set it first via PUT /v1/sync/handle".to_string(),
        ));
    };

    let run_id = state.sync.trigger_now(user_id, handle.clone(), limit);

    Ok((
        StatusCode::ACCEPTED,
        Json(SyncScheduledResponse {
            run_id,
            handle,
            limit,
        }),
    ))
}

/// Reports sync eligibility, accumulated counts and the most recent run.
#[utoipa::path(
    get,
    path = "/v1/sync/status",
    tag = "sync",
    responses(
        (status = 200, description = "Sync status", body = SyncStatusResponse),
        (status = 404, description = "User not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn sync_status(
    State(state): State<Arc<AppState>>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<SyncStatusResponse>, DomainError> {
    let user = state
        .user_repo
        .get_by_id(user_id)
        .await
        .map_err(|e| DomainError::Database(e.to_string()))?
        .ok_or_else(|| DomainError::NotFound("User not found".to_string()))?;

    let total_synced_tasks = state
        .task_repo
        .count_by_platform(user_id, SYNC_PLATFORM.to_string())
        .await
        .map_err(|e| DomainError::Database(e.to_string()))?;

    Ok(Json(SyncStatusResponse {
        has_leetcode_handle: user.leetcode_handle.is_some(),
        leetcode_handle: user.leetcode_handle,
        total_synced_tasks,
        last_run: state.sync.last_run(user_id),
    }))
}
