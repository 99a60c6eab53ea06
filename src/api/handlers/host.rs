//! Host handlers: list, inspect, save, reload, deactivate, moderate.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};

use crate::api::dto::{
    HostDetailResponse, HostListResponse, HostSummaryDto, ModerationKind, ModerationRequest,
    ModerationResponse, PaginationParams,
};
use crate::app_state::AppState;
use crate::domain::TenantId;
use crate::error::HostError;

/// `GET /hosts`: List live hosts with pagination.
///
/// # Errors
///
/// Returns [`HostError`] on internal failures.
pub async fn list_hosts(
    State(state): State<AppState>,
    Query(params): Query<PaginationParams>,
) -> Result<impl IntoResponse, HostError> {
    let params = params.clamped();
    let hosts = state.shard.hosts().await;
    let total = u32::try_from(hosts.len()).unwrap_or(u32::MAX);

    let data: Vec<HostSummaryDto> = hosts
        .iter()
        .skip(params.offset())
        .take(params.per_page as usize)
        .map(|host| HostSummaryDto {
            tenant_id: host.id(),
            name: host.name().to_string(),
            description: host.describe(),
            created_at: host.created_at(),
        })
        .collect();

    Ok(Json(HostListResponse {
        data,
        pagination: params.meta(total),
    }))
}

/// `GET /hosts/{id}`: Host details including its config document.
///
/// # Errors
///
/// Returns [`HostError::HostNotFound`] if the tenant is not active.
pub async fn get_host(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> Result<impl IntoResponse, HostError> {
    let host = state.shard.get(TenantId::new(id)).await?;

    let response = HostDetailResponse {
        tenant_id: host.id(),
        name: host.name().to_string(),
        shard_id: host.shard_id(),
        created_at: host.created_at(),
        prefix: host.prefix().await,
        commands: host.dispatcher().command_names(),
        dispatch_count: host.dispatcher().dispatch_count(),
        member_count: host.members().len().await,
        pending_events: host.pending_events(),
        config: host.config_snapshot().await.into(),
    };

    Ok(Json(response))
}

/// `POST /hosts/{id}/save`: Flush the in-memory document to storage.
///
/// # Errors
///
/// Returns [`HostError::HostNotFound`] or [`HostError::Persistence`].
pub async fn save_host(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> Result<impl IntoResponse, HostError> {
    let host = state.shard.get(TenantId::new(id)).await?;
    host.save().await?;
    Ok(StatusCode::NO_CONTENT)
}

/// `POST /hosts/{id}/reload`: Re-read the document from storage.
///
/// # Errors
///
/// Returns [`HostError::HostNotFound`], [`HostError::Persistence`] or
/// [`HostError::MalformedDocument`].
pub async fn reload_host(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> Result<impl IntoResponse, HostError> {
    let host = state.shard.get(TenantId::new(id)).await?;
    host.load().await?;
    Ok(StatusCode::NO_CONTENT)
}

/// `DELETE /hosts/{id}`: Discard the host. Its record stays on disk.
///
/// # Errors
///
/// Returns [`HostError::HostNotFound`] if the tenant is not active.
pub async fn deactivate_host(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> Result<impl IntoResponse, HostError> {
    state.shard.deactivate(TenantId::new(id)).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// `POST /hosts/{id}/moderation`: Run one moderation action.
///
/// `allowed: false` in the response means the bot lacked permission.
///
/// # Errors
///
/// Returns [`HostError::HostNotFound`] or [`HostError::Transport`].
pub async fn moderate(
    State(state): State<AppState>,
    Path(id): Path<u64>,
    Json(req): Json<ModerationRequest>,
) -> Result<impl IntoResponse, HostError> {
    let host = state.shard.get(TenantId::new(id)).await?;
    let moderation = host.moderation();
    let action = req.to_action(moderation.ban_retention());
    let allowed = moderation.perform(action, req.user_id).await?;

    Ok(Json(ModerationResponse {
        action: ModerationKind::from(action),
        user_id: req.user_id,
        allowed,
    }))
}

/// Host management routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/hosts", get(list_hosts))
        .route("/hosts/{id}", get(get_host).delete(deactivate_host))
        .route("/hosts/{id}/save", post(save_host))
        .route("/hosts/{id}/reload", post(reload_host))
        .route("/hosts/{id}/moderation", post(moderate))
}
