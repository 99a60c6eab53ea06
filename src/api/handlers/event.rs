//! Event ingress: lets operators and tests inject inbound messages.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::post;
use axum::{Json, Router};

use crate::api::dto::EventAcceptedResponse;
use crate::app_state::AppState;
use crate::domain::InboundEvent;
use crate::error::HostError;

/// `POST /events`: Hand an inbound event to the shard.
///
/// The origin tenant is activated if needed.
///
/// # Errors
///
/// Returns [`HostError`] if the origin tenant cannot be activated or its
/// inbox is full.
pub async fn post_event(
    State(state): State<AppState>,
    Json(event): Json<InboundEvent>,
) -> Result<impl IntoResponse, HostError> {
    let event_id = event.id;
    let routed = state.shard.dispatch(event).await?;
    Ok((
        StatusCode::ACCEPTED,
        Json(EventAcceptedResponse {
            event_id,
            routed,
        }),
    ))
}

/// Event ingress routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/events", post(post_event))
}
