//! Event ingress DTOs.

use serde::Serialize;
use uuid::Uuid;

/// Response body for `POST /events` (202 Accepted).
#[derive(Debug, Serialize)]
pub struct EventAcceptedResponse {
    /// Identifier assigned to the event.
    pub event_id: Uuid,
    /// Whether a host queued the event; private events are never routed.
    pub routed: bool,
}
