//! Host-related DTOs for list, detail and moderation operations.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::common_dto::PaginationMeta;
use crate::domain::{ShardId, TenantId, UserId};
use crate::moderation::{MessageRetention, ModerationAction};

/// One row of `GET /hosts`.
#[derive(Debug, Clone, Serialize)]
pub struct HostSummaryDto {
    /// Tenant identifier.
    pub tenant_id: TenantId,
    /// Tenant display name.
    pub name: String,
    /// Diagnostic description.
    pub description: String,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

/// Paginated list response for `GET /hosts`.
#[derive(Debug, Serialize)]
pub struct HostListResponse {
    /// Hosts on the current page.
    pub data: Vec<HostSummaryDto>,
    /// Pagination metadata.
    pub pagination: PaginationMeta,
}

/// Response body for `GET /hosts/{id}`.
#[derive(Debug, Serialize)]
pub struct HostDetailResponse {
    /// Tenant identifier.
    pub tenant_id: TenantId,
    /// Tenant display name.
    pub name: String,
    /// Owning shard.
    pub shard_id: ShardId,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Effective command prefix.
    pub prefix: String,
    /// Hosted command names.
    pub commands: Vec<&'static str>,
    /// Messages handed to the dispatcher so far.
    pub dispatch_count: u64,
    /// Members seen so far.
    pub member_count: usize,
    /// Events queued but not yet handled.
    pub pending_events: usize,
    /// In-memory configuration document.
    pub config: serde_json::Value,
}

/// Wire name of a [`ModerationAction`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModerationKind {
    /// Ban with the shard's configured retention window.
    Ban,
    /// Lift a ban.
    Unban,
    /// Remove from the tenant.
    Kick,
    /// Server-mute.
    Mute,
    /// Lift a server mute.
    Unmute,
}

impl From<ModerationAction> for ModerationKind {
    fn from(action: ModerationAction) -> Self {
        match action {
            ModerationAction::Ban(_) => Self::Ban,
            ModerationAction::Unban => Self::Unban,
            ModerationAction::Kick => Self::Kick,
            ModerationAction::Mute => Self::Mute,
            ModerationAction::Unmute => Self::Unmute,
        }
    }
}

/// Request body for `POST /hosts/{id}/moderation`.
#[derive(Debug, Deserialize)]
pub struct ModerationRequest {
    /// What to do.
    pub action: ModerationKind,
    /// Target user.
    pub user_id: UserId,
    /// Ban only: days of messages to delete, overriding the shard default.
    #[serde(default)]
    pub delete_message_days: Option<u8>,
}

impl ModerationRequest {
    /// The requested action; a ban without an explicit window uses
    /// `default_retention`.
    #[must_use]
    pub fn to_action(&self, default_retention: MessageRetention) -> ModerationAction {
        match self.action {
            ModerationKind::Ban => ModerationAction::Ban(
                self.delete_message_days
                    .map_or(default_retention, MessageRetention::days),
            ),
            ModerationKind::Unban => ModerationAction::Unban,
            ModerationKind::Kick => ModerationAction::Kick,
            ModerationKind::Mute => ModerationAction::Mute,
            ModerationKind::Unmute => ModerationAction::Unmute,
        }
    }
}

/// Response body for `POST /hosts/{id}/moderation`.
#[derive(Debug, Serialize)]
pub struct ModerationResponse {
    /// Action echoed from the request.
    pub action: ModerationKind,
    /// Target user.
    pub user_id: UserId,
    /// `false` if the bot lacked permission.
    pub allowed: bool,
}
