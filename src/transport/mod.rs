//! Remote chat-service interface consumed by hosts.
//!
//! [`Transport`] is the seam between a host and the chat service: tenant
//! identity lookup, message sending and the five moderation primitives.
//! Every call may fail with a [`TransportError`]; only
//! [`TransportError::AuthorityDenied`] has special meaning to the
//! moderation facade.

pub mod memory;

use async_trait::async_trait;

use crate::domain::{ChannelId, TenantDescriptor, TenantId, UserId};

pub use memory::InMemoryTransport;

/// Failure reported by the chat service.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransportError {
    /// The bot's own account lacks the permission the action requires.
    #[error("missing permission: {permission}")]
    AuthorityDenied {
        /// Name of the missing permission (e.g. `"BAN_MEMBERS"`).
        permission: String,
    },

    /// Connection-level failure.
    #[error("network error: {0}")]
    Network(String),

    /// The service throttled the request.
    #[error("rate limited; retry after {retry_after_ms} ms")]
    RateLimited {
        /// Milliseconds until the request may be retried.
        retry_after_ms: u64,
    },

    /// The target user, tenant or channel does not exist.
    #[error("invalid target: {0}")]
    InvalidTarget(String),

    /// The remote call did not complete in time.
    #[error("remote call timed out")]
    Timeout,
}

impl TransportError {
    /// Returns `true` for the authority-denied condition.
    #[must_use]
    pub const fn is_authority_denied(&self) -> bool {
        matches!(self, Self::AuthorityDenied { .. })
    }
}

/// Handle to the chat service for one shard's connection.
///
/// Implementations must be cheap to share: hosts hold it behind an
/// `Arc<dyn Transport>` and call it from any worker thread.
#[async_trait]
pub trait Transport: Send + Sync + std::fmt::Debug {
    /// Looks up the identity and display metadata of a tenant.
    async fn tenant(&self, tenant_id: TenantId) -> Result<TenantDescriptor, TransportError>;

    /// Posts a message in a channel.
    async fn send_message(&self, channel_id: ChannelId, content: &str)
    -> Result<(), TransportError>;

    /// Bans `user_id`, deleting their messages from the last
    /// `delete_message_days` days.
    async fn ban(
        &self,
        tenant_id: TenantId,
        user_id: UserId,
        delete_message_days: u8,
    ) -> Result<(), TransportError>;

    /// Lifts a ban.
    async fn unban(&self, tenant_id: TenantId, user_id: UserId) -> Result<(), TransportError>;

    /// Removes a member from the tenant.
    async fn kick(&self, tenant_id: TenantId, user_id: UserId) -> Result<(), TransportError>;

    /// Server-mutes a member.
    async fn mute(&self, tenant_id: TenantId, user_id: UserId) -> Result<(), TransportError>;

    /// Lifts a server mute.
    async fn unmute(&self, tenant_id: TenantId, user_id: UserId) -> Result<(), TransportError>;
}
