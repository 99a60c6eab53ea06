//! Inbound message events delivered by the transport.
//!
//! Every message the shard receives is wrapped in an [`InboundEvent`] and
//! routed by its [`Origin`]: tenant events go to that tenant's host, private
//! events go nowhere.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{ChannelId, TenantId, UserId};

/// Where an inbound message was posted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Origin {
    /// A channel belonging to a tenant.
    Tenant {
        /// Owning tenant.
        tenant_id: TenantId,
    },
    /// A direct message, not scoped to any tenant.
    Private,
}

/// A message-like event received from the chat service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InboundEvent {
    /// Event identifier, generated on receipt.
    #[serde(default = "Uuid::new_v4")]
    pub id: Uuid,
    /// Tenant channel or private channel.
    pub origin: Origin,
    /// Channel the message was posted in.
    pub channel_id: ChannelId,
    /// Author of the message.
    pub sender: UserId,
    /// Raw message content.
    pub content: String,
    /// Receipt timestamp.
    #[serde(default = "Utc::now")]
    pub received_at: DateTime<Utc>,
}

impl InboundEvent {
    /// Creates an event posted in a tenant channel.
    #[must_use]
    pub fn in_tenant(
        tenant_id: TenantId,
        channel_id: ChannelId,
        sender: UserId,
        content: impl Into<String>,
    ) -> Self {
        Self::new(Origin::Tenant { tenant_id }, channel_id, sender, content)
    }

    /// Creates a direct-message event.
    #[must_use]
    pub fn private(channel_id: ChannelId, sender: UserId, content: impl Into<String>) -> Self {
        Self::new(Origin::Private, channel_id, sender, content)
    }

    fn new(origin: Origin, channel_id: ChannelId, sender: UserId, content: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            origin,
            channel_id,
            sender,
            content: content.into(),
            received_at: Utc::now(),
        }
    }

    /// Returns the originating tenant, or `None` for a direct message.
    #[must_use]
    pub const fn tenant_id(&self) -> Option<TenantId> {
        match self.origin {
            Origin::Tenant { tenant_id } => Some(tenant_id),
            Origin::Private => None,
        }
    }

    /// Returns `true` if the event came from a direct message.
    #[must_use]
    pub const fn is_private(&self) -> bool {
        matches!(self.origin, Origin::Private)
    }
}
