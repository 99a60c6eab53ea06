//! Domain layer: identifiers, tenant metadata and inbound events.

pub mod ids;
pub mod inbound_event;
pub mod tenant;

pub use ids::{ChannelId, ShardId, TenantId, UserId};
pub use inbound_event::{InboundEvent, Origin};
pub use tenant::TenantDescriptor;
