//! Inbox-draining loop for one host.

use std::sync::Weak;

use tokio::sync::mpsc;

use super::Host;
use crate::domain::{InboundEvent, TenantId};

/// Hands queued events to the host one at a time, in arrival order.
///
/// Ends when the inbox closes, the host is gone or has been stopped.
pub(super) async fn run(
    host: Weak<Host>,
    tenant_id: TenantId,
    mut receiver: mpsc::Receiver<InboundEvent>,
) {
    while let Some(event) = receiver.recv().await {
        let Some(host) = host.upgrade() else {
            break;
        };
        if !host.is_active() {
            break;
        }
        host.handle_inbound_event(&event).await;
    }

    tracing::debug!(%tenant_id, "host listener stopped");
}
