//! Per-host event queue.
//!
//! Each [`Host`](super::Host) owns the sending half of a bounded
//! [`tokio::sync::mpsc`] channel and its listener task drains the other
//! half. The shard hands an event straight to the inbox of the event's
//! tenant, so a slow tenant only ever fills its own queue.

use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;

use crate::domain::{InboundEvent, TenantId};
use crate::error::HostError;

/// Sending half of one host's event queue.
#[derive(Debug)]
pub(crate) struct Inbox {
    tenant_id: TenantId,
    sender: mpsc::Sender<InboundEvent>,
}

impl Inbox {
    /// Creates an inbox holding at most `capacity` pending events
    /// (minimum 1), returning the receiving half alongside it.
    pub(crate) fn new(tenant_id: TenantId, capacity: usize) -> (Self, mpsc::Receiver<InboundEvent>) {
        let (sender, receiver) = mpsc::channel(capacity.max(1));
        (Self { tenant_id, sender }, receiver)
    }

    /// Queues `event` without waiting.
    ///
    /// # Errors
    ///
    /// Returns [`HostError::HostBusy`] when the queue is full and
    /// [`HostError::HostNotFound`] once the listener has gone away.
    pub(crate) fn deliver(&self, event: InboundEvent) -> Result<(), HostError> {
        match self.sender.try_send(event) {
            Ok(()) => Ok(()),
            Err(TrySendError::Full(event)) => {
                tracing::warn!(
                    tenant_id = %self.tenant_id,
                    event_id = %event.id,
                    "host inbox full, event rejected"
                );
                Err(HostError::HostBusy(self.tenant_id))
            }
            Err(TrySendError::Closed(_)) => Err(HostError::HostNotFound(self.tenant_id)),
        }
    }

    /// Events queued but not yet taken by the listener.
    pub(crate) fn pending(&self) -> usize {
        self.sender
            .max_capacity()
            .saturating_sub(self.sender.capacity())
    }
}
