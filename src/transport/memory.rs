//! In-process [`Transport`] that simulates the chat service.
//!
//! Used by the development binary and by tests. Failures are scripted per
//! user: any call targeting a scripted user returns the stored error, and
//! every call that succeeds is recorded for inspection.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::Mutex;

use super::{Transport, TransportError};
use crate::domain::{ChannelId, TenantDescriptor, TenantId, UserId};

/// Moderation call kinds recorded by [`InMemoryTransport`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RemoteAction {
    /// `ban` with the requested message-deletion window.
    Ban {
        /// Days of messages deleted.
        delete_message_days: u8,
    },
    /// `unban`.
    Unban,
    /// `kick`.
    Kick,
    /// `mute`.
    Mute,
    /// `unmute`.
    Unmute,
}

/// A moderation call that the simulated service accepted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecordedAction {
    /// Tenant the action applied to.
    pub tenant_id: TenantId,
    /// Target user.
    pub user_id: UserId,
    /// What was done.
    pub action: RemoteAction,
    /// When the call was accepted.
    pub at: DateTime<Utc>,
}

#[derive(Debug, Default)]
struct State {
    tenants: HashMap<TenantId, TenantDescriptor>,
    failures: HashMap<UserId, TransportError>,
    actions: Vec<RecordedAction>,
    messages: Vec<(ChannelId, String)>,
}

/// Simulated chat service.
///
/// Unknown tenants resolve to a descriptor named `guild-<id>`, so any
/// tenant can be activated without prior registration.
#[derive(Debug, Default)]
pub struct InMemoryTransport {
    state: Mutex<State>,
}

impl InMemoryTransport {
    /// Creates a transport with no tenants and no scripted failures.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a tenant's display metadata.
    pub async fn add_tenant(&self, descriptor: TenantDescriptor) {
        let mut state = self.state.lock().await;
        state.tenants.insert(descriptor.id, descriptor);
    }

    /// Makes every call targeting `user_id` fail with `error`.
    pub async fn fail_for(&self, user_id: UserId, error: TransportError) {
        let mut state = self.state.lock().await;
        state.failures.insert(user_id, error);
    }

    /// Makes every call targeting `user_id` fail with an authority denial.
    pub async fn deny_authority_for(&self, user_id: UserId) {
        self.fail_for(
            user_id,
            TransportError::AuthorityDenied {
                permission: "BAN_MEMBERS".to_string(),
            },
        )
        .await;
    }

    /// Removes any scripted failure for `user_id`.
    pub async fn clear_failure(&self, user_id: UserId) {
        let mut state = self.state.lock().await;
        state.failures.remove(&user_id);
    }

    /// Returns every accepted moderation call, oldest first.
    pub async fn actions(&self) -> Vec<RecordedAction> {
        self.state.lock().await.actions.clone()
    }

    /// Returns every message sent, oldest first.
    pub async fn sent_messages(&self) -> Vec<(ChannelId, String)> {
        self.state.lock().await.messages.clone()
    }

    async fn record(
        &self,
        tenant_id: TenantId,
        user_id: UserId,
        action: RemoteAction,
    ) -> Result<(), TransportError> {
        let mut state = self.state.lock().await;
        if let Some(err) = state.failures.get(&user_id) {
            return Err(err.clone());
        }
        state.actions.push(RecordedAction {
            tenant_id,
            user_id,
            action,
            at: Utc::now(),
        });
        Ok(())
    }
}

#[async_trait]
impl Transport for InMemoryTransport {
    async fn tenant(&self, tenant_id: TenantId) -> Result<TenantDescriptor, TransportError> {
        let state = self.state.lock().await;
        Ok(state
            .tenants
            .get(&tenant_id)
            .cloned()
            .unwrap_or_else(|| TenantDescriptor::new(tenant_id, format!("guild-{tenant_id}"))))
    }

    async fn send_message(
        &self,
        channel_id: ChannelId,
        content: &str,
    ) -> Result<(), TransportError> {
        let mut state = self.state.lock().await;
        state.messages.push((channel_id, content.to_string()));
        Ok(())
    }

    async fn ban(
        &self,
        tenant_id: TenantId,
        user_id: UserId,
        delete_message_days: u8,
    ) -> Result<(), TransportError> {
        self.record(tenant_id, user_id, RemoteAction::Ban { delete_message_days })
            .await
    }

    async fn unban(&self, tenant_id: TenantId, user_id: UserId) -> Result<(), TransportError> {
        self.record(tenant_id, user_id, RemoteAction::Unban).await
    }

    async fn kick(&self, tenant_id: TenantId, user_id: UserId) -> Result<(), TransportError> {
        self.record(tenant_id, user_id, RemoteAction::Kick).await
    }

    async fn mute(&self, tenant_id: TenantId, user_id: UserId) -> Result<(), TransportError> {
        self.record(tenant_id, user_id, RemoteAction::Mute).await
    }

    async fn unmute(&self, tenant_id: TenantId, user_id: UserId) -> Result<(), TransportError> {
        self.record(tenant_id, user_id, RemoteAction::Unmute).await
    }
}
