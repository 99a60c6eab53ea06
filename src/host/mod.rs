//! Per-tenant runtime context.
//!
//! A [`Host`] owns one tenant's configuration document, its command
//! dispatcher and member registry, and the tenant-scoped moderation
//! facade. Hosts are created and owned by a [`Shard`]; there is never
//! more than one live host per tenant.
//!
//! # Config consistency
//!
//! The in-memory document sits behind a per-host async mutex. Readers,
//! mutators, `load` and `save` all take it, so a read-modify-write done
//! through [`Host::update_config`] or [`Host::update_and_save`] cannot
//! lose an update to a concurrent command. Memory and disk agree right
//! after `load` and `save` and may diverge in between.

mod inbox;
mod listener;

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock, Weak};

use chrono::{DateTime, Utc};
use serde_json::Value;
use tokio::sync::Mutex;
use tokio::task::AbortHandle;

use crate::command::{CommandCatalog, CommandDispatcher, DispatchOutcome, Dependencies};
use crate::domain::{InboundEvent, ShardId, TenantDescriptor, TenantId, UserId};
use crate::error::HostError;
use crate::member::MemberRegistry;
use crate::moderation::{MessageRetention, ModerationFacade};
use crate::persistence::{ConfigDocument, DocumentStore};
use crate::shard::Shard;
use crate::transport::Transport;

use inbox::Inbox;

/// Config key holding the tenant's command prefix.
pub const PREFIX_KEY: &str = "prefix";

/// Settings shared by every host on a shard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostSettings {
    /// Prefix used when a tenant has not configured one.
    pub default_prefix: String,
    /// Message-deletion window applied on ban.
    pub ban_retention: MessageRetention,
}

impl Default for HostSettings {
    fn default() -> Self {
        Self {
            default_prefix: "_".to_string(),
            ban_retention: MessageRetention::NONE,
        }
    }
}

/// One tenant's live state.
#[derive(Debug)]
pub struct Host {
    descriptor: TenantDescriptor,
    shard_id: ShardId,
    shard: Weak<Shard>,
    store: Arc<DocumentStore>,
    config: Mutex<ConfigDocument>,
    dispatcher: Arc<CommandDispatcher>,
    members: Arc<MemberRegistry>,
    moderation: ModerationFacade,
    transport: Arc<dyn Transport>,
    default_prefix: String,
    created_at: DateTime<Utc>,
    inbox: Inbox,
    stopped: AtomicBool,
    listener: OnceLock<AbortHandle>,
}

impl Host {
    /// Builds the host for `descriptor` on `shard`.
    ///
    /// Loads (or initializes) the tenant's document, persists it at once so
    /// a fresh tenant gets a record, binds every catalog command and starts
    /// the listener draining the host's inbox. Callers go through
    /// [`Shard::register`], which guarantees a single host per tenant.
    ///
    /// # Errors
    ///
    /// Returns [`HostError::Persistence`] or [`HostError::MalformedDocument`]
    /// if the document cannot be loaded or written.
    pub(crate) async fn create(
        shard: &Arc<Shard>,
        descriptor: TenantDescriptor,
        catalog: &CommandCatalog,
    ) -> Result<Arc<Self>, HostError> {
        let tenant_id = descriptor.id;
        let store = Arc::clone(shard.store());
        let document = {
            let store = Arc::clone(&store);
            run_blocking(move || store.load(tenant_id)).await?
        };

        let settings = shard.settings();
        let transport = Arc::clone(shard.transport());
        let members = Arc::new(MemberRegistry::new(tenant_id));
        let weak_shard = Arc::downgrade(shard);
        let (inbox, receiver) = Inbox::new(tenant_id, shard.queue_capacity());

        let host = Arc::new_cyclic(|weak_host: &Weak<Self>| {
            let dispatcher = Arc::new_cyclic(|weak_dispatcher: &Weak<CommandDispatcher>| {
                let deps = Dependencies {
                    host: Weak::clone(weak_host),
                    dispatcher: Weak::clone(weak_dispatcher),
                    members: Arc::clone(&members),
                    tenant: descriptor.clone(),
                    transport: Arc::clone(&transport),
                    shard: Weak::clone(&weak_shard),
                };
                CommandDispatcher::new(catalog.instantiate(&deps))
            });

            Self {
                moderation: ModerationFacade::new(
                    tenant_id,
                    Arc::clone(&transport),
                    settings.ban_retention,
                ),
                descriptor,
                shard_id: shard.id(),
                shard: weak_shard,
                store,
                config: Mutex::new(document),
                dispatcher,
                members,
                transport,
                default_prefix: settings.default_prefix.clone(),
                created_at: Utc::now(),
                inbox,
                stopped: AtomicBool::new(false),
                listener: OnceLock::new(),
            }
        });

        host.save().await?;

        let handle = tokio::spawn(listener::run(Arc::downgrade(&host), tenant_id, receiver));
        let _ = host.listener.set(handle.abort_handle());

        tracing::info!(
            %tenant_id,
            shard_id = %host.shard_id,
            commands = host.dispatcher.command_names().len(),
            "host created"
        );
        Ok(host)
    }

    /// Tenant identifier.
    #[must_use]
    pub const fn id(&self) -> TenantId {
        self.descriptor.id
    }

    /// Tenant display name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.descriptor.name
    }

    /// Full tenant descriptor.
    #[must_use]
    pub const fn descriptor(&self) -> &TenantDescriptor {
        &self.descriptor
    }

    /// Identifier of the owning shard.
    #[must_use]
    pub const fn shard_id(&self) -> ShardId {
        self.shard_id
    }

    /// The owning shard, while it is alive.
    #[must_use]
    pub fn shard(&self) -> Option<Arc<Shard>> {
        self.shard.upgrade()
    }

    /// The host's command dispatcher.
    #[must_use]
    pub const fn dispatcher(&self) -> &Arc<CommandDispatcher> {
        &self.dispatcher
    }

    /// The host's member registry.
    #[must_use]
    pub const fn members(&self) -> &Arc<MemberRegistry> {
        &self.members
    }

    /// Tenant-scoped moderation operations.
    #[must_use]
    pub const fn moderation(&self) -> &ModerationFacade {
        &self.moderation
    }

    /// The shard's transport handle.
    #[must_use]
    pub const fn transport(&self) -> &Arc<dyn Transport> {
        &self.transport
    }

    /// When this host was created.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns `false` once the host has been deactivated.
    #[must_use]
    pub fn is_active(&self) -> bool {
        !self.stopped.load(Ordering::Acquire)
    }

    /// Events waiting in the host's inbox.
    #[must_use]
    pub fn pending_events(&self) -> usize {
        self.inbox.pending()
    }

    /// Queues `event` for this host's listener.
    pub(crate) fn deliver(&self, event: InboundEvent) -> Result<(), HostError> {
        if !self.is_active() {
            return Err(HostError::HostNotFound(self.id()));
        }
        self.inbox.deliver(event)
    }

    /// Stops the listener. Queued events are discarded and the host no
    /// longer handles messages; config and moderation calls keep working
    /// for holders of an outstanding handle.
    pub(crate) fn stop(&self) {
        if self.stopped.swap(true, Ordering::AcqRel) {
            return;
        }
        if let Some(listener) = self.listener.get() {
            listener.abort();
        }
        tracing::info!(tenant_id = %self.id(), shard_id = %self.shard_id, "host stopped");
    }

    /// Handles one inbound message.
    ///
    /// Direct messages are dropped silently; a host only processes traffic
    /// from its own tenant's channels, and nothing once stopped. Anything
    /// else is recorded against the sender and handed to the dispatcher.
    pub async fn handle_inbound_event(&self, event: &InboundEvent) {
        if !self.is_active() {
            tracing::debug!(tenant_id = %self.id(), event_id = %event.id, "event for stopped host dropped");
            return;
        }
        if event.is_private() {
            tracing::debug!(tenant_id = %self.id(), event_id = %event.id, "private event dropped");
            return;
        }
        if event.tenant_id() != Some(self.id()) {
            tracing::debug!(tenant_id = %self.id(), event_id = %event.id, "foreign event dropped");
            return;
        }

        self.members.observe(event.sender, event.received_at).await;

        let prefix = self.prefix().await;
        let outcome = self.dispatcher.dispatch(&prefix, event).await;
        if let DispatchOutcome::Failed { command, .. } = outcome {
            tracing::debug!(tenant_id = %self.id(), command, "dispatch reported a failed command");
        }
    }

    /// Re-reads the tenant's document from storage, replacing the
    /// in-memory copy (unsaved changes are discarded).
    ///
    /// # Errors
    ///
    /// Returns [`HostError::Persistence`] or [`HostError::MalformedDocument`];
    /// on error the in-memory document is left unchanged.
    pub async fn load(&self) -> Result<(), HostError> {
        let tenant_id = self.id();
        let mut config = self.config.lock().await;
        let store = Arc::clone(&self.store);
        let loaded = run_blocking(move || store.load(tenant_id)).await?;
        *config = loaded;
        tracing::debug!(%tenant_id, keys = config.len(), "config loaded");
        Ok(())
    }

    /// Writes the in-memory document to storage, replacing the record in
    /// full. Last writer wins.
    ///
    /// # Errors
    ///
    /// Returns [`HostError::Persistence`] if the record cannot be written.
    pub async fn save(&self) -> Result<(), HostError> {
        let tenant_id = self.id();
        let config = self.config.lock().await;
        let snapshot = config.clone();
        let store = Arc::clone(&self.store);
        run_blocking(move || store.save(tenant_id, &snapshot)).await?;
        tracing::debug!(%tenant_id, keys = config.len(), "config saved");
        Ok(())
    }

    /// Returns the value at `key`, or `Value::Null` if absent.
    pub async fn config_get(&self, key: &str) -> Value {
        self.config.lock().await.get(key).clone()
    }

    /// Sets `key` in memory, returning the previous value.
    pub async fn config_set(&self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.config.lock().await.set(key, value)
    }

    /// Removes `key` in memory, returning its value.
    pub async fn config_remove(&self, key: &str) -> Option<Value> {
        self.config.lock().await.remove(key)
    }

    /// Returns a copy of the in-memory document.
    pub async fn config_snapshot(&self) -> ConfigDocument {
        self.config.lock().await.clone()
    }

    /// Runs `f` on the document with exclusive access.
    pub async fn update_config<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&mut ConfigDocument) -> R,
    {
        let mut config = self.config.lock().await;
        f(&mut config)
    }

    /// Runs `f` on the document and saves it before any other mutator can
    /// observe the change.
    ///
    /// # Errors
    ///
    /// Returns [`HostError::Persistence`] if the save fails; the in-memory
    /// change is kept.
    pub async fn update_and_save<F, R>(&self, f: F) -> Result<R, HostError>
    where
        F: FnOnce(&mut ConfigDocument) -> R,
    {
        let tenant_id = self.id();
        let mut config = self.config.lock().await;
        let result = f(&mut config);
        let snapshot = config.clone();
        let store = Arc::clone(&self.store);
        run_blocking(move || store.save(tenant_id, &snapshot)).await?;
        Ok(result)
    }

    /// The tenant's command prefix: the `prefix` key when it is a
    /// non-empty string, the shard default otherwise.
    pub async fn prefix(&self) -> String {
        let config = self.config.lock().await;
        match config.get_str(PREFIX_KEY) {
            Some(prefix) if !prefix.is_empty() => prefix.to_string(),
            _ => self.default_prefix.clone(),
        }
    }

    /// Attempts to ban `user_id`. `Ok(false)` means the bot lacked permission.
    ///
    /// # Errors
    ///
    /// Returns [`HostError::Transport`] on any other remote failure.
    pub async fn ban(&self, user_id: UserId) -> Result<bool, HostError> {
        self.moderation.ban(user_id).await
    }

    /// Attempts to unban `user_id`. `Ok(false)` means the bot lacked permission.
    ///
    /// # Errors
    ///
    /// Returns [`HostError::Transport`] on any other remote failure.
    pub async fn unban(&self, user_id: UserId) -> Result<bool, HostError> {
        self.moderation.unban(user_id).await
    }

    /// Attempts to kick `user_id`. `Ok(false)` means the bot lacked permission.
    ///
    /// # Errors
    ///
    /// Returns [`HostError::Transport`] on any other remote failure.
    pub async fn kick(&self, user_id: UserId) -> Result<bool, HostError> {
        self.moderation.kick(user_id).await
    }

    /// Attempts to mute `user_id`. `Ok(false)` means the bot lacked permission.
    ///
    /// # Errors
    ///
    /// Returns [`HostError::Transport`] on any other remote failure.
    pub async fn mute(&self, user_id: UserId) -> Result<bool, HostError> {
        self.moderation.mute(user_id).await
    }

    /// Attempts to unmute `user_id`. `Ok(false)` means the bot lacked permission.
    ///
    /// # Errors
    ///
    /// Returns [`HostError::Transport`] on any other remote failure.
    pub async fn unmute(&self, user_id: UserId) -> Result<bool, HostError> {
        self.moderation.unmute(user_id).await
    }

    /// Diagnostic one-liner naming the tenant, shard and display name.
    #[must_use]
    pub fn describe(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Host {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Host(id={}, shard={}, guild=\"{}\")",
            self.id(),
            self.shard_id,
            self.descriptor.name
        )
    }
}

impl Drop for Host {
    fn drop(&mut self) {
        if let Some(listener) = self.listener.get() {
            listener.abort();
        }
    }
}

/// Runs blocking storage I/O on the blocking pool and waits for it.
async fn run_blocking<T, F>(f: F) -> Result<T, HostError>
where
    F: FnOnce() -> Result<T, HostError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| HostError::Internal(format!("storage task failed: {e}")))?
}
