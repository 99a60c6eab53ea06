//! Shard: the set of hosts sharing one transport connection.
//!
//! [`Shard`] keeps every live [`Host`] in a map keyed by tenant and routes
//! each inbound event to the inbox of its tenant's host. Host creation and
//! removal happen under the map's write lock, so two concurrent activations
//! of the same tenant always yield the same host.

use std::collections::HashMap;
use std::sync::Arc;

use futures_util::future::join_all;
use tokio::sync::RwLock;

use crate::command::CommandCatalog;
use crate::domain::{InboundEvent, ShardId, TenantDescriptor, TenantId};
use crate::error::HostError;
use crate::host::{Host, HostSettings};
use crate::persistence::DocumentStore;
use crate::transport::Transport;

/// Hosts on one transport connection.
///
/// # Concurrency
///
/// - Lookups of different tenants run concurrently.
/// - Host creation holds the write lock until the host is fully
///   initialized, including its first save.
#[derive(Debug)]
pub struct Shard {
    id: ShardId,
    transport: Arc<dyn Transport>,
    store: Arc<DocumentStore>,
    catalog: CommandCatalog,
    settings: HostSettings,
    queue_capacity: usize,
    hosts: RwLock<HashMap<TenantId, Arc<Host>>>,
}

impl Shard {
    /// Creates an empty shard. Each host it creates queues at most
    /// `queue_capacity` pending events.
    #[must_use]
    pub fn new(
        id: ShardId,
        transport: Arc<dyn Transport>,
        store: DocumentStore,
        catalog: CommandCatalog,
        settings: HostSettings,
        queue_capacity: usize,
    ) -> Arc<Self> {
        Arc::new(Self {
            id,
            transport,
            store: Arc::new(store),
            catalog,
            settings,
            queue_capacity: queue_capacity.max(1),
            hosts: RwLock::new(HashMap::new()),
        })
    }

    /// Shard identifier.
    #[must_use]
    pub const fn id(&self) -> ShardId {
        self.id
    }

    /// The shard's transport handle.
    #[must_use]
    pub const fn transport(&self) -> &Arc<dyn Transport> {
        &self.transport
    }

    /// The document store shared by all hosts.
    #[must_use]
    pub const fn store(&self) -> &Arc<DocumentStore> {
        &self.store
    }

    /// Settings applied to every host.
    #[must_use]
    pub const fn settings(&self) -> &HostSettings {
        &self.settings
    }

    /// Per-host inbox capacity.
    #[must_use]
    pub const fn queue_capacity(&self) -> usize {
        self.queue_capacity
    }

    /// Returns the host for `descriptor.id`, creating it if needed.
    ///
    /// # Errors
    ///
    /// Returns the persistence error that prevented host creation.
    pub async fn register(
        self: &Arc<Self>,
        descriptor: TenantDescriptor,
    ) -> Result<Arc<Host>, HostError> {
        let tenant_id = descriptor.id;
        if let Some(host) = self.hosts.read().await.get(&tenant_id) {
            return Ok(Arc::clone(host));
        }

        let mut map = self.hosts.write().await;
        if let Some(host) = map.get(&tenant_id) {
            return Ok(Arc::clone(host));
        }
        let host = Host::create(self, descriptor, &self.catalog).await?;
        map.insert(tenant_id, Arc::clone(&host));
        Ok(host)
    }

    /// Returns the host for `tenant_id`, looking up its descriptor through
    /// the transport and creating it if needed.
    ///
    /// # Errors
    ///
    /// Returns [`HostError::Transport`] if the tenant lookup fails, or the
    /// persistence error that prevented host creation.
    pub async fn activate(self: &Arc<Self>, tenant_id: TenantId) -> Result<Arc<Host>, HostError> {
        if let Ok(host) = self.get(tenant_id).await {
            return Ok(host);
        }
        let descriptor = self.transport.tenant(tenant_id).await?;
        self.register(descriptor).await
    }

    /// Accepts an inbound event from the transport.
    ///
    /// The origin tenant is activated on its first event and the event is
    /// queued on that host alone. Private events are not routed. Returns
    /// whether a host took the event.
    ///
    /// # Errors
    ///
    /// Returns the error that prevented the origin tenant's activation,
    /// or [`HostError::HostBusy`] if the tenant's inbox is full.
    pub async fn dispatch(self: &Arc<Self>, event: InboundEvent) -> Result<bool, HostError> {
        let Some(tenant_id) = event.tenant_id() else {
            tracing::debug!(event_id = %event.id, shard_id = %self.id, "private event not routed");
            return Ok(false);
        };
        let host = self.activate(tenant_id).await?;
        host.deliver(event)?;
        Ok(true)
    }

    /// Returns the live host for `tenant_id`.
    ///
    /// # Errors
    ///
    /// Returns [`HostError::HostNotFound`] if the tenant is not active.
    pub async fn get(&self, tenant_id: TenantId) -> Result<Arc<Host>, HostError> {
        self.hosts
            .read()
            .await
            .get(&tenant_id)
            .cloned()
            .ok_or(HostError::HostNotFound(tenant_id))
    }

    /// Discards the host for `tenant_id` and stops its listener at once,
    /// so outstanding handles can no longer handle messages.
    ///
    /// # Errors
    ///
    /// Returns [`HostError::HostNotFound`] if the tenant is not active.
    pub async fn deactivate(&self, tenant_id: TenantId) -> Result<Arc<Host>, HostError> {
        let mut map = self.hosts.write().await;
        let host = map
            .remove(&tenant_id)
            .ok_or(HostError::HostNotFound(tenant_id))?;
        host.stop();
        drop(map);
        tracing::info!(%tenant_id, shard_id = %self.id, "host deactivated");
        Ok(host)
    }

    /// Returns all live hosts ordered by tenant id.
    pub async fn hosts(&self) -> Vec<Arc<Host>> {
        let map = self.hosts.read().await;
        let mut hosts: Vec<Arc<Host>> = map.values().cloned().collect();
        hosts.sort_by_key(|host| host.id());
        hosts
    }

    /// Diagnostic strings of all live hosts.
    pub async fn describe_all(&self) -> Vec<String> {
        self.hosts().await.iter().map(|host| host.describe()).collect()
    }

    /// Saves every host, returning the tenants whose save failed.
    pub async fn save_all(&self) -> Vec<(TenantId, HostError)> {
        let hosts = self.hosts().await;
        let results = join_all(hosts.iter().map(|host| async move {
            (host.id(), host.save().await)
        }))
        .await;

        results
            .into_iter()
            .filter_map(|(tenant_id, result)| {
                result.err().map(|err| {
                    tracing::warn!(%tenant_id, error = %err, "host save failed");
                    (tenant_id, err)
                })
            })
            .collect()
    }

    /// Number of live hosts.
    pub async fn len(&self) -> usize {
        self.hosts.read().await.len()
    }

    /// Returns `true` if no host is live.
    pub async fn is_empty(&self) -> bool {
        self.hosts.read().await.is_empty()
    }
}
