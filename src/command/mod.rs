//! Command hosting contract.
//!
//! A [`Command`] is instantiated once per host from a [`CommandCatalog`].
//! Right after construction it receives the host's [`Dependencies`] via
//! [`Command::bind`] and keeps whichever handles it needs. The host's
//! [`CommandDispatcher`] then routes prefixed messages to it.
//!
//! Back-references to the host, its dispatcher and its shard are weak:
//! they own the command, so a strong handle would keep them alive forever.

pub mod catalog;
pub mod dispatcher;

use std::sync::{Arc, Weak};

use async_trait::async_trait;

use crate::domain::{InboundEvent, TenantDescriptor};
use crate::error::HostError;
use crate::host::Host;
use crate::member::MemberRegistry;
use crate::shard::Shard;
use crate::transport::Transport;

pub use catalog::CommandCatalog;
pub use dispatcher::{CommandDispatcher, DispatchOutcome};

/// A parsed command call.
#[derive(Debug, Clone)]
pub struct Invocation {
    /// The label the user typed (name or alias, lower-cased).
    pub label: String,
    /// Whitespace-separated arguments after the label.
    pub args: Vec<String>,
    /// The originating message.
    pub event: InboundEvent,
}

/// Handles available to a command, scoped to one host.
#[derive(Debug, Clone)]
pub struct Dependencies {
    pub(crate) host: Weak<Host>,
    pub(crate) dispatcher: Weak<CommandDispatcher>,
    pub(crate) members: Arc<MemberRegistry>,
    pub(crate) tenant: TenantDescriptor,
    pub(crate) transport: Arc<dyn Transport>,
    pub(crate) shard: Weak<Shard>,
}

impl Dependencies {
    /// The owning host, while it is alive.
    #[must_use]
    pub fn host(&self) -> Option<Arc<Host>> {
        self.host.upgrade()
    }

    /// The host's dispatcher, while it is alive.
    #[must_use]
    pub fn dispatcher(&self) -> Option<Arc<CommandDispatcher>> {
        self.dispatcher.upgrade()
    }

    /// The host's member registry.
    #[must_use]
    pub fn members(&self) -> Arc<MemberRegistry> {
        Arc::clone(&self.members)
    }

    /// The tenant the host serves.
    #[must_use]
    pub const fn tenant(&self) -> &TenantDescriptor {
        &self.tenant
    }

    /// The shard's transport handle.
    #[must_use]
    pub fn transport(&self) -> Arc<dyn Transport> {
        Arc::clone(&self.transport)
    }

    /// The owning shard, while it is alive.
    #[must_use]
    pub fn shard(&self) -> Option<Arc<Shard>> {
        self.shard.upgrade()
    }
}

/// A chat command hosted by a [`Host`].
#[async_trait]
pub trait Command: Send + Sync + std::fmt::Debug {
    /// Primary name, matched case-insensitively.
    fn name(&self) -> &'static str;

    /// Alternative names.
    fn aliases(&self) -> &'static [&'static str] {
        &[]
    }

    /// Receives the host's dependencies once, before the first call.
    fn bind(&mut self, _deps: &Dependencies) {}

    /// Runs the command.
    ///
    /// # Errors
    ///
    /// Any error is logged by the dispatcher; it never stops the host.
    async fn execute(&self, invocation: &Invocation) -> Result<(), HostError>;
}
