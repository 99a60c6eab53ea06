//! Shared application state injected into all Axum handlers.

use std::sync::Arc;

use crate::shard::Shard;

/// Shared application state available to all handlers via Axum's
/// `State` extractor.
#[derive(Debug, Clone)]
pub struct AppState {
    /// The shard served by this process.
    pub shard: Arc<Shard>,
}
