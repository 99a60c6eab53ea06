//! Per-tenant member bookkeeping.
//!
//! [`MemberRegistry`] records which users have spoken in the tenant and
//! when. It is owned by one host and shared with that host's commands.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::RwLock;

use crate::domain::{TenantId, UserId};

/// Activity summary for one member.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MemberRecord {
    /// Member's user id.
    pub user_id: UserId,
    /// First message seen from this member.
    pub first_seen: DateTime<Utc>,
    /// Most recent message seen from this member.
    pub last_seen: DateTime<Utc>,
    /// Messages seen in tenant channels.
    pub message_count: u64,
}

/// Members observed in one tenant.
#[derive(Debug)]
pub struct MemberRegistry {
    tenant_id: TenantId,
    members: RwLock<HashMap<UserId, MemberRecord>>,
}

impl MemberRegistry {
    /// Creates an empty registry for `tenant_id`.
    #[must_use]
    pub fn new(tenant_id: TenantId) -> Self {
        Self {
            tenant_id,
            members: RwLock::new(HashMap::new()),
        }
    }

    /// Tenant this registry belongs to.
    #[must_use]
    pub const fn tenant_id(&self) -> TenantId {
        self.tenant_id
    }

    /// Records a message from `user_id` at `at`.
    pub async fn observe(&self, user_id: UserId, at: DateTime<Utc>) {
        let mut map = self.members.write().await;
        map.entry(user_id)
            .and_modify(|record| {
                record.last_seen = record.last_seen.max(at);
                record.message_count = record.message_count.saturating_add(1);
            })
            .or_insert(MemberRecord {
                user_id,
                first_seen: at,
                last_seen: at,
                message_count: 1,
            });
    }

    /// Returns the record for `user_id`, if seen.
    pub async fn get(&self, user_id: UserId) -> Option<MemberRecord> {
        self.members.read().await.get(&user_id).cloned()
    }

    /// Drops the record for `user_id`, e.g. after a kick.
    pub async fn forget(&self, user_id: UserId) -> Option<MemberRecord> {
        self.members.write().await.remove(&user_id)
    }

    /// Returns every record, most recently active first.
    pub async fn list(&self) -> Vec<MemberRecord> {
        let map = self.members.read().await;
        let mut records: Vec<MemberRecord> = map.values().cloned().collect();
        records.sort_by(|a, b| b.last_seen.cmp(&a.last_seen));
        records
    }

    /// Number of members seen.
    pub async fn len(&self) -> usize {
        self.members.read().await.len()
    }

    /// Returns `true` if nobody has been seen yet.
    pub async fn is_empty(&self) -> bool {
        self.members.read().await.is_empty()
    }
}
