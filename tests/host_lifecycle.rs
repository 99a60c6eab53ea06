//! End-to-end host lifecycle through the public shard API.

#![allow(clippy::panic)]

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::json;
use tempfile::TempDir;
use tokio::sync::Notify;

use guild_host::command::{Command, CommandCatalog, Dependencies, Invocation};
use guild_host::domain::{ChannelId, InboundEvent, ShardId, TenantId, UserId};
use guild_host::error::HostError;
use guild_host::host::HostSettings;
use guild_host::persistence::DocumentStore;
use guild_host::shard::Shard;
use guild_host::transport::{InMemoryTransport, Transport};

const CHANNEL: ChannelId = ChannelId::new(500);

#[derive(Debug, Default)]
struct Ping {
    deps: Option<Dependencies>,
}

#[async_trait]
impl Command for Ping {
    fn name(&self) -> &'static str {
        "ping"
    }

    fn bind(&mut self, deps: &Dependencies) {
        self.deps = Some(deps.clone());
    }

    async fn execute(&self, invocation: &Invocation) -> Result<(), HostError> {
        let deps = self
            .deps
            .as_ref()
            .ok_or_else(|| HostError::Internal("ping not bound".to_string()))?;
        let reply = format!("pong from {}", deps.tenant().name);
        deps.transport()
            .send_message(invocation.event.channel_id, &reply)
            .await?;
        Ok(())
    }
}

#[derive(Debug, Default)]
struct Prefix {
    deps: Option<Dependencies>,
}

#[async_trait]
impl Command for Prefix {
    fn name(&self) -> &'static str {
        "prefix"
    }

    fn bind(&mut self, deps: &Dependencies) {
        self.deps = Some(deps.clone());
    }

    async fn execute(&self, invocation: &Invocation) -> Result<(), HostError> {
        let host = self
            .deps
            .as_ref()
            .and_then(Dependencies::host)
            .ok_or_else(|| HostError::Internal("host gone".to_string()))?;
        let Some(prefix) = invocation.args.first() else {
            return Err(HostError::InvalidRequest("missing prefix".to_string()));
        };
        let prefix = prefix.clone();
        host.update_and_save(move |doc| doc.set("prefix", prefix))
            .await?;
        Ok(())
    }
}

/// Replies `<tenant>:<first arg>`.
#[derive(Debug, Default)]
struct Say {
    deps: Option<Dependencies>,
}

#[async_trait]
impl Command for Say {
    fn name(&self) -> &'static str {
        "say"
    }

    fn bind(&mut self, deps: &Dependencies) {
        self.deps = Some(deps.clone());
    }

    async fn execute(&self, invocation: &Invocation) -> Result<(), HostError> {
        let deps = self
            .deps
            .as_ref()
            .ok_or_else(|| HostError::Internal("say not bound".to_string()))?;
        let word = invocation.args.first().map_or("", String::as_str);
        deps.transport()
            .send_message(invocation.event.channel_id, &format!("{}:{word}", deps.tenant().id))
            .await?;
        Ok(())
    }
}

/// Blocks until the shared gate opens.
#[derive(Debug)]
struct Hold {
    gate: Arc<Notify>,
}

#[async_trait]
impl Command for Hold {
    fn name(&self) -> &'static str {
        "hold"
    }

    async fn execute(&self, _invocation: &Invocation) -> Result<(), HostError> {
        self.gate.notified().await;
        Ok(())
    }
}

fn make_shard(dir: &TempDir, transport: &Arc<InMemoryTransport>) -> Arc<Shard> {
    Shard::new(
        ShardId::new(0),
        Arc::clone(transport) as Arc<dyn Transport>,
        DocumentStore::new(dir.path().join("hosts")),
        CommandCatalog::new().with::<Ping>().with::<Prefix>(),
        HostSettings::default(),
        64,
    )
}

fn message(tenant: u64, content: &str) -> InboundEvent {
    InboundEvent::in_tenant(TenantId::new(tenant), CHANNEL, UserId::new(7), content)
}

async fn wait_for_messages(transport: &InMemoryTransport, count: usize) -> Vec<String> {
    let waited = tokio::time::timeout(Duration::from_secs(5), async {
        loop {
            let sent = transport.sent_messages().await;
            if sent.len() >= count {
                return sent;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await;
    let Ok(sent) = waited else {
        panic!("expected {count} replies");
    };
    sent.into_iter().map(|(_, content)| content).collect()
}

#[tokio::test]
async fn prefix_change_survives_a_restart() {
    let Ok(dir) = TempDir::new() else {
        panic!("temp dir");
    };
    let transport = Arc::new(InMemoryTransport::new());

    {
        let shard = make_shard(&dir, &transport);
        assert!(shard.dispatch(message(42, "_ping")).await.is_ok());
        assert_eq!(wait_for_messages(&transport, 1).await, vec!["pong from guild-42"]);

        assert!(shard.dispatch(message(42, "_prefix !")).await.is_ok());
        assert!(shard.dispatch(message(42, "!ping")).await.is_ok());
        wait_for_messages(&transport, 2).await;
    }

    let record = dir.path().join("hosts").join("42.json");
    let Ok(content) = std::fs::read_to_string(&record) else {
        panic!("record missing");
    };
    let Ok(saved) = serde_json::from_str::<serde_json::Value>(&content) else {
        panic!("record is not JSON");
    };
    assert_eq!(saved, json!({ "prefix": "!" }));

    let shard = make_shard(&dir, &transport);
    let Ok(host) = shard.activate(TenantId::new(42)).await else {
        panic!("reactivation failed");
    };
    assert_eq!(host.prefix().await, "!");

    assert!(shard.dispatch(message(42, "_ping")).await.is_ok());
    assert!(shard.dispatch(message(42, "!ping")).await.is_ok());
    let replies = wait_for_messages(&transport, 3).await;
    assert_eq!(replies.len(), 3);
}

#[tokio::test]
async fn tenants_keep_separate_records() {
    let Ok(dir) = TempDir::new() else {
        panic!("temp dir");
    };
    let transport = Arc::new(InMemoryTransport::new());
    let shard = make_shard(&dir, &transport);

    assert!(shard.dispatch(message(1, "_prefix ?")).await.is_ok());
    assert!(shard.dispatch(message(2, "_ping")).await.is_ok());
    wait_for_messages(&transport, 1).await;

    let Ok(first) = shard.get(TenantId::new(1)).await else {
        panic!("tenant 1 inactive");
    };
    let Ok(second) = shard.get(TenantId::new(2)).await else {
        panic!("tenant 2 inactive");
    };
    let wait = tokio::time::timeout(Duration::from_secs(5), async {
        while first.prefix().await != "?" {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await;
    assert!(wait.is_ok());
    assert_eq!(second.prefix().await, "_");
    assert!(second.config_snapshot().await.is_empty());
}

#[tokio::test]
async fn malformed_record_blocks_activation_and_is_kept() {
    let Ok(dir) = TempDir::new() else {
        panic!("temp dir");
    };
    let hosts = dir.path().join("hosts");
    assert!(std::fs::create_dir_all(&hosts).is_ok());
    let record = hosts.join("13.json");
    assert!(std::fs::write(&record, "{ not json").is_ok());

    let transport = Arc::new(InMemoryTransport::new());
    let shard = make_shard(&dir, &transport);
    let result = shard.activate(TenantId::new(13)).await;
    assert!(matches!(result, Err(HostError::MalformedDocument { .. })));
    assert!(shard.is_empty().await);

    let Ok(content) = std::fs::read_to_string(&record) else {
        panic!("record missing");
    };
    assert_eq!(content, "{ not json");
}

#[tokio::test]
async fn busy_tenant_does_not_lose_events_to_other_tenants_traffic() {
    let Ok(dir) = TempDir::new() else {
        panic!("temp dir");
    };
    let transport = Arc::new(InMemoryTransport::new());
    let gate = Arc::new(Notify::new());
    let hold_gate = Arc::clone(&gate);
    let shard = Shard::new(
        ShardId::new(0),
        Arc::clone(&transport) as Arc<dyn Transport>,
        DocumentStore::new(dir.path().join("hosts")),
        CommandCatalog::new()
            .with::<Say>()
            .with_factory(move || {
                Box::new(Hold {
                    gate: Arc::clone(&hold_gate),
                })
            }),
        HostSettings::default(),
        4,
    );

    assert!(matches!(shard.dispatch(message(1, "_hold")).await, Ok(true)));
    assert!(matches!(shard.dispatch(message(1, "_say mine")).await, Ok(true)));

    for n in 0..10 {
        let routed = shard.dispatch(message(2, &format!("_say {n}"))).await;
        assert!(matches!(routed, Ok(true)));
        wait_for_messages(&transport, n + 1).await;
    }

    gate.notify_one();
    let replies = wait_for_messages(&transport, 11).await;
    assert_eq!(replies.last().map(String::as_str), Some("1:mine"));
    for n in 0..10 {
        assert!(replies.contains(&format!("2:{n}")));
    }
}

#[tokio::test]
async fn full_inbox_rejects_only_the_busy_tenant() {
    let Ok(dir) = TempDir::new() else {
        panic!("temp dir");
    };
    let transport = Arc::new(InMemoryTransport::new());
    let gate = Arc::new(Notify::new());
    let hold_gate = Arc::clone(&gate);
    let shard = Shard::new(
        ShardId::new(0),
        Arc::clone(&transport) as Arc<dyn Transport>,
        DocumentStore::new(dir.path().join("hosts")),
        CommandCatalog::new()
            .with::<Say>()
            .with_factory(move || {
                Box::new(Hold {
                    gate: Arc::clone(&hold_gate),
                })
            }),
        HostSettings::default(),
        1,
    );

    assert!(matches!(shard.dispatch(message(1, "_hold")).await, Ok(true)));
    let Ok(host) = shard.get(TenantId::new(1)).await else {
        panic!("tenant 1 inactive");
    };
    let drained = tokio::time::timeout(Duration::from_secs(5), async {
        while host.pending_events() > 0 {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await;
    assert!(drained.is_ok());

    assert!(matches!(shard.dispatch(message(1, "_say queued")).await, Ok(true)));
    assert!(matches!(
        shard.dispatch(message(1, "_say overflow")).await,
        Err(HostError::HostBusy(_))
    ));
    assert!(matches!(shard.dispatch(message(2, "_say other")).await, Ok(true)));
    assert_eq!(wait_for_messages(&transport, 1).await, vec!["2:other"]);

    gate.notify_one();
    let replies = wait_for_messages(&transport, 2).await;
    assert_eq!(replies, vec!["2:other", "1:queued"]);
}
