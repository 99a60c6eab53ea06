//! Prefix-based routing of messages to commands.

use std::any::Any;
use std::collections::HashMap;
use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicU64, Ordering};

use futures_util::FutureExt;

use super::{Command, Invocation};
use crate::domain::InboundEvent;

/// Result of routing one message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// The message did not start with the prefix.
    NotACommand,
    /// Prefixed, but no command answers to the label.
    Unknown(String),
    /// The command ran to completion.
    Executed(&'static str),
    /// The command returned an error or panicked (already logged).
    Failed {
        /// Command name.
        command: &'static str,
        /// Rendered error.
        error: String,
    },
}

/// Routes inbound messages to one host's commands.
#[derive(Debug)]
pub struct CommandDispatcher {
    commands: Vec<Box<dyn Command>>,
    /// Lower-cased name or alias → position in `commands`.
    labels: HashMap<String, usize>,
    dispatched: AtomicU64,
}

impl CommandDispatcher {
    /// Indexes `commands` by name and aliases. On a label clash the
    /// earlier command keeps the label.
    #[must_use]
    pub fn new(commands: Vec<Box<dyn Command>>) -> Self {
        let mut labels = HashMap::new();
        for (idx, command) in commands.iter().enumerate() {
            let names = std::iter::once(command.name()).chain(command.aliases().iter().copied());
            for label in names {
                let label = label.to_lowercase();
                if labels.contains_key(&label) {
                    tracing::warn!(%label, command = command.name(), "duplicate command label ignored");
                    continue;
                }
                labels.insert(label, idx);
            }
        }
        Self {
            commands,
            labels,
            dispatched: AtomicU64::new(0),
        }
    }

    /// Looks up a command by name or alias, case-insensitively.
    #[must_use]
    pub fn lookup(&self, label: &str) -> Option<&dyn Command> {
        self.labels
            .get(&label.to_lowercase())
            .and_then(|idx| self.commands.get(*idx))
            .map(|command| &**command)
    }

    /// Primary names of all hosted commands, in registration order.
    #[must_use]
    pub fn command_names(&self) -> Vec<&'static str> {
        self.commands.iter().map(|c| c.name()).collect()
    }

    /// Number of messages handed to [`Self::dispatch`] so far.
    #[must_use]
    pub fn dispatch_count(&self) -> u64 {
        self.dispatched.load(Ordering::Relaxed)
    }

    /// Parses `event` against `prefix` and runs the matching command.
    ///
    /// Command failures, panics included, are logged and reported in the
    /// outcome; they are never propagated.
    pub async fn dispatch(&self, prefix: &str, event: &InboundEvent) -> DispatchOutcome {
        self.dispatched.fetch_add(1, Ordering::Relaxed);

        let Some(invocation) = parse(prefix, event) else {
            return DispatchOutcome::NotACommand;
        };
        let Some(command) = self.lookup(&invocation.label) else {
            tracing::debug!(label = %invocation.label, "unknown command");
            return DispatchOutcome::Unknown(invocation.label);
        };

        let name = command.name();
        let result = AssertUnwindSafe(command.execute(&invocation))
            .catch_unwind()
            .await;
        match result {
            Ok(Ok(())) => {
                tracing::debug!(command = name, sender = %event.sender, "command executed");
                DispatchOutcome::Executed(name)
            }
            Ok(Err(err)) => {
                tracing::warn!(command = name, sender = %event.sender, error = %err, "command failed");
                DispatchOutcome::Failed {
                    command: name,
                    error: err.to_string(),
                }
            }
            Err(payload) => {
                let error = format!("panicked: {}", panic_message(payload.as_ref()));
                tracing::warn!(command = name, sender = %event.sender, %error, "command panicked");
                DispatchOutcome::Failed {
                    command: name,
                    error,
                }
            }
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "non-string payload".to_string()
    }
}

fn parse(prefix: &str, event: &InboundEvent) -> Option<Invocation> {
    if prefix.is_empty() {
        return None;
    }
    let rest = event.content.trim_start().strip_prefix(prefix)?;
    let mut words = rest.split_whitespace();
    let label = words.next()?.to_lowercase();
    Some(Invocation {
        label,
        args: words.map(str::to_string).collect(),
        event: event.clone(),
    })
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use async_trait::async_trait;
    use tokio::sync::Mutex;

    use crate::domain::{ChannelId, TenantId, UserId};
    use crate::error::HostError;

    #[derive(Debug, Default)]
    struct Echo {
        seen: Arc<Mutex<Vec<Vec<String>>>>,
    }

    #[async_trait]
    impl Command for Echo {
        fn name(&self) -> &'static str {
            "echo"
        }

        fn aliases(&self) -> &'static [&'static str] {
            &["say"]
        }

        async fn execute(&self, invocation: &Invocation) -> Result<(), HostError> {
            self.seen.lock().await.push(invocation.args.clone());
            Ok(())
        }
    }

    #[derive(Debug, Default)]
    struct Broken;

    #[async_trait]
    impl Command for Broken {
        fn name(&self) -> &'static str {
            "broken"
        }

        async fn execute(&self, _invocation: &Invocation) -> Result<(), HostError> {
            Err(HostError::Internal("boom".to_string()))
        }
    }

    #[derive(Debug, Default)]
    struct Explodes;

    #[async_trait]
    impl Command for Explodes {
        fn name(&self) -> &'static str {
            "explode"
        }

        async fn execute(&self, invocation: &Invocation) -> Result<(), HostError> {
            panic!("exploded on {}", invocation.label);
        }
    }

    fn message(content: &str) -> InboundEvent {
        InboundEvent::in_tenant(TenantId::new(1), ChannelId::new(2), UserId::new(3), content)
    }

    fn make_dispatcher() -> (Arc<Mutex<Vec<Vec<String>>>>, CommandDispatcher) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let echo = Echo {
            seen: Arc::clone(&seen),
        };
        let dispatcher = CommandDispatcher::new(vec![Box::new(echo), Box::new(Broken)]);
        (seen, dispatcher)
    }

    #[tokio::test]
    async fn routes_by_name_and_alias() {
        let (seen, dispatcher) = make_dispatcher();

        let first = dispatcher.dispatch("_", &message("_echo a b")).await;
        let second = dispatcher.dispatch("_", &message("_SAY c")).await;

        assert_eq!(first, DispatchOutcome::Executed("echo"));
        assert_eq!(second, DispatchOutcome::Executed("echo"));
        let seen = seen.lock().await;
        assert_eq!(
            *seen,
            vec![
                vec!["a".to_string(), "b".to_string()],
                vec!["c".to_string()]
            ]
        );
    }

    #[tokio::test]
    async fn unprefixed_message_is_not_a_command() {
        let (_, dispatcher) = make_dispatcher();
        let outcome = dispatcher.dispatch("!", &message("echo hi")).await;
        assert_eq!(outcome, DispatchOutcome::NotACommand);
        assert_eq!(dispatcher.dispatch_count(), 1);
    }

    #[tokio::test]
    async fn unknown_label_is_reported() {
        let (_, dispatcher) = make_dispatcher();
        let outcome = dispatcher.dispatch("!", &message("!nope")).await;
        assert_eq!(outcome, DispatchOutcome::Unknown("nope".to_string()));
    }

    #[tokio::test]
    async fn command_error_is_contained() {
        let (_, dispatcher) = make_dispatcher();
        let outcome = dispatcher.dispatch("_", &message("_broken")).await;
        let DispatchOutcome::Failed { command, error } = outcome else {
            panic!("expected failure outcome");
        };
        assert_eq!(command, "broken");
        assert!(error.contains("boom"));
    }

    #[test]
    fn duplicate_labels_keep_first_command() {
        let (_, dispatcher) = make_dispatcher();
        let dup = CommandDispatcher::new(vec![Box::new(Echo::default()), Box::new(Echo::default())]);
        assert_eq!(dup.command_names(), vec!["echo", "echo"]);
        assert!(dup.lookup("say").is_some());
        assert!(dispatcher.lookup("BROKEN").is_some());
    }

    #[tokio::test]
    async fn panicking_command_is_contained_and_dispatch_continues() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let echo = Echo {
            seen: Arc::clone(&seen),
        };
        let dispatcher = CommandDispatcher::new(vec![Box::new(Explodes), Box::new(echo)]);

        let outcome = dispatcher.dispatch("_", &message("_explode")).await;
        let DispatchOutcome::Failed { command, error } = outcome else {
            panic!("expected failure outcome");
        };
        assert_eq!(command, "explode");
        assert!(error.contains("exploded on explode"));

        let outcome = dispatcher.dispatch("_", &message("_echo after")).await;
        assert_eq!(outcome, DispatchOutcome::Executed("echo"));
        assert_eq!(*seen.lock().await, vec![vec!["after".to_string()]]);
    }
}
