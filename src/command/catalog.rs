//! Catalog of command constructors shared by all hosts on a shard.

use std::fmt;
use std::sync::Arc;

use super::{Command, Dependencies};

type CommandFactory = Arc<dyn Fn() -> Box<dyn Command> + Send + Sync>;

/// Ordered list of command constructors.
///
/// Every host builds its own instances so that bound dependencies never
/// leak between tenants.
#[derive(Clone, Default)]
pub struct CommandCatalog {
    factories: Vec<CommandFactory>,
}

impl CommandCatalog {
    /// Creates an empty catalog.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a constructor.
    #[must_use]
    pub fn with_factory<F>(mut self, factory: F) -> Self
    where
        F: Fn() -> Box<dyn Command> + Send + Sync + 'static,
    {
        self.factories.push(Arc::new(factory));
        self
    }

    /// Adds a command built with `Default`.
    #[must_use]
    pub fn with<C>(self) -> Self
    where
        C: Command + Default + 'static,
    {
        self.with_factory(|| Box::new(C::default()))
    }

    /// Number of registered constructors.
    #[must_use]
    pub fn len(&self) -> usize {
        self.factories.len()
    }

    /// Returns `true` if no commands are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }

    /// Builds one instance of every command and binds `deps` into it.
    #[must_use]
    pub fn instantiate(&self, deps: &Dependencies) -> Vec<Box<dyn Command>> {
        self.factories
            .iter()
            .map(|factory| {
                let mut command = factory();
                command.bind(deps);
                command
            })
            .collect()
    }
}

impl fmt::Debug for CommandCatalog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandCatalog")
            .field("commands", &self.factories.len())
            .finish()
    }
}
