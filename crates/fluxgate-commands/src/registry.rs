use std::sync::Arc;

use futures::future::BoxFuture;
use indexmap::IndexMap;
use serde_json::{Map, Value};

use crate::{CommandContext, CommandResult};

/// A registered command handler
///
/// Handlers receive the shared context and the caller's parameters;
/// they never mutate registry state.
pub type CommandHandler =
    Box<dyn Fn(Arc<CommandContext>, Map<String, Value>) -> BoxFuture<'static, CommandResult> + Send + Sync>;

/// Flat name-to-handler command table
///
/// Built once at startup; dispatch is a direct lookup, open for
/// extension by registering new names.
pub struct CommandRegistry {
    context: Arc<CommandContext>,
    handlers: IndexMap<String, CommandHandler>,
}

impl CommandRegistry {
    /// Create an empty registry over the given context
    pub fn new(context: Arc<CommandContext>) -> Self {
        Self {
            context,
            handlers: IndexMap::new(),
        }
    }

    /// Create a registry with all built-in commands registered
    pub fn with_builtins(context: Arc<CommandContext>) -> Self {
        let mut registry = Self::new(context);
        crate::builtins::register_builtins(&mut registry);
        registry
    }

    /// Register a handler under a command name
    ///
    /// A later registration under the same name replaces the earlier
    /// one.
    pub fn register<F>(&mut self, name: impl Into<String>, handler: F)
    where
        F: Fn(Arc<CommandContext>, Map<String, Value>) -> BoxFuture<'static, CommandResult>
            + Send
            + Sync
            + 'static,
    {
        self.handlers.insert(name.into(), Box::new(handler));
    }

    /// Dispatch a command by name
    ///
    /// Unregistered names yield a `Failure`; they are not an error at
    /// the transport level.
    pub async fn dispatch(&self, name: &str, params: Map<String, Value>) -> CommandResult {
        let Some(handler) = self.handlers.get(name) else {
            return CommandResult::failure(format!("Command not implemented: {name}"));
        };

        tracing::debug!(command = name, "dispatching command");
        handler(Arc::clone(&self.context), params).await
    }

    /// Registered command names, in registration order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.handlers.keys().map(String::as_str)
    }

    /// The shared handler context
    pub fn context(&self) -> &Arc<CommandContext> {
        &self.context
    }
}
