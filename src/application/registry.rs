//! # Command Registry
//!
//! Holds every command the bot knows about, indexed by name.
//! Modules are registered once at startup; afterwards the registry is only read,
//! so it is shared between dispatches behind an `Arc` without locking.

use crate::application::auth::Access;
use crate::application::context::Context;
use crate::domain::error::StartupError;
use anyhow::Result;
use futures::future::{BoxFuture, FutureExt};
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::future::Future;
use std::sync::Arc;

pub type HandlerFuture = BoxFuture<'static, Result<()>>;

/// Every command has this shape, whether it awaits I/O or not.
pub type Handler = Arc<dyn Fn(Context, String) -> HandlerFuture + Send + Sync>;

#[derive(Clone)]
pub struct CommandDescriptor {
    pub name: String,
    pub hidden: bool,
    pub access: Access,
    pub summary: Option<String>,
    /// Name of the declaring module, filled in on registration
    pub module: String,
    handler: Handler,
}

impl CommandDescriptor {
    pub fn new<F, Fut>(name: &str, handler: F) -> Self
    where
        F: Fn(Context, String) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<()>> + Send + 'static,
    {
        Self {
            name: name.to_lowercase(),
            hidden: false,
            access: Access::Everyone,
            summary: None,
            module: String::new(),
            handler: Arc::new(move |ctx, args| handler(ctx, args).boxed()),
        }
    }

    /// Wraps a handler that never awaits.
    pub fn sync<F>(name: &str, handler: F) -> Self
    where
        F: Fn(&Context, &str) -> Result<()> + Send + Sync + 'static,
    {
        let handler = Arc::new(handler);
        Self::new(name, move |ctx, args| {
            let handler = handler.clone();
            async move { handler(&ctx, &args) }
        })
    }

    pub fn hidden(mut self) -> Self {
        self.hidden = true;
        self
    }

    pub fn owner_only(mut self) -> Self {
        self.access = Access::Owner;
        self
    }

    pub fn summary(mut self, summary: &str) -> Self {
        self.summary = Some(summary.to_string());
        self
    }

    pub fn invoke(&self, ctx: Context, args: String) -> HandlerFuture {
        (self.handler)(ctx, args)
    }
}

impl fmt::Debug for CommandDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandDescriptor")
            .field("name", &self.name)
            .field("hidden", &self.hidden)
            .field("access", &self.access)
            .field("module", &self.module)
            .finish_non_exhaustive()
    }
}

/// A named group of commands; the unit of registration.
pub struct Module {
    pub name: String,
    pub commands: Vec<CommandDescriptor>,
}

impl Module {
    pub fn new(name: &str, commands: Vec<CommandDescriptor>) -> Self {
        Self {
            name: name.to_string(),
            commands,
        }
    }
}

#[derive(Default)]
pub struct Registry {
    by_name: HashMap<String, usize>,
    all: Vec<Arc<CommandDescriptor>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_modules(modules: impl IntoIterator<Item = Module>) -> Result<Self, StartupError> {
        let mut registry = Self::new();
        for module in modules {
            registry.register(module)?;
        }
        Ok(registry)
    }

    /// Adds all of a module's commands. Nothing is added if any name collides.
    pub fn register(&mut self, module: Module) -> Result<(), StartupError> {
        let mut seen = HashSet::new();
        for command in &module.commands {
            let existing = match self.by_name.get(&command.name) {
                Some(&idx) => Some(self.all[idx].module.clone()),
                None if !seen.insert(command.name.as_str()) => Some(module.name.clone()),
                None => None,
            };
            if let Some(existing) = existing {
                return Err(StartupError::DuplicateCommand {
                    name: command.name.clone(),
                    module: module.name.clone(),
                    existing,
                });
            }
        }

        for mut command in module.commands {
            command.module = module.name.clone();
            self.by_name.insert(command.name.clone(), self.all.len());
            self.all.push(Arc::new(command));
        }
        Ok(())
    }

    pub fn lookup(&self, name: &str) -> Option<Arc<CommandDescriptor>> {
        self.by_name.get(name).map(|&idx| self.all[idx].clone())
    }

    /// Non-hidden commands in declaration order, paired with their module name.
    pub fn list_visible(&self) -> impl Iterator<Item = (&str, &CommandDescriptor)> + '_ {
        self.all
            .iter()
            .filter(|command| !command.hidden)
            .map(|command| (command.module.as_str(), command.as_ref()))
    }

    pub fn len(&self) -> usize {
        self.all.len()
    }

    pub fn is_empty(&self) -> bool {
        self.all.is_empty()
    }
}
