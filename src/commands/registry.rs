// src/commands/registry.rs
use std::collections::HashMap;
use super::types::Command;

use super::cat::CatCommand;
use super::echo::EchoCommand;
use super::grep::GrepCommand;
use super::true_cmd::{FalseCommand, TrueCommand};
use super::wc::WcCommand;

/// Name-to-handler table consulted by the executor.
pub struct CommandRegistry {
    commands: HashMap<String, Box<dyn Command>>,
}

impl CommandRegistry {
    pub fn new() -> Self {
        Self {
            commands: HashMap::new(),
        }
    }

    /// Register a handler under its own name. A later registration with the
    /// same name replaces the earlier one.
    pub fn register(&mut self, cmd: Box<dyn Command>) {
        self.commands.insert(cmd.name().to_string(), cmd);
    }

    pub fn get(&self, name: &str) -> Option<&dyn Command> {
        self.commands.get(name).map(|c| c.as_ref())
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.commands.keys().map(|s| s.as_str()).collect();
        names.sort_unstable();
        names
    }

    pub fn contains(&self, name: &str) -> bool {
        self.commands.contains_key(name)
    }
}

impl Default for CommandRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Register the bundled demo commands.
pub fn register_defaults(registry: &mut CommandRegistry) {
    registry.register(Box::new(EchoCommand));
    registry.register(Box::new(CatCommand));
    registry.register(Box::new(GrepCommand));
    registry.register(Box::new(WcCommand));
    registry.register(Box::new(TrueCommand));
    registry.register(Box::new(FalseCommand));
}

/// Registry holding every bundled command.
pub fn create_default_registry() -> CommandRegistry {
    let mut registry = CommandRegistry::new();
    register_defaults(&mut registry);
    registry
}
