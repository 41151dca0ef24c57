// src/commands/mod.rs
pub mod cat;
pub mod echo;
pub mod grep;
pub mod registry;
pub mod true_cmd;
pub mod types;
pub mod wc;

pub use registry::{create_default_registry, CommandRegistry};
pub use types::{Command, CommandContext, HandlerResult};
