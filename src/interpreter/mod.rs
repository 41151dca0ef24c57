//! Interpreter module
//!
//! Executes parsed statements against a shell session's state.

pub mod errors;
pub mod executor;
pub mod expansion;
pub mod pipeline_execution;
pub mod redirections;
pub mod types;

pub use errors::{HandlerError, RedirectError};
pub use executor::Executor;
pub use expansion::{expand_arguments, expand_variable};
pub use pipeline_execution::{PipelineStage, PipelineState};
pub use redirections::strip_ansi;
pub use types::*;
