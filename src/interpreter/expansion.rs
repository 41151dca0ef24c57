//! Variable Expansion
//!
//! Resolves `VariableNode` arguments against the session state. Unset
//! names expand to the empty string.

use crate::ast::types::Argument;
use crate::interpreter::types::ShellState;

/// Expand one variable name.
///
/// `?` is the last exit code. `#`, `@` and `0` are reserved for argument
/// vectors and currently read the environment entry of the same key.
pub fn expand_variable(state: &ShellState, name: &str) -> String {
    match name {
        "?" => state.last_exit_code.to_string(),
        _ => state.get_var(name).unwrap_or_default().to_string(),
    }
}

/// Expand a command's argument list into plain strings.
pub fn expand_arguments(state: &ShellState, args: &[Argument]) -> Vec<String> {
    args.iter()
        .map(|arg| match arg {
            Argument::Literal(s) => s.clone(),
            Argument::Variable(v) => expand_variable(state, &v.name),
        })
        .collect()
}
