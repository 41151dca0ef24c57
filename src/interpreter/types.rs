//! Interpreter Types
//!
//! Session state threaded through every `execute` call, plus the
//! exit-code convention.

use std::collections::HashMap;

pub const EXIT_SUCCESS: i32 = 0;
/// Generic parse, pipeline, redirect or handler failure
pub const EXIT_FAILURE: i32 = 1;
pub const EXIT_COMMAND_NOT_FOUND: i32 = 127;

/// Environment and exit-code cell owned by one shell session.
#[derive(Debug, Clone)]
pub struct ShellState {
    pub env: HashMap<String, String>,
    /// Read by `$?`
    pub last_exit_code: i32,
    /// Base for resolving relative redirect paths
    pub cwd: String,
}

impl ShellState {
    pub fn new(cwd: impl Into<String>) -> Self {
        Self {
            env: HashMap::new(),
            last_exit_code: EXIT_SUCCESS,
            cwd: cwd.into(),
        }
    }

    pub fn get_var(&self, name: &str) -> Option<&str> {
        self.env.get(name).map(String::as_str)
    }

    pub fn set_var(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.env.insert(name.into(), value.into());
    }

    pub fn update_exit_code(&mut self, exit_code: i32) {
        self.last_exit_code = exit_code;
    }
}

impl Default for ShellState {
    fn default() -> Self {
        Self::new("/")
    }
}
