// src/model/binding.rs

//! Bindings tell a launcher how to make a selected implementation visible
//! to the program using it. They are carried through selection untouched.

use crate::model::command::COMMAND_RUN;
use serde::{Deserialize, Serialize};

/// How an environment binding combines with an existing value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnvironmentMode {
    #[default]
    Prepend,
    Append,
    Replace,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct EnvironmentBinding {
    /// Variable to set
    pub name: String,
    /// Literal value to use
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    /// Path inside the implementation to insert
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub insert: Option<String>,
    #[serde(default)]
    pub mode: EnvironmentMode,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub separator: Option<String>,
    /// Value assumed when the variable is not set yet
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Binding {
    Environment(EnvironmentBinding),
    ExecutableInVar {
        name: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        command: Option<String>,
    },
    ExecutableInPath {
        name: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        command: Option<String>,
    },
    Overlay {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        src: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        mount_point: Option<String>,
    },
}

impl Binding {
    /// Command an executable binding runs, `run` unless named
    pub fn command(&self) -> Option<&str> {
        match self {
            Binding::ExecutableInVar { command, .. } | Binding::ExecutableInPath { command, .. } => {
                Some(command.as_deref().unwrap_or(COMMAND_RUN))
            }
            _ => None,
        }
    }
}
