// src/model/command.rs

//! Named entry points of an implementation

use crate::model::binding::Binding;
use crate::model::dependency::{Dependency, Restriction};
use serde::{Deserialize, Serialize};

/// Command run by default
pub const COMMAND_RUN: &str = "run";
/// Command running an implementation's self-test
pub const COMMAND_TEST: &str = "test";
/// Command building a source implementation
pub const COMMAND_COMPILE: &str = "compile";

/// Another implementation used to execute a command (e.g. an interpreter)
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Runner {
    #[serde(flatten)]
    pub dependency: Dependency,
    /// Command of the runner to use
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub command: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub args: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Command {
    pub name: String,

    /// Relative path of the executable inside the implementation
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub args: Vec<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub bindings: Vec<Binding>,

    /// Directory to switch to before running, relative to the implementation
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub working_dir: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub dependencies: Vec<Dependency>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub restrictions: Vec<Restriction>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub runner: Option<Runner>,
}

impl Command {
    /// A command that runs `path` with no extra configuration
    pub fn new(name: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            path: Some(path.into()),
            ..Default::default()
        }
    }
}
