// src/commands/mod.rs
//! Command handlers for the zerodeploy CLI

mod config;
mod import;
mod key;
mod select;
mod trust;

pub use config::{cmd_config_set, cmd_config_show};
pub use import::cmd_import;
pub use key::{cmd_key_import, cmd_key_list};
pub use select::{SelectOptions, cmd_select};
pub use trust::{cmd_trust_add, cmd_trust_list, cmd_trust_remove};

use zerodeploy::{BatchHandler, CliHandler, Handler};

/// Handler for trust questions: fixed "yes" with `--yes`, otherwise ask on
/// the terminal
fn interaction_handler(yes: bool) -> Box<dyn Handler> {
    if yes {
        Box::new(BatchHandler::new(true))
    } else {
        Box::new(CliHandler::new())
    }
}
