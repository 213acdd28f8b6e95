// src/preferences/interface.rs

//! Per-interface preferences

use super::{load_toml, load_toml_safe, save_toml};
use crate::error::Result;
use crate::model::{FeedReference, FeedUri, Stability};
use crate::paths::Locations;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct InterfacePreferences {
    /// Implementations at this stability or better are preferred; unset
    /// defers to the global policy
    #[serde(default, skip_serializing_if = "Stability::is_unset")]
    pub stability_policy: Stability,

    /// Additional feeds providing implementations of the interface
    #[serde(default, rename = "feed", skip_serializing_if = "Vec::is_empty")]
    pub feeds: Vec<FeedReference>,
}

impl InterfacePreferences {
    /// Register an extra feed; returns false if it was already listed
    pub fn add_feed(&mut self, feed: FeedReference) -> bool {
        if self.feeds.iter().any(|f| f.src == feed.src) {
            return false;
        }
        self.feeds.push(feed);
        true
    }

    pub fn remove_feed(&mut self, src: &str) -> bool {
        let before = self.feeds.len();
        self.feeds.retain(|f| f.src != src);
        self.feeds.len() != before
    }

    /// Drop duplicate feed references
    pub fn normalize(&mut self) {
        let mut seen = std::collections::HashSet::new();
        self.feeds.retain(|f| seen.insert(f.src.clone()));
    }

    pub fn load_for(locations: &Locations, interface: &FeedUri) -> Result<Self> {
        load_toml(&locations.interface_preferences_dir().join(interface.escape()))
    }

    pub fn load_for_safe(locations: &Locations, interface: &FeedUri) -> Self {
        load_toml_safe(
            &locations.interface_preferences_dir().join(interface.escape()),
            "interface",
            interface.as_str(),
        )
    }

    pub fn save_for(&mut self, locations: &Locations, interface: &FeedUri) -> Result<()> {
        self.normalize();
        save_toml(&locations.interface_preferences_dir().join(interface.escape()), self)
    }
}
