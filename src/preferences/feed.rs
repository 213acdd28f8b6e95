// src/preferences/feed.rs

//! Per-feed preferences: when the feed was last checked and per-implementation
//! stability overrides

use super::{load_toml, load_toml_safe, save_toml};
use crate::error::Result;
use crate::model::{FeedUri, Stability};
use crate::paths::Locations;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// User override for a single implementation
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct ImplementationPreferences {
    pub id: String,

    /// Replaces the stability declared in the feed unless unset
    #[serde(default, skip_serializing_if = "Stability::is_unset")]
    pub user_stability: Stability,
}

impl ImplementationPreferences {
    /// True when the record changes nothing
    pub fn is_superfluous(&self) -> bool {
        self.user_stability.is_unset()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct FeedPreferences {
    /// Last successful download of the feed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_checked: Option<DateTime<Utc>>,

    #[serde(default, rename = "implementation", skip_serializing_if = "Vec::is_empty")]
    pub implementations: Vec<ImplementationPreferences>,
}

impl FeedPreferences {
    /// Preferences of an implementation, created when absent
    pub fn get_or_create_implementation(&mut self, id: &str) -> &mut ImplementationPreferences {
        let index = match self.implementations.iter().position(|i| i.id == id) {
            Some(index) => index,
            None => {
                self.implementations.push(ImplementationPreferences {
                    id: id.to_string(),
                    ..Default::default()
                });
                self.implementations.len() - 1
            }
        };
        &mut self.implementations[index]
    }

    pub fn get_implementation(&self, id: &str) -> Option<&ImplementationPreferences> {
        self.implementations.iter().find(|i| i.id == id)
    }

    /// Stability override for an implementation, `Unset` when none
    pub fn user_stability(&self, id: &str) -> Stability {
        self.get_implementation(id)
            .map(|i| i.user_stability)
            .unwrap_or_default()
    }

    /// Drop records that change nothing
    pub fn normalize(&mut self) {
        self.implementations.retain(|i| !i.is_superfluous());
    }

    pub fn load_for(locations: &Locations, feed: &FeedUri) -> Result<Self> {
        load_toml(&locations.feed_preferences_dir().join(feed.escape()))
    }

    pub fn load_for_safe(locations: &Locations, feed: &FeedUri) -> Self {
        load_toml_safe(
            &locations.feed_preferences_dir().join(feed.escape()),
            "feed",
            feed.as_str(),
        )
    }

    /// Normalize, then write back
    pub fn save_for(&mut self, locations: &Locations, feed: &FeedUri) -> Result<()> {
        self.normalize();
        save_toml(&locations.feed_preferences_dir().join(feed.escape()), self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn feed() -> FeedUri {
        FeedUri::parse("http://example.com/app.json").unwrap()
    }

    #[test]
    fn test_get_or_create() {
        let mut prefs = FeedPreferences::default();
        prefs.get_or_create_implementation("sha1=abc").user_stability = Stability::Buggy;
        prefs.get_or_create_implementation("sha1=abc");
        assert_eq!(prefs.implementations.len(), 1);
        assert_eq!(prefs.user_stability("sha1=abc"), Stability::Buggy);
        assert_eq!(prefs.user_stability("sha1=other"), Stability::Unset);
    }

    #[test]
    fn test_save_normalizes_and_round_trips() {
        let temp = TempDir::new().unwrap();
        let locations = Locations::new(temp.path());

        let mut prefs = FeedPreferences {
            last_checked: Some(Utc::now()),
            ..Default::default()
        };
        prefs.get_or_create_implementation("sha1=keep").user_stability = Stability::Preferred;
        prefs.get_or_create_implementation("sha1=drop");
        prefs.save_for(&locations, &feed()).unwrap();
        assert_eq!(prefs.implementations.len(), 1);

        let loaded = FeedPreferences::load_for(&locations, &feed()).unwrap();
        assert_eq!(loaded, prefs);
    }

    #[test]
    fn test_missing_and_corrupt() {
        let temp = TempDir::new().unwrap();
        let locations = Locations::new(temp.path());
        assert_eq!(
            FeedPreferences::load_for(&locations, &feed()).unwrap(),
            FeedPreferences::default()
        );

        let path = locations.feed_preferences_dir().join(feed().escape());
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, "last_checked = [broken").unwrap();
        assert!(FeedPreferences::load_for(&locations, &feed()).is_err());
        assert_eq!(
            FeedPreferences::load_for_safe(&locations, &feed()),
            FeedPreferences::default()
        );
    }

    #[test]
    fn test_equality_is_order_sensitive() {
        let mut first = FeedPreferences::default();
        first.get_or_create_implementation("a").user_stability = Stability::Stable;
        first.get_or_create_implementation("b").user_stability = Stability::Buggy;

        let mut second = FeedPreferences::default();
        second.get_or_create_implementation("b").user_stability = Stability::Buggy;
        second.get_or_create_implementation("a").user_stability = Stability::Stable;

        assert_ne!(first, second);
    }
}
