//! Immutable realm registry built once at startup.

use std::path::Path;

use crate::config::{self, ConfigError, Realm};

/// Validated realm entries, keyed by name, document order preserved for
/// display. Duplicate names are last-write-wins: the later entry replaces the
/// earlier record in place.
///
/// Built once from the config document; never mutated afterwards.
pub struct RealmRegistry {
    realms: Vec<Realm>,
}

impl RealmRegistry {
    pub fn new(entries: Vec<Realm>) -> Self {
        let mut realms: Vec<Realm> = Vec::with_capacity(entries.len());

        for entry in entries {
            if let Some(existing) = realms.iter_mut().find(|r| r.name == entry.name) {
                *existing = entry;
            } else {
                realms.push(entry);
            }
        }

        Self { realms }
    }

    /// Load and validate the config document at `path`.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        Ok(Self::new(config::load_cfg(path)?))
    }

    /// Case-sensitive lookup by realm name.
    pub fn get(&self, name: &str) -> Option<&Realm> {
        self.realms.iter().find(|r| r.name == name)
    }

    /// Realm names in display order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.realms.iter().map(|r| r.name.as_str())
    }

    pub fn len(&self) -> usize {
        self.realms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.realms.is_empty()
    }
}
