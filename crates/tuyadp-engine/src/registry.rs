//! Profile and fingerprint registry.
//!
//! Tables are validated and frozen at load time; every lookup afterwards is
//! a read on immutable data, safe to share across threads behind an `Arc`
//! with no locking. Hot reloads go through [`SharedProfileStore`], which
//! swaps whole snapshots atomically.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::{debug, info, warn};

use crate::profile::{DpConfig, Fingerprint, Profile};

/// Referential integrity failures detected at load time.
///
/// Any of these is fatal: a registry is never built from a broken table, so
/// traffic cannot be processed against one.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProfileLoadError {
    #[error("fingerprint {manufacturer:?} references unknown profile {profile:?}")]
    UnknownProfile {
        manufacturer: String,
        profile: String,
    },

    #[error("duplicate profile name {name:?}")]
    DuplicateProfile { name: String },

    #[error("duplicate fingerprint for manufacturer {manufacturer:?}")]
    DuplicateFingerprint { manufacturer: String },
}

/// Immutable fingerprint and profile tables.
#[derive(Debug, Default)]
pub struct ProfileRegistry {
    profiles: HashMap<String, Arc<Profile>>,
    fingerprints: HashMap<String, String>,
}

impl ProfileRegistry {
    /// Build a registry from its two tables, validating referential
    /// integrity.
    ///
    /// Converter names are deliberately not checked here; they resolve
    /// lazily on first use so a profile may reference converters an
    /// embedding chooses not to register.
    pub fn load(
        fingerprints: Vec<Fingerprint>,
        profiles: Vec<Profile>,
    ) -> Result<Self, ProfileLoadError> {
        let mut profile_table: HashMap<String, Arc<Profile>> = HashMap::new();
        for profile in profiles {
            if profile_table.contains_key(&profile.name) {
                return Err(ProfileLoadError::DuplicateProfile { name: profile.name });
            }
            for capability in profile.dp_mapping.keys() {
                if !profile.has_capability(capability) {
                    warn!(
                        profile = %profile.name,
                        capability = %capability,
                        "dp mapping for undeclared capability is unreachable on the inbound path"
                    );
                }
            }
            profile_table.insert(profile.name.clone(), Arc::new(profile));
        }

        let mut fingerprint_table: HashMap<String, String> = HashMap::new();
        for row in fingerprints {
            if !profile_table.contains_key(&row.profile) {
                return Err(ProfileLoadError::UnknownProfile {
                    manufacturer: row.manufacturer,
                    profile: row.profile,
                });
            }
            if fingerprint_table
                .insert(row.manufacturer.clone(), row.profile)
                .is_some()
            {
                return Err(ProfileLoadError::DuplicateFingerprint {
                    manufacturer: row.manufacturer,
                });
            }
        }

        debug!(
            profiles = profile_table.len(),
            fingerprints = fingerprint_table.len(),
            "profile registry loaded"
        );
        Ok(Self {
            profiles: profile_table,
            fingerprints: fingerprint_table,
        })
    }

    /// Resolve a manufacturer id to its profile. Exact match only;
    /// prefix or wildcard policies belong to the layer above.
    ///
    /// `None` is not an error: the device degrades to unmanaged and its
    /// datapoints pass through unmapped.
    pub fn resolve(&self, manufacturer: &str) -> Option<Arc<Profile>> {
        let name = self.fingerprints.get(manufacturer)?;
        self.profiles.get(name).cloned()
    }

    /// Fetch a profile directly by name.
    pub fn profile(&self, name: &str) -> Option<Arc<Profile>> {
        self.profiles.get(name).cloned()
    }

    /// Wire binding for one of a profile's capabilities.
    pub fn dp_config_for<'a>(&self, profile: &'a Profile, capability: &str) -> Option<&'a DpConfig> {
        profile.dp_config(capability)
    }

    /// Reverse lookup from datapoint id to capability, first declared match
    /// wins.
    pub fn capability_for_datapoint<'a>(
        &self,
        profile: &'a Profile,
        dp: u8,
    ) -> Option<(&'a str, &'a DpConfig)> {
        profile.capability_for_dp(dp)
    }

    pub fn profile_count(&self) -> usize {
        self.profiles.len()
    }

    pub fn fingerprint_count(&self) -> usize {
        self.fingerprints.len()
    }

    /// Profile names in sorted order, for diagnostics.
    pub fn profile_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.profiles.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

/// Atomically swappable registry holder for hot reloads.
///
/// Readers take a cheap snapshot and keep using it even while a new table
/// is installed; no reader ever observes a half-updated registry.
pub struct SharedProfileStore {
    inner: RwLock<Arc<ProfileRegistry>>,
}

impl SharedProfileStore {
    pub fn new(registry: ProfileRegistry) -> Self {
        Self {
            inner: RwLock::new(Arc::new(registry)),
        }
    }

    /// Current registry snapshot.
    pub fn snapshot(&self) -> Arc<ProfileRegistry> {
        Arc::clone(&self.inner.read())
    }

    /// Replace the registry in one step, returning the previous snapshot.
    pub fn install(&self, registry: ProfileRegistry) -> Arc<ProfileRegistry> {
        let next = Arc::new(registry);
        info!(
            profiles = next.profile_count(),
            fingerprints = next.fingerprint_count(),
            "installing profile tables"
        );
        std::mem::replace(&mut *self.inner.write(), next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::DpConfig;
    use tuyadp_core::WireType;

    fn tables() -> (Vec<Fingerprint>, Vec<Profile>) {
        let profiles = vec![
            Profile::new("switch").with_capability("onoff", DpConfig::new(1, WireType::Bool, "boolean")),
            Profile::new("sensor")
                .with_capability("temperature", DpConfig::new(1, WireType::Value, "temperature")),
        ];
        let fingerprints = vec![
            Fingerprint::new("_TZ3000_aaaa", "switch"),
            Fingerprint::new("_TZE200_bbbb", "sensor").with_model("TS0601"),
        ];
        (fingerprints, profiles)
    }

    #[test]
    fn resolves_exact_manufacturer_matches_only() {
        let (fingerprints, profiles) = tables();
        let registry = ProfileRegistry::load(fingerprints, profiles).unwrap();

        let profile = registry.resolve("_TZ3000_aaaa").unwrap();
        assert_eq!(profile.name, "switch");

        assert!(registry.resolve("_TZ3000_aaa").is_none());
        assert!(registry.resolve("_TZ3000_AAAA").is_none());
        assert!(registry.resolve("").is_none());
    }

    #[test]
    fn repeated_resolution_returns_the_same_snapshot() {
        let (fingerprints, profiles) = tables();
        let registry = ProfileRegistry::load(fingerprints, profiles).unwrap();

        let first = registry.resolve("_TZE200_bbbb").unwrap();
        let second = registry.resolve("_TZE200_bbbb").unwrap();
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn load_rejects_dangling_fingerprints() {
        let (mut fingerprints, profiles) = tables();
        fingerprints.push(Fingerprint::new("_TZ3000_cccc", "does_not_exist"));

        let err = ProfileRegistry::load(fingerprints, profiles).unwrap_err();
        assert_eq!(
            err,
            ProfileLoadError::UnknownProfile {
                manufacturer: "_TZ3000_cccc".into(),
                profile: "does_not_exist".into(),
            }
        );
    }

    #[test]
    fn load_rejects_duplicate_rows() {
        let (fingerprints, mut profiles) = tables();
        profiles.push(Profile::new("switch"));
        assert!(matches!(
            ProfileRegistry::load(fingerprints, profiles),
            Err(ProfileLoadError::DuplicateProfile { .. })
        ));

        let (mut fingerprints, profiles) = tables();
        fingerprints.push(Fingerprint::new("_TZ3000_aaaa", "sensor"));
        assert!(matches!(
            ProfileRegistry::load(fingerprints, profiles),
            Err(ProfileLoadError::DuplicateFingerprint { .. })
        ));
    }

    #[test]
    fn unknown_converter_names_are_tolerated_at_load() {
        let profiles = vec![
            Profile::new("exotic")
                .with_capability("thing", DpConfig::new(1, WireType::Value, "not_builtin")),
        ];
        let registry = ProfileRegistry::load(Vec::new(), profiles);
        assert!(registry.is_ok());
    }

    #[test]
    fn shared_store_swaps_whole_snapshots() {
        let (fingerprints, profiles) = tables();
        let store = SharedProfileStore::new(ProfileRegistry::load(fingerprints, profiles).unwrap());

        let before = store.snapshot();
        assert!(before.resolve("_TZ3000_aaaa").is_some());

        let replacement = ProfileRegistry::load(
            vec![Fingerprint::new("_TZ3000_zzzz", "lone")],
            vec![Profile::new("lone").with_capability("onoff", DpConfig::new(1, WireType::Bool, "boolean"))],
        )
        .unwrap();
        let previous = store.install(replacement);

        // The old snapshot stays valid for holders; new reads see the swap.
        assert!(Arc::ptr_eq(&before, &previous));
        assert!(before.resolve("_TZ3000_aaaa").is_some());
        assert!(store.snapshot().resolve("_TZ3000_aaaa").is_none());
        assert!(store.snapshot().resolve("_TZ3000_zzzz").is_some());
    }
}
