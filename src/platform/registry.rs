//! Global profile registry for looking up device profiles.

use std::collections::HashMap;
use std::sync::RwLock;

use once_cell::sync::Lazy;

use super::DeviceProfile;
use super::profiles;

/// Global profile registry.
static REGISTRY: Lazy<RwLock<ProfileRegistry>> = Lazy::new(|| {
    let mut registry = ProfileRegistry::new();
    registry.register_builtin_profiles();
    RwLock::new(registry)
});

/// Registry of device profiles keyed on device type.
#[derive(Debug, Default)]
pub struct ProfileRegistry {
    profiles: HashMap<String, DeviceProfile>,
}

impl ProfileRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self {
            profiles: HashMap::new(),
        }
    }

    /// Get the global registry.
    pub fn global() -> &'static RwLock<ProfileRegistry> {
        &REGISTRY
    }

    /// Look up a profile in the global registry, falling back to the
    /// generic profile for unknown device types.
    pub fn resolve(device_type: &str) -> DeviceProfile {
        let registry = REGISTRY.read().expect("registry lock poisoned");
        registry
            .get(device_type)
            .cloned()
            .unwrap_or_else(profiles::generic)
    }

    /// Register built-in profiles.
    fn register_builtin_profiles(&mut self) {
        self.register(profiles::generic());
        self.register(profiles::cisco_xr());
    }

    /// Register a profile, replacing any existing one for the same type.
    pub fn register(&mut self, profile: DeviceProfile) {
        self.profiles.insert(profile.device_type.clone(), profile);
    }

    /// Get a profile by device type.
    pub fn get(&self, device_type: &str) -> Option<&DeviceProfile> {
        self.profiles.get(device_type)
    }

    /// Check if a device type is registered.
    pub fn contains(&self, device_type: &str) -> bool {
        self.profiles.contains_key(device_type)
    }

    /// List all registered device types.
    pub fn device_types(&self) -> impl Iterator<Item = &String> {
        self.profiles.keys()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_builtin_profiles() {
        let profile = ProfileRegistry::resolve("cisco_xr");
        assert_eq!(profile.device_type, "cisco_xr");
        assert!(!profile.banner_rules.is_empty());
    }

    #[test]
    fn unknown_device_type_falls_back_to_generic() {
        let profile = ProfileRegistry::resolve("no_such_platform");
        assert_eq!(profile.device_type, "generic");
        assert!(profile.banner_rules.is_empty());
    }

    #[test]
    fn custom_profiles_can_be_registered() {
        let mut registry = ProfileRegistry::new();
        registry.register(DeviceProfile::new("lab_switch"));
        assert!(registry.contains("lab_switch"));
        assert!(registry.get("missing").is_none());
    }
}
