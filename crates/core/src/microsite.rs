//! Microsite (tenant) credentials for the Travel Compositor API.

use std::fmt;

use serde::Serialize;

use crate::constants::MAX_MICROSITE_CONFIGS;

/// One tenant configuration: its own credentials and booking namespace.
#[derive(Clone, PartialEq, Eq)]
pub struct MicrositeConfig {
    /// Label used in logs and reports (`primary`, `config-2`, ...).
    pub name: String,
    pub microsite_id: String,
    pub username: String,
    pub password: String,
}

impl fmt::Debug for MicrositeConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MicrositeConfig")
            .field("name", &self.name)
            .field("microsite_id", &self.microsite_id)
            .field("username", &self.username)
            .field("password", &"***")
            .finish()
    }
}

/// Credential-free view of a microsite for API responses.
#[derive(Debug, Clone, Serialize)]
pub struct MicrositeSummary {
    pub name: String,
    pub microsite_id: String,
}

impl From<&MicrositeConfig> for MicrositeSummary {
    fn from(config: &MicrositeConfig) -> Self {
        Self { name: config.name.clone(), microsite_id: config.microsite_id.clone() }
    }
}

impl MicrositeConfig {
    #[must_use]
    pub fn new(name: &str, microsite_id: &str, username: &str, password: &str) -> Self {
        Self {
            name: name.to_owned(),
            microsite_id: microsite_id.to_owned(),
            username: username.to_owned(),
            password: password.to_owned(),
        }
    }

    /// Read every credential set from the process environment.
    ///
    /// Sets are `TRAVEL_COMPOSITOR_{USERNAME,PASSWORD,MICROSITE_ID}` followed
    /// by the same names suffixed `_2`, `_3` and `_4`.
    #[must_use]
    pub fn load_all_from_env() -> Vec<Self> {
        Self::load_all_with(crate::env_config::env_non_empty)
    }

    /// Same as [`Self::load_all_from_env`] with an injectable lookup.
    pub fn load_all_with(lookup: impl Fn(&str) -> Option<String>) -> Vec<Self> {
        let mut configs: Vec<Self> = Vec::new();
        for index in 1..=MAX_MICROSITE_CONFIGS {
            let suffix = if index == 1 { String::new() } else { format!("_{index}") };
            let name = if index == 1 { "primary".to_owned() } else { format!("config-{index}") };
            let username = lookup(&format!("TRAVEL_COMPOSITOR_USERNAME{suffix}"));
            let password = lookup(&format!("TRAVEL_COMPOSITOR_PASSWORD{suffix}"));
            let microsite_id = lookup(&format!("TRAVEL_COMPOSITOR_MICROSITE_ID{suffix}"));

            match (username, password, microsite_id) {
                (Some(username), Some(password), Some(microsite_id)) => {
                    if configs.iter().any(|c| c.microsite_id == microsite_id) {
                        tracing::warn!(
                            config = %name,
                            microsite_id = %microsite_id,
                            "duplicate microsite id, skipping credential set"
                        );
                        continue;
                    }
                    configs.push(Self { name, microsite_id, username, password });
                },
                (None, None, None) => {},
                _ => {
                    tracing::warn!(config = %name, "incomplete Travel Compositor credentials, skipping");
                },
            }
        }
        configs
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> =
            pairs.iter().map(|(k, v)| ((*k).to_owned(), (*v).to_owned())).collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_loads_primary_and_suffixed_sets() {
        let configs = MicrositeConfig::load_all_with(lookup_from(&[
            ("TRAVEL_COMPOSITOR_USERNAME", "agent"),
            ("TRAVEL_COMPOSITOR_PASSWORD", "secret"),
            ("TRAVEL_COMPOSITOR_MICROSITE_ID", "siteone"),
            ("TRAVEL_COMPOSITOR_USERNAME_3", "agent3"),
            ("TRAVEL_COMPOSITOR_PASSWORD_3", "secret3"),
            ("TRAVEL_COMPOSITOR_MICROSITE_ID_3", "sitethree"),
        ]));
        assert_eq!(configs.len(), 2);
        assert_eq!(configs[0].name, "primary");
        assert_eq!(configs[1].name, "config-3");
        assert_eq!(configs[1].microsite_id, "sitethree");
    }

    #[test]
    fn test_skips_incomplete_and_duplicate_sets() {
        let configs = MicrositeConfig::load_all_with(lookup_from(&[
            ("TRAVEL_COMPOSITOR_USERNAME", "agent"),
            ("TRAVEL_COMPOSITOR_PASSWORD", "secret"),
            ("TRAVEL_COMPOSITOR_MICROSITE_ID", "siteone"),
            ("TRAVEL_COMPOSITOR_USERNAME_2", "agent2"),
            ("TRAVEL_COMPOSITOR_MICROSITE_ID_2", "sitetwo"),
            ("TRAVEL_COMPOSITOR_USERNAME_4", "agent4"),
            ("TRAVEL_COMPOSITOR_PASSWORD_4", "secret4"),
            ("TRAVEL_COMPOSITOR_MICROSITE_ID_4", "siteone"),
        ]));
        assert_eq!(configs.len(), 1);
        assert_eq!(configs[0].username, "agent");
    }

    #[test]
    fn test_debug_masks_password() {
        let config = MicrositeConfig::new("primary", "site", "user", "hunter2");
        let printed = format!("{config:?}");
        assert!(!printed.contains("hunter2"));
        assert!(printed.contains("***"));
    }
}
