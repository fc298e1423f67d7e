//! Engine configuration.

use crate::error::{Result, StagehandError};
use crate::permission::GlobalSwitches;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// What the engine renders when a transition is denied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum DenialPolicy {
    /// Render the denial reason as a notice while keeping the current
    /// screen's keyboard available.
    #[default]
    Notice,
    /// Re-render the current screen unchanged.
    Redisplay,
}

/// Static engine configuration, loadable from TOML.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Idle TTL for persisted sessions, in seconds.
    #[serde(default = "default_session_ttl_secs")]
    pub session_ttl_secs: u64,
    /// Namespace prefix for persisted session keys.
    #[serde(default = "default_key_namespace")]
    pub key_namespace: String,
    /// The stage new users start in.
    #[serde(default = "default_stage")]
    pub default_stage: String,
    #[serde(default)]
    pub denial_policy: DenialPolicy,
    /// Notice shown when an action references an unknown transition.
    #[serde(default = "default_unknown_transition_notice")]
    pub unknown_transition_notice: String,
    /// Initial state of the global switches.
    #[serde(default)]
    pub switches: GlobalSwitches,
}

fn default_session_ttl_secs() -> u64 {
    86_400
}

fn default_key_namespace() -> String {
    "stagehand".to_string()
}

fn default_stage() -> String {
    "default".to_string()
}

fn default_unknown_transition_notice() -> String {
    "That action is no longer available.".to_string()
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            session_ttl_secs: default_session_ttl_secs(),
            key_namespace: default_key_namespace(),
            default_stage: default_stage(),
            denial_policy: DenialPolicy::default(),
            unknown_transition_notice: default_unknown_transition_notice(),
            switches: GlobalSwitches::default(),
        }
    }
}

impl EngineConfig {
    /// Parses a configuration from a TOML document.
    pub fn from_toml_str(raw: &str) -> Result<Self> {
        toml::from_str(raw).map_err(|e| StagehandError::config(e.to_string()))
    }

    pub fn session_ttl(&self) -> Duration {
        Duration::from_secs(self.session_ttl_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_apply_to_empty_document() {
        let config = EngineConfig::from_toml_str("").unwrap();
        assert_eq!(config.session_ttl(), Duration::from_secs(86_400));
        assert_eq!(config.key_namespace, "stagehand");
        assert_eq!(config.denial_policy, DenialPolicy::Notice);
        assert!(!config.switches.maintenance);
    }

    #[test]
    fn overrides_parse() {
        let raw = r#"
            session_ttl_secs = 600
            denial_policy = "redisplay"

            [switches]
            maintenance = true
        "#;
        let config = EngineConfig::from_toml_str(raw).unwrap();
        assert_eq!(config.session_ttl_secs, 600);
        assert_eq!(config.denial_policy, DenialPolicy::Redisplay);
        assert!(config.switches.maintenance);
    }
}
