use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Process configuration. Everything a collaborator needs is passed into
/// its constructor from here; the scorers and the combiner take no
/// configuration at all.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_user")]
    pub default_user: String,
    #[serde(default = "default_blacklist_timeout")]
    pub blacklist_timeout_seconds: u64,
    #[serde(default = "default_ai_timeout")]
    pub ai_timeout_seconds: u64,
    #[serde(default)]
    pub history: HistoryConfig,
    #[serde(default)]
    pub blocklist: Option<BlocklistConfig>,
    /// Static token -> username table for attributing history entries.
    #[serde(default)]
    pub auth_tokens: Option<HashMap<String, String>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryConfig {
    pub enabled: bool,
    pub database_path: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BlocklistConfig {
    /// Known-bad domains; entries also cover their subdomains.
    #[serde(default)]
    pub domains: Vec<String>,
    /// Regex patterns matched against the URL host.
    #[serde(default)]
    pub host_patterns: Vec<String>,
    /// Optional file with one domain per line ('#' starts a comment).
    #[serde(default)]
    pub file: Option<String>,
}

fn default_user() -> String {
    "anonymous".to_string()
}

fn default_blacklist_timeout() -> u64 {
    8
}

fn default_ai_timeout() -> u64 {
    10
}

impl Default for HistoryConfig {
    fn default() -> Self {
        HistoryConfig {
            enabled: true,
            database_path: "/var/lib/phishguard/history.db".to_string(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            default_user: default_user(),
            blacklist_timeout_seconds: default_blacklist_timeout(),
            ai_timeout_seconds: default_ai_timeout(),
            history: HistoryConfig::default(),
            blocklist: Some(BlocklistConfig {
                domains: vec![
                    "examplephish.tk".to_string(),
                    "secure-paypal-login.xyz".to_string(),
                ],
                host_patterns: vec![r"^paypal-[a-z0-9-]+\.(com|net)$".to_string()],
                file: None,
            }),
            auth_tokens: None,
        }
    }
}

impl Config {
    pub fn from_file(path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    pub fn to_file(&self, path: &str) -> anyhow::Result<()> {
        let content = serde_yaml::to_string(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}
