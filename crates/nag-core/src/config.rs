//! Typed run configuration, loaded once at startup and passed by reference.

use crate::error::ConfigError;
use crate::identity::{AliasTable, Identity};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub options: Options,
    #[serde(default)]
    pub github: GithubConfig,
    /// Repository label -> `owner/repo` slug.
    #[serde(default)]
    pub repositories: BTreeMap<String, String>,
    /// Recipient identity -> email address.
    #[serde(default)]
    pub recipients: BTreeMap<String, String>,
    #[serde(default)]
    pub aliases: AliasTable,
    #[serde(default)]
    pub tracker: TrackerConfig,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Options {
    #[serde(default)]
    pub verbose: bool,
    /// When non-empty, restrict processing to these pull numbers. Debugging
    /// aid; normal runs leave it unset.
    #[serde(default)]
    pub pulls: Vec<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GithubConfig {
    #[serde(default = "default_api_base")]
    pub api_base: String,
    /// Bearer token. Falls back to `GITHUB_TOKEN` at the call site when
    /// unset; anonymous access works at a reduced rate limit.
    #[serde(default)]
    pub token: Option<String>,
}

impl Default for GithubConfig {
    fn default() -> Self {
        Self {
            api_base: default_api_base(),
            token: None,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TrackerConfig {
    /// Issue browse URL prefix, e.g. `https://track.example.com/browse/`.
    #[serde(default)]
    pub browse_url: String,
    /// Tracker project keys whose issue keys appear in pull titles.
    #[serde(default)]
    pub projects: Vec<String>,
}

impl Config {
    /// Check the sections a run cannot proceed without.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.repositories.is_empty() {
            return Err(ConfigError::NoRepositories);
        }
        if self.recipients.is_empty() {
            return Err(ConfigError::NoRecipients);
        }
        Ok(())
    }

    /// Configured recipients in table order.
    #[must_use]
    pub fn recipient_identities(&self) -> Vec<Identity> {
        self.recipients.keys().map(Identity::new).collect()
    }

    /// Email for a recipient identity, if configured.
    #[must_use]
    pub fn recipient_email(&self, identity: &Identity) -> Option<&str> {
        self.recipients.get(identity.as_str()).map(String::as_str)
    }
}

/// Load the config at `path`. Missing file and bad syntax are fatal here;
/// commands call [`Config::validate`] for the sections they require, since
/// a tracker-only config is enough for link checking.
pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    let config: Config = toml::from_str(&content)
        .with_context(|| format!("Failed to parse {}", path.display()))?;

    Ok(config)
}

/// Resolve which config file to use: an explicit `--config` path wins, then
/// `./nag.toml`, then the user config directory.
pub fn resolve_config_path(flag: Option<&Path>) -> Result<PathBuf, ConfigError> {
    if let Some(path) = flag {
        return Ok(path.to_path_buf());
    }

    let mut searched = Vec::new();

    let local = PathBuf::from("nag.toml");
    if local.exists() {
        return Ok(local);
    }
    searched.push(local);

    if let Some(config_dir) = dirs::config_dir() {
        let user = config_dir.join("nag/config.toml");
        if user.exists() {
            return Ok(user);
        }
        searched.push(user);
    }

    Err(ConfigError::NotFound { searched })
}

fn default_api_base() -> String {
    "https://api.github.com".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    const FULL: &str = r#"
[options]
verbose = true
pulls = [4211, 4300]

[github]
api_base = "https://github.example/api/v3"
token = "ghp_test"

[repositories]
platform = "hpcc-systems/HPCC-Platform"
eclide = "hpcc-systems/eclide"

[recipients]
alice = "alice@example.com"
bob = "bob@example.com"

[aliases]
bob-hpcc = "bob"

[tracker]
browse_url = "https://track.example.com/browse/"
projects = ["HPCC", "HH", "IDE"]
"#;

    #[test]
    fn full_config_parses() {
        let config: Config = toml::from_str(FULL).expect("parse");
        assert!(config.options.verbose);
        assert_eq!(config.options.pulls, vec![4211, 4300]);
        assert_eq!(config.github.api_base, "https://github.example/api/v3");
        assert_eq!(config.github.token.as_deref(), Some("ghp_test"));
        assert_eq!(
            config.repositories.get("platform").map(String::as_str),
            Some("hpcc-systems/HPCC-Platform")
        );
        assert_eq!(config.aliases.canonical("bob-hpcc"), Identity::new("bob"));
        assert_eq!(config.tracker.projects, vec!["HPCC", "HH", "IDE"]);
        config.validate().expect("valid");
    }

    #[test]
    fn minimal_config_fills_defaults() {
        let config: Config = toml::from_str(
            r#"
[repositories]
platform = "org/repo"

[recipients]
alice = "alice@example.com"
"#,
        )
        .expect("parse");

        assert!(!config.options.verbose);
        assert!(config.options.pulls.is_empty());
        assert_eq!(config.github.api_base, "https://api.github.com");
        assert_eq!(config.github.token, None);
        assert!(config.aliases.is_empty());
        assert!(config.tracker.projects.is_empty());
        config.validate().expect("valid");
    }

    #[test]
    fn empty_repositories_fails_validation() {
        let config: Config = toml::from_str("[recipients]\nalice = \"a@example.com\"")
            .expect("parse");
        assert!(matches!(
            config.validate(),
            Err(ConfigError::NoRepositories)
        ));
    }

    #[test]
    fn empty_recipients_fails_validation() {
        let config: Config = toml::from_str("[repositories]\nplatform = \"org/repo\"")
            .expect("parse");
        assert!(matches!(config.validate(), Err(ConfigError::NoRecipients)));
    }

    #[test]
    fn load_rejects_missing_file() {
        let dir = tempfile::tempdir().expect("temp dir");
        let result = load_config(&dir.path().join("nag.toml"));
        assert!(result.is_err());
    }

    #[test]
    fn load_rejects_bad_syntax() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("nag.toml");
        std::fs::write(&path, "[repositories\nbroken").expect("write");

        let err = load_config(&path).unwrap_err();
        assert!(err.to_string().contains("Failed to parse"));
    }

    #[test]
    fn load_accepts_incomplete_sections() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("nag.toml");
        std::fs::write(&path, "[repositories]\nplatform = \"org/repo\"").expect("write");

        let config = load_config(&path).expect("parse succeeds");
        assert!(matches!(config.validate(), Err(ConfigError::NoRecipients)));
    }

    #[test]
    fn explicit_flag_wins_even_if_absent() {
        let path = resolve_config_path(Some(Path::new("/tmp/custom-nag.toml")))
            .expect("flag path is taken as-is");
        assert_eq!(path, PathBuf::from("/tmp/custom-nag.toml"));
    }

    #[test]
    fn recipient_lookup() {
        let config: Config = toml::from_str(FULL).expect("parse");
        assert_eq!(
            config.recipient_email(&Identity::new("alice")),
            Some("alice@example.com")
        );
        assert_eq!(config.recipient_email(&Identity::new("zed")), None);
        assert_eq!(
            config.recipient_identities(),
            vec![Identity::new("alice"), Identity::new("bob")]
        );
    }
}
