//! Configuration loading.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use kjappe_core::evaluator::{EvaluatorConfig, DEFAULT_THRESHOLD};
use kjappe_core::share::DEFAULT_SHARE_URL;
use kjappe_core::statistics::DEFAULT_QUESTIONS_PER_QUIZ;

use crate::api::ApiClient;

/// Where the quiz server lives.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerConfig {
    pub base_url: String,
}

/// Top-level kjappe configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KjappeConfig {
    /// Directory of `YYYYMMDD.json` question files.
    #[serde(default = "default_questions_dir")]
    pub questions_dir: PathBuf,
    /// File backing the local answer store.
    #[serde(default = "default_store_path")]
    pub store_path: PathBuf,
    /// Quiz server. Without one, play is local only.
    #[serde(default)]
    pub server: Option<ServerConfig>,
    /// Address printed in share text.
    #[serde(default = "default_share_url")]
    pub share_url: String,
    /// Maximum edit distance accepted as a correct answer.
    #[serde(default = "default_fuzzy_threshold")]
    pub fuzzy_threshold: usize,
    #[serde(default = "default_questions_per_quiz")]
    pub questions_per_quiz: usize,
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

fn default_questions_dir() -> PathBuf {
    PathBuf::from("./questions")
}
fn default_store_path() -> PathBuf {
    PathBuf::from("./kjappe-store.json")
}
fn default_share_url() -> String {
    DEFAULT_SHARE_URL.to_string()
}
fn default_fuzzy_threshold() -> usize {
    DEFAULT_THRESHOLD
}
fn default_questions_per_quiz() -> usize {
    DEFAULT_QUESTIONS_PER_QUIZ
}
fn default_request_timeout() -> u64 {
    30
}

impl Default for KjappeConfig {
    fn default() -> Self {
        Self {
            questions_dir: default_questions_dir(),
            store_path: default_store_path(),
            server: None,
            share_url: default_share_url(),
            fuzzy_threshold: default_fuzzy_threshold(),
            questions_per_quiz: default_questions_per_quiz(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}

impl KjappeConfig {
    pub fn evaluator_config(&self) -> EvaluatorConfig {
        EvaluatorConfig {
            threshold: self.fuzzy_threshold,
        }
    }

    /// An API client for the configured server, if any.
    pub fn api_client(&self) -> Result<Option<ApiClient>> {
        match &self.server {
            Some(server) => Ok(Some(ApiClient::new(
                &server.base_url,
                self.request_timeout_secs,
            )?)),
            None => Ok(None),
        }
    }

    /// Apply `KJAPPE_*` overrides looked up through `var`.
    fn apply_overrides(&mut self, var: impl Fn(&str) -> Option<String>) -> Result<()> {
        if let Some(url) = var("KJAPPE_SERVER_URL") {
            if url.trim().is_empty() {
                self.server = None;
            } else {
                self.server = Some(ServerConfig { base_url: url });
            }
        }

        if let Some(threshold) = var("KJAPPE_FUZZY_THRESHOLD") {
            self.fuzzy_threshold = threshold
                .trim()
                .parse()
                .with_context(|| format!("invalid KJAPPE_FUZZY_THRESHOLD: {threshold:?}"))?;
        }

        Ok(())
    }

    fn resolve_env(&mut self) {
        self.questions_dir = PathBuf::from(resolve_env_vars(&self.questions_dir.to_string_lossy()));
        self.store_path = PathBuf::from(resolve_env_vars(&self.store_path.to_string_lossy()));
        self.share_url = resolve_env_vars(&self.share_url);
        if let Some(server) = &mut self.server {
            server.base_url = resolve_env_vars(&server.base_url);
        }
    }
}

/// Resolve environment variable references like `${VAR_NAME}` in a string.
///
/// Substituted values are not scanned again.
pub fn resolve_env_vars(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    let mut rest = s;
    while let Some(start) = rest.find("${") {
        let Some(end) = rest[start..].find('}') else {
            break;
        };
        let var_name = &rest[start + 2..start + end];
        result.push_str(&rest[..start]);
        result.push_str(&std::env::var(var_name).unwrap_or_default());
        rest = &rest[start + end + 1..];
    }
    result.push_str(rest);
    result
}

/// Load configuration from well-known paths.
///
/// Search order:
/// 1. `kjappe.toml` in the current directory
/// 2. `~/.config/kjappe/config.toml`
///
/// Environment variable overrides: `KJAPPE_SERVER_URL`, `KJAPPE_FUZZY_THRESHOLD`.
pub fn load_config() -> Result<KjappeConfig> {
    load_config_from(None)
}

/// Load config from an explicit path, or search the default locations.
pub fn load_config_from(path: Option<&Path>) -> Result<KjappeConfig> {
    let config_path = if let Some(p) = path {
        if p.exists() {
            Some(p.to_path_buf())
        } else {
            anyhow::bail!("config file not found: {}", p.display());
        }
    } else {
        let local = PathBuf::from("kjappe.toml");
        if local.exists() {
            Some(local)
        } else {
            dirs_path()
                .map(|home| home.join("config.toml"))
                .filter(|global| global.exists())
        }
    };

    let mut config = match config_path {
        Some(path) => {
            tracing::debug!("loading config from {}", path.display());
            parse_config(&path)?
        }
        None => KjappeConfig::default(),
    };

    config.apply_overrides(|name| std::env::var(name).ok())?;
    config.resolve_env();
    Ok(config)
}

fn parse_config(path: &Path) -> Result<KjappeConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config: {}", path.display()))?;
    toml::from_str(&content).with_context(|| format!("failed to parse config: {}", path.display()))
}

fn dirs_path() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(|h| PathBuf::from(h).join(".config").join("kjappe"))
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    #[test]
    fn resolve_env_vars_basic() {
        std::env::set_var("_KJAPPE_TEST_VAR", "hello");
        assert_eq!(resolve_env_vars("${_KJAPPE_TEST_VAR}"), "hello");
        assert_eq!(
            resolve_env_vars("prefix_${_KJAPPE_TEST_VAR}_suffix"),
            "prefix_hello_suffix"
        );
        assert_eq!(resolve_env_vars("${_KJAPPE_UNSET_VAR}/x"), "/x");
        assert_eq!(resolve_env_vars("${unterminated"), "${unterminated");
        std::env::remove_var("_KJAPPE_TEST_VAR");
    }

    #[test]
    fn resolve_env_vars_does_not_expand_values() {
        std::env::set_var("_KJAPPE_SELF_VAR", "${_KJAPPE_SELF_VAR}");
        assert_eq!(
            resolve_env_vars("${_KJAPPE_SELF_VAR}/store.json"),
            "${_KJAPPE_SELF_VAR}/store.json"
        );
        std::env::remove_var("_KJAPPE_SELF_VAR");
    }

    #[test]
    fn default_config() {
        let config = KjappeConfig::default();
        assert_eq!(config.fuzzy_threshold, 2);
        assert_eq!(config.questions_per_quiz, 5);
        assert_eq!(config.share_url, "https://www.femkjappe.no");
        assert!(config.server.is_none());
        assert_eq!(config.evaluator_config().threshold, 2);
    }

    #[test]
    fn parse_partial_config() {
        let config: KjappeConfig = toml::from_str(
            r#"
questions_dir = "/srv/quiz"
fuzzy_threshold = 1

[server]
base_url = "https://quiz.example"
"#,
        )
        .unwrap();
        assert_eq!(config.questions_dir, PathBuf::from("/srv/quiz"));
        assert_eq!(config.fuzzy_threshold, 1);
        assert_eq!(config.server.unwrap().base_url, "https://quiz.example");
        assert_eq!(config.request_timeout_secs, 30);
    }

    #[test]
    fn env_overrides() {
        let vars: HashMap<&str, &str> = [
            ("KJAPPE_SERVER_URL", "http://localhost:3000"),
            ("KJAPPE_FUZZY_THRESHOLD", " 3 "),
        ]
        .into_iter()
        .collect();

        let mut config = KjappeConfig::default();
        config
            .apply_overrides(|name| vars.get(name).map(|v| v.to_string()))
            .unwrap();
        assert_eq!(config.server.unwrap().base_url, "http://localhost:3000");
        assert_eq!(config.fuzzy_threshold, 3);
    }

    #[test]
    fn bad_threshold_override_is_an_error() {
        let mut config = KjappeConfig::default();
        let err = config
            .apply_overrides(|name| (name == "KJAPPE_FUZZY_THRESHOLD").then(|| "two".to_string()))
            .unwrap_err();
        assert!(err.to_string().contains("KJAPPE_FUZZY_THRESHOLD"));
    }

    #[test]
    fn load_explicit_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("kjappe.toml");
        std::fs::write(&path, "share_url = \"https://quiz.example\"\n").unwrap();

        let config = load_config_from(Some(&path)).unwrap();
        assert_eq!(config.share_url, "https://quiz.example");
    }

    #[test]
    fn missing_explicit_path_is_an_error() {
        let err = load_config_from(Some(Path::new("/nope/kjappe.toml"))).unwrap_err();
        assert!(err.to_string().contains("config file not found"));
    }

    #[test]
    fn malformed_config_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("kjappe.toml");
        std::fs::write(&path, "fuzzy_threshold = \"many\"").unwrap();

        let err = load_config_from(Some(&path)).unwrap_err();
        assert!(format!("{err:#}").contains("failed to parse config"));
    }
}
