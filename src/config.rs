//! Provider configuration loading.
//!
//! Providers are declared in a YAML file; API keys can be inlined or
//! resolved from environment variables at load time.

use std::io::ErrorKind;
use std::path::Path;

use serde::Deserialize;
use thiserror::Error;
use tokio::fs;

// ============================================================================
// Config (root)
// ============================================================================

#[derive(Debug, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub providers: Vec<ProviderEntry>,
}

impl Config {
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = match fs::read_to_string(path).await {
            Ok(c) => c,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Self::default()),
            Err(e) => return Err(ConfigError::Io(e)),
        };
        Ok(serde_saphyr::from_str(&contents)?)
    }
}

// ============================================================================
// ProviderEntry
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct ProviderEntry {
    pub name: String,
    #[serde(default)]
    pub base_url: Option<String>,
    #[serde(default)]
    pub api_key: Option<String>,
    /// Environment variable to read the API key from when `api_key` is unset.
    #[serde(default)]
    pub api_key_env: Option<String>,
    #[serde(default)]
    pub models: Vec<String>,
}

impl ProviderEntry {
    /// Resolve the credential, preferring the inline key over the environment.
    pub fn resolve_api_key(&self) -> Option<String> {
        if let Some(key) = &self.api_key
            && !key.is_empty()
        {
            return Some(key.clone());
        }
        self.api_key_env
            .as_ref()
            .and_then(|var| std::env::var(var).ok())
            .filter(|key| !key.is_empty())
    }
}

// ============================================================================
// ConfigError
// ============================================================================

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config file: {0}")]
    Yaml(#[from] serde_saphyr::Error),
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[tokio::test]
    async fn test_missing_file_yields_default() {
        let config = Config::load("/nonexistent/multichat.yaml").await.unwrap();
        assert!(config.providers.is_empty());
    }

    #[tokio::test]
    async fn test_load_providers_from_yaml() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
providers:
  - name: openai
    base_url: https://api.openai.com/v1
    api_key: sk-test
    models:
      - gpt-4o
      - gpt-4o-mini
  - name: ollama
    base_url: http://localhost:11434/v1
    api_key: ollama
    models:
      - llama3
"#
        )
        .unwrap();

        let config = Config::load(file.path()).await.unwrap();
        assert_eq!(config.providers.len(), 2);
        assert_eq!(config.providers[0].name, "openai");
        assert_eq!(
            config.providers[0].base_url.as_deref(),
            Some("https://api.openai.com/v1")
        );
        assert_eq!(config.providers[0].models, vec!["gpt-4o", "gpt-4o-mini"]);
        assert_eq!(config.providers[1].name, "ollama");
    }

    #[tokio::test]
    async fn test_invalid_yaml_is_an_error() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "providers: [unclosed").unwrap();

        let err = Config::load(file.path()).await.unwrap_err();
        assert!(matches!(err, ConfigError::Yaml(_)));
    }

    #[test]
    fn test_inline_api_key_wins_over_env() {
        let entry = ProviderEntry {
            name: "openai".to_string(),
            base_url: None,
            api_key: Some("inline-key".to_string()),
            api_key_env: Some("MULTICHAT_TEST_UNSET_VAR".to_string()),
            models: vec![],
        };
        assert_eq!(entry.resolve_api_key().as_deref(), Some("inline-key"));
    }

    #[test]
    fn test_api_key_from_environment() {
        unsafe { std::env::set_var("MULTICHAT_TEST_API_KEY", "env-key") };
        let entry = ProviderEntry {
            name: "openai".to_string(),
            base_url: None,
            api_key: None,
            api_key_env: Some("MULTICHAT_TEST_API_KEY".to_string()),
            models: vec![],
        };
        assert_eq!(entry.resolve_api_key().as_deref(), Some("env-key"));
    }

    #[test]
    fn test_empty_inline_key_falls_through() {
        let entry = ProviderEntry {
            name: "openai".to_string(),
            base_url: None,
            api_key: Some(String::new()),
            api_key_env: None,
            models: vec![],
        };
        assert!(entry.resolve_api_key().is_none());
    }
}
