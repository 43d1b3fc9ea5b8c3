//! Provider registry: named endpoint configurations and the models they expose.

use tracing::{info, warn};

use crate::config::Config;

/// Connection settings for one provider.
#[derive(Debug, Clone)]
pub struct ProviderSettings {
    pub base_url: Option<String>,
    pub api_key: Option<String>,
    pub models: Vec<String>,
}

/// Ordered registry of providers, keyed by name.
#[derive(Clone, Default)]
pub struct ProviderRegistry {
    providers: Vec<(String, ProviderSettings)>,
}

impl ProviderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the registry from a loaded configuration, resolving API keys.
    pub fn from_config(config: &Config) -> Self {
        let mut registry = Self::new();
        for entry in &config.providers {
            registry.register(
                &entry.name,
                ProviderSettings {
                    base_url: entry.base_url.clone(),
                    api_key: entry.resolve_api_key(),
                    models: entry.models.clone(),
                },
            );
            info!(provider = %entry.name, models = entry.models.len(), "Registered provider");
        }
        if registry.providers.is_empty() {
            warn!("No providers configured; every dispatch will be rejected");
        }
        registry
    }

    /// Register a provider, replacing any existing entry with the same name.
    pub fn register(&mut self, name: &str, settings: ProviderSettings) {
        if let Some(existing) = self.providers.iter_mut().find(|(n, _)| n == name) {
            existing.1 = settings;
        } else {
            self.providers.push((name.to_string(), settings));
        }
    }

    pub fn get_provider_config(&self, name: &str) -> Option<&ProviderSettings> {
        self.providers
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, settings)| settings)
    }

    /// Models exposed by a provider, empty for unknown names.
    pub fn get_available_models(&self, name: &str) -> &[String] {
        self.get_provider_config(name)
            .map(|settings| settings.models.as_slice())
            .unwrap_or(&[])
    }

    /// Provider names in registration order.
    pub fn get_all_providers(&self) -> Vec<&str> {
        self.providers.iter().map(|(name, _)| name.as_str()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ProviderEntry;

    fn sample_config() -> Config {
        Config {
            providers: vec![
                ProviderEntry {
                    name: "openai".to_string(),
                    base_url: Some("https://api.openai.com/v1".to_string()),
                    api_key: Some("sk-test".to_string()),
                    api_key_env: None,
                    models: vec!["gpt-4o".to_string(), "gpt-4o-mini".to_string()],
                },
                ProviderEntry {
                    name: "ollama".to_string(),
                    base_url: Some("http://localhost:11434/v1".to_string()),
                    api_key: Some("ollama".to_string()),
                    api_key_env: None,
                    models: vec!["llama3".to_string()],
                },
            ],
        }
    }

    #[test]
    fn test_registration_order_is_preserved() {
        let registry = ProviderRegistry::from_config(&sample_config());
        assert_eq!(registry.get_all_providers(), vec!["openai", "ollama"]);
    }

    #[test]
    fn test_models_in_declared_order() {
        let registry = ProviderRegistry::from_config(&sample_config());
        assert_eq!(
            registry.get_available_models("openai"),
            &["gpt-4o".to_string(), "gpt-4o-mini".to_string()]
        );
    }

    #[test]
    fn test_unknown_provider_has_no_models() {
        let registry = ProviderRegistry::from_config(&sample_config());
        assert!(registry.get_provider_config("mistral").is_none());
        assert!(registry.get_available_models("mistral").is_empty());
    }

    #[test]
    fn test_register_replaces_in_place() {
        let mut registry = ProviderRegistry::from_config(&sample_config());
        registry.register(
            "openai",
            ProviderSettings {
                base_url: Some("https://proxy.example/v1".to_string()),
                api_key: Some("sk-other".to_string()),
                models: vec!["gpt-4o".to_string()],
            },
        );
        assert_eq!(registry.get_all_providers(), vec!["openai", "ollama"]);
        assert_eq!(
            registry
                .get_provider_config("openai")
                .unwrap()
                .base_url
                .as_deref(),
            Some("https://proxy.example/v1")
        );
    }
}
