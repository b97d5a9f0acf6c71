//! Engine configuration from environment variables.

use std::path::PathBuf;

use crate::infrastructure::ollama::{DEFAULT_OLLAMA_BASE_URL, DEFAULT_OLLAMA_MODEL};

/// Default directory for session saves, relative to the working directory.
pub const DEFAULT_SAVE_DIR: &str = "data/saves";

/// Which generation collaborator backs region and interaction proposals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GeneratorBackend {
    #[default]
    Ollama,
    /// No collaborator; every proposal comes from fallback tables.
    Offline,
}

impl GeneratorBackend {
    /// Unrecognized values fall back to `Ollama`.
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "offline" | "none" | "fallback" => Self::Offline,
            _ => Self::Ollama,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    pub save_dir: PathBuf,
    pub server_host: String,
    pub server_port: u16,
    pub ollama_base_url: String,
    pub ollama_model: String,
    pub generator: GeneratorBackend,
    /// Raw `CORS_ALLOWED_ORIGINS`: `*` or a comma-separated origin list
    pub cors_allowed_origins: Option<String>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            save_dir: PathBuf::from(DEFAULT_SAVE_DIR),
            server_host: "0.0.0.0".to_string(),
            server_port: 3000,
            ollama_base_url: DEFAULT_OLLAMA_BASE_URL.to_string(),
            ollama_model: DEFAULT_OLLAMA_MODEL.to_string(),
            generator: GeneratorBackend::default(),
            cors_allowed_origins: None,
        }
    }
}

impl EngineConfig {
    /// Read configuration from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup, falling back to defaults for missing values.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let non_empty = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let server_port = non_empty("SERVER_PORT")
            .or_else(|| non_empty("PORT"))
            .and_then(|p| p.parse().ok())
            .unwrap_or(defaults.server_port);

        Self {
            save_dir: non_empty("WRLDKEEP_SAVE_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.save_dir),
            server_host: non_empty("SERVER_HOST").unwrap_or(defaults.server_host),
            server_port,
            ollama_base_url: non_empty("OLLAMA_BASE_URL")
                .or_else(|| non_empty("OLLAMA_URL"))
                .unwrap_or(defaults.ollama_base_url),
            ollama_model: non_empty("OLLAMA_MODEL").unwrap_or(defaults.ollama_model),
            generator: non_empty("GENERATION_MODE")
                .map(|m| GeneratorBackend::parse(&m))
                .unwrap_or(defaults.generator),
            cors_allowed_origins: non_empty("CORS_ALLOWED_ORIGINS"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> EngineConfig {
        let env: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        EngineConfig::from_lookup(|key| env.get(key).cloned())
    }

    #[test]
    fn empty_environment_uses_defaults() {
        assert_eq!(config_from(&[]), EngineConfig::default());
    }

    #[test]
    fn port_falls_back_to_port_variable() {
        assert_eq!(config_from(&[("PORT", "8080")]).server_port, 8080);
        assert_eq!(
            config_from(&[("PORT", "8080"), ("SERVER_PORT", "9000")]).server_port,
            9000
        );
        assert_eq!(config_from(&[("SERVER_PORT", "not-a-port")]).server_port, 3000);
    }

    #[test]
    fn generation_mode_selects_backend() {
        assert_eq!(
            config_from(&[("GENERATION_MODE", "offline")]).generator,
            GeneratorBackend::Offline
        );
        assert_eq!(
            config_from(&[("GENERATION_MODE", "ollama")]).generator,
            GeneratorBackend::Ollama
        );
    }

    #[test]
    fn save_dir_and_cors_are_read() {
        let config = config_from(&[
            ("WRLDKEEP_SAVE_DIR", "/var/lib/wrldkeep"),
            ("CORS_ALLOWED_ORIGINS", " * "),
        ]);
        assert_eq!(config.save_dir, PathBuf::from("/var/lib/wrldkeep"));
        assert_eq!(config.cors_allowed_origins.as_deref(), Some("*"));
    }
}
