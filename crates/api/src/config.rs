//! Application configuration. Every field has a default, so an empty or
//! partial YAML file is valid and only overrides what it names.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use llm::{OllamaConfig, RetryConfig};
use pipeline::PipelineConfig;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub ollama: OllamaConfig,
    #[serde(default)]
    pub retry: RetryConfig,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub extractor: ExtractorKind,
    #[serde(default)]
    pub export: ExportConfig,
    #[serde(default)]
    pub pipeline: PipelineConfig,
}

impl AppConfig {
    /// Load the configuration, overlaying an optional YAML file on the
    /// defaults. No path means pure defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        serde_yaml::from_str(&raw)
            .with_context(|| format!("invalid config file {}", path.display()))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3000
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl ServerConfig {
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Embedding cache in front of the Ollama embedder.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    #[serde(default = "default_cache_enabled")]
    pub enabled: bool,
    #[serde(default = "default_cache_max_entries")]
    pub max_entries: usize,
}

fn default_cache_enabled() -> bool {
    true
}

fn default_cache_max_entries() -> usize {
    10_000
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: default_cache_enabled(),
            max_entries: default_cache_max_entries(),
        }
    }
}

/// Which extractor backs entity and relation discovery.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExtractorKind {
    /// Prompt the generate model for JSON entities and triples.
    #[default]
    Llm,
    /// Capitalized-span recognizer; no model calls during extraction.
    Heuristic,
}

/// Dumping chunk and graph artifacts to disk after each build.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default = "default_export_dir")]
    pub dir: PathBuf,
}

fn default_export_dir() -> PathBuf {
    PathBuf::from("data/artifacts")
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            dir: default_export_dir(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn empty_yaml_yields_defaults() {
        let config: AppConfig = serde_yaml::from_str("{}").unwrap();

        assert_eq!(config.server.bind_addr(), "0.0.0.0:3000");
        assert!(config.cache.enabled);
        assert_eq!(config.cache.max_entries, 10_000);
        assert_eq!(config.extractor, ExtractorKind::Llm);
        assert!(!config.export.enabled);
    }

    #[test]
    fn partial_yaml_overlays_defaults() {
        let yaml = "\
server:
  port: 8080
extractor: heuristic
pipeline:
  hybrid:
    alpha: 0.5
";
        let config: AppConfig = serde_yaml::from_str(yaml).unwrap();

        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.extractor, ExtractorKind::Heuristic);
        assert_eq!(config.pipeline.hybrid.alpha, 0.5);
        // Untouched sections keep their defaults.
        assert_eq!(config.pipeline.hybrid.final_top_k, 5);
        assert_eq!(config.pipeline.local.top_k, 10);
    }

    #[test]
    fn load_without_path_is_default() {
        let config = AppConfig::load(None).unwrap();
        assert_eq!(config.server.port, 3000);
    }

    #[test]
    fn load_reads_yaml_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        fs::write(&path, "export:\n  enabled: true\n  dir: /tmp/artifacts\n").unwrap();

        let config = AppConfig::load(Some(&path)).unwrap();

        assert!(config.export.enabled);
        assert_eq!(config.export.dir, PathBuf::from("/tmp/artifacts"));
    }

    #[test]
    fn load_rejects_unknown_garbage() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        fs::write(&path, "server: [not, a, map]\n").unwrap();

        assert!(AppConfig::load(Some(&path)).is_err());
    }
}
