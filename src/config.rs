//! Configuration management for the ATS scanner

use crate::error::{AtsScannerError, Result};
use crate::processing::ats_matcher::SkillMatcher;
use crate::processing::taxonomy::{
    default_synonyms, default_taxonomy, default_weights, CategoryWeights, SynonymTable, Taxonomy,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    pub matcher: MatcherConfig,
    pub audit: AuditConfig,
    pub output: OutputConfig,
}

/// Taxonomy, synonyms and weights for the skill matcher.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatcherConfig {
    pub weights: CategoryWeights,
    pub synonyms: SynonymTable,
    pub taxonomy: Taxonomy,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditConfig {
    pub endpoint: String,
    pub model: String,
    /// Environment variable holding the API key
    pub api_key_env: String,
    pub timeout_seconds: u64,
    pub max_retries: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputConfig {
    pub format: OutputFormat,
    pub color_output: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OutputFormat {
    Console,
    Json,
    Markdown,
}

impl Default for MatcherConfig {
    fn default() -> Self {
        Self {
            weights: default_weights(),
            synonyms: default_synonyms(),
            taxonomy: default_taxonomy(),
        }
    }
}

impl MatcherConfig {
    /// Validate the tables and build a matcher; invalid tables fail here.
    pub fn build_matcher(&self) -> Result<SkillMatcher> {
        SkillMatcher::new(
            self.taxonomy.clone(),
            self.synonyms.clone(),
            self.weights.clone(),
        )
    }
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://generativelanguage.googleapis.com/v1beta/models".to_string(),
            model: "gemini-3-pro-preview".to_string(),
            api_key_env: "GEMINI_API_KEY".to_string(),
            timeout_seconds: 120,
            max_retries: 3,
        }
    }
}

impl AuditConfig {
    /// Read the API key from the configured environment variable.
    pub fn api_key(&self) -> Result<String> {
        match std::env::var(&self.api_key_env) {
            Ok(key) if !key.trim().is_empty() => Ok(key),
            _ => Err(AtsScannerError::Configuration(format!(
                "audit API key not set; export {}",
                self.api_key_env
            ))),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: OutputFormat::Console,
            color_output: true,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            matcher: MatcherConfig::default(),
            audit: AuditConfig::default(),
            output: OutputConfig::default(),
        }
    }
}

impl Config {
    /// Load from the default location, writing defaults on first use.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path())
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            let config: Config = toml::from_str(&content)?;
            Ok(config)
        } else {
            let config = Self::default();
            config.save_to(path)?;
            Ok(config)
        }
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path())
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Overwrite the file at `path` with defaults.
    pub fn reset(path: &Path) -> Result<Self> {
        let config = Self::default();
        config.save_to(path)?;
        Ok(config)
    }

    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| dirs::home_dir().unwrap_or_else(|| PathBuf::from(".")))
            .join("ats-scanner")
            .join("config.toml")
    }

    pub fn to_toml(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::processing::taxonomy::HARD_SKILLS;
    use tempfile::TempDir;

    #[test]
    fn test_default_config_builds_matcher() {
        let config = Config::default();
        let matcher = config.matcher.build_matcher().unwrap();

        assert_eq!(matcher.taxonomy().categories().len(), 4);
        assert_eq!(matcher.weights().get(HARD_SKILLS), Some(0.6));
    }

    #[test]
    fn test_load_writes_defaults_then_round_trips() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let first = Config::load_from(&path).unwrap();
        assert!(path.exists());

        let second = Config::load_from(&path).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_custom_taxonomy_from_toml() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        let content = r#"
[matcher.weights]
hard_skills = 0.8
tools = 0.2

[matcher.synonyms]
rust = ["rustlang"]

[[matcher.taxonomy]]
name = "hard_skills"
skills = ["rust", "go"]

[[matcher.taxonomy]]
name = "tools"
skills = ["cargo"]

[audit]
endpoint = "http://localhost:9999"
model = "test-model"
api_key_env = "ATS_SCANNER_TEST_KEY"
timeout_seconds = 5
max_retries = 1

[output]
format = "Json"
color_output = false
"#;
        std::fs::write(&path, content).unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.output.format, OutputFormat::Json);

        let matcher = config.matcher.build_matcher().unwrap();
        let result = matcher.match_documents("Rust and Go with Cargo", "rustlang");
        assert_eq!(result.missing(HARD_SKILLS).unwrap(), ["go"]);
        // 0.8 * 50 + 0.2 * 0
        assert_eq!(result.overall_score, 40);
    }

    #[test]
    fn test_invalid_weights_in_file_fail_at_build() {
        let mut config = Config::default();
        config.matcher.weights = CategoryWeights::from_pairs([(HARD_SKILLS, 0.9)]);

        let err = config.matcher.build_matcher().unwrap_err();
        assert!(err.is_configuration());
    }

    #[test]
    fn test_malformed_toml_is_configuration_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "matcher = [").unwrap();

        let err = Config::load_from(&path).unwrap_err();
        assert!(matches!(err, AtsScannerError::Configuration(_)));
    }

    #[test]
    fn test_reset_overwrites_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "garbage").unwrap();

        let config = Config::reset(&path).unwrap();
        assert_eq!(Config::load_from(&path).unwrap(), config);
    }

    #[test]
    fn test_missing_api_key() {
        let audit = AuditConfig {
            api_key_env: "ATS_SCANNER_DEFINITELY_UNSET_KEY".to_string(),
            ..AuditConfig::default()
        };

        assert!(audit.api_key().unwrap_err().is_configuration());
    }
}
