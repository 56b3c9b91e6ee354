// Language configuration management for the harness CLI
use anyhow::{bail, Context, Result};
use harness_common::types::Language;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

pub const CONFIG_ENV: &str = "HARNESS_CONFIG";
const DEFAULT_CONFIG_PATH: &str = "config/languages.json";

fn default_compile_timeout_ms() -> u64 {
    30_000
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LanguageConfig {
    pub name: Language,
    /// Replaces the built-in harness template when set.
    #[serde(default)]
    pub template: Option<PathBuf>,
    /// Name the assembled source is written under.
    pub file_name: String,
    /// Compiler argv, run in the work directory. Interpreted languages have none.
    #[serde(default)]
    pub compile: Option<Vec<String>>,
    pub run: Vec<String>,
    #[serde(default = "default_compile_timeout_ms")]
    pub compile_timeout_ms: u64,
    /// Substrings a submission must not contain.
    #[serde(default)]
    pub blacklist: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize)]
struct LanguagesJson {
    languages: Vec<LanguageConfig>,
}

/// Language configuration manager
#[derive(Debug, Clone)]
pub struct LanguageConfigManager {
    configs: HashMap<Language, LanguageConfig>,
}

impl LanguageConfigManager {
    /// Load language configurations from languages.json
    pub fn load(config_path: &Path) -> Result<Self> {
        if !config_path.exists() {
            bail!("Language config file not found: {}", config_path.display());
        }

        let content = fs::read_to_string(config_path)
            .with_context(|| format!("Failed to read {}", config_path.display()))?;

        let languages_json: LanguagesJson = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse {}", config_path.display()))?;

        let mut configs = HashMap::new();
        for lang in languages_json.languages {
            if lang.run.is_empty() {
                bail!("Language '{}' has an empty run command", lang.name);
            }
            if lang.compile.as_ref().is_some_and(|argv| argv.is_empty()) {
                bail!("Language '{}' has an empty compile command", lang.name);
            }
            if configs.insert(lang.name, lang).is_some() {
                bail!("Language configured twice in {}", config_path.display());
            }
        }

        Ok(Self { configs })
    }

    /// Load from $HARNESS_CONFIG, falling back to config/languages.json
    pub fn load_default() -> Result<Self> {
        let path = std::env::var(CONFIG_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
        Self::load(Path::new(&path))
    }

    /// Get configuration for a specific language
    pub fn get_config(&self, language: Language) -> Result<&LanguageConfig> {
        self.configs
            .get(&language)
            .ok_or_else(|| anyhow::anyhow!("No configuration found for language: {}", language))
    }

    /// Template files that replace the built-in ones.
    pub fn template_overrides(&self) -> Vec<(Language, PathBuf)> {
        let mut overrides: Vec<(Language, PathBuf)> = self
            .configs
            .values()
            .filter_map(|config| config.template.clone().map(|path| (config.name, path)))
            .collect();
        overrides.sort();
        overrides
    }

    /// List all configured languages, sorted
    pub fn list_languages(&self) -> Vec<Language> {
        let mut languages: Vec<Language> = self.configs.keys().copied().collect();
        languages.sort();
        languages
    }
}
