//! Application configuration for the rules assembler.
//!
//! The config file lives at `<root>/rules-assembler.toml` unless a path is
//! given explicitly. CLI flags select the file, the file overrides defaults.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{AssemblerError, Result};
use crate::types::SourceSpec;

/// Default configuration file name.
pub const CONFIG_FILE_NAME: &str = "rules-assembler.toml";

/// Default document suffix.
pub const DEFAULT_EXTENSION: &str = ".md";

/// Default per-source output subdirectory.
pub const DEFAULT_OUTPUT_DIR: &str = "output";

// ---------------------------------------------------------------------------
// Config structs (matching rules-assembler.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Global defaults.
    #[serde(default)]
    pub defaults: DefaultsConfig,

    /// Source directories, processed in this order.
    #[serde(default = "SourceSpec::defaults")]
    pub sources: Vec<SourceSpec>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            defaults: DefaultsConfig::default(),
            sources: SourceSpec::defaults(),
        }
    }
}

/// `[defaults]` section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DefaultsConfig {
    /// Suffix a file name must end with to be aggregated.
    #[serde(default = "default_extension")]
    pub extension: String,

    /// Subdirectory of each source that receives its aggregate.
    #[serde(default = "default_output_dir")]
    pub output_dir: String,

    /// Final merged file, relative to the root.
    #[serde(default = "default_final_output")]
    pub final_output: String,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            extension: default_extension(),
            output_dir: default_output_dir(),
            final_output: default_final_output(),
        }
    }
}

fn default_extension() -> String {
    DEFAULT_EXTENSION.into()
}
fn default_output_dir() -> String {
    DEFAULT_OUTPUT_DIR.into()
}
fn default_final_output() -> String {
    ".clinerules".into()
}

impl AppConfig {
    /// Reject empty names anywhere in the config.
    pub fn validate(&self) -> Result<()> {
        let defaults = &self.defaults;
        for (field, value) in [
            ("defaults.extension", &defaults.extension),
            ("defaults.output_dir", &defaults.output_dir),
            ("defaults.final_output", &defaults.final_output),
        ] {
            if value.trim().is_empty() {
                return Err(AssemblerError::validation(format!(
                    "{field} must not be empty"
                )));
            }
        }

        for (i, source) in self.sources.iter().enumerate() {
            if source.dir.trim().is_empty() {
                return Err(AssemblerError::validation(format!(
                    "sources[{i}].dir must not be empty"
                )));
            }
            if source.output.trim().is_empty() {
                return Err(AssemblerError::validation(format!(
                    "sources[{i}].output must not be empty (dir = {:?})",
                    source.dir
                )));
            }
        }

        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Build plan (runtime, resolved against a root directory)
// ---------------------------------------------------------------------------

/// Everything one assembler run needs, with paths resolved against the root.
#[derive(Debug, Clone)]
pub struct BuildPlan {
    /// Directory all sources are relative to.
    pub root: PathBuf,
    /// Sources in processing order.
    pub sources: Vec<SourceSpec>,
    /// Document suffix, e.g. `.md`.
    pub extension: String,
    /// Per-source output subdirectory name.
    pub output_dir: String,
    /// Absolute path of the final merged file.
    pub final_output: PathBuf,
}

impl BuildPlan {
    pub fn new(config: &AppConfig, root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        Self {
            final_output: root.join(&config.defaults.final_output),
            sources: config.sources.clone(),
            extension: config.defaults.extension.clone(),
            output_dir: config.defaults.output_dir.clone(),
            root,
        }
    }
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Default config file location for a root directory.
pub fn config_file_path(root: &Path) -> PathBuf {
    root.join(CONFIG_FILE_NAME)
}

/// Load the config at `path`. Returns defaults if the file does not exist.
pub fn load_config(path: &Path) -> Result<AppConfig> {
    if !path.exists() {
        tracing::debug!(?path, "config file not found, using defaults");
        return Ok(AppConfig::default());
    }

    load_config_from(path)
}

/// Load and validate the config from a specific file path.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| AssemblerError::io(path, e))?;

    let config: AppConfig = toml::from_str(&content).map_err(|e| {
        AssemblerError::config(format!("failed to parse {}: {e}", path.display()))
    })?;
    config.validate()?;

    tracing::debug!(?path, sources = config.sources.len(), "loaded config file");
    Ok(config)
}

/// Write a default config file at `path`. Refuses to overwrite.
pub fn init_config(path: &Path) -> Result<PathBuf> {
    if path.exists() {
        return Err(AssemblerError::config(format!(
            "{} already exists",
            path.display()
        )));
    }

    if let Some(dir) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir).map_err(|e| AssemblerError::io(dir, e))?;
    }

    let content = toml::to_string_pretty(&AppConfig::default())
        .map_err(|e| AssemblerError::config(e.to_string()))?;

    std::fs::write(path, content).map_err(|e| AssemblerError::io(path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(path.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_dir() -> PathBuf {
        let dir = std::env::temp_dir().join(format!("ra-config-test-{}", uuid::Uuid::now_v7()));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn default_config_serializes() {
        let toml_str = toml::to_string_pretty(&AppConfig::default()).expect("serialize");
        assert!(toml_str.contains("extension"));
        assert!(toml_str.contains(".framework-rules"));
    }

    #[test]
    fn config_roundtrip() {
        let toml_str = toml::to_string_pretty(&AppConfig::default()).expect("serialize");
        let parsed: AppConfig = toml::from_str(&toml_str).expect("deserialize");
        assert_eq!(parsed, AppConfig::default());
    }

    #[test]
    fn empty_file_uses_defaults() {
        let parsed: AppConfig = toml::from_str("").expect("parse");
        assert_eq!(parsed.sources, SourceSpec::defaults());
        assert_eq!(parsed.defaults.extension, ".md");
        assert_eq!(parsed.defaults.final_output, ".clinerules");
    }

    #[test]
    fn config_with_sources() {
        let toml_str = r#"
[defaults]
extension = ".txt"

[[sources]]
dir = "team"
output = ".team-rules"
"#;
        let config: AppConfig = toml::from_str(toml_str).expect("parse");
        assert_eq!(config.sources, vec![SourceSpec::new("team", ".team-rules")]);
        assert_eq!(config.defaults.extension, ".txt");
        assert_eq!(config.defaults.output_dir, "output");
    }

    #[test]
    fn validate_rejects_empty_names() {
        let mut config = AppConfig::default();
        config.sources.push(SourceSpec::new("extra", ""));
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("sources[3].output"));

        let mut config = AppConfig::default();
        config.defaults.extension = String::new();
        assert!(config.validate().is_err());
    }

    #[test]
    fn build_plan_resolves_against_root() {
        let plan = BuildPlan::new(&AppConfig::default(), "/rules");
        assert_eq!(plan.final_output, PathBuf::from("/rules/.clinerules"));
        assert_eq!(plan.sources.len(), 3);
        assert_eq!(plan.output_dir, "output");
    }

    #[test]
    fn load_missing_file_gives_defaults() {
        let tmp = temp_dir();
        let config = load_config(&config_file_path(&tmp)).unwrap();
        assert_eq!(config, AppConfig::default());
        let _ = std::fs::remove_dir_all(&tmp);
    }

    #[test]
    fn load_invalid_toml_is_config_error() {
        let tmp = temp_dir();
        let path = config_file_path(&tmp);
        std::fs::write(&path, "sources = 3").unwrap();

        let err = load_config(&path).unwrap_err();
        assert!(matches!(err, AssemblerError::Config { .. }));

        let _ = std::fs::remove_dir_all(&tmp);
    }

    #[test]
    fn init_writes_loadable_file_once() {
        let tmp = temp_dir();
        let path = config_file_path(&tmp);

        init_config(&path).unwrap();
        assert_eq!(load_config(&path).unwrap(), AppConfig::default());
        assert!(init_config(&path).is_err());

        let _ = std::fs::remove_dir_all(&tmp);
    }
}
