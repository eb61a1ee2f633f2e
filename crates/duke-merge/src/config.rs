//! Configuration loading for duke-merge.

use std::path::{Path, PathBuf};

use duke_merge_core::Bindings;
use serde::Deserialize;
use thiserror::Error;

/// Output file name prefix
pub const DEFAULT_PREFIX: &str = "Грамота";

/// Columns whose values name each output file, in order
pub const DEFAULT_NAME_COLUMNS: [&str; 2] = ["Фамилия ученика", "Имя ученика"];

/// Errors from reading a configuration file
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file as TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error(transparent)]
    Invalid(#[from] duke_merge_core::Error),
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct MergeConfig {
    pub output: Option<OutputConfig>,
    pub conversion: Option<ConversionConfig>,
    /// Replaces the built-in bindings entirely when present
    pub bindings: Option<Bindings>,
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct OutputConfig {
    pub prefix: Option<String>,
    pub name_columns: Option<Vec<String>>,
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct ConversionConfig {
    pub soffice: Option<PathBuf>,
}

impl MergeConfig {
    /// Parse a TOML document and validate its bindings.
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        let config: MergeConfig = toml::from_str(contents)?;
        if let Some(bindings) = &config.bindings {
            bindings.validate()?;
        }
        Ok(config)
    }

    pub fn prefix(&self) -> &str {
        self.output
            .as_ref()
            .and_then(|output| output.prefix.as_deref())
            .unwrap_or(DEFAULT_PREFIX)
    }

    pub fn name_columns(&self) -> Vec<String> {
        self.output
            .as_ref()
            .and_then(|output| output.name_columns.clone())
            .unwrap_or_else(|| DEFAULT_NAME_COLUMNS.iter().map(|c| c.to_string()).collect())
    }

    pub fn soffice_path(&self) -> Option<&Path> {
        self.conversion
            .as_ref()
            .and_then(|conversion| conversion.soffice.as_deref())
    }

    pub fn bindings(&self) -> Bindings {
        self.bindings.clone().unwrap_or_default()
    }
}

/// Load configuration from `path`, falling back to defaults when the file
/// does not exist.
pub fn load_config(path: &Path) -> Result<MergeConfig, ConfigError> {
    if !path.exists() {
        return Ok(MergeConfig::default());
    }

    let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    MergeConfig::from_toml_str(&contents)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_config_defaults() {
        let config = MergeConfig::default();
        assert_eq!(config.prefix(), "Грамота");
        assert_eq!(config.name_columns(), vec!["Фамилия ученика", "Имя ученика"]);
        assert!(config.soffice_path().is_none());
        assert_eq!(config.bindings().len(), 4);
    }

    #[test]
    fn test_parse_full_config() {
        let config = MergeConfig::from_toml_str(
            r#"
            [output]
            prefix = "Diploma"
            name_columns = ["Last", "First"]

            [conversion]
            soffice = "/opt/libreoffice/program/soffice"

            [[bindings]]
            token = "{{Last}}"
            column = "Last"

            [[bindings]]
            token = "{{First}}"
            column = "First"
            "#,
        )
        .unwrap();

        assert_eq!(config.prefix(), "Diploma");
        assert_eq!(config.name_columns(), vec!["Last", "First"]);
        assert_eq!(
            config.soffice_path(),
            Some(Path::new("/opt/libreoffice/program/soffice"))
        );

        let bindings = config.bindings();
        let tokens: Vec<&str> = bindings.iter().map(|b| b.token.as_str()).collect();
        assert_eq!(tokens, vec!["{{Last}}", "{{First}}"]);
    }

    #[test]
    fn test_partial_output_section_keeps_defaults() {
        let config = MergeConfig::from_toml_str("[output]\nprefix = \"Cert\"\n").unwrap();
        assert_eq!(config.prefix(), "Cert");
        assert_eq!(config.name_columns().len(), 2);
        assert_eq!(config.bindings().len(), 4);
    }

    #[test]
    fn test_duplicate_binding_tokens_rejected() {
        let err = MergeConfig::from_toml_str(
            r#"
            [[bindings]]
            token = "{{A}}"
            column = "A"

            [[bindings]]
            token = "{{A}}"
            column = "B"
            "#,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn test_invalid_toml() {
        let err = MergeConfig::from_toml_str("[output\nprefix=").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = load_config(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(config.prefix(), DEFAULT_PREFIX);
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("merge.toml");
        std::fs::write(&path, "[conversion]\nsoffice = \"lo\"\n").unwrap();

        let config = load_config(&path).unwrap();
        assert_eq!(config.soffice_path(), Some(Path::new("lo")));
    }
}
