//! Application configuration from scopebuilder.toml

use serde::{Deserialize, Serialize};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::formatter::RenderState;

/// Default configuration file name, looked up in the working directory
pub const CONFIG_FILE_NAME: &str = "scopebuilder.toml";

/// Main application configuration from scopebuilder.toml
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Directory holding template .json files
    pub templates_dir: PathBuf,

    /// Directory holding saved project .json files
    pub projects_dir: PathBuf,

    /// Default preview settings
    pub render: RenderState,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            templates_dir: PathBuf::from("data"),
            projects_dir: PathBuf::from("projects"),
            render: RenderState::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from a scopebuilder.toml file
    ///
    /// # Parameters
    /// * `path` - Path to the configuration file
    ///
    /// # Returns
    /// * `Ok(AppConfig)` - Successfully loaded configuration
    /// * `Err(AppConfigError)` - Error reading or parsing the configuration file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, AppConfigError> {
        let content = fs::read_to_string(&path).map_err(AppConfigError::IoError)?;

        let config: AppConfig = toml::from_str(&content).map_err(AppConfigError::ParseError)?;

        Ok(config)
    }

    /// Load configuration, falling back to defaults when the file does not exist
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self, AppConfigError> {
        match Self::load(&path) {
            Err(AppConfigError::IoError(e)) if e.kind() == ErrorKind::NotFound => {
                log::debug!(
                    "No configuration at {}, using defaults",
                    path.as_ref().display()
                );
                Ok(Self::default())
            }
            other => other,
        }
    }

    /// Save configuration to a scopebuilder.toml file
    ///
    /// # Parameters
    /// * `path` - Path where the configuration file will be written
    ///
    /// # Returns
    /// * `Ok(())` - Successfully saved configuration
    /// * `Err(AppConfigError)` - Error serializing or writing the configuration file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), AppConfigError> {
        let content = toml::to_string_pretty(self).map_err(AppConfigError::SerializeError)?;

        fs::write(&path, content).map_err(AppConfigError::IoError)?;

        Ok(())
    }
}

/// Errors that can occur when loading or saving application configuration
#[derive(Debug)]
#[allow(clippy::enum_variant_names)]
pub enum AppConfigError {
    /// IO error when reading or writing file
    IoError(std::io::Error),

    /// Error parsing TOML
    ParseError(toml::de::Error),

    /// Error serializing to TOML
    SerializeError(toml::ser::Error),
}

impl std::fmt::Display for AppConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AppConfigError::IoError(e) => write!(f, "IO error: {}", e),
            AppConfigError::ParseError(e) => write!(f, "TOML parse error: {}", e),
            AppConfigError::SerializeError(e) => write!(f, "TOML serialize error: {}", e),
        }
    }
}

impl std::error::Error for AppConfigError {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::formatter::{LineSpacing, NumberingStyle, OutputFormat};

    #[test]
    fn test_app_config_roundtrip() {
        let config = AppConfig {
            templates_dir: PathBuf::from("/srv/scope/templates"),
            projects_dir: PathBuf::from("/srv/scope/projects"),
            render: RenderState::default()
                .with_format(OutputFormat::Html)
                .with_font_size(12)
                .with_spacing(LineSpacing::Double),
        };

        let toml_str = toml::to_string_pretty(&config).unwrap();
        let parsed: AppConfig = toml::from_str(&toml_str).unwrap();

        assert_eq!(parsed, config);
    }

    #[test]
    fn test_parse_example_toml() {
        let toml_content = r#"
templates_dir = "templates"

[render]
output_format = "html"
numbering_style = "standard-lists"
line_spacing = "1.5"
font_size_pt = 40
"#;

        let config: AppConfig = toml::from_str(toml_content).unwrap();

        assert_eq!(config.templates_dir, PathBuf::from("templates"));
        assert_eq!(config.projects_dir, PathBuf::from("projects"));
        assert_eq!(config.render.output_format, OutputFormat::Html);
        assert_eq!(config.render.numbering_style, NumberingStyle::StandardLists);
        assert_eq!(config.render.line_spacing, LineSpacing::OnePointFive);
        assert_eq!(config.render.font_size_pt(), 16);
        assert!(config.render.professional_header);
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = AppConfig::load_or_default(dir.path().join(CONFIG_FILE_NAME)).unwrap();
        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn test_malformed_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        fs::write(&path, "templates_dir = [").unwrap();
        assert!(matches!(
            AppConfig::load_or_default(&path),
            Err(AppConfigError::ParseError(_))
        ));
    }
}
