//! Configuration management for plantpipe.
//!
//! Parses `plantpipe.toml` configuration files with serde and provides
//! auto-discovery of config files in parent directories.
//!
//! CLI settings can be applied during load via [`CliSettings`].
//!
//! ## Environment Variable Expansion
//!
//! String configuration values support environment variable expansion:
//!
//! - `${VAR}` - expands to the value of VAR, errors if unset
//! - `${VAR:-default}` - expands to VAR if set, otherwise uses default
//!
//! Expanded fields:
//! - `server.base_url`
//! - `plantuml.command`
//!
//! ## Example
//!
//! ```toml
//! [server]
//! base_url = "${PLANTUML_SERVER:-https://www.plantuml.com/plantuml}"
//! timeout_secs = 30
//!
//! [plantuml]
//! command = "plantuml"
//! args = ["-ttxt", "-pipe"]
//!
//! [output]
//! dir = "dist"
//! ```

mod expand;

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// CLI settings that override configuration file values.
///
/// All fields are optional. Only non-None values override the loaded config.
#[derive(Debug, Default)]
pub struct CliSettings {
    /// Override rendering server base URL.
    pub base_url: Option<String>,
    /// Override output directory.
    pub output_dir: Option<PathBuf>,
}

/// Configuration filename to search for.
const CONFIG_FILENAME: &str = "plantpipe.toml";

/// Public `PlantUML` rendering server.
const DEFAULT_BASE_URL: &str = "https://www.plantuml.com/plantuml";

/// Default output directory, relative to the config file or working directory.
const DEFAULT_OUTPUT_DIR: &str = "dist";

/// Application configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Rendering server configuration.
    pub server: ServerConfig,
    /// `PlantUML` executable configuration.
    pub plantuml: PlantumlConfig,
    /// Output configuration (paths are relative strings from TOML).
    output: OutputConfigRaw,

    /// Resolved output configuration (set after loading).
    #[serde(skip)]
    pub output_resolved: OutputConfig,
    /// Path to the config file (set after loading).
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

/// Rendering server configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Base URL of the `PlantUML` server.
    pub base_url: String,
    /// Global HTTP timeout in seconds (unset: transport default).
    pub timeout_secs: Option<u64>,
}

impl ServerConfig {
    /// HTTP timeout, if configured.
    #[must_use]
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_owned(),
            timeout_secs: None,
        }
    }
}

/// `PlantUML` executable configuration for text-mode validation.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct PlantumlConfig {
    /// Executable name or path.
    pub command: String,
    /// Arguments selecting text output read from stdin.
    pub args: Vec<String>,
}

impl Default for PlantumlConfig {
    fn default() -> Self {
        Self {
            command: "plantuml".to_owned(),
            args: vec!["-ttxt".to_owned(), "-pipe".to_owned()],
        }
    }
}

/// Raw output configuration as parsed from TOML (paths as strings).
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct OutputConfigRaw {
    dir: Option<String>,
}

/// Resolved output configuration.
#[derive(Debug)]
pub struct OutputConfig {
    /// Directory receiving all generated files.
    pub dir: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
        }
    }
}

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File not found.
    #[error("Configuration file not found: {}", .0.display())]
    NotFound(PathBuf),
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error.
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),
    /// Validation error.
    #[error("Configuration error: {0}")]
    Validation(String),
    /// Environment variable error during expansion.
    #[error("Environment variable error in {field}: {message}")]
    EnvVar {
        /// Config field path (e.g., "`server.base_url`").
        field: String,
        /// Error message (e.g., "${`PLANTUML_SERVER`} not set").
        message: String,
    },
}

/// Require a string field to be non-empty.
fn require_non_empty(value: &str, field: &str) -> Result<(), ConfigError> {
    if value.is_empty() {
        return Err(ConfigError::Validation(format!("{field} cannot be empty")));
    }
    Ok(())
}

/// Require a URL field to use http:// or https:// scheme.
fn require_http_url(url: &str, field: &str) -> Result<(), ConfigError> {
    if !url.starts_with("http://") && !url.starts_with("https://") {
        return Err(ConfigError::Validation(format!(
            "{field} must start with http:// or https://"
        )));
    }
    Ok(())
}

impl Config {
    /// Load configuration from file with optional CLI settings.
    ///
    /// If `config_path` is provided, loads from that file.
    /// Otherwise, searches for `plantpipe.toml` in current directory and parents,
    /// falling back to defaults when none exists.
    ///
    /// CLI settings are applied after loading and path resolution, allowing CLI
    /// arguments to take precedence over config file values. The merged result
    /// is validated.
    ///
    /// # Errors
    ///
    /// Returns error if explicit `config_path` doesn't exist, parsing fails,
    /// or the merged configuration is invalid.
    pub fn load(
        config_path: Option<&Path>,
        cli_settings: Option<&CliSettings>,
    ) -> Result<Self, ConfigError> {
        let mut config = if let Some(path) = config_path {
            if !path.exists() {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
            Self::load_from_file(path)?
        } else if let Some(discovered) = Self::discover_config() {
            Self::load_from_file(&discovered)?
        } else {
            Self::default()
        };

        if let Some(settings) = cli_settings {
            config.apply_cli_settings(settings);
        }

        config.validate()?;
        Ok(config)
    }

    /// Apply CLI settings to the configuration.
    fn apply_cli_settings(&mut self, settings: &CliSettings) {
        if let Some(base_url) = &settings.base_url {
            self.server.base_url.clone_from(base_url);
        }
        if let Some(output_dir) = &settings.output_dir {
            self.output_resolved.dir.clone_from(output_dir);
        }
    }

    /// Search for config file in current directory and parents.
    fn discover_config() -> Option<PathBuf> {
        let mut current = std::env::current_dir().ok()?;
        loop {
            let candidate = current.join(CONFIG_FILENAME);
            if candidate.exists() {
                return Some(candidate);
            }
            if !current.pop() {
                return None;
            }
        }
    }

    /// Load configuration from a specific file.
    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Self = toml::from_str(&content)?;

        // Expand environment variables before path resolution
        config.expand_env_vars()?;

        let config_dir = path.parent().unwrap_or(Path::new("."));
        config.resolve_paths(config_dir);
        config.config_path = Some(path.to_path_buf());

        Ok(config)
    }

    /// Validate configuration values.
    ///
    /// Checks that all required fields are properly set and contain valid values.
    /// Called automatically by [`load`](Self::load).
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if any validation fails.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.validate_server()?;
        self.validate_plantuml()?;
        Ok(())
    }

    /// Validate rendering server configuration.
    fn validate_server(&self) -> Result<(), ConfigError> {
        require_non_empty(&self.server.base_url, "server.base_url")?;
        require_http_url(&self.server.base_url, "server.base_url")?;

        if self.server.timeout_secs == Some(0) {
            return Err(ConfigError::Validation(
                "server.timeout_secs must be greater than 0".to_owned(),
            ));
        }

        Ok(())
    }

    /// Validate `PlantUML` executable configuration.
    fn validate_plantuml(&self) -> Result<(), ConfigError> {
        require_non_empty(&self.plantuml.command, "plantuml.command")
    }

    /// Expand environment variable references in configuration strings.
    fn expand_env_vars(&mut self) -> Result<(), ConfigError> {
        self.server.base_url = expand::expand_env(&self.server.base_url, "server.base_url")?;
        self.plantuml.command = expand::expand_env(&self.plantuml.command, "plantuml.command")?;
        Ok(())
    }

    /// Resolve relative paths against the config file's directory.
    fn resolve_paths(&mut self, config_dir: &Path) {
        self.output_resolved = OutputConfig {
            dir: config_dir.join(self.output.dir.as_deref().unwrap_or(DEFAULT_OUTPUT_DIR)),
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.server.base_url, "https://www.plantuml.com/plantuml");
        assert_eq!(config.server.timeout(), None);
        assert_eq!(config.plantuml.command, "plantuml");
        assert_eq!(config.plantuml.args, vec!["-ttxt", "-pipe"]);
        assert_eq!(config.output_resolved.dir, PathBuf::from("dist"));
        assert!(config.config_path.is_none());
    }

    #[test]
    fn test_parse_minimal_config() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.server.base_url, "https://www.plantuml.com/plantuml");
        assert_eq!(config.plantuml.command, "plantuml");
    }

    #[test]
    fn test_parse_full_config() {
        let toml = r#"
[server]
base_url = "http://localhost:8080/plantuml"
timeout_secs = 45

[plantuml]
command = "java"
args = ["-jar", "plantuml.jar", "-ttxt", "-pipe"]

[output]
dir = "build/diagrams"
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.server.base_url, "http://localhost:8080/plantuml");
        assert_eq!(config.server.timeout(), Some(Duration::from_secs(45)));
        assert_eq!(config.plantuml.command, "java");
        assert_eq!(
            config.plantuml.args,
            vec!["-jar", "plantuml.jar", "-ttxt", "-pipe"]
        );
        assert_eq!(config.output.dir.as_deref(), Some("build/diagrams"));
    }

    #[test]
    fn test_parse_unknown_type_fails() {
        let toml = r#"
[server]
timeout_secs = "soon"
"#;
        let result: Result<Config, _> = toml::from_str(toml);
        assert!(result.is_err());
    }

    #[test]
    fn test_resolve_paths() {
        let toml = r#"
[output]
dir = "site/img"
"#;
        let mut config: Config = toml::from_str(toml).unwrap();
        config.resolve_paths(Path::new("/project"));
        assert_eq!(config.output_resolved.dir, PathBuf::from("/project/site/img"));
    }

    #[test]
    fn test_resolve_paths_default_dir() {
        let mut config: Config = toml::from_str("").unwrap();
        config.resolve_paths(Path::new("/project"));
        assert_eq!(config.output_resolved.dir, PathBuf::from("/project/dist"));
    }

    #[test]
    fn test_load_explicit_file() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("custom.toml");
        std::fs::write(
            &path,
            "[server]\nbase_url = \"https://render.example.com/\"\n[output]\ndir = \"out\"\n",
        )
        .unwrap();

        let config = Config::load(Some(&path), None).unwrap();

        assert_eq!(config.server.base_url, "https://render.example.com/");
        assert_eq!(config.output_resolved.dir, temp_dir.path().join("out"));
        assert_eq!(config.config_path, Some(path));
    }

    #[test]
    fn test_load_missing_file() {
        let err = Config::load(Some(Path::new("/nonexistent/plantpipe.toml")), None).unwrap_err();
        assert!(matches!(err, ConfigError::NotFound(_)));
        assert!(err.to_string().contains("not found"));
    }

    #[test]
    fn test_load_invalid_toml() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("plantpipe.toml");
        std::fs::write(&path, "[server\nbase_url = ").unwrap();

        let err = Config::load(Some(&path), None).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)), "got {err:?}");
    }

    #[test]
    fn test_load_validates_file_values() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("plantpipe.toml");
        std::fs::write(&path, "[server]\nbase_url = \"ftp://plantuml\"\n").unwrap();

        let err = Config::load(Some(&path), None).unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)), "got {err:?}");
        assert!(err.to_string().contains("server.base_url"));
    }

    #[test]
    fn test_load_cli_settings_take_precedence() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("plantpipe.toml");
        std::fs::write(
            &path,
            "[server]\nbase_url = \"https://render.example.com\"\n",
        )
        .unwrap();
        let settings = CliSettings {
            base_url: Some("http://localhost:8080".to_owned()),
            output_dir: Some(PathBuf::from("/tmp/out")),
        };

        let config = Config::load(Some(&path), Some(&settings)).unwrap();

        assert_eq!(config.server.base_url, "http://localhost:8080");
        assert_eq!(config.output_resolved.dir, PathBuf::from("/tmp/out"));
    }

    #[test]
    fn test_apply_cli_settings_base_url() {
        let mut config = Config::default();
        let overrides = CliSettings {
            base_url: Some("https://example.com/plantuml/".to_owned()),
            ..Default::default()
        };

        config.apply_cli_settings(&overrides);

        assert_eq!(config.server.base_url, "https://example.com/plantuml/");
        assert_eq!(config.output_resolved.dir, PathBuf::from("dist")); // Unchanged
    }

    #[test]
    fn test_apply_cli_settings_output_dir() {
        let mut config = Config::default();
        let overrides = CliSettings {
            output_dir: Some(PathBuf::from("build")),
            ..Default::default()
        };

        config.apply_cli_settings(&overrides);

        assert_eq!(config.output_resolved.dir, PathBuf::from("build"));
        assert_eq!(config.server.base_url, "https://www.plantuml.com/plantuml"); // Unchanged
    }

    #[test]
    fn test_apply_cli_settings_empty() {
        let mut config = Config::default();
        config.apply_cli_settings(&CliSettings::default());

        assert_eq!(config.server.base_url, "https://www.plantuml.com/plantuml");
        assert_eq!(config.output_resolved.dir, PathBuf::from("dist"));
    }

    #[test]
    fn test_expand_env_vars_base_url() {
        // SAFETY: test runs single-threaded per test function
        unsafe {
            std::env::set_var("PLANTPIPE_CONFIG_TEST_SERVER", "https://plantuml.test.com");
        }

        let toml = r#"
[server]
base_url = "${PLANTPIPE_CONFIG_TEST_SERVER}"
"#;
        let mut config: Config = toml::from_str(toml).unwrap();
        config.expand_env_vars().unwrap();

        assert_eq!(config.server.base_url, "https://plantuml.test.com");

        unsafe {
            std::env::remove_var("PLANTPIPE_CONFIG_TEST_SERVER");
        }
    }

    #[test]
    fn test_expand_env_vars_command_default() {
        // SAFETY: test runs single-threaded per test function
        unsafe {
            std::env::remove_var("PLANTPIPE_CONFIG_TEST_BIN");
        }

        let toml = r#"
[plantuml]
command = "${PLANTPIPE_CONFIG_TEST_BIN:-/opt/plantuml/bin/plantuml}"
"#;
        let mut config: Config = toml::from_str(toml).unwrap();
        config.expand_env_vars().unwrap();

        assert_eq!(config.plantuml.command, "/opt/plantuml/bin/plantuml");
    }

    #[test]
    fn test_expand_env_vars_missing_required_var() {
        // SAFETY: test runs single-threaded per test function
        unsafe {
            std::env::remove_var("PLANTPIPE_CONFIG_TEST_MISSING");
        }

        let toml = r#"
[server]
base_url = "${PLANTPIPE_CONFIG_TEST_MISSING}"
"#;
        let mut config: Config = toml::from_str(toml).unwrap();
        let err = config.expand_env_vars().unwrap_err();

        assert!(matches!(err, ConfigError::EnvVar { .. }));
        assert!(err.to_string().contains("PLANTPIPE_CONFIG_TEST_MISSING"));
        assert!(err.to_string().contains("server.base_url"));
    }

    // Validation tests

    /// Assert that validation fails with expected substrings in the error message.
    fn assert_validation_error(config: &Config, expected_substrings: &[&str]) {
        let result = config.validate();
        assert!(result.is_err(), "Expected validation to fail");
        let err = result.unwrap_err();
        assert!(
            matches!(err, ConfigError::Validation(_)),
            "Expected ConfigError::Validation, got {err:?}"
        );
        let msg = err.to_string();
        for s in expected_substrings {
            assert!(
                msg.contains(s),
                "Expected error to contain '{s}', got: {msg}"
            );
        }
    }

    #[test]
    fn test_validate_default_config_passes() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn test_validate_base_url_empty() {
        let mut config = Config::default();
        config.server.base_url = String::new();
        assert_validation_error(&config, &["server.base_url", "empty"]);
    }

    #[test]
    fn test_validate_base_url_invalid_scheme() {
        let mut config = Config::default();
        config.server.base_url = "ftp://plantuml.example.com".to_owned();
        assert_validation_error(&config, &["server.base_url", "http"]);
    }

    #[test]
    fn test_validate_base_url_valid_http() {
        let mut config = Config::default();
        config.server.base_url = "http://localhost:8080".to_owned();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_timeout_zero() {
        let mut config = Config::default();
        config.server.timeout_secs = Some(0);
        assert_validation_error(&config, &["timeout_secs", "greater than 0"]);
    }

    #[test]
    fn test_validate_command_empty() {
        let mut config = Config::default();
        config.plantuml.command = String::new();
        assert_validation_error(&config, &["plantuml.command", "empty"]);
    }
}
