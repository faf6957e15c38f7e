use serde::Deserialize;
use skillcheck_logging::LogFormat;
use skillcheck_skills::ValidationRules;
use std::env;
use std::path::{Path, PathBuf};

/// Built-in defaults, applied beneath every other layer
pub const DEFAULT_CONFIG: &str = r#"
[logging]
level = "warn"  # trace, debug, info, warn, error
format = "text" # or "json"

[skills]
directories = ["skills"]
readme = "README.md"

[rules]
max_name_length = 64
max_description_length = 1024
max_body_lines = 500
reserved_words = ["anthropic", "claude"]
advisory = true  # third-person / trigger / capability warnings
"#;

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
            format: LogFormat::Text,
        }
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct SkillsConfig {
    /// Directories holding `<skill>/SKILL.md`, highest priority first
    pub directories: Vec<PathBuf>,
    /// README carrying the generated index
    pub readme: PathBuf,
}

impl Default for SkillsConfig {
    fn default() -> Self {
        Self {
            directories: vec![PathBuf::from("skills")],
            readme: PathBuf::from("README.md"),
        }
    }
}

#[derive(Debug, Deserialize, Clone, Default, PartialEq)]
#[serde(default)]
pub struct Config {
    pub logging: LoggingConfig,
    pub skills: SkillsConfig,
    pub rules: ValidationRules,
}

impl Config {
    /// Get the global config path: ~/.skillcheck/skillcheck.toml
    fn global_config_path() -> Option<PathBuf> {
        dirs::home_dir().map(|home| home.join(".skillcheck").join("skillcheck.toml"))
    }

    /// Load configuration with layered approach:
    /// 1. Built-in defaults
    /// 2. Global config: ~/.skillcheck/skillcheck.toml (optional)
    /// 3. `--config PATH` (required) or ./skillcheck.toml (optional)
    /// 4. Environment variables (highest priority)
    pub fn load(explicit: Option<&Path>) -> anyhow::Result<Self> {
        // Load .env file from current directory
        dotenvy::dotenv().ok();

        let mut config_builder = config::Config::builder()
            .add_source(config::File::from_str(DEFAULT_CONFIG, config::FileFormat::Toml));

        if let Some(global) = Self::global_config_path() {
            config_builder = config_builder.add_source(config::File::from(global).required(false));
        }

        config_builder = match explicit {
            Some(path) => config_builder.add_source(config::File::from(path.to_path_buf())),
            None => config_builder.add_source(config::File::with_name("skillcheck").required(false)),
        };

        // Environment variables with SKILLCHECK__ prefix, e.g. SKILLCHECK__RULES__MAX_BODY_LINES
        config_builder = config_builder.add_source(
            config::Environment::with_prefix("SKILLCHECK")
                .separator("__")
                .try_parsing(true)
                .list_separator(",")
                .with_list_parse_key("skills.directories")
                .with_list_parse_key("rules.reserved_words"),
        );

        // Convenience override for the log level
        if let Ok(level) = env::var("SKILLCHECK_LOG") {
            config_builder = config_builder.set_override("logging.level", level)?;
        }

        let config: Self = config_builder.build()?.try_deserialize()?;
        Ok(config)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_default_template_matches_defaults() {
        let parsed: Config = toml::from_str(DEFAULT_CONFIG).expect("Failed to parse TOML");
        assert_eq!(parsed, Config::default());
    }

    #[test]
    fn test_partial_rules_keep_defaults() {
        let toml_str = r#"
            [rules]
            max_body_lines = 200
            advisory = false
        "#;

        let config: Config = toml::from_str(toml_str).expect("Failed to parse TOML");
        assert_eq!(config.rules.max_body_lines, 200);
        assert!(!config.rules.advisory);
        assert_eq!(config.rules.max_name_length, 64);
        assert_eq!(config.skills, SkillsConfig::default());
    }

    #[test]
    fn test_json_logging_format() {
        let config: Config = toml::from_str("[logging]\nformat = \"json\"\n").unwrap();
        assert_eq!(config.logging.format, LogFormat::Json);
        assert_eq!(config.logging.level, "warn");
    }

    #[test]
    fn test_load_explicit_file() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("custom.toml");
        std::fs::write(
            &path,
            "[skills]\ndirectories = [\"docs/skills\", \"more\"]\nreadme = \"docs/README.md\"\n",
        )
        .unwrap();

        let config = Config::load(Some(&path)).unwrap();
        assert_eq!(
            config.skills.directories,
            vec![PathBuf::from("docs/skills"), PathBuf::from("more")]
        );
        assert_eq!(config.skills.readme, PathBuf::from("docs/README.md"));
    }

    #[test]
    fn test_load_missing_explicit_file_fails() {
        let tmp = tempfile::tempdir().unwrap();
        assert!(Config::load(Some(&tmp.path().join("absent.toml"))).is_err());
    }
}
