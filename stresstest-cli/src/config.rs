//! Configuration loading from stress.toml
//!
//! Defaults for a run can be kept in a `stress.toml` next to the solutions.
//! The file is discovered by walking up from the current directory; CLI flags
//! override anything it sets.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Name of the configuration file
pub const CONFIG_FILE: &str = "stress.toml";

/// Stresstest configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct StressConfig {
    /// Runner configuration
    #[serde(default)]
    pub runner: RunnerConfig,
    /// Output configuration
    #[serde(default)]
    pub output: OutputConfig,
}

/// How cases are executed
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunnerConfig {
    /// Number of cases to generate
    #[serde(default = "default_count")]
    pub count: usize,
    /// Worker threads running cases concurrently (0 = all cores)
    #[serde(default)]
    pub jobs: usize,
    /// Per-process timeout (e.g., "5s", "500ms"); unset waits forever
    #[serde(default)]
    pub timeout: Option<String>,
    /// Interpreter for scripts
    #[serde(default = "default_interpreter")]
    pub interpreter: String,
    /// Run programs directly as executables
    #[serde(default)]
    pub exe: bool,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            count: default_count(),
            jobs: 0,
            timeout: None,
            interpreter: default_interpreter(),
            exe: false,
        }
    }
}

fn default_count() -> usize {
    10
}
fn default_interpreter() -> String {
    stresstest_core::DEFAULT_INTERPRETER.to_string()
}

/// Where artifacts and reports go
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Working directory for generated files
    #[serde(default = "default_directory")]
    pub directory: String,
    /// Report format: "human" or "json"
    #[serde(default = "default_format")]
    pub format: String,
    /// Delete the working directory after the run
    #[serde(default)]
    pub remove: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: default_directory(),
            format: default_format(),
            remove: false,
        }
    }
}

fn default_directory() -> String {
    stresstest_core::DEFAULT_WORK_DIR.to_string()
}
fn default_format() -> String {
    "human".to_string()
}

impl StressConfig {
    /// Load configuration from a TOML file
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    /// Try to discover and load configuration by walking up from current directory
    pub fn discover() -> Option<Self> {
        let mut dir = std::env::current_dir().ok()?;
        loop {
            let config_path = dir.join(CONFIG_FILE);
            if config_path.exists() {
                return match Self::load(&config_path) {
                    Ok(config) => Some(config),
                    Err(e) => {
                        tracing::warn!(
                            path = %config_path.display(),
                            "ignoring unreadable config: {}",
                            e
                        );
                        None
                    }
                };
            }
            if !dir.pop() {
                break;
            }
        }
        None
    }

    /// Parsed `runner.timeout`
    pub fn timeout(&self) -> anyhow::Result<Option<Duration>> {
        self.runner
            .timeout
            .as_deref()
            .map(parse_duration)
            .transpose()
    }

    /// Generate a default configuration as TOML string
    pub fn default_toml() -> String {
        r#"# Stresstest Configuration

[runner]
# Number of cases to generate
count = 10
# Worker threads for concurrent cases (0 = all cores)
jobs = 0
# Per-process timeout (uncomment to enable; default waits forever)
# timeout = "10s"
# Interpreter used for scripts
interpreter = "python"
# Run programs directly as executables
exe = false

[output]
# Working directory for generated tests
directory = "generated-tests"
# Report format: human or json
format = "human"
# Delete the working directory after the run
remove = false
"#
        .to_string()
    }
}

/// Parse duration string (e.g., "3s", "500ms", "2m")
pub fn parse_duration(s: &str) -> anyhow::Result<Duration> {
    let s = s.trim();
    if s.is_empty() {
        return Err(anyhow::anyhow!("Empty duration string"));
    }

    // Find where the number ends and unit begins
    let (num_part, unit_part) = s
        .char_indices()
        .find(|(_, c)| c.is_alphabetic())
        .map(|(i, _)| s.split_at(i))
        .unwrap_or((s, "s"));

    let value: f64 = num_part
        .trim()
        .parse()
        .map_err(|_| anyhow::anyhow!("Invalid duration number: {}", num_part))?;
    if !value.is_finite() || value < 0.0 {
        return Err(anyhow::anyhow!("Invalid duration: {}", s));
    }

    let multiplier: f64 = match unit_part.to_lowercase().as_str() {
        "ms" => 0.001,
        "s" | "" => 1.0,
        "m" | "min" => 60.0,
        _ => return Err(anyhow::anyhow!("Unknown duration unit: {}", unit_part)),
    };

    Duration::try_from_secs_f64(value * multiplier)
        .map_err(|e| anyhow::anyhow!("Invalid duration {}: {}", s, e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = StressConfig::default();
        assert_eq!(config.runner.count, 10);
        assert_eq!(config.runner.interpreter, "python");
        assert_eq!(config.output.directory, "generated-tests");
        assert!(!config.output.remove);
        assert_eq!(config.timeout().unwrap(), None);
    }

    #[test]
    fn test_parse_duration() {
        assert_eq!(parse_duration("3s").unwrap(), Duration::from_secs(3));
        assert_eq!(parse_duration("500ms").unwrap(), Duration::from_millis(500));
        assert_eq!(parse_duration("2m").unwrap(), Duration::from_secs(120));
        assert_eq!(parse_duration("1.5s").unwrap(), Duration::from_millis(1500));
        assert_eq!(parse_duration("4").unwrap(), Duration::from_secs(4));
        assert!(parse_duration("").is_err());
        assert!(parse_duration("5h").is_err());
        assert!(parse_duration("fast").is_err());
        assert!(parse_duration("99999999999999999999999").is_err());
    }

    #[test]
    fn test_parse_toml() {
        let toml_str = r#"
            [runner]
            count = 50
            timeout = "2s"

            [output]
            remove = true
        "#;

        let config: StressConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.runner.count, 50);
        assert_eq!(config.timeout().unwrap(), Some(Duration::from_secs(2)));
        assert!(config.output.remove);
        // Defaults should still apply
        assert_eq!(config.runner.interpreter, "python");
        assert_eq!(config.output.format, "human");
    }

    #[test]
    fn test_default_toml_parses() {
        let config: StressConfig = toml::from_str(&StressConfig::default_toml()).unwrap();
        assert_eq!(config.runner.count, 10);
        assert_eq!(config.runner.jobs, 0);
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        std::fs::write(&path, "[runner]\nexe = true\n").unwrap();

        let config = StressConfig::load(&path).unwrap();
        assert!(config.runner.exe);
    }
}
