//! Test tracing configuration
//!
//! Values come from environment variables first, then from a TOML file, then
//! from defaults.

use super::path::{
    get_target_dir,
    get_workspace_root,
};
use serde::{
    Deserialize,
    Serialize,
};
use std::{
    env,
    fs,
    io,
    path::{
        Path,
        PathBuf,
    },
};
use thiserror::Error;
use tracing::Level;
use tracing_subscriber::fmt::format::FmtSpan;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] io::Error),
    #[error("failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
}

fn default_true() -> bool {
    true
}

/// Panic logging options
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PanicConfig {
    /// Log panics as tracing errors
    #[serde(default = "default_true")]
    pub show: bool,
    /// Include the panic message in the log event
    #[serde(default = "default_true")]
    pub show_message: bool,
    /// Also call the default hook, which prints to stderr
    #[serde(default = "default_true")]
    pub show_default_hook: bool,
}

impl Default for PanicConfig {
    fn default() -> Self {
        Self {
            show: true,
            show_message: true,
            show_default_hook: true,
        }
    }
}

/// Contents of `config/tracing.toml`
///
/// Top-level keys must appear before the `[panic]` section:
/// ```toml
/// log_to_stdout = true
/// log_filter = "steep=debug"
/// stdout_log_filter = "info"
/// file_log_filter = "trace"
/// keep_success_logs = false
/// enable_ansi = true
///
/// [panic]
/// show = true
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    #[serde(default)]
    pub log_to_stdout: Option<bool>,
    /// Filter for both outputs, used when the specific one is missing
    #[serde(default)]
    pub log_filter: Option<String>,
    #[serde(default)]
    pub stdout_log_filter: Option<String>,
    #[serde(default)]
    pub file_log_filter: Option<String>,
    #[serde(default)]
    pub keep_success_logs: Option<bool>,
    #[serde(default = "default_true")]
    pub enable_ansi: bool,
    #[serde(default)]
    pub panic: PanicConfig,
}

impl Default for FileConfig {
    fn default() -> Self {
        Self {
            log_to_stdout: None,
            log_filter: None,
            stdout_log_filter: None,
            file_log_filter: None,
            keep_success_logs: None,
            enable_ansi: true,
            panic: PanicConfig::default(),
        }
    }
}

impl FileConfig {
    pub fn parse(contents: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(contents)?)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path.as_ref())?;
        Self::parse(&contents)
    }

    /// Searches, in order, the file named by `TRACING_CONFIG` (as given, then
    /// relative to the workspace root), `<workspace>/config/tracing.toml` and
    /// `./config/tracing.toml`. Falls back to defaults.
    pub fn load() -> Self {
        let workspace_root = get_workspace_root();
        if let Ok(config_path) = env::var("TRACING_CONFIG") {
            let path = PathBuf::from(&config_path);
            for candidate in [path.clone(), workspace_root.join(&path)] {
                if let Ok(config) = Self::from_file(&candidate) {
                    return config;
                }
            }
            eprintln!(
                "Warning: TRACING_CONFIG points to invalid file: {}",
                config_path
            );
        }
        let paths = [
            workspace_root.join("config").join("tracing.toml"),
            PathBuf::from("config").join("tracing.toml"),
        ];
        for path in paths.iter().filter(|p| p.exists()) {
            match Self::from_file(path) {
                Ok(config) => return config,
                Err(e) => eprintln!(
                    "Warning: failed to load tracing config from {}: {}",
                    path.display(),
                    e
                ),
            }
        }
        Self::default()
    }
}

fn env_flag(name: &str) -> Option<bool> {
    env::var(name).ok().map(|v| {
        v == "1" || v.eq_ignore_ascii_case("true") || v.eq_ignore_ascii_case("yes")
    })
}

/// Configuration for test tracing
#[derive(Debug, Clone)]
pub struct TracingConfig {
    /// Directory where log files are stored
    pub log_dir: PathBuf,
    pub stdout_level: Level,
    pub file_level: Level,
    pub log_to_stdout: bool,
    pub log_to_file: bool,
    /// Filter directives for stdout, e.g. `"steep::run=trace"`
    pub stdout_filter_directives: Option<String>,
    pub file_filter_directives: Option<String>,
    /// Which span events to log
    pub span_events: FmtSpan,
    pub enable_ansi: bool,
    pub panic: PanicConfig,
    /// Keep log files even when tests pass
    pub keep_success_logs: bool,
}

impl Default for TracingConfig {
    fn default() -> Self {
        Self::from_file_config(FileConfig::load())
    }
}

impl TracingConfig {
    /// Applies environment overrides on top of `file`.
    ///
    /// Stdout filter: `LOG_STDOUT_FILTER` > `LOG_FILTER` > `stdout_log_filter`
    /// > `log_filter`, and likewise for the file filter with
    /// `LOG_FILE_FILTER` and `file_log_filter`.
    pub fn from_file_config(file: FileConfig) -> Self {
        let log_to_stdout = env_flag("LOG_STDOUT")
            .or(file.log_to_stdout)
            .unwrap_or(false);
        let stdout_filter_directives = env::var("LOG_STDOUT_FILTER")
            .ok()
            .or_else(|| env::var("LOG_FILTER").ok())
            .or_else(|| file.stdout_log_filter.clone())
            .or_else(|| file.log_filter.clone());
        let file_filter_directives = env::var("LOG_FILE_FILTER")
            .ok()
            .or_else(|| env::var("LOG_FILTER").ok())
            .or_else(|| file.file_log_filter.clone())
            .or_else(|| file.log_filter.clone());
        let keep_success_logs = env_flag("KEEP_SUCCESS_LOGS")
            .or(file.keep_success_logs)
            .unwrap_or(false);
        Self {
            log_dir: get_target_dir().join("test-logs"),
            stdout_level: Level::DEBUG,
            file_level: Level::TRACE,
            log_to_stdout,
            log_to_file: true,
            stdout_filter_directives,
            file_filter_directives,
            span_events: FmtSpan::ENTER | FmtSpan::CLOSE,
            enable_ansi: file.enable_ansi,
            panic: file.panic,
            keep_success_logs,
        }
    }

    /// Sets the level of both outputs
    pub fn with_level(
        mut self,
        level: Level,
    ) -> Self {
        self.stdout_level = level;
        self.file_level = level;
        self
    }

    /// Sets filter directives for both outputs
    pub fn with_filter(
        mut self,
        filter: impl Into<String>,
    ) -> Self {
        let filter = filter.into();
        self.stdout_filter_directives = Some(filter.clone());
        self.file_filter_directives = Some(filter);
        self
    }

    pub fn with_stdout_filter(
        mut self,
        filter: impl Into<String>,
    ) -> Self {
        self.stdout_filter_directives = Some(filter.into());
        self
    }

    pub fn with_file_filter(
        mut self,
        filter: impl Into<String>,
    ) -> Self {
        self.file_filter_directives = Some(filter.into());
        self
    }

    /// Enable/disable stdout logging
    pub fn stdout(
        mut self,
        enabled: bool,
    ) -> Self {
        self.log_to_stdout = enabled;
        self
    }

    /// Enable/disable file logging
    pub fn file(
        mut self,
        enabled: bool,
    ) -> Self {
        self.log_to_file = enabled;
        self
    }

    pub fn span_events(
        mut self,
        events: FmtSpan,
    ) -> Self {
        self.span_events = events;
        self
    }

    pub fn log_dir(
        mut self,
        dir: impl Into<PathBuf>,
    ) -> Self {
        self.log_dir = dir.into();
        self
    }

    pub fn keep_success_logs(
        mut self,
        keep: bool,
    ) -> Self {
        self.keep_success_logs = keep;
        self
    }
}
