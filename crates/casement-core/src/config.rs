use serde::{Deserialize, Serialize};
use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use crate::error::{WmError, WmResult};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CasementConfig {
    #[serde(default)]
    pub console: ConsoleConfig,

    #[serde(default)]
    pub wm: WmConfig,

    #[serde(default)]
    pub log: LogConfig,
}

/// How successive input lines are joined in the statement buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LineJoin {
    /// Insert `\n` between lines.
    #[default]
    Newline,
    /// Append lines back to back. Tokens split across lines fuse together.
    Concatenate,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConsoleConfig {
    #[serde(default = "default_banner")]
    pub banner: String,

    #[serde(default = "default_prompt_idle")]
    pub prompt_idle: String,

    #[serde(default = "default_prompt_continue")]
    pub prompt_continue: String,

    #[serde(default = "default_error_prefix")]
    pub error_prefix: String,

    #[serde(default)]
    pub line_join: LineJoin,

    /// Suffixes of a syntax error message that mark an unfinished statement.
    #[serde(default = "default_incomplete_markers")]
    pub incomplete_markers: Vec<String>,

    #[serde(default)]
    pub trap_ctrlc: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WmConfig {
    /// Cap on simultaneously live native windows; `None` means unlimited.
    #[serde(default)]
    pub max_windows: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogConfig {
    #[serde(default = "default_log_filter")]
    pub filter: String,
}

fn default_banner() -> String {
    ":: casement ::".to_string()
}
fn default_prompt_idle() -> String {
    "  ".to_string()
}
fn default_prompt_continue() -> String {
    "> ".to_string()
}
fn default_error_prefix() -> String {
    "! ".to_string()
}
fn default_incomplete_markers() -> Vec<String> {
    vec!["near <eof>".to_string(), "near '<eof>'".to_string()]
}
fn default_log_filter() -> String {
    "warn".to_string()
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            banner: default_banner(),
            prompt_idle: default_prompt_idle(),
            prompt_continue: default_prompt_continue(),
            error_prefix: default_error_prefix(),
            line_join: LineJoin::default(),
            incomplete_markers: default_incomplete_markers(),
            trap_ctrlc: false,
        }
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            filter: default_log_filter(),
        }
    }
}

impl CasementConfig {
    pub fn from_toml_str(s: &str) -> WmResult<Self> {
        toml::from_str(s).map_err(|e| WmError::Config(e.to_string()))
    }

    /// Missing file means defaults; anything else that goes wrong is an error.
    pub fn load_or_default(path: impl AsRef<Path>) -> WmResult<Self> {
        let path = path.as_ref();
        match fs::read_to_string(path) {
            Ok(s) => Self::from_toml_str(&s)
                .map_err(|e| WmError::Config(format!("parse {}: {}", path.display(), e))),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(Self::default()),
            Err(e) => Err(WmError::Config(format!("read {}: {}", path.display(), e))),
        }
    }
}
