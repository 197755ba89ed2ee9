//! Configuration loading and parsing.
//!
//! Parses `wordnav.toml` (or an override path provided by the binary):
//!
//! ```toml
//! [dictionary]
//! path = "~/.config/wordnav/user.dict"
//! lazy = true
//!
//! [preview]
//! limit = 0
//!
//! [display]
//! tabstop = 8
//! ```
//!
//! Every field is optional. A missing file or a parse error yields defaults so
//! the adapter stays usable; parse errors are logged at `warn`. Values are
//! resolved once at initialization.

use anyhow::Result;
use serde::Deserialize;
use std::{
    fs,
    path::{Path, PathBuf},
};
use tracing::{info, warn};

/// Upper bound on previewed targets, whatever the configured limit.
pub const PREVIEW_MAX_LIMIT: usize = 99_999;

pub const CONFIG_FILE_NAME: &str = "wordnav.toml";

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct DictionaryConfig {
    #[serde(default)]
    pub path: Option<PathBuf>,
    #[serde(default = "DictionaryConfig::default_lazy")]
    pub lazy: bool,
}

impl Default for DictionaryConfig {
    fn default() -> Self {
        Self {
            path: None,
            lazy: Self::default_lazy(),
        }
    }
}

impl DictionaryConfig {
    const fn default_lazy() -> bool {
        true
    }
}

#[derive(Debug, Deserialize, Default, Clone, PartialEq, Eq)]
pub struct PreviewConfig {
    #[serde(default)]
    pub limit: i64,
}

/// How raw cursor columns are measured.
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct DisplayConfig {
    #[serde(default = "DisplayConfig::default_tabstop")]
    pub tabstop: usize,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            tabstop: Self::default_tabstop(),
        }
    }
}

impl DisplayConfig {
    const fn default_tabstop() -> usize {
        8
    }
}

#[derive(Debug, Deserialize, Default, Clone, PartialEq, Eq)]
pub struct ConfigFile {
    #[serde(default)]
    pub dictionary: DictionaryConfig,
    #[serde(default)]
    pub preview: PreviewConfig,
    #[serde(default)]
    pub display: DisplayConfig,
}

#[derive(Debug, Clone, Default)]
pub struct Config {
    pub raw: Option<String>, // original file string (optional)
    pub file: ConfigFile,    // parsed (or default) data
    pub path: Option<PathBuf>,
}

/// Where the segmentation dictionary comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DictionarySource {
    Default,
    File(PathBuf),
}

/// Resolved preview cap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PreviewLimit {
    /// At most this many targets (1..=PREVIEW_MAX_LIMIT).
    Count(usize),
    /// Every target up to the end of the cursor's line.
    CurrentLine,
}

impl PreviewLimit {
    /// Positive -> that many, zero -> rest of the current line, negative -> the maximum.
    pub fn resolve(raw: i64) -> Self {
        match raw {
            0 => PreviewLimit::CurrentLine,
            n if n < 0 => PreviewLimit::Count(PREVIEW_MAX_LIMIT),
            n => PreviewLimit::Count(usize::try_from(n).map_or(PREVIEW_MAX_LIMIT, |n| {
                n.min(PREVIEW_MAX_LIMIT)
            })),
        }
    }

    /// Hard cap on targets for this limit.
    pub fn cap(self) -> usize {
        match self {
            PreviewLimit::Count(n) => n.min(PREVIEW_MAX_LIMIT),
            PreviewLimit::CurrentLine => PREVIEW_MAX_LIMIT,
        }
    }
}

/// Best-effort config path following platform conventions (XDG / AppData Roaming).
pub fn discover() -> PathBuf {
    let local = PathBuf::from(CONFIG_FILE_NAME);
    if local.exists() {
        return local;
    }
    if let Some(dir) = dirs::config_dir() {
        return dir.join("wordnav").join(CONFIG_FILE_NAME);
    }
    PathBuf::from(CONFIG_FILE_NAME)
}

pub fn load_from(path: Option<PathBuf>) -> Result<Config> {
    let path = path.unwrap_or_else(discover);
    let Ok(content) = fs::read_to_string(&path) else {
        info!(target: "config", path = %path.display(), "config_missing_defaults");
        return Ok(Config::default());
    };
    match toml::from_str::<ConfigFile>(&content) {
        Ok(file) => Ok(Config {
            raw: Some(content),
            file,
            path: Some(path),
        }),
        Err(e) => {
            warn!(target: "config", path = %path.display(), error = %e, "config_parse_error_defaults");
            Ok(Config::default())
        }
    }
}

fn expand_home(path: &Path) -> PathBuf {
    match path.strip_prefix("~") {
        Ok(rest) => dirs::home_dir()
            .map(|home| home.join(rest))
            .unwrap_or_else(|| path.to_path_buf()),
        Err(_) => path.to_path_buf(),
    }
}

impl Config {
    /// Dictionary to build the oracle from. An unreadable user dictionary
    /// falls back to the default one with a warning.
    pub fn dictionary_source(&self) -> DictionarySource {
        let Some(raw) = &self.file.dictionary.path else {
            return DictionarySource::Default;
        };
        let path = expand_home(raw);
        match fs::metadata(&path).and_then(|m| {
            if m.is_file() {
                fs::File::open(&path).map(|_| ())
            } else {
                Err(std::io::Error::other("not a regular file"))
            }
        }) {
            Ok(()) => DictionarySource::File(path),
            Err(e) => {
                warn!(
                    target: "config",
                    path = %path.display(),
                    error = %e,
                    "dictionary_unreadable_fallback"
                );
                DictionarySource::Default
            }
        }
    }

    pub fn lazy(&self) -> bool {
        self.file.dictionary.lazy
    }

    pub fn preview_limit(&self) -> PreviewLimit {
        PreviewLimit::resolve(self.file.preview.limit)
    }

    /// Tab width in display cells, never zero.
    pub fn tabstop(&self) -> usize {
        self.file.display.tabstop.max(1)
    }
}
