//! Configuration loading and parsing.
//!
//! Parses `gridwalk.toml` (or an override path supplied by the binary via
//! `--config`), extracting the per-tick render delay and the Turtle
//! display's output directory. Both fields default when absent, and a
//! missing or malformed file falls back to [`Config::default`] entirely
//! rather than failing the run — configuration is a rendering nicety, not
//! something a program's correctness should depend on.

use anyhow::Result;
use serde::Deserialize;
use std::{fs, path::PathBuf};
use tracing::{info, warn};

#[derive(Debug, Deserialize, Clone)]
pub struct DisplaySection {
    #[serde(default = "DisplaySection::default_tick_delay_ms")]
    pub tick_delay_ms: u64,
    #[serde(default = "DisplaySection::default_turtle_output_dir")]
    pub turtle_output_dir: String,
}

impl Default for DisplaySection {
    fn default() -> Self {
        Self {
            tick_delay_ms: Self::default_tick_delay_ms(),
            turtle_output_dir: Self::default_turtle_output_dir(),
        }
    }
}

impl DisplaySection {
    const fn default_tick_delay_ms() -> u64 {
        0
    }

    fn default_turtle_output_dir() -> String {
        "turtle-frames".to_string()
    }
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct ConfigFile {
    #[serde(default)]
    pub display: DisplaySection,
}

#[derive(Debug, Clone, Default)]
pub struct Config {
    /// The original file contents, kept around for diagnostics; `None` when
    /// no file was found and defaults were used outright.
    pub raw: Option<String>,
    pub file: ConfigFile,
}

impl Config {
    pub fn tick_delay(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.file.display.tick_delay_ms)
    }

    pub fn turtle_output_dir(&self) -> &str {
        &self.file.display.turtle_output_dir
    }
}

/// Best-effort config path following platform conventions: a `gridwalk.toml`
/// in the working directory takes priority, then the platform config dir.
pub fn discover() -> PathBuf {
    let local = PathBuf::from("gridwalk.toml");
    if local.exists() {
        return local;
    }
    if let Some(dir) = dirs::config_dir() {
        return dir.join("gridwalk").join("gridwalk.toml");
    }
    PathBuf::from("gridwalk.toml")
}

pub fn load_from(path: Option<PathBuf>) -> Result<Config> {
    let path = path.unwrap_or_else(discover);
    let Ok(content) = fs::read_to_string(&path) else {
        return Ok(Config::default());
    };
    match toml::from_str::<ConfigFile>(&content) {
        Ok(file) => {
            info!(path = %path.display(), "loaded config");
            Ok(Config {
                raw: Some(content),
                file,
            })
        }
        Err(e) => {
            warn!(path = %path.display(), error = %e, "failed to parse config, using defaults");
            Ok(Config::default())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn default_config_when_missing_file() {
        let cfg = load_from(Some(PathBuf::from("__nonexistent_hopefully__.toml"))).unwrap();
        assert_eq!(cfg.file.display.tick_delay_ms, 0);
        assert_eq!(cfg.file.display.turtle_output_dir, "turtle-frames");
        assert!(cfg.raw.is_none());
    }

    #[test]
    fn parses_display_section() {
        let tmp = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(
            tmp.path(),
            "[display]\ntick_delay_ms = 50\nturtle_output_dir = \"frames\"\n",
        )
        .unwrap();
        let cfg = load_from(Some(tmp.path().to_path_buf())).unwrap();
        assert_eq!(cfg.file.display.tick_delay_ms, 50);
        assert_eq!(cfg.file.display.turtle_output_dir, "frames");
        assert_eq!(cfg.tick_delay(), std::time::Duration::from_millis(50));
    }

    #[test]
    fn malformed_file_falls_back_to_defaults() {
        let tmp = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(tmp.path(), "this is not valid toml [[[").unwrap();
        let cfg = load_from(Some(tmp.path().to_path_buf())).unwrap();
        assert_eq!(cfg.file.display.tick_delay_ms, 0);
    }

    #[test]
    fn partial_file_fills_in_missing_fields() {
        let tmp = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(tmp.path(), "[display]\ntick_delay_ms = 10\n").unwrap();
        let cfg = load_from(Some(tmp.path().to_path_buf())).unwrap();
        assert_eq!(cfg.file.display.tick_delay_ms, 10);
        assert_eq!(cfg.file.display.turtle_output_dir, "turtle-frames");
    }
}
