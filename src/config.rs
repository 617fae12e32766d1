/// External configuration loader.
///
/// Reads `config.toml` from the executable's directory, the CWD, or the
/// shared data dirs. Every key is optional; missing sections and keys fall
/// back to the built-in defaults.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{CardError, Result};

const APP_DIR: &str = "valentine";
const FILE_NAME: &str = "config.toml";

// ── Public Config Struct ──

#[derive(Clone, Debug)]
pub struct CardConfig {
    pub recipient: String,
    /// Fixed seed for reproducible runs; entropy when absent.
    pub seed: Option<u64>,
    pub timing: TimingConfig,
    pub display: DisplayConfig,
    pub gamepad: GamepadConfig,
    pub log: LogConfig,
}

#[derive(Clone, Debug, PartialEq)]
pub struct TimingConfig {
    pub tick_rate: Duration,
    pub auto_accept: Duration,
    pub heart_interval: Duration,
    pub drizzle_interval: Duration,
}

#[derive(Clone, Debug, PartialEq)]
pub struct DisplayConfig {
    pub cell_width_px: u16,
    pub cell_height_px: u16,
    pub max_confetti: usize,
}

#[derive(Clone, Debug, PartialEq)]
pub struct GamepadConfig {
    pub accept: Vec<String>,
    pub reject: Vec<String>,
    pub confirm: Vec<String>,
    pub cancel: Vec<String>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct LogConfig {
    pub enabled: bool,
    pub level: String,
    pub file: PathBuf,
}

// ── TOML Schema (with serde defaults) ──

#[derive(Deserialize, Debug, Default)]
struct TomlConfig {
    #[serde(default)]
    card: TomlCard,
    #[serde(default)]
    timing: TomlTiming,
    #[serde(default)]
    display: TomlDisplay,
    #[serde(default)]
    gamepad: TomlGamepad,
    #[serde(default)]
    log: TomlLog,
}

#[derive(Deserialize, Debug)]
struct TomlCard {
    #[serde(default = "default_recipient")]
    recipient: String,
    #[serde(default)]
    seed: Option<u64>,
}

#[derive(Deserialize, Debug)]
struct TomlTiming {
    #[serde(default = "default_tick_rate")]
    tick_rate_ms: u64,
    #[serde(default = "default_auto_accept")]
    auto_accept_ms: u64,
    #[serde(default = "default_heart_interval")]
    heart_interval_ms: u64,
    #[serde(default = "default_drizzle_interval")]
    drizzle_interval_ms: u64,
}

#[derive(Deserialize, Debug)]
struct TomlDisplay {
    #[serde(default = "default_cell_width")]
    cell_width_px: u16,
    #[serde(default = "default_cell_height")]
    cell_height_px: u16,
    #[serde(default = "default_max_confetti")]
    max_confetti: usize,
}

#[derive(Deserialize, Debug)]
struct TomlGamepad {
    #[serde(default = "default_accept")]
    accept: Vec<String>,
    #[serde(default = "default_reject")]
    reject: Vec<String>,
    #[serde(default = "default_confirm")]
    confirm: Vec<String>,
    #[serde(default = "default_cancel")]
    cancel: Vec<String>,
}

#[derive(Deserialize, Debug)]
struct TomlLog {
    #[serde(default = "default_log_enabled")]
    enabled: bool,
    #[serde(default = "default_log_level")]
    level: String,
    #[serde(default = "default_log_file")]
    file: String,
}

// ── Defaults ──

fn default_recipient() -> String { "Verneise Seah".into() }
fn default_tick_rate() -> u64 { 33 }
fn default_auto_accept() -> u64 { 1500 }
fn default_heart_interval() -> u64 { 600 }
fn default_drizzle_interval() -> u64 { 2000 }
fn default_cell_width() -> u16 { 8 }
fn default_cell_height() -> u16 { 16 }
fn default_max_confetti() -> usize { crate::sim::confetti::DEFAULT_CAP }
fn default_accept() -> Vec<String> { vec!["A".into()] }
fn default_reject() -> Vec<String> { vec!["B".into()] }
fn default_confirm() -> Vec<String> { vec!["Start".into()] }
fn default_cancel() -> Vec<String> { vec!["Select".into()] }
fn default_log_enabled() -> bool { true }
fn default_log_level() -> String { "info".into() }
fn default_log_file() -> String { "valentine.log".into() }

impl Default for TomlCard {
    fn default() -> Self {
        TomlCard { recipient: default_recipient(), seed: None }
    }
}

impl Default for TomlTiming {
    fn default() -> Self {
        TomlTiming {
            tick_rate_ms: default_tick_rate(),
            auto_accept_ms: default_auto_accept(),
            heart_interval_ms: default_heart_interval(),
            drizzle_interval_ms: default_drizzle_interval(),
        }
    }
}

impl Default for TomlDisplay {
    fn default() -> Self {
        TomlDisplay {
            cell_width_px: default_cell_width(),
            cell_height_px: default_cell_height(),
            max_confetti: default_max_confetti(),
        }
    }
}

impl Default for TomlGamepad {
    fn default() -> Self {
        TomlGamepad {
            accept: default_accept(),
            reject: default_reject(),
            confirm: default_confirm(),
            cancel: default_cancel(),
        }
    }
}

impl Default for TomlLog {
    fn default() -> Self {
        TomlLog {
            enabled: default_log_enabled(),
            level: default_log_level(),
            file: default_log_file(),
        }
    }
}

impl Default for TimingConfig {
    fn default() -> Self {
        TomlTiming::default().into()
    }
}

impl Default for CardConfig {
    fn default() -> Self {
        TomlConfig::default().into()
    }
}

impl From<TomlTiming> for TimingConfig {
    fn from(t: TomlTiming) -> Self {
        TimingConfig {
            // Zero would spin the loop.
            tick_rate: Duration::from_millis(t.tick_rate_ms.max(1)),
            auto_accept: Duration::from_millis(t.auto_accept_ms),
            heart_interval: Duration::from_millis(t.heart_interval_ms),
            drizzle_interval: Duration::from_millis(t.drizzle_interval_ms),
        }
    }
}

impl From<TomlConfig> for CardConfig {
    fn from(t: TomlConfig) -> Self {
        CardConfig {
            recipient: t.card.recipient,
            seed: t.card.seed,
            timing: t.timing.into(),
            display: DisplayConfig {
                cell_width_px: t.display.cell_width_px.max(1),
                cell_height_px: t.display.cell_height_px.max(1),
                max_confetti: t.display.max_confetti,
            },
            gamepad: GamepadConfig {
                accept: t.gamepad.accept,
                reject: t.gamepad.reject,
                confirm: t.gamepad.confirm,
                cancel: t.gamepad.cancel,
            },
            log: LogConfig {
                enabled: t.log.enabled,
                level: t.log.level,
                file: PathBuf::from(t.log.file),
            },
        }
    }
}

// ── Loading ──

impl CardConfig {
    /// Load the first `config.toml` found in the candidate directories.
    /// No file at all is not an error; an unreadable or malformed one is.
    pub fn load() -> Result<Self> {
        match find_config(&candidate_dirs()) {
            Some(path) => Self::from_file(&path),
            None => Ok(Self::default()),
        }
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|source| CardError::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text).map_err(|source| CardError::ConfigParse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn from_toml_str(text: &str) -> std::result::Result<Self, toml::de::Error> {
        toml::from_str::<TomlConfig>(text).map(Into::into)
    }
}

/// Candidate directories to search: exe dir + CWD + data dirs (deduplicated).
fn candidate_dirs() -> Vec<PathBuf> {
    let mut dirs: Vec<PathBuf> = vec![];

    if let Ok(exe) = std::env::current_exe() {
        // Follow symlinks so an installed link still finds its config.
        let resolved = exe.canonicalize().unwrap_or(exe);
        if let Some(parent) = resolved.parent() {
            dirs.push(parent.to_path_buf());
        }
    }

    if let Ok(cwd) = std::env::current_dir() {
        if !dirs.contains(&cwd) {
            dirs.push(cwd);
        }
    }

    if let Ok(home) = std::env::var("HOME") {
        let xdg = PathBuf::from(home).join(".local/share").join(APP_DIR);
        if xdg.is_dir() && !dirs.contains(&xdg) {
            dirs.push(xdg);
        }
    }

    let sys = PathBuf::from("/usr/share").join(APP_DIR);
    if sys.is_dir() && !dirs.contains(&sys) {
        dirs.push(sys);
    }

    if dirs.is_empty() {
        dirs.push(PathBuf::from("."));
    }

    dirs
}

fn find_config(search_dirs: &[PathBuf]) -> Option<PathBuf> {
    search_dirs.iter()
        .map(|d| d.join(FILE_NAME))
        .find(|p| p.is_file())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_gives_defaults() {
        let cfg = CardConfig::from_toml_str("").unwrap();
        assert_eq!(cfg.recipient, "Verneise Seah");
        assert_eq!(cfg.seed, None);
        assert_eq!(cfg.timing, TimingConfig::default());
        assert_eq!(cfg.timing.auto_accept, Duration::from_millis(1500));
        assert_eq!(cfg.timing.heart_interval, Duration::from_millis(600));
        assert_eq!(cfg.timing.drizzle_interval, Duration::from_secs(2));
        assert_eq!(cfg.display.cell_width_px, 8);
        assert_eq!(cfg.display.max_confetti, 600);
        assert_eq!(cfg.gamepad.accept, vec!["A".to_string()]);
        assert!(cfg.log.enabled);
        assert_eq!(cfg.log.file, PathBuf::from("valentine.log"));
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let cfg = CardConfig::from_toml_str(
            r#"
            [card]
            seed = 7

            [timing]
            auto_accept_ms = 3000

            [log]
            level = "debug"
            "#,
        )
        .unwrap();
        assert_eq!(cfg.seed, Some(7));
        assert_eq!(cfg.recipient, "Verneise Seah");
        assert_eq!(cfg.timing.auto_accept, Duration::from_secs(3));
        assert_eq!(cfg.timing.tick_rate, Duration::from_millis(33));
        assert_eq!(cfg.log.level, "debug");
        assert!(cfg.log.enabled);
    }

    #[test]
    fn degenerate_numbers_are_clamped() {
        let cfg = CardConfig::from_toml_str(
            "[timing]\ntick_rate_ms = 0\n[display]\ncell_width_px = 0\n",
        )
        .unwrap();
        assert_eq!(cfg.timing.tick_rate, Duration::from_millis(1));
        assert_eq!(cfg.display.cell_width_px, 1);
    }

    #[test]
    fn malformed_toml_is_an_error() {
        assert!(CardConfig::from_toml_str("[timing\nauto_accept_ms = 1").is_err());
        assert!(CardConfig::from_toml_str("[timing]\nauto_accept_ms = \"soon\"").is_err());
    }

    #[test]
    fn missing_file_reports_read_error() {
        let err = CardConfig::from_file(Path::new("/nonexistent/valentine/config.toml")).unwrap_err();
        assert!(matches!(err, CardError::ConfigRead { .. }));
    }
}
