use clap::ValueEnum;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_MIN_PRESS_DURATION_MS: u64 = 10;
pub const DEFAULT_WINDOW_SIZE: usize = 10;
pub const BACKGROUND_MAX: u8 = 100;

/// Named parameter sets for the two layouts the tool ships with
#[derive(
    Debug,
    Copy,
    Clone,
    PartialEq,
    Eq,
    Default,
    Serialize,
    Deserialize,
    ValueEnum,
    strum_macros::Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Preset {
    /// max tap/gap tracking and the event log panel
    #[default]
    Full,
    /// plain statistics, slower background fade, smaller control strip
    Lite,
}

/// Parameters of the tap engine
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EngineConfig {
    /// presses shorter than this are treated as noise
    pub min_press_duration_ms: u64,
    /// background level change per frame
    pub background_step: u8,
    /// share of the viewport height reserved for controls at the bottom
    pub reserved_ui_height_fraction: f64,
    /// number of recent taps plotted
    pub window_size: usize,
    /// keep running max tap time / max gap
    pub track_extrema: bool,
    /// whether the event log panel exists at all
    pub log_panel: bool,
}

impl EngineConfig {
    pub fn preset(preset: Preset) -> Self {
        match preset {
            Preset::Full => Self {
                min_press_duration_ms: DEFAULT_MIN_PRESS_DURATION_MS,
                background_step: 10,
                reserved_ui_height_fraction: 0.12,
                window_size: DEFAULT_WINDOW_SIZE,
                track_extrema: true,
                log_panel: true,
            },
            Preset::Lite => Self {
                min_press_duration_ms: DEFAULT_MIN_PRESS_DURATION_MS,
                background_step: 5,
                reserved_ui_height_fraction: 0.10,
                window_size: DEFAULT_WINDOW_SIZE,
                track_extrema: false,
                log_panel: false,
            },
        }
    }

    /// Clamp values into ranges the engine can work with
    pub fn sanitized(mut self) -> Self {
        self.background_step = self.background_step.clamp(1, BACKGROUND_MAX);
        if !self.reserved_ui_height_fraction.is_finite() {
            self.reserved_ui_height_fraction = 0.0;
        }
        self.reserved_ui_height_fraction = self.reserved_ui_height_fraction.clamp(0.0, 0.9);
        self.window_size = self.window_size.max(1);
        self
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::preset(Preset::default())
    }
}

/// User preferences persisted between runs. Unset fields fall back to the preset.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub preset: Option<Preset>,
    pub min_press_ms: Option<u64>,
    pub background_step: Option<u8>,
    pub reserved_ui_fraction: Option<f64>,
    pub window_size: Option<usize>,
    pub log_panel: Option<bool>,
    pub export_dir: Option<PathBuf>,
}

impl Config {
    /// Layer `overrides` on top of `self`; set fields in `overrides` win
    pub fn overlay(self, overrides: Config) -> Config {
        Config {
            preset: overrides.preset.or(self.preset),
            min_press_ms: overrides.min_press_ms.or(self.min_press_ms),
            background_step: overrides.background_step.or(self.background_step),
            reserved_ui_fraction: overrides.reserved_ui_fraction.or(self.reserved_ui_fraction),
            window_size: overrides.window_size.or(self.window_size),
            log_panel: overrides.log_panel.or(self.log_panel),
            export_dir: overrides.export_dir.or(self.export_dir),
        }
    }

    pub fn engine(&self) -> EngineConfig {
        let mut engine = EngineConfig::preset(self.preset.unwrap_or_default());
        if let Some(ms) = self.min_press_ms {
            engine.min_press_duration_ms = ms;
        }
        if let Some(step) = self.background_step {
            engine.background_step = step;
        }
        if let Some(fraction) = self.reserved_ui_fraction {
            engine.reserved_ui_height_fraction = fraction;
        }
        if let Some(size) = self.window_size {
            engine.window_size = size;
        }
        // the lite layout has no log panel to switch on
        if engine.log_panel {
            engine.log_panel = self.log_panel.unwrap_or(true);
        }
        engine.sanitized()
    }
}

pub trait ConfigStore {
    fn load(&self) -> Config;
    fn save(&self, cfg: &Config) -> std::io::Result<()>;
}

#[derive(Debug, Clone)]
pub struct FileConfigStore {
    path: PathBuf,
}

impl FileConfigStore {
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        let path = if let Some(pd) = ProjectDirs::from("", "", "taptime") {
            pd.config_dir().join("config.json")
        } else {
            PathBuf::from("taptime_config.json")
        };
        Self { path }
    }

    pub fn with_path<P: AsRef<Path>>(p: P) -> Self {
        Self {
            path: p.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Default for FileConfigStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigStore for FileConfigStore {
    fn load(&self) -> Config {
        if let Ok(bytes) = fs::read(&self.path) {
            match serde_json::from_slice::<Config>(&bytes) {
                Ok(cfg) => return cfg,
                Err(e) => {
                    tracing::warn!(path = %self.path.display(), error = %e, "ignoring unreadable config")
                }
            }
        }
        Config::default()
    }

    fn save(&self, cfg: &Config) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_vec_pretty(cfg)?;
        fs::write(&self.path, data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn roundtrip_default_config() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        let store = FileConfigStore::with_path(&path);
        let cfg = Config::default();
        store.save(&cfg).unwrap();
        let loaded = store.load();
        assert_eq!(cfg, loaded);
    }

    #[test]
    fn save_and_load_custom_config() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");
        let store = FileConfigStore::with_path(&path);
        let cfg = Config {
            preset: Some(Preset::Lite),
            min_press_ms: Some(25),
            background_step: Some(20),
            reserved_ui_fraction: Some(0.2),
            window_size: Some(5),
            log_panel: Some(false),
            export_dir: Some(PathBuf::from("/tmp/taps")),
        };
        store.save(&cfg).unwrap();
        assert_eq!(store.load(), cfg);
    }

    #[test]
    fn corrupt_file_falls_back_to_default() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, b"{ not json").unwrap();
        let store = FileConfigStore::with_path(&path);
        assert_eq!(store.load(), Config::default());
    }

    #[test]
    fn missing_file_falls_back_to_default() {
        let dir = tempdir().unwrap();
        let store = FileConfigStore::with_path(dir.path().join("absent.json"));
        assert_eq!(store.load(), Config::default());
    }

    #[test]
    fn presets_differ_in_thresholds_and_features() {
        let full = EngineConfig::preset(Preset::Full);
        let lite = EngineConfig::preset(Preset::Lite);
        assert_eq!(full.min_press_duration_ms, 10);
        assert_eq!(full.window_size, 10);
        assert!(full.track_extrema);
        assert!(!lite.track_extrema);
        assert!(!lite.log_panel);
        assert_ne!(full.background_step, lite.background_step);
    }

    #[test]
    fn overlay_prefers_overrides() {
        let file = Config {
            preset: Some(Preset::Lite),
            window_size: Some(4),
            ..Config::default()
        };
        let cli = Config {
            window_size: Some(8),
            min_press_ms: Some(30),
            ..Config::default()
        };
        let merged = file.overlay(cli);
        assert_eq!(merged.preset, Some(Preset::Lite));
        assert_eq!(merged.window_size, Some(8));
        assert_eq!(merged.min_press_ms, Some(30));
    }

    #[test]
    fn engine_applies_overrides_and_sanitizes() {
        let cfg = Config {
            background_step: Some(0),
            reserved_ui_fraction: Some(3.0),
            window_size: Some(0),
            ..Config::default()
        };
        let engine = cfg.engine();
        assert_eq!(engine.background_step, 1);
        assert_eq!(engine.reserved_ui_height_fraction, 0.9);
        assert_eq!(engine.window_size, 1);
    }

    #[test]
    fn lite_preset_cannot_enable_log_panel() {
        let cfg = Config {
            preset: Some(Preset::Lite),
            log_panel: Some(true),
            ..Config::default()
        };
        assert!(!cfg.engine().log_panel);

        let cfg = Config {
            log_panel: Some(false),
            ..Config::default()
        };
        assert!(!cfg.engine().log_panel);
    }

    #[test]
    fn preset_display_is_lowercase() {
        assert_eq!(Preset::Full.to_string(), "full");
        assert_eq!(Preset::Lite.to_string(), "lite");
    }
}
