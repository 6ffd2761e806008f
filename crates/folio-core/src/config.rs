// crates/folio-core/src/config.rs
//
// Runtime configuration. Every field has a default so an empty JSON object
// (or no config file at all) yields the stock showcase timings.
//
// Delays are stored as milliseconds in the file and exposed as `Duration`
// through the accessor methods.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::helpers::time::millis;
use crate::media_types::{Hero, MediaSource, Project, Track};

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FolioConfig {
    /// Directory that relative asset URLs resolve against.
    pub asset_root:   Option<PathBuf>,
    pub hero:         Hero,
    pub media:        MediaConfig,
    pub intersection: IntersectionConfig,
    pub selection:    SelectionConfig,
    pub preload:      PreloadConfig,
    pub splash:       SplashConfig,
    pub music:        MusicConfig,
    pub projects:     Vec<Project>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MediaConfig {
    /// Upper bound on Loading before the element is force-promoted to Ready.
    pub load_timeout_ms: u64,
    /// Delay between a successful muted play and the unmute-and-resume step.
    pub unmute_delay_ms: u64,
    /// Defer loading until the element has been on screen once.
    pub lazy:            bool,
}

impl Default for MediaConfig {
    fn default() -> Self {
        Self { load_timeout_ms: 10_000, unmute_delay_ms: 100, lazy: true }
    }
}

impl MediaConfig {
    pub fn load_timeout(&self) -> Duration { millis(self.load_timeout_ms) }
    pub fn unmute_delay(&self) -> Duration { millis(self.unmute_delay_ms) }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IntersectionConfig {
    /// Pixels around the viewport that already count as visible.
    pub root_margin_px: f32,
    /// Minimum visible fraction of the target, in `[0, 1]`.
    pub threshold:      f32,
}

impl Default for IntersectionConfig {
    fn default() -> Self {
        Self { root_margin_px: 50.0, threshold: 0.1 }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectionConfig {
    /// Debounce window between hover-leave and clearing the selection.
    pub close_delay_ms:       u64,
    /// Viewport widths below this use tap-to-open instead of hover.
    pub mobile_breakpoint_px: f32,
}

impl Default for SelectionConfig {
    fn default() -> Self {
        Self { close_delay_ms: 200, mobile_breakpoint_px: 768.0 }
    }
}

impl SelectionConfig {
    pub fn close_delay(&self) -> Duration { millis(self.close_delay_ms) }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PreloadMode {
    /// One URL at a time; progress advances deterministically.
    #[default]
    Sequential,
    /// Each pass fetches all of its URLs concurrently.
    Parallel,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PreloadConfig {
    pub urls:        Vec<String>,
    pub max_retries: u32,
    pub backoff_ms:  u64,
    pub mode:        PreloadMode,
}

impl Default for PreloadConfig {
    fn default() -> Self {
        Self {
            urls:        Vec::new(),
            max_retries: 3,
            backoff_ms:  1_000,
            mode:        PreloadMode::Sequential,
        }
    }
}

impl PreloadConfig {
    pub fn backoff(&self) -> Duration { millis(self.backoff_ms) }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SplashConfig {
    pub min_display_ms: u64,
    /// Pause at 100 % before the splash hands over to the main view.
    pub fade_ms:        u64,
}

impl Default for SplashConfig {
    fn default() -> Self {
        Self { min_display_ms: 2_500, fade_ms: 500 }
    }
}

impl SplashConfig {
    pub fn min_display(&self) -> Duration { millis(self.min_display_ms) }
    pub fn fade(&self)        -> Duration { millis(self.fade_ms) }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MusicConfig {
    pub tracks:               Vec<Track>,
    pub autoplay:             bool,
    pub volume:               f32,
    pub inactivity_ms:        u64,
    pub inactivity_check_ms:  u64,
}

impl Default for MusicConfig {
    fn default() -> Self {
        Self {
            tracks:              Vec::new(),
            autoplay:            true,
            volume:              0.5,
            inactivity_ms:       180_000,
            inactivity_check_ms: 30_000,
        }
    }
}

impl MusicConfig {
    pub fn inactivity(&self)       -> Duration { millis(self.inactivity_ms) }
    pub fn inactivity_check(&self) -> Duration { millis(self.inactivity_check_ms) }
}

impl FolioConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        let mut cfg = Self::from_json_str(&text)?;
        // Relative asset roots are relative to the config file, not the cwd.
        if let (Some(root), Some(dir)) = (cfg.asset_root.as_ref(), path.parent()) {
            if root.is_relative() {
                cfg.asset_root = Some(dir.join(root));
            }
        }
        Ok(cfg)
    }

    pub fn from_json_str(text: &str) -> Result<Self, ConfigError> {
        let cfg: Self = serde_json::from_str(text)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let t = self.intersection.threshold;
        if !(0.0..=1.0).contains(&t) {
            return Err(ConfigError::Invalid(format!(
                "intersection.threshold must be within [0, 1], got {t}"
            )));
        }
        let mut seen = HashSet::new();
        for url in &self.preload.urls {
            if !seen.insert(url.as_str()) {
                return Err(ConfigError::Invalid(format!("duplicate preload url {url}")));
            }
        }
        Ok(())
    }

    /// Preview sources for the project list, in list order.
    pub fn project_sources(&self) -> Vec<MediaSource> {
        self.projects.iter().map(|p| p.video.clone()).collect()
    }
}
