use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub scroller: ScrollerConfig,
    #[serde(default)]
    pub ui: UiConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Log level
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Directory for log files written while the playground owns the terminal
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            data_dir: default_data_dir(),
        }
    }
}

/// Engine configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScrollerConfig {
    /// Never lock a gesture horizontally; every drag past the slop scrolls the stack
    #[serde(default)]
    pub disable_child_horizontal_scroll: bool,
    #[serde(default)]
    pub overscroll: OverscrollConfig,
    #[serde(default)]
    pub fling: FlingConfig,
    #[serde(default)]
    pub snap: SnapConfig,
    #[serde(default)]
    pub sticky: StickyConfig,
    #[serde(default)]
    pub display: DisplayConfig,
}

/// Elastic over-drag past the top and bottom edges
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OverscrollConfig {
    #[serde(default)]
    pub enabled: bool,
    /// Maximum elastic distance past the top edge, in dp
    #[serde(default = "default_over_drag_dp")]
    pub max_top_dp: u32,
    /// Maximum elastic distance past the bottom edge, in dp
    #[serde(default = "default_over_drag_dp")]
    pub max_bottom_dp: u32,
    /// Damping applied to raw drag distance before the elastic curve
    #[serde(default = "default_drag_rate")]
    pub drag_rate: f32,
    /// Spring-back duration after a drag is released past an edge
    #[serde(default = "default_rebound_duration")]
    pub rebound_duration_ms: u64,
}

impl Default for OverscrollConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            max_top_dp: default_over_drag_dp(),
            max_bottom_dp: default_over_drag_dp(),
            drag_rate: default_drag_rate(),
            rebound_duration_ms: default_rebound_duration(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlingConfig {
    /// Release velocities at or below this magnitude (px/s) do not fling
    #[serde(default = "default_min_velocity")]
    pub min_velocity: i32,
    /// Release velocities are clamped to this magnitude (px/s)
    #[serde(default = "default_max_velocity")]
    pub max_velocity: i32,
    /// Pointer travel (px) before a gesture is locked to an axis
    #[serde(default = "default_touch_slop")]
    pub touch_slop: i32,
    /// Curve sampled by timed smooth scrolls, snap corrections included.
    /// Ballistic flings always follow the quintic spline, so the quintic
    /// default keeps both motions on the same curve.
    #[serde(default)]
    pub interpolator: Interpolator,
}

impl Default for FlingConfig {
    fn default() -> Self {
        Self {
            min_velocity: default_min_velocity(),
            max_velocity: default_max_velocity(),
            touch_slop: default_touch_slop(),
            interpolator: Interpolator::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapConfig {
    /// Virtual offsets the stack settles onto
    #[serde(default)]
    pub points: Vec<i32>,
    /// Settle correction radius, in dp
    #[serde(default = "default_snap_threshold_dp")]
    pub threshold_dp: u32,
    /// Radius used when `threshold_dp` resolves to zero pixels
    #[serde(default = "default_snap_fallback_px")]
    pub fallback_threshold_px: i32,
    /// A fling that is already this close to the last snap point keeps its momentum
    #[serde(default = "default_predictive_close_px")]
    pub predictive_close_threshold_px: i32,
}

impl Default for SnapConfig {
    fn default() -> Self {
        Self {
            points: Vec::new(),
            threshold_dp: default_snap_threshold_dp(),
            fallback_threshold_px: default_snap_fallback_px(),
            predictive_close_threshold_px: default_predictive_close_px(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StickyConfig {
    /// Extra distance between the viewport top and the pin line
    #[serde(default)]
    pub offset: i32,
    /// Keep every pinned region on screen, stacked, instead of handing off
    #[serde(default)]
    pub permanent: bool,
    /// Shrink the bottom region so pinned regions never cover it
    #[serde(default)]
    pub auto_adjust_height_at_bottom: bool,
    /// Added to the reserved height when `auto_adjust_height_at_bottom` is on
    #[serde(default)]
    pub adjust_height_offset: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DisplayConfig {
    /// Pixels per density-independent pixel
    #[serde(default = "default_density")]
    pub density: f32,
    /// Physical screen height; 0 means "use the viewport height"
    #[serde(default)]
    pub screen_height_px: i32,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            density: default_density(),
            screen_height_px: 0,
        }
    }
}

impl DisplayConfig {
    pub fn dp_to_px(&self, dp: f32) -> i32 {
        (dp * self.effective_density() + 0.5) as i32
    }

    pub fn px_to_dp(&self, px: i32) -> f32 {
        px as f32 / self.effective_density()
    }

    fn effective_density(&self) -> f32 {
        if self.density > 0.0 {
            self.density
        } else {
            1.0
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UiConfig {
    /// Playground frame rate
    #[serde(default = "default_frame_rate")]
    pub frame_rate_fps: u32,
    /// Engine pixels represented by one terminal row
    #[serde(default = "default_px_per_row")]
    pub px_per_row: i32,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            frame_rate_fps: default_frame_rate(),
            px_per_row: default_px_per_row(),
        }
    }
}

/// Interpolation curve for engine-driven motion
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Interpolator {
    /// Constant speed
    Linear,
    /// f(t) = (t-1)^5 + 1
    #[default]
    Quintic,
    /// Fast start, long viscous tail; used for spring-back
    ViscousFluid,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("consecutive")
}

fn default_over_drag_dp() -> u32 {
    180
}

fn default_drag_rate() -> f32 {
    0.5
}

fn default_rebound_duration() -> u64 {
    300
}

fn default_min_velocity() -> i32 {
    50
}

fn default_max_velocity() -> i32 {
    8000
}

fn default_touch_slop() -> i32 {
    8
}

fn default_snap_threshold_dp() -> u32 {
    60
}

fn default_snap_fallback_px() -> i32 {
    150
}

fn default_predictive_close_px() -> i32 {
    50
}

fn default_density() -> f32 {
    1.0
}

fn default_frame_rate() -> u32 {
    60
}

fn default_px_per_row() -> i32 {
    16
}

/// Expand tilde (~) in path to user's home directory
fn expand_tilde(path: &Path) -> PathBuf {
    if let Some(path_str) = path.to_str() {
        if let Some(stripped) = path_str.strip_prefix("~/") {
            if let Some(home) = dirs::home_dir() {
                return home.join(stripped);
            }
        } else if path_str == "~" {
            if let Some(home) = dirs::home_dir() {
                return home;
            }
        }
    }
    path.to_path_buf()
}

impl AppConfig {
    /// Load configuration from the default path or return defaults
    pub fn load() -> crate::Result<Self> {
        let config_path = Self::config_path();

        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load configuration from an explicit file
    pub fn load_from(path: &Path) -> crate::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> crate::Result<Self> {
        toml::from_str(content).map_err(|e| crate::Error::Config(e.to_string()))
    }

    /// Save configuration to `path`, creating its directory
    pub fn save_to(&self, path: &Path) -> crate::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = self.to_toml()?;
        std::fs::write(path, content)?;

        Ok(())
    }

    pub fn to_toml(&self) -> crate::Result<String> {
        toml::to_string_pretty(self).map_err(|e| crate::Error::Config(e.to_string()))
    }

    /// Get the configuration file path
    /// Always uses ~/.config/consecutive/config.toml on all platforms
    pub fn config_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".config")
            .join("consecutive")
            .join("config.toml")
    }

    /// Get the data directory (with tilde expansion)
    pub fn data_dir(&self) -> PathBuf {
        expand_tilde(&self.general.data_dir)
    }

    /// Get the playground log file path
    pub fn log_path(&self) -> PathBuf {
        self.data_dir().join("consecutive.log")
    }
}
