use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::error::ConfigError;
use crate::notify::NotifyMode;
use crate::sync::validator::PositionLimits;

// ---------------------------------------------------------------------------
// Session configuration
// ---------------------------------------------------------------------------

/// Viewer configuration, read from a TOML file.
///
/// ```toml
/// marker_name = "RKNE"
/// csv_file_path = "capture.csv"
/// use_babylon = true
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Marker shown in the time-series view and highlighted in 3D.
    pub marker_name: String,
    /// Recording to load at startup (CSV or Parquet).
    pub csv_file_path: PathBuf,
    /// Forward the inspected frame to the external render engine.
    #[serde(default)]
    pub use_babylon: bool,

    #[serde(default = "default_skip_rows")]
    pub skip_rows: usize,
    #[serde(default = "default_frame_column")]
    pub frame_column: String,
    /// Header substring shared by every all-marker position column.
    #[serde(default = "default_marker_group_prefix")]
    pub marker_group_prefix: String,

    #[serde(default = "default_endpoint")]
    pub babylon_endpoint: String,
    #[serde(default)]
    pub notify_mode: NotifyMode,
    #[serde(default = "default_throttle_ms")]
    pub throttle_ms: u64,
    #[serde(default = "default_notify_timeout_ms")]
    pub notify_timeout_ms: u64,

    #[serde(default = "default_plausible_range")]
    pub plausible_range: [f64; 2],
    #[serde(default = "default_extreme_range")]
    pub extreme_range: [f64; 2],
}

fn default_skip_rows() -> usize {
    1
}

fn default_frame_column() -> String {
    "Frame".to_string()
}

fn default_marker_group_prefix() -> String {
    "<T-".to_string()
}

fn default_endpoint() -> String {
    "http://127.0.0.1:5000/send-frame".to_string()
}

fn default_throttle_ms() -> u64 {
    100
}

/// Latency budget of one interactive update; a notification may not use it up.
pub const UPDATE_BUDGET_MS: u64 = 100;

fn default_notify_timeout_ms() -> u64 {
    50
}

fn default_plausible_range() -> [f64; 2] {
    [-1000.0, 10000.0]
}

fn default_extreme_range() -> [f64; 2] {
    [-1e5, 1e5]
}

impl Config {
    /// Read and validate a TOML config file.
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml(&text)
    }

    pub fn from_toml(text: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.marker_name.trim().is_empty() {
            return Err(ConfigError::Invalid("marker_name is empty".into()));
        }
        if self.frame_column.trim().is_empty() {
            return Err(ConfigError::Invalid("frame_column is empty".into()));
        }
        if self.marker_group_prefix.is_empty() {
            return Err(ConfigError::Invalid("marker_group_prefix is empty".into()));
        }
        if self.notify_timeout_ms >= UPDATE_BUDGET_MS {
            return Err(ConfigError::Invalid(format!(
                "notify_timeout_ms must be below {UPDATE_BUDGET_MS}, got {}",
                self.notify_timeout_ms
            )));
        }
        if self.notify_timeout_ms >= self.throttle_ms {
            return Err(ConfigError::Invalid(format!(
                "notify_timeout_ms ({}) must be below throttle_ms ({})",
                self.notify_timeout_ms, self.throttle_ms
            )));
        }
        for (name, [lo, hi]) in [
            ("plausible_range", self.plausible_range),
            ("extreme_range", self.extreme_range),
        ] {
            if !(lo.is_finite() && hi.is_finite() && lo <= hi) {
                return Err(ConfigError::Invalid(format!(
                    "{name} must be two finite values with min <= max, got [{lo}, {hi}]"
                )));
            }
        }
        Ok(())
    }

    pub fn limits(&self) -> PositionLimits {
        PositionLimits {
            plausible: (self.plausible_range[0], self.plausible_range[1]),
            extreme: (self.extreme_range[0], self.extreme_range[1]),
        }
    }

    pub fn throttle_interval(&self) -> Duration {
        Duration::from_millis(self.throttle_ms)
    }

    pub fn notify_timeout(&self) -> Duration {
        Duration::from_millis(self.notify_timeout_ms)
    }

    /// Options the loader needs, detached from the rest of the config.
    pub fn load_options(&self) -> crate::data::loader::LoadOptions {
        crate::data::loader::LoadOptions {
            marker_name: self.marker_name.clone(),
            frame_column: self.frame_column.clone(),
            marker_group_prefix: self.marker_group_prefix.clone(),
            skip_rows: self.skip_rows,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minimal_config_uses_defaults() {
        let cfg = Config::from_toml(
            r#"
            marker_name = "M"
            csv_file_path = "data.csv"
            use_babylon = true
            "#,
        )
        .unwrap();
        assert_eq!(cfg.marker_name, "M");
        assert!(cfg.use_babylon);
        assert_eq!(cfg.skip_rows, 1);
        assert_eq!(cfg.frame_column, "Frame");
        assert_eq!(cfg.marker_group_prefix, "<T-");
        assert_eq!(cfg.notify_mode, NotifyMode::Percentage);
        assert_eq!(cfg.throttle_interval(), Duration::from_millis(100));
        assert_eq!(cfg.notify_timeout(), Duration::from_millis(50));
        assert_eq!(cfg.limits(), PositionLimits::default());
    }

    #[test]
    fn use_babylon_defaults_to_false() {
        let cfg = Config::from_toml("marker_name = \"M\"\ncsv_file_path = \"a.csv\"\n").unwrap();
        assert!(!cfg.use_babylon);
    }

    #[test]
    fn missing_marker_name_is_rejected() {
        let err = Config::from_toml("csv_file_path = \"a.csv\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn inverted_range_is_rejected() {
        let err = Config::from_toml(
            "marker_name = \"M\"\ncsv_file_path = \"a.csv\"\nplausible_range = [5.0, -5.0]\n",
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn notify_timeout_must_fit_the_update_budget() {
        let base = "marker_name = \"M\"\ncsv_file_path = \"a.csv\"\n";
        let err = Config::from_toml(&format!("{base}notify_timeout_ms = 100\n")).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(msg) if msg.contains("below 100")));

        let err = Config::from_toml(&format!("{base}notify_timeout_ms = 250\nthrottle_ms = 500\n"))
            .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));

        let err = Config::from_toml(&format!("{base}notify_timeout_ms = 60\nthrottle_ms = 40\n"))
            .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(msg) if msg.contains("throttle_ms")));

        let cfg = Config::from_toml(&format!("{base}notify_timeout_ms = 80\n")).unwrap();
        assert_eq!(cfg.notify_timeout(), Duration::from_millis(80));
    }

    #[test]
    fn frame_mode_is_parsed() {
        let cfg = Config::from_toml(
            "marker_name = \"M\"\ncsv_file_path = \"a.csv\"\nnotify_mode = \"frame\"\n",
        )
        .unwrap();
        assert_eq!(cfg.notify_mode, NotifyMode::Frame);
    }
}
