// SPDX-License-Identifier: GPL-3.0-only

//! Scan session configuration
//!
//! Every timing and geometry constant of the session is configurable; the
//! defaults come from `constants`. A config can be loaded from a JSON file
//! via `ScanConfig::load`.

use crate::camera::CameraConstraints;
use crate::constants;
use crate::errors::{ScanError, ScanResult};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    /// Countdown ticks between detection and capture
    pub countdown_start: u32,
    /// Spacing between countdown decrements in milliseconds
    pub countdown_interval_ms: u64,
    /// Frame sampling cadence in milliseconds
    pub refresh_interval_ms: u64,
    /// Scan region width as a fraction of the frame width (0, 1]
    pub roi_width_fraction: f32,
    /// Upper bound on the scan region width in pixels
    pub roi_max_width: u32,
    /// Scan region aspect: height = width / divisor
    pub roi_aspect_divisor: f32,
    /// Extra rows above and below the region when cropping the capture
    pub capture_padding: u32,
    /// Camera facing preference and resolution hint
    pub constraints: CameraConstraints,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            countdown_start: constants::DEFAULT_COUNTDOWN_START,
            countdown_interval_ms: constants::DEFAULT_COUNTDOWN_INTERVAL_MS,
            refresh_interval_ms: constants::DEFAULT_REFRESH_INTERVAL_MS,
            roi_width_fraction: constants::DEFAULT_ROI_WIDTH_FRACTION,
            roi_max_width: constants::DEFAULT_ROI_MAX_WIDTH,
            roi_aspect_divisor: constants::DEFAULT_ROI_ASPECT_DIVISOR,
            capture_padding: constants::DEFAULT_CAPTURE_PADDING,
            constraints: CameraConstraints::default(),
        }
    }
}

impl ScanConfig {
    /// Load a configuration from a JSON file
    pub fn load(path: &Path) -> ScanResult<Self> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ScanError::Config(format!("{}: {}", path.display(), e)))?;
        let config: Self = serde_json::from_str(&contents)
            .map_err(|e| ScanError::Config(format!("{}: {}", path.display(), e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Reject configurations the loop cannot run with
    pub fn validate(&self) -> ScanResult<()> {
        if self.countdown_interval_ms == 0 {
            return Err(ScanError::Config(
                "countdown_interval_ms must be positive".into(),
            ));
        }
        if self.refresh_interval_ms == 0 {
            return Err(ScanError::Config(
                "refresh_interval_ms must be positive".into(),
            ));
        }
        if !(self.roi_width_fraction > 0.0 && self.roi_width_fraction <= 1.0) {
            return Err(ScanError::Config(
                "roi_width_fraction must be within (0, 1]".into(),
            ));
        }
        if self.roi_max_width == 0 {
            return Err(ScanError::Config("roi_max_width must be positive".into()));
        }
        if self.roi_aspect_divisor <= 0.0 {
            return Err(ScanError::Config(
                "roi_aspect_divisor must be positive".into(),
            ));
        }
        Ok(())
    }

    pub fn countdown_interval(&self) -> Duration {
        Duration::from_millis(self.countdown_interval_ms)
    }

    pub fn refresh_interval(&self) -> Duration {
        Duration::from_millis(self.refresh_interval_ms)
    }
}
