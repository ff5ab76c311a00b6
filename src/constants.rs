// SPDX-License-Identifier: GPL-3.0-only

//! Application-wide constants
//!
//! Scan policy defaults live here so that `ScanConfig` and tests share one
//! source of truth. All of these are tunable via configuration; the values
//! match the behavior the tool shipped with.

/// Countdown ticks between detection and capture
pub const DEFAULT_COUNTDOWN_START: u32 = 3;

/// Spacing between countdown decrements in milliseconds
pub const DEFAULT_COUNTDOWN_INTERVAL_MS: u64 = 1_000;

/// Frame sampling cadence in milliseconds (~60 Hz display refresh)
pub const DEFAULT_REFRESH_INTERVAL_MS: u64 = 16;

/// Scan region width as a fraction of the frame width
pub const DEFAULT_ROI_WIDTH_FRACTION: f32 = 0.8;

/// Upper bound on the scan region width in pixels
pub const DEFAULT_ROI_MAX_WIDTH: u32 = 800;

/// Scan region aspect: height = width / divisor
pub const DEFAULT_ROI_ASPECT_DIVISOR: f32 = 3.0;

/// Extra rows added above and below the region when cropping the capture
pub const DEFAULT_CAPTURE_PADDING: u32 = 2;

/// Preferred camera resolution hint
pub const DEFAULT_RESOLUTION_HINT: (u32, u32) = (1280, 720);
