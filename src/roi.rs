// SPDX-License-Identifier: GPL-3.0-only

//! Scan region computation
//!
//! The scan region is the centered band of the frame handed to the decoder
//! and later cropped into the captured artifact. It is recomputed from the
//! current frame dimensions on every tick; frame dimensions can change
//! mid-session (device rotation, format renegotiation) and a cached region
//! would drift out of bounds.

use crate::config::ScanConfig;

/// A rectangular region in frame pixel coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanRegion {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl ScanRegion {
    /// Compute the centered scan region for a frame
    ///
    /// Width is `frame_width * width_fraction` capped at `max_width`, height
    /// is `width / aspect_divisor`, both clamped so the region always lies
    /// fully inside the frame.
    pub fn compute(frame_width: u32, frame_height: u32, config: &ScanConfig) -> Self {
        let mut width = ((frame_width as f32 * config.roi_width_fraction) as u32)
            .min(config.roi_max_width)
            .min(frame_width)
            .max(1);
        let mut height = ((width as f32 / config.roi_aspect_divisor) as u32).max(1);

        if height > frame_height {
            // Short frame: keep the aspect by shrinking the width as well
            height = frame_height;
            width = ((height as f32 * config.roi_aspect_divisor) as u32)
                .min(frame_width)
                .max(1);
        }

        Self {
            x: (frame_width - width) / 2,
            y: (frame_height - height) / 2,
            width,
            height,
        }
    }

    /// Whether the region lies fully inside a frame of the given size
    pub fn fits_within(&self, frame_width: u32, frame_height: u32) -> bool {
        self.x + self.width <= frame_width && self.y + self.height <= frame_height
    }
}
