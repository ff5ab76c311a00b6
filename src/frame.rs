// SPDX-License-Identifier: GPL-3.0-only

//! Camera frame representation and region extraction
//!
//! Frames are RGBA with an explicit row stride, since camera sources may pad
//! rows. Pixel data is shared behind an `Arc` so persisting the last frame
//! across a tick is a reference bump, not a copy.

use crate::roi::ScanRegion;
use image::RgbaImage;
use std::sync::Arc;

/// A single RGBA frame sampled from a video source
#[derive(Debug, Clone)]
pub struct Frame {
    pub width: u32,
    pub height: u32,
    /// Bytes per row, may include padding beyond `width * 4`
    pub stride: u32,
    /// RGBA pixel data, `stride * height` bytes
    pub data: Arc<[u8]>,
}

impl Frame {
    /// Create a frame from tightly packed RGBA bytes
    pub fn from_rgba(width: u32, height: u32, data: Vec<u8>) -> Self {
        Self {
            width,
            height,
            stride: width * 4,
            data: Arc::from(data),
        }
    }

    /// Create a frame from a decoded image buffer
    pub fn from_image(image: &RgbaImage) -> Self {
        Self::from_rgba(image.width(), image.height(), image.as_raw().clone())
    }

    /// Copy the pixels of a sub-rectangle into a tightly packed RGBA buffer
    ///
    /// The region is assumed to lie inside the frame (`ScanRegion::compute`
    /// guarantees this). Rows that would fall outside the underlying buffer
    /// are skipped rather than panicking.
    pub fn region_rgba(&self, region: &ScanRegion) -> Vec<u8> {
        let stride = self.stride as usize;
        let x0 = region.x as usize * 4;
        let row_len = region.width as usize * 4;

        let mut out = Vec::with_capacity(row_len * region.height as usize);
        for row in region.y..region.y + region.height {
            let start = row as usize * stride + x0;
            let end = start + row_len;
            if end <= self.data.len() {
                out.extend_from_slice(&self.data[start..end]);
            }
        }
        out
    }

    /// Crop a region into a standalone image, expanded vertically by
    /// `padding` rows on each side and clamped to the frame bounds
    pub fn crop(&self, region: &ScanRegion, padding: u32) -> RgbaImage {
        let y0 = region.y.saturating_sub(padding);
        let y1 = (region.y + region.height + padding).min(self.height);
        let padded = ScanRegion {
            x: region.x,
            y: y0,
            width: region.width,
            height: y1 - y0,
        };

        let pixels = self.region_rgba(&padded);
        RgbaImage::from_raw(padded.width, padded.height, pixels)
            .unwrap_or_else(|| RgbaImage::new(padded.width, padded.height))
    }
}
