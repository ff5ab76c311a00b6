// SPDX-License-Identifier: GPL-3.0-only

//! QR decoding seam
//!
//! The scan loop consumes decoding as a black box through [`QrDecode`]. The
//! default implementation uses the rqrr crate on a grayscale conversion of
//! the region pixels. Implementations must report failure as `None`; the
//! loop additionally shields itself against panicking decoders.

use image::GrayImage;
use tracing::{debug, trace};

/// Opaque QR decoding capability
pub trait QrDecode: Send {
    /// Decode a tightly packed RGBA buffer
    ///
    /// Returns the decoded payload of the first code found, or `None` when no
    /// code is present or decoding fails. Must not panic on malformed input.
    fn decode(&self, rgba: &[u8], width: u32, height: u32) -> Option<String>;
}

/// Default decoder backed by rqrr
#[derive(Debug, Default)]
pub struct RqrrDecoder;

impl QrDecode for RqrrDecoder {
    fn decode(&self, rgba: &[u8], width: u32, height: u32) -> Option<String> {
        if rgba.len() < (width as usize * height as usize * 4) || width == 0 || height == 0 {
            debug!(
                len = rgba.len(),
                width, height, "Region buffer smaller than dimensions imply"
            );
            return None;
        }

        let gray = to_grayscale(rgba, width, height);
        let img = GrayImage::from_raw(width, height, gray)?;

        let mut prepared = rqrr::PreparedImage::prepare(img);
        let grids = prepared.detect_grids();
        trace!(count = grids.len(), "Candidate QR grids");

        for grid in grids {
            match grid.decode() {
                Ok((_, content)) => return Some(content),
                Err(e) => {
                    debug!(error = %e, "Grid decode failed");
                }
            }
        }
        None
    }
}

/// Luma conversion with the BT.601 weights the image crate uses
fn to_grayscale(rgba: &[u8], width: u32, height: u32) -> Vec<u8> {
    let pixels = width as usize * height as usize;
    let mut gray = Vec::with_capacity(pixels);
    for px in rgba.chunks_exact(4).take(pixels) {
        let luma =
            0.299 * f32::from(px[0]) + 0.587 * f32::from(px[1]) + 0.114 * f32::from(px[2]);
        gray.push(luma as u8);
    }
    gray
}
