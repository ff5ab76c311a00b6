// SPDX-License-Identifier: GPL-3.0-only

//! QR Capture - scan a video feed for a QR code and capture it
//!
//! The crate drives a scan/detect/countdown/capture session: frames are
//! sampled from a camera source, a centered region of interest is handed to
//! a QR decoder, and once a code is found a countdown runs before the region
//! is cropped into a still image for the user to save.
//!
//! # Architecture
//!
//! - [`session`]: session state machine and lifecycle (start/stop/retry)
//! - [`scan_loop`]: per-tick sampling logic and the loop driver
//! - [`camera`]: camera capability seam and the file-backed source
//! - [`decoder`]: QR decoding seam and the rqrr-backed default
//! - [`roi`]: scan region geometry
//! - [`frame`]: frame buffers and region cropping
//! - [`config`]: tunable scan policy

pub mod camera;
pub mod config;
pub mod constants;
pub mod decoder;
pub mod errors;
pub mod frame;
pub mod roi;
pub mod scan_loop;
pub mod session;

// Re-export commonly used types
pub use camera::{Camera, CameraConstraints, CameraStream, FacingMode, FileCamera, VideoStream};
pub use config::ScanConfig;
pub use decoder::{QrDecode, RqrrDecoder};
pub use errors::{CameraError, CaptureError, ScanError, ScanResult};
pub use frame::Frame;
pub use roi::ScanRegion;
pub use scan_loop::ScanLoopController;
pub use session::{ScanSession, ScanState, SessionEvent};
