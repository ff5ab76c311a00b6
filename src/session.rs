// SPDX-License-Identifier: GPL-3.0-only

//! Scan session state and lifecycle
//!
//! A [`ScanSession`] owns the camera stream, the session state machine, and
//! the captured artifact. State transitions requested by the user (`start`,
//! `retry`, `close`) live here; the per-tick sampling logic that drives the
//! Scanning → Detected → Captured transitions lives in [`crate::scan_loop`].
//!
//! ```text
//! Idle --start()--> Scanning
//! Scanning --decoder finds code--> Detected
//! Detected --countdown reaches 0--> Captured
//! Captured --retry()--> Scanning
//! (any state) --close()--> Idle
//! ```

use crate::camera::{Camera, CameraStream};
use crate::config::ScanConfig;
use crate::decoder::QrDecode;
use crate::frame::Frame;
use crate::roi::ScanRegion;
use image::RgbaImage;
use std::sync::mpsc::{Receiver, Sender, channel};
use std::time::Instant;
use tracing::{debug, info, warn};

/// Session state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScanState {
    /// No camera held, nothing scheduled
    #[default]
    Idle,
    /// Sampling frames (or stalled waiting for a stream)
    Scanning,
    /// Code found, countdown running, sampling suspended
    Detected,
    /// Artifact stored, awaiting retry or export
    Captured,
}

/// Notifications emitted towards the user interface
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// The platform refused to hand over a camera stream
    AccessDenied(String),
    /// A QR code was found; countdown started
    CodeDetected(String),
    /// Countdown decremented; payload is the remaining count
    CountdownTick(u32),
    /// The artifact was cropped and stored
    ImageCaptured,
    /// The held stream ended unexpectedly
    StreamLost(String),
}

/// Countdown bookkeeping frozen at the moment of detection
///
/// The frame and region recorded here are the ones the artifact is cropped
/// from; later frames must not leak into the capture.
#[derive(Debug)]
pub(crate) struct PendingCapture {
    pub(crate) frame: Frame,
    pub(crate) region: ScanRegion,
    pub(crate) next_decrement: Instant,
}

/// A single scan/detect/countdown/capture session
pub struct ScanSession {
    pub(crate) state: ScanState,
    pub(crate) countdown_remaining: u32,
    pub(crate) captured: Option<RgbaImage>,
    pub(crate) stream: Option<CameraStream>,
    pub(crate) camera: Box<dyn Camera>,
    pub(crate) decoder: Box<dyn QrDecode>,
    pub(crate) config: ScanConfig,
    pub(crate) pending: Option<PendingCapture>,
    events: Sender<SessionEvent>,
}

impl ScanSession {
    /// Create an idle session and the receiving end of its event channel
    pub fn new(
        camera: Box<dyn Camera>,
        decoder: Box<dyn QrDecode>,
        config: ScanConfig,
    ) -> (Self, Receiver<SessionEvent>) {
        let (events, receiver) = channel();
        let session = Self {
            state: ScanState::Idle,
            countdown_remaining: config.countdown_start,
            captured: None,
            stream: None,
            camera,
            decoder,
            config,
            pending: None,
            events,
        };
        (session, receiver)
    }

    /// Begin (or restart) scanning
    ///
    /// Any held stream is released first, stale artifacts and countdowns are
    /// cleared, and a fresh stream is requested. Denial is not fatal: the
    /// session stays in Scanning without a stream, so ticks are no-ops until
    /// the user retries.
    pub fn start(&mut self) {
        self.stop();
        self.captured = None;
        self.pending = None;
        self.countdown_remaining = self.config.countdown_start;
        self.state = ScanState::Scanning;

        match self.camera.acquire(&self.config.constraints) {
            Ok(stream) => {
                info!(stream = %stream.name(), "Camera stream acquired");
                self.stream = Some(stream);
            }
            Err(e) => {
                warn!(error = %e, "Camera access denied");
                self.emit(SessionEvent::AccessDenied(e.to_string()));
            }
        }
    }

    /// Release the held stream; safe to call repeatedly
    pub fn stop(&mut self) {
        if self.stream.take().is_some() {
            debug!("Camera stream released");
        }
    }

    /// Discard the captured artifact and scan again
    ///
    /// Only meaningful from Captured; tolerated as a no-op elsewhere.
    pub fn retry(&mut self) {
        if self.state != ScanState::Captured {
            debug!(state = ?self.state, "retry ignored outside Captured state");
            return;
        }
        info!("Retrying scan");
        self.captured = None;
        self.start();
    }

    /// Tear the session down: release the stream, cancel any countdown
    pub fn close(&mut self) {
        self.stop();
        self.pending = None;
        self.captured = None;
        self.state = ScanState::Idle;
        debug!("Session closed");
    }

    pub fn state(&self) -> ScanState {
        self.state
    }

    pub fn countdown_remaining(&self) -> u32 {
        self.countdown_remaining
    }

    pub fn has_stream(&self) -> bool {
        self.stream.is_some()
    }

    pub fn captured(&self) -> Option<&RgbaImage> {
        self.captured.as_ref()
    }

    /// Hand the artifact to an external save action
    pub fn take_captured(&mut self) -> Option<RgbaImage> {
        self.captured.take()
    }

    pub fn config(&self) -> &ScanConfig {
        &self.config
    }

    pub(crate) fn emit(&self, event: SessionEvent) {
        // A dropped receiver just means nobody is listening
        let _ = self.events.send(event);
    }
}

impl Drop for ScanSession {
    fn drop(&mut self) {
        self.stop();
    }
}

impl std::fmt::Debug for ScanSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScanSession")
            .field("state", &self.state)
            .field("countdown_remaining", &self.countdown_remaining)
            .field("has_stream", &self.stream.is_some())
            .field("has_capture", &self.captured.is_some())
            .finish()
    }
}
