// SPDX-License-Identifier: GPL-3.0-only

//! Per-tick sampling and the loop driver
//!
//! [`ScanSession::tick`] is one deterministic step of the scan loop: sample a
//! frame, extract the scan region, run the decoder, advance the countdown.
//! Tests single-step it with synthetic instants. [`ScanLoopController`] is
//! the runtime driver: a thread that re-arms the tick once per refresh
//! interval, with an atomic stop signal and drop-cancellation so no stale
//! tick can touch a torn-down session.

use crate::session::{PendingCapture, ScanSession, ScanState, SessionEvent};
use crate::roi::ScanRegion;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};
use tracing::{debug, info, trace, warn};

impl ScanSession {
    /// Execute one step of the scan loop
    ///
    /// Scanning: sample and decode. Detected: advance the countdown, no
    /// sampling. Idle and Captured: nothing scheduled.
    pub fn tick(&mut self, now: Instant) {
        match self.state {
            ScanState::Scanning => self.sample(now),
            ScanState::Detected => self.advance_countdown(now),
            ScanState::Idle | ScanState::Captured => {}
        }
    }

    fn sample(&mut self, now: Instant) {
        let Some(stream) = self.stream.as_mut() else {
            // Stalled without a stream (access denied); retry re-acquires
            return;
        };

        let frame = match stream.next_frame() {
            Ok(Some(frame)) => frame,
            Ok(None) => {
                trace!("Source not ready, skipping tick");
                return;
            }
            Err(e) => {
                warn!(error = %e, "Camera stream lost");
                self.stream = None;
                self.emit(SessionEvent::StreamLost(e.to_string()));
                return;
            }
        };

        // Recompute the region against the current dimensions every tick:
        // they can change between ticks (rotation, renegotiation).
        let region = ScanRegion::compute(frame.width, frame.height, &self.config);
        let rgba = frame.region_rgba(&region);

        let decoder = &self.decoder;
        let decoded = panic::catch_unwind(AssertUnwindSafe(|| {
            decoder.decode(&rgba, region.width, region.height)
        }))
        .unwrap_or_else(|_| {
            warn!("Decoder panicked, treating as no code");
            None
        });

        if let Some(content) = decoded {
            info!(content = %content, width = region.width, height = region.height, "QR code detected");
            self.state = ScanState::Detected;
            self.countdown_remaining = self.config.countdown_start;
            self.pending = Some(PendingCapture {
                frame,
                region,
                next_decrement: now + self.config.countdown_interval(),
            });
            self.emit(SessionEvent::CodeDetected(content));
        }
    }

    fn advance_countdown(&mut self, now: Instant) {
        let interval = self.config.countdown_interval();

        while self.countdown_remaining > 0 {
            let due = match self.pending.as_mut() {
                Some(p) if now >= p.next_decrement => {
                    p.next_decrement += interval;
                    true
                }
                _ => false,
            };
            if !due {
                return;
            }
            self.countdown_remaining -= 1;
            debug!(remaining = self.countdown_remaining, "Countdown tick");
            self.emit(SessionEvent::CountdownTick(self.countdown_remaining));
        }

        // Crop from the frame frozen at detection time, never a later one
        if let Some(pending) = self.pending.take() {
            let artifact = pending
                .frame
                .crop(&pending.region, self.config.capture_padding);
            info!(
                width = artifact.width(),
                height = artifact.height(),
                "Captured scan region"
            );
            self.captured = Some(artifact);
            self.state = ScanState::Captured;
            self.emit(SessionEvent::ImageCaptured);
        }
    }
}

/// Thread-backed driver re-arming the tick at the refresh cadence
///
/// Stopping joins the thread, so once `stop` returns (or the controller is
/// dropped) no further tick can run.
pub struct ScanLoopController {
    thread_handle: Option<JoinHandle<()>>,
    stop_signal: Arc<AtomicBool>,
}

impl ScanLoopController {
    /// Start driving a session at the given refresh interval
    pub fn spawn(session: Arc<Mutex<ScanSession>>, refresh: Duration) -> Self {
        let stop_signal = Arc::new(AtomicBool::new(false));
        let stop = Arc::clone(&stop_signal);

        info!(refresh_ms = refresh.as_millis(), "Starting scan loop");

        let thread_handle = thread::spawn(move || {
            debug!("Scan loop thread started");
            loop {
                if stop.load(Ordering::SeqCst) {
                    debug!("Stop signal received");
                    break;
                }
                match session.lock() {
                    Ok(mut session) => session.tick(Instant::now()),
                    Err(_) => {
                        warn!("Session lock poisoned, stopping loop");
                        break;
                    }
                }
                thread::sleep(refresh);
            }
            debug!("Scan loop thread exiting");
        });

        Self {
            thread_handle: Some(thread_handle),
            stop_signal,
        }
    }

    /// Check if the loop thread is still running
    pub fn is_running(&self) -> bool {
        self.thread_handle
            .as_ref()
            .map(|h| !h.is_finished())
            .unwrap_or(false)
    }

    /// Shared stop signal, for wiring into signal handlers
    pub fn stop_signal(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.stop_signal)
    }

    /// Signal the loop to stop without waiting
    pub fn request_stop(&self) {
        self.stop_signal.store(true, Ordering::SeqCst);
    }

    /// Stop the loop and wait for the thread to finish
    pub fn stop(&mut self) {
        self.request_stop();
        self.join();
    }

    /// Wait for the thread to finish
    pub fn join(&mut self) {
        if let Some(handle) = self.thread_handle.take() {
            if handle.join().is_err() {
                warn!("Scan loop thread panicked");
            } else {
                debug!("Scan loop thread finished");
            }
        }
    }
}

impl Drop for ScanLoopController {
    fn drop(&mut self) {
        if self.thread_handle.is_some() {
            debug!("ScanLoopController dropped, stopping loop");
            self.stop();
        }
    }
}
