// SPDX-License-Identifier: GPL-3.0-only

//! Integration tests for the scan/detect/countdown/capture session
//!
//! These drive the session through scripted cameras and decoders, stepping
//! the tick with synthetic instants so every timing assertion is exact.

use qr_capture::{
    Camera, CameraConstraints, CameraError, CameraStream, Frame, QrDecode, ScanConfig,
    ScanRegion, ScanSession, ScanState, SessionEvent, VideoStream,
};
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::mpsc::Receiver;
use std::time::{Duration, Instant};

/// One scripted response of a stream
#[derive(Clone)]
enum Step {
    /// A solid-color frame of the given size
    Frame(u32, u32, u8),
    /// Source not ready this tick
    NotReady,
    /// Stream failure
    Lost,
}

struct SeqStream {
    script: Vec<Step>,
    position: usize,
}

impl VideoStream for SeqStream {
    fn next_frame(&mut self) -> Result<Option<Frame>, CameraError> {
        // Past the end of the script, keep replaying the final step
        let step = self.script[self.position.min(self.script.len() - 1)].clone();
        if self.position < self.script.len() {
            self.position += 1;
        }
        match step {
            Step::Frame(w, h, fill) => {
                Ok(Some(Frame::from_rgba(w, h, vec![fill; (w * h * 4) as usize])))
            }
            Step::NotReady => Ok(None),
            Step::Lost => Err(CameraError::Disconnected("scripted".into())),
        }
    }
}

struct SeqCamera {
    script: Vec<Step>,
    deny: bool,
}

impl SeqCamera {
    fn steady(width: u32, height: u32) -> Self {
        Self {
            script: vec![Step::Frame(width, height, 128)],
            deny: false,
        }
    }
}

impl Camera for SeqCamera {
    fn acquire(&mut self, _: &CameraConstraints) -> Result<CameraStream, CameraError> {
        if self.deny {
            return Err(CameraError::AccessDenied("scripted denial".into()));
        }
        Ok(CameraStream::new(
            "scripted",
            Box::new(SeqStream {
                script: self.script.clone(),
                position: 0,
            }),
        ))
    }
}

/// Decoder that finds a code starting from its n-th invocation
struct NthCallDecoder {
    detect_on_call: u32,
    calls: Arc<AtomicU32>,
}

impl NthCallDecoder {
    fn new(detect_on_call: u32) -> (Self, Arc<AtomicU32>) {
        let calls = Arc::new(AtomicU32::new(0));
        (
            Self {
                detect_on_call,
                calls: Arc::clone(&calls),
            },
            calls,
        )
    }
}

impl QrDecode for NthCallDecoder {
    fn decode(&self, _: &[u8], _: u32, _: u32) -> Option<String> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        (call >= self.detect_on_call).then(|| "CODE".to_string())
    }
}

fn started_session(
    camera: SeqCamera,
    detect_on_call: u32,
    config: ScanConfig,
) -> (ScanSession, Receiver<SessionEvent>) {
    let (decoder, _) = NthCallDecoder::new(detect_on_call);
    let (mut session, events) = ScanSession::new(Box::new(camera), Box::new(decoder), config);
    session.start();
    (session, events)
}

fn drain(events: &Receiver<SessionEvent>) -> Vec<SessionEvent> {
    events.try_iter().collect()
}

#[test]
fn detection_on_tick_51_captures_three_seconds_later() {
    let config = ScanConfig {
        capture_padding: 0,
        ..ScanConfig::default()
    };
    let (mut session, events) =
        started_session(SeqCamera::steady(800, 600), 51, config.clone());

    let t0 = Instant::now();
    for i in 0..50 {
        session.tick(t0 + Duration::from_millis(16 * i));
        assert_eq!(session.state(), ScanState::Scanning);
    }

    // Tick 51 finds the code
    let t_detect = t0 + Duration::from_millis(16 * 50);
    session.tick(t_detect);
    assert_eq!(session.state(), ScanState::Detected);
    assert!(
        drain(&events)
            .iter()
            .any(|e| matches!(e, SessionEvent::CodeDetected(c) if c == "CODE"))
    );

    // Just shy of three seconds: still counting
    session.tick(t_detect + Duration::from_millis(2_999));
    assert_eq!(session.state(), ScanState::Detected);

    session.tick(t_detect + Duration::from_secs(3));
    assert_eq!(session.state(), ScanState::Captured);

    // Artifact matches the region computed at detection time
    let expected = ScanRegion::compute(800, 600, &config);
    let artifact = session.captured().expect("artifact");
    assert_eq!(artifact.width(), expected.width);
    assert_eq!(artifact.height(), expected.height);
}

#[test]
fn capture_padding_expands_the_artifact() {
    let config = ScanConfig::default(); // capture_padding = 2
    let (mut session, _events) =
        started_session(SeqCamera::steady(800, 600), 1, config.clone());

    let t0 = Instant::now();
    session.tick(t0);
    session.tick(t0 + Duration::from_secs(3));

    let expected = ScanRegion::compute(800, 600, &config);
    let artifact = session.captured().expect("artifact");
    assert_eq!(artifact.width(), expected.width);
    assert_eq!(artifact.height(), expected.height + 4);
}

#[test]
fn region_is_recomputed_against_current_frame_dimensions() {
    // Frame dimensions change before the detection tick
    let camera = SeqCamera {
        script: vec![Step::Frame(800, 600, 10), Step::Frame(1280, 720, 20)],
        deny: false,
    };
    let config = ScanConfig {
        capture_padding: 0,
        ..ScanConfig::default()
    };
    let (mut session, _events) = started_session(camera, 2, config.clone());

    let t0 = Instant::now();
    session.tick(t0);
    session.tick(t0 + Duration::from_millis(16));
    assert_eq!(session.state(), ScanState::Detected);

    session.tick(t0 + Duration::from_secs(4));
    let artifact = session.captured().expect("artifact");

    // Computed from the 1280x720 frame, not the first one
    let expected = ScanRegion::compute(1280, 720, &config);
    assert_eq!(artifact.width(), expected.width);
    assert_eq!(artifact.height(), expected.height);
    // Every pixel comes from the detection-time frame
    assert!(artifact.pixels().all(|p| p.0[0] == 20));
}

#[test]
fn denied_camera_stalls_in_scanning() {
    let camera = SeqCamera {
        script: vec![],
        deny: true,
    };
    let (mut session, events) = started_session(camera, 1, ScanConfig::default());

    assert_eq!(session.state(), ScanState::Scanning);
    assert!(!session.has_stream());
    assert!(
        drain(&events)
            .iter()
            .any(|e| matches!(e, SessionEvent::AccessDenied(_)))
    );

    // Ticks are no-ops without a stream
    let t0 = Instant::now();
    for i in 0..20 {
        session.tick(t0 + Duration::from_millis(16 * i));
    }
    assert_eq!(session.state(), ScanState::Scanning);
    assert!(session.captured().is_none());
}

#[test]
fn not_ready_source_is_not_an_error() {
    let camera = SeqCamera {
        script: vec![
            Step::NotReady,
            Step::NotReady,
            Step::Frame(640, 480, 128),
        ],
        deny: false,
    };
    let (mut session, _events) = started_session(camera, 1, ScanConfig::default());

    let t0 = Instant::now();
    session.tick(t0);
    session.tick(t0 + Duration::from_millis(16));
    assert_eq!(session.state(), ScanState::Scanning);

    session.tick(t0 + Duration::from_millis(32));
    assert_eq!(session.state(), ScanState::Detected);
}

#[test]
fn stream_loss_is_surfaced_and_non_fatal() {
    let camera = SeqCamera {
        script: vec![Step::Frame(640, 480, 128), Step::Lost],
        deny: false,
    };
    // Decoder never fires, so the second tick hits the scripted failure
    let (mut session, events) = started_session(camera, u32::MAX, ScanConfig::default());

    let t0 = Instant::now();
    session.tick(t0);
    session.tick(t0 + Duration::from_millis(16));

    assert_eq!(session.state(), ScanState::Scanning);
    assert!(!session.has_stream());
    assert!(
        drain(&events)
            .iter()
            .any(|e| matches!(e, SessionEvent::StreamLost(_)))
    );
}

#[test]
fn countdown_events_step_from_two_to_zero() {
    let (mut session, events) =
        started_session(SeqCamera::steady(800, 600), 1, ScanConfig::default());

    let t0 = Instant::now();
    session.tick(t0);
    for i in 1..=3 {
        session.tick(t0 + Duration::from_secs(i));
    }

    let ticks: Vec<u32> = drain(&events)
        .into_iter()
        .filter_map(|e| match e {
            SessionEvent::CountdownTick(n) => Some(n),
            _ => None,
        })
        .collect();
    assert_eq!(ticks, vec![2, 1, 0]);

    let captures = session.captured().is_some() as u32;
    assert_eq!(captures, 1);
}

#[test]
fn retry_from_captured_resumes_scanning() {
    let (mut session, events) =
        started_session(SeqCamera::steady(800, 600), 1, ScanConfig::default());

    let t0 = Instant::now();
    session.tick(t0);
    session.tick(t0 + Duration::from_secs(3));
    assert_eq!(session.state(), ScanState::Captured);
    drain(&events);

    session.retry();
    assert_eq!(session.state(), ScanState::Scanning);
    assert!(session.captured().is_none());
    assert!(session.has_stream());

    // Sampling resumed, detection fires again on the next tick
    let t1 = t0 + Duration::from_secs(10);
    session.tick(t1);
    assert_eq!(session.state(), ScanState::Detected);
    session.tick(t1 + Duration::from_secs(3));
    assert_eq!(session.state(), ScanState::Captured);
    assert!(session.captured().is_some());
}

#[test]
fn retry_outside_captured_is_a_no_op() {
    let (mut session, _events) =
        started_session(SeqCamera::steady(800, 600), u32::MAX, ScanConfig::default());

    assert_eq!(session.state(), ScanState::Scanning);
    session.retry();
    assert_eq!(session.state(), ScanState::Scanning);
    assert!(session.has_stream());
}

#[test]
fn close_during_countdown_cancels_everything() {
    let (mut session, _events) =
        started_session(SeqCamera::steady(800, 600), 1, ScanConfig::default());

    let t0 = Instant::now();
    session.tick(t0);
    session.tick(t0 + Duration::from_secs(1));
    assert_eq!(session.state(), ScanState::Detected);
    assert_eq!(session.countdown_remaining(), 2);

    session.close();
    assert_eq!(session.state(), ScanState::Idle);
    assert!(!session.has_stream());

    // Late ticks after teardown mutate nothing
    session.tick(t0 + Duration::from_secs(2));
    session.tick(t0 + Duration::from_secs(3));
    assert_eq!(session.state(), ScanState::Idle);
    assert!(session.captured().is_none());
}

#[test]
fn start_is_idempotent_and_releases_the_previous_stream() {
    let (mut session, _events) =
        started_session(SeqCamera::steady(800, 600), 1, ScanConfig::default());

    let t0 = Instant::now();
    session.tick(t0);
    session.tick(t0 + Duration::from_secs(3));
    assert!(session.captured().is_some());

    // A fresh start clears the stale artifact and rewinds the countdown
    session.start();
    assert_eq!(session.state(), ScanState::Scanning);
    assert!(session.captured().is_none());
    assert_eq!(session.countdown_remaining(), 3);
    assert!(session.has_stream());
}

#[test]
fn take_captured_hands_the_artifact_over_once() {
    let (mut session, _events) =
        started_session(SeqCamera::steady(800, 600), 1, ScanConfig::default());

    let t0 = Instant::now();
    session.tick(t0);
    session.tick(t0 + Duration::from_secs(3));

    assert!(session.take_captured().is_some());
    assert!(session.take_captured().is_none());
    assert!(session.captured().is_none());
}
