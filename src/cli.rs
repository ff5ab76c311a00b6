// SPDX-License-Identifier: GPL-3.0-only

//! CLI commands
//!
//! This module provides command-line functionality for:
//! - Running a full scan session over file-backed frames
//! - One-shot decoding of a single image

use chrono::Local;
use qr_capture::{
    FileCamera, QrDecode, RqrrDecoder, ScanConfig, ScanLoopController, ScanSession, ScanState,
    SessionEvent,
};
use std::path::{Path, PathBuf};
use std::sync::atomic::Ordering;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::info;

/// Default folder name for saving captures
const DEFAULT_SAVE_FOLDER: &str = "QR Capture";

/// Run a scan session over the given input frames and save the capture
pub fn run_scan(
    input: PathBuf,
    output: Option<PathBuf>,
    config_path: Option<PathBuf>,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = match config_path {
        Some(path) => ScanConfig::load(&path)?,
        None => ScanConfig::default(),
    };
    let refresh = config.refresh_interval();

    let camera = FileCamera::open(&input)?;
    let (mut session, events) =
        ScanSession::new(Box::new(camera), Box::new(RqrrDecoder), config);
    session.start();

    let session = Arc::new(Mutex::new(session));
    let controller = ScanLoopController::spawn(Arc::clone(&session), refresh);

    // Ctrl-C flips the same stop signal the controller polls
    let interrupt = controller.stop_signal();
    ctrlc::set_handler(move || interrupt.store(true, Ordering::SeqCst))?;

    println!("Scanning for a QR code...");

    let stop = controller.stop_signal();
    loop {
        match events.recv_timeout(Duration::from_millis(200)) {
            Ok(SessionEvent::AccessDenied(reason)) => {
                println!("Camera access denied: {}", reason);
            }
            Ok(SessionEvent::CodeDetected(content)) => {
                println!("QR code detected: {}", content);
                println!("Capturing in {}...", lock(&session)?.countdown_remaining());
            }
            Ok(SessionEvent::CountdownTick(remaining)) if remaining > 0 => {
                println!("{}...", remaining);
            }
            Ok(SessionEvent::CountdownTick(_)) => {}
            Ok(SessionEvent::ImageCaptured) => break,
            Ok(SessionEvent::StreamLost(reason)) => {
                println!("Camera stream lost: {}", reason);
            }
            Err(std::sync::mpsc::RecvTimeoutError::Timeout) => {
                if stop.load(Ordering::SeqCst) {
                    println!("Interrupted.");
                    return Ok(());
                }
                // Without a stream the loop can only stall; nothing to wait for
                let stalled = {
                    let session = lock(&session)?;
                    session.state() == ScanState::Scanning && !session.has_stream()
                };
                if stalled {
                    return Err("camera stream unavailable; nothing to scan".into());
                }
            }
            Err(std::sync::mpsc::RecvTimeoutError::Disconnected) => break,
        }
    }

    let artifact = lock(&session)?
        .take_captured()
        .ok_or("no captured image available")?;

    let path = output.unwrap_or_else(default_capture_path);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    artifact.save(&path)?;

    info!(path = %path.display(), "Capture saved");
    println!("Image saved: {}", path.display());
    Ok(())
}

/// Decode a single image without running a session
pub fn run_decode(image_path: PathBuf) -> Result<(), Box<dyn std::error::Error>> {
    let image = image::open(&image_path)?.to_rgba8();
    let decoder = RqrrDecoder;

    match decoder.decode(image.as_raw(), image.width(), image.height()) {
        Some(content) => {
            println!("{}", content);
            Ok(())
        }
        None => Err(format!("no QR code found in {}", image_path.display()).into()),
    }
}

fn lock<'a>(
    session: &'a Arc<Mutex<ScanSession>>,
) -> Result<std::sync::MutexGuard<'a, ScanSession>, Box<dyn std::error::Error>> {
    session
        .lock()
        .map_err(|_| "scan loop panicked while holding the session".into())
}

/// Default capture path: ~/Pictures/QR Capture/qr_TIMESTAMP.png
fn default_capture_path() -> PathBuf {
    let dir = dirs::picture_dir()
        .unwrap_or_else(|| dirs::home_dir().unwrap_or_else(|| PathBuf::from(".")))
        .join(DEFAULT_SAVE_FOLDER);
    let timestamp = Local::now().format("%Y-%m-%d_%H-%M-%S");
    dir.join(format!("qr_{}.png", timestamp))
}

/// Print the effective configuration, resolving an optional config file
pub fn show_config(config_path: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    let config = match config_path {
        Some(path) => ScanConfig::load(path)?,
        None => ScanConfig::default(),
    };
    println!("{}", serde_json::to_string_pretty(&config)?);
    Ok(())
}
