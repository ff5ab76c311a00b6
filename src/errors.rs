// SPDX-License-Identifier: GPL-3.0-only

//! Error types for the scan session

use std::fmt;

/// Result type alias using ScanError
pub type ScanResult<T> = Result<T, ScanError>;

/// Main error type
#[derive(Debug, Clone)]
pub enum ScanError {
    /// Camera-related errors
    Camera(CameraError),
    /// Capture/crop errors
    Capture(CaptureError),
    /// Configuration errors
    Config(String),
    /// Storage/filesystem errors
    Storage(String),
    /// Generic error with message
    Other(String),
}

/// Camera-specific errors
#[derive(Debug, Clone)]
pub enum CameraError {
    /// Access to the camera was denied by the host platform
    AccessDenied(String),
    /// No usable camera source found
    NotFound(String),
    /// Stream acquisition failed
    AcquisitionFailed(String),
    /// Stream ended unexpectedly (device unplugged, source exhausted)
    Disconnected(String),
}

/// Capture errors
#[derive(Debug, Clone)]
pub enum CaptureError {
    /// No frame was available to crop
    NoFrameAvailable,
    /// Region does not intersect the frame
    RegionOutOfBounds,
    /// Encoding the artifact failed
    EncodingFailed(String),
    /// Writing the artifact failed
    SaveFailed(String),
}

impl fmt::Display for ScanError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScanError::Camera(e) => write!(f, "Camera error: {}", e),
            ScanError::Capture(e) => write!(f, "Capture error: {}", e),
            ScanError::Config(msg) => write!(f, "Configuration error: {}", msg),
            ScanError::Storage(msg) => write!(f, "Storage error: {}", msg),
            ScanError::Other(msg) => write!(f, "{}", msg),
        }
    }
}

impl fmt::Display for CameraError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CameraError::AccessDenied(msg) => write!(f, "Access denied: {}", msg),
            CameraError::NotFound(msg) => write!(f, "No camera found: {}", msg),
            CameraError::AcquisitionFailed(msg) => write!(f, "Acquisition failed: {}", msg),
            CameraError::Disconnected(msg) => write!(f, "Stream disconnected: {}", msg),
        }
    }
}

impl fmt::Display for CaptureError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CaptureError::NoFrameAvailable => write!(f, "No frame available for capture"),
            CaptureError::RegionOutOfBounds => write!(f, "Capture region outside frame bounds"),
            CaptureError::EncodingFailed(msg) => write!(f, "Encoding failed: {}", msg),
            CaptureError::SaveFailed(msg) => write!(f, "Save failed: {}", msg),
        }
    }
}

impl std::error::Error for ScanError {}
impl std::error::Error for CameraError {}
impl std::error::Error for CaptureError {}

impl From<CameraError> for ScanError {
    fn from(err: CameraError) -> Self {
        ScanError::Camera(err)
    }
}

impl From<CaptureError> for ScanError {
    fn from(err: CaptureError) -> Self {
        ScanError::Capture(err)
    }
}

impl From<String> for ScanError {
    fn from(msg: String) -> Self {
        ScanError::Other(msg)
    }
}

impl From<&str> for ScanError {
    fn from(msg: &str) -> Self {
        ScanError::Other(msg.to_string())
    }
}

impl From<std::io::Error> for ScanError {
    fn from(err: std::io::Error) -> Self {
        ScanError::Storage(err.to_string())
    }
}

impl From<std::io::Error> for CaptureError {
    fn from(err: std::io::Error) -> Self {
        CaptureError::SaveFailed(err.to_string())
    }
}
