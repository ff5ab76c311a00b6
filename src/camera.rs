// SPDX-License-Identifier: GPL-3.0-only

//! Camera capability abstraction
//!
//! The session never talks to camera hardware directly. It asks a [`Camera`]
//! for a stream matching its constraints and reads frames from the resulting
//! [`CameraStream`], which releases the underlying source when dropped. This
//! keeps acquisition exclusive (the session stops any held stream before
//! acquiring a new one) and makes sessions testable with scripted sources.
//!
//! [`FileCamera`] is the built-in source: it plays back still images as
//! frames, which is what the CLI uses and what integration tests drive.

use crate::errors::CameraError;
use crate::frame::Frame;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Which way the requested camera should face
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum FacingMode {
    /// Front-facing (selfie) camera
    User,
    /// Rear-facing camera
    #[default]
    Environment,
}

impl std::fmt::Display for FacingMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FacingMode::User => write!(f, "user"),
            FacingMode::Environment => write!(f, "environment"),
        }
    }
}

/// Constraints passed to the camera capability when acquiring a stream
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConstraints {
    pub facing: FacingMode,
    /// Preferred frame width (a hint, sources may ignore it)
    pub width: u32,
    /// Preferred frame height (a hint, sources may ignore it)
    pub height: u32,
}

impl Default for CameraConstraints {
    fn default() -> Self {
        let (width, height) = crate::constants::DEFAULT_RESOLUTION_HINT;
        Self {
            facing: FacingMode::default(),
            width,
            height,
        }
    }
}

/// Host camera capability
///
/// The sole interaction the session has with the outside world for frames.
pub trait Camera: Send {
    /// Acquire a video stream matching the constraints
    fn acquire(&mut self, constraints: &CameraConstraints) -> Result<CameraStream, CameraError>;
}

/// A live source of frames
pub trait VideoStream: Send {
    /// Fetch the next frame
    ///
    /// `Ok(None)` means the source is not ready yet and the caller should try
    /// again next tick. `Err` means the stream is gone for good.
    fn next_frame(&mut self) -> Result<Option<Frame>, CameraError>;

    /// Release the underlying resource; called once from `CameraStream`'s Drop
    fn close(&mut self) {}
}

/// Owned handle to an acquired stream
///
/// Holding the only reference to the source, the wrapper guarantees release
/// on every exit path: dropping it closes the stream.
pub struct CameraStream {
    source: Box<dyn VideoStream>,
    name: String,
}

impl CameraStream {
    pub fn new(name: impl Into<String>, source: Box<dyn VideoStream>) -> Self {
        Self {
            source,
            name: name.into(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn next_frame(&mut self) -> Result<Option<Frame>, CameraError> {
        self.source.next_frame()
    }
}

impl Drop for CameraStream {
    fn drop(&mut self) {
        debug!(stream = %self.name, "Releasing camera stream");
        self.source.close();
    }
}

impl std::fmt::Debug for CameraStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "CameraStream({})", self.name)
    }
}

/// Camera backed by still image files
///
/// Plays the images back one per frame request; once exhausted it keeps
/// serving the final image, so a single photo behaves like a held-steady
/// camera.
pub struct FileCamera {
    paths: Vec<PathBuf>,
}

impl FileCamera {
    /// Build a camera from a single image file or a directory of images
    ///
    /// Directories are played back in lexical order; files the image crate
    /// cannot identify by extension are skipped.
    pub fn open(input: &Path) -> Result<Self, CameraError> {
        let mut paths = Vec::new();

        if input.is_dir() {
            let entries = std::fs::read_dir(input)
                .map_err(|e| CameraError::NotFound(format!("{}: {}", input.display(), e)))?;
            for entry in entries.flatten() {
                let path = entry.path();
                if image::ImageFormat::from_path(&path).is_ok() {
                    paths.push(path);
                }
            }
            paths.sort();
        } else if input.is_file() {
            paths.push(input.to_path_buf());
        } else {
            return Err(CameraError::NotFound(input.display().to_string()));
        }

        if paths.is_empty() {
            return Err(CameraError::NotFound(format!(
                "no image files in {}",
                input.display()
            )));
        }

        info!(frames = paths.len(), input = %input.display(), "Opened file camera");
        Ok(Self { paths })
    }
}

impl Camera for FileCamera {
    fn acquire(&mut self, constraints: &CameraConstraints) -> Result<CameraStream, CameraError> {
        // File playback has fixed dimensions; the hint only gets logged
        debug!(
            facing = %constraints.facing,
            hint_width = constraints.width,
            hint_height = constraints.height,
            "Acquiring file-backed stream"
        );
        Ok(CameraStream::new(
            "file",
            Box::new(FileStream {
                paths: self.paths.clone(),
                position: 0,
            }),
        ))
    }
}

struct FileStream {
    paths: Vec<PathBuf>,
    position: usize,
}

impl VideoStream for FileStream {
    fn next_frame(&mut self) -> Result<Option<Frame>, CameraError> {
        let index = self.position.min(self.paths.len() - 1);
        let path = &self.paths[index];
        if self.position < self.paths.len() {
            self.position += 1;
        }

        match image::open(path) {
            Ok(img) => Ok(Some(Frame::from_image(&img.to_rgba8()))),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Failed to decode frame image");
                Err(CameraError::Disconnected(format!(
                    "{}: {}",
                    path.display(),
                    e
                )))
            }
        }
    }
}
