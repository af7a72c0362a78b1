// This is free and unencumbered software released into the public domain.

use crate::shared::{CameraError, PreviewTarget};
use bytes::Bytes;
use std::{fmt, sync::Arc};

/// Which physical direction a camera module points.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CameraFacing {
    /// Toward the user.
    Front,
    /// Away from the user.
    Back,
}

impl CameraFacing {
    pub fn opposite(self) -> Self {
        match self {
            Self::Front => Self::Back,
            Self::Back => Self::Front,
        }
    }
}

impl fmt::Display for CameraFacing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Front => write!(f, "front"),
            Self::Back => write!(f, "back"),
        }
    }
}

/// Stable identifier of a camera device within its driver.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct CameraId(String);

impl CameraId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CameraId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One entry of the driver's camera enumeration.
#[derive(Clone, Debug)]
pub struct CameraInfo {
    pub id: CameraId,
    pub facing: CameraFacing,
    pub label: String,
}

/// Receives the encoded bytes of a still capture, exactly once per capture.
/// Ownership of the buffer transfers to the sink; the core retains no copy.
pub type PictureSink = Arc<dyn Fn(Bytes) + Send + Sync + 'static>;

/// Status notifications for callers that want failure observability. The
/// channel never alters control flow; dropping events is harmless.
#[derive(Debug)]
pub enum PreviewEvent {
    PreviewStarted { facing: CameraFacing },
    PreviewStopped,
    Degraded { error: CameraError },
    PictureTaken { bytes: usize },
}

/// Platform camera service seam: enumeration plus device acquisition.
pub trait CameraDriver: Send {
    fn name(&self) -> &'static str;

    /// Scans the platform's camera enumeration.
    fn enumerate(&mut self) -> Result<Vec<CameraInfo>, CameraError>;

    /// Acquires the hardware resource behind `id`. The returned device is
    /// the only live handle to it; dropping the box releases the hardware.
    fn open(&mut self, id: &CameraId) -> Result<Box<dyn CameraDevice>, CameraError>;
}

/// An open camera device. Preview control follows the platform discipline:
/// a running preview must be stopped before the device is reconfigured.
pub trait CameraDevice: Send {
    fn bind_preview(&mut self, target: &PreviewTarget) -> Result<(), CameraError>;

    fn set_preview_orientation(&mut self, degrees: u16) -> Result<(), CameraError>;

    fn start_preview(&mut self) -> Result<(), CameraError>;

    fn stop_preview(&mut self) -> Result<(), CameraError>;

    /// Triggers a single still capture. `sink` is invoked exactly once with
    /// the encoded image bytes, on the driver's own delivery path. At most
    /// one capture may be outstanding at a time.
    fn take_picture(&mut self, sink: PictureSink) -> Result<(), CameraError>;
}
