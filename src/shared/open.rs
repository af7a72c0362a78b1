// This is free and unencumbered software released into the public domain.

use crate::shared::{
    CameraDeviceHandle, CameraDriver, CameraError, PreviewConfig, PreviewLifecycleBinder,
    SurfaceHost,
};
use std::sync::Arc;

/// Picks the camera driver compiled into this build.
pub fn open_driver() -> Result<Box<dyn CameraDriver>, CameraError> {
    #[cfg(feature = "ffmpeg")]
    {
        Ok(Box::new(super::drivers::ffmpeg::FfmpegCameraDriver::new()))
    }
    #[cfg(not(feature = "ffmpeg"))]
    {
        Err(CameraError::NoDriver)
    }
}

/// Discovers camera facings and wires a lifecycle binder to `host`.
pub fn open_preview(
    host: Arc<dyn SurfaceHost + Send + Sync>,
    config: PreviewConfig,
) -> Result<PreviewLifecycleBinder, CameraError> {
    let driver = open_driver()?;
    let handle = CameraDeviceHandle::new(driver)?;
    Ok(PreviewLifecycleBinder::new(handle, host, config))
}
