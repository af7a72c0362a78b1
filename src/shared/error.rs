// This is free and unencumbered software released into the public domain.

use std::error::Error as StdError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CameraError {
    #[error("no suitable camera backend available")]
    NoDriver,

    /// No camera reports the requested facing, or acquiring the device failed
    /// (busy or absent). Recovered locally: the preview degrades to black.
    #[error("camera device unavailable")]
    DeviceUnavailable,

    /// The surface target rejected the binding or the preview failed to
    /// start. Recovered locally, like [`CameraError::DeviceUnavailable`].
    #[error("preview binding failed while {context}")]
    PreviewBindFailed { context: &'static str },

    /// Capture was requested before a picture sink was registered. The one
    /// fatal-by-contract condition: signalled synchronously to the caller.
    #[error("no picture sink registered")]
    NotConfigured,

    #[error("driver error while {context}")]
    DriverError {
        context: &'static str,
        #[source]
        source: Box<dyn StdError + Send + Sync>,
    },

    #[error("{0}")]
    Other(String),
}

impl CameraError {
    #[inline]
    pub fn driver(context: &'static str, source: impl StdError + Send + Sync + 'static) -> Self {
        Self::DriverError {
            context,
            source: Box::new(source),
        }
    }

    #[inline]
    pub fn bind(context: &'static str) -> Self {
        Self::PreviewBindFailed { context }
    }

    #[inline]
    pub fn other(msg: impl Into<String>) -> Self {
        Self::Other(msg.into())
    }
}
