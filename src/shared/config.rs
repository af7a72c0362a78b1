// This is free and unencumbered software released into the public domain.

use crate::shared::CameraFacing;

#[derive(Clone, Debug)]
pub struct PreviewConfig {
    /// Facing opened on the first preview start. Explicit rather than an
    /// implicit front-camera default hidden inside the binder.
    pub initial_facing: CameraFacing,
    pub event_capacity: usize,
}

impl Default for PreviewConfig {
    fn default() -> Self {
        Self {
            initial_facing: CameraFacing::Front,
            event_capacity: 8,
        }
    }
}

impl PreviewConfig {
    pub fn new(initial_facing: CameraFacing) -> Self {
        Self {
            initial_facing,
            ..Default::default()
        }
    }

    pub fn with_event_capacity(mut self, n: usize) -> Self {
        self.event_capacity = n.max(1);
        self
    }
}
