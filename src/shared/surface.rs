// This is free and unencumbered software released into the public domain.

/// Opaque handle to the drawable a preview renders into. The surface host
/// owns the drawable; this token only identifies it to the camera driver.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PreviewTarget(String);

impl PreviewTarget {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn id(&self) -> &str {
        &self.0
    }
}

/// Display rotation as reported by the surface host.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DisplayRotation {
    Deg0,
    Deg90,
    Deg180,
    Deg270,
}

/// Degrees the preview must be rotated to match the display. The sensor is
/// mounted landscape, so the natural (portrait, rotation 0) orientation
/// needs a 90 degree correction.
pub fn preview_degrees(rotation: DisplayRotation) -> u16 {
    match rotation {
        DisplayRotation::Deg0 => 90,
        DisplayRotation::Deg90 => 0,
        DisplayRotation::Deg180 => 270,
        DisplayRotation::Deg270 => 180,
    }
}

/// The view system that owns the drawable and the display. Both values are
/// sampled on demand; rotation in particular is never pushed, so the binder
/// re-reads it at every preview (re)start.
pub trait SurfaceHost {
    /// The current preview target, if the surface is live.
    fn preview_target(&self) -> Option<PreviewTarget>;

    fn display_rotation(&self) -> DisplayRotation;
}

/// Surface lifecycle notifications. For a given surface instance the host
/// delivers created first and destroyed last, with changed zero or more
/// times in between, all on one logical callback sequence.
pub trait SurfaceCallbacks {
    fn on_surface_created(&mut self);

    fn on_surface_changed(&mut self, format: u32, width: u32, height: u32);

    fn on_surface_destroyed(&mut self);
}

/// Where the binder believes the surface is in its lifecycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SurfaceLifecycleState {
    /// No surface; no preview attempted.
    Idle,
    /// Surface created but not yet confirmed sized.
    Bound,
    /// Surface confirmed with a concrete format and size.
    Previewing,
}
