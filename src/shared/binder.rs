// This is free and unencumbered software released into the public domain.

use crate::shared::{
    CameraDeviceHandle, CameraError, CameraFacing, PictureSink, PreviewConfig, PreviewEvent,
    SurfaceCallbacks, SurfaceHost, SurfaceLifecycleState, preview_degrees,
};
use bytes::Bytes;
use std::sync::{
    Arc,
    mpsc::{Receiver, SyncSender, sync_channel},
};
use tracing::{debug, warn};

/// Bridges surface lifecycle notifications to camera preview control.
///
/// The binder reacts to the host's created/changed/destroyed notifications,
/// opening the camera on first bind, restarting the preview on every resize
/// (stop before start), and releasing the device when the surface goes away.
/// Acquisition and binding failures degrade to "no active preview" without
/// retries; they are observable only on the [`PreviewLifecycleBinder::events`]
/// channel.
///
/// All methods must be called from one logical callback sequence; the binder
/// is not a thread-safe type.
pub struct PreviewLifecycleBinder {
    handle: CameraDeviceHandle,
    host: Arc<dyn SurfaceHost + Send + Sync>,
    facing: CameraFacing,
    state: SurfaceLifecycleState,
    /// Whether a preview is actually running. The state can be Bound or
    /// Previewing with no live preview when degraded.
    previewing: bool,
    events_tx: SyncSender<PreviewEvent>,
    events_rx: Receiver<PreviewEvent>,
}

impl PreviewLifecycleBinder {
    pub fn new(
        handle: CameraDeviceHandle,
        host: Arc<dyn SurfaceHost + Send + Sync>,
        config: PreviewConfig,
    ) -> Self {
        let (events_tx, events_rx) = sync_channel(config.event_capacity.max(1));
        Self {
            handle,
            host,
            facing: config.initial_facing,
            state: SurfaceLifecycleState::Idle,
            previewing: false,
            events_tx,
            events_rx,
        }
    }

    pub fn state(&self) -> SurfaceLifecycleState {
        self.state
    }

    /// Facing the binder currently targets. The device itself may not be
    /// open when that facing is absent or acquisition failed.
    pub fn facing(&self) -> CameraFacing {
        self.facing
    }

    pub fn handle(&self) -> &CameraDeviceHandle {
        &self.handle
    }

    pub fn events(&self) -> &Receiver<PreviewEvent> {
        &self.events_rx
    }

    /// Registers the capture sink, wrapped so every delivery also emits a
    /// [`PreviewEvent::PictureTaken`] on the status channel.
    pub fn set_picture_sink(&mut self, sink: PictureSink) {
        let events_tx = self.events_tx.clone();
        let wrapped: PictureSink = Arc::new(move |data: Bytes| {
            let _ = events_tx.try_send(PreviewEvent::PictureTaken { bytes: data.len() });
            (sink)(data);
        });
        self.handle.set_picture_sink(wrapped);
    }

    /// Releases the current device, opens `facing`, and restarts the preview
    /// against the most recently known surface. Before the surface exists
    /// the open still happens and the preview starts once surface-created
    /// arrives. Idempotent under repetition.
    ///
    /// Calling this while a capture is in flight is not supported; the
    /// pending sink invocation may be lost.
    pub fn switch_to(&mut self, facing: CameraFacing) -> Result<(), CameraError> {
        debug!(%facing, "switching camera facing");
        self.stop_preview();
        self.facing = facing;
        self.handle.release();
        match self.handle.open(facing) {
            Ok(()) => {
                self.start_preview();
                Ok(())
            },
            Err(err) => {
                warn!(%facing, %err, "facing switch could not open camera");
                // The event owns the actual error; the caller gets the
                // canonical kind the handle's open contract promises.
                self.emit(PreviewEvent::Degraded { error: err });
                Err(CameraError::DeviceUnavailable)
            },
        }
    }

    /// Triggers a single still capture. [`CameraError::NotConfigured`] is a
    /// contract violation and always propagates; a missing device reports
    /// [`CameraError::DeviceUnavailable`], which callers may ignore the same
    /// way a dead preview is ignored. One capture may be outstanding at a
    /// time; do not release or switch facing until the sink has fired.
    pub fn take_picture(&mut self) -> Result<(), CameraError> {
        self.handle.take_picture()
    }

    /// Binds the current surface target and (re)starts the preview. With no
    /// live target this is a no-op; failures leave the state untouched and
    /// the preview inactive.
    fn start_preview(&mut self) {
        let Some(target) = self.host.preview_target() else {
            return;
        };

        if !self.handle.is_open() {
            if let Err(err) = self.handle.open(self.facing) {
                warn!(facing = %self.facing, %err, "camera unavailable");
                self.emit(PreviewEvent::Degraded { error: err });
                return;
            }
        }

        let degrees = preview_degrees(self.host.display_rotation());
        let result = self
            .handle
            .bind_preview(&target)
            .and_then(|()| self.handle.set_preview_orientation(degrees))
            .and_then(|()| self.handle.start_preview());
        match result {
            Ok(()) => {
                debug!(facing = %self.facing, degrees, "preview started");
                self.previewing = true;
                self.emit(PreviewEvent::PreviewStarted {
                    facing: self.facing,
                });
            },
            Err(err) => {
                warn!(%err, "preview start failed");
                self.previewing = false;
                self.emit(PreviewEvent::Degraded { error: err });
            },
        }
    }

    /// A running preview must be stopped before the device is reconfigured.
    fn stop_preview(&mut self) {
        if self.previewing {
            if let Err(err) = self.handle.stop_preview() {
                debug!(%err, "stop preview failed");
            }
            self.previewing = false;
            self.emit(PreviewEvent::PreviewStopped);
        }
    }

    fn emit(&self, event: PreviewEvent) {
        let _ = self.events_tx.try_send(event);
    }
}

impl SurfaceCallbacks for PreviewLifecycleBinder {
    fn on_surface_created(&mut self) {
        self.state = SurfaceLifecycleState::Bound;
        self.start_preview();
    }

    fn on_surface_changed(&mut self, _format: u32, width: u32, height: u32) {
        // Tolerate a stale notification after the target went away.
        if self.host.preview_target().is_none() {
            return;
        }
        debug!(width, height, "surface changed");
        self.stop_preview();
        self.state = SurfaceLifecycleState::Previewing;
        self.start_preview();
    }

    fn on_surface_destroyed(&mut self) {
        if self.previewing {
            self.previewing = false;
            self.emit(PreviewEvent::PreviewStopped);
        }
        // The only ordinary-lifecycle path that releases the hardware.
        self.handle.release();
        self.state = SurfaceLifecycleState::Idle;
    }
}
