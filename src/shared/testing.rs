// This is free and unencumbered software released into the public domain.

//! Scripted driver and surface-host doubles for the unit tests. The driver
//! records every hardware call so tests can assert ordering and the
//! one-resource invariant.

use crate::shared::{
    CameraDevice, CameraDriver, CameraError, CameraFacing, CameraId, CameraInfo, DisplayRotation,
    PictureSink, PreviewTarget, SurfaceHost,
};
use bytes::Bytes;
use std::sync::{
    Arc, Mutex,
    atomic::{AtomicUsize, Ordering},
};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Op {
    Open(String),
    Release(String),
    BindPreview(String),
    SetOrientation(u16),
    StartPreview,
    StopPreview,
    TakePicture,
}

#[derive(Clone, Default)]
pub struct OpLog(Arc<Mutex<Vec<Op>>>);

impl OpLog {
    pub fn push(&self, op: Op) {
        self.0.lock().unwrap().push(op);
    }

    pub fn snapshot(&self) -> Vec<Op> {
        self.0.lock().unwrap().clone()
    }

    pub fn clear(&self) {
        self.0.lock().unwrap().clear();
    }
}

/// A fake camera installation: a device list plus shared observation state.
pub struct FakeRig {
    cameras: Vec<CameraInfo>,
    ops: OpLog,
    live: Arc<AtomicUsize>,
    picture: Bytes,
    fail_open: bool,
    fail_start: bool,
}

impl FakeRig {
    pub fn front_and_back() -> Self {
        Self::with_cameras(vec![
            camera("cam-back", CameraFacing::Back),
            camera("cam-front", CameraFacing::Front),
        ])
    }

    pub fn back_only() -> Self {
        Self::with_cameras(vec![camera("cam-back", CameraFacing::Back)])
    }

    pub fn with_cameras(cameras: Vec<CameraInfo>) -> Self {
        Self {
            cameras,
            ops: OpLog::default(),
            live: Arc::new(AtomicUsize::new(0)),
            picture: Bytes::from_static(b"picture"),
            fail_open: false,
            fail_start: false,
        }
    }

    pub fn with_picture(mut self, picture: Bytes) -> Self {
        self.picture = picture;
        self
    }

    pub fn with_failing_open(mut self) -> Self {
        self.fail_open = true;
        self
    }

    pub fn with_failing_start(mut self) -> Self {
        self.fail_start = true;
        self
    }

    pub fn driver(&self) -> Box<dyn CameraDriver> {
        Box::new(FakeDriver {
            cameras: self.cameras.clone(),
            ops: self.ops.clone(),
            live: Arc::clone(&self.live),
            picture: self.picture.clone(),
            fail_open: self.fail_open,
            fail_start: self.fail_start,
        })
    }

    /// Number of currently-open fake devices.
    pub fn live_devices(&self) -> usize {
        self.live.load(Ordering::SeqCst)
    }

    pub fn ops(&self) -> Vec<Op> {
        self.ops.snapshot()
    }

    pub fn clear_ops(&self) {
        self.ops.clear();
    }
}

fn camera(id: &str, facing: CameraFacing) -> CameraInfo {
    CameraInfo {
        id: CameraId::new(id),
        facing,
        label: id.to_string(),
    }
}

struct FakeDriver {
    cameras: Vec<CameraInfo>,
    ops: OpLog,
    live: Arc<AtomicUsize>,
    picture: Bytes,
    fail_open: bool,
    fail_start: bool,
}

impl CameraDriver for FakeDriver {
    fn name(&self) -> &'static str {
        "fake"
    }

    fn enumerate(&mut self) -> Result<Vec<CameraInfo>, CameraError> {
        Ok(self.cameras.clone())
    }

    fn open(&mut self, id: &CameraId) -> Result<Box<dyn CameraDevice>, CameraError> {
        if self.fail_open {
            return Err(CameraError::other("device busy"));
        }
        self.ops.push(Op::Open(id.as_str().to_string()));
        self.live.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(FakeDevice {
            id: id.as_str().to_string(),
            ops: self.ops.clone(),
            live: Arc::clone(&self.live),
            picture: self.picture.clone(),
            fail_start: self.fail_start,
        }))
    }
}

struct FakeDevice {
    id: String,
    ops: OpLog,
    live: Arc<AtomicUsize>,
    picture: Bytes,
    fail_start: bool,
}

impl CameraDevice for FakeDevice {
    fn bind_preview(&mut self, target: &PreviewTarget) -> Result<(), CameraError> {
        self.ops.push(Op::BindPreview(target.id().to_string()));
        Ok(())
    }

    fn set_preview_orientation(&mut self, degrees: u16) -> Result<(), CameraError> {
        self.ops.push(Op::SetOrientation(degrees));
        Ok(())
    }

    fn start_preview(&mut self) -> Result<(), CameraError> {
        if self.fail_start {
            return Err(CameraError::bind("starting preview"));
        }
        self.ops.push(Op::StartPreview);
        Ok(())
    }

    fn stop_preview(&mut self) -> Result<(), CameraError> {
        self.ops.push(Op::StopPreview);
        Ok(())
    }

    fn take_picture(&mut self, sink: PictureSink) -> Result<(), CameraError> {
        self.ops.push(Op::TakePicture);
        // Delivery is synchronous here; the real driver uses its own thread.
        (sink)(self.picture.clone());
        Ok(())
    }
}

impl Drop for FakeDevice {
    fn drop(&mut self) {
        self.ops.push(Op::Release(self.id.clone()));
        self.live.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Surface host double with a settable target and rotation.
pub struct FakeHost {
    target: Mutex<Option<PreviewTarget>>,
    rotation: Mutex<DisplayRotation>,
}

impl FakeHost {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            target: Mutex::new(None),
            rotation: Mutex::new(DisplayRotation::Deg0),
        })
    }

    pub fn set_target(&self, target: Option<PreviewTarget>) {
        *self.target.lock().unwrap() = target;
    }

    pub fn set_rotation(&self, rotation: DisplayRotation) {
        *self.rotation.lock().unwrap() = rotation;
    }
}

impl SurfaceHost for FakeHost {
    fn preview_target(&self) -> Option<PreviewTarget> {
        self.target.lock().unwrap().clone()
    }

    fn display_rotation(&self) -> DisplayRotation {
        *self.rotation.lock().unwrap()
    }
}
