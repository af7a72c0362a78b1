// This is free and unencumbered software released into the public domain.

use crate::shared::{
    CameraDevice, CameraDriver, CameraError, CameraFacing, CameraId, PictureSink, PreviewTarget,
};
use tracing::{debug, warn};

/// Owns at most one open camera device and the facing it was opened with.
///
/// The one-resource invariant is structural: the open device lives in an
/// `Option`, and [`CameraDeviceHandle::open`] releases before acquiring, so
/// two devices are never held for the same slot.
pub struct CameraDeviceHandle {
    driver: Box<dyn CameraDriver>,
    front: Option<CameraId>,
    back: Option<CameraId>,
    open: Option<OpenDevice>,
    sink: Option<PictureSink>,
}

struct OpenDevice {
    device: Box<dyn CameraDevice>,
    facing: CameraFacing,
}

impl CameraDeviceHandle {
    /// Scans the driver's enumeration once, recording the first device that
    /// reports each facing. A facing with no device is a valid terminal
    /// state; opening it later fails with
    /// [`CameraError::DeviceUnavailable`].
    pub fn new(mut driver: Box<dyn CameraDriver>) -> Result<Self, CameraError> {
        let mut front = None;
        let mut back = None;
        for info in driver.enumerate()? {
            match info.facing {
                CameraFacing::Front if front.is_none() => front = Some(info.id),
                CameraFacing::Back if back.is_none() => back = Some(info.id),
                _ => {},
            }
        }
        debug!(
            driver = driver.name(),
            front = front.is_some(),
            back = back.is_some(),
            "camera facings discovered"
        );
        Ok(Self {
            driver,
            front,
            back,
            open: None,
            sink: None,
        })
    }

    /// Registers the sink that receives captured image bytes. Must be called
    /// before the first [`CameraDeviceHandle::take_picture`].
    pub fn set_picture_sink(&mut self, sink: PictureSink) {
        self.sink = Some(sink);
    }

    pub fn is_open(&self) -> bool {
        self.open.is_some()
    }

    /// Facing of the currently open device, if any.
    pub fn facing(&self) -> Option<CameraFacing> {
        self.open.as_ref().map(|o| o.facing)
    }

    pub fn has_facing(&self, facing: CameraFacing) -> bool {
        match facing {
            CameraFacing::Front => self.front.is_some(),
            CameraFacing::Back => self.back.is_some(),
        }
    }

    /// Releases any held device first, then acquires the device discovered
    /// for `facing`. On failure the handle stays empty and the caller sees
    /// [`CameraError::DeviceUnavailable`]; nothing is leaked and nothing is
    /// retried.
    pub fn open(&mut self, facing: CameraFacing) -> Result<(), CameraError> {
        self.release();

        let id = match facing {
            CameraFacing::Front => self.front.clone(),
            CameraFacing::Back => self.back.clone(),
        }
        .ok_or(CameraError::DeviceUnavailable)?;

        let device = self.driver.open(&id).map_err(|err| {
            warn!(%facing, %id, %err, "camera open failed");
            CameraError::DeviceUnavailable
        })?;
        debug!(%facing, %id, "camera opened");
        self.open = Some(OpenDevice { device, facing });
        Ok(())
    }

    /// Idempotent: releasing an empty handle is a no-op.
    pub fn release(&mut self) {
        if let Some(open) = self.open.take() {
            debug!(facing = %open.facing, "camera released");
        }
    }

    pub fn bind_preview(&mut self, target: &PreviewTarget) -> Result<(), CameraError> {
        self.device_mut()?.bind_preview(target)
    }

    pub fn set_preview_orientation(&mut self, degrees: u16) -> Result<(), CameraError> {
        self.device_mut()?.set_preview_orientation(degrees)
    }

    pub fn start_preview(&mut self) -> Result<(), CameraError> {
        self.device_mut()?.start_preview()
    }

    pub fn stop_preview(&mut self) -> Result<(), CameraError> {
        self.device_mut()?.stop_preview()
    }

    /// Triggers a single still capture, delivering the bytes to the
    /// registered sink exactly once. A missing sink is a configuration
    /// error ([`CameraError::NotConfigured`]) and performs no hardware
    /// call; a missing device reports [`CameraError::DeviceUnavailable`].
    pub fn take_picture(&mut self) -> Result<(), CameraError> {
        let sink = self.sink.clone().ok_or(CameraError::NotConfigured)?;
        self.device_mut()?.take_picture(sink)
    }

    fn device_mut(&mut self) -> Result<&mut (dyn CameraDevice + 'static), CameraError> {
        self.open
            .as_mut()
            .map(|o| o.device.as_mut())
            .ok_or(CameraError::DeviceUnavailable)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::testing::{FakeRig, Op};
    use bytes::Bytes;
    use std::sync::{Arc, Mutex};

    #[test]
    fn back_only_rig_front_open_fails_back_succeeds() {
        let rig = FakeRig::back_only();
        let mut handle = CameraDeviceHandle::new(rig.driver()).unwrap();

        assert!(!handle.has_facing(CameraFacing::Front));
        assert!(handle.has_facing(CameraFacing::Back));
        assert!(matches!(
            handle.open(CameraFacing::Front),
            Err(CameraError::DeviceUnavailable)
        ));
        assert!(!handle.is_open());

        handle.open(CameraFacing::Back).unwrap();
        assert!(handle.is_open());
        assert_eq!(handle.facing(), Some(CameraFacing::Back));

        let delivered: Arc<Mutex<Vec<Bytes>>> = Arc::new(Mutex::new(Vec::new()));
        let delivered2 = Arc::clone(&delivered);
        handle.set_picture_sink(Arc::new(move |data| {
            delivered2.lock().unwrap().push(data);
        }));
        handle.take_picture().unwrap();
        assert_eq!(delivered.lock().unwrap().len(), 1);
    }

    #[test]
    fn open_releases_previous_device_first() {
        let rig = FakeRig::front_and_back();
        let mut handle = CameraDeviceHandle::new(rig.driver()).unwrap();

        handle.open(CameraFacing::Front).unwrap();
        handle.open(CameraFacing::Back).unwrap();

        assert_eq!(rig.live_devices(), 1);
        let ops = rig.ops();
        let release_pos = ops
            .iter()
            .position(|op| matches!(op, Op::Release(id) if id == "cam-front"))
            .unwrap();
        let reopen_pos = ops
            .iter()
            .position(|op| matches!(op, Op::Open(id) if id == "cam-back"))
            .unwrap();
        assert!(release_pos < reopen_pos);
    }

    #[test]
    fn release_is_idempotent() {
        let rig = FakeRig::front_and_back();
        let mut handle = CameraDeviceHandle::new(rig.driver()).unwrap();

        handle.open(CameraFacing::Front).unwrap();
        handle.release();
        handle.release();

        assert_eq!(rig.live_devices(), 0);
        let releases = rig
            .ops()
            .iter()
            .filter(|op| matches!(op, Op::Release(_)))
            .count();
        assert_eq!(releases, 1);
    }

    #[test]
    fn capture_without_sink_is_not_configured_and_touches_no_hardware() {
        let rig = FakeRig::front_and_back();
        let mut handle = CameraDeviceHandle::new(rig.driver()).unwrap();
        handle.open(CameraFacing::Front).unwrap();

        assert!(matches!(
            handle.take_picture(),
            Err(CameraError::NotConfigured)
        ));
        assert!(!rig.ops().contains(&Op::TakePicture));
    }

    #[test]
    fn capture_without_device_is_device_unavailable() {
        let rig = FakeRig::front_and_back();
        let mut handle = CameraDeviceHandle::new(rig.driver()).unwrap();
        handle.set_picture_sink(Arc::new(|_| {}));

        assert!(matches!(
            handle.take_picture(),
            Err(CameraError::DeviceUnavailable)
        ));
        assert!(!rig.ops().contains(&Op::TakePicture));
    }

    #[test]
    fn capture_delivers_bytes_exactly_once() {
        let rig = FakeRig::front_and_back().with_picture(Bytes::from_static(b"jpeg-bytes"));
        let mut handle = CameraDeviceHandle::new(rig.driver()).unwrap();
        handle.open(CameraFacing::Back).unwrap();

        let delivered: Arc<Mutex<Vec<Bytes>>> = Arc::new(Mutex::new(Vec::new()));
        let delivered2 = Arc::clone(&delivered);
        handle.set_picture_sink(Arc::new(move |data| {
            delivered2.lock().unwrap().push(data);
        }));

        handle.take_picture().unwrap();

        let got = delivered.lock().unwrap();
        assert_eq!(got.len(), 1);
        assert_eq!(got[0].as_ref(), b"jpeg-bytes");
    }

    #[test]
    fn preview_calls_route_to_the_open_device() {
        let rig = FakeRig::front_and_back();
        let mut handle = CameraDeviceHandle::new(rig.driver()).unwrap();
        handle.open(CameraFacing::Back).unwrap();

        handle.bind_preview(&PreviewTarget::new("surface-9")).unwrap();
        handle.set_preview_orientation(270).unwrap();
        handle.start_preview().unwrap();
        handle.stop_preview().unwrap();

        assert_eq!(
            rig.ops(),
            vec![
                Op::Open("cam-back".into()),
                Op::BindPreview("surface-9".into()),
                Op::SetOrientation(270),
                Op::StartPreview,
                Op::StopPreview,
            ]
        );
    }

    #[test]
    fn failed_open_leaves_handle_empty() {
        let rig = FakeRig::front_and_back().with_failing_open();
        let mut handle = CameraDeviceHandle::new(rig.driver()).unwrap();

        assert!(matches!(
            handle.open(CameraFacing::Front),
            Err(CameraError::DeviceUnavailable)
        ));
        assert!(!handle.is_open());
        assert_eq!(rig.live_devices(), 0);
    }
}
