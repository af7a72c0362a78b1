// This is free and unencumbered software released into the public domain.

//! Desktop capture backend driving an ffmpeg child process. Preview runs a
//! long-lived rawvideo child whose frames are drained by a reader thread;
//! still capture runs a one-shot `-frames:v 1` child on a background thread
//! and hands the encoded bytes to the sink.

use crate::shared::{
    CameraDevice, CameraDriver, CameraError, CameraFacing, CameraId, CameraInfo, PictureSink,
    PreviewTarget,
};
use bytes::Bytes;
use scopeguard::ScopeGuard;
use std::{
    io::Read,
    process::{Child, Command, Stdio},
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    thread::JoinHandle,
    time::Duration,
};
use tracing::{debug, warn};

const PREVIEW_WIDTH: usize = 640;
const PREVIEW_HEIGHT: usize = 480;
const PREVIEW_FRAME_SIZE: usize = PREVIEW_WIDTH * PREVIEW_HEIGHT * 3;

pub struct FfmpegCameraDriver;

impl FfmpegCameraDriver {
    pub fn new() -> Self {
        Self
    }
}

impl Default for FfmpegCameraDriver {
    fn default() -> Self {
        Self::new()
    }
}

impl CameraDriver for FfmpegCameraDriver {
    fn name(&self) -> &'static str {
        "ffmpeg"
    }

    fn enumerate(&mut self) -> Result<Vec<CameraInfo>, CameraError> {
        let mut inputs = Vec::new();

        #[cfg(target_os = "linux")]
        for index in 0..10 {
            let path = format!("/dev/video{index}");
            if std::path::Path::new(&path).exists() {
                inputs.push(path);
            }
        }

        #[cfg(not(target_os = "linux"))]
        inputs.push("default".to_string());

        // Desktop capture stacks expose no facing metadata; the first device
        // is treated as the back camera and any second one as the front.
        Ok(inputs
            .into_iter()
            .enumerate()
            .map(|(index, input)| CameraInfo {
                id: CameraId::new(&input),
                facing: if index == 0 {
                    CameraFacing::Back
                } else {
                    CameraFacing::Front
                },
                label: input,
            })
            .collect())
    }

    fn open(&mut self, id: &CameraId) -> Result<Box<dyn CameraDevice>, CameraError> {
        debug!(%id, "opening ffmpeg capture device");
        Ok(Box::new(FfmpegCameraDevice {
            input: id.as_str().to_string(),
            target: None,
            orientation_degrees: 0,
            child: None,
            stop: Arc::new(AtomicBool::new(false)),
            reader_join: None,
            capture_join: None,
        }))
    }
}

pub struct FfmpegCameraDevice {
    input: String,
    target: Option<PreviewTarget>,
    orientation_degrees: u16,
    child: Option<Child>,
    stop: Arc<AtomicBool>,
    reader_join: Option<JoinHandle<()>>,
    capture_join: Option<JoinHandle<()>>,
}

impl core::fmt::Debug for FfmpegCameraDevice {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("FfmpegCameraDevice")
            .field("input", &self.input)
            .field("target", &self.target)
            .field("orientation_degrees", &self.orientation_degrees)
            .field("child", &self.child.as_ref().map(|_| "<child>"))
            .finish()
    }
}

impl FfmpegCameraDevice {
    fn spawn_preview(&self) -> Result<Child, CameraError> {
        let mut cmd = Command::new("ffmpeg");
        cmd.args(["-hide_banner", "-loglevel", "error"]);
        for arg in input_args(&self.input) {
            cmd.arg(arg);
        }
        cmd.args(["-pix_fmt", "rgb24", "-f", "rawvideo", "-s"]);
        cmd.arg(format!("{PREVIEW_WIDTH}x{PREVIEW_HEIGHT}"));
        cmd.arg("pipe:1");
        cmd.stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null());
        cmd.spawn()
            .map_err(|e| CameraError::driver("spawning ffmpeg", e))
    }

    fn stop_child(&mut self) {
        if let Some(mut child) = self.child.take() {
            #[cfg(unix)]
            {
                unsafe {
                    let _ = libc::kill(child.id() as i32, libc::SIGTERM);
                }
                let start = std::time::Instant::now();
                while start.elapsed() < Duration::from_millis(900) {
                    if let Ok(Some(_)) = child.try_wait() {
                        break;
                    }
                    std::thread::sleep(Duration::from_millis(20));
                }
                let _ = child.kill();
                let _ = child.wait();
            }
            #[cfg(not(unix))]
            {
                let _ = child.kill();
                let _ = child.wait();
            }
        }
    }

    fn stop_preview_child(&mut self) {
        self.stop.store(true, Ordering::Relaxed);
        self.stop_child();
        if let Some(join) = self.reader_join.take() {
            let _ = join.join();
        }
    }
}

impl CameraDevice for FfmpegCameraDevice {
    fn bind_preview(&mut self, target: &PreviewTarget) -> Result<(), CameraError> {
        self.target = Some(target.clone());
        Ok(())
    }

    fn set_preview_orientation(&mut self, degrees: u16) -> Result<(), CameraError> {
        self.orientation_degrees = degrees;
        Ok(())
    }

    fn start_preview(&mut self) -> Result<(), CameraError> {
        if self.target.is_none() {
            return Err(CameraError::bind("binding the preview target"));
        }
        if self.child.is_some() {
            return Ok(());
        }

        self.stop.store(false, Ordering::Relaxed);

        let child = self.spawn_preview()?;
        let mut child = scopeguard::guard(child, |mut child| {
            let _ = child.kill();
            let _ = child.wait();
        });
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| CameraError::bind("piping ffmpeg stdout"))?;
        let child = ScopeGuard::into_inner(child);

        let stop = Arc::clone(&self.stop);
        let input = self.input.clone();
        let join = std::thread::spawn(move || {
            // Frames are drained to keep the child's pipe moving; rendering
            // into the preview target happens outside this process.
            let mut reader = std::io::BufReader::new(stdout);
            let mut buf = vec![0u8; PREVIEW_FRAME_SIZE];

            while !stop.load(Ordering::Relaxed) {
                match reader.read_exact(&mut buf) {
                    Ok(()) => {},
                    Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => break,
                    Err(e) => {
                        warn!(%input, %e, "preview read failed");
                        break;
                    },
                }
            }
        });

        debug!(
            input = %self.input,
            degrees = self.orientation_degrees,
            "preview child started"
        );
        self.child = Some(child);
        self.reader_join = Some(join);
        Ok(())
    }

    fn stop_preview(&mut self) -> Result<(), CameraError> {
        self.stop_preview_child();
        Ok(())
    }

    /// The capture child needs exclusive device access, so a running preview
    /// is stopped first. This mirrors the platform behaviour of the preview
    /// freezing once a picture is taken.
    fn take_picture(&mut self, sink: PictureSink) -> Result<(), CameraError> {
        self.stop_preview_child();

        let input = self.input.clone();
        let join = std::thread::spawn(move || {
            let mut cmd = Command::new("ffmpeg");
            cmd.args(["-hide_banner", "-loglevel", "error"]);
            for arg in input_args(&input) {
                cmd.arg(arg);
            }
            cmd.args(["-frames:v", "1", "-f", "image2", "-c:v", "mjpeg", "pipe:1"]);
            cmd.stdin(Stdio::null()).stderr(Stdio::null());

            match cmd.output() {
                Ok(out) if out.status.success() && !out.stdout.is_empty() => {
                    (sink)(Bytes::from(out.stdout));
                },
                Ok(out) => warn!(%input, status = ?out.status, "capture child failed"),
                Err(e) => warn!(%input, %e, "could not spawn ffmpeg for capture"),
            }
        });

        // One outstanding capture at a time; a previous handle left here is
        // detached rather than joined.
        self.capture_join = Some(join);
        Ok(())
    }
}

impl Drop for FfmpegCameraDevice {
    fn drop(&mut self) {
        self.stop_preview_child();
        // An in-flight capture is the caller's problem per the lifecycle
        // contract; its thread is detached, not joined.
        drop(self.capture_join.take());
    }
}

fn input_args(input: &str) -> Vec<String> {
    #[cfg(target_os = "linux")]
    {
        vec!["-f".into(), "v4l2".into(), "-i".into(), input.into()]
    }
    #[cfg(target_os = "macos")]
    {
        vec![
            "-f".into(),
            "avfoundation".into(),
            "-framerate".into(),
            "30".into(),
            "-i".into(),
            input.into(),
        ]
    }
    #[cfg(target_os = "windows")]
    {
        vec!["-f".into(), "dshow".into(), "-i".into(), format!("video={input}")]
    }
    #[cfg(not(any(target_os = "linux", target_os = "macos", target_os = "windows")))]
    {
        vec!["-i".into(), input.into()]
    }
}
