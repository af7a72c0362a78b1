// This is free and unencumbered software released into the public domain.

#[cfg(not(feature = "cli"))]
compile_error!("camera-preview-viewer requires the 'cli' feature");

use bytes::Bytes;
use camera_preview_module::{
    cli,
    shared::{
        CameraError, CameraFacing, DisplayRotation, PictureSink, PreviewConfig, PreviewTarget,
        SurfaceCallbacks, SurfaceHost, open_preview,
    },
};
use clap::Parser;
use std::{
    process::ExitCode,
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
        mpsc::{RecvTimeoutError, sync_channel},
    },
    time::{Duration, Instant},
};

/// Headless stand-in for the camera screen: brings a surface up, runs the
/// preview, optionally switches facing, captures one still, and reports the
/// decoded dimensions instead of rendering it.
#[derive(Debug, Parser)]
#[command(name = "camera-preview-viewer", version)]
struct Options {
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Facing to open first.
    #[arg(long, value_enum, default_value = "front")]
    facing: FacingArg,

    /// Seconds of preview before the still capture.
    #[arg(long, default_value_t = 2)]
    capture_after: u64,

    /// Switch to the opposite facing before capturing.
    #[arg(long)]
    switch: bool,
}

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
enum FacingArg {
    Front,
    Back,
}

impl From<FacingArg> for CameraFacing {
    fn from(arg: FacingArg) -> Self {
        match arg {
            FacingArg::Front => CameraFacing::Front,
            FacingArg::Back => CameraFacing::Back,
        }
    }
}

/// Surface host whose drawable exists only while the viewer runs. Rotation
/// is fixed: a terminal does not rotate.
struct ViewerSurfaceHost {
    live: AtomicBool,
}

impl ViewerSurfaceHost {
    fn new() -> Arc<Self> {
        Arc::new(Self {
            live: AtomicBool::new(false),
        })
    }

    fn set_live(&self, live: bool) {
        self.live.store(live, Ordering::SeqCst);
    }
}

impl SurfaceHost for ViewerSurfaceHost {
    fn preview_target(&self) -> Option<PreviewTarget> {
        self.live
            .load(Ordering::SeqCst)
            .then(|| PreviewTarget::new("viewer-surface"))
    }

    fn display_rotation(&self) -> DisplayRotation {
        DisplayRotation::Deg0
    }
}

fn main() -> ExitCode {
    let options = Options::parse();
    cli::init_tracing(options.verbose);

    match run_viewer(&options) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => ExitCode::from(cli::handle_error(&err, options.verbose) as u8),
    }
}

fn run_viewer(options: &Options) -> Result<(), CameraError> {
    let quit = Arc::new(AtomicBool::new(false));
    {
        let quit2 = Arc::clone(&quit);
        ctrlc::set_handler(move || {
            quit2.store(true, Ordering::SeqCst);
        })
        .map_err(|e| CameraError::other(format!("{e}")))?;
    }

    let host = ViewerSurfaceHost::new();
    let mut binder = open_preview(
        Arc::clone(&host) as Arc<dyn SurfaceHost + Send + Sync>,
        PreviewConfig::new(options.facing.into()).with_event_capacity(16),
    )?;

    let (picture_tx, picture_rx) = sync_channel::<Bytes>(1);
    let sink: PictureSink = Arc::new(move |data| {
        let _ = picture_tx.try_send(data);
    });
    binder.set_picture_sink(sink);

    // The screen comes up: the host creates the surface and confirms a size.
    host.set_live(true);
    binder.on_surface_created();
    binder.on_surface_changed(0, 640, 480);

    wait_or_quit(&quit, Duration::from_secs(options.capture_after));

    let mut degraded = false;
    if options.switch && !quit.load(Ordering::SeqCst) {
        let next = binder.facing().opposite();
        if let Err(err) = binder.switch_to(next) {
            // Same degraded experience as tapping "switch" with one camera:
            // the preview goes dark but the app keeps running. Capturing
            // from the now-empty handle would only fail, so it is skipped.
            cli::report_error(&err, options.verbose);
            degraded = true;
        }
    }

    if !degraded && !quit.load(Ordering::SeqCst) {
        binder.take_picture()?;
        match picture_rx.recv_timeout(Duration::from_secs(10)) {
            Ok(data) => report_picture(&data),
            Err(RecvTimeoutError::Timeout) => eprintln!("capture timed out"),
            Err(RecvTimeoutError::Disconnected) => {},
        }
    }

    for event in binder.events().try_iter() {
        tracing::info!(?event, "preview event");
    }

    // The screen goes away: release everything.
    binder.on_surface_destroyed();
    host.set_live(false);
    Ok(())
}

fn report_picture(data: &Bytes) {
    match image::load_from_memory(data) {
        Ok(img) => println!(
            "captured {}x{} ({} bytes)",
            img.width(),
            img.height(),
            data.len()
        ),
        Err(err) => println!("captured {} bytes (undecodable: {err})", data.len()),
    }
}

fn wait_or_quit(quit: &AtomicBool, total: Duration) {
    let start = Instant::now();
    while !quit.load(Ordering::SeqCst) && start.elapsed() < total {
        std::thread::sleep(Duration::from_millis(50));
    }
}
