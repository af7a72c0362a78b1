// This is free and unencumbered software released into the public domain.

//! CLI helpers (logging init, error reporting, exit-code mapping).
//!
//! This module must compile even when the crate feature `cli` is disabled,
//! because the library is built in non-CLI configurations.

#[cfg(feature = "cli")]
use crate::shared::CameraError;

#[cfg(feature = "cli")]
pub const EX_UNAVAILABLE: i32 = 69;
#[cfg(feature = "cli")]
pub const EX_SOFTWARE: i32 = 70;
#[cfg(feature = "cli")]
pub const EX_CONFIG: i32 = 78;

#[cfg(feature = "cli")]
pub fn init_tracing(verbose: u8) {
    use tracing_subscriber::EnvFilter;

    let default_directive = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

#[cfg(feature = "cli")]
pub fn handle_error(err: &CameraError, verbose: u8) -> i32 {
    tracing::error!(%err, "camera command failed");
    report_error(err, verbose);
    exit_code_for(err)
}

#[cfg(feature = "cli")]
pub fn report_error(err: &CameraError, verbose: u8) {
    use std::error::Error as _;
    use std::io::Write;

    let mut stderr = std::io::stderr();
    let _ = writeln!(stderr, "ERROR: {err}");

    if verbose >= 2 {
        let mut source = err.source();
        while let Some(cause) = source {
            let _ = writeln!(stderr, "  Caused by: {cause}");
            source = cause.source();
        }
    }
}

#[cfg(feature = "cli")]
pub fn exit_code_for(err: &CameraError) -> i32 {
    match err {
        CameraError::NoDriver => EX_UNAVAILABLE,
        CameraError::DeviceUnavailable => EX_UNAVAILABLE,
        CameraError::NotConfigured => EX_CONFIG,
        CameraError::PreviewBindFailed { .. } => EX_SOFTWARE,
        CameraError::DriverError { .. } => EX_SOFTWARE,
        CameraError::Other(_) => EX_SOFTWARE,
    }
}
