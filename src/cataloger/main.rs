// This is free and unencumbered software released into the public domain.

#[cfg(not(feature = "cli"))]
compile_error!("camera-preview-cataloger requires the 'cli' feature");

use camera_preview_module::{
    cli,
    shared::{CameraError, open_driver},
};
use clap::Parser;
use serde_json::json;
use std::process::ExitCode;

/// Lists camera devices and the facing each one reports.
#[derive(Debug, Parser)]
#[command(name = "camera-preview-cataloger", version)]
struct Options {
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[arg(
        value_name = "FORMAT",
        short = 'o',
        long = "output",
        value_enum,
        default_value = "text"
    )]
    output: OutputFormat,
}

#[derive(Debug, Clone, clap::ValueEnum)]
enum OutputFormat {
    Text,
    Jsonl,
}

fn main() -> ExitCode {
    let options = Options::parse();
    cli::init_tracing(options.verbose);

    match run_cataloger(&options) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => ExitCode::from(cli::handle_error(&err, options.verbose) as u8),
    }
}

fn run_cataloger(options: &Options) -> Result<(), CameraError> {
    let mut driver = open_driver()?;
    let cameras = driver.enumerate()?;

    for info in &cameras {
        match options.output {
            OutputFormat::Text => {
                println!("{}\t{}\t{}", info.id, info.facing, info.label);
            },
            OutputFormat::Jsonl => {
                let line = json!({
                    "id": info.id.as_str(),
                    "facing": info.facing.to_string(),
                    "label": info.label,
                    "driver": driver.name(),
                });
                println!("{line}");
            },
        }
    }

    if cameras.is_empty() {
        eprintln!("no cameras found");
    }
    Ok(())
}
