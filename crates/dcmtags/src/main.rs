//! getdcmtags - tag extraction worker entry point

use clap::error::ErrorKind;
use dcmtags::config::{usage, MIN_ARGS};
use dcmtags::{pipeline, Invocation};
use dcmtags_common::logging::{init_logging, LogConfig, LogLevel, LogOutput};
use std::process;
use tracing::{debug, error, warn};

fn main() {
    if std::env::args_os().len() < MIN_ARGS {
        print!("{}", usage());
        return;
    }

    let (invocation, ignored) = match Invocation::from_args(std::env::args_os()) {
        Ok(parsed) => parsed,
        Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            let _ = e.print();
            return;
        },
        Err(e) => {
            print!("{}", usage());
            println!("ERROR: {}", e.kind().as_str().unwrap_or("invalid arguments"));
            process::exit(1);
        },
    };

    let log_config = LogConfig::builder()
        .level(LogLevel::Info)
        .output(LogOutput::Console)
        .log_file_prefix("getdcmtags")
        .build();

    // Environment variables take precedence
    let log_config = log_config.clone().merge_env().unwrap_or(log_config);

    // The worker runs without logging if the subscriber cannot be installed
    let _ = init_logging(&log_config);

    if !ignored.is_empty() {
        warn!(?ignored, "Ignoring surplus arguments");
    }

    match pipeline::run(&invocation) {
        Ok(outcome) => {
            if let Some(delivery) = outcome.delivery {
                debug!(grace = ?delivery.grace(), "Waiting for notification");
                let delivered = delivery.linger();
                debug!(?delivered, "Notification finished");
            }
        },
        Err(e) => {
            error!(error = %e, file = %invocation.file.display(), "Processing failed");
            process::exit(1);
        },
    }
}
