//! dcmtags Library
#![deny(clippy::unwrap_used, clippy::expect_used)]
//!
//! Tag extraction worker for received DICOM files.
//!
//! # Overview
//!
//! Every file a DICOM receiver stores is handed to the `getdcmtags` binary
//! once. A run:
//!
//! - **Extracts** a fixed set of attributes plus operator-configured extras
//! - **Converts** their text from the declared character set to UTF-8
//! - **Relocates** the file to `<dir>/<SeriesInstanceUID>/<uid>#<name>.dcm`
//! - **Describes** it in a `.tags` JSON file beside it
//! - **Notifies** the bookkeeper over HTTP, best effort
//!
//! A file whose run fails ends up either where it was or in the `error/`
//! folder, always with an `.error` marker explaining why.
//!
//! # Example
//!
//! ```no_run
//! use dcmtags::{pipeline, Invocation};
//!
//! let invocation = Invocation::new("/var/incoming/img0001", "10.0.0.5", "STORESCU", "ANY-SCP");
//! match pipeline::run(&invocation) {
//!     Ok(outcome) => println!("filed as {}", outcome.relocation.destination.display()),
//!     Err(err) => eprintln!("{err}"),
//! }
//! ```

pub mod charset;
pub mod config;
pub mod context;
pub mod descriptor;
pub mod dictionary;
pub mod error;
pub mod extra;
pub mod fault;
pub mod key;
pub mod notify;
pub mod pipeline;
pub mod reader;
pub mod record;
pub mod recovery;
pub mod relocate;

// Re-export commonly used types
pub use config::Invocation;
pub use error::{Recovery, Result, Stage, TagsError};
pub use key::TagKey;
pub use pipeline::{Outcome, Pipeline};
