//! Invocation and runtime configuration
//!
//! The worker is configured almost entirely through positional arguments
//! supplied by the caller that watches the incoming folder. The notifier
//! bounds can additionally be tuned through the environment.
//!
//! Only the exact flag spellings below are treated as flags. Every other
//! argument is positional, even when it starts with `-`, and positionals
//! past the bookkeeper token are ignored.

use crate::notify::NotifyTarget;
use clap::Parser;
use std::ffi::OsString;
use std::path::PathBuf;
use std::time::Duration;

// ============================================================================
// Configuration Constants
// ============================================================================

/// Name of the file listing extra attributes to extract.
pub const EXTRA_TAGS_FILE: &str = "dcm_extra_tags";

/// Name of the file selecting which stage to fail when fault injection is on.
pub const INJECT_ERROR_FILE: &str = "dcm_inject_error";

/// Name of the quarantine folder created beside failed files.
pub const QUARANTINE_FOLDER: &str = "error";

/// Per-attempt timeout of the bookkeeper notification.
pub const DEFAULT_NOTIFY_TIMEOUT_SECS: u64 = 1;

/// Number of notification attempts.
pub const DEFAULT_NOTIFY_ATTEMPTS: u32 = 3;

/// Minimum number of command line arguments, program name included.
pub const MIN_ARGS: usize = 5;

/// Positional arguments taken from the command line; later ones are ignored.
const MAX_POSITIONALS: usize = 6;

/// Flags recognised anywhere on the command line.
const SWITCHES: &[&str] = &["--inject-errors", "--tags-stop-early", "--help", "-h", "--version", "-V"];

/// Options taking a value, either as `--name=value` or as the next argument.
const VALUED: &[&str] = &["--notify-timeout-secs", "--notify-attempts"];

pub fn usage() -> String {
    format!(
        "\ngetdcmtags Version {}\n------------------------\n\n\
         Usage: [dcm file to analyze] [sender address] [sender AET] [receiver AET] \
         [ip:port of bookkeeper] [api key for bookkeeper] [--inject-errors] [--tags-stop-early]\n",
        env!("CARGO_PKG_VERSION")
    )
}

/// Command line of one worker invocation
#[derive(Parser, Debug, Clone)]
#[command(name = "getdcmtags")]
#[command(author, version, about, long_about = None)]
pub struct Invocation {
    /// DICOM file to analyze
    pub file: PathBuf,

    /// Address of the sending node
    pub sender_address: String,

    /// AE title of the sender
    pub sender_aet: String,

    /// AE title of the receiver
    pub receiver_aet: String,

    /// ip:port of the bookkeeper; empty disables notification
    pub bookkeeper: Option<String>,

    /// API token for the bookkeeper
    pub bookkeeper_token: Option<String>,

    /// Fail the stage named in ./dcm_inject_error (testing only)
    #[arg(long)]
    pub inject_errors: bool,

    /// Stop parsing after the last attribute that is extracted
    #[arg(long)]
    pub tags_stop_early: bool,

    /// Per-attempt notification timeout in seconds
    #[arg(long, env = "DCMTAGS_NOTIFY_TIMEOUT_SECS", default_value_t = DEFAULT_NOTIFY_TIMEOUT_SECS, hide = true)]
    pub notify_timeout_secs: u64,

    /// Number of notification attempts
    #[arg(long, env = "DCMTAGS_NOTIFY_ATTEMPTS", default_value_t = DEFAULT_NOTIFY_ATTEMPTS, hide = true)]
    pub notify_attempts: u32,
}

impl Invocation {
    /// Parse a full command line, program name included.
    ///
    /// Returns the invocation and the surplus positional arguments that
    /// were dropped.
    pub fn from_args<I, T>(args: I) -> Result<(Self, Vec<String>), clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString>,
    {
        let (arranged, ignored) = arrange_args(args);
        Ok((Self::try_parse_from(arranged)?, ignored))
    }

    /// Build an invocation for `file` with the given sender and receiver.
    pub fn new(
        file: impl Into<PathBuf>,
        sender_address: impl Into<String>,
        sender_aet: impl Into<String>,
        receiver_aet: impl Into<String>,
    ) -> Self {
        Self {
            file: file.into(),
            sender_address: sender_address.into(),
            sender_aet: sender_aet.into(),
            receiver_aet: receiver_aet.into(),
            bookkeeper: None,
            bookkeeper_token: None,
            inject_errors: false,
            tags_stop_early: false,
            notify_timeout_secs: DEFAULT_NOTIFY_TIMEOUT_SECS,
            notify_attempts: DEFAULT_NOTIFY_ATTEMPTS,
        }
    }

    /// The bookkeeper to notify, or `None` when no address was given.
    pub fn notify_target(&self) -> Option<NotifyTarget> {
        let address = self.bookkeeper.as_deref().map(str::trim).filter(|a| !a.is_empty())?;
        Some(NotifyTarget {
            address: address.to_string(),
            token: self.bookkeeper_token.clone().unwrap_or_default(),
            timeout: Duration::from_secs(self.notify_timeout_secs.max(1)),
            attempts: self.notify_attempts.max(1),
        })
    }
}

/// Move flags in front of a `--` separator and positionals behind it.
fn arrange_args<I, T>(args: I) -> (Vec<OsString>, Vec<String>)
where
    I: IntoIterator<Item = T>,
    T: Into<OsString>,
{
    let mut args = args.into_iter().map(Into::into);
    let mut flags: Vec<OsString> = args.next().into_iter().collect();
    let mut positionals = Vec::new();
    let mut ignored = Vec::new();

    while let Some(arg) = args.next() {
        let text = arg.to_string_lossy().into_owned();
        let valued = VALUED
            .iter()
            .find(|name| text == **name || text.starts_with(&format!("{name}=")));
        if SWITCHES.contains(&text.as_str()) {
            flags.push(arg);
        } else if let Some(name) = valued {
            let takes_next = text == *name;
            flags.push(arg);
            if takes_next {
                flags.extend(args.next());
            }
        } else if positionals.len() < MAX_POSITIONALS {
            positionals.push(arg);
        } else {
            ignored.push(text);
        }
    }

    flags.push(OsString::from("--"));
    flags.extend(positionals);
    (flags, ignored)
}
