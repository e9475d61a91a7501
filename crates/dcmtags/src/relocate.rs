//! Filesystem layout of processed files
//!
//! A received file `<dir>/<name>` ends up as
//! `<dir>/<series>/<series>#<name>.dcm`, with its tags file beside it as
//! `<dir>/<series>/<series>#<name>.tags`. Files that fail go to
//! `<dir>/error/<name>.dcm`.

use crate::config::QUARANTINE_FOLDER;
use crate::error::{Result, TagsError};
use std::ffi::OsString;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::debug;

/// The file being processed, split into its folder and name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    dir: PathBuf,
    name: String,
}

impl SourceFile {
    pub fn new(path: &Path) -> Result<Self> {
        let name = path
            .file_name()
            .and_then(|name| name.to_str())
            .ok_or_else(|| TagsError::config(format!("'{}' does not name a file", path.display())))?;
        let dir = path.parent().map(Path::to_path_buf).unwrap_or_default();
        Ok(Self { dir, name: name.to_string() })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn path(&self) -> PathBuf {
        self.dir.join(&self.name)
    }

    pub fn quarantine_dir(&self) -> PathBuf {
        self.dir.join(QUARANTINE_FOLDER)
    }

    /// Where the file rests after quarantine.
    pub fn quarantine_path(&self) -> PathBuf {
        self.quarantine_dir().join(format!("{}.dcm", self.name))
    }

    /// Destination of this file within the folder of `series_uid`.
    pub fn relocation(&self, series_uid: &str) -> Relocation {
        let new_name = format!("{}#{}", series_uid, self.name);
        let folder = self.dir.join(series_uid);
        Relocation {
            destination: folder.join(format!("{new_name}.dcm")),
            descriptor: folder.join(format!("{new_name}.tags")),
            folder,
            new_name,
        }
    }
}

/// Where a successfully processed file goes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Relocation {
    pub folder: PathBuf,
    /// `<series>#<name>`, the name reported to the bookkeeper.
    pub new_name: String,
    pub destination: PathBuf,
    pub descriptor: PathBuf,
}

impl Relocation {
    pub fn create_folder(&self) -> io::Result<()> {
        if !self.folder.is_dir() {
            debug!(folder = %self.folder.display(), "Creating series folder");
            fs::create_dir_all(&self.folder)?;
        }
        Ok(())
    }

    pub fn move_in(&self, source: &SourceFile) -> io::Result<()> {
        fs::rename(source.path(), &self.destination)
    }

    /// Undo [`Relocation::move_in`].
    pub fn move_back(&self, source: &SourceFile) -> io::Result<()> {
        fs::rename(&self.destination, source.path())
    }
}

/// `path` with `suffix` appended to its file name.
pub fn with_suffix(path: &Path, suffix: &str) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(suffix);
    PathBuf::from(name)
}

/// Whether `uid` can be used as a single folder name.
pub fn is_folder_safe(uid: &str) -> bool {
    !uid.is_empty()
        && uid != "."
        && uid != ".."
        && !uid.chars().any(|c| c == '/' || c == '\\' || c == '\0' || c.is_control())
}
