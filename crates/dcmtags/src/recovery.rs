//! Failure recovery
//!
//! Every failed run leaves exactly one `.error` marker describing the
//! failure, next to wherever the file ends up. The marker is a single line;
//! multi-line messages are joined with `; `. The marker is written under a
//! companion `.error.lock` file so that a concurrent mover does not pick the
//! file up half-marked.

use crate::relocate::{with_suffix, SourceFile};
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{error, info, warn};

/// Where the file rests after recovery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resting {
    /// Still at its original location.
    InPlace(PathBuf),
    /// Moved into the quarantine folder.
    Quarantined(PathBuf),
}

impl Resting {
    pub fn path(&self) -> &Path {
        match self {
            Resting::InPlace(path) | Resting::Quarantined(path) => path,
        }
    }
}

pub fn marker_path(data_file: &Path) -> PathBuf {
    with_suffix(data_file, ".error")
}

pub fn lock_path(data_file: &Path) -> PathBuf {
    with_suffix(data_file, ".error.lock")
}

/// Write `ERROR: <message>` to `<data_file>.error`.
///
/// Returns the marker path, or `None` when it could not be written. When the
/// lock cannot be created, no marker is written at all.
pub fn write_error_marker(data_file: &Path, message: &str) -> Option<PathBuf> {
    let message = single_line(message);
    let marker = marker_path(data_file);
    let lock = lock_path(data_file);
    error!("{message}");
    info!(marker = %marker.display(), "Writing error information");

    if let Err(err) = OpenOptions::new().write(true).create(true).truncate(true).open(&lock) {
        error!(lock = %lock.display(), error = %err, "Unable to create lock file");
        return None;
    }

    let written = fs::File::create(&marker).and_then(|mut file| writeln!(file, "ERROR: {message}"));
    if let Err(err) = &written {
        error!(marker = %marker.display(), error = %err, "Unable to write error file");
    }

    if let Err(err) = fs::remove_file(&lock) {
        warn!(lock = %lock.display(), error = %err, "Unable to remove lock file");
    }
    written.ok().map(|()| marker)
}

fn single_line(message: &str) -> String {
    message
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("; ")
}

/// Move the file into the quarantine folder and mark it there.
///
/// A marker already beside the file moves along with it. If the folder
/// cannot be created or the file cannot be moved, the file is marked where
/// it is.
pub fn quarantine(source: &SourceFile, message: &str) -> Resting {
    let original = source.path();
    let folder = source.quarantine_dir();

    if !folder.is_dir() {
        if let Err(err) = fs::create_dir_all(&folder) {
            error!(folder = %folder.display(), error = %err, "Unable to create directory");
            write_error_marker(&original, message);
            return Resting::InPlace(original);
        }
    }

    let target = source.quarantine_path();
    if let Err(err) = fs::rename(&original, &target) {
        error!(from = %original.display(), to = %target.display(), error = %err, "Unable to quarantine file");
        write_error_marker(&original, message);
        return Resting::InPlace(original);
    }

    let previous_marker = marker_path(&original);
    if previous_marker.exists() {
        if let Err(err) = fs::rename(&previous_marker, marker_path(&target)) {
            warn!(marker = %previous_marker.display(), error = %err, "Unable to move existing error file");
        }
    }

    write_error_marker(&target, message);
    Resting::Quarantined(target)
}

/// Mark the file where it is.
pub fn mark_in_place(data_file: &Path, message: &str) -> Resting {
    write_error_marker(data_file, message);
    Resting::InPlace(data_file.to_path_buf())
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn received(dir: &TempDir, name: &str) -> SourceFile {
        let path = dir.path().join(name);
        fs::write(&path, b"DICM").unwrap();
        SourceFile::new(&path).unwrap()
    }

    #[test]
    fn test_marker_content_and_lock_cleanup() {
        let dir = TempDir::new().unwrap();
        let data = dir.path().join("img1");
        fs::write(&data, b"x").unwrap();

        let marker = write_error_marker(&data, "Unable to read some DICOM tags\n").unwrap();
        assert_eq!(marker, dir.path().join("img1.error"));
        assert_eq!(fs::read_to_string(&marker).unwrap(), "ERROR: Unable to read some DICOM tags\n");
        assert!(!lock_path(&data).exists());
    }

    #[test]
    fn test_multi_line_message_is_written_as_one_line() {
        let dir = TempDir::new().unwrap();
        let data = dir.path().join("img1");
        fs::write(&data, b"x").unwrap();

        let message = "Unable to read some DICOM tags\nUnable to read tag PatientName\r\n\nError: bad\n";
        let marker = write_error_marker(&data, message).unwrap();
        let text = fs::read_to_string(&marker).unwrap();
        assert_eq!(text, "ERROR: Unable to read some DICOM tags; Unable to read tag PatientName; Error: bad\n");
        assert_eq!(text.lines().count(), 1);
    }

    #[test]
    fn test_no_marker_without_lock() {
        let dir = TempDir::new().unwrap();
        // The lock cannot be created inside a missing folder
        let data = dir.path().join("missing").join("img1");
        assert_eq!(write_error_marker(&data, "boom"), None);
        assert!(!marker_path(&data).exists());
    }

    #[test]
    fn test_quarantine_moves_file_and_existing_marker() {
        let dir = TempDir::new().unwrap();
        let source = received(&dir, "img1");
        fs::write(marker_path(&source.path()), "ERROR: earlier\n").unwrap();

        let resting = quarantine(&source, "Unable to read DICOM file img1");
        let target = dir.path().join("error").join("img1.dcm");
        assert_eq!(resting, Resting::Quarantined(target.clone()));
        assert!(!source.path().exists());
        assert_eq!(fs::read(&target).unwrap(), b"DICM");
        assert_eq!(
            fs::read_to_string(marker_path(&target)).unwrap(),
            "ERROR: Unable to read DICOM file img1\n"
        );
        assert!(!marker_path(&source.path()).exists());
    }

    #[test]
    fn test_quarantine_reuses_existing_folder() {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join("error")).unwrap();
        let source = received(&dir, "img2");
        assert!(matches!(quarantine(&source, "boom"), Resting::Quarantined(_)));
    }

    #[test]
    fn test_quarantine_falls_back_to_marking_in_place() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("error"), b"not a folder").unwrap();
        let source = received(&dir, "img1");

        let resting = quarantine(&source, "boom");
        assert_eq!(resting, Resting::InPlace(source.path()));
        assert!(source.path().exists());
        assert_eq!(fs::read_to_string(marker_path(&source.path())).unwrap(), "ERROR: boom\n");
    }
}
