//! Error types for the tag extraction pipeline
//!
//! Every failure the worker can run into is a [`TagsError`]. Errors that
//! happen while a file is being processed carry the [`Stage`] they belong to,
//! and the stage decides which [`Recovery`] the coordinator applies before
//! the process exits.

use crate::charset::CharsetError;
use crate::record::{DecodeError, ValueError};
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for pipeline operations
pub type Result<T> = std::result::Result<T, TagsError>;

/// Fallible steps of the pipeline, numbered as the fault injection ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    Load = 1,
    ReadTags = 2,
    ReadExtraTags = 3,
    SelectCharset = 4,
    SeriesFolder = 5,
    Move = 6,
    WriteDescriptor = 7,
}

impl Stage {
    pub const ALL: [Stage; 7] = [
        Stage::Load,
        Stage::ReadTags,
        Stage::ReadExtraTags,
        Stage::SelectCharset,
        Stage::SeriesFolder,
        Stage::Move,
        Stage::WriteDescriptor,
    ];

    pub fn id(self) -> u8 {
        self as u8
    }

    pub fn from_id(id: u8) -> Option<Stage> {
        Stage::ALL.into_iter().find(|stage| stage.id() == id)
    }

    /// What the coordinator does when this stage fails.
    pub fn recovery(self) -> Recovery {
        match self {
            Stage::Move => Recovery::MarkInPlace,
            Stage::WriteDescriptor => Recovery::RollbackThenQuarantine,
            _ => Recovery::Quarantine,
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Load => "load",
            Stage::ReadTags => "read tags",
            Stage::ReadExtraTags => "read extra tags",
            Stage::SelectCharset => "select character set",
            Stage::SeriesFolder => "create series folder",
            Stage::Move => "move",
            Stage::WriteDescriptor => "write tags file",
        };
        f.write_str(name)
    }
}

/// Terminal action taken after a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Recovery {
    /// Nothing was touched; exit without a marker.
    None,
    /// Move the file into `error/` and mark it there.
    Quarantine,
    /// Leave the file where it is and mark it.
    MarkInPlace,
    /// Move the file back to where it came from, then quarantine it.
    RollbackThenQuarantine,
}

#[derive(Error, Debug)]
pub enum TagsError {
    /// Invocation or environment is unusable
    #[error("Configuration error: {0}")]
    Config(String),

    /// The extra tags file exists but could not be read
    #[error("Unable to read extra_tags file {}: {source}", path.display())]
    ExtraTagsUnreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// An identifier in the extra tags file does not name a known attribute
    #[error("Unknown tag {0}")]
    UnknownTag(String),

    #[error("Unable to read DICOM file {file}\nError: {source}")]
    Decode {
        file: String,
        #[source]
        source: DecodeError,
    },

    #[error("Unable to read some DICOM tags\nUnable to read tag {tag} in {file}\nReason: {source}")]
    TagRead {
        tag: String,
        file: String,
        #[source]
        source: ValueError,
    },

    #[error("Unable to read some DICOM tags\nSeriesInstanceUID {uid:?} in {file} cannot be used as a folder name")]
    InvalidSeriesUid { uid: String, file: String },

    #[error("Unable to read extra tags\nUnable to read tag {tag} in {file}\nReason: {source}")]
    ExtraTagRead {
        tag: String,
        file: String,
        #[source]
        source: ValueError,
    },

    #[error("Unable to perform character set conversion!\nCannot select character set '{label}': {source}")]
    CharsetSelect {
        label: String,
        #[source]
        source: CharsetError,
    },

    #[error("Unable to convert charset for tag {tag}\nUnable to process file {file}: {source}")]
    CharsetConvert {
        tag: String,
        file: String,
        #[source]
        source: CharsetError,
    },

    #[error("Unable to create series folder for {uid}: {source}")]
    SeriesFolder {
        uid: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Unable to move DICOM file to {}: {source}", destination.display())]
    Move {
        destination: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Unable to write tagsfile file for {name}: {source}")]
    DescriptorWrite {
        name: String,
        #[source]
        source: std::io::Error,
    },

    /// A failure forced through the fault injection hook
    #[error("Injected fault {} ({stage})", stage.id())]
    Injected { stage: Stage },
}

impl TagsError {
    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create an unknown tag error
    pub fn unknown_tag(identifier: impl Into<String>) -> Self {
        Self::UnknownTag(identifier.into())
    }

    /// Create a decode error for `file`
    pub fn decode(file: impl Into<String>, source: DecodeError) -> Self {
        Self::Decode { file: file.into(), source }
    }

    /// Create a tag read error for the fixed set
    pub fn tag_read(tag: impl Into<String>, file: impl Into<String>, source: ValueError) -> Self {
        Self::TagRead { tag: tag.into(), file: file.into(), source }
    }

    /// Create a tag read error for the extra set
    pub fn extra_tag_read(tag: impl Into<String>, file: impl Into<String>, source: ValueError) -> Self {
        Self::ExtraTagRead { tag: tag.into(), file: file.into(), source }
    }

    pub fn injected(stage: Stage) -> Self {
        Self::Injected { stage }
    }

    /// The pipeline stage this error belongs to, if it happened while a
    /// file was being processed.
    pub fn stage(&self) -> Option<Stage> {
        match self {
            Self::Config(_) | Self::ExtraTagsUnreadable { .. } | Self::UnknownTag(_) => None,
            Self::Decode { .. } => Some(Stage::Load),
            Self::TagRead { .. } | Self::InvalidSeriesUid { .. } => Some(Stage::ReadTags),
            Self::ExtraTagRead { .. } => Some(Stage::ReadExtraTags),
            Self::CharsetSelect { .. } | Self::CharsetConvert { .. } => Some(Stage::SelectCharset),
            Self::SeriesFolder { .. } => Some(Stage::SeriesFolder),
            Self::Move { .. } => Some(Stage::Move),
            Self::DescriptorWrite { .. } => Some(Stage::WriteDescriptor),
            Self::Injected { stage } => Some(*stage),
        }
    }

    pub fn recovery(&self) -> Recovery {
        self.stage().map_or(Recovery::None, Stage::recovery)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_ids_round_trip() {
        for stage in Stage::ALL {
            assert_eq!(Stage::from_id(stage.id()), Some(stage));
        }
        assert_eq!(Stage::from_id(0), None);
        assert_eq!(Stage::from_id(8), None);
        assert_eq!(Stage::SelectCharset.id(), 4);
    }

    #[test]
    fn test_recovery_table() {
        assert_eq!(TagsError::unknown_tag("FooBarBaz").recovery(), Recovery::None);
        assert_eq!(
            TagsError::decode("img1", DecodeError::InvalidStream("bad".into())).recovery(),
            Recovery::Quarantine
        );
        assert_eq!(TagsError::injected(Stage::SeriesFolder).recovery(), Recovery::Quarantine);
        assert_eq!(TagsError::injected(Stage::Move).recovery(), Recovery::MarkInPlace);
        assert_eq!(
            TagsError::injected(Stage::WriteDescriptor).recovery(),
            Recovery::RollbackThenQuarantine
        );
    }

    #[test]
    fn test_messages_name_their_subject() {
        let err = TagsError::unknown_tag("FooBarBaz");
        assert_eq!(err.to_string(), "Unknown tag FooBarBaz");

        let err = TagsError::decode("img1", DecodeError::UnsupportedTransferSyntax("1.2.3".into()));
        assert_eq!(
            err.to_string(),
            "Unable to read DICOM file img1\nError: Unsupported transfer syntax: 1.2.3"
        );

        let err = TagsError::injected(Stage::Load);
        assert_eq!(err.to_string(), "Injected fault 1 (load)");
    }
}
