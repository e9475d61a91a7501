//! Per-invocation state threaded through the pipeline

use crate::config::Invocation;
use crate::key::TagKey;
use crate::reader::Field;
use crate::relocate::{Relocation, SourceFile};

/// The three attributes every later stage depends on.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContextFields {
    pub specific_character_set: Vec<u8>,
    pub series_instance_uid: Vec<u8>,
    pub sop_instance_uid: Vec<u8>,
}

/// Everything one run of the pipeline accumulates.
#[derive(Debug, Clone)]
pub struct PipelineContext {
    pub source: SourceFile,
    pub sender_address: String,
    pub sender_aet: String,
    pub receiver_aet: String,
    /// Extra attributes requested by the operator, in file order
    pub extra_keys: Vec<TagKey>,
    pub context: ContextFields,
    /// Fixed attributes in their declared order
    pub main_tags: Vec<Field>,
    pub extra_tags: Vec<Field>,
    /// Validated SeriesInstanceUID, usable as a folder name
    pub series_uid: String,
    /// Set once the file has been moved into its series folder
    pub relocated: Option<Relocation>,
}

impl PipelineContext {
    pub fn new(invocation: &Invocation, source: SourceFile, extra_keys: Vec<TagKey>) -> Self {
        Self {
            source,
            sender_address: invocation.sender_address.clone(),
            sender_aet: invocation.sender_aet.clone(),
            receiver_aet: invocation.receiver_aet.clone(),
            extra_keys,
            context: ContextFields::default(),
            main_tags: Vec::new(),
            extra_tags: Vec::new(),
            series_uid: String::new(),
            relocated: None,
        }
    }

    pub fn sop_instance_uid(&self) -> String {
        String::from_utf8_lossy(&self.context.sop_instance_uid).into_owned()
    }

    /// Source path as shown in messages.
    pub fn file_label(&self) -> String {
        self.source.path().display().to_string()
    }
}
