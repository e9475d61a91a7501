//! The tag extraction pipeline
//!
//! One run takes a received file through these stages:
//!
//! 1. load the record, optionally stopping after the last attribute needed
//! 2. read the context attributes and the fixed attribute set
//! 3. read the extra attributes configured by the operator
//! 4. select the character set and convert every value to UTF-8
//! 5. create the series folder
//! 6. move the file into it
//! 7. write the tags file beside it
//!
//! and finally notifies the bookkeeper. When a stage fails, [`recover`]
//! leaves the file either where it was or in the quarantine folder, with an
//! error marker beside it.

use crate::charset::{CharsetConverter, CharsetNormalizer, DicomCharsets};
use crate::config::{Invocation, INJECT_ERROR_FILE};
use crate::context::{ContextFields, PipelineContext};
use crate::descriptor::Descriptor;
use crate::dictionary::{display_name, tags};
use crate::error::{Recovery, Result, Stage, TagsError};
use crate::extra;
use crate::fault::FaultInjector;
use crate::key::TagKey;
use crate::notify::{self, Delivery, Registration};
use crate::reader::{self, Field};
use crate::record::{DecodedFile, Part10Decoder, Record, RecordDecoder};
use crate::recovery::{self, Resting};
use crate::relocate::{self, Relocation, SourceFile};
use std::path::Path;
use tracing::{debug, error, info};

/// Attributes read before the fixed set.
pub const CONTEXT_TAGS: [TagKey; 3] = [
    tags::SPECIFIC_CHARACTER_SET,
    tags::SERIES_INSTANCE_UID,
    tags::SOP_INSTANCE_UID,
];

/// The fixed attribute set, in tags file order. Repeated entries are
/// written repeatedly.
pub const FIXED_TAGS: &[TagKey] = &[
    tags::MODALITY,
    tags::BODY_PART_EXAMINED,
    tags::PROTOCOL_NAME,
    tags::SPECIFIC_CHARACTER_SET,
    tags::MODALITY,
    tags::BODY_PART_EXAMINED,
    tags::PROTOCOL_NAME,
    tags::RETRIEVE_AE_TITLE,
    tags::STATION_AE_TITLE,
    tags::MANUFACTURER,
    tags::MANUFACTURER_MODEL_NAME,
    tags::STUDY_DESCRIPTION,
    tags::CODE_VALUE,
    tags::CODE_MEANING,
    tags::SERIES_DESCRIPTION,
    tags::PATIENT_NAME,
    tags::PATIENT_ID,
    tags::PATIENT_BIRTH_DATE,
    tags::PATIENT_SEX,
    tags::ACCESSION_NUMBER,
    tags::REFERRING_PHYSICIAN_NAME,
    tags::STUDY_ID,
    tags::SERIES_NUMBER,
    tags::STUDY_INSTANCE_UID,
    tags::SERIES_DATE,
    tags::SERIES_TIME,
    tags::ACQUISITION_DATE,
    tags::ACQUISITION_TIME,
    tags::SEQUENCE_NAME,
    tags::SCANNING_SEQUENCE,
    tags::SEQUENCE_VARIANT,
    tags::MAGNETIC_FIELD_STRENGTH,
    tags::STATION_NAME,
    tags::DEVICE_SERIAL_NUMBER,
    tags::DEVICE_UID,
    tags::SOFTWARE_VERSIONS,
    tags::CONTRAST_BOLUS_AGENT,
    tags::IMAGE_COMMENTS,
    tags::SLICE_THICKNESS,
    tags::INSTANCE_NUMBER,
    tags::ACQUISITION_NUMBER,
    tags::INSTITUTION_NAME,
    tags::ACQUISITION_TYPE,
    tags::IMAGE_TYPE,
];

/// First key past every attribute the run extracts.
pub fn stop_field(extra_keys: &[TagKey]) -> TagKey {
    let last = CONTEXT_TAGS
        .iter()
        .chain(FIXED_TAGS)
        .chain(extra_keys)
        .copied()
        .fold(TagKey::new(0, 0), TagKey::max);
    debug!(last = %last, "Last extracted attribute");
    last.successor()
}

/// Result of a successful run.
#[derive(Debug)]
pub struct Outcome {
    pub relocation: Relocation,
    pub delivery: Option<Delivery>,
}

pub struct Pipeline<D, C> {
    decoder: D,
    normalizer: CharsetNormalizer<C>,
    faults: FaultInjector,
    stop_early: bool,
}

impl Pipeline<Part10Decoder, DicomCharsets> {
    pub fn standard(faults: FaultInjector, stop_early: bool) -> Self {
        Self::new(Part10Decoder, DicomCharsets::default(), faults, stop_early)
    }
}

impl<D: RecordDecoder, C: CharsetConverter> Pipeline<D, C> {
    pub fn new(decoder: D, converter: C, faults: FaultInjector, stop_early: bool) -> Self {
        Self { decoder, normalizer: CharsetNormalizer::new(converter), faults, stop_early }
    }

    /// Run stages 1 to 7 on `ctx.source`.
    pub fn process(&mut self, ctx: &mut PipelineContext) -> Result<Relocation> {
        let decoded = self.load(ctx)?;
        self.read_tags(ctx, &decoded)?;
        self.read_extra_tags(ctx, &decoded)?;
        let descriptor = self.convert(ctx)?;
        let relocation = ctx.source.relocation(&ctx.series_uid);
        self.file_away(ctx, relocation, &descriptor)
    }

    fn load(&self, ctx: &PipelineContext) -> Result<DecodedFile> {
        let stop = self.stop_early.then(|| stop_field(&ctx.extra_keys));
        info!(file = %ctx.file_label(), stop = ?stop.map(|key| key.to_string()), "Processing file");

        self.faults.check(Stage::Load)?;
        self.decoder
            .load(&ctx.source.path(), stop)
            .map_err(|source| TagsError::decode(ctx.source.name(), source))
    }

    fn read_tags(&self, ctx: &mut PipelineContext, decoded: &DecodedFile) -> Result<()> {
        self.faults.check(Stage::ReadTags)?;
        let file = ctx.file_label();
        let read = |record: &Record, key: TagKey| {
            reader::read_field(record, key)
                .map_err(|source| TagsError::tag_read(display_name(key), &file, source))
        };

        ctx.context = ContextFields {
            specific_character_set: read(&decoded.dataset, tags::SPECIFIC_CHARACTER_SET)?,
            series_instance_uid: read(&decoded.dataset, tags::SERIES_INSTANCE_UID)?,
            sop_instance_uid: read(&decoded.dataset, tags::SOP_INSTANCE_UID)?,
        };

        let mut main_tags = reader::read_fields(&decoded.dataset, FIXED_TAGS)
            .map_err(|(key, source)| TagsError::tag_read(display_name(key), &file, source))?;
        let sop_class = read(&decoded.meta, tags::MEDIA_STORAGE_SOP_CLASS_UID)?;
        main_tags.push(Field::new(tags::MEDIA_STORAGE_SOP_CLASS_UID, sop_class));
        ctx.main_tags = main_tags;

        let uid = String::from_utf8(ctx.context.series_instance_uid.clone())
            .ok()
            .filter(|uid| relocate::is_folder_safe(uid))
            .ok_or_else(|| TagsError::InvalidSeriesUid {
                uid: String::from_utf8_lossy(&ctx.context.series_instance_uid).into_owned(),
                file: file.clone(),
            })?;
        ctx.series_uid = uid;
        Ok(())
    }

    fn read_extra_tags(&self, ctx: &mut PipelineContext, decoded: &DecodedFile) -> Result<()> {
        self.faults.check(Stage::ReadExtraTags)?;
        ctx.extra_tags = reader::read_fields(&decoded.dataset, &ctx.extra_keys).map_err(|(key, source)| {
            TagsError::extra_tag_read(display_name(key), ctx.file_label(), source)
        })?;
        Ok(())
    }

    /// Select the character set and build the tags file content.
    fn convert(&mut self, ctx: &PipelineContext) -> Result<Descriptor> {
        let label = String::from_utf8_lossy(&ctx.context.specific_character_set).into_owned();
        self.faults.check(Stage::SelectCharset)?;
        self.normalizer
            .activate(&label)
            .map_err(|source| TagsError::CharsetSelect { label: label.clone(), source })?;

        let convert = |name: &str, raw: &[u8]| {
            self.normalizer.convert(raw).map_err(|source| {
                error!(tag = name, file = %ctx.file_label(), "Unable to convert charset");
                TagsError::CharsetConvert { tag: name.to_string(), file: ctx.file_label(), source }
            })
        };

        let mut descriptor = Descriptor::new();
        let context = &ctx.context;
        for (name, raw) in [
            ("SpecificCharacterSet", &context.specific_character_set),
            ("SeriesInstanceUID", &context.series_instance_uid),
            ("SOPInstanceUID", &context.sop_instance_uid),
        ] {
            descriptor.push(name, convert(name, raw.as_slice())?);
        }
        descriptor.push("SenderAddress", ctx.sender_address.as_str());
        descriptor.push("SenderAET", ctx.sender_aet.as_str());
        descriptor.push("ReceiverAET", ctx.receiver_aet.as_str());

        for field in ctx.main_tags.iter().chain(&ctx.extra_tags) {
            let name = display_name(field.key);
            let value = convert(&name, field.value.as_slice())?;
            descriptor.push(name, value);
        }
        Ok(descriptor)
    }

    /// Stages 5 to 7.
    fn file_away(
        &self,
        ctx: &mut PipelineContext,
        relocation: Relocation,
        descriptor: &Descriptor,
    ) -> Result<Relocation> {
        self.faults.check(Stage::SeriesFolder)?;
        relocation
            .create_folder()
            .map_err(|source| TagsError::SeriesFolder { uid: ctx.series_uid.clone(), source })?;

        self.faults.check(Stage::Move)?;
        relocation.move_in(&ctx.source).map_err(|source| TagsError::Move {
            destination: relocation.destination.clone(),
            source,
        })?;
        ctx.relocated = Some(relocation.clone());

        self.faults.check(Stage::WriteDescriptor)?;
        descriptor
            .write(&relocation.descriptor, ctx.source.name())
            .map_err(|source| TagsError::DescriptorWrite { name: relocation.new_name.clone(), source })?;

        info!(destination = %relocation.destination.display(), "File processed");
        Ok(relocation)
    }
}

/// Leave the file of a failed run in a marked, discoverable place.
pub fn recover(ctx: &PipelineContext, err: &TagsError) -> Option<Resting> {
    let message = err.to_string();
    let resting = match err.recovery() {
        Recovery::None => return None,
        Recovery::Quarantine => recovery::quarantine(&ctx.source, &message),
        Recovery::MarkInPlace => recovery::mark_in_place(&ctx.source.path(), &message),
        Recovery::RollbackThenQuarantine => {
            if let Some(relocation) = &ctx.relocated {
                if let Err(move_err) = relocation.move_back(&ctx.source) {
                    error!(
                        from = %relocation.destination.display(),
                        error = %move_err,
                        "Unable to move file back"
                    );
                    return Some(recovery::mark_in_place(&relocation.destination, &message));
                }
            }
            recovery::quarantine(&ctx.source, &message)
        },
    };
    Some(resting)
}

/// Process the file named by `invocation` end to end.
///
/// Configuration problems fail before the file is touched. Any later failure
/// has already been recovered from when this returns.
pub fn run(invocation: &Invocation) -> Result<Outcome> {
    let extra_keys = extra::configured_keys()?;
    let source = SourceFile::new(&invocation.file)?;
    let faults = if invocation.inject_errors {
        FaultInjector::from_file(&Path::new(".").join(INJECT_ERROR_FILE))
    } else {
        FaultInjector::disabled()
    };

    let mut ctx = PipelineContext::new(invocation, source, extra_keys);
    let mut pipeline = Pipeline::standard(faults, invocation.tags_stop_early);

    match pipeline.process(&mut ctx) {
        Ok(relocation) => {
            let registration = Registration {
                filename: relocation.new_name.clone(),
                file_uid: ctx.sop_instance_uid(),
                series_uid: ctx.series_uid.clone(),
            };
            let delivery = notify::notify(invocation.notify_target().as_ref(), registration);
            Ok(Outcome { relocation, delivery })
        },
        Err(err) => {
            if let Some(resting) = recover(&ctx, &err) {
                debug!(resting = %resting.path().display(), "Recovered from failure");
            }
            Err(err)
        },
    }
}
