//! Attribute dictionary and identifier resolution
//!
//! The dictionary maps attribute keywords (`PatientName`) to their keys and
//! value representations. It is built once per process from the bundled
//! table and then only ever read; lookups take a scoped read guard on the
//! shared instance.

use crate::key::TagKey;
use crate::record::Vr;
use std::collections::HashMap;
use std::sync::{LazyLock, PoisonError, RwLock};

/// Read-only keyword/key index.
#[derive(Debug, Default)]
pub struct TagDictionary {
    by_name: HashMap<&'static str, TagKey>,
    by_key: HashMap<TagKey, (&'static str, Vr)>,
}

impl TagDictionary {
    /// Dictionary with no entries. Only literal `gggg,eeee` identifiers resolve.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Dictionary holding the bundled attribute table.
    pub fn standard() -> Self {
        let mut dictionary = Self::empty();
        for &(group, element, name, vr) in ENTRIES {
            let key = TagKey::new(group, element);
            dictionary.by_name.insert(name, key);
            dictionary.by_key.insert(key, (name, vr));
        }
        dictionary
    }

    /// Resolve a textual identifier to a key.
    ///
    /// `gggg,eeee` is taken literally without consulting the table; anything
    /// else is looked up as a keyword. Unknown keywords yield
    /// [`TagKey::UNDEFINED`].
    pub fn resolve(&self, identifier: &str) -> TagKey {
        if let Some(key) = TagKey::parse_hex_pair(identifier) {
            return key;
        }
        self.key_for(identifier.trim()).unwrap_or(TagKey::UNDEFINED)
    }

    pub fn key_for(&self, name: &str) -> Option<TagKey> {
        self.by_name.get(name).copied()
    }

    pub fn name_for(&self, key: TagKey) -> Option<&'static str> {
        self.by_key.get(&key).map(|(name, _)| *name)
    }

    pub fn vr_for(&self, key: TagKey) -> Option<Vr> {
        self.by_key.get(&key).map(|(_, vr)| *vr)
    }
}

static DICTIONARY: LazyLock<RwLock<TagDictionary>> =
    LazyLock::new(|| RwLock::new(TagDictionary::standard()));

/// Run `f` against the shared dictionary under a read guard.
pub fn with_dictionary<T>(f: impl FnOnce(&TagDictionary) -> T) -> T {
    // Nothing writes after construction, so a poisoned guard still holds a
    // complete table.
    let guard = DICTIONARY.read().unwrap_or_else(PoisonError::into_inner);
    f(&guard)
}

/// Resolve an identifier against the shared dictionary.
pub fn resolve(identifier: &str) -> TagKey {
    with_dictionary(|dictionary| dictionary.resolve(identifier))
}

/// Keyword for `key`, or its `(gggg,eeee)` rendering when unknown.
pub fn display_name(key: TagKey) -> String {
    with_dictionary(|dictionary| dictionary.name_for(key))
        .map(str::to_string)
        .unwrap_or_else(|| key.to_string())
}

/// Dictionary VR for `key`, used when the transfer syntax carries none.
pub fn vr_for(key: TagKey) -> Option<Vr> {
    with_dictionary(|dictionary| dictionary.vr_for(key))
}

pub mod tags {
    //! Keys the pipeline refers to by name.
    use crate::key::TagKey;

    pub const MEDIA_STORAGE_SOP_CLASS_UID: TagKey = TagKey::new(0x0002, 0x0002);
    pub const TRANSFER_SYNTAX_UID: TagKey = TagKey::new(0x0002, 0x0010);
    pub const SPECIFIC_CHARACTER_SET: TagKey = TagKey::new(0x0008, 0x0005);
    pub const IMAGE_TYPE: TagKey = TagKey::new(0x0008, 0x0008);
    pub const SOP_INSTANCE_UID: TagKey = TagKey::new(0x0008, 0x0018);
    pub const ACCESSION_NUMBER: TagKey = TagKey::new(0x0008, 0x0050);
    pub const RETRIEVE_AE_TITLE: TagKey = TagKey::new(0x0008, 0x0054);
    pub const STATION_AE_TITLE: TagKey = TagKey::new(0x0008, 0x0055);
    pub const MODALITY: TagKey = TagKey::new(0x0008, 0x0060);
    pub const MANUFACTURER: TagKey = TagKey::new(0x0008, 0x0070);
    pub const INSTITUTION_NAME: TagKey = TagKey::new(0x0008, 0x0080);
    pub const REFERRING_PHYSICIAN_NAME: TagKey = TagKey::new(0x0008, 0x0090);
    pub const CODE_VALUE: TagKey = TagKey::new(0x0008, 0x0100);
    pub const CODE_MEANING: TagKey = TagKey::new(0x0008, 0x0104);
    pub const SERIES_DATE: TagKey = TagKey::new(0x0008, 0x0021);
    pub const ACQUISITION_DATE: TagKey = TagKey::new(0x0008, 0x0022);
    pub const SERIES_TIME: TagKey = TagKey::new(0x0008, 0x0031);
    pub const ACQUISITION_TIME: TagKey = TagKey::new(0x0008, 0x0032);
    pub const STATION_NAME: TagKey = TagKey::new(0x0008, 0x1010);
    pub const STUDY_DESCRIPTION: TagKey = TagKey::new(0x0008, 0x1030);
    pub const SERIES_DESCRIPTION: TagKey = TagKey::new(0x0008, 0x103E);
    pub const MANUFACTURER_MODEL_NAME: TagKey = TagKey::new(0x0008, 0x1090);
    pub const PATIENT_NAME: TagKey = TagKey::new(0x0010, 0x0010);
    pub const PATIENT_ID: TagKey = TagKey::new(0x0010, 0x0020);
    pub const PATIENT_BIRTH_DATE: TagKey = TagKey::new(0x0010, 0x0030);
    pub const PATIENT_SEX: TagKey = TagKey::new(0x0010, 0x0040);
    pub const CONTRAST_BOLUS_AGENT: TagKey = TagKey::new(0x0018, 0x0010);
    pub const BODY_PART_EXAMINED: TagKey = TagKey::new(0x0018, 0x0015);
    pub const SCANNING_SEQUENCE: TagKey = TagKey::new(0x0018, 0x0020);
    pub const SEQUENCE_VARIANT: TagKey = TagKey::new(0x0018, 0x0021);
    pub const SEQUENCE_NAME: TagKey = TagKey::new(0x0018, 0x0024);
    pub const SLICE_THICKNESS: TagKey = TagKey::new(0x0018, 0x0050);
    pub const MAGNETIC_FIELD_STRENGTH: TagKey = TagKey::new(0x0018, 0x0087);
    pub const DEVICE_SERIAL_NUMBER: TagKey = TagKey::new(0x0018, 0x1000);
    pub const DEVICE_UID: TagKey = TagKey::new(0x0018, 0x1002);
    pub const SOFTWARE_VERSIONS: TagKey = TagKey::new(0x0018, 0x1020);
    pub const PROTOCOL_NAME: TagKey = TagKey::new(0x0018, 0x1030);
    pub const ACQUISITION_TYPE: TagKey = TagKey::new(0x0018, 0x9302);
    pub const STUDY_INSTANCE_UID: TagKey = TagKey::new(0x0020, 0x000D);
    pub const SERIES_INSTANCE_UID: TagKey = TagKey::new(0x0020, 0x000E);
    pub const STUDY_ID: TagKey = TagKey::new(0x0020, 0x0010);
    pub const SERIES_NUMBER: TagKey = TagKey::new(0x0020, 0x0011);
    pub const ACQUISITION_NUMBER: TagKey = TagKey::new(0x0020, 0x0012);
    pub const INSTANCE_NUMBER: TagKey = TagKey::new(0x0020, 0x0013);
    pub const IMAGE_COMMENTS: TagKey = TagKey::new(0x0020, 0x4000);
    pub const PIXEL_DATA: TagKey = TagKey::new(0x7FE0, 0x0010);
}

use Vr::*;

#[rustfmt::skip]
const ENTRIES: &[(u16, u16, &str, Vr)] = &[
    // File meta information
    (0x0002, 0x0000, "FileMetaInformationGroupLength", UL),
    (0x0002, 0x0001, "FileMetaInformationVersion", OB),
    (0x0002, 0x0002, "MediaStorageSOPClassUID", UI),
    (0x0002, 0x0003, "MediaStorageSOPInstanceUID", UI),
    (0x0002, 0x0010, "TransferSyntaxUID", UI),
    (0x0002, 0x0012, "ImplementationClassUID", UI),
    (0x0002, 0x0013, "ImplementationVersionName", SH),
    (0x0002, 0x0016, "SourceApplicationEntityTitle", AE),
    (0x0002, 0x0017, "SendingApplicationEntityTitle", AE),
    (0x0002, 0x0018, "ReceivingApplicationEntityTitle", AE),
    (0x0002, 0x0100, "PrivateInformationCreatorUID", UI),
    (0x0002, 0x0102, "PrivateInformation", OB),
    // Directory structuring
    (0x0004, 0x1130, "FileSetID", CS),
    (0x0004, 0x1220, "DirectoryRecordSequence", SQ),
    (0x0004, 0x1430, "DirectoryRecordType", CS),
    (0x0004, 0x1500, "ReferencedFileID", CS),
    (0x0004, 0x1510, "ReferencedSOPClassUIDInFile", UI),
    (0x0004, 0x1511, "ReferencedSOPInstanceUIDInFile", UI),
    (0x0004, 0x1512, "ReferencedTransferSyntaxUIDInFile", UI),
    // SOP common, general study and series
    (0x0008, 0x0005, "SpecificCharacterSet", CS),
    (0x0008, 0x0006, "LanguageCodeSequence", SQ),
    (0x0008, 0x0008, "ImageType", CS),
    (0x0008, 0x0012, "InstanceCreationDate", DA),
    (0x0008, 0x0013, "InstanceCreationTime", TM),
    (0x0008, 0x0014, "InstanceCreatorUID", UI),
    (0x0008, 0x0015, "InstanceCoercionDateTime", DT),
    (0x0008, 0x0016, "SOPClassUID", UI),
    (0x0008, 0x0017, "AcquisitionUID", UI),
    (0x0008, 0x0018, "SOPInstanceUID", UI),
    (0x0008, 0x001A, "RelatedGeneralSOPClassUID", UI),
    (0x0008, 0x001B, "OriginalSpecializedSOPClassUID", UI),
    (0x0008, 0x0020, "StudyDate", DA),
    (0x0008, 0x0021, "SeriesDate", DA),
    (0x0008, 0x0022, "AcquisitionDate", DA),
    (0x0008, 0x0023, "ContentDate", DA),
    (0x0008, 0x002A, "AcquisitionDateTime", DT),
    (0x0008, 0x0030, "StudyTime", TM),
    (0x0008, 0x0031, "SeriesTime", TM),
    (0x0008, 0x0032, "AcquisitionTime", TM),
    (0x0008, 0x0033, "ContentTime", TM),
    (0x0008, 0x0050, "AccessionNumber", SH),
    (0x0008, 0x0052, "QueryRetrieveLevel", CS),
    (0x0008, 0x0054, "RetrieveAETitle", AE),
    (0x0008, 0x0055, "StationAETitle", AE),
    (0x0008, 0x0056, "InstanceAvailability", CS),
    (0x0008, 0x0058, "FailedSOPInstanceUIDList", UI),
    (0x0008, 0x0060, "Modality", CS),
    (0x0008, 0x0061, "ModalitiesInStudy", CS),
    (0x0008, 0x0062, "SOPClassesInStudy", UI),
    (0x0008, 0x0064, "ConversionType", CS),
    (0x0008, 0x0068, "PresentationIntentType", CS),
    (0x0008, 0x0070, "Manufacturer", LO),
    (0x0008, 0x0080, "InstitutionName", LO),
    (0x0008, 0x0081, "InstitutionAddress", ST),
    (0x0008, 0x0082, "InstitutionCodeSequence", SQ),
    (0x0008, 0x0090, "ReferringPhysicianName", PN),
    (0x0008, 0x0092, "ReferringPhysicianAddress", ST),
    (0x0008, 0x0094, "ReferringPhysicianTelephoneNumbers", SH),
    (0x0008, 0x0096, "ReferringPhysicianIdentificationSequence", SQ),
    (0x0008, 0x0100, "CodeValue", SH),
    (0x0008, 0x0102, "CodingSchemeDesignator", SH),
    (0x0008, 0x0103, "CodingSchemeVersion", SH),
    (0x0008, 0x0104, "CodeMeaning", LO),
    (0x0008, 0x0105, "MappingResource", CS),
    (0x0008, 0x0106, "ContextGroupVersion", DT),
    (0x0008, 0x0107, "ContextGroupLocalVersion", DT),
    (0x0008, 0x010F, "ContextIdentifier", CS),
    (0x0008, 0x0110, "CodingSchemeIdentificationSequence", SQ),
    (0x0008, 0x0112, "CodingSchemeRegistry", LO),
    (0x0008, 0x0114, "CodingSchemeExternalID", ST),
    (0x0008, 0x0115, "CodingSchemeName", ST),
    (0x0008, 0x0116, "CodingSchemeResponsibleOrganization", ST),
    (0x0008, 0x0117, "ContextUID", UI),
    (0x0008, 0x0119, "LongCodeValue", UC),
    (0x0008, 0x0120, "URNCodeValue", UR),
    (0x0008, 0x0201, "TimezoneOffsetFromUTC", SH),
    (0x0008, 0x0300, "PrivateDataElementCharacteristicsSequence", SQ),
    (0x0008, 0x1010, "StationName", SH),
    (0x0008, 0x1030, "StudyDescription", LO),
    (0x0008, 0x1032, "ProcedureCodeSequence", SQ),
    (0x0008, 0x103E, "SeriesDescription", LO),
    (0x0008, 0x1040, "InstitutionalDepartmentName", LO),
    (0x0008, 0x1048, "PhysiciansOfRecord", PN),
    (0x0008, 0x1049, "PhysiciansOfRecordIdentificationSequence", SQ),
    (0x0008, 0x1050, "PerformingPhysicianName", PN),
    (0x0008, 0x1052, "PerformingPhysicianIdentificationSequence", SQ),
    (0x0008, 0x1060, "NameOfPhysiciansReadingStudy", PN),
    (0x0008, 0x1062, "PhysiciansReadingStudyIdentificationSequence", SQ),
    (0x0008, 0x1070, "OperatorsName", PN),
    (0x0008, 0x1072, "OperatorIdentificationSequence", SQ),
    (0x0008, 0x1080, "AdmittingDiagnosesDescription", LO),
    (0x0008, 0x1084, "AdmittingDiagnosesCodeSequence", SQ),
    (0x0008, 0x1090, "ManufacturerModelName", LO),
    (0x0008, 0x1110, "ReferencedStudySequence", SQ),
    (0x0008, 0x1111, "ReferencedPerformedProcedureStepSequence", SQ),
    (0x0008, 0x1115, "ReferencedSeriesSequence", SQ),
    (0x0008, 0x1120, "ReferencedPatientSequence", SQ),
    (0x0008, 0x1125, "ReferencedVisitSequence", SQ),
    (0x0008, 0x1140, "ReferencedImageSequence", SQ),
    (0x0008, 0x1150, "ReferencedSOPClassUID", UI),
    (0x0008, 0x1155, "ReferencedSOPInstanceUID", UI),
    (0x0008, 0x1160, "ReferencedFrameNumber", IS),
    (0x0008, 0x1195, "TransactionUID", UI),
    (0x0008, 0x1199, "ReferencedSOPSequence", SQ),
    (0x0008, 0x1250, "RelatedSeriesSequence", SQ),
    (0x0008, 0x2111, "DerivationDescription", ST),
    (0x0008, 0x2112, "SourceImageSequence", SQ),
    (0x0008, 0x2128, "ViewNumber", IS),
    (0x0008, 0x2218, "AnatomicRegionSequence", SQ),
    (0x0008, 0x9007, "FrameType", CS),
    (0x0008, 0x9205, "PixelPresentation", CS),
    (0x0008, 0x9206, "VolumetricProperties", CS),
    (0x0008, 0x9207, "VolumeBasedCalculationTechnique", CS),
    // Patient
    (0x0010, 0x0010, "PatientName", PN),
    (0x0010, 0x0020, "PatientID", LO),
    (0x0010, 0x0021, "IssuerOfPatientID", LO),
    (0x0010, 0x0022, "TypeOfPatientID", CS),
    (0x0010, 0x0024, "IssuerOfPatientIDQualifiersSequence", SQ),
    (0x0010, 0x0030, "PatientBirthDate", DA),
    (0x0010, 0x0032, "PatientBirthTime", TM),
    (0x0010, 0x0040, "PatientSex", CS),
    (0x0010, 0x0050, "PatientInsurancePlanCodeSequence", SQ),
    (0x0010, 0x0101, "PatientPrimaryLanguageCodeSequence", SQ),
    (0x0010, 0x1000, "OtherPatientIDs", LO),
    (0x0010, 0x1001, "OtherPatientNames", PN),
    (0x0010, 0x1002, "OtherPatientIDsSequence", SQ),
    (0x0010, 0x1005, "PatientBirthName", PN),
    (0x0010, 0x1010, "PatientAge", AS),
    (0x0010, 0x1020, "PatientSize", DS),
    (0x0010, 0x1030, "PatientWeight", DS),
    (0x0010, 0x1040, "PatientAddress", LO),
    (0x0010, 0x1060, "PatientMotherBirthName", PN),
    (0x0010, 0x1080, "MilitaryRank", LO),
    (0x0010, 0x1081, "BranchOfService", LO),
    (0x0010, 0x2000, "MedicalAlerts", LO),
    (0x0010, 0x2110, "Allergies", LO),
    (0x0010, 0x2150, "CountryOfResidence", LO),
    (0x0010, 0x2152, "RegionOfResidence", LO),
    (0x0010, 0x2154, "PatientTelephoneNumbers", SH),
    (0x0010, 0x2160, "EthnicGroup", SH),
    (0x0010, 0x2180, "Occupation", SH),
    (0x0010, 0x21A0, "SmokingStatus", CS),
    (0x0010, 0x21B0, "AdditionalPatientHistory", LT),
    (0x0010, 0x21C0, "PregnancyStatus", US),
    (0x0010, 0x21D0, "LastMenstrualDate", DA),
    (0x0010, 0x21F0, "PatientReligiousPreference", LO),
    (0x0010, 0x2201, "PatientSpeciesDescription", LO),
    (0x0010, 0x2203, "PatientSexNeutered", CS),
    (0x0010, 0x2292, "PatientBreedDescription", LO),
    (0x0010, 0x2297, "ResponsiblePerson", PN),
    (0x0010, 0x2299, "ResponsibleOrganization", LO),
    (0x0010, 0x4000, "PatientComments", LT),
    // Clinical trial and de-identification
    (0x0012, 0x0010, "ClinicalTrialSponsorName", LO),
    (0x0012, 0x0020, "ClinicalTrialProtocolID", LO),
    (0x0012, 0x0021, "ClinicalTrialProtocolName", LO),
    (0x0012, 0x0030, "ClinicalTrialSiteID", LO),
    (0x0012, 0x0031, "ClinicalTrialSiteName", LO),
    (0x0012, 0x0040, "ClinicalTrialSubjectID", LO),
    (0x0012, 0x0042, "ClinicalTrialSubjectReadingID", LO),
    (0x0012, 0x0050, "ClinicalTrialTimePointID", LO),
    (0x0012, 0x0051, "ClinicalTrialTimePointDescription", ST),
    (0x0012, 0x0060, "ClinicalTrialCoordinatingCenterName", LO),
    (0x0012, 0x0062, "PatientIdentityRemoved", CS),
    (0x0012, 0x0063, "DeidentificationMethod", LO),
    (0x0012, 0x0064, "DeidentificationMethodCodeSequence", SQ),
    (0x0012, 0x0071, "ClinicalTrialSeriesID", LO),
    (0x0012, 0x0072, "ClinicalTrialSeriesDescription", LO),
    // Acquisition and equipment
    (0x0018, 0x0010, "ContrastBolusAgent", LO),
    (0x0018, 0x0012, "ContrastBolusAgentSequence", SQ),
    (0x0018, 0x0015, "BodyPartExamined", CS),
    (0x0018, 0x0020, "ScanningSequence", CS),
    (0x0018, 0x0021, "SequenceVariant", CS),
    (0x0018, 0x0022, "ScanOptions", CS),
    (0x0018, 0x0023, "MRAcquisitionType", CS),
    (0x0018, 0x0024, "SequenceName", SH),
    (0x0018, 0x0025, "AngioFlag", CS),
    (0x0018, 0x0026, "InterventionDrugInformationSequence", SQ),
    (0x0018, 0x0031, "Radiopharmaceutical", LO),
    (0x0018, 0x0040, "CineRate", IS),
    (0x0018, 0x0050, "SliceThickness", DS),
    (0x0018, 0x0060, "KVP", DS),
    (0x0018, 0x0070, "CountsAccumulated", IS),
    (0x0018, 0x0071, "AcquisitionTerminationCondition", CS),
    (0x0018, 0x0072, "EffectiveDuration", DS),
    (0x0018, 0x0073, "AcquisitionStartCondition", CS),
    (0x0018, 0x0080, "RepetitionTime", DS),
    (0x0018, 0x0081, "EchoTime", DS),
    (0x0018, 0x0082, "InversionTime", DS),
    (0x0018, 0x0083, "NumberOfAverages", DS),
    (0x0018, 0x0084, "ImagingFrequency", DS),
    (0x0018, 0x0085, "ImagedNucleus", SH),
    (0x0018, 0x0086, "EchoNumbers", IS),
    (0x0018, 0x0087, "MagneticFieldStrength", DS),
    (0x0018, 0x0088, "SpacingBetweenSlices", DS),
    (0x0018, 0x0089, "NumberOfPhaseEncodingSteps", IS),
    (0x0018, 0x0090, "DataCollectionDiameter", DS),
    (0x0018, 0x0091, "EchoTrainLength", IS),
    (0x0018, 0x0093, "PercentSampling", DS),
    (0x0018, 0x0094, "PercentPhaseFieldOfView", DS),
    (0x0018, 0x0095, "PixelBandwidth", DS),
    (0x0018, 0x1000, "DeviceSerialNumber", LO),
    (0x0018, 0x1002, "DeviceUID", UI),
    (0x0018, 0x1004, "PlateID", LO),
    (0x0018, 0x1010, "SecondaryCaptureDeviceID", LO),
    (0x0018, 0x1012, "DateOfSecondaryCapture", DA),
    (0x0018, 0x1014, "TimeOfSecondaryCapture", TM),
    (0x0018, 0x1016, "SecondaryCaptureDeviceManufacturer", LO),
    (0x0018, 0x1018, "SecondaryCaptureDeviceManufacturerModelName", LO),
    (0x0018, 0x1019, "SecondaryCaptureDeviceSoftwareVersions", LO),
    (0x0018, 0x1020, "SoftwareVersions", LO),
    (0x0018, 0x1030, "ProtocolName", LO),
    (0x0018, 0x1040, "ContrastBolusRoute", LO),
    (0x0018, 0x1041, "ContrastBolusVolume", DS),
    (0x0018, 0x1042, "ContrastBolusStartTime", TM),
    (0x0018, 0x1043, "ContrastBolusStopTime", TM),
    (0x0018, 0x1044, "ContrastBolusTotalDose", DS),
    (0x0018, 0x1046, "ContrastFlowRate", DS),
    (0x0018, 0x1047, "ContrastFlowDuration", DS),
    (0x0018, 0x1048, "ContrastBolusIngredient", CS),
    (0x0018, 0x1049, "ContrastBolusIngredientConcentration", DS),
    (0x0018, 0x1060, "TriggerTime", DS),
    (0x0018, 0x1062, "NominalInterval", IS),
    (0x0018, 0x1063, "FrameTime", DS),
    (0x0018, 0x1064, "CardiacFramingType", LO),
    (0x0018, 0x1072, "RadiopharmaceuticalStartTime", TM),
    (0x0018, 0x1074, "RadionuclideTotalDose", DS),
    (0x0018, 0x1075, "RadionuclideHalfLife", DS),
    (0x0018, 0x1076, "RadionuclidePositronFraction", DS),
    (0x0018, 0x1081, "LowRRValue", IS),
    (0x0018, 0x1082, "HighRRValue", IS),
    (0x0018, 0x1083, "IntervalsAcquired", IS),
    (0x0018, 0x1084, "IntervalsRejected", IS),
    (0x0018, 0x1088, "HeartRate", IS),
    (0x0018, 0x1090, "CardiacNumberOfImages", IS),
    (0x0018, 0x1094, "TriggerWindow", IS),
    (0x0018, 0x1100, "ReconstructionDiameter", DS),
    (0x0018, 0x1110, "DistanceSourceToDetector", DS),
    (0x0018, 0x1111, "DistanceSourceToPatient", DS),
    (0x0018, 0x1114, "EstimatedRadiographicMagnificationFactor", DS),
    (0x0018, 0x1120, "GantryDetectorTilt", DS),
    (0x0018, 0x1121, "GantryDetectorSlew", DS),
    (0x0018, 0x1130, "TableHeight", DS),
    (0x0018, 0x1131, "TableTraverse", DS),
    (0x0018, 0x1140, "RotationDirection", CS),
    (0x0018, 0x1147, "FieldOfViewShape", CS),
    (0x0018, 0x1149, "FieldOfViewDimensions", IS),
    (0x0018, 0x1150, "ExposureTime", IS),
    (0x0018, 0x1151, "XRayTubeCurrent", IS),
    (0x0018, 0x1152, "Exposure", IS),
    (0x0018, 0x1153, "ExposureInuAs", IS),
    (0x0018, 0x1154, "AveragePulseWidth", DS),
    (0x0018, 0x1155, "RadiationSetting", CS),
    (0x0018, 0x1160, "FilterType", SH),
    (0x0018, 0x1164, "ImagerPixelSpacing", DS),
    (0x0018, 0x1166, "Grid", CS),
    (0x0018, 0x1170, "GeneratorPower", IS),
    (0x0018, 0x1190, "FocalSpots", DS),
    (0x0018, 0x1191, "AnodeTargetMaterial", CS),
    (0x0018, 0x11A0, "BodyPartThickness", DS),
    (0x0018, 0x11A2, "CompressionForce", DS),
    (0x0018, 0x1200, "DateOfLastCalibration", DA),
    (0x0018, 0x1201, "TimeOfLastCalibration", TM),
    (0x0018, 0x1210, "ConvolutionKernel", SH),
    (0x0018, 0x1250, "ReceiveCoilName", SH),
    (0x0018, 0x1251, "TransmitCoilName", SH),
    (0x0018, 0x1310, "AcquisitionMatrix", US),
    (0x0018, 0x1312, "InPlanePhaseEncodingDirection", CS),
    (0x0018, 0x1314, "FlipAngle", DS),
    (0x0018, 0x1315, "VariableFlipAngleFlag", CS),
    (0x0018, 0x1316, "SAR", DS),
    (0x0018, 0x1318, "dBdt", DS),
    (0x0018, 0x1400, "AcquisitionDeviceProcessingDescription", LO),
    (0x0018, 0x1401, "AcquisitionDeviceProcessingCode", LO),
    (0x0018, 0x1402, "CassetteOrientation", CS),
    (0x0018, 0x1403, "CassetteSize", CS),
    (0x0018, 0x1404, "ExposuresOnPlate", US),
    (0x0018, 0x1405, "RelativeXRayExposure", IS),
    (0x0018, 0x1411, "ExposureIndex", DS),
    (0x0018, 0x1412, "TargetExposureIndex", DS),
    (0x0018, 0x1413, "DeviationIndex", DS),
    (0x0018, 0x1500, "PositionerMotion", CS),
    (0x0018, 0x1510, "PositionerPrimaryAngle", DS),
    (0x0018, 0x1511, "PositionerSecondaryAngle", DS),
    (0x0018, 0x5100, "PatientPosition", CS),
    (0x0018, 0x5101, "ViewPosition", CS),
    (0x0018, 0x6000, "Sensitivity", DS),
    (0x0018, 0x7004, "DetectorType", CS),
    (0x0018, 0x700A, "DetectorID", SH),
    (0x0018, 0x9004, "ContentQualification", CS),
    (0x0018, 0x9005, "PulseSequenceName", SH),
    (0x0018, 0x9073, "AcquisitionDuration", FD),
    (0x0018, 0x9087, "DiffusionBValue", FD),
    (0x0018, 0x9089, "DiffusionGradientOrientation", FD),
    (0x0018, 0x9302, "AcquisitionType", CS),
    (0x0018, 0x9305, "RevolutionTime", FD),
    (0x0018, 0x9306, "SingleCollimationWidth", FD),
    (0x0018, 0x9307, "TotalCollimationWidth", FD),
    (0x0018, 0x9309, "TableSpeed", FD),
    (0x0018, 0x9310, "TableFeedPerRotation", FD),
    (0x0018, 0x9311, "SpiralPitchFactor", FD),
    (0x0018, 0x9323, "ExposureModulationType", CS),
    (0x0018, 0x9345, "CTDIvol", FD),
    // Relationship and image plane
    (0x0020, 0x000D, "StudyInstanceUID", UI),
    (0x0020, 0x000E, "SeriesInstanceUID", UI),
    (0x0020, 0x0010, "StudyID", SH),
    (0x0020, 0x0011, "SeriesNumber", IS),
    (0x0020, 0x0012, "AcquisitionNumber", IS),
    (0x0020, 0x0013, "InstanceNumber", IS),
    (0x0020, 0x0019, "ItemNumber", IS),
    (0x0020, 0x0020, "PatientOrientation", CS),
    (0x0020, 0x0032, "ImagePositionPatient", DS),
    (0x0020, 0x0037, "ImageOrientationPatient", DS),
    (0x0020, 0x0052, "FrameOfReferenceUID", UI),
    (0x0020, 0x0060, "Laterality", CS),
    (0x0020, 0x0062, "ImageLaterality", CS),
    (0x0020, 0x0100, "TemporalPositionIdentifier", IS),
    (0x0020, 0x0105, "NumberOfTemporalPositions", IS),
    (0x0020, 0x0110, "TemporalResolution", DS),
    (0x0020, 0x0200, "SynchronizationFrameOfReferenceUID", UI),
    (0x0020, 0x1002, "ImagesInAcquisition", IS),
    (0x0020, 0x1040, "PositionReferenceIndicator", LO),
    (0x0020, 0x1041, "SliceLocation", DS),
    (0x0020, 0x1200, "NumberOfPatientRelatedStudies", IS),
    (0x0020, 0x1202, "NumberOfPatientRelatedSeries", IS),
    (0x0020, 0x1204, "NumberOfPatientRelatedInstances", IS),
    (0x0020, 0x1206, "NumberOfStudyRelatedSeries", IS),
    (0x0020, 0x1208, "NumberOfStudyRelatedInstances", IS),
    (0x0020, 0x1209, "NumberOfSeriesRelatedInstances", IS),
    (0x0020, 0x4000, "ImageComments", LT),
    (0x0020, 0x9056, "StackID", SH),
    (0x0020, 0x9057, "InStackPositionNumber", UL),
    (0x0020, 0x9128, "TemporalPositionIndex", UL),
    (0x0020, 0x9153, "NominalCardiacTriggerDelayTime", FD),
    (0x0020, 0x9221, "DimensionOrganizationSequence", SQ),
    (0x0020, 0x9222, "DimensionIndexSequence", SQ),
    // Image pixel and presentation
    (0x0028, 0x0002, "SamplesPerPixel", US),
    (0x0028, 0x0004, "PhotometricInterpretation", CS),
    (0x0028, 0x0006, "PlanarConfiguration", US),
    (0x0028, 0x0008, "NumberOfFrames", IS),
    (0x0028, 0x0009, "FrameIncrementPointer", AT),
    (0x0028, 0x0010, "Rows", US),
    (0x0028, 0x0011, "Columns", US),
    (0x0028, 0x0030, "PixelSpacing", DS),
    (0x0028, 0x0034, "PixelAspectRatio", IS),
    (0x0028, 0x0051, "CorrectedImage", CS),
    (0x0028, 0x0100, "BitsAllocated", US),
    (0x0028, 0x0101, "BitsStored", US),
    (0x0028, 0x0102, "HighBit", US),
    (0x0028, 0x0103, "PixelRepresentation", US),
    (0x0028, 0x0106, "SmallestImagePixelValue", US),
    (0x0028, 0x0107, "LargestImagePixelValue", US),
    (0x0028, 0x0301, "BurnedInAnnotation", CS),
    (0x0028, 0x0A02, "PixelSpacingCalibrationType", CS),
    (0x0028, 0x0A04, "PixelSpacingCalibrationDescription", LO),
    (0x0028, 0x1040, "PixelIntensityRelationship", CS),
    (0x0028, 0x1041, "PixelIntensityRelationshipSign", SS),
    (0x0028, 0x1050, "WindowCenter", DS),
    (0x0028, 0x1051, "WindowWidth", DS),
    (0x0028, 0x1052, "RescaleIntercept", DS),
    (0x0028, 0x1053, "RescaleSlope", DS),
    (0x0028, 0x1054, "RescaleType", LO),
    (0x0028, 0x1055, "WindowCenterWidthExplanation", LO),
    (0x0028, 0x1056, "VOILUTFunction", CS),
    (0x0028, 0x2000, "ICCProfile", OB),
    (0x0028, 0x2110, "LossyImageCompression", CS),
    (0x0028, 0x2112, "LossyImageCompressionRatio", DS),
    (0x0028, 0x2114, "LossyImageCompressionMethod", CS),
    (0x0028, 0x3010, "VOILUTSequence", SQ),
    (0x0028, 0x7FE0, "PixelDataProviderURL", UR),
    // Study and request
    (0x0032, 0x1032, "RequestingPhysician", PN),
    (0x0032, 0x1033, "RequestingService", LO),
    (0x0032, 0x1034, "RequestingServiceCodeSequence", SQ),
    (0x0032, 0x1060, "RequestedProcedureDescription", LO),
    (0x0032, 0x1064, "RequestedProcedureCodeSequence", SQ),
    (0x0032, 0x1070, "RequestedContrastAgent", LO),
    (0x0032, 0x4000, "StudyComments", LT),
    // Visit
    (0x0038, 0x0010, "AdmissionID", LO),
    (0x0038, 0x0300, "CurrentPatientLocation", LO),
    (0x0038, 0x0500, "PatientState", LO),
    // Procedure steps and structured reporting
    (0x0040, 0x0001, "ScheduledStationAETitle", AE),
    (0x0040, 0x0002, "ScheduledProcedureStepStartDate", DA),
    (0x0040, 0x0003, "ScheduledProcedureStepStartTime", TM),
    (0x0040, 0x0006, "ScheduledPerformingPhysicianName", PN),
    (0x0040, 0x0007, "ScheduledProcedureStepDescription", LO),
    (0x0040, 0x0009, "ScheduledProcedureStepID", SH),
    (0x0040, 0x0010, "ScheduledStationName", SH),
    (0x0040, 0x0011, "ScheduledProcedureStepLocation", SH),
    (0x0040, 0x0100, "ScheduledProcedureStepSequence", SQ),
    (0x0040, 0x0241, "PerformedStationAETitle", AE),
    (0x0040, 0x0242, "PerformedStationName", SH),
    (0x0040, 0x0243, "PerformedLocation", SH),
    (0x0040, 0x0244, "PerformedProcedureStepStartDate", DA),
    (0x0040, 0x0245, "PerformedProcedureStepStartTime", TM),
    (0x0040, 0x0250, "PerformedProcedureStepEndDate", DA),
    (0x0040, 0x0251, "PerformedProcedureStepEndTime", TM),
    (0x0040, 0x0252, "PerformedProcedureStepStatus", CS),
    (0x0040, 0x0253, "PerformedProcedureStepID", SH),
    (0x0040, 0x0254, "PerformedProcedureStepDescription", LO),
    (0x0040, 0x0255, "PerformedProcedureTypeDescription", LO),
    (0x0040, 0x0260, "PerformedProtocolCodeSequence", SQ),
    (0x0040, 0x0275, "RequestAttributesSequence", SQ),
    (0x0040, 0x0280, "CommentsOnThePerformedProcedureStep", ST),
    (0x0040, 0x0555, "AcquisitionContextSequence", SQ),
    (0x0040, 0x1001, "RequestedProcedureID", SH),
    (0x0040, 0x1002, "ReasonForTheRequestedProcedure", LO),
    (0x0040, 0x1003, "RequestedProcedurePriority", SH),
    (0x0040, 0x1400, "RequestedProcedureComments", LT),
    (0x0040, 0x2016, "PlacerOrderNumberImagingServiceRequest", LO),
    (0x0040, 0x2017, "FillerOrderNumberImagingServiceRequest", LO),
    (0x0040, 0x2400, "ImagingServiceRequestComments", LT),
    (0x0040, 0xA040, "ValueType", CS),
    (0x0040, 0xA043, "ConceptNameCodeSequence", SQ),
    (0x0040, 0xA124, "UID", UI),
    (0x0040, 0xA160, "TextValue", UT),
    (0x0040, 0xA168, "ConceptCodeSequence", SQ),
    (0x0040, 0xA491, "CompletionFlag", CS),
    (0x0040, 0xA493, "VerificationFlag", CS),
    (0x0040, 0xA504, "ContentTemplateSequence", SQ),
    (0x0040, 0xA730, "ContentSequence", SQ),
    (0x0040, 0xDB00, "TemplateIdentifier", CS),
    // Nuclear medicine and PET
    (0x0054, 0x0016, "RadiopharmaceuticalInformationSequence", SQ),
    (0x0054, 0x0081, "NumberOfSlices", US),
    (0x0054, 0x0101, "NumberOfTimeSlices", US),
    (0x0054, 0x0202, "TypeOfDetectorMotion", CS),
    (0x0054, 0x0410, "PatientOrientationCodeSequence", SQ),
    (0x0054, 0x0414, "PatientGantryRelationshipCodeSequence", SQ),
    (0x0054, 0x1000, "SeriesType", CS),
    (0x0054, 0x1001, "Units", CS),
    (0x0054, 0x1002, "CountsSource", CS),
    (0x0054, 0x1100, "RandomsCorrectionMethod", CS),
    (0x0054, 0x1101, "AttenuationCorrectionMethod", LO),
    (0x0054, 0x1102, "DecayCorrection", CS),
    (0x0054, 0x1103, "ReconstructionMethod", LO),
    (0x0054, 0x1105, "ScatterCorrectionMethod", LO),
    (0x0054, 0x1300, "FrameReferenceTime", DS),
    (0x0054, 0x1321, "DecayFactor", DS),
    (0x0054, 0x1322, "DoseCalibrationFactor", DS),
    (0x0054, 0x1330, "ImageIndex", US),
    // Presentation state
    (0x0070, 0x0080, "ContentLabel", CS),
    (0x0070, 0x0081, "ContentDescription", LO),
    (0x0070, 0x0084, "ContentCreatorName", PN),
    // Storage media
    (0x0088, 0x0140, "StorageMediaFileSetUID", UI),
    // Digital signatures and provenance
    (0x0400, 0x0561, "OriginalAttributesSequence", SQ),
    // Presentation LUT
    (0x2050, 0x0020, "PresentationLUTShape", CS),
    // Radiotherapy
    (0x3004, 0x0002, "DoseUnits", CS),
    (0x3004, 0x0004, "DoseType", CS),
    (0x3004, 0x000A, "DoseSummationType", CS),
    (0x3004, 0x000E, "DoseGridScaling", DS),
    (0x3006, 0x0002, "StructureSetLabel", SH),
    (0x3006, 0x0004, "StructureSetName", LO),
    (0x3006, 0x0008, "StructureSetDate", DA),
    (0x3006, 0x0009, "StructureSetTime", TM),
    (0x3006, 0x0020, "StructureSetROISequence", SQ),
    (0x3006, 0x0039, "ROIContourSequence", SQ),
    (0x300A, 0x0002, "RTPlanLabel", SH),
    (0x300A, 0x0003, "RTPlanName", LO),
    (0x300A, 0x0004, "RTPlanDescription", ST),
    (0x300A, 0x0006, "RTPlanDate", DA),
    (0x300A, 0x0007, "RTPlanTime", TM),
    (0x300A, 0x000C, "RTPlanGeometry", CS),
    (0x300C, 0x0002, "ReferencedRTPlanSequence", SQ),
    (0x300E, 0x0002, "ApprovalStatus", CS),
    // Pixel data
    (0x7FE0, 0x0008, "FloatPixelData", OF),
    (0x7FE0, 0x0009, "DoubleFloatPixelData", OD),
    (0x7FE0, 0x0010, "PixelData", OW),
    // Trailing attributes
    (0xFFFA, 0xFFFA, "DigitalSignaturesSequence", SQ),
    (0xFFFC, 0xFFFC, "DataSetTrailingPadding", OB),
];
