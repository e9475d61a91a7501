//! Decoded DICOM records
//!
//! The pipeline only needs a narrow view of a DICOM file: the top-level
//! attributes of the dataset and of the file meta group, each with its raw
//! value bytes. [`RecordDecoder`] is that capability; [`Part10Decoder`] is
//! the implementation used by the binary.

mod part10;

pub use part10::Part10Decoder;

use crate::key::TagKey;
use std::collections::BTreeMap;
use std::path::Path;
use thiserror::Error;

/// Failure to decode a file into a record.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Premature end of file at offset {offset} while reading {context}")]
    Truncated { offset: u64, context: &'static str },

    #[error("Invalid stream: {0}")]
    InvalidStream(String),

    #[error("Unsupported transfer syntax: {0}")]
    UnsupportedTransferSyntax(String),
}

/// Failure to render an element value as text.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValueError {
    #[error("Illegal call, value representation {0} cannot be read as a string")]
    NotText(Vr),

    #[error("Corrupted data, value length {length} is not a multiple of {unit} for {vr}")]
    BadLength { vr: Vr, length: usize, unit: usize },

    #[error("Value of {length} bytes was not loaded")]
    NotLoaded { length: u64 },
}

/// Value representations.
#[rustfmt::skip]
#[allow(clippy::upper_case_acronyms)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Vr {
    AE, AS, AT, CS, DA, DS, DT, FD, FL, IS, LO, LT, OB, OD, OF, OL, OV, OW,
    PN, SH, SL, SQ, SS, ST, SV, TM, UC, UI, UL, UN, UR, US, UT, UV,
}

impl Vr {
    #[rustfmt::skip]
    pub fn from_bytes(code: [u8; 2]) -> Option<Vr> {
        use Vr::*;
        Some(match &code {
            b"AE" => AE, b"AS" => AS, b"AT" => AT, b"CS" => CS, b"DA" => DA,
            b"DS" => DS, b"DT" => DT, b"FD" => FD, b"FL" => FL, b"IS" => IS,
            b"LO" => LO, b"LT" => LT, b"OB" => OB, b"OD" => OD, b"OF" => OF,
            b"OL" => OL, b"OV" => OV, b"OW" => OW, b"PN" => PN, b"SH" => SH,
            b"SL" => SL, b"SQ" => SQ, b"SS" => SS, b"ST" => ST, b"SV" => SV,
            b"TM" => TM, b"UC" => UC, b"UI" => UI, b"UL" => UL, b"UN" => UN,
            b"UR" => UR, b"US" => US, b"UT" => UT, b"UV" => UV,
            _ => return None,
        })
    }

    /// Explicit VR encodings use a 4-byte length (after 2 reserved bytes) for these.
    pub fn has_long_length(self) -> bool {
        use Vr::*;
        matches!(self, OB | OD | OF | OL | OV | OW | SQ | SV | UC | UN | UR | UT | UV)
    }

    /// Free text VRs keep leading spaces; the others drop them as padding.
    fn keeps_leading_spaces(self) -> bool {
        matches!(self, Vr::LT | Vr::ST | Vr::UT)
    }

    fn is_character_string(self) -> bool {
        use Vr::*;
        matches!(
            self,
            AE | AS | CS | DA | DS | DT | IS | LO | LT | PN | SH | ST | TM | UC | UI | UR | UT
        )
    }
}

impl std::fmt::Display for Vr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        std::fmt::Debug::fmt(self, f)
    }
}

/// Value of a top-level attribute as found in the file.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Raw value bytes, in the byte order of the transfer syntax.
    Bytes(Vec<u8>),
    /// A sequence; only the number of items is kept.
    Sequence { items: usize },
    /// A value too large to hold in memory, or encapsulated pixel data.
    Deferred { length: u64 },
}

/// One top-level attribute with its undecoded value.
#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    pub vr: Vr,
    pub value: Value,
    pub big_endian: bool,
}

impl Element {
    pub fn new(vr: Vr, bytes: Vec<u8>) -> Self {
        Self { vr, value: Value::Bytes(bytes), big_endian: false }
    }

    pub fn has_value(&self) -> bool {
        match &self.value {
            Value::Bytes(bytes) => !bytes.is_empty(),
            Value::Sequence { items } => *items > 0,
            Value::Deferred { length } => *length > 0,
        }
    }

    /// The value as multi-valued text, values separated by `\`.
    ///
    /// Character strings are returned as their raw bytes with padding
    /// removed, so charset conversion can happen later. Numeric binary VRs
    /// are rendered in decimal, OB/UN/OW as hex.
    pub fn string_array(&self) -> Result<Vec<u8>, ValueError> {
        let bytes = match &self.value {
            Value::Bytes(bytes) => bytes.as_slice(),
            Value::Sequence { .. } => return Err(ValueError::NotText(self.vr)),
            Value::Deferred { length } => return Err(ValueError::NotLoaded { length: *length }),
        };
        let vr = self.vr;
        if vr.is_character_string() {
            return Ok(trim_padding(bytes, vr.keeps_leading_spaces()).to_vec());
        }

        let be = self.big_endian;
        let rendered = match vr {
            Vr::US => render_numbers(vr, bytes, 2, |b| u16_from(b, be).to_string())?,
            Vr::SS => render_numbers(vr, bytes, 2, |b| (u16_from(b, be) as i16).to_string())?,
            Vr::UL => render_numbers(vr, bytes, 4, |b| u32_from(b, be).to_string())?,
            Vr::SL => render_numbers(vr, bytes, 4, |b| (u32_from(b, be) as i32).to_string())?,
            Vr::UV => render_numbers(vr, bytes, 8, |b| u64_from(b, be).to_string())?,
            Vr::SV => render_numbers(vr, bytes, 8, |b| (u64_from(b, be) as i64).to_string())?,
            Vr::FL => render_numbers(vr, bytes, 4, |b| f32::from_bits(u32_from(b, be)).to_string())?,
            Vr::FD => render_numbers(vr, bytes, 8, |b| f64::from_bits(u64_from(b, be)).to_string())?,
            Vr::AT => render_numbers(vr, bytes, 4, |b| {
                format!("({:04x},{:04x})", u16_from(&b[..2], be), u16_from(&b[2..], be))
            })?,
            Vr::OB | Vr::UN => render_numbers(vr, bytes, 1, |b| format!("{:02x}", b[0]))?,
            Vr::OW => render_numbers(vr, bytes, 2, |b| format!("{:04x}", u16_from(b, be)))?,
            other => return Err(ValueError::NotText(other)),
        };
        Ok(rendered.into_bytes())
    }
}

fn render_numbers(
    vr: Vr,
    bytes: &[u8],
    unit: usize,
    render: impl Fn(&[u8]) -> String,
) -> Result<String, ValueError> {
    if bytes.len() % unit != 0 {
        return Err(ValueError::BadLength { vr, length: bytes.len(), unit });
    }
    let mut out = String::new();
    for (index, chunk) in bytes.chunks_exact(unit).enumerate() {
        if index > 0 {
            out.push('\\');
        }
        out.push_str(&render(chunk));
    }
    Ok(out)
}

fn u16_from(bytes: &[u8], big_endian: bool) -> u16 {
    let raw = [bytes[0], bytes[1]];
    if big_endian { u16::from_be_bytes(raw) } else { u16::from_le_bytes(raw) }
}

fn u32_from(bytes: &[u8], big_endian: bool) -> u32 {
    let raw = [bytes[0], bytes[1], bytes[2], bytes[3]];
    if big_endian { u32::from_be_bytes(raw) } else { u32::from_le_bytes(raw) }
}

fn u64_from(bytes: &[u8], big_endian: bool) -> u64 {
    let mut raw = [0u8; 8];
    raw.copy_from_slice(&bytes[..8]);
    if big_endian { u64::from_be_bytes(raw) } else { u64::from_le_bytes(raw) }
}

fn trim_padding(bytes: &[u8], keep_leading: bool) -> &[u8] {
    let end = bytes
        .iter()
        .rposition(|&b| b != b' ' && b != 0)
        .map_or(0, |i| i + 1);
    let bytes = &bytes[..end];
    if keep_leading {
        return bytes;
    }
    let start = bytes.iter().position(|&b| b != b' ').unwrap_or(bytes.len());
    &bytes[start..]
}

/// Top-level attributes of one dataset, in key order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    elements: BTreeMap<TagKey, Element>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: TagKey, element: Element) {
        self.elements.insert(key, element);
    }

    pub fn get(&self, key: TagKey) -> Option<&Element> {
        self.elements.get(&key)
    }

    /// Present with a non-empty value.
    pub fn has_value(&self, key: TagKey) -> bool {
        self.get(key).is_some_and(Element::has_value)
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }
}

/// A decoded file: its meta group and its main dataset.
#[derive(Debug, Clone, Default)]
pub struct DecodedFile {
    pub meta: Record,
    pub dataset: Record,
}

/// Capability to parse a file into a [`DecodedFile`].
pub trait RecordDecoder {
    /// Parse `path`, stopping before the first top-level attribute whose key
    /// is `>= stop` when a stop key is given.
    fn load(&self, path: &Path, stop: Option<TagKey>) -> Result<DecodedFile, DecodeError>;
}
