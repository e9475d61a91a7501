//! DICOM Part 10 reader
//!
//! # File Structure
//! ```text
//! [128 bytes] preamble (ignored)
//! [4 bytes]   "DICM"
//! [N bytes]   file meta group (0002,xxxx), always explicit VR little endian
//! [M bytes]   dataset in the transfer syntax named by (0002,0010)
//! ```
//!
//! Only top-level attributes are kept. Sequences and encapsulated pixel data
//! are walked structurally so that the attributes after them can be read,
//! but their contents are dropped. Files without the preamble are accepted
//! as a bare dataset, with the VR encoding sniffed from the first attribute.

use super::{DecodeError, DecodedFile, Element, Record, RecordDecoder, Value, Vr};
use crate::dictionary::{self, tags};
use crate::key::TagKey;
use byteorder::{BigEndian, ByteOrder, LittleEndian, ReadBytesExt};
use flate2::read::DeflateDecoder;
use std::fs::File;
use std::io::{self, BufReader, Cursor, Read};
use std::path::Path;
use tracing::{debug, trace};

const PREAMBLE_LEN: u64 = 128;
const MAGIC: &[u8; 4] = b"DICM";

/// Values longer than this stay on disk.
const MAX_LOADED_VALUE: u32 = 1 << 20;

const UNDEFINED_LENGTH: u32 = 0xFFFF_FFFF;

/// Deepest sequence nesting walked before the file is rejected.
const MAX_NESTING: usize = 64;

const ITEM: TagKey = TagKey::new(0xFFFE, 0xE000);
const ITEM_DELIMITER: TagKey = TagKey::new(0xFFFE, 0xE00D);
const SEQUENCE_DELIMITER: TagKey = TagKey::new(0xFFFE, 0xE0DD);

const IMPLICIT_VR_LITTLE_ENDIAN: &str = "1.2.840.10008.1.2";
const EXPLICIT_VR_LITTLE_ENDIAN: &str = "1.2.840.10008.1.2.1";
const DEFLATED_EXPLICIT_VR_LITTLE_ENDIAN: &str = "1.2.840.10008.1.2.1.99";
const EXPLICIT_VR_BIG_ENDIAN: &str = "1.2.840.10008.1.2.2";
const DICOM_TRANSFER_SYNTAX_ROOT: &str = "1.2.840.10008.1.2.";

/// How attributes are encoded in a dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Syntax {
    explicit_vr: bool,
    big_endian: bool,
}

impl Syntax {
    const IMPLICIT_LE: Syntax = Syntax { explicit_vr: false, big_endian: false };
    const EXPLICIT_LE: Syntax = Syntax { explicit_vr: true, big_endian: false };
    const EXPLICIT_BE: Syntax = Syntax { explicit_vr: true, big_endian: true };

    /// Returns the dataset syntax and whether the dataset is deflated.
    fn from_uid(uid: &str) -> Result<(Syntax, bool), DecodeError> {
        match uid {
            IMPLICIT_VR_LITTLE_ENDIAN => Ok((Syntax::IMPLICIT_LE, false)),
            EXPLICIT_VR_LITTLE_ENDIAN => Ok((Syntax::EXPLICIT_LE, false)),
            DEFLATED_EXPLICIT_VR_LITTLE_ENDIAN => Ok((Syntax::EXPLICIT_LE, true)),
            EXPLICIT_VR_BIG_ENDIAN => Ok((Syntax::EXPLICIT_BE, false)),
            // Encapsulated (compressed pixel data) syntaxes
            other if other.starts_with(DICOM_TRANSFER_SYNTAX_ROOT) => Ok((Syntax::EXPLICIT_LE, false)),
            other => Err(DecodeError::UnsupportedTransferSyntax(other.to_string())),
        }
    }
}

/// Decoder for DICOM Part 10 files on disk.
#[derive(Debug, Default, Clone, Copy)]
pub struct Part10Decoder;

impl RecordDecoder for Part10Decoder {
    fn load(&self, path: &Path, stop: Option<TagKey>) -> Result<DecodedFile, DecodeError> {
        let mut file = BufReader::new(File::open(path)?);

        let mut head = Vec::with_capacity(PREAMBLE_LEN as usize + MAGIC.len());
        (&mut file)
            .take(PREAMBLE_LEN + MAGIC.len() as u64)
            .read_to_end(&mut head)?;
        if head.is_empty() {
            return Err(DecodeError::InvalidStream("file is empty".to_string()));
        }

        let has_preamble = head.len() as u64 == PREAMBLE_LEN + MAGIC.len() as u64 && head.ends_with(MAGIC);
        let (prefix, offset) = if has_preamble {
            (Vec::new(), head.len() as u64)
        } else {
            debug!(path = %path.display(), "No DICM preamble, reading as bare dataset");
            (head, 0)
        };

        let mut input = Input::new(Cursor::new(prefix).chain(file), offset);
        let (meta, mut pending) = read_meta_group(&mut input)?;

        let (syntax, deflated) = match meta.get(tags::TRANSFER_SYNTAX_UID) {
            Some(element) => {
                let uid = element
                    .string_array()
                    .map_err(|e| DecodeError::InvalidStream(format!("TransferSyntaxUID: {e}")))?;
                Syntax::from_uid(&String::from_utf8_lossy(&uid))?
            },
            None => (sniff_syntax(&mut input, &mut pending)?, false),
        };
        debug!(?syntax, deflated, meta_attributes = meta.len(), "Reading dataset");

        let offset = input.offset - pending.len() as u64;
        let rest = Cursor::new(pending).chain(input.into_inner());
        let dataset = if deflated {
            read_dataset(&mut Input::new(DeflateDecoder::new(rest), 0), syntax, stop)?
        } else {
            read_dataset(&mut Input::new(rest, offset), syntax, stop)?
        };

        Ok(DecodedFile { meta, dataset })
    }
}

/// Read the (0002,xxxx) group.
///
/// Returns the meta record and any bytes that were read past its end, which
/// belong to the dataset and must be replayed.
fn read_meta_group<R: Read>(input: &mut Input<R>) -> Result<(Record, Vec<u8>), DecodeError> {
    let mut meta = Record::new();
    let mut meta_end: Option<u64> = None;

    loop {
        if meta_end.is_some_and(|end| input.offset >= end) {
            return Ok((meta, Vec::new()));
        }
        let Some(raw) = input.read_raw_tag()? else {
            return Ok((meta, Vec::new()));
        };
        let key = key_from(raw, false);
        if key.group != 0x0002 {
            return Ok((meta, raw.to_vec()));
        }

        let header = read_header(input, key, Syntax::EXPLICIT_LE)?;
        let value = read_value(input, &header, Syntax::EXPLICIT_LE)?;
        if key == TagKey::new(0x0002, 0x0000) {
            if let Value::Bytes(bytes) = &value {
                if bytes.len() == 4 {
                    meta_end = Some(input.offset + u64::from(LittleEndian::read_u32(bytes)));
                }
            }
        }
        trace!(tag = %key, vr = %header.vr, length = header.length, "meta attribute");
        meta.insert(key, Element { vr: header.vr, value, big_endian: false });
    }
}

/// Guess explicit vs implicit VR from the first attribute header.
///
/// The bytes inspected are appended to `pending` so they are replayed.
fn sniff_syntax<R: Read>(input: &mut Input<R>, pending: &mut Vec<u8>) -> Result<Syntax, DecodeError> {
    if pending.len() < 4 {
        return Ok(Syntax::IMPLICIT_LE);
    }
    let mut code = [0u8; 2];
    let read = input.read_up_to(&mut code)?;
    pending.extend_from_slice(&code[..read]);
    Ok(if read == 2 && Vr::from_bytes(code).is_some() {
        Syntax::EXPLICIT_LE
    } else {
        Syntax::IMPLICIT_LE
    })
}

fn read_dataset<R: Read>(
    input: &mut Input<R>,
    syntax: Syntax,
    stop: Option<TagKey>,
) -> Result<Record, DecodeError> {
    let mut record = Record::new();

    while let Some(raw) = input.read_raw_tag()? {
        let key = key_from(raw, syntax.big_endian);
        if stop.is_some_and(|stop| key >= stop) {
            debug!(tag = %key, "Reached stop attribute");
            break;
        }
        if key.group == 0xFFFE {
            // Stray delimiters at top level carry no data
            input.read_u32(syntax.big_endian, "delimiter length")?;
            continue;
        }

        let header = read_header(input, key, syntax)?;
        let value = read_value(input, &header, syntax)?;
        trace!(tag = %key, vr = %header.vr, length = header.length, "attribute");
        record.insert(key, Element { vr: header.vr, value, big_endian: syntax.big_endian });
    }

    Ok(record)
}

#[derive(Debug)]
struct Header {
    vr: Vr,
    length: u32,
}

fn read_header<R: Read>(input: &mut Input<R>, key: TagKey, syntax: Syntax) -> Result<Header, DecodeError> {
    if key.group == 0xFFFE {
        let length = input.read_u32(syntax.big_endian, "item length")?;
        return Ok(Header { vr: Vr::UN, length });
    }

    if syntax.explicit_vr {
        let code = input.read_bytes(2, "value representation")?;
        let vr = Vr::from_bytes([code[0], code[1]]).ok_or_else(|| {
            DecodeError::InvalidStream(format!(
                "unknown value representation '{}' for {} at offset {}",
                String::from_utf8_lossy(&code),
                key,
                input.offset - 2
            ))
        })?;
        let length = if vr.has_long_length() {
            input.read_bytes(2, "reserved bytes")?;
            input.read_u32(syntax.big_endian, "value length")?
        } else {
            u32::from(input.read_u16(syntax.big_endian, "value length")?)
        };
        return Ok(Header { vr, length });
    }

    let length = input.read_u32(syntax.big_endian, "value length")?;
    let vr = if key.element == 0x0000 {
        Vr::UL
    } else {
        match dictionary::vr_for(key) {
            Some(vr) => vr,
            None if length == UNDEFINED_LENGTH => Vr::SQ,
            None => Vr::UN,
        }
    };
    Ok(Header { vr, length })
}

fn read_value<R: Read>(input: &mut Input<R>, header: &Header, syntax: Syntax) -> Result<Value, DecodeError> {
    if header.length == UNDEFINED_LENGTH {
        return match header.vr {
            Vr::SQ => Ok(Value::Sequence { items: skip_sequence(input, syntax, 0)? }),
            // Undefined length UN holds an implicit VR little endian sequence
            Vr::UN => Ok(Value::Sequence { items: skip_sequence(input, Syntax::IMPLICIT_LE, 0)? }),
            Vr::OB | Vr::OW => Ok(Value::Deferred { length: skip_fragments(input, syntax)? }),
            vr => Err(DecodeError::InvalidStream(format!(
                "undefined length for value representation {} at offset {}",
                vr, input.offset
            ))),
        };
    }

    if header.vr == Vr::SQ {
        let items = skip_defined_sequence(input, u64::from(header.length), syntax, 0)?;
        return Ok(Value::Sequence { items });
    }

    if header.length > MAX_LOADED_VALUE {
        input.skip(u64::from(header.length), "large value")?;
        return Ok(Value::Deferred { length: u64::from(header.length) });
    }

    Ok(Value::Bytes(input.read_bytes(header.length as usize, "value")?))
}

/// Skip an undefined-length sequence, returning its item count.
fn skip_sequence<R: Read>(input: &mut Input<R>, syntax: Syntax, depth: usize) -> Result<usize, DecodeError> {
    check_nesting(input, depth)?;
    let mut items = 0;
    loop {
        let key = input.read_key(syntax.big_endian, "sequence item")?;
        let length = input.read_u32(syntax.big_endian, "item length")?;
        match key {
            SEQUENCE_DELIMITER => return Ok(items),
            ITEM => {
                items += 1;
                skip_item(input, length, syntax, depth)?;
            },
            other => {
                return Err(DecodeError::InvalidStream(format!(
                    "unexpected {} inside sequence at offset {}",
                    other, input.offset
                )))
            },
        }
    }
}

/// Skip a defined-length sequence of `length` bytes, returning its item count.
fn skip_defined_sequence<R: Read>(
    input: &mut Input<R>,
    length: u64,
    syntax: Syntax,
    depth: usize,
) -> Result<usize, DecodeError> {
    check_nesting(input, depth)?;
    let end = input.offset + length;
    let mut items = 0;
    while input.offset < end {
        let key = input.read_key(syntax.big_endian, "sequence item")?;
        let item_length = input.read_u32(syntax.big_endian, "item length")?;
        if key != ITEM {
            return Err(DecodeError::InvalidStream(format!(
                "unexpected {} inside sequence at offset {}",
                key, input.offset
            )));
        }
        items += 1;
        skip_item(input, item_length, syntax, depth)?;
    }
    if input.offset != end {
        return Err(DecodeError::InvalidStream(format!(
            "sequence overran its declared length, ending at offset {}",
            input.offset
        )));
    }
    Ok(items)
}

fn skip_item<R: Read>(input: &mut Input<R>, length: u32, syntax: Syntax, depth: usize) -> Result<(), DecodeError> {
    if length != UNDEFINED_LENGTH {
        return input.skip(u64::from(length), "sequence item");
    }
    loop {
        let key = input.read_key(syntax.big_endian, "item attribute")?;
        if key == ITEM_DELIMITER {
            input.read_u32(syntax.big_endian, "delimiter length")?;
            return Ok(());
        }
        let header = read_header(input, key, syntax)?;
        match (header.length, header.vr) {
            (UNDEFINED_LENGTH, Vr::UN) => {
                skip_sequence(input, Syntax::IMPLICIT_LE, depth + 1)?;
            },
            (UNDEFINED_LENGTH, Vr::OB | Vr::OW) => {
                skip_fragments(input, syntax)?;
            },
            (UNDEFINED_LENGTH, _) => {
                skip_sequence(input, syntax, depth + 1)?;
            },
            (length, _) => input.skip(u64::from(length), "item attribute")?,
        }
    }
}

fn check_nesting<R: Read>(input: &Input<R>, depth: usize) -> Result<(), DecodeError> {
    if depth > MAX_NESTING {
        return Err(DecodeError::InvalidStream(format!(
            "sequence nesting too deep at offset {}",
            input.offset
        )));
    }
    Ok(())
}

/// Skip encapsulated pixel data fragments, returning their total size.
fn skip_fragments<R: Read>(input: &mut Input<R>, syntax: Syntax) -> Result<u64, DecodeError> {
    let mut total = 0u64;
    loop {
        let key = input.read_key(syntax.big_endian, "pixel data fragment")?;
        let length = input.read_u32(syntax.big_endian, "fragment length")?;
        match key {
            SEQUENCE_DELIMITER => return Ok(total),
            ITEM if length != UNDEFINED_LENGTH => {
                input.skip(u64::from(length), "pixel data fragment")?;
                total += u64::from(length);
            },
            other => {
                return Err(DecodeError::InvalidStream(format!(
                    "unexpected {} in encapsulated pixel data at offset {}",
                    other, input.offset
                )))
            },
        }
    }
}

fn key_from(raw: [u8; 4], big_endian: bool) -> TagKey {
    if big_endian {
        TagKey::new(BigEndian::read_u16(&raw[..2]), BigEndian::read_u16(&raw[2..]))
    } else {
        TagKey::new(LittleEndian::read_u16(&raw[..2]), LittleEndian::read_u16(&raw[2..]))
    }
}

/// A reader that tracks its offset for diagnostics.
struct Input<R> {
    inner: R,
    offset: u64,
}

impl<R: Read> Input<R> {
    fn new(inner: R, offset: u64) -> Self {
        Self { inner, offset }
    }

    fn into_inner(self) -> R {
        self.inner
    }

    fn truncated(&self, err: io::Error, context: &'static str) -> DecodeError {
        if err.kind() == io::ErrorKind::UnexpectedEof {
            DecodeError::Truncated { offset: self.offset, context }
        } else {
            DecodeError::Io(err)
        }
    }

    /// Fill as much of `buf` as the stream allows.
    fn read_up_to(&mut self, buf: &mut [u8]) -> Result<usize, DecodeError> {
        let mut filled = 0;
        while filled < buf.len() {
            match self.inner.read(&mut buf[filled..]) {
                Ok(0) => break,
                Ok(n) => filled += n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(DecodeError::Io(e)),
            }
        }
        self.offset += filled as u64;
        Ok(filled)
    }

    /// Next tag, or `None` at a clean end of stream.
    fn read_raw_tag(&mut self) -> Result<Option<[u8; 4]>, DecodeError> {
        let mut raw = [0u8; 4];
        match self.read_up_to(&mut raw)? {
            0 => Ok(None),
            4 => Ok(Some(raw)),
            _ => Err(DecodeError::Truncated { offset: self.offset, context: "attribute tag" }),
        }
    }

    fn read_key(&mut self, big_endian: bool, context: &'static str) -> Result<TagKey, DecodeError> {
        let raw = self.read_bytes(4, context)?;
        Ok(key_from([raw[0], raw[1], raw[2], raw[3]], big_endian))
    }

    fn read_u16(&mut self, big_endian: bool, context: &'static str) -> Result<u16, DecodeError> {
        let value = if big_endian {
            self.inner.read_u16::<BigEndian>()
        } else {
            self.inner.read_u16::<LittleEndian>()
        };
        let value = value.map_err(|e| self.truncated(e, context))?;
        self.offset += 2;
        Ok(value)
    }

    fn read_u32(&mut self, big_endian: bool, context: &'static str) -> Result<u32, DecodeError> {
        let value = if big_endian {
            self.inner.read_u32::<BigEndian>()
        } else {
            self.inner.read_u32::<LittleEndian>()
        };
        let value = value.map_err(|e| self.truncated(e, context))?;
        self.offset += 4;
        Ok(value)
    }

    fn read_bytes(&mut self, len: usize, context: &'static str) -> Result<Vec<u8>, DecodeError> {
        let mut buf = vec![0u8; len];
        self.inner
            .read_exact(&mut buf)
            .map_err(|e| self.truncated(e, context))?;
        self.offset += len as u64;
        Ok(buf)
    }

    fn skip(&mut self, len: u64, context: &'static str) -> Result<(), DecodeError> {
        let copied = io::copy(&mut (&mut self.inner).take(len), &mut io::sink())?;
        self.offset += copied;
        if copied < len {
            return Err(DecodeError::Truncated { offset: self.offset, context });
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::dictionary::tags;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn explicit(key: TagKey, vr: &[u8; 2], value: &[u8], big_endian: bool) -> Vec<u8> {
        let mut out = Vec::new();
        let push16 = |out: &mut Vec<u8>, v: u16| {
            out.extend_from_slice(&if big_endian { v.to_be_bytes() } else { v.to_le_bytes() })
        };
        push16(&mut out, key.group);
        push16(&mut out, key.element);
        out.extend_from_slice(vr);
        let vr = Vr::from_bytes(*vr).unwrap();
        if vr.has_long_length() {
            out.extend_from_slice(&[0, 0]);
            let len = value.len() as u32;
            out.extend_from_slice(&if big_endian { len.to_be_bytes() } else { len.to_le_bytes() });
        } else {
            push16(&mut out, value.len() as u16);
        }
        out.extend_from_slice(value);
        out
    }

    fn implicit(key: TagKey, value: &[u8]) -> Vec<u8> {
        let mut out = Vec::new();
        out.extend_from_slice(&key.group.to_le_bytes());
        out.extend_from_slice(&key.element.to_le_bytes());
        out.extend_from_slice(&(value.len() as u32).to_le_bytes());
        out.extend_from_slice(value);
        out
    }

    fn raw_header(key: TagKey, length: u32) -> Vec<u8> {
        let mut out = Vec::new();
        out.extend_from_slice(&key.group.to_le_bytes());
        out.extend_from_slice(&key.element.to_le_bytes());
        out.extend_from_slice(&length.to_le_bytes());
        out
    }

    fn part10(transfer_syntax: &str, dataset: &[u8]) -> Vec<u8> {
        let mut uid = transfer_syntax.as_bytes().to_vec();
        if uid.len() % 2 == 1 {
            uid.push(0);
        }
        let mut meta = explicit(tags::MEDIA_STORAGE_SOP_CLASS_UID, b"UI", b"1.2.840.10008.5.1.4.1.1.2\0", false);
        meta.extend(explicit(tags::TRANSFER_SYNTAX_UID, b"UI", &uid, false));

        let mut out = vec![0u8; 128];
        out.extend_from_slice(b"DICM");
        out.extend(explicit(TagKey::new(0x0002, 0x0000), b"UL", &(meta.len() as u32).to_le_bytes(), false));
        out.extend(meta);
        out.extend_from_slice(dataset);
        out
    }

    fn write_temp(bytes: &[u8]) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(bytes).unwrap();
        file.flush().unwrap();
        file
    }

    fn text(record: &Record, key: TagKey) -> String {
        String::from_utf8(record.get(key).unwrap().string_array().unwrap()).unwrap()
    }

    #[test]
    fn test_explicit_little_endian_file() {
        let mut dataset = explicit(tags::MODALITY, b"CS", b"CT", false);
        dataset.extend(explicit(tags::PATIENT_NAME, b"PN", b"Doe^John", false));
        dataset.extend(explicit(tags::SERIES_INSTANCE_UID, b"UI", b"1.2.3\0", false));
        let file = write_temp(&part10(EXPLICIT_VR_LITTLE_ENDIAN, &dataset));

        let decoded = Part10Decoder.load(file.path(), None).unwrap();
        assert_eq!(text(&decoded.dataset, tags::MODALITY), "CT");
        assert_eq!(text(&decoded.dataset, tags::PATIENT_NAME), "Doe^John");
        assert_eq!(text(&decoded.dataset, tags::SERIES_INSTANCE_UID), "1.2.3");
        assert_eq!(text(&decoded.meta, tags::MEDIA_STORAGE_SOP_CLASS_UID), "1.2.840.10008.5.1.4.1.1.2");
        assert!(decoded.dataset.get(tags::MEDIA_STORAGE_SOP_CLASS_UID).is_none());
    }

    #[test]
    fn test_implicit_sequence_is_skipped() {
        let mut dataset = implicit(tags::MODALITY, b"MR");
        dataset.extend(raw_header(TagKey::new(0x0008, 0x1110), UNDEFINED_LENGTH));
        dataset.extend(raw_header(ITEM, UNDEFINED_LENGTH));
        dataset.extend(implicit(TagKey::new(0x0008, 0x1150), b"1.2.840.10008.3.1.2.3.1\0"));
        dataset.extend(raw_header(ITEM_DELIMITER, 0));
        dataset.extend(raw_header(ITEM, 4));
        dataset.extend_from_slice(&[1, 2, 3, 4]);
        dataset.extend(raw_header(SEQUENCE_DELIMITER, 0));
        dataset.extend(implicit(tags::PATIENT_ID, b"12345 "));
        let file = write_temp(&part10(IMPLICIT_VR_LITTLE_ENDIAN, &dataset));

        let decoded = Part10Decoder.load(file.path(), None).unwrap();
        assert_eq!(text(&decoded.dataset, tags::MODALITY), "MR");
        assert_eq!(text(&decoded.dataset, tags::PATIENT_ID), "12345");
        let sequence = decoded.dataset.get(TagKey::new(0x0008, 0x1110)).unwrap();
        assert_eq!(sequence.value, Value::Sequence { items: 2 });
        assert!(decoded.dataset.get(TagKey::new(0x0008, 0x1150)).is_none());
    }

    #[test]
    fn test_implicit_standard_text_uses_dictionary_vr() {
        let study_comments = TagKey::new(0x0032, 0x4000);
        let mut dataset = implicit(tags::MODALITY, b"PT");
        dataset.extend(implicit(study_comments, b"hello "));
        dataset.extend(implicit(TagKey::new(0x0054, 0x1000), b"STATIC"));
        let file = write_temp(&part10(IMPLICIT_VR_LITTLE_ENDIAN, &dataset));

        let decoded = Part10Decoder.load(file.path(), None).unwrap();
        assert_eq!(decoded.dataset.get(study_comments).unwrap().vr, Vr::LT);
        assert_eq!(text(&decoded.dataset, study_comments), "hello");
        assert_eq!(text(&decoded.dataset, TagKey::new(0x0054, 0x1000)), "STATIC");
    }

    fn nested_sequences(depth: usize) -> Vec<u8> {
        let private = TagKey::new(0x0009, 0x1010);
        let mut dataset = implicit(tags::MODALITY, b"CT");
        for _ in 0..depth {
            dataset.extend(raw_header(private, UNDEFINED_LENGTH));
            dataset.extend(raw_header(ITEM, UNDEFINED_LENGTH));
        }
        for _ in 0..depth {
            dataset.extend(raw_header(ITEM_DELIMITER, 0));
            dataset.extend(raw_header(SEQUENCE_DELIMITER, 0));
        }
        dataset.extend(implicit(tags::PATIENT_ID, b"12345 "));
        dataset
    }

    #[test]
    fn test_moderately_nested_sequences_are_skipped() {
        let file = write_temp(&part10(IMPLICIT_VR_LITTLE_ENDIAN, &nested_sequences(8)));

        let decoded = Part10Decoder.load(file.path(), None).unwrap();
        assert_eq!(text(&decoded.dataset, tags::MODALITY), "CT");
        assert_eq!(text(&decoded.dataset, tags::PATIENT_ID), "12345");
    }

    #[test]
    fn test_runaway_sequence_nesting_is_rejected() {
        let file = write_temp(&part10(IMPLICIT_VR_LITTLE_ENDIAN, &nested_sequences(20_000)));

        let err = Part10Decoder.load(file.path(), None).unwrap_err();
        assert!(matches!(&err, DecodeError::InvalidStream(msg) if msg.contains("nesting too deep")), "{err}");
    }

    #[test]
    fn test_stop_key_ends_parsing() {
        let mut dataset = explicit(tags::MODALITY, b"CS", b"CT", false);
        dataset.extend(explicit(tags::PATIENT_NAME, b"PN", b"Doe^John", false));
        dataset.extend(explicit(tags::IMAGE_COMMENTS, b"LT", b"late", false));
        let file = write_temp(&part10(EXPLICIT_VR_LITTLE_ENDIAN, &dataset));

        let decoded = Part10Decoder.load(file.path(), Some(tags::PATIENT_NAME.successor())).unwrap();
        assert!(decoded.dataset.has_value(tags::PATIENT_NAME));
        assert!(decoded.dataset.get(tags::IMAGE_COMMENTS).is_none());
    }

    #[test]
    fn test_truncated_value_is_reported() {
        let mut bytes = part10(EXPLICIT_VR_LITTLE_ENDIAN, &explicit(tags::PATIENT_NAME, b"PN", b"Doe^John", false));
        bytes.truncate(bytes.len() - 3);
        let file = write_temp(&bytes);

        let err = Part10Decoder.load(file.path(), None).unwrap_err();
        assert!(matches!(err, DecodeError::Truncated { context: "value", .. }), "{err}");
    }

    #[test]
    fn test_bare_dataset_without_preamble() {
        let mut bytes = implicit(tags::MODALITY, b"US");
        bytes.extend(implicit(tags::SERIES_INSTANCE_UID, b"4.5.6\0"));
        let file = write_temp(&bytes);

        let decoded = Part10Decoder.load(file.path(), None).unwrap();
        assert!(decoded.meta.is_empty());
        assert_eq!(text(&decoded.dataset, tags::SERIES_INSTANCE_UID), "4.5.6");

        let bytes = explicit(tags::MODALITY, b"CS", b"DX", false);
        let file = write_temp(&bytes);
        let decoded = Part10Decoder.load(file.path(), None).unwrap();
        assert_eq!(decoded.dataset.get(tags::MODALITY).unwrap().vr, Vr::CS);
    }

    #[test]
    fn test_big_endian_binary_value() {
        let dataset = explicit(TagKey::new(0x0028, 0x0010), b"US", &512u16.to_be_bytes(), true);
        let file = write_temp(&part10(EXPLICIT_VR_BIG_ENDIAN, &dataset));

        let decoded = Part10Decoder.load(file.path(), None).unwrap();
        assert_eq!(text(&decoded.dataset, TagKey::new(0x0028, 0x0010)), "512");
    }

    #[test]
    fn test_deflated_dataset() {
        use flate2::{write::DeflateEncoder, Compression};

        let dataset = explicit(tags::STUDY_DESCRIPTION, b"LO", b"HEAD W/O", false);
        let mut encoder = DeflateEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(&dataset).unwrap();
        let compressed = encoder.finish().unwrap();
        let file = write_temp(&part10(DEFLATED_EXPLICIT_VR_LITTLE_ENDIAN, &compressed));

        let decoded = Part10Decoder.load(file.path(), None).unwrap();
        assert_eq!(text(&decoded.dataset, tags::STUDY_DESCRIPTION), "HEAD W/O");
    }

    #[test]
    fn test_encapsulated_pixel_data_is_deferred() {
        let mut dataset = explicit(tags::MODALITY, b"CS", b"CR", false);
        dataset.extend_from_slice(&[0xE0, 0x7F, 0x10, 0x00]);
        dataset.extend_from_slice(b"OB");
        dataset.extend_from_slice(&[0, 0]);
        dataset.extend_from_slice(&UNDEFINED_LENGTH.to_le_bytes());
        dataset.extend(raw_header(ITEM, 0));
        dataset.extend(raw_header(ITEM, 6));
        dataset.extend_from_slice(&[0xFF, 0xD8, 0xFF, 0xD9, 0, 0]);
        dataset.extend(raw_header(SEQUENCE_DELIMITER, 0));
        let file = write_temp(&part10("1.2.840.10008.1.2.4.50", &dataset));

        let decoded = Part10Decoder.load(file.path(), None).unwrap();
        assert_eq!(decoded.dataset.get(tags::PIXEL_DATA).unwrap().value, Value::Deferred { length: 6 });
    }

    #[test]
    fn test_rejects_unknown_transfer_syntax_and_empty_files() {
        let file = write_temp(&part10("1.3.6.1.4.1.9590", &[]));
        assert!(matches!(
            Part10Decoder.load(file.path(), None),
            Err(DecodeError::UnsupportedTransferSyntax(_))
        ));

        let file = write_temp(&[]);
        assert!(matches!(Part10Decoder.load(file.path(), None), Err(DecodeError::InvalidStream(_))));
    }
}
