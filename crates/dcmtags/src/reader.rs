//! Field reading
//!
//! Reads single attribute values out of a decoded record as raw text. An
//! attribute that is absent (or present without a value) reads as an empty
//! value; only attributes that exist but cannot be rendered as text fail.

use crate::key::TagKey;
use crate::record::{Record, ValueError};

/// One extracted attribute value, still in the file's character set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    pub key: TagKey,
    pub value: Vec<u8>,
}

impl Field {
    pub fn new(key: TagKey, value: Vec<u8>) -> Self {
        Self { key, value }
    }
}

/// Read `key` from `record`.
///
/// Carriage return, line feed and double quote are replaced by `;`, space
/// and `'` so the value can be carried on a single descriptor line.
pub fn read_field(record: &Record, key: TagKey) -> Result<Vec<u8>, ValueError> {
    let Some(element) = record.get(key).filter(|element| element.has_value()) else {
        return Ok(Vec::new());
    };
    let mut value = element.string_array()?;
    substitute_control_characters(&mut value);
    Ok(value)
}

/// Read every key in order, stopping at the first failure.
pub fn read_fields(
    record: &Record,
    keys: &[TagKey],
) -> Result<Vec<Field>, (TagKey, ValueError)> {
    keys.iter()
        .map(|&key| {
            read_field(record, key)
                .map(|value| Field::new(key, value))
                .map_err(|err| (key, err))
        })
        .collect()
}

pub fn substitute_control_characters(value: &mut [u8]) {
    for byte in value.iter_mut() {
        *byte = match *byte {
            b'\r' => b';',
            b'\n' => b' ',
            b'"' => b'\'',
            other => other,
        };
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::dictionary::tags;
    use crate::record::{Element, Value, Vr};
    use proptest::prelude::*;

    fn record() -> Record {
        let mut record = Record::new();
        record.insert(tags::MODALITY, Element::new(Vr::CS, b"CT".to_vec()));
        record.insert(tags::IMAGE_COMMENTS, Element::new(Vr::LT, b"line one\r\nsaid \"hi\"".to_vec()));
        record.insert(tags::PATIENT_NAME, Element::new(Vr::PN, Vec::new()));
        record.insert(
            TagKey::new(0x0008, 0x1110),
            Element { vr: Vr::SQ, value: Value::Sequence { items: 1 }, big_endian: false },
        );
        record
    }

    #[test]
    fn test_absent_and_empty_fields_read_as_empty() {
        let record = record();
        assert_eq!(read_field(&record, tags::PATIENT_ID).unwrap(), b"");
        assert_eq!(read_field(&record, tags::PATIENT_NAME).unwrap(), b"");
    }

    #[test]
    fn test_control_characters_are_substituted() {
        let record = record();
        assert_eq!(read_field(&record, tags::MODALITY).unwrap(), b"CT");
        assert_eq!(read_field(&record, tags::IMAGE_COMMENTS).unwrap(), b"line one; said 'hi'");
    }

    #[test]
    fn test_sequence_fails_to_read() {
        let record = record();
        let err = read_field(&record, TagKey::new(0x0008, 0x1110)).unwrap_err();
        assert_eq!(err, ValueError::NotText(Vr::SQ));

        let (key, _) = read_fields(&record, &[tags::MODALITY, TagKey::new(0x0008, 0x1110)]).unwrap_err();
        assert_eq!(key, TagKey::new(0x0008, 0x1110));
    }

    #[test]
    fn test_read_fields_keeps_order_and_duplicates() {
        let record = record();
        let fields = read_fields(&record, &[tags::MODALITY, tags::PATIENT_ID, tags::MODALITY]).unwrap();
        let keys: Vec<_> = fields.iter().map(|f| f.key).collect();
        assert_eq!(keys, vec![tags::MODALITY, tags::PATIENT_ID, tags::MODALITY]);
        assert_eq!(fields[2].value, b"CT");
    }

    proptest! {
        #[test]
        fn prop_substitution_leaves_no_control_characters(mut value in proptest::collection::vec(any::<u8>(), 0..64)) {
            let original = value.clone();
            substitute_control_characters(&mut value);
            prop_assert_eq!(value.len(), original.len());
            prop_assert!(!value.iter().any(|b| matches!(b, b'\r' | b'\n' | b'"')));
            for (before, after) in original.iter().zip(&value) {
                let expected = match before {
                    b'\r' => b';',
                    b'\n' => b' ',
                    b'"' => b'\'',
                    other => *other,
                };
                prop_assert_eq!(*after, expected);
            }
        }
    }
}
