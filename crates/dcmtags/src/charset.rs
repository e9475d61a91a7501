//! Character set handling
//!
//! DICOM text is stored in the character set named by SpecificCharacterSet
//! (0008,0005). [`CharsetConverter`] turns raw attribute bytes into UTF-8
//! once a set has been selected; [`DicomCharsets`] implements it on top of
//! `encoding_rs`, including ISO 2022 code extensions for multi-valued
//! labels. [`CharsetNormalizer`] adds the selection policy the pipeline
//! uses: UTF-8 input is passed through, and a label that cannot be selected
//! is retried once as a code extension list.

use encoding_rs::Encoding;
use std::borrow::Cow;
use thiserror::Error;
use tracing::{debug, warn};

/// Label of files that are already UTF-8.
pub const UTF8_LABEL: &str = "ISO_IR 192";

/// Separator of multi-valued attributes, which also marks code extensions.
const VALUE_SEPARATOR: char = '\\';

const ESC: u8 = 0x1B;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CharsetError {
    #[error("Unknown character set '{0}'")]
    UnknownLabel(String),

    #[error("Character set '{0}' is only defined with code extensions")]
    CodeExtensionsRequired(String),

    #[error("Escape sequence for ISO 2022 IR {0} is not declared")]
    UndeclaredEscape(u16),

    #[error("Unknown escape sequence at byte {0}")]
    UnknownEscape(usize),

    #[error("No character set selected")]
    NotSelected,

    #[error("Input is not valid {0}")]
    Undecodable(&'static str),
}

/// Converts raw attribute bytes to UTF-8 text.
pub trait CharsetConverter {
    /// Make `label` (a SpecificCharacterSet value) the active character set.
    fn select(&mut self, label: &str) -> Result<(), CharsetError>;

    /// Convert `raw` from the active character set.
    fn convert(&self, raw: &[u8]) -> Result<String, CharsetError>;
}

/// Character sets defined for DICOM, decoded with `encoding_rs`.
#[derive(Debug, Clone, Default)]
pub struct DicomCharsets {
    active: Option<Active>,
}

#[derive(Debug, Clone)]
enum Active {
    Single(&'static Encoding),
    Extended(CodeExtensions),
}

impl CharsetConverter for DicomCharsets {
    fn select(&mut self, label: &str) -> Result<(), CharsetError> {
        let label = label.trim();
        let active = if label.contains(VALUE_SEPARATOR) {
            Active::Extended(CodeExtensions::parse(label)?)
        } else if let Some(encoding) = single_valued(label) {
            Active::Single(encoding)
        } else if label.starts_with("ISO 2022") {
            return Err(CharsetError::CodeExtensionsRequired(label.to_string()));
        } else {
            return Err(CharsetError::UnknownLabel(label.to_string()));
        };
        debug!(label, ?active, "Selected character set");
        self.active = Some(active);
        Ok(())
    }

    fn convert(&self, raw: &[u8]) -> Result<String, CharsetError> {
        match &self.active {
            None => Err(CharsetError::NotSelected),
            Some(Active::Single(encoding)) => decode(encoding, raw).map(Cow::into_owned),
            Some(Active::Extended(extensions)) => extensions.decode(raw),
        }
    }
}

fn single_valued(label: &str) -> Option<&'static Encoding> {
    use encoding_rs::*;

    // encoding_rs follows WHATWG, where ISO 8859-1 and 8859-9 are served by
    // their Windows supersets.
    Some(match label {
        "" | "ISO_IR 6" | "ISO_IR 100" => WINDOWS_1252,
        "ISO_IR 101" => ISO_8859_2,
        "ISO_IR 109" => ISO_8859_3,
        "ISO_IR 110" => ISO_8859_4,
        "ISO_IR 144" => ISO_8859_5,
        "ISO_IR 127" => ISO_8859_6,
        "ISO_IR 126" => ISO_8859_7,
        "ISO_IR 138" => ISO_8859_8,
        "ISO_IR 148" => WINDOWS_1254,
        "ISO_IR 203" => ISO_8859_15,
        "ISO_IR 166" => WINDOWS_874,
        "ISO_IR 13" => SHIFT_JIS,
        UTF8_LABEL => UTF_8,
        "GB18030" => GB18030,
        "GBK" => GBK,
        _ => return None,
    })
}

fn decode<'a>(
    encoding: &'static Encoding,
    raw: &'a [u8],
) -> Result<Cow<'a, str>, CharsetError> {
    encoding
        .decode_without_bom_handling_and_without_replacement(raw)
        .ok_or(CharsetError::Undecodable(encoding.name()))
}

// ============================================================================
// ISO 2022 code extensions
// ============================================================================

/// Graphic set designated to G0 (bytes below 0x80).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum G0 {
    Ascii,
    Romaji,
    Kanji,
    SupplementaryKanji,
}

/// Graphic set designated to G1 (bytes from 0x80).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum G1 {
    SingleByte(Part),
    Katakana,
    Korean,
    Chinese,
}

/// ISO 8859 parts and their relatives used as G1 sets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Part {
    Latin1,
    Latin2,
    Latin3,
    Latin4,
    Cyrillic,
    Arabic,
    Greek,
    Hebrew,
    Latin5,
    Latin9,
    Thai,
}

impl Part {
    fn encoding(self) -> &'static Encoding {
        use encoding_rs::*;
        match self {
            Part::Latin1 => WINDOWS_1252,
            Part::Latin2 => ISO_8859_2,
            Part::Latin3 => ISO_8859_3,
            Part::Latin4 => ISO_8859_4,
            Part::Cyrillic => ISO_8859_5,
            Part::Arabic => ISO_8859_6,
            Part::Greek => ISO_8859_7,
            Part::Hebrew => ISO_8859_8,
            Part::Latin5 => WINDOWS_1254,
            Part::Latin9 => ISO_8859_15,
            Part::Thai => WINDOWS_874,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Designation {
    G0(G0),
    G1(G1),
}

/// Escape sequences (without the leading ESC), the ISO IR number of the
/// term that allows them, and what they designate.
#[rustfmt::skip]
const ESCAPES: &[(&[u8], u16, Designation)] = &[
    (b"(B",  6,   Designation::G0(G0::Ascii)),
    (b"(J",  13,  Designation::G0(G0::Romaji)),
    (b")I",  13,  Designation::G1(G1::Katakana)),
    (b"-A",  100, Designation::G1(G1::SingleByte(Part::Latin1))),
    (b"-B",  101, Designation::G1(G1::SingleByte(Part::Latin2))),
    (b"-C",  109, Designation::G1(G1::SingleByte(Part::Latin3))),
    (b"-D",  110, Designation::G1(G1::SingleByte(Part::Latin4))),
    (b"-L",  144, Designation::G1(G1::SingleByte(Part::Cyrillic))),
    (b"-G",  127, Designation::G1(G1::SingleByte(Part::Arabic))),
    (b"-F",  126, Designation::G1(G1::SingleByte(Part::Greek))),
    (b"-H",  138, Designation::G1(G1::SingleByte(Part::Hebrew))),
    (b"-M",  148, Designation::G1(G1::SingleByte(Part::Latin5))),
    (b"-b",  203, Designation::G1(G1::SingleByte(Part::Latin9))),
    (b"-T",  166, Designation::G1(G1::SingleByte(Part::Thai))),
    (b"$B",  87,  Designation::G0(G0::Kanji)),
    (b"$(D", 159, Designation::G0(G0::SupplementaryKanji)),
    (b"$)C", 149, Designation::G1(G1::Korean)),
    (b"$)A", 58,  Designation::G1(G1::Chinese)),
];

fn designations(term: u16) -> impl Iterator<Item = Designation> {
    ESCAPES
        .iter()
        .filter(move |(_, number, _)| *number == term)
        .map(|(_, _, designation)| *designation)
}

/// Number of an ISO 2022 term. An empty first value stands for IR 6.
fn term_number(term: &str) -> Option<u16> {
    if term.is_empty() {
        return Some(6);
    }
    let number = term
        .strip_prefix("ISO 2022 IR ")
        .or_else(|| term.strip_prefix("ISO_IR "))?
        .trim()
        .parse::<u16>()
        .ok()?;
    ESCAPES.iter().any(|(_, n, _)| *n == number).then_some(number)
}

/// State of a multi-valued SpecificCharacterSet.
#[derive(Debug, Clone, PartialEq, Eq)]
struct CodeExtensions {
    declared: Vec<u16>,
    initial_g0: G0,
    initial_g1: Option<G1>,
    /// G1 used for high bytes that arrive before any G1 designation.
    fallback_g1: Option<G1>,
}

impl CodeExtensions {
    fn parse(label: &str) -> Result<Self, CharsetError> {
        let mut declared = Vec::new();
        for term in label.split(VALUE_SEPARATOR).map(str::trim) {
            let number = term_number(term).ok_or_else(|| CharsetError::UnknownLabel(term.to_string()))?;
            declared.push(number);
        }
        let first = declared.first().copied().unwrap_or(6);
        if !declared.contains(&6) {
            declared.push(6);
        }

        let initial_g0 = if first == 13 { G0::Romaji } else { G0::Ascii };
        let initial_g1 = designations(first).find_map(|designation| match designation {
            Designation::G1(g1 @ (G1::SingleByte(_) | G1::Katakana)) => Some(g1),
            _ => None,
        });
        let fallback_g1 = declared.iter().flat_map(|&term| designations(term)).find_map(|designation| {
            match designation {
                Designation::G1(g1) => Some(g1),
                Designation::G0(_) => None,
            }
        });

        Ok(Self { declared, initial_g0, initial_g1, fallback_g1 })
    }

    fn decode(&self, raw: &[u8]) -> Result<String, CharsetError> {
        let mut out = String::with_capacity(raw.len());
        let mut g0 = self.initial_g0;
        let mut g1 = self.initial_g1;
        let mut pos = 0;

        while pos < raw.len() {
            let byte = raw[pos];

            if byte == ESC {
                let rest = &raw[pos + 1..];
                let (sequence, term, designation) = ESCAPES
                    .iter()
                    .find(|(sequence, _, _)| rest.starts_with(sequence))
                    .ok_or(CharsetError::UnknownEscape(pos))?;
                if !self.declared.contains(term) {
                    return Err(CharsetError::UndeclaredEscape(*term));
                }
                match designation {
                    Designation::G0(set) => g0 = *set,
                    Designation::G1(set) => g1 = Some(*set),
                }
                pos += 1 + sequence.len();
                continue;
            }

            if byte < 0x20 {
                out.push(char::from(byte));
                if matches!(byte, b'\r' | b'\n' | b'\t' | 0x0C) {
                    g0 = self.initial_g0;
                    g1 = self.initial_g1;
                }
                pos += 1;
                continue;
            }

            if byte < 0x80 {
                match g0 {
                    G0::Ascii | G0::Romaji => {
                        out.push(romaji_or_ascii(g0, byte));
                        // Value and name component delimiters reset to the initial sets
                        if matches!(byte, b'\\' | b'^' | b'=') {
                            g0 = self.initial_g0;
                            g1 = self.initial_g1;
                        }
                        pos += 1;
                    },
                    G0::Kanji | G0::SupplementaryKanji if byte == b' ' => {
                        out.push(' ');
                        pos += 1;
                    },
                    G0::Kanji | G0::SupplementaryKanji => {
                        let pair = raw.get(pos..pos + 2).ok_or(CharsetError::Undecodable("JIS X 0208"))?;
                        let mut euc = Vec::with_capacity(3);
                        if g0 == G0::SupplementaryKanji {
                            euc.push(0x8F);
                        }
                        euc.extend(pair.iter().map(|b| b | 0x80));
                        out.push_str(&decode(encoding_rs::EUC_JP, &euc)?);
                        pos += 2;
                    },
                }
                continue;
            }

            match g1.or(self.fallback_g1) {
                None => return Err(CharsetError::Undecodable("ISO 646")),
                Some(G1::SingleByte(part)) => {
                    out.push_str(&decode(part.encoding(), &raw[pos..pos + 1])?);
                    pos += 1;
                },
                Some(G1::Katakana) => {
                    if !(0xA1..=0xDF).contains(&byte) {
                        return Err(CharsetError::Undecodable("JIS X 0201"));
                    }
                    let c = char::from_u32(0xFF61 + u32::from(byte - 0xA1))
                        .ok_or(CharsetError::Undecodable("JIS X 0201"))?;
                    out.push(c);
                    pos += 1;
                },
                Some(set @ (G1::Korean | G1::Chinese)) => {
                    let (encoding, name) = match set {
                        G1::Korean => (encoding_rs::EUC_KR, "KS X 1001"),
                        _ => (encoding_rs::GBK, "GB 2312"),
                    };
                    let pair = raw.get(pos..pos + 2).ok_or(CharsetError::Undecodable(name))?;
                    out.push_str(&decode(encoding, pair)?);
                    pos += 2;
                },
            }
        }
        Ok(out)
    }
}

fn romaji_or_ascii(g0: G0, byte: u8) -> char {
    match (g0, byte) {
        (G0::Romaji, 0x5C) => '\u{00A5}',
        (G0::Romaji, 0x7E) => '\u{203E}',
        _ => char::from(byte),
    }
}

// ============================================================================
// Selection policy
// ============================================================================

/// Applies the pipeline's character set policy on top of a converter.
#[derive(Debug)]
pub struct CharsetNormalizer<C> {
    converter: C,
    conversion_needed: bool,
}

impl<C: CharsetConverter> CharsetNormalizer<C> {
    pub fn new(converter: C) -> Self {
        Self { converter, conversion_needed: true }
    }

    /// Activate the set named by `label`.
    ///
    /// [`UTF8_LABEL`] disables conversion altogether. Any other label that
    /// cannot be selected is retried once with a leading `\`, for files that
    /// use an ISO 2022 term without declaring code extensions.
    pub fn activate(&mut self, label: &str) -> Result<(), CharsetError> {
        if label == UTF8_LABEL {
            debug!("Input is UTF-8, conversion not needed");
            self.conversion_needed = false;
            return Ok(());
        }
        self.conversion_needed = true;

        if let Err(err) = self.converter.select(label) {
            warn!(
                label,
                error = %err,
                "Possible invalid DICOM encoding. Unable to select character set, retrying with code extensions"
            );
            self.converter.select(&format!("{VALUE_SEPARATOR}{label}"))?;
        }
        Ok(())
    }

    /// Convert one value to UTF-8 text.
    pub fn convert(&self, raw: &[u8]) -> Result<String, CharsetError> {
        if !self.conversion_needed {
            return Ok(String::from_utf8_lossy(raw).into_owned());
        }
        self.converter.convert(raw)
    }

    pub fn converter(&self) -> &C {
        &self.converter
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    fn select(label: &str) -> DicomCharsets {
        let mut charsets = DicomCharsets::default();
        charsets.select(label).unwrap();
        charsets
    }

    #[test]
    fn test_single_byte_sets() {
        let latin1 = select("ISO_IR 100");
        assert_eq!(latin1.convert(b"M\xFCller^Hans").unwrap(), "Müller^Hans");

        let cyrillic = select("ISO_IR 144");
        assert_eq!(cyrillic.convert(b"\xB0\xD0").unwrap(), "Аа");

        let default = select("");
        assert_eq!(default.convert(b"Doe^John").unwrap(), "Doe^John");
    }

    #[test]
    fn test_multi_byte_single_valued_sets() {
        let gb = select("GB18030");
        assert_eq!(gb.convert(b"\xCD\xF5").unwrap(), "王");

        let utf8 = select(UTF8_LABEL);
        assert_eq!(utf8.convert("Zoë".as_bytes()).unwrap(), "Zoë");
        assert!(matches!(utf8.convert(b"\xFF\xFE"), Err(CharsetError::Undecodable(_))));
    }

    #[test]
    fn test_rejected_labels() {
        let mut charsets = DicomCharsets::default();
        assert_eq!(charsets.convert(b"x"), Err(CharsetError::NotSelected));
        assert_eq!(
            charsets.select("ISO_IR 999"),
            Err(CharsetError::UnknownLabel("ISO_IR 999".into()))
        );
        assert_eq!(
            charsets.select("ISO 2022 IR 100"),
            Err(CharsetError::CodeExtensionsRequired("ISO 2022 IR 100".into()))
        );
        assert!(charsets.select("\\ISO 2022 IR 100").is_ok());
        assert!(matches!(charsets.select("\\ISO 2022 IR 42"), Err(CharsetError::UnknownLabel(_))));
    }

    #[test]
    fn test_code_extensions_latin() {
        let charsets = select("\\ISO 2022 IR 100");
        assert_eq!(charsets.convert(b"\x1B-AM\xFCller").unwrap(), "Müller");
        // High bytes before any designation use the declared G1 set
        assert_eq!(charsets.convert(b"M\xFCller").unwrap(), "Müller");
        assert_eq!(charsets.convert(b"\x1B$B;3"), Err(CharsetError::UndeclaredEscape(87)));
    }

    #[test]
    fn test_code_extensions_japanese() {
        let charsets = select("\\ISO 2022 IR 87");
        let raw = b"Yamada^Tarou=\x1B$B;3ED\x1B(B^\x1B$BB@O:\x1B(B";
        assert_eq!(charsets.convert(raw).unwrap(), "Yamada^Tarou=山田^太郎");

        let katakana = select("ISO 2022 IR 13\\ISO 2022 IR 87");
        assert_eq!(katakana.convert(b"\xD4\xCF\xC0\xDE").unwrap(), "ﾔﾏﾀﾞ");
    }

    #[test]
    fn test_code_extensions_korean() {
        let charsets = select("\\ISO 2022 IR 149");
        let raw = b"Hong^Gildong=\x1B$)C\xFB\xF3^\x1B$)C\xD1\xCE\xD4\xD7";
        assert_eq!(charsets.convert(raw).unwrap(), "Hong^Gildong=洪^吉洞");
    }

    /// Converter that records selection attempts and accepts one label.
    #[derive(Default)]
    struct RecordingConverter {
        accept: Option<&'static str>,
        attempts: Vec<String>,
    }

    impl CharsetConverter for RecordingConverter {
        fn select(&mut self, label: &str) -> Result<(), CharsetError> {
            self.attempts.push(label.to_string());
            match self.accept {
                Some(accepted) if accepted == label => Ok(()),
                _ => Err(CharsetError::UnknownLabel(label.to_string())),
            }
        }

        fn convert(&self, raw: &[u8]) -> Result<String, CharsetError> {
            Ok(raw.iter().map(|b| char::from(*b)).collect::<String>().to_uppercase())
        }
    }

    #[test]
    fn test_failed_selection_is_retried_once_with_separator() {
        let converter = RecordingConverter { accept: Some("\\ISO 2022 IR 100"), ..Default::default() };
        let mut normalizer = CharsetNormalizer::new(converter);
        normalizer.activate("ISO 2022 IR 100").unwrap();
        assert_eq!(normalizer.converter().attempts, vec!["ISO 2022 IR 100", "\\ISO 2022 IR 100"]);

        let mut normalizer = CharsetNormalizer::new(RecordingConverter::default());
        assert!(normalizer.activate("ISO_IR 999").is_err());
        assert_eq!(normalizer.converter().attempts.len(), 2);
    }

    #[test]
    fn test_accepted_label_is_selected_once() {
        let converter = RecordingConverter { accept: Some("ISO_IR 100"), ..Default::default() };
        let mut normalizer = CharsetNormalizer::new(converter);
        normalizer.activate("ISO_IR 100").unwrap();
        assert_eq!(normalizer.converter().attempts.len(), 1);
        assert!(normalizer.conversion_needed);
        assert_eq!(normalizer.convert(b"ct").unwrap(), "CT");
    }

    #[test]
    fn test_utf8_passes_through_untouched() {
        let mut normalizer = CharsetNormalizer::new(RecordingConverter::default());
        normalizer.activate(UTF8_LABEL).unwrap();
        assert!(normalizer.converter().attempts.is_empty());
        assert!(!normalizer.conversion_needed);
        assert_eq!(normalizer.convert("Zoë^Ōno".as_bytes()).unwrap(), "Zoë^Ōno");
    }
}
