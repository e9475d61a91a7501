//! Shared fixtures for the getdcmtags end-to-end tests

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

pub const SERIES_UID: &str = "1.2.826.0.1.3680043.2.1125.1";
pub const SOP_UID: &str = "1.2.826.0.1.3680043.2.1125.1.7";

/// Builds explicit VR little endian Part 10 files.
pub struct DicomBuilder {
    elements: Vec<(u16, u16, [u8; 2], Vec<u8>)>,
}

impl DicomBuilder {
    /// A CT image with the attributes every run needs.
    pub fn ct() -> Self {
        Self { elements: Vec::new() }
            .with(0x0008, 0x0005, b"CS", b"ISO_IR 100")
            .with(0x0008, 0x0018, b"UI", SOP_UID.as_bytes())
            .with(0x0008, 0x0060, b"CS", b"CT")
            .with(0x0010, 0x0010, b"PN", b"M\xFCller^Hans")
            .with(0x0010, 0x0020, b"LO", b"PAT-0042")
            .with(0x0020, 0x000E, b"UI", SERIES_UID.as_bytes())
    }

    /// Add or replace an attribute. Values are padded to even length.
    pub fn with(mut self, group: u16, element: u16, vr: &[u8; 2], value: &[u8]) -> Self {
        self.elements.retain(|(g, e, _, _)| (*g, *e) != (group, element));
        let mut value = value.to_vec();
        if value.len() % 2 == 1 {
            value.push(if vr == b"UI" { 0 } else { b' ' });
        }
        self.elements.push((group, element, *vr, value));
        self
    }

    pub fn bytes(&self) -> Vec<u8> {
        let mut meta = encode(0x0002, 0x0002, b"UI", b"1.2.840.10008.5.1.4.1.1.2\0");
        meta.extend(encode(0x0002, 0x0010, b"UI", b"1.2.840.10008.1.2.1\0"));

        let mut out = vec![0u8; 128];
        out.extend_from_slice(b"DICM");
        out.extend(encode(0x0002, 0x0000, b"UL", &(meta.len() as u32).to_le_bytes()));
        out.extend(meta);

        let mut elements = self.elements.clone();
        elements.sort_by_key(|(group, element, _, _)| (*group, *element));
        for (group, element, vr, value) in &elements {
            out.extend(encode(*group, *element, vr, value));
        }
        out
    }

    pub fn write(&self, path: &Path) {
        fs::write(path, self.bytes()).unwrap();
    }
}

fn encode(group: u16, element: u16, vr: &[u8; 2], value: &[u8]) -> Vec<u8> {
    let mut out = Vec::new();
    out.extend_from_slice(&group.to_le_bytes());
    out.extend_from_slice(&element.to_le_bytes());
    out.extend_from_slice(vr);
    if matches!(vr, b"OB" | b"OW" | b"SQ" | b"UN" | b"UT" | b"UC" | b"UR") {
        out.extend_from_slice(&[0, 0]);
        out.extend_from_slice(&(value.len() as u32).to_le_bytes());
    } else {
        out.extend_from_slice(&(value.len() as u16).to_le_bytes());
    }
    out.extend_from_slice(value);
    out
}

pub fn series_dir(root: &Path) -> PathBuf {
    root.join(SERIES_UID)
}

pub fn relocated(root: &Path, name: &str) -> PathBuf {
    series_dir(root).join(format!("{SERIES_UID}#{name}.dcm"))
}

pub fn tags_file(root: &Path, name: &str) -> PathBuf {
    series_dir(root).join(format!("{SERIES_UID}#{name}.tags"))
}
