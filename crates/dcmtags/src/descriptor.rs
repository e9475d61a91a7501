//! Tags file
//!
//! The `.tags` file is a JSON object with one `"Key": "value",` pair per
//! line, in a fixed order consumers rely on, ending with the original file
//! name:
//!
//! ```text
//! {
//! "SpecificCharacterSet": "ISO_IR 100",
//! "SeriesInstanceUID": "1.2.3",
//! ...
//! "Filename": "img0001"
//! }
//! ```

use std::fs;
use std::io::{self, Write};
use std::path::Path;

/// Ordered key/value pairs of a tags file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Descriptor {
    entries: Vec<(String, String)>,
}

impl Descriptor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, label: impl Into<String>, value: impl Into<String>) {
        self.entries.push((label.into(), value.into()));
    }

    /// The file content, closed by the `Filename` entry.
    pub fn render(&self, filename: &str) -> String {
        let mut out = String::from("{\n");
        for (label, value) in &self.entries {
            out.push_str(&format!("\"{}\": \"{}\",\n", escape_json(label), escape_json(value)));
        }
        out.push_str(&format!("\"Filename\": \"{}\"\n}}\n", escape_json(filename)));
        out
    }

    /// Write the file to `path`. A partially written file is removed again.
    pub fn write(&self, path: &Path, filename: &str) -> io::Result<()> {
        let result = fs::File::create(path).and_then(|mut file| {
            file.write_all(self.render(filename).as_bytes())?;
            file.sync_all()
        });
        if result.is_err() && path.is_file() {
            let _ = fs::remove_file(path);
        }
        result
    }
}

/// Escape a JSON string value.
///
/// Quote, backslash and U+0000..U+001F are written as `\u00XX`; everything
/// else is copied unchanged.
pub fn escape_json(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        if c == '"' || c == '\\' || c <= '\u{1f}' {
            out.push_str(&format!("\\u{:04x}", u32::from(c)));
        } else {
            out.push(c);
        }
    }
    out
}
