//! Section rendering shared by the aggregator and the merger.
//!
//! Every section is a header, the raw body, then a separator. The finished
//! buffer is trimmed before it is written.

/// Separator appended after every section body.
pub const SEPARATOR: &str = "\n\n---\n";

/// Header placed before each document inside an aggregate file.
pub fn document_header(stem: &str) -> String {
    format!("\n\n# {} からの内容\n\n", stem.to_uppercase())
}

/// Header placed before each aggregate inside the final merged file.
pub fn directory_header(source: &str) -> String {
    format!("\n\n# {} ディレクトリのルール\n\n", source.to_uppercase())
}

/// File name without the document suffix.
pub fn document_stem<'a>(file_name: &'a str, extension: &str) -> &'a str {
    file_name.strip_suffix(extension).unwrap_or(file_name)
}

/// Accumulates sections in order.
#[derive(Debug, Default)]
pub struct SectionBuffer {
    buf: String,
    sections: usize,
}

impl SectionBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `header`, `body` and the separator.
    pub fn push(&mut self, header: &str, body: &str) {
        self.buf.push_str(header);
        self.buf.push_str(body);
        self.buf.push_str(SEPARATOR);
        self.sections += 1;
    }

    pub fn len(&self) -> usize {
        self.sections
    }

    pub fn is_empty(&self) -> bool {
        self.sections == 0
    }

    /// The accumulated text with surrounding whitespace removed.
    pub fn finish(self) -> String {
        self.buf.trim().to_string()
    }
}
