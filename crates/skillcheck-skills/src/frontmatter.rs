//! Splitting a document into its front-matter block and body
//!
//! A document opens with a `---` line, carries YAML metadata, and closes the
//! block with another `---` line. Everything after the closing line is the
//! body, kept byte-for-byte.

use crate::error::{Result, SkillError};

/// Delimiter line surrounding the metadata block
pub const DELIMITER: &str = "---";

const BOM: char = '\u{feff}';

/// Borrowed views into a raw document
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sections<'a> {
    /// YAML text between the delimiter lines (may be empty)
    pub metadata: &'a str,
    /// Everything after the closing delimiter line
    pub body: &'a str,
}

fn is_delimiter(line: &str) -> bool {
    line.trim_end() == DELIMITER
}

/// Split raw text into metadata and body
pub fn split(raw: &str) -> Result<Sections<'_>> {
    let raw = raw.strip_prefix(BOM).unwrap_or(raw);
    let mut lines = raw.split_inclusive('\n');

    let opening = lines.next().ok_or(SkillError::MissingOpeningDelimiter)?;
    if !is_delimiter(opening) {
        return Err(SkillError::MissingOpeningDelimiter);
    }

    let metadata_start = opening.len();
    let mut offset = metadata_start;

    for line in lines {
        if is_delimiter(line) {
            return Ok(Sections {
                metadata: &raw[metadata_start..offset],
                body: &raw[offset + line.len()..],
            });
        }
        offset += line.len();
    }

    Err(SkillError::UnterminatedFrontMatter)
}
