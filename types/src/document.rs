//! Plain document/position/range records passed into the core logic.
//!
//! Positions are zero-indexed; `character` counts Unicode scalar values
//! within the line. Lines are separated by `\n` with no terminator on
//! the last line, so a document ending in `\n` has a final empty line.

use std::path::{Path, PathBuf};

/// A zero-indexed line/character position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Position {
    pub line: u32,
    pub character: u32,
}

impl Position {
    #[must_use]
    pub const fn new(line: u32, character: u32) -> Self {
        Self { line, character }
    }
}

/// A span of document text from `start` (inclusive) to `end` (exclusive).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Range {
    pub start: Position,
    pub end: Position,
}

impl Range {
    #[must_use]
    pub const fn new(start: Position, end: Position) -> Self {
        Self { start, end }
    }
}

/// A single replacement of `range` with `new_text`.
///
/// The formatting provider only ever produces one of these per request:
/// the whole effective range replaced in one edit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextEdit {
    pub range: Range,
    pub new_text: String,
}

/// Snapshot of a document being handled by the bridge.
///
/// `language_id` is the content type the host declared for the document
/// ("nginx" for everything this integration accepts).
#[derive(Debug, Clone)]
pub struct Document {
    path: PathBuf,
    language_id: String,
    text: String,
}

impl Document {
    #[must_use]
    pub fn new(path: PathBuf, language_id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            path,
            language_id: language_id.into(),
            text: text.into(),
        }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    #[must_use]
    pub fn language_id(&self) -> &str {
        &self.language_id
    }

    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Number of lines. An empty document still has one (empty) line.
    #[must_use]
    pub fn line_count(&self) -> u32 {
        u32::try_from(self.text.split('\n').count()).unwrap_or(u32::MAX)
    }

    /// Text of the zero-indexed line, without its terminator.
    ///
    /// Lines past the end read as empty.
    #[must_use]
    pub fn line(&self, index: u32) -> &str {
        self.text.split('\n').nth(index as usize).unwrap_or("")
    }

    /// Range covering the entire document: `{0, 0}` through the last
    /// character of the last line.
    #[must_use]
    pub fn full_range(&self) -> Range {
        let last_line = self.line_count() - 1;
        let last_len = u32::try_from(self.line(last_line).chars().count()).unwrap_or(u32::MAX);
        Range::new(Position::new(0, 0), Position::new(last_line, last_len))
    }

    /// The text lying within `range`.
    ///
    /// Out-of-bounds coordinates clamp to the document rather than panic;
    /// the host is the authority on ranges and may race with edits.
    #[must_use]
    pub fn slice(&self, range: Range) -> String {
        let lines: Vec<&str> = self.text.split('\n').collect();
        let start_line = range.start.line as usize;
        let end_line = (range.end.line as usize).min(lines.len().saturating_sub(1));
        if start_line > end_line {
            return String::new();
        }

        let mut out = String::new();
        for (index, line) in lines
            .iter()
            .enumerate()
            .take(end_line + 1)
            .skip(start_line)
        {
            let from = if index == start_line {
                range.start.character as usize
            } else {
                0
            };
            let to = if index == end_line {
                range.end.character as usize
            } else {
                line.chars().count()
            };
            if index > start_line {
                out.push('\n');
            }
            out.extend(line.chars().skip(from).take(to.saturating_sub(from)));
        }
        out
    }

    /// Apply a replacement edit, producing the new document text.
    #[must_use]
    pub fn apply(&self, edit: &TextEdit) -> String {
        let start = self.byte_offset(edit.range.start);
        let end = self.byte_offset(edit.range.end).max(start);
        let mut out = String::with_capacity(self.text.len() + edit.new_text.len());
        out.push_str(&self.text[..start]);
        out.push_str(&edit.new_text);
        out.push_str(&self.text[end..]);
        out
    }

    /// Byte offset of a line/character position, clamped to the document.
    fn byte_offset(&self, position: Position) -> usize {
        let mut offset = 0;
        for (index, line) in self.text.split('\n').enumerate() {
            if index == position.line as usize {
                let in_line: usize = line
                    .chars()
                    .take(position.character as usize)
                    .map(char::len_utf8)
                    .sum();
                return offset + in_line;
            }
            offset += line.len() + 1;
        }
        self.text.len()
    }
}
