//! Line classification for search-result listings.
//!
//! A listing is a run of header lines, then groups that each start with a
//! `<path>:` line followed by `  <line>: <snippet>` result entries and blank or
//! context lines. The two recognisers below are plain structural matchers kept
//! as data so the grammar lives in one place.

/// Kind of a single listing line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    /// `<name>:` opening a file group
    FileHeader,
    /// `<ws><digits><sep> <text>` result entry
    ResultLine,
    /// Blank separators, context lines, header text
    Other,
}

/// Characters that end a line for pattern purposes and may not appear inside one.
const LINE_TERMINATORS: &[char] = &['\n', '\r', '\u{2028}', '\u{2029}'];

fn has_line_terminator(text: &str) -> bool {
    text.contains(LINE_TERMINATORS)
}

/// Whitespace as listing producers count it: a byte-order mark is whitespace,
/// NEL is not.
fn is_listing_whitespace(c: char) -> bool {
    c == '\u{feff}' || (c.is_whitespace() && c != '\u{85}')
}

/// Recogniser for `<name>:` lines.
#[derive(Debug, Clone, Copy)]
pub struct FileHeaderPattern {
    pub terminator: char,
}

impl FileHeaderPattern {
    pub fn matches(&self, line: &str) -> bool {
        let Some(name) = line.strip_suffix(self.terminator) else {
            return false;
        };
        match name.chars().next() {
            Some(first) => !is_listing_whitespace(first) && !has_line_terminator(name),
            None => false,
        }
    }
}

/// Recogniser for `<ws>+<digits><sep> <text>` lines.
#[derive(Debug, Clone, Copy)]
pub struct ResultLinePattern {
    pub separators: &'static [char],
}

impl ResultLinePattern {
    pub fn matches(&self, line: &str) -> bool {
        let rest = line.trim_start_matches(is_listing_whitespace);
        if rest.len() == line.len() {
            return false;
        }

        let digits = rest.bytes().take_while(u8::is_ascii_digit).count();
        if digits == 0 {
            return false;
        }

        let mut tail = rest[digits..].chars();
        match (tail.next(), tail.next()) {
            (Some(sep), Some(' ')) if self.separators.contains(&sep) => {
                !has_line_terminator(tail.as_str())
            }
            _ => false,
        }
    }
}

pub const FILE_HEADER: FileHeaderPattern = FileHeaderPattern { terminator: ':' };

pub const RESULT_LINE: ResultLinePattern = ResultLinePattern {
    separators: &[':', ' '],
};

/// Classify one line of a listing.
pub fn classify(line: &str) -> LineKind {
    if FILE_HEADER.matches(line) {
        LineKind::FileHeader
    } else if RESULT_LINE.matches(line) {
        LineKind::ResultLine
    } else {
        LineKind::Other
    }
}

pub fn is_file_header(line: &str) -> bool {
    FILE_HEADER.matches(line)
}
