//! Filter lines typed into the header region of a listing.
//!
//! Grammar (case-sensitive):
//!
//! ```text
//! filter-line := [ "file" ] sigil pattern
//! sigil       := "+" | "-"
//! pattern     := one or more characters
//! ```
//!
//! Only lines above the first file header are considered. Anything that does not
//! fit the grammar is simply not a filter.

use crate::config::DEFAULT_FILENAME_PREFIX;
use crate::engine::classify::is_file_header;

/// Which lines a filter is tested against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterScope {
    /// File header lines; a failing header hides its whole group
    Filename,
    /// Result lines
    Content,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Polarity {
    Include,
    Exclude,
}

/// One parsed filter line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Filter {
    pub scope: FilterScope,
    pub polarity: Polarity,
    /// Substring to look for, never empty
    pub pattern: String,
    /// Line of the buffer the filter was read from
    pub source_line: usize,
}

impl Filter {
    fn accepts(&self, text: &str) -> bool {
        match self.polarity {
            Polarity::Include => text.contains(self.pattern.as_str()),
            Polarity::Exclude => !text.contains(self.pattern.as_str()),
        }
    }
}

/// Index of the first file header line, if any.
pub fn first_file_header<'a, I>(lines: I) -> Option<usize>
where
    I: IntoIterator<Item = &'a str>,
{
    lines.into_iter().position(is_file_header)
}

/// Parse filter lines with the default `file` prefix.
pub fn parse_filters<'a, I>(lines: I) -> Vec<Filter>
where
    I: IntoIterator<Item = &'a str>,
{
    parse_filters_with_prefix(lines, DEFAULT_FILENAME_PREFIX)
}

/// Parse filter lines from the top of a buffer, stopping at the first file header.
pub fn parse_filters_with_prefix<'a, I>(lines: I, filename_prefix: &str) -> Vec<Filter>
where
    I: IntoIterator<Item = &'a str>,
{
    lines
        .into_iter()
        .take_while(|line| !is_file_header(line))
        .enumerate()
        .filter_map(|(source_line, line)| parse_filter_line(line, source_line, filename_prefix))
        .collect()
}

fn parse_filter_line(line: &str, source_line: usize, filename_prefix: &str) -> Option<Filter> {
    let (scope, rest) = match line.strip_prefix(filename_prefix) {
        Some(rest) => (FilterScope::Filename, rest),
        None => (FilterScope::Content, line),
    };

    let (polarity, pattern) = if let Some(pattern) = rest.strip_prefix('+') {
        (Polarity::Include, pattern)
    } else if let Some(pattern) = rest.strip_prefix('-') {
        (Polarity::Exclude, pattern)
    } else {
        return None;
    };

    if pattern.is_empty() {
        return None;
    }

    Some(Filter {
        scope,
        polarity,
        pattern: pattern.to_string(),
        source_line,
    })
}

/// Parsed filters split by scope. All filters of a scope must accept a line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterSet {
    filters: Vec<Filter>,
    filename: Vec<usize>,
    content: Vec<usize>,
}

impl FilterSet {
    pub fn new(filters: Vec<Filter>) -> Self {
        let (filename, content): (Vec<usize>, Vec<usize>) = (0..filters.len())
            .partition(|&i| filters[i].scope == FilterScope::Filename);
        Self {
            filters,
            filename,
            content,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }

    pub fn len(&self) -> usize {
        self.filters.len()
    }

    /// Filters in the order they appear in the buffer.
    pub fn filters(&self) -> &[Filter] {
        &self.filters
    }

    pub fn filename_filters(&self) -> impl Iterator<Item = &Filter> {
        self.filename.iter().map(|&i| &self.filters[i])
    }

    pub fn content_filters(&self) -> impl Iterator<Item = &Filter> {
        self.content.iter().map(|&i| &self.filters[i])
    }

    /// Whether a file header survives the filename filters. Vacuously true.
    pub fn passes_filename(&self, header: &str) -> bool {
        self.filename_filters().all(|f| f.accepts(header))
    }

    /// Whether a result line survives the content filters. Vacuously true.
    pub fn passes_content(&self, line: &str) -> bool {
        self.content_filters().all(|f| f.accepts(line))
    }
}

impl From<Vec<Filter>> for FilterSet {
    fn from(filters: Vec<Filter>) -> Self {
        Self::new(filters)
    }
}
