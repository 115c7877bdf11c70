//! M3U entry parsing and `#EXTINF` line helpers.

use once_cell::sync::Lazy;
use regex::{NoExpand, Regex};

pub const METADATA_MARKER: &str = "#EXTINF";
pub const PLAYLIST_HEADER: &str = "#EXTM3U";

static GROUP_TITLE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?i)group-title="([^"]*)""#).expect("valid group-title regex"));

/// One playlist item as found in a fetched feed
#[derive(Debug, Clone, PartialEq)]
pub struct RawEntry {
    /// The `#EXTINF` line exactly as it appeared (trimmed)
    pub metadata_line: String,
    pub stream_url: String,
    pub declared_name: String,
    /// `group-title` value, or the source name when the attribute is missing or empty
    pub declared_group: String,
}

/// Lazily yields the entries of one feed. Consumed once.
pub struct EntryIter<'a> {
    lines: std::str::Lines<'a>,
    source_name: &'a str,
    pending: Option<&'a str>,
}

pub fn parse_entries<'a>(text: &'a str, source_name: &'a str) -> EntryIter<'a> {
    EntryIter {
        lines: text.lines(),
        source_name,
        pending: None,
    }
}

impl Iterator for EntryIter<'_> {
    type Item = RawEntry;

    fn next(&mut self) -> Option<RawEntry> {
        for line in self.lines.by_ref() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            if line.starts_with(METADATA_MARKER) {
                // A metadata line without a URL is dropped when the next one starts
                self.pending = Some(line);
            } else if is_url_line(line) {
                if let Some(metadata) = self.pending.take() {
                    return Some(RawEntry {
                        metadata_line: metadata.to_string(),
                        stream_url: line.to_string(),
                        declared_name: display_name(metadata).to_string(),
                        declared_group: group_title(metadata)
                            .unwrap_or(self.source_name)
                            .to_string(),
                    });
                }
            }
        }
        None
    }
}

/// `scheme://...` where the scheme starts with a letter and continues with letters, digits, `+`, `-` or `.`
pub fn is_url_line(line: &str) -> bool {
    let Some((scheme, _)) = line.split_once("://") else {
        return false;
    };
    let mut chars = scheme.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
}

/// Byte offset of the comma separating attributes from the display name,
/// skipping commas inside quoted attribute values. A line with unbalanced quotes
/// falls back to its first comma.
pub fn name_separator(line: &str) -> Option<usize> {
    let mut in_quotes = false;
    for (i, c) in line.char_indices() {
        match c {
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes => return Some(i),
            _ => {}
        }
    }
    if in_quotes {
        line.find(',')
    } else {
        None
    }
}

fn attributes(line: &str) -> &str {
    match name_separator(line) {
        Some(pos) => &line[..pos],
        None => line,
    }
}

pub fn display_name(line: &str) -> &str {
    match name_separator(line) {
        Some(pos) => line[pos + 1..].trim(),
        None => "",
    }
}

/// Non-empty `group-title` value of a metadata line
pub fn group_title(line: &str) -> Option<&str> {
    GROUP_TITLE_RE
        .captures(attributes(line))
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim())
        .filter(|value| !value.is_empty())
}

/// Sets the `group-title` of a metadata line, inserting the attribute ahead of the
/// display-name comma when the line has none.
pub fn rewrite_group_title(line: &str, group: &str) -> String {
    let attribute = format!("group-title=\"{}\"", group.replace('"', "'"));
    let split = name_separator(line).unwrap_or(line.len());
    let (attrs, rest) = line.split_at(split);

    if GROUP_TITLE_RE.is_match(attrs) {
        let attrs = GROUP_TITLE_RE.replace(attrs, NoExpand(attribute.as_str()));
        format!("{attrs}{rest}")
    } else {
        format!("{} {attribute}{rest}", attrs.trim_end())
    }
}
