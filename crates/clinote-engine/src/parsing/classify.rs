use std::sync::LazyLock;

use regex::Regex;

use crate::models::BlockType;

static NUMBER_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]+\.\s").expect("number marker pattern is valid"));

/// The kind of a single line, before lines are grouped into blocks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    Heading1,
    Heading2,
    Paragraph,
    Bullet,
    Number,
    Check { checked: bool },
    Quote,
}

impl LineKind {
    /// The block type a run of lines of this kind becomes
    pub fn block_type(self) -> BlockType {
        match self {
            LineKind::Heading1 => BlockType::Heading1,
            LineKind::Heading2 => BlockType::Heading2,
            LineKind::Paragraph => BlockType::Paragraph,
            LineKind::Bullet => BlockType::BulletList,
            LineKind::Number => BlockType::NumberList,
            LineKind::Check { .. } => BlockType::CheckList,
            LineKind::Quote => BlockType::Quote,
        }
    }

    pub fn checked(self) -> Option<bool> {
        match self {
            LineKind::Check { checked } => Some(checked),
            _ => None,
        }
    }
}

/// Classification of a single line: its kind and the text after the marker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineClass<'a> {
    pub kind: LineKind,
    /// Line content with the leading marker stripped
    pub content: &'a str,
}

/// Classifies one line of note text (without its line break).
///
/// Markers are tried in a fixed priority order and the first match wins;
/// a line matching nothing is paragraph text, so classification never fails.
pub fn classify_line(line: &str) -> LineClass<'_> {
    let (kind, content) = if let Some(rest) = line.strip_prefix("# ") {
        (LineKind::Heading1, rest)
    } else if let Some(rest) = line.strip_prefix("## ") {
        (LineKind::Heading2, rest)
    } else if let Some(rest) = line.strip_prefix("- [ ] ") {
        (LineKind::Check { checked: false }, rest)
    } else if let Some(rest) = line.strip_prefix("- [x] ") {
        (LineKind::Check { checked: true }, rest)
    } else if let Some(rest) = line
        .strip_prefix("- ")
        .or_else(|| line.strip_prefix("* "))
    {
        (LineKind::Bullet, rest)
    } else if let Some(marker) = NUMBER_MARKER.find(line) {
        (LineKind::Number, &line[marker.end()..])
    } else if let Some(rest) = line.strip_prefix("> ") {
        (LineKind::Quote, rest)
    } else {
        (LineKind::Paragraph, line)
    };

    LineClass { kind, content }
}
