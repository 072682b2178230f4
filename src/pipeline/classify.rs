//! Paragraph classification: decide what role one paragraph plays.
//!
//! Classification is a pure function of the paragraph's style name, its
//! leading text and the configured [`MarkerSet`]. Markers win over styles so
//! an author can put `©©2` on a heading-styled line and still get a group.

use crate::config::MarkerSet;
use crate::document::ParagraphRecord;

/// Role of a single paragraph in the tree-building pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParagraphRole {
    /// `©©N`: this paragraph and the next `count` form one note.
    Group { count: usize },
    /// `®®N`: the next paragraph holds a picture visible `span` levels down.
    Photo { span: u8 },
    /// Paragraph references a 1×1 code table whose first line is `key`.
    CodeBlock { key: String },
    /// `Heading N` style with visible text.
    Heading { level: u32 },
    /// Normal-style paragraph with visible text.
    Content,
    /// Nothing to build.
    Blank,
}

/// Classify a paragraph. First match wins:
/// group marker, photo marker, code marker, heading, content, blank.
pub fn classify(paragraph: &ParagraphRecord, markers: &MarkerSet) -> ParagraphRole {
    let text = paragraph.text.as_str();

    if let Some(count) = marker_digit(text, &markers.group) {
        return ParagraphRole::Group {
            count: usize::from(count),
        };
    }
    if let Some(span) = marker_digit(text, &markers.photo) {
        return ParagraphRole::Photo { span };
    }
    if text.contains(markers.code.as_str()) {
        return ParagraphRole::CodeBlock {
            key: code_key(text, &markers.code),
        };
    }
    if paragraph.is_blank() {
        return ParagraphRole::Blank;
    }
    if let Some(level) = heading_level(&paragraph.style) {
        return ParagraphRole::Heading { level };
    }
    if paragraph.style_family() == "normal" {
        return ParagraphRole::Content;
    }
    ParagraphRole::Blank
}

/// Digit immediately following `marker` at the start of `text`.
///
/// Only one digit is read: `©©12` is a group of one with text `2...`.
pub fn marker_digit(text: &str, marker: &str) -> Option<u8> {
    let rest = text.strip_prefix(marker)?;
    let digit = rest.chars().next()?.to_digit(10)?;
    u8::try_from(digit).ok()
}

/// Byte length of the `<marker><digit>` token at the start of `text`, if any.
pub fn marker_token_len(text: &str, marker: &str) -> Option<usize> {
    marker_digit(text, marker).map(|_| marker.len() + 1)
}

/// Lookup key for a code reference: the text without any code sentinel.
pub fn code_key(text: &str, marker: &str) -> String {
    text.replace(marker, "").trim().to_string()
}

/// Parse `"Heading N"` (case-insensitive) into `N`; `N` must be positive.
pub fn heading_level(style: &str) -> Option<u32> {
    let mut words = style.split_whitespace();
    if !words.next()?.eq_ignore_ascii_case("heading") {
        return None;
    }
    let level: u32 = words.next()?.parse().ok()?;
    (level > 0).then_some(level)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::ParagraphRecord;

    fn para(style: &str, text: &str) -> ParagraphRecord {
        ParagraphRecord::plain(0, style, text)
    }

    fn role(style: &str, text: &str) -> ParagraphRole {
        classify(&para(style, text), &MarkerSet::default())
    }

    #[test]
    fn group_marker_with_digit() {
        assert_eq!(
            role("Normal", "©©2 intro"),
            ParagraphRole::Group { count: 2 }
        );
    }

    #[test]
    fn group_marker_without_digit_is_content() {
        assert_eq!(role("Normal", "©©x intro"), ParagraphRole::Content);
    }

    #[test]
    fn group_marker_reads_single_digit() {
        assert_eq!(role("Normal", "©©12"), ParagraphRole::Group { count: 1 });
    }

    #[test]
    fn group_marker_wins_over_heading_style() {
        assert_eq!(
            role("Heading 1", "©©3"),
            ParagraphRole::Group { count: 3 }
        );
    }

    #[test]
    fn photo_marker_span() {
        assert_eq!(role("Normal", "®®0"), ParagraphRole::Photo { span: 0 });
        assert_eq!(role("Normal", "®®9 map"), ParagraphRole::Photo { span: 9 });
    }

    #[test]
    fn code_marker_anywhere() {
        assert_eq!(
            role("Normal", "see §§ fn main() {"),
            ParagraphRole::CodeBlock {
                key: "see  fn main() {".to_string()
            }
        );
    }

    #[test]
    fn heading_levels() {
        assert_eq!(role("Heading 3", "Intro"), ParagraphRole::Heading { level: 3 });
        assert_eq!(role("heading 1", "Intro"), ParagraphRole::Heading { level: 1 });
        assert_eq!(role("Heading 0", "Intro"), ParagraphRole::Blank);
        assert_eq!(role("Heading", "Intro"), ParagraphRole::Blank);
    }

    #[test]
    fn empty_heading_is_blank() {
        assert_eq!(role("Heading 2", " \t"), ParagraphRole::Blank);
    }

    #[test]
    fn normal_and_blank() {
        assert_eq!(role("Normal", "word"), ParagraphRole::Content);
        assert_eq!(role("Normal (Web)", "word"), ParagraphRole::Content);
        assert_eq!(role("Normal", "   "), ParagraphRole::Blank);
        assert_eq!(role("Title", "Document title"), ParagraphRole::Blank);
    }

    #[test]
    fn token_len_counts_marker_bytes() {
        assert_eq!(marker_token_len("©©2 a", "©©"), Some("©©".len() + 1));
        assert_eq!(marker_token_len("a ©©2", "©©"), None);
    }
}
