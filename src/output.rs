//! Output types: flashcard records, referenced media and run statistics.

use crate::document::base64_bytes;
use crate::error::ConversionWarning;
use serde::{Deserialize, Serialize};

/// One note for the spaced-repetition tool.
///
/// Field values are HTML fragments ready to be dropped into note fields.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlashcardRecord {
    /// Question side: emphasised words replaced by underscores.
    pub front: String,
    /// Answer side: full text.
    pub back: String,
    /// `<img src="...">` tags for every picture attached to this note.
    pub media: String,
    /// Ancestor heading trail, root-most first.
    pub breadcrumb: String,
    pub tags: Vec<String>,
    /// Position of the first source paragraph of the note.
    pub source_position: usize,
}

/// An image file referenced by at least one note.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaFile {
    /// File name as referenced from `<img src>`, e.g. `image3.png`.
    pub name: String,
    #[serde(with = "base64_bytes")]
    pub bytes: Vec<u8>,
}

impl MediaFile {
    /// HTML tag referencing this file.
    pub fn img_tag(&self) -> String {
        format!(
            "<img src=\"{}\">",
            html_escape::encode_double_quoted_attribute(&self.name)
        )
    }
}

/// Counters collected during one conversion.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversionStats {
    pub paragraphs: usize,
    /// Tree nodes, root excluded.
    pub nodes: usize,
    pub notes: usize,
    pub media_files: usize,
    pub warnings: usize,
    pub total_duration_ms: u64,
}

/// Result of converting one document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConversionOutput {
    pub notes: Vec<FlashcardRecord>,
    /// Images referenced by `notes`, de-duplicated, in first-use order.
    pub media: Vec<MediaFile>,
    pub warnings: Vec<ConversionWarning>,
    pub stats: ConversionStats,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn img_tag_escapes_quotes() {
        let f = MediaFile {
            name: "a\"b.png".into(),
            bytes: vec![],
        };
        assert_eq!(f.img_tag(), "<img src=\"a&quot;b.png\">");
    }

    #[test]
    fn output_serialises_media_as_base64() {
        let out = ConversionOutput {
            media: vec![MediaFile {
                name: "image1.png".into(),
                bytes: vec![1, 2, 3],
            }],
            ..ConversionOutput::default()
        };
        let json = serde_json::to_string(&out).unwrap();
        assert!(json.contains("\"AQID\""), "got: {json}");
    }
}
