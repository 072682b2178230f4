//! Source document model: what the document adapter hands to the pipeline.
//!
//! Reading `.docx` containers is not this crate's job. An adapter (python-docx,
//! a zip + XML reader, a test fixture) extracts paragraphs, their runs, the
//! document's tables and the embedded image parts, and passes them in as a
//! [`SourceDocument`]. Everything downstream is pure data processing.
//!
//! The types are serde-serialisable so a document can be dumped to JSON once
//! and replayed through the pipeline (the CLI works this way). Binary image
//! payloads travel as base64 strings.

use serde::{Deserialize, Serialize};

/// One styled run inside a paragraph.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Run {
    pub text: String,
    #[serde(default)]
    pub bold: bool,
    #[serde(default)]
    pub italic: bool,
}

impl Run {
    /// A plain (non-emphasised) run.
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }

    /// A bold run.
    pub fn bold(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            bold: true,
            italic: false,
        }
    }

    /// An italic run.
    pub fn italic(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            bold: false,
            italic: true,
        }
    }

    /// Bold or italic.
    pub fn is_emphasised(&self) -> bool {
        self.bold || self.italic
    }
}

/// A paragraph as extracted from the source document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParagraphRecord {
    /// 0-based index in the document's paragraph sequence.
    pub position: usize,
    /// Style name, e.g. `"Normal"`, `"Heading 2"`, `"Title"`.
    pub style: String,
    /// Full paragraph text (concatenation of the run texts).
    pub text: String,
    #[serde(default)]
    pub runs: Vec<Run>,
    /// Opaque markup of the first run; image paragraphs reference their
    /// picture part in here (`.../media/image3.png`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_ref: Option<String>,
}

impl ParagraphRecord {
    /// Build a paragraph whose text is the concatenation of `runs`.
    pub fn new(position: usize, style: impl Into<String>, runs: Vec<Run>) -> Self {
        let text = runs.iter().map(|r| r.text.as_str()).collect();
        Self {
            position,
            style: style.into(),
            text,
            runs,
            image_ref: None,
        }
    }

    /// Single-run plain paragraph.
    pub fn plain(position: usize, style: impl Into<String>, text: impl Into<String>) -> Self {
        Self::new(position, style, vec![Run::plain(text)])
    }

    /// An (otherwise empty) paragraph holding an inline picture.
    pub fn image(position: usize, image_ref: impl Into<String>) -> Self {
        Self {
            position,
            style: "Normal".to_string(),
            image_ref: Some(image_ref.into()),
            ..Self::default()
        }
    }

    /// True when the text has no visible characters.
    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }

    /// First word of the style name, lower-cased (`"heading"`, `"normal"`).
    pub fn style_family(&self) -> String {
        self.style
            .split_whitespace()
            .next()
            .unwrap_or_default()
            .to_lowercase()
    }
}

/// A table of the source document, as rows of cell texts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grid {
    pub rows: Vec<Vec<String>>,
}

impl Grid {
    /// Text of the only cell of a 1×1 grid.
    pub fn single_cell(&self) -> Option<&str> {
        match self.rows.as_slice() {
            [row] => match row.as_slice() {
                [cell] => Some(cell.as_str()),
                _ => None,
            },
            _ => None,
        }
    }
}

/// An embedded image part of the document package.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImagePart {
    /// Part name inside the package, e.g. `/word/media/image1.png`.
    pub part_name: String,
    #[serde(with = "base64_bytes")]
    pub bytes: Vec<u8>,
}

/// Everything the pipeline needs from one document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceDocument {
    pub paragraphs: Vec<ParagraphRecord>,
    #[serde(default)]
    pub tables: Vec<Grid>,
    #[serde(default)]
    pub images: Vec<ImagePart>,
}

impl SourceDocument {
    pub fn new(paragraphs: Vec<ParagraphRecord>) -> Self {
        Self {
            paragraphs,
            ..Self::default()
        }
    }

    /// Parse a JSON dump produced by a document adapter.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

/// Serde adapter storing `Vec<u8>` as a base64 string.
pub(crate) mod base64_bytes {
    use base64::{engine::general_purpose::STANDARD, Engine as _};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&STANDARD.encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let encoded = String::deserialize(deserializer)?;
        STANDARD
            .decode(encoded.as_bytes())
            .map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paragraph_text_is_run_concatenation() {
        let p = ParagraphRecord::new(0, "Normal", vec![Run::plain("a "), Run::bold("b")]);
        assert_eq!(p.text, "a b");
        assert_eq!(p.style_family(), "normal");
    }

    #[test]
    fn blank_detection_ignores_tabs_and_newlines() {
        assert!(ParagraphRecord::plain(0, "Normal", " \t\n").is_blank());
        assert!(!ParagraphRecord::plain(0, "Normal", " x ").is_blank());
    }

    #[test]
    fn single_cell_only_for_one_by_one() {
        let one = Grid {
            rows: vec![vec!["code".into()]],
        };
        let wide = Grid {
            rows: vec![vec!["a".into(), "b".into()]],
        };
        assert_eq!(one.single_cell(), Some("code"));
        assert_eq!(wide.single_cell(), None);
        assert_eq!(Grid::default().single_cell(), None);
    }

    #[test]
    fn image_bytes_travel_as_base64() {
        let doc = SourceDocument {
            images: vec![ImagePart {
                part_name: "/word/media/image1.png".into(),
                bytes: vec![0x89, b'P', b'N', b'G'],
            }],
            ..SourceDocument::default()
        };
        let json = serde_json::to_string(&doc).unwrap();
        assert!(json.contains("iVBORw"), "got: {json}");
        let back = SourceDocument::from_json(&json).unwrap();
        assert_eq!(back, doc);
    }
}
