//! Error types for the docx2anki library.
//!
//! Two distinct error types reflect two distinct failure modes:
//!
//! * [`Docx2AnkiError`] — **Fatal**: the conversion cannot produce a
//!   trustworthy result at all (inconsistent image index, bad configuration,
//!   unreadable input dump). Returned as `Err(Docx2AnkiError)` from the
//!   top-level `convert*` functions before any media is written.
//!
//! * [`ConversionWarning`] — **Non-fatal**: one marker or node could not be
//!   turned into a card (photo without an image, missing code table), but the
//!   rest of the document is fine. Collected in
//!   [`crate::output::ConversionOutput::warnings`] and logged as it happens.

use std::path::PathBuf;
use thiserror::Error;

/// All fatal errors returned by the docx2anki library.
#[derive(Debug, Error)]
pub enum Docx2AnkiError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// Input dump was not found at the given path.
    #[error("Document dump not found: '{path}'\nCheck the path exists and is readable.")]
    FileNotFound { path: PathBuf },

    /// The input dump exists but is not a valid serialised document.
    #[error("Document dump '{path}' is invalid: {detail}")]
    InvalidDocument { path: PathBuf, detail: String },

    // ── Image index errors ────────────────────────────────────────────────
    /// An image name could not be mapped to exactly one embedded image part.
    ///
    /// Media association would silently attach the wrong picture, so the
    /// whole document is rejected.
    #[error(
        "Image '{image_name}' matches {matches} embedded image parts (paragraph {position}).\n\
The document must use one unique name per image. Re-export it (e.g. from Google Docs \
as .docx) so every picture gets its own imageN file name."
    )]
    ImageIndexInconsistent {
        image_name: String,
        position: usize,
        matches: usize,
    },

    // ── I/O errors ────────────────────────────────────────────────────────
    /// Could not create or write a media file.
    #[error("Failed to write media file '{path}': {source}")]
    MediaWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// A non-fatal problem found while building or emitting notes.
///
/// Every variant carries the 0-based paragraph position it refers to so the
/// author can find the offending line in the source document.
#[derive(Debug, Clone, PartialEq, Eq, Error, serde::Serialize, serde::Deserialize)]
pub enum ConversionWarning {
    /// Photo marker not followed by a paragraph carrying an image.
    #[error("Paragraph {position}: cannot process image for marker '{marker}'")]
    UnresolvedPhoto { position: usize, marker: String },

    /// The image part exists but its bytes are not a recognised image format.
    #[error("Paragraph {position}: image '{image_name}' is not a readable image")]
    UnreadableImage { position: usize, image_name: String },

    /// Group marker asked for more lines than the document has left.
    #[error("Paragraph {position}: group marker wants {requested} lines, only {available} remain")]
    TruncatedGroup {
        position: usize,
        requested: usize,
        available: usize,
    },

    /// Code-block reference whose key matches no 1×1 table.
    #[error("Paragraph {position}: no code table starts with '{key}'")]
    MissingCodeTable { position: usize, key: String },
}

impl ConversionWarning {
    /// Paragraph position the warning refers to.
    pub fn position(&self) -> usize {
        match self {
            ConversionWarning::UnresolvedPhoto { position, .. }
            | ConversionWarning::UnreadableImage { position, .. }
            | ConversionWarning::TruncatedGroup { position, .. }
            | ConversionWarning::MissingCodeTable { position, .. } => *position,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn image_index_display_mentions_regeneration() {
        let e = Docx2AnkiError::ImageIndexInconsistent {
            image_name: "image3.png".into(),
            position: 12,
            matches: 2,
        };
        let msg = e.to_string();
        assert!(msg.contains("image3.png"), "got: {msg}");
        assert!(msg.contains("Re-export"), "got: {msg}");
    }

    #[test]
    fn unresolved_photo_display() {
        let w = ConversionWarning::UnresolvedPhoto {
            position: 4,
            marker: "®®1".into(),
        };
        assert!(w.to_string().contains("®®1"));
        assert_eq!(w.position(), 4);
    }

    #[test]
    fn truncated_group_display() {
        let w = ConversionWarning::TruncatedGroup {
            position: 7,
            requested: 5,
            available: 2,
        };
        let msg = w.to_string();
        assert!(msg.contains("5 lines"), "got: {msg}");
        assert!(msg.contains("2 remain"), "got: {msg}");
    }

    #[test]
    fn warning_serialises_with_variant_name() {
        let w = ConversionWarning::MissingCodeTable {
            position: 1,
            key: "fn main() {".into(),
        };
        let json = serde_json::to_string(&w).unwrap();
        assert!(json.contains("MissingCodeTable"), "got: {json}");
    }
}
