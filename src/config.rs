//! Configuration types for document-to-flashcard conversion.
//!
//! All conversion behaviour is controlled through [`ConversionConfig`], built
//! via its [`ConversionConfigBuilder`]. The builder validates the marker
//! lexicon so a bad sentinel choice fails at startup, not halfway through a
//! document.

use crate::error::Docx2AnkiError;
use crate::progress::ProgressCallback;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Default sentinel for grouping several lines into one note.
pub const DEFAULT_GROUP_MARKER: &str = "©©";
/// Default sentinel announcing a picture on the next paragraph.
pub const DEFAULT_PHOTO_MARKER: &str = "®®";
/// Default sentinel referencing a 1×1 code table.
pub const DEFAULT_CODE_MARKER: &str = "§§";

/// The reserved text sentinels recognised by the paragraph classifier.
///
/// Group and photo sentinels must be immediately followed by one decimal
/// digit (`©©3`, `®®0`); the code sentinel may appear anywhere in the text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarkerSet {
    pub group: String,
    pub photo: String,
    pub code: String,
}

impl Default for MarkerSet {
    fn default() -> Self {
        Self {
            group: DEFAULT_GROUP_MARKER.to_string(),
            photo: DEFAULT_PHOTO_MARKER.to_string(),
            code: DEFAULT_CODE_MARKER.to_string(),
        }
    }
}

impl MarkerSet {
    /// Reject empty, digit-bearing or prefix-colliding sentinels.
    pub fn validate(&self) -> Result<(), Docx2AnkiError> {
        let all = [
            ("group", &self.group),
            ("photo", &self.photo),
            ("code", &self.code),
        ];
        for (name, marker) in all {
            if marker.trim().is_empty() {
                return Err(Docx2AnkiError::InvalidConfig(format!(
                    "{name} marker must not be empty"
                )));
            }
            if marker.chars().any(|c| c.is_ascii_digit()) {
                return Err(Docx2AnkiError::InvalidConfig(format!(
                    "{name} marker '{marker}' must not contain digits"
                )));
            }
        }
        for (i, (a_name, a)) in all.iter().enumerate() {
            for (b_name, b) in all.iter().skip(i + 1) {
                if a.starts_with(b.as_str()) || b.starts_with(a.as_str()) {
                    return Err(Docx2AnkiError::InvalidConfig(format!(
                        "{a_name} marker '{a}' collides with {b_name} marker '{b}'"
                    )));
                }
            }
        }
        Ok(())
    }
}

/// Configuration for a document conversion.
///
/// Built via [`ConversionConfig::builder()`] or using
/// [`ConversionConfig::default()`].
///
/// # Example
/// ```rust
/// use docx2anki::ConversionConfig;
///
/// let config = ConversionConfig::builder()
///     .redact_emphasis(false)
///     .paragraph_separator("<br><br>")
///     .build()
///     .unwrap();
/// ```
#[derive(Clone)]
pub struct ConversionConfig {
    /// Marker lexicon. Default: `©©` / `®®` / `§§`.
    pub markers: MarkerSet,

    /// Replace bold/italic run text with underscores on the card front. Default: true.
    ///
    /// Emphasised words are what the author wants to memorise; blanking them
    /// on the question side turns each paragraph into a cloze card.
    pub redact_emphasis: bool,

    /// Remove the leading `©©N` / `®®N` token from rendered text. Default: true.
    pub strip_markers: bool,

    /// Separator placed between the paragraphs of a grouped note. Default: `<br>`.
    pub paragraph_separator: String,

    /// Receives warnings and per-note events as the pipeline runs.
    pub progress_callback: Option<ProgressCallback>,
}

impl Default for ConversionConfig {
    fn default() -> Self {
        Self {
            markers: MarkerSet::default(),
            redact_emphasis: true,
            strip_markers: true,
            paragraph_separator: "<br>".to_string(),
            progress_callback: None,
        }
    }
}

impl fmt::Debug for ConversionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConversionConfig")
            .field("markers", &self.markers)
            .field("redact_emphasis", &self.redact_emphasis)
            .field("strip_markers", &self.strip_markers)
            .field("paragraph_separator", &self.paragraph_separator)
            .field(
                "progress_callback",
                &self
                    .progress_callback
                    .as_ref()
                    .map(|_| "<dyn ConversionProgressCallback>"),
            )
            .finish()
    }
}

impl ConversionConfig {
    /// Create a new builder for `ConversionConfig`.
    pub fn builder() -> ConversionConfigBuilder {
        ConversionConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`ConversionConfig`].
#[derive(Debug)]
pub struct ConversionConfigBuilder {
    config: ConversionConfig,
}

impl ConversionConfigBuilder {
    pub fn markers(mut self, markers: MarkerSet) -> Self {
        self.config.markers = markers;
        self
    }

    pub fn group_marker(mut self, marker: impl Into<String>) -> Self {
        self.config.markers.group = marker.into();
        self
    }

    pub fn photo_marker(mut self, marker: impl Into<String>) -> Self {
        self.config.markers.photo = marker.into();
        self
    }

    pub fn code_marker(mut self, marker: impl Into<String>) -> Self {
        self.config.markers.code = marker.into();
        self
    }

    pub fn redact_emphasis(mut self, v: bool) -> Self {
        self.config.redact_emphasis = v;
        self
    }

    pub fn strip_markers(mut self, v: bool) -> Self {
        self.config.strip_markers = v;
        self
    }

    pub fn paragraph_separator(mut self, sep: impl Into<String>) -> Self {
        self.config.paragraph_separator = sep.into();
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<ConversionConfig, Docx2AnkiError> {
        self.config.markers.validate()?;
        Ok(self.config)
    }
}
