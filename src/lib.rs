//! # docx2anki
//!
//! Turn a styled word-processor document into spaced-repetition flashcards.
//!
//! ## Why this crate?
//!
//! Study notes already have structure: headings group topics, bold words are
//! the facts to remember, and pictures illustrate the paragraphs around them.
//! This crate reads that structure from the paragraph stream of a document
//! and emits one card per paragraph (or group of paragraphs), with the
//! emphasised words blanked on the front, the heading trail as a breadcrumb,
//! tags derived from the ancestors, and the relevant pictures attached.
//!
//! ## Pipeline Overview
//!
//! ```text
//! SourceDocument
//!  │
//!  ├─ 1. Classify  style + marker → role per paragraph
//!  ├─ 2. Build     heading-nested tree; groups, photos and code refs
//!  ├─ 3. Emit      pre-order walk; photo propagation by span
//!  └─ 4. Output    flashcard records + referenced media + warnings
//! ```
//!
//! ## Markers
//!
//! | Marker | Meaning |
//! |--------|---------|
//! | `©©N`  | this paragraph and the next `N` form one note |
//! | `®®N`  | the next paragraph is a picture, visible `N` levels down (`0` = own card) |
//! | `§§`   | this paragraph references the 1×1 table starting with the same text |
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use docx2anki::{convert_file, write_media, ConversionConfig};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ConversionConfig::default();
//!     let output = convert_file("notes.json", &config)?;
//!     for note in &output.notes {
//!         println!("{} | {}", note.front, note.back);
//!     }
//!     write_media("media", &output.media)?;
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `docx2anki` binary (clap + anyhow + tracing-subscriber + indicatif) |
//!
//! Disable `cli` when using only the library:
//! ```toml
//! docx2anki = { version = "0.1", default-features = false }
//! ```

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod convert;
pub mod document;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod progress;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{ConversionConfig, ConversionConfigBuilder, MarkerSet};
pub use convert::{convert, convert_file, convert_with_resolver, outline, read_document, write_media};
pub use document::{Grid, ImagePart, ParagraphRecord, Run, SourceDocument};
pub use error::{ConversionWarning, Docx2AnkiError};
pub use output::{ConversionOutput, ConversionStats, FlashcardRecord, MediaFile};
pub use pipeline::html::parse_breadcrumb;
pub use pipeline::resolve::ImageResolver;
pub use pipeline::tree::{NodeId, NodeKind, NoteTree};
pub use progress::{ConversionProgressCallback, NoopProgressCallback, ProgressCallback};
