//! Progress-callback trait for conversion events.
//!
//! Inject an [`Arc<dyn ConversionProgressCallback>`] via
//! [`crate::config::ConversionConfigBuilder::progress_callback`] to receive
//! events as the pipeline builds the tree and emits notes.
//!
//! # Example
//!
//! ```rust
//! use docx2anki::{ConversionConfig, ConversionProgressCallback, ConversionWarning};
//! use std::sync::{Arc, atomic::{AtomicUsize, Ordering}};
//!
//! struct WarningCounter {
//!     seen: AtomicUsize,
//! }
//!
//! impl ConversionProgressCallback for WarningCounter {
//!     fn on_warning(&self, warning: &ConversionWarning) {
//!         self.seen.fetch_add(1, Ordering::SeqCst);
//!         eprintln!("warning: {warning}");
//!     }
//! }
//!
//! let counter = Arc::new(WarningCounter { seen: AtomicUsize::new(0) });
//!
//! let config = ConversionConfig::builder()
//!     .progress_callback(counter as Arc<dyn ConversionProgressCallback>)
//!     .build()
//!     .unwrap();
//! ```

use crate::error::ConversionWarning;
use crate::output::FlashcardRecord;
use std::sync::Arc;

/// Called by the conversion pipeline as it processes a document.
///
/// All methods have default no-op implementations so callers only override
/// what they care about. The trait is `Send + Sync` so one callback can be
/// shared by hosts converting several documents on different threads.
pub trait ConversionProgressCallback: Send + Sync {
    /// Called once before the tree is built.
    ///
    /// # Arguments
    /// * `paragraph_count` — number of paragraphs in the source document
    fn on_conversion_start(&self, paragraph_count: usize) {
        let _ = paragraph_count;
    }

    /// Called for every recoverable problem, in document order.
    fn on_warning(&self, warning: &ConversionWarning) {
        let _ = warning;
    }

    /// Called when a note has been emitted.
    ///
    /// # Arguments
    /// * `index` — 0-based index of the note in the output
    /// * `note`  — the emitted record
    fn on_note_emitted(&self, index: usize, note: &FlashcardRecord) {
        let _ = (index, note);
    }

    /// Called once after emission finished.
    ///
    /// # Arguments
    /// * `note_count`    — notes produced
    /// * `warning_count` — recoverable problems encountered
    fn on_conversion_complete(&self, note_count: usize, warning_count: usize) {
        let _ = (note_count, warning_count);
    }
}

/// A no-op implementation for callers that don't need progress events.
pub struct NoopProgressCallback;

impl ConversionProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in [`crate::config::ConversionConfig`].
pub type ProgressCallback = Arc<dyn ConversionProgressCallback>;
