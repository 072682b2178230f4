//! Pipeline stages for document-to-flashcard conversion.
//!
//! Each submodule implements exactly one transformation step and can be
//! tested on its own.
//!
//! ## Data Flow
//!
//! ```text
//! paragraphs ──▶ classify ──▶ tree ──▶ emit ──▶ notes + media
//!                    ▲          ▲        ▲
//!                 markers    resolve    html
//!                          (images,   (runs, crumbs,
//!                           code)      tags)
//! ```
//!
//! 1. [`classify`] — decide the role of one paragraph from its style and
//!    leading marker
//! 2. [`resolve`]  — map picture references to embedded image parts and
//!    code references to 1×1 tables
//! 3. [`tree`]     — single pass that nests paragraphs under headings,
//!    consuming groups and photos as it goes
//! 4. [`emit`]     — pre-order walk producing flashcard records and
//!    propagating photos to the notes around them
//! 5. [`html`]     — run rendering, cloze redaction, breadcrumbs and tags

pub mod classify;
pub mod emit;
pub mod html;
pub mod resolve;
pub mod tree;
