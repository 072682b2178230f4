//! Conversion entry points.
//!
//! [`convert`] runs the whole pipeline over an in-memory document and
//! returns every note at once. Nothing touches the filesystem until the
//! caller hands the result to [`write_media`], so a fatal error can never
//! leave a half-written media directory behind.

use crate::config::ConversionConfig;
use crate::document::SourceDocument;
use crate::error::Docx2AnkiError;
use crate::output::{ConversionOutput, ConversionStats, MediaFile};
use crate::pipeline::emit::emit_notes;
use crate::pipeline::resolve::{CodeTables, ImageIndex, ImageResolver};
use crate::pipeline::tree::build_tree;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, info};

/// Convert a document into flashcard records.
///
/// Pictures are resolved against the document's own embedded image parts.
///
/// # Returns
/// `Ok(ConversionOutput)` on success, even if some markers could not be
/// honoured (check `output.warnings`).
///
/// # Errors
/// Returns `Err(Docx2AnkiError)` only for fatal errors:
/// - Invalid configuration
/// - An image name that matches zero or several embedded image parts
pub fn convert(
    document: &SourceDocument,
    config: &ConversionConfig,
) -> Result<ConversionOutput, Docx2AnkiError> {
    let index = ImageIndex::new(&document.images);
    convert_with_resolver(document, &index, config)
}

/// Like [`convert`], with a caller-supplied picture lookup.
///
/// Useful for hosts whose document adapter already knows where each
/// picture lives.
pub fn convert_with_resolver(
    document: &SourceDocument,
    images: &dyn ImageResolver,
    config: &ConversionConfig,
) -> Result<ConversionOutput, Docx2AnkiError> {
    let total_start = Instant::now();
    config.markers.validate()?;

    let paragraph_count = document.paragraphs.len();
    info!(
        "Starting conversion: {} paragraphs, {} tables, {} images",
        paragraph_count,
        document.tables.len(),
        document.images.len()
    );
    if let Some(ref cb) = config.progress_callback {
        cb.on_conversion_start(paragraph_count);
    }

    // ── Step 1: Build the tree ───────────────────────────────────────────
    let built = build_tree(&document.paragraphs, &config.markers, images)?;
    let node_count = built.tree.len() - 1;
    debug!("Note tree:\n{}", built.tree.outline());

    // ── Step 2: Emit notes ───────────────────────────────────────────────
    let code_tables = CodeTables::from_grids(&document.tables);
    debug!("Indexed {} code tables", code_tables.len());
    let emitted = emit_notes(&built.tree, &code_tables, config);

    let mut warnings = built.warnings;
    warnings.extend(emitted.warnings);
    warnings.sort_by_key(|w| w.position());

    // ── Step 3: Report ───────────────────────────────────────────────────
    if let Some(ref cb) = config.progress_callback {
        for warning in &warnings {
            cb.on_warning(warning);
        }
        for (i, note) in emitted.notes.iter().enumerate() {
            cb.on_note_emitted(i, note);
        }
    }

    let stats = ConversionStats {
        paragraphs: paragraph_count,
        nodes: node_count,
        notes: emitted.notes.len(),
        media_files: emitted.media.len(),
        warnings: warnings.len(),
        total_duration_ms: total_start.elapsed().as_millis() as u64,
    };

    info!(
        "Conversion complete: {} notes, {} media files, {} warnings, {}ms total",
        stats.notes, stats.media_files, stats.warnings, stats.total_duration_ms
    );

    if let Some(ref cb) = config.progress_callback {
        cb.on_conversion_complete(stats.notes, stats.warnings);
    }

    Ok(ConversionOutput {
        notes: emitted.notes,
        media: emitted.media,
        warnings,
        stats,
    })
}

/// Read a JSON document dump from `path` and convert it.
pub fn convert_file(
    path: impl AsRef<Path>,
    config: &ConversionConfig,
) -> Result<ConversionOutput, Docx2AnkiError> {
    let document = read_document(path)?;
    convert(&document, config)
}

/// Read a JSON document dump from `path`.
pub fn read_document(path: impl AsRef<Path>) -> Result<SourceDocument, Docx2AnkiError> {
    let path = path.as_ref();
    let json = std::fs::read_to_string(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => Docx2AnkiError::FileNotFound {
            path: path.to_path_buf(),
        },
        _ => Docx2AnkiError::InvalidDocument {
            path: path.to_path_buf(),
            detail: e.to_string(),
        },
    })?;
    SourceDocument::from_json(&json).map_err(|e| Docx2AnkiError::InvalidDocument {
        path: path.to_path_buf(),
        detail: e.to_string(),
    })
}

/// Indented outline of the tree built from `document`, for inspection.
pub fn outline(
    document: &SourceDocument,
    config: &ConversionConfig,
) -> Result<String, Docx2AnkiError> {
    config.markers.validate()?;
    let index = ImageIndex::new(&document.images);
    let built = build_tree(&document.paragraphs, &config.markers, &index)?;
    Ok(built.tree.outline())
}

/// Write every media file into `dir`, creating it if needed.
///
/// Each file is written atomically (temp file in `dir` + rename), so a
/// reader never sees a partial image. Existing files with the same name are
/// replaced. Returns the paths written, in `media` order.
pub fn write_media(
    dir: impl AsRef<Path>,
    media: &[MediaFile],
) -> Result<Vec<PathBuf>, Docx2AnkiError> {
    let dir = dir.as_ref();
    std::fs::create_dir_all(dir).map_err(|e| Docx2AnkiError::MediaWriteFailed {
        path: dir.to_path_buf(),
        source: e,
    })?;

    let mut written = Vec::with_capacity(media.len());
    for file in media {
        let target = media_path(dir, &file.name)?;
        let write_err = |e: std::io::Error| Docx2AnkiError::MediaWriteFailed {
            path: target.clone(),
            source: e,
        };

        let mut tmp = tempfile::NamedTempFile::new_in(dir).map_err(write_err)?;
        tmp.write_all(&file.bytes).map_err(write_err)?;
        tmp.persist(&target).map_err(|e| write_err(e.error))?;

        debug!("Wrote {} ({} bytes)", target.display(), file.bytes.len());
        written.push(target);
    }

    info!("Wrote {} media files to {}", written.len(), dir.display());
    Ok(written)
}

/// `dir/name`, refusing names that would escape `dir`.
fn media_path(dir: &Path, name: &str) -> Result<PathBuf, Docx2AnkiError> {
    let file_name = Path::new(name).file_name();
    match file_name {
        Some(f) if f == name => Ok(dir.join(f)),
        _ => Err(Docx2AnkiError::Internal(format!(
            "media file name '{name}' is not a plain file name"
        ))),
    }
}
