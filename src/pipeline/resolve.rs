//! Lookups against the document adapter's data: pictures and code tables.
//!
//! Both are pure reads over data supplied once at the start of a pass. The
//! image resolver distinguishes two failure modes:
//!
//! * `Ok(None)` — the paragraph after a photo marker carries no picture. The
//!   builder warns and moves on.
//! * `Err(_)` — the picture name cannot be mapped to exactly one embedded
//!   image part. Attaching *some* image would be silently wrong, so the whole
//!   conversion aborts.

use crate::document::{Grid, ImagePart, ParagraphRecord};
use crate::error::Docx2AnkiError;
use crate::output::MediaFile;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;
use tracing::debug;

/// Resolves the picture carried by an image paragraph.
pub trait ImageResolver {
    /// Return the picture of `paragraph`, `Ok(None)` when it has none.
    fn resolve(&self, paragraph: &ParagraphRecord) -> Result<Option<MediaFile>, Docx2AnkiError>;
}

static RE_IMAGE_NAME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"image[0-9]*\.[a-zA-Z]+").unwrap());

/// Extract the `imageN.ext` name referenced by a paragraph's run markup.
pub fn image_name(paragraph: &ParagraphRecord) -> Option<&str> {
    let markup = paragraph.image_ref.as_deref()?;
    RE_IMAGE_NAME.find(markup).map(|m| m.as_str())
}

/// Default resolver over the package's embedded image parts.
#[derive(Debug, Clone, Copy)]
pub struct ImageIndex<'a> {
    parts: &'a [ImagePart],
}

impl<'a> ImageIndex<'a> {
    pub fn new(parts: &'a [ImagePart]) -> Self {
        Self { parts }
    }

    /// Index of the single part whose file name is `name`.
    fn part_index(&self, name: &str, position: usize) -> Result<usize, Docx2AnkiError> {
        let matches: Vec<usize> = self
            .parts
            .iter()
            .enumerate()
            .filter(|(_, p)| part_file_name(&p.part_name) == name)
            .map(|(i, _)| i)
            .collect();
        match matches.as_slice() {
            [only] => Ok(*only),
            _ => Err(Docx2AnkiError::ImageIndexInconsistent {
                image_name: name.to_string(),
                position,
                matches: matches.len(),
            }),
        }
    }
}

fn part_file_name(part_name: &str) -> &str {
    part_name.rsplit('/').next().unwrap_or(part_name)
}

impl ImageResolver for ImageIndex<'_> {
    fn resolve(&self, paragraph: &ParagraphRecord) -> Result<Option<MediaFile>, Docx2AnkiError> {
        let Some(name) = image_name(paragraph) else {
            return Ok(None);
        };
        let idx = self.part_index(name, paragraph.position)?;
        debug!(
            "Paragraph {} → image part {} ({})",
            paragraph.position, idx, self.parts[idx].part_name
        );
        Ok(Some(MediaFile {
            name: name.to_string(),
            bytes: self.parts[idx].bytes.clone(),
        }))
    }
}

/// True when `bytes` start like an image format we can hand to the packager.
pub fn is_readable_image(bytes: &[u8]) -> bool {
    image::guess_format(bytes).is_ok()
}

/// Code-block texts keyed by the first line of their 1×1 table.
#[derive(Debug, Clone, Default)]
pub struct CodeTables {
    by_first_line: HashMap<String, String>,
}

impl CodeTables {
    /// Index every 1×1 grid by its first line. Later grids with the same
    /// first line do not replace earlier ones.
    pub fn from_grids(grids: &[Grid]) -> Self {
        let mut by_first_line = HashMap::new();
        for text in grids.iter().filter_map(Grid::single_cell) {
            let key = text.lines().next().unwrap_or_default().trim().to_string();
            by_first_line
                .entry(key)
                .or_insert_with(|| text.to_string());
        }
        Self { by_first_line }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.by_first_line.get(key.trim()).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.by_first_line.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_first_line.is_empty()
    }
}
