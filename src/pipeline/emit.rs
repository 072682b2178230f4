//! Note emission: walk the finished tree and derive one flashcard per
//! eligible node.
//!
//! The walk is depth-first, pre-order, and carries the set of photos in
//! scope. Before descending into a node's children, every child that is a
//! photo with span ≥ 1 joins the scope for *all* of those children, so a
//! picture reaches the notes before it in the document as well as after it.
//! A photo declared at tree level `P` decorates a note at depth `D` only
//! while `D - P < span`: span 1 covers its siblings, span 2 also their
//! children, and so on. Span 0 photos never enter the scope; they become a
//! standalone card instead.

use crate::config::ConversionConfig;
use crate::document::ParagraphRecord;
use crate::error::ConversionWarning;
use crate::output::{FlashcardRecord, MediaFile};
use crate::pipeline::classify::{marker_digit, marker_token_len};
use crate::pipeline::html::{
    collect_tags, encode_breadcrumb, paragraph_runs, render_code, render_runs, strip_leading_token,
};
use crate::pipeline::resolve::CodeTables;
use crate::pipeline::tree::{NodeId, NodeKind, NoteTree, TreeNode};
use std::borrow::Cow;
use tracing::{debug, warn};

/// Notes emitted from one tree.
#[derive(Debug, Default)]
pub struct EmitOutput {
    pub notes: Vec<FlashcardRecord>,
    /// Images referenced by `notes`, de-duplicated, in first-use order.
    pub media: Vec<MediaFile>,
    pub warnings: Vec<ConversionWarning>,
}

/// Emit the notes of `tree`, in document order.
pub fn emit_notes(
    tree: &NoteTree<'_>,
    code_tables: &CodeTables,
    config: &ConversionConfig,
) -> EmitOutput {
    let mut emitter = Emitter {
        tree,
        code_tables,
        config,
        out: EmitOutput::default(),
    };
    emitter.walk();
    debug!(
        "Emitted {} notes referencing {} media files",
        emitter.out.notes.len(),
        emitter.out.media.len()
    );
    emitter.out
}

struct Emitter<'t, 'a> {
    tree: &'t NoteTree<'a>,
    code_tables: &'t CodeTables,
    config: &'t ConversionConfig,
    out: EmitOutput,
}

/// Work item of the pre-order walk.
enum Step {
    Visit(NodeId),
    /// All children of a node are done: drop the photos they shared.
    Leave { scope_len: usize },
}

impl<'t, 'a> Emitter<'t, 'a> {
    /// Pre-order walk with an explicit stack, so tree depth is bounded by
    /// memory only. `scope` holds the in-scope photos of the current node.
    fn walk(&mut self) {
        let tree = self.tree;
        let mut scope: Vec<NodeId> = Vec::new();
        let mut stack = vec![Step::Visit(NodeId::ROOT)];

        while let Some(step) = stack.pop() {
            let id = match step {
                Step::Visit(id) => id,
                Step::Leave { scope_len } => {
                    scope.truncate(scope_len);
                    continue;
                }
            };
            self.emit_node(id, tree.node(id), &scope);

            let children = tree.children(id);
            if children.is_empty() {
                continue;
            }
            stack.push(Step::Leave {
                scope_len: scope.len(),
            });
            stack.extend(children.iter().rev().map(|&c| Step::Visit(c)));
            scope.extend(children.iter().copied().filter(|&c| {
                matches!(tree.node(c).kind, NodeKind::Photo { span, .. } if span >= 1)
            }));
        }
    }

    fn emit_node(&mut self, id: NodeId, node: &'t TreeNode<'a>, scope: &[NodeId]) {
        let Some(first) = node.first_paragraph() else {
            return;
        };
        let config = self.config;
        let markers = &config.markers;

        let (front, back, media): (String, String, Vec<&'t MediaFile>) = match &node.kind {
            NodeKind::Photo { image, span: 0 } => {
                let (front, back) = self.render_paragraphs(&node.content);
                (front, back, vec![image])
            }
            NodeKind::CodeBlock { key } => match self.code_tables.get(key) {
                Some(code) => {
                    let html = render_code(code);
                    (html.clone(), html, self.scoped_media(node.level, scope))
                }
                None => {
                    let warning = ConversionWarning::MissingCodeTable {
                        position: first.position,
                        key: key.clone(),
                    };
                    warn!("{}", warning);
                    self.out.warnings.push(warning);
                    return;
                }
            },
            NodeKind::Content
                if first.style_family() == "normal"
                    && marker_digit(&first.text, &markers.photo).is_none() =>
            {
                let (front, back) = self.render_paragraphs(&node.content);
                if front.is_empty() && back.is_empty() {
                    return;
                }
                (front, back, self.scoped_media(node.level, scope))
            }
            _ => return,
        };

        let mut media_html = String::new();
        for image in media {
            media_html.push_str(&image.img_tag());
            if !self.out.media.iter().any(|m| m.name == image.name) {
                self.out.media.push(image.clone());
            }
        }

        self.out.notes.push(FlashcardRecord {
            front,
            back,
            media: media_html,
            breadcrumb: self.breadcrumb(id),
            tags: self.tags(id),
            source_position: first.position,
        });
    }

    /// Front and back HTML of a node's paragraphs, blank ones skipped.
    fn render_paragraphs(&self, content: &[&ParagraphRecord]) -> (String, String) {
        let mut fronts = Vec::with_capacity(content.len());
        let mut backs = Vec::with_capacity(content.len());
        for (i, paragraph) in content.iter().enumerate() {
            if paragraph.is_blank() {
                continue;
            }
            let runs = paragraph_runs(paragraph);
            let runs = match self.leading_token(i, paragraph) {
                Some(token) => Cow::Owned(strip_leading_token(&runs, token)),
                None => runs,
            };
            fronts.push(render_runs(&runs, self.config.redact_emphasis));
            backs.push(render_runs(&runs, false));
        }
        let sep = self.config.paragraph_separator.as_str();
        (fronts.join(sep), backs.join(sep))
    }

    /// The marker token to strip from the first paragraph of a node.
    fn leading_token<'p>(&self, index: usize, paragraph: &'p ParagraphRecord) -> Option<&'p str> {
        if index != 0 || !self.config.strip_markers {
            return None;
        }
        let markers = &self.config.markers;
        [&markers.group, &markers.photo]
            .into_iter()
            .find_map(|m| marker_token_len(&paragraph.text, m))
            .map(|len| &paragraph.text[..len])
    }

    /// Photos in `scope` whose span reaches a note at depth `level`.
    fn scoped_media(&self, level: usize, scope: &[NodeId]) -> Vec<&'t MediaFile> {
        let tree = self.tree;
        let mut media: Vec<&'t MediaFile> = Vec::new();
        for &photo_id in scope {
            let photo = tree.node(photo_id);
            if let NodeKind::Photo { image, span } = &photo.kind {
                let reaches = level.saturating_sub(photo.level) < usize::from(*span);
                if reaches && !media.iter().any(|m| m.name == image.name) {
                    media.push(image);
                }
            }
        }
        media
    }

    /// Ancestor heading texts, root-most first, as a breadcrumb.
    fn breadcrumb(&self, id: NodeId) -> String {
        let mut headings: Vec<&str> = self
            .tree
            .ancestors(id)
            .map(|a| self.tree.node(a))
            .filter(|n| n.is_heading())
            .map(|n| n.text())
            .collect();
        headings.reverse();
        encode_breadcrumb(&headings)
    }

    /// Tags from every ancestor with content, nearest first.
    fn tags(&self, id: NodeId) -> Vec<String> {
        collect_tags(
            self.tree
                .ancestors(id)
                .map(|a| self.tree.node(a))
                .filter(|n| !n.content.is_empty())
                .map(|n| n.text()),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MarkerSet;
    use crate::document::{Grid, ImagePart, ParagraphRecord, Run};
    use crate::pipeline::html::parse_breadcrumb;
    use crate::pipeline::resolve::ImageIndex;
    use crate::pipeline::tree::build_tree;

    const PNG: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

    struct Doc {
        paragraphs: Vec<ParagraphRecord>,
        parts: Vec<ImagePart>,
        grids: Vec<Grid>,
    }

    impl Doc {
        fn new() -> Self {
            Self {
                paragraphs: Vec::new(),
                parts: Vec::new(),
                grids: Vec::new(),
            }
        }

        fn p(mut self, style: &str, text: &str) -> Self {
            let pos = self.paragraphs.len();
            self.paragraphs.push(ParagraphRecord::plain(pos, style, text));
            self
        }

        fn runs(mut self, runs: Vec<Run>) -> Self {
            let pos = self.paragraphs.len();
            self.paragraphs.push(ParagraphRecord::new(pos, "Normal", runs));
            self
        }

        fn photo(mut self, span: u8, name: &str) -> Self {
            let pos = self.paragraphs.len();
            self.paragraphs
                .push(ParagraphRecord::plain(pos, "Normal", &format!("®®{span}")));
            self.paragraphs.push(ParagraphRecord::image(pos + 1, name));
            self.parts.push(ImagePart {
                part_name: format!("/word/media/{name}"),
                bytes: PNG.to_vec(),
            });
            self
        }

        fn emit(&self) -> EmitOutput {
            let index = ImageIndex::new(&self.parts);
            let built = build_tree(&self.paragraphs, &MarkerSet::default(), &index).unwrap();
            let tables = CodeTables::from_grids(&self.grids);
            emit_notes(&built.tree, &tables, &ConversionConfig::default())
        }
    }

    fn note<'o>(out: &'o EmitOutput, back: &str) -> &'o FlashcardRecord {
        out.notes
            .iter()
            .find(|n| n.back == back)
            .unwrap_or_else(|| panic!("no note with back {back:?}"))
    }

    #[test]
    fn heading_scenario_emits_two_content_notes() {
        let out = Doc::new()
            .p("Heading 1", "Heading1")
            .p("Normal", "word1")
            .p("Heading 2", "Heading2")
            .p("Normal", "word2")
            .emit();
        assert_eq!(out.notes.len(), 2);
        assert_eq!(parse_breadcrumb(&note(&out, "word1").breadcrumb), vec!["Heading1"]);
        assert_eq!(
            parse_breadcrumb(&note(&out, "word2").breadcrumb),
            vec!["Heading1", "Heading2"]
        );
        assert_eq!(note(&out, "word2").tags, vec!["heading_"]);
    }

    #[test]
    fn group_emits_one_combined_note() {
        let out = Doc::new()
            .p("Normal", "©©2 intro")
            .p("Normal", "line A")
            .p("Normal", "line B")
            .emit();
        assert_eq!(out.notes.len(), 1);
        assert_eq!(out.notes[0].back, "intro<br>line A<br>line B");
        assert_eq!(out.notes[0].source_position, 0);
    }

    #[test]
    fn front_redacts_emphasis() {
        let out = Doc::new()
            .runs(vec![Run::plain("Capital: "), Run::bold("Paris")])
            .emit();
        assert_eq!(out.notes[0].front, "Capital: <b>_____</b>");
        assert_eq!(out.notes[0].back, "Capital: <b>Paris</b>");
    }

    #[test]
    fn span_one_photo_reaches_siblings_only() {
        let out = Doc::new()
            .p("Heading 1", "H")
            .p("Normal", "before")
            .photo(1, "image1.png")
            .p("Normal", "after")
            .p("Heading 2", "Sub")
            .p("Normal", "deeper")
            .emit();
        assert_eq!(note(&out, "before").media, "<img src=\"image1.png\">");
        assert_eq!(note(&out, "after").media, "<img src=\"image1.png\">");
        assert_eq!(note(&out, "deeper").media, "");
        assert_eq!(out.media.len(), 1);
    }

    #[test]
    fn span_two_photo_reaches_one_level_further() {
        let out = Doc::new()
            .p("Heading 1", "H1")
            .photo(2, "image1.png")
            .p("Normal", "depth2")
            .p("Heading 2", "H2")
            .p("Normal", "depth3")
            .p("Heading 3", "H3")
            .p("Normal", "depth4")
            .emit();
        assert_eq!(note(&out, "depth2").media, "<img src=\"image1.png\">");
        assert_eq!(note(&out, "depth3").media, "<img src=\"image1.png\">");
        assert_eq!(note(&out, "depth4").media, "");
    }

    #[test]
    fn span_zero_photo_is_a_standalone_card() {
        let out = Doc::new()
            .p("Heading 1", "H")
            .photo(0, "image1.png")
            .p("Normal", "text")
            .emit();
        assert_eq!(out.notes.len(), 2);
        let standalone = &out.notes[0];
        assert_eq!(standalone.media, "<img src=\"image1.png\">");
        assert_eq!(standalone.front, "");
        assert_eq!(note(&out, "text").media, "");
    }

    #[test]
    fn photo_with_span_is_not_a_card_itself() {
        let out = Doc::new().photo(3, "image1.png").emit();
        assert!(out.notes.is_empty());
        assert!(out.media.is_empty());
    }

    #[test]
    fn unreferenced_media_is_not_exported() {
        let out = Doc::new()
            .p("Heading 1", "H")
            .photo(1, "image1.png")
            .emit();
        assert!(out.notes.is_empty());
        assert!(out.media.is_empty());
    }

    #[test]
    fn photos_accumulate_down_the_tree() {
        let out = Doc::new()
            .photo(3, "image1.png")
            .p("Heading 1", "H")
            .photo(1, "image2.png")
            .p("Normal", "text")
            .emit();
        assert_eq!(
            note(&out, "text").media,
            "<img src=\"image1.png\"><img src=\"image2.png\">"
        );
        let names: Vec<&str> = out.media.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, vec!["image1.png", "image2.png"]);
    }

    #[test]
    fn code_block_note_uses_table_text() {
        let mut doc = Doc::new().p("Heading 1", "Rust").p("Normal", "§§fn main() {");
        doc.grids.push(Grid {
            rows: vec![vec!["fn main() {\n}".into()]],
        });
        let out = doc.emit();
        assert_eq!(out.notes.len(), 1);
        assert_eq!(out.notes[0].front, "<pre><code>fn main() {\n}</code></pre>");
        assert_eq!(out.notes[0].front, out.notes[0].back);
        assert_eq!(out.notes[0].tags, vec!["rust"]);
    }

    #[test]
    fn code_block_note_gets_sibling_photo() {
        let mut doc = Doc::new()
            .p("Heading 1", "Rust")
            .photo(1, "image1.png")
            .p("Normal", "§§fn main() {");
        doc.grids.push(Grid {
            rows: vec![vec!["fn main() {\n}".into()]],
        });
        let out = doc.emit();
        assert_eq!(out.notes.len(), 1);
        assert_eq!(out.notes[0].media, "<img src=\"image1.png\">");
        let names: Vec<&str> = out.media.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, vec!["image1.png"]);
    }

    #[test]
    fn scope_is_restored_after_a_subtree() {
        let out = Doc::new()
            .p("Heading 1", "A")
            .p("Heading 2", "A1")
            .photo(1, "image1.png")
            .p("Normal", "inside")
            .p("Heading 1", "B")
            .p("Normal", "outside")
            .emit();
        assert_eq!(note(&out, "inside").media, "<img src=\"image1.png\">");
        assert_eq!(note(&out, "outside").media, "");
    }

    #[test]
    fn deep_heading_chain_does_not_overflow() {
        let mut doc = Doc::new().p("Heading 1", "Top").p("Normal", "leaf");
        for level in 2..=10_001 {
            doc = doc.p(&format!("Heading {level}"), "h");
        }
        let out = doc.emit();
        assert_eq!(out.notes.len(), 1);
        assert_eq!(parse_breadcrumb(&note(&out, "leaf").breadcrumb), vec!["Top"]);
    }

    #[test]
    fn missing_code_table_warns() {
        let out = Doc::new().p("Normal", "§§nothing").emit();
        assert!(out.notes.is_empty());
        assert_eq!(
            out.warnings,
            vec![ConversionWarning::MissingCodeTable {
                position: 0,
                key: "nothing".into()
            }]
        );
    }

    #[test]
    fn group_led_by_heading_style_is_skipped() {
        let out = Doc::new()
            .p("Heading 1", "©©1 grouped heading")
            .p("Normal", "body")
            .emit();
        assert!(out.notes.is_empty());
    }

    #[test]
    fn tags_list_nearest_ancestor_first() {
        let out = Doc::new()
            .p("Heading 1", "Biology")
            .p("Heading 2", "Cell Walls")
            .p("Normal", "x")
            .emit();
        assert_eq!(out.notes[0].tags, vec!["cell_walls", "biology"]);
    }
}
