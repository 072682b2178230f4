//! Tree building: one left-to-right pass over the classified paragraphs.
//!
//! Headings form a strict-nesting outline. The builder keeps a "current
//! parent" (the innermost open heading) and the heading level it was opened
//! at. A heading at the same or a shallower level first closes every open
//! heading at that level or deeper by walking up the parent chain, then
//! opens itself. Everything else is attached under the current parent.
//!
//! ```text
//! Heading1 (h1)          root
//! word1                  └─ Heading1
//! Heading2 (h2)             ├─ word1
//! word2                     └─ Heading2
//!                              └─ word2
//! ```
//!
//! Nodes live in an arena ([`NoteTree`]) and refer to each other by
//! [`NodeId`]; paragraphs are borrowed from the source document for the
//! lifetime of the tree.

use crate::config::MarkerSet;
use crate::document::ParagraphRecord;
use crate::error::{ConversionWarning, Docx2AnkiError};
use crate::output::MediaFile;
use crate::pipeline::classify::{classify, ParagraphRole};
use crate::pipeline::resolve::{is_readable_image, ImageResolver};
use tracing::{debug, warn};

/// Index of a node in a [`NoteTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub usize);

impl NodeId {
    /// The synthetic root, always the first node of the arena.
    pub const ROOT: NodeId = NodeId(0);

    fn index(self) -> usize {
        self.0
    }
}

/// What a node stands for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    Root,
    /// A heading paragraph; `heading_level` is the declared style level,
    /// which may differ from the node's depth when the document skips levels.
    Heading { heading_level: u32 },
    /// A plain paragraph or a `©©N` group.
    Content,
    /// A picture announced by `®®N`; content is the marker paragraph.
    Photo { image: MediaFile, span: u8 },
    /// A reference to a 1×1 code table.
    CodeBlock { key: String },
}

/// A node of the note tree.
#[derive(Debug, Clone)]
pub struct TreeNode<'a> {
    /// 0 for the root, else `parent.level + 1`.
    pub level: usize,
    pub kind: NodeKind,
    pub content: Vec<&'a ParagraphRecord>,
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
}

impl TreeNode<'_> {
    /// First paragraph of the node, `None` for the root.
    pub fn first_paragraph(&self) -> Option<&ParagraphRecord> {
        self.content.first().copied()
    }

    /// Text of the first paragraph, empty for the root.
    pub fn text(&self) -> &str {
        self.first_paragraph().map_or("", |p| p.text.as_str())
    }

    pub fn is_heading(&self) -> bool {
        matches!(self.kind, NodeKind::Heading { .. })
    }
}

/// Arena-backed note tree. Nodes are never removed, so the tree always
/// holds at least the root.
#[derive(Debug, Clone)]
pub struct NoteTree<'a> {
    nodes: Vec<TreeNode<'a>>,
}

impl Default for NoteTree<'_> {
    fn default() -> Self {
        Self::new()
    }
}

#[allow(clippy::len_without_is_empty)]
impl<'a> NoteTree<'a> {
    /// A tree holding only the root.
    pub fn new() -> Self {
        Self {
            nodes: vec![TreeNode {
                level: 0,
                kind: NodeKind::Root,
                content: Vec::new(),
                parent: None,
                children: Vec::new(),
            }],
        }
    }

    pub fn root(&self) -> &TreeNode<'a> {
        &self.nodes[0]
    }

    pub fn node(&self, id: NodeId) -> &TreeNode<'a> {
        &self.nodes[id.index()]
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.node(id).children
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).parent
    }

    /// Number of nodes, root included.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Ancestors of `id`, nearest first, root included.
    pub fn ancestors(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        std::iter::successors(self.parent(id), move |&p| self.parent(p))
    }

    /// Attach a new node as the last child of `parent`.
    pub fn add_child(
        &mut self,
        parent: NodeId,
        kind: NodeKind,
        content: Vec<&'a ParagraphRecord>,
    ) -> NodeId {
        let id = NodeId(self.nodes.len());
        let level = self.node(parent).level + 1;
        self.nodes.push(TreeNode {
            level,
            kind,
            content,
            parent: Some(parent),
            children: Vec::new(),
        });
        self.nodes[parent.index()].children.push(id);
        id
    }

    /// All node ids in depth-first pre-order, root first.
    pub fn preorder(&self) -> Vec<NodeId> {
        let mut order = Vec::with_capacity(self.nodes.len());
        let mut stack = vec![NodeId::ROOT];
        while let Some(id) = stack.pop() {
            order.push(id);
            stack.extend(self.children(id).iter().rev());
        }
        order
    }

    /// Indented outline, one node per line, for logs and debugging.
    ///
    /// ```text
    /// (root)
    /// - Heading1
    /// - - word1
    /// - - image1.png  span: 1
    /// ```
    pub fn outline(&self) -> String {
        let mut out = String::new();
        for id in self.preorder() {
            let node = self.node(id);
            out.push_str(&"- ".repeat(node.level));
            match &node.kind {
                NodeKind::Root => out.push_str("(root)"),
                NodeKind::Photo { image, span } => {
                    out.push_str(&format!("{}  span: {}", image.name, span));
                }
                _ => out.extend(node.text().chars().take(20)),
            }
            out.push('\n');
        }
        out
    }
}

/// A finished tree plus the recoverable problems met while building it.
#[derive(Debug)]
pub struct BuildOutput<'a> {
    pub tree: NoteTree<'a>,
    pub warnings: Vec<ConversionWarning>,
}

/// Build the note tree for `paragraphs`.
///
/// # Errors
/// Only a fatal image-index inconsistency aborts the build; every other
/// problem becomes a [`ConversionWarning`].
pub fn build_tree<'a>(
    paragraphs: &'a [ParagraphRecord],
    markers: &MarkerSet,
    images: &dyn ImageResolver,
) -> Result<BuildOutput<'a>, Docx2AnkiError> {
    let mut builder = TreeBuilder {
        paragraphs,
        tree: NoteTree::new(),
        cursor: 0,
        current_parent: NodeId::ROOT,
        current_heading_level: 0,
        warnings: Vec::new(),
    };

    while builder.cursor < paragraphs.len() {
        let role = classify(&paragraphs[builder.cursor], markers);
        builder.step(role, images)?;
    }

    debug!(
        "Built tree: {} nodes from {} paragraphs",
        builder.tree.len() - 1,
        paragraphs.len()
    );

    Ok(BuildOutput {
        tree: builder.tree,
        warnings: builder.warnings,
    })
}

struct TreeBuilder<'a> {
    paragraphs: &'a [ParagraphRecord],
    tree: NoteTree<'a>,
    cursor: usize,
    current_parent: NodeId,
    current_heading_level: u32,
    warnings: Vec<ConversionWarning>,
}

impl<'a> TreeBuilder<'a> {
    fn step(&mut self, role: ParagraphRole, images: &dyn ImageResolver) -> Result<(), Docx2AnkiError> {
        let paragraphs = self.paragraphs;
        let paragraph = &paragraphs[self.cursor];
        match role {
            ParagraphRole::Group { count } => {
                let end = (self.cursor + count + 1).min(paragraphs.len());
                if end - self.cursor < count + 1 {
                    self.warn(ConversionWarning::TruncatedGroup {
                        position: paragraph.position,
                        requested: count,
                        available: end - self.cursor - 1,
                    });
                }
                let content = paragraphs[self.cursor..end].iter().collect();
                self.tree
                    .add_child(self.current_parent, NodeKind::Content, content);
                self.cursor = end;
            }
            ParagraphRole::Photo { span } => {
                if let Some(image) = self.resolve_photo(paragraph, images)? {
                    self.tree.add_child(
                        self.current_parent,
                        NodeKind::Photo { image, span },
                        vec![paragraph],
                    );
                    self.cursor += 2;
                } else {
                    self.cursor += 1;
                }
            }
            ParagraphRole::CodeBlock { key } => {
                self.tree.add_child(
                    self.current_parent,
                    NodeKind::CodeBlock { key },
                    vec![paragraph],
                );
                self.cursor += 1;
            }
            ParagraphRole::Content => {
                self.tree
                    .add_child(self.current_parent, NodeKind::Content, vec![paragraph]);
                self.cursor += 1;
            }
            ParagraphRole::Heading { level } => {
                if level <= self.current_heading_level {
                    for _ in 0..=(self.current_heading_level - level) {
                        match self.tree.parent(self.current_parent) {
                            Some(parent) => self.current_parent = parent,
                            None => break,
                        }
                    }
                }
                self.current_parent = self.tree.add_child(
                    self.current_parent,
                    NodeKind::Heading {
                        heading_level: level,
                    },
                    vec![paragraph],
                );
                self.current_heading_level = level;
                self.cursor += 1;
            }
            ParagraphRole::Blank => self.cursor += 1,
        }
        Ok(())
    }

    /// Resolve the picture on the paragraph after a photo marker.
    fn resolve_photo(
        &mut self,
        marker: &ParagraphRecord,
        images: &dyn ImageResolver,
    ) -> Result<Option<MediaFile>, Docx2AnkiError> {
        let paragraphs = self.paragraphs;
        let Some(next) = paragraphs.get(self.cursor + 1) else {
            self.warn(ConversionWarning::UnresolvedPhoto {
                position: marker.position,
                marker: marker.text.clone(),
            });
            return Ok(None);
        };
        match images.resolve(next)? {
            Some(image) if is_readable_image(&image.bytes) => Ok(Some(image)),
            Some(image) => {
                self.warn(ConversionWarning::UnreadableImage {
                    position: next.position,
                    image_name: image.name,
                });
                Ok(None)
            }
            None => {
                self.warn(ConversionWarning::UnresolvedPhoto {
                    position: marker.position,
                    marker: marker.text.clone(),
                });
                Ok(None)
            }
        }
    }

    fn warn(&mut self, warning: ConversionWarning) {
        warn!("{}", warning);
        self.warnings.push(warning);
    }
}
