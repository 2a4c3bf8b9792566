//! Tree builder
//!
//! Nodes that can still receive children live in an arena of frames; the
//! context stack holds frame indices from the root down to the node that
//! currently receives children. Finished subtrees (leaves, block nodes,
//! sub-parse results) are stored as plain [`Node`]s. [`TreeBuilder::finish`]
//! folds the arena into an owned tree.

use crate::ast::{Attributes, Child, Node, NodeType};
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::trace;

type FrameId = usize;

const ROOT: FrameId = 0;

/// Deepest tree level a node may be opened at, counting nested sub-parses.
/// Openers past it are kept as empty leaves.
pub(crate) const MAX_DEPTH: usize = 128;

static EDGE_WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\s+|\s+$").unwrap());

/// Collapses leading and trailing whitespace runs to a single space each.
pub(crate) fn trim_collapse(text: &str) -> String {
    EDGE_WHITESPACE.replace_all(text, " ").into_owned()
}

#[derive(Debug)]
enum Slot {
    Open(FrameId),
    Closed(Node),
    Text(String),
}

#[derive(Debug)]
struct Frame {
    kind: NodeType,
    attributes: Attributes,
    children: Vec<Slot>,
}

impl Frame {
    fn new(kind: NodeType) -> Self {
        Frame {
            kind,
            attributes: Attributes::new(),
            children: Vec::new(),
        }
    }
}

#[derive(Debug)]
pub(crate) struct TreeBuilder {
    frames: Vec<Frame>,
    stack: Vec<FrameId>,
    top_level: bool,
    /// Tree depth of this builder's root within the whole document
    depth: usize,
}

impl TreeBuilder {
    /// A top-level builder starts with an open paragraph; a fragment builder
    /// starts at the bare root.
    pub(crate) fn new(top_level: bool, depth: usize) -> Self {
        let mut builder = TreeBuilder {
            frames: vec![Frame::new(NodeType::Root)],
            stack: vec![ROOT],
            top_level,
            depth,
        };
        if top_level {
            builder.open_paragraph();
        }
        builder
    }

    fn current(&self) -> FrameId {
        self.stack.last().copied().unwrap_or(ROOT)
    }

    fn at_root(&self) -> bool {
        self.current() == ROOT
    }

    fn alloc(&mut self, frame: Frame) -> FrameId {
        self.frames.push(frame);
        self.frames.len() - 1
    }

    fn reset_to_root(&mut self) {
        self.stack.truncate(1);
    }

    /// Appends a fresh paragraph to the root and makes it current.
    fn open_paragraph(&mut self) -> FrameId {
        let id = self.alloc(Frame::new(NodeType::Paragraph));
        self.frames[ROOT].children.push(Slot::Open(id));
        self.stack = vec![ROOT, id];
        id
    }

    /// Literal text found between two tokens.
    pub(crate) fn text(&mut self, prev: &str) {
        if prev.is_empty() {
            return;
        }
        let text = Slot::Text(trim_collapse(prev));
        let target = if self.top_level && self.at_root() {
            self.open_paragraph()
        } else {
            self.current()
        };
        self.frames[target].children.push(text);
    }

    /// Pushes a node that receives the following content until closed.
    pub(crate) fn open(&mut self, kind: NodeType) {
        if self.depth + self.stack.len() >= MAX_DEPTH {
            trace!(%kind, "nesting limit reached, opener kept empty");
            self.leaf(Node::new(kind));
            return;
        }
        let id = self.alloc(Frame::new(kind));
        let current = self.current();
        self.frames[current].children.push(Slot::Open(id));
        self.stack.push(id);
    }

    /// Appends a finished node to the current node.
    pub(crate) fn leaf(&mut self, node: Node) {
        let current = self.current();
        self.frames[current].children.push(Slot::Closed(node));
    }

    /// Images at the bare top-level root get a paragraph of their own.
    pub(crate) fn image(&mut self, node: Node) {
        if self.top_level && self.at_root() {
            let paragraph = self.open_paragraph();
            self.frames[paragraph].children.push(Slot::Closed(node));
        } else {
            self.leaf(node);
        }
    }

    /// Inserts a block-level node as the last root child and resets the context.
    pub(crate) fn block(&mut self, node: Node) {
        trace!(kind = %node.kind, children = node.children.len(), "block");
        self.frames[ROOT].children.push(Slot::Closed(node));
        self.reset_to_root();
    }

    /// Sets (or clears) the `href` of the earliest open link.
    pub(crate) fn close_link(&mut self, href: Option<&str>) {
        let Some(&id) = self
            .stack
            .iter()
            .find(|&&id| self.frames[id].kind == NodeType::Link)
        else {
            trace!("link close without an open link");
            return;
        };
        let attributes = &mut self.frames[id].attributes;
        match href {
            Some(href) => {
                attributes.insert("href".to_string(), href.to_string());
            }
            None => {
                attributes.remove("href");
            }
        }
    }

    /// Closes the earliest open node of `kind`, or opens a new one.
    ///
    /// Closing truncates the context stack at that node, so anything opened
    /// after it is abandoned in place.
    pub(crate) fn toggle(&mut self, kind: NodeType) {
        let open = self
            .stack
            .iter()
            .position(|&id| self.frames[id].kind == kind);
        match open {
            Some(index) => {
                let abandoned = self.stack.len() - index - 1;
                if abandoned > 0 {
                    trace!(%kind, abandoned, "close discards open nodes");
                }
                self.stack.truncate(index);
            }
            None => self.open(kind),
        }
    }

    /// Blank-line run or trailing double space.
    pub(crate) fn paragraph_break(&mut self) {
        let paragraph_open = self
            .stack
            .get(1)
            .is_some_and(|&id| self.frames[id].kind == NodeType::Paragraph);

        if !paragraph_open {
            let start = self.frames[ROOT]
                .children
                .iter()
                .rposition(|slot| self.is_boundary(slot))
                .map_or(0, |i| i + 1);
            if start < self.frames[ROOT].children.len() {
                let scooped = self.frames[ROOT].children.split_off(start);
                trace!(count = scooped.len(), "wrapping trailing inline content");
                let mut wrapper = Frame::new(NodeType::Paragraph);
                wrapper.children = scooped;
                let id = self.alloc(wrapper);
                self.frames[ROOT].children.push(Slot::Open(id));
            }
        }

        self.open_paragraph();
    }

    /// Root children that end a run of unwrapped inline content.
    fn is_boundary(&self, slot: &Slot) -> bool {
        let kind = match slot {
            Slot::Open(id) => self.frames[*id].kind,
            Slot::Closed(node) => node.kind,
            Slot::Text(_) => return false,
        };
        kind.is_block() || kind == NodeType::Paragraph
    }

    /// Flushes trailing text, folds the arena into a tree and prunes empty
    /// root-level paragraphs.
    pub(crate) fn finish(mut self, rest: &str) -> Node {
        if !rest.is_empty() {
            let text = Slot::Text(trim_collapse(rest));
            let last_paragraph = match self.frames[ROOT].children.last() {
                Some(Slot::Open(id)) if self.frames[*id].kind == NodeType::Paragraph => Some(*id),
                _ => None,
            };
            let target = match last_paragraph {
                Some(id) => id,
                None if self.top_level => {
                    let id = self.alloc(Frame::new(NodeType::Paragraph));
                    self.frames[ROOT].children.push(Slot::Open(id));
                    id
                }
                None => ROOT,
            };
            self.frames[target].children.push(text);
        }

        let mut root = self.fold();
        root.children.retain(|child| match child {
            Child::Node(node) => !(node.kind == NodeType::Paragraph && node.children.is_empty()),
            Child::Text(_) => true,
        });
        root
    }

    /// Builds the owned tree bottom-up: a frame is folded once every open
    /// frame below it has been.
    fn fold(&mut self) -> Node {
        let mut folded: Vec<Option<Node>> = Vec::new();
        folded.resize_with(self.frames.len(), || None);
        let mut pending = vec![(ROOT, false)];

        while let Some((id, ready)) = pending.pop() {
            if !ready {
                pending.push((id, true));
                pending.extend(self.frames[id].children.iter().filter_map(|slot| match slot {
                    Slot::Open(child) => Some((*child, false)),
                    _ => None,
                }));
                continue;
            }

            let frame = &mut self.frames[id];
            let mut children = Vec::with_capacity(frame.children.len());
            for slot in std::mem::take(&mut frame.children) {
                match slot {
                    Slot::Open(child) => children.extend(folded[child].take().map(Child::Node)),
                    Slot::Closed(node) => children.push(Child::Node(node)),
                    Slot::Text(text) => children.push(Child::Text(text)),
                }
            }
            folded[id] = Some(Node {
                kind: frame.kind,
                children,
                attributes: std::mem::take(&mut frame.attributes),
            });
        }

        folded[ROOT]
            .take()
            .unwrap_or_else(|| Node::new(NodeType::Root))
    }
}
