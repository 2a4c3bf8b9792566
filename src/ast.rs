/// Document tree produced by the parser
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Attribute map of a node (`href`, `src`, `alt`, `language`).
pub type Attributes = BTreeMap<String, String>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum NodeType {
    Root,
    // Block-level nodes
    Paragraph,
    Heading1,
    Heading2,
    Heading3,
    Heading4,
    Heading5,
    Heading6,
    OrderedList,
    UnorderedList,
    ListItem,
    Blockquote,
    Preformatted,
    HorizontalRule,
    // Inline nodes
    Code,
    Link,
    Image,
    Emphasis,
    Strong,
}

impl NodeType {
    pub const COUNT: usize = 19;

    pub const ALL: [NodeType; NodeType::COUNT] = [
        NodeType::Root,
        NodeType::Paragraph,
        NodeType::Heading1,
        NodeType::Heading2,
        NodeType::Heading3,
        NodeType::Heading4,
        NodeType::Heading5,
        NodeType::Heading6,
        NodeType::OrderedList,
        NodeType::UnorderedList,
        NodeType::ListItem,
        NodeType::Blockquote,
        NodeType::Preformatted,
        NodeType::HorizontalRule,
        NodeType::Code,
        NodeType::Link,
        NodeType::Image,
        NodeType::Emphasis,
        NodeType::Strong,
    ];

    /// Heading type for a `#` count; `None` outside `1..=6`.
    pub fn heading(level: usize) -> Option<NodeType> {
        match level {
            1 => Some(NodeType::Heading1),
            2 => Some(NodeType::Heading2),
            3 => Some(NodeType::Heading3),
            4 => Some(NodeType::Heading4),
            5 => Some(NodeType::Heading5),
            6 => Some(NodeType::Heading6),
            _ => None,
        }
    }

    pub fn heading_level(self) -> Option<u8> {
        match self {
            NodeType::Heading1 => Some(1),
            NodeType::Heading2 => Some(2),
            NodeType::Heading3 => Some(3),
            NodeType::Heading4 => Some(4),
            NodeType::Heading5 => Some(5),
            NodeType::Heading6 => Some(6),
            _ => None,
        }
    }

    /// Types that end a run of loose inline content when paragraphs are grouped.
    pub fn is_block(self) -> bool {
        self.heading_level().is_some()
            || matches!(
                self,
                NodeType::OrderedList
                    | NodeType::UnorderedList
                    | NodeType::Blockquote
                    | NodeType::Preformatted
                    | NodeType::HorizontalRule
            )
    }

    /// Position of this type in [`NodeType::ALL`].
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn name(self) -> &'static str {
        match self {
            NodeType::Root => "root",
            NodeType::Paragraph => "paragraph",
            NodeType::Heading1 => "heading1",
            NodeType::Heading2 => "heading2",
            NodeType::Heading3 => "heading3",
            NodeType::Heading4 => "heading4",
            NodeType::Heading5 => "heading5",
            NodeType::Heading6 => "heading6",
            NodeType::OrderedList => "orderedList",
            NodeType::UnorderedList => "unorderedList",
            NodeType::ListItem => "listItem",
            NodeType::Blockquote => "blockquote",
            NodeType::Preformatted => "preformatted",
            NodeType::HorizontalRule => "horizontalRule",
            NodeType::Code => "code",
            NodeType::Link => "link",
            NodeType::Image => "image",
            NodeType::Emphasis => "emphasis",
            NodeType::Strong => "strong",
        }
    }
}

impl fmt::Display for NodeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown node type: {0:?}")]
pub struct UnknownNodeType(pub String);

impl FromStr for NodeType {
    type Err = UnknownNodeType;

    /// Accepts the type names as well as the host tag aliases (`p`, `h1`, `ul`, `a`, ...).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let kind = match s {
            "root" | "fragment" | "" => NodeType::Root,
            "paragraph" | "p" => NodeType::Paragraph,
            "heading1" | "h1" => NodeType::Heading1,
            "heading2" | "h2" => NodeType::Heading2,
            "heading3" | "h3" => NodeType::Heading3,
            "heading4" | "h4" => NodeType::Heading4,
            "heading5" | "h5" => NodeType::Heading5,
            "heading6" | "h6" => NodeType::Heading6,
            "orderedList" | "ol" => NodeType::OrderedList,
            "unorderedList" | "ul" => NodeType::UnorderedList,
            "listItem" | "li" => NodeType::ListItem,
            "blockquote" => NodeType::Blockquote,
            "preformatted" | "pre" => NodeType::Preformatted,
            "horizontalRule" | "hr" => NodeType::HorizontalRule,
            "code" => NodeType::Code,
            "link" | "a" => NodeType::Link,
            "image" | "img" => NodeType::Image,
            "emphasis" | "em" => NodeType::Emphasis,
            "strong" => NodeType::Strong,
            other => return Err(UnknownNodeType(other.to_string())),
        };
        Ok(kind)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Child {
    Text(String),
    Node(Node),
}

impl Child {
    pub fn as_node(&self) -> Option<&Node> {
        match self {
            Child::Node(node) => Some(node),
            Child::Text(_) => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Child::Text(text) => Some(text),
            Child::Node(_) => None,
        }
    }
}

impl From<Node> for Child {
    fn from(node: Node) -> Self {
        Child::Node(node)
    }
}

impl From<&str> for Child {
    fn from(text: &str) -> Self {
        Child::Text(text.to_string())
    }
}

impl From<String> for Child {
    fn from(text: String) -> Self {
        Child::Text(text)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Node {
    #[serde(rename = "type")]
    pub kind: NodeType,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<Child>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub attributes: Attributes,
}

impl Node {
    pub fn new(kind: NodeType) -> Self {
        Node {
            kind,
            children: Vec::new(),
            attributes: Attributes::new(),
        }
    }

    pub fn with_children(kind: NodeType, children: Vec<Child>) -> Self {
        Node {
            kind,
            children,
            attributes: Attributes::new(),
        }
    }

    pub fn child(mut self, child: impl Into<Child>) -> Self {
        self.children.push(child.into());
        self
    }

    pub fn attr(mut self, key: &str, value: &str) -> Self {
        self.attributes.insert(key.to_string(), value.to_string());
        self
    }

    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).map(String::as_str)
    }

    pub fn child_nodes(&self) -> impl Iterator<Item = &Node> {
        self.children.iter().filter_map(Child::as_node)
    }

    /// Visits this node and every descendant node, depth first.
    pub fn walk<'a>(&'a self, visit: &mut impl FnMut(&'a Node)) {
        visit(self);
        for node in self.child_nodes() {
            node.walk(visit);
        }
    }

    /// Concatenated text of all descendants.
    pub fn text(&self) -> String {
        let mut out = String::new();
        for child in &self.children {
            match child {
                Child::Text(text) => out.push_str(text),
                Child::Node(node) => out.push_str(&node.text()),
            }
        }
        out
    }
}
