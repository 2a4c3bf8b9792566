/// HTML renderer for the document tree
///
/// Every node type maps to a [`Renderer`] through a [`Components`] table.
/// The table always holds an entry for every type; callers replace entries
/// rather than add them.
use crate::ast::{Attributes, Child, Node, NodeType};
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// Tags rendered self-closing when the node has no children
const VOID_TAGS: &[&str] = &["img", "hr", "br"];

pub type ComponentFn = dyn Fn(&Element<'_>) -> String + Send + Sync;

/// What a node type turns into.
#[derive(Clone)]
pub enum Renderer {
    /// Only the rendered children, no wrapping element
    Fragment,
    Tag(String),
    Component(Arc<ComponentFn>),
}

impl Renderer {
    pub fn tag(name: impl Into<String>) -> Self {
        Renderer::Tag(name.into())
    }

    pub fn component(render: impl Fn(&Element<'_>) -> String + Send + Sync + 'static) -> Self {
        Renderer::Component(Arc::new(render))
    }
}

impl fmt::Debug for Renderer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Renderer::Fragment => f.write_str("Fragment"),
            Renderer::Tag(tag) => f.debug_tuple("Tag").field(tag).finish(),
            Renderer::Component(_) => f.write_str("Component(..)"),
        }
    }
}

/// A node as seen by a component: its attributes and its already rendered,
/// already escaped children (`None` when it has none).
#[derive(Debug)]
pub struct Element<'a> {
    pub kind: NodeType,
    pub attributes: &'a Attributes,
    pub children: Option<&'a str>,
}

#[derive(Debug, Clone)]
pub struct Components {
    table: [Renderer; NodeType::COUNT],
}

impl Components {
    pub fn get(&self, kind: NodeType) -> &Renderer {
        &self.table[kind.index()]
    }

    pub fn set(&mut self, kind: NodeType, renderer: Renderer) {
        self.table[kind.index()] = renderer;
    }

    pub fn with(mut self, kind: NodeType, renderer: Renderer) -> Self {
        self.set(kind, renderer);
        self
    }

    /// Applies overrides keyed by type name or tag alias; unknown keys are ignored.
    pub fn with_overrides<K: AsRef<str>>(
        mut self,
        overrides: impl IntoIterator<Item = (K, Renderer)>,
    ) -> Self {
        for (key, renderer) in overrides {
            match key.as_ref().parse::<NodeType>() {
                Ok(kind) => self.set(kind, renderer),
                Err(err) => debug!(%err, "ignoring renderer override"),
            }
        }
        self
    }
}

impl Default for Components {
    fn default() -> Self {
        Components {
            table: std::array::from_fn(|i| default_renderer(NodeType::ALL[i])),
        }
    }
}

fn default_renderer(kind: NodeType) -> Renderer {
    match kind {
        NodeType::Root => Renderer::Fragment,
        NodeType::Paragraph => Renderer::tag("p"),
        NodeType::Heading1
        | NodeType::Heading2
        | NodeType::Heading3
        | NodeType::Heading4
        | NodeType::Heading5
        | NodeType::Heading6 => Renderer::tag(format!("h{}", kind.heading_level().unwrap_or(1))),
        NodeType::OrderedList => Renderer::tag("ol"),
        NodeType::UnorderedList => Renderer::tag("ul"),
        NodeType::ListItem => Renderer::tag("li"),
        NodeType::Blockquote => Renderer::tag("blockquote"),
        NodeType::Preformatted => Renderer::tag("pre"),
        NodeType::HorizontalRule => Renderer::tag("hr"),
        NodeType::Code => Renderer::tag("code"),
        NodeType::Link => Renderer::tag("a"),
        NodeType::Image => Renderer::tag("img"),
        NodeType::Emphasis => Renderer::tag("em"),
        NodeType::Strong => Renderer::tag("strong"),
    }
}

#[derive(Debug, Clone, Default)]
pub struct HtmlRenderer {
    components: Components,
}

impl HtmlRenderer {
    pub fn new() -> Self {
        HtmlRenderer::default()
    }

    pub fn with_components(components: Components) -> Self {
        HtmlRenderer { components }
    }

    pub fn components(&self) -> &Components {
        &self.components
    }

    pub fn render(&self, node: &Node) -> String {
        self.render_node(node)
    }

    fn render_node(&self, node: &Node) -> String {
        let children: Option<String> = if node.children.is_empty() {
            None
        } else {
            Some(
                node.children
                    .iter()
                    .map(|child| match child {
                        Child::Text(text) => escape_html(text),
                        Child::Node(node) => self.render_node(node),
                    })
                    .collect(),
            )
        };

        match self.components.get(node.kind) {
            Renderer::Fragment => children.unwrap_or_default(),
            Renderer::Tag(tag) => render_tag(tag, &node.attributes, children.as_deref()),
            Renderer::Component(render) => (**render)(&Element {
                kind: node.kind,
                attributes: &node.attributes,
                children: children.as_deref(),
            }),
        }
    }
}

fn render_tag(tag: &str, attributes: &Attributes, children: Option<&str>) -> String {
    let attrs: String = attributes
        .iter()
        .map(|(key, value)| format!(" {}=\"{}\"", key, escape_html(value)))
        .collect();
    match children {
        None if VOID_TAGS.contains(&tag) => format!("<{}{} />", tag, attrs),
        _ => format!("<{}{}>{}</{}>", tag, attrs, children.unwrap_or_default(), tag),
    }
}

fn escape_html(text: &str) -> String {
    text.chars()
        .map(|c| match c {
            '<' => "&lt;".to_string(),
            '>' => "&gt;".to_string(),
            '&' => "&amp;".to_string(),
            '"' => "&quot;".to_string(),
            _ => c.to_string(),
        })
        .collect()
}
