/// Markdown dialect parser
use crate::ast::{Child, Node, NodeType};
use crate::builder::{MAX_DEPTH, TreeBuilder};
use crate::tokenizer::{Toggle, Token, Tokenizer};
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, trace};

/// Bullet, number or quote marker at the start of a line, with its spacing.
/// A bare marker line is stripped too, so nested bodies always get shorter.
static LINE_MARKER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?:\*|-|\+|>|[0-9]+\.)(?:\s+|$)").unwrap());

#[derive(Debug, Clone, Copy)]
pub struct Parser {
    /// Top-level parses wrap loose content at the root in paragraphs
    top_level: bool,
    /// Tree depth of the root this parser builds
    depth: usize,
}

impl Parser {
    pub fn new() -> Self {
        Parser {
            top_level: true,
            depth: 0,
        }
    }

    /// Parser for nested content (list items, quote bodies, heading text).
    pub fn fragment() -> Self {
        Parser {
            top_level: false,
            depth: 0,
        }
    }

    /// Fragment parser for content placed `levels` below this parser's root.
    fn nested(&self, levels: usize) -> Self {
        Parser {
            top_level: false,
            depth: self.depth + levels,
        }
    }

    /// Independent sub-parse; only the children of its root are kept. Past
    /// the nesting limit the content is kept as literal text.
    fn parse_children(&self, input: &str, levels: usize) -> Vec<Child> {
        let parser = self.nested(levels);
        if parser.depth >= MAX_DEPTH {
            debug!(depth = parser.depth, "nesting limit reached, content kept as text");
            return vec![Child::Text(input.to_string())];
        }
        parser.parse(input).children
    }

    pub fn parse(&self, input: &str) -> Node {
        let mut builder = TreeBuilder::new(self.top_level, self.depth);
        let mut tokens = Tokenizer::new(input);

        for lexeme in tokens.by_ref() {
            builder.text(lexeme.prev);

            if lexeme.escaped {
                trace!(span = ?lexeme.span, "escaped token dropped");
                continue;
            }

            match lexeme.token {
                // Code and indented blocks
                Token::FencedCode { language, body } => {
                    builder.block(self.parse_fenced_code(language, body))
                }
                Token::IndentedCode(block) => builder.block(self.parse_indented_code(block)),
                // Lists and blockquotes
                Token::MarkerRun { run, marker } => {
                    builder.block(self.parse_marker_run(run, marker))
                }
                Token::Image { alt, src } => builder.image(self.parse_image(alt, src)),
                Token::LinkClose { href } => builder.close_link(href),
                Token::LinkOpen => builder.open(NodeType::Link),
                Token::Heading { level, text } => builder.block(self.parse_heading(level, text)),
                // No escaping here, that is left to the renderer
                Token::InlineCode(code) => builder.leaf(Node::new(NodeType::Code).child(code)),
                Token::ParagraphBreak => builder.paragraph_break(),
                Token::ThematicBreak => builder.leaf(Node::new(NodeType::HorizontalRule)),
                Token::Toggle(Toggle::Emphasis) => builder.toggle(NodeType::Emphasis),
                Token::Toggle(Toggle::Strong) => builder.toggle(NodeType::Strong),
            }
        }

        builder.finish(tokens.rest())
    }

    fn parse_fenced_code(&self, language: Option<&str>, body: &str) -> Node {
        let mut code = Node::new(NodeType::Code).child(outdent(body));
        if let Some(language) = language {
            let class = format!("language-{}", language.to_lowercase());
            code = code.attr("language", &class);
        }
        Node::new(NodeType::Preformatted).child(code)
    }

    fn parse_indented_code(&self, block: &str) -> Node {
        // The match may start with the blank lines that separated it from the previous text
        let block = block.trim_start_matches('\n');
        Node::new(NodeType::Preformatted).child(outdent(block))
    }

    fn parse_marker_run(&self, run: &str, marker: &str) -> Node {
        let run = run.strip_prefix('\n').unwrap_or(run);
        let lines = run.split('\n').map(|line| LINE_MARKER.replace(line, ""));

        if marker == ">" {
            // Blockquotes can contain lists, so the body is parsed again as one unit
            let body = lines.collect::<Vec<_>>().join("\n");
            debug!(lines = body.lines().count(), "blockquote");
            return Node::with_children(NodeType::Blockquote, self.parse_children(&body, 1));
        }

        let kind = if marker.ends_with('.') {
            NodeType::OrderedList
        } else {
            NodeType::UnorderedList
        };
        let items = lines
            .map(|line| {
                let item = self.parse_children(&line, 2);
                Child::Node(Node::with_children(NodeType::ListItem, item))
            })
            .collect::<Vec<_>>();
        debug!(%kind, items = items.len(), "list");
        Node::with_children(kind, items)
    }

    fn parse_image(&self, alt: &str, src: &str) -> Node {
        let image = Node::new(NodeType::Image).attr("src", src);
        if alt.is_empty() {
            image
        } else {
            image.attr("alt", alt)
        }
    }

    fn parse_heading(&self, level: usize, text: &str) -> Node {
        let kind = NodeType::heading(level).unwrap_or(NodeType::Heading6);
        Node::with_children(kind, self.parse_children(text, 1))
    }
}

impl Default for Parser {
    fn default() -> Self {
        Self::new()
    }
}

/// Removes the first line's leading whitespace from every line that starts with it.
fn outdent(text: &str) -> String {
    let body = text.trim_start_matches([' ', '\t']);
    let prefix = &text[..text.len() - body.len()];
    if prefix.is_empty() {
        return text.to_string();
    }
    text.split('\n')
        .map(|line| line.strip_prefix(prefix).unwrap_or(line))
        .collect::<Vec<_>>()
        .join("\n")
}
