/// A tiny Markdown dialect parser producing a typed document tree
pub mod ast;
mod builder;
pub mod config;
pub mod parser;
pub mod renderer;
pub mod tokenizer;

pub use ast::{Child, Node, NodeType};
pub use parser::Parser;
pub use renderer::{Components, HtmlRenderer, Renderer};

/// Parse a whole document; loose content at the root is wrapped in paragraphs.
pub fn parse(markdown: &str) -> Node {
    Parser::new().parse(markdown)
}

/// Parse nested content the way list items, quotes and headings are parsed.
pub fn parse_fragment(markdown: &str) -> Node {
    Parser::fragment().parse(markdown)
}

/// Parse markdown text and render to HTML
pub fn markdown_to_html(markdown: &str) -> String {
    let ast = parse(markdown);
    let renderer = HtmlRenderer::new();
    renderer.render(&ast)
}

/// Parse markdown text and render to HTML with the given components
pub fn markdown_to_html_with(markdown: &str, components: Components) -> String {
    let ast = parse(markdown);
    HtmlRenderer::with_components(components).render(&ast)
}
