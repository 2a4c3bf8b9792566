use rstest::rstest;
use serde::Deserialize;
use std::fs;
use tinymark::config::ComponentOverrides;
use tinymark::{Child, Node, NodeType, markdown_to_html, markdown_to_html_with, parse};

#[derive(Debug, Deserialize)]
#[allow(dead_code)]
struct Scenario {
    markdown: String,
    html: String,
    example: u32,
    section: String,
}

#[test]
fn html_scenarios() {
    let data =
        fs::read_to_string("tests/data/scenarios.json").expect("Failed to read scenarios.json");
    let scenarios: Vec<Scenario> =
        serde_json::from_str(&data).expect("Failed to parse scenarios.json");

    let mut failures = Vec::new();
    for scenario in &scenarios {
        let result = markdown_to_html(&scenario.markdown);
        if result != scenario.html {
            eprintln!("\n❌ Example {} failed ({})", scenario.example, scenario.section);
            eprintln!("  Input: {:?}", scenario.markdown);
            eprintln!("  Expected: {:?}", scenario.html);
            eprintln!("  Got: {:?}", result);
            failures.push(scenario.example);
        }
    }

    assert!(failures.is_empty(), "failed examples: {:?}", failures);
}

#[rstest]
#[case("# One", NodeType::Heading1)]
#[case("## Two", NodeType::Heading2)]
#[case("###Three", NodeType::Heading3)]
#[case("#### Four", NodeType::Heading4)]
#[case("##### Five", NodeType::Heading5)]
#[case("###### Six", NodeType::Heading6)]
#[case("Setext\n---", NodeType::Heading1)]
fn heading_levels(#[case] markdown: &str, #[case] expected: NodeType) {
    let tree = parse(markdown);
    let kinds: Vec<NodeType> = tree.child_nodes().map(|node| node.kind).collect();
    assert_eq!(kinds, vec![expected]);
}

#[rstest]
#[case("* a", NodeType::UnorderedList)]
#[case("- a", NodeType::UnorderedList)]
#[case("+ a", NodeType::UnorderedList)]
#[case("12. a", NodeType::OrderedList)]
#[case("> a", NodeType::Blockquote)]
#[case("```\na\n```", NodeType::Preformatted)]
#[case("    a", NodeType::Preformatted)]
fn block_constructs_stand_alone(#[case] markdown: &str, #[case] expected: NodeType) {
    let tree = parse(markdown);
    assert_eq!(tree.children.len(), 1);
    assert_eq!(tree.children[0].as_node().map(|node| node.kind), Some(expected));
}

#[test]
fn crash_message_document() {
    let markdown = "##The game crashed
If you want to help, please

* open an [issue on github](https://github.com/jimhigson/head-over-heels-online/issues)
* email to [jim@blockstack.ing](mailto:jim@blockstack.ing)

Include the information below, and a description of what you were doing";

    assert_eq!(
        markdown_to_html(markdown),
        concat!(
            "<h2>The game crashed</h2>",
            "<p>If you want to help, please</p>",
            "<ul>",
            "<li>open an <a href=\"https://github.com/jimhigson/head-over-heels-online/issues\">issue on github</a></li>",
            "<li>email to <a href=\"mailto:jim@blockstack.ing\">jim@blockstack.ing</a></li>",
            "</ul>",
            "<p>Include the information below, and a description of what you were doing</p>",
        )
    );
}

#[test]
fn swop_key_document() {
    let markdown = "## SWOP KEY

If Head is sitting on Heels, the swop key will, on each push, give you control
of:

* *1* Heels.
* *2* Head + Heels.
* *3* Head.
* *4* Head + Heels.

If Head is not on Heels, the swop key will, on each push, give you control of:

* *1* Head.
* *2* Heels.

At all times, the character(s) whose icon is lit is under player control. When
Head and Heels are joined together, all their abilities are combined.

*> head over heels manual*";

    assert_eq!(
        markdown_to_html(markdown),
        concat!(
            "<h2>SWOP KEY</h2>",
            "<p>If Head is sitting on Heels, the swop key will, on each push, give you control\nof:</p>",
            "<ul><li><em>1</em> Heels.</li><li><em>2</em> Head + Heels.</li>",
            "<li><em>3</em> Head.</li><li><em>4</em> Head + Heels.</li></ul>",
            "<p>If Head is not on Heels, the swop key will, on each push, give you control of:</p>",
            "<ul><li><em>1</em> Head.</li><li><em>2</em> Heels.</li></ul>",
            "<p>At all times, the character(s) whose icon is lit is under player control. When\n",
            "Head and Heels are joined together, all their abilities are combined.</p>",
            "<p><em>&gt; head over heels manual</em></p>",
        )
    );
}

#[test]
fn list_items_are_parsed_without_paragraphs() {
    let tree = parse("1. ![](pill.png)**Iron Pills** (to make you invulnerable)");
    let list = tree.child_nodes().next().unwrap();
    let item = list.child_nodes().next().unwrap();
    assert_eq!(
        item.children,
        vec![
            Child::Node(Node::new(NodeType::Image).attr("src", "pill.png")),
            Child::Node(Node::new(NodeType::Strong).child("Iron Pills")),
            Child::from(" (to make you invulnerable)"),
        ]
    );
}

#[test]
fn tree_serializes_with_type_names() {
    let json = serde_json::to_value(parse("# Hi\n* [x](#x)")).unwrap();
    assert_eq!(
        json,
        serde_json::json!({
            "type": "root",
            "children": [
                {"type": "heading1", "children": ["Hi"]},
                {"type": "unorderedList", "children": [
                    {"type": "listItem", "children": [
                        {"type": "link", "children": ["x"], "attributes": {"href": "#x"}}
                    ]}
                ]}
            ]
        })
    );
}

#[test]
fn configured_components_render() {
    let components = ComponentOverrides::from_json(r#"{"p": "div", "strong": "b", "unknown": "x"}"#)
        .unwrap()
        .into_components();
    assert_eq!(
        markdown_to_html_with("I **like** it\n\n> quoted", components),
        "<div>I <b>like</b> it</div><blockquote>quoted</blockquote>"
    );
}
