//! Tokenizer
//!
//! A single composite pattern is applied repeatedly to the input. Each match
//! is one "special" construct; the alternative that matched decides its
//! [`Token`]. Text between two matches is handed out alongside the token as
//! `prev` so the builder can append it before acting on the token.
//!
//! Alternative order matters: at any position the first alternative that
//! matches wins, so a `* * *` line is a thematic break rather than a list,
//! and an image is recognised before a bare `[`.

use once_cell::sync::Lazy;
use regex::{CaptureMatches, Captures, Regex};
use std::ops::Range;

static TOKEN_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(concat!(
        r"(?m)",
        // thematic break
        r"(?P<rule>(?:^|\n+)(?:\n---+|\* \*(?: \*)+)\n)",
        // fenced code
        r"|(?:^``` *(?P<lang>[0-9A-Za-z_]*)\n(?P<fenced>[\s\S]*?)\n```$)",
        // indented block
        r"|(?P<indented>(?:(?:^|\n+)(?:\t| {3,}).+)+\n*)",
        // list / quote run; `bullet` keeps the marker of the last line
        r"|(?P<run>(?:(?:^|\n)(?P<bullet>[>*+-]|[0-9]+\.)\s+.*)+)",
        r"|(?:!\[(?P<alt>[^\]]*?)\]\((?P<src>[^)]+?)\))",
        r"|(?P<open>\[)",
        r"|(?P<close>\](?:\((?P<href>[^)]+?)\))?)",
        // setext heading
        r"|(?:(?:^|\n+)(?P<setext>[^\s].*)\n(?:-{3,}|={3,})(?:\n+|$))",
        // atx heading
        r"|(?:(?:^|\n+)(?P<hashes>#{1,6})\s*(?P<atx>.+)(?:\n+|$))",
        r"|(?:`(?P<code>[^`].*?)`)",
        // toggles and paragraph separators
        r"|(?P<marker> {2}\n+|\n{2,}|__|\*\*|[_*]|~~)",
    ))
    .expect("token pattern compiles")
});

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Toggle {
    Emphasis,
    Strong,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token<'a> {
    ThematicBreak,
    FencedCode {
        language: Option<&'a str>,
        body: &'a str,
    },
    /// The whole matched block, indentation included.
    IndentedCode(&'a str),
    /// Consecutive marker lines; `marker` is the marker of the last line.
    MarkerRun { run: &'a str, marker: &'a str },
    Image { alt: &'a str, src: &'a str },
    LinkOpen,
    LinkClose { href: Option<&'a str> },
    Heading { level: usize, text: &'a str },
    InlineCode(&'a str),
    /// Blank-line run or two trailing spaces before a newline.
    ParagraphBreak,
    Toggle(Toggle),
}

/// One match together with the literal text that preceded it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lexeme<'a> {
    pub prev: &'a str,
    pub token: Token<'a>,
    pub span: Range<usize>,
    /// `prev` ends in an unescaped backslash, so the token is literal.
    pub escaped: bool,
}

pub struct Tokenizer<'a> {
    input: &'a str,
    matches: CaptureMatches<'static, 'a>,
    last: usize,
}

impl<'a> Tokenizer<'a> {
    pub fn new(input: &'a str) -> Self {
        Tokenizer {
            input,
            matches: TOKEN_PATTERN.captures_iter(input),
            last: 0,
        }
    }

    /// Input not consumed by any lexeme handed out so far.
    pub fn rest(&self) -> &'a str {
        &self.input[self.last..]
    }
}

impl<'a> Iterator for Tokenizer<'a> {
    type Item = Lexeme<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let caps = self.matches.next()?;
        let whole = caps.get(0)?;
        let prev = &self.input[self.last..whole.start()];
        self.last = whole.end();

        Some(Lexeme {
            prev,
            token: classify(&caps),
            span: whole.range(),
            escaped: is_escaped(prev),
        })
    }
}

fn classify<'a>(caps: &Captures<'a>) -> Token<'a> {
    let group = |name: &str| caps.name(name).map(|m| m.as_str());

    if let Some(body) = group("fenced") {
        return Token::FencedCode {
            language: group("lang").filter(|lang| !lang.is_empty()),
            body,
        };
    }
    if let Some(block) = group("indented") {
        return Token::IndentedCode(block);
    }
    if let (Some(run), Some(marker)) = (group("run"), group("bullet")) {
        return Token::MarkerRun { run, marker };
    }
    if let Some(src) = group("src") {
        return Token::Image {
            alt: group("alt").unwrap_or_default(),
            src,
        };
    }
    if group("close").is_some() {
        return Token::LinkClose {
            href: group("href"),
        };
    }
    if group("open").is_some() {
        return Token::LinkOpen;
    }
    if let (Some(hashes), Some(text)) = (group("hashes"), group("atx")) {
        return Token::Heading {
            level: hashes.len(),
            text,
        };
    }
    if let Some(text) = group("setext") {
        return Token::Heading { level: 1, text };
    }
    if let Some(code) = group("code") {
        return Token::InlineCode(code);
    }
    if group("rule").is_some() {
        return Token::ThematicBreak;
    }

    let marker = group("marker").unwrap_or_default();
    if marker.starts_with('\n') || marker.starts_with("  \n") {
        Token::ParagraphBreak
    } else if marker.len() == 2 {
        Token::Toggle(Toggle::Strong)
    } else {
        Token::Toggle(Toggle::Emphasis)
    }
}

/// An odd run of trailing backslashes after some other character.
fn is_escaped(prev: &str) -> bool {
    let unslashed = prev.trim_end_matches('\\');
    let run = prev.len() - unslashed.len();
    run % 2 == 1 && !unslashed.is_empty()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(input: &str) -> Vec<Token<'_>> {
        Tokenizer::new(input).map(|lexeme| lexeme.token).collect()
    }

    #[test]
    fn test_inline_toggles() {
        assert_eq!(
            tokens("I **like** _tiny_ ~~libs~~"),
            vec![
                Token::Toggle(Toggle::Strong),
                Token::Toggle(Toggle::Strong),
                Token::Toggle(Toggle::Emphasis),
                Token::Toggle(Toggle::Emphasis),
                Token::Toggle(Toggle::Strong),
                Token::Toggle(Toggle::Strong),
            ]
        );
    }

    #[test]
    fn test_prev_text_and_rest() {
        let mut tokenizer = Tokenizer::new("a *b* c");
        let first = tokenizer.next().unwrap();
        assert_eq!(first.prev, "a ");
        assert_eq!(first.span, 2..3);
        let second = tokenizer.next().unwrap();
        assert_eq!(second.prev, "b");
        assert!(tokenizer.next().is_none());
        assert_eq!(tokenizer.rest(), " c");
    }

    #[test]
    fn test_paragraph_separators() {
        assert_eq!(tokens("a\n\nb"), vec![Token::ParagraphBreak]);
        assert_eq!(tokens("a  \nb"), vec![Token::ParagraphBreak]);
        assert_eq!(tokens("a  \n\nb"), vec![Token::ParagraphBreak]);
        assert!(tokens("a\nb").is_empty());
    }

    #[test]
    fn test_fenced_code() {
        assert_eq!(
            tokens("```JS\nlet a = 1;\n```"),
            vec![Token::FencedCode {
                language: Some("JS"),
                body: "let a = 1;"
            }]
        );
        assert_eq!(
            tokens("```\nx\n```"),
            vec![Token::FencedCode {
                language: None,
                body: "x"
            }]
        );
    }

    #[test]
    fn test_unterminated_fence_is_not_code() {
        assert!(
            !tokens("```\nx")
                .iter()
                .any(|t| matches!(t, Token::FencedCode { .. }))
        );
        assert!(tokens("`foo").is_empty());
    }

    #[test]
    fn test_indented_block() {
        assert_eq!(
            tokens("\tvar a = 1"),
            vec![Token::IndentedCode("\tvar a = 1")]
        );
        assert_eq!(
            tokens("    a\n    b\n"),
            vec![Token::IndentedCode("    a\n    b\n")]
        );
    }

    #[test]
    fn test_marker_runs() {
        assert_eq!(
            tokens("* One\n* Two"),
            vec![Token::MarkerRun {
                run: "* One\n* Two",
                marker: "*"
            }]
        );
        assert_eq!(
            tokens("1. a\n10. b"),
            vec![Token::MarkerRun {
                run: "1. a\n10. b",
                marker: "10."
            }]
        );
        assert_eq!(
            tokens("> quoted"),
            vec![Token::MarkerRun {
                run: "> quoted",
                marker: ">"
            }]
        );
        // a marker needs whitespace after it
        assert!(tokens(">").is_empty());
    }

    #[test]
    fn test_thematic_break_wins_over_list() {
        assert_eq!(tokens("foo\n* * *\nbar"), vec![Token::ThematicBreak]);
        assert_eq!(tokens("foo\n\n---\nbar"), vec![Token::ThematicBreak]);
    }

    #[test]
    fn test_images_and_links() {
        assert_eq!(
            tokens("[![a](a.png)](#a)"),
            vec![
                Token::LinkOpen,
                Token::Image {
                    alt: "a",
                    src: "a.png"
                },
                Token::LinkClose { href: Some("#a") },
            ]
        );
        assert_eq!(
            tokens("[x]"),
            vec![Token::LinkOpen, Token::LinkClose { href: None }]
        );
    }

    #[test]
    fn test_headings() {
        assert_eq!(
            tokens("### Three\nbody"),
            vec![Token::Heading {
                level: 3,
                text: "Three"
            }]
        );
        assert_eq!(
            tokens("Title\n==="),
            vec![Token::Heading {
                level: 1,
                text: "Title"
            }]
        );
        assert_eq!(
            tokens("Title\n---\n"),
            vec![Token::Heading {
                level: 1,
                text: "Title"
            }]
        );
    }

    #[test]
    fn test_inline_code() {
        assert_eq!(
            tokens("a `<\">` b"),
            vec![Token::InlineCode("<\">")]
        );
    }

    #[test]
    fn test_escaped_tokens() {
        let lexemes: Vec<_> = Tokenizer::new(r"a\*b\\*c").collect();
        assert!(lexemes[0].escaped);
        assert!(!lexemes[1].escaped);
        assert!(!is_escaped(r"\"));
        assert!(!is_escaped(""));
    }
}
