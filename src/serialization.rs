use crate::ast::{AmlDocument, ListMarker, Node, Placement};

/// Text content of `nodes` with markup delimiters removed.
///
/// This is the text handed to the quote sink and used as wikilink target.
pub fn flatten_text(nodes: &[Node]) -> String {
    let mut out = String::new();
    for node in nodes {
        push_plain(node, &mut out);
    }
    out
}

fn push_plain(node: &Node, out: &mut String) {
    match node {
        Node::Text { text } | Node::Chinese { text } | Node::Emphasis { text } => {
            out.push_str(text)
        }
        Node::Url { url } => out.push_str(url),
        Node::Template { body, .. } => out.push_str(body),
        Node::ColorBlock {
            placement: Placement::Parenthesized,
            children,
            ..
        } => {
            out.push('(');
            out.push_str(&flatten_text(children));
            out.push(')');
        }
        Node::ColorBlock { children, .. }
        | Node::ListItem { children, .. }
        | Node::MultiLineQuote { children, .. }
        | Node::Wikilink { children }
        | Node::Literal { children }
        | Node::Title { children } => out.push_str(&flatten_text(children)),
        Node::Newline | Node::SectionBreak => out.push('\n'),
        Node::MoreTag => {}
    }
}

/// Plain-text rendering of a whole document, for feeds and previews.
///
/// List items get a marker glyph; number items are counted within a run of
/// consecutive number items.
pub fn to_plain_text(document: &AmlDocument) -> String {
    let mut out = String::new();
    let mut number = 0;
    for node in &document.children {
        match node {
            Node::ListItem { marker, children } => {
                match marker {
                    ListMarker::Bullet => out.push_str("• "),
                    ListMarker::Arrow => out.push_str("→ "),
                    ListMarker::Number => {
                        number += 1;
                        out.push_str(&format!("{number}. "));
                    }
                }
                out.push_str(&flatten_text(children));
                if *marker != ListMarker::Number {
                    number = 0;
                }
                continue;
            }
            Node::Newline => {}
            _ => number = 0,
        }
        push_plain(node, &mut out);
    }
    out.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::tokenize;
    use crate::parser::parse;

    fn plain(source: &str) -> String {
        to_plain_text(&parse(tokenize(source).unwrap()))
    }

    #[test]
    fn test_delimiters_are_dropped() {
        assert_eq!(
            plain("<red>Alert: (<blue>soon) see [[Rust]] and *this* <<raw <b> >>"),
            "Alert: (soon) see Rust and this raw <b>"
        );
    }

    #[test]
    fn test_unclosed_constructs_keep_delimiters() {
        assert_eq!(plain("[[open and <<raw"), "[[open and <<raw");
    }

    #[test]
    fn test_lists() {
        assert_eq!(
            plain("# one\n# two\n* dot\n# again\n> next"),
            "1. one\n2. two\n• dot\n1. again\n→ next"
        );
    }

    #[test]
    fn test_section_break_and_more_tag() {
        assert_eq!(plain("a\n----\nb\n--MORE--\nc"), "a\n\n\nb\n\nc");
    }

    #[test]
    fn test_flatten_text_of_template() {
        let doc = parse(tokenize("{{isbn|978-0}} 你好").unwrap());
        assert_eq!(flatten_text(&doc.children), "978-0 你好");
    }
}
