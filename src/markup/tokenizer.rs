//! HTML tokenizer using logos.
//!
//! Lenient by construction: every byte of input lexes into some token, and
//! malformed tags degrade to text rather than errors. Raw-text elements
//! (`script`, `style`, `textarea`, `title`) are read verbatim up to their
//! closing tag by the driver loop in [`tokenize`].

use logos::{Lexer, Logos};

use crate::markup::entities::decode_entities;

/// Elements whose content is not markup.
pub const RAW_TEXT_ELEMENTS: &[&str] = &["script", "style", "textarea", "title"];

/// Low-level lexemes. Tags are matched as a whole (attributes included) by a
/// callback so that `>` inside quoted attribute values does not end the tag.
#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
enum Lexeme {
    #[token("<!--", lex_comment)]
    Comment,

    #[regex(r"<![dD][oO][cC][tT][yY][pP][eE][^>]*>")]
    Doctype,

    #[regex(r"<\?[^>]*>")]
    ProcessingInstruction,

    #[regex(r"<[a-zA-Z][a-zA-Z0-9-]*", lex_tag_body)]
    StartTag,

    #[regex(r"</[a-zA-Z][a-zA-Z0-9-]*[^>]*>")]
    EndTag,

    #[token("<")]
    Lt,

    #[regex(r"[^<]+")]
    Text,
}

/// Consume up to and including `-->` (or to end of input).
fn lex_comment(lex: &mut Lexer<Lexeme>) {
    let rest = lex.remainder();
    let len = rest.find("-->").map(|i| i + 3).unwrap_or(rest.len());
    lex.bump(len);
}

/// Consume attributes up to the closing `>`, honoring quoted values.
fn lex_tag_body(lex: &mut Lexer<Lexeme>) {
    let mut quote: Option<char> = None;
    let mut len = lex.remainder().len();
    for (i, c) in lex.remainder().char_indices() {
        match (quote, c) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '"' | '\'') => quote = Some(c),
            (None, '>') => {
                len = i + 1;
                break;
            }
            _ => {}
        }
    }
    lex.bump(len);
}

/// A decoded HTML token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HtmlToken {
    Doctype,
    Comment(String),
    StartTag {
        /// Lowercase tag name.
        name: String,
        /// Attributes in source order; names lowercased, values decoded.
        attributes: Vec<(String, String)>,
        self_closing: bool,
    },
    EndTag(String),
    Text(String),
}

/// Tokenize an HTML string.
pub fn tokenize(input: &str) -> Vec<HtmlToken> {
    let mut lexer = Lexeme::lexer(input);
    let mut tokens = Vec::new();

    while let Some(result) = lexer.next() {
        let slice = lexer.slice();
        let token = match result {
            Ok(Lexeme::Comment) => {
                let body = slice.strip_prefix("<!--").unwrap_or(slice);
                HtmlToken::Comment(body.strip_suffix("-->").unwrap_or(body).to_string())
            }
            Ok(Lexeme::Doctype) => HtmlToken::Doctype,
            Ok(Lexeme::ProcessingInstruction) => continue,
            Ok(Lexeme::StartTag) => {
                let token = parse_start_tag(slice);
                if let HtmlToken::StartTag {
                    name,
                    self_closing: false,
                    ..
                } = &token
                {
                    if RAW_TEXT_ELEMENTS.contains(&name.as_str()) {
                        let raw = read_raw_text(&mut lexer, name);
                        tokens.push(token.clone());
                        if !raw.is_empty() {
                            tokens.push(HtmlToken::Text(raw));
                        }
                        continue;
                    }
                }
                token
            }
            Ok(Lexeme::EndTag) => {
                let name: String = slice[2..]
                    .chars()
                    .take_while(|c| c.is_ascii_alphanumeric() || *c == '-')
                    .collect();
                HtmlToken::EndTag(name.to_ascii_lowercase())
            }
            Ok(Lexeme::Lt) | Err(()) => HtmlToken::Text(slice.to_string()),
            Ok(Lexeme::Text) => HtmlToken::Text(decode_entities(slice).into_owned()),
        };

        // Merge adjacent text runs (a stray `<` splits them).
        if let (HtmlToken::Text(next), Some(HtmlToken::Text(prev))) = (&token, tokens.last_mut()) {
            prev.push_str(next);
            continue;
        }
        tokens.push(token);
    }

    tokens
}

/// Read raw text up to `</name` (case-insensitive), leaving the end tag to be
/// lexed normally. `title` and `textarea` content is entity-decoded.
fn read_raw_text(lexer: &mut Lexer<Lexeme>, name: &str) -> String {
    let rest = lexer.remainder();
    let needle = format!("</{name}");
    let end = rest
        .to_ascii_lowercase()
        .find(&needle)
        .unwrap_or(rest.len());
    let raw = &rest[..end];
    let text = match name {
        "title" | "textarea" => decode_entities(raw).into_owned(),
        _ => raw.to_string(),
    };
    lexer.bump(end);
    text
}

/// Parse `<name attr=value ...>` into a start-tag token.
fn parse_start_tag(slice: &str) -> HtmlToken {
    let inner = slice.strip_prefix('<').unwrap_or(slice);
    let inner = inner.strip_suffix('>').unwrap_or(inner);
    let name_end = inner
        .find(|c: char| !(c.is_ascii_alphanumeric() || c == '-'))
        .unwrap_or(inner.len());
    let name = inner[..name_end].to_ascii_lowercase();
    let mut rest = inner[name_end..].trim_end();
    let self_closing = rest.ends_with('/');
    if self_closing {
        rest = &rest[..rest.len() - 1];
    }
    HtmlToken::StartTag {
        name,
        attributes: parse_attributes(rest),
        self_closing,
    }
}

/// Parse an attribute list. Duplicate names keep the first occurrence.
fn parse_attributes(input: &str) -> Vec<(String, String)> {
    let chars: Vec<char> = input.chars().collect();
    let mut attributes: Vec<(String, String)> = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        while i < chars.len() && (chars[i].is_whitespace() || chars[i] == '/') {
            i += 1;
        }
        let start = i;
        while i < chars.len() && !chars[i].is_whitespace() && !matches!(chars[i], '=' | '/' | '>') {
            i += 1;
        }
        if start == i {
            i += 1;
            continue;
        }
        let name: String = chars[start..i].iter().collect::<String>().to_ascii_lowercase();

        while i < chars.len() && chars[i].is_whitespace() {
            i += 1;
        }
        let mut value = String::new();
        if i < chars.len() && chars[i] == '=' {
            i += 1;
            while i < chars.len() && chars[i].is_whitespace() {
                i += 1;
            }
            if i < chars.len() && matches!(chars[i], '"' | '\'') {
                let quote = chars[i];
                i += 1;
                let value_start = i;
                while i < chars.len() && chars[i] != quote {
                    i += 1;
                }
                value = chars[value_start..i].iter().collect();
                i += 1;
            } else {
                let value_start = i;
                while i < chars.len() && !chars[i].is_whitespace() {
                    i += 1;
                }
                value = chars[value_start..i].iter().collect();
            }
        }

        if !attributes.iter().any(|(n, _)| *n == name) {
            attributes.push((name, decode_entities(&value).into_owned()));
        }
    }

    attributes
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn start(name: &str, attributes: &[(&str, &str)]) -> HtmlToken {
        HtmlToken::StartTag {
            name: name.into(),
            attributes: attributes
                .iter()
                .map(|(n, v)| (n.to_string(), v.to_string()))
                .collect(),
            self_closing: false,
        }
    }

    #[test]
    fn simple_document() {
        let tokens = tokenize("<!DOCTYPE html><p class=\"a\">Hi &amp; bye</p>");
        assert_eq!(
            tokens,
            vec![
                HtmlToken::Doctype,
                start("p", &[("class", "a")]),
                HtmlToken::Text("Hi & bye".into()),
                HtmlToken::EndTag("p".into()),
            ]
        );
    }

    #[test]
    fn attribute_forms() {
        let tokens = tokenize("<input type=text disabled data-x='a > b' ID=\"k\">");
        assert_eq!(
            tokens,
            vec![start(
                "input",
                &[("type", "text"), ("disabled", ""), ("data-x", "a > b"), ("id", "k")]
            )]
        );
    }

    #[test]
    fn self_closing_and_case() {
        let tokens = tokenize("<BR/><Img SRC=\"x.png\" />");
        assert_eq!(
            tokens,
            vec![
                HtmlToken::StartTag {
                    name: "br".into(),
                    attributes: vec![],
                    self_closing: true
                },
                HtmlToken::StartTag {
                    name: "img".into(),
                    attributes: vec![("src".into(), "x.png".into())],
                    self_closing: true
                },
            ]
        );
    }

    #[test]
    fn raw_text_is_not_markup() {
        let tokens = tokenize("<style>a > b { color: red }</style><script>if (a < b) {}</SCRIPT>");
        assert_eq!(
            tokens,
            vec![
                start("style", &[]),
                HtmlToken::Text("a > b { color: red }".into()),
                HtmlToken::EndTag("style".into()),
                start("script", &[]),
                HtmlToken::Text("if (a < b) {}".into()),
                HtmlToken::EndTag("script".into()),
            ]
        );
    }

    #[test]
    fn comments_and_stray_angle_brackets() {
        let tokens = tokenize("a <!-- <b> --> 1 < 2 <3");
        assert_eq!(
            tokens,
            vec![
                HtmlToken::Text("a ".into()),
                HtmlToken::Comment(" <b> ".into()),
                HtmlToken::Text(" 1 < 2 <3".into()),
            ]
        );
    }

    #[test]
    fn unterminated_comment_consumes_rest() {
        let tokens = tokenize("x<!-- never closed");
        assert_eq!(
            tokens,
            vec![
                HtmlToken::Text("x".into()),
                HtmlToken::Comment(" never closed".into())
            ]
        );
    }
}
