//! Stylesheet and selector parsing.
//!
//! [`parse_stylesheet`] is a lenient block scanner: generated stylesheets are
//! untrusted, so malformed input degrades to skipped rules rather than an
//! error. [`parse_selector`] is a recursive descent parser over the logos
//! tokens from [`crate::css::tokenizer`] and is strict, because a selector it
//! cannot understand must never match anything.

use crate::css::model::*;
use crate::css::tokenizer::{tokenize, Spanned, Token};

/// Errors from selector parsing.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum ParseError {
    #[error("unexpected character at byte {0}")]
    UnexpectedChar(usize),
    #[error("unexpected token at position {position}: {message}")]
    UnexpectedToken { position: usize, message: String },
    #[error("unexpected end of input: {0}")]
    UnexpectedEof(String),
    #[error("unsupported selector syntax: {0}")]
    Unsupported(String),
}

// ---------------------------------------------------------------------------
// Source-level helpers
// ---------------------------------------------------------------------------

/// Strip CSS block comments (`/* ... */`), replacing each with a single space.
/// Comment markers inside string literals are left alone.
pub fn strip_comments(input: &str) -> String {
    let mut result = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();
    let mut quote: Option<char> = None;

    while let Some(c) = chars.next() {
        if let Some(q) = quote {
            result.push(c);
            if c == '\\' {
                if let Some(escaped) = chars.next() {
                    result.push(escaped);
                }
            } else if c == q {
                quote = None;
            }
            continue;
        }
        match c {
            '"' | '\'' => {
                quote = Some(c);
                result.push(c);
            }
            '/' if chars.peek() == Some(&'*') => {
                chars.next();
                let mut prev = '\0';
                for inner in chars.by_ref() {
                    if prev == '*' && inner == '/' {
                        break;
                    }
                    prev = inner;
                }
                result.push(' ');
            }
            _ => result.push(c),
        }
    }

    result
}

/// Split `input` on `separator` where it is not nested in parentheses,
/// brackets or a string literal. Pieces are trimmed; empty pieces dropped.
pub fn split_top_level(input: &str, separator: char) -> Vec<String> {
    let mut pieces = Vec::new();
    let mut current = String::new();
    let mut depth = 0usize;
    let mut quote: Option<char> = None;

    for c in input.chars() {
        if let Some(q) = quote {
            current.push(c);
            if c == q {
                quote = None;
            }
            continue;
        }
        match c {
            '"' | '\'' => {
                quote = Some(c);
                current.push(c);
            }
            '(' | '[' => {
                depth += 1;
                current.push(c);
            }
            ')' | ']' => {
                depth = depth.saturating_sub(1);
                current.push(c);
            }
            c if c == separator && depth == 0 => {
                let piece = current.trim();
                if !piece.is_empty() {
                    pieces.push(piece.to_string());
                }
                current.clear();
            }
            _ => current.push(c),
        }
    }
    let piece = current.trim();
    if !piece.is_empty() {
        pieces.push(piece.to_string());
    }
    pieces
}

/// Parse the inside of a declaration block (or a `style` attribute).
///
/// Entries without a colon or with an empty name are dropped. Property names
/// are lowercased except custom properties (`--name`), which are
/// case-sensitive.
pub fn parse_declarations(block: &str) -> Vec<Declaration> {
    split_top_level(block, ';')
        .into_iter()
        .filter_map(|entry| {
            let (name, value) = entry.split_once(':')?;
            let name = name.trim();
            if name.is_empty() {
                return None;
            }
            let property = if name.starts_with("--") {
                name.to_string()
            } else {
                name.to_ascii_lowercase()
            };
            let mut value = value.trim().to_string();
            let mut important = false;
            if let Some(idx) = value.to_ascii_lowercase().rfind("!important") {
                if value[idx + "!important".len()..].trim().is_empty() {
                    value.truncate(idx);
                    value = value.trim_end().to_string();
                    important = true;
                }
            }
            Some(Declaration::new(property, value, important))
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Stylesheet scanner
// ---------------------------------------------------------------------------

/// At-rules whose blocks contain ordinary rules.
const GROUP_AT_RULES: &[&str] = &["media", "supports", "layer", "container"];

/// Parse a stylesheet. Never fails: unbalanced or garbled input is skipped.
pub fn parse_stylesheet(input: &str) -> StyleSheet {
    let cleaned = strip_comments(input);
    StyleSheet {
        items: parse_items(&cleaned),
    }
}

fn parse_items(src: &str) -> Vec<CssItem> {
    let mut items = Vec::new();
    let mut scanner = Scanner::new(src);

    loop {
        scanner.skip_whitespace();
        let Some(c) = scanner.peek() else {
            break;
        };

        if c == '}' {
            // Stray closing brace from a broken rule.
            scanner.bump();
            continue;
        }

        let start = scanner.pos;
        let (prelude, terminator) = scanner.read_prelude();
        let prelude = prelude.trim().to_string();

        match terminator {
            Some(';') => {
                if prelude.starts_with('@') {
                    items.push(CssItem::Opaque(format!("{prelude};")));
                }
            }
            Some('{') => {
                let body = scanner.read_block();
                if let Some(at_rule) = prelude.strip_prefix('@') {
                    let name: String = at_rule
                        .chars()
                        .take_while(|c| c.is_ascii_alphanumeric() || *c == '-')
                        .collect::<String>()
                        .to_ascii_lowercase();
                    if GROUP_AT_RULES.contains(&name.as_str()) {
                        items.push(CssItem::Group {
                            prelude,
                            items: parse_items(&body),
                        });
                    } else {
                        items.push(CssItem::Opaque(src[start..scanner.pos].trim().to_string()));
                    }
                } else if !prelude.is_empty() {
                    items.push(CssItem::Rule(RuleSet {
                        selectors: split_top_level(&prelude, ','),
                        declarations: parse_declarations(&body),
                    }));
                }
            }
            _ => break,
        }
    }

    items
}

/// Character cursor over comment-free CSS source.
struct Scanner<'a> {
    src: &'a str,
    pos: usize,
}

impl<'a> Scanner<'a> {
    fn new(src: &'a str) -> Self {
        Self { src, pos: 0 }
    }

    fn peek(&self) -> Option<char> {
        self.src[self.pos..].chars().next()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn skip_whitespace(&mut self) {
        while self.peek().is_some_and(char::is_whitespace) {
            self.bump();
        }
    }

    /// Read up to (and consume) the first top-level `{` or `;`.
    fn read_prelude(&mut self) -> (String, Option<char>) {
        let mut out = String::new();
        let mut depth = 0usize;
        let mut quote: Option<char> = None;
        while let Some(c) = self.bump() {
            if let Some(q) = quote {
                out.push(c);
                if c == q {
                    quote = None;
                }
                continue;
            }
            match c {
                '"' | '\'' => {
                    quote = Some(c);
                    out.push(c);
                }
                '(' | '[' => {
                    depth += 1;
                    out.push(c);
                }
                ')' | ']' => {
                    depth = depth.saturating_sub(1);
                    out.push(c);
                }
                '{' | ';' if depth == 0 => return (out, Some(c)),
                _ => out.push(c),
            }
        }
        (out, None)
    }

    /// Read a block body after its opening `{`, consuming the matching `}`.
    /// An unterminated block runs to the end of input.
    fn read_block(&mut self) -> String {
        let mut out = String::new();
        let mut depth = 1usize;
        let mut quote: Option<char> = None;
        while let Some(c) = self.bump() {
            if let Some(q) = quote {
                out.push(c);
                if c == q {
                    quote = None;
                }
                continue;
            }
            match c {
                '"' | '\'' => {
                    quote = Some(c);
                    out.push(c);
                }
                '{' => {
                    depth += 1;
                    out.push(c);
                }
                '}' => {
                    depth -= 1;
                    if depth == 0 {
                        return out;
                    }
                    out.push(c);
                }
                _ => out.push(c),
            }
        }
        out
    }
}

// ---------------------------------------------------------------------------
// Selector parser
// ---------------------------------------------------------------------------

/// Parse a single complex selector (no top-level commas).
pub fn parse_selector(input: &str) -> Result<Selector, ParseError> {
    let tokens = tokenize(input).map_err(ParseError::UnexpectedChar)?;
    if tokens.is_empty() {
        return Err(ParseError::UnexpectedEof("expected selector".into()));
    }
    let mut parser = Parser { tokens, cursor: 0 };
    let selector = parser.parse_selector()?;
    if let Some(tok) = parser.peek() {
        return Err(ParseError::UnexpectedToken {
            position: parser.cursor,
            message: format!("trailing {:?} '{}'", tok.token, tok.text),
        });
    }
    Ok(selector)
}

/// Recursive descent parser state.
struct Parser {
    tokens: Vec<Spanned>,
    cursor: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Spanned> {
        self.tokens.get(self.cursor)
    }

    fn advance(&mut self) -> Option<Spanned> {
        let tok = self.tokens.get(self.cursor).cloned();
        if tok.is_some() {
            self.cursor += 1;
        }
        tok
    }

    fn expect(&mut self, expected: &Token) -> Result<Spanned, ParseError> {
        let position = self.cursor;
        match self.advance() {
            Some(tok) if &tok.token == expected => Ok(tok),
            Some(tok) => Err(ParseError::UnexpectedToken {
                position,
                message: format!("expected {:?}, got {:?} '{}'", expected, tok.token, tok.text),
            }),
            None => Err(ParseError::UnexpectedEof(format!("expected {expected:?}"))),
        }
    }

    /// Returns `true` if the current token immediately follows the previous
    /// one with no whitespace between them.
    fn is_adjacent(&self) -> bool {
        if self.cursor == 0 {
            return false;
        }
        let prev = &self.tokens[self.cursor - 1];
        self.peek().is_some_and(|curr| curr.start == prev.end)
    }

    /// Parse compound selectors joined by combinators.
    fn parse_selector(&mut self) -> Result<Selector, ParseError> {
        let mut parts = vec![SelectorPart::Compound(self.parse_compound()?)];

        loop {
            let combinator = match self.peek().map(|t| &t.token) {
                Some(Token::GreaterThan) => Combinator::Child,
                Some(Token::Plus) => Combinator::Adjacent,
                Some(Token::Tilde) => Combinator::Sibling,
                // A selector-starting token that was not absorbed into the
                // previous compound is separated by whitespace.
                Some(
                    Token::Ident
                    | Token::Hash
                    | Token::Dot
                    | Token::Star
                    | Token::PseudoClass
                    | Token::PseudoElement,
                ) => {
                    parts.push(SelectorPart::Combinator(Combinator::Descendant));
                    parts.push(SelectorPart::Compound(self.parse_compound()?));
                    continue;
                }
                _ => break,
            };
            self.advance();
            parts.push(SelectorPart::Combinator(combinator));
            parts.push(SelectorPart::Compound(self.parse_compound()?));
        }

        Ok(Selector { parts })
    }

    /// Parse a compound selector such as `a.cta:hover`. Only the first
    /// component may be a type or universal selector; later components must
    /// be adjacent to the previous token.
    fn parse_compound(&mut self) -> Result<CompoundSelector, ParseError> {
        let mut components = Vec::new();

        loop {
            if !components.is_empty() && !self.is_adjacent() {
                break;
            }
            let Some(tok) = self.peek().cloned() else {
                break;
            };
            match tok.token {
                Token::Ident if components.is_empty() => {
                    self.advance();
                    components.push(SelectorComponent::Type(tok.text.to_ascii_lowercase()));
                }
                Token::Star if components.is_empty() => {
                    self.advance();
                    components.push(SelectorComponent::Universal);
                }
                Token::Dot => {
                    self.advance();
                    if !self.is_adjacent() {
                        return Err(ParseError::UnexpectedEof("expected class name after '.'".into()));
                    }
                    let name = self.expect(&Token::Ident)?;
                    components.push(SelectorComponent::Class(name.text));
                }
                Token::Hash => {
                    self.advance();
                    components.push(SelectorComponent::Id(tok.text[1..].to_string()));
                }
                Token::PseudoClass => {
                    self.advance();
                    components.push(self.parse_pseudo_class(&tok.text[1..])?);
                }
                Token::PseudoElement => {
                    self.advance();
                    components.push(SelectorComponent::PseudoElement(tok.text[2..].to_string()));
                }
                Token::BracketOpen => {
                    return Err(ParseError::Unsupported("attribute selector".into()));
                }
                _ => break,
            }
        }

        if components.is_empty() {
            return Err(ParseError::UnexpectedToken {
                position: self.cursor,
                message: "expected selector part".into(),
            });
        }

        Ok(CompoundSelector { components })
    }

    fn parse_pseudo_class(&mut self, name: &str) -> Result<SelectorComponent, ParseError> {
        let name = name.to_ascii_lowercase();
        let has_args = self.is_adjacent() && self.peek().is_some_and(|t| t.token == Token::ParenOpen);
        if !has_args {
            return Ok(SelectorComponent::PseudoClass(name));
        }
        self.advance();
        let position = self.cursor;
        let arg = self
            .advance()
            .ok_or_else(|| ParseError::UnexpectedEof("expected pseudo-class argument".into()))?;
        let index = match (name.as_str(), &arg.token) {
            ("nth-of-type" | "nth-child", Token::Number) => {
                arg.text.parse::<usize>().map_err(|_| ParseError::UnexpectedToken {
                    position,
                    message: format!("invalid index '{}'", arg.text),
                })?
            }
            _ => return Err(ParseError::Unsupported(format!(":{name}({})", arg.text))),
        };
        self.expect(&Token::ParenClose)?;
        Ok(if name == "nth-of-type" {
            SelectorComponent::NthOfType(index)
        } else {
            SelectorComponent::NthChild(index)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn compound(components: Vec<SelectorComponent>) -> SelectorPart {
        SelectorPart::Compound(CompoundSelector { components })
    }

    // ── Source helpers ───────────────────────────────────────────────

    #[test]
    fn strip_comments_keeps_utf8_and_strings() {
        assert_eq!(strip_comments("a/* x */b"), "a b");
        assert_eq!(strip_comments("content: '→ /* no */'"), "content: '→ /* no */'");
        assert_eq!(strip_comments("a /* unterminated"), "a  ");
    }

    #[test]
    fn split_top_level_respects_parens() {
        assert_eq!(
            split_top_level("linear-gradient(90deg, red, blue), url(a,b)", ','),
            vec!["linear-gradient(90deg, red, blue)", "url(a,b)"]
        );
    }

    #[test]
    fn declarations_with_important_and_custom_props() {
        let decls = parse_declarations("COLOR: Red !important; --Brand: #667eea; ; junk");
        assert_eq!(
            decls,
            vec![
                Declaration::new("color", "Red", true),
                Declaration::new("--Brand", "#667eea", false),
            ]
        );
    }

    #[test]
    fn declaration_value_keeps_functions() {
        let decls = parse_declarations("background: url(data:image/png;base64,AAA); margin: 0");
        assert_eq!(decls[0].value, "url(data:image/png;base64,AAA)");
        assert_eq!(decls[1].property, "margin");
    }

    // ── Stylesheet scanner ───────────────────────────────────────────

    #[test]
    fn parses_rules_groups_and_opaque() {
        let css = r#"
            @import url("fonts.css");
            body, html { margin: 0; }
            @media (max-width: 600px) { .hero { padding: 10px; } }
            @keyframes pulse { from { opacity: 0; } to { opacity: 1; } }
        "#;
        let sheet = parse_stylesheet(css);
        assert_eq!(sheet.items.len(), 4);
        assert_eq!(sheet.items[0], CssItem::Opaque(r#"@import url("fonts.css");"#.into()));
        match &sheet.items[1] {
            CssItem::Rule(rule) => assert_eq!(rule.selectors, vec!["body", "html"]),
            other => panic!("expected rule, got {other:?}"),
        }
        match &sheet.items[2] {
            CssItem::Group { prelude, items } => {
                assert_eq!(prelude, "@media (max-width: 600px)");
                assert_eq!(items.len(), 1);
            }
            other => panic!("expected group, got {other:?}"),
        }
        match &sheet.items[3] {
            CssItem::Opaque(text) => {
                assert!(text.starts_with("@keyframes pulse"));
                assert!(text.ends_with('}'));
            }
            other => panic!("expected opaque, got {other:?}"),
        }
    }

    #[test]
    fn garbage_is_skipped_not_fatal() {
        let sheet = parse_stylesheet("} } .a { color: red; } .b { color: blue");
        assert_eq!(sheet.rule_count(), 2);
    }

    #[test]
    fn empty_stylesheet() {
        assert!(parse_stylesheet("  /* only a comment */ ").items.is_empty());
    }

    // ── Selector parser ──────────────────────────────────────────────

    #[test]
    fn parse_compound() {
        let sel = parse_selector("a.cta#go:hover").unwrap();
        assert_eq!(
            sel.parts,
            vec![compound(vec![
                SelectorComponent::Type("a".into()),
                SelectorComponent::Class("cta".into()),
                SelectorComponent::Id("go".into()),
                SelectorComponent::PseudoClass("hover".into()),
            ])]
        );
    }

    #[test]
    fn parse_combinators() {
        let sel = parse_selector("main .hero > h1 + p ~ span").unwrap();
        let combinators: Vec<Combinator> = sel
            .parts
            .iter()
            .filter_map(|p| match p {
                SelectorPart::Combinator(c) => Some(*c),
                SelectorPart::Compound(_) => None,
            })
            .collect();
        assert_eq!(
            combinators,
            vec![
                Combinator::Descendant,
                Combinator::Child,
                Combinator::Adjacent,
                Combinator::Sibling,
            ]
        );
    }

    #[test]
    fn parse_nth_of_type() {
        let sel = parse_selector("div:nth-of-type(2)").unwrap();
        assert_eq!(
            sel.parts,
            vec![compound(vec![
                SelectorComponent::Type("div".into()),
                SelectorComponent::NthOfType(2),
            ])]
        );
    }

    #[test]
    fn parse_pseudo_element() {
        let sel = parse_selector(".card::before").unwrap();
        assert_eq!(
            sel.parts,
            vec![compound(vec![
                SelectorComponent::Class("card".into()),
                SelectorComponent::PseudoElement("before".into()),
            ])]
        );
    }

    #[test]
    fn id_with_hex_like_name() {
        let sel = parse_selector("#fff").unwrap();
        assert_eq!(sel.parts, vec![compound(vec![SelectorComponent::Id("fff".into())])]);
    }

    #[test]
    fn unsupported_syntax_is_an_error() {
        assert!(matches!(parse_selector("a[href]"), Err(ParseError::Unsupported(_))));
        assert!(matches!(parse_selector("p:not(.x)"), Err(ParseError::Unsupported(_))));
        assert!(matches!(parse_selector(r".md\:flex"), Err(ParseError::UnexpectedChar(3))));
        assert!(parse_selector("").is_err());
        assert!(parse_selector("a,b").is_err());
    }
}
