//! logos-based selector tokenizer.
//!
//! Token priority in logos is determined by:
//! 1. Longest match wins (e.g. `::before` as PseudoElement beats `:` + `:before`)
//! 2. For equal length matches, earlier-defined variants win
//!
//! Whitespace is skipped; the parser recovers descendant combinators from
//! token spans.

use logos::Logos;

/// Selector token produced by the lexer.
#[derive(Logos, Debug, Clone, PartialEq)]
#[logos(skip r"[ \t\n\r\f]+")]
pub enum Token {
    // ── Compound tokens (longer matches, defined first) ──────────────

    /// Id selector: `#hero`, `#1col` (digits allowed, unlike a CSS ident).
    #[regex(r"#[a-zA-Z0-9_-]+")]
    Hash,

    /// Pseudo-element: `::before`, `::placeholder`.
    #[regex(r"::[a-zA-Z][a-zA-Z0-9_-]*")]
    PseudoElement,

    /// Pseudo-class: `:hover`, `:nth-of-type`, `:root`.
    #[regex(r":[a-zA-Z][a-zA-Z0-9_-]*")]
    PseudoClass,

    /// Non-negative integer (pseudo-class arguments).
    #[regex(r"[0-9]+")]
    Number,

    /// Identifier: tag names, class names, pseudo arguments.
    #[regex(r"-?[a-zA-Z_][a-zA-Z0-9_-]*")]
    Ident,

    // ── Single-character punctuation ─────────────────────────────────

    #[token(".")]
    Dot,

    #[token("*")]
    Star,

    #[token(">")]
    GreaterThan,

    #[token("+")]
    Plus,

    #[token("~")]
    Tilde,

    #[token(",")]
    Comma,

    #[token("(")]
    ParenOpen,

    #[token(")")]
    ParenClose,

    #[token("[")]
    BracketOpen,

    #[token("]")]
    BracketClose,
}

/// A token with its source text and byte span.
#[derive(Debug, Clone, PartialEq)]
pub struct Spanned {
    pub token: Token,
    pub text: String,
    pub start: usize,
    pub end: usize,
}

/// Tokenize a selector string.
///
/// Returns `Err(offset)` with the byte offset of the first character that
/// does not lex (escaped class names, attribute operators and so on).
pub fn tokenize(input: &str) -> Result<Vec<Spanned>, usize> {
    let mut out = Vec::new();
    for (result, span) in Token::lexer(input).spanned() {
        match result {
            Ok(token) => out.push(Spanned {
                token,
                text: input[span.clone()].to_string(),
                start: span.start,
                end: span.end,
            }),
            Err(()) => return Err(span.start),
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(input: &str) -> Vec<Token> {
        tokenize(input).unwrap().into_iter().map(|t| t.token).collect()
    }

    fn texts(input: &str) -> Vec<String> {
        tokenize(input).unwrap().into_iter().map(|t| t.text).collect()
    }

    #[test]
    fn test_punctuation() {
        assert_eq!(
            tokens(". * > + ~ , ( ) [ ]"),
            vec![
                Token::Dot,
                Token::Star,
                Token::GreaterThan,
                Token::Plus,
                Token::Tilde,
                Token::Comma,
                Token::ParenOpen,
                Token::ParenClose,
                Token::BracketOpen,
                Token::BracketClose,
            ]
        );
    }

    #[test]
    fn test_hash_allows_hex_looking_ids() {
        // `#fff` is an id in selector context, never a color.
        assert_eq!(tokens("#fff"), vec![Token::Hash]);
        assert_eq!(texts("#hero-1"), vec!["#hero-1"]);
    }

    #[test]
    fn test_pseudo_element_priority_over_pseudo_class() {
        assert_eq!(tokens("p::before"), vec![Token::Ident, Token::PseudoElement]);
    }

    #[test]
    fn test_nth_of_type() {
        assert_eq!(
            tokens("li:nth-of-type(3)"),
            vec![
                Token::Ident,
                Token::PseudoClass,
                Token::ParenOpen,
                Token::Number,
                Token::ParenClose,
            ]
        );
    }

    #[test]
    fn test_vendor_ident() {
        assert_eq!(texts(".-webkit-thing"), vec![".", "-webkit-thing"]);
    }

    #[test]
    fn test_spans_expose_whitespace() {
        let toks = tokenize(".a .b").unwrap();
        assert_eq!(toks[1].end, 2);
        assert_eq!(toks[2].start, 3);
    }

    #[test]
    fn test_lex_error_reports_offset() {
        assert_eq!(tokenize(r".md\:flex"), Err(3));
    }

    #[test]
    fn test_empty_input() {
        assert!(tokens("   ").is_empty());
    }
}
