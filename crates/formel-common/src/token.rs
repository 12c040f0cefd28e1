use serde::Serialize;

use crate::span::Span;

/// A token produced by the Formel lexer.
///
/// `text` is the exact source slice the token matched (keyword
/// whitespace guards excluded), so literals and names keep their
/// original spelling for evaluation and re-serialization.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    pub span: Span,
}

impl Token {
    /// Create a new token from a kind, its matched text, and byte offsets.
    pub fn new(kind: TokenKind, text: impl Into<String>, start: u32, end: u32) -> Self {
        Self {
            kind,
            text: text.into(),
            span: Span::new(start, end),
        }
    }

    /// Canonical display form: a fixed figure for operators, keywords,
    /// and punctuation, the matched text for literals and names.
    pub fn figure(&self) -> &str {
        self.kind.figure().unwrap_or(&self.text)
    }
}

/// Every kind of token in the Formel language.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TokenKind {
    // ── Literals ───────────────────────────────────────────────────────
    /// Integer literal, e.g. `42`.
    Int,
    /// Floating-point literal, e.g. `3.14`.
    Float,
    /// String literal in single or double quotes, no escapes.
    Str,

    // ── Names ──────────────────────────────────────────────────────────
    /// Variable or function identifier, e.g. `x`, `СУММ`.
    Name,

    // ── Binary operators ───────────────────────────────────────────────
    /// `+`
    Plus,
    /// `-`
    Minus,
    /// `*`
    Star,
    /// `/`
    Slash,
    /// `**`
    StarStar,
    /// `<`
    Lt,
    /// `<=`
    Le,
    /// `>`
    Gt,
    /// `>=`
    Ge,
    /// `==`
    EqEq,
    /// `!=`
    NotEq,
    /// `И` / `AND`
    And,
    /// `ИЛИ` / `OR`
    Or,
    /// `НЕ` / `NOT`
    Not,

    // ── Condition keywords ─────────────────────────────────────────────
    /// `ЕСЛИ` / `IF`
    If,
    /// `ИНАЧЕ_ЕСЛИ` / `ELIF`
    Elif,
    /// `ИНАЧЕ` / `ELSE`
    Else,

    // ── Structural ─────────────────────────────────────────────────────
    /// `(`
    LParen,
    /// `)`
    RParen,
    /// `{`
    LBrace,
    /// `}`
    RBrace,
    /// `;`
    Semicolon,
    /// `,`
    Comma,
    /// `=`
    Assign,
}

impl TokenKind {
    /// The fixed display figure, or `None` for kinds whose figure is the
    /// matched text itself (literals and names).
    pub fn figure(&self) -> Option<&'static str> {
        match self {
            Self::Int | Self::Float | Self::Str | Self::Name => None,
            Self::Plus => Some("+"),
            Self::Minus => Some("-"),
            Self::Star => Some("*"),
            Self::Slash => Some("/"),
            Self::StarStar => Some("**"),
            Self::Lt => Some("<"),
            Self::Le => Some("<="),
            Self::Gt => Some(">"),
            Self::Ge => Some(">="),
            Self::EqEq => Some("=="),
            Self::NotEq => Some("!="),
            Self::And => Some("and"),
            Self::Or => Some("or"),
            Self::Not => Some("not"),
            Self::If => Some("if"),
            Self::Elif => Some("elif"),
            Self::Else => Some("else"),
            Self::LParen => Some("("),
            Self::RParen => Some(")"),
            Self::LBrace => Some("{"),
            Self::RBrace => Some("}"),
            Self::Semicolon => Some(";"),
            Self::Comma => Some(","),
            Self::Assign => Some("="),
        }
    }

    /// Whether this kind is a literal (integer, float, or string).
    pub fn is_literal(&self) -> bool {
        matches!(self, Self::Int | Self::Float | Self::Str)
    }

    /// Whether this kind is a numeric literal.
    pub fn is_number(&self) -> bool {
        matches!(self, Self::Int | Self::Float)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_new_constructor() {
        let token = Token::new(TokenKind::Name, "СУММ", 10, 18);
        assert_eq!(token.kind, TokenKind::Name);
        assert_eq!(token.text, "СУММ");
        assert_eq!(token.span, Span::new(10, 18));
    }

    #[test]
    fn figure_is_fixed_for_operators() {
        let token = Token::new(TokenKind::And, "И", 0, 2);
        assert_eq!(token.figure(), "and");
        let token = Token::new(TokenKind::StarStar, "**", 0, 2);
        assert_eq!(token.figure(), "**");
    }

    #[test]
    fn figure_is_text_for_literals_and_names() {
        let token = Token::new(TokenKind::Float, "2.56", 0, 4);
        assert_eq!(token.figure(), "2.56");
        let token = Token::new(TokenKind::Name, "ЕСЛИ_ПОЧТИ", 0, 10);
        assert_eq!(token.figure(), "ЕСЛИ_ПОЧТИ");
    }

    #[test]
    fn literal_categories() {
        assert!(TokenKind::Int.is_literal());
        assert!(TokenKind::Float.is_literal());
        assert!(TokenKind::Str.is_literal());
        assert!(!TokenKind::Name.is_literal());

        assert!(TokenKind::Int.is_number());
        assert!(TokenKind::Float.is_number());
        assert!(!TokenKind::Str.is_number());
    }
}
