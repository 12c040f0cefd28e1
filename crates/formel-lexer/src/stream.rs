use std::collections::VecDeque;

use formel_common::{Error, Result, Token, TokenKind};

/// The consumable output of lexical analysis: an ordered FIFO of tokens.
///
/// The parser drives the stream with single-token lookahead
/// ([`show_next`](Self::show_next) / [`next_in`](Self::next_in)) and
/// consumes with [`cut_next`](Self::cut_next) or, when a specific kind
/// is required, [`dispose_next`](Self::dispose_next).
#[derive(Debug, Clone)]
pub struct TokenStream {
    tokens: VecDeque<Token>,
}

impl TokenStream {
    /// Wrap an ordered token list into a stream.
    pub fn new(tokens: Vec<Token>) -> Self {
        Self {
            tokens: tokens.into(),
        }
    }

    /// Peek at the next token without consuming it.
    pub fn show_next(&self) -> Option<&Token> {
        self.tokens.front()
    }

    /// Remove and return the next token.
    pub fn cut_next(&mut self) -> Option<Token> {
        self.tokens.pop_front()
    }

    /// Consume the next token, which must be of the given kind.
    pub fn dispose_next(&mut self, kind: TokenKind) -> Result<()> {
        match self.cut_next() {
            Some(token) if token.kind == kind => Ok(()),
            Some(token) => Err(Error::syntax(format!(
                "Предполагалось уничтожить токен типа {kind:?}, \
                 а уничтожается {:?}.",
                token.kind,
            ))),
            None => Err(Error::syntax(format!(
                "Предполагалось уничтожить токен типа {kind:?}, \
                 а токены уже закончились.",
            ))),
        }
    }

    /// Whether the next token is one of the given kinds.
    pub fn next_in(&self, kinds: &[TokenKind]) -> bool {
        self.show_next()
            .is_some_and(|token| kinds.contains(&token.kind))
    }

    /// Figures of all remaining tokens, oldest first.
    pub fn tokens_left(&self) -> Vec<String> {
        self.tokens
            .iter()
            .map(|token| token.figure().to_string())
            .collect()
    }

    /// Whether every token has been consumed.
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Number of tokens still in the stream.
    pub fn len(&self) -> usize {
        self.tokens.len()
    }
}
