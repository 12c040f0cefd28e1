// Formel lexer -- source validation and tokenizer for the Formel language.
//
// Lexical analysis runs in two stages. First the raw source is vetted as
// a whole: length cap, character whitelist, bracket balance, quote
// balance. Each check points at the offending character with a windowed
// excerpt, so script authors see exactly where their formula broke.
// Only then is the text split into tokens, which are handed to the
// parser as a consumable FIFO.

mod cursor;
mod stream;

use cursor::Cursor;
use formel_common::consts::{DISPLAY_WINDOW, MAX_LETTERS};
use formel_common::{Error, Result, Token, TokenKind};

pub use stream::TokenStream;

/// Validate and tokenize a whole source text.
///
/// This is the lexer's public entry point: the returned stream feeds
/// straight into the parser.
pub fn analyze(source: &str) -> Result<TokenStream> {
    Lexer::new(source).analyze()
}

/// The Formel lexer. Validates source text and splits it into tokens.
pub struct Lexer<'src> {
    /// Character view of the source, used by the validation passes and
    /// error excerpts, which count in characters, not bytes.
    chars: Vec<char>,
    cursor: Cursor<'src>,
}

impl<'src> Lexer<'src> {
    /// Create a new lexer for the given source text.
    pub fn new(source: &'src str) -> Self {
        Self {
            chars: source.chars().collect(),
            cursor: Cursor::new(source),
        }
    }

    /// Run every validation pass, then tokenize.
    pub fn analyze(mut self) -> Result<TokenStream> {
        let size = self.chars.len();
        if size > MAX_LETTERS {
            return Err(Error::syntax(format!(
                "Слишком длинный текст: {size} символов."
            )));
        }

        self.check_charset()?;
        self.check_parenthesis()?;
        self.check_quotes()?;

        let tokens = self.tokenize()?;
        Ok(TokenStream::new(tokens))
    }

    // ── Validation passes ──────────────────────────────────────────────

    /// Reject any character outside the language's whitelist.
    fn check_charset(&self) -> Result<()> {
        let mut disallowed: Vec<char> = self
            .chars
            .iter()
            .copied()
            .filter(|&c| !is_allowed(c))
            .collect();
        disallowed.sort_unstable();
        disallowed.dedup();

        if disallowed.is_empty() {
            return Ok(());
        }

        let listed: String = disallowed.iter().map(|c| format!("{c:?}")).collect();
        Err(Error::syntax(format!(
            "в скрипте нельзя использовать символы {listed}"
        )))
    }

    /// Make sure every `(`, `[`, `{` is closed by a matching partner.
    ///
    /// A single scan pushes openers onto a stack and pops them on
    /// closers, strictly by kind. The first mismatched closer, or a
    /// leftover opener at end of input, is reported with its 1-based
    /// character index and a windowed excerpt.
    pub fn check_parenthesis(&self) -> Result<()> {
        let mut stack: Vec<char> = Vec::new();
        let mut artifact: Option<char> = None;
        let mut index = 0;

        for (i, &symbol) in self.chars.iter().enumerate() {
            index = i;
            artifact = Some(symbol);

            match symbol {
                '(' | '[' | '{' => stack.push(symbol),
                ')' | ']' | '}' => {
                    let expected = match symbol {
                        ')' => '(',
                        ']' => '[',
                        _ => '{',
                    };
                    if stack.pop() != Some(expected) {
                        break;
                    }
                    artifact = None;
                }
                _ => artifact = None,
            }
        }

        if artifact.is_none() && stack.is_empty() {
            return Ok(());
        }

        let symbol = artifact.map(String::from).unwrap_or_default();
        Err(Error::syntax(format!(
            "символ \"{symbol}\" (№{number}) не имеет пары. {source}",
            number = index + 1,
            source = self.problem_at(index),
        )))
    }

    /// Make sure single and double quotes each come in pairs.
    pub fn check_quotes(&self) -> Result<()> {
        let mut single_amount = 0usize;
        let mut double_amount = 0usize;
        let mut single_last_seen = 0;
        let mut double_last_seen = 0;

        for (i, &symbol) in self.chars.iter().enumerate() {
            if symbol == '\'' {
                single_amount += 1;
                single_last_seen = i + 1;
            } else if symbol == '"' {
                double_amount += 1;
                double_last_seen = i + 1;
            }
        }

        if single_amount % 2 == 1 {
            return Err(Error::syntax(format!(
                "нечётное число одинарных кавычек. \
                 Последняя из них символ №{single_last_seen} {source}",
                source = self.problem_at(single_last_seen - 1),
            )));
        }

        if double_amount % 2 == 1 {
            return Err(Error::syntax(format!(
                "нечётное число двойных кавычек. \
                 Последняя из них символ №{double_last_seen} {source}",
                source = self.problem_at(double_last_seen - 1),
            )));
        }

        Ok(())
    }

    /// Render the neighborhood of an offending character as
    /// `…left --> c <-- right…`, `DISPLAY_WINDOW` characters per side.
    fn problem_at(&self, index: usize) -> String {
        let (left, prefix) = if index >= DISPLAY_WINDOW {
            (index - DISPLAY_WINDOW, "...")
        } else {
            (0, "")
        };

        let right = index + DISPLAY_WINDOW;
        let suffix = if right <= self.chars.len() { "..." } else { "" };

        let before: String = self.chars[left..index].iter().collect();
        let after_end = right.min(self.chars.len());
        let after: String = self.chars[index + 1..after_end].iter().collect();

        format!(
            "{prefix}{before} --> {symbol} <-- {after}{suffix}",
            symbol = self.chars[index],
        )
    }

    // ── Tokenization ───────────────────────────────────────────────────

    /// Split the source into an ordered token list.
    ///
    /// Whitespace between tokens is skipped; everything else must match
    /// one of the token kinds or the whole analysis fails.
    pub fn tokenize(&mut self) -> Result<Vec<Token>> {
        let mut output = Vec::new();

        while !self.cursor.is_eof() {
            self.cursor
                .eat_while(|c| matches!(c, ' ' | '\n' | '\t' | '\r'));
            let Some(first) = self.cursor.peek() else {
                break;
            };
            output.push(self.next_token(first)?);
        }

        Ok(output)
    }

    /// Produce the next token, dispatching on its first character.
    fn next_token(&mut self, first: char) -> Result<Token> {
        let start = self.cursor.pos();

        match first {
            '0'..='9' => self.lex_number(start),
            '"' | '\'' => self.lex_string(start),

            '(' => self.single_char_token(TokenKind::LParen, start),
            ')' => self.single_char_token(TokenKind::RParen, start),
            '{' => self.single_char_token(TokenKind::LBrace, start),
            '}' => self.single_char_token(TokenKind::RBrace, start),
            ';' => self.single_char_token(TokenKind::Semicolon, start),
            ',' => self.single_char_token(TokenKind::Comma, start),
            '+' => self.single_char_token(TokenKind::Plus, start),
            '-' => self.single_char_token(TokenKind::Minus, start),
            '/' => self.single_char_token(TokenKind::Slash, start),

            '*' => {
                self.cursor.advance();
                if self.cursor.peek() == Some('*') {
                    self.cursor.advance();
                    Ok(self.token(TokenKind::StarStar, start))
                } else {
                    Ok(self.token(TokenKind::Star, start))
                }
            }
            '<' => {
                self.cursor.advance();
                if self.cursor.peek() == Some('=') {
                    self.cursor.advance();
                    Ok(self.token(TokenKind::Le, start))
                } else {
                    Ok(self.token(TokenKind::Lt, start))
                }
            }
            '>' => {
                self.cursor.advance();
                if self.cursor.peek() == Some('=') {
                    self.cursor.advance();
                    Ok(self.token(TokenKind::Ge, start))
                } else {
                    Ok(self.token(TokenKind::Gt, start))
                }
            }
            '=' => {
                self.cursor.advance();
                if self.cursor.peek() == Some('=') {
                    self.cursor.advance();
                    Ok(self.token(TokenKind::EqEq, start))
                } else {
                    Ok(self.token(TokenKind::Assign, start))
                }
            }
            '!' => {
                self.cursor.advance();
                if self.cursor.peek() == Some('=') {
                    self.cursor.advance();
                    Ok(self.token(TokenKind::NotEq, start))
                } else {
                    Err(unrecognized('!'))
                }
            }

            c if is_letter(c) => self.lex_word(start),

            c => Err(unrecognized(c)),
        }
    }

    /// Consume one character and return a token of the given kind.
    fn single_char_token(&mut self, kind: TokenKind, start: u32) -> Result<Token> {
        self.cursor.advance();
        Ok(self.token(kind, start))
    }

    /// Build a token from the slice between `start` and the cursor.
    fn token(&self, kind: TokenKind, start: u32) -> Token {
        let end = self.cursor.pos();
        Token::new(kind, self.cursor.slice(start, end), start, end)
    }

    /// Lex an integer or float literal.
    ///
    /// A digit run adjacent to a bare dot (`2.`, `.5` via the preceding
    /// number, `1.2.3`) matches neither kind and fails.
    fn lex_number(&mut self, start: u32) -> Result<Token> {
        self.cursor.eat_while(|c| c.is_ascii_digit());

        if self.cursor.peek() != Some('.') {
            return Ok(self.token(TokenKind::Int, start));
        }

        if !self.cursor.peek_next().is_some_and(|c| c.is_ascii_digit()) {
            return Err(unrecognized('.'));
        }

        self.cursor.advance(); // '.'
        self.cursor.eat_while(|c| c.is_ascii_digit());

        if self.cursor.peek() == Some('.') {
            return Err(unrecognized('.'));
        }

        Ok(self.token(TokenKind::Float, start))
    }

    /// Lex a string literal: non-greedy, no escapes, closed by the
    /// first quote of either kind.
    fn lex_string(&mut self, start: u32) -> Result<Token> {
        self.cursor.advance(); // opening quote

        loop {
            match self.cursor.advance() {
                Some('"') | Some('\'') => break,
                Some(_) => {}
                None => {
                    return Err(Error::syntax(
                        "строка не закрыта кавычкой до конца текста",
                    ));
                }
            }
        }

        Ok(self.token(TokenKind::Str, start))
    }

    /// Lex a keyword or a name.
    ///
    /// Keyword alternatives are tried before names so reserved words
    /// win. The logical operators additionally require -- and consume --
    /// one following whitespace character; that is what separates `И`
    /// from a name like `Иван`. The condition keywords match by prefix.
    fn lex_word(&mut self, start: u32) -> Result<Token> {
        let attempts: &[(&[&str], TokenKind, bool)] = &[
            (&["И", "AND"], TokenKind::And, true),
            (&["ИЛИ", "OR"], TokenKind::Or, true),
            (&["НЕ", "NOT"], TokenKind::Not, true),
            (&["ЕСЛИ", "IF"], TokenKind::If, false),
            (&["ИНАЧЕ_ЕСЛИ", "ELIF"], TokenKind::Elif, false),
            (&["ИНАЧЕ", "ELSE"], TokenKind::Else, false),
        ];

        for &(words, kind, spaced) in attempts {
            if let Some(token) = self.try_keyword(words, kind, spaced, start) {
                return Ok(token);
            }
        }

        self.lex_name(start)
    }

    /// Try each keyword spelling case-insensitively; commit the cursor
    /// only on a match. Spaced keywords swallow one trailing whitespace
    /// character that is not part of the token text.
    fn try_keyword(
        &mut self,
        words: &[&str],
        kind: TokenKind,
        spaced: bool,
        start: u32,
    ) -> Option<Token> {
        for word in words {
            let mut probe = self.cursor.clone();
            if !eat_word_ci(&mut probe, word) {
                continue;
            }

            let end = probe.pos();
            if spaced {
                if !probe.peek().is_some_and(|c| c.is_whitespace()) {
                    continue;
                }
                probe.advance();
            }

            let text = self.cursor.slice(start, end).to_string();
            self.cursor = probe;
            return Some(Token::new(kind, text, start, end));
        }

        None
    }

    /// Lex a name: a letter, then letters, digits, and underscores.
    fn lex_name(&mut self, start: u32) -> Result<Token> {
        // A quote as the second character would glue an identifier onto
        // a string literal; such input is not a valid name.
        if self
            .cursor
            .peek_next()
            .is_some_and(|c| c == '"' || c == '\'')
        {
            let first = self.cursor.peek().unwrap_or_default();
            return Err(unrecognized(first));
        }

        self.cursor.advance(); // first letter
        self.cursor
            .eat_while(|c| c.is_ascii_digit() || c == '_' || is_letter(c));

        Ok(self.token(TokenKind::Name, start))
    }
}

/// Whether a character can appear in a name (first position).
fn is_letter(c: char) -> bool {
    c.is_ascii_alphabetic() || matches!(c, 'А'..='я' | 'ё' | 'Ё')
}

/// Whether a character is allowed anywhere in a script.
fn is_allowed(c: char) -> bool {
    c.is_ascii_digit()
        || is_letter(c)
        || matches!(
            c,
            '+' | '-'
                | '*'
                | '/'
                | '\\'
                | '='
                | ','
                | '('
                | ')'
                | '['
                | ']'
                | '{'
                | '}'
                | ';'
                | '"'
                | '\''
                | '!'
                | '?'
                | '.'
                | ':'
                | '№'
                | '%'
                | '<'
                | '>'
                | '@'
                | '_'
                | ' '
                | '\n'
                | '\t'
                | '\r'
        )
}

/// Compare two characters case-insensitively, Cyrillic included.
fn chars_eq_ci(a: char, b: char) -> bool {
    a == b || a.to_lowercase().eq(b.to_lowercase())
}

/// Consume `word` from the probe cursor case-insensitively.
fn eat_word_ci(probe: &mut Cursor, word: &str) -> bool {
    for expected in word.chars() {
        let matches = probe.peek().is_some_and(|c| chars_eq_ci(c, expected));
        if !matches {
            return false;
        }
        probe.advance();
    }
    true
}

/// The generic "this character fits nothing" error.
fn unrecognized(c: char) -> Error {
    Error::syntax(format!("Не удалось распознать символ: {c:?}"))
}
