use std::fmt;

use serde::Serialize;

/// Result alias used across every phase of the interpreter.
pub type Result<T> = std::result::Result<T, Error>;

/// A fatal script error. There is no local recovery: the first error
/// aborts the whole pipeline and is returned to the caller.
///
/// Messages are addressed to the script author, in the language of the
/// scripts themselves, and name the offending identifier, operator, or
/// source excerpt.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Error {
    /// Malformed input: bad characters, unbalanced brackets or quotes,
    /// an unrecognizable or unexpected token.
    Syntax(String),
    /// Well-formed but ill-typed or unresolved: unknown names,
    /// unsupported operand combinations, type changes on assignment.
    Semantic(String),
}

impl Error {
    /// Build a syntax error from a ready-made description.
    pub fn syntax(description: impl Into<String>) -> Self {
        Self::Syntax(description.into())
    }

    /// Build a semantic error from a ready-made description.
    pub fn semantic(description: impl Into<String>) -> Self {
        Self::Semantic(description.into())
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Syntax(description) => {
                write!(f, "Синтаксическая ошибка: {description}")
            }
            Self::Semantic(description) => {
                write!(f, "Семантическая ошибка: {description}")
            }
        }
    }
}

impl std::error::Error for Error {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn syntax_error_display() {
        let err = Error::syntax("лишняя скобка");
        assert_eq!(err.to_string(), "Синтаксическая ошибка: лишняя скобка");
    }

    #[test]
    fn semantic_error_display() {
        let err = Error::semantic("имя не найдено");
        assert_eq!(err.to_string(), "Семантическая ошибка: имя не найдено");
    }
}
