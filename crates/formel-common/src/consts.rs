//! Tunable constants shared by every phase of the pipeline.

/// Number of decimal digits every float literal, float lookup, and
/// float-valued operator result is rounded to at evaluation time.
pub const DEFAULT_PRECISION: i32 = 5;

/// Absolute tolerance for numeric `==` / `!=`.
pub const EPSILON: f64 = 1e-9;

/// Indentation unit used by the serializers.
pub const DEFAULT_INDENT: &str = "    ";

/// Maximum accepted script length, in characters.
pub const MAX_LETTERS: usize = 10_000;

/// How many characters to show on each side of an offending character
/// in lexer error excerpts.
pub const DISPLAY_WINDOW: usize = 10;
