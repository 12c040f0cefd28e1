// Formel fmt -- serializers that turn syntax trees back into text.
//
// Both serializers share the same recursive walk dispatched on node
// kind. The surface form reproduces canonical Formel with normalized
// whitespace: braces on their own lines, bodies indented, `;` after
// every assignment and every conditional. The Python form emits an
// equivalent script for the companion Python runtime: built-in names
// mapped
// to their Python counterparts, float literals wrapped in `math_round`
// so evaluation precision survives the translation, and `if`/`elif`/
// `else` with colons instead of braces.

mod python;
mod text;

pub use python::serialize_to_python;
pub use text::serialize_to_text;
