// Formel eval -- runtime for the Formel language.
//
// The evaluator walks a parsed tree against a caller-owned namespace,
// passing intermediate results through an explicit value stack. Both
// stores, and the evaluator itself, report what they do as events, so
// a Watcher can reconstruct a full trace of any evaluation.

pub mod builtins;

mod eval;
mod namespace;
mod numeric;
mod ops;
mod stack;
mod value;
mod watcher;

pub use eval::evaluate;
pub use namespace::Namespace;
pub use numeric::math_round;
pub use stack::ValueStack;
pub use value::{FuncValue, Value};
pub use watcher::{Event, Informer, NamespaceReport, Report, StackReport, Watcher};
