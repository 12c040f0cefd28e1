//! Formel -- an embeddable formula language with Russian keywords.
//!
//! Scripts look like spreadsheet formulas with statements and
//! conditional logic on top: `ЕСЛИ`/`ИНАЧЕ_ЕСЛИ`/`ИНАЧЕ` for
//! branching, `И`/`ИЛИ`/`НЕ` for logic, and a library of domain
//! functions (`СУММ`, `СРЗНАЧ`, `ОКРУГЛ`, ...). Evaluation runs
//! against a mutable [`Namespace`] the caller owns, so host programs
//! can seed variables and read results back.
//!
//! ```
//! use formel::{custom_eval, Namespace, Value};
//!
//! let mut namespace = Namespace::with_builtins();
//! let result = custom_eval("СУММ(1, 2) + 3", &mut namespace).unwrap();
//! assert_eq!(result, Some(Value::Int(6)));
//! ```

use std::time::{Duration, Instant};

pub use formel_common::consts;
pub use formel_common::{Error, Result, Span, Token, TokenKind};
pub use formel_eval::{
    evaluate, math_round, Event, FuncValue, Informer, Namespace, Report, Value, ValueStack,
    Watcher,
};
pub use formel_fmt::{serialize_to_python, serialize_to_text};
pub use formel_lexer::{analyze, Lexer, TokenStream};
pub use formel_parser::{parse, Ast, NodeId, NodeKind, Parser};

/// Execute a script against the given namespace and return its result,
/// if the final statement left one.
///
/// The namespace survives the call: assignments made by the script can
/// be read back afterwards. Use [`Namespace::with_builtins`] to make
/// the standard functions and constants available.
pub fn custom_eval(source: &str, namespace: &mut Namespace) -> Result<Option<Value>> {
    let stream = formel_lexer::analyze(source)?;
    let ast = formel_parser::parse(stream)?;
    formel_eval::evaluate(&ast, namespace, &mut ())
}

/// Per-phase timings and the event report of one [`verbose_eval`] run.
#[derive(Debug, Clone)]
pub struct EvalReport {
    pub lexical_analysis: Duration,
    pub tree_creation: Duration,
    pub evaluation: Duration,
    pub stats: Report,
}

/// Like [`custom_eval`], but additionally measures every phase and
/// records evaluation events through a [`Watcher`].
pub fn verbose_eval(
    source: &str,
    namespace: &mut Namespace,
) -> Result<(Option<Value>, EvalReport)> {
    let start = Instant::now();
    let stream = formel_lexer::analyze(source)?;
    let lexical_analysis = start.elapsed();

    let start = Instant::now();
    let ast = formel_parser::parse(stream)?;
    let tree_creation = start.elapsed();

    let mut watcher = Watcher::new();
    let start = Instant::now();
    let result = formel_eval::evaluate(&ast, namespace, &mut watcher)?;
    let evaluation = start.elapsed();

    let report = EvalReport {
        lexical_analysis,
        tree_creation,
        evaluation,
        stats: watcher.make_report(),
    };

    Ok((result, report))
}
