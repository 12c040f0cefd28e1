//! AST → Python text.
//!
//! The translation targets the companion Python runtime: a module that
//! provides `math_round`, `custom_sum`, `custom_avg`, the `custom_*`
//! text and quantifier helpers, and the rig/date integration
//! functions. Names with no counterpart render as `?ИМЯ?` so the gap
//! is visible instead of silently wrong.

use formel_common::consts::{DEFAULT_INDENT, DEFAULT_PRECISION};
use formel_common::{Token, TokenKind};
use formel_parser::{Ast, NodeId, NodeKind};

/// Python-side names of the built-ins.
fn replacement(name: &str) -> Option<&'static str> {
    Some(match name {
        // математические
        "СЛЧИС" => "random.random",
        "МИН" => "min",
        "МАКС" => "max",
        "СУММ" => "custom_sum",
        "ABS" => "abs",
        "ОКРУГЛ" => "math_round",
        "ОКРВВЕРХ" => "math.ceil",
        "ОКРВНИЗ" => "math.floor",
        "ЦЕЛОЕ" => "int",
        "ОСТАТ" => "mod",
        "СЛУЧМЕЖДУ" => "random.randint",
        "КОРЕНЬ" => "math.sqrt",
        "ОТБР" => "math.trunc",
        "СРЗНАЧ" => "custom_avg",
        // текстовые
        "СТРОЧН" => "str.lower",
        "ТЕКСТ" => "str",
        "ПРОПИСН" => "str.upper",
        "ЗНАЧЕН" => "float",
        "СЦЕПИТЬ" => "custom_concatenate",
        "ОБЪЕДИНИТЬ" => "custom_join",
        // логические
        "ВСЕ_ИЗ" => "custom_all",
        "ОДИН_ИЗ" => "custom_any",
        "НИ_ОДИН_ИЗ" => "custom_not_any",
        // специальные
        "ТОЧКА" => "rig",
        "СЕЙЧАС" => "now",
        "СЕГОДНЯ" => "today",
        "MQTT" => "mqtt",
        "ОТЧЁТ" => "report",
        "СОХР" => "save",
        "ЗАГР" => "load",
        "СТОП" => "exit",
        _ => return None,
    })
}

/// Python-side spellings of the script-name string arguments taken by
/// the rig and date built-ins.
fn script_name(original: &str) -> Option<&'static str> {
    Some(match original {
        // now
        "реальное время" => "realtime",
        // today
        "название дня" => "day_name",
        "номер дня" => "day_number",
        "число" => "day",
        _ => return None,
    })
}

fn translate_script_name(original: &str) -> String {
    match script_name(original) {
        Some(found) => found.to_string(),
        None => format!("?{original}?"),
    }
}

/// Serialize a parsed script into its Python rendition.
pub fn serialize_to_python(ast: &Ast) -> String {
    node_to_python(ast, ast.root(), "").trim().to_string()
}

fn node_to_python(ast: &Ast, id: NodeId, prefix: &str) -> String {
    match ast.kind(id) {
        NodeKind::Var { token, negated } => {
            format!("{prefix}{}", var_python(token, *negated))
        }

        NodeKind::Name { token } => format!("{prefix}{}", token.text),

        NodeKind::UnaryMinus => {
            format!("{prefix}{}", child(ast, id, 0, ""))
        }

        NodeKind::UnaryNot => {
            format!("{prefix}not {}", child(ast, id, 0, ""))
        }

        NodeKind::Assignment => {
            let left = child(ast, id, 0, "");
            let right = child(ast, id, 1, "");
            format!("{prefix}{left} = {right}")
        }

        NodeKind::Binary { op } | NodeKind::Logical { op } => {
            let left = child(ast, id, 0, "");
            let right = child(ast, id, 1, "");
            format!("{prefix}{left} {} {right}", op.figure())
        }

        NodeKind::Call => call_to_python(ast, id, prefix),

        NodeKind::Instruction => {
            let elements: Vec<String> = ast
                .children(id)
                .iter()
                .map(|&statement| node_to_python(ast, statement, prefix))
                .collect();
            elements.join("\n")
        }

        NodeKind::Condition => ast
            .children(id)
            .iter()
            .map(|&arm| node_to_python(ast, arm, prefix))
            .collect(),

        NodeKind::If => {
            let predicate = child(ast, id, 0, "");
            let body = child(ast, id, 1, prefix);
            format!("{prefix}if {predicate}:\n{body}")
        }

        NodeKind::Elif => {
            let predicate = child(ast, id, 0, "");
            let body = child(ast, id, 1, prefix);
            format!("\n\n{prefix}elif {predicate}:\n{body}")
        }

        NodeKind::Else => {
            let body = child(ast, id, 0, prefix);
            format!("\n\n{prefix}else:\n{body}\n")
        }

        // Python has no braces: the scope is just its body, one level
        // deeper.
        NodeKind::Scope => {
            let indented = format!("{prefix}{DEFAULT_INDENT}");
            child(ast, id, 0, &indented)
        }

        NodeKind::Par => {
            let inner = child(ast, id, 0, prefix);
            format!("({inner})")
        }
    }
}

fn call_to_python(ast: &Ast, id: NodeId, prefix: &str) -> String {
    let original_name = child(ast, id, 0, "");
    let new_name = match replacement(&original_name) {
        Some(found) => found.to_string(),
        None => format!("?{original_name}?"),
    };

    let mut arguments: Vec<String> = ast.children(id)[1..]
        .iter()
        .map(|&argument| node_to_python(ast, argument, ""))
        .collect();

    // The rig function addresses a data point by script name in its
    // second argument; the date functions take script names throughout.
    if new_name == "rig" && arguments.len() > 1 {
        arguments[1] = quoted_translation(&arguments[1]);
    } else if new_name == "now" || new_name == "today" {
        for argument in arguments.iter_mut() {
            *argument = quoted_translation(argument);
        }
    }

    format!("{prefix}{new_name}({})", arguments.join(", "))
}

fn quoted_translation(argument: &str) -> String {
    let bare = argument.trim_matches('"').trim_matches('\'');
    format!("\"{}\"", translate_script_name(bare))
}

fn var_python(token: &Token, negated: bool) -> String {
    let sign = if negated { "-" } else { "" };
    match token.kind {
        // Floats keep their evaluation-time precision at the target.
        TokenKind::Float => {
            format!("math_round({sign}{}, {DEFAULT_PRECISION})", token.text)
        }
        TokenKind::Str => {
            let payload = token.text.trim_matches(|c| c == '"' || c == '\'');
            format!("\"{payload}\"")
        }
        _ => format!("{sign}{}", token.text),
    }
}

fn child(ast: &Ast, id: NodeId, index: usize, prefix: &str) -> String {
    ast.children(id)
        .get(index)
        .map(|&child| node_to_python(ast, child, prefix))
        .unwrap_or_default()
}
