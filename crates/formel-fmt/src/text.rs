//! AST → canonical surface text.

use formel_common::consts::DEFAULT_INDENT;
use formel_common::{Token, TokenKind};
use formel_parser::{Ast, NodeId, NodeKind};

/// Serialize a parsed script back into its surface form.
///
/// The output is syntactically equivalent to the source the tree was
/// parsed from, with whitespace normalized and `;` re-added after
/// every assignment and every conditional.
pub fn serialize_to_text(ast: &Ast) -> String {
    node_to_text(ast, ast.root(), "").trim().to_string()
}

fn node_to_text(ast: &Ast, id: NodeId, prefix: &str) -> String {
    match ast.kind(id) {
        NodeKind::Var { token, negated } => {
            format!("{prefix}{}", var_text(token, *negated))
        }

        NodeKind::Name { token } => format!("{prefix}{}", token.text),

        NodeKind::UnaryMinus => {
            // The sign is already on the child Var.
            format!("{prefix}{}", child(ast, id, 0, ""))
        }

        NodeKind::UnaryNot => {
            format!("{prefix}НЕ {}", child(ast, id, 0, ""))
        }

        NodeKind::Assignment => {
            let left = child(ast, id, 0, "");
            let right = child(ast, id, 1, "");
            format!("{prefix}{left} = {right};")
        }

        NodeKind::Binary { op } | NodeKind::Logical { op } => {
            let left = child(ast, id, 0, "");
            let right = child(ast, id, 1, "");
            format!("{prefix}{left} {} {right}", op.figure())
        }

        NodeKind::Call => {
            let callee = child(ast, id, 0, "");
            let arguments: Vec<String> = ast.children(id)[1..]
                .iter()
                .map(|&argument| node_to_text(ast, argument, ""))
                .collect();
            format!("{prefix}{callee}({})", arguments.join(", "))
        }

        NodeKind::Instruction => {
            let elements: Vec<String> = ast
                .children(id)
                .iter()
                .map(|&statement| node_to_text(ast, statement, prefix))
                .collect();
            elements.join("\n")
        }

        NodeKind::Condition => {
            let elements: String = ast
                .children(id)
                .iter()
                .map(|&arm| node_to_text(ast, arm, prefix))
                .collect();
            format!("{prefix}{elements};")
        }

        // The leading prefix of the `ЕСЛИ` line comes from the
        // enclosing Condition; the later arms open their own lines.
        NodeKind::If => {
            let predicate = child(ast, id, 0, "");
            let scope = child(ast, id, 1, prefix);
            format!("ЕСЛИ ({predicate})\n{scope}")
        }

        NodeKind::Elif => {
            let predicate = child(ast, id, 0, "");
            let scope = child(ast, id, 1, prefix);
            format!("\n{prefix}ИНАЧЕ_ЕСЛИ ({predicate})\n{scope}")
        }

        NodeKind::Else => {
            let scope = child(ast, id, 0, prefix);
            format!("\n{prefix}ИНАЧЕ\n{scope}")
        }

        NodeKind::Scope => {
            let indented = format!("{prefix}{DEFAULT_INDENT}");
            let body = child(ast, id, 0, &indented);
            format!("{prefix}{{\n{body}\n{prefix}}}")
        }

        NodeKind::Par => {
            let inner = child(ast, id, 0, prefix);
            format!("({inner})")
        }
    }
}

fn child(ast: &Ast, id: NodeId, index: usize, prefix: &str) -> String {
    ast.children(id)
        .get(index)
        .map(|&child| node_to_text(ast, child, prefix))
        .unwrap_or_default()
}

fn var_text(token: &Token, negated: bool) -> String {
    let sign = if negated { "-" } else { "" };
    match token.kind {
        // Strings are re-wrapped in double quotes whatever the source
        // used.
        TokenKind::Str => {
            let payload = token.text.trim_matches(|c| c == '"' || c == '\'');
            format!("\"{payload}\"")
        }
        _ => format!("{sign}{}", token.text),
    }
}
