//! Binary operator semantics over [`Value`]s.
//!
//! Operands must be number-number or string-string; the only string
//! operation is `+` (concatenation). Equality is epsilon-based for
//! numbers and exact for strings, and comparing unlike types is a
//! semantic error rather than a silent `false`.

use formel_common::{Error, Result, Token, TokenKind};

use crate::numeric::epsilon_eq;
use crate::value::Value;

/// Apply an arithmetic operator (`+ - * / **`).
///
/// Division by zero never reaches this function: the evaluator turns
/// it into +∞ beforehand.
pub fn apply_arithmetic(op: &Token, left: &Value, right: &Value) -> Result<Value> {
    if !matches!(
        op.kind,
        TokenKind::Plus
            | TokenKind::Minus
            | TokenKind::Star
            | TokenKind::Slash
            | TokenKind::StarStar
    ) {
        return Err(Error::semantic(format!(
            "оператор {} не является арифметическим",
            op.figure()
        )));
    }

    if let (Value::Int(a), Value::Int(b)) = (left, right) {
        return Ok(int_arithmetic(op.kind, *a, *b));
    }

    if let (Some(a), Some(b)) = (left.as_f64(), right.as_f64()) {
        return Ok(Value::Float(float_arithmetic(op.kind, a, b)));
    }

    if let (Value::Str(a), Value::Str(b)) = (left, right) {
        if op.kind == TokenKind::Plus {
            return Ok(Value::Str(format!("{a}{b}")));
        }
    }

    Err(unsupported(op, left, right))
}

/// Integer operands stay integers where the operation allows it:
/// `+ - *` and `**` with a non-negative exponent. Division and any
/// overflow fall back to float math.
fn int_arithmetic(op: TokenKind, a: i64, b: i64) -> Value {
    let exact = match op {
        TokenKind::Plus => a.checked_add(b),
        TokenKind::Minus => a.checked_sub(b),
        TokenKind::Star => a.checked_mul(b),
        TokenKind::StarStar => u32::try_from(b).ok().and_then(|exp| a.checked_pow(exp)),
        _ => None,
    };

    match exact {
        Some(v) => Value::Int(v),
        None => Value::Float(float_arithmetic(op, a as f64, b as f64)),
    }
}

fn float_arithmetic(op: TokenKind, a: f64, b: f64) -> f64 {
    match op {
        TokenKind::Plus => a + b,
        TokenKind::Minus => a - b,
        TokenKind::Star => a * b,
        TokenKind::Slash => a / b,
        _ => a.powf(b),
    }
}

/// Apply a comparison operator (`== != < <= > >=`), yielding a bool.
pub fn apply_comparison(op: &Token, left: &Value, right: &Value) -> Result<bool> {
    match op.kind {
        TokenKind::EqEq => values_equal(left, right),
        TokenKind::NotEq => values_equal(left, right).map(|eq| !eq),
        TokenKind::Lt | TokenKind::Le | TokenKind::Gt | TokenKind::Ge => {
            if let (Some(a), Some(b)) = (left.as_f64(), right.as_f64()) {
                Ok(ordering_holds(op.kind, a.partial_cmp(&b)))
            } else if let (Value::Str(a), Value::Str(b)) = (left, right) {
                Ok(ordering_holds(op.kind, Some(a.cmp(b))))
            } else {
                Err(unsupported(op, left, right))
            }
        }
        _ => Err(Error::semantic(format!(
            "оператор {} не является оператором сравнения",
            op.figure()
        ))),
    }
}

fn ordering_holds(op: TokenKind, ordering: Option<std::cmp::Ordering>) -> bool {
    use std::cmp::Ordering::*;
    match ordering {
        Some(ordering) => match op {
            TokenKind::Lt => ordering == Less,
            TokenKind::Le => ordering != Greater,
            TokenKind::Gt => ordering == Greater,
            _ => ordering != Less,
        },
        // An incomparable pair (NaN on either side) satisfies nothing.
        None => false,
    }
}

/// Equality with an epsilon for numbers and exact match for strings.
/// Any other combination is a semantic error.
pub fn values_equal(left: &Value, right: &Value) -> Result<bool> {
    if let (Some(a), Some(b)) = (left.as_f64(), right.as_f64()) {
        return Ok(epsilon_eq(a, b));
    }

    if let (Value::Str(a), Value::Str(b)) = (left, right) {
        return Ok(a == b);
    }

    Err(Error::semantic(format!(
        "Можно проверять равенство только строка-строка и число-число: \
         {left} == {right}"
    )))
}

fn unsupported(op: &Token, left: &Value, right: &Value) -> Error {
    Error::semantic(format!(
        "Нельзя осуществлять операцию {left} {} {right}",
        op.figure()
    ))
}
