//! The built-in symbol table.
//!
//! Every function takes variadic positional arguments and is wrapped
//! in a [`FuncValue`] so it prints as `<функция ИМЯ>`. The last block
//! are integration stubs: their real implementations live outside the
//! interpreter, here they accept anything and return 0.

use std::cmp::Ordering;

use rand::Rng;
use rustc_hash::FxHashMap;

use formel_common::{Error, Result};

use crate::numeric::math_round;
use crate::value::{FuncValue, Value};

/// Every built-in callable plus the two boolean constants.
pub fn default_names() -> FxHashMap<String, Value> {
    let mut names = default_functions();
    names.insert("ЛОЖЬ".to_string(), Value::Int(0));
    names.insert("ИСТИНА".to_string(), Value::Int(1));
    names
}

/// The built-in functions, keyed by their script names.
pub fn default_functions() -> FxHashMap<String, Value> {
    let entries: &[(&str, fn(&[Value]) -> Result<Value>)] = &[
        // математические
        ("СЛЧИС", random),
        ("МИН", minimum),
        ("МАКС", maximum),
        ("СУММ", sum),
        ("ABS", abs),
        ("ОКРУГЛ", round),
        ("ОКРВВЕРХ", ceil),
        ("ОКРВНИЗ", floor),
        ("ЦЕЛОЕ", int),
        ("ОСТАТ", modulo),
        ("СЛУЧМЕЖДУ", random_between),
        ("КОРЕНЬ", sqrt),
        ("ОТБР", trunc),
        ("СРЗНАЧ", average),
        // текстовые
        ("ТЕКСТ", text),
        ("ЗНАЧЕН", parse_number),
        ("СТРОЧН", lower),
        ("ПРОПИСН", upper),
        ("СЦЕПИТЬ", concatenate),
        ("ОБЪЕДИНИТЬ", join),
        // логические
        ("ВСЕ_ИЗ", all_of),
        ("ОДИН_ИЗ", any_of),
        ("НИ_ОДИН_ИЗ", none_of),
        // специальные
        ("ТОЧКА", stub),
        ("СЕЙЧАС", stub),
        ("СЕГОДНЯ", stub),
        ("MQTT", stub),
        ("ОТЧЁТ", stub),
        ("СОХР", stub),
        ("ЗАГР", stub),
    ];

    entries
        .iter()
        .map(|&(name, func)| {
            let wrapped = FuncValue::new(format!("<функция {name}>"), func);
            (name.to_string(), Value::Func(wrapped))
        })
        .collect()
}

// ── Argument helpers ───────────────────────────────────────────────────

fn numeric(name: &str, value: &Value) -> Result<f64> {
    value
        .as_f64()
        .ok_or_else(|| Error::semantic(format!("{name}: ожидалось число, получено {value}")))
}

fn one_numeric(name: &str, args: &[Value]) -> Result<f64> {
    let [value] = args else {
        return Err(Error::semantic(format!("{name}: нужен ровно один аргумент")));
    };
    numeric(name, value)
}

fn one_string<'a>(name: &str, args: &'a [Value]) -> Result<&'a str> {
    let [Value::Str(s)] = args else {
        return Err(Error::semantic(format!(
            "{name}: нужен ровно один строковый аргумент"
        )));
    };
    Ok(s.as_str())
}

fn compare(name: &str, a: &Value, b: &Value) -> Result<Ordering> {
    if let (Some(x), Some(y)) = (a.as_f64(), b.as_f64()) {
        return Ok(x.partial_cmp(&y).unwrap_or(Ordering::Equal));
    }
    if let (Value::Str(x), Value::Str(y)) = (a, b) {
        return Ok(x.cmp(y));
    }
    Err(Error::semantic(format!(
        "{name}: нельзя сравнивать {a} и {b}"
    )))
}

// ── Математические ─────────────────────────────────────────────────────

fn random(_args: &[Value]) -> Result<Value> {
    Ok(Value::Float(rand::random::<f64>()))
}

fn minimum(args: &[Value]) -> Result<Value> {
    extreme("МИН", args, Ordering::Less)
}

fn maximum(args: &[Value]) -> Result<Value> {
    extreme("МАКС", args, Ordering::Greater)
}

fn extreme(name: &str, args: &[Value], wanted: Ordering) -> Result<Value> {
    let mut best: Option<&Value> = None;
    for arg in args {
        let Some(current) = best else {
            best = Some(arg);
            continue;
        };
        if compare(name, arg, current)? == wanted {
            best = Some(arg);
        }
    }
    best.cloned()
        .ok_or_else(|| Error::semantic(format!("{name}: нужен хотя бы один аргумент")))
}

fn sum(args: &[Value]) -> Result<Value> {
    let mut total = Value::Int(0);
    for arg in args {
        total = match (&total, arg) {
            (Value::Int(a), Value::Int(b)) => match a.checked_add(*b) {
                Some(v) => Value::Int(v),
                None => Value::Float(*a as f64 + *b as f64),
            },
            _ => Value::Float(numeric("СУММ", &total)? + numeric("СУММ", arg)?),
        };
    }
    Ok(total)
}

fn abs(args: &[Value]) -> Result<Value> {
    let [value] = args else {
        return Err(Error::semantic("ABS: нужен ровно один аргумент"));
    };
    match value {
        Value::Int(v) => Ok(match v.checked_abs() {
            Some(v) => Value::Int(v),
            None => Value::Float((*v as f64).abs()),
        }),
        Value::Float(v) => Ok(Value::Float(v.abs())),
        other => Err(Error::semantic(format!(
            "ABS: ожидалось число, получено {other}"
        ))),
    }
}

fn round(args: &[Value]) -> Result<Value> {
    let (value, decimals) = match args {
        [value] => (value, 0),
        [value, decimals] => (value, numeric("ОКРУГЛ", decimals)? as i32),
        _ => {
            return Err(Error::semantic(
                "ОКРУГЛ: нужны один или два аргумента",
            ));
        }
    };
    Ok(Value::Float(math_round(numeric("ОКРУГЛ", value)?, decimals)))
}

fn ceil(args: &[Value]) -> Result<Value> {
    Ok(Value::Int(one_numeric("ОКРВВЕРХ", args)?.ceil() as i64))
}

fn floor(args: &[Value]) -> Result<Value> {
    Ok(Value::Int(one_numeric("ОКРВНИЗ", args)?.floor() as i64))
}

fn int(args: &[Value]) -> Result<Value> {
    Ok(Value::Int(one_numeric("ЦЕЛОЕ", args)?.trunc() as i64))
}

fn trunc(args: &[Value]) -> Result<Value> {
    Ok(Value::Int(one_numeric("ОТБР", args)?.trunc() as i64))
}

/// Remainder. The result takes the sign of the dividend:
/// `ОСТАТ(-7, 3)` is `-1`.
fn modulo(args: &[Value]) -> Result<Value> {
    let [left, right] = args else {
        return Err(Error::semantic("ОСТАТ: нужны ровно два аргумента"));
    };
    if right.is_zero() {
        return Err(Error::semantic("ОСТАТ: деление с остатком на ноль"));
    }
    match (left, right) {
        (Value::Int(a), Value::Int(b)) => {
            Ok(Value::Int(a.checked_rem(*b).unwrap_or(0)))
        }
        _ => Ok(Value::Float(
            numeric("ОСТАТ", left)? % numeric("ОСТАТ", right)?,
        )),
    }
}

fn random_between(args: &[Value]) -> Result<Value> {
    let [Value::Int(low), Value::Int(high)] = args else {
        return Err(Error::semantic(
            "СЛУЧМЕЖДУ: нужны две целые границы",
        ));
    };
    if low > high {
        return Err(Error::semantic(
            "СЛУЧМЕЖДУ: левая граница больше правой",
        ));
    }
    Ok(Value::Int(rand::rng().random_range(*low..=*high)))
}

fn sqrt(args: &[Value]) -> Result<Value> {
    let value = one_numeric("КОРЕНЬ", args)?;
    if value < 0.0 {
        return Err(Error::semantic(
            "КОРЕНЬ: нельзя извлечь корень из отрицательного числа",
        ));
    }
    Ok(Value::Float(value.sqrt()))
}

fn average(args: &[Value]) -> Result<Value> {
    if args.is_empty() {
        return Err(Error::semantic("СРЗНАЧ: нужен хотя бы один аргумент"));
    }
    let mut total = 0.0;
    for arg in args {
        total += numeric("СРЗНАЧ", arg)?;
    }
    Ok(Value::Float(total / args.len() as f64))
}

// ── Текстовые ──────────────────────────────────────────────────────────

fn text(args: &[Value]) -> Result<Value> {
    let [value] = args else {
        return Err(Error::semantic("ТЕКСТ: нужен ровно один аргумент"));
    };
    Ok(Value::Str(value.to_string()))
}

fn parse_number(args: &[Value]) -> Result<Value> {
    let [value] = args else {
        return Err(Error::semantic("ЗНАЧЕН: нужен ровно один аргумент"));
    };
    match value {
        Value::Str(s) => s.trim().parse::<f64>().map(Value::Float).map_err(|_| {
            Error::semantic(format!("ЗНАЧЕН: не удалось преобразовать {s:?} в число"))
        }),
        Value::Int(v) => Ok(Value::Float(*v as f64)),
        Value::Float(v) => Ok(Value::Float(*v)),
        other => Err(Error::semantic(format!(
            "ЗНАЧЕН: ожидалась строка или число, получено {other}"
        ))),
    }
}

fn lower(args: &[Value]) -> Result<Value> {
    Ok(Value::Str(one_string("СТРОЧН", args)?.to_lowercase()))
}

fn upper(args: &[Value]) -> Result<Value> {
    Ok(Value::Str(one_string("ПРОПИСН", args)?.to_uppercase()))
}

fn concatenate(args: &[Value]) -> Result<Value> {
    Ok(Value::Str(args.iter().map(Value::to_string).collect()))
}

/// Join the display forms of args 2.. with the first argument as the
/// separator.
fn join(args: &[Value]) -> Result<Value> {
    match args {
        [] => Ok(Value::Str(String::new())),
        [single] => Ok(Value::Str(single.to_string())),
        [separator, rest @ ..] => {
            let parts: Vec<String> = rest.iter().map(Value::to_string).collect();
            Ok(Value::Str(parts.join(&separator.to_string())))
        }
    }
}

// ── Логические ─────────────────────────────────────────────────────────

fn all_of(args: &[Value]) -> Result<Value> {
    Ok(Value::from(
        !args.is_empty() && args.iter().all(Value::is_truthy),
    ))
}

fn any_of(args: &[Value]) -> Result<Value> {
    Ok(Value::from(args.iter().any(Value::is_truthy)))
}

fn none_of(args: &[Value]) -> Result<Value> {
    Ok(Value::from(
        !args.is_empty() && !args.iter().any(Value::is_truthy),
    ))
}

// ── Специальные ────────────────────────────────────────────────────────

fn stub(_args: &[Value]) -> Result<Value> {
    Ok(Value::Int(0))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sum_keeps_ints_until_floats_appear() {
        assert_eq!(
            sum(&[Value::Int(1), Value::Int(2), Value::Int(3)]).unwrap(),
            Value::Int(6)
        );
        assert_eq!(
            sum(&[Value::Int(1), Value::Float(0.5)]).unwrap(),
            Value::Float(1.5)
        );
        assert_eq!(sum(&[]).unwrap(), Value::Int(0));
        assert!(sum(&[Value::from("x")]).is_err());
    }

    #[test]
    fn average_divides_by_count() {
        assert_eq!(
            average(&[Value::Int(1), Value::Int(2), Value::Int(3)]).unwrap(),
            Value::Float(2.0)
        );
        assert!(average(&[]).is_err());
    }

    #[test]
    fn min_max_preserve_the_winning_value() {
        assert_eq!(
            minimum(&[Value::Int(3), Value::Float(1.5), Value::Int(2)]).unwrap(),
            Value::Float(1.5)
        );
        assert_eq!(
            maximum(&[Value::from("а"), Value::from("в"), Value::from("б")]).unwrap(),
            Value::from("в")
        );
        assert!(minimum(&[]).is_err());
        assert!(minimum(&[Value::Int(1), Value::from("x")]).is_err());
    }

    #[test]
    fn rounding_family() {
        assert_eq!(
            round(&[Value::Float(2.735), Value::Int(2)]).unwrap(),
            Value::Float(2.74)
        );
        assert_eq!(round(&[Value::Float(2.5)]).unwrap(), Value::Float(3.0));
        assert_eq!(ceil(&[Value::Float(2.1)]).unwrap(), Value::Int(3));
        assert_eq!(floor(&[Value::Float(-2.5)]).unwrap(), Value::Int(-3));
        assert_eq!(int(&[Value::Float(-2.9)]).unwrap(), Value::Int(-2));
        assert_eq!(trunc(&[Value::Float(2.9)]).unwrap(), Value::Int(2));
    }

    #[test]
    fn modulo_takes_the_dividend_sign() {
        assert_eq!(
            modulo(&[Value::Int(7), Value::Int(3)]).unwrap(),
            Value::Int(1)
        );
        assert_eq!(
            modulo(&[Value::Int(-7), Value::Int(3)]).unwrap(),
            Value::Int(-1)
        );
        assert_eq!(
            modulo(&[Value::Int(7), Value::Int(-3)]).unwrap(),
            Value::Int(1)
        );
        assert!(modulo(&[Value::Int(7), Value::Int(0)]).is_err());
    }

    #[test]
    fn sqrt_rejects_negatives() {
        assert_eq!(sqrt(&[Value::Float(6.25)]).unwrap(), Value::Float(2.5));
        assert!(sqrt(&[Value::Int(-1)]).is_err());
    }

    #[test]
    fn random_functions_stay_in_range() {
        for _ in 0..50 {
            let Value::Float(v) = random(&[]).unwrap() else {
                panic!("СЛЧИС must return a float");
            };
            assert!((0.0..1.0).contains(&v));

            let Value::Int(v) = random_between(&[Value::Int(3), Value::Int(7)]).unwrap() else {
                panic!("СЛУЧМЕЖДУ must return an int");
            };
            assert!((3..=7).contains(&v));
        }
        assert!(random_between(&[Value::Int(7), Value::Int(3)]).is_err());
    }

    #[test]
    fn text_family() {
        assert_eq!(text(&[Value::Float(2.0)]).unwrap(), Value::from("2.0"));
        assert_eq!(
            parse_number(&[Value::from(" 1.5 ")]).unwrap(),
            Value::Float(1.5)
        );
        assert!(parse_number(&[Value::from("не число")]).is_err());
        assert_eq!(lower(&[Value::from("ТЕСТ")]).unwrap(), Value::from("тест"));
        assert_eq!(upper(&[Value::from("тест")]).unwrap(), Value::from("ТЕСТ"));
    }

    #[test]
    fn concatenate_and_join_use_display_forms() {
        assert_eq!(
            concatenate(&[Value::Int(1), Value::from("-"), Value::Float(2.5)]).unwrap(),
            Value::from("1-2.5")
        );
        assert_eq!(
            join(&[Value::from("-"), Value::Int(1), Value::Int(2)]).unwrap(),
            Value::from("1-2")
        );
        assert_eq!(join(&[]).unwrap(), Value::from(""));
        assert_eq!(join(&[Value::from("x")]).unwrap(), Value::from("x"));
    }

    #[test]
    fn quantifiers_return_false_on_empty_input() {
        assert_eq!(all_of(&[]).unwrap(), Value::Int(0));
        assert_eq!(any_of(&[]).unwrap(), Value::Int(0));
        assert_eq!(none_of(&[]).unwrap(), Value::Int(0));

        assert_eq!(
            all_of(&[Value::Int(1), Value::from("x")]).unwrap(),
            Value::Int(1)
        );
        assert_eq!(
            any_of(&[Value::Int(0), Value::Int(2)]).unwrap(),
            Value::Int(1)
        );
        assert_eq!(
            none_of(&[Value::Int(0), Value::Float(0.0)]).unwrap(),
            Value::Int(1)
        );
    }

    #[test]
    fn stubs_always_return_zero() {
        assert_eq!(
            stub(&[Value::from("реальное время"), Value::Int(5)]).unwrap(),
            Value::Int(0)
        );
    }

    #[test]
    fn table_masks_every_function() {
        let functions = default_functions();
        assert_eq!(functions.len(), 30);
        for (name, value) in &functions {
            let Value::Func(func) = value else {
                panic!("{name} must be callable");
            };
            assert_eq!(func.repr(), format!("<функция {name}>"));
        }
    }

    #[test]
    fn default_names_add_constants() {
        let names = default_names();
        assert_eq!(names.get("ЛОЖЬ"), Some(&Value::Int(0)));
        assert_eq!(names.get("ИСТИНА"), Some(&Value::Int(1)));
        assert_eq!(names.len(), 32);
    }
}
