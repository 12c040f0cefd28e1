//! The tree-walking evaluator.
//!
//! Evaluation is a pre-order walk that leaves each subexpression's
//! value on the [`ValueStack`]. Statements run strictly in source
//! order, left operands before right, call arguments left to right,
//! and the logical operators do NOT short-circuit. Whatever value is
//! left on the stack after the root finishes is the overall result.

use formel_common::consts::DEFAULT_PRECISION;
use formel_common::{Error, Result, Token, TokenKind};
use formel_parser::{Ast, NodeId, NodeKind};

use crate::namespace::Namespace;
use crate::numeric::math_round;
use crate::ops;
use crate::stack::ValueStack;
use crate::value::Value;
use crate::watcher::{Event, Informer};

/// Evaluate a parsed script against a caller-supplied namespace.
///
/// The namespace is borrowed for the duration of the call and survives
/// it, so seeded variables and script-made assignments can be read
/// back afterwards. Pass `&mut ()` as the informer to evaluate without
/// observation, or a [`crate::Watcher`] to record every step.
pub fn evaluate(
    ast: &Ast,
    namespace: &mut Namespace,
    informer: &mut dyn Informer,
) -> Result<Option<Value>> {
    let mut evaluator = Evaluator {
        ast,
        namespace,
        stack: ValueStack::new(),
        informer,
    };

    evaluator.eval(ast.root())?;

    if evaluator.stack.is_empty() {
        Ok(None)
    } else {
        evaluator.pop(ast.root()).map(Some)
    }
}

struct Evaluator<'a> {
    ast: &'a Ast,
    namespace: &'a mut Namespace,
    stack: ValueStack,
    informer: &'a mut dyn Informer,
}

impl Evaluator<'_> {
    fn eval(&mut self, id: NodeId) -> Result<()> {
        let ast = self.ast;
        match ast.kind(id) {
            // Plain containers evaluate their children in order; a
            // sign prefix already lives on the Var under a UnaryMinus.
            NodeKind::Instruction
            | NodeKind::Scope
            | NodeKind::Par
            | NodeKind::UnaryMinus
            | NodeKind::If
            | NodeKind::Elif
            | NodeKind::Else => {
                for &child in ast.children(id) {
                    self.eval(child)?;
                }
                Ok(())
            }

            NodeKind::Var { token, negated } => self.eval_var(id, token, *negated),
            NodeKind::Name { token } => self.eval_name(id, token),

            NodeKind::UnaryNot => {
                let &[child] = ast.children(id) else {
                    return Err(malformed("отрицание работает ровно с одним узлом"));
                };
                self.eval(child)?;
                let value = self.pop(id)?;
                self.push(id, Value::Int(i64::from(!value.is_truthy())));
                Ok(())
            }

            NodeKind::Binary { op } => self.eval_binary(id, op),
            NodeKind::Logical { op } => self.eval_logical(id, op),
            NodeKind::Assignment => self.eval_assignment(id),
            NodeKind::Call => self.eval_call(id),
            NodeKind::Condition => self.eval_condition(id),
        }
    }

    /// A literal pushes its parsed value: integers stay integers,
    /// floats are rounded, strings lose their outer quotes.
    fn eval_var(&mut self, id: NodeId, token: &Token, negated: bool) -> Result<()> {
        let value = match token.kind {
            TokenKind::Int => parse_int(token, negated)?,
            TokenKind::Float => {
                let parsed: f64 = token
                    .text
                    .parse()
                    .map_err(|_| bad_literal(token))?;
                let signed = if negated { -parsed } else { parsed };
                Value::Float(math_round(signed, DEFAULT_PRECISION))
            }
            TokenKind::Str => Value::Str(strip_quotes(&token.text).to_string()),
            _ => {
                return Err(Error::semantic(format!(
                    "Неизвестный тип переменной: {}",
                    token.figure()
                )));
            }
        };

        self.push(id, value);
        Ok(())
    }

    /// A name pushes its bound value; floats are re-rounded on the way
    /// out so stored noise never leaks into expressions.
    fn eval_name(&mut self, id: NodeId, token: &Token) -> Result<()> {
        let name = &token.text;
        let caller = self.ast.describe(id);
        let variable = self.namespace.get(&mut *self.informer, &caller, name);

        let Some(mut variable) = variable else {
            return Err(Error::semantic(format!(
                "Переменная с именем \"{name}\" не найдена."
            )));
        };

        if let Value::Float(v) = variable {
            variable = Value::Float(math_round(v, DEFAULT_PRECISION));
        }

        self.push(id, variable);
        Ok(())
    }

    fn eval_binary(&mut self, id: NodeId, op: &Token) -> Result<()> {
        let ast = self.ast;
        let &[left, right] = ast.children(id) else {
            return Err(malformed(
                "Бинарный оператор может работать только с двумя узлами.",
            ));
        };

        self.eval(left)?;
        let left_value = self.pop(id)?;
        self.eval(right)?;
        let right_value = self.pop(id)?;

        let operation = format!(
            "{} {} {}",
            ast.describe(left),
            op.figure(),
            ast.describe(right),
        );

        let result = if op.kind == TokenKind::Slash && right_value.is_zero() {
            self.informer.inform(Event::ZeroDivision { operation });
            Value::Float(f64::INFINITY)
        } else {
            self.informer.inform(Event::OperatorUse {
                operator: op.figure().to_string(),
                operation,
            });
            ops::apply_arithmetic(op, &left_value, &right_value)?
        };

        self.push(id, round_float(result));
        Ok(())
    }

    /// Comparisons and `И`/`ИЛИ` always produce 0 or 1. Both operands
    /// are evaluated first: there is no short-circuiting.
    fn eval_logical(&mut self, id: NodeId, op: &Token) -> Result<()> {
        let ast = self.ast;
        let &[left, right] = ast.children(id) else {
            return Err(malformed(
                "Бинарный оператор может работать только с двумя узлами.",
            ));
        };

        self.eval(left)?;
        let left_value = self.pop(id)?;
        self.eval(right)?;
        let right_value = self.pop(id)?;

        self.informer.inform(Event::OperatorUse {
            operator: op.figure().to_string(),
            operation: format!(
                "{} {} {}",
                ast.describe(left),
                op.figure(),
                ast.describe(right),
            ),
        });

        let result = match op.kind {
            TokenKind::And => left_value.is_truthy() && right_value.is_truthy(),
            TokenKind::Or => left_value.is_truthy() || right_value.is_truthy(),
            _ => ops::apply_comparison(op, &left_value, &right_value)?,
        };

        self.push(id, Value::Int(i64::from(result)));
        Ok(())
    }

    /// Bind the right-hand value to the left-hand name. A bound
    /// variable may change its value but not its type, unless both the
    /// old and the new value are numeric.
    fn eval_assignment(&mut self, id: NodeId) -> Result<()> {
        let ast = self.ast;
        let &[left, right] = ast.children(id) else {
            return Err(malformed(
                "Бинарный оператор может работать только с двумя узлами.",
            ));
        };
        let NodeKind::Name { token } = ast.kind(left) else {
            return Err(malformed("присваивать можно только имени"));
        };
        let name = &token.text;

        self.eval(right)?;
        let value = self.pop(id)?;

        let caller = ast.describe(id);
        let existing = self.namespace.get(&mut *self.informer, &caller, name);

        if let Some(existing) = existing {
            let both_numeric = existing.is_numeric() && value.is_numeric();
            if !both_numeric && existing.type_name() != value.type_name() {
                return Err(Error::semantic(format!(
                    "Попытка изменения типа при присвоении значения, \
                     переменная \"{name}\" была <{}> а присваивается <{}>.",
                    existing.type_name(),
                    value.type_name(),
                )));
            }
        }

        self.namespace
            .set(&mut *self.informer, &caller, name, value)
    }

    /// Evaluate arguments left to right, then invoke the callee.
    fn eval_call(&mut self, id: NodeId) -> Result<()> {
        let ast = self.ast;
        let children = ast.children(id);
        let Some((&callee, arguments)) = children.split_first() else {
            return Err(malformed("вызов без имени функции"));
        };
        let NodeKind::Name { token } = ast.kind(callee) else {
            return Err(malformed("вызов без имени функции"));
        };
        let name = &token.text;

        let mut operands = Vec::with_capacity(arguments.len());
        for &argument in arguments {
            self.eval(argument)?;
            operands.push(self.pop(id)?);
        }

        let caller = ast.describe(id);
        let function = self.namespace.get(&mut *self.informer, &caller, name);

        let Some(function) = function else {
            return Err(Error::semantic(format!(
                "Функция с названием \"{name}\" не найдена."
            )));
        };
        let Value::Func(function) = function else {
            return Err(Error::semantic(format!(
                "Объект с названием \"{name}\" не является вызываемым."
            )));
        };

        self.informer.inform(Event::Call {
            name: name.to_string(),
            operands: operands.iter().map(Value::to_string).collect(),
        });

        let result = function.call(&operands)?;
        self.push(id, result);
        Ok(())
    }

    /// Walk the arms in order: the first truthy predicate wins, an
    /// `ИНАЧЕ` body runs unconditionally.
    fn eval_condition(&mut self, id: NodeId) -> Result<()> {
        let ast = self.ast;
        for &arm in ast.children(id) {
            match ast.kind(arm) {
                NodeKind::If | NodeKind::Elif => {
                    let &[predicate, scope] = ast.children(arm) else {
                        return Err(malformed("у условия должны быть проверка и тело"));
                    };
                    self.eval(predicate)?;
                    let value = self.pop(arm)?;
                    if value.is_truthy() {
                        self.eval(scope)?;
                        return Ok(());
                    }
                }
                NodeKind::Else => {
                    let &[scope] = ast.children(arm) else {
                        return Err(malformed("у иначе должно быть только тело"));
                    };
                    self.eval(scope)?;
                    return Ok(());
                }
                _ => {
                    return Err(malformed(
                        "в условии допустимы только ветки если/иначе_если/иначе",
                    ));
                }
            }
        }
        Ok(())
    }

    fn push(&mut self, id: NodeId, value: Value) {
        let caller = self.ast.describe(id);
        self.stack.push(&mut *self.informer, &caller, value);
    }

    fn pop(&mut self, id: NodeId) -> Result<Value> {
        let caller = self.ast.describe(id);
        self.stack.pop(&mut *self.informer, &caller)
    }
}

/// Integer literals parse to `Int`; a digit run too long for one falls
/// back to a rounded float.
fn parse_int(token: &Token, negated: bool) -> Result<Value> {
    match token.text.parse::<i64>() {
        Ok(v) => Ok(Value::Int(if negated { -v } else { v })),
        Err(_) => {
            let parsed: f64 = token.text.parse().map_err(|_| bad_literal(token))?;
            let signed = if negated { -parsed } else { parsed };
            Ok(Value::Float(math_round(signed, DEFAULT_PRECISION)))
        }
    }
}

/// Drop the outer quotes of a string literal, whichever kind they are.
fn strip_quotes(text: &str) -> &str {
    text.trim_matches(|c| c == '"' || c == '\'')
}

fn round_float(value: Value) -> Value {
    match value {
        Value::Float(v) => Value::Float(math_round(v, DEFAULT_PRECISION)),
        other => other,
    }
}

fn bad_literal(token: &Token) -> Error {
    Error::semantic(format!("не удалось разобрать число {}", token.text))
}

fn malformed(description: &str) -> Error {
    Error::semantic(description.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::FuncValue;
    use crate::watcher::Watcher;

    fn run(source: &str, namespace: &mut Namespace) -> Result<Option<Value>> {
        let stream = formel_lexer::analyze(source)?;
        let ast = formel_parser::parse(stream)?;
        evaluate(&ast, namespace, &mut ())
    }

    fn run_fresh(source: &str) -> Result<Option<Value>> {
        run(source, &mut Namespace::new())
    }

    // ── Literals ───────────────────────────────────────────────────────

    #[test]
    fn integer_literal_stays_integer() {
        assert_eq!(run_fresh("123").unwrap(), Some(Value::Int(123)));
    }

    #[test]
    fn float_literal_is_rounded() {
        assert_eq!(
            run_fresh("123.031213120121").unwrap(),
            Some(Value::Float(123.03121))
        );
    }

    #[test]
    fn string_literal_loses_quotes() {
        assert_eq!(run_fresh("'test'").unwrap(), Some(Value::from("test")));
        assert_eq!(run_fresh("\"тест\"").unwrap(), Some(Value::from("тест")));
    }

    #[test]
    fn unary_minus_negates() {
        assert_eq!(run_fresh("-123").unwrap(), Some(Value::Int(-123)));
        assert_eq!(
            run_fresh("-123.031213120121").unwrap(),
            Some(Value::Float(-123.03121))
        );
    }

    // ── Names ──────────────────────────────────────────────────────────

    #[test]
    fn name_lookup_rounds_floats() {
        let mut namespace =
            Namespace::with_contents([("точность", Value::Float(0.1234567))]);
        assert_eq!(
            run("точность", &mut namespace).unwrap(),
            Some(Value::Float(0.12346))
        );
    }

    #[test]
    fn missing_name_is_semantic_error() {
        let err = run_fresh("нет_такой").unwrap_err();
        assert_eq!(
            err.to_string(),
            "Семантическая ошибка: Переменная с именем \"нет_такой\" не найдена."
        );
    }

    // ── Arithmetic ─────────────────────────────────────────────────────

    #[test]
    fn binary_division_rounds() {
        assert_eq!(
            run_fresh("1.75 / 2.34").unwrap(),
            Some(Value::Float(0.74786))
        );
    }

    #[test]
    fn division_by_zero_gives_infinity_and_an_event() {
        let stream = formel_lexer::analyze("1.75 / 0.0").unwrap();
        let ast = formel_parser::parse(stream).unwrap();
        let mut watcher = Watcher::new();
        let result = evaluate(&ast, &mut Namespace::new(), &mut watcher).unwrap();

        assert_eq!(result, Some(Value::Float(f64::INFINITY)));
        assert!(watcher
            .history()
            .iter()
            .any(|event| matches!(event, Event::ZeroDivision { .. })));
    }

    #[test]
    fn mixed_operands_are_semantic_errors() {
        let err = run_fresh("'x' + 1").unwrap_err();
        assert!(matches!(err, Error::Semantic(_)));
        assert!(run_fresh("'1.75' / 0.1").is_err());
    }

    #[test]
    fn precedence_and_associativity() {
        assert_eq!(run_fresh("2 + 3 * 4").unwrap(), Some(Value::Int(14)));
        assert_eq!(run_fresh("2 ** 3 ** 2").unwrap(), Some(Value::Int(64)));
        assert_eq!(run_fresh("(2 + 3) * 4").unwrap(), Some(Value::Int(20)));
    }

    // ── Logic ──────────────────────────────────────────────────────────

    #[test]
    fn falsy_expressions() {
        for source in [
            "1 > 2",
            "2 >= 4",
            "3 + 1 < 6 - 9",
            "6 <= 2",
            "9 != 9",
            "9 != 9.0",
            "2 == 2 and 0 > 5",
            "0 or 0",
        ] {
            let result = run_fresh(source).unwrap();
            assert_eq!(result, Some(Value::Int(0)), "{source}");
        }
    }

    #[test]
    fn truthy_expressions() {
        for source in [
            "1 < 2",
            "2 <= 4",
            "3 + 1 > 6 - 9",
            "9 == 9",
            "9 == 9.0",
            "2 == 2 or 0 > 5",
            "1 and 1",
            "not 0",
            "not 0.0",
            "3 * 0.1 == 0.1 + 0.1 + 0.1",
            "0.1 == (0.1 + 0.1 + 0.1) / 3",
            "'test' == \"test\"",
        ] {
            let result = run_fresh(source).unwrap();
            assert_eq!(result, Some(Value::Int(1)), "{source}");
        }
    }

    // ── Assignment ─────────────────────────────────────────────────────

    #[test]
    fn assignments_mutate_the_namespace() {
        let mut namespace = Namespace::new();
        let result = run("x = 1; y = 2; z = x + y;", &mut namespace).unwrap();
        assert_eq!(result, None);
        assert_eq!(namespace.get(&mut (), "тест", "z"), Some(Value::Int(3)));
        assert_eq!(namespace.len(), 3);
    }

    #[test]
    fn assignment_refuses_type_changes() {
        let mut namespace = Namespace::new();
        run("x = 1;", &mut namespace).unwrap();
        let err = run("x = \"test\"", &mut namespace).unwrap_err();
        assert!(err.to_string().contains("Попытка изменения типа"));
        assert!(err.to_string().contains("<int>"));
        assert!(err.to_string().contains("<str>"));
    }

    #[test]
    fn numeric_assignments_may_change_width() {
        let mut namespace = Namespace::new();
        run("x = 1; x = 2.5;", &mut namespace).unwrap();
        assert_eq!(
            namespace.get(&mut (), "тест", "x"),
            Some(Value::Float(2.5))
        );
    }

    // ── Calls ──────────────────────────────────────────────────────────

    #[test]
    fn call_passes_arguments_in_order() {
        let mut namespace = Namespace::with_contents([(
            "ФОРМУЛА",
            Value::Func(FuncValue::new("<функция ФОРМУЛА>", |args: &[Value]| {
                let (Some(a), Some(b)) = (
                    args.first().and_then(Value::as_f64),
                    args.get(1).and_then(Value::as_f64),
                ) else {
                    return Err(Error::semantic("ФОРМУЛА: нужны два числа"));
                };
                Ok(Value::Float(a * b * b))
            })),
        )]);
        assert_eq!(
            run("ФОРМУЛА(3, 2.75)", &mut namespace).unwrap(),
            Some(Value::Float(22.6875))
        );
    }

    #[test]
    fn call_errors_name_the_callee() {
        let err = run_fresh("ОКРУГЛ(1)").unwrap_err();
        assert_eq!(
            err.to_string(),
            "Семантическая ошибка: Функция с названием \"ОКРУГЛ\" не найдена."
        );

        let mut namespace = Namespace::with_contents([("ОКРУГЛ", Value::Int(25))]);
        let err = run("ОКРУГЛ(1)", &mut namespace).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Семантическая ошибка: Объект с названием \"ОКРУГЛ\" не является вызываемым."
        );
    }

    #[test]
    fn builtin_calls_work_end_to_end() {
        let mut namespace = Namespace::with_builtins();
        assert_eq!(
            run("СУММ(1, 2, 3) + ABS(-5)", &mut namespace).unwrap(),
            Some(Value::Int(11))
        );
        assert_eq!(
            run("ОКРУГЛ(2.735, 2)", &mut namespace).unwrap(),
            Some(Value::Float(2.74))
        );
    }

    // ── Conditions ─────────────────────────────────────────────────────

    #[test]
    fn condition_dispatch_table() {
        let cases = [
            ("if(x==0){x=25}", 25),
            ("if(x>1){x=91}", 0),
            ("if(x!=1){x=55};if(x==55){x=18};", 18),
            ("if(x==1){x=100}else{x=55}", 55),
            ("if(x==0){x=100}else{x=55}", 100),
            ("if(x>=1){x=100}elif(x==0){x=17}else{x=55}", 17),
        ];
        for (source, expected) in cases {
            let mut namespace = Namespace::with_contents([("x", Value::Int(0))]);
            run(source, &mut namespace).unwrap();
            assert_eq!(
                namespace.get(&mut (), "тест", "x"),
                Some(Value::Int(expected)),
                "{source}"
            );
        }
    }

    #[test]
    fn nested_conditions_pick_the_inner_branch() {
        let mut namespace = Namespace::new();
        let source = "
        ЕСЛИ (1)
        {
            ЕСЛИ (0)
            {
                x = 1;
            }
            ИНАЧЕ
            {
                x = 2;
            };
        }
        ИНАЧЕ
        {
            x = 3;
        };
        ";
        run(source, &mut namespace).unwrap();
        assert_eq!(namespace.get(&mut (), "тест", "x"), Some(Value::Int(2)));
    }

    // ── Events ─────────────────────────────────────────────────────────

    #[test]
    fn watcher_report_covers_an_evaluation() {
        let stream = formel_lexer::analyze("x = 1; y = x + 2;").unwrap();
        let ast = formel_parser::parse(stream).unwrap();
        let mut watcher = Watcher::new();
        evaluate(&ast, &mut Namespace::new(), &mut watcher).unwrap();

        let report = watcher.make_report();
        assert!(report.stack.push >= 3);
        assert_eq!(report.stack.push, report.stack.pop);
        assert_eq!(report.namespace.assign, 2);
        assert_eq!(
            report.namespace.names,
            vec!["x".to_string(), "y".to_string()]
        );
    }
}
