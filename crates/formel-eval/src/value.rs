use std::fmt;
use std::rc::Rc;

use formel_common::Result;

/// A runtime value: what variables hold and expressions produce.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Int(i64),
    Float(f64),
    Str(String),
    Func(FuncValue),
}

impl Value {
    /// Short tag used in type-mismatch messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Int(_) => "int",
            Self::Float(_) => "float",
            Self::Str(_) => "str",
            Self::Func(_) => "func",
        }
    }

    /// Whether the value is an integer or a float.
    pub fn is_numeric(&self) -> bool {
        matches!(self, Self::Int(_) | Self::Float(_))
    }

    /// Truthiness: zero and the empty string are false, everything
    /// else (functions included) is true.
    pub fn is_truthy(&self) -> bool {
        match self {
            Self::Int(v) => *v != 0,
            Self::Float(v) => *v != 0.0,
            Self::Str(s) => !s.is_empty(),
            Self::Func(_) => true,
        }
    }

    /// The numeric value widened to a float, if there is one.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Int(v) => Some(*v as f64),
            Self::Float(v) => Some(*v),
            _ => None,
        }
    }

    /// Whether the value is numeric zero.
    pub fn is_zero(&self) -> bool {
        match self {
            Self::Int(v) => *v == 0,
            Self::Float(v) => *v == 0.0,
            _ => false,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(v) => write!(f, "{v}"),
            // Whole floats keep their decimal point so they stay
            // distinguishable from integers in string form.
            Self::Float(v) if v.is_finite() && v.fract() == 0.0 => {
                write!(f, "{v:.1}")
            }
            Self::Float(v) => write!(f, "{v}"),
            Self::Str(s) => write!(f, "{s}"),
            Self::Func(func) => write!(f, "{}", func.repr()),
        }
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Self::Str(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Self::Str(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Self::Int(i64::from(v))
    }
}

/// A callable value: the implementation plus the display string it
/// hides behind, so a built-in prints as `<функция ИМЯ>` rather than
/// anything about its internals.
#[derive(Clone)]
pub struct FuncValue {
    repr: String,
    func: Rc<dyn Fn(&[Value]) -> Result<Value>>,
}

impl FuncValue {
    /// Wrap a callable together with its display string.
    pub fn new(
        repr: impl Into<String>,
        func: impl Fn(&[Value]) -> Result<Value> + 'static,
    ) -> Self {
        Self {
            repr: repr.into(),
            func: Rc::new(func),
        }
    }

    /// Invoke the wrapped callable with positional arguments.
    pub fn call(&self, args: &[Value]) -> Result<Value> {
        (self.func)(args)
    }

    /// The masked display string.
    pub fn repr(&self) -> &str {
        &self.repr
    }
}

impl fmt::Debug for FuncValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.repr)
    }
}

impl PartialEq for FuncValue {
    fn eq(&self, other: &Self) -> bool {
        self.repr == other.repr
    }
}
