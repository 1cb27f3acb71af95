//! Binding values and the `NO_CHANGE` sentinel.

use std::any::Any;
use std::fmt;
use std::rc::Rc;

/// A value flowing through a binding.
///
/// Equality follows strict identity: strings compare by content, objects by
/// pointer.
#[derive(Clone, Default)]
pub enum Value {
    #[default]
    Undefined,
    Null,
    Bool(bool),
    Number(f64),
    String(Rc<str>),
    Object(Rc<dyn Any>),
}

impl Value {
    pub fn is_nullish(&self) -> bool {
        matches!(self, Value::Undefined | Value::Null)
    }

    fn is_nan(&self) -> bool {
        matches!(self, Value::Number(n) if n.is_nan())
    }

    fn strict_equals(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Undefined, Value::Undefined) | (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Number(a), Value::Number(b)) => a == b,
            (Value::String(a), Value::String(b)) => Rc::ptr_eq(a, b) || a == b,
            (Value::Object(a), Value::Object(b)) => std::ptr::addr_eq(Rc::as_ptr(a), Rc::as_ptr(b)),
            _ => false,
        }
    }

    /// JavaScript-style truthiness, used by class bindings.
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Undefined | Value::Null => false,
            Value::Bool(b) => *b,
            Value::Number(n) => *n != 0.0 && !n.is_nan(),
            Value::String(s) => !s.is_empty(),
            Value::Object(_) => true,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn downcast_ref<T: 'static>(&self) -> Option<&T> {
        match self {
            Value::Object(obj) => obj.downcast_ref::<T>(),
            _ => None,
        }
    }
}

/// "Changed" means neither strictly equal nor both `NaN`.
pub fn is_different(a: &Value, b: &Value) -> bool {
    !a.strict_equals(b) && !(a.is_nan() && b.is_nan())
}

/// Renders a value the way text and interpolation bindings display it.
/// `null`/`undefined` render as the empty string.
pub fn stringify(value: &Value) -> String {
    match value {
        Value::Undefined | Value::Null => String::new(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => stringify_number(*n),
        Value::String(s) => s.to_string(),
        Value::Object(_) => "[object Object]".to_string(),
    }
}

fn stringify_number(n: f64) -> String {
    if n.is_nan() {
        "NaN".to_string()
    } else if n.is_infinite() {
        let sign = if n > 0.0 { "" } else { "-" };
        format!("{}Infinity", sign)
    } else if n == 0.0 {
        // Also covers -0.
        "0".to_string()
    } else if n.abs() >= 1e21 || n.abs() < 1e-6 {
        let exponential = format!("{:e}", n);
        match exponential.split_once('e') {
            Some((mantissa, exponent)) if !exponent.starts_with('-') => format!("{}e+{}", mantissa, exponent),
            _ => exponential,
        }
    } else {
        format!("{}", n)
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        self.strict_equals(other)
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Undefined => write!(f, "undefined"),
            Value::Null => write!(f, "null"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Number(n) => write!(f, "{}", stringify_number(*n)),
            Value::String(s) => write!(f, "{:?}", s),
            Value::Object(obj) => write!(f, "Object({:p})", Rc::as_ptr(obj)),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&stringify(self))
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(Rc::from(value))
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::String(Rc::from(value))
    }
}

impl From<Rc<str>> for Value {
    fn from(value: Rc<str>) -> Self {
        Value::String(value)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Number(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Number(f64::from(value))
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Value::Null, Into::into)
    }
}

/// Result of a binding instruction, or an argument to one.
///
/// `NoChange` tells downstream instructions to skip their side effect; as
/// an interpolation argument it means "reuse the stored value".
#[derive(Debug, Clone, PartialEq)]
pub enum Bound<T = Value> {
    Value(T),
    NoChange,
}

pub const NO_CHANGE: Bound = Bound::NoChange;

impl<T> Bound<T> {
    pub fn is_no_change(&self) -> bool {
        matches!(self, Bound::NoChange)
    }

    pub fn changed(self) -> Option<T> {
        match self {
            Bound::Value(value) => Some(value),
            Bound::NoChange => None,
        }
    }
}

impl From<Value> for Bound {
    fn from(value: Value) -> Self {
        Bound::Value(value)
    }
}

macro_rules! bound_from {
    ($($ty:ty),*) => {
        $(impl From<$ty> for Bound {
            fn from(value: $ty) -> Self {
                Bound::Value(Value::from(value))
            }
        })*
    };
}

bound_from!(&str, String, Rc<str>, bool, f64, i32);
