//! Value - a dynamically typed key/value for loosely typed binding stacks.
//!
//! Most users bind concrete Rust types (`BindingStack<&str, i64>` and the
//! like). `Value` covers the loosely typed case where keys and values share
//! one type, where the "none" value of an empty scope is needed, and where
//! inputs to the bulk editors may be malformed at runtime.
//!
//! Floats are wrapped in `OrderedFloat` so `Value` is `Eq + Hash` and can be
//! used as a map key by `all_variables`.

use std::fmt;

use ordered_float::OrderedFloat;

use crate::key::DefaultKey;

/// A dynamically typed value.
#[derive(Clone, PartialEq, Eq, Hash, Default)]
pub enum Value {
    /// The absent value.
    #[default]
    Nil,
    /// Boolean.
    Bool(bool),
    /// Integer (any integer type stored as i64).
    Int(i64),
    /// Floating point (uses OrderedFloat for hashing).
    Float(OrderedFloat<f64>),
    /// String.
    Str(String),
    /// Interned-style name, printed as `:name`.
    Symbol(String),
    /// Ordered list of values.
    List(Vec<Value>),
}

impl Value {
    /// Create an integer value.
    #[inline]
    pub fn int(v: i64) -> Self {
        Value::Int(v)
    }

    /// Create a float value.
    #[inline]
    pub fn float(v: f64) -> Self {
        Value::Float(OrderedFloat(v))
    }

    /// Create a string value.
    #[inline]
    pub fn str(v: impl Into<String>) -> Self {
        Value::Str(v.into())
    }

    /// Create a symbol.
    #[inline]
    pub fn sym(name: impl Into<String>) -> Self {
        Value::Symbol(name.into())
    }

    /// Create a list.
    #[inline]
    pub fn list(items: impl IntoIterator<Item = Value>) -> Self {
        Value::List(items.into_iter().collect())
    }

    /// Create a two-element list `[key, value]`.
    #[inline]
    pub fn pair(key: impl Into<Value>, value: impl Into<Value>) -> Self {
        Value::List(vec![key.into(), value.into()])
    }

    /// Returns true for `Nil`.
    #[inline]
    pub fn is_nil(&self) -> bool {
        matches!(self, Value::Nil)
    }

    /// Borrow the elements if this is a list.
    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    /// Borrow both halves if this is a two-element list.
    pub fn as_pair(&self) -> Option<(&Value, &Value)> {
        match self.as_list() {
            Some([key, value]) => Some((key, value)),
            _ => None,
        }
    }

    /// Name of the variant, used in error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Nil => "Nil",
            Value::Bool(_) => "Bool",
            Value::Int(_) => "Int",
            Value::Float(_) => "Float",
            Value::Str(_) => "Str",
            Value::Symbol(_) => "Symbol",
            Value::List(_) => "List",
        }
    }
}

impl DefaultKey for Value {
    fn default_key() -> Self {
        Value::sym("value")
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Nil => f.write_str("nil"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Int(i) => write!(f, "{i}"),
            Value::Float(v) => write!(f, "{}", v.0),
            Value::Str(s) => write!(f, "{s:?}"),
            Value::Symbol(s) => write!(f, ":{s}"),
            Value::List(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str("]")
            }
        }
    }
}

// Debug mirrors Display so error messages read `unbound variable :z`.
impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

impl From<()> for Value {
    fn from(_: ()) -> Self {
        Value::Nil
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(v as i64)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::float(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Str(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Str(v)
    }
}

impl From<Vec<Value>> for Value {
    fn from(v: Vec<Value>) -> Self {
        Value::List(v)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Nil, Into::into)
    }
}
