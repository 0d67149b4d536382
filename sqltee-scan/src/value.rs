//! Values bound to query parameters.

use std::fmt;

use chrono::{DateTime, FixedOffset, Utc};

/// A value bound to a query parameter or read back into a row buffer.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Null value.
    Null,
    /// Boolean value.
    Bool(bool),
    /// Signed integer value.
    Int(i64),
    /// Unsigned integer value.
    UInt(u64),
    /// Single precision float.
    Float32(f32),
    /// Double precision float.
    Float(f64),
    /// Raw bytes.
    Bytes(Vec<u8>),
    /// Text value.
    String(String),
    /// Instant in time.
    Timestamp(DateTime<Utc>),
    /// JSON document.
    Json(serde_json::Value),
    /// List of values.
    List(Vec<Value>),
}

/// The kind of a [`Value`], without its payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    Null,
    Bool,
    Int,
    UInt,
    Float32,
    Float,
    Bytes,
    String,
    Timestamp,
    Json,
    List,
}

impl ValueKind {
    /// Lowercase name of the kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool => "bool",
            Self::Int => "int",
            Self::UInt => "uint",
            Self::Float32 => "float32",
            Self::Float => "float",
            Self::Bytes => "bytes",
            Self::String => "string",
            Self::Timestamp => "timestamp",
            Self::Json => "json",
            Self::List => "list",
        }
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Value {
    /// Check if this is a null value.
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Get the kind of this value.
    pub fn kind(&self) -> ValueKind {
        match self {
            Self::Null => ValueKind::Null,
            Self::Bool(_) => ValueKind::Bool,
            Self::Int(_) => ValueKind::Int,
            Self::UInt(_) => ValueKind::UInt,
            Self::Float32(_) => ValueKind::Float32,
            Self::Float(_) => ValueKind::Float,
            Self::Bytes(_) => ValueKind::Bytes,
            Self::String(_) => ValueKind::String,
            Self::Timestamp(_) => ValueKind::Timestamp,
            Self::Json(_) => ValueKind::Json,
            Self::List(_) => ValueKind::List,
        }
    }

    /// Build a list value from anything convertible into values.
    pub fn list<I, T>(items: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<Value>,
    {
        Self::List(items.into_iter().map(Into::into).collect())
    }
}

/// Raw rendering used for argument lists and row buffers in log records.
///
/// This is not SQL: strings are unquoted and bytes are bare hex.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.write_str("NULL"),
            Self::Bool(v) => write!(f, "{}", v),
            Self::Int(v) => write!(f, "{}", v),
            Self::UInt(v) => write!(f, "{}", v),
            Self::Float32(v) => write!(f, "{}", v),
            Self::Float(v) => write!(f, "{}", v),
            Self::Bytes(v) => write!(f, "\\x{}", hex::encode(v)),
            Self::String(v) => f.write_str(v),
            Self::Timestamp(v) => {
                f.write_str(&v.to_rfc3339_opts(chrono::SecondsFormat::AutoSi, true))
            }
            Self::Json(v) => write!(f, "{}", v),
            Self::List(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                f.write_str("]")
            }
        }
    }
}

macro_rules! impl_from_signed {
    ($($t:ty),*) => {
        $(
            impl From<$t> for Value {
                fn from(v: $t) -> Self {
                    Self::Int(v as i64)
                }
            }
        )*
    };
}

macro_rules! impl_from_unsigned {
    ($($t:ty),*) => {
        $(
            impl From<$t> for Value {
                fn from(v: $t) -> Self {
                    Self::UInt(v as u64)
                }
            }
        )*
    };
}

impl_from_signed!(i8, i16, i32, i64, isize);
impl_from_unsigned!(u8, u16, u32, u64, usize);

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<f32> for Value {
    fn from(v: f32) -> Self {
        Self::Float32(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Self::String(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Self::String(v.to_string())
    }
}

impl From<Vec<u8>> for Value {
    fn from(v: Vec<u8>) -> Self {
        Self::Bytes(v)
    }
}

impl From<&[u8]> for Value {
    fn from(v: &[u8]) -> Self {
        Self::Bytes(v.to_vec())
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(v: DateTime<Utc>) -> Self {
        Self::Timestamp(v)
    }
}

impl From<DateTime<FixedOffset>> for Value {
    fn from(v: DateTime<FixedOffset>) -> Self {
        Self::Timestamp(v.with_timezone(&Utc))
    }
}

impl From<serde_json::Value> for Value {
    fn from(v: serde_json::Value) -> Self {
        Self::Json(v)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        match v {
            Some(v) => v.into(),
            None => Self::Null,
        }
    }
}

/// A parameter bound by name or position, as passed to context-aware calls.
#[derive(Debug, Clone, PartialEq)]
pub struct NamedValue {
    /// Parameter name, `None` (or empty) for positional parameters.
    pub name: Option<String>,
    /// 1-based position of the parameter.
    pub ordinal: usize,
    /// The bound value.
    pub value: Value,
}

impl NamedValue {
    /// Create a positional parameter.
    pub fn positional(ordinal: usize, value: impl Into<Value>) -> Self {
        Self {
            name: None,
            ordinal,
            value: value.into(),
        }
    }

    /// Create a named parameter.
    pub fn named(name: impl Into<String>, ordinal: usize, value: impl Into<Value>) -> Self {
        Self {
            name: Some(name.into()),
            ordinal,
            value: value.into(),
        }
    }

    /// Whether the parameter carries a non-empty name.
    pub fn is_named(&self) -> bool {
        self.name().is_some()
    }

    /// The parameter name, if it has a non-empty one.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref().filter(|n| !n.is_empty())
    }

    /// Number a list of values as positional parameters.
    pub fn from_values<I, T>(values: I) -> Vec<NamedValue>
    where
        I: IntoIterator<Item = T>,
        T: Into<Value>,
    {
        values
            .into_iter()
            .enumerate()
            .map(|(i, v)| Self::positional(i + 1, v))
            .collect()
    }
}

impl fmt::Display for NamedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            Some(name) => write!(f, ":{}={}", name, self.value),
            None => write!(f, "${}={}", self.ordinal, self.value),
        }
    }
}

/// The parameters bound to a single call.
///
/// A call binds either plain positional values or named values, never both.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub enum Args<'a> {
    /// No parameters.
    #[default]
    None,
    /// Positional values; ordinals are implied by position.
    Values(&'a [Value]),
    /// Named (or explicitly numbered) values.
    Named(&'a [NamedValue]),
}

impl<'a> Args<'a> {
    /// Number of bound parameters.
    pub fn len(&self) -> usize {
        match self {
            Self::None => 0,
            Self::Values(v) => v.len(),
            Self::Named(v) => v.len(),
        }
    }

    /// Whether no parameters are bound.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<'a> From<&'a [Value]> for Args<'a> {
    fn from(v: &'a [Value]) -> Self {
        Self::Values(v)
    }
}

impl<'a> From<&'a [NamedValue]> for Args<'a> {
    fn from(v: &'a [NamedValue]) -> Self {
        Self::Named(v)
    }
}

impl fmt::Display for Args<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn list<T: fmt::Display>(f: &mut fmt::Formatter<'_>, items: &[T]) -> fmt::Result {
            f.write_str("[")?;
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    f.write_str(" ")?;
                }
                write!(f, "{}", item)?;
            }
            f.write_str("]")
        }

        match self {
            Self::None => f.write_str("[]"),
            Self::Values(v) => list(f, v),
            Self::Named(v) => list(f, v),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_from_integers() {
        assert_eq!(Value::from(7i32), Value::Int(7));
        assert_eq!(Value::from(-3i8), Value::Int(-3));
        assert_eq!(Value::from(9u16), Value::UInt(9));
        assert_eq!(Value::from(usize::MAX), Value::UInt(usize::MAX as u64));
    }

    #[test]
    fn test_from_option() {
        assert_eq!(Value::from(None::<i32>), Value::Null);
        assert_eq!(Value::from(Some("a")), Value::String("a".into()));
    }

    #[test]
    fn test_from_fixed_offset_is_utc() {
        let t = FixedOffset::east_opt(3600)
            .unwrap()
            .with_ymd_and_hms(2020, 11, 21, 14, 56, 42)
            .unwrap();
        let expected = Utc.with_ymd_and_hms(2020, 11, 21, 13, 56, 42).unwrap();
        assert_eq!(Value::from(t), Value::Timestamp(expected));
    }

    #[test]
    fn test_kind() {
        assert_eq!(Value::Json(serde_json::json!({})).kind(), ValueKind::Json);
        assert_eq!(Value::list([1, 2]).kind(), ValueKind::List);
        assert_eq!(ValueKind::Bytes.to_string(), "bytes");
    }

    #[test]
    fn test_named_value_name() {
        assert!(!NamedValue::positional(1, 1).is_named());
        assert!(!NamedValue::named("", 1, 1).is_named());
        assert_eq!(NamedValue::named("id", 1, 1).name(), Some("id"));
    }

    #[test]
    fn test_from_values_numbers_from_one() {
        let nv = NamedValue::from_values([10, 20]);
        assert_eq!(nv[0].ordinal, 1);
        assert_eq!(nv[1].ordinal, 2);
        assert_eq!(nv[1].value, Value::Int(20));
    }

    #[test]
    fn test_args_display() {
        let values = [Value::Int(42), Value::from("foo")];
        assert_eq!(Args::Values(&values).to_string(), "[42 foo]");

        let named = [NamedValue::positional(1, 42), NamedValue::named("name", 2, "foo")];
        assert_eq!(Args::Named(&named).to_string(), "[$1=42 :name=foo]");
        assert_eq!(Args::None.to_string(), "[]");
    }
}
