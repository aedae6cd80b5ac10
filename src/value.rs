use std::fmt;

/// Column or parameter value.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    Null,
    Integer(i64),
    UInteger(u64),
    Float(f64),
    Text(String),
    Bytes(Vec<u8>),
}

impl Value {
    pub fn null() -> Self {
        Self::Null
    }

    pub fn integer(value: i64) -> Self {
        Self::Integer(value)
    }

    pub fn float(value: f64) -> Self {
        Self::Float(value)
    }

    pub fn text(value: impl Into<String>) -> Self {
        Self::Text(value.into())
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Renders the value as an SQL literal, used when logging statements.
    pub fn to_sql_literal(&self) -> String {
        match self {
            Self::Null => "NULL".to_owned(),
            Self::Integer(value) => value.to_string(),
            Self::UInteger(value) => value.to_string(),
            Self::Float(value) => value.to_string(),
            Self::Text(value) => format!("'{}'", value.replace('\'', "''")),
            Self::Bytes(bytes) => {
                let hex: String = bytes.iter().map(|b| format!("{b:02x}")).collect();
                format!("x'{hex}'")
            }
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.write_str("NULL"),
            Self::Integer(value) => write!(f, "{value}"),
            Self::UInteger(value) => write!(f, "{value}"),
            Self::Float(value) => write!(f, "{value}"),
            Self::Text(value) => f.write_str(value),
            Self::Bytes(bytes) => f.write_str(&String::from_utf8_lossy(bytes)),
        }
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::Text(value.to_owned())
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Self::Integer(value.into())
    }
}

impl From<u64> for Value {
    fn from(value: u64) -> Self {
        Self::UInteger(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<Vec<u8>> for Value {
    fn from(value: Vec<u8>) -> Self {
        Self::Bytes(value)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}

/// Conversion failure of a single column value into a destination type.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConvertError(pub String);

impl fmt::Display for ConvertError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Destination type a column value can be assigned into.
///
/// Non-`Option` destinations reject `NULL`, the same way a text or numeric
/// field of a status record cannot hold an inapplicable metric.
pub trait FromValue: Sized {
    fn from_value(value: &Value) -> Result<Self, ConvertError>;
}

fn null_into(target: &str) -> ConvertError {
    ConvertError(format!("converting NULL to {target} is unsupported"))
}

fn text_of(value: &Value) -> Option<std::borrow::Cow<'_, str>> {
    match value {
        Value::Text(text) => Some(std::borrow::Cow::Borrowed(text.as_str())),
        Value::Bytes(bytes) => Some(String::from_utf8_lossy(bytes)),
        _ => None,
    }
}

impl FromValue for String {
    fn from_value(value: &Value) -> Result<Self, ConvertError> {
        match value {
            Value::Null => Err(null_into("string")),
            other => Ok(other.to_string()),
        }
    }
}

macro_rules! integer_from_value {
    ($($ty:ty => $name:literal),+ $(,)?) => {
        $(
            impl FromValue for $ty {
                fn from_value(value: &Value) -> Result<Self, ConvertError> {
                    let out_of_range =
                        || ConvertError(format!("value {value} out of range for {}", $name));
                    match value {
                        Value::Null => Err(null_into($name)),
                        Value::Integer(v) => <$ty>::try_from(*v).map_err(|_| out_of_range()),
                        Value::UInteger(v) => <$ty>::try_from(*v).map_err(|_| out_of_range()),
                        Value::Float(v) => Err(ConvertError(format!(
                            "converting float {v} to {} is unsupported",
                            $name
                        ))),
                        other => {
                            let text = text_of(other).unwrap_or_default();
                            text.trim().parse::<$ty>().map_err(|err| {
                                ConvertError(format!(
                                    "converting {text:?} to a {}: {err}",
                                    $name
                                ))
                            })
                        }
                    }
                }
            }
        )+
    };
}

integer_from_value!(i32 => "int32", i64 => "int64", u32 => "uint32", u64 => "uint64");

impl FromValue for f64 {
    fn from_value(value: &Value) -> Result<Self, ConvertError> {
        match value {
            Value::Null => Err(null_into("float64")),
            Value::Integer(v) => Ok(*v as f64),
            Value::UInteger(v) => Ok(*v as f64),
            Value::Float(v) => Ok(*v),
            other => {
                let text = text_of(other).unwrap_or_default();
                text.trim().parse::<f64>().map_err(|err| {
                    ConvertError(format!("converting {text:?} to a float64: {err}"))
                })
            }
        }
    }
}

impl<T: FromValue> FromValue for Option<T> {
    fn from_value(value: &Value) -> Result<Self, ConvertError> {
        match value {
            Value::Null => Ok(None),
            other => T::from_value(other).map(Some),
        }
    }
}
