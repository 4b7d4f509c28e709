// used to print out readable forms of scalars and operators
use std::fmt;
// used when parsing an operator from its textual form
use std::str::FromStr;

use serde_json::Value;

use crate::error::ConfigurationError;

/// The closed set of values a key field or a filter can carry.
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    Int(i64),
    UInt(u64),
    Float(f64),
    Float32(f32),
    Text(String),
    Bool(bool),
}

impl Scalar {
    pub fn data_type(&self) -> &'static str {
        match self {
            Scalar::Int(_) => "i64",
            Scalar::UInt(_) => "u64",
            Scalar::Float(_) => "f64",
            Scalar::Float32(_) => "f32",
            Scalar::Text(_) => "String",
            Scalar::Bool(_) => "bool",
        }
    }

    /// Renders the scalar as a JSON literal for use inside a query expression.
    /// Non-finite floats have no JSON form and yield `None`.
    pub fn literal(&self) -> Option<String> {
        match self {
            Scalar::Int(i) => Some(i.to_string()),
            Scalar::UInt(u) => Some(u.to_string()),
            Scalar::Float(f) if f.is_finite() => Some(f.to_string()),
            // f32 is rendered from its own shortest form, widening first would add noise digits
            Scalar::Float32(f) if f.is_finite() => Some(f.to_string()),
            Scalar::Float(_) | Scalar::Float32(_) => None,
            Scalar::Text(s) => serde_json::to_string(s).ok(),
            Scalar::Bool(b) => Some(b.to_string()),
        }
    }

    /// Lifts a JSON value into a scalar, `None` for null, arrays and objects.
    pub fn from_json(value: &Value) -> Option<Scalar> {
        match value {
            Value::Bool(b) => Some(Scalar::Bool(*b)),
            Value::String(s) => Some(Scalar::Text(s.clone())),
            Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Some(Scalar::Int(i))
                } else if let Some(u) = n.as_u64() {
                    Some(Scalar::UInt(u))
                } else {
                    n.as_f64().map(Scalar::Float)
                }
            }
            Value::Null | Value::Array(_) | Value::Object(_) => None,
        }
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Scalar::Int(i) => write!(f, "{}", i),
            Scalar::UInt(u) => write!(f, "{}", u),
            Scalar::Float(x) => write!(f, "{}", x),
            Scalar::Float32(x) => write!(f, "{}", x),
            Scalar::Text(s) => f.write_str(&serde_json::to_string(s).map_err(|_| fmt::Error)?),
            Scalar::Bool(b) => write!(f, "{}", b),
        }
    }
}

macro_rules! scalar_from {
    ($($source:ty => $variant:ident as $target:ty),* $(,)?) => {
        $(
            impl From<$source> for Scalar {
                fn from(value: $source) -> Self {
                    Scalar::$variant(<$target>::from(value))
                }
            }
        )*
    };
}

scalar_from! {
    i8 => Int as i64,
    i16 => Int as i64,
    i32 => Int as i64,
    i64 => Int as i64,
    u8 => UInt as u64,
    u16 => UInt as u64,
    u32 => UInt as u64,
    u64 => UInt as u64,
    f64 => Float as f64,
    f32 => Float32 as f32,
    bool => Bool as bool,
    String => Text as String,
}

impl From<&str> for Scalar {
    fn from(value: &str) -> Self {
        Scalar::Text(value.to_owned())
    }
}

impl From<&String> for Scalar {
    fn from(value: &String) -> Self {
        Scalar::Text(value.clone())
    }
}

// ------------- Operator -------------
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

impl Operator {
    pub fn symbol(&self) -> &'static str {
        match self {
            Operator::Eq => "==",
            Operator::Ne => "!=",
            Operator::Lt => "<",
            Operator::Le => "<=",
            Operator::Gt => ">",
            Operator::Ge => ">=",
        }
    }
    pub fn is_ordering(&self) -> bool {
        matches!(self, Operator::Lt | Operator::Le | Operator::Gt | Operator::Ge)
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

impl FromStr for Operator {
    type Err = ConfigurationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "=" | "==" => Ok(Operator::Eq),
            "!=" => Ok(Operator::Ne),
            "<" => Ok(Operator::Lt),
            "<=" => Ok(Operator::Le),
            ">" => Ok(Operator::Gt),
            ">=" => Ok(Operator::Ge),
            other => Err(ConfigurationError::UnsupportedOperator(other.to_string())),
        }
    }
}
