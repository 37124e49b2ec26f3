use indexmap::IndexMap;
use serde::ser::{self, Serialize, SerializeMap, SerializeSeq, Serializer};
use std::borrow::Cow;
use std::fmt;
use std::ops::{Deref, Range};

use crate::error::*;

pub type List = Vec<Value>;
pub type Map = IndexMap<String, Value>;
pub type Span = Range<u32>;

#[derive(Debug)]
pub struct ErrorDetails {
    pub msg: Cow<'static, str>,
    pub span: Span,
}

impl ErrorDetails {
    pub fn new(msg: impl Into<Cow<'static, str>>, span: Span) -> Self {
        Self {
            msg: msg.into(),
            span,
        }
    }
}

impl fmt::Display for ErrorDetails {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "[{}..{}] {}", self.span.start, self.span.end, self.msg)
    }
}

/// Value annotated with the location it was read from. Used for configuration so errors can
/// point at the offending option.
#[derive(Clone, Debug, PartialEq)]
pub struct Spanned<T> {
    pub value: T,
    pub span: Span,
}

impl<T> Spanned<T> {
    pub fn new_error(&self, msg: impl Into<Cow<'static, str>>) -> Error {
        Error::new(ErrorId::Parse, ErrorDetails::new(msg, self.span.clone()))
    }
}

impl<T> From<T> for Spanned<T> {
    fn from(value: T) -> Self {
        Self {
            value,
            span: 0..0,
        }
    }
}

impl<T> Deref for Spanned<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        &self.value
    }
}

impl Spanned<Value> {
    pub fn as_str(&self) -> Result<&str> {
        self.as_string().map(|s| s.as_str())
    }

    /// Removes `key` from the map. The removed value inherits the span of the map.
    pub fn remove_opt(&mut self, key: &str) -> Result<Option<Spanned<Value>>> {
        let span = self.span.clone();
        match &mut self.value {
            Value::Map(v) => Ok(v.shift_remove(key).map(|value| Spanned { value, span })),
            v => Err(v.kind_error(ValueKind::Map, span)),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    List(List),
    Map(Map),
    String(String),
}

impl Value {
    pub fn kind(&self) -> ValueKind {
        use self::Value::*;
        match self {
            Null => ValueKind::Null,
            Bool(_) => ValueKind::Bool,
            Int(_) => ValueKind::Int,
            Float(_) => ValueKind::Float,
            List(_) => ValueKind::List,
            Map(_) => ValueKind::Map,
            String(_) => ValueKind::String,
        }
    }

    pub fn as_str(&self) -> Result<&str> {
        self.as_string().map(|s| s.as_str())
    }

    pub fn into_map(self) -> Result<Map> {
        match self {
            Value::Map(v) => Ok(v),
            v => Err(v.kind_error(ValueKind::Map, 0..0)),
        }
    }

    fn kind_error(&self, expected: ValueKind, span: Span) -> Error {
        ErrorDetails::new(format!("{:?} value expected but {:?} found", expected, self.kind()), span)
            .wrap_id(ErrorId::Parse)
    }
}

impl<'a> From<&'a str> for Value {
    fn from(v: &'a str) -> Self {
        v.to_owned().into()
    }
}

impl From<serde_json::Value> for Value {
    fn from(v: serde_json::Value) -> Self {
        use serde_json::Value as Json;
        match v {
            Json::Null => Value::Null,
            Json::Bool(v) => Value::Bool(v),
            // Integers that don't fit into i64 degrade to floats.
            Json::Number(v) => match v.as_i64() {
                Some(v) => Value::Int(v),
                None => v.as_f64().map(Value::Float).unwrap_or(Value::Null),
            },
            Json::String(v) => Value::String(v),
            Json::Array(v) => Value::List(v.into_iter().map(Value::from).collect()),
            Json::Object(v) => Value::Map(v.into_iter().map(|(k, v)| (k, Value::from(v))).collect()),
        }
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            Value::Null => serializer.serialize_unit(),
            Value::Bool(v) => serializer.serialize_bool(*v),
            Value::Int(v) => serializer.serialize_i64(*v),
            Value::Float(v) if v.is_finite() => serializer.serialize_f64(*v),
            Value::Float(v) => Err(ser::Error::custom(format!("can't serialize non-finite float {}", v))),
            Value::String(v) => serializer.serialize_str(v),
            Value::List(v) => {
                let mut seq = serializer.serialize_seq(Some(v.len()))?;
                for item in v {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            Value::Map(v) => {
                let mut map = serializer.serialize_map(Some(v.len()))?;
                for (k, v) in v {
                    map.serialize_entry(k, v)?;
                }
                map.end()
            }
        }
    }
}

/// Parses JSON text into a generic value.
pub fn parse_json(json: &str) -> Result<Value> {
    serde_json::from_str::<serde_json::Value>(json)
        .map(Value::from)
        .wrap_err_id(ErrorId::Parse)
}

/// Serializes value to JSON text, either compact or indented.
pub fn to_json(value: &Value, pretty: bool) -> Result<String> {
    let r = if pretty {
        serde_json::to_string_pretty(value)
    } else {
        serde_json::to_string(value)
    };
    r.wrap_err_id(ErrorId::Encode)
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ValueKind {
    Null,
    Bool,
    Int,
    Float,
    List,
    Map,
    String,
}

macro_rules! impl_from {
    ($($vari:ident($ty:ty);)+) => {$(
        impl From<$ty> for Value {
            fn from(v: $ty) -> Self {
                Value::$vari(v)
            }
        }
    )+}
}

impl_from! {
    Bool(bool);
    Int(i64);
    Float(f64);
    List(List);
    Map(Map);
    String(String);
}

/// Typed borrowing accessors. The `Spanned` flavor reports the span in the kind error.
macro_rules! impl_as {
    ($($vari:ident($ty:ty): $as_vari:ident;)+) => {$(
        impl Value {
            pub fn $as_vari(&self) -> Result<&$ty> {
                match self {
                    Value::$vari(v) => Ok(v),
                    v => Err(v.kind_error(ValueKind::$vari, 0..0)),
                }
            }
        }

        impl Spanned<Value> {
            pub fn $as_vari(&self) -> Result<&$ty> {
                match &self.value {
                    Value::$vari(v) => Ok(v),
                    v => Err(v.kind_error(ValueKind::$vari, self.span.clone())),
                }
            }
        }
    )+}
}

impl_as! {
    Bool(bool): as_bool;
    Map(Map): as_map;
    String(String): as_string;
}
