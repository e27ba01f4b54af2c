//! Rows and scalars. Pure data; no CSV dependency here.
//!
//! A `Row` is an ordered list of fields. Each field may carry a name; a row is
//! *keyed* when its names say something beyond the field's position, and
//! *positional* otherwise. Names `"0"`, `"1"`, ... in order are positional.

use std::borrow::Cow;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{Error, Result};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Scalar {
    Null,
    Bool(bool),
    I32(i32),
    I64(i64),
    F32(f32),
    F64(f64),
    Str(String),
}

impl Scalar {
    /// Text written into the CSV cell. `Null` is the empty string.
    pub fn as_field(&self) -> Cow<'_, str> {
        match self {
            Scalar::Null => Cow::Borrowed(""),
            Scalar::Bool(b) => Cow::Borrowed(if *b { "true" } else { "false" }),
            Scalar::I32(i) => Cow::Owned(i.to_string()),
            Scalar::I64(i) => Cow::Owned(i.to_string()),
            Scalar::F32(f) => Cow::Owned(f.to_string()),
            Scalar::F64(f) => Cow::Owned(f.to_string()),
            Scalar::Str(s) => Cow::Borrowed(s.as_str()),
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Scalar::Null)
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_field())
    }
}

impl From<bool> for Scalar {
    fn from(v: bool) -> Self {
        Scalar::Bool(v)
    }
}

impl From<i32> for Scalar {
    fn from(v: i32) -> Self {
        Scalar::I32(v)
    }
}

impl From<i64> for Scalar {
    fn from(v: i64) -> Self {
        Scalar::I64(v)
    }
}

impl From<u32> for Scalar {
    fn from(v: u32) -> Self {
        Scalar::I64(i64::from(v))
    }
}

impl From<f32> for Scalar {
    fn from(v: f32) -> Self {
        Scalar::F32(v)
    }
}

impl From<f64> for Scalar {
    fn from(v: f64) -> Self {
        Scalar::F64(v)
    }
}

impl From<&str> for Scalar {
    fn from(v: &str) -> Self {
        Scalar::Str(v.to_string())
    }
}

impl From<String> for Scalar {
    fn from(v: String) -> Self {
        Scalar::Str(v)
    }
}

impl<T: Into<Scalar>> From<Option<T>> for Scalar {
    fn from(v: Option<T>) -> Self {
        v.map_or(Scalar::Null, Into::into)
    }
}

impl From<&Value> for Scalar {
    /// Arrays and objects are not scalars; they are kept as compact JSON text.
    fn from(v: &Value) -> Self {
        match v {
            Value::Null => Scalar::Null,
            Value::Bool(b) => Scalar::Bool(*b),
            Value::Number(n) => match n.as_i64() {
                Some(i) => Scalar::I64(i),
                None => n.as_f64().map_or_else(|| Scalar::Str(n.to_string()), Scalar::F64),
            },
            Value::String(s) => Scalar::Str(s.clone()),
            Value::Array(_) | Value::Object(_) => Scalar::Str(v.to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RowField {
    pub name: Option<String>,
    pub value: Scalar,
}

/// One record destined for a CSV file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Row {
    fields: Vec<RowField>,
}

impl Row {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a row whose fields carry no names.
    pub fn positional<I, V>(values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Scalar>,
    {
        Self {
            fields: values
                .into_iter()
                .map(|v| RowField {
                    name: None,
                    value: v.into(),
                })
                .collect(),
        }
    }

    /// Build a row from `(name, value)` pairs, keeping their order.
    pub fn keyed<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Scalar>,
    {
        Self {
            fields: pairs
                .into_iter()
                .map(|(k, v)| RowField {
                    name: Some(k.into()),
                    value: v.into(),
                })
                .collect(),
        }
    }

    /// Build a row from a JSON object (keyed) or array (positional).
    pub fn from_json(value: &Value) -> Result<Self> {
        match value {
            Value::Object(map) => Ok(Self::keyed(
                map.iter().map(|(k, v)| (k.clone(), Scalar::from(v))),
            )),
            Value::Array(items) => Ok(Self::positional(items.iter().map(Scalar::from))),
            other => Err(Error::Row(format!(
                "expected a JSON object or array, got {}",
                json_kind(other)
            ))),
        }
    }

    pub fn push(&mut self, value: impl Into<Scalar>) -> &mut Self {
        self.fields.push(RowField {
            name: None,
            value: value.into(),
        });
        self
    }

    pub fn push_named(&mut self, name: impl Into<String>, value: impl Into<Scalar>) -> &mut Self {
        self.fields.push(RowField {
            name: Some(name.into()),
            value: value.into(),
        });
        self
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn fields(&self) -> &[RowField] {
        &self.fields
    }

    /// A row is positional when every name is absent or equals its index.
    pub fn is_positional(&self) -> bool {
        self.fields.iter().enumerate().all(|(i, f)| match &f.name {
            None => true,
            Some(name) => is_index_name(name, i),
        })
    }

    pub fn is_keyed(&self) -> bool {
        !self.is_positional()
    }

    /// Header labels in field order; unnamed fields are labeled by position.
    pub fn names(&self) -> impl Iterator<Item = Cow<'_, str>> + '_ {
        self.fields.iter().enumerate().map(|(i, f)| match &f.name {
            Some(name) => Cow::Borrowed(name.as_str()),
            None => Cow::Owned(i.to_string()),
        })
    }

    pub fn values(&self) -> impl Iterator<Item = &Scalar> + '_ {
        self.fields.iter().map(|f| &f.value)
    }

    /// Value of the first field called `name`.
    pub fn get(&self, name: &str) -> Option<&Scalar> {
        self.fields
            .iter()
            .find(|f| f.name.as_deref() == Some(name))
            .map(|f| &f.value)
    }
}

impl<V: Into<Scalar>> FromIterator<V> for Row {
    fn from_iter<I: IntoIterator<Item = V>>(iter: I) -> Self {
        Self::positional(iter)
    }
}

fn is_index_name(name: &str, index: usize) -> bool {
    // "01" or "+1" are names, not indices
    name == index.to_string()
}

fn json_kind(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
