use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValueError {
    /// Two values compared unequal; the message describes where
    #[error("values differ: {0}")]
    Mismatch(String),

    #[error("expected {expected}, got {got}")]
    WrongType { expected: &'static str, got: &'static str },
}

/// A value produced or consumed by a function node
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Value {
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    List(Vec<Value>),
    Struct(Record),
}

/// Named fields in declaration order
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Record {
    fields: Vec<(String, Value)>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a field, replacing any existing field of the same name in place
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set(name, value);
        self
    }

    pub fn set(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        let name = name.into();
        let value = value.into();
        match self.fields.iter_mut().find(|(n, _)| *n == name) {
            Some((_, slot)) => *slot = value,
            None => self.fields.push((name, value)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields.iter().map(|(n, v)| (n.as_str(), v))
    }

    /// Compare field by field, in order
    pub fn cmp(&self, other: &Record) -> Result<(), ValueError> {
        if self.fields.len() != other.fields.len() {
            return Err(ValueError::Mismatch(format!(
                "struct field count {} != {}",
                self.fields.len(),
                other.fields.len()
            )));
        }
        for ((a_name, a), (b_name, b)) in self.fields.iter().zip(&other.fields) {
            if a_name != b_name {
                return Err(ValueError::Mismatch(format!(
                    "struct field `{}` != `{}`",
                    a_name, b_name
                )));
            }
            a.cmp(b).map_err(|e| match e {
                ValueError::Mismatch(msg) => {
                    ValueError::Mismatch(format!("field `{}`: {}", a_name, msg))
                }
                other => other,
            })?;
        }
        Ok(())
    }
}

impl PartialEq for Record {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other).is_ok()
    }
}

impl Value {
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Str(_) => "str",
            Value::List(_) => "list",
            Value::Struct(_) => "struct",
        }
    }

    /// Deep equality. `Ok(())` when equal, otherwise a description of the
    /// first difference found.
    pub fn cmp(&self, other: &Value) -> Result<(), ValueError> {
        match (self, other) {
            (Value::Bool(a), Value::Bool(b)) if a == b => Ok(()),
            (Value::Int(a), Value::Int(b)) if a == b => Ok(()),
            // NaN compares equal to itself so a NaN result is not re-emitted forever
            (Value::Float(a), Value::Float(b)) if a == b || (a.is_nan() && b.is_nan()) => Ok(()),
            (Value::Str(a), Value::Str(b)) if a == b => Ok(()),
            (Value::List(a), Value::List(b)) => {
                if a.len() != b.len() {
                    return Err(ValueError::Mismatch(format!(
                        "list length {} != {}",
                        a.len(),
                        b.len()
                    )));
                }
                for (i, (x, y)) in a.iter().zip(b).enumerate() {
                    x.cmp(y).map_err(|e| match e {
                        ValueError::Mismatch(msg) => {
                            ValueError::Mismatch(format!("index {}: {}", i, msg))
                        }
                        other => other,
                    })?;
                }
                Ok(())
            }
            (Value::Struct(a), Value::Struct(b)) => a.cmp(b),
            (a, b) if a.kind() != b.kind() => Err(ValueError::Mismatch(format!(
                "kind {} != {}",
                a.kind(),
                b.kind()
            ))),
            (a, b) => Err(ValueError::Mismatch(format!("{} != {}", a, b))),
        }
    }

    pub fn as_bool(&self) -> Result<bool, ValueError> {
        match self {
            Value::Bool(b) => Ok(*b),
            other => Err(other.wrong_type("bool")),
        }
    }

    pub fn as_int(&self) -> Result<i64, ValueError> {
        match self {
            Value::Int(i) => Ok(*i),
            other => Err(other.wrong_type("int")),
        }
    }

    pub fn as_float(&self) -> Result<f64, ValueError> {
        match self {
            Value::Float(f) => Ok(*f),
            other => Err(other.wrong_type("float")),
        }
    }

    pub fn as_str(&self) -> Result<&str, ValueError> {
        match self {
            Value::Str(s) => Ok(s),
            other => Err(other.wrong_type("str")),
        }
    }

    pub fn as_list(&self) -> Result<&[Value], ValueError> {
        match self {
            Value::List(items) => Ok(items),
            other => Err(other.wrong_type("list")),
        }
    }

    pub fn as_struct(&self) -> Result<&Record, ValueError> {
        match self {
            Value::Struct(record) => Ok(record),
            other => Err(other.wrong_type("struct")),
        }
    }

    fn wrong_type(&self, expected: &'static str) -> ValueError {
        ValueError::WrongType {
            expected,
            got: self.kind(),
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other).is_ok()
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Bool(b) => write!(f, "{}", b),
            Value::Int(i) => write!(f, "{}", i),
            Value::Float(x) => write!(f, "{}", x),
            Value::Str(s) => write!(f, "{:?}", s),
            Value::List(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, "]")
            }
            Value::Struct(record) => {
                write!(f, "{{")?;
                for (i, (name, value)) in record.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}: {}", name, value)?;
                }
                write!(f, "}}")
            }
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Value::Int(i64::from(i))
    }
}

impl From<f64> for Value {
    fn from(x: f64) -> Self {
        Value::Float(x)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(s)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::List(items)
    }
}

impl From<Record> for Value {
    fn from(record: Record) -> Self {
        Value::Struct(record)
    }
}
