use serde::{Deserialize, Serialize};
use std::fmt;

/// Type of a value flowing between nodes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Type {
    Bool,
    Int,
    Float,
    Str,
    List(Box<Type>),
    Struct(Vec<(String, Type)>),
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Bool => write!(f, "bool"),
            Type::Int => write!(f, "int"),
            Type::Float => write!(f, "float"),
            Type::Str => write!(f, "str"),
            Type::List(elem) => write!(f, "[]{}", elem),
            Type::Struct(fields) => {
                write!(f, "struct{{")?;
                for (i, (name, ty)) in fields.iter().enumerate() {
                    if i > 0 {
                        write!(f, "; ")?;
                    }
                    write!(f, "{} {}", name, ty)?;
                }
                write!(f, "}}")
            }
        }
    }
}

/// Signature of a function: ordered named parameters plus a return type
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FuncType {
    pub params: Vec<(String, Type)>,
    pub out: Type,
}

impl FuncType {
    pub fn new(out: Type) -> Self {
        Self {
            params: Vec::new(),
            out,
        }
    }

    pub fn with_param(mut self, name: impl Into<String>, ty: Type) -> Self {
        self.params.push((name.into(), ty));
        self
    }

    /// Parameter names in declaration order
    pub fn ord(&self) -> Vec<&str> {
        self.params.iter().map(|(name, _)| name.as_str()).collect()
    }

    pub fn arity(&self) -> usize {
        self.params.len()
    }

    /// The record type a node of this signature expects on its input
    pub fn input(&self) -> Type {
        Type::Struct(self.params.clone())
    }
}

impl fmt::Display for FuncType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "func(")?;
        for (i, (name, ty)) in self.params.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{} {}", name, ty)?;
        }
        write!(f, ") {}", self.out)
    }
}
