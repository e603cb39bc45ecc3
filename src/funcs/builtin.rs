//! A few pure functions available to every graph.

use super::simple::StaticFunc;
use crate::types::{FuncType, FuncValue, Type, Value};
use anyhow::bail;

pub fn add() -> FuncValue {
    let sig = FuncType::new(Type::Int)
        .with_param("a", Type::Int)
        .with_param("b", Type::Int);
    FuncValue::new(sig, |args| {
        let (a, b) = (args[0].as_int()?, args[1].as_int()?);
        match a.checked_add(b) {
            Some(sum) => Ok(Value::Int(sum)),
            None => bail!("integer overflow in {} + {}", a, b),
        }
    })
}

pub fn sub() -> FuncValue {
    let sig = FuncType::new(Type::Int)
        .with_param("a", Type::Int)
        .with_param("b", Type::Int);
    FuncValue::new(sig, |args| {
        let (a, b) = (args[0].as_int()?, args[1].as_int()?);
        match a.checked_sub(b) {
            Some(diff) => Ok(Value::Int(diff)),
            None => bail!("integer overflow in {} - {}", a, b),
        }
    })
}

pub fn divide() -> FuncValue {
    let sig = FuncType::new(Type::Float)
        .with_param("a", Type::Float)
        .with_param("b", Type::Float);
    FuncValue::new(sig, |args| {
        let (a, b) = (args[0].as_float()?, args[1].as_float()?);
        if b == 0.0 {
            bail!("can't divide {} by zero", a);
        }
        Ok(Value::Float(a / b))
    })
}

pub fn concat() -> FuncValue {
    let sig = FuncType::new(Type::Str)
        .with_param("a", Type::Str)
        .with_param("b", Type::Str);
    FuncValue::new(sig, |args| {
        Ok(Value::Str(format!("{}{}", args[0].as_str()?, args[1].as_str()?)))
    })
}

pub fn len() -> FuncValue {
    let sig = FuncType::new(Type::Int).with_param("s", Type::Str);
    FuncValue::new(sig, |args| {
        Ok(Value::Int(args[0].as_str()?.chars().count() as i64))
    })
}

pub fn pi() -> FuncValue {
    FuncValue::new(FuncType::new(Type::Float), |_| Ok(Value::Float(std::f64::consts::PI)))
}

/// Every builtin, registered by [`SimpleRegistry::bootstrap`](super::SimpleRegistry::bootstrap)
pub static BUILTINS: &[StaticFunc] = &[
    StaticFunc { name: "add", build: add },
    StaticFunc { name: "sub", build: sub },
    StaticFunc { name: "divide", build: divide },
    StaticFunc { name: "concat", build: concat },
    StaticFunc { name: "len", build: len },
    StaticFunc { name: "pi", build: pi },
];
