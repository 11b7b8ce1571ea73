use cascade_core::ast::Function;
use std::rc::Rc;

/// Identifier of a heap object. Dense, allocated monotonically starting at 1;
/// zero is reserved as "none" and never allocated. Identifiers are never
/// reused, so a stale id names a dead object rather than a recycled one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ObjectId(u64);

impl ObjectId {
    pub fn from_u64(value: u64) -> Self {
        Self(value)
    }

    pub fn as_u64(self) -> u64 {
        self.0
    }
}

/// Runtime value. Object identifiers carry their own tag so they are never
/// confused with plain numbers. `Callable` lives only in interpreter
/// environments; the heap rejects it.
#[derive(Debug, Clone)]
pub enum Value {
    Number(f64),
    Bool(bool),
    Str(Rc<str>),
    Null,
    Object(ObjectId),
    Callable(Rc<Function>),
}

impl Value {
    pub fn object_id(&self) -> Option<ObjectId> {
        match self {
            Value::Object(id) => Some(*id),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            Value::Number(_) => "number",
            Value::Bool(_) => "bool",
            Value::Str(_) => "string",
            Value::Null => "null",
            Value::Object(_) => "object",
            Value::Callable(_) => "function",
        }
    }
}

pub fn format_value(value: &Value) -> String {
    match value {
        Value::Number(number) => format!("{number}"),
        Value::Bool(value) => format!("{value}"),
        Value::Str(text) => format!("{text:?}"),
        Value::Null => "null".to_string(),
        Value::Object(id) => format!("[Object#{}]", id.as_u64()),
        Value::Callable(function) => format!("[Function {}]", function.name),
    }
}

pub fn values_equal(left: &Value, right: &Value) -> bool {
    match (left, right) {
        (Value::Number(left), Value::Number(right)) => left == right,
        (Value::Bool(left), Value::Bool(right)) => left == right,
        (Value::Str(left), Value::Str(right)) => left == right,
        (Value::Null, Value::Null) => true,
        (Value::Object(left), Value::Object(right)) => left == right,
        (Value::Callable(left), Value::Callable(right)) => Rc::ptr_eq(left, right),
        _ => false,
    }
}
