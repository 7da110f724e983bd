//! Purpose: In-memory model for parsed literal values plus comparison semantics.
//! Exports: `Value`, `py_eq`, `py_cmp`.
//! Role: Shared value type between the parser and the canonical renderer.
//! Invariants: Dict entries keep parse order; canonical ordering is applied at render time.
//! Invariants: `py_eq`/`py_cmp` mirror the source notation's equality and ordering rules.

use std::cmp::Ordering;

/// A parsed literal value. Dicts are association lists so parse order and
/// first-seen key objects survive until rendering.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    None,
    Bool(bool),
    Int(i128),
    Float(f64),
    Str(String),
    Bytes(Vec<u8>),
    List(Vec<Value>),
    Tuple(Vec<Value>),
    Set(Vec<Value>),
    Dict(Vec<(Value, Value)>),
}

impl Value {
    /// Type label used for the cross-type ordering fallback. `NoneType` sorts
    /// first by ASCII, then the lowercase names alphabetically.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::None => "NoneType",
            Value::Bool(_) => "bool",
            Value::Bytes(_) => "bytes",
            Value::Dict(_) => "dict",
            Value::Float(_) => "float",
            Value::Int(_) => "int",
            Value::List(_) => "list",
            Value::Set(_) => "set",
            Value::Str(_) => "str",
            Value::Tuple(_) => "tuple",
        }
    }

    /// Whether the value may be used as a dict key or set element. Tuples are
    /// hashable only if every element is.
    pub fn is_hashable(&self) -> bool {
        match self {
            Value::None
            | Value::Bool(_)
            | Value::Int(_)
            | Value::Float(_)
            | Value::Str(_)
            | Value::Bytes(_) => true,
            Value::Tuple(items) => items.iter().all(Value::is_hashable),
            Value::List(_) | Value::Set(_) | Value::Dict(_) => false,
        }
    }
}

#[derive(Clone, Copy, Debug)]
enum Num {
    Int(i128),
    Float(f64),
}

// Bools participate in numeric comparison as 0/1, matching the notation's
// bool-is-an-int behavior. Int/float cross-comparison goes through f64.
fn as_num(value: &Value) -> Option<Num> {
    match value {
        Value::Bool(flag) => Some(Num::Int(*flag as i128)),
        Value::Int(int) => Some(Num::Int(*int)),
        Value::Float(float) => Some(Num::Float(*float)),
        _ => None,
    }
}

fn num_cmp(a: Num, b: Num) -> Option<Ordering> {
    match (a, b) {
        (Num::Int(x), Num::Int(y)) => Some(x.cmp(&y)),
        (Num::Int(x), Num::Float(y)) => (x as f64).partial_cmp(&y),
        (Num::Float(x), Num::Int(y)) => x.partial_cmp(&(y as f64)),
        (Num::Float(x), Num::Float(y)) => x.partial_cmp(&y),
    }
}

/// Equality with numeric cross-type collapsing: `1`, `1.0`, and `True` are all
/// equal. Used for dict-key and set-element deduplication at parse time.
pub fn py_eq(a: &Value, b: &Value) -> bool {
    if let (Some(x), Some(y)) = (as_num(a), as_num(b)) {
        return num_cmp(x, y) == Some(Ordering::Equal);
    }
    match (a, b) {
        (Value::None, Value::None) => true,
        (Value::Str(x), Value::Str(y)) => x == y,
        (Value::Bytes(x), Value::Bytes(y)) => x == y,
        (Value::Tuple(x), Value::Tuple(y)) | (Value::List(x), Value::List(y)) => {
            x.len() == y.len() && x.iter().zip(y).all(|(ea, eb)| py_eq(ea, eb))
        }
        _ => false,
    }
}

/// Natural ordering where the notation defines one; `None` means the pair is
/// incomparable and the caller must fall back to type-based ordering.
pub fn py_cmp(a: &Value, b: &Value) -> Option<Ordering> {
    if let (Some(x), Some(y)) = (as_num(a), as_num(b)) {
        return num_cmp(x, y);
    }
    match (a, b) {
        (Value::Str(x), Value::Str(y)) => Some(x.cmp(y)),
        (Value::Bytes(x), Value::Bytes(y)) => Some(x.cmp(y)),
        (Value::Tuple(x), Value::Tuple(y)) | (Value::List(x), Value::List(y)) => seq_cmp(x, y),
        _ => None,
    }
}

fn seq_cmp(a: &[Value], b: &[Value]) -> Option<Ordering> {
    for (ea, eb) in a.iter().zip(b) {
        if py_eq(ea, eb) {
            continue;
        }
        return py_cmp(ea, eb);
    }
    Some(a.len().cmp(&b.len()))
}
