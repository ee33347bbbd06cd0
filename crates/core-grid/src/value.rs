use std::fmt;

use thiserror::Error;

/// The dynamic value flowing through `retval`, memory, and instruction
/// operands. Arithmetic, comparison, casts, indexing, and length are only
/// defined for the concrete pairs the instruction catalogue actually
/// exercises; anything else is a [`ValueError::Type`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Value {
    Str(String),
    Int(i64),
    Bool(bool),
    Empty,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValueError {
    #[error("type error: {0}")]
    Type(String),
    #[error("invalid integer literal: {0:?}")]
    BadInt(String),
    #[error("index {index} out of range for length {len}")]
    IndexOutOfRange { index: i64, len: usize },
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Str(s) => write!(f, "{s}"),
            Value::Int(i) => write!(f, "{i}"),
            Value::Bool(b) => write!(f, "{}", if *b { "True" } else { "False" }),
            Value::Empty => Ok(()),
        }
    }
}

impl Value {
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Str(_) => "string",
            Value::Int(_) => "integer",
            Value::Bool(_) => "boolean",
            Value::Empty => "empty",
        }
    }

    /// Python-style truthiness, used by the `?` branch instruction.
    pub fn truthy(&self) -> bool {
        match self {
            Value::Str(s) => !s.is_empty(),
            Value::Int(i) => *i != 0,
            Value::Bool(b) => *b,
            Value::Empty => false,
        }
    }

    pub fn to_int(&self) -> Result<Value, ValueError> {
        let n = match self {
            Value::Int(i) => *i,
            Value::Bool(b) => i64::from(*b),
            Value::Str(s) => s
                .trim()
                .parse::<i64>()
                .map_err(|_| ValueError::BadInt(s.clone()))?,
            Value::Empty => return Err(ValueError::BadInt(String::new())),
        };
        Ok(Value::Int(n))
    }

    pub fn to_str(&self) -> Value {
        Value::Str(self.to_string())
    }

    pub fn add(&self, other: &Value) -> Result<Value, ValueError> {
        match (self, other) {
            (Value::Int(a), Value::Int(b)) => Ok(Value::Int(a + b)),
            (Value::Str(a), Value::Str(b)) => Ok(Value::Str(format!("{a}{b}"))),
            _ => Err(type_error("+", self, other)),
        }
    }

    pub fn sub(&self, other: &Value) -> Result<Value, ValueError> {
        int_binop(self, other, "-", |a, b| a - b)
    }

    pub fn mul(&self, other: &Value) -> Result<Value, ValueError> {
        int_binop(self, other, "*", |a, b| a * b)
    }

    pub fn floordiv(&self, other: &Value) -> Result<Value, ValueError> {
        int_binop(self, other, "/", floor_div)
    }

    pub fn rem(&self, other: &Value) -> Result<Value, ValueError> {
        int_binop(self, other, "%", floor_rem)
    }

    /// Ordering used by `l`/`g`/`e`/`o`. Defined for int/int and str/str.
    pub fn compare(&self, other: &Value) -> Result<std::cmp::Ordering, ValueError> {
        match (self, other) {
            (Value::Int(a), Value::Int(b)) => Ok(a.cmp(b)),
            (Value::Str(a), Value::Str(b)) => Ok(a.cmp(b)),
            _ => Err(type_error("compare", self, other)),
        }
    }

    /// `T thing index`: single-character indexing of a string value.
    pub fn index(&self, index: &Value) -> Result<Value, ValueError> {
        let Value::Str(s) = self else {
            return Err(ValueError::Type(format!(
                "cannot index a {}",
                self.type_name()
            )));
        };
        let Value::Int(i) = index.to_int()? else {
            unreachable!("to_int always yields Value::Int")
        };
        let chars: Vec<char> = s.chars().collect();
        let idx = if i < 0 { i + chars.len() as i64 } else { i };
        usize::try_from(idx)
            .ok()
            .and_then(|idx| chars.get(idx))
            .map(|c| Value::Str(c.to_string()))
            .ok_or(ValueError::IndexOutOfRange {
                index: i,
                len: chars.len(),
            })
    }

    /// `L thing`: length of a string value.
    pub fn length(&self) -> Result<Value, ValueError> {
        match self {
            Value::Str(s) => Ok(Value::Int(s.chars().count() as i64)),
            other => Err(ValueError::Type(format!(
                "cannot take length of a {}",
                other.type_name()
            ))),
        }
    }
}

fn int_binop(
    a: &Value,
    b: &Value,
    op: &str,
    f: impl FnOnce(i64, i64) -> i64,
) -> Result<Value, ValueError> {
    match (a, b) {
        (Value::Int(x), Value::Int(y)) => Ok(Value::Int(f(*x, *y))),
        _ => Err(type_error(op, a, b)),
    }
}

/// Floor division, matching Python's `//`: rounds toward negative infinity
/// rather than toward zero, so a negative divisor changes the result
/// (`7 / -2 == -4`, not the truncating `-3`).
fn floor_div(a: i64, b: i64) -> i64 {
    let q = a / b;
    let r = a % b;
    if r != 0 && (r < 0) != (b < 0) { q - 1 } else { q }
}

/// Remainder matching Python's `%`, which always takes the divisor's sign.
fn floor_rem(a: i64, b: i64) -> i64 {
    let r = a % b;
    if r != 0 && (r < 0) != (b < 0) { r + b } else { r }
}

fn type_error(op: &str, a: &Value, b: &Value) -> ValueError {
    ValueError::Type(format!(
        "unsupported operand types for {op}: {} and {}",
        a.type_name(),
        b.type_name()
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn string_concat() {
        assert_eq!(
            Value::Str("ab".into()).add(&Value::Str("cd".into())),
            Ok(Value::Str("abcd".into()))
        );
    }

    #[test]
    fn int_add() {
        assert_eq!(Value::Int(2).add(&Value::Int(3)), Ok(Value::Int(5)));
    }

    #[test]
    fn mixed_add_is_type_error() {
        assert!(Value::Int(2).add(&Value::Str("x".into())).is_err());
    }

    #[test]
    fn index_string() {
        assert_eq!(
            Value::Str("hello".into()).index(&Value::Int(1)),
            Ok(Value::Str("e".into()))
        );
    }

    #[test]
    fn length_string() {
        assert_eq!(Value::Str("hello".into()).length(), Ok(Value::Int(5)));
    }

    #[test]
    fn floordiv_with_negative_divisor_rounds_toward_negative_infinity() {
        assert_eq!(Value::Int(7).floordiv(&Value::Int(-2)), Ok(Value::Int(-4)));
        assert_eq!(Value::Int(7).rem(&Value::Int(-2)), Ok(Value::Int(-1)));
        assert_eq!(Value::Int(-7).floordiv(&Value::Int(2)), Ok(Value::Int(-4)));
        assert_eq!(Value::Int(-7).rem(&Value::Int(2)), Ok(Value::Int(1)));
    }

    #[test]
    fn truthiness() {
        assert!(!Value::Empty.truthy());
        assert!(!Value::Str(String::new()).truthy());
        assert!(Value::Int(1).truthy());
        assert!(!Value::Int(0).truthy());
    }
}
