//! Argument and result values exchanged with graded functions
//!
//! Exercises take and return a small, closed set of shapes: integers,
//! floats, strings, booleans and (possibly nested) lists and tuples.
//! [`Value`] models exactly that set so one runner can grade every
//! exercise, and `Clone` on a value is always a deep copy.

use std::fmt;

use serde::{Deserialize, Serialize};

/// One ordered argument tuple for a function under test
pub type TestCase = Vec<Value>;

/// A dynamically-shaped value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    /// No value (the function only printed, or returned nothing)
    None,
    /// Boolean
    Bool(bool),
    /// Integer
    Int(i64),
    /// Floating point number
    Float(#[serde(with = "float_repr")] f64),
    /// String
    Str(String),
    /// Ordered, growable sequence
    List(Vec<Value>),
    /// Fixed-size group
    Tuple(Vec<Value>),
}

/// Type tag of a [`Value`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ValueType {
    /// [`Value::None`]
    None,
    /// [`Value::Bool`]
    Bool,
    /// [`Value::Int`]
    Int,
    /// [`Value::Float`]
    Float,
    /// [`Value::Str`]
    Str,
    /// [`Value::List`]
    List,
    /// [`Value::Tuple`]
    Tuple,
}

impl Value {
    /// Type tag of this value
    #[must_use]
    pub fn value_type(&self) -> ValueType {
        match self {
            Self::None => ValueType::None,
            Self::Bool(_) => ValueType::Bool,
            Self::Int(_) => ValueType::Int,
            Self::Float(_) => ValueType::Float,
            Self::Str(_) => ValueType::Str,
            Self::List(_) => ValueType::List,
            Self::Tuple(_) => ValueType::Tuple,
        }
    }

    /// Whether this is the no-value marker
    #[must_use]
    pub fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }

    /// Mutable access to a list value
    pub fn as_list_mut(&mut self) -> Option<&mut Vec<Value>> {
        match self {
            Self::List(items) => Some(items),
            _ => None,
        }
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => write!(f, "None"),
            Self::Bool => write!(f, "bool"),
            Self::Int => write!(f, "int"),
            Self::Float => write!(f, "float"),
            Self::Str => write!(f, "str"),
            Self::List => write!(f, "list"),
            Self::Tuple => write!(f, "tuple"),
        }
    }
}

fn write_items(f: &mut fmt::Formatter<'_>, items: &[Value]) -> fmt::Result {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            write!(f, ", ")?;
        }
        write!(f, "{item}")?;
    }
    Ok(())
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => write!(f, "None"),
            Self::Bool(true) => write!(f, "True"),
            Self::Bool(false) => write!(f, "False"),
            Self::Int(v) => write!(f, "{v}"),
            Self::Float(v) if v.is_finite() && v.fract() == 0.0 && v.abs() < 1e16 => {
                write!(f, "{v:.1}")
            }
            Self::Float(v) => write!(f, "{v}"),
            Self::Str(s) => write!(f, "'{}'", s.escape_debug()),
            Self::List(items) => {
                write!(f, "[")?;
                write_items(f, items)?;
                write!(f, "]")
            }
            Self::Tuple(items) => {
                write!(f, "(")?;
                write_items(f, items)?;
                if items.len() == 1 {
                    write!(f, ",")?;
                }
                write!(f, ")")
            }
        }
    }
}

/// Render an argument tuple the way it is shown in reports
#[must_use]
pub fn format_case(case: &[Value]) -> String {
    Value::Tuple(case.to_vec()).to_string()
}

/// Conversion from a [`Value`] into a typed argument
pub trait FromValue: Sized {
    /// Type tag this conversion accepts
    const TYPE: ValueType;

    /// Convert, or `None` when the value has a different shape
    fn from_value(value: &Value) -> Option<Self>;
}

/// Conversion from a typed result into a [`Value`]
pub trait IntoValue {
    /// Type tag this conversion produces
    const TYPE: ValueType;

    /// Convert into a value
    fn into_value(self) -> Value;
}

impl FromValue for i64 {
    const TYPE: ValueType = ValueType::Int;

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Int(v) => Some(*v),
            _ => None,
        }
    }
}

impl FromValue for f64 {
    const TYPE: ValueType = ValueType::Float;

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Float(v) => Some(*v),
            _ => None,
        }
    }
}

impl FromValue for bool {
    const TYPE: ValueType = ValueType::Bool;

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Bool(v) => Some(*v),
            _ => None,
        }
    }
}

impl FromValue for String {
    const TYPE: ValueType = ValueType::Str;

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Str(s) => Some(s.clone()),
            _ => None,
        }
    }
}

impl<T: FromValue> FromValue for Vec<T> {
    const TYPE: ValueType = ValueType::List;

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::List(items) | Value::Tuple(items) => items.iter().map(T::from_value).collect(),
            _ => None,
        }
    }
}

impl IntoValue for () {
    const TYPE: ValueType = ValueType::None;

    fn into_value(self) -> Value {
        Value::None
    }
}

impl IntoValue for i64 {
    const TYPE: ValueType = ValueType::Int;

    fn into_value(self) -> Value {
        Value::Int(self)
    }
}

impl IntoValue for f64 {
    const TYPE: ValueType = ValueType::Float;

    fn into_value(self) -> Value {
        Value::Float(self)
    }
}

impl IntoValue for bool {
    const TYPE: ValueType = ValueType::Bool;

    fn into_value(self) -> Value {
        Value::Bool(self)
    }
}

impl IntoValue for String {
    const TYPE: ValueType = ValueType::Str;

    fn into_value(self) -> Value {
        Value::Str(self)
    }
}

impl<T: IntoValue> IntoValue for Vec<T> {
    const TYPE: ValueType = ValueType::List;

    fn into_value(self) -> Value {
        Value::List(self.into_iter().map(IntoValue::into_value).collect())
    }
}

impl<A: IntoValue, B: IntoValue> IntoValue for (A, B) {
    const TYPE: ValueType = ValueType::Tuple;

    fn into_value(self) -> Value {
        Value::Tuple(vec![self.0.into_value(), self.1.into_value()])
    }
}

/// A typed parameter list extracted from an argument tuple
pub trait Arguments: Sized {
    /// Declared parameter types, in order
    fn types() -> Vec<ValueType>;

    /// Extract typed arguments
    ///
    /// # Errors
    ///
    /// Returns a message naming the first argument with the wrong shape
    fn extract(args: &[Value]) -> std::result::Result<Self, String>;
}

fn argument<T: FromValue>(args: &[Value], index: usize) -> std::result::Result<T, String> {
    let value = args
        .get(index)
        .ok_or_else(|| format!("missing argument {index}"))?;
    T::from_value(value).ok_or_else(|| {
        format!(
            "argument {index}: expected {}, found {}",
            T::TYPE,
            value.value_type()
        )
    })
}

macro_rules! impl_arguments {
    ($len:expr; $($name:ident => $index:tt),+) => {
        impl<$($name: FromValue),+> Arguments for ($($name,)+) {
            fn types() -> Vec<ValueType> {
                vec![$($name::TYPE),+]
            }

            fn extract(args: &[Value]) -> std::result::Result<Self, String> {
                if args.len() != $len {
                    return Err(format!("expected {} argument(s), got {}", $len, args.len()));
                }
                Ok(($(argument::<$name>(args, $index)?,)+))
            }
        }
    };
}

impl_arguments!(1; A => 0);
impl_arguments!(2; A => 0, B => 1);
impl_arguments!(3; A => 0, B => 1, C => 2);
impl_arguments!(4; A => 0, B => 1, C => 2, D => 3);

/// Non-finite floats travel as strings in JSON
mod float_repr {
    use serde::de::Error as _;
    use serde::{Deserialize, Deserializer, Serializer};

    #[allow(clippy::trivially_copy_pass_by_ref)]
    pub fn serialize<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
        if value.is_finite() {
            serializer.serialize_f64(*value)
        } else if value.is_nan() {
            serializer.serialize_str("NaN")
        } else if *value > 0.0 {
            serializer.serialize_str("inf")
        } else {
            serializer.serialize_str("-inf")
        }
    }

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Repr {
        Number(f64),
        Text(String),
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
        match Repr::deserialize(deserializer)? {
            Repr::Number(v) => Ok(v),
            Repr::Text(text) => match text.as_str() {
                "NaN" => Ok(f64::NAN),
                "inf" => Ok(f64::INFINITY),
                "-inf" => Ok(f64::NEG_INFINITY),
                other => Err(D::Error::custom(format!("invalid float: {other}"))),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_scalars() {
        assert_eq!(Value::Int(15).to_string(), "15");
        assert_eq!(Value::Float(15.0).to_string(), "15.0");
        assert_eq!(Value::Float(2.5).to_string(), "2.5");
        assert_eq!(Value::Bool(true).to_string(), "True");
        assert_eq!(Value::None.to_string(), "None");
        assert_eq!(Value::Str("a'b".to_string()).to_string(), "'a\\'b'");
    }

    #[test]
    fn test_display_sequences() {
        assert_eq!(format_case(&[Value::Int(1), Value::Int(5)]), "(1, 5)");
        assert_eq!(format_case(&[Value::Int(7)]), "(7,)");
        let list = Value::List(vec![Value::Float(1.5), Value::Float(2.0)]);
        assert_eq!(list.to_string(), "[1.5, 2.0]");
    }

    #[test]
    fn test_clone_is_deep() {
        let original = Value::List(vec![Value::List(vec![Value::Int(1)])]);
        let mut copy = original.clone();
        if let Some(items) = copy.as_list_mut() {
            items.push(Value::Int(2));
        }
        assert_ne!(original, copy);
        assert_eq!(original, Value::List(vec![Value::List(vec![Value::Int(1)])]));
    }

    #[test]
    fn test_arguments_extract() {
        let args = vec![Value::Int(1), Value::Float(2.0)];
        let (a, b): (i64, f64) = Arguments::extract(&args).unwrap();
        assert_eq!(a, 1);
        assert!((b - 2.0).abs() < f64::EPSILON);
        assert_eq!(
            <(i64, f64) as Arguments>::types(),
            vec![ValueType::Int, ValueType::Float]
        );
    }

    #[test]
    fn test_arguments_wrong_type() {
        let args = vec![Value::Str("x".to_string())];
        let err = <(i64,) as Arguments>::extract(&args).unwrap_err();
        assert_eq!(err, "argument 0: expected int, found str");
    }

    #[test]
    fn test_arguments_wrong_arity() {
        let args = vec![Value::Int(1)];
        let err = <(i64, i64) as Arguments>::extract(&args).unwrap_err();
        assert!(err.contains("expected 2 argument(s), got 1"));
    }

    #[test]
    fn test_vec_conversions() {
        let value = vec![1.0_f64, 2.0].into_value();
        assert_eq!(value.value_type(), ValueType::List);
        let back: Vec<f64> = FromValue::from_value(&value).unwrap();
        assert_eq!(back, vec![1.0, 2.0]);
    }

    #[test]
    fn test_non_finite_json() {
        let values = Value::List(vec![
            Value::Float(f64::INFINITY),
            Value::Float(f64::NEG_INFINITY),
            Value::Float(1.25),
        ]);
        let json = serde_json::to_string(&values).unwrap();
        let back: Value = serde_json::from_str(&json).unwrap();
        assert_eq!(back, values);

        let nan: Value = serde_json::from_str(&serde_json::to_string(&Value::Float(f64::NAN)).unwrap()).unwrap();
        assert!(matches!(nan, Value::Float(v) if v.is_nan()));
    }
}
