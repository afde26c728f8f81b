use std::fmt::Display;

use crate::syntax::token::Literal;

#[derive(Clone, Debug)]
pub enum Value {
    Boolean(bool),
    Number(f64),
    String(String),
    Nil,
}

impl Value {
    /// `nil` and `false` are falsy, everything else is truthy.
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Nil => false,
            Value::Boolean(value) => *value,
            _ => true,
        }
    }

    /// Structural equality. Values of different types are never equal.
    pub fn is_equal(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Nil, Value::Nil) => true,
            (Value::Number(left), Value::Number(right)) => left == right,
            (Value::String(left), Value::String(right)) => left == right,
            (Value::Boolean(left), Value::Boolean(right)) => left == right,
            _ => false,
        }
    }
}

impl From<&Literal> for Value {
    fn from(literal: &Literal) -> Self {
        match literal {
            Literal::String(value) => Value::String(value.clone()),
            Literal::Number(value) => Value::Number(*value),
            Literal::Bool(value) => Value::Boolean(*value),
            Literal::None => Value::Nil,
        }
    }
}

impl Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Boolean(value) => write!(f, "{value}"),
            Value::Number(value) => {
                let s = value.to_string();
                write!(f, "{}", s.strip_suffix(".0").unwrap_or(&s))
            }
            Value::String(value) => write!(f, "{value}"),
            Value::Nil => write!(f, "nil"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stringify_numbers() {
        assert_eq!(Value::Number(3.0).to_string(), "3");
        assert_eq!(Value::Number(3.5).to_string(), "3.5");
        assert_eq!(Value::Number(-0.25).to_string(), "-0.25");
        assert_eq!(Value::Number(100.0).to_string(), "100");
    }

    #[test]
    fn stringify_other_values() {
        assert_eq!(Value::Nil.to_string(), "nil");
        assert_eq!(Value::Boolean(false).to_string(), "false");
        assert_eq!(Value::String(String::from("hi")).to_string(), "hi");
    }

    #[test]
    fn truthiness() {
        assert!(!Value::Nil.is_truthy());
        assert!(!Value::Boolean(false).is_truthy());
        assert!(Value::Boolean(true).is_truthy());
        assert!(Value::Number(0.0).is_truthy());
        assert!(Value::String(String::new()).is_truthy());
    }

    #[test]
    fn equality() {
        assert!(Value::Nil.is_equal(&Value::Nil));
        assert!(!Value::Nil.is_equal(&Value::Boolean(false)));
        assert!(Value::Number(2.0).is_equal(&Value::Number(2.0)));
        assert!(!Value::Number(1.0).is_equal(&Value::String(String::from("1"))));
        assert!(Value::String(String::from("a")).is_equal(&Value::String(String::from("a"))));
    }
}
