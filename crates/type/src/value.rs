// SPDX-License-Identifier: MIT
// Copyright (c) 2025 Tablekit

use std::fmt::{self, Display, Formatter};

use serde::{Deserialize, Serialize};

/// The storage class of a [`Value`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Type {
	Undefined,
	Boolean,
	Int,
	Float,
	Utf8,
	Blob,
}

impl Display for Type {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		match self {
			Type::Undefined => f.write_str("UNDEFINED"),
			Type::Boolean => f.write_str("BOOLEAN"),
			Type::Int => f.write_str("INT"),
			Type::Float => f.write_str("FLOAT"),
			Type::Utf8 => f.write_str("UTF8"),
			Type::Blob => f.write_str("BLOB"),
		}
	}
}

/// A value crossing the dispatch boundary, represented as a native Rust type.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Value {
	/// Value is not defined (think null in common programming languages)
	Undefined,
	/// A boolean: true or false
	Boolean(bool),
	/// An 8-byte signed integer
	Int(i64),
	/// An 8-byte floating point
	Float(f64),
	/// A UTF-8 encoded string
	Utf8(String),
	/// An opaque byte sequence
	Blob(Vec<u8>),
}

impl Value {
	pub fn r#type(&self) -> Type {
		match self {
			Value::Undefined => Type::Undefined,
			Value::Boolean(_) => Type::Boolean,
			Value::Int(_) => Type::Int,
			Value::Float(_) => Type::Float,
			Value::Utf8(_) => Type::Utf8,
			Value::Blob(_) => Type::Blob,
		}
	}

	pub fn is_undefined(&self) -> bool {
		matches!(self, Value::Undefined)
	}

	pub fn as_int(&self) -> Option<i64> {
		match self {
			Value::Int(v) => Some(*v),
			_ => None,
		}
	}

	pub fn as_utf8(&self) -> Option<&str> {
		match self {
			Value::Utf8(v) => Some(v.as_str()),
			_ => None,
		}
	}
}

impl Display for Value {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		match self {
			Value::Undefined => f.write_str("undefined"),
			Value::Boolean(v) => write!(f, "{}", v),
			Value::Int(v) => write!(f, "{}", v),
			Value::Float(v) => write!(f, "{}", v),
			Value::Utf8(v) => f.write_str(v),
			Value::Blob(v) => write!(f, "0x{}", hex(v)),
		}
	}
}

fn hex(bytes: &[u8]) -> String {
	bytes.iter().map(|b| format!("{:02x}", b)).collect()
}

impl From<bool> for Value {
	fn from(v: bool) -> Self {
		Value::Boolean(v)
	}
}

impl From<i64> for Value {
	fn from(v: i64) -> Self {
		Value::Int(v)
	}
}

impl From<f64> for Value {
	fn from(v: f64) -> Self {
		Value::Float(v)
	}
}

impl From<&str> for Value {
	fn from(v: &str) -> Self {
		Value::Utf8(v.to_string())
	}
}

impl From<String> for Value {
	fn from(v: String) -> Self {
		Value::Utf8(v)
	}
}

impl From<Vec<u8>> for Value {
	fn from(v: Vec<u8>) -> Self {
		Value::Blob(v)
	}
}

#[cfg(test)]
mod tests {
	use super::{Type, Value};

	#[test]
	fn test_type_of_value() {
		assert_eq!(Value::Undefined.r#type(), Type::Undefined);
		assert_eq!(Value::Boolean(true).r#type(), Type::Boolean);
		assert_eq!(Value::Int(42).r#type(), Type::Int);
		assert_eq!(Value::Float(1.5).r#type(), Type::Float);
		assert_eq!(Value::Utf8("x".to_string()).r#type(), Type::Utf8);
		assert_eq!(Value::Blob(vec![0xab]).r#type(), Type::Blob);
	}

	#[test]
	fn test_display() {
		assert_eq!(Value::Undefined.to_string(), "undefined");
		assert_eq!(Value::Int(-7).to_string(), "-7");
		assert_eq!(Value::Utf8("hello".to_string()).to_string(), "hello");
		assert_eq!(Value::Blob(vec![0xab, 0x01]).to_string(), "0xab01");
	}

	#[test]
	fn test_serde_round_trip() {
		let values = vec![
			Value::Undefined,
			Value::Boolean(false),
			Value::Int(9000),
			Value::Utf8("row".to_string()),
		];
		let encoded = serde_json::to_string(&values).unwrap();
		let decoded: Vec<Value> = serde_json::from_str(&encoded).unwrap();
		assert_eq!(decoded, values);
	}
}
