//! Untyped, self-describing values carried by `document` shapes.

use std::collections::HashMap;

/// A protocol-agnostic open content value.
#[derive(Debug, Clone, PartialEq)]
pub enum Document {
    Object(HashMap<String, Document>),
    Array(Vec<Document>),
    Number(Number),
    String(String),
    Bool(bool),
    Null,
}

/// A document number, keeping integers exact.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Number {
    PosInt(u64),
    NegInt(i64),
    Float(f64),
}

impl Number {
    pub fn to_f64(self) -> f64 {
        match self {
            Number::PosInt(v) => v as f64,
            Number::NegInt(v) => v as f64,
            Number::Float(v) => v,
        }
    }
}

impl Document {
    pub fn as_object(&self) -> Option<&HashMap<String, Document>> {
        match self {
            Document::Object(object) => Some(object),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&Vec<Document>> {
        match self {
            Document::Array(array) => Some(array),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Document::String(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<Number> {
        match self {
            Document::Number(number) => Some(*number),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Document::Bool(value) => Some(*value),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Document::Null)
    }
}

impl From<bool> for Document {
    fn from(value: bool) -> Self {
        Document::Bool(value)
    }
}

impl From<&str> for Document {
    fn from(value: &str) -> Self {
        Document::String(value.to_string())
    }
}

impl From<String> for Document {
    fn from(value: String) -> Self {
        Document::String(value)
    }
}

impl From<i64> for Document {
    fn from(value: i64) -> Self {
        if value < 0 {
            Document::Number(Number::NegInt(value))
        } else {
            Document::Number(Number::PosInt(value as u64))
        }
    }
}

impl From<f64> for Document {
    fn from(value: f64) -> Self {
        Document::Number(Number::Float(value))
    }
}

impl From<Vec<Document>> for Document {
    fn from(values: Vec<Document>) -> Self {
        Document::Array(values)
    }
}

impl From<HashMap<String, Document>> for Document {
    fn from(values: HashMap<String, Document>) -> Self {
        Document::Object(values)
    }
}

#[cfg(feature = "json")]
impl From<serde_json::Value> for Document {
    fn from(value: serde_json::Value) -> Self {
        use serde_json::Value;
        match value {
            Value::Null => Document::Null,
            Value::Bool(b) => Document::Bool(b),
            Value::Number(n) => {
                if let Some(v) = n.as_u64() {
                    Document::Number(Number::PosInt(v))
                } else if let Some(v) = n.as_i64() {
                    Document::Number(Number::NegInt(v))
                } else {
                    Document::Number(Number::Float(n.as_f64().unwrap_or(f64::NAN)))
                }
            }
            Value::String(s) => Document::String(s),
            Value::Array(values) => Document::Array(values.into_iter().map(Document::from).collect()),
            Value::Object(entries) => Document::Object(entries.into_iter().map(|(k, v)| (k, Document::from(v))).collect()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integer_sign_selects_number_variant() {
        assert_eq!(Document::from(5i64), Document::Number(Number::PosInt(5)));
        assert_eq!(Document::from(-5i64), Document::Number(Number::NegInt(-5)));
    }

    #[cfg(feature = "json")]
    #[test]
    fn converts_from_json_values() {
        let value: serde_json::Value = serde_json::from_str(r#"{"a": [1, -2, 1.5, "x", true, null]}"#).unwrap();
        let doc = Document::from(value);
        let array = doc.as_object().unwrap()["a"].as_array().unwrap();
        assert_eq!(array[0], Document::Number(Number::PosInt(1)));
        assert_eq!(array[1], Document::Number(Number::NegInt(-2)));
        assert_eq!(array[2], Document::Number(Number::Float(1.5)));
        assert_eq!(array[3].as_str(), Some("x"));
        assert_eq!(array[4].as_bool(), Some(true));
        assert!(array[5].is_null());
    }
}
