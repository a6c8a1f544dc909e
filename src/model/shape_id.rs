//! Absolute shape identifiers (`namespace#Name` and `namespace#Name$member`).

use std::fmt;
use std::str::FromStr;

use super::errors::ModelError;

/// A stable, namespaced shape identity.
///
/// Ordering is lexicographic on `(namespace, name, member)` so maps keyed by `ShapeId` iterate deterministically.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ShapeId {
    namespace: String,
    name: String,
    member: Option<String>,
}

impl ShapeId {
    /// Build an id from parts that are already known to be valid.
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        ShapeId {
            namespace: namespace.into(),
            name: name.into(),
            member: None,
        }
    }

    pub fn parse(text: &str) -> Result<Self, ModelError> {
        let invalid = || ModelError::InvalidShapeId(text.to_string());
        let (namespace, rest) = text.split_once('#').ok_or_else(invalid)?;
        let (name, member) = match rest.split_once('$') {
            Some((name, member)) => (name, Some(member)),
            None => (rest, None),
        };
        if namespace.is_empty() || !namespace.split('.').all(is_identifier) {
            return Err(invalid());
        }
        if !is_identifier(name) || !member.is_none_or(is_identifier) {
            return Err(invalid());
        }
        Ok(ShapeId {
            namespace: namespace.to_string(),
            name: name.to_string(),
            member: member.map(str::to_string),
        })
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn member(&self) -> Option<&str> {
        self.member.as_deref()
    }

    /// The id of member `member` of this shape.
    pub fn with_member(&self, member: impl Into<String>) -> ShapeId {
        ShapeId {
            namespace: self.namespace.clone(),
            name: self.name.clone(),
            member: Some(member.into()),
        }
    }

    /// The containing shape of a member id (or a copy of a shape id).
    pub fn without_member(&self) -> ShapeId {
        ShapeId::new(self.namespace.clone(), self.name.clone())
    }

    /// A sibling id in the same namespace.
    pub fn with_name(&self, name: impl Into<String>) -> ShapeId {
        ShapeId::new(self.namespace.clone(), name)
    }
}

fn is_identifier(text: &str) -> bool {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() || first == '_' => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        _ => false,
    }
}

impl fmt::Display for ShapeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.namespace, self.name)?;
        if let Some(member) = &self.member {
            write!(f, "${member}")?;
        }
        Ok(())
    }
}

impl FromStr for ShapeId {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ShapeId::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_and_displays() {
        let id = ShapeId::parse("example.weather#GetCity$cityId").unwrap();
        assert_eq!(id.namespace(), "example.weather");
        assert_eq!(id.name(), "GetCity");
        assert_eq!(id.member(), Some("cityId"));
        assert_eq!(id.to_string(), "example.weather#GetCity$cityId");
        assert_eq!(id.without_member().to_string(), "example.weather#GetCity");
    }

    #[test]
    fn rejects_malformed_ids() {
        for bad in ["NoNamespace", "#Name", "ns#", "ns#1Name", "ns..x#Name", "ns#Name$", "ns#Na-me"] {
            assert!(ShapeId::parse(bad).is_err(), "{bad} should be rejected");
        }
    }

    #[test]
    fn orders_by_namespace_then_name() {
        let mut ids = vec![
            ShapeId::new("b", "A"),
            ShapeId::new("a", "Z"),
            ShapeId::new("a", "B"),
        ];
        ids.sort();
        let rendered: Vec<String> = ids.iter().map(ToString::to_string).collect();
        assert_eq!(rendered, vec!["a#B", "a#Z", "b#A"]);
    }
}
