//! Rust names for model names.

use proc_macro2::Ident;
use quote::format_ident;
use shapegen_core::{escape_ident, to_pascal_case, to_snake_case};

use crate::model::{MemberShape, Shape, ShapeId};

use super::errors::CodegenError;

const EXCEPTION_SUFFIX: &str = "Exception";

/// Type name for a generated shape; error shapes trade an `Exception` suffix for `Error`.
pub fn type_name(shape: &Shape) -> String {
    let name = to_pascal_case(shape.name());
    if shape.is_error() {
        if let Some(stem) = name.strip_suffix(EXCEPTION_SUFFIX) {
            return format!("{stem}Error");
        }
    }
    escape_ident(&name)
}

/// Field (and setter) name for a member.
pub fn field_name(member: &MemberShape) -> String {
    escape_ident(&to_snake_case(&member.name))
}

/// Enum variant name for a union member.
pub fn variant_name(member: &MemberShape) -> String {
    escape_ident(&to_pascal_case(&member.name))
}

/// Snake-case form used for builder modules and helper functions.
pub fn snake_name(name: &str) -> String {
    escape_ident(&to_snake_case(name))
}

/// `snake_name` without keyword escaping, for embedding in longer identifiers.
pub fn snake_fragment(name: &str) -> String {
    to_snake_case(name)
}

/// Build an identifier, rejecting text that is not one.
pub fn ident(name: &str, origin: &ShapeId) -> Result<Ident, CodegenError> {
    let bare = name.strip_prefix("r#").unwrap_or(name);
    let mut chars = bare.chars();
    let valid = match chars.next() {
        Some(first) => {
            (first.is_ascii_alphabetic() || first == '_')
                && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
                && bare != "_"
        }
        None => false,
    };
    if !valid {
        return Err(CodegenError::InvalidIdentifier {
            name: name.to_string(),
            shape: origin.clone(),
        });
    }
    Ok(format_ident!("{}", name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ErrorFault, ShapeKind};

    #[test]
    fn exception_suffix_becomes_error() {
        let mut shape = Shape::new(ShapeId::new("ns", "NoSuchBucketException"), ShapeKind::Structure(Vec::new()));
        shape.traits.error = Some(ErrorFault::Client);
        assert_eq!(type_name(&shape), "NoSuchBucketError");
    }

    #[test]
    fn keyword_members_become_raw_identifiers() {
        let member = MemberShape::new("type", ShapeId::new("smithy.api", "String"));
        assert_eq!(field_name(&member), "r#type");
        assert_eq!(ident(&field_name(&member), &ShapeId::new("ns", "S")).unwrap().to_string(), "r#type");
    }

    #[test]
    fn rejects_non_identifiers() {
        assert!(ident("_", &ShapeId::new("ns", "S")).is_err());
        assert!(ident("a-b", &ShapeId::new("ns", "S")).is_err());
    }
}
