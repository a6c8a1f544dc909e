//! Shape → [`Symbol`] resolution.
//!
//! Resolution is a pure function of the shape, the model and the runtime catalog: resolving the same shape twice
//! yields equal symbols.
//!
//! ## Notes
//!
//! - Member wrapping order is fixed: `Option` first, then `Box`. An optional boxed member is `Box<Option<T>>`.
//! - Sets of strings become `HashSet<String>`; every other set element falls back to `Vec<T>` because arbitrary
//!   elements (floats, documents, structures) are not `Hash + Eq` in Rust.
//! - Map keys must be strings (or string enums); anything else is a [`ResolutionError::NonStringMapKey`].
//! - A `@streaming` blob member resolves to the runtime `ByteStream` and is never optional or boxed: an absent
//!   stream is an empty one.

use std::collections::BTreeSet;

use serde_json::Value;

use crate::model::{MemberShape, Model, Shape, ShapeId, ShapeKind, recursion};

use super::names;
use super::runtime::{LogicalType, RuntimeTypes};
use super::symbol::{RustType, Symbol, SymbolLocation};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ResolutionError {
    #[error("shape `{id}` is not defined in the model")]
    UnknownShape { id: ShapeId },

    #[error("map `{shape}` has key `{key}`, but map keys must be strings")]
    NonStringMapKey { shape: ShapeId, key: ShapeId },

    #[error("shape `{shape}` is part of a reference cycle with no boxed member")]
    UnboxedCycle { shape: ShapeId },

    #[error("`{id}` does not name a member")]
    NotAMember { id: ShapeId },
}

pub struct SymbolResolver<'a> {
    model: &'a Model,
    runtime: &'a RuntimeTypes,
    cyclic: BTreeSet<ShapeId>,
}

impl<'a> SymbolResolver<'a> {
    pub fn new(model: &'a Model, runtime: &'a RuntimeTypes) -> Self {
        SymbolResolver {
            model,
            runtime,
            cyclic: recursion::unboxed_cycles(model),
        }
    }

    pub fn model(&self) -> &'a Model {
        self.model
    }

    pub fn runtime(&self) -> &'a RuntimeTypes {
        self.runtime
    }

    pub fn shape(&self, id: &ShapeId) -> Result<&'a Shape, ResolutionError> {
        self.model
            .get(id)
            .ok_or_else(|| ResolutionError::UnknownShape { id: id.clone() })
    }

    pub fn resolve_id(&self, id: &ShapeId) -> Result<Symbol, ResolutionError> {
        if id.member().is_some() {
            return self.resolve_member_id(id);
        }
        self.resolve(self.shape(id)?)
    }

    pub fn resolve(&self, shape: &Shape) -> Result<Symbol, ResolutionError> {
        if self.cyclic.contains(&shape.id) {
            return Err(ResolutionError::UnboxedCycle {
                shape: shape.id.clone(),
            });
        }
        let symbol = match &shape.kind {
            ShapeKind::Boolean => Symbol::primitive(RustType::Bool),
            ShapeKind::Byte => Symbol::primitive(RustType::I8),
            ShapeKind::Short => Symbol::primitive(RustType::I16),
            ShapeKind::Integer => Symbol::primitive(RustType::I32),
            ShapeKind::Long => Symbol::primitive(RustType::I64),
            ShapeKind::Float => Symbol::primitive(RustType::F32),
            ShapeKind::Double => Symbol::primitive(RustType::F64),
            ShapeKind::String => Symbol::primitive(RustType::String),
            ShapeKind::Blob => self.external(LogicalType::Blob),
            ShapeKind::Timestamp => self.external(LogicalType::Instant),
            ShapeKind::Document => self.external(LogicalType::Document),
            ShapeKind::List(member) => self.resolve_member(shape, member)?.map_type(|ty| RustType::Vec(Box::new(ty))),
            ShapeKind::Set(member) => {
                let element = self.resolve_member(shape, member)?;
                let hashable = matches!(self.shape(&member.target)?.kind, ShapeKind::String) && !element.rust_type.is_box();
                if hashable {
                    element.map_type(|ty| RustType::HashSet(Box::new(ty)))
                } else {
                    element.map_type(|ty| RustType::Vec(Box::new(ty)))
                }
            }
            ShapeKind::Map { key, value } => {
                let key_shape = self.shape(&key.target)?;
                if !matches!(key_shape.kind, ShapeKind::String | ShapeKind::Enum(_)) {
                    return Err(ResolutionError::NonStringMapKey {
                        shape: shape.id.clone(),
                        key: key.target.clone(),
                    });
                }
                self.resolve_member(shape, value)?
                    .map_type(|ty| RustType::HashMap(Box::new(ty)))
            }
            ShapeKind::Enum(_) | ShapeKind::Union(_) => self.generated(shape, SymbolLocation::Model),
            ShapeKind::Structure(_) => {
                let location = if shape.traits.is_synthetic() {
                    SymbolLocation::Input
                } else if shape.traits.is_error() {
                    SymbolLocation::Error
                } else {
                    SymbolLocation::Model
                };
                self.generated(shape, location)
            }
            ShapeKind::Operation(_) => self.generated(shape, SymbolLocation::Operation),
            ShapeKind::Service(_) => self.generated(shape, SymbolLocation::Root),
        };
        tracing::trace!(shape = %shape.id, ty = %symbol.tokens(), "resolved");
        Ok(symbol)
    }

    /// Resolve a member of `container`, applying optional and then boxed wrapping.
    pub fn resolve_member(&self, container: &Shape, member: &MemberShape) -> Result<Symbol, ResolutionError> {
        if self.is_streaming(member)? {
            return Ok(self.external(LogicalType::ByteStream));
        }
        let mut symbol = self.resolve(self.shape(&member.target)?)?;
        if self.is_optional(container, member)? {
            symbol = symbol.map_type(RustType::option);
        }
        if member.traits.boxed {
            symbol = symbol.map_type(RustType::boxed);
        }
        Ok(symbol)
    }

    /// Resolve `namespace#Container$member`.
    pub fn resolve_member_id(&self, id: &ShapeId) -> Result<Symbol, ResolutionError> {
        let (container, member) = self.member_by_id(id)?;
        self.resolve_member(container, member)
    }

    pub fn member_by_id(&self, id: &ShapeId) -> Result<(&'a Shape, &'a MemberShape), ResolutionError> {
        let not_a_member = || ResolutionError::NotAMember { id: id.clone() };
        let name = id.member().ok_or_else(not_a_member)?;
        let container = self.shape(&id.without_member())?;
        let member = container.member(name).ok_or_else(not_a_member)?;
        Ok((container, member))
    }

    /// `true` for a member targeting a blob, when either the member or the blob carries `@streaming`.
    pub fn is_streaming(&self, member: &MemberShape) -> Result<bool, ResolutionError> {
        let target = self.shape(&member.target)?;
        Ok(matches!(target.kind, ShapeKind::Blob) && (member.traits.streaming || target.traits.streaming))
    }

    /// Only structure members can be optional, and only when not required and without a usable default.
    pub fn is_optional(&self, container: &Shape, member: &MemberShape) -> Result<bool, ResolutionError> {
        if !container.is_structure() || self.is_streaming(member)? {
            return Ok(false);
        }
        Ok(!member.traits.required && self.usable_default(member)?.is_none())
    }

    /// The member's default value (else its target's), if present and compatible with the target.
    pub fn usable_default(&self, member: &MemberShape) -> Result<Option<Value>, ResolutionError> {
        let target = self.shape(&member.target)?;
        let candidate = member.traits.default.as_ref().or(target.traits.default.as_ref());
        Ok(candidate
            .filter(|value| default_is_compatible(target, value))
            .cloned())
    }

    fn external(&self, logical: LogicalType) -> Symbol {
        let runtime = self.runtime.lookup(logical);
        Symbol {
            dependencies: runtime.dependency.iter().cloned().collect(),
            rust_type: RustType::External(runtime),
            location: SymbolLocation::External,
        }
    }

    fn generated(&self, shape: &Shape, location: SymbolLocation) -> Symbol {
        Symbol {
            rust_type: RustType::Generated {
                name: names::type_name(shape),
                location,
            },
            location,
            dependencies: Vec::new(),
        }
    }
}

/// Compatibility rules between a default value and the shape it initializes.
pub fn default_is_compatible(target: &Shape, value: &Value) -> bool {
    match (&target.kind, value) {
        (ShapeKind::Boolean, Value::Bool(_)) => true,
        (ShapeKind::Byte, Value::Number(n)) => n.as_i64().is_some_and(|v| i8::try_from(v).is_ok()),
        (ShapeKind::Short, Value::Number(n)) => n.as_i64().is_some_and(|v| i16::try_from(v).is_ok()),
        (ShapeKind::Integer, Value::Number(n)) => n.as_i64().is_some_and(|v| i32::try_from(v).is_ok()),
        (ShapeKind::Long, Value::Number(n)) => n.as_i64().is_some(),
        (ShapeKind::Float | ShapeKind::Double, Value::Number(n)) => n.as_f64().is_some_and(f64::is_finite),
        (ShapeKind::String, Value::String(_)) => true,
        (ShapeKind::Enum(values), Value::String(text)) => values.iter().any(|v| &v.value == text),
        (ShapeKind::List(_) | ShapeKind::Set(_), Value::Array(items)) => items.is_empty(),
        (ShapeKind::Map { .. }, Value::Object(entries)) => entries.is_empty(),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{MemberShape, prelude};
    use quote::quote;

    fn id(name: &str) -> ShapeId {
        ShapeId::new("example", name)
    }

    fn model() -> Model {
        let mut required = MemberShape::new("name", prelude("String"));
        required.traits.required = true;
        let mut defaulted = MemberShape::new("count", prelude("Integer"));
        defaulted.traits.default = Some(serde_json::json!(5));
        let mut bad_default = MemberShape::new("when", prelude("Timestamp"));
        bad_default.traits.default = Some(serde_json::json!(0));
        Model::from_shapes([
            Shape::new(
                id("Person"),
                ShapeKind::Structure(vec![
                    required,
                    MemberShape::new("age", prelude("Integer")),
                    defaulted,
                    bad_default,
                    MemberShape::new("score", prelude("PrimitiveDouble")),
                ]),
            ),
            Shape::new(id("Names"), ShapeKind::Set(MemberShape::new("member", prelude("String")))),
            Shape::new(id("Scores"), ShapeKind::Set(MemberShape::new("member", prelude("Double")))),
            Shape::new(
                id("ByCount"),
                ShapeKind::Map {
                    key: MemberShape::new("key", prelude("Integer")),
                    value: MemberShape::new("value", prelude("String")),
                },
            ),
            Shape::new(id("Loop"), ShapeKind::Structure(vec![MemberShape::new("next", id("Loop"))])),
        ])
    }

    #[test]
    fn streaming_blobs_resolve_to_a_required_byte_stream() {
        let mut body = Shape::new(id("Body"), ShapeKind::Blob);
        body.traits.streaming = true;
        let mut flagged = MemberShape::new("flagged", prelude("Blob"));
        flagged.traits.streaming = true;
        let model = Model::from_shapes([
            body,
            Shape::new(
                id("Download"),
                ShapeKind::Structure(vec![
                    MemberShape::new("body", id("Body")),
                    flagged,
                    MemberShape::new("plain", prelude("Blob")),
                ]),
            ),
        ]);
        let runtime = RuntimeTypes::default();
        let resolver = SymbolResolver::new(&model, &runtime);
        let member = |name: &str| {
            resolver
                .resolve_member_id(&id("Download").with_member(name))
                .unwrap()
                .tokens()
                .to_string()
        };
        let stream = quote!(::shapegen_runtime::byte_stream::ByteStream).to_string();
        assert_eq!(member("body"), stream);
        assert_eq!(member("flagged"), stream);
        assert_eq!(
            member("plain"),
            quote!(::std::option::Option<::shapegen_runtime::blob::Blob>).to_string()
        );
        // The blob shape itself stays a plain blob outside of member position.
        assert_eq!(
            resolver.resolve_id(&id("Body")).unwrap().tokens().to_string(),
            quote!(::shapegen_runtime::blob::Blob).to_string()
        );
    }

    fn member_type(resolver: &SymbolResolver<'_>, name: &str) -> String {
        resolver
            .resolve_member_id(&id("Person").with_member(name))
            .unwrap()
            .tokens()
            .to_string()
    }

    #[test]
    fn optionality_follows_required_and_defaults() {
        let model = model();
        let runtime = RuntimeTypes::default();
        let resolver = SymbolResolver::new(&model, &runtime);
        assert_eq!(member_type(&resolver, "name"), quote!(::std::string::String).to_string());
        assert_eq!(member_type(&resolver, "age"), quote!(::std::option::Option<i32>).to_string());
        assert_eq!(member_type(&resolver, "count"), quote!(i32).to_string());
        assert_eq!(member_type(&resolver, "score"), quote!(f64).to_string());
        assert_eq!(
            member_type(&resolver, "when"),
            quote!(::std::option::Option<::shapegen_runtime::instant::Instant>).to_string()
        );
    }

    #[test]
    fn sets_of_non_strings_fall_back_to_vec() {
        let model = model();
        let runtime = RuntimeTypes::default();
        let resolver = SymbolResolver::new(&model, &runtime);
        let names = resolver.resolve_id(&id("Names")).unwrap();
        assert_eq!(names.rust_type, RustType::HashSet(Box::new(RustType::String)));
        let scores = resolver.resolve_id(&id("Scores")).unwrap();
        assert_eq!(scores.rust_type, RustType::Vec(Box::new(RustType::F64)));
    }

    #[test]
    fn failures_name_the_shape() {
        let model = model();
        let runtime = RuntimeTypes::default();
        let resolver = SymbolResolver::new(&model, &runtime);
        assert_eq!(
            resolver.resolve_id(&id("ByCount")).unwrap_err(),
            ResolutionError::NonStringMapKey {
                shape: id("ByCount"),
                key: prelude("Integer")
            }
        );
        assert_eq!(
            resolver.resolve_id(&id("Loop")).unwrap_err(),
            ResolutionError::UnboxedCycle { shape: id("Loop") }
        );
        assert_eq!(
            resolver.resolve_id(&id("Missing")).unwrap_err(),
            ResolutionError::UnknownShape { id: id("Missing") }
        );
        assert_eq!(
            resolver.resolve_id(&id("Person").with_member("nope")).unwrap_err(),
            ResolutionError::NotAMember {
                id: id("Person").with_member("nope")
            }
        );
    }
}
