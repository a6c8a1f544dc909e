//! The IDL shape graph.
//!
//! A [`Model`] is an immutable map from [`ShapeId`] to [`Shape`]. Passes that change the graph (normalization,
//! cycle boxing) return a new model rather than mutating one in place.
//!
//! ## Notes
//!
//! - The prelude scalars (`smithy.api#String`, `smithy.api#PrimitiveInteger`, ...) are always present in a model
//!   built with [`Model::new`] or loaded from JSON.
//! - `Primitive*` prelude shapes carry a zero default, which makes members targeting them non-optional.
//!
//! ## See also
//!
//! - [`json_ast`]: loads a model from the JSON AST representation.
//! - [`recursion`]: finds reference cycles that need heap indirection.

pub mod errors;
pub mod json_ast;
pub mod recursion;
pub mod shape_id;
pub mod shapes;
pub mod traits;

use std::collections::{BTreeMap, BTreeSet};

pub use errors::ModelError;
pub use shape_id::ShapeId;
pub use shapes::{EnumValue, MemberShape, OperationShape, ServiceShape, Shape, ShapeKind};
pub use traits::{
    AppliesTo, ErrorFault, HttpRequestTestCase, HttpResponseTestCase, HttpTrait, SyntheticInput, TimestampFormat, Traits,
    XmlNamespace,
};

/// Namespace of the built-in prelude shapes.
pub const PRELUDE_NAMESPACE: &str = "smithy.api";

#[derive(Debug, Clone, PartialEq)]
pub struct Model {
    shapes: BTreeMap<ShapeId, Shape>,
}

impl Default for Model {
    fn default() -> Self {
        Self::new()
    }
}

impl Model {
    /// A model holding only the prelude.
    pub fn new() -> Self {
        let mut model = Model::empty();
        for shape in prelude_shapes() {
            model.shapes.insert(shape.id.clone(), shape);
        }
        model
    }

    /// A model with no shapes at all, not even the prelude.
    pub fn empty() -> Self {
        Model {
            shapes: BTreeMap::new(),
        }
    }

    /// The prelude plus `shapes`.
    pub fn from_shapes(shapes: impl IntoIterator<Item = Shape>) -> Self {
        let mut model = Model::new();
        for shape in shapes {
            model.insert(shape);
        }
        model
    }

    pub fn get(&self, id: &ShapeId) -> Option<&Shape> {
        self.shapes.get(id)
    }

    pub fn expect_shape(&self, id: &ShapeId) -> Result<&Shape, ModelError> {
        self.shapes.get(id).ok_or_else(|| ModelError::MissingShape(id.clone()))
    }

    /// Add or replace a shape.
    pub fn insert(&mut self, shape: Shape) {
        self.shapes.insert(shape.id.clone(), shape);
    }

    /// A copy of this model with `shape` added or replaced.
    pub fn with_shape(&self, shape: Shape) -> Model {
        let mut model = self.clone();
        model.insert(shape);
        model
    }

    /// Every shape, in id order.
    pub fn shapes(&self) -> impl Iterator<Item = &Shape> {
        self.shapes.values()
    }

    pub fn len(&self) -> usize {
        self.shapes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }

    /// Operations bound to `service`, in declaration order.
    pub fn operations_of(&self, service: &ShapeId) -> Result<Vec<&Shape>, ModelError> {
        let shape = self.expect_shape(service)?;
        let declared = shape.as_service().ok_or_else(|| ModelError::Malformed {
            id: service.to_string(),
            message: "expected a service shape".to_string(),
        })?;
        declared.operations.iter().map(|op| self.expect_shape(op)).collect()
    }

    /// Every shape reachable from `root`, including `root`, in id order.
    pub fn walk_closure(&self, root: &ShapeId) -> Result<Vec<&Shape>, ModelError> {
        let mut seen: BTreeSet<&ShapeId> = BTreeSet::new();
        let mut pending = vec![self.expect_shape(root)?];
        while let Some(shape) = pending.pop() {
            if !seen.insert(&shape.id) {
                continue;
            }
            for next in neighbours(shape) {
                if !seen.contains(next) {
                    pending.push(self.expect_shape(next)?);
                }
            }
        }
        Ok(seen.into_iter().filter_map(|id| self.shapes.get(id)).collect())
    }
}

fn neighbours(shape: &Shape) -> Vec<&ShapeId> {
    match &shape.kind {
        ShapeKind::Service(service) => service.operations.iter().collect(),
        ShapeKind::Operation(operation) => operation
            .input
            .iter()
            .chain(operation.output.iter())
            .chain(operation.errors.iter())
            .collect(),
        _ => {
            let body = shape.traits.synthetic_input.as_ref().and_then(|marker| marker.body.as_ref());
            shape
                .members()
                .into_iter()
                .map(|member| &member.target)
                .chain(body)
                .collect()
        }
    }
}

fn prelude_shapes() -> Vec<Shape> {
    let scalar = |name: &str, kind: ShapeKind| Shape::new(ShapeId::new(PRELUDE_NAMESPACE, name), kind);
    let primitive = |name: &str, kind: ShapeKind, default: serde_json::Value| {
        let mut shape = scalar(name, kind);
        shape.traits.default = Some(default);
        shape
    };
    vec![
        scalar("String", ShapeKind::String),
        scalar("Blob", ShapeKind::Blob),
        scalar("Boolean", ShapeKind::Boolean),
        scalar("Byte", ShapeKind::Byte),
        scalar("Short", ShapeKind::Short),
        scalar("Integer", ShapeKind::Integer),
        scalar("Long", ShapeKind::Long),
        scalar("Float", ShapeKind::Float),
        scalar("Double", ShapeKind::Double),
        scalar("Timestamp", ShapeKind::Timestamp),
        scalar("Document", ShapeKind::Document),
        scalar("Unit", ShapeKind::Structure(Vec::new())),
        primitive("PrimitiveBoolean", ShapeKind::Boolean, serde_json::Value::Bool(false)),
        primitive("PrimitiveByte", ShapeKind::Byte, 0.into()),
        primitive("PrimitiveShort", ShapeKind::Short, 0.into()),
        primitive("PrimitiveInteger", ShapeKind::Integer, 0.into()),
        primitive("PrimitiveLong", ShapeKind::Long, 0.into()),
        primitive("PrimitiveFloat", ShapeKind::Float, 0.into()),
        primitive("PrimitiveDouble", ShapeKind::Double, 0.into()),
    ]
}

/// Shorthand for a prelude shape id.
pub fn prelude(name: &str) -> ShapeId {
    ShapeId::new(PRELUDE_NAMESPACE, name)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(name: &str) -> ShapeId {
        ShapeId::new("example", name)
    }

    #[test]
    fn prelude_is_always_present() {
        let model = Model::new();
        assert!(model.get(&prelude("String")).is_some());
        let primitive = model.expect_shape(&prelude("PrimitiveInteger")).unwrap();
        assert_eq!(primitive.traits.default, Some(serde_json::json!(0)));
    }

    #[test]
    fn closure_follows_operations_and_members() {
        let model = Model::from_shapes([
            Shape::new(
                id("Service"),
                ShapeKind::Service(ServiceShape {
                    version: "1".into(),
                    operations: vec![id("Op")],
                }),
            ),
            Shape::new(
                id("Op"),
                ShapeKind::Operation(OperationShape {
                    input: Some(id("OpRequest")),
                    ..Default::default()
                }),
            ),
            Shape::new(
                id("OpRequest"),
                ShapeKind::Structure(vec![MemberShape::new("tags", id("Tags"))]),
            ),
            Shape::new(id("Tags"), ShapeKind::List(MemberShape::new("member", prelude("String")))),
            Shape::new(id("Unreachable"), ShapeKind::Structure(Vec::new())),
        ]);
        let names: Vec<String> = model
            .walk_closure(&id("Service"))
            .unwrap()
            .iter()
            .map(|shape| shape.id.to_string())
            .collect();
        assert_eq!(
            names,
            vec!["example#Op", "example#OpRequest", "example#Service", "example#Tags", "smithy.api#String"]
        );
    }

    #[test]
    fn with_shape_leaves_original_untouched() {
        let model = Model::new();
        let extended = model.with_shape(Shape::new(id("A"), ShapeKind::String));
        assert!(model.get(&id("A")).is_none());
        assert!(extended.get(&id("A")).is_some());
    }
}
