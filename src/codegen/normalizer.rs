//! Operation normalization: every operation gets its own synthetic input structure.
//!
//! `Op`'s input becomes `<namespace>#OpInput`, a copy of the original input (or an empty structure when the
//! operation has none) carrying a [`SyntheticInput`] marker. A protocol may also ask for a body sub-shape,
//! `<namespace>#OpInputBody`, holding the members it serializes into the request document.

use crate::model::{MemberShape, Model, Shape, ShapeKind, SyntheticInput};

/// Protocol hook choosing the members of an input's body sub-shape; `None` means no body shape.
pub trait BodyMembers: Fn(&Model, &Shape, &Shape) -> Option<Vec<MemberShape>> {}

impl<F> BodyMembers for F where F: Fn(&Model, &Shape, &Shape) -> Option<Vec<MemberShape>> {}

/// Normalize every operation in `model`, returning a new model.
#[tracing::instrument(skip_all, fields(shapes = model.len()))]
pub fn normalize(model: &Model, body_members: impl BodyMembers) -> Model {
    let mut normalized = model.clone();
    let operations: Vec<&Shape> = model
        .shapes()
        .filter(|shape| matches!(shape.kind, ShapeKind::Operation(_)))
        .collect();

    for operation in operations {
        let ShapeKind::Operation(op) = &operation.kind else {
            continue;
        };
        let original = op.input.as_ref().and_then(|id| model.get(id));
        let already_done = original
            .and_then(|input| input.traits.synthetic_input.as_ref())
            .is_some_and(|marker| marker.operation == operation.id);
        if already_done {
            continue;
        }

        let input_id = operation.id.with_name(format!("{}Input", operation.name()));
        let mut input = match original {
            Some(shape) => Shape {
                id: input_id.clone(),
                kind: shape.kind.clone(),
                traits: shape.traits.clone(),
            },
            None => Shape::new(input_id.clone(), ShapeKind::Structure(Vec::new())),
        };

        let body = body_members(model, operation, &input).map(|members| {
            let mut body = Shape::new(
                operation.id.with_name(format!("{}InputBody", operation.name())),
                ShapeKind::Structure(members),
            );
            body.traits.synthetic_body = Some(operation.id.clone());
            body
        });
        input.traits.synthetic_input = Some(SyntheticInput {
            operation: operation.id.clone(),
            body: body.as_ref().map(|body| body.id.clone()),
        });
        tracing::debug!(operation = %operation.id, input = %input.id, body = body.is_some(), "normalized");

        let mut rewired = operation.clone();
        if let ShapeKind::Operation(op) = &mut rewired.kind {
            op.input = Some(input_id);
        }
        normalized.insert(input);
        if let Some(body) = body {
            normalized.insert(body);
        }
        normalized.insert(rewired);
    }
    normalized
}

/// Body hook that places every input member in the body (document protocols without HTTP bindings).
pub fn all_members(_: &Model, _: &Shape, input: &Shape) -> Option<Vec<MemberShape>> {
    match &input.kind {
        ShapeKind::Structure(members) if !members.is_empty() => Some(members.clone()),
        _ => None,
    }
}

/// Body hook that never creates a body.
pub fn no_body(_: &Model, _: &Shape, _: &Shape) -> Option<Vec<MemberShape>> {
    None
}
