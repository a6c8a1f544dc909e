//! Cycle-breaking pre-pass: marks the back edges of reference cycles as boxed.

use crate::model::{Model, ShapeKind, recursion};

/// Return a model in which every structure/union reference cycle has at least one boxed member.
///
/// Running the pass again on its output changes nothing.
#[tracing::instrument(skip_all, fields(shapes = model.len()))]
pub fn box_recursive_shapes(model: &Model) -> Model {
    let edges = recursion::back_edges(model);
    let mut boxed = model.clone();
    for member_id in edges {
        let container_id = member_id.without_member();
        let Some(mut container) = boxed.get(&container_id).cloned() else {
            continue;
        };
        if let ShapeKind::Structure(members) | ShapeKind::Union(members) = &mut container.kind {
            for member in members.iter_mut().filter(|m| Some(m.name.as_str()) == member_id.member()) {
                tracing::debug!(member = %member_id, "boxing recursive member");
                member.traits.boxed = true;
            }
        }
        boxed.insert(container);
    }
    boxed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{MemberShape, Shape, ShapeId, prelude};

    fn id(name: &str) -> ShapeId {
        ShapeId::new("example", name)
    }

    #[test]
    fn boxes_self_reference_once() {
        let model = Model::from_shapes([Shape::new(
            id("Node"),
            ShapeKind::Structure(vec![
                MemberShape::new("value", prelude("String")),
                MemberShape::new("next", id("Node")),
            ]),
        )]);
        let boxed = box_recursive_shapes(&model);
        let node = boxed.expect_shape(&id("Node")).unwrap();
        assert!(!node.member("value").unwrap().traits.boxed);
        assert!(node.member("next").unwrap().traits.boxed);
        assert_eq!(box_recursive_shapes(&boxed), boxed);
        assert!(recursion::unboxed_cycles(&boxed).is_empty());
    }

    #[test]
    fn recursive_union_is_boxed() {
        let model = Model::from_shapes([Shape::new(
            id("Expr"),
            ShapeKind::Union(vec![
                MemberShape::new("literal", prelude("Integer")),
                MemberShape::new("negate", id("Expr")),
            ]),
        )]);
        let boxed = box_recursive_shapes(&model);
        assert!(boxed.expect_shape(&id("Expr")).unwrap().member("negate").unwrap().traits.boxed);
    }
}
