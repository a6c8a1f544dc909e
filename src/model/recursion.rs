//! Reference-cycle detection over structure and union members.
//!
//! Only member edges between aggregates (structure or union → structure or union) count: collections already
//! store their elements on the heap. A member with `boxed` set is an indirection and breaks the cycle.

use std::collections::{BTreeMap, BTreeSet};

use super::{Model, Shape, ShapeId, ShapeKind};

fn is_aggregate(shape: &Shape) -> bool {
    matches!(shape.kind, ShapeKind::Structure(_) | ShapeKind::Union(_))
}

/// Direct, unboxed aggregate edges: `(member id, target id)` per source shape.
fn direct_edges(model: &Model) -> BTreeMap<&ShapeId, Vec<(ShapeId, &ShapeId)>> {
    let mut edges = BTreeMap::new();
    for shape in model.shapes().filter(|shape| is_aggregate(shape)) {
        let out: Vec<(ShapeId, &ShapeId)> = shape
            .members()
            .into_iter()
            .filter(|member| !member.traits.boxed)
            .filter(|member| model.get(&member.target).is_some_and(is_aggregate))
            .map(|member| (shape.id.with_member(member.name.clone()), &member.target))
            .collect();
        edges.insert(&shape.id, out);
    }
    edges
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Visit {
    InProgress,
    Done,
}

/// Members that close a cycle during a depth-first walk in id order.
///
/// Marking every returned member as boxed leaves no unboxed cycle behind.
pub fn back_edges(model: &Model) -> Vec<ShapeId> {
    let edges = direct_edges(model);
    let mut state: BTreeMap<&ShapeId, Visit> = BTreeMap::new();
    let mut found = Vec::new();
    for root in edges.keys() {
        if !state.contains_key(root) {
            visit(*root, &edges, &mut state, &mut found);
        }
    }
    found
}

fn visit<'a>(
    node: &'a ShapeId,
    edges: &BTreeMap<&'a ShapeId, Vec<(ShapeId, &'a ShapeId)>>,
    state: &mut BTreeMap<&'a ShapeId, Visit>,
    found: &mut Vec<ShapeId>,
) {
    state.insert(node, Visit::InProgress);
    for (member, target) in edges.get(node).map(Vec::as_slice).unwrap_or_default() {
        match state.get(*target) {
            Some(Visit::InProgress) => found.push(member.clone()),
            Some(Visit::Done) => {}
            None => visit(*target, edges, state, found),
        }
    }
    state.insert(node, Visit::Done);
}

/// Shapes that sit on a cycle made only of unboxed members (Tarjan's strongly connected components).
pub fn unboxed_cycles(model: &Model) -> BTreeSet<ShapeId> {
    let edges = direct_edges(model);
    let mut tarjan = Tarjan {
        edges: &edges,
        index: 0,
        indices: BTreeMap::new(),
        lowlink: BTreeMap::new(),
        stack: Vec::new(),
        on_stack: BTreeSet::new(),
        cyclic: BTreeSet::new(),
    };
    for node in edges.keys() {
        if !tarjan.indices.contains_key(node) {
            tarjan.connect(*node);
        }
    }
    tarjan.cyclic
}

struct Tarjan<'m, 'e> {
    edges: &'e BTreeMap<&'m ShapeId, Vec<(ShapeId, &'m ShapeId)>>,
    index: usize,
    indices: BTreeMap<&'m ShapeId, usize>,
    lowlink: BTreeMap<&'m ShapeId, usize>,
    stack: Vec<&'m ShapeId>,
    on_stack: BTreeSet<&'m ShapeId>,
    cyclic: BTreeSet<ShapeId>,
}

impl<'m> Tarjan<'m, '_> {
    fn connect(&mut self, node: &'m ShapeId) {
        self.indices.insert(node, self.index);
        self.lowlink.insert(node, self.index);
        self.index += 1;
        self.stack.push(node);
        self.on_stack.insert(node);

        let targets: Vec<&'m ShapeId> = self
            .edges
            .get(node)
            .map(|out| out.iter().map(|(_, target)| *target).collect())
            .unwrap_or_default();
        let mut self_loop = false;
        for target in targets {
            if target == node {
                self_loop = true;
            }
            if !self.indices.contains_key(target) {
                self.connect(target);
                let low = self.lowlink[target].min(self.lowlink[node]);
                self.lowlink.insert(node, low);
            } else if self.on_stack.contains(target) {
                let low = self.indices[target].min(self.lowlink[node]);
                self.lowlink.insert(node, low);
            }
        }

        if self.lowlink[node] == self.indices[node] {
            let mut component = Vec::new();
            while let Some(top) = self.stack.pop() {
                self.on_stack.remove(top);
                component.push(top);
                if top == node {
                    break;
                }
            }
            if component.len() > 1 || self_loop {
                self.cyclic.extend(component.into_iter().cloned());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{MemberShape, prelude};

    fn id(name: &str) -> ShapeId {
        ShapeId::new("example", name)
    }

    fn structure(name: &str, members: &[(&str, &str)]) -> Shape {
        Shape::new(
            id(name),
            ShapeKind::Structure(
                members
                    .iter()
                    .map(|(member, target)| MemberShape::new(*member, id(target)))
                    .collect(),
            ),
        )
    }

    #[test]
    fn self_reference_is_a_cycle() {
        let model = Model::from_shapes([structure("Node", &[("next", "Node")])]);
        assert_eq!(back_edges(&model), vec![id("Node").with_member("next")]);
        assert!(unboxed_cycles(&model).contains(&id("Node")));
    }

    #[test]
    fn mutual_recursion_has_one_back_edge() {
        let model = Model::from_shapes([structure("A", &[("b", "B")]), structure("B", &[("a", "A")])]);
        assert_eq!(back_edges(&model), vec![id("B").with_member("a")]);
        assert_eq!(unboxed_cycles(&model).len(), 2);
    }

    #[test]
    fn collections_break_cycles() {
        let list = Shape::new(id("Nodes"), ShapeKind::List(MemberShape::new("member", id("Tree"))));
        let model = Model::from_shapes([structure("Tree", &[("children", "Nodes")]), list]);
        assert!(back_edges(&model).is_empty());
        assert!(unboxed_cycles(&model).is_empty());
    }

    #[test]
    fn boxed_members_break_cycles() {
        let mut node = structure("Node", &[("next", "Node")]);
        if let ShapeKind::Structure(members) = &mut node.kind {
            members[0].traits.boxed = true;
        }
        let leaf = Shape::new(
            id("Leaf"),
            ShapeKind::Structure(vec![MemberShape::new("v", prelude("String"))]),
        );
        let model = Model::from_shapes([node, leaf]);
        assert!(back_edges(&model).is_empty());
        assert!(unboxed_cycles(&model).is_empty());
    }
}
