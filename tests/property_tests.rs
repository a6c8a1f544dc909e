//! Property-based tests for the shape pipeline
//!
//! These tests use proptest to check the invariants of resolution, builders, boxing, normalization and protocol
//! selection over randomly generated models.

use proptest::prelude::*;
use shapegen::codegen::protocol::{ProtocolId, ProtocolLoader, protocol_for};
use shapegen::codegen::{CodegenCtx, RuntimeTypes, SymbolResolver, boxer, builder, normalizer};
use shapegen::model::{
    MemberShape, Model, OperationShape, ServiceShape, Shape, ShapeId, ShapeKind, prelude, recursion,
};

fn id(name: &str) -> ShapeId {
    ShapeId::new("example", name)
}

/// One generated structure member: required flag and an optional integer default.
#[derive(Debug, Clone)]
struct MemberPlan {
    required: bool,
    default: Option<i64>,
}

fn member_strategy() -> impl Strategy<Value = MemberPlan> {
    (any::<bool>(), prop::option::of(prop_oneof![-100i64..100, any::<i64>()]))
        .prop_map(|(required, default)| MemberPlan { required, default })
}

fn structure(plans: &[MemberPlan]) -> Shape {
    let members = plans
        .iter()
        .enumerate()
        .map(|(i, plan)| {
            let mut member = MemberShape::new(format!("field{i}"), prelude("Integer"));
            member.traits.required = plan.required;
            member.traits.default = plan.default.map(|value| serde_json::json!(value));
            member
        })
        .collect();
    Shape::new(id("Record"), ShapeKind::Structure(members))
}

fn usable(plan: &MemberPlan) -> bool {
    plan.default.is_some_and(|value| i32::try_from(value).is_ok())
}

/// A service with one operation whose input is `Record`.
fn service_model(record: Shape) -> Model {
    Model::from_shapes([
        record,
        Shape::new(
            id("Put"),
            ShapeKind::Operation(OperationShape {
                input: Some(id("Record")),
                ..Default::default()
            }),
        ),
        Shape::new(
            id("Svc"),
            ShapeKind::Service(ServiceShape {
                version: "1".to_string(),
                operations: vec![id("Put")],
            }),
        ),
    ])
}

/// Structures `S0..Sn`, each with the members listed in `edges` (indices of targets).
fn graph(edges: &[Vec<usize>]) -> Model {
    let count = edges.len();
    Model::from_shapes(edges.iter().enumerate().map(|(i, targets)| {
        let members = targets
            .iter()
            .enumerate()
            .map(|(j, target)| MemberShape::new(format!("m{j}"), id(&format!("S{}", target % count))))
            .collect();
        Shape::new(id(&format!("S{i}")), ShapeKind::Structure(members))
    }))
}

fn graph_strategy() -> impl Strategy<Value = Vec<Vec<usize>>> {
    prop::collection::vec(prop::collection::vec(0usize..6, 0..4), 1..6)
}

fn declared_strategy() -> impl Strategy<Value = Vec<String>> {
    let ids = vec![
        "aws.protocols#awsJson1_0",
        "aws.protocols#awsJson1_1",
        "aws.protocols#restJson1",
        "aws.protocols#restXml",
        "aws.protocols#awsQuery",
        "aws.protocols#ec2Query",
    ];
    prop::sample::subsequence(ids, 0..=6)
        .prop_shuffle()
        .prop_map(|ids| ids.into_iter().map(str::to_string).collect())
}

proptest! {
    /// Property: resolving a shape twice yields equal symbols
    #[test]
    fn resolution_is_deterministic(plans in prop::collection::vec(member_strategy(), 0..8)) {
        let model = Model::from_shapes([structure(&plans)]);
        let runtime = RuntimeTypes::default();
        let resolver = SymbolResolver::new(&model, &runtime);
        let record = model.get(&id("Record")).unwrap();
        for member in record.members() {
            let first = resolver.resolve_member(record, member).unwrap();
            let second = resolver.resolve_member(record, member).unwrap();
            prop_assert_eq!(first, second);
        }
    }

    /// Property: a member is optional exactly when it is not required and has no usable default
    #[test]
    fn optionality_follows_required_and_default(plans in prop::collection::vec(member_strategy(), 1..8)) {
        let model = Model::from_shapes([structure(&plans)]);
        let runtime = RuntimeTypes::default();
        let resolver = SymbolResolver::new(&model, &runtime);
        let record = model.get(&id("Record")).unwrap();
        for (member, plan) in record.members().into_iter().zip(&plans) {
            let symbol = resolver.resolve_member(record, member).unwrap();
            prop_assert_eq!(symbol.rust_type.is_option(), !plan.required && !usable(plan));
        }
    }

    /// Property: `build` is fallible exactly when a required member lacks a usable default
    #[test]
    fn fallibility_follows_required_members(plans in prop::collection::vec(member_strategy(), 0..8)) {
        let model = service_model(structure(&plans));
        let runtime = RuntimeTypes::default();
        let symbols = SymbolResolver::new(&model, &runtime);
        let protocol = protocol_for(ProtocolId::RestJson1);
        let ctx = CodegenCtx {
            model: &model,
            symbols: &symbols,
            runtime: &runtime,
            protocol: protocol.as_ref(),
            service: model.get(&id("Svc")).unwrap(),
        };
        let expected = plans.iter().any(|plan| plan.required && !usable(plan));
        prop_assert_eq!(builder::is_fallible(&ctx, model.get(&id("Record")).unwrap()).unwrap(), expected);
    }

    /// Property: after boxing no cycle is left unboxed, and boxing again changes nothing
    #[test]
    fn boxing_breaks_every_cycle(edges in graph_strategy()) {
        let model = graph(&edges);
        let boxed = boxer::box_recursive_shapes(&model);
        prop_assert!(recursion::unboxed_cycles(&boxed).is_empty());
        prop_assert_eq!(boxer::box_recursive_shapes(&boxed), boxed);
    }

    /// Property: normalizing a normalized model changes nothing
    #[test]
    fn normalization_is_idempotent(with_input in prop::collection::vec(any::<bool>(), 1..5)) {
        let mut shapes = Vec::new();
        for (i, has_input) in with_input.iter().enumerate() {
            let input = has_input.then(|| id(&format!("Op{i}Request")));
            if let Some(input) = &input {
                shapes.push(Shape::new(
                    input.clone(),
                    ShapeKind::Structure(vec![MemberShape::new("value", prelude("String"))]),
                ));
            }
            shapes.push(Shape::new(
                id(&format!("Op{i}")),
                ShapeKind::Operation(OperationShape { input, ..Default::default() }),
            ));
        }
        let model = Model::from_shapes(shapes);
        let once = normalizer::normalize(&model, normalizer::all_members);
        let twice = normalizer::normalize(&once, normalizer::all_members);
        prop_assert_eq!(&once, &twice);
        for i in 0..with_input.len() {
            let op = once.get(&id(&format!("Op{i}"))).unwrap().as_operation().unwrap();
            prop_assert_eq!(op.input.clone(), Some(id(&format!("Op{i}Input"))));
        }
    }

    /// Property: the selected protocol is the highest-priority implemented one, whatever the declaration order
    #[test]
    fn selection_ignores_declaration_order(declared in declared_strategy()) {
        let loader = ProtocolLoader::new();
        let expected = ProtocolId::ALL
            .into_iter()
            .find(|protocol| declared.iter().any(|id| id == protocol.trait_id()));
        match (loader.select(&declared), expected) {
            (Ok(selected), Some(expected)) => prop_assert_eq!(selected, expected),
            (Err(_), None) => {}
            (got, want) => prop_assert!(false, "selected {:?}, expected {:?}", got.ok(), want),
        }
    }
}
