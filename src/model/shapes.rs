//! Shape graph nodes.

use super::ShapeId;
use super::traits::Traits;

#[derive(Debug, Clone, PartialEq)]
pub struct Shape {
    pub id: ShapeId,
    pub kind: ShapeKind,
    pub traits: Traits,
}

/// One arm per shape kind the generator knows how to map.
#[derive(Debug, Clone, PartialEq)]
pub enum ShapeKind {
    Boolean,
    Byte,
    Short,
    Integer,
    Long,
    Float,
    Double,
    String,
    Blob,
    Timestamp,
    Document,
    Enum(Vec<EnumValue>),
    List(MemberShape),
    Set(MemberShape),
    Map { key: MemberShape, value: MemberShape },
    Structure(Vec<MemberShape>),
    Union(Vec<MemberShape>),
    Operation(OperationShape),
    Service(ServiceShape),
}

#[derive(Debug, Clone, PartialEq)]
pub struct MemberShape {
    pub name: String,
    pub target: ShapeId,
    pub traits: Traits,
}

impl MemberShape {
    pub fn new(name: impl Into<String>, target: ShapeId) -> Self {
        MemberShape {
            name: name.into(),
            target,
            traits: Traits::default(),
        }
    }

    pub fn with_traits(mut self, traits: Traits) -> Self {
        self.traits = traits;
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct OperationShape {
    pub input: Option<ShapeId>,
    pub output: Option<ShapeId>,
    pub errors: Vec<ShapeId>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ServiceShape {
    pub version: String,
    pub operations: Vec<ShapeId>,
}

/// One entry of an enumeration: the wire value plus an optional symbolic name.
#[derive(Debug, Clone, PartialEq)]
pub struct EnumValue {
    pub value: String,
    pub name: Option<String>,
    pub documentation: Option<String>,
}

impl EnumValue {
    pub fn new(value: impl Into<String>) -> Self {
        EnumValue {
            value: value.into(),
            name: None,
            documentation: None,
        }
    }
}

impl Shape {
    pub fn new(id: ShapeId, kind: ShapeKind) -> Self {
        Shape {
            id,
            kind,
            traits: Traits::default(),
        }
    }

    pub fn with_traits(mut self, traits: Traits) -> Self {
        self.traits = traits;
        self
    }

    pub fn name(&self) -> &str {
        self.id.name()
    }

    /// Members in declaration order. Collections expose their element (and key) members.
    pub fn members(&self) -> Vec<&MemberShape> {
        match &self.kind {
            ShapeKind::Structure(members) | ShapeKind::Union(members) => members.iter().collect(),
            ShapeKind::List(member) | ShapeKind::Set(member) => vec![member],
            ShapeKind::Map { key, value } => vec![key, value],
            _ => Vec::new(),
        }
    }

    pub fn member(&self, name: &str) -> Option<&MemberShape> {
        self.members().into_iter().find(|member| member.name == name)
    }

    pub fn is_structure(&self) -> bool {
        matches!(self.kind, ShapeKind::Structure(_))
    }

    pub fn is_error(&self) -> bool {
        self.is_structure() && self.traits.is_error()
    }

    pub fn as_operation(&self) -> Option<&OperationShape> {
        match &self.kind {
            ShapeKind::Operation(operation) => Some(operation),
            _ => None,
        }
    }

    pub fn as_service(&self) -> Option<&ServiceShape> {
        match &self.kind {
            ShapeKind::Service(service) => Some(service),
            _ => None,
        }
    }

    /// Lower-case kind keyword, as written in models.
    pub fn kind_name(&self) -> &'static str {
        match &self.kind {
            ShapeKind::Boolean => "boolean",
            ShapeKind::Byte => "byte",
            ShapeKind::Short => "short",
            ShapeKind::Integer => "integer",
            ShapeKind::Long => "long",
            ShapeKind::Float => "float",
            ShapeKind::Double => "double",
            ShapeKind::String => "string",
            ShapeKind::Blob => "blob",
            ShapeKind::Timestamp => "timestamp",
            ShapeKind::Document => "document",
            ShapeKind::Enum(_) => "enum",
            ShapeKind::List(_) => "list",
            ShapeKind::Set(_) => "set",
            ShapeKind::Map { .. } => "map",
            ShapeKind::Structure(_) => "structure",
            ShapeKind::Union(_) => "union",
            ShapeKind::Operation(_) => "operation",
            ShapeKind::Service(_) => "service",
        }
    }
}
