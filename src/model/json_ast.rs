//! Loader for the JSON AST form of a model.
//!
//! Only the subset the generator consumes is read: shape types, members, operation/service wiring and the traits
//! in [`Traits`]. Resources and unknown traits are skipped.

use std::collections::BTreeMap;

use serde::Deserialize;
use serde_json::{Map, Value};

use super::{
    EnumValue, ErrorFault, HttpTrait, MemberShape, Model, ModelError, OperationShape, ServiceShape, Shape, ShapeId,
    ShapeKind, TimestampFormat, Traits, XmlNamespace, prelude,
};

/// Namespace whose traits declare service protocols.
const PROTOCOL_TRAIT_NAMESPACE: &str = "aws.protocols";

#[derive(Debug, Deserialize)]
struct AstModel {
    #[serde(default)]
    shapes: BTreeMap<String, AstShape>,
}

#[derive(Debug, Deserialize)]
struct AstShape {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    members: Option<Map<String, Value>>,
    #[serde(default)]
    member: Option<AstMember>,
    #[serde(default)]
    key: Option<AstMember>,
    #[serde(default)]
    value: Option<AstMember>,
    #[serde(default)]
    traits: Map<String, Value>,
    #[serde(default)]
    input: Option<AstTarget>,
    #[serde(default)]
    output: Option<AstTarget>,
    #[serde(default)]
    errors: Vec<AstTarget>,
    #[serde(default)]
    operations: Vec<AstTarget>,
    #[serde(default)]
    version: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AstMember {
    target: String,
    #[serde(default)]
    traits: Map<String, Value>,
}

#[derive(Debug, Deserialize)]
struct AstTarget {
    target: String,
}

/// Parse a JSON AST document into a [`Model`] (prelude included).
#[tracing::instrument(skip_all, fields(bytes = text.len()))]
pub fn load_json(text: &str) -> Result<Model, ModelError> {
    let ast: AstModel = serde_json::from_str(text)?;
    let mut model = Model::new();
    for (raw_id, shape) in ast.shapes {
        let id = ShapeId::parse(&raw_id)?;
        if let Some(converted) = convert_shape(id, shape)? {
            model.insert(converted);
        }
    }
    validate_targets(&model)?;
    tracing::debug!(shapes = model.len(), "loaded model");
    Ok(model)
}

fn convert_shape(id: ShapeId, shape: AstShape) -> Result<Option<Shape>, ModelError> {
    let traits = convert_traits(&id, &shape.traits)?;
    let kind = match shape.kind.as_str() {
        "boolean" => ShapeKind::Boolean,
        "byte" => ShapeKind::Byte,
        "short" => ShapeKind::Short,
        "integer" => ShapeKind::Integer,
        "long" => ShapeKind::Long,
        "float" => ShapeKind::Float,
        "double" => ShapeKind::Double,
        "blob" => ShapeKind::Blob,
        "timestamp" => ShapeKind::Timestamp,
        "document" => ShapeKind::Document,
        "string" => match shape.traits.get("smithy.api#enum") {
            Some(values) => ShapeKind::Enum(legacy_enum_values(&id, values)?),
            None => ShapeKind::String,
        },
        "enum" => ShapeKind::Enum(enum_members(&id, shape.members.as_ref())?),
        "list" => ShapeKind::List(collection_member(&id, "member", shape.member)?),
        "set" => ShapeKind::Set(collection_member(&id, "member", shape.member)?),
        "map" => ShapeKind::Map {
            key: collection_member(&id, "key", shape.key)?,
            value: collection_member(&id, "value", shape.value)?,
        },
        "structure" => ShapeKind::Structure(members(&id, shape.members.as_ref())?),
        "union" => ShapeKind::Union(members(&id, shape.members.as_ref())?),
        "operation" => ShapeKind::Operation(OperationShape {
            input: unit_or_target(shape.input)?,
            output: unit_or_target(shape.output)?,
            errors: targets(&shape.errors)?,
        }),
        "service" => ShapeKind::Service(ServiceShape {
            version: shape.version.unwrap_or_default(),
            operations: targets(&shape.operations)?,
        }),
        "resource" | "apply" => {
            tracing::debug!(shape = %id, kind = %shape.kind, "skipping shape");
            return Ok(None);
        }
        "bigInteger" | "bigDecimal" | "intEnum" => {
            return Err(ModelError::UnsupportedShapeType {
                id: id.to_string(),
                kind: shape.kind,
            });
        }
        _ => {
            return Err(ModelError::UnknownShapeType {
                id: id.to_string(),
                kind: shape.kind,
            });
        }
    };
    Ok(Some(Shape { id, kind, traits }))
}

fn members(container: &ShapeId, members: Option<&Map<String, Value>>) -> Result<Vec<MemberShape>, ModelError> {
    let Some(members) = members else {
        return Ok(Vec::new());
    };
    members
        .iter()
        .map(|(name, value)| {
            let member: AstMember = serde_json::from_value(value.clone())?;
            convert_member(container, name, member)
        })
        .collect()
}

fn collection_member(container: &ShapeId, name: &str, member: Option<AstMember>) -> Result<MemberShape, ModelError> {
    let member = member.ok_or_else(|| ModelError::Malformed {
        id: container.to_string(),
        message: format!("missing `{name}` member"),
    })?;
    convert_member(container, name, member)
}

fn convert_member(container: &ShapeId, name: &str, member: AstMember) -> Result<MemberShape, ModelError> {
    let member_id = container.with_member(name);
    Ok(MemberShape {
        name: name.to_string(),
        target: ShapeId::parse(&member.target)?,
        traits: convert_traits(&member_id, &member.traits)?,
    })
}

fn unit_or_target(target: Option<AstTarget>) -> Result<Option<ShapeId>, ModelError> {
    match target {
        Some(target) => {
            let id = ShapeId::parse(&target.target)?;
            Ok((id != prelude("Unit")).then_some(id))
        }
        None => Ok(None),
    }
}

fn targets(targets: &[AstTarget]) -> Result<Vec<ShapeId>, ModelError> {
    targets.iter().map(|target| ShapeId::parse(&target.target)).collect()
}

/// IDL 2 `enum` shapes: one unit member per value, with an optional `enumValue` trait.
fn enum_members(id: &ShapeId, members: Option<&Map<String, Value>>) -> Result<Vec<EnumValue>, ModelError> {
    let Some(members) = members else {
        return Ok(Vec::new());
    };
    members
        .iter()
        .map(|(name, value)| {
            let member: AstMember = serde_json::from_value(value.clone())?;
            let wire = match member.traits.get("smithy.api#enumValue") {
                Some(Value::String(text)) => text.clone(),
                Some(_) => return Err(malformed(id, "enumValue must be a string")),
                None => name.clone(),
            };
            Ok(EnumValue {
                value: wire,
                name: Some(name.clone()),
                documentation: string_trait(&member.traits, "smithy.api#documentation"),
            })
        })
        .collect()
}

/// IDL 1 `@enum` trait on a string shape.
fn legacy_enum_values(id: &ShapeId, values: &Value) -> Result<Vec<EnumValue>, ModelError> {
    let entries = values
        .as_array()
        .ok_or_else(|| malformed(id, "enum trait must be a list"))?;
    entries
        .iter()
        .map(|entry| {
            let value = entry
                .get("value")
                .and_then(Value::as_str)
                .ok_or_else(|| malformed(id, "enum definition is missing `value`"))?;
            Ok(EnumValue {
                value: value.to_string(),
                name: entry.get("name").and_then(Value::as_str).map(str::to_string),
                documentation: entry.get("documentation").and_then(Value::as_str).map(str::to_string),
            })
        })
        .collect()
}

fn convert_traits(id: &ShapeId, raw: &Map<String, Value>) -> Result<Traits, ModelError> {
    let mut traits = Traits::default();
    for (name, value) in raw {
        match name.as_str() {
            "smithy.api#documentation" => traits.documentation = value.as_str().map(str::to_string),
            "smithy.api#error" => {
                traits.error = match value.as_str() {
                    Some("client") => Some(ErrorFault::Client),
                    Some("server") => Some(ErrorFault::Server),
                    _ => return Err(malformed(id, "error trait must be `client` or `server`")),
                }
            }
            "smithy.api#required" => traits.required = true,
            "smithy.api#default" => traits.default = Some(value.clone()),
            "smithy.api#http" => traits.http = Some(http_trait(id, value)?),
            "smithy.api#httpHeader" => traits.http_header = Some(required_string(id, name, value)?),
            "smithy.api#httpPrefixHeaders" => traits.http_prefix_headers = Some(required_string(id, name, value)?),
            "smithy.api#httpLabel" => traits.http_label = true,
            "smithy.api#httpQuery" => traits.http_query = Some(required_string(id, name, value)?),
            "smithy.api#httpPayload" => traits.http_payload = true,
            "smithy.api#httpResponseCode" => traits.http_response_code = true,
            "smithy.api#streaming" => traits.streaming = true,
            "smithy.api#xmlName" => traits.xml_name = Some(required_string(id, name, value)?),
            "smithy.api#xmlFlattened" => traits.xml_flattened = true,
            "smithy.api#xmlAttribute" => traits.xml_attribute = true,
            "smithy.api#xmlNamespace" => {
                let uri = value
                    .get("uri")
                    .and_then(Value::as_str)
                    .ok_or_else(|| malformed(id, "xmlNamespace is missing `uri`"))?;
                traits.xml_namespace = Some(XmlNamespace {
                    uri: uri.to_string(),
                    prefix: value.get("prefix").and_then(Value::as_str).map(str::to_string),
                });
            }
            "smithy.api#timestampFormat" => {
                let text = required_string(id, name, value)?;
                traits.timestamp_format = Some(
                    TimestampFormat::parse(&text)
                        .ok_or_else(|| malformed(id, &format!("unknown timestamp format `{text}`")))?,
                );
            }
            "smithy.api#jsonName" => traits.json_name = Some(required_string(id, name, value)?),
            "smithy.api#mediaType" => traits.media_type = Some(required_string(id, name, value)?),
            "smithy.test#httpRequestTests" => {
                traits.http_request_tests = serde_json::from_value(value.clone())
                    .map_err(|err| malformed(id, &format!("invalid httpRequestTests: {err}")))?;
            }
            "smithy.test#httpResponseTests" => {
                traits.http_response_tests = serde_json::from_value(value.clone())
                    .map_err(|err| malformed(id, &format!("invalid httpResponseTests: {err}")))?;
            }
            other if other.split_once('#').is_some_and(|(ns, _)| ns == PROTOCOL_TRAIT_NAMESPACE) => {
                traits.protocols.push(other.to_string());
            }
            _ => {}
        }
    }
    Ok(traits)
}

fn http_trait(id: &ShapeId, value: &Value) -> Result<HttpTrait, ModelError> {
    let method = value
        .get("method")
        .and_then(Value::as_str)
        .ok_or_else(|| malformed(id, "http trait is missing `method`"))?;
    let uri = value
        .get("uri")
        .and_then(Value::as_str)
        .ok_or_else(|| malformed(id, "http trait is missing `uri`"))?;
    let code = match value.get("code") {
        Some(code) => code
            .as_u64()
            .and_then(|code| u16::try_from(code).ok())
            .ok_or_else(|| malformed(id, "http trait `code` must be a status code"))?,
        None => 200,
    };
    Ok(HttpTrait {
        method: method.to_string(),
        uri: uri.to_string(),
        code,
    })
}

fn required_string(id: &ShapeId, name: &str, value: &Value) -> Result<String, ModelError> {
    value
        .as_str()
        .map(str::to_string)
        .ok_or_else(|| malformed(id, &format!("trait `{name}` must be a string")))
}

fn string_trait(traits: &Map<String, Value>, name: &str) -> Option<String> {
    traits.get(name).and_then(Value::as_str).map(str::to_string)
}

fn malformed(id: &ShapeId, message: &str) -> ModelError {
    ModelError::Malformed {
        id: id.to_string(),
        message: message.to_string(),
    }
}

fn validate_targets(model: &Model) -> Result<(), ModelError> {
    for shape in model.shapes() {
        for member in shape.members() {
            if model.get(&member.target).is_none() {
                return Err(ModelError::MissingTarget {
                    member: shape.id.with_member(member.name.clone()),
                    target: member.target.clone(),
                });
            }
        }
        let referenced: Vec<&ShapeId> = match &shape.kind {
            ShapeKind::Operation(op) => op.input.iter().chain(op.output.iter()).chain(op.errors.iter()).collect(),
            ShapeKind::Service(service) => service.operations.iter().collect(),
            _ => Vec::new(),
        };
        if let Some(missing) = referenced.into_iter().find(|id| model.get(id).is_none()) {
            return Err(ModelError::MissingShape(missing.clone()));
        }
    }
    Ok(())
}
