//! HTTP binding resolution: where each member travels in a request or response.
//!
//! ## Notes
//!
//! - Label and query bindings only exist on requests; the response-code binding only on responses. Outside
//!   their direction those members fall back to the document.
//! - Timestamp formats resolve in order: member trait, target trait, then the location's default.

use crate::model::{HttpTrait, MemberShape, Model, ModelError, Shape, ShapeId, ShapeKind, TimestampFormat};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpLocation {
    Header,
    PrefixHeaders,
    Label,
    Query,
    Payload,
    Document,
    ResponseCode,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Request,
    Response,
}

#[derive(Debug, Clone, PartialEq)]
pub struct HttpBindingDescriptor {
    pub member: MemberShape,
    pub member_name: String,
    pub location: HttpLocation,
    /// Header name, header prefix, label name or query key, depending on `location`.
    pub location_name: Option<String>,
}

pub trait HttpBindingResolver {
    /// Method, URI pattern and success code of `operation`.
    fn http_trait(&self, operation: &Shape) -> Option<HttpTrait>;

    /// Location of one member.
    fn classify(&self, member: &MemberShape, direction: Direction) -> (HttpLocation, Option<String>);

    /// Bindings of every member of `shape`, in member order.
    fn bindings(&self, shape: &Shape, direction: Direction) -> Vec<HttpBindingDescriptor> {
        shape
            .members()
            .into_iter()
            .map(|member| {
                let (location, location_name) = self.classify(member, direction);
                HttpBindingDescriptor {
                    member: member.clone(),
                    member_name: member.name.clone(),
                    location,
                    location_name,
                }
            })
            .collect()
    }

    fn request_bindings(&self, model: &Model, operation: &Shape) -> Result<Vec<HttpBindingDescriptor>, ModelError> {
        match operation.as_operation().and_then(|op| op.input.as_ref()) {
            Some(input) => Ok(self.bindings(model.expect_shape(input)?, Direction::Request)),
            None => Ok(Vec::new()),
        }
    }

    fn response_bindings(&self, model: &Model, operation: &Shape) -> Result<Vec<HttpBindingDescriptor>, ModelError> {
        match operation.as_operation().and_then(|op| op.output.as_ref()) {
            Some(output) => Ok(self.bindings(model.expect_shape(output)?, Direction::Response)),
            None => Ok(Vec::new()),
        }
    }
}

/// Reads the `http*` binding traits (restJson1, restXml).
#[derive(Debug, Clone, Copy, Default)]
pub struct HttpTraitBindingResolver;

impl HttpBindingResolver for HttpTraitBindingResolver {
    fn http_trait(&self, operation: &Shape) -> Option<HttpTrait> {
        operation.traits.http.clone()
    }

    fn classify(&self, member: &MemberShape, direction: Direction) -> (HttpLocation, Option<String>) {
        let traits = &member.traits;
        if let Some(name) = &traits.http_header {
            return (HttpLocation::Header, Some(name.clone()));
        }
        if let Some(prefix) = &traits.http_prefix_headers {
            return (HttpLocation::PrefixHeaders, Some(prefix.clone()));
        }
        if traits.http_payload {
            return (HttpLocation::Payload, None);
        }
        match direction {
            Direction::Request if traits.http_label => (HttpLocation::Label, Some(member.name.clone())),
            Direction::Request if traits.http_query.is_some() => (HttpLocation::Query, traits.http_query.clone()),
            Direction::Response if traits.http_response_code => (HttpLocation::ResponseCode, None),
            _ => (HttpLocation::Document, None),
        }
    }
}

/// Every member in the document of a fixed `POST /` request (awsJson).
#[derive(Debug, Clone, Copy, Default)]
pub struct StaticBindingResolver;

impl HttpBindingResolver for StaticBindingResolver {
    fn http_trait(&self, _operation: &Shape) -> Option<HttpTrait> {
        Some(HttpTrait {
            method: "POST".to_string(),
            uri: "/".to_string(),
            code: 200,
        })
    }

    fn classify(&self, _member: &MemberShape, _direction: Direction) -> (HttpLocation, Option<String>) {
        (HttpLocation::Document, None)
    }
}

/// Wire format for a timestamp-bearing member at `location`.
pub fn timestamp_format(
    model: &Model,
    member: &MemberShape,
    location: HttpLocation,
    protocol_default: TimestampFormat,
) -> TimestampFormat {
    if let Some(format) = member.traits.timestamp_format {
        return format;
    }
    if let Some(format) = target_timestamp_format(model, &member.target, 0) {
        return format;
    }
    match location {
        HttpLocation::Header | HttpLocation::PrefixHeaders => TimestampFormat::HttpDate,
        HttpLocation::Label | HttpLocation::Query => TimestampFormat::DateTime,
        HttpLocation::Payload | HttpLocation::Document | HttpLocation::ResponseCode => protocol_default,
    }
}

const MAX_COLLECTION_DEPTH: usize = 8;

/// A `timestampFormat` trait on the timestamp reached through `target` and any collections it wraps.
fn target_timestamp_format(model: &Model, target: &ShapeId, depth: usize) -> Option<TimestampFormat> {
    let shape = model.get(target)?;
    if let Some(format) = shape.traits.timestamp_format {
        return Some(format);
    }
    if depth >= MAX_COLLECTION_DEPTH {
        return None;
    }
    let inner = match &shape.kind {
        ShapeKind::List(member) | ShapeKind::Set(member) => member,
        ShapeKind::Map { value, .. } => value,
        _ => return None,
    };
    inner
        .traits
        .timestamp_format
        .or_else(|| target_timestamp_format(model, &inner.target, depth + 1))
}

/// One piece of a URI pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UriSegment {
    Literal(String),
    Label { name: String, greedy: bool },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UriPattern {
    pub segments: Vec<UriSegment>,
    /// Literal query string after `?`, without the `?`.
    pub query: Option<String>,
}

/// Split `/a/{b}/{c+}?x=y` into literal and label segments plus the literal query.
pub fn parse_uri(uri: &str) -> UriPattern {
    let (path, query) = match uri.split_once('?') {
        Some((path, query)) => (path, Some(query.to_string())),
        None => (uri, None),
    };
    let mut segments = Vec::new();
    let mut rest = path;
    while let Some(open) = rest.find('{') {
        let Some(close) = rest[open..].find('}').map(|offset| open + offset) else {
            break;
        };
        if open > 0 {
            segments.push(UriSegment::Literal(rest[..open].to_string()));
        }
        let label = &rest[open + 1..close];
        let (name, greedy) = match label.strip_suffix('+') {
            Some(name) => (name, true),
            None => (label, false),
        };
        segments.push(UriSegment::Label {
            name: name.to_string(),
            greedy,
        });
        rest = &rest[close + 1..];
    }
    if !rest.is_empty() {
        segments.push(UriSegment::Literal(rest.to_string()));
    }
    UriPattern {
        segments,
        query: query.filter(|query| !query.is_empty()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Traits, prelude};

    #[test]
    fn parses_labels_and_literal_query() {
        let pattern = parse_uri("/buckets/{Bucket}/{Key+}?x-id=GetObject");
        assert_eq!(
            pattern.segments,
            vec![
                UriSegment::Literal("/buckets/".into()),
                UriSegment::Label {
                    name: "Bucket".into(),
                    greedy: false
                },
                UriSegment::Literal("/".into()),
                UriSegment::Label {
                    name: "Key".into(),
                    greedy: true
                },
            ]
        );
        assert_eq!(pattern.query.as_deref(), Some("x-id=GetObject"));
    }

    #[test]
    fn labels_only_bind_requests() {
        let mut member = MemberShape::new("id", prelude("String"));
        member.traits = Traits {
            http_label: true,
            ..Traits::default()
        };
        let resolver = HttpTraitBindingResolver;
        assert_eq!(resolver.classify(&member, Direction::Request).0, HttpLocation::Label);
        assert_eq!(resolver.classify(&member, Direction::Response).0, HttpLocation::Document);
    }

    #[test]
    fn timestamp_format_precedence() {
        let model = Model::new();
        let mut member = MemberShape::new("at", prelude("Timestamp"));
        assert_eq!(
            timestamp_format(&model, &member, HttpLocation::Header, TimestampFormat::EpochSeconds),
            TimestampFormat::HttpDate
        );
        assert_eq!(
            timestamp_format(&model, &member, HttpLocation::Query, TimestampFormat::EpochSeconds),
            TimestampFormat::DateTime
        );
        assert_eq!(
            timestamp_format(&model, &member, HttpLocation::Document, TimestampFormat::EpochSeconds),
            TimestampFormat::EpochSeconds
        );
        member.traits.timestamp_format = Some(TimestampFormat::DateTime);
        assert_eq!(
            timestamp_format(&model, &member, HttpLocation::Header, TimestampFormat::EpochSeconds),
            TimestampFormat::DateTime
        );
    }
}
