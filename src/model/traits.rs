//! Typed view of the traits the generator understands.
//!
//! Traits are orthogonal annotations; each one the generator reads has a dedicated field here so the
//! rest of the pipeline never looks at raw trait JSON. Unknown traits are dropped by the loader.

use std::collections::BTreeMap;

use serde::Deserialize;

use super::ShapeId;

/// Which side of the conversation an error shape blames.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorFault {
    Client,
    Server,
}

/// Wire representation of a timestamp.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TimestampFormat {
    DateTime,
    HttpDate,
    EpochSeconds,
}

impl TimestampFormat {
    pub fn parse(text: &str) -> Option<Self> {
        match text {
            "date-time" => Some(TimestampFormat::DateTime),
            "http-date" => Some(TimestampFormat::HttpDate),
            "epoch-seconds" => Some(TimestampFormat::EpochSeconds),
            _ => None,
        }
    }

    /// Snake-case suffix used in generated helper names.
    pub fn suffix(self) -> &'static str {
        match self {
            TimestampFormat::DateTime => "date_time",
            TimestampFormat::HttpDate => "http_date",
            TimestampFormat::EpochSeconds => "epoch_seconds",
        }
    }
}

/// `http` trait on an operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpTrait {
    pub method: String,
    pub uri: String,
    pub code: u16,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlNamespace {
    pub uri: String,
    pub prefix: Option<String>,
}

/// Which side of a conversation a protocol test case checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AppliesTo {
    Client,
    Server,
}

/// One case of `smithy.test#httpRequestTests`: `params` as input must serialize to this request.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HttpRequestTestCase {
    pub id: String,
    pub protocol: String,
    pub method: String,
    pub uri: String,
    #[serde(default)]
    pub query_params: Vec<String>,
    #[serde(default)]
    pub forbid_query_params: Vec<String>,
    #[serde(default)]
    pub require_query_params: Vec<String>,
    #[serde(default)]
    pub headers: BTreeMap<String, String>,
    #[serde(default)]
    pub forbid_headers: Vec<String>,
    #[serde(default)]
    pub require_headers: Vec<String>,
    pub body: Option<String>,
    pub body_media_type: Option<String>,
    #[serde(default)]
    pub params: serde_json::Map<String, serde_json::Value>,
    pub documentation: Option<String>,
    pub applies_to: Option<AppliesTo>,
}

/// One case of `smithy.test#httpResponseTests`: this response must parse to `params` as output.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HttpResponseTestCase {
    pub id: String,
    pub protocol: String,
    pub code: u16,
    #[serde(default)]
    pub headers: BTreeMap<String, String>,
    pub body: Option<String>,
    pub body_media_type: Option<String>,
    #[serde(default)]
    pub params: serde_json::Map<String, serde_json::Value>,
    pub documentation: Option<String>,
    pub applies_to: Option<AppliesTo>,
}

/// Marker placed on an input structure synthesized by normalization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntheticInput {
    pub operation: ShapeId,
    pub body: Option<ShapeId>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Traits {
    pub documentation: Option<String>,
    pub error: Option<ErrorFault>,
    pub required: bool,
    pub default: Option<serde_json::Value>,
    pub http: Option<HttpTrait>,
    pub http_header: Option<String>,
    pub http_prefix_headers: Option<String>,
    pub http_label: bool,
    pub http_query: Option<String>,
    pub http_payload: bool,
    pub http_response_code: bool,
    pub streaming: bool,
    pub xml_name: Option<String>,
    pub xml_flattened: bool,
    pub xml_attribute: bool,
    pub xml_namespace: Option<XmlNamespace>,
    pub timestamp_format: Option<TimestampFormat>,
    pub json_name: Option<String>,
    pub media_type: Option<String>,
    /// The member is stored behind a heap indirection.
    pub boxed: bool,
    /// Protocol trait ids declared on a service, in declaration order.
    pub protocols: Vec<String>,
    pub synthetic_input: Option<SyntheticInput>,
    /// Set on the body sub-shape of a synthetic input; names the owning operation.
    pub synthetic_body: Option<ShapeId>,
    pub http_request_tests: Vec<HttpRequestTestCase>,
    pub http_response_tests: Vec<HttpResponseTestCase>,
}

impl Traits {
    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }

    pub fn is_synthetic(&self) -> bool {
        self.synthetic_input.is_some() || self.synthetic_body.is_some()
    }

    /// `true` when any HTTP binding trait is present.
    pub fn has_http_binding(&self) -> bool {
        self.http_header.is_some()
            || self.http_prefix_headers.is_some()
            || self.http_label
            || self.http_query.is_some()
            || self.http_payload
            || self.http_response_code
    }
}
