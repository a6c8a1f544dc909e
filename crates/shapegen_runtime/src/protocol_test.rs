//! Assertions called by generated protocol conformance tests.
//!
//! Every check returns a [`ProtocolTestFailure`] describing the mismatch instead of panicking, so a failing test
//! reports what was expected next to what the generated code produced. [`assert_ok`] turns a failure into a panic.
//!
//! ## Notes
//!
//! - Query parameters are compared in their encoded `key=value` form, as written in the model.
//! - Repeated headers compare as their values joined with `", "`.
//! - JSON bodies compare as values and XML bodies as element trees (attribute order and layout whitespace are
//!   ignored); any other media type compares byte for byte.

use std::fmt;

use crate::http::{Headers, HttpRequest};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProtocolTestFailure {
    #[error("expected request path `{expected}`, found `{found}`")]
    UriMismatch { expected: String, found: String },

    #[error("expected query param `{expected}`, found {found:?}")]
    MissingQueryParam { expected: String, found: Vec<String> },

    #[error("query param `{forbidden}` must not be set, found {found:?}")]
    ForbiddenQueryParam { forbidden: String, found: Vec<String> },

    #[error("expected query key `{expected}`, found {found:?}")]
    RequiredQueryParam { expected: String, found: Vec<String> },

    #[error("header `{key}`: expected `{expected}`, found `{found}`")]
    InvalidHeader { key: String, expected: String, found: String },

    #[error("expected header `{expected}` to be set")]
    MissingHeader { expected: String },

    #[error("header `{forbidden}` must not be set, found `{found}`")]
    ForbiddenHeader { forbidden: String, found: String },

    #[error("body did not match ({hint})\n  expected: {expected}\n     found: {found}")]
    BodyDidNotMatch { expected: String, found: String, hint: String },

    #[error("body is not valid {expected}: {found}")]
    InvalidBodyFormat { expected: String, found: String },
}

/// How a body is compared.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MediaType {
    Json,
    Xml,
    Other(String),
}

impl From<&str> for MediaType {
    fn from(media_type: &str) -> Self {
        let essence = media_type.split(';').next().unwrap_or_default().trim();
        if essence == "application/json" || essence.ends_with("+json") || essence.starts_with("application/x-amz-json")
        {
            MediaType::Json
        } else if essence == "application/xml" || essence == "text/xml" || essence.ends_with("+xml") {
            MediaType::Xml
        } else {
            MediaType::Other(essence.to_string())
        }
    }
}

impl fmt::Display for MediaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MediaType::Json => f.write_str("application/json"),
            MediaType::Xml => f.write_str("application/xml"),
            MediaType::Other(other) => f.write_str(other),
        }
    }
}

/// Panic with the failure's description.
#[track_caller]
pub fn assert_ok(result: Result<(), ProtocolTestFailure>) {
    if let Err(failure) = result {
        panic!("protocol test failed: {failure}");
    }
}

fn split_uri(uri: &str) -> (&str, &str) {
    uri.split_once('?').unwrap_or((uri, ""))
}

fn query_params(request: &HttpRequest) -> Vec<String> {
    split_uri(request.uri())
        .1
        .split('&')
        .filter(|param| !param.is_empty())
        .map(str::to_string)
        .collect()
}

fn query_key(param: &str) -> &str {
    param.split_once('=').map_or(param, |(key, _)| key)
}

/// The path part of the request URI.
pub fn validate_uri(request: &HttpRequest, expected: &str) -> Result<(), ProtocolTestFailure> {
    let found = split_uri(request.uri()).0;
    if found == expected {
        Ok(())
    } else {
        Err(ProtocolTestFailure::UriMismatch {
            expected: expected.to_string(),
            found: found.to_string(),
        })
    }
}

pub fn validate_query_string(request: &HttpRequest, expected: &[&str]) -> Result<(), ProtocolTestFailure> {
    let found = query_params(request);
    for param in expected {
        if !found.iter().any(|candidate| candidate == param) {
            return Err(ProtocolTestFailure::MissingQueryParam {
                expected: param.to_string(),
                found,
            });
        }
    }
    Ok(())
}

pub fn forbid_query_params(request: &HttpRequest, forbidden: &[&str]) -> Result<(), ProtocolTestFailure> {
    let found = query_params(request);
    for key in forbidden {
        if found.iter().any(|param| query_key(param) == *key) {
            return Err(ProtocolTestFailure::ForbiddenQueryParam {
                forbidden: key.to_string(),
                found,
            });
        }
    }
    Ok(())
}

pub fn require_query_params(request: &HttpRequest, required: &[&str]) -> Result<(), ProtocolTestFailure> {
    let found = query_params(request);
    for key in required {
        if !found.iter().any(|param| query_key(param) == *key) {
            return Err(ProtocolTestFailure::RequiredQueryParam {
                expected: key.to_string(),
                found,
            });
        }
    }
    Ok(())
}

fn joined(headers: &Headers, name: &str) -> Option<String> {
    let values: Vec<&str> = headers.get_all(name).collect();
    (!values.is_empty()).then(|| values.join(", "))
}

pub fn validate_headers(headers: &Headers, expected: &[(&str, &str)]) -> Result<(), ProtocolTestFailure> {
    for (key, value) in expected {
        match joined(headers, key) {
            None => {
                return Err(ProtocolTestFailure::MissingHeader {
                    expected: key.to_string(),
                });
            }
            Some(found) if found != *value => {
                return Err(ProtocolTestFailure::InvalidHeader {
                    key: key.to_string(),
                    expected: value.to_string(),
                    found,
                });
            }
            Some(_) => {}
        }
    }
    Ok(())
}

pub fn forbid_headers(headers: &Headers, forbidden: &[&str]) -> Result<(), ProtocolTestFailure> {
    for key in forbidden {
        if let Some(found) = joined(headers, key) {
            return Err(ProtocolTestFailure::ForbiddenHeader {
                forbidden: key.to_string(),
                found,
            });
        }
    }
    Ok(())
}

pub fn require_headers(headers: &Headers, required: &[&str]) -> Result<(), ProtocolTestFailure> {
    for key in required {
        if !headers.contains(key) {
            return Err(ProtocolTestFailure::MissingHeader {
                expected: key.to_string(),
            });
        }
    }
    Ok(())
}

/// Compare a produced body with the expected one under `media_type`'s equivalence.
pub fn validate_body(actual: &[u8], expected: &str, media_type: MediaType) -> Result<(), ProtocolTestFailure> {
    let found = String::from_utf8_lossy(actual);
    match media_type {
        #[cfg(feature = "json")]
        MediaType::Json => json_bodies_match(&found, expected),
        #[cfg(feature = "xml")]
        MediaType::Xml => xml_bodies_match(&found, expected),
        other => {
            if found == expected {
                Ok(())
            } else {
                Err(ProtocolTestFailure::BodyDidNotMatch {
                    expected: expected.to_string(),
                    found: found.into_owned(),
                    hint: format!("{other} bodies compare byte for byte"),
                })
            }
        }
    }
}

#[cfg(feature = "json")]
fn json_bodies_match(found: &str, expected: &str) -> Result<(), ProtocolTestFailure> {
    if found.trim().is_empty() && expected.trim().is_empty() {
        return Ok(());
    }
    let parse = |text: &str| {
        serde_json::from_str::<serde_json::Value>(text).map_err(|err| ProtocolTestFailure::InvalidBodyFormat {
            expected: "json".to_string(),
            found: format!("{err}: {text}"),
        })
    };
    if parse(found)? == parse(expected)? {
        Ok(())
    } else {
        Err(ProtocolTestFailure::BodyDidNotMatch {
            expected: expected.to_string(),
            found: found.to_string(),
            hint: "JSON values differ".to_string(),
        })
    }
}

/// An XML element with sorted attributes and trimmed text, for layout-insensitive comparison.
#[cfg(feature = "xml")]
#[derive(Debug, PartialEq)]
struct CanonicalElement {
    name: (Option<String>, String),
    attributes: Vec<(String, String)>,
    text: String,
    children: Vec<CanonicalElement>,
}

#[cfg(feature = "xml")]
impl CanonicalElement {
    fn new(node: roxmltree::Node<'_, '_>) -> Self {
        let tag = node.tag_name();
        let mut attributes: Vec<(String, String)> = node
            .attributes()
            .map(|attr| (attr.name().to_string(), attr.value().to_string()))
            .collect();
        attributes.sort();
        let text: String = node.children().filter(|child| child.is_text()).filter_map(|child| child.text()).collect();
        CanonicalElement {
            name: (tag.namespace().map(str::to_string), tag.name().to_string()),
            attributes,
            text: text.trim().to_string(),
            children: node.children().filter(|child| child.is_element()).map(CanonicalElement::new).collect(),
        }
    }
}

#[cfg(feature = "xml")]
fn xml_bodies_match(found: &str, expected: &str) -> Result<(), ProtocolTestFailure> {
    if found.trim().is_empty() && expected.trim().is_empty() {
        return Ok(());
    }
    let parse = |text: &str| {
        roxmltree::Document::parse(text)
            .map(|doc| CanonicalElement::new(doc.root_element()))
            .map_err(|err| ProtocolTestFailure::InvalidBodyFormat {
                expected: "xml".to_string(),
                found: format!("{err}: {text}"),
            })
    };
    if parse(found)? == parse(expected)? {
        Ok(())
    } else {
        Err(ProtocolTestFailure::BodyDidNotMatch {
            expected: expected.to_string(),
            found: found.to_string(),
            hint: "XML trees differ".to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> HttpRequest {
        let mut request = HttpRequest::new("GET", "/cities/123?kind=CAPITAL&page%20size=10&flag");
        request.headers_mut().append("X-Tags", "a");
        request.headers_mut().append("x-tags", "b");
        request.headers_mut().insert("Content-Type", "application/json");
        request
    }

    #[test]
    fn uri_and_query_checks() {
        let request = request();
        assert_ok(validate_uri(&request, "/cities/123"));
        assert!(validate_uri(&request, "/cities").is_err());
        assert_ok(validate_query_string(&request, &["kind=CAPITAL", "page%20size=10", "flag"]));
        assert_eq!(
            validate_query_string(&request, &["kind=TOWN"]).unwrap_err(),
            ProtocolTestFailure::MissingQueryParam {
                expected: "kind=TOWN".to_string(),
                found: vec!["kind=CAPITAL".to_string(), "page%20size=10".to_string(), "flag".to_string()],
            }
        );
        assert_ok(require_query_params(&request, &["kind", "flag"]));
        assert_ok(forbid_query_params(&request, &["next"]));
        assert!(forbid_query_params(&request, &["page%20size"]).is_err());
    }

    #[test]
    fn header_checks_join_repeated_values() {
        let request = request();
        assert_ok(validate_headers(request.headers(), &[("x-tags", "a, b"), ("content-type", "application/json")]));
        assert_eq!(
            validate_headers(request.headers(), &[("X-Tags", "a")]).unwrap_err().to_string(),
            "header `X-Tags`: expected `a`, found `a, b`"
        );
        assert_ok(require_headers(request.headers(), &["CONTENT-TYPE"]));
        assert!(forbid_headers(request.headers(), &["x-tags"]).is_err());
        assert!(matches!(
            require_headers(request.headers(), &["X-Missing"]),
            Err(ProtocolTestFailure::MissingHeader { .. })
        ));
    }

    #[test]
    fn media_types_parse() {
        assert_eq!(MediaType::from("application/json; charset=utf-8"), MediaType::Json);
        assert_eq!(MediaType::from("application/x-amz-json-1.0"), MediaType::Json);
        assert_eq!(MediaType::from("text/xml"), MediaType::Xml);
        assert_eq!(MediaType::from("text/plain"), MediaType::Other("text/plain".to_string()));
    }

    #[test]
    fn other_bodies_compare_bytes() {
        assert_ok(validate_body(b"raw", "raw", MediaType::from("application/octet-stream")));
        assert!(validate_body(b"raw ", "raw", MediaType::from("text/plain")).is_err());
    }

    #[cfg(feature = "json")]
    #[test]
    fn json_bodies_compare_as_values() {
        assert_ok(validate_body(br#"{"b":[1,2],"a":"x"}"#, r#"{ "a": "x", "b": [1, 2] }"#, MediaType::Json));
        assert_ok(validate_body(b"", "", MediaType::Json));
        assert!(validate_body(br#"{"a":"y"}"#, r#"{"a":"x"}"#, MediaType::Json).is_err());
        assert!(matches!(
            validate_body(b"{", "{}", MediaType::Json),
            Err(ProtocolTestFailure::InvalidBodyFormat { .. })
        ));
    }

    #[cfg(feature = "xml")]
    #[test]
    fn xml_bodies_ignore_layout_and_attribute_order() {
        let compact = r#"<Tagging a="1" b="2"><TagSet><Tag>x</Tag></TagSet></Tagging>"#;
        let pretty = "<Tagging b=\"2\" a=\"1\">\n  <TagSet>\n    <Tag> x </Tag>\n  </TagSet>\n</Tagging>";
        assert_ok(validate_body(compact.as_bytes(), pretty, MediaType::Xml));
        assert!(validate_body(compact.as_bytes(), "<Tagging/>", MediaType::Xml).is_err());
    }
}
