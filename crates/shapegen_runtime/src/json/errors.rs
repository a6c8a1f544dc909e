//! Generic error envelope parsing shared by the JSON protocols.
//!
//! The error code comes from the `X-Amzn-Errortype` header when present, else from the body's `code` or `__type`
//! field. Codes may be namespaced (`aws.protocoltests#FooError`) or carry a trailing URI (`FooError:http://...`);
//! both decorations are stripped so the code matches a shape name.

use serde_json::{Map, Value};

use crate::error::GenericError;
use crate::http::Headers;

const ERROR_TYPE_HEADER: &str = "X-Amzn-Errortype";
const REQUEST_ID_HEADER: &str = "X-Amzn-Requestid";

/// Reduce a wire error code to the bare shape name.
pub fn sanitize_error_code(error_code: &str) -> &str {
    let without_uri = match error_code.find(':') {
        Some(idx) => &error_code[..idx],
        None => error_code,
    };
    match without_uri.rfind('#') {
        Some(idx) => &without_uri[idx + 1..],
        None => without_uri,
    }
}

/// Parse the code, message and request id from an error response.
pub fn parse_generic_error(body: &[u8], headers: &Headers) -> Result<GenericError, serde_json::Error> {
    let object = if body.iter().all(u8::is_ascii_whitespace) {
        Map::new()
    } else {
        match serde_json::from_slice::<Value>(body)? {
            Value::Object(object) => object,
            _ => Map::new(),
        }
    };

    let mut builder = GenericError::builder();
    let code = headers
        .get(ERROR_TYPE_HEADER)
        .or_else(|| string_field(&object, "code"))
        .or_else(|| string_field(&object, "__type"));
    if let Some(code) = code {
        builder = builder.code(sanitize_error_code(code));
    }
    let message = ["message", "Message", "errorMessage"]
        .iter()
        .find_map(|key| string_field(&object, key));
    if let Some(message) = message {
        builder = builder.message(message);
    }
    if let Some(request_id) = headers.get(REQUEST_ID_HEADER) {
        builder = builder.request_id(request_id);
    }
    Ok(builder.build())
}

fn string_field<'a>(object: &'a Map<String, Value>, key: &str) -> Option<&'a str> {
    object.get(key).and_then(Value::as_str)
}
