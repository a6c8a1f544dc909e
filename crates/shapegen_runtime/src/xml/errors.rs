//! Wrapped restXml error responses.
//!
//! ```xml
//! <ErrorResponse>
//!     <Error>
//!         <Type>Sender</Type>
//!         <Code>InvalidGreeting</Code>
//!         <Message>Hi</Message>
//!     </Error>
//!     <RequestId>foo-id</RequestId>
//! </ErrorResponse>
//! ```
//!
//! Some services omit the `ErrorResponse` wrapper and answer with a bare `<Error>` root; both are accepted.

use super::decode::{Document, ScopedDecoder, XmlError, expect_data};
use crate::error::GenericError;

/// Whether the document root looks like an error envelope.
pub fn is_error(doc: &Document<'_>) -> bool {
    doc.root_element()
        .map(|root| root.start_el().matches("ErrorResponse") || root.start_el().matches("Error"))
        .unwrap_or(false)
}

/// A decoder scoped to the `<Error>` element.
pub fn error_scope<'a, 'inp>(doc: &'a Document<'inp>) -> Result<ScopedDecoder<'a, 'inp>, XmlError> {
    let mut root = doc.root_element()?;
    if root.start_el().matches("Error") {
        return Ok(root);
    }
    if !root.start_el().matches("ErrorResponse") {
        return Err(XmlError::custom(format!(
            "expected ErrorResponse or Error as root, found {}",
            root.start_el()
        )));
    }
    while let Some(tag) = root.next_tag() {
        if tag.start_el().matches("Error") {
            return Ok(tag);
        }
    }
    Err(XmlError::custom("no Error found inside of ErrorResponse"))
}

/// Parse code, message and request id from an error body.
pub fn parse_generic_error(body: &[u8]) -> Result<GenericError, XmlError> {
    let doc = Document::try_from(body)?;
    let mut root = doc.root_element()?;
    let mut builder = GenericError::builder();
    if root.start_el().matches("Error") {
        builder = read_error_fields(&mut root, builder)?;
    } else if root.start_el().matches("ErrorResponse") {
        while let Some(mut tag) = root.next_tag() {
            if tag.start_el().matches("Error") {
                builder = read_error_fields(&mut tag, builder)?;
            } else if tag.start_el().matches("RequestId") {
                builder = builder.request_id(expect_data(&mut tag)?);
            }
        }
    } else {
        return Err(XmlError::custom(format!(
            "expected ErrorResponse or Error as root, found {}",
            root.start_el()
        )));
    }
    Ok(builder.build())
}

fn read_error_fields(
    scope: &mut ScopedDecoder<'_, '_>,
    mut builder: crate::error::Builder,
) -> Result<crate::error::Builder, XmlError> {
    while let Some(mut tag) = scope.next_tag() {
        match tag.start_el() {
            s if s.matches("Code") => builder = builder.code(expect_data(&mut tag)?),
            s if s.matches("Message") => builder = builder.message(expect_data(&mut tag)?),
            s if s.matches("RequestId") => builder = builder.request_id(expect_data(&mut tag)?),
            s if s.matches("Type") => builder = builder.custom("type", expect_data(&mut tag)?),
            _ => {}
        }
    }
    Ok(builder)
}
