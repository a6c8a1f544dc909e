//! A scoped, read-only XML decoder on top of `roxmltree`.
//!
//! ## Notes
//!
//! - Names are matched prefix-aware: `s.matches("Name")` compares only the local name, while
//!   `s.matches("xsi:type")` also requires the namespace prefix.
//! - Text and CDATA children of a leaf are concatenated, comments are skipped, and the result is trimmed, so
//!   pretty-printed documents decode the same as compact ones.

use std::borrow::Cow;
use std::fmt;

/// Failure while decoding XML.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum XmlError {
    /// The input is not well-formed XML.
    #[error("invalid XML: {0}")]
    InvalidXml(String),

    /// The XML is well-formed but does not match the expected shape.
    #[error("{0}")]
    Custom(String),
}

impl XmlError {
    pub fn custom(message: impl Into<String>) -> Self {
        XmlError::Custom(message.into())
    }
}

impl From<roxmltree::Error> for XmlError {
    fn from(err: roxmltree::Error) -> Self {
        XmlError::InvalidXml(err.to_string())
    }
}

impl From<std::str::Utf8Error> for XmlError {
    fn from(err: std::str::Utf8Error) -> Self {
        XmlError::InvalidXml(err.to_string())
    }
}

/// A possibly prefixed element or attribute name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Name<'a> {
    pub prefix: Option<&'a str>,
    pub local: &'a str,
}

impl Name<'_> {
    /// Match against `local` or `prefix:local`.
    pub fn matches(&self, tag_name: &str) -> bool {
        match tag_name.split_once(':') {
            Some((prefix, local)) => self.prefix == Some(prefix) && self.local == local,
            None => self.local == tag_name,
        }
    }
}

impl fmt::Display for Name<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.prefix {
            Some(prefix) => write!(f, "{prefix}:{}", self.local),
            None => f.write_str(self.local),
        }
    }
}

/// An attribute on a start tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attr<'a> {
    pub name: Name<'a>,
    pub value: &'a str,
}

/// The start tag of the element a decoder is scoped to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StartEl<'a> {
    name: Name<'a>,
    attributes: Vec<Attr<'a>>,
}

impl<'a> StartEl<'a> {
    pub fn name(&self) -> &Name<'a> {
        &self.name
    }

    pub fn local(&self) -> &'a str {
        self.name.local
    }

    pub fn prefix(&self) -> Option<&'a str> {
        self.name.prefix
    }

    pub fn matches(&self, tag_name: &str) -> bool {
        self.name.matches(tag_name)
    }

    /// Value of the attribute named `key` (`local` or `prefix:local`).
    pub fn attr(&self, key: &str) -> Option<&'a str> {
        self.attributes
            .iter()
            .find(|attr| attr.name.matches(key))
            .map(|attr| attr.value)
    }

    pub fn attributes(&self) -> &[Attr<'a>] {
        &self.attributes
    }
}

impl fmt::Display for StartEl<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{}>", self.name)
    }
}

/// A parsed XML document.
pub struct Document<'inp> {
    doc: roxmltree::Document<'inp>,
}

impl<'inp> Document<'inp> {
    pub fn new(text: &'inp str) -> Result<Self, XmlError> {
        Ok(Document {
            doc: roxmltree::Document::parse(text)?,
        })
    }

    /// A decoder scoped to the document element.
    pub fn root_element<'a>(&'a self) -> Result<ScopedDecoder<'a, 'inp>, XmlError> {
        Ok(ScopedDecoder::new(self.doc.root_element()))
    }
}

impl<'inp> TryFrom<&'inp [u8]> for Document<'inp> {
    type Error = XmlError;

    fn try_from(value: &'inp [u8]) -> Result<Self, Self::Error> {
        Document::new(std::str::from_utf8(value)?)
    }
}

/// A decoder scoped to one element.
pub struct ScopedDecoder<'a, 'inp> {
    node: roxmltree::Node<'a, 'inp>,
    children: roxmltree::Children<'a, 'inp>,
    start_el: StartEl<'a>,
}

impl<'a, 'inp> ScopedDecoder<'a, 'inp> {
    fn new(node: roxmltree::Node<'a, 'inp>) -> Self {
        let tag = node.tag_name();
        let name = Name {
            prefix: prefix_for(node, tag.namespace()),
            local: tag.name(),
        };
        let attributes = node
            .attributes()
            .map(|attr| Attr {
                name: Name {
                    prefix: prefix_for(node, attr.namespace()),
                    local: attr.name(),
                },
                value: attr.value(),
            })
            .collect();
        ScopedDecoder {
            node,
            children: node.children(),
            start_el: StartEl { name, attributes },
        }
    }

    pub fn start_el(&self) -> &StartEl<'a> {
        &self.start_el
    }

    /// The next child element, skipping text, comments and processing instructions.
    pub fn next_tag(&mut self) -> Option<ScopedDecoder<'a, 'inp>> {
        self.children.by_ref().find(|child| child.is_element()).map(ScopedDecoder::new)
    }
}

fn prefix_for<'a>(node: roxmltree::Node<'a, '_>, namespace: Option<&str>) -> Option<&'a str> {
    namespace
        .and_then(|uri| node.lookup_prefix(uri))
        .filter(|prefix| !prefix.is_empty())
}

/// Text content of a leaf element; an element with child elements is an error.
pub fn expect_data<'a>(decoder: &mut ScopedDecoder<'a, '_>) -> Result<Cow<'a, str>, XmlError> {
    let mut text: Option<Cow<'a, str>> = None;
    for child in decoder.node.children() {
        if child.is_element() {
            return Err(XmlError::custom(format!(
                "expected data but {} contains nested elements",
                decoder.start_el
            )));
        }
        if !child.is_text() {
            continue;
        }
        let chunk = child.text().unwrap_or("");
        text = Some(match text.take() {
            None => Cow::Borrowed(chunk),
            Some(existing) => Cow::Owned(existing.into_owned() + chunk),
        });
    }
    Ok(match text {
        None => Cow::Borrowed(""),
        Some(Cow::Borrowed(chunk)) => Cow::Borrowed(chunk.trim()),
        Some(Cow::Owned(joined)) => Cow::Owned(joined.trim().to_string()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scoped_decoders_stay_inside_their_element() {
        let doc = Document::new("<Root><A><B>1</B></A><C>2</C></Root>").unwrap();
        let mut root = doc.root_element().unwrap();
        let mut a = root.next_tag().unwrap();
        assert!(a.start_el().matches("A"));
        let mut b = a.next_tag().unwrap();
        assert_eq!(expect_data(&mut b).unwrap(), "1");
        assert!(a.next_tag().is_none());
        let mut c = root.next_tag().unwrap();
        assert_eq!(expect_data(&mut c).unwrap(), "2");
        assert!(root.next_tag().is_none());
    }

    #[test]
    fn prefixed_names_match() {
        let doc = Document::new(r#"<Root xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance" xsi:type="T"><xsi:Item/></Root>"#)
            .unwrap();
        let mut root = doc.root_element().unwrap();
        assert_eq!(root.start_el().attr("xsi:type"), Some("T"));
        assert_eq!(root.start_el().attr("type"), Some("T"));
        let item = root.next_tag().unwrap();
        assert!(item.start_el().matches("xsi:Item"));
        assert!(item.start_el().matches("Item"));
        assert!(!item.start_el().matches("other:Item"));
    }

    #[test]
    fn empty_and_nested_data() {
        let doc = Document::new("<Root><Empty/><Nested><X/></Nested></Root>").unwrap();
        let mut root = doc.root_element().unwrap();
        let mut empty = root.next_tag().unwrap();
        assert_eq!(expect_data(&mut empty).unwrap(), "");
        let mut nested = root.next_tag().unwrap();
        assert!(expect_data(&mut nested).is_err());
    }

    #[test]
    fn data_ignores_layout_whitespace_and_comments() {
        let doc = Document::new(
            "<Root>\n  <Size>\n    5\n  </Size>\n  <Key><!--c-->abc</Key>\n  <Split>ab<!-- c -->cd</Split>\n  <Raw><![CDATA[ <x> ]]></Raw>\n</Root>",
        )
        .unwrap();
        let mut root = doc.root_element().unwrap();
        let mut size = root.next_tag().unwrap();
        assert_eq!(expect_data(&mut size).unwrap(), "5");
        let mut key = root.next_tag().unwrap();
        assert_eq!(expect_data(&mut key).unwrap(), "abc");
        let mut split = root.next_tag().unwrap();
        assert_eq!(expect_data(&mut split).unwrap(), "abcd");
        let mut raw = root.next_tag().unwrap();
        assert_eq!(expect_data(&mut raw).unwrap(), "<x>");
        assert!(root.next_tag().is_none());
    }

    #[test]
    fn malformed_input_is_invalid_xml() {
        assert!(matches!(Document::new("<Root>"), Err(XmlError::InvalidXml(_))));
        assert!(matches!(Document::try_from(&b"\xff"[..]), Err(XmlError::InvalidXml(_))));
    }
}
