//! A minimal HTTP message model for generated request builders and response parsers.
//!
//! Transport is out of scope: generated operations turn input into an [`HttpRequest`] and an [`HttpResponse`] back
//! into output. Header names compare case-insensitively; values keep insertion order.

/// An ordered, case-insensitive multimap of header names to values.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Headers {
    entries: Vec<(String, String)>,
}

impl Headers {
    pub fn new() -> Self {
        Headers::default()
    }

    /// Add a value, keeping any existing values for the same name.
    pub fn append(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.entries.push((name.into(), value.into()));
    }

    /// Replace every value for `name` with `value`.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        self.entries.retain(|(existing, _)| !existing.eq_ignore_ascii_case(&name));
        self.entries.push((name, value.into()));
    }

    /// First value for `name`.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(existing, _)| existing.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// Every value for `name`, in insertion order.
    pub fn get_all<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.entries
            .iter()
            .filter(move |(existing, _)| existing.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(name, value)| (name.as_str(), value.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// An outgoing request produced by a generated operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    method: String,
    uri: String,
    headers: Headers,
    body: Vec<u8>,
}

impl HttpRequest {
    pub fn new(method: impl Into<String>, uri: impl Into<String>) -> Self {
        HttpRequest {
            method: method.into(),
            uri: uri.into(),
            headers: Headers::new(),
            body: Vec::new(),
        }
    }

    pub fn method(&self) -> &str {
        &self.method
    }

    pub fn uri(&self) -> &str {
        &self.uri
    }

    pub fn headers(&self) -> &Headers {
        &self.headers
    }

    pub fn headers_mut(&mut self) -> &mut Headers {
        &mut self.headers
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }

    pub fn set_body(&mut self, body: impl Into<Vec<u8>>) {
        self.body = body.into();
    }
}

/// A fully loaded response handed to a generated parser.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    status: u16,
    headers: Headers,
    body: Vec<u8>,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        HttpResponse {
            status,
            headers: Headers::new(),
            body: body.into(),
        }
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.append(name, value);
        self
    }

    pub fn status(&self) -> u16 {
        self.status
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn headers(&self) -> &Headers {
        &self.headers
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_lookup_ignores_case() {
        let mut headers = Headers::new();
        headers.append("X-Amz-Target", "Svc.Op");
        headers.append("x-amz-target", "Svc.Other");
        assert_eq!(headers.get("x-AMZ-target"), Some("Svc.Op"));
        assert_eq!(headers.get_all("X-Amz-Target").count(), 2);
    }

    #[test]
    fn get_outlives_the_name_it_was_given() {
        let mut headers = Headers::new();
        headers.append("X-Request-Id", "abc");
        let found = {
            let name = String::from("x-request-id");
            headers.get(&name)
        };
        assert_eq!(found, Some("abc"));
        assert_eq!(headers.get("missing"), None);
        assert!(headers.contains("X-REQUEST-ID"));
    }

    #[test]
    fn insert_replaces_all_values() {
        let mut headers = Headers::new();
        headers.append("Content-Type", "a");
        headers.append("content-type", "b");
        headers.insert("CONTENT-TYPE", "c");
        assert_eq!(headers.get_all("content-type").collect::<Vec<_>>(), vec!["c"]);
    }

    #[test]
    fn success_range() {
        assert!(HttpResponse::new(204, Vec::new()).is_success());
        assert!(!HttpResponse::new(404, Vec::new()).is_success());
    }
}
