//! Query-string formatting for `httpQuery` members.

use crate::instant::{Format, Instant};

pub fn fmt_string<T: AsRef<str>>(value: T) -> String {
    urlencoding::encode(value.as_ref()).into_owned()
}

pub fn fmt_timestamp(value: &Instant, format: Format) -> String {
    fmt_string(value.fmt(format))
}

/// Appends `key=value` pairs to a URI, choosing `?` or `&` based on what the URI already contains.
pub struct Writer<'a> {
    out: &'a mut String,
    prefix: char,
}

impl<'a> Writer<'a> {
    pub fn new(out: &'a mut String) -> Self {
        let prefix = if out.contains('?') { '&' } else { '?' };
        Writer { out, prefix }
    }

    /// Push an already-encoded value under an unencoded key.
    pub fn push_kv(&mut self, key: &str, value: &str) {
        self.out.push(self.prefix);
        self.out.push_str(&fmt_string(key));
        self.out.push('=');
        self.out.push_str(value);
        self.prefix = '&';
    }

    /// Push a bare key.
    pub fn push_v(&mut self, key: &str) {
        self.out.push(self.prefix);
        self.out.push_str(&fmt_string(key));
        self.prefix = '&';
    }
}
