//! Formatting of `httpLabel` members into URI path segments.

use crate::instant::{Format, Instant};

/// Percent-encode a label; greedy labels (`{key+}`) keep their `/` separators.
pub fn fmt_string<T: AsRef<str>>(value: T, greedy: bool) -> String {
    let value = value.as_ref();
    if greedy {
        value
            .split('/')
            .map(|segment| urlencoding::encode(segment).into_owned())
            .collect::<Vec<_>>()
            .join("/")
    } else {
        urlencoding::encode(value).into_owned()
    }
}

pub fn fmt_timestamp(value: &Instant, format: Format) -> String {
    fmt_string(value.fmt(format), false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encodes_reserved_characters() {
        assert_eq!(fmt_string("a b/c", false), "a%20b%2Fc");
        assert_eq!(fmt_string("a b/c", true), "a%20b/c");
    }

    #[test]
    fn timestamps_are_encoded() {
        let instant = Instant::from_epoch_seconds(0);
        assert_eq!(fmt_timestamp(&instant, Format::DateTime), "1970-01-01T00%3A00%3A00Z");
    }
}
