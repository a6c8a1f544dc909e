//! Reading and writing HTTP-bound members.
//!
//! A header may repeat and each occurrence may hold a comma-separated list, so list-typed members read every value
//! of every occurrence. Values containing commas or quotes are written quoted and read back unquoted.

use std::borrow::Cow;
use std::str::FromStr;

use crate::http::Headers;
use crate::instant::{Format, Instant};

/// A header value could not be converted to the member type.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("failed to parse header: {message}")]
pub struct ParseError {
    message: String,
}

impl ParseError {
    pub fn new(message: impl Into<String>) -> Self {
        ParseError {
            message: message.into(),
        }
    }
}

/// Parse every comma-separated item of every value.
pub fn read_many<'a, T>(values: impl Iterator<Item = &'a str>) -> Result<Vec<T>, ParseError>
where
    T: FromStr,
{
    let mut out = Vec::new();
    for value in values {
        for item in split_values(value)? {
            let parsed = item
                .parse::<T>()
                .map_err(|_| ParseError::new(format!("invalid value `{item}`")))?;
            out.push(parsed);
        }
    }
    Ok(out)
}

/// Parse timestamps; HTTP-dates contain a comma of their own, so their items are re-paired.
pub fn read_many_dates<'a>(values: impl Iterator<Item = &'a str>, format: Format) -> Result<Vec<Instant>, ParseError> {
    let mut out = Vec::new();
    for value in values {
        let items: Vec<String> = match format {
            Format::HttpDate => {
                let pieces: Vec<&str> = value.split(',').map(str::trim).collect();
                if pieces.len() % 2 != 0 {
                    return Err(ParseError::new(format!("invalid http-date list `{value}`")));
                }
                pieces.chunks(2).map(|pair| format!("{}, {}", pair[0], pair[1])).collect()
            }
            _ => split_values(value)?.into_iter().map(Cow::into_owned).collect(),
        };
        for item in items {
            let parsed = Instant::from_str(&item, format).map_err(|err| ParseError::new(err.to_string()))?;
            out.push(parsed);
        }
    }
    Ok(out)
}

/// Collapse a list read from a single-valued header.
pub fn one_or_none<T>(values: Vec<T>) -> Result<Option<T>, ParseError> {
    let mut values = values.into_iter();
    let first = values.next();
    if values.next().is_some() {
        return Err(ParseError::new("expected a single value but found several"));
    }
    Ok(first)
}

/// Headers that start with `prefix`, as `(suffix, full name)` pairs with duplicates removed.
pub fn headers_for_prefix<'a>(headers: &'a Headers, prefix: &str) -> Vec<(&'a str, &'a str)> {
    let mut out: Vec<(&'a str, &'a str)> = Vec::new();
    for (name, _) in headers.iter() {
        let matches = name.len() >= prefix.len()
            && name.is_char_boundary(prefix.len())
            && name[..prefix.len()].eq_ignore_ascii_case(prefix);
        if matches && !out.iter().any(|(_, seen)| seen.eq_ignore_ascii_case(name)) {
            out.push((&name[prefix.len()..], name));
        }
    }
    out
}

/// Quote a list item if it would otherwise be split on read.
pub fn quote_header_value(value: &str) -> Cow<'_, str> {
    if value.contains(',') || value.contains('"') || value.trim() != value {
        Cow::Owned(format!("\"{}\"", value.replace('\\', "\\\\").replace('"', "\\\"")))
    } else {
        Cow::Borrowed(value)
    }
}

fn split_values(value: &str) -> Result<Vec<Cow<'_, str>>, ParseError> {
    let mut items = Vec::new();
    let mut rest = value.trim_start();
    while !rest.is_empty() {
        if let Some(quoted) = rest.strip_prefix('"') {
            let mut item = String::new();
            let mut chars = quoted.char_indices();
            let mut end = None;
            while let Some((idx, ch)) = chars.next() {
                match ch {
                    '\\' => match chars.next() {
                        Some((_, escaped)) => item.push(escaped),
                        None => return Err(ParseError::new(format!("unterminated escape in `{value}`"))),
                    },
                    '"' => {
                        end = Some(idx + 1);
                        break;
                    }
                    other => item.push(other),
                }
            }
            let Some(end) = end else {
                return Err(ParseError::new(format!("unterminated quote in `{value}`")));
            };
            items.push(Cow::Owned(item));
            rest = quoted[end..].trim_start();
            match rest.strip_prefix(',') {
                Some(after) => rest = after.trim_start(),
                None if rest.is_empty() => {}
                None => return Err(ParseError::new(format!("expected `,` after quoted value in `{value}`"))),
            }
        } else {
            let (item, after) = match rest.find(',') {
                Some(idx) => (&rest[..idx], &rest[idx + 1..]),
                None => (rest, ""),
            };
            items.push(Cow::Borrowed(item.trim()));
            rest = after.trim_start();
        }
    }
    Ok(items)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_lists_across_occurrences() {
        let values = ["1, 2", "3"];
        let parsed: Vec<i32> = read_many(values.iter().copied()).unwrap();
        assert_eq!(parsed, vec![1, 2, 3]);
    }

    #[test]
    fn quoted_items_keep_commas() {
        let values = [r#""a,b", c, "d\"e""#];
        let parsed: Vec<String> = read_many(values.iter().copied()).unwrap();
        assert_eq!(parsed, vec!["a,b", "c", "d\"e"]);
    }

    #[test]
    fn quote_round_trips_through_read() {
        let quoted = quote_header_value("x, y");
        let parsed: Vec<String> = read_many(std::iter::once(quoted.as_ref())).unwrap();
        assert_eq!(parsed, vec!["x, y"]);
    }

    #[test]
    fn http_dates_are_re_paired() {
        let values = ["Sun, 06 Nov 1994 08:49:37 GMT, Mon, 07 Nov 1994 08:49:37 GMT"];
        let parsed = read_many_dates(values.iter().copied(), Format::HttpDate).unwrap();
        assert_eq!(parsed.len(), 2);
        assert_eq!(parsed[0].epoch_seconds(), 784111777);
        assert_eq!(parsed[1].epoch_seconds(), 784111777 + 86400);
    }

    #[test]
    fn one_or_none_rejects_many() {
        assert_eq!(one_or_none(Vec::<i32>::new()).unwrap(), None);
        assert_eq!(one_or_none(vec![5]).unwrap(), Some(5));
        assert!(one_or_none(vec![1, 2]).is_err());
    }

    #[test]
    fn prefix_headers_strip_prefix() {
        let mut headers = Headers::new();
        headers.append("X-Meta-Color", "red");
        headers.append("x-meta-size", "large");
        headers.append("Content-Type", "text/plain");
        let found = headers_for_prefix(&headers, "X-Meta-");
        assert_eq!(found, vec![("Color", "X-Meta-Color"), ("size", "x-meta-size")]);
    }

    #[test]
    fn bad_numbers_are_reported() {
        let err = read_many::<i32>(std::iter::once("abc")).unwrap_err();
        assert!(err.to_string().contains("abc"));
    }
}
