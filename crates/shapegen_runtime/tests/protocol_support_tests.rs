//! Header, label, query and error-envelope helpers as generated operations use them.

use shapegen_runtime::header::{self, headers_for_prefix, one_or_none, quote_header_value, read_many, read_many_dates};
use shapegen_runtime::http::{HttpRequest, HttpResponse};
use shapegen_runtime::instant::{Format, Instant};
use shapegen_runtime::{json, label, query, xml};

#[test]
fn list_headers_survive_quoting() {
    let items = ["plain", "with, comma", "with \"quote\""];
    let joined = items.iter().map(|item| quote_header_value(item)).collect::<Vec<_>>().join(", ");
    let mut request = HttpRequest::new("GET", "/");
    request.headers_mut().insert("X-Items", joined);
    let parsed: Vec<String> = read_many(request.headers().get_all("x-items")).unwrap();
    assert_eq!(parsed, items);
}

#[test]
fn repeated_headers_and_numbers() {
    let response = HttpResponse::new(200, Vec::new())
        .with_header("X-Count", "1, 2")
        .with_header("x-count", "3");
    let counts: Vec<i32> = read_many(response.headers().get_all("X-Count")).unwrap();
    assert_eq!(counts, vec![1, 2, 3]);
    assert!(one_or_none(counts).is_err());
    let bad = read_many::<i32>(["x"].into_iter());
    assert!(bad.is_err());
}

#[test]
fn http_dates_keep_their_commas() {
    let value = "Mon, 16 Dec 2019 23:48:18 GMT, Tue, 17 Dec 2019 23:48:18 GMT";
    let dates = read_many_dates([value].into_iter(), Format::HttpDate).unwrap();
    assert_eq!(dates.len(), 2);
    assert_eq!(dates[1].epoch_seconds() - dates[0].epoch_seconds(), 86_400);
    let single = read_many_dates(["1576540098"].into_iter(), Format::EpochSeconds).unwrap();
    assert_eq!(one_or_none(single).unwrap(), Some(dates[0]));
}

#[test]
fn prefix_headers_strip_the_prefix() {
    let response = HttpResponse::new(200, Vec::new())
        .with_header("X-Meta-Color", "red")
        .with_header("x-meta-size", "L")
        .with_header("Other", "x");
    let pairs = headers_for_prefix(response.headers(), "X-Meta-");
    let suffixes: Vec<&str> = pairs.iter().map(|(suffix, _)| *suffix).collect();
    assert_eq!(suffixes, vec!["Color", "size"]);
    assert_eq!(response.headers().get(pairs[1].1), Some("L"));
}

#[test]
fn uri_building() {
    let mut uri = format!("/buckets/{}/{}", label::fmt_string("my bucket", false), label::fmt_string("a/b c", true));
    let mut writer = query::Writer::new(&mut uri);
    writer.push_kv("since", &query::fmt_timestamp(&Instant::from_epoch_seconds(0), Format::DateTime));
    assert_eq!(uri, "/buckets/my%20bucket/a/b%20c?since=1970-01-01T00%3A00%3A00Z");
}

#[test]
fn json_error_envelopes() {
    let response = HttpResponse::new(400, br#"{"code": "example#ThingNotFound:http://internal/", "message": "gone"}"#.to_vec());
    let err = json::errors::parse_generic_error(response.body(), response.headers()).unwrap();
    assert_eq!(err.code(), Some("ThingNotFound"));
    assert_eq!(err.message(), Some("gone"));
    assert!(!response.is_success());
}

#[test]
fn xml_error_envelopes() {
    let body = b"<ErrorResponse><Error><Code>NoSuchThing</Code><Message>nope</Message></Error><RequestId>r-1</RequestId></ErrorResponse>";
    let err = xml::errors::parse_generic_error(body).unwrap();
    assert_eq!(err.code(), Some("NoSuchThing"));
    assert_eq!(err.request_id(), Some("r-1"));
    assert!(xml::errors::parse_generic_error(b"<Output/>").is_err());
}

#[test]
fn header_parse_errors_display() {
    assert_eq!(header::ParseError::new("bad").to_string(), "failed to parse header: bad");
}
