//! Owning deserializers for runtime types; generated code unwraps them with `.0`.

use serde::de::Error as _;
use serde::{Deserialize, Deserializer};

use crate::blob::Blob;
use crate::document::Document;
use crate::instant::{Format, Instant};

/// A timestamp written as (possibly fractional) epoch seconds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InstantEpochSeconds(pub Instant);

impl<'de> Deserialize<'de> for InstantEpochSeconds {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let number = serde_json::Number::deserialize(deserializer)?;
        if let Some(seconds) = number.as_i64() {
            return Ok(InstantEpochSeconds(Instant::from_epoch_seconds(seconds)));
        }
        match number.as_f64() {
            Some(value) if value.is_finite() => Ok(InstantEpochSeconds(Instant::from_f64(value))),
            _ => Err(D::Error::custom(format!("invalid epoch seconds `{number}`"))),
        }
    }
}

/// A timestamp written as an RFC 3339 string.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InstantDateTime(pub Instant);

impl<'de> Deserialize<'de> for InstantDateTime {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        parse_text(deserializer, Format::DateTime).map(InstantDateTime)
    }
}

/// A timestamp written as an HTTP-date string.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InstantHttpDate(pub Instant);

impl<'de> Deserialize<'de> for InstantHttpDate {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        parse_text(deserializer, Format::HttpDate).map(InstantHttpDate)
    }
}

fn parse_text<'de, D>(deserializer: D, format: Format) -> Result<Instant, D::Error>
where
    D: Deserializer<'de>,
{
    let text = String::deserialize(deserializer)?;
    Instant::from_str(&text, format).map_err(D::Error::custom)
}

/// A blob written as base64 text.
#[derive(Debug, Clone, PartialEq)]
pub struct BlobDeser(pub Blob);

impl<'de> Deserialize<'de> for BlobDeser {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let text = String::deserialize(deserializer)?;
        Blob::from_base64(&text)
            .map(BlobDeser)
            .map_err(|_| D::Error::custom(format!("`{text}` is not valid base64")))
    }
}

/// Any JSON value, kept as a [`Document`].
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentDeser(pub Document);

impl<'de> Deserialize<'de> for DocumentDeser {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        serde_json::Value::deserialize(deserializer).map(|value| DocumentDeser(Document::from(value)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn epoch_seconds_accept_integers_and_fractions() {
        let whole: InstantEpochSeconds = serde_json::from_str("1515531081").unwrap();
        assert_eq!(whole.0, Instant::from_epoch_seconds(1515531081));
        let fractional: InstantEpochSeconds = serde_json::from_str("1515531081.5").unwrap();
        assert_eq!(fractional.0.epoch_subsecond_nanos(), 500_000_000);
        assert!(serde_json::from_str::<InstantEpochSeconds>(r#""soon""#).is_err());
    }

    #[test]
    fn text_formats() {
        let parsed: InstantDateTime = serde_json::from_str(r#""1970-01-01T00:00:01Z""#).unwrap();
        assert_eq!(parsed.0.epoch_seconds(), 1);
        let parsed: InstantHttpDate = serde_json::from_str(r#""Thu, 01 Jan 1970 00:00:01 GMT""#).unwrap();
        assert_eq!(parsed.0.epoch_seconds(), 1);
    }

    #[test]
    fn blobs_reject_bad_base64() {
        let ok: BlobDeser = serde_json::from_str(r#""YQ==""#).unwrap();
        assert_eq!(ok.0.as_ref(), b"a");
        assert!(serde_json::from_str::<BlobDeser>(r#""!!""#).is_err());
    }
}
