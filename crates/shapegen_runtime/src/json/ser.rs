//! Borrowing serializers for runtime types.

use std::collections::HashMap;

use serde::{Serialize, Serializer};

use crate::blob::Blob;
use crate::document::{Document, Number};
use crate::instant::{Format, Instant};

/// Serialize an [`Instant`] in a fixed wire format.
pub struct InstantSer<'a> {
    value: &'a Instant,
    format: Format,
}

impl<'a> InstantSer<'a> {
    pub fn new(value: &'a Instant, format: Format) -> Self {
        InstantSer { value, format }
    }
}

impl Serialize for InstantSer<'_> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self.format {
            Format::EpochSeconds if self.value.has_nanos() => {
                serializer.serialize_f64(self.value.epoch_fractional_seconds())
            }
            Format::EpochSeconds => serializer.serialize_i64(self.value.epoch_seconds()),
            format => serializer.serialize_str(&self.value.fmt(format)),
        }
    }
}

/// Serialize a [`Blob`] as base64 text.
pub struct BlobSer<'a>(&'a Blob);

impl<'a> BlobSer<'a> {
    pub fn new(value: &'a Blob) -> Self {
        BlobSer(value)
    }
}

impl Serialize for BlobSer<'_> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.0.to_base64())
    }
}

/// Serialize a [`Document`] as the equivalent JSON value.
pub struct DocumentSer<'a>(&'a Document);

impl<'a> DocumentSer<'a> {
    pub fn new(value: &'a Document) -> Self {
        DocumentSer(value)
    }
}

impl Serialize for DocumentSer<'_> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self.0 {
            Document::Object(entries) => {
                serializer.collect_map(entries.iter().map(|(key, value)| (key, DocumentSer(value))))
            }
            Document::Array(values) => serializer.collect_seq(values.iter().map(DocumentSer)),
            Document::Number(Number::PosInt(v)) => serializer.serialize_u64(*v),
            Document::Number(Number::NegInt(v)) => serializer.serialize_i64(*v),
            Document::Number(Number::Float(v)) => serializer.serialize_f64(*v),
            Document::String(v) => serializer.serialize_str(v),
            Document::Bool(v) => serializer.serialize_bool(*v),
            Document::Null => serializer.serialize_unit(),
        }
    }
}

/// Serialize a slice by converting each element first.
pub struct SeqWith<'a, T, F> {
    items: &'a [T],
    convert: F,
}

impl<'a, T, F> SeqWith<'a, T, F> {
    pub fn new<W>(items: &'a [T], convert: F) -> Self
    where
        F: Fn(&'a T) -> W,
        W: Serialize,
    {
        SeqWith { items, convert }
    }
}

impl<'a, T, F, W> Serialize for SeqWith<'a, T, F>
where
    F: Fn(&'a T) -> W,
    W: Serialize,
{
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let items: &'a [T] = self.items;
        serializer.collect_seq(items.iter().map(&self.convert))
    }
}

/// Serialize a string-keyed map by converting each value first.
pub struct MapWith<'a, V, F> {
    entries: &'a HashMap<String, V>,
    convert: F,
}

impl<'a, V, F> MapWith<'a, V, F> {
    pub fn new<W>(entries: &'a HashMap<String, V>, convert: F) -> Self
    where
        F: Fn(&'a V) -> W,
        W: Serialize,
    {
        MapWith { entries, convert }
    }
}

impl<'a, V, F, W> Serialize for MapWith<'a, V, F>
where
    F: Fn(&'a V) -> W,
    W: Serialize,
{
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let entries: &'a HashMap<String, V> = self.entries;
        serializer.collect_map(entries.iter().map(|(key, value)| (key, (self.convert)(value))))
    }
}

/// `skip_serializing_if` predicate for boxed optional members.
#[allow(clippy::borrowed_box)]
pub fn is_boxed_none<T>(value: &Box<Option<T>>) -> bool {
    value.is_none()
}
