//! Rust language vocabulary used when emitting identifiers.

pub mod rust_keywords;
