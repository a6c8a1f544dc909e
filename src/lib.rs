#![forbid(unsafe_code)]
//! shapegen: Smithy-style service models to Rust client crates.
//!
//! A run loads a [`model::Model`], picks a wire protocol for one service and produces the files of a crate
//! ([`codegen::execute`]): data types with builders, per-operation error types and per-operation structs that
//! build HTTP requests and parse responses through the companion `shapegen_runtime` crate.
//!
//! ## Panic Policy
//!
//! - **Production code**: Use `Result` or `Option` with `?` / `ok_or` / `map_err`. The `cli` module enforces
//!   `#![deny(clippy::unwrap_used)]`.
//! - **Test code**: `.unwrap()` and `.expect()` are acceptable in tests.
//! - **Generated code**: Output may contain `todo!` markers for unsupported protocol/shape combinations. They are
//!   listed in [`codegen::GeneratedCrate::markers`].

pub mod cli;
pub mod codegen;
pub mod config;
pub mod model;

pub use codegen::{CodegenContext, CodegenError, CodegenSettings, GeneratedCrate, execute};
pub use model::{Model, ShapeId};
