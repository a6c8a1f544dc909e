//! Provide the identifier vocabulary shared by the shapegen generator and its tests.
//!
//! Model names arrive in whatever casing the IDL author chose (`GetThingInput`, `ETag`, `us-east-1`). Generated Rust
//! needs snake-case fields and modules, PascalCase types and variants, and escaping for anything that collides with a
//! Rust keyword. Keeping those rules in one dependency-free crate means every generator module agrees on them.
//!
//! ## Notes
//!
//! - Pure functions only: **no IO**, no global state, no model types.
//! - Case conversion is deterministic and idempotent: converting an already converted name returns it unchanged.
//!
//! ## See also
//! - [`naming`] for case conversion and escaping
//! - [`lang::rust_keywords`] for the keyword table

pub mod lang;
pub mod naming;

pub use naming::{escape_ident, to_pascal_case, to_snake_case};
