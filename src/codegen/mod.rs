//! Shape-to-Rust code generation.
//!
//! The entry point is [`orchestrator::execute`]. It boxes recursive members, normalizes operation inputs, resolves
//! every shape reachable from the service to a [`Symbol`] and drives the generators below, which append items to
//! a [`CrateWriter`].
//!
//! ## Notes
//!
//! - Generated code names every type by its fully qualified path (`::std::option::Option`, `crate::model::City`),
//!   so model shapes called `Option` or `String` cannot shadow anything.
//! - Unsupported shape/protocol combinations are emitted as `todo!` markers and listed in
//!   [`GeneratedCrate::markers`].
//!
//! ## See also
//!
//! - [`protocol`]: per-protocol request/response codecs.
//! - [`crate::model`]: the shape graph being compiled.

pub mod boxer;
pub mod builder;
pub mod enums;
pub mod errors;
pub mod errors_gen;
pub mod instantiator;
pub mod manifest;
pub mod meta;
pub mod names;
pub mod normalizer;
pub mod orchestrator;
pub mod protocol;
pub mod resolver;
pub mod runtime;
pub mod structure;
pub mod symbol;
pub mod union;
pub mod writer;

use proc_macro2::TokenStream;
use quote::quote;

use crate::model::{Model, Shape};

pub use errors::CodegenError;
pub use meta::{Configurator, DefaultConfigurator, Meta};
pub use orchestrator::{CodegenContext, CodegenSettings, GeneratedCrate, execute};
pub use protocol::{Protocol, ProtocolId, ProtocolLoader};
pub use resolver::{ResolutionError, SymbolResolver};
pub use runtime::{CargoDependency, DependencyLocation, LogicalType, RuntimeConfig, RuntimeLocation, RuntimeType, RuntimeTypes};
pub use symbol::{RustType, Symbol, SymbolLocation};
pub use writer::{CrateWriter, RustModule};

/// Read-only state shared by every generator during one run.
pub struct CodegenCtx<'a> {
    pub model: &'a Model,
    pub symbols: &'a SymbolResolver<'a>,
    pub runtime: &'a RuntimeTypes,
    pub protocol: &'a dyn Protocol,
    pub service: &'a Shape,
}

/// `#[doc = "..."]` attributes for a documentation trait, one per line.
pub(crate) fn doc_attrs(documentation: Option<&str>) -> TokenStream {
    let Some(text) = documentation else {
        return quote!();
    };
    let lines = text.lines().map(|line| format!(" {}", line.trim_end()));
    quote!(#(#[doc = #lines])*)
}
