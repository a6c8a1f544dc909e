//! In-memory output buffers for one generated crate.
//!
//! Every generated item lands in the buffer of its [`RustModule`]. Nothing touches the file system until the
//! caller flushes the finished [`GeneratedCrate`](super::orchestrator::GeneratedCrate) in one step.
//!
//! ## Notes
//!
//! - Helper functions are memoized per module by name. A name is claimed *before* its body is generated, so a
//!   helper that (indirectly) needs itself sees the claim and just calls it.
//! - Rendering parses the tokens with `syn` and formats them with `prettyplease`. Tokens that fail to parse are
//!   written unformatted with a warning so the problem is visible in the output.

use std::collections::{BTreeMap, BTreeSet};

use proc_macro2::TokenStream;
use quote::{format_ident, quote};

use crate::model::ShapeId;

use super::errors::CodegenError;
use super::runtime::CargoDependency;
use super::symbol::SymbolLocation;

const FILE_HEADER: &str = "// Code generated by shapegen. DO NOT EDIT.\n\n";

/// One source file of the generated crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum RustModule {
    Lib,
    Model,
    Error,
    Input,
    Operation,
    SerdeUtil,
    JsonDeser,
    XmlDeser,
    HttpSerde,
}

impl RustModule {
    pub const ALL: [RustModule; 9] = [
        RustModule::Lib,
        RustModule::Model,
        RustModule::Error,
        RustModule::Input,
        RustModule::Operation,
        RustModule::SerdeUtil,
        RustModule::JsonDeser,
        RustModule::XmlDeser,
        RustModule::HttpSerde,
    ];

    pub fn name(self) -> &'static str {
        match self {
            RustModule::Lib => "lib",
            RustModule::Model => "model",
            RustModule::Error => "error",
            RustModule::Input => "input",
            RustModule::Operation => "operation",
            RustModule::SerdeUtil => "serde_util",
            RustModule::JsonDeser => "json_deser",
            RustModule::XmlDeser => "xml_deser",
            RustModule::HttpSerde => "http_serde",
        }
    }

    pub fn file_path(self) -> String {
        format!("src/{}.rs", self.name())
    }

    /// Public modules are always declared; the rest only when they hold items.
    pub fn is_public(self) -> bool {
        matches!(
            self,
            RustModule::Model | RustModule::Error | RustModule::Input | RustModule::Operation
        )
    }

    pub fn for_location(location: SymbolLocation) -> RustModule {
        match location {
            SymbolLocation::Error => RustModule::Error,
            SymbolLocation::Input => RustModule::Input,
            SymbolLocation::Operation => RustModule::Operation,
            SymbolLocation::Root => RustModule::Lib,
            SymbolLocation::Model | SymbolLocation::External | SymbolLocation::Primitive => RustModule::Model,
        }
    }
}

#[derive(Debug, Default)]
struct ModuleBuffer {
    items: Vec<TokenStream>,
    helpers: BTreeSet<String>,
    names: BTreeMap<String, ShapeId>,
}

#[derive(Debug, Default)]
pub struct CrateWriter {
    modules: BTreeMap<RustModule, ModuleBuffer>,
    dependencies: BTreeMap<String, CargoDependency>,
    markers: Vec<String>,
    crate_doc: Option<String>,
}

impl CrateWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, module: RustModule, item: TokenStream) {
        self.modules.entry(module).or_default().items.push(item);
    }

    /// Claim helper `name` in `module`. Returns `false` when it was already claimed.
    pub fn claim_helper(&mut self, module: RustModule, name: &str) -> bool {
        self.modules.entry(module).or_default().helpers.insert(name.to_string())
    }

    pub fn has_helper(&self, module: RustModule, name: &str) -> bool {
        self.modules
            .get(&module)
            .is_some_and(|buffer| buffer.helpers.contains(name))
    }

    /// Record that `origin` generates item `name` in `module`.
    pub fn declare(&mut self, module: RustModule, name: &str, origin: &ShapeId) -> Result<(), CodegenError> {
        let names = &mut self.modules.entry(module).or_default().names;
        match names.get(name) {
            Some(first) if first != origin => Err(CodegenError::NameCollision {
                module: module.name(),
                name: name.to_string(),
                first: first.clone(),
                second: origin.clone(),
            }),
            _ => {
                names.insert(name.to_string(), origin.clone());
                Ok(())
            }
        }
    }

    pub fn add_dependency(&mut self, dependency: CargoDependency) {
        match self.dependencies.get_mut(&dependency.name) {
            Some(existing) => existing.merge(&dependency),
            None => {
                self.dependencies.insert(dependency.name.clone(), dependency);
            }
        }
    }

    pub fn dependencies(&self) -> impl Iterator<Item = &CargoDependency> {
        self.dependencies.values()
    }

    /// Record an unimplemented combination that was emitted as a `todo!` marker.
    pub fn add_marker(&mut self, message: impl Into<String>) {
        let message = message.into();
        tracing::warn!(marker = %message, "emitting unimplemented marker");
        self.markers.push(message);
    }

    pub fn markers(&self) -> &[String] {
        &self.markers
    }

    pub fn set_crate_doc(&mut self, doc: impl Into<String>) {
        self.crate_doc = Some(doc.into());
    }

    pub fn is_empty(&self, module: RustModule) -> bool {
        self.modules.get(&module).is_none_or(|buffer| buffer.items.is_empty())
    }

    /// Render every module that has content (plus the public ones) to formatted source.
    pub fn render(&self) -> BTreeMap<String, String> {
        let mut files = BTreeMap::new();
        for module in RustModule::ALL {
            let emitted = module == RustModule::Lib || module.is_public() || !self.is_empty(module);
            if !emitted {
                continue;
            }
            let items = self.modules.get(&module).map(|buffer| buffer.items.as_slice()).unwrap_or_default();
            let tokens = if module == RustModule::Lib {
                self.lib_tokens(items)
            } else {
                quote!(#(#items)*)
            };
            files.insert(module.file_path(), format!("{FILE_HEADER}{}", render_tokens(tokens)));
        }
        files
    }

    fn lib_tokens(&self, items: &[TokenStream]) -> TokenStream {
        let doc = self.crate_doc.as_deref().unwrap_or("Generated service client types.");
        let declarations = RustModule::ALL
            .into_iter()
            .filter(|module| *module != RustModule::Lib)
            .filter(|module| module.is_public() || !self.is_empty(*module))
            .map(|module| {
                let name = format_ident!("{}", module.name());
                if module.is_public() {
                    quote!(pub mod #name;)
                } else {
                    quote!(mod #name;)
                }
            });
        quote! {
            #![doc = #doc]
            #![allow(clippy::all, unused_mut, unused_variables, unreachable_code)]
            #(#declarations)*
            #(#items)*
        }
    }
}

/// Format tokens as Rust source, falling back to the raw token text.
pub fn render_tokens(tokens: TokenStream) -> String {
    match syn::parse2::<syn::File>(tokens.clone()) {
        Ok(file) => prettyplease::unparse(&file),
        Err(err) => {
            tracing::warn!(error = %err, "generated tokens do not parse; writing them unformatted");
            tokens.to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn helpers_are_claimed_once() {
        let mut writer = CrateWriter::new();
        assert!(writer.claim_helper(RustModule::SerdeUtil, "ser_instant"));
        assert!(!writer.claim_helper(RustModule::SerdeUtil, "ser_instant"));
        assert!(writer.has_helper(RustModule::SerdeUtil, "ser_instant"));
        assert!(!writer.has_helper(RustModule::XmlDeser, "ser_instant"));
    }

    #[test]
    fn private_modules_appear_only_with_items() {
        let mut writer = CrateWriter::new();
        writer.push(RustModule::HttpSerde, quote!(pub fn helper() {}));
        let files = writer.render();
        assert!(files.contains_key("src/http_serde.rs"));
        assert!(!files.contains_key("src/serde_util.rs"));
        assert!(files.contains_key("src/model.rs"));
        let lib = &files["src/lib.rs"];
        assert!(lib.contains("mod http_serde;"));
        assert!(lib.contains("pub mod model;"));
        assert!(!lib.contains("serde_util"));
    }

    #[test]
    fn duplicate_names_are_reported() {
        let mut writer = CrateWriter::new();
        let a = ShapeId::new("a", "Thing");
        let b = ShapeId::new("b", "Thing");
        writer.declare(RustModule::Model, "Thing", &a).unwrap();
        writer.declare(RustModule::Model, "Thing", &a).unwrap();
        assert!(matches!(
            writer.declare(RustModule::Model, "Thing", &b),
            Err(CodegenError::NameCollision { .. })
        ));
    }

    #[test]
    fn unparsable_tokens_are_kept_raw() {
        let rendered = render_tokens(quote!(fn ()));
        assert!(rendered.contains("fn"));
    }
}
