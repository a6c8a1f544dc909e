//! Resolved type descriptors.

use proc_macro2::TokenStream;
use quote::{format_ident, quote};

use super::runtime::{CargoDependency, RuntimeType};

/// Module a generated symbol lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SymbolLocation {
    /// Crate root (`lib.rs`).
    Root,
    Model,
    Error,
    Input,
    Operation,
    /// Provided by a dependency.
    External,
    /// Built into the language.
    Primitive,
}

impl SymbolLocation {
    pub fn module_name(self) -> Option<&'static str> {
        match self {
            SymbolLocation::Model => Some("model"),
            SymbolLocation::Error => Some("error"),
            SymbolLocation::Input => Some("input"),
            SymbolLocation::Operation => Some("operation"),
            SymbolLocation::Root | SymbolLocation::External | SymbolLocation::Primitive => None,
        }
    }
}

/// A Rust type expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RustType {
    Bool,
    I8,
    I16,
    I32,
    I64,
    F32,
    F64,
    String,
    /// An item from a dependency (timestamp, blob, document).
    External(RuntimeType),
    Vec(Box<RustType>),
    HashSet(Box<RustType>),
    /// Always keyed by `String`.
    HashMap(Box<RustType>),
    Option(Box<RustType>),
    Box(Box<RustType>),
    /// A type generated into this crate.
    Generated { name: String, location: SymbolLocation },
}

impl RustType {
    pub fn option(inner: RustType) -> RustType {
        RustType::Option(Box::new(inner))
    }

    pub fn boxed(inner: RustType) -> RustType {
        RustType::Box(Box::new(inner))
    }

    pub fn is_option(&self) -> bool {
        matches!(self, RustType::Option(_))
    }

    pub fn is_box(&self) -> bool {
        matches!(self, RustType::Box(_))
    }

    /// The type with every outer `Option` and `Box` removed.
    pub fn core(&self) -> &RustType {
        match self {
            RustType::Option(inner) | RustType::Box(inner) => inner.core(),
            other => other,
        }
    }

    /// Element type of a `Vec` or `HashSet`.
    pub fn element(&self) -> Option<&RustType> {
        match self {
            RustType::Vec(inner) | RustType::HashSet(inner) => Some(inner),
            _ => None,
        }
    }

    /// `true` if the type contains a timestamp, blob or document anywhere.
    pub fn contains_external(&self) -> bool {
        match self {
            RustType::External(_) => true,
            RustType::Vec(inner)
            | RustType::HashSet(inner)
            | RustType::HashMap(inner)
            | RustType::Option(inner)
            | RustType::Box(inner) => inner.contains_external(),
            _ => false,
        }
    }

    /// Path of a generated type's companion builder.
    pub fn builder_path(&self) -> Option<TokenStream> {
        match self {
            RustType::Generated { name, location } => {
                let module = format_ident!("{}", location.module_name()?);
                let builder_module = format_ident!("{}", super::names::snake_name(name));
                Some(quote!(crate::#module::#builder_module::Builder))
            }
            _ => None,
        }
    }

    /// Lower-snake description used to name helper functions, e.g. `option_vec_instant`.
    pub fn flattened_name(&self) -> String {
        match self {
            RustType::Bool => "bool".to_string(),
            RustType::I8 => "i8".to_string(),
            RustType::I16 => "i16".to_string(),
            RustType::I32 => "i32".to_string(),
            RustType::I64 => "i64".to_string(),
            RustType::F32 => "f32".to_string(),
            RustType::F64 => "f64".to_string(),
            RustType::String => "string".to_string(),
            RustType::External(runtime) => super::names::snake_fragment(&runtime.name),
            RustType::Vec(inner) => format!("vec_{}", inner.flattened_name()),
            RustType::HashSet(inner) => format!("set_{}", inner.flattened_name()),
            RustType::HashMap(inner) => format!("map_{}", inner.flattened_name()),
            RustType::Option(inner) => format!("option_{}", inner.flattened_name()),
            RustType::Box(inner) => format!("box_{}", inner.flattened_name()),
            RustType::Generated { name, .. } => super::names::snake_fragment(name),
        }
    }

    /// Fully qualified type tokens.
    pub fn tokens(&self) -> TokenStream {
        match self {
            RustType::Bool => quote!(bool),
            RustType::I8 => quote!(i8),
            RustType::I16 => quote!(i16),
            RustType::I32 => quote!(i32),
            RustType::I64 => quote!(i64),
            RustType::F32 => quote!(f32),
            RustType::F64 => quote!(f64),
            RustType::String => quote!(::std::string::String),
            RustType::External(runtime) => runtime.tokens(),
            RustType::Vec(inner) => {
                let inner = inner.tokens();
                quote!(::std::vec::Vec<#inner>)
            }
            RustType::HashSet(inner) => {
                let inner = inner.tokens();
                quote!(::std::collections::HashSet<#inner>)
            }
            RustType::HashMap(inner) => {
                let inner = inner.tokens();
                quote!(::std::collections::HashMap<::std::string::String, #inner>)
            }
            RustType::Option(inner) => {
                let inner = inner.tokens();
                quote!(::std::option::Option<#inner>)
            }
            RustType::Box(inner) => {
                let inner = inner.tokens();
                quote!(::std::boxed::Box<#inner>)
            }
            RustType::Generated { name, location } => {
                let name = format_ident!("{}", name);
                match location.module_name() {
                    Some(module) => {
                        let module = format_ident!("{}", module);
                        quote!(crate::#module::#name)
                    }
                    None => quote!(crate::#name),
                }
            }
        }
    }
}

/// The result of resolving a shape or member.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Symbol {
    pub rust_type: RustType,
    pub location: SymbolLocation,
    /// Dependencies needed to name `rust_type`.
    pub dependencies: Vec<CargoDependency>,
}

impl Symbol {
    pub fn primitive(rust_type: RustType) -> Self {
        Symbol {
            rust_type,
            location: SymbolLocation::Primitive,
            dependencies: Vec::new(),
        }
    }

    pub fn tokens(&self) -> TokenStream {
        self.rust_type.tokens()
    }

    /// Name of a generated type.
    pub fn name(&self) -> Option<&str> {
        match self.rust_type.core() {
            RustType::Generated { name, .. } => Some(name),
            _ => None,
        }
    }

    /// Wrap in a new outer type, keeping location and dependencies.
    pub fn map_type(self, wrap: impl FnOnce(RustType) -> RustType) -> Self {
        Symbol {
            rust_type: wrap(self.rust_type),
            ..self
        }
    }
}
