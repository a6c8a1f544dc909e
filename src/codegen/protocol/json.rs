//! serde-based JSON documents, shared by awsJson and restJson1.
//!
//! Structures and unions derive `Serialize`/`Deserialize`. Members whose type contains a timestamp, blob or
//! document get `serialize_with`/`deserialize_with` helpers in `serde_util.rs`, built from the runtime's adapter
//! types. Enums serialize through their string value so unknown values survive a round trip.
//!
//! ## Notes
//!
//! - Helper names describe the Rust type plus the timestamp format (`ser_option_vec_instant_date_time`), so
//!   members sharing a type and format share a helper.
//! - Response documents are read into a private `<Op>OutputBody` struct whose fields are all optional; the output
//!   builder decides what is required.

use proc_macro2::TokenStream;
use quote::{format_ident, quote};
use serde_json::Value;

use crate::codegen::builder::default_value_tokens;
use crate::codegen::errors::CodegenError;
use crate::codegen::meta::{Configurator, DefaultConfigurator, Meta};
use crate::codegen::names::{self, ident};
use crate::codegen::runtime::{CargoDependency, LogicalType, RuntimeTypes};
use crate::codegen::symbol::RustType;
use crate::codegen::writer::{CrateWriter, RustModule};
use crate::codegen::CodegenCtx;
use crate::model::{MemberShape, Shape, ShapeKind, TimestampFormat};

use super::bindings::{self, HttpLocation};
use super::{format_tokens, operation_error_path, operation_fragment};

/// Adds serde derives and per-member serde attributes.
#[derive(Debug, Clone, Copy)]
pub struct JsonConfigurator {
    /// Honor `jsonName` (restJson1) instead of always using the member name (awsJson).
    pub use_json_name: bool,
    pub default_format: TimestampFormat,
}

impl JsonConfigurator {
    pub fn wire_name<'m>(&self, member: &'m MemberShape) -> &'m str {
        match &member.traits.json_name {
            Some(name) if self.use_json_name => name,
            _ => &member.name,
        }
    }
}

impl Configurator for JsonConfigurator {
    fn container_meta(&self, shape: &Shape) -> Meta {
        let meta = DefaultConfigurator.container_meta(shape);
        match shape.kind {
            ShapeKind::Structure(_) | ShapeKind::Union(_) => meta
                .derive(quote!(::serde::Serialize))
                .derive(quote!(::serde::Deserialize)),
            _ => meta,
        }
    }

    fn member_meta(
        &self,
        ctx: &CodegenCtx<'_>,
        writer: &mut CrateWriter,
        container: &Shape,
        member: &MemberShape,
    ) -> Result<Meta, CodegenError> {
        if ctx.symbols.is_streaming(member)? {
            return Ok(Meta::default().attribute(quote!(#[serde(skip)])));
        }
        let wire = self.wire_name(member);
        let mut args = vec![quote!(rename = #wire)];
        let symbol = ctx.symbols.resolve_member(container, member)?;
        let ty = &symbol.rust_type;

        if container.is_structure() {
            if ty.is_option() {
                args.push(quote!(default));
                args.push(quote!(skip_serializing_if = "::std::option::Option::is_none"));
            } else if matches!(ty, RustType::Box(inner) if inner.is_option()) {
                let predicate = format!("{}::json::is_boxed_none", ctx.runtime.config().crate_ident());
                args.push(quote!(default));
                args.push(quote!(skip_serializing_if = #predicate));
                writer.add_dependency(ctx.runtime.runtime_dependency(["json"]));
            } else if let Some(default) = ctx.symbols.usable_default(member)? {
                let helper = default_helper(writer, container, member, ty, &default);
                args.push(quote!(default = #helper));
            }
        }

        if ty.contains_external() {
            let format = bindings::timestamp_format(ctx.model, member, HttpLocation::Document, self.default_format);
            let ser = ser_helper(ctx.runtime, writer, ty, format);
            let de = deser_helper(ctx.runtime, writer, ty, format);
            args.push(quote!(serialize_with = #ser));
            args.push(quote!(deserialize_with = #de));
        }
        Ok(Meta::default().attribute(quote!(#[serde(#(#args),*)])))
    }

    fn enum_items(&self, ctx: &CodegenCtx<'_>, shape: &Shape) -> TokenStream {
        let Ok(symbol) = ctx.symbols.resolve(shape) else {
            return quote!();
        };
        let ty = symbol.tokens();
        quote! {
            impl ::serde::Serialize for #ty {
                fn serialize<S>(&self, serializer: S) -> ::std::result::Result<S::Ok, S::Error>
                where
                    S: ::serde::Serializer,
                {
                    serializer.serialize_str(self.as_str())
                }
            }

            impl<'de> ::serde::Deserialize<'de> for #ty {
                fn deserialize<D>(deserializer: D) -> ::std::result::Result<Self, D::Error>
                where
                    D: ::serde::Deserializer<'de>,
                {
                    let value = <::std::string::String as ::serde::Deserialize>::deserialize(deserializer)?;
                    ::std::result::Result::Ok(<#ty as ::std::convert::From<&str>>::from(value.as_str()))
                }
            }
        }
    }
}

/// Crates JSON-generated code names directly.
pub fn dependencies() -> Vec<CargoDependency> {
    vec![CargoDependency::serde(), CargoDependency::serde_json()]
}

fn contains_instant(ty: &RustType) -> bool {
    match ty {
        RustType::External(runtime) => runtime.name == "Instant",
        RustType::Vec(inner)
        | RustType::HashSet(inner)
        | RustType::HashMap(inner)
        | RustType::Option(inner)
        | RustType::Box(inner) => contains_instant(inner),
        _ => false,
    }
}

fn helper_name(prefix: &str, ty: &RustType, format: TimestampFormat) -> String {
    if contains_instant(ty) {
        format!("{prefix}_{}_{}", ty.flattened_name(), format.suffix())
    } else {
        format!("{prefix}_{}", ty.flattened_name())
    }
}

/// `default = "crate::serde_util::default_<struct>_<field>"` target.
fn default_helper(writer: &mut CrateWriter, container: &Shape, member: &MemberShape, ty: &RustType, value: &Value) -> String {
    let field = names::field_name(member);
    let name = format!(
        "default_{}_{}",
        names::snake_fragment(&names::type_name(container)),
        field.trim_start_matches("r#")
    );
    if writer.claim_helper(RustModule::SerdeUtil, &name) {
        let function = format_ident!("{}", name);
        let value = default_value_tokens(ty.core(), value);
        let value = if ty.is_box() {
            quote!(::std::boxed::Box::new(#value))
        } else {
            value
        };
        let ty = ty.tokens();
        writer.push(
            RustModule::SerdeUtil,
            quote! {
                pub fn #function() -> #ty {
                    #value
                }
            },
        );
    }
    format!("crate::serde_util::{name}")
}

/// A value that serializes `expr` (a reference to `ty`) in its wire form.
fn ser_adapter(runtime: &RuntimeTypes, ty: &RustType, expr: TokenStream, format: TimestampFormat) -> TokenStream {
    let json = runtime.path(LogicalType::Json);
    match ty {
        RustType::External(external) => match external.name.as_str() {
            "Instant" => {
                let format = format_tokens(runtime, format);
                quote!(#json::InstantSer::new(#expr, #format))
            }
            "Blob" => quote!(#json::BlobSer::new(#expr)),
            _ => quote!(#json::DocumentSer::new(#expr)),
        },
        RustType::Vec(inner) if inner.contains_external() => {
            let element = ser_adapter(runtime, inner, quote!(el), format);
            quote!(#json::SeqWith::new(#expr.as_slice(), |el| #element))
        }
        RustType::HashMap(inner) if inner.contains_external() => {
            let element = ser_adapter(runtime, inner, quote!(el), format);
            quote!(#json::MapWith::new(#expr, |el| #element))
        }
        RustType::Box(inner) => ser_adapter(runtime, inner, quote!(&**#expr), format),
        _ => expr,
    }
}

fn ser_body(runtime: &RuntimeTypes, ty: &RustType, format: TimestampFormat) -> TokenStream {
    match ty {
        RustType::Box(inner) => {
            let body = ser_body(runtime, inner, format);
            quote! {
                let value = &**value;
                #body
            }
        }
        RustType::Option(inner) => {
            let adapted = ser_adapter(runtime, inner, quote!(value), format);
            quote! {
                match value {
                    ::std::option::Option::Some(value) => ::serde::Serializer::serialize_some(serializer, &#adapted),
                    ::std::option::Option::None => ::serde::Serializer::serialize_none(serializer),
                }
            }
        }
        other => {
            let adapted = ser_adapter(runtime, other, quote!(value), format);
            quote!(::serde::Serialize::serialize(&#adapted, serializer))
        }
    }
}

/// Generate (once) the `serialize_with` helper for `ty` and return its path.
pub fn ser_helper(runtime: &RuntimeTypes, writer: &mut CrateWriter, ty: &RustType, format: TimestampFormat) -> String {
    let name = helper_name("ser", ty, format);
    if writer.claim_helper(RustModule::SerdeUtil, &name) {
        let function = format_ident!("{}", name);
        let body = ser_body(runtime, ty, format);
        let ty_tokens = ty.tokens();
        writer.push(
            RustModule::SerdeUtil,
            quote! {
                pub fn #function<S>(value: &#ty_tokens, serializer: S) -> ::std::result::Result<S::Ok, S::Error>
                where
                    S: ::serde::Serializer,
                {
                    #body
                }
            },
        );
        writer.add_dependency(runtime.runtime_dependency(["json"]));
    }
    format!("crate::serde_util::{name}")
}

/// The deserializable stand-in for `ty`.
fn wire_type(runtime: &RuntimeTypes, ty: &RustType, format: TimestampFormat) -> TokenStream {
    let json = runtime.path(LogicalType::Json);
    match ty {
        RustType::External(external) => match (external.name.as_str(), format) {
            ("Instant", TimestampFormat::EpochSeconds) => quote!(#json::InstantEpochSeconds),
            ("Instant", TimestampFormat::DateTime) => quote!(#json::InstantDateTime),
            ("Instant", TimestampFormat::HttpDate) => quote!(#json::InstantHttpDate),
            ("Blob", _) => quote!(#json::BlobDeser),
            _ => quote!(#json::DocumentDeser),
        },
        RustType::Vec(inner) => {
            let inner = wire_type(runtime, inner, format);
            quote!(::std::vec::Vec<#inner>)
        }
        RustType::HashMap(inner) => {
            let inner = wire_type(runtime, inner, format);
            quote!(::std::collections::HashMap<::std::string::String, #inner>)
        }
        RustType::Option(inner) => {
            let inner = wire_type(runtime, inner, format);
            quote!(::std::option::Option<#inner>)
        }
        RustType::Box(inner) => wire_type(runtime, inner, format),
        other => other.tokens(),
    }
}

/// Convert `expr` of the wire type back into `ty`.
fn from_wire(ty: &RustType, expr: TokenStream) -> TokenStream {
    match ty {
        RustType::External(_) => quote!(#expr.0),
        RustType::Vec(inner) if inner.contains_external() => {
            let element = from_wire(inner, quote!(el));
            quote!(#expr.into_iter().map(|el| #element).collect::<::std::vec::Vec<_>>())
        }
        RustType::HashMap(inner) if inner.contains_external() => {
            let element = from_wire(inner, quote!(el));
            quote!(#expr.into_iter().map(|(k, el)| (k, #element)).collect::<::std::collections::HashMap<_, _>>())
        }
        RustType::Option(inner) if inner.contains_external() => {
            let element = from_wire(inner, quote!(el));
            quote!(#expr.map(|el| #element))
        }
        RustType::Box(inner) => {
            let inner = from_wire(inner, expr);
            quote!(::std::boxed::Box::new(#inner))
        }
        _ => expr,
    }
}

/// Generate (once) the `deserialize_with` helper for `ty` and return its path.
pub fn deser_helper(runtime: &RuntimeTypes, writer: &mut CrateWriter, ty: &RustType, format: TimestampFormat) -> String {
    let name = helper_name("deser", ty, format);
    if writer.claim_helper(RustModule::SerdeUtil, &name) {
        let function = format_ident!("{}", name);
        let wire = wire_type(runtime, ty, format);
        let converted = from_wire(ty, quote!(value));
        let ty_tokens = ty.tokens();
        writer.push(
            RustModule::SerdeUtil,
            quote! {
                pub fn #function<'de, D>(deserializer: D) -> ::std::result::Result<#ty_tokens, D::Error>
                where
                    D: ::serde::Deserializer<'de>,
                {
                    let value = <#wire as ::serde::Deserialize>::deserialize(deserializer)?;
                    ::std::result::Result::Ok(#converted)
                }
            },
        );
        writer.add_dependency(runtime.runtime_dependency(["json"]));
    }
    format!("crate::serde_util::{name}")
}

/// Emit `json_deser::deser_operation_<op>`, which reads `members` of `output` from a JSON document into its
/// builder. Returns the function path.
pub fn document_deserializer(
    ctx: &CodegenCtx<'_>,
    writer: &mut CrateWriter,
    configurator: &JsonConfigurator,
    operation: &Shape,
    output: &Shape,
    members: &[&MemberShape],
) -> Result<TokenStream, CodegenError> {
    let name = format_ident!("deser_operation_{}", operation_fragment(operation));
    let path = quote!(crate::json_deser::#name);
    if !writer.claim_helper(RustModule::JsonDeser, &name.to_string()) {
        return Ok(path);
    }
    let body_name = format_ident!("{}OutputBody", names::type_name(operation));
    let builder = ctx
        .symbols
        .resolve(output)?
        .rust_type
        .builder_path()
        .ok_or_else(|| crate::model::ModelError::Malformed {
            id: output.id.to_string(),
            message: "operation output is not a structure".to_string(),
        })?;

    let mut fields = Vec::new();
    let mut assignments = Vec::new();
    for member in members {
        let symbol = ctx.symbols.resolve_member(output, member)?;
        let core = RustType::option(symbol.rust_type.core().clone());
        let core_tokens = core.tokens();
        let field_name = names::field_name(member);
        let field = ident(&field_name, &output.id)?;
        let setter = format_ident!("set_{}", field_name.trim_start_matches("r#"));
        let wire = configurator.wire_name(member);
        let mut args = vec![quote!(rename = #wire), quote!(default)];
        if core.contains_external() {
            let format = bindings::timestamp_format(ctx.model, member, HttpLocation::Document, configurator.default_format);
            let de = deser_helper(ctx.runtime, writer, &core, format);
            args.push(quote!(deserialize_with = #de));
        }
        fields.push(quote! {
            #[serde(#(#args),*)]
            #field: #core_tokens,
        });
        assignments.push(quote!(builder = builder.#setter(parsed.#field);));
    }

    writer.push(
        RustModule::JsonDeser,
        quote! {
            #[derive(::serde::Deserialize)]
            struct #body_name {
                #(#fields)*
            }

            pub fn #name(body: &[u8], mut builder: #builder) -> ::std::result::Result<#builder, ::serde_json::Error> {
                if body.iter().all(u8::is_ascii_whitespace) {
                    return ::std::result::Result::Ok(builder);
                }
                let parsed: #body_name = ::serde_json::from_slice(body)?;
                #(#assignments)*
                ::std::result::Result::Ok(builder)
            }
        },
    );
    Ok(path)
}

/// Body of `parse_error` for JSON protocols: read the generic envelope, then the matching modeled error.
pub fn parse_error_body(ctx: &CodegenCtx<'_>, operation: &Shape) -> Result<TokenStream, CodegenError> {
    let error = operation_error_path(operation);
    let kind = format_ident!("{}ErrorKind", names::type_name(operation));
    let json = ctx.runtime.path(LogicalType::Json);
    let errors = operation.as_operation().map(|op| op.errors.as_slice()).unwrap_or_default();

    let mut arms = Vec::new();
    for error_id in errors {
        let shape = ctx.symbols.shape(error_id)?;
        let ty = ctx.symbols.resolve(shape)?.tokens();
        let variant = ident(&names::type_name(shape), &shape.id)?;
        let code = shape.name();
        arms.push(quote! {
            #code => match ::serde_json::from_slice::<#ty>(response.body()) {
                ::std::result::Result::Ok(parsed) => #error::new(crate::error::#kind::#variant(parsed), generic),
                ::std::result::Result::Err(err) => #error::unhandled(err),
            },
        });
    }

    let dispatch = if arms.is_empty() {
        quote!(#error::generic(generic))
    } else {
        quote! {
            let code = match generic.code() {
                ::std::option::Option::Some(code) => code.to_string(),
                ::std::option::Option::None => return #error::generic(generic),
            };
            match code.as_str() {
                #(#arms)*
                _ => #error::generic(generic),
            }
        }
    };
    Ok(quote! {
        let generic = match #json::errors::parse_generic_error(response.body(), response.headers()) {
            ::std::result::Result::Ok(generic) => generic,
            ::std::result::Result::Err(err) => return #error::unhandled(err),
        };
        #dispatch
    })
}
