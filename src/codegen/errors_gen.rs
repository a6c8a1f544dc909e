//! Error shapes and per-operation error enums.
//!
//! Each operation `Op` gets `OpError { kind: OpErrorKind, meta: GenericError }`. The kind has one variant per
//! modeled error plus `Unhandled` for envelopes that match none of them.

use quote::{format_ident, quote};

use crate::model::{Shape, ShapeKind};

use super::errors::CodegenError;
use super::names::{self, ident};
use super::runtime::LogicalType;
use super::symbol::RustType;
use super::writer::{CrateWriter, RustModule};
use super::CodegenCtx;

const MESSAGE_MEMBERS: [&str; 2] = ["message", "Message"];

/// `Display`, `Error` and `message()` for an error structure.
pub fn generate_error_impls(ctx: &CodegenCtx<'_>, writer: &mut CrateWriter, shape: &Shape) -> Result<(), CodegenError> {
    let type_name = names::type_name(shape);
    let name = ident(&type_name, &shape.id)?;

    let message_member = shape
        .members()
        .into_iter()
        .find(|member| MESSAGE_MEMBERS.contains(&member.name.as_str()));
    let mut message_parts = (quote!(), quote!(::std::option::Option::None));
    if let Some(member) = message_member {
        let symbol = ctx.symbols.resolve_member(shape, member)?;
        let field = ident(&names::field_name(member), &shape.id)?;
        match &symbol.rust_type {
            RustType::Option(inner) if **inner == RustType::String => {
                message_parts = (
                    quote! {
                        if let ::std::option::Option::Some(message) = &self.#field {
                            write!(f, ": {}", message)?;
                        }
                    },
                    quote!(self.#field.as_deref()),
                );
            }
            RustType::String => {
                message_parts = (
                    quote!(write!(f, ": {}", &self.#field)?;),
                    quote!(::std::option::Option::Some(self.#field.as_str())),
                );
            }
            _ => {}
        }
    }
    let (display_message, message_expr) = message_parts;

    writer.push(
        RustModule::Error,
        quote! {
            impl #name {
                /// The error message, if the service sent one.
                pub fn message(&self) -> ::std::option::Option<&str> {
                    #message_expr
                }
            }

            impl ::std::fmt::Display for #name {
                fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                    f.write_str(#type_name)?;
                    #display_message
                    ::std::result::Result::Ok(())
                }
            }

            impl ::std::error::Error for #name {}
        },
    );
    Ok(())
}

/// `OpError` and `OpErrorKind` for one operation.
pub fn generate_operation_error(
    ctx: &CodegenCtx<'_>,
    writer: &mut CrateWriter,
    operation: &Shape,
) -> Result<(), CodegenError> {
    let ShapeKind::Operation(op) = &operation.kind else {
        return Ok(());
    };
    let op_name = names::type_name(operation);
    let error_name = format!("{op_name}Error");
    let kind_name = format!("{op_name}ErrorKind");
    writer.declare(RustModule::Error, &error_name, &operation.id)?;
    writer.declare(RustModule::Error, &kind_name, &operation.id)?;
    let error = ident(&error_name, &operation.id)?;
    let kind = ident(&kind_name, &operation.id)?;
    let generic_error = ctx.runtime.path(LogicalType::GenericError);

    let mut variants = Vec::new();
    let mut display_arms = Vec::new();
    let mut source_arms = Vec::new();
    let mut predicates = Vec::new();
    for error_id in &op.errors {
        let error_shape = ctx.symbols.shape(error_id)?;
        let symbol = ctx.symbols.resolve(error_shape)?;
        let ty = symbol.tokens();
        let variant_name = names::type_name(error_shape);
        let variant = ident(&variant_name, &error_shape.id)?;
        let doc = format!(" A `{}` error.", error_shape.name());
        variants.push(quote! {
            #[doc = #doc]
            #variant(#ty),
        });
        display_arms.push(quote!(#kind::#variant(inner) => ::std::fmt::Display::fmt(inner, f),));
        source_arms.push(quote!(#kind::#variant(inner) => ::std::option::Option::Some(inner),));
        let predicate = format_ident!("is_{}", names::snake_fragment(&variant_name));
        predicates.push(quote! {
            pub fn #predicate(&self) -> bool {
                matches!(&self.kind, #kind::#variant(_))
            }
        });
    }

    let doc = format!(" Error returned by the `{}` operation.", operation.name());
    let kind_doc = format!(" Kinds of [`{error_name}`].");
    writer.push(
        RustModule::Error,
        quote! {
            #[doc = #doc]
            #[derive(Debug)]
            pub struct #error {
                pub kind: #kind,
                pub(crate) meta: #generic_error,
            }

            #[doc = #kind_doc]
            #[non_exhaustive]
            #[derive(Debug)]
            pub enum #kind {
                #(#variants)*
                /// An error that matched none of the modeled errors.
                Unhandled(::std::boxed::Box<dyn ::std::error::Error + ::std::marker::Send + ::std::marker::Sync + 'static>),
            }

            impl ::std::fmt::Display for #error {
                fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                    match &self.kind {
                        #(#display_arms)*
                        #kind::Unhandled(inner) => ::std::fmt::Display::fmt(inner, f),
                    }
                }
            }

            impl #error {
                pub fn new(kind: #kind, meta: #generic_error) -> Self {
                    Self { kind, meta }
                }

                /// Wrap any error as `Unhandled`.
                pub fn unhandled(
                    err: impl ::std::convert::Into<::std::boxed::Box<dyn ::std::error::Error + ::std::marker::Send + ::std::marker::Sync + 'static>>,
                ) -> Self {
                    Self {
                        kind: #kind::Unhandled(err.into()),
                        meta: ::std::default::Default::default(),
                    }
                }

                /// An `Unhandled` error that keeps the envelope metadata.
                pub fn generic(err: #generic_error) -> Self {
                    Self {
                        meta: err.clone(),
                        kind: #kind::Unhandled(err.into()),
                    }
                }

                pub fn meta(&self) -> &#generic_error {
                    &self.meta
                }

                pub fn code(&self) -> ::std::option::Option<&str> {
                    self.meta.code()
                }

                pub fn message(&self) -> ::std::option::Option<&str> {
                    self.meta.message()
                }

                pub fn request_id(&self) -> ::std::option::Option<&str> {
                    self.meta.request_id()
                }

                #(#predicates)*
            }

            impl ::std::error::Error for #error {
                fn source(&self) -> ::std::option::Option<&(dyn ::std::error::Error + 'static)> {
                    match &self.kind {
                        #(#source_arms)*
                        #kind::Unhandled(inner) => ::std::option::Option::Some(inner.as_ref()),
                    }
                }
            }
        },
    );
    Ok(())
}
