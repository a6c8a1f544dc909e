//! XML document readers for restXml.
//!
//! Every structure, union, list and map reached from an output or error gets one `xml_deser` function that walks
//! the children of its element with a scoped decoder and matches them by element name.
//!
//! ## Notes
//!
//! - Element names come from `xmlName`, else the member name. Lists use `member`, maps `entry`/`key`/`value`
//!   unless renamed.
//! - A flattened collection member repeats its element directly in the parent, so each occurrence appends to the
//!   builder's current value.
//! - Reader names are claimed before their body is generated; recursive shapes just call themselves.
//! - Document members have no XML form. They become `todo!` markers.

use proc_macro2::TokenStream;
use quote::{format_ident, quote};

use crate::codegen::builder;
use crate::codegen::errors::CodegenError;
use crate::codegen::names::{self, ident};
use crate::codegen::runtime::LogicalType;
use crate::codegen::symbol::RustType;
use crate::codegen::writer::{CrateWriter, RustModule};
use crate::codegen::CodegenCtx;
use crate::model::{MemberShape, ModelError, Shape, ShapeKind, TimestampFormat};

use super::bindings::{self, HttpLocation};
use super::{format_tokens, operation_error_path, operation_fragment};

/// Element (or attribute) name of a member.
pub fn element_name(member: &MemberShape) -> &str {
    member.traits.xml_name.as_deref().unwrap_or(&member.name)
}

/// Root element name of a structure read as a whole document.
pub fn root_name(shape: &Shape) -> &str {
    shape.traits.xml_name.as_deref().unwrap_or(shape.name())
}

fn reader_name(prefix: &str, shape: &Shape) -> String {
    format!("deser_{prefix}_{}", names::snake_fragment(&names::type_name(shape)))
}

fn wrap_box(ty: &RustType, value: TokenStream) -> TokenStream {
    if ty.is_box() {
        quote!(::std::boxed::Box::new(#value))
    } else {
        value
    }
}

/// Parse a scalar of `target` from the `&str` expression `text`.
fn scalar_from_str(
    ctx: &CodegenCtx<'_>,
    writer: &mut CrateWriter,
    member: &MemberShape,
    target: &Shape,
    text: TokenStream,
) -> Result<TokenStream, CodegenError> {
    let xml_error = ctx.runtime.path(LogicalType::XmlError);
    let message = format!("expected ({}: `{}`)", target.kind_name(), target.id);
    Ok(match &target.kind {
        ShapeKind::String => quote!(::std::string::String::from(#text)),
        ShapeKind::Enum(_) => {
            let ty = ctx.symbols.resolve(target)?.tokens();
            quote!(<#ty as ::std::convert::From<&str>>::from(#text))
        }
        ShapeKind::Boolean
        | ShapeKind::Byte
        | ShapeKind::Short
        | ShapeKind::Integer
        | ShapeKind::Long
        | ShapeKind::Float
        | ShapeKind::Double => {
            let ty = ctx.symbols.resolve(target)?.tokens();
            quote!(<#ty as ::std::str::FromStr>::from_str(#text).map_err(|_| #xml_error::custom(#message))?)
        }
        ShapeKind::Timestamp => {
            let instant = ctx.runtime.path(LogicalType::Instant);
            let format = format_tokens(
                ctx.runtime,
                bindings::timestamp_format(ctx.model, member, HttpLocation::Document, TimestampFormat::DateTime),
            );
            quote!(#instant::from_str(#text, #format).map_err(|_| #xml_error::custom(#message))?)
        }
        ShapeKind::Blob => {
            let blob = ctx.runtime.path(LogicalType::Blob);
            quote!(#blob::from_base64(#text).map_err(|_| #xml_error::custom(#message))?)
        }
        _ => {
            let marker = format!("{} `{}` cannot be read from XML text", target.kind_name(), target.id);
            writer.add_marker(marker.clone());
            quote!(todo!(#marker))
        }
    })
}

/// Parse the value of `member` from the element decoder `tag`.
fn element_value(
    ctx: &CodegenCtx<'_>,
    writer: &mut CrateWriter,
    member: &MemberShape,
) -> Result<TokenStream, CodegenError> {
    let target = ctx.symbols.shape(&member.target)?;
    let reader = match &target.kind {
        ShapeKind::Structure(_) => structure_reader(ctx, writer, target)?,
        ShapeKind::Union(_) => union_reader(ctx, writer, target)?,
        ShapeKind::List(_) | ShapeKind::Set(_) => list_reader(ctx, writer, target)?,
        ShapeKind::Map { .. } => map_reader(ctx, writer, target)?,
        ShapeKind::Document => {
            writer.add_marker(format!("document member `{}` of `{}`", member.name, member.target));
            return Ok(quote!(todo!("document types are not supported by restXml")));
        }
        _ => {
            let xml = ctx.runtime.path(LogicalType::Xml);
            return scalar_from_str(ctx, writer, member, target, quote!(&*#xml::expect_data(&mut tag)?));
        }
    };
    Ok(quote!(crate::xml_deser::#reader(&mut tag)?))
}

/// Statements reading attribute-bound members and match arms reading element-bound members into `builder`.
fn builder_arms(
    ctx: &CodegenCtx<'_>,
    writer: &mut CrateWriter,
    container: &Shape,
    members: &[&MemberShape],
) -> Result<(Vec<TokenStream>, Vec<TokenStream>), CodegenError> {
    let mut attributes = Vec::new();
    let mut arms = Vec::new();
    for member in members {
        let field_name = names::field_name(member);
        let field = ident(&field_name, &container.id)?;
        let setter = format_ident!("set_{}", field_name.trim_start_matches("r#"));
        let name = element_name(member);
        let target = ctx.symbols.shape(&member.target)?;

        if member.traits.xml_attribute {
            let value = scalar_from_str(ctx, writer, member, target, quote!(text))?;
            attributes.push(quote! {
                if let ::std::option::Option::Some(text) = decoder.start_el().attr(#name) {
                    builder = builder.#setter(::std::option::Option::Some(#value));
                }
            });
            continue;
        }

        let arm = match &target.kind {
            ShapeKind::List(element) | ShapeKind::Set(element) if member.traits.xml_flattened => {
                let value = element_value(ctx, writer, element)?;
                let collection = ctx.symbols.resolve(target)?;
                let element_ty = ctx.symbols.resolve_member(target, element)?;
                let value = wrap_box(&element_ty.rust_type, value);
                let add = if matches!(collection.rust_type, RustType::HashSet(_)) {
                    quote!(items.insert(value);)
                } else {
                    quote!(items.push(value);)
                };
                quote! {
                    s if s.matches(#name) => {
                        let value = #value;
                        let mut items = builder.#field.take().unwrap_or_default();
                        #add
                        builder = builder.#setter(::std::option::Option::Some(items));
                    }
                }
            }
            ShapeKind::Map { .. } if member.traits.xml_flattened => {
                let entry = map_entry_reader(ctx, writer, target)?;
                quote! {
                    s if s.matches(#name) => {
                        let (key, value) = crate::xml_deser::#entry(&mut tag)?;
                        let mut entries = builder.#field.take().unwrap_or_default();
                        entries.insert(key, value);
                        builder = builder.#setter(::std::option::Option::Some(entries));
                    }
                }
            }
            _ => {
                let value = element_value(ctx, writer, member)?;
                quote! {
                    s if s.matches(#name) => {
                        let value = #value;
                        builder = builder.#setter(::std::option::Option::Some(value));
                    }
                }
            }
        };
        arms.push(arm);
    }
    Ok((attributes, arms))
}

/// `deser_structure_<shape>(decoder)`: build a structure from the children of the current element.
pub fn structure_reader(
    ctx: &CodegenCtx<'_>,
    writer: &mut CrateWriter,
    shape: &Shape,
) -> Result<proc_macro2::Ident, CodegenError> {
    let name = reader_name("structure", shape);
    let function = format_ident!("{}", name);
    if !writer.claim_helper(RustModule::XmlDeser, &name) {
        return Ok(function);
    }
    let ty = ctx.symbols.resolve(shape)?.tokens();
    let members = shape.members();
    let (attributes, arms) = builder_arms(ctx, writer, shape, &members)?;
    let decoder_ty = ctx.runtime.path(LogicalType::ScopedDecoder);
    let xml_error = ctx.runtime.path(LogicalType::XmlError);
    let finish = if builder::is_fallible(ctx, shape)? {
        quote!(builder.build().map_err(|err| #xml_error::custom(err.to_string())))
    } else {
        quote!(::std::result::Result::Ok(builder.build()))
    };
    writer.push(
        RustModule::XmlDeser,
        quote! {
            pub fn #function(decoder: &mut #decoder_ty<'_, '_>) -> ::std::result::Result<#ty, #xml_error> {
                let mut builder = #ty::builder();
                #(#attributes)*
                while let ::std::option::Option::Some(mut tag) = decoder.next_tag() {
                    match tag.start_el() {
                        #(#arms)*
                        _ => {}
                    }
                }
                #finish
            }
        },
    );
    Ok(function)
}

/// `deser_union_<shape>(decoder)`: the last recognized member element wins.
pub fn union_reader(
    ctx: &CodegenCtx<'_>,
    writer: &mut CrateWriter,
    shape: &Shape,
) -> Result<proc_macro2::Ident, CodegenError> {
    let name = reader_name("union", shape);
    let function = format_ident!("{}", name);
    if !writer.claim_helper(RustModule::XmlDeser, &name) {
        return Ok(function);
    }
    let ty = ctx.symbols.resolve(shape)?.tokens();
    let mut arms = Vec::new();
    for member in shape.members() {
        let variant = ident(&names::variant_name(member), &shape.id)?;
        let element = element_name(member);
        let variant_ty = ctx.symbols.resolve_member(shape, member)?;
        let target = ctx.symbols.shape(&member.target)?;
        let arm = match &target.kind {
            ShapeKind::List(inner) | ShapeKind::Set(inner) if member.traits.xml_flattened => {
                let element_ty = ctx.symbols.resolve_member(target, inner)?;
                let value = wrap_box(&element_ty.rust_type, element_value(ctx, writer, inner)?);
                let add = match ctx.symbols.resolve(target)?.rust_type {
                    RustType::HashSet(_) => quote!(items.insert(value);),
                    _ => quote!(items.push(value);),
                };
                quote! {
                    s if s.matches(#element) => {
                        let value = #value;
                        let mut items = match base.take() {
                            ::std::option::Option::Some(#ty::#variant(items)) => items,
                            _ => ::std::default::Default::default(),
                        };
                        #add
                        base = ::std::option::Option::Some(#ty::#variant(items));
                    }
                }
            }
            ShapeKind::Map { .. } if member.traits.xml_flattened => {
                let entry = map_entry_reader(ctx, writer, target)?;
                quote! {
                    s if s.matches(#element) => {
                        let (key, value) = crate::xml_deser::#entry(&mut tag)?;
                        let mut entries = match base.take() {
                            ::std::option::Option::Some(#ty::#variant(entries)) => entries,
                            _ => ::std::default::Default::default(),
                        };
                        entries.insert(key, value);
                        base = ::std::option::Option::Some(#ty::#variant(entries));
                    }
                }
            }
            _ => {
                let value = element_value(ctx, writer, member)?;
                let wrapped = wrap_box(&variant_ty.rust_type, quote!(value));
                quote! {
                    s if s.matches(#element) => {
                        let value = #value;
                        base = ::std::option::Option::Some(#ty::#variant(#wrapped));
                    }
                }
            }
        };
        arms.push(arm);
    }
    let decoder_ty = ctx.runtime.path(LogicalType::ScopedDecoder);
    let xml_error = ctx.runtime.path(LogicalType::XmlError);
    let missing = format!("expected a member of union `{}`", shape.id);
    writer.push(
        RustModule::XmlDeser,
        quote! {
            pub fn #function(decoder: &mut #decoder_ty<'_, '_>) -> ::std::result::Result<#ty, #xml_error> {
                let mut base: ::std::option::Option<#ty> = ::std::option::Option::None;
                while let ::std::option::Option::Some(mut tag) = decoder.next_tag() {
                    match tag.start_el() {
                        #(#arms)*
                        _ => {}
                    }
                }
                base.ok_or_else(|| #xml_error::custom(#missing))
            }
        },
    );
    Ok(function)
}

/// `deser_list_<shape>(decoder)`: a wrapped list or set.
pub fn list_reader(
    ctx: &CodegenCtx<'_>,
    writer: &mut CrateWriter,
    shape: &Shape,
) -> Result<proc_macro2::Ident, CodegenError> {
    let name = reader_name("list", shape);
    let function = format_ident!("{}", name);
    if !writer.claim_helper(RustModule::XmlDeser, &name) {
        return Ok(function);
    }
    let (ShapeKind::List(element) | ShapeKind::Set(element)) = &shape.kind else {
        return Err(ModelError::Malformed {
            id: shape.id.to_string(),
            message: "expected a list or set".to_string(),
        }
        .into());
    };
    let symbol = ctx.symbols.resolve(shape)?;
    let ty = symbol.tokens();
    let element_ty = ctx.symbols.resolve_member(shape, element)?;
    let value = wrap_box(&element_ty.rust_type, element_value(ctx, writer, element)?);
    let add = match symbol.rust_type {
        RustType::HashSet(_) => quote!(out.insert(#value);),
        _ => quote!(out.push(#value);),
    };
    let member_name = element.traits.xml_name.as_deref().unwrap_or("member");
    let decoder_ty = ctx.runtime.path(LogicalType::ScopedDecoder);
    let xml_error = ctx.runtime.path(LogicalType::XmlError);
    writer.push(
        RustModule::XmlDeser,
        quote! {
            pub fn #function(decoder: &mut #decoder_ty<'_, '_>) -> ::std::result::Result<#ty, #xml_error> {
                let mut out = <#ty as ::std::default::Default>::default();
                while let ::std::option::Option::Some(mut tag) = decoder.next_tag() {
                    match tag.start_el() {
                        s if s.matches(#member_name) => {
                            #add
                        }
                        _ => {}
                    }
                }
                ::std::result::Result::Ok(out)
            }
        },
    );
    Ok(function)
}

/// `deser_map_<shape>(decoder)`: a wrapped map of `entry` elements.
pub fn map_reader(
    ctx: &CodegenCtx<'_>,
    writer: &mut CrateWriter,
    shape: &Shape,
) -> Result<proc_macro2::Ident, CodegenError> {
    let name = reader_name("map", shape);
    let function = format_ident!("{}", name);
    if !writer.claim_helper(RustModule::XmlDeser, &name) {
        return Ok(function);
    }
    let entry = map_entry_reader(ctx, writer, shape)?;
    let ty = ctx.symbols.resolve(shape)?.tokens();
    let decoder_ty = ctx.runtime.path(LogicalType::ScopedDecoder);
    let xml_error = ctx.runtime.path(LogicalType::XmlError);
    writer.push(
        RustModule::XmlDeser,
        quote! {
            pub fn #function(decoder: &mut #decoder_ty<'_, '_>) -> ::std::result::Result<#ty, #xml_error> {
                let mut out = <#ty as ::std::default::Default>::default();
                while let ::std::option::Option::Some(mut tag) = decoder.next_tag() {
                    match tag.start_el() {
                        s if s.matches("entry") => {
                            let (key, value) = crate::xml_deser::#entry(&mut tag)?;
                            out.insert(key, value);
                        }
                        _ => {}
                    }
                }
                ::std::result::Result::Ok(out)
            }
        },
    );
    Ok(function)
}

/// `deser_map_entry_<shape>(decoder)`: one key/value pair; both must be present.
pub fn map_entry_reader(
    ctx: &CodegenCtx<'_>,
    writer: &mut CrateWriter,
    shape: &Shape,
) -> Result<proc_macro2::Ident, CodegenError> {
    let name = reader_name("map_entry", shape);
    let function = format_ident!("{}", name);
    if !writer.claim_helper(RustModule::XmlDeser, &name) {
        return Ok(function);
    }
    let ShapeKind::Map { key, value } = &shape.kind else {
        return Err(ModelError::Malformed {
            id: shape.id.to_string(),
            message: "expected a map".to_string(),
        }
        .into());
    };
    let xml = ctx.runtime.path(LogicalType::Xml);
    let value_ty = ctx.symbols.resolve_member(shape, value)?;
    let parsed_value = wrap_box(&value_ty.rust_type, element_value(ctx, writer, value)?);
    let value_tokens = value_ty.tokens();
    let key_name = key.traits.xml_name.as_deref().unwrap_or("key");
    let value_name = value.traits.xml_name.as_deref().unwrap_or("value");
    let decoder_ty = ctx.runtime.path(LogicalType::ScopedDecoder);
    let xml_error = ctx.runtime.path(LogicalType::XmlError);
    let missing = format!("map entry of `{}` needs both a key and a value", shape.id);
    writer.push(
        RustModule::XmlDeser,
        quote! {
            pub fn #function(
                decoder: &mut #decoder_ty<'_, '_>,
            ) -> ::std::result::Result<(::std::string::String, #value_tokens), #xml_error> {
                let mut key: ::std::option::Option<::std::string::String> = ::std::option::Option::None;
                let mut value: ::std::option::Option<#value_tokens> = ::std::option::Option::None;
                while let ::std::option::Option::Some(mut tag) = decoder.next_tag() {
                    match tag.start_el() {
                        s if s.matches(#key_name) => {
                            key = ::std::option::Option::Some(::std::string::String::from(#xml::expect_data(&mut tag)?));
                        }
                        s if s.matches(#value_name) => {
                            value = ::std::option::Option::Some(#parsed_value);
                        }
                        _ => {}
                    }
                }
                match (key, value) {
                    (::std::option::Option::Some(key), ::std::option::Option::Some(value)) => {
                        ::std::result::Result::Ok((key, value))
                    }
                    _ => ::std::result::Result::Err(#xml_error::custom(#missing)),
                }
            }
        },
    );
    Ok(function)
}

/// `deser_operation_<op>(body, builder)`: read the document-bound `members` of `output` into its builder.
pub fn document_deserializer(
    ctx: &CodegenCtx<'_>,
    writer: &mut CrateWriter,
    operation: &Shape,
    output: &Shape,
    members: &[&MemberShape],
) -> Result<TokenStream, CodegenError> {
    let name = format_ident!("deser_operation_{}", operation_fragment(operation));
    let path = quote!(crate::xml_deser::#name);
    if !writer.claim_helper(RustModule::XmlDeser, &name.to_string()) {
        return Ok(path);
    }
    let builder = ctx
        .symbols
        .resolve(output)?
        .rust_type
        .builder_path()
        .ok_or_else(|| ModelError::Malformed {
            id: output.id.to_string(),
            message: "operation output is not a structure".to_string(),
        })?;
    let (attributes, arms) = builder_arms(ctx, writer, output, members)?;
    let xml = ctx.runtime.path(LogicalType::Xml);
    let xml_error = ctx.runtime.path(LogicalType::XmlError);
    let root = root_name(output);
    writer.push(
        RustModule::XmlDeser,
        quote! {
            pub fn #name(body: &[u8], mut builder: #builder) -> ::std::result::Result<#builder, #xml_error> {
                if body.iter().all(u8::is_ascii_whitespace) {
                    return ::std::result::Result::Ok(builder);
                }
                let doc = <#xml::Document as ::std::convert::TryFrom<&[u8]>>::try_from(body)?;
                let mut decoder = doc.root_element()?;
                if !decoder.start_el().matches(#root) {
                    return ::std::result::Result::Err(#xml_error::custom(::std::format!(
                        "invalid root, expected {} got {}",
                        #root,
                        decoder.start_el()
                    )));
                }
                #(#attributes)*
                while let ::std::option::Option::Some(mut tag) = decoder.next_tag() {
                    match tag.start_el() {
                        #(#arms)*
                        _ => {}
                    }
                }
                ::std::result::Result::Ok(builder)
            }
        },
    );
    Ok(path)
}

/// `deser_payload_<op>_<member>(body)`: a structure or union bound to the whole response body.
pub fn payload_deserializer(
    ctx: &CodegenCtx<'_>,
    writer: &mut CrateWriter,
    operation: &Shape,
    member: &MemberShape,
) -> Result<TokenStream, CodegenError> {
    let name = format_ident!(
        "deser_payload_{}_{}",
        operation_fragment(operation),
        names::snake_fragment(&member.name)
    );
    let path = quote!(crate::xml_deser::#name);
    if !writer.claim_helper(RustModule::XmlDeser, &name.to_string()) {
        return Ok(path);
    }
    let target = ctx.symbols.shape(&member.target)?;
    let reader = match target.kind {
        ShapeKind::Union(_) => union_reader(ctx, writer, target)?,
        _ => structure_reader(ctx, writer, target)?,
    };
    let ty = ctx.symbols.resolve(target)?.tokens();
    let root = member
        .traits
        .xml_name
        .as_deref()
        .unwrap_or_else(|| root_name(target));
    let xml = ctx.runtime.path(LogicalType::Xml);
    let xml_error = ctx.runtime.path(LogicalType::XmlError);
    writer.push(
        RustModule::XmlDeser,
        quote! {
            pub fn #name(body: &[u8]) -> ::std::result::Result<#ty, #xml_error> {
                let doc = <#xml::Document as ::std::convert::TryFrom<&[u8]>>::try_from(body)?;
                let mut decoder = doc.root_element()?;
                if !decoder.start_el().matches(#root) {
                    return ::std::result::Result::Err(#xml_error::custom(::std::format!(
                        "invalid root, expected {} got {}",
                        #root,
                        decoder.start_el()
                    )));
                }
                crate::xml_deser::#reader(&mut decoder)
            }
        },
    );
    Ok(path)
}

/// `deser_error_<shape>(body)`: a modeled error read from inside the `<Error>` envelope.
fn error_deserializer(
    ctx: &CodegenCtx<'_>,
    writer: &mut CrateWriter,
    shape: &Shape,
) -> Result<proc_macro2::Ident, CodegenError> {
    let name = reader_name("error", shape);
    let function = format_ident!("{}", name);
    if !writer.claim_helper(RustModule::XmlDeser, &name) {
        return Ok(function);
    }
    let reader = structure_reader(ctx, writer, shape)?;
    let ty = ctx.symbols.resolve(shape)?.tokens();
    let xml = ctx.runtime.path(LogicalType::Xml);
    let xml_error = ctx.runtime.path(LogicalType::XmlError);
    writer.push(
        RustModule::XmlDeser,
        quote! {
            pub fn #function(body: &[u8]) -> ::std::result::Result<#ty, #xml_error> {
                let doc = <#xml::Document as ::std::convert::TryFrom<&[u8]>>::try_from(body)?;
                let mut decoder = #xml::errors::error_scope(&doc)?;
                crate::xml_deser::#reader(&mut decoder)
            }
        },
    );
    Ok(function)
}

/// Body of `parse_error` for restXml.
pub fn parse_error_body(
    ctx: &CodegenCtx<'_>,
    writer: &mut CrateWriter,
    operation: &Shape,
) -> Result<TokenStream, CodegenError> {
    let error = operation_error_path(operation);
    let kind = format_ident!("{}ErrorKind", names::type_name(operation));
    let xml = ctx.runtime.path(LogicalType::Xml);
    let errors = operation.as_operation().map(|op| op.errors.as_slice()).unwrap_or_default();

    let mut arms = Vec::new();
    for error_id in errors {
        let shape = ctx.symbols.shape(error_id)?;
        let reader = error_deserializer(ctx, writer, shape)?;
        let variant = ident(&names::type_name(shape), &shape.id)?;
        let code = shape.name();
        arms.push(quote! {
            #code => match crate::xml_deser::#reader(response.body()) {
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
        let generic = match #xml::errors::parse_generic_error(response.body()) {
            ::std::result::Result::Ok(generic) => generic,
            ::std::result::Result::Err(err) => return #error::unhandled(err),
        };
        #dispatch
    })
}
