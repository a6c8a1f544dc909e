//! Request and response code for HTTP-binding protocols (restJson1, restXml).
//!
//! Members bound with `httpLabel`, `httpQuery`, `httpHeader`, `httpPrefixHeaders`, `httpPayload` and
//! `httpResponseCode` are written to (or read from) their HTTP location. Whatever is left travels in the document,
//! whose encoding is the only thing the two protocols disagree on.
//!
//! ## Notes
//!
//! - An unset or empty label fails the request with `BuildError::MissingField`.
//! - Response headers are read by `http_serde` helpers, one per operation member, so each gets a precise type.
//! - restXml request documents and XML structure payloads are not generated; they become `todo!` markers.

use proc_macro2::TokenStream;
use quote::{format_ident, quote};

use crate::codegen::errors::CodegenError;
use crate::codegen::names::{self, ident};
use crate::codegen::runtime::LogicalType;
use crate::codegen::symbol::RustType;
use crate::codegen::writer::{CrateWriter, RustModule};
use crate::codegen::CodegenCtx;
use crate::model::{MemberShape, ModelError, Shape, ShapeKind, TimestampFormat};

use super::bindings::{self, Direction, HttpBindingDescriptor, HttpLocation, UriSegment};
use super::json::{self, JsonConfigurator};
use super::{finish_output, format_tokens, input_shape, operation_error_path, operation_fragment, output_shape, xml};

/// How the document part of a message is encoded.
#[derive(Debug, Clone, Copy)]
pub enum DocumentFormat {
    Json(JsonConfigurator),
    Xml,
}

impl DocumentFormat {
    fn protocol_name(self) -> &'static str {
        match self {
            DocumentFormat::Json(_) => "restJson1",
            DocumentFormat::Xml => "restXml",
        }
    }
}

fn marker(writer: &mut CrateWriter, message: String) -> TokenStream {
    writer.add_marker(message.clone());
    quote!(todo!(#message))
}

/// `Option<&Core>` view of `input.<member>`.
fn present(ctx: &CodegenCtx<'_>, input: &Shape, member: &MemberShape) -> Result<TokenStream, CodegenError> {
    let field = ident(&names::field_name(member), &input.id)?;
    let ty = ctx.symbols.resolve_member(input, member)?.rust_type;
    Ok(match &ty {
        RustType::Option(_) => quote!(input.#field.as_ref()),
        RustType::Box(inner) if inner.is_option() => quote!((*input.#field).as_ref()),
        RustType::Box(_) => quote!(::std::option::Option::Some(&*input.#field)),
        _ => quote!(::std::option::Option::Some(&input.#field)),
    })
}

/// An `AsRef<str>` rendering of a scalar `value` (a reference), or `None` for non-textual kinds.
fn text_value(target: &Shape, value: &TokenStream) -> Option<TokenStream> {
    match target.kind {
        ShapeKind::String => Some(quote!(#value.as_str())),
        ShapeKind::Enum(_) => Some(quote!(#value.as_str())),
        ShapeKind::Boolean
        | ShapeKind::Byte
        | ShapeKind::Short
        | ShapeKind::Integer
        | ShapeKind::Long
        | ShapeKind::Float
        | ShapeKind::Double => Some(quote!(#value.to_string())),
        _ => None,
    }
}

/// Element member of a list or set target.
fn collection_element(target: &Shape) -> Option<&MemberShape> {
    match &target.kind {
        ShapeKind::List(element) | ShapeKind::Set(element) => Some(element),
        _ => None,
    }
}

fn label_value(
    ctx: &CodegenCtx<'_>,
    writer: &mut CrateWriter,
    member: &MemberShape,
    greedy: bool,
) -> Result<TokenStream, CodegenError> {
    let label = ctx.runtime.path(LogicalType::Label);
    let target = ctx.symbols.shape(&member.target)?;
    if let Some(text) = text_value(target, &quote!(value)) {
        return Ok(quote!(#label::fmt_string(#text, #greedy)));
    }
    if matches!(target.kind, ShapeKind::Timestamp) {
        let format = format_tokens(
            ctx.runtime,
            bindings::timestamp_format(ctx.model, member, HttpLocation::Label, TimestampFormat::DateTime),
        );
        return Ok(quote!(#label::fmt_timestamp(value, #format)));
    }
    Ok(marker(writer, format!("label `{}` targets unsupported {}", member.name, target.kind_name())))
}

fn query_value(
    ctx: &CodegenCtx<'_>,
    writer: &mut CrateWriter,
    member: &MemberShape,
    element: &MemberShape,
    value: TokenStream,
) -> Result<TokenStream, CodegenError> {
    let query = ctx.runtime.path(LogicalType::Query);
    let target = ctx.symbols.shape(&element.target)?;
    if let Some(text) = text_value(target, &value) {
        return Ok(quote!(#query::fmt_string(#text)));
    }
    if matches!(target.kind, ShapeKind::Timestamp) {
        let format = member.traits.timestamp_format.unwrap_or_else(|| {
            bindings::timestamp_format(ctx.model, element, HttpLocation::Query, TimestampFormat::DateTime)
        });
        let format = format_tokens(ctx.runtime, format);
        return Ok(quote!(#query::fmt_timestamp(#value, #format)));
    }
    Ok(marker(writer, format!("query `{}` targets unsupported {}", member.name, target.kind_name())))
}

/// An `Into<String>` header rendering of one scalar `value`.
fn header_scalar(
    ctx: &CodegenCtx<'_>,
    writer: &mut CrateWriter,
    format_member: &MemberShape,
    target: &Shape,
    value: TokenStream,
    quote_strings: bool,
) -> TokenStream {
    let header = ctx.runtime.path(LogicalType::Header);
    match target.kind {
        ShapeKind::String | ShapeKind::Enum(_) if quote_strings => {
            quote!(#header::quote_header_value(#value.as_str()).into_owned())
        }
        ShapeKind::Timestamp => {
            let format = format_tokens(
                ctx.runtime,
                bindings::timestamp_format(ctx.model, format_member, HttpLocation::Header, TimestampFormat::HttpDate),
            );
            quote!(#value.fmt(#format))
        }
        ShapeKind::Blob => quote!(#value.to_base64()),
        _ => match text_value(target, &value) {
            Some(text) => text,
            None => marker(
                writer,
                format!("header `{}` targets unsupported {}", format_member.name, target.kind_name()),
            ),
        },
    }
}

/// An `Into<String>` rendering of a header-bound member's value.
fn header_value(ctx: &CodegenCtx<'_>, writer: &mut CrateWriter, member: &MemberShape) -> Result<TokenStream, CodegenError> {
    let target = ctx.symbols.shape(&member.target)?;
    if let Some(element) = collection_element(target) {
        let element_target = ctx.symbols.shape(&element.target)?;
        let item = header_scalar(ctx, writer, member, element_target, quote!(item), true);
        return Ok(quote! {
            value
                .iter()
                .map(|item| ::std::string::String::from(#item))
                .collect::<::std::vec::Vec<_>>()
                .join(", ")
        });
    }
    Ok(header_scalar(ctx, writer, member, target, quote!(value), false))
}

/// Body of `build_http_request`.
pub fn build_request(
    ctx: &CodegenCtx<'_>,
    writer: &mut CrateWriter,
    operation: &Shape,
    format: DocumentFormat,
) -> Result<TokenStream, CodegenError> {
    let resolver = ctx.protocol.binding_resolver();
    let http = resolver.http_trait(operation).ok_or_else(|| ModelError::Malformed {
        id: operation.id.to_string(),
        message: format!("{} operations need an http trait", format.protocol_name()),
    })?;
    let input = input_shape(ctx, operation)?;
    let bindings = resolver.bindings(input, Direction::Request);
    let build_error = ctx.runtime.path(LogicalType::BuildError);
    let request_ty = ctx.runtime.path(LogicalType::HttpRequest);

    let pattern = bindings::parse_uri(&http.uri);
    let mut uri = Vec::new();
    for segment in &pattern.segments {
        match segment {
            UriSegment::Literal(text) => uri.push(quote!(uri.push_str(#text);)),
            UriSegment::Label { name, greedy } => {
                let binding = bindings
                    .iter()
                    .find(|binding| binding.location == HttpLocation::Label && binding.location_name.as_deref() == Some(name))
                    .ok_or_else(|| ModelError::Malformed {
                        id: operation.id.to_string(),
                        message: format!("URI label `{name}` has no matching input member"),
                    })?;
                let present = present(ctx, input, &binding.member)?;
                let bare = binding.member_name.as_str();
                let formatted = label_value(ctx, writer, &binding.member, *greedy)?;
                uri.push(quote! {
                    {
                        let value = #present.ok_or_else(|| #build_error::missing_field(#bare, "cannot be empty or unset"))?;
                        let formatted = #formatted;
                        if formatted.is_empty() {
                            return ::std::result::Result::Err(#build_error::missing_field(#bare, "cannot be empty or unset"));
                        }
                        uri.push_str(&formatted);
                    }
                });
            }
        }
    }
    if let Some(query) = &pattern.query {
        let literal = format!("?{query}");
        uri.push(quote!(uri.push_str(#literal);));
    }

    let mut query_pushes = Vec::new();
    let mut headers = Vec::new();
    let mut payload = None;
    let mut has_document = false;
    for binding in &bindings {
        let HttpBindingDescriptor {
            member,
            location,
            location_name,
            ..
        } = binding;
        match location {
            HttpLocation::Query => {
                let key = location_name.clone().unwrap_or_else(|| member.name.clone());
                let present = present(ctx, input, member)?;
                let target = ctx.symbols.shape(&member.target)?;
                let push = match collection_element(target) {
                    Some(element) => {
                        let encoded = query_value(ctx, writer, member, element, quote!(item))?;
                        quote! {
                            if let ::std::option::Option::Some(value) = #present {
                                for item in value {
                                    query.push_kv(#key, &#encoded);
                                }
                            }
                        }
                    }
                    None => {
                        let encoded = query_value(ctx, writer, member, member, quote!(value))?;
                        quote! {
                            if let ::std::option::Option::Some(value) = #present {
                                query.push_kv(#key, &#encoded);
                            }
                        }
                    }
                };
                query_pushes.push(push);
            }
            HttpLocation::Header => {
                let name = location_name.clone().unwrap_or_else(|| member.name.clone());
                let present = present(ctx, input, member)?;
                let value = header_value(ctx, writer, member)?;
                headers.push(quote! {
                    if let ::std::option::Option::Some(value) = #present {
                        request.headers_mut().insert(#name, #value);
                    }
                });
            }
            HttpLocation::PrefixHeaders => {
                let prefix = location_name.clone().unwrap_or_default();
                let present = present(ctx, input, member)?;
                let target = ctx.symbols.shape(&member.target)?;
                let ShapeKind::Map { value: map_value, .. } = &target.kind else {
                    return Err(ModelError::Malformed {
                        id: member.target.to_string(),
                        message: "httpPrefixHeaders must target a map".to_string(),
                    }
                    .into());
                };
                let value = header_value(ctx, writer, map_value)?;
                headers.push(quote! {
                    if let ::std::option::Option::Some(entries) = #present {
                        for (key, value) in entries {
                            request.headers_mut().insert(::std::format!("{}{}", #prefix, key), #value);
                        }
                    }
                });
            }
            HttpLocation::Payload => payload = Some(member),
            HttpLocation::Document => has_document = true,
            HttpLocation::Label | HttpLocation::ResponseCode => {}
        }
    }

    let query = if query_pushes.is_empty() {
        quote!()
    } else {
        let query_ty = ctx.runtime.path(LogicalType::Query);
        quote! {
            {
                let mut query = #query_ty::Writer::new(&mut uri);
                #(#query_pushes)*
            }
        }
    };

    let body = match payload {
        Some(member) => request_payload(ctx, writer, input, member, format)?,
        None if has_document => request_document(ctx, writer, operation, input, format)?,
        None => quote!(),
    };
    let method = http.method.as_str();

    Ok(quote! {
        let input = &self.input;
        let mut uri = ::std::string::String::new();
        #(#uri)*
        #query
        let mut request = #request_ty::new(#method, uri);
        #(#headers)*
        #body
        ::std::result::Result::Ok(request)
    })
}

fn content_type_statement(member: &MemberShape, default: &str) -> TokenStream {
    let content_type = member.traits.media_type.as_deref().unwrap_or(default);
    quote!(request.headers_mut().insert("Content-Type", #content_type);)
}

fn request_payload(
    ctx: &CodegenCtx<'_>,
    writer: &mut CrateWriter,
    input: &Shape,
    member: &MemberShape,
    format: DocumentFormat,
) -> Result<TokenStream, CodegenError> {
    let present = present(ctx, input, member)?;
    let target = ctx.symbols.shape(&member.target)?;
    let build_error = ctx.runtime.path(LogicalType::BuildError);
    let serialize_error = quote!(.map_err(|err| #build_error::SerializationError(err.to_string()))?);
    let (content_type, body) = match (&target.kind, format) {
        (ShapeKind::String, _) => (
            content_type_statement(member, "text/plain"),
            quote!(value.as_bytes().to_vec()),
        ),
        (ShapeKind::Enum(_), _) => (
            content_type_statement(member, "text/plain"),
            quote!(value.as_str().as_bytes().to_vec()),
        ),
        (ShapeKind::Blob, _) => (
            content_type_statement(member, "application/octet-stream"),
            quote!(value.clone().into_inner()),
        ),
        (ShapeKind::Structure(_) | ShapeKind::Union(_), DocumentFormat::Json(_)) => (
            content_type_statement(member, "application/json"),
            quote!(::serde_json::to_vec(value)#serialize_error),
        ),
        (ShapeKind::Document, DocumentFormat::Json(_)) => {
            let json = ctx.runtime.path(LogicalType::Json);
            (
                content_type_statement(member, "application/json"),
                quote!(::serde_json::to_vec(&#json::DocumentSer::new(value))#serialize_error),
            )
        }
        _ => {
            let todo = marker(
                writer,
                format!(
                    "{} payload `{}` is not serialized for {}",
                    target.kind_name(),
                    member.name,
                    format.protocol_name()
                ),
            );
            (quote!(), quote!({
                let body: ::std::vec::Vec<u8> = #todo;
                body
            }))
        }
    };
    Ok(quote! {
        if let ::std::option::Option::Some(value) = #present {
            #content_type
            request.set_body(#body);
        }
    })
}

fn request_document(
    ctx: &CodegenCtx<'_>,
    writer: &mut CrateWriter,
    operation: &Shape,
    input: &Shape,
    format: DocumentFormat,
) -> Result<TokenStream, CodegenError> {
    let has_body_shape = input.traits.synthetic_input.as_ref().is_some_and(|synthetic| synthetic.body.is_some());
    match format {
        DocumentFormat::Json(_) if has_body_shape => {
            let build_error = ctx.runtime.path(LogicalType::BuildError);
            let content_type = ctx.protocol.content_type();
            Ok(quote! {
                let body = ::serde_json::to_vec(&input.to_body())
                    .map_err(|err| #build_error::SerializationError(err.to_string()))?;
                request.headers_mut().insert("Content-Type", #content_type);
                request.set_body(body);
            })
        }
        _ => {
            let todo = marker(
                writer,
                format!("{} request document of `{}`", format.protocol_name(), operation.id),
            );
            Ok(quote! {
                let body: ::std::vec::Vec<u8> = #todo;
                request.set_body(body);
            })
        }
    }
}

/// `http_serde::deser_header_<op>_<member>(headers)`.
fn header_reader(
    ctx: &CodegenCtx<'_>,
    writer: &mut CrateWriter,
    operation: &Shape,
    output: &Shape,
    member: &MemberShape,
    header_name: &str,
) -> Result<TokenStream, CodegenError> {
    let name = format_ident!(
        "deser_header_{}_{}",
        operation_fragment(operation),
        names::snake_fragment(&member.name)
    );
    let path = quote!(crate::http_serde::#name);
    if !writer.claim_helper(RustModule::HttpSerde, &name.to_string()) {
        return Ok(path);
    }
    let core = ctx.symbols.resolve_member(output, member)?.rust_type.core().clone();
    let core_tokens = core.tokens();
    let header = ctx.runtime.path(LogicalType::Header);
    let headers_ty = ctx.runtime.path(LogicalType::Headers);
    let parse_error = ctx.runtime.path(LogicalType::HeaderParseError);
    let target = ctx.symbols.shape(&member.target)?;
    let body = match collection_element(target) {
        Some(element) => {
            let element_target = ctx.symbols.shape(&element.target)?;
            let read = read_values(ctx, member, element_target, &core);
            quote! {
                let parsed = #read;
                if parsed.is_empty() {
                    ::std::result::Result::Ok(::std::option::Option::None)
                } else {
                    ::std::result::Result::Ok(::std::option::Option::Some(parsed.into_iter().collect()))
                }
            }
        }
        None => {
            let read = read_values(ctx, member, target, &core);
            quote!(#header::one_or_none(#read))
        }
    };
    writer.push(
        RustModule::HttpSerde,
        quote! {
            pub fn #name(headers: &#headers_ty) -> ::std::result::Result<::std::option::Option<#core_tokens>, #parse_error> {
                let values = headers.get_all(#header_name);
                #body
            }
        },
    );
    Ok(path)
}

/// `Vec<T>` of every value in `values`, for scalar `target`.
fn read_values(ctx: &CodegenCtx<'_>, member: &MemberShape, target: &Shape, core: &RustType) -> TokenStream {
    let header = ctx.runtime.path(LogicalType::Header);
    match target.kind {
        ShapeKind::Timestamp => {
            let format = format_tokens(
                ctx.runtime,
                bindings::timestamp_format(ctx.model, member, HttpLocation::Header, TimestampFormat::HttpDate),
            );
            quote!(#header::read_many_dates(values, #format)?)
        }
        ShapeKind::Blob => {
            let blob = ctx.runtime.path(LogicalType::Blob);
            let parse_error = ctx.runtime.path(LogicalType::HeaderParseError);
            quote! {
                #header::read_many::<::std::string::String>(values)?
                    .iter()
                    .map(|encoded| #blob::from_base64(encoded).map_err(|_| #parse_error::new("invalid base64 header")))
                    .collect::<::std::result::Result<::std::vec::Vec<_>, _>>()?
            }
        }
        _ => {
            let element = core.element().unwrap_or(core).tokens();
            quote!(#header::read_many::<#element>(values)?)
        }
    }
}

/// `http_serde::deser_prefix_header_<op>_<member>(headers)`.
fn prefix_header_reader(
    ctx: &CodegenCtx<'_>,
    writer: &mut CrateWriter,
    operation: &Shape,
    output: &Shape,
    member: &MemberShape,
    prefix: &str,
) -> Result<TokenStream, CodegenError> {
    let name = format_ident!(
        "deser_prefix_header_{}_{}",
        operation_fragment(operation),
        names::snake_fragment(&member.name)
    );
    let path = quote!(crate::http_serde::#name);
    if !writer.claim_helper(RustModule::HttpSerde, &name.to_string()) {
        return Ok(path);
    }
    let core = ctx.symbols.resolve_member(output, member)?.rust_type.core().clone();
    let core_tokens = core.tokens();
    let RustType::HashMap(value_ty) = &core else {
        return Err(ModelError::Malformed {
            id: member.target.to_string(),
            message: "httpPrefixHeaders must target a map".to_string(),
        }
        .into());
    };
    let target = ctx.symbols.shape(&member.target)?;
    let ShapeKind::Map { value: value_member, .. } = &target.kind else {
        return Err(ModelError::Malformed {
            id: member.target.to_string(),
            message: "httpPrefixHeaders must target a map".to_string(),
        }
        .into());
    };
    let value_target = ctx.symbols.shape(&value_member.target)?;
    let header = ctx.runtime.path(LogicalType::Header);
    let headers_ty = ctx.runtime.path(LogicalType::Headers);
    let parse_error = ctx.runtime.path(LogicalType::HeaderParseError);
    let insert = match collection_element(value_target) {
        Some(element) => {
            let element_target = ctx.symbols.shape(&element.target)?;
            let read = read_values(ctx, value_member, element_target, value_ty);
            quote! {
                let parsed = #read;
                out.insert(suffix.to_string(), parsed.into_iter().collect());
            }
        }
        None => {
            let read = read_values(ctx, value_member, value_target, value_ty);
            quote! {
                if let ::std::option::Option::Some(parsed) = #header::one_or_none(#read)? {
                    out.insert(suffix.to_string(), parsed);
                }
            }
        }
    };
    writer.push(
        RustModule::HttpSerde,
        quote! {
            pub fn #name(headers: &#headers_ty) -> ::std::result::Result<::std::option::Option<#core_tokens>, #parse_error> {
                let mut out: #core_tokens = ::std::collections::HashMap::new();
                for (suffix, name) in #header::headers_for_prefix(headers, #prefix) {
                    let values = headers.get_all(name);
                    #insert
                }
                ::std::result::Result::Ok(if out.is_empty() {
                    ::std::option::Option::None
                } else {
                    ::std::option::Option::Some(out)
                })
            }
        },
    );
    Ok(path)
}

fn response_payload(
    ctx: &CodegenCtx<'_>,
    writer: &mut CrateWriter,
    operation: &Shape,
    member: &MemberShape,
    format: DocumentFormat,
    error: &TokenStream,
) -> Result<TokenStream, CodegenError> {
    let target = ctx.symbols.shape(&member.target)?;
    let ty = ctx.symbols.resolve(target)?.tokens();
    Ok(match (&target.kind, format) {
        (ShapeKind::String, _) => quote! {
            ::std::option::Option::Some(
                ::std::string::String::from_utf8(response.body().to_vec()).map_err(#error::unhandled)?,
            )
        },
        (ShapeKind::Enum(_), _) => quote! {
            ::std::option::Option::Some(<#ty as ::std::convert::From<&str>>::from(
                ::std::str::from_utf8(response.body()).map_err(#error::unhandled)?,
            ))
        },
        (ShapeKind::Blob, _) => {
            let blob = if ctx.symbols.is_streaming(member)? {
                ctx.runtime.path(LogicalType::ByteStream)
            } else {
                ctx.runtime.path(LogicalType::Blob)
            };
            quote!(::std::option::Option::Some(#blob::new(response.body())))
        }
        (ShapeKind::Structure(_) | ShapeKind::Union(_), DocumentFormat::Json(_)) => quote! {
            if response.body().is_empty() {
                ::std::option::Option::None
            } else {
                ::std::option::Option::Some(::serde_json::from_slice::<#ty>(response.body()).map_err(#error::unhandled)?)
            }
        },
        (ShapeKind::Document, DocumentFormat::Json(_)) => {
            let json = ctx.runtime.path(LogicalType::Json);
            quote! {
                if response.body().is_empty() {
                    ::std::option::Option::None
                } else {
                    ::std::option::Option::Some(
                        ::serde_json::from_slice::<#json::DocumentDeser>(response.body())
                            .map_err(#error::unhandled)?
                            .0,
                    )
                }
            }
        }
        (ShapeKind::Structure(_) | ShapeKind::Union(_), DocumentFormat::Xml) => {
            let reader = xml::payload_deserializer(ctx, writer, operation, member)?;
            quote! {
                if response.body().is_empty() {
                    ::std::option::Option::None
                } else {
                    ::std::option::Option::Some(#reader(response.body()).map_err(#error::unhandled)?)
                }
            }
        }
        _ => marker(
            writer,
            format!(
                "{} payload `{}` is not parsed for {}",
                target.kind_name(),
                member.name,
                format.protocol_name()
            ),
        ),
    })
}

/// Body of `parse_response` after the success check.
pub fn parse_response(
    ctx: &CodegenCtx<'_>,
    writer: &mut CrateWriter,
    operation: &Shape,
    format: DocumentFormat,
) -> Result<TokenStream, CodegenError> {
    let Some(output) = output_shape(ctx, operation)? else {
        return Ok(quote!(::std::result::Result::Ok(())));
    };
    let error = operation_error_path(operation);
    let ty = ctx.symbols.resolve(output)?.tokens();
    let bindings = ctx.protocol.binding_resolver().bindings(output, Direction::Response);

    let mut statements = Vec::new();
    let mut document = Vec::new();
    for binding in &bindings {
        let member = &binding.member;
        let field_name = names::field_name(member);
        let setter = format_ident!("set_{}", field_name.trim_start_matches("r#"));
        match binding.location {
            HttpLocation::Header => {
                let header_name = binding.location_name.clone().unwrap_or_else(|| member.name.clone());
                let reader = header_reader(ctx, writer, operation, output, member, &header_name)?;
                statements.push(quote! {
                    builder = builder.#setter(#reader(response.headers()).map_err(#error::unhandled)?);
                });
            }
            HttpLocation::PrefixHeaders => {
                let prefix = binding.location_name.clone().unwrap_or_default();
                let reader = prefix_header_reader(ctx, writer, operation, output, member, &prefix)?;
                statements.push(quote! {
                    builder = builder.#setter(#reader(response.headers()).map_err(#error::unhandled)?);
                });
            }
            HttpLocation::ResponseCode => {
                let core = ctx.symbols.resolve_member(output, member)?.rust_type.core().tokens();
                statements.push(quote! {
                    builder = builder.#setter(::std::option::Option::Some(response.status() as #core));
                });
            }
            HttpLocation::Payload => {
                let value = response_payload(ctx, writer, operation, member, format, &error)?;
                statements.push(quote! {
                    builder = builder.#setter(#value);
                });
            }
            HttpLocation::Document => document.push(member),
            HttpLocation::Label | HttpLocation::Query => {}
        }
    }

    if !document.is_empty() {
        let reader = match format {
            DocumentFormat::Json(configurator) => {
                json::document_deserializer(ctx, writer, &configurator, operation, output, &document)?
            }
            DocumentFormat::Xml => xml::document_deserializer(ctx, writer, operation, output, &document)?,
        };
        statements.push(quote! {
            builder = #reader(response.body(), builder).map_err(#error::unhandled)?;
        });
    }
    let finish = finish_output(ctx, output, &error)?;
    Ok(quote! {
        let mut builder = #ty::builder();
        #(#statements)*
        #finish
    })
}
