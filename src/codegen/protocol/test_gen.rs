//! Conformance tests generated from `smithy.test#httpRequestTests` and `smithy.test#httpResponseTests`.
//!
//! Each operation with cases for the selected protocol gets a `#[cfg(test)] mod <op>_protocol_test` in
//! `operation.rs`. A request case builds the input from its params and checks method, path, query string, headers
//! and body of `build_http_request`; a response case parses the given response and compares the result with the
//! output built from its params.
//!
//! ## Notes
//!
//! - Cases for other protocols and server-only cases are skipped.
//! - A case whose codec still contains a `todo!` marker is emitted with `#[ignore]`.
//! - Bodies compare under the case's media type, defaulting to the protocol's document type.

use proc_macro2::TokenStream;
use quote::{format_ident, quote};
use serde_json::Value;

use crate::codegen::errors::CodegenError;
use crate::codegen::instantiator::Instantiator;
use crate::codegen::names;
use crate::codegen::runtime::LogicalType;
use crate::codegen::writer::{CrateWriter, RustModule};
use crate::codegen::CodegenCtx;
use crate::model::{AppliesTo, HttpRequestTestCase, HttpResponseTestCase, Shape};

use super::{input_shape, output_shape};

fn applies(protocol: &str, applies_to: Option<AppliesTo>, ctx: &CodegenCtx<'_>) -> bool {
    protocol == ctx.protocol.id().trait_id() && applies_to != Some(AppliesTo::Server)
}

fn default_media_type(ctx: &CodegenCtx<'_>) -> &'static str {
    if ctx.protocol.id().is_json() {
        "application/json"
    } else {
        "application/xml"
    }
}

fn test_name(id: &str, suffix: &str) -> proc_macro2::Ident {
    format_ident!("{}_{}", names::snake_fragment(id), suffix)
}

fn ignore_attr(gaps: &[String]) -> TokenStream {
    match gaps.first() {
        Some(gap) => {
            let reason = format!("not generated: {gap}");
            quote!(#[ignore = #reason])
        }
        None => quote!(),
    }
}

fn case_docs(documentation: Option<&str>) -> TokenStream {
    crate::codegen::doc_attrs(documentation)
}

/// Emit the protocol test module of `operation`, if it has applicable cases.
#[tracing::instrument(skip_all, fields(operation = %operation.id))]
pub fn generate_protocol_tests(
    ctx: &CodegenCtx<'_>,
    writer: &mut CrateWriter,
    operation: &Shape,
    request_gaps: &[String],
    response_gaps: &[String],
) -> Result<(), CodegenError> {
    let requests: Vec<&HttpRequestTestCase> = operation
        .traits
        .http_request_tests
        .iter()
        .filter(|case| applies(&case.protocol, case.applies_to, ctx))
        .collect();
    let responses: Vec<&HttpResponseTestCase> = operation
        .traits
        .http_response_tests
        .iter()
        .filter(|case| applies(&case.protocol, case.applies_to, ctx))
        .collect();
    if requests.is_empty() && responses.is_empty() {
        return Ok(());
    }

    let mut tests = Vec::new();
    for case in requests {
        tests.push(request_test(ctx, operation, case, request_gaps)?);
    }
    for case in responses {
        tests.push(response_test(ctx, operation, case, response_gaps)?);
    }
    tracing::debug!(cases = tests.len(), "generated protocol tests");

    let module_name = format!("{}_protocol_test", names::snake_fragment(&names::type_name(operation)));
    writer.declare(RustModule::Operation, &module_name, &operation.id)?;
    let module = format_ident!("{}", module_name);
    writer.push(
        RustModule::Operation,
        quote! {
            #[cfg(test)]
            #[allow(unused_mut)]
            mod #module {
                #(#tests)*
            }
        },
    );
    Ok(())
}

fn request_test(
    ctx: &CodegenCtx<'_>,
    operation: &Shape,
    case: &HttpRequestTestCase,
    gaps: &[String],
) -> Result<TokenStream, CodegenError> {
    let instantiator = Instantiator::new(ctx, &case.id);
    let input = instantiator.render(input_shape(ctx, operation)?, &Value::Object(case.params.clone()))?;
    let operation_ty = ctx.symbols.resolve(operation)?.tokens();
    let pt = ctx.runtime.path(LogicalType::ProtocolTest);

    let name = test_name(&case.id, "request");
    let ignore = ignore_attr(gaps);
    let docs = case_docs(case.documentation.as_deref());
    let method = case.method.as_str();
    let (path, uri_query) = case.uri.split_once('?').unwrap_or((case.uri.as_str(), ""));
    let query_params: Vec<&str> = case
        .query_params
        .iter()
        .map(String::as_str)
        .chain(uri_query.split('&').filter(|param| !param.is_empty()))
        .collect();
    let mut checks = vec![
        quote!(::std::assert_eq!(request.method(), #method);),
        quote!(#pt::assert_ok(#pt::validate_uri(&request, #path));),
        quote!(#pt::assert_ok(#pt::validate_query_string(&request, &[#(#query_params),*]));),
    ];
    if !case.forbid_query_params.is_empty() {
        let forbidden = &case.forbid_query_params;
        checks.push(quote!(#pt::assert_ok(#pt::forbid_query_params(&request, &[#(#forbidden),*]));));
    }
    if !case.require_query_params.is_empty() {
        let required = &case.require_query_params;
        checks.push(quote!(#pt::assert_ok(#pt::require_query_params(&request, &[#(#required),*]));));
    }
    if !case.headers.is_empty() {
        let headers = header_pairs(&case.headers);
        checks.push(quote!(#pt::assert_ok(#pt::validate_headers(request.headers(), &[#(#headers),*]));));
    }
    if !case.forbid_headers.is_empty() {
        let forbidden = &case.forbid_headers;
        checks.push(quote!(#pt::assert_ok(#pt::forbid_headers(request.headers(), &[#(#forbidden),*]));));
    }
    if !case.require_headers.is_empty() {
        let required = &case.require_headers;
        checks.push(quote!(#pt::assert_ok(#pt::require_headers(request.headers(), &[#(#required),*]));));
    }
    if let Some(body) = &case.body {
        let media_type = case.body_media_type.as_deref().unwrap_or(default_media_type(ctx));
        checks.push(quote! {
            #pt::assert_ok(#pt::validate_body(request.body(), #body, #pt::MediaType::from(#media_type)));
        });
    }

    Ok(quote! {
        #docs
        #[test]
        #ignore
        fn #name() {
            let input = #input;
            let request = #operation_ty::new(input)
                .build_http_request()
                .expect("the input serializes into a request");
            #(#checks)*
        }
    })
}

fn response_test(
    ctx: &CodegenCtx<'_>,
    operation: &Shape,
    case: &HttpResponseTestCase,
    gaps: &[String],
) -> Result<TokenStream, CodegenError> {
    let instantiator = Instantiator::new(ctx, &case.id);
    let expected = match output_shape(ctx, operation)? {
        Some(output) => instantiator.render(output, &Value::Object(case.params.clone()))?,
        None => quote!(()),
    };
    let operation_ty = ctx.symbols.resolve(operation)?.tokens();
    let response_ty = ctx.runtime.path(LogicalType::HttpResponse);

    let name = test_name(&case.id, "response");
    let ignore = ignore_attr(gaps);
    let docs = case_docs(case.documentation.as_deref());
    let code = case.code;
    let body = case.body.as_deref().unwrap_or_default();
    let headers = case.headers.iter().map(|(key, value)| quote!(.with_header(#key, #value)));

    Ok(quote! {
        #docs
        #[test]
        #ignore
        fn #name() {
            let expected = #expected;
            let response = #response_ty::new(#code, #body) #(#headers)*;
            let parsed = #operation_ty::parse_response(&response).expect("the response parses");
            ::std::assert_eq!(parsed, expected);
        }
    })
}

fn header_pairs(headers: &std::collections::BTreeMap<String, String>) -> Vec<TokenStream> {
    headers.iter().map(|(key, value)| quote!((#key, #value))).collect()
}

