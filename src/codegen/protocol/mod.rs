//! Wire protocols.
//!
//! A [`Protocol`] decides how an operation's input becomes an HTTP request and how a response becomes its output
//! or error. Four are implemented: awsJson 1.0 and 1.1, restJson1 and restXml.
//!
//! ## Notes
//!
//! - Selection walks the implemented protocols in a fixed priority order and takes the first one the service
//!   declares, so the choice never depends on declaration order in the model.
//! - Every operation gets a struct in `operation.rs` holding its input, with `build_http_request`,
//!   `parse_response` and a private `parse_error`. The protocol supplies the bodies of those three functions.
//! - When a codec body contains a `todo!` marker, the operation's docs say which call panics and why.
//!
//! ## See also
//!
//! - [`bindings`]: where each member travels on the wire.

pub mod aws_json;
pub mod bindings;
pub mod http_bound;
pub mod json;
pub mod rest_json;
pub mod rest_xml;
pub mod test_gen;
pub mod xml;

use std::fmt;

use proc_macro2::TokenStream;
use quote::{format_ident, quote};

use crate::config::ConfigError;
use crate::model::{MemberShape, Model, ModelError, Shape, TimestampFormat};

use super::builder;
use super::errors::CodegenError;
use super::meta::Configurator;
use super::names::{self, ident};
use super::runtime::{CargoDependency, LogicalType, RuntimeTypes};
use super::writer::{CrateWriter, RustModule};
use super::{CodegenCtx, doc_attrs};

use bindings::HttpBindingResolver;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ProtocolId {
    AwsJson10,
    AwsJson11,
    RestJson1,
    RestXml,
}

impl ProtocolId {
    /// Every implemented protocol, in selection priority order.
    pub const ALL: [ProtocolId; 4] = [
        ProtocolId::AwsJson10,
        ProtocolId::AwsJson11,
        ProtocolId::RestJson1,
        ProtocolId::RestXml,
    ];

    /// The service trait that declares this protocol.
    pub fn trait_id(self) -> &'static str {
        match self {
            ProtocolId::AwsJson10 => "aws.protocols#awsJson1_0",
            ProtocolId::AwsJson11 => "aws.protocols#awsJson1_1",
            ProtocolId::RestJson1 => "aws.protocols#restJson1",
            ProtocolId::RestXml => "aws.protocols#restXml",
        }
    }

    pub fn from_trait_id(id: &str) -> Option<ProtocolId> {
        ProtocolId::ALL.into_iter().find(|protocol| protocol.trait_id() == id)
    }

    pub fn is_json(self) -> bool {
        !matches!(self, ProtocolId::RestXml)
    }
}

impl fmt::Display for ProtocolId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.trait_id())
    }
}

/// Function bodies of an operation struct's codec methods.
#[derive(Debug, Clone, Default)]
pub struct OperationCode {
    /// Body of `build_http_request(&self)`; `self.input` is the operation input.
    pub build_request: TokenStream,
    /// Body of `parse_response(response)` after the success check.
    pub parse_response: TokenStream,
    /// Body of `parse_error(response)`, evaluating to the operation error.
    pub parse_error: TokenStream,
    /// Markers recorded while generating `build_request`.
    pub request_gaps: Vec<String>,
    /// Markers recorded while generating `parse_response`.
    pub response_gaps: Vec<String>,
}

pub trait Protocol {
    fn id(&self) -> ProtocolId;

    /// Content type of request documents.
    fn content_type(&self) -> &'static str;

    /// Timestamp format of document members without a `timestampFormat` trait.
    fn default_timestamp_format(&self) -> TimestampFormat;

    fn binding_resolver(&self) -> &dyn HttpBindingResolver;

    fn configurator(&self) -> &dyn Configurator;

    /// Members of `input` serialized into the request document, or `None` for no body shape.
    fn input_body_members(&self, model: &Model, operation: &Shape, input: &Shape) -> Option<Vec<MemberShape>>;

    /// Runtime crate features the generated code needs.
    fn runtime_features(&self) -> &'static [&'static str];

    /// Extra crates the generated code names directly.
    fn dependencies(&self) -> Vec<CargoDependency> {
        Vec::new()
    }

    fn generate_operation(
        &self,
        ctx: &CodegenCtx<'_>,
        writer: &mut CrateWriter,
        operation: &Shape,
    ) -> Result<OperationCode, CodegenError>;
}

/// The implementation of `id`.
pub fn protocol_for(id: ProtocolId) -> Box<dyn Protocol> {
    match id {
        ProtocolId::AwsJson10 => Box::new(aws_json::AwsJson::v1_0()),
        ProtocolId::AwsJson11 => Box::new(aws_json::AwsJson::v1_1()),
        ProtocolId::RestJson1 => Box::new(rest_json::RestJson::new()),
        ProtocolId::RestXml => Box::new(rest_xml::RestXml::new()),
    }
}

/// Chooses a protocol for a service.
#[derive(Debug, Clone)]
pub struct ProtocolLoader {
    implemented: Vec<ProtocolId>,
}

impl Default for ProtocolLoader {
    fn default() -> Self {
        ProtocolLoader {
            implemented: ProtocolId::ALL.to_vec(),
        }
    }
}

impl ProtocolLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// A loader that only knows `implemented`, in the given priority order.
    pub fn with_protocols(implemented: Vec<ProtocolId>) -> Self {
        ProtocolLoader { implemented }
    }

    pub fn implemented(&self) -> &[ProtocolId] {
        &self.implemented
    }

    /// The first implemented protocol the service declares.
    pub fn select(&self, declared: &[String]) -> Result<ProtocolId, ConfigError> {
        self.implemented
            .iter()
            .copied()
            .find(|protocol| declared.iter().any(|id| id == protocol.trait_id()))
            .ok_or_else(|| ConfigError::UnsupportedProtocol {
                declared: declared.to_vec(),
                implemented: self.implemented.iter().map(|p| p.trait_id().to_string()).collect(),
            })
    }

    pub fn load(&self, declared: &[String]) -> Result<Box<dyn Protocol>, ConfigError> {
        self.select(declared).map(protocol_for)
    }
}

/// Run `generate`, returning its result with the markers it recorded.
pub(crate) fn recording_markers<T>(
    writer: &mut CrateWriter,
    generate: impl FnOnce(&mut CrateWriter) -> Result<T, CodegenError>,
) -> Result<(T, Vec<String>), CodegenError> {
    let before = writer.markers().len();
    let value = generate(writer)?;
    Ok((value, writer.markers()[before..].to_vec()))
}

/// The synthetic input of `operation`.
pub(crate) fn input_shape<'a>(ctx: &CodegenCtx<'a>, operation: &Shape) -> Result<&'a Shape, CodegenError> {
    let input = operation
        .as_operation()
        .and_then(|op| op.input.as_ref())
        .ok_or_else(|| ModelError::Malformed {
            id: operation.id.to_string(),
            message: "operation has no normalized input".to_string(),
        })?;
    Ok(ctx.symbols.shape(input)?)
}

pub(crate) fn output_shape<'a>(ctx: &CodegenCtx<'a>, operation: &Shape) -> Result<Option<&'a Shape>, CodegenError> {
    match operation.as_operation().and_then(|op| op.output.as_ref()) {
        Some(output) => Ok(Some(ctx.symbols.shape(output)?)),
        None => Ok(None),
    }
}

/// `crate::error::<Op>Error`.
pub(crate) fn operation_error_path(operation: &Shape) -> TokenStream {
    let error = format_ident!("{}Error", names::type_name(operation));
    quote!(crate::error::#error)
}

/// Lower-snake operation name for helper functions.
pub(crate) fn operation_fragment(operation: &Shape) -> String {
    names::snake_fragment(&names::type_name(operation))
}

/// `::<runtime>::instant::Format::<Variant>`.
pub(crate) fn format_tokens(runtime: &RuntimeTypes, format: TimestampFormat) -> TokenStream {
    let path = runtime.path(LogicalType::TimestampFormat);
    let variant = match format {
        TimestampFormat::DateTime => format_ident!("DateTime"),
        TimestampFormat::HttpDate => format_ident!("HttpDate"),
        TimestampFormat::EpochSeconds => format_ident!("EpochSeconds"),
    };
    quote!(#path::#variant)
}

/// Finish an output builder inside `parse_response`.
pub(crate) fn finish_output(ctx: &CodegenCtx<'_>, output: &Shape, error: &TokenStream) -> Result<TokenStream, CodegenError> {
    Ok(if builder::is_fallible(ctx, output)? {
        quote!(builder.build().map_err(#error::unhandled))
    } else {
        quote!(::std::result::Result::Ok(builder.build()))
    })
}

/// Emit the operation struct and its codec methods into `operation.rs`.
pub fn generate_operation_struct(
    ctx: &CodegenCtx<'_>,
    writer: &mut CrateWriter,
    operation: &Shape,
) -> Result<(), CodegenError> {
    let type_name = names::type_name(operation);
    writer.declare(RustModule::Operation, &type_name, &operation.id)?;
    let name = ident(&type_name, &operation.id)?;

    let input = ctx.symbols.resolve(input_shape(ctx, operation)?)?.tokens();
    let output = match output_shape(ctx, operation)? {
        Some(output) => ctx.symbols.resolve(output)?.tokens(),
        None => quote!(()),
    };
    let error = operation_error_path(operation);
    let request = ctx.runtime.path(LogicalType::HttpRequest);
    let response = ctx.runtime.path(LogicalType::HttpResponse);
    let build_error = ctx.runtime.path(LogicalType::BuildError);
    writer.add_dependency(ctx.runtime.runtime_dependency(ctx.protocol.runtime_features().iter().copied()));

    let code = ctx.protocol.generate_operation(ctx, writer, operation)?;
    let OperationCode {
        build_request,
        parse_response,
        parse_error,
        request_gaps,
        response_gaps,
    } = code;
    let mut docs = match operation.traits.documentation.as_deref() {
        Some(text) => doc_attrs(Some(text)),
        None => {
            let doc = format!(" The `{}` operation.", operation.name());
            quote!(#[doc = #doc])
        }
    };
    if !request_gaps.is_empty() || !response_gaps.is_empty() {
        let request_notes = request_gaps.iter().map(|gap| format!(" `build_http_request` panics with `todo!`: {gap}."));
        let response_notes = response_gaps.iter().map(|gap| format!(" `parse_response` panics with `todo!`: {gap}."));
        let notes: Vec<String> = [String::new(), " # Panics".to_string(), String::new()]
            .into_iter()
            .chain(request_notes)
            .chain(response_notes)
            .collect();
        docs.extend(quote!(#(#[doc = #notes])*));
    }
    let request_panics = gap_doc(&request_gaps);
    let response_panics = gap_doc(&response_gaps);

    writer.push(
        RustModule::Operation,
        quote! {
            #docs
            #[derive(Debug, Clone, PartialEq)]
            pub struct #name {
                input: #input,
            }

            impl #name {
                pub fn new(input: #input) -> Self {
                    Self { input }
                }

                pub fn input(&self) -> &#input {
                    &self.input
                }

                /// Serialize the input into an HTTP request.
                #request_panics
                pub fn build_http_request(&self) -> ::std::result::Result<#request, #build_error> {
                    #build_request
                }

                /// Parse a response into the output, or into the operation error for non-2xx statuses.
                #response_panics
                pub fn parse_response(response: &#response) -> ::std::result::Result<#output, #error> {
                    if !response.is_success() {
                        return ::std::result::Result::Err(Self::parse_error(response));
                    }
                    #parse_response
                }

                fn parse_error(response: &#response) -> #error {
                    #parse_error
                }
            }
        },
    );
    test_gen::generate_protocol_tests(ctx, writer, operation, &request_gaps, &response_gaps)
}

/// A `# Panics` doc section listing `gaps`, or nothing.
fn gap_doc(gaps: &[String]) -> TokenStream {
    if gaps.is_empty() {
        return quote!();
    }
    let lines = gaps.iter().map(|gap| format!(" - {gap}"));
    quote! {
        ///
        /// # Panics
        ///
        /// Panics with `todo!`, because this part of the codec is not generated:
        #(#[doc = #lines])*
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn selection_follows_priority_not_declaration_order() {
        let loader = ProtocolLoader::new();
        let declared = vec![
            "aws.protocols#restXml".to_string(),
            "aws.protocols#restJson1".to_string(),
        ];
        assert_eq!(loader.select(&declared).unwrap(), ProtocolId::RestJson1);
    }

    #[test]
    fn unknown_protocols_are_rejected() {
        let loader = ProtocolLoader::with_protocols(vec![ProtocolId::RestXml]);
        let err = loader.select(&["aws.protocols#restJson1".to_string()]).unwrap_err();
        assert_eq!(
            err.to_string(),
            "no matching protocol: service declares [aws.protocols#restJson1]; implemented [aws.protocols#restXml]"
        );
    }

    #[test]
    fn trait_ids_round_trip() {
        for protocol in ProtocolId::ALL {
            assert_eq!(ProtocolId::from_trait_id(protocol.trait_id()), Some(protocol));
        }
        assert_eq!(ProtocolId::from_trait_id("aws.protocols#awsQuery"), None);
    }
}
