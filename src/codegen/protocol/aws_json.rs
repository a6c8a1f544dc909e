//! awsJson 1.0 and 1.1: every call is `POST /` with the whole input as a JSON document.
//!
//! The operation is named by the `X-Amz-Target: <Service>.<Operation>` header. The two versions differ only in
//! their content type.

use proc_macro2::TokenStream;
use quote::quote;

use crate::codegen::errors::CodegenError;
use crate::codegen::meta::Configurator;
use crate::codegen::normalizer;
use crate::codegen::runtime::{CargoDependency, LogicalType};
use crate::codegen::writer::CrateWriter;
use crate::codegen::CodegenCtx;
use crate::model::{MemberShape, Model, Shape, TimestampFormat};

use super::bindings::{HttpBindingResolver, StaticBindingResolver};
use super::json::{self, JsonConfigurator};
use super::{
    OperationCode, Protocol, ProtocolId, finish_output, input_shape, operation_error_path, output_shape, recording_markers,
};

#[derive(Debug, Clone, Copy)]
pub struct AwsJson {
    id: ProtocolId,
    configurator: JsonConfigurator,
    resolver: StaticBindingResolver,
}

impl AwsJson {
    fn with_id(id: ProtocolId) -> Self {
        AwsJson {
            id,
            configurator: JsonConfigurator {
                use_json_name: false,
                default_format: TimestampFormat::EpochSeconds,
            },
            resolver: StaticBindingResolver,
        }
    }

    pub fn v1_0() -> Self {
        Self::with_id(ProtocolId::AwsJson10)
    }

    pub fn v1_1() -> Self {
        Self::with_id(ProtocolId::AwsJson11)
    }

    fn build_request(&self, ctx: &CodegenCtx<'_>, operation: &Shape) -> Result<TokenStream, CodegenError> {
        let input = input_shape(ctx, operation)?;
        let request_ty = ctx.runtime.path(LogicalType::HttpRequest);
        let build_error = ctx.runtime.path(LogicalType::BuildError);
        let content_type = self.content_type();
        let target = format!("{}.{}", ctx.service.name(), operation.name());
        let has_body = input
            .traits
            .synthetic_input
            .as_ref()
            .is_some_and(|synthetic| synthetic.body.is_some());
        let body = if has_body {
            quote! {
                ::serde_json::to_vec(&input.to_body())
                    .map_err(|err| #build_error::SerializationError(err.to_string()))?
            }
        } else {
            quote!(b"{}".to_vec())
        };
        Ok(quote! {
            let input = &self.input;
            let mut request = #request_ty::new("POST", "/");
            request.headers_mut().insert("Content-Type", #content_type);
            request.headers_mut().insert("X-Amz-Target", #target);
            request.set_body(#body);
            ::std::result::Result::Ok(request)
        })
    }

    fn parse_response(
        &self,
        ctx: &CodegenCtx<'_>,
        writer: &mut CrateWriter,
        operation: &Shape,
    ) -> Result<TokenStream, CodegenError> {
        let Some(output) = output_shape(ctx, operation)? else {
            return Ok(quote!(::std::result::Result::Ok(())));
        };
        let error = operation_error_path(operation);
        let ty = ctx.symbols.resolve(output)?.tokens();
        let members = output.members();
        let read = if members.is_empty() {
            quote!()
        } else {
            let reader = json::document_deserializer(ctx, writer, &self.configurator, operation, output, &members)?;
            quote!(builder = #reader(response.body(), builder).map_err(#error::unhandled)?;)
        };
        let finish = finish_output(ctx, output, &error)?;
        Ok(quote! {
            let mut builder = #ty::builder();
            #read
            #finish
        })
    }
}

impl Protocol for AwsJson {
    fn id(&self) -> ProtocolId {
        self.id
    }

    fn content_type(&self) -> &'static str {
        match self.id {
            ProtocolId::AwsJson10 => "application/x-amz-json-1.0",
            _ => "application/x-amz-json-1.1",
        }
    }

    fn default_timestamp_format(&self) -> TimestampFormat {
        TimestampFormat::EpochSeconds
    }

    fn binding_resolver(&self) -> &dyn HttpBindingResolver {
        &self.resolver
    }

    fn configurator(&self) -> &dyn Configurator {
        &self.configurator
    }

    fn input_body_members(&self, model: &Model, operation: &Shape, input: &Shape) -> Option<Vec<MemberShape>> {
        normalizer::all_members(model, operation, input)
    }

    fn runtime_features(&self) -> &'static [&'static str] {
        &["json"]
    }

    fn dependencies(&self) -> Vec<CargoDependency> {
        json::dependencies()
    }

    #[tracing::instrument(skip_all, fields(operation = %operation.id))]
    fn generate_operation(
        &self,
        ctx: &CodegenCtx<'_>,
        writer: &mut CrateWriter,
        operation: &Shape,
    ) -> Result<OperationCode, CodegenError> {
        let (parse_response, response_gaps) =
            recording_markers(writer, |writer| self.parse_response(ctx, writer, operation))?;
        Ok(OperationCode {
            build_request: self.build_request(ctx, operation)?,
            parse_response,
            parse_error: json::parse_error_body(ctx, operation)?,
            request_gaps: Vec::new(),
            response_gaps,
        })
    }
}
