//! restJson1: HTTP bindings plus a JSON document honoring `jsonName`.

use crate::codegen::errors::CodegenError;
use crate::codegen::meta::Configurator;
use crate::codegen::runtime::CargoDependency;
use crate::codegen::writer::CrateWriter;
use crate::codegen::CodegenCtx;
use crate::model::{MemberShape, Model, Shape, TimestampFormat};

use super::bindings::{Direction, HttpBindingResolver, HttpLocation, HttpTraitBindingResolver};
use super::http_bound::{self, DocumentFormat};
use super::json::{self, JsonConfigurator};
use super::{OperationCode, Protocol, ProtocolId, recording_markers};

#[derive(Debug, Clone, Copy)]
pub struct RestJson {
    configurator: JsonConfigurator,
    resolver: HttpTraitBindingResolver,
}

impl Default for RestJson {
    fn default() -> Self {
        RestJson {
            configurator: JsonConfigurator {
                use_json_name: true,
                default_format: TimestampFormat::EpochSeconds,
            },
            resolver: HttpTraitBindingResolver,
        }
    }
}

impl RestJson {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Protocol for RestJson {
    fn id(&self) -> ProtocolId {
        ProtocolId::RestJson1
    }

    fn content_type(&self) -> &'static str {
        "application/json"
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

    /// Members without an HTTP binding.
    fn input_body_members(&self, _model: &Model, _operation: &Shape, input: &Shape) -> Option<Vec<MemberShape>> {
        let members: Vec<MemberShape> = self
            .resolver
            .bindings(input, Direction::Request)
            .into_iter()
            .filter(|binding| binding.location == HttpLocation::Document)
            .map(|binding| binding.member)
            .collect();
        (!members.is_empty()).then_some(members)
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
        let format = DocumentFormat::Json(self.configurator);
        let (build_request, request_gaps) =
            recording_markers(writer, |writer| http_bound::build_request(ctx, writer, operation, format))?;
        let (parse_response, response_gaps) =
            recording_markers(writer, |writer| http_bound::parse_response(ctx, writer, operation, format))?;
        Ok(OperationCode {
            build_request,
            parse_response,
            parse_error: json::parse_error_body(ctx, operation)?,
            request_gaps,
            response_gaps,
        })
    }
}
