//! restXml: HTTP bindings plus XML documents.
//!
//! Only responses are read from XML. Request documents and XML structure payloads are emitted as `todo!` markers
//! and reported in the run's marker list.

use crate::codegen::errors::CodegenError;
use crate::codegen::meta::{Configurator, DefaultConfigurator};
use crate::codegen::normalizer;
use crate::codegen::writer::CrateWriter;
use crate::codegen::CodegenCtx;
use crate::model::{MemberShape, Model, Shape, TimestampFormat};

use super::bindings::{HttpBindingResolver, HttpTraitBindingResolver};
use super::http_bound::{self, DocumentFormat};
use super::{OperationCode, Protocol, ProtocolId, recording_markers, xml};

#[derive(Debug, Clone, Copy, Default)]
pub struct RestXml {
    configurator: DefaultConfigurator,
    resolver: HttpTraitBindingResolver,
}

impl RestXml {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Protocol for RestXml {
    fn id(&self) -> ProtocolId {
        ProtocolId::RestXml
    }

    fn content_type(&self) -> &'static str {
        "application/xml"
    }

    fn default_timestamp_format(&self) -> TimestampFormat {
        TimestampFormat::DateTime
    }

    fn binding_resolver(&self) -> &dyn HttpBindingResolver {
        &self.resolver
    }

    fn configurator(&self) -> &dyn Configurator {
        &self.configurator
    }

    fn input_body_members(&self, model: &Model, operation: &Shape, input: &Shape) -> Option<Vec<MemberShape>> {
        normalizer::no_body(model, operation, input)
    }

    fn runtime_features(&self) -> &'static [&'static str] {
        &["xml"]
    }

    #[tracing::instrument(skip_all, fields(operation = %operation.id))]
    fn generate_operation(
        &self,
        ctx: &CodegenCtx<'_>,
        writer: &mut CrateWriter,
        operation: &Shape,
    ) -> Result<OperationCode, CodegenError> {
        let (build_request, request_gaps) =
            recording_markers(writer, |writer| http_bound::build_request(ctx, writer, operation, DocumentFormat::Xml))?;
        let (parse_response, response_gaps) = recording_markers(writer, |writer| {
            http_bound::parse_response(ctx, writer, operation, DocumentFormat::Xml)
        })?;
        Ok(OperationCode {
            build_request,
            parse_response,
            parse_error: xml::parse_error_body(ctx, writer, operation)?,
            request_gaps,
            response_gaps,
        })
    }
}
