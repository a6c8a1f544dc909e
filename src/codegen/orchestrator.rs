//! One generation run, from a loaded model to the files of a crate.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::process::Command;

use quote::quote;

use crate::config::ConfigError;
use crate::model::{Model, PRELUDE_NAMESPACE, Shape, ShapeId, ShapeKind};

use super::errors::CodegenError;
use super::manifest::{self, PackageManifest};
use super::names::{self, ident};
use super::protocol::{self, ProtocolLoader};
use super::resolver::SymbolResolver;
use super::runtime::{RuntimeConfig, RuntimeTypes};
use super::writer::{CrateWriter, RustModule};
use super::{CodegenCtx, boxer, doc_attrs, enums, errors_gen, normalizer, structure, union};

/// Fixed configuration of one run.
#[derive(Debug, Clone, PartialEq)]
pub struct CodegenSettings {
    pub module_name: String,
    pub module_version: String,
    pub edition: String,
    pub service: ShapeId,
    pub runtime: RuntimeConfig,
    /// Protocol ids to choose from instead of the service's own protocol traits.
    pub protocols: Option<Vec<String>>,
}

impl CodegenSettings {
    pub fn new(module_name: impl Into<String>, module_version: impl Into<String>, service: ShapeId) -> Self {
        CodegenSettings {
            module_name: module_name.into(),
            module_version: module_version.into(),
            edition: manifest::DEFAULT_EDITION.to_string(),
            service,
            runtime: RuntimeConfig::default(),
            protocols: None,
        }
    }
}

/// Everything `execute` needs.
#[derive(Debug, Clone)]
pub struct CodegenContext {
    pub model: Model,
    pub settings: CodegenSettings,
}

impl CodegenContext {
    pub fn new(model: Model, settings: CodegenSettings) -> Self {
        CodegenContext { model, settings }
    }
}

/// The generated crate, still in memory.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GeneratedCrate {
    /// `Cargo.toml` and `src/<module>.rs`, keyed by path relative to the crate root.
    pub files: BTreeMap<String, String>,
    /// Unimplemented combinations emitted as `todo!` markers.
    pub markers: Vec<String>,
}

impl GeneratedCrate {
    pub fn file(&self, path: &str) -> Option<&str> {
        self.files.get(path).map(String::as_str)
    }

    /// Write every file under `dir`.
    pub fn write_to(&self, dir: &Path) -> Result<(), CodegenError> {
        for (relative, contents) in &self.files {
            let path = dir.join(relative);
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent).map_err(|source| CodegenError::Io {
                    path: parent.to_path_buf(),
                    source,
                })?;
            }
            fs::write(&path, contents).map_err(|source| CodegenError::Io { path, source })?;
        }
        tracing::info!(dir = %dir.display(), files = self.files.len(), "wrote generated crate");
        Ok(())
    }

    /// Run `rustfmt` over the written sources. Failures are logged and otherwise ignored.
    pub fn rustfmt(&self, dir: &Path, edition: &str) {
        let sources: Vec<_> = self
            .files
            .keys()
            .filter(|path| path.ends_with(".rs"))
            .map(|path| dir.join(path))
            .collect();
        if sources.is_empty() {
            return;
        }
        match Command::new("rustfmt").arg("--edition").arg(edition).args(&sources).output() {
            Ok(output) if output.status.success() => tracing::debug!(files = sources.len(), "rustfmt finished"),
            Ok(output) => tracing::warn!(
                status = %output.status,
                stderr = %String::from_utf8_lossy(&output.stderr),
                "rustfmt failed; keeping unformatted output"
            ),
            Err(err) => tracing::warn!(error = %err, "could not run rustfmt; keeping unformatted output"),
        }
    }
}

/// Generate a crate for `context.settings.service` with every implemented protocol available.
pub fn execute(context: &CodegenContext) -> Result<GeneratedCrate, CodegenError> {
    execute_with(context, &ProtocolLoader::new())
}

/// [`execute`] choosing protocols through `loader`.
#[tracing::instrument(skip_all, fields(service = %context.settings.service))]
pub fn execute_with(context: &CodegenContext, loader: &ProtocolLoader) -> Result<GeneratedCrate, CodegenError> {
    let settings = &context.settings;
    let service = context
        .model
        .get(&settings.service)
        .ok_or_else(|| ConfigError::UnknownService(settings.service.clone()))?;
    if service.as_service().is_none() {
        return Err(ConfigError::NotAService(settings.service.clone()).into());
    }
    let declared = settings
        .protocols
        .clone()
        .unwrap_or_else(|| service.traits.protocols.clone());
    let protocol = loader.load(&declared)?;
    tracing::info!(protocol = %protocol.id(), "selected protocol");

    let boxed = boxer::box_recursive_shapes(&context.model);
    let model = normalizer::normalize(&boxed, |model: &Model, operation: &Shape, input: &Shape| {
        protocol.input_body_members(model, operation, input)
    });
    let runtime = RuntimeTypes::new(settings.runtime.clone());
    let symbols = SymbolResolver::new(&model, &runtime);
    let ctx = CodegenCtx {
        model: &model,
        symbols: &symbols,
        runtime: &runtime,
        protocol: protocol.as_ref(),
        service: model.expect_shape(&settings.service)?,
    };

    let mut writer = CrateWriter::new();
    writer.set_crate_doc(crate_doc(ctx.service));
    for shape in model.walk_closure(&settings.service)? {
        generate_shape(&ctx, &mut writer, shape)?;
    }
    writer.add_dependency(runtime.runtime_dependency(protocol.runtime_features().iter().copied()));
    for dependency in protocol.dependencies() {
        writer.add_dependency(dependency);
    }

    let package = PackageManifest::new(&settings.module_name, &settings.module_version).with_edition(&settings.edition);
    let mut files = writer.render();
    files.insert("Cargo.toml".to_string(), manifest::generate_cargo_toml(&package, writer.dependencies()));
    let markers = writer.markers().to_vec();
    tracing::info!(files = files.len(), markers = markers.len(), "generated crate");
    Ok(GeneratedCrate { files, markers })
}

fn crate_doc(service: &Shape) -> String {
    match service.traits.documentation.as_deref() {
        Some(text) => text.to_string(),
        None => format!("Client types for the `{}` service.", service.name()),
    }
}

fn generate_shape(ctx: &CodegenCtx<'_>, writer: &mut CrateWriter, shape: &Shape) -> Result<(), CodegenError> {
    if shape.id.namespace() == PRELUDE_NAMESPACE {
        return Ok(());
    }
    tracing::debug!(shape = %shape.id, kind = shape.kind_name(), "dispatching");
    match &shape.kind {
        ShapeKind::Structure(_) => structure::generate_structure(ctx, writer, shape),
        ShapeKind::Union(_) => union::generate_union(ctx, writer, shape),
        ShapeKind::Enum(_) => enums::generate_enum(ctx, writer, shape),
        ShapeKind::Operation(_) => {
            errors_gen::generate_operation_error(ctx, writer, shape)?;
            protocol::generate_operation_struct(ctx, writer, shape)
        }
        ShapeKind::Service(_) => generate_service(ctx, writer, shape),
        // Inline types: nothing to declare.
        ShapeKind::Boolean
        | ShapeKind::Byte
        | ShapeKind::Short
        | ShapeKind::Integer
        | ShapeKind::Long
        | ShapeKind::Float
        | ShapeKind::Double
        | ShapeKind::String
        | ShapeKind::Blob
        | ShapeKind::Timestamp
        | ShapeKind::Document
        | ShapeKind::List(_)
        | ShapeKind::Set(_)
        | ShapeKind::Map { .. } => Ok(()),
    }
}

/// The service struct in `lib.rs`: the API version and one constructor per operation.
fn generate_service(ctx: &CodegenCtx<'_>, writer: &mut CrateWriter, service: &Shape) -> Result<(), CodegenError> {
    let type_name = names::type_name(service);
    writer.declare(RustModule::Lib, &type_name, &service.id)?;
    let name = ident(&type_name, &service.id)?;
    let version = service.as_service().map(|s| s.version.as_str()).unwrap_or_default();

    let mut constructors = Vec::new();
    for operation in ctx.model.operations_of(&service.id)? {
        let op_name = ident(&names::type_name(operation), &operation.id)?;
        let method = ident(&names::snake_name(operation.name()), &operation.id)?;
        let input = ctx.symbols.resolve(protocol::input_shape(ctx, operation)?)?.tokens();
        let doc = format!(" Prepare a `{}` call.", operation.name());
        constructors.push(quote! {
            #[doc = #doc]
            pub fn #method(input: #input) -> crate::operation::#op_name {
                crate::operation::#op_name::new(input)
            }
        });
    }

    let docs = doc_attrs(service.traits.documentation.as_deref());
    writer.push(
        RustModule::Lib,
        quote! {
            #docs
            #[derive(Debug, Clone, Copy, Default)]
            pub struct #name;

            impl #name {
                pub const API_VERSION: &'static str = #version;

                #(#constructors)*
            }
        },
    );
    Ok(())
}
