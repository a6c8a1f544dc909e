//! CLI command implementations
//!
//! All command functions return `CliResult<ExitCode>` instead of calling
//! `process::exit`. Error handling and exits happen in the top-level `run()`.

use std::fs;
use std::path::Path;

use crate::codegen::{CodegenContext, GeneratedCrate, ProtocolLoader, execute};
use crate::config::ConfigFile;
use crate::model::json_ast;

use super::{CliError, CliResult, ExitCode};

/// Maximum model file size (100 MB)
const MAX_MODEL_SIZE: u64 = 100 * 1024 * 1024;

/// Read a model file and the run configuration into a context.
fn load_context(model_path: &Path, config_path: &Path) -> CliResult<CodegenContext> {
    let text = read_model(model_path)?;
    let model = json_ast::load_json(&text)
        .map_err(|e| CliError::failure(format!("Error loading model '{}': {}", model_path.display(), e)))?;
    let settings = ConfigFile::load(config_path)
        .and_then(|config| config.to_settings())
        .map_err(|e| CliError::failure(format!("Error in configuration '{}': {}", config_path.display(), e)))?;
    tracing::debug!(shapes = model.len(), service = %settings.service, "loaded model");
    Ok(CodegenContext::new(model, settings))
}

/// Read model file contents.
///
/// ## Errors
///
/// Returns an error if the file cannot be read or exceeds `MAX_MODEL_SIZE`.
fn read_model(path: &Path) -> CliResult<String> {
    let metadata =
        fs::metadata(path).map_err(|e| CliError::failure(format!("Cannot access file '{}': {}", path.display(), e)))?;
    if metadata.len() > MAX_MODEL_SIZE {
        return Err(CliError::failure(format!(
            "Model file '{}' is too large ({} bytes, max {} bytes)",
            path.display(),
            metadata.len(),
            MAX_MODEL_SIZE
        )));
    }
    fs::read_to_string(path).map_err(|e| CliError::failure(format!("Error reading file '{}': {}", path.display(), e)))
}

fn run_pipeline(context: &CodegenContext) -> CliResult<GeneratedCrate> {
    execute(context).map_err(|e| CliError::failure(format!("Code generation error: {}", e)))
}

fn print_markers(generated: &GeneratedCrate) {
    for marker in &generated.markers {
        eprintln!("warning: unimplemented: {marker}");
    }
}

/// Generate a crate and write it to `out`.
pub fn generate(model: &Path, config: &Path, out: &Path, rustfmt: bool) -> CliResult<ExitCode> {
    let context = load_context(model, config)?;
    let generated = run_pipeline(&context)?;
    generated
        .write_to(out)
        .map_err(|e| CliError::failure(format!("Error writing crate: {}", e)))?;
    if rustfmt {
        generated.rustfmt(out, &context.settings.edition);
    }
    print_markers(&generated);
    println!("Generated {} file(s) in {}", generated.files.len(), out.display());
    Ok(ExitCode::SUCCESS)
}

/// Run generation and print a summary without writing anything.
pub fn check(model: &Path, config: &Path) -> CliResult<ExitCode> {
    let context = load_context(model, config)?;
    let generated = run_pipeline(&context)?;
    for (path, contents) in &generated.files {
        println!("{path} ({} lines)", contents.lines().count());
    }
    print_markers(&generated);
    println!(
        "✓ {} generates {} file(s), {} marker(s)",
        context.settings.module_name,
        generated.files.len(),
        generated.markers.len()
    );
    Ok(ExitCode::SUCCESS)
}

/// Print the implemented protocols, highest priority first.
pub fn protocols() -> CliResult<ExitCode> {
    for protocol in ProtocolLoader::new().implemented() {
        println!("{protocol}");
    }
    Ok(ExitCode::SUCCESS)
}
