//! Snapshot tests for generated manifests, reader signatures and user-facing messages
//!
//! Review changes: `cargo insta review`

use std::fs;
use std::path::PathBuf;

use quote::ToTokens;
use shapegen::codegen::runtime::{RuntimeConfig, RuntimeLocation};
use shapegen::codegen::writer::{CrateWriter, RustModule};
use shapegen::codegen::{CodegenContext, CodegenSettings, execute};
use shapegen::model::{ShapeId, json_ast};

fn weather_context(configure: impl FnOnce(&mut CodegenSettings)) -> CodegenContext {
    let text = fs::read_to_string("tests/models/weather.json").expect("Failed to read model");
    let model = json_ast::load_json(&text).expect("model failed to load");
    let mut settings = CodegenSettings::new("weather", "0.1.0", ShapeId::parse("example.weather#Weather").unwrap());
    settings.runtime = RuntimeConfig {
        location: RuntimeLocation::Path(PathBuf::from("/opt/runtimes")),
        ..RuntimeConfig::default()
    };
    configure(&mut settings);
    CodegenContext::new(model, settings)
}

fn generate(name: &str, service: &str) -> shapegen::codegen::GeneratedCrate {
    let text = fs::read_to_string(format!("tests/models/{}.json", name)).expect("Failed to read model");
    let model = json_ast::load_json(&text).expect("model failed to load");
    let settings = CodegenSettings::new(name, "0.1.0", ShapeId::parse(service).unwrap());
    execute(&CodegenContext::new(model, settings)).expect("generation failed")
}

fn compact(value: &impl ToTokens) -> String {
    value.to_token_stream().to_string().replace(' ', "")
}

/// One line per item of a generated reader module: structs with their fields, functions with their signatures,
/// sorted by name.
fn reader_outline(text: &str) -> String {
    let file = syn::parse_file(text).expect("generated module parses");
    let mut lines: Vec<(String, String)> = file
        .items
        .iter()
        .filter_map(|item| match item {
            syn::Item::Fn(f) => {
                let inputs: Vec<String> = f.sig.inputs.iter().map(compact).collect();
                let line = format!("fn {}({}) {}", f.sig.ident, inputs.join(", "), compact(&f.sig.output));
                Some((f.sig.ident.to_string(), line))
            }
            syn::Item::Struct(s) => {
                let fields: Vec<String> = s
                    .fields
                    .iter()
                    .map(|field| {
                        let attrs: String = field.attrs.iter().map(compact).collect();
                        format!("{}{}: {}", attrs, field.ident.as_ref().map(compact).unwrap_or_default(), compact(&field.ty))
                    })
                    .collect();
                Some((s.ident.to_string(), format!("struct {} {{ {} }}", s.ident, fields.join(", "))))
            }
            _ => None,
        })
        .collect();
    lines.sort();
    lines.into_iter().map(|(_, line)| line).collect::<Vec<_>>().join("\n")
}

#[test]
fn test_rest_xml_reader_outline() {
    let generated = generate("storage", "example.storage#Storage");
    insta::assert_snapshot!(reader_outline(generated.file("src/xml_deser.rs").unwrap()), @r"
    fn deser_error_no_such_bucket_error(body:&[u8]) ->::std::result::Result<crate::error::NoSuchBucketError,::shapegen_runtime::xml::XmlError>
    fn deser_list_prefix_list(decoder:&mut::shapegen_runtime::xml::ScopedDecoder<'_,'_>) ->::std::result::Result<::std::vec::Vec<::std::string::String>,::shapegen_runtime::xml::XmlError>
    fn deser_map_entry_tag_map(decoder:&mut::shapegen_runtime::xml::ScopedDecoder<'_,'_>) ->::std::result::Result<(::std::string::String,::std::string::String),::shapegen_runtime::xml::XmlError>
    fn deser_map_tag_map(decoder:&mut::shapegen_runtime::xml::ScopedDecoder<'_,'_>) ->::std::result::Result<::std::collections::HashMap<::std::string::String,::std::string::String>,::shapegen_runtime::xml::XmlError>
    fn deser_operation_list_objects(body:&[u8], mutbuilder:crate::model::list_objects_output::Builder) ->::std::result::Result<crate::model::list_objects_output::Builder,::shapegen_runtime::xml::XmlError>
    fn deser_structure_no_such_bucket_error(decoder:&mut::shapegen_runtime::xml::ScopedDecoder<'_,'_>) ->::std::result::Result<crate::error::NoSuchBucketError,::shapegen_runtime::xml::XmlError>
    fn deser_structure_stored_object(decoder:&mut::shapegen_runtime::xml::ScopedDecoder<'_,'_>) ->::std::result::Result<crate::model::StoredObject,::shapegen_runtime::xml::XmlError>
    fn deser_union_filter(decoder:&mut::shapegen_runtime::xml::ScopedDecoder<'_,'_>) ->::std::result::Result<crate::model::Filter,::shapegen_runtime::xml::XmlError>
    ");
}

#[test]
fn test_aws_json_reader_outline() {
    let generated = generate("queue", "example.queue#QueueService");
    insta::assert_snapshot!(reader_outline(generated.file("src/json_deser.rs").unwrap()), @r#"
    struct SendMessageOutputBody { #[serde(rename="messageId",default)]message_id: ::std::option::Option<::std::string::String>, #[serde(rename="attributes",default)]attributes: ::std::option::Option<::std::collections::HashMap<::std::string::String,crate::model::AttributeValue>> }
    fn deser_operation_send_message(body:&[u8], mutbuilder:crate::model::send_message_result::Builder) ->::std::result::Result<crate::model::send_message_result::Builder,::serde_json::Error>
    "#);
}

#[test]
fn test_rest_json_manifest() {
    let generated = execute(&weather_context(|_| {})).unwrap();
    insta::assert_snapshot!(generated.file("Cargo.toml").unwrap(), @r#"
    [package]
    name = "weather"
    version = "0.1.0"
    edition = "2021"

    [dependencies]
    serde = { version = "1.0", features = ["derive"] }
    serde_json = { version = "1.0" }
    shapegen_runtime = { path = "/opt/runtimes/shapegen_runtime", default-features = false, features = ["json"] }
    "#);
}

#[test]
fn test_edition_override_reaches_the_manifest() {
    let generated = execute(&weather_context(|settings| settings.edition = "2024".to_string())).unwrap();
    let manifest = generated.file("Cargo.toml").unwrap();
    insta::assert_snapshot!(manifest.lines().take(4).collect::<Vec<_>>().join("\n"), @r#"
    [package]
    name = "weather"
    version = "0.1.0"
    edition = "2024"
    "#);
}

#[test]
fn test_unsupported_protocol_message() {
    let context = weather_context(|settings| settings.protocols = Some(vec!["aws.protocols#awsQuery".to_string()]));
    let err = execute(&context).unwrap_err();
    insta::assert_snapshot!(err.to_string(), @"no matching protocol: service declares [aws.protocols#awsQuery]; implemented [aws.protocols#awsJson1_0, aws.protocols#awsJson1_1, aws.protocols#restJson1, aws.protocols#restXml]");
}

#[test]
fn test_unknown_service_message() {
    let context = weather_context(|settings| settings.service = ShapeId::new("example.weather", "Forecasts"));
    let err = execute(&context).unwrap_err();
    insta::assert_snapshot!(err.to_string(), @"service `example.weather#Forecasts` is not defined in the model");

    let context = weather_context(|settings| settings.service = ShapeId::new("example.weather", "Region"));
    let err = execute(&context).unwrap_err();
    insta::assert_snapshot!(err.to_string(), @"`example.weather#Region` is not a service shape");
}

#[test]
fn test_missing_field_message() {
    let err = shapegen_runtime::error::BuildError::missing_field(
        "name",
        "name was not specified but it is required when building GetCityResponse",
    );
    insta::assert_snapshot!(err.to_string(), @"name was missing: name was not specified but it is required when building GetCityResponse");
}

#[test]
fn test_rendered_module_header() {
    let mut writer = CrateWriter::new();
    writer.push(RustModule::HttpSerde, quote::quote!(pub fn helper() {}));
    let files = writer.render();
    insta::assert_snapshot!(&files["src/http_serde.rs"], @r#"
    // Code generated by shapegen. DO NOT EDIT.

    pub fn helper() {}
    "#);
}

#[test]
fn test_invalid_protocol_test_params_message() {
    let text = fs::read_to_string("tests/models/weather.json").expect("Failed to read model");
    let broken = text.replace(r#""cityId": "123", "units""#, r#""cityId": 5, "units""#);
    assert_ne!(text, broken);
    let model = json_ast::load_json(&broken).expect("model failed to load");
    let settings = CodegenSettings::new("weather", "0.1.0", ShapeId::parse("example.weather#Weather").unwrap());
    let err = execute(&CodegenContext::new(model, settings)).unwrap_err();
    insta::assert_snapshot!(err.to_string(), @"protocol test `GetCityWithUnits`: `5` is not a string (at `smithy.api#String`)");
}
