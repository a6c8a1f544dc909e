//! Catalog of external items generated code refers to.
//!
//! The catalog is a plain value built from the run's [`RuntimeConfig`] and passed by reference to every generator
//! that needs it. Nothing here is global.

use std::collections::BTreeSet;
use std::path::PathBuf;

use proc_macro2::TokenStream;
use quote::{format_ident, quote};

/// Version of the generator, also the default version of the runtime crate.
pub const GENERATOR_VERSION: &str = env!("CARGO_PKG_VERSION");

pub const DEFAULT_RUNTIME_CRATE: &str = "shapegen_runtime";

const SERDE_VERSION: &str = "1.0";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuntimeLocation {
    /// Directory containing the runtime crate directory.
    Path(PathBuf),
    /// Published version.
    Version(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeConfig {
    pub crate_name: String,
    pub location: RuntimeLocation,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        RuntimeConfig {
            crate_name: DEFAULT_RUNTIME_CRATE.to_string(),
            location: RuntimeLocation::Version(GENERATOR_VERSION.to_string()),
        }
    }
}

impl RuntimeConfig {
    /// The crate name as it appears in paths (`-` becomes `_`).
    pub fn crate_ident(&self) -> String {
        self.crate_name.replace('-', "_")
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DependencyLocation {
    CratesIo(String),
    Local(PathBuf),
}

/// One `[dependencies]` entry of the generated manifest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CargoDependency {
    pub name: String,
    pub location: DependencyLocation,
    pub features: BTreeSet<String>,
    pub default_features: bool,
}

impl CargoDependency {
    pub fn crates_io(name: impl Into<String>, version: impl Into<String>) -> Self {
        CargoDependency {
            name: name.into(),
            location: DependencyLocation::CratesIo(version.into()),
            features: BTreeSet::new(),
            default_features: true,
        }
    }

    pub fn with_feature(mut self, feature: impl Into<String>) -> Self {
        self.features.insert(feature.into());
        self
    }

    pub fn serde() -> Self {
        CargoDependency::crates_io("serde", SERDE_VERSION).with_feature("derive")
    }

    pub fn serde_json() -> Self {
        CargoDependency::crates_io("serde_json", SERDE_VERSION)
    }

    /// Combine two requests for the same crate.
    pub fn merge(&mut self, other: &CargoDependency) {
        self.features.extend(other.features.iter().cloned());
        self.default_features = self.default_features || other.default_features;
    }

    /// The inline-table value for this dependency.
    pub fn toml_value(&self) -> String {
        let mut parts = Vec::new();
        match &self.location {
            DependencyLocation::CratesIo(version) => parts.push(format!("version = {}", toml_string(version))),
            DependencyLocation::Local(path) => {
                parts.push(format!("path = {}", toml_string(&path.to_string_lossy())))
            }
        }
        if !self.default_features {
            parts.push("default-features = false".to_string());
        }
        if !self.features.is_empty() {
            let features: Vec<String> = self.features.iter().map(|feature| toml_string(feature)).collect();
            parts.push(format!("features = [{}]", features.join(", ")));
        }
        format!("{{ {} }}", parts.join(", "))
    }
}

fn toml_string(text: &str) -> String {
    toml::Value::String(text.to_string()).to_string()
}

/// Every item outside the generated crate that generated code names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum LogicalType {
    Instant,
    TimestampFormat,
    Blob,
    ByteStream,
    Document,
    DocumentNumber,
    BuildError,
    GenericError,
    HttpRequest,
    HttpResponse,
    Headers,
    HeaderParseError,
    /// The `header` helper module.
    Header,
    /// The `label` helper module.
    Label,
    /// The `query` helper module.
    Query,
    /// The `protocol_test` assertion module.
    ProtocolTest,
    /// The `json` support module.
    Json,
    /// The `xml` support module.
    Xml,
    XmlError,
    ScopedDecoder,
    Serialize,
    Deserialize,
    Serializer,
    Deserializer,
    SerdeJson,
}

/// A resolved external item: a path plus the dependency that provides it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeType {
    pub name: String,
    /// `::`-separated path of the containing module, starting with the crate.
    pub namespace: String,
    pub dependency: Option<CargoDependency>,
}

impl RuntimeType {
    /// Fully qualified path, e.g. `::shapegen_runtime::instant::Instant`.
    pub fn tokens(&self) -> TokenStream {
        let segments = self
            .namespace
            .split("::")
            .chain(std::iter::once(self.name.as_str()))
            .filter(|segment| !segment.is_empty())
            .map(|segment| format_ident!("{}", segment));
        quote!(#(::#segments)*)
    }

    pub fn full_name(&self) -> String {
        if self.namespace.is_empty() {
            self.name.clone()
        } else {
            format!("{}::{}", self.namespace, self.name)
        }
    }
}

/// The threaded registry value.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RuntimeTypes {
    config: RuntimeConfig,
}

impl RuntimeTypes {
    pub fn new(config: RuntimeConfig) -> Self {
        RuntimeTypes { config }
    }

    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    /// The runtime crate dependency with exactly `features` enabled.
    pub fn runtime_dependency<'f>(&self, features: impl IntoIterator<Item = &'f str>) -> CargoDependency {
        let location = match &self.config.location {
            RuntimeLocation::Path(root) => DependencyLocation::Local(root.join(&self.config.crate_name)),
            RuntimeLocation::Version(version) => DependencyLocation::CratesIo(version.clone()),
        };
        CargoDependency {
            name: self.config.crate_name.clone(),
            location,
            features: features.into_iter().map(str::to_string).collect(),
            default_features: false,
        }
    }

    pub fn lookup(&self, logical: LogicalType) -> RuntimeType {
        let runtime = |module: &str, name: &str, feature: Option<&str>| RuntimeType {
            name: name.to_string(),
            namespace: if module.is_empty() {
                self.config.crate_ident()
            } else {
                format!("{}::{module}", self.config.crate_ident())
            },
            dependency: Some(self.runtime_dependency(feature)),
        };
        let serde = |name: &str| RuntimeType {
            name: name.to_string(),
            namespace: "serde".to_string(),
            dependency: Some(CargoDependency::serde()),
        };
        match logical {
            LogicalType::Instant => runtime("instant", "Instant", None),
            LogicalType::TimestampFormat => runtime("instant", "Format", None),
            LogicalType::Blob => runtime("blob", "Blob", None),
            LogicalType::ByteStream => runtime("byte_stream", "ByteStream", None),
            LogicalType::Document => runtime("document", "Document", None),
            LogicalType::DocumentNumber => runtime("document", "Number", None),
            LogicalType::BuildError => runtime("error", "BuildError", None),
            LogicalType::GenericError => runtime("error", "GenericError", None),
            LogicalType::HttpRequest => runtime("http", "HttpRequest", None),
            LogicalType::HttpResponse => runtime("http", "HttpResponse", None),
            LogicalType::Headers => runtime("http", "Headers", None),
            LogicalType::HeaderParseError => runtime("header", "ParseError", None),
            LogicalType::Header => runtime("", "header", None),
            LogicalType::Label => runtime("", "label", None),
            LogicalType::Query => runtime("", "query", None),
            LogicalType::ProtocolTest => runtime("", "protocol_test", None),
            LogicalType::Json => runtime("", "json", Some("json")),
            LogicalType::Xml => runtime("", "xml", Some("xml")),
            LogicalType::XmlError => runtime("xml", "XmlError", Some("xml")),
            LogicalType::ScopedDecoder => runtime("xml", "ScopedDecoder", Some("xml")),
            LogicalType::Serialize => serde("Serialize"),
            LogicalType::Deserialize => serde("Deserialize"),
            LogicalType::Serializer => serde("Serializer"),
            LogicalType::Deserializer => serde("Deserializer"),
            LogicalType::SerdeJson => RuntimeType {
                name: "serde_json".to_string(),
                namespace: String::new(),
                dependency: Some(CargoDependency::serde_json()),
            },
        }
    }

    /// Shorthand for `lookup(logical).tokens()`.
    pub fn path(&self, logical: LogicalType) -> TokenStream {
        self.lookup(logical).tokens()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paths_follow_the_configured_crate_name() {
        let types = RuntimeTypes::new(RuntimeConfig {
            crate_name: "my-runtime".into(),
            location: RuntimeLocation::Version("1.2.3".into()),
        });
        let instant = types.lookup(LogicalType::Instant);
        assert_eq!(instant.full_name(), "my_runtime::instant::Instant");
        assert_eq!(instant.tokens().to_string(), quote!(::my_runtime::instant::Instant).to_string());
        assert_eq!(types.path(LogicalType::SerdeJson).to_string(), quote!(::serde_json).to_string());
    }

    #[test]
    fn feature_gated_items_request_their_feature() {
        let types = RuntimeTypes::default();
        let dependency = types.lookup(LogicalType::XmlError).dependency.unwrap();
        assert!(dependency.features.contains("xml"));
        assert!(!dependency.default_features);
    }

    #[test]
    fn local_runtime_renders_a_path() {
        let types = RuntimeTypes::new(RuntimeConfig {
            crate_name: "shapegen_runtime".into(),
            location: RuntimeLocation::Path(PathBuf::from("../crates")),
        });
        let rendered = types.runtime_dependency(["json"]).toml_value();
        assert_eq!(
            rendered,
            r#"{ path = "../crates/shapegen_runtime", default-features = false, features = ["json"] }"#
        );
    }
}
