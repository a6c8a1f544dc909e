//! Run configuration: the `shapegen.toml` file and the errors it can produce.
//!
//! ```toml
//! [package]
//! name = "weather"
//! version = "0.1.0"
//!
//! [service]
//! id = "example.weather#Weather"
//!
//! [runtime]
//! path = "../crates"
//! ```

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::codegen::manifest::DEFAULT_EDITION;
use crate::codegen::runtime::{DEFAULT_RUNTIME_CRATE, GENERATOR_VERSION, RuntimeConfig, RuntimeLocation};
use crate::codegen::CodegenSettings;
use crate::model::{ModelError, ShapeId};

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("no matching protocol: service declares [{}]; implemented [{}]", declared.join(", "), implemented.join(", "))]
    UnsupportedProtocol {
        declared: Vec<String>,
        implemented: Vec<String>,
    },

    #[error("malformed runtime configuration: {0}")]
    MalformedRuntime(String),

    #[error("invalid service id: {0}")]
    InvalidServiceId(#[source] ModelError),

    #[error("service `{0}` is not defined in the model")]
    UnknownService(ShapeId),

    #[error("`{0}` is not a service shape")]
    NotAService(ShapeId),

    #[error("failed to parse configuration: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("failed to read `{}`: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    pub package: PackageSection,
    pub service: ServiceSection,
    #[serde(default)]
    pub runtime: RuntimeSection,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PackageSection {
    pub name: String,
    pub version: String,
    pub edition: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServiceSection {
    pub id: String,
    /// Overrides the protocol traits declared on the service.
    pub protocols: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
pub struct RuntimeSection {
    pub crate_name: Option<String>,
    pub path: Option<PathBuf>,
    pub version: Option<String>,
}

impl RuntimeSection {
    pub fn to_runtime_config(&self) -> Result<RuntimeConfig, ConfigError> {
        let crate_name = self.crate_name.clone().unwrap_or_else(|| DEFAULT_RUNTIME_CRATE.to_string());
        if crate_name.trim().is_empty() {
            return Err(ConfigError::MalformedRuntime("`crate-name` is empty".to_string()));
        }
        let location = match (&self.path, &self.version) {
            (Some(_), Some(_)) => {
                return Err(ConfigError::MalformedRuntime(
                    "set either `path` or `version`, not both".to_string(),
                ));
            }
            (Some(path), None) => RuntimeLocation::Path(path.clone()),
            (None, Some(version)) if version.trim().is_empty() => {
                return Err(ConfigError::MalformedRuntime("`version` is empty".to_string()));
            }
            (None, Some(version)) => RuntimeLocation::Version(version.clone()),
            (None, None) => RuntimeLocation::Version(GENERATOR_VERSION.to_string()),
        };
        Ok(RuntimeConfig { crate_name, location })
    }
}

impl ConfigFile {
    pub fn parse(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&text)
    }

    pub fn to_settings(&self) -> Result<CodegenSettings, ConfigError> {
        let service = ShapeId::parse(&self.service.id).map_err(ConfigError::InvalidServiceId)?;
        Ok(CodegenSettings {
            module_name: self.package.name.clone(),
            module_version: self.package.version.clone(),
            edition: self
                .package
                .edition
                .clone()
                .unwrap_or_else(|| DEFAULT_EDITION.to_string()),
            service,
            runtime: self.runtime.to_runtime_config()?,
            protocols: self.service.protocols.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = r#"
        [package]
        name = "weather"
        version = "0.1.0"

        [service]
        id = "example.weather#Weather"
    "#;

    #[test]
    fn minimal_config_uses_defaults() {
        let settings = ConfigFile::parse(MINIMAL).unwrap().to_settings().unwrap();
        assert_eq!(settings.module_name, "weather");
        assert_eq!(settings.edition, "2021");
        assert_eq!(settings.service, ShapeId::new("example.weather", "Weather"));
        assert_eq!(settings.runtime, RuntimeConfig::default());
        assert_eq!(settings.protocols, None);
    }

    #[test]
    fn runtime_path_and_protocol_override() {
        let text = format!(
            "{MINIMAL}\n[runtime]\ncrate-name = \"my-runtime\"\npath = \"../crates\"\n"
        )
        .replace(
            "id = \"example.weather#Weather\"",
            "id = \"example.weather#Weather\"\nprotocols = [\"aws.protocols#restXml\"]",
        );
        let settings = ConfigFile::parse(&text).unwrap().to_settings().unwrap();
        assert_eq!(settings.runtime.crate_name, "my-runtime");
        assert_eq!(settings.runtime.location, RuntimeLocation::Path(PathBuf::from("../crates")));
        assert_eq!(settings.protocols, Some(vec!["aws.protocols#restXml".to_string()]));
    }

    #[test]
    fn path_and_version_together_are_rejected() {
        let text = format!("{MINIMAL}\n[runtime]\npath = \"../crates\"\nversion = \"0.1.0\"\n");
        let err = ConfigFile::parse(&text).unwrap().to_settings().unwrap_err();
        assert!(matches!(err, ConfigError::MalformedRuntime(_)));
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let text = format!("{MINIMAL}\nextra = true\n");
        assert!(matches!(ConfigFile::parse(&text), Err(ConfigError::Toml(_))));
    }

    #[test]
    fn bad_service_id_is_reported() {
        let text = MINIMAL.replace("example.weather#Weather", "Weather");
        let err = ConfigFile::parse(&text).unwrap().to_settings().unwrap_err();
        assert!(matches!(err, ConfigError::InvalidServiceId(_)));
    }
}
