//! `Cargo.toml` of the generated crate.

use super::runtime::CargoDependency;

pub const DEFAULT_EDITION: &str = "2021";

/// The `[package]` table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageManifest {
    pub name: String,
    pub version: String,
    pub edition: String,
}

impl PackageManifest {
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        PackageManifest {
            name: name.into(),
            version: version.into(),
            edition: DEFAULT_EDITION.to_string(),
        }
    }

    pub fn with_edition(mut self, edition: impl Into<String>) -> Self {
        self.edition = edition.into();
        self
    }
}

/// Render the manifest. Dependencies are sorted by crate name; a crate listed twice has its features merged.
pub fn generate_cargo_toml<'a>(
    package: &PackageManifest,
    dependencies: impl IntoIterator<Item = &'a CargoDependency>,
) -> String {
    let mut merged: Vec<CargoDependency> = Vec::new();
    for dependency in dependencies {
        match merged.iter_mut().find(|existing| existing.name == dependency.name) {
            Some(existing) => existing.merge(dependency),
            None => merged.push(dependency.clone()),
        }
    }
    merged.sort_by(|a, b| a.name.cmp(&b.name));

    let mut out = String::new();
    out.push_str("[package]\n");
    out.push_str(&format!("name = {}\n", toml_string(&package.name)));
    out.push_str(&format!("version = {}\n", toml_string(&package.version)));
    out.push_str(&format!("edition = {}\n", toml_string(&package.edition)));
    out.push_str("\n[dependencies]\n");
    for dependency in &merged {
        out.push_str(&format!("{} = {}\n", dependency.name, dependency.toml_value()));
    }
    out
}

fn toml_string(text: &str) -> String {
    toml::Value::String(text.to_string()).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dependencies_are_sorted_and_merged() {
        let deps = [
            CargoDependency::serde_json(),
            CargoDependency::crates_io("serde", "1.0"),
            CargoDependency::serde(),
        ];
        let manifest = generate_cargo_toml(&PackageManifest::new("weather", "0.1.0"), &deps);
        let lines: Vec<&str> = manifest.lines().collect();
        assert_eq!(lines[0], "[package]");
        assert_eq!(lines[1], r#"name = "weather""#);
        assert_eq!(lines[3], r#"edition = "2021""#);
        assert_eq!(lines[6], r#"serde = { version = "1.0", features = ["derive"] }"#);
        assert_eq!(lines[7], r#"serde_json = { version = "1.0" }"#);
    }

    #[test]
    fn manifest_parses_as_toml() {
        let manifest = generate_cargo_toml(
            &PackageManifest::new("weather", "0.1.0").with_edition("2024"),
            &[CargoDependency::serde()],
        );
        let value: toml::Value = toml::from_str(&manifest).unwrap();
        assert_eq!(value["package"]["edition"].as_str(), Some("2024"));
        assert_eq!(value["dependencies"]["serde"]["features"][0].as_str(), Some("derive"));
    }
}
