//! `package.json` reading.

use crate::error::{Error, Result};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// File name of a package manifest.
pub const MANIFEST_FILE: &str = "package.json";

/// Relations between packages that can drive ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DependencyKind {
    /// `dependencies`
    Production,
    /// `devDependencies`
    Development,
    /// `peerDependencies`
    Peer,
    /// `optionalDependencies`
    Optional,
}

/// The `workspaces` field, in either of its two forms.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum WorkspacesField {
    /// `"workspaces": ["packages/*"]`
    Array(Vec<String>),
    /// `"workspaces": { "packages": ["packages/*"] }`
    Object {
        /// Member patterns.
        #[serde(default)]
        packages: Vec<String>,
    },
}

impl WorkspacesField {
    /// Member glob patterns, regardless of form.
    #[must_use]
    pub fn patterns(&self) -> &[String] {
        match self {
            Self::Array(patterns) | Self::Object { packages: patterns } => patterns,
        }
    }
}

/// The subset of `package.json` devkit understands.
///
/// Unknown fields are ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PackageManifest {
    /// Package name.
    pub name: Option<String>,
    /// Package version.
    pub version: Option<String>,
    /// Production dependencies.
    #[serde(default)]
    pub dependencies: BTreeMap<String, String>,
    /// Development dependencies.
    #[serde(default)]
    pub dev_dependencies: BTreeMap<String, String>,
    /// Peer dependencies.
    #[serde(default)]
    pub peer_dependencies: BTreeMap<String, String>,
    /// Optional dependencies.
    #[serde(default)]
    pub optional_dependencies: BTreeMap<String, String>,
    /// Workspace member patterns.
    pub workspaces: Option<WorkspacesField>,
    /// Named scripts.
    #[serde(default)]
    pub scripts: BTreeMap<String, String>,
    /// `packageManager` hint such as `pnpm@9.1.0`.
    pub package_manager: Option<String>,
}

impl PackageManifest {
    /// Read and parse a manifest file.
    pub fn from_file(path: &Path) -> Result<Self> {
        read_json_file(path)
    }

    /// Names of the dependencies declared under the given relation.
    pub fn dependency_names(&self, kind: DependencyKind) -> impl Iterator<Item = &str> {
        let map = match kind {
            DependencyKind::Production => &self.dependencies,
            DependencyKind::Development => &self.dev_dependencies,
            DependencyKind::Peer => &self.peer_dependencies,
            DependencyKind::Optional => &self.optional_dependencies,
        };
        map.keys().map(String::as_str)
    }

    /// Member patterns, empty when the package is not a workspace root.
    #[must_use]
    pub fn workspace_patterns(&self) -> &[String] {
        match &self.workspaces {
            Some(field) => field.patterns(),
            None => &[],
        }
    }
}

/// Reads and parses a JSON file.
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed as valid JSON.
pub fn read_json_file<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let content =
        fs::read_to_string(path).map_err(|e| Error::io(e, path, "reading json file"))?;

    serde_json::from_str(&content).map_err(|e| Error::Json {
        source: e,
        path: Some(path.to_path_buf()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_manifest() {
        let manifest: PackageManifest = serde_json::from_str(
            r#"{
                "name": "@acme/app",
                "version": "1.2.3",
                "dependencies": { "react": "^18", "@acme/lib": "workspace:*" },
                "devDependencies": { "@acme/tooling": "*" },
                "peerDependencies": { "@acme/peer": "*" },
                "optionalDependencies": { "@acme/extra": "*" },
                "scripts": { "build": "tsc -b" },
                "packageManager": "pnpm@9.1.0",
                "private": true
            }"#,
        )
        .unwrap();

        assert_eq!(manifest.name.as_deref(), Some("@acme/app"));
        assert_eq!(manifest.version.as_deref(), Some("1.2.3"));
        assert_eq!(
            manifest
                .dependency_names(DependencyKind::Production)
                .collect::<Vec<_>>(),
            vec!["@acme/lib", "react"]
        );
        assert_eq!(
            manifest
                .dependency_names(DependencyKind::Development)
                .collect::<Vec<_>>(),
            vec!["@acme/tooling"]
        );
        assert_eq!(
            manifest
                .dependency_names(DependencyKind::Peer)
                .collect::<Vec<_>>(),
            vec!["@acme/peer"]
        );
        assert_eq!(
            manifest
                .dependency_names(DependencyKind::Optional)
                .collect::<Vec<_>>(),
            vec!["@acme/extra"]
        );
        assert_eq!(manifest.scripts["build"], "tsc -b");
        assert_eq!(manifest.package_manager.as_deref(), Some("pnpm@9.1.0"));
        assert!(manifest.workspace_patterns().is_empty());
    }

    #[test]
    fn test_workspaces_array_form() {
        let manifest: PackageManifest =
            serde_json::from_str(r#"{ "workspaces": ["pkgs/*", "!pkgs/skip"] }"#).unwrap();
        assert_eq!(manifest.workspace_patterns(), ["pkgs/*", "!pkgs/skip"]);
    }

    #[test]
    fn test_workspaces_object_form() {
        let manifest: PackageManifest = serde_json::from_str(
            r#"{ "workspaces": { "packages": ["apps/*"], "nohoist": ["**/x"] } }"#,
        )
        .unwrap();
        assert_eq!(manifest.workspace_patterns(), ["apps/*"]);
    }

    #[test]
    fn test_minimal_manifest() {
        let manifest: PackageManifest = serde_json::from_str("{}").unwrap();
        assert_eq!(manifest, PackageManifest::default());
    }

    #[test]
    fn test_read_json_file_errors() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.json");
        assert!(matches!(
            read_json_file::<PackageManifest>(&missing),
            Err(Error::Io { .. })
        ));

        let broken = dir.path().join("broken.json");
        fs::write(&broken, "{ not json").unwrap();
        assert!(matches!(
            read_json_file::<PackageManifest>(&broken),
            Err(Error::Json { path: Some(_), .. })
        ));
    }
}
