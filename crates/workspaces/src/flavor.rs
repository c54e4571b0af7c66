//! Package manager flavor detection.

use crate::manifest::PackageManifest;
use std::fmt;
use std::path::Path;

/// The package manager that drives a package.
///
/// Detection evaluates flavors in declaration order and the first match
/// wins. A package with no marker of its own falls back to npm, or to the
/// workspace root's flavor when it is a workspace member.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PackageFlavor {
    /// pnpm
    Pnpm,
    /// Yarn
    Yarn,
    /// npm
    #[default]
    Npm,
}

impl PackageFlavor {
    /// Detection priority.
    pub const DETECTION_ORDER: [Self; 3] = [Self::Pnpm, Self::Yarn, Self::Npm];

    /// Pick the flavor for a manifest located in `dir`.
    #[must_use]
    pub fn detect(manifest: &PackageManifest, dir: &Path) -> Self {
        Self::detect_marked(manifest, dir).unwrap_or_default()
    }

    /// Like [`detect`](Self::detect), but `None` when neither the
    /// `packageManager` hint nor a lockfile in `dir` names a flavor.
    #[must_use]
    pub fn detect_marked(manifest: &PackageManifest, dir: &Path) -> Option<Self> {
        let hint = manifest
            .package_manager
            .as_deref()
            .map(|hint| hint.trim().to_ascii_lowercase());

        Self::DETECTION_ORDER
            .into_iter()
            .find(|flavor| flavor.matches(hint.as_deref(), dir))
    }

    fn matches(self, hint: Option<&str>, dir: &Path) -> bool {
        match self {
            Self::Pnpm => {
                hint.is_some_and(|h| h.starts_with("pnpm"))
                    || dir.join("pnpm-lock.yaml").exists()
                    || dir.join("pnpm-workspace.yaml").exists()
            }
            Self::Yarn => {
                hint.is_some_and(|h| h.starts_with("yarn")) || dir.join("yarn.lock").exists()
            }
            Self::Npm => {
                hint.is_some_and(|h| h.starts_with("npm")) || dir.join("package-lock.json").exists()
            }
        }
    }

    /// Executable name.
    #[must_use]
    pub const fn binary(self) -> &'static str {
        match self {
            Self::Pnpm => "pnpm",
            Self::Yarn => "yarn",
            Self::Npm => "npm",
        }
    }

    /// Full command line for a package-manager subcommand.
    #[must_use]
    pub fn command(self, subcommand: &str) -> String {
        let subcommand = subcommand.trim();
        if subcommand.is_empty() {
            self.binary().to_string()
        } else {
            format!("{} {}", self.binary(), subcommand)
        }
    }
}

impl fmt::Display for PackageFlavor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.binary())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn manifest_with_hint(hint: Option<&str>) -> PackageManifest {
        PackageManifest {
            package_manager: hint.map(String::from),
            ..PackageManifest::default()
        }
    }

    #[test]
    fn test_defaults_to_npm() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(
            PackageFlavor::detect(&manifest_with_hint(None), dir.path()),
            PackageFlavor::Npm
        );
    }

    #[test]
    fn test_hint_selects_flavor() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(
            PackageFlavor::detect(&manifest_with_hint(Some("pnpm@9.1.0")), dir.path()),
            PackageFlavor::Pnpm
        );
        assert_eq!(
            PackageFlavor::detect(&manifest_with_hint(Some("yarn@4.0.2")), dir.path()),
            PackageFlavor::Yarn
        );
        assert_eq!(
            PackageFlavor::detect(&manifest_with_hint(Some("npm@10.0.0")), dir.path()),
            PackageFlavor::Npm
        );
    }

    #[test]
    fn test_lockfiles_select_flavor() {
        let yarn = tempfile::tempdir().unwrap();
        fs::write(yarn.path().join("yarn.lock"), "").unwrap();
        assert_eq!(
            PackageFlavor::detect(&manifest_with_hint(None), yarn.path()),
            PackageFlavor::Yarn
        );

        let pnpm = tempfile::tempdir().unwrap();
        fs::write(pnpm.path().join("pnpm-workspace.yaml"), "packages: []").unwrap();
        assert_eq!(
            PackageFlavor::detect(&manifest_with_hint(None), pnpm.path()),
            PackageFlavor::Pnpm
        );
    }

    #[test]
    fn test_pnpm_wins_over_yarn() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("yarn.lock"), "").unwrap();
        fs::write(dir.path().join("pnpm-lock.yaml"), "").unwrap();
        assert_eq!(
            PackageFlavor::detect(&manifest_with_hint(None), dir.path()),
            PackageFlavor::Pnpm
        );

        // An explicit yarn hint still loses to a pnpm lockfile.
        assert_eq!(
            PackageFlavor::detect(&manifest_with_hint(Some("yarn@1.22.0")), dir.path()),
            PackageFlavor::Pnpm
        );
    }

    #[test]
    fn test_unmarked_package() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(PackageFlavor::detect_marked(&manifest_with_hint(None), dir.path()), None);

        fs::write(dir.path().join("package-lock.json"), "{}").unwrap();
        assert_eq!(
            PackageFlavor::detect_marked(&manifest_with_hint(None), dir.path()),
            Some(PackageFlavor::Npm)
        );
    }

    #[test]
    fn test_command_line() {
        assert_eq!(PackageFlavor::Pnpm.command("install"), "pnpm install");
        assert_eq!(PackageFlavor::Yarn.command("  run build "), "yarn run build");
        assert_eq!(PackageFlavor::Npm.command(""), "npm");
        assert_eq!(PackageFlavor::Npm.to_string(), "npm");
    }
}
