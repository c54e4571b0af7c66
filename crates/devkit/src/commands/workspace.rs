//! `devkit workspace` subcommands.

use crate::errors::CliError;
use crate::render::Render;
use devkit_workspaces::{
    Error, WorkspaceCallConfig, WorkspaceCallOutcome, WorkspaceCallReport, WorkspaceCallSuccess,
    WorkspacePackage, WorkspaceRunScriptConfig,
};
use serde::Serialize;
use std::fmt::Write;
use std::path::{Path, PathBuf};
use tracing::info;

/// One workspace member.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PackageSummary {
    pub name: Option<String>,
    pub version: Option<String>,
    /// Directory relative to the workspace root.
    pub path: PathBuf,
    pub package_manager: String,
}

impl PackageSummary {
    fn new(root: &Path, package: &WorkspacePackage) -> Self {
        Self {
            name: package.name().map(str::to_string),
            version: package.version().map(str::to_string),
            path: relative(root, package.path()),
            package_manager: package.flavor().to_string(),
        }
    }

    fn label(&self) -> String {
        match &self.name {
            Some(name) => format!("{name} ({})", self.path.display()),
            None => format!("<unnamed> ({})", self.path.display()),
        }
    }
}

fn relative(root: &Path, path: &Path) -> PathBuf {
    path.strip_prefix(root).map_or_else(|_| path.to_path_buf(), Path::to_path_buf)
}

/// Members in execution order, optionally grouped into tiers.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum PackageList {
    Flat(Vec<PackageSummary>),
    Tiers(Vec<Vec<PackageSummary>>),
}

impl Render for PackageList {
    fn text(&self) -> String {
        let mut out = String::new();
        match self {
            Self::Flat(packages) => {
                for package in packages {
                    let _ = writeln!(out, "{}", package.label());
                }
            }
            Self::Tiers(tiers) => {
                for (index, tier) in tiers.iter().enumerate() {
                    let _ = writeln!(out, "tier {}:", index + 1);
                    for package in tier {
                        let _ = writeln!(out, "  {}", package.label());
                    }
                }
            }
        }
        out.trim_end().to_string()
    }
}

/// Plan the workspace members of `root`.
pub async fn list(
    root: &WorkspacePackage,
    config: &WorkspaceCallConfig,
    tiers: bool,
) -> Result<PackageList, CliError> {
    let options = config.resolve();
    let plan = root
        .list_workspace_packages_in_task_order(&options.sorting)
        .await?;
    let summarize = |package: &std::sync::Arc<WorkspacePackage>| PackageSummary::new(root.path(), package);

    Ok(if tiers {
        PackageList::Tiers(
            plan.iter()
                .map(|tier| tier.iter().map(summarize).collect())
                .collect(),
        )
    } else {
        PackageList::Flat(plan.iter().flatten().map(summarize).collect())
    })
}

/// Result of one member in a workspace call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CallStatus {
    Ok,
    Skipped,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CallEntry {
    pub package: String,
    pub path: PathBuf,
    pub status: CallStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Outcome of a command across the workspace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CallSummary {
    pub total: usize,
    pub failed: usize,
    pub packages: Vec<CallEntry>,
}

impl CallSummary {
    /// Summarize a report whose results are optional exit codes; `None` means skipped.
    fn from_report(root: &Path, report: WorkspaceCallReport<Option<i32>, Error>) -> Self {
        let packages: Vec<CallEntry> = report
            .into_outcomes()
            .into_iter()
            .map(|outcome| match outcome {
                WorkspaceCallOutcome::Success(success) => {
                    let status = match success.result {
                        None => CallStatus::Skipped,
                        Some(0) => CallStatus::Ok,
                        Some(_) => CallStatus::Failed,
                    };
                    CallEntry {
                        package: success.package.display_name(),
                        path: relative(root, success.package.path()),
                        status,
                        code: success.result,
                        error: None,
                    }
                }
                WorkspaceCallOutcome::Failure(failure) => CallEntry {
                    package: failure.package.display_name(),
                    path: relative(root, failure.package.path()),
                    status: CallStatus::Failed,
                    code: None,
                    error: Some(failure.error.to_string()),
                },
            })
            .collect();

        Self {
            total: packages.len(),
            failed: packages
                .iter()
                .filter(|entry| entry.status == CallStatus::Failed)
                .count(),
            packages,
        }
    }

    /// Error when any member failed.
    pub fn into_result(self) -> Result<Self, CliError> {
        if self.failed == 0 {
            Ok(self)
        } else {
            Err(CliError::WorkspaceFailures {
                failed: self.failed,
                total: self.total,
            })
        }
    }
}

impl Render for CallSummary {
    fn text(&self) -> String {
        let mut out = String::new();
        for entry in &self.packages {
            let status = match entry.status {
                CallStatus::Ok => "ok",
                CallStatus::Skipped => "skipped",
                CallStatus::Failed => "failed",
            };
            let _ = write!(out, "{status:<8} {}", entry.package);
            if let Some(code) = entry.code.filter(|&code| code != 0) {
                let _ = write!(out, " (exit code {code})");
            }
            if let Some(error) = &entry.error {
                let _ = write!(out, ": {error}");
            }
            out.push('\n');
        }
        let _ = write!(out, "{} packages, {} failed", self.total, self.failed);
        out
    }
}

fn exit_codes(report: WorkspaceCallReport<i32, Error>) -> WorkspaceCallReport<Option<i32>, Error> {
    WorkspaceCallReport {
        has_errors: report.has_errors,
        errors: report.errors,
        results: report
            .results
            .into_iter()
            .map(|success| WorkspaceCallSuccess {
                package: success.package,
                result: Some(success.result),
                position: success.position,
            })
            .collect(),
    }
}

/// Run `script` in every member.
pub async fn run(
    root: &WorkspacePackage,
    script: &str,
    config: &WorkspaceRunScriptConfig,
) -> Result<CallSummary, CliError> {
    info!(script, "Running script across workspace");
    let report = root.workspace_run_script(script, config).await?;
    Ok(CallSummary::from_report(root.path(), report))
}

/// Run `command` in every member.
pub async fn exec(
    root: &WorkspacePackage,
    command: &str,
    config: &WorkspaceCallConfig,
) -> Result<CallSummary, CliError> {
    info!(command, "Executing across workspace");
    let report = root.workspace_execute(command, config).await?;
    Ok(CallSummary::from_report(root.path(), exit_codes(report)))
}

/// Install dependencies in every member.
pub async fn install(
    root: &WorkspacePackage,
    config: &WorkspaceCallConfig,
) -> Result<CallSummary, CliError> {
    let report = root.workspace_install(config).await?;
    Ok(CallSummary::from_report(root.path(), exit_codes(report)))
}
