//! Running operations across a workspace.

use crate::error::Error;
use crate::options::{WorkspaceCallConfig, WorkspaceCallOptions, WorkspaceRunScriptConfig};
use crate::package::WorkspacePackage;
use futures::future::join_all;
use std::future::Future;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// An operation that completed for one package.
#[derive(Debug)]
pub struct WorkspaceCallSuccess<T> {
    /// The package the operation ran for.
    pub package: Arc<WorkspacePackage>,
    /// The operation's result.
    pub result: T,
    /// Position among all collected outcomes of the call.
    pub position: usize,
}

/// An operation that failed for one package.
#[derive(Debug)]
pub struct WorkspaceCallFailure<E> {
    /// The package the operation ran for.
    pub package: Arc<WorkspacePackage>,
    /// The operation's error.
    pub error: E,
    /// Position among all collected outcomes of the call.
    pub position: usize,
}

/// Outcome of an operation for one package.
#[derive(Debug)]
pub enum WorkspaceCallOutcome<T, E> {
    /// The operation succeeded.
    Success(WorkspaceCallSuccess<T>),
    /// The operation failed and the failure was collected.
    Failure(WorkspaceCallFailure<E>),
}

/// Aggregated outcomes of a workspace call, in execution order.
#[derive(Debug)]
pub struct WorkspaceCallReport<T, E> {
    /// Whether any operation failed.
    pub has_errors: bool,
    /// The failed operations.
    pub errors: Vec<WorkspaceCallFailure<E>>,
    /// The successful operations.
    pub results: Vec<WorkspaceCallSuccess<T>>,
}

impl<T, E> WorkspaceCallReport<T, E> {
    fn from_outcomes(outcomes: Vec<WorkspaceCallOutcome<T, E>>) -> Self {
        let mut errors = Vec::new();
        let mut results = Vec::new();
        for outcome in outcomes {
            match outcome {
                WorkspaceCallOutcome::Success(success) => results.push(success),
                WorkspaceCallOutcome::Failure(failure) => errors.push(failure),
            }
        }
        Self {
            has_errors: !errors.is_empty(),
            errors,
            results,
        }
    }

    /// Successes and failures merged back into execution order.
    #[must_use]
    pub fn into_outcomes(self) -> Vec<WorkspaceCallOutcome<T, E>> {
        let mut outcomes: Vec<WorkspaceCallOutcome<T, E>> = self
            .results
            .into_iter()
            .map(WorkspaceCallOutcome::Success)
            .chain(self.errors.into_iter().map(WorkspaceCallOutcome::Failure))
            .collect();
        outcomes.sort_by_key(WorkspaceCallOutcome::position);
        outcomes
    }
}

impl<T, E> WorkspaceCallOutcome<T, E> {
    /// Position among all collected outcomes of the call.
    #[must_use]
    pub const fn position(&self) -> usize {
        match self {
            Self::Success(success) => success.position,
            Self::Failure(failure) => failure.position,
        }
    }
}

impl WorkspacePackage {
    /// Run `operation` for every workspace member.
    ///
    /// Tiers of the plan run strictly in order; the operations of one tier
    /// run concurrently and all of them settle before the next tier starts.
    /// With `throw_on_error` the first failure is returned once its tier has
    /// settled and no later tier is scheduled. Otherwise failures are
    /// collected in the report.
    ///
    /// # Errors
    ///
    /// Plan construction errors are always returned before anything runs.
    pub async fn workspace_call<F, Fut, T, E>(
        &self,
        operation: F,
        options: &WorkspaceCallOptions,
    ) -> Result<WorkspaceCallReport<T, E>, E>
    where
        F: Fn(Arc<Self>) -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: From<Error>,
    {
        let plan = self
            .list_workspace_packages_in_task_order(&options.sorting)
            .await
            .map_err(E::from)?;
        info!(
            root = %self.display_name(),
            tiers = plan.len(),
            parallel = options.sorting.parallel,
            "Running workspace call"
        );

        let mut outcomes = Vec::new();
        for (index, tier) in plan.into_iter().enumerate() {
            debug!(tier = index, size = tier.len(), "Starting tier");
            let settled = join_all(tier.into_iter().map(|package| {
                let future = operation(Arc::clone(&package));
                async move { (package, future.await) }
            }))
            .await;

            let mut first_error = None;
            for (package, result) in settled {
                let position = outcomes.len();
                match result {
                    Ok(result) => {
                        outcomes.push(WorkspaceCallOutcome::Success(WorkspaceCallSuccess {
                            package,
                            result,
                            position,
                        }));
                    }
                    Err(error) if options.throw_on_error => {
                        if first_error.is_none() {
                            first_error = Some(error);
                        }
                    }
                    Err(error) => {
                        warn!(package = %package.display_name(), "Workspace operation failed");
                        outcomes.push(WorkspaceCallOutcome::Failure(WorkspaceCallFailure {
                            package,
                            error,
                            position,
                        }));
                    }
                }
            }

            if let Some(error) = first_error {
                return Err(error);
            }
        }

        Ok(WorkspaceCallReport::from_outcomes(outcomes))
    }

    /// Run a command line in every workspace member.
    ///
    /// With `throw_on_error` a non-zero exit is an [`Error::CommandFailed`];
    /// otherwise the exit code is the member's result.
    pub async fn workspace_execute(
        &self,
        cmd: &str,
        config: &WorkspaceCallConfig,
    ) -> Result<WorkspaceCallReport<i32, Error>, Error> {
        let options = config.resolve();
        let throw_on_error = options.throw_on_error;
        self.workspace_call(
            |pkg| async move {
                let code = pkg.exec_cmd(cmd).await?;
                checked_exit(&pkg, cmd, code, throw_on_error)
            },
            &options,
        )
        .await
    }

    /// Run a script in every workspace member.
    ///
    /// Members without the script yield `None` unless `throw_on_missing`
    /// is set.
    pub async fn workspace_run_script(
        &self,
        script: &str,
        config: &WorkspaceRunScriptConfig,
    ) -> Result<WorkspaceCallReport<Option<i32>, Error>, Error> {
        let (call, run) = config.resolve();
        self.workspace_call(
            |pkg| async move { pkg.run_script(script, &run).await },
            &call,
        )
        .await
    }

    /// Install dependencies in every workspace member.
    ///
    /// Exit codes are treated as in [`workspace_execute`](Self::workspace_execute).
    pub async fn workspace_install(
        &self,
        config: &WorkspaceCallConfig,
    ) -> Result<WorkspaceCallReport<i32, Error>, Error> {
        let options = config.resolve();
        let throw_on_error = options.throw_on_error;
        self.workspace_call(
            |pkg| async move {
                let code = pkg.install().await?;
                checked_exit(&pkg, &pkg.flavor().command("install"), code, throw_on_error)
            },
            &options,
        )
        .await
    }
}

fn checked_exit(
    package: &WorkspacePackage,
    command: &str,
    code: i32,
    throw_on_error: bool,
) -> Result<i32, Error> {
    if code != 0 && throw_on_error {
        return Err(Error::CommandFailed {
            package: package.display_name(),
            command: command.to_string(),
            code,
        });
    }
    Ok(code)
}
