//! Installers driven by shell commands and scripts.

use crate::error::{Error, Result};
use crate::installer::{InstallerAction, PlatformInstaller};
use crate::platform::Platform;
use async_trait::async_trait;
use devkit_process::ProcessRunner;
use std::io::Write;
use std::sync::Arc;

/// Shell command lines for each installer step.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InstallerCommands {
    /// Exits zero when the tool is installed.
    pub check: Option<String>,
    /// Installs the tool.
    pub install: String,
    /// Updates the tool; `install` is used when absent.
    pub update: Option<String>,
    /// Removes the tool.
    pub uninstall: Option<String>,
    /// Started detached once an install or update succeeds, e.g. a daemon
    /// or desktop app that must be running before it can be used.
    pub launch: Option<String>,
}

/// Installer that runs one shell command per step.
#[derive(Debug, Clone)]
pub struct CommandInstaller {
    id: String,
    name: String,
    dependencies: Vec<String>,
    commands: InstallerCommands,
    runner: Arc<dyn ProcessRunner>,
}

impl CommandInstaller {
    /// Create an installer from explicit commands.
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        commands: InstallerCommands,
        runner: Arc<dyn ProcessRunner>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            dependencies: Vec::new(),
            commands,
            runner,
        }
    }

    /// Debian package managed through `apt-get`.
    pub fn apt(
        id: impl Into<String>,
        name: impl Into<String>,
        package: &str,
        runner: Arc<dyn ProcessRunner>,
    ) -> Self {
        let commands = InstallerCommands {
            check: Some(format!("dpkg -s {package}")),
            install: format!("sudo apt-get install -y {package}"),
            update: Some(format!("sudo apt-get install --only-upgrade -y {package}")),
            uninstall: Some(format!("sudo apt-get remove -y {package}")),
            launch: None,
        };
        Self::new(id, name, commands, runner)
    }

    /// Package managed through winget.
    ///
    /// Under WSL the Windows binary `winget.exe` is used.
    pub fn winget(
        id: impl Into<String>,
        name: impl Into<String>,
        package_id: &str,
        platform: Platform,
        runner: Arc<dyn ProcessRunner>,
    ) -> Self {
        let winget = if platform == Platform::Wsl {
            "winget.exe"
        } else {
            "winget"
        };
        let commands = InstallerCommands {
            check: Some(format!("{winget} list -e --id {package_id}")),
            install: format!("{winget} install -e --id {package_id}"),
            update: Some(format!("{winget} upgrade -he --id {package_id}")),
            uninstall: Some(format!("{winget} uninstall -e --id {package_id}")),
            launch: None,
        };
        Self::new(id, name, commands, runner)
    }

    /// Package installed globally through npm.
    pub fn npm_global(
        id: impl Into<String>,
        name: impl Into<String>,
        package: &str,
        runner: Arc<dyn ProcessRunner>,
    ) -> Self {
        let commands = InstallerCommands {
            check: Some(format!("npm ls -g --depth=0 {package}")),
            install: format!("npm install -g {package}"),
            update: Some(format!("npm update -g {package}")),
            uninstall: Some(format!("npm uninstall -g {package}")),
            launch: None,
        };
        Self::new(id, name, commands, runner)
    }

    /// Set the installers that must run first.
    #[must_use]
    pub fn with_dependencies(mut self, dependencies: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.dependencies = dependencies.into_iter().map(Into::into).collect();
        self
    }

    /// The configured commands.
    #[must_use]
    pub const fn commands(&self) -> &InstallerCommands {
        &self.commands
    }

    /// Start the tool in the background after installing it.
    #[must_use]
    pub fn with_launch(mut self, launch: impl Into<String>) -> Self {
        self.commands.launch = Some(launch.into());
        self
    }

    fn launch(&self) -> Result<()> {
        if let Some(launch) = &self.commands.launch {
            tracing::info!(installer = %self.id, "Launching: {}", launch);
            self.runner.start(launch, None)?;
        }
        Ok(())
    }

    async fn exec(&self, action: InstallerAction, command: &str) -> Result<()> {
        let code = self.runner.exec(command, None).await?;
        if code == 0 {
            Ok(())
        } else {
            Err(Error::CommandFailed {
                installer: self.id.clone(),
                action,
                command: command.to_string(),
                code,
            })
        }
    }
}

#[async_trait]
impl PlatformInstaller for CommandInstaller {
    fn id(&self) -> &str {
        &self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn dependencies(&self) -> &[String] {
        &self.dependencies
    }

    async fn is_installed(&self) -> Result<bool> {
        let Some(check) = &self.commands.check else {
            return Ok(false);
        };
        check_installed(self.runner.as_ref(), check).await
    }

    async fn install_or_update(&self) -> Result<()> {
        let command = if let Some(update) = &self.commands.update
            && self.is_installed().await?
        {
            update
        } else {
            &self.commands.install
        };
        self.exec(InstallerAction::InstallOrUpdate, command).await?;
        self.launch()
    }

    async fn update(&self) -> Result<()> {
        let command = self
            .commands
            .update
            .as_deref()
            .unwrap_or(&self.commands.install);
        self.exec(InstallerAction::Update, command).await?;
        self.launch()
    }

    async fn uninstall(&self) -> Result<()> {
        let Some(command) = &self.commands.uninstall else {
            return Err(Error::Unsupported {
                installer: self.id.clone(),
                action: InstallerAction::Uninstall,
            });
        };
        self.exec(InstallerAction::Uninstall, command).await
    }
}

/// Bash script bodies for each installer step.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InstallerScripts {
    /// Command that exits zero when the tool is installed.
    pub check: Option<String>,
    /// Installs or updates the tool.
    pub install_or_update: String,
    /// Updates the tool; `install_or_update` is used when absent.
    pub update: Option<String>,
    /// Removes the tool.
    pub uninstall: Option<String>,
}

/// Installer that writes a script to a temporary file and executes it.
#[derive(Debug, Clone)]
pub struct ScriptInstaller {
    id: String,
    name: String,
    dependencies: Vec<String>,
    scripts: InstallerScripts,
    runner: Arc<dyn ProcessRunner>,
}

impl ScriptInstaller {
    /// Create a script installer.
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        scripts: InstallerScripts,
        runner: Arc<dyn ProcessRunner>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            dependencies: Vec::new(),
            scripts,
            runner,
        }
    }

    /// Set the installers that must run first.
    #[must_use]
    pub fn with_dependencies(mut self, dependencies: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.dependencies = dependencies.into_iter().map(Into::into).collect();
        self
    }

    async fn exec_script(&self, action: InstallerAction, script: &str) -> Result<()> {
        let path = write_script(script)?;
        let command = format!("'{}'", path.display());
        tracing::debug!(installer = %self.id, script = %path.display(), "Executing installer script");

        let code = self.runner.exec(&command, None).await?;
        drop(path);
        if code == 0 {
            Ok(())
        } else {
            Err(Error::CommandFailed {
                installer: self.id.clone(),
                action,
                command,
                code,
            })
        }
    }
}

/// Write `script` to an executable temp file, removed when the handle drops.
fn write_script(script: &str) -> Result<tempfile::TempPath> {
    let mut file = tempfile::Builder::new()
        .prefix("devkit-install-")
        .suffix(".sh")
        .tempfile()
        .map_err(|e| Error::io(e, None, "creating installer script"))?;
    file.write_all(script.as_bytes())
        .and_then(|()| file.flush())
        .map_err(|e| Error::io(e, Some(file.path().to_path_buf()), "writing installer script"))?;

    // Close the handle before executing, otherwise exec fails with ETXTBSY.
    let path = file.into_temp_path();
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755))
            .map_err(|e| Error::io(e, Some(path.to_path_buf()), "marking installer script executable"))?;
    }
    Ok(path)
}

async fn check_installed(runner: &dyn ProcessRunner, check: &str) -> Result<bool> {
    match runner.run(check, None).await {
        Ok(_) => Ok(true),
        Err(devkit_process::Error::NonZeroExit { .. }) => Ok(false),
        Err(e) => Err(e.into()),
    }
}

#[async_trait]
impl PlatformInstaller for ScriptInstaller {
    fn id(&self) -> &str {
        &self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn dependencies(&self) -> &[String] {
        &self.dependencies
    }

    async fn is_installed(&self) -> Result<bool> {
        match &self.scripts.check {
            Some(check) => check_installed(self.runner.as_ref(), check).await,
            None => Ok(false),
        }
    }

    async fn install_or_update(&self) -> Result<()> {
        self.exec_script(InstallerAction::InstallOrUpdate, &self.scripts.install_or_update)
            .await
    }

    async fn update(&self) -> Result<()> {
        let script = self
            .scripts
            .update
            .as_deref()
            .unwrap_or(&self.scripts.install_or_update);
        self.exec_script(InstallerAction::Update, script).await
    }

    async fn uninstall(&self) -> Result<()> {
        let Some(script) = &self.scripts.uninstall else {
            return Err(Error::Unsupported {
                installer: self.id.clone(),
                action: InstallerAction::Uninstall,
            });
        };
        self.exec_script(InstallerAction::Uninstall, script).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use devkit_process::ShellRunner;
    use std::path::Path;
    use std::sync::Mutex;

    #[derive(Debug, Default)]
    struct ScriptedRunner {
        installed: bool,
        calls: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl ProcessRunner for ScriptedRunner {
        async fn exec(&self, command: &str, _cwd: Option<&Path>) -> devkit_process::Result<i32> {
            self.calls.lock().unwrap().push(command.to_string());
            Ok(i32::from(command.contains("fail")))
        }

        async fn run(&self, command: &str, _cwd: Option<&Path>) -> devkit_process::Result<String> {
            self.calls.lock().unwrap().push(command.to_string());
            if self.installed {
                Ok(String::new())
            } else {
                Err(devkit_process::Error::NonZeroExit {
                    command: command.to_string(),
                    code: 1,
                    output: String::new(),
                })
            }
        }

        fn start(&self, command: &str, _cwd: Option<&Path>) -> devkit_process::Result<()> {
            self.calls.lock().unwrap().push(format!("start {command}"));
            Ok(())
        }
    }

    fn runner(installed: bool) -> Arc<ScriptedRunner> {
        Arc::new(ScriptedRunner {
            installed,
            ..ScriptedRunner::default()
        })
    }

    #[tokio::test]
    async fn test_install_or_update_installs_when_missing() {
        let runner = runner(false);
        let apt = CommandInstaller::apt("git", "Git", "git", runner.clone());

        assert!(!apt.is_installed().await.unwrap());
        apt.install_or_update().await.unwrap();
        assert_eq!(
            *runner.calls.lock().unwrap(),
            vec![
                "dpkg -s git",
                "dpkg -s git",
                "sudo apt-get install -y git",
            ]
        );
    }

    #[tokio::test]
    async fn test_install_or_update_updates_when_present() {
        let runner = runner(true);
        let npm = CommandInstaller::npm_global("pnpm", "pnpm", "pnpm", runner.clone());

        npm.install_or_update().await.unwrap();
        assert_eq!(
            *runner.calls.lock().unwrap(),
            vec!["npm ls -g --depth=0 pnpm", "npm update -g pnpm"]
        );
    }

    #[tokio::test]
    async fn test_launch_after_successful_install() {
        let runner = runner(false);
        let installer = CommandInstaller::new(
            "docker",
            "Docker Desktop",
            InstallerCommands {
                install: "install-docker".to_string(),
                ..InstallerCommands::default()
            },
            runner.clone(),
        )
        .with_launch("docker-desktop");

        installer.install_or_update().await.unwrap();
        installer.update().await.unwrap();
        assert_eq!(
            *runner.calls.lock().unwrap(),
            vec![
                "install-docker",
                "start docker-desktop",
                "install-docker",
                "start docker-desktop",
            ]
        );
    }

    #[tokio::test]
    async fn test_no_launch_after_failed_install() {
        let runner = runner(false);
        let installer = CommandInstaller::new(
            "docker",
            "Docker Desktop",
            InstallerCommands {
                install: "fail-install".to_string(),
                launch: Some("docker-desktop".to_string()),
                ..InstallerCommands::default()
            },
            runner.clone(),
        );

        assert!(installer.install_or_update().await.is_err());
        assert_eq!(*runner.calls.lock().unwrap(), vec!["fail-install"]);
    }

    #[test]
    fn test_winget_binary_per_platform() {
        let runner = runner(false);
        let native = CommandInstaller::winget("git", "Git", "Git.Git", Platform::Windows, runner.clone());
        let wsl = CommandInstaller::winget("git", "Git", "Git.Git", Platform::Wsl, runner);

        assert_eq!(native.commands().install, "winget install -e --id Git.Git");
        assert_eq!(
            wsl.commands().check.as_deref(),
            Some("winget.exe list -e --id Git.Git")
        );
    }

    #[tokio::test]
    async fn test_failing_command_reports_exit_code() {
        let installer = CommandInstaller::new(
            "x",
            "X",
            InstallerCommands {
                install: "fail-install".to_string(),
                ..InstallerCommands::default()
            },
            runner(false),
        );

        let err = installer.install_or_update().await.unwrap_err();
        assert!(matches!(
            err,
            Error::CommandFailed { code: 1, action: InstallerAction::InstallOrUpdate, .. }
        ));
        assert!(matches!(
            installer.uninstall().await.unwrap_err(),
            Error::Unsupported { action: InstallerAction::Uninstall, .. }
        ));
        assert!(!installer.is_installed().await.unwrap());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_script_installer_runs_and_cleans_up() {
        let dir = tempfile::tempdir().unwrap();
        let marker = dir.path().join("installed.txt");
        let scripts = InstallerScripts {
            check: Some(format!("test -f '{}'", marker.display())),
            install_or_update: format!("#!/bin/sh\necho ok > '{}'\n", marker.display()),
            update: None,
            uninstall: Some(format!("#!/bin/sh\nrm '{}'\n", marker.display())),
        };
        let installer = ScriptInstaller::new("demo", "Demo", scripts, Arc::new(ShellRunner::new()));

        assert!(!installer.is_installed().await.unwrap());
        installer.install_or_update().await.unwrap();
        assert_eq!(std::fs::read_to_string(&marker).unwrap(), "ok\n");
        assert!(installer.is_installed().await.unwrap());

        installer.uninstall().await.unwrap();
        assert!(!marker.exists());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_script_failure() {
        let scripts = InstallerScripts {
            install_or_update: "#!/bin/sh\nexit 4\n".to_string(),
            ..InstallerScripts::default()
        };
        let installer = ScriptInstaller::new("demo", "Demo", scripts, Arc::new(ShellRunner::new()));

        let err = installer.update().await.unwrap_err();
        assert!(matches!(err, Error::CommandFailed { code: 4, action: InstallerAction::Update, .. }));
    }
}
