use crate::commands::Command;
use crate::render::OutputFormat;
use crate::tracing::{LogLevel, TracingFormat};
use clap::{Args, Parser, Subcommand};
use devkit_installers::{InstallerAction, Platform};
use devkit_workspaces::WorkspaceCallConfig;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "devkit")]
#[command(about = "Run scripts across package.json workspaces and install developer tools")]
#[command(long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(
        short = 'l',
        long,
        global = true,
        help = "Set logging level",
        default_value = "warn",
        value_enum
    )]
    pub level: LogLevel,

    #[arg(long, global = true, help = "Output logs in JSON format")]
    pub json: bool,

    #[arg(
        long,
        global = true,
        help = "Log format on stderr",
        default_value = "compact",
        value_enum
    )]
    pub log_format: TracingFormat,

    #[arg(
        long,
        global = true,
        help = "Output format for command results",
        default_value = "text",
        value_enum
    )]
    pub format: OutputFormat,

    #[arg(
        short = 'c',
        long,
        global = true,
        env = "DEVKIT_CONFIG",
        help = "Path to devkit.toml (default: ./devkit.toml when present)"
    )]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    #[command(about = "Workspace operations")]
    Workspace {
        #[command(subcommand)]
        subcommand: WorkspaceCommands,
    },
    #[command(about = "Install or update tools and their dependencies")]
    Install(InstallArgs),
    #[command(about = "Update tools and their dependencies")]
    Update(InstallArgs),
    #[command(about = "Uninstall tools, dependents first")]
    Uninstall(InstallArgs),
    #[command(about = "Check whether a tool is installed")]
    Installed {
        #[arg(help = "Installer id")]
        id: String,
        #[arg(long, help = "Target platform (linux, wsl, windows)")]
        platform: Option<Platform>,
    },
    #[command(about = "List installers available on this platform")]
    Installers {
        #[arg(long, help = "Target platform (linux, wsl, windows)")]
        platform: Option<Platform>,
        #[arg(long, help = "Include installers for other platforms")]
        all: bool,
    },
}

#[derive(Subcommand, Debug)]
pub enum WorkspaceCommands {
    #[command(about = "List workspace members in execution order")]
    List {
        #[command(flatten)]
        selection: SelectionArgs,
        #[arg(long, help = "Group members into tiers that may run concurrently")]
        tiers: bool,
    },
    #[command(about = "Run a package.json script in every member")]
    Run {
        #[arg(help = "Script name")]
        script: String,
        #[command(flatten)]
        selection: SelectionArgs,
        #[arg(long, help = "Stop after the first tier with a failure")]
        throw_on_error: bool,
        #[arg(long, help = "Skip members that do not define the script")]
        skip_missing: bool,
    },
    #[command(about = "Run a command line in every member")]
    Exec {
        #[arg(required = true, trailing_var_arg = true, num_args = 1.., help = "Command to run")]
        command: Vec<String>,
        #[command(flatten)]
        selection: SelectionArgs,
        #[arg(long, help = "Stop after the first tier with a failure")]
        throw_on_error: bool,
    },
    #[command(about = "Install dependencies in every member")]
    Install {
        #[command(flatten)]
        selection: SelectionArgs,
        #[arg(long, help = "Stop after the first tier with a failure")]
        throw_on_error: bool,
    },
}

/// Which members run when, shared by every workspace command.
#[derive(Args, Debug, Clone, Default)]
pub struct SelectionArgs {
    #[arg(
        long,
        short = 'p',
        help = "Path to the workspace root or its package.json",
        default_value = "."
    )]
    pub path: PathBuf,
    #[arg(long, help = "Run independent members concurrently")]
    pub parallel: bool,
    #[arg(long, help = "Order by dependencies")]
    pub dependencies: bool,
    #[arg(long, help = "Order by devDependencies")]
    pub dev_dependencies: bool,
    #[arg(long, help = "Order by peerDependencies")]
    pub peer_dependencies: bool,
    #[arg(long, help = "Order by optionalDependencies")]
    pub optional_dependencies: bool,
}

#[derive(Args, Debug, Clone)]
pub struct InstallArgs {
    #[arg(help = "Installer ids (default: [install] default in devkit.toml)")]
    pub ids: Vec<String>,
    #[arg(long, help = "Target platform (linux, wsl, windows)")]
    pub platform: Option<Platform>,
}

/// `Some(true)` for a set flag so unset flags fall through to the config file.
const fn flag(value: bool) -> Option<bool> {
    if value { Some(true) } else { None }
}

impl SelectionArgs {
    fn call_config(&self, throw_on_error: bool) -> WorkspaceCallConfig {
        WorkspaceCallConfig {
            parallel: flag(self.parallel),
            dependencies: flag(self.dependencies),
            dev_dependencies: flag(self.dev_dependencies),
            peer_dependencies: flag(self.peer_dependencies),
            optional_dependencies: flag(self.optional_dependencies),
            throw_on_error: flag(throw_on_error),
        }
    }
}

impl From<Commands> for Command {
    fn from(cmd: Commands) -> Self {
        match cmd {
            Commands::Workspace { subcommand } => match subcommand {
                WorkspaceCommands::List { selection, tiers } => Self::WorkspaceList {
                    flags: selection.call_config(false),
                    path: selection.path,
                    tiers,
                },
                WorkspaceCommands::Run {
                    script,
                    selection,
                    throw_on_error,
                    skip_missing,
                } => Self::WorkspaceRun {
                    flags: selection.call_config(throw_on_error),
                    path: selection.path,
                    script,
                    throw_on_missing: skip_missing.then_some(false),
                },
                WorkspaceCommands::Exec {
                    command,
                    selection,
                    throw_on_error,
                } => Self::WorkspaceExec {
                    flags: selection.call_config(throw_on_error),
                    path: selection.path,
                    command: command.join(" "),
                },
                WorkspaceCommands::Install {
                    selection,
                    throw_on_error,
                } => Self::WorkspaceInstall {
                    flags: selection.call_config(throw_on_error),
                    path: selection.path,
                },
            },
            Commands::Install(args) => Self::from_install(InstallerAction::InstallOrUpdate, args),
            Commands::Update(args) => Self::from_install(InstallerAction::Update, args),
            Commands::Uninstall(args) => Self::from_install(InstallerAction::Uninstall, args),
            Commands::Installed { id, platform } => Self::Installed { id, platform },
            Commands::Installers { platform, all } => Self::Installers { platform, all },
        }
    }
}

impl Command {
    fn from_install(action: InstallerAction, args: InstallArgs) -> Self {
        Self::Install {
            action,
            ids: args.ids,
            platform: args.platform,
        }
    }
}

pub fn parse() -> Cli {
    Cli::parse()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn command(args: &[&str]) -> Command {
        Cli::try_parse_from(args).unwrap().command.into()
    }

    #[test]
    fn test_cli_default_values() {
        let cli = Cli::try_parse_from(["devkit", "installers"]).unwrap();

        assert_eq!(cli.level, LogLevel::Warn);
        assert_eq!(cli.format, OutputFormat::Text);
        assert!(!cli.json);
        assert_eq!(cli.log_format, TracingFormat::Compact);
        assert!(matches!(
            cli.command,
            Commands::Installers {
                platform: None,
                all: false
            }
        ));
    }

    #[test]
    fn test_cli_global_flags() {
        let cli = Cli::try_parse_from([
            "devkit",
            "workspace",
            "list",
            "-l",
            "debug",
            "--json",
            "--log-format",
            "dev",
            "--format",
            "json",
            "--config",
            "ci/devkit.toml",
        ])
        .unwrap();

        assert_eq!(cli.level, LogLevel::Debug);
        assert!(cli.json);
        assert_eq!(cli.log_format, TracingFormat::Dev);
        assert_eq!(cli.format, OutputFormat::Json);
        assert_eq!(cli.config, Some(PathBuf::from("ci/devkit.toml")));
    }

    #[test]
    fn test_unset_flags_defer_to_config() {
        let Command::WorkspaceList { flags, path, tiers } = command(&["devkit", "workspace", "list"]) else {
            panic!("expected workspace list");
        };
        assert_eq!(flags, WorkspaceCallConfig::default());
        assert_eq!(path, PathBuf::from("."));
        assert!(!tiers);
    }

    #[test]
    fn test_workspace_run_flags() {
        let parsed = command(&[
            "devkit",
            "workspace",
            "run",
            "build",
            "--dependencies",
            "--dev-dependencies",
            "--parallel",
            "--throw-on-error",
            "--skip-missing",
            "-p",
            "repo",
        ]);
        let Command::WorkspaceRun {
            flags,
            path,
            script,
            throw_on_missing,
        } = parsed
        else {
            panic!("expected workspace run");
        };

        assert_eq!(script, "build");
        assert_eq!(path, PathBuf::from("repo"));
        assert_eq!(throw_on_missing, Some(false));
        assert_eq!(flags.dependencies, Some(true));
        assert_eq!(flags.dev_dependencies, Some(true));
        assert_eq!(flags.peer_dependencies, None);
        assert_eq!(flags.parallel, Some(true));
        assert_eq!(flags.throw_on_error, Some(true));
    }

    #[test]
    fn test_workspace_exec_joins_trailing_args() {
        let Command::WorkspaceExec { command: line, .. } =
            command(&["devkit", "workspace", "exec", "--parallel", "ls", "-la", "src"])
        else {
            panic!("expected workspace exec");
        };
        assert_eq!(line, "ls -la src");

        assert!(Cli::try_parse_from(["devkit", "workspace", "exec"]).is_err());
    }

    #[test]
    fn test_install_commands() {
        let Command::Install { action, ids, platform } =
            command(&["devkit", "uninstall", "pnpm", "node", "--platform", "wsl"])
        else {
            panic!("expected install");
        };
        assert_eq!(action, InstallerAction::Uninstall);
        assert_eq!(ids, vec!["pnpm", "node"]);
        assert_eq!(platform, Some(Platform::Wsl));

        assert!(Cli::try_parse_from(["devkit", "install", "--platform", "macos"]).is_err());
    }
}
