//! Command dispatch: maps parsed arguments onto services

use std::io;
use std::path::{Path, PathBuf};

use clap::CommandFactory;
use termtree::Tree;
use tracing::{debug, instrument};

use crate::application::services::{Freshness, GenerateRequest};
use crate::application::ApplicationError;
use crate::cli::args::{Cli, Commands, ConfigCommands, SourceArgs};
use crate::cli::output;
use crate::cli::{CliError, CliResult};
use crate::config::{global_config_path, project_config_path, Settings};
use crate::domain::{Branch, Forest, TreeItem};
use crate::exitcode;
use crate::infrastructure::{InfraError, ServiceContainer};

/// Run the parsed command, returning the process exit code.
pub fn execute_command(cli: &Cli) -> CliResult<i32> {
    match &cli.command {
        Some(Commands::Generate {
            source,
            output,
            stdout,
        }) => cmd_generate(cli, source, output.as_deref(), *stdout),
        Some(Commands::Check { file, source }) => cmd_check(cli, source, file.as_deref()),
        Some(Commands::Tree { source }) => cmd_tree(cli, source),
        Some(Commands::Config { command }) => cmd_config(cli, command),
        Some(Commands::Completion { shell }) => {
            let mut cmd = Cli::command();
            let name = cmd.get_name().to_string();
            clap_complete::generate(*shell, &mut cmd, name, &mut io::stdout());
            Ok(exitcode::OK)
        }
        None => Err(CliError::Usage("no command given, see `mibgen --help`".to_string())),
    }
}

/// Load settings and apply the command line source overrides.
fn load_settings(cli: &Cli, source: &SourceArgs) -> CliResult<Settings> {
    let mut settings = Settings::load(cli.config.as_deref())?;
    if let Some(mib) = &source.mib {
        settings.mib.path = Some(mib.clone());
    }
    if let Some(module) = &source.module {
        settings.mib.module = Some(module.clone());
    }
    debug!("settings: {:?}", settings);
    Ok(settings)
}

fn container_and_request(
    cli: &Cli,
    source: &SourceArgs,
) -> CliResult<(ServiceContainer, GenerateRequest)> {
    let settings = load_settings(cli, source)?;
    let request = GenerateRequest::from_settings(&settings, source.dump_file.as_deref())?;
    Ok((ServiceContainer::new(), request))
}

#[instrument(skip(cli))]
fn cmd_generate(
    cli: &Cli,
    source: &SourceArgs,
    output_path: Option<&Path>,
    stdout: bool,
) -> CliResult<i32> {
    let (container, mut request) = container_and_request(cli, source)?;
    if let Some(path) = output_path {
        request.output = Some(path.to_path_buf());
    }
    if stdout {
        request.output = None;
    }

    let report = container.generator.generate(&request)?;
    match &report.output {
        Some(path) => {
            output::success(&format!(
                "generated {} ({} classes, {} scalars)",
                path.display(),
                report.classes,
                report.scalars
            ));
        }
        None => output::info(&report.source.trim_end()),
    }
    Ok(exitcode::OK)
}

#[instrument(skip(cli))]
fn cmd_check(cli: &Cli, source: &SourceArgs, file: Option<&Path>) -> CliResult<i32> {
    let (container, request) = container_and_request(cli, source)?;
    let path: PathBuf = match file.map(Path::to_path_buf).or_else(|| request.output.clone()) {
        Some(path) => path,
        None => {
            return Err(CliError::InvalidArgs(
                "no file to check: pass a path or set generator.output".to_string(),
            ))
        }
    };

    match container.generator.check(&request, &path)? {
        Freshness::Fresh => {
            output::success(&format!("{} is up to date", path.display()));
            Ok(exitcode::OK)
        }
        Freshness::Stale => {
            output::failure(&format!("{} is stale, run `mibgen generate`", path.display()));
            Ok(exitcode::STALE)
        }
        Freshness::Missing => {
            output::failure(&format!("{} does not exist", path.display()));
            Ok(exitcode::STALE)
        }
    }
}

#[instrument(skip(cli))]
fn cmd_tree(cli: &Cli, source: &SourceArgs) -> CliResult<i32> {
    let (container, request) = container_and_request(cli, source)?;
    let (module, forest) = container.generator.forest(&request)?;

    output::info(&forest_tree(module.as_deref().unwrap_or("mib"), &forest));
    Ok(exitcode::OK)
}

/// Render the reconciled forest for terminal display.
pub fn forest_tree(label: &str, forest: &Forest) -> Tree<String> {
    let mut root = Tree::new(label.to_string());
    for item in forest.roots() {
        root.push(item_tree(item));
    }
    root
}

fn item_tree(item: &TreeItem) -> Tree<String> {
    match item {
        TreeItem::Branch(branch) => branch_tree(branch),
        TreeItem::Scalar(scalar) => Tree::new(format!("{} [{}]", scalar, scalar.access)),
    }
}

fn branch_tree(branch: &Branch) -> Tree<String> {
    let mut node = Tree::new(format!("{} ({})", branch.name, branch.oid));
    for leaf in branch.leaves() {
        node.push(Tree::new(format!("{} [{}]", leaf, leaf.access)));
    }
    for child in branch.children() {
        node.push(item_tree(child));
    }
    node
}

fn cmd_config(cli: &Cli, command: &ConfigCommands) -> CliResult<i32> {
    let container = ServiceContainer::new();
    match command {
        ConfigCommands::Show => {
            let settings = Settings::load(cli.config.as_deref())?;
            output::info(&settings.to_toml()?);
        }
        ConfigCommands::Path => {
            match global_config_path() {
                Some(path) => {
                    let status = if container.fs.exists(&path) { "exists" } else { "not found" };
                    output::action("Global", &format!("{} ({})", path.display(), status));
                }
                None => output::warning("cannot determine global config directory"),
            }
            let local = cli
                .config
                .clone()
                .unwrap_or_else(|| project_config_path(Path::new(".")));
            let status = if container.fs.exists(&local) { "exists" } else { "not found" };
            output::action("Project", &format!("{} ({})", local.display(), status));
        }
        ConfigCommands::Init { global, force } => {
            let path = if *global {
                global_config_path().ok_or_else(|| {
                    CliError::from(ApplicationError::Config {
                        message: "cannot determine global config directory".to_string(),
                    })
                })?
            } else {
                cli.config
                    .clone()
                    .unwrap_or_else(|| project_config_path(Path::new(".")))
            };

            if container.fs.exists(&path) && !*force {
                return Err(CliError::Usage(format!(
                    "{} already exists, use --force to overwrite",
                    path.display()
                )));
            }
            container
                .fs
                .write_atomic(&path, &Settings::template())
                .map_err(|e| InfraError::io(format!("write {}", path.display()), e))?;
            output::success(&format!("created {}", path.display()));
        }
    }
    Ok(exitcode::OK)
}
