//! Command dispatch

use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::CommandFactory;
use clap_complete::generate;
use tracing::{debug, instrument};

use crate::cli::args::{Cli, Commands, ConfigCommands, SessionCommands};
use crate::cli::error::{CliError, CliResult};
use crate::cli::output;
use crate::config::{global_config_path, Settings};
use crate::domain::{read_events, serialize, FileKind, StructureBuilder, Workspace};
use crate::infrastructure::di::ServiceContainer;
use crate::infrastructure::{FileWatcher, InfraError, WatchEvent};
use crate::tree_traits::TreeNodeConvert;
use crate::util::path::display_name;

const WATCH_POLL: Duration = Duration::from_millis(500);
/// How long a removed file may take to reappear after a rename-save
const REPLACE_GRACE: Duration = Duration::from_millis(200);

pub fn execute_command(cli: &Cli) -> CliResult<()> {
    let Some(command) = &cli.command else {
        return Err(CliError::Usage(
            "no command given, see `stree --help`".to_string(),
        ));
    };

    if let Commands::Completion { shell } = command {
        let mut cmd = Cli::command();
        let name = cmd.get_name().to_string();
        generate(*shell, &mut cmd, name, &mut io::stdout());
        return Ok(());
    }

    let settings = Settings::load(cli.config.as_deref())?;
    let container = ServiceContainer::new(settings);

    match command {
        Commands::Show { files, session } => _show(&container, files, *session),
        Commands::Format { file, write } => _format(&container, file, *write),
        Commands::New { path } => _new(&container, path),
        Commands::Remove { file, path, purge } => _remove(&container, file, path, *purge),
        Commands::Session { command } => _session(&container, command),
        Commands::Watch { file } => _watch(&container, file),
        Commands::Config { command } => _config(&container, cli.config.as_deref(), command),
        Commands::Completion { .. } => Ok(()),
    }
}

#[instrument(skip(container))]
fn _show(
    container: &ServiceContainer,
    files: &[PathBuf],
    session: bool,
) -> CliResult<()> {
    let service = container.workspace_service();
    let mut workspace = Workspace::new();

    if session {
        let opened = service.restore_session(&mut workspace)?;
        debug!("restored {opened} session file(s)");
    }
    for file in files {
        if container.fs.is_dir(file) {
            service.add_directory(&mut workspace, file)?;
        } else {
            service.add_file(&mut workspace, file)?;
        }
    }

    if workspace.is_empty() {
        output::warning("nothing to show");
        return Ok(());
    }
    output::info(&workspace.render());
    Ok(())
}

/// Parse errors are reported instead of recovered, so a broken file is
/// never overwritten with an empty document.
#[instrument(skip(container))]
fn _format(container: &ServiceContainer, file: &Path, write: bool) -> CliResult<()> {
    let service = container.workspace_service();
    if service.classify(file)? != FileKind::St {
        return Err(CliError::InvalidArgs(format!(
            "not an ST file: {}",
            file.display()
        )));
    }

    let source = container
        .fs
        .read_to_string(file)
        .map_err(|e| InfraError::io(format!("read {}", file.display()), e))?;
    let events = read_events(&source)?;
    let name = display_name(file, &container.settings.default_display_name);
    let document = StructureBuilder::new(name).build(events, Some(file.to_path_buf()));
    let text = serialize(&document)?;

    if write {
        container
            .fs
            .write(file, &text)
            .map_err(|e| InfraError::io(format!("write {}", file.display()), e))?;
        output::action("Formatted", &file.display());
    } else {
        output::info(&text);
    }
    Ok(())
}

#[instrument(skip(container))]
fn _new(container: &ServiceContainer, path: &Path) -> CliResult<()> {
    let service = container.workspace_service();
    let mut workspace = Workspace::new();
    service.new_st_file(&mut workspace, path)?;
    let created = service.entry_path(&workspace, 0)?;
    output::success(&format!("created {}", created.display()));
    Ok(())
}

#[instrument(skip(container))]
fn _remove(
    container: &ServiceContainer,
    file: &Path,
    node_path: &[usize],
    purge: bool,
) -> CliResult<()> {
    if purge && !node_path.is_empty() {
        return Err(CliError::InvalidArgs(
            "--purge only applies when removing the whole file".to_string(),
        ));
    }

    let service = container.workspace_service();
    let mut workspace = Workspace::new();
    service.add_file(&mut workspace, file)?;
    let row = service
        .entry_row(&workspace, file)
        .ok_or_else(|| CliError::InvalidArgs(format!("cannot open {}", file.display())))?;
    let entry_path = service.entry_path(&workspace, row)?;

    let outcome = container
        .deletion_service()
        .remove(&mut workspace, row, node_path, purge);
    if !outcome.ok {
        return Err(CliError::Removal(outcome.message));
    }

    if node_path.is_empty() && service.forget(&entry_path)? {
        debug!("dropped {} from session", entry_path.display());
    }
    output::success(&outcome);
    Ok(())
}

#[instrument(skip(container))]
fn _session(container: &ServiceContainer, command: &SessionCommands) -> CliResult<()> {
    let service = container.workspace_service();
    match command {
        SessionCommands::List => {
            let session = service.session()?;
            if session.is_empty() {
                output::info(&"session is empty");
                return Ok(());
            }
            output::header(&"Session");
            for entry in &session.files {
                let missing = if container.fs.is_file(&entry.path) {
                    ""
                } else {
                    " (missing)"
                };
                output::detail(&format!(
                    "{:<8} {}{}",
                    format!("{:?}", entry.kind).to_lowercase(),
                    entry.path.display(),
                    missing
                ));
            }
        }
        SessionCommands::Add { files } => {
            let added = service.remember(files)?;
            output::action("Added", &format!("{added} file(s)"));
        }
        SessionCommands::Forget { file } => {
            if service.forget(file)? {
                output::action("Forgot", &file.display());
            } else {
                output::warning(&format!("not in session: {}", file.display()));
            }
        }
        SessionCommands::Clear => {
            service.clear_session()?;
            output::success(&"session cleared");
        }
    }
    Ok(())
}

/// Reload and re-print the file on every change until it disappears.
/// A file that is replaced within `REPLACE_GRACE` keeps being watched.
#[instrument(skip(container))]
fn _watch(container: &ServiceContainer, file: &Path) -> CliResult<()> {
    let service = container.workspace_service();
    let mut workspace = Workspace::new();
    service.add_file(&mut workspace, file)?;
    let path = service.entry_path(&workspace, 0)?;

    let mut watcher = FileWatcher::new()?;
    watcher.watch(&path)?;
    output::header(&format!("watching {}", path.display()));

    loop {
        match watcher.recv_timeout(WATCH_POLL)? {
            Some(WatchEvent::Changed(changed)) => {
                output::action("changed", &changed.display());
                service.reload(&mut workspace, &changed)?;
                output::info(&workspace.render());
            }
            Some(WatchEvent::Removed(removed)) => {
                if watcher.rewatch_if_replaced(&removed, REPLACE_GRACE)? {
                    output::action("replaced", &removed.display());
                    service.reload(&mut workspace, &removed)?;
                    output::info(&workspace.render());
                    continue;
                }
                output::warning(&format!("removed: {}", removed.display()));
                return Ok(());
            }
            None => continue,
        }
    }
}

#[instrument(skip(container))]
fn _config(
    container: &ServiceContainer,
    explicit: Option<&Path>,
    command: &ConfigCommands,
) -> CliResult<()> {
    match command {
        ConfigCommands::Show => output::info(&container.settings.to_toml()?),
        ConfigCommands::Init => output::info(&Settings::template()),
        ConfigCommands::Path => {
            let global = explicit.map(Path::to_path_buf).or_else(global_config_path);
            match global {
                Some(path) => output::action("config", &path.display()),
                None => output::warning("no config directory on this platform"),
            }
            output::action("session", &container.settings.session_file.display());
        }
    }
    Ok(())
}
