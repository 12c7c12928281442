//! Command dispatch

use std::io;
use std::path::{Path, PathBuf};

use clap::CommandFactory;
use tracing::{debug, instrument};

use crate::application::services::RenderRequest;
use crate::application::FamilyData;
use crate::cli::args::{Cli, Commands, ConfigCommands};
use crate::cli::output;
use crate::cli::{CliError, CliResult};
use crate::config::{global_config_path, local_config_path, Settings};
use crate::domain::{Direction, DocumentFormat, MemberId, PageSize};
use crate::infrastructure::di::ServiceContainer;
use crate::infrastructure::InfraError;
use crate::util::path::{family_dir, family_stem};

pub fn execute_command(cli: &Cli) -> CliResult<()> {
    match &cli.command {
        Some(Commands::Members { file }) => cmd_members(cli, file),
        Some(Commands::Tree { file, root }) => cmd_tree(cli, file, *root),
        Some(Commands::Dot {
            file,
            root,
            direction,
            output,
        }) => cmd_dot(cli, file, *root, *direction, output.as_deref()),
        Some(Commands::Render {
            file,
            roots,
            direction,
            page,
            format,
            output_dir,
            force,
        }) => cmd_render(
            cli,
            file,
            roots,
            RenderOverrides {
                direction: *direction,
                page: *page,
                format: *format,
                output_dir: output_dir.clone(),
                force: *force,
            },
        ),
        Some(Commands::Config { command }) => cmd_config(cli, command),
        Some(Commands::Completion { shell }) => {
            let mut cmd = Cli::command();
            clap_complete::generate(*shell, &mut cmd, "famtree", &mut io::stdout());
            Ok(())
        }
        None => Err(CliError::Usage(
            "no command given, run `famtree --help`".to_string(),
        )),
    }
}

/// Settings for a family file: global, then `.famtree.toml` next to it, then env.
fn load_settings(cli: &Cli, file: &Path) -> CliResult<Settings> {
    let settings = Settings::load(cli.config_dir.as_deref(), Some(&family_dir(file)))?;
    debug!("settings: {:?}", settings);
    Ok(settings)
}

fn load_family(container: &ServiceContainer, file: &Path) -> CliResult<FamilyData> {
    Ok(container.export_service().load(file)?)
}

#[instrument(skip(cli))]
fn cmd_members(cli: &Cli, file: &Path) -> CliResult<()> {
    let container = ServiceContainer::new(load_settings(cli, file)?);
    let family = load_family(&container, file)?;

    output::header(&format!(
        "{} ({} members)",
        file.display(),
        family.members.len()
    ));
    for member in &family.members {
        let mut line = format!("{}  {}", member.id, member.display_name());
        if let Some(span) = member.life_span() {
            line.push_str(&format!("  ({})", span));
        }
        if member.is_root {
            line.push_str("  [root]");
        }
        output::detail(&line);
    }
    Ok(())
}

#[instrument(skip(cli))]
fn cmd_tree(cli: &Cli, file: &Path, root: Option<MemberId>) -> CliResult<()> {
    let container = ServiceContainer::new(load_settings(cli, file)?);
    let service = container.export_service();
    let family = service.load(file)?;

    let root = service.resolve_root(&family, root)?;
    let tree = service.outline(&family, root)?;
    output::info(&tree);
    Ok(())
}

#[instrument(skip(cli))]
fn cmd_dot(
    cli: &Cli,
    file: &Path,
    root: Option<MemberId>,
    direction: Option<Direction>,
    target: Option<&Path>,
) -> CliResult<()> {
    let container = ServiceContainer::new(load_settings(cli, file)?);
    let service = container.export_service();
    let family = service.load(file)?;

    let root = service.resolve_root(&family, root)?;
    let direction = direction.unwrap_or(container.settings.direction);
    let text = service.dot(&family, root, direction)?;

    match target {
        Some(path) => {
            container
                .fs
                .ensure_parent(path)
                .and_then(|_| container.fs.write(path, &text))
                .map_err(|e| InfraError::io(format!("write {}", path.display()), e))?;
            output::action("Wrote", &path.display());
        }
        None => print!("{}", text),
    }
    Ok(())
}

/// Command-line values taking precedence over the settings.
#[derive(Debug)]
struct RenderOverrides {
    direction: Option<Direction>,
    page: Option<PageSize>,
    format: Option<DocumentFormat>,
    output_dir: Option<PathBuf>,
    force: bool,
}

#[instrument(skip(cli))]
fn cmd_render(
    cli: &Cli,
    file: &Path,
    roots: &[MemberId],
    overrides: RenderOverrides,
) -> CliResult<()> {
    let mut settings = load_settings(cli, file)?;
    if overrides.force {
        settings.cache = false;
    }
    let mut request = RenderRequest::from_settings(family_stem(file), &settings);
    if let Some(direction) = overrides.direction {
        request.direction = direction;
    }
    if let Some(page) = overrides.page {
        request.page_size = page;
    }
    if let Some(format) = overrides.format {
        request.format = format;
    }
    if let Some(dir) = overrides.output_dir {
        request.output_dir = dir;
    }

    let container = ServiceContainer::new(settings);
    let service = container.export_service();
    let family = service.load(file)?;

    let roots = if roots.is_empty() {
        vec![service.resolve_root(&family, None)?]
    } else {
        roots.to_vec()
    };

    for rendered in service.render_many(&family, &roots, &request)? {
        if rendered.cached {
            output::unchanged(&format!("{} (up to date)", rendered.path.display()));
        } else {
            output::success(&format!(
                "{} ({} bytes)",
                rendered.path.display(),
                rendered.bytes
            ));
        }
    }
    Ok(())
}

fn cmd_config(cli: &Cli, command: &ConfigCommands) -> CliResult<()> {
    match command {
        ConfigCommands::Show { file } => {
            let dir = file.as_deref().map(family_dir);
            let settings = Settings::load(cli.config_dir.as_deref(), dir.as_deref())?;
            output::info(&settings.to_toml()?);
            Ok(())
        }
        ConfigCommands::Init { local } => {
            let path = match local {
                Some(file) => local_config_path(&family_dir(file)),
                None => global_config_path(cli.config_dir.as_deref()).ok_or_else(|| {
                    CliError::Usage("cannot determine config directory, use -C".to_string())
                })?,
            };
            if path.exists() {
                return Err(CliError::Usage(format!(
                    "config already exists: {}",
                    path.display()
                )));
            }
            let container = ServiceContainer::new(Settings::default());
            container
                .fs
                .ensure_parent(&path)
                .and_then(|_| container.fs.write(&path, &Settings::template()))
                .map_err(|e| InfraError::io(format!("write {}", path.display()), e))?;
            output::action("Created", &path.display());
            Ok(())
        }
        ConfigCommands::Path => {
            output::header("Config files (lowest to highest precedence)");
            match global_config_path(cli.config_dir.as_deref()) {
                Some(path) => output::detail(&format!(
                    "global: {}{}",
                    path.display(),
                    if path.exists() { "" } else { " (not found)" }
                )),
                None => output::warning("no global config directory on this platform"),
            }
            output::detail(&format!(
                "local:  <family file dir>/{}",
                local_config_path(Path::new("")).display()
            ));
            output::detail("env:    FAMTREE_* (e.g. FAMTREE_CONVERTER__COMMAND)");
            Ok(())
        }
    }
}
