//! ngxls CLI: activation entry point and user-facing commands.
//!
//! `run` is the activation path: resolve the language server (installing
//! it on demand), start it bound to our stdio, and stay alive until it
//! exits. `install` and `format` are the two user-invocable commands of
//! the integration.

use std::io::Write as _;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use ngxls_bridge::{ActivateOutcome, Bridge, FormatOptions, format_document};
use ngxls_env::{InstallOutcome, SystemProbe, TokioShellRunner, install, resolve_python};
use ngxls_types::{Document, Position, Range, Settings, Ui};

#[derive(Parser)]
#[command(
    name = "ngxls",
    about = "Editor integration for nginx configuration files",
    version
)]
struct Cli {
    /// Path to the ngxls.toml settings file.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Storage root holding the isolated tool environment and logs.
    #[arg(long, global = true)]
    storage_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: CliCommand,
}

#[derive(Subcommand)]
enum CliCommand {
    /// Resolve (or install) the language server and run it as a session.
    Run,
    /// Install or upgrade nginx-language-server and nginxfmt.
    Install {
        /// Skip the confirmation prompt.
        #[arg(long)]
        yes: bool,
    },
    /// Format an nginx configuration file.
    Format {
        file: PathBuf,
        /// Line range `start:end` (zero-indexed, inclusive) instead of
        /// the whole file.
        #[arg(long)]
        range: Option<String>,
        /// Rewrite the file in place instead of printing.
        #[arg(long)]
        write: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let storage_root = resolve_storage_root(cli.storage_dir.clone())?;
    init_tracing(&storage_root);

    let settings = load_settings(cli.config.as_deref(), &storage_root)?;

    match cli.command {
        CliCommand::Run => run(settings, storage_root).await,
        CliCommand::Install { yes } => install_tools(&settings, &storage_root, !yes).await,
        CliCommand::Format { file, range, write } => {
            format_file(&settings, &storage_root, &file, range.as_deref(), write).await
        }
    }
}

/// Initialize tracing to a file under the storage root.
///
/// The server session owns our stdio, so logs must never go to
/// stdout/stderr while it runs; if the log file can't be opened, prefer
/// no logs over corrupting the transport.
fn init_tracing(storage_root: &Path) {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let log_path = storage_root.join("logs").join("ngxls.log");
    let log_file = log_path.parent().and_then(|dir| {
        std::fs::create_dir_all(dir).ok()?;
        std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&log_path)
            .ok()
    });

    if let Some(file) = log_file {
        tracing_subscriber::registry()
            .with(fmt::layer().with_ansi(false).with_writer(std::sync::Mutex::new(file)))
            .with(env_filter)
            .init();
        tracing::info!(path = %log_path.display(), "logging initialized");
    } else {
        tracing_subscriber::registry().with(env_filter).init();
    }
}

/// Host-provided storage root, created if absent.
fn resolve_storage_root(overridden: Option<PathBuf>) -> Result<PathBuf> {
    let root = match overridden {
        Some(path) => path,
        None => dirs::data_dir()
            .context("no data directory for this platform")?
            .join("ngxls"),
    };
    std::fs::create_dir_all(&root)
        .with_context(|| format!("creating storage root {}", root.display()))?;
    Ok(root)
}

/// Settings from the explicit `--config` path, else `<storage>/ngxls.toml`
/// if present, else the documented defaults.
fn load_settings(explicit: Option<&Path>, storage_root: &Path) -> Result<Settings> {
    let path = match explicit {
        Some(path) => path.to_path_buf(),
        None => {
            let default = storage_root.join("ngxls.toml");
            if !default.exists() {
                return Ok(Settings::default());
            }
            default
        }
    };
    let text = std::fs::read_to_string(&path)
        .with_context(|| format!("reading settings {}", path.display()))?;
    toml::from_str(&text).with_context(|| format!("parsing settings {}", path.display()))
}

async fn run(settings: Settings, storage_root: PathBuf) -> Result<()> {
    let ui = ConsoleUi;
    let mut bridge = Bridge::new(settings, storage_root);

    match bridge.activate(&ui).await {
        Ok(ActivateOutcome::Disabled) => {
            tracing::info!("ngxls is disabled in settings");
            Ok(())
        }
        Ok(ActivateOutcome::Started) => {
            let status = bridge.wait().await?;
            tracing::info!(%status, "language server exited");
            bridge.shutdown().await;
            anyhow::ensure!(status.success(), "language server exited with {status}");
            Ok(())
        }
        Err(error) => Err(anyhow::Error::new(error).context("activation failed")),
    }
}

async fn install_tools(settings: &Settings, storage_root: &Path, confirm: bool) -> Result<()> {
    let ui = ConsoleUi;
    let Some(python) = resolve_python(settings.python_path(), true, &SystemProbe) else {
        ui.error("python3/python command not found");
        anyhow::bail!("python3/python command not found");
    };

    match install(&python, storage_root, confirm, &ui, &TokioShellRunner).await? {
        InstallOutcome::Installed => Ok(()),
        InstallOutcome::Cancelled => {
            tracing::info!("install cancelled");
            Ok(())
        }
    }
}

async fn format_file(
    settings: &Settings,
    storage_root: &Path,
    file: &Path,
    range: Option<&str>,
    write: bool,
) -> Result<()> {
    let text = std::fs::read_to_string(file)
        .with_context(|| format!("reading {}", file.display()))?;
    let path = file.canonicalize().unwrap_or_else(|_| file.to_path_buf());
    let document = Document::new(path, "nginx", text);

    let range = range.map(|spec| line_range(&document, spec)).transpose()?;
    let options = FormatOptions {
        configured_path: settings.formatter_command_path(),
        storage_root,
        indent: settings.formatter_indent(),
    };

    let edit = format_document(&document, range, &options, &ConsoleUi, &SystemProbe).await?;
    let updated = document.apply(&edit);

    if write {
        std::fs::write(document.path(), updated)
            .with_context(|| format!("writing {}", document.path().display()))?;
    } else {
        print!("{updated}");
    }
    Ok(())
}

/// Parse `start:end` (zero-indexed, inclusive lines) into a range ending
/// at the last character of the end line.
fn line_range(document: &Document, spec: &str) -> Result<Range> {
    let (start, end) = spec
        .split_once(':')
        .context("range must look like start:end")?;
    let start: u32 = start
        .trim()
        .parse()
        .context("range start is not a line number")?;
    let end: u32 = end
        .trim()
        .parse()
        .context("range end is not a line number")?;
    anyhow::ensure!(start <= end, "range start {start} is past end {end}");
    anyhow::ensure!(
        end < document.line_count(),
        "range end {end} is past the last line"
    );
    let end_len = u32::try_from(document.line(end).chars().count()).unwrap_or(u32::MAX);
    Ok(Range::new(
        Position::new(start, 0),
        Position::new(end, end_len),
    ))
}

/// Console rendition of the host's message and status primitives.
struct ConsoleUi;

impl Ui for ConsoleUi {
    fn info(&self, message: &str) {
        eprintln!("{message}");
    }

    fn warn(&self, message: &str) {
        eprintln!("warning: {message}");
    }

    fn error(&self, message: &str) {
        eprintln!("error: {message}");
    }

    fn confirm(&self, prompt: &str) -> bool {
        eprint!("{prompt} [y/N] ");
        let _ = std::io::stderr().flush();
        let mut answer = String::new();
        if std::io::stdin().read_line(&mut answer).is_err() {
            return false;
        }
        matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
    }

    fn begin_progress(&self, message: &str) {
        eprintln!("{message}");
    }

    fn end_progress(&self) {}
}
