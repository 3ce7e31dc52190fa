use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use studio_client::{
    ClientConfig, ControllerOptions, HttpBackend, Outcome, PromptController, StudioBackend,
};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use url::Url;

mod terminal;

use terminal::TerminalSurface;

#[derive(Parser)]
#[command(name = "studio-cli")]
#[command(about = "Generate, refine, save and promote browser games from a prompt")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file (JSON)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Studio server base URL
    #[arg(long, global = true)]
    api_url: Option<String>,

    /// Request timeout in seconds
    #[arg(long, global = true)]
    timeout: Option<u64>,

    /// Where the sandboxed preview page is written
    #[arg(long, global = true, default_value = "studio-preview.html")]
    preview: PathBuf,

    /// Open saved games in the system browser
    #[arg(long, global = true)]
    open: bool,

    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Interactive session: each line is a prompt, `:save`, `:trailer` or `:quit`
    Session,

    /// Generate a game, apply refinements in order, optionally save it
    Generate {
        /// Initial prompt
        prompt: String,

        /// Refinement instructions applied after generation
        #[arg(short, long = "refine")]
        refinements: Vec<String>,

        /// Save the final game to the library
        #[arg(long)]
        save: bool,
    },

    /// Render a trailer and upload it to YouTube
    Trailer {
        /// Trailer summary (falls back to a generic arcade summary)
        #[arg(default_value = "")]
        summary: String,
    },

    /// Write a configuration file with default values
    InitConfig {
        /// Output path (defaults to the user config directory)
        output: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)),
        )
        .init();

    match &cli.command {
        Commands::InitConfig { output } => init_config_command(output.clone()),
        Commands::Session => {
            let (controller, surface) = connect(&cli)?;
            session_command(&controller, &surface).await
        }
        Commands::Generate {
            prompt,
            refinements,
            save,
        } => {
            let (controller, surface) = connect(&cli)?;
            generate_command(&controller, &surface, prompt, refinements, *save).await
        }
        Commands::Trailer { summary } => {
            let (controller, surface) = connect(&cli)?;
            trailer_command(&controller, &surface, summary).await
        }
    }
}

fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("studio-cli").join("config.json"))
}

/// File config (explicit path, else the user config dir if present), then
/// command-line overrides
fn resolve_config(cli: &Cli) -> Result<ClientConfig> {
    let mut config = match &cli.config {
        Some(path) => ClientConfig::load(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => match default_config_path().filter(|p| p.exists()) {
            Some(path) => {
                info!("Using config {:?}", path);
                ClientConfig::load(&path)?
            }
            None => ClientConfig::default(),
        },
    };

    if let Some(url) = &cli.api_url {
        config.api_url = url.clone();
    }
    if let Some(secs) = cli.timeout {
        config.timeout_secs = Some(secs);
    }
    if cli.open {
        config.open_browser = true;
    }
    Ok(config)
}

fn connect(cli: &Cli) -> Result<(PromptController, Arc<TerminalSurface>)> {
    let config = resolve_config(cli)?;
    let base_url = Url::parse(&config.api_url)
        .with_context(|| format!("Invalid api_url: {}", config.api_url))?;
    let backend = HttpBackend::new(&config)?;
    info!("Studio server: {} ({})", backend.api_url(), backend.backend_type());

    let surface = Arc::new(TerminalSurface::new(
        cli.preview.clone(),
        base_url,
        config.open_browser,
    ));
    let controller = PromptController::new(Arc::new(backend), surface.clone())
        .with_options(ControllerOptions::from(&config));
    Ok((controller, surface))
}

fn check<T>(outcome: Outcome<T>, action: &str) -> Result<Option<T>> {
    match outcome {
        Outcome::Done(value) => Ok(Some(value)),
        Outcome::Skipped => Ok(None),
        Outcome::Failed(message) => bail!("{} failed: {}", action, message),
    }
}

async fn session_command(controller: &PromptController, surface: &TerminalSurface) -> Result<()> {
    println!("Describe a game to generate it; further lines refine it.");
    println!("Commands: :save  :trailer  :show  :quit");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        match line {
            ":quit" | ":q" => break,
            ":save" => {
                if !controller.has_document() {
                    println!("Nothing to save yet.");
                }
                controller.save().await;
            }
            ":trailer" => {
                controller.generate_trailer().await;
            }
            ":show" => match controller.title() {
                Some(title) => println!("{} -> {}", title, surface.preview_path().display()),
                None if controller.has_document() => {
                    println!("{}", surface.preview_path().display())
                }
                None => println!("Nothing generated yet."),
            },
            prompt => {
                surface.set_prompt(prompt);
                controller.submit().await;
            }
        }
    }

    info!("Session ended");
    Ok(())
}

async fn generate_command(
    controller: &PromptController,
    surface: &TerminalSurface,
    prompt: &str,
    refinements: &[String],
    save: bool,
) -> Result<()> {
    if prompt.trim().is_empty() {
        bail!("Prompt is empty");
    }

    for step in std::iter::once(prompt).chain(refinements.iter().map(String::as_str)) {
        if step.trim().is_empty() {
            warn!("Skipping empty refinement");
            continue;
        }
        surface.set_prompt(step);
        if let Some(mode) = check(controller.submit().await, "Generation")? {
            info!("{} done: {}", mode, step.trim());
        }
    }

    println!("Preview: {}", surface.preview_path().display());

    if save {
        check(controller.save().await, "Save")?;
        if let Some(url) = surface.last_navigation() {
            info!("Saved game at {}", url);
        }
    }
    Ok(())
}

async fn trailer_command(
    controller: &PromptController,
    surface: &TerminalSurface,
    summary: &str,
) -> Result<()> {
    surface.set_prompt(summary);
    if let Some(done) = check(controller.generate_trailer().await, "Trailer")? {
        println!("{}", done.upload.watch_url);
    }
    Ok(())
}

fn init_config_command(output: Option<PathBuf>) -> Result<()> {
    let path = output
        .or_else(default_config_path)
        .context("No config directory available; pass an output path")?;
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    write_default_config(&path)?;
    info!("Config written to {:?}", path);
    println!("{}", serde_json::to_string_pretty(&ClientConfig::default())?);
    Ok(())
}

fn write_default_config(path: &Path) -> Result<()> {
    if path.exists() {
        bail!("{} already exists", path.display());
    }
    ClientConfig::default().save(path)?;
    Ok(())
}
