use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use invite_studio::config::{ConfigError, StudioConfig, normalize_api_url};
use invite_studio::publish;
use invite_studio::store::{HttpStore, StoreError, TemplateStore};
use serde::Serialize;
use template_canvas::engine::{Action, EngineCore, NoticeLevel};
use template_canvas::wire::{AccessType, TemplateExport};

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("failed to read {path}: {source}")]
    Read { path: String, source: std::io::Error },
    #[error("invalid JSON payload: {0}")]
    InvalidJson(#[from] serde_json::Error),
    #[error("{0}")]
    SaveFailed(String),
}

#[derive(Parser, Debug)]
#[command(name = "invite-studio", about = "Invitation template store CLI")]
struct Cli {
    /// Store base URL.
    #[arg(long, env = "STUDIO_API_URL")]
    api_url: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List stored templates.
    List {
        #[arg(long, default_value_t = 1)]
        page: u32,
        #[arg(long, default_value_t = 12)]
        limit: u32,
    },
    /// Print a stored template as the viewer resolves it.
    View {
        template_id: String,
        /// Viewer width in CSS pixels.
        #[arg(long, env = "STUDIO_VIEWPORT_WIDTH")]
        width: Option<u32>,
        /// Emit HTML instead of the JSON render tree.
        #[arg(long, default_value_t = false)]
        html: bool,
    },
    /// Save an exported editor document as a new template.
    Import {
        file: PathBuf,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        access: Option<AccessType>,
    },
    Delete {
        template_id: String,
    },
    Duplicate {
        template_id: String,
    },
    /// Upload an image file and print its URL.
    Upload {
        file: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<(), CliError> {
    if let Err(e) = dotenvy::dotenv() {
        if !e.not_found() {
            eprintln!("ignoring .env: {e}");
        }
    }
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let mut config = StudioConfig::from_env()?;
    if let Some(url) = &cli.api_url {
        config.api_url = normalize_api_url(url)?;
    }
    let store = HttpStore::from_config(&config)?;
    tracing::debug!(api_url = store.base_url(), "store configured");

    match cli.command {
        Command::List { page, limit } => {
            let templates = store.list_templates(page, limit).await?;
            print_json(&templates)
        }
        Command::View { template_id, width, html } => {
            let width = width.unwrap_or(config.viewport_width);
            let rendered = publish::render(&store, &template_id, f64::from(width)).await?;
            if html {
                println!("{}", rendered.to_html());
                Ok(())
            } else {
                print_json(&rendered)
            }
        }
        Command::Import { file, name, access } => run_import(&store, &file, name, access).await,
        Command::Delete { template_id } => {
            store.delete_template_by_id(&template_id).await?;
            println!("deleted {template_id}");
            Ok(())
        }
        Command::Duplicate { template_id } => {
            let new_id = store.duplicate_template(&template_id).await?;
            println!("{new_id}");
            Ok(())
        }
        Command::Upload { file } => {
            let bytes = read_file(&file)?;
            let file_name = file.file_name().map_or_else(|| "upload".to_string(), |n| n.to_string_lossy().into_owned());
            let url = store.upload_image(&file_name, bytes).await?;
            println!("{url}");
            Ok(())
        }
    }
}

async fn run_import(
    store: &dyn TemplateStore,
    file: &Path,
    name: Option<String>,
    access: Option<AccessType>,
) -> Result<(), CliError> {
    let raw = read_file(file)?;
    let mut export: TemplateExport = serde_json::from_slice(&raw)?;
    if let Some(name) = name {
        export.meta.name = name;
    }
    if let Some(access) = access {
        export.meta.access_type = access;
    }

    let mut core = EngineCore::new();
    core.load_export(export);
    let actions = publish::save(store, &mut core).await;
    match &core.template_id {
        Some(id) => {
            tracing::info!(template_id = %id, sections = core.doc.len(), "import complete");
            println!("{id}");
            Ok(())
        }
        None => Err(CliError::SaveFailed(failure_message(&actions))),
    }
}

fn failure_message(actions: &[Action]) -> String {
    actions
        .iter()
        .find_map(|a| match a {
            Action::Notify(n) if n.level != NoticeLevel::Info => Some(n.message.clone()),
            _ => None,
        })
        .unwrap_or_else(|| "save failed".to_string())
}

fn read_file(path: &Path) -> Result<Vec<u8>, CliError> {
    std::fs::read(path).map_err(|source| CliError::Read { path: path.display().to_string(), source })
}

fn print_json<T: Serialize>(value: &T) -> Result<(), CliError> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
