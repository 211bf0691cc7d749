//! CLI entry point for the Quire backend (for dev and testing).

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use quire_core::{
    app_data_dir, build_index, get_catalog_path, init_logging, set_catalog_path, status,
    try_load_config, Assistant, BuildStats, Config, OllamaClient,
};
use serde::Serialize;
use tokio::io::{AsyncBufReadExt, BufReader};

#[derive(Parser)]
#[command(name = "quire")]
#[command(about = "Quire: ask questions about a product catalog")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(clap::Subcommand)]
enum Commands {
    /// Show backend status (for dev).
    Status,
    /// Show where Quire stores its config (app data directory).
    DataDir,
    /// Print the effective config as JSON.
    Config,
    /// Remember which catalog CSV to use.
    SetCatalog {
        #[arg(value_name = "PATH")]
        path: PathBuf,
    },
    /// Build the index from the catalog and report what went in.
    Index {
        /// Catalog CSV (defaults to the configured one).
        #[arg(long, value_name = "PATH")]
        catalog: Option<PathBuf>,
    },
    /// Answer a single question.
    Ask {
        #[arg(value_name = "QUESTION")]
        question: String,
        #[arg(long, value_name = "PATH")]
        catalog: Option<PathBuf>,
    },
    /// Answer questions read from stdin, one per line.
    Chat {
        #[arg(long, value_name = "PATH")]
        catalog: Option<PathBuf>,
    },
}

#[derive(Serialize)]
struct IndexReport<'a> {
    catalog: &'a str,
    #[serde(flatten)]
    stats: BuildStats,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    let loaded = try_load_config();
    let config = loaded.as_ref().cloned().unwrap_or_default();
    if let Err(e) = init_logging(&config.log) {
        eprintln!("Warning: {}", e);
    }
    if let Err(e) = &loaded {
        tracing::warn!(error = %e, "using default config");
    }

    let result = match cli.command.unwrap_or(Commands::Status) {
        Commands::Status => {
            println!("Quire backend");
            println!("  core: {}", status());
            Ok(())
        }
        Commands::DataDir => match app_data_dir() {
            Some(p) => {
                println!("{}", p.display());
                Ok(())
            }
            None => Err("Could not determine app data directory.".to_string()),
        },
        Commands::Config => serde_json::to_string_pretty(&config)
            .map(|s| println!("{}", s))
            .map_err(|e| e.to_string()),
        Commands::SetCatalog { path } => set_catalog_path(&path)
            .map(|()| println!("Catalog set to {}", path.display()))
            .map_err(|e| e.to_string()),
        Commands::Index { catalog } => index(&config, catalog).await,
        Commands::Ask { question, catalog } => ask(&config, catalog, &question).await,
        Commands::Chat { catalog } => chat(&config, catalog).await,
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn catalog_path(flag: Option<PathBuf>) -> Result<PathBuf, String> {
    flag.or_else(get_catalog_path)
        .ok_or_else(|| "no catalog given; pass --catalog or run `quire set-catalog`".to_string())
}

async fn index(config: &Config, catalog: Option<PathBuf>) -> Result<(), String> {
    let path = catalog_path(catalog)?;
    let client = OllamaClient::from_config(&config.ollama).map_err(|e| e.to_string())?;
    let built = build_index(&path, &client, config.index.dimension)
        .await
        .map_err(|e| e.to_string())?;
    let catalog = path.to_string_lossy();
    let report = IndexReport {
        catalog: &catalog,
        stats: built.stats(),
    };
    let json = serde_json::to_string_pretty(&report).map_err(|e| e.to_string())?;
    println!("{}", json);
    Ok(())
}

async fn start(config: &Config, catalog: Option<PathBuf>) -> Result<Assistant, String> {
    let path = catalog_path(catalog)?;
    let client = Arc::new(OllamaClient::from_config(&config.ollama).map_err(|e| e.to_string())?);
    Assistant::start(&path, client.clone(), client, config)
        .await
        .map_err(|e| e.to_string())
}

async fn answer_with_deadline(
    assistant: &Assistant,
    config: &Config,
    question: &str,
) -> Result<String, String> {
    let deadline = Duration::from_secs(config.query_timeout_secs);
    match tokio::time::timeout(deadline, assistant.generate_answer(question)).await {
        Ok(answer) => answer.map_err(|e| e.to_string()),
        Err(_) => Err(format!("no answer within {}s", config.query_timeout_secs)),
    }
}

async fn ask(config: &Config, catalog: Option<PathBuf>, question: &str) -> Result<(), String> {
    let assistant = start(config, catalog).await?;
    let answer = answer_with_deadline(&assistant, config, question).await?;
    println!("{}", answer);
    Ok(())
}

async fn chat(config: &Config, catalog: Option<PathBuf>) -> Result<(), String> {
    let assistant = start(config, catalog).await?;
    println!("Indexed {} item(s). Ask away (Ctrl+D to quit).", assistant.catalog().len());
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await.map_err(|e| e.to_string())? {
        let question = line.trim();
        if question.is_empty() {
            continue;
        }
        match answer_with_deadline(&assistant, config, question).await {
            Ok(answer) => println!("{}\n", answer),
            Err(e) => {
                tracing::error!(error = %e, "question failed");
                eprintln!("Error: {}", e);
            }
        }
    }
    Ok(())
}
