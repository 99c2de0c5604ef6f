use std::collections::BTreeSet;
use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use ehb_roadmap::client::RoadmapClient;
use ehb_roadmap::config::Config;
use ehb_roadmap::models::{Dataset, Priority, Status};
use ehb_roadmap::search::{SearchFilters, SearchResult};
use ehb_roadmap::{api, db, mcp};

#[derive(Parser)]
#[command(name = "ehbr")]
#[command(about = "Roadmap search and agent state service for the EHB platform")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP API server
    Serve {
        /// Port for HTTP API (defaults to the configured port)
        #[arg(short, long)]
        port: Option<u16>,
    },
    /// Start MCP server via stdio
    Mcp,
    /// Search the roadmap
    Search {
        query: String,

        /// Boost records with this status
        #[arg(long)]
        status: Option<Status>,

        /// Boost records with this priority
        #[arg(long)]
        priority: Option<Priority>,

        /// Boost records carrying this tag (repeatable)
        #[arg(long = "tag")]
        tags: Vec<String>,

        /// Query a running server instead of the local database
        #[arg(long)]
        remote: bool,

        /// Print results as JSON
        #[arg(long)]
        json: bool,
    },
    /// Print the roadmap as a tree
    Tree,
    /// Write the dataset to a JSON file
    Export { path: PathBuf },
    /// Replace the dataset with the contents of a JSON file
    Import { path: PathBuf },
    /// Seed the built-in roadmap into an empty database
    Seed,
    /// Show the effective configuration
    Config {
        /// Write it to the config file
        #[arg(long)]
        save: bool,
    },
}

/// Initialize tracing with output to stderr (for MCP mode) or stdout
fn init_tracing(use_stderr: bool) {
    let filter = tracing_subscriber::EnvFilter::new(
        std::env::var("RUST_LOG").unwrap_or_else(|_| "ehb_roadmap=debug,tower_http=debug".into()),
    );

    if use_stderr {
        // stdout is the MCP protocol channel
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }
}

/// Open the configured database and bring it up to date.
fn open_database(config: &Config) -> anyhow::Result<db::Database> {
    let db = match &config.database_path {
        Some(path) => db::Database::open(path.clone())?,
        None => db::Database::open_default()?,
    };
    db.migrate()?;
    if config.seed_on_start {
        db.seed_default()?;
    }
    Ok(db)
}

async fn serve(config: &Config, port: u16) -> anyhow::Result<()> {
    tracing::info!("Starting EHB Roadmap server on port {}", port);

    let db = open_database(config)?;
    let app = api::create_router(db);

    let listener = tokio::net::TcpListener::bind(format!("127.0.0.1:{}", port)).await?;
    tracing::info!("EHB Roadmap server listening on http://127.0.0.1:{}", port);

    axum::serve(listener, app).await?;
    Ok(())
}

fn print_results(results: &[SearchResult]) {
    if results.is_empty() {
        println!("No matches.");
        return;
    }
    for result in results {
        println!(
            "{:>5.2}  {:<8} {:<24} {}",
            result.score,
            result.kind.as_str(),
            result.item.id(),
            result.item.title()
        );
        for matched in &result.matches {
            println!("       {}", matched);
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let use_stderr = matches!(cli.command, Some(Commands::Mcp));
    init_tracing(use_stderr);

    let config = Config::load();

    match cli.command {
        Some(Commands::Serve { port }) => {
            serve(&config, port.unwrap_or(config.port)).await?;
        }
        Some(Commands::Mcp) => {
            let db = open_database(&config)?;
            mcp::run_stdio_server(db).await?;
        }
        Some(Commands::Search {
            query,
            status,
            priority,
            tags,
            remote,
            json,
        }) => {
            let filters = SearchFilters {
                status,
                priority,
                tags: tags.into_iter().collect::<BTreeSet<_>>(),
                date_range: None,
            };

            let results = if remote {
                RoadmapClient::new(&config.server_url)
                    .search(&query, &filters)
                    .await
                    .with_context(|| format!("Search against {} failed", config.server_url))?
            } else {
                open_database(&config)?.search(&query, &filters)?
            };

            if json {
                println!("{}", serde_json::to_string_pretty(&results)?);
            } else {
                print_results(&results);
            }
        }
        Some(Commands::Tree) => {
            let db = open_database(&config)?;
            print!("{}", mcp::render_roadmap(&db.list_modules()?));
        }
        Some(Commands::Export { path }) => {
            let db = open_database(&config)?;
            let dataset = db.load_dataset()?;
            std::fs::write(&path, dataset.to_json()?)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            println!(
                "Exported {} records to {}",
                dataset.record_count(),
                path.display()
            );
        }
        Some(Commands::Import { path }) => {
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            let dataset = Dataset::from_json(&content)
                .with_context(|| format!("Invalid dataset in {}", path.display()))?;

            let db = open_database(&Config {
                seed_on_start: false,
                ..config
            })?;
            db.replace_dataset(&dataset)?;
            println!(
                "Imported {} records from {}",
                dataset.record_count(),
                path.display()
            );
        }
        Some(Commands::Seed) => {
            let db = open_database(&Config {
                seed_on_start: false,
                ..config
            })?;
            if db.seed_default()? {
                println!("Seeded the built-in roadmap.");
            } else {
                println!("Database already holds a roadmap; nothing to seed.");
            }
        }
        Some(Commands::Config { save }) => {
            println!("{}", serde_json::to_string_pretty(&config)?);
            if save {
                config.save()?;
                println!("Saved.");
            }
        }
        None => {
            let port = config.port;
            serve(&config, port).await?;
        }
    }

    Ok(())
}
