//! # OID Explorer CLI (`oidx`)
//!
//! The `oidx` binary initializes the database, answers lookups from the
//! command line, and runs the HTTP API.
//!
//! ## Usage
//!
//! ```bash
//! oidx --config ./config/oidx.toml <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `oidx init` | Create the SQLite database and schema |
//! | `oidx get <oid>` | Full record with descriptions and parent |
//! | `oidx relation <oid>` | Tree from the root down to the node's children |
//! | `oidx parent <oid>` | Parent node |
//! | `oidx siblings <oid>` | Other children of the parent |
//! | `oidx children <oid>` | Direct children |
//! | `oidx search [keyword]` | Search by name and/or oid |
//! | `oidx serve` | Start the HTTP API |

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use oid_explorer::{config, logging, lookup, migrate, server};

/// OID Explorer CLI: a read-only lookup service for the OID namespace.
///
/// All commands accept a `--config` flag pointing to a TOML configuration
/// file.
#[derive(Parser)]
#[command(
    name = "oidx",
    about = "OID Explorer: look up object identifiers, their descriptions and relations",
    version
)]
struct Cli {
    /// Path to configuration file (TOML).
    #[arg(
        long,
        global = true,
        env = "OIDX_CONFIG",
        default_value = "./config/oidx.toml"
    )]
    config: PathBuf,

    /// Log level or `tracing` filter directive. `RUST_LOG` overrides it.
    #[arg(
        long,
        short = 'l',
        global = true,
        env = "OIDX_LOG_LEVEL",
        default_value = "warn"
    )]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize the database schema.
    ///
    /// Creates the SQLite database file and the oids, mibs and
    /// oid_descriptions tables. Safe to run repeatedly.
    Init,

    /// Show the full record of an oid.
    Get {
        oid: String,
        /// Print JSON instead of text.
        #[arg(long)]
        json: bool,
    },

    /// Show the tree from the namespace root down to the oid's children.
    Relation {
        oid: String,
        #[arg(long)]
        json: bool,
    },

    /// Show the parent of an oid.
    Parent {
        oid: String,
        #[arg(long)]
        json: bool,
    },

    /// List the other children of the oid's parent.
    Siblings {
        oid: String,
        #[arg(long)]
        json: bool,
    },

    /// List the direct children of an oid.
    Children {
        oid: String,
        #[arg(long)]
        json: bool,
    },

    /// Search oids by name and/or path.
    ///
    /// Without a keyword, lists every oid ordered by path.
    Search {
        keyword: Option<String>,

        /// Field to match: `oid`, `name`, or `any`.
        #[arg(long = "type", default_value = "any")]
        kind: String,

        /// Maximum number of results (capped by `[search].max_limit`).
        #[arg(long, allow_negative_numbers = true)]
        limit: Option<i64>,

        #[arg(long)]
        json: bool,
    },

    /// Start the HTTP API.
    ///
    /// Binds to `[server].bind` unless `--bind` is given.
    Serve {
        #[arg(long)]
        bind: Option<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    logging::init(&cli.log_level)?;

    let mut cfg = config::load_config(&cli.config)?;

    match cli.command {
        Commands::Init => {
            migrate::run_migrations(&cfg).await?;
            println!("Database initialized successfully.");
        }
        Commands::Get { oid, json } => {
            lookup::run_get(&cfg, &oid, json).await?;
        }
        Commands::Relation { oid, json } => {
            lookup::run_relation(&cfg, &oid, json).await?;
        }
        Commands::Parent { oid, json } => {
            lookup::run_parent(&cfg, &oid, json).await?;
        }
        Commands::Siblings { oid, json } => {
            lookup::run_siblings(&cfg, &oid, json).await?;
        }
        Commands::Children { oid, json } => {
            lookup::run_children(&cfg, &oid, json).await?;
        }
        Commands::Search {
            keyword,
            kind,
            limit,
            json,
        } => {
            lookup::run_search(&cfg, keyword, &kind, limit, json).await?;
        }
        Commands::Serve { bind } => {
            if let Some(bind) = bind {
                cfg.server.bind = bind;
            }
            server::run_server(&cfg).await?;
        }
    }

    Ok(())
}
