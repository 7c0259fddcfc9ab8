use anyhow::Result;
use clap::{Parser, Subcommand};
use std::net::SocketAddr;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod commands;

use commands::{files, modify, serve, show};

#[derive(Parser)]
#[command(name = "gitedit")]
#[command(version, about = "Serve a git repository to remote AI-assisted editors", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the API server for a repository
    Serve {
        /// Repository root (overrides the config file)
        root: Option<PathBuf>,

        /// Address to listen on (overrides the config file)
        #[arg(short, long)]
        bind: Option<SocketAddr>,

        /// TOML config file
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// API key for the rewrite service
        #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
        api_key: Option<String>,

        /// Skip the rationale request after each rewrite
        #[arg(long)]
        no_explain: bool,
    },

    /// List tracked files of a repository
    Files {
        /// Repository root (defaults to current directory)
        #[arg(default_value = ".")]
        root: PathBuf,
    },

    /// Show the state and content of a file
    Show {
        /// File path relative to the repository root
        path: String,

        /// Repository root
        #[arg(short, long, default_value = ".")]
        root: PathBuf,
    },

    /// Ask a running server to rewrite part of a file
    Modify {
        /// File path relative to the repository root
        path: String,

        /// What to change
        #[arg(short, long)]
        instruction: String,

        /// First line of the selection (0-based)
        #[arg(long, default_value = "0")]
        start: i64,

        /// End of the selection, exclusive; negative means end of file
        #[arg(long, default_value = "-1", allow_hyphen_values = true)]
        end: i64,

        /// Server URL
        #[arg(short, long, default_value = "http://127.0.0.1:50051")]
        server: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Serve {
            root,
            bind,
            config,
            api_key,
            no_explain,
        } => {
            serve::run(serve::ServeArgs {
                root,
                bind,
                config,
                api_key,
                no_explain,
            })
            .await?;
        }
        Commands::Files { root } => {
            files::run(root)?;
        }
        Commands::Show { path, root } => {
            show::run(path, root)?;
        }
        Commands::Modify {
            path,
            instruction,
            start,
            end,
            server,
        } => {
            modify::run(path, instruction, start, end, server).await?;
        }
    }

    Ok(())
}
