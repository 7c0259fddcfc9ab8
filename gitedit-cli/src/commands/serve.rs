use anyhow::Result;
use colored::Colorize;
use gitedit_server::{resolve_api_key, GitEditServer, ServerConfig};
use std::net::SocketAddr;
use std::path::PathBuf;

pub struct ServeArgs {
    pub root: Option<PathBuf>,
    pub bind: Option<SocketAddr>,
    pub config: Option<PathBuf>,
    pub api_key: Option<String>,
    pub no_explain: bool,
}

pub async fn run(args: ServeArgs) -> Result<()> {
    let mut config = ServerConfig::load(args.config.as_deref())?;

    if let Some(root) = args.root {
        config.root = root;
    }
    if let Some(bind) = args.bind {
        config.bind = bind;
    }
    if args.no_explain {
        config.explain = false;
    }

    let api_key = resolve_api_key(args.api_key)?;
    let bind = config.bind;
    let model = config.openai.model.clone();

    let server = GitEditServer::with_openai(config, api_key)?;

    println!("{}", "🚀 Starting gitedit server...".bold().cyan());
    println!("   {}: {:?}", "Repository".bold(), server.root());
    println!("   {}: {}", "Model".bold(), model);
    println!(
        "   {}: {}",
        "API Server".bold(),
        format!("http://{}", bind).green()
    );
    println!();
    println!("{}", "Press Ctrl+C to stop".dimmed());
    println!();

    server.serve().await?;

    Ok(())
}
