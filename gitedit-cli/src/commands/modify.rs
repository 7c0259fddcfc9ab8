use anyhow::Result;
use colored::Colorize;
use gitedit_sdk::GitEditClient;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;
use tracing::debug;

pub async fn run(
    path: String,
    instruction: String,
    start: i64,
    end: i64,
    server: String,
) -> Result<()> {
    debug!(%server, %path, start, end, "Requesting modification");

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(ProgressStyle::with_template("{spinner:.cyan} {msg}")?);
    spinner.set_message(format!("Rewriting {}...", path));
    spinner.enable_steady_tick(Duration::from_millis(100));

    // The SDK client is blocking.
    let result = tokio::task::spawn_blocking(move || {
        let client = GitEditClient::new(server);
        client.modify_code(&path, &instruction, start, end)
    })
    .await?;

    spinner.finish_and_clear();
    let modification = result?;

    println!("{}", "✓ Modification ready".green().bold());
    for file in &modification.modified_files {
        println!("  {}: {}", "File".bold(), file);
    }
    println!();

    if !modification.explanation.is_empty() {
        println!("{}", "Explanation".bold().cyan());
        println!("{}", modification.explanation);
        println!();
    }

    println!("{}", "Rewritten code".bold().cyan());
    println!("{}", "━".repeat(80).bright_black());
    println!("{}", modification.modified_code);

    Ok(())
}
