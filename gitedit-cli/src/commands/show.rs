use anyhow::Result;
use colored::Colorize;
use gitedit_core::{ContentResolver, FileState};
use std::path::PathBuf;

pub fn run(path: String, root: PathBuf) -> Result<()> {
    let snapshot = ContentResolver::new(root).get_snapshot(&path)?;

    let state = match snapshot.state {
        FileState::Unmodified => "UNMODIFIED".green(),
        FileState::Added => "ADDED".green(),
        FileState::Copied => "COPIED".blue(),
        FileState::Deleted => "DELETED".red(),
        FileState::Modified => "MODIFIED".yellow(),
        FileState::Renamed => "RENAMED".blue(),
        FileState::UpdatedButUnmerged => "UNMERGED".red().bold(),
    };

    println!("{} {}", state, snapshot.path.white().bold());
    println!("  {}: {} bytes", "Current".bold(), snapshot.current.len());
    println!("  {}: {} bytes", "Original".bold(), snapshot.reference.len());
    println!("{}", "━".repeat(80).bright_black());
    print!("{}", String::from_utf8_lossy(&snapshot.current));

    Ok(())
}
