use anyhow::Result;
use colored::Colorize;
use gitedit_core::{walker, GitRepository};
use std::path::PathBuf;

pub fn run(root: PathBuf) -> Result<()> {
    let repo = GitRepository::open(&root)?;
    let mut files = walker::list_tracked_files(&repo)?;
    files.sort();

    if files.is_empty() {
        println!("{}", "No tracked files".yellow());
        return Ok(());
    }

    for path in &files {
        println!("{}", path);
    }

    println!();
    println!(
        "{} file(s) in {}",
        files.len().to_string().cyan(),
        repo.workdir().display()
    );

    Ok(())
}
