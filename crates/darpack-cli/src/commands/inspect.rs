//! Inspect command - view archive contents without extracting

use console::style;
use darpack_core::{list_archive, read_manifest_from_archive};
use miette::Result;
use std::path::Path;

use crate::error::IntoCliResult;
use crate::util::format_size;

pub fn run(archive_path: &Path, manifest_only: bool) -> Result<()> {
    let manifest = read_manifest_from_archive(archive_path).into_cli_result()?;

    if manifest_only {
        print!("{}", manifest);
        return Ok(());
    }

    println!("{} {}", style("Archive").cyan().bold(), archive_path.display());
    println!();

    let entries = list_archive(archive_path).into_cli_result()?;

    println!("{}:", style("Files").bold());
    for entry in entries.iter().filter(|e| !e.is_dir) {
        println!("  {:50} {:>10}", entry.path, format_size(entry.size));
    }

    let file_count = entries.iter().filter(|e| !e.is_dir).count();
    let total_size: u64 = entries.iter().filter(|e| !e.is_dir).map(|e| e.size).sum();

    println!();
    println!("{} files, {} total", file_count, format_size(total_size));

    println!();
    println!("{}:", style("Manifest").bold());
    print!("{}", manifest);

    Ok(())
}
