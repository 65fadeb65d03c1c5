//! Main entry point for the zipread CLI application.
//!
//! This binary provides a command-line interface for listing and
//! extracting entries from local ZIP archives.

use anyhow::{Context, Result};
use clap::Parser;
use std::io::Write;
use std::path::{Path, PathBuf};

use zipread::{Cli, EntryRecord, FileSource, ZipReader};

/// Application entry point.
///
/// Parses command-line arguments, opens the archive, and dispatches to
/// listing or extraction.
fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let reader = ZipReader::open(Path::new(&cli.file))
        .with_context(|| format!("cannot open {}", cli.file))?;

    process_zip(&reader, &cli)
}

/// Process a ZIP archive based on CLI options.
///
/// List mode (`-l` or `-v`) displays archive contents; extract mode
/// extracts the entries matching the specified filters.
fn process_zip(reader: &ZipReader<FileSource>, cli: &Cli) -> Result<()> {
    if cli.list || cli.verbose {
        return list_entries(reader, cli.verbose);
    }

    let entries = reader.entries()?;

    // Filters: directories are skipped (created as needed during
    // extraction), positional names select, -x patterns exclude.
    let to_extract: Vec<_> = entries
        .iter()
        .filter(|e| {
            if e.is_directory {
                return false;
            }

            if !cli.entries.is_empty() {
                let matches = cli.entries.iter().any(|wanted| {
                    let basename = Path::new(&e.name)
                        .file_name()
                        .map(|s| s.to_string_lossy())
                        .unwrap_or_default();
                    e.name == *wanted || basename == *wanted
                });
                if !matches {
                    return false;
                }
            }

            !cli.exclude.iter().any(|x| e.name.contains(x.as_str()))
        })
        .collect();

    let multiple = cli.pipe && to_extract.len() > 1;
    for entry in to_extract {
        extract_entry(reader, entry, cli, multiple)?;
    }

    Ok(())
}

/// List entries in the ZIP archive.
///
/// Simple format (`-l`) prints one name per line; verbose format (`-v`)
/// prints a table with sizes, compression ratio, and timestamps.
fn list_entries(reader: &ZipReader<FileSource>, verbose: bool) -> Result<()> {
    let entries = reader.entries()?;

    if verbose {
        println!(
            "{:>10}  {:>10}  {:>5}  {:>10}  {:>5}  Name",
            "Length", "Size", "Cmpr", "Date", "Time"
        );
        println!("{}", "-".repeat(70));
    }

    let mut total_uncompressed = 0u64;
    let mut total_compressed = 0u64;
    let mut file_count = 0usize;

    for entry in &entries {
        if verbose {
            let (year, month, day) = entry.mod_date();
            let (hour, minute, _second) = entry.mod_time();

            let ratio = if entry.uncompressed_size > 0 {
                format!(
                    "{:>4}%",
                    100 - (entry.compressed_size * 100 / entry.uncompressed_size)
                )
            } else {
                "  0%".to_string()
            };

            println!(
                "{:>10}  {:>10}  {}  {:04}-{:02}-{:02}  {:02}:{:02}  {}",
                entry.uncompressed_size,
                entry.compressed_size,
                ratio,
                year,
                month,
                day,
                hour,
                minute,
                entry.name
            );

            if !entry.is_directory {
                total_uncompressed += entry.uncompressed_size;
                total_compressed += entry.compressed_size;
                file_count += 1;
            }
        } else {
            println!("{}", entry.name);
        }
    }

    if verbose {
        println!("{}", "-".repeat(70));
        let total_ratio = if total_uncompressed > 0 {
            format!(
                "{:>4}%",
                100 - (total_compressed * 100 / total_uncompressed)
            )
        } else {
            "  0%".to_string()
        };
        println!(
            "{:>10}  {:>10}  {}  {:>21}  {} files",
            total_uncompressed, total_compressed, total_ratio, "", file_count
        );
    }

    Ok(())
}

/// Extract a single entry from the archive.
///
/// Pipe mode (`-p`) writes to stdout; otherwise the entry is written
/// under the output directory, honoring the overwrite flags.
fn extract_entry(
    reader: &ZipReader<FileSource>,
    entry: &EntryRecord,
    cli: &Cli,
    show_name: bool,
) -> Result<()> {
    let data = reader
        .data(&entry.name)?
        .with_context(|| format!("entry vanished from index: {}", entry.name))?;

    if cli.pipe {
        let mut stdout = std::io::stdout();
        if show_name {
            stdout.write_all(format!("--- {} ---\n", entry.name).as_bytes())?;
        }
        stdout.write_all(&data)?;
        return Ok(());
    }

    let file_name = if cli.junk_paths {
        // Junk paths: keep only the base filename
        Path::new(&entry.name)
            .file_name()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| entry.name.clone())
    } else {
        entry.name.clone()
    };
    let output_path = match &cli.extract_dir {
        Some(dir) => PathBuf::from(dir).join(&file_name),
        None => PathBuf::from(&file_name),
    };

    if output_path.exists() {
        if cli.never_overwrite {
            if !cli.is_quiet() {
                eprintln!("Skipping: {} (file exists)", entry.name);
            }
            return Ok(());
        }

        if !cli.overwrite {
            if !cli.is_quiet() {
                eprintln!("Skipping: {} (use -o to overwrite)", entry.name);
            }
            return Ok(());
        }
    }

    if let Some(parent) = output_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    if !cli.is_quiet() {
        println!("  extracting: {}", entry.name);
    }

    std::fs::write(&output_path, &data)
        .with_context(|| format!("cannot write {}", output_path.display()))?;

    Ok(())
}
