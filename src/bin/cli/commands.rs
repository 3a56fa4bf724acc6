//! Command implementations for the zipfs CLI.

use std::fs::File;
use std::sync::Arc;

use serde_json::json;

use zipfs::{EditInstruction, FsGateway, ObjectKey, Result, Workspace};

use crate::{Cli, Commands, OutputFormat};

/// Dispatches the parsed command against a directory-bucket workspace.
pub fn run(cli: &Cli) -> Result<()> {
    let gateway = FsGateway::new(&cli.bucket)?;
    let workspace = Workspace::new(Arc::new(gateway));
    let format = cli.format;

    match &cli.command {
        Commands::Upload { file } => {
            let filename = file
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            let mut source = File::open(file)?;
            let key = workspace.upload_archive(&filename, &mut source)?;
            match format {
                OutputFormat::Human => println!("{}", key),
                OutputFormat::Json => println!("{}", json!({ "key": key.as_str() })),
            }
        }

        Commands::Ls { key, prefix } => {
            let key = ObjectKey::new(key)?;
            let entries = workspace.list_entries(&key, prefix)?;
            match format {
                OutputFormat::Human => {
                    for path in &entries {
                        println!("{}", path);
                    }
                }
                OutputFormat::Json => println!("{}", json!({ "files": entries })),
            }
        }

        Commands::Cat { key, path } => {
            let key = ObjectKey::new(key)?;
            let content = workspace.read_entry(&key, path)?;
            match format {
                OutputFormat::Human => print!("{}", content),
                OutputFormat::Json => {
                    println!("{}", json!({ "path": path, "content": content }));
                }
            }
        }

        Commands::Write { key, path, content } => {
            let key = ObjectKey::new(key)?;
            workspace.write_entry(&key, path, content)?;
            print_status(format);
        }

        Commands::Append { key, path, content } => {
            let key = ObjectKey::new(key)?;
            workspace.append_entry(&key, path, content)?;
            print_status(format);
        }

        Commands::Rm { key, path } => {
            let key = ObjectKey::new(key)?;
            workspace.delete_entry(&key, path)?;
            print_status(format);
        }

        Commands::Create { key, path, content } => {
            let key = ObjectKey::new(key)?;
            workspace.create_entry(&key, path, content)?;
            print_status(format);
        }

        Commands::Apply { key, instructions } => {
            let key = ObjectKey::new(key)?;
            let payload = match instructions.strip_prefix('@') {
                Some(path) => std::fs::read_to_string(path)?,
                None => instructions.clone(),
            };
            let batch = EditInstruction::parse_batch(&payload)?;
            let result = workspace.apply_edits(&key, &batch)?;
            match format {
                OutputFormat::Human => println!(
                    "{} entries ({} kept, {} replaced, {} appended, {} deleted, {} added)",
                    result.total_entries(),
                    result.entries_kept,
                    result.entries_replaced,
                    result.entries_appended,
                    result.entries_deleted,
                    result.entries_added,
                ),
                OutputFormat::Json => println!(
                    "{}",
                    json!({
                        "entries": result.total_entries(),
                        "kept": result.entries_kept,
                        "replaced": result.entries_replaced,
                        "appended": result.entries_appended,
                        "deleted": result.entries_deleted,
                        "added": result.entries_added,
                    })
                ),
            }
        }

        Commands::Extract { key, dest } => {
            let key = ObjectKey::new(key)?;
            let extracted = workspace.extract_to_dir(&key, dest)?;
            match format {
                OutputFormat::Human => {
                    println!("extracted {} entries to {}", extracted, dest.display());
                }
                OutputFormat::Json => println!("{}", json!({ "extracted": extracted })),
            }
        }
    }

    Ok(())
}

fn print_status(format: OutputFormat) {
    match format {
        OutputFormat::Human => println!("OK"),
        OutputFormat::Json => println!("{}", json!({ "status": "ok" })),
    }
}
