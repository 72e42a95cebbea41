//! Normalize command
//!
//! Usage: ehrtest normalize <DOC> --path <PATH> --name <NAME> --count <N> [--output <FILE>]

use clap::Args;
use std::path::PathBuf;

#[derive(Debug, Args)]
pub struct NormalizeArgs {
    /// JSON document to normalize
    pub doc: PathBuf,

    /// Path of the array, e.g. root['content']
    #[arg(short, long)]
    pub path: String,

    /// Name carried by the items to count (`name` or `name.value`)
    #[arg(short, long)]
    pub name: String,

    /// Number of matching items the result must contain
    #[arg(short, long)]
    pub count: usize,

    /// Output file path (default: stdout)
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

/// Execute normalize command
pub fn execute(args: NormalizeArgs) -> Result<(), Box<dyn std::error::Error>> {
    let text = std::fs::read_to_string(&args.doc)?;
    let normalized =
        ehrtest_core::normalize_item_count_text(&text, &args.path, &args.name, args.count)?;

    if let Some(output_path) = args.output {
        std::fs::write(&output_path, normalized)?;
        println!("✓ Normalized to {}", output_path.display());
    } else {
        println!("{}", normalized);
    }

    Ok(())
}
