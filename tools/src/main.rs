use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use scrawl_tools::{format_report_pretty, inspect_bitmap, quantize_png, render_png};

#[derive(Parser)]
#[command(
    name = "scrawl-tools",
    version,
    about = "scrawl bitmap inspection and conversion tools"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print header fields and palette usage of a persisted bitmap.
    Inspect {
        /// Path to the bitmap.
        bitmap_path: PathBuf,
        /// Print the report as JSON.
        #[arg(long)]
        json: bool,
    },
    /// Render a persisted bitmap to PNG.
    Render {
        input: PathBuf,
        output: PathBuf,
    },
    /// Convert a PNG to the persisted bitmap format.
    Quantize {
        input: PathBuf,
        output: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let limits = bitmap::Limits::default();
    match cli.command {
        Command::Inspect { bitmap_path, json } => {
            let bytes = read(&bitmap_path)?;
            let report = inspect_bitmap(&bytes, &limits)
                .with_context(|| format!("inspect {}", bitmap_path.display()))?;
            if json {
                let json = serde_json::to_string_pretty(&report).context("serialize json")?;
                println!("{json}");
            } else {
                println!("{}", format_report_pretty(&report));
            }
        }
        Command::Render { input, output } => {
            let png = render_png(&read(&input)?, &limits)
                .with_context(|| format!("render {}", input.display()))?;
            write(&output, &png)?;
        }
        Command::Quantize { input, output } => {
            let bmp = quantize_png(&read(&input)?, &limits)
                .with_context(|| format!("quantize {}", input.display()))?;
            write(&output, &bmp)?;
        }
    }
    Ok(())
}

fn read(path: &Path) -> Result<Vec<u8>> {
    fs::read(path).with_context(|| format!("read {}", path.display()))
}

fn write(path: &Path, bytes: &[u8]) -> Result<()> {
    fs::write(path, bytes).with_context(|| format!("write {}", path.display()))
}
