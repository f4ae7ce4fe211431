use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;

use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;
use tracing_subscriber::EnvFilter;

use cggtts_ingest::batch::{BatchLoader, LoadSummary};

#[derive(Parser)]
#[command(name = "cggtts-ingest")]
#[command(
    about = "Combine a directory of CGGTTS Excel workbooks into one track table",
    long_about = None
)]
struct Cli {
    /// Directory containing the .xlsx workbook exports
    #[arg(long, env = "CGGTTS_DATA_DIR")]
    data_dir: PathBuf,

    /// Write the combined track table to this path as JSON
    #[arg(long)]
    output: Option<PathBuf>,

    /// Number of workbooks to decode in parallel
    #[arg(long, default_value = "1")]
    parallel: usize,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load .env file if it exists (ignore errors if not found)
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let pb = ProgressBar::new_spinner();
    pb.set_style(ProgressStyle::default_spinner().template("{spinner:.green} {msg}")?);
    pb.set_message(format!("Loading workbooks from {:?}...", cli.data_dir));
    pb.enable_steady_tick(std::time::Duration::from_millis(100));

    let loader = BatchLoader::new();
    let summary = if cli.parallel > 1 {
        loader.load_dir_concurrent(&cli.data_dir, cli.parallel).await?
    } else {
        let data_dir = cli.data_dir.clone();
        tokio::task::spawn_blocking(move || loader.load_dir(&data_dir)).await??
    };

    pb.finish_with_message(format!(
        "✓ Loaded {} tracks from {} of {} workbooks",
        summary.records.len(),
        summary.files_loaded(),
        summary.files_seen
    ));

    print_summary(&summary);

    if let Some(output) = &cli.output {
        let file = File::create(output)?;
        serde_json::to_writer_pretty(BufWriter::new(file), &summary.records)?;
        info!("Wrote {} track(s) to {:?}", summary.records.len(), output);
    }

    Ok(())
}

fn print_summary(summary: &LoadSummary) {
    println!("\n{}", "=".repeat(60));
    println!("CGGTTS Ingest Summary");
    println!("{}", "=".repeat(60));
    println!("Workbooks seen:    {}", summary.files_seen);
    println!("Workbooks loaded:  {}", summary.files_loaded());
    println!("Workbooks skipped: {}", summary.skipped.len());
    println!("Tracks:            {}", summary.records.len());

    let earliest = summary.records.iter().map(|r| r.datetime).min();
    let latest = summary.records.iter().map(|r| r.datetime).max();
    if let (Some(earliest), Some(latest)) = (earliest, latest) {
        println!("Track range:       {earliest} to {latest}");
    }
    println!("{}", "=".repeat(60));

    if !summary.skipped.is_empty() {
        println!("\nSkipped workbooks:");
        for skip in &summary.skipped {
            println!("  {}: {}", skip.file_name, skip.reason);
        }
    }

    if summary.is_empty() {
        println!("\n⚠️  No valid CGGTTS tracks found");
    }

    println!();
}
