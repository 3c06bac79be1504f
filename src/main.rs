use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use stain_area_rs::logger::{self, info, warn};
use stain_area_rs::stain_pipeline::{
    CalculationRecord, EstimationConfig, FileKeyValueStore, KeyValueStore, ResultStore,
    StainAreaSession, TracingNotifier, stain_perimeter,
};

/// Largest image accepted from the command line.
const MAX_FILE_SIZE: u64 = 10 * 1024 * 1024;

const SUPPORTED_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "bmp", "tif", "tiff"];

#[derive(Parser)]
#[command(name = "stain-area", version, about = "Monte Carlo stain area estimation")]
struct Cli {
    /// Directory holding the calculation history
    #[arg(long, env = "STAIN_STORE_DIR", default_value = ".stain-area", global = true)]
    store_dir: PathBuf,

    /// Keep the history in memory only
    #[arg(long, global = true)]
    ephemeral: bool,

    /// Log debug output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Estimate the stain area of a binary image (white = stain)
    Estimate {
        image: PathBuf,

        /// Number of random sample points
        #[arg(short, long, default_value_t = 1000)]
        points: usize,

        /// Seed for reproducible sampling
        #[arg(long)]
        seed: Option<u64>,

        /// Do not embed the image in the saved record
        #[arg(long)]
        no_snapshot: bool,

        /// Also report the exact boundary length of the stain
        #[arg(long)]
        perimeter: bool,
    },
    /// Inspect or edit the calculation history
    History {
        #[command(subcommand)]
        action: HistoryAction,
    },
}

#[derive(Subcommand)]
enum HistoryAction {
    /// List stored calculations, newest first
    List,
    /// Show one calculation
    Show { id: String },
    /// Delete one calculation
    Delete { id: String },
    /// Delete every calculation
    Clear,
    /// Aggregate figures over the history
    Summary,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    logger::init_with_default(if cli.verbose { "debug" } else { "info" });

    let backend: Option<Arc<dyn KeyValueStore>> = if cli.ephemeral {
        None
    } else {
        Some(Arc::new(FileKeyValueStore::new(&cli.store_dir)))
    };
    let store = Arc::new(
        ResultStore::open(backend)
            .await
            .context("failed to open calculation history")?,
    );

    match cli.command {
        Command::Estimate {
            image,
            points,
            seed,
            no_snapshot,
            perimeter,
        } => {
            check_image_file(&image)?;

            let config = EstimationConfig::builder()
                .seed(seed)
                .embed_image_snapshot(!no_snapshot)
                .build();
            let session = StainAreaSession::new(config, store)
                .with_notifier(Arc::new(TracingNotifier));

            let dimensions = session.load_image_file(&image).await?;
            info!(
                "Loaded {} ({}x{})",
                image.display(),
                dimensions.width,
                dimensions.height
            );

            let record = session.calculate_area(points).await?;
            print_record(&record);

            if perimeter {
                if let Some(raster) = session.current_raster().await {
                    println!("Perimeter:       {} px", stain_perimeter(&raster));
                }
            }
        }
        Command::History { action } => run_history(&store, action).await?,
    }

    Ok(())
}

async fn run_history(store: &ResultStore, action: HistoryAction) -> anyhow::Result<()> {
    match action {
        HistoryAction::List => {
            let records = store.list().await;
            if records.is_empty() {
                println!("No calculations stored");
            }
            for record in records {
                println!(
                    "{}  {}  {:>8} pts  {:>8} in stain  {:>12.2} px²",
                    record.id,
                    record.timestamp.format("%Y-%m-%d %H:%M:%S"),
                    record.num_points,
                    record.points_in_stain,
                    record.stain_area
                );
            }
        }
        HistoryAction::Show { id } => {
            let record = store
                .get(&id)
                .await
                .with_context(|| format!("no calculation with id {}", id))?;
            print_record(&record);
        }
        HistoryAction::Delete { id } => {
            store.delete_by_id(&id).await?;
            println!("Deleted {}", id);
        }
        HistoryAction::Clear => {
            store.clear().await?;
            println!("History cleared");
        }
        HistoryAction::Summary => {
            let summary = store.summary().await;
            println!("Calculations:    {}", summary.total_calculations);
            println!("Samples drawn:   {}", summary.total_samples);
            println!("Mean stain area: {:.2} px²", summary.average_stain_area);
            println!("Mean coverage:   {:.2}%", summary.average_coverage * 100.0);
        }
    }

    Ok(())
}

/// Caller-side policy on what may be handed to the decoder.
fn check_image_file(path: &Path) -> anyhow::Result<()> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();
    if !SUPPORTED_EXTENSIONS.contains(&extension.as_str()) {
        bail!(
            "unsupported file type {:?}; use one of {}",
            path.display().to_string(),
            SUPPORTED_EXTENSIONS.join(", ")
        );
    }

    let size = std::fs::metadata(path)
        .with_context(|| format!("cannot read {}", path.display()))?
        .len();
    if size > MAX_FILE_SIZE {
        bail!("{} is {} bytes; the limit is 10 MiB", path.display(), size);
    }
    if size == 0 {
        warn!("{} is empty", path.display());
    }

    Ok(())
}

fn print_record(record: &CalculationRecord) {
    println!("Id:              {}", record.id);
    println!("Timestamp:       {}", record.timestamp.to_rfc3339());
    println!("Samples:         {}", record.num_points);
    println!("In stain:        {}", record.points_in_stain);
    println!("Bounding box:    {} px²", record.total_area);
    println!("Stain area:      {:.2} px²", record.stain_area);
    println!("Coverage:        {:.2}%", record.coverage() * 100.0);
    println!("Sampling time:   {:.3} ms", record.processing_time_ms);
}
