mod config;
mod dates;
mod downloader;
mod extract;
mod filters;
mod page;
mod pdf_store;
mod store;

use std::fs;
use std::path::PathBuf;
use std::time::Instant;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::info;

use config::Config;
use store::{ExcludeList, LinkStats, StatsLog};

#[derive(Parser)]
#[command(
    name = "minutes_scraper",
    about = "Licensing board link scraper and voting minutes PDF archiver"
)]
struct Cli {
    /// Page to scrape for links
    #[arg(long, default_value = config::TARGET_URL)]
    target_url: String,
    /// Base URL for resolving relative hrefs
    #[arg(long, default_value = config::BASE_URL)]
    base_url: String,
    /// Request timeout in seconds
    #[arg(long, default_value_t = config::DEFAULT_TIMEOUT_SECS)]
    timeout: u64,
    /// Directory for link records, the exclude list and the stats log
    #[arg(long, default_value = config::DATA_DIR)]
    data_dir: PathBuf,
    /// Directory for downloaded PDFs
    #[arg(long, default_value = config::PDF_DIR)]
    pdf_dir: PathBuf,
    /// Directory for extracted text
    #[arg(long, default_value = config::TEXT_DIR)]
    text_dir: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create data directories and seed an empty exclude list
    Init,
    /// Scrape the target page, classify links, infer dates
    Scrape,
    /// Download voting minutes PDFs with content-hash deduplication
    Download,
    /// Extract text from downloaded PDFs
    Extract,
    /// Scrape + download + extract in one pipeline
    Run,
    /// Show recent per-run link stats
    Stats {
        /// Max rows to display
        #[arg(short = 'n', long, default_value = "10")]
        limit: usize,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let t0 = Instant::now();
    let cli = Cli::parse();
    let cfg = Config::new(
        cli.target_url,
        cli.base_url,
        cli.timeout,
        cli.data_dir,
        cli.pdf_dir,
        cli.text_dir,
    );

    let result = match cli.command {
        Commands::Init => cmd_init(&cfg),
        Commands::Scrape => cmd_scrape(&cfg).await,
        Commands::Download => {
            let stats = downloader::run(&cfg).await?;
            println!(
                "Done: {} links ({} saved, {} up to date, {} skipped, {} errors).",
                stats.total, stats.saved, stats.up_to_date, stats.skipped, stats.errors
            );
            Ok(())
        }
        Commands::Extract => {
            let stats = extract::run(&cfg.pdf_dir, &cfg.text_dir)?;
            println!(
                "Done: {} of {} PDFs extracted ({} errors).",
                stats.extracted, stats.total, stats.errors
            );
            Ok(())
        }
        Commands::Run => {
            // Phase 1: scrape and classify
            let t_scrape = Instant::now();
            cmd_scrape(&cfg).await?;
            println!("Scraped in {:.1}s", t_scrape.elapsed().as_secs_f64());

            // Phase 2: download
            let t_download = Instant::now();
            let dl = downloader::run(&cfg).await?;
            println!(
                "Downloaded {} links ({} saved, {} up to date, {} skipped, {} errors) in {:.1}s",
                dl.total,
                dl.saved,
                dl.up_to_date,
                dl.skipped,
                dl.errors,
                t_download.elapsed().as_secs_f64()
            );

            // Phase 3: extract text
            let ex = extract::run(&cfg.pdf_dir, &cfg.text_dir)?;
            println!(
                "Extracted {} of {} PDFs ({} errors).",
                ex.extracted, ex.total, ex.errors
            );
            Ok(())
        }
        Commands::Stats { limit } => cmd_stats(&cfg, limit),
    };

    let elapsed = t0.elapsed();
    if elapsed.as_secs() >= 1 {
        println!("\nDone in {}", format_duration(elapsed));
    }

    result
}

fn cmd_init(cfg: &Config) -> Result<()> {
    fs::create_dir_all(&cfg.data_dir)?;
    fs::create_dir_all(&cfg.pdf_dir)?;
    fs::create_dir_all(&cfg.text_dir)?;

    let exclude_file = cfg.exclude_list_file();
    if ExcludeList::seed(&exclude_file)? {
        println!("Seeded empty exclude list at {}", exclude_file.display());
    } else {
        println!("Exclude list already present at {}", exclude_file.display());
    }
    Ok(())
}

async fn cmd_scrape(cfg: &Config) -> Result<()> {
    // Strict: a missing or corrupt exclude list aborts before any network
    // work happens.
    let exclude = ExcludeList::load(&cfg.exclude_list_file())?;

    info!("Fetching {}...", cfg.target_url);
    let client = reqwest::Client::builder().timeout(cfg.timeout).build()?;
    let html = page::fetch_page(&client, &cfg.target_url).await?;

    info!("Parsing links...");
    let links = page::extract_links(&html);
    let mut stats = LinkStats {
        total_links: links.len(),
        ..Default::default()
    };

    let client_side = filters::ClientSideFilter;
    let exclude_filter = filters::ExcludeListFilter::new(&exclude);
    let chain: [&dyn filters::LinkFilter; 2] = [&client_side, &exclude_filter];
    let links = filters::apply_filters(&chain, links, &mut stats);

    info!("Separating video links...");
    let (video_links, minutes_links) = filters::split_video_links(links);
    stats.video_links = video_links.len();
    stats.minutes_links = minutes_links.len();

    store::save_links(&cfg.video_links_file(), &video_links)?;

    info!("Extracting dates...");
    let minutes_links = dates::add_dates(minutes_links);
    store::save_links(&cfg.minutes_links_file(), &minutes_links)?;

    stats.log();
    let run_date = chrono::Local::now().format("%Y-%m-%d").to_string();
    StatsLog::new(cfg.stats_log_file()).append(&stats, &run_date)?;

    Ok(())
}

fn cmd_stats(cfg: &Config, limit: usize) -> Result<()> {
    let rows = StatsLog::new(cfg.stats_log_file()).tail(limit)?;
    if rows.is_empty() {
        println!("No stats recorded yet. Run 'scrape' first.");
        return Ok(());
    }

    println!(
        "{:<12} | {:>6} | {:>12} | {:>9} | {:>7} | {:>8}",
        "run date", "total", "client-side", "excluded", "videos", "minutes"
    );
    println!("{}", "-".repeat(70));
    for row in rows {
        let fields: Vec<&str> = row.split(',').collect();
        let col = |i: usize| fields.get(i).copied().unwrap_or("0");
        println!(
            "{:<12} | {:>6} | {:>12} | {:>9} | {:>7} | {:>8}",
            col(0),
            col(1),
            col(2),
            col(3),
            col(4),
            col(5)
        );
    }
    Ok(())
}

fn format_duration(d: std::time::Duration) -> String {
    let secs = d.as_secs();
    if secs < 60 {
        format!("{:.1}s", d.as_secs_f64())
    } else if secs < 3600 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else {
        format!("{}h {}m {}s", secs / 3600, (secs % 3600) / 60, secs % 60)
    }
}
