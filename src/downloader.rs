use anyhow::{bail, Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{info, warn};
use url::Url;

use crate::config::Config;
use crate::pdf_store::PdfStore;
use crate::store::{self, ExcludeList};

const DRIVE_HOST: &str = "drive.google.com";
const DRIVE_FILE_MARKER: &str = "/file/d/";

/// Download stats returned after completion.
#[derive(Default)]
pub struct DownloadStats {
    pub total: usize,
    pub saved: usize,
    pub up_to_date: usize,
    pub skipped: usize,
    pub errors: usize,
}

/// Download every minutes PDF sequentially. Per-item failures are logged
/// and skipped; only a missing/corrupt exclude list aborts the stage.
pub async fn run(config: &Config) -> Result<DownloadStats> {
    let links_file = config.minutes_links_file();
    if !links_file.exists() {
        warn!(
            "No links found at {} — run `scrape` first",
            links_file.display()
        );
        return Ok(DownloadStats::default());
    }
    let links = store::load_links(&links_file)?;
    let mut exclude = ExcludeList::load(&config.exclude_list_file())?;
    let pdf_store = PdfStore::new(&config.pdf_dir)?;

    let base = Url::parse(&config.base_url)
        .with_context(|| format!("invalid base URL {}", config.base_url))?;
    let client = reqwest::Client::builder()
        .timeout(config.timeout)
        .build()?;

    let mut stats = DownloadStats {
        total: links.len(),
        ..Default::default()
    };

    let pb = ProgressBar::new(links.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] {bar:40} {pos}/{len} ({per_sec}, eta {eta})")?
            .progress_chars("=> "),
    );

    for item in &links {
        pb.inc(1);

        let date = item.date.as_deref().filter(|d| !d.is_empty());
        let (href, date) = match (item.href.as_str(), date) {
            (h, Some(d)) if !h.is_empty() => (h, d),
            _ => {
                warn!("Skipping item (missing href or date): {:?}", item);
                stats.skipped += 1;
                continue;
            }
        };

        if exclude.contains(href) {
            stats.skipped += 1;
            continue;
        }

        let url = match resolve_url(&base, href) {
            Ok(url) => url,
            Err(e) => {
                warn!("Skipping {href}: {e:#}");
                stats.skipped += 1;
                continue;
            }
        };

        let content = match fetch_bytes(&client, &url).await {
            Ok(content) => content,
            Err(e) => {
                warn!("Failed to download {url}: {e:#}");
                stats.errors += 1;
                continue;
            }
        };

        // Structural check only; a parse failure is durably excluded so
        // future runs don't re-download it.
        if let Err(e) = lopdf::Document::load_mem(&content) {
            warn!("Invalid PDF at {url} ({e}) — adding to exclude list");
            exclude.add(href)?;
            stats.errors += 1;
            continue;
        }

        match pdf_store.save(&content, date) {
            Ok(outcome) if outcome.written => stats.saved += 1,
            Ok(_) => stats.up_to_date += 1,
            Err(e) => {
                warn!("Failed to store {href}: {e:#}");
                stats.errors += 1;
            }
        }
    }

    pb.finish_and_clear();
    info!(
        "Download done: {} saved, {} up to date, {} skipped, {} errors",
        stats.saved, stats.up_to_date, stats.skipped, stats.errors
    );

    Ok(stats)
}

async fn fetch_bytes(client: &reqwest::Client, url: &Url) -> Result<Vec<u8>> {
    let response = client.get(url.clone()).send().await?;
    let status = response.status();
    if !status.is_success() {
        bail!("unexpected status code {status}");
    }
    Ok(response.bytes().await?.to_vec())
}

/// Effective download URL for an href. Google Drive file pages are
/// rewritten to the direct-download endpoint; everything else resolves
/// against the base URL.
pub fn resolve_url(base: &Url, href: &str) -> Result<Url> {
    if href.contains(DRIVE_HOST) && href.contains(DRIVE_FILE_MARKER) {
        if let Some(id) = href
            .split(DRIVE_FILE_MARKER)
            .nth(1)
            .and_then(|rest| rest.split('/').next())
        {
            let direct = format!("https://{DRIVE_HOST}/uc?export=download&id={id}");
            return Url::parse(&direct).context("bad Google Drive download URL");
        }
    }
    base.join(href)
        .with_context(|| format!("unresolvable href {href}"))
}

// ── Tests ──
