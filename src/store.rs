use std::collections::HashSet;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::info;

/// One scraped anchor tag. `date` stays empty until date inference runs on
/// the minutes branch; video links are persisted without it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinkRecord {
    pub href: String,
    pub body: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
}

impl LinkRecord {
    pub fn new(href: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            href: href.into(),
            body: body.into(),
            date: None,
        }
    }
}

pub fn save_links(path: &Path, links: &[LinkRecord]) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(links)?;
    fs::write(path, json).with_context(|| format!("failed to write {}", path.display()))?;
    info!("Saved {} links to {}", links.len(), path.display());
    Ok(())
}

pub fn load_links(path: &Path) -> Result<Vec<LinkRecord>> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let links: Vec<LinkRecord> = serde_json::from_str(&text)
        .with_context(|| format!("{} is not a JSON array of link records", path.display()))?;
    Ok(links)
}

/// Durable set of hrefs known to be invalid or unwanted. Loaded once per
/// stage and passed by reference to whoever reads or mutates it.
///
/// Loading is strict: a missing or malformed file is a configuration error,
/// not an empty list. `init` seeds the file so first runs can proceed.
#[derive(Debug)]
pub struct ExcludeList {
    path: PathBuf,
    entries: HashSet<String>,
}

impl ExcludeList {
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path).with_context(|| {
            format!(
                "exclude list not found: {} (run `init` to create it)",
                path.display()
            )
        })?;
        let list: Vec<String> = serde_json::from_str(&text)
            .with_context(|| format!("exclude list is corrupted: {}", path.display()))?;
        Ok(Self {
            path: path.to_path_buf(),
            entries: list.into_iter().collect(),
        })
    }

    /// Write an empty list unless the file already exists.
    pub fn seed(path: &Path) -> Result<bool> {
        if path.exists() {
            return Ok(false);
        }
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, "[]")
            .with_context(|| format!("failed to seed exclude list {}", path.display()))?;
        Ok(true)
    }

    pub fn contains(&self, href: &str) -> bool {
        self.entries.contains(href)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Add a URL and persist immediately. Returns false (and does not
    /// rewrite the file) if the URL was already present.
    pub fn add(&mut self, href: &str) -> Result<bool> {
        if !self.entries.insert(href.to_string()) {
            info!("URL already in exclude list: {}", href);
            return Ok(false);
        }
        self.persist()?;
        info!("Added URL to exclude list: {}", href);
        Ok(true)
    }

    // Full rewrite, sorted for byte-stable reruns.
    fn persist(&self) -> Result<()> {
        let mut list: Vec<&String> = self.entries.iter().collect();
        list.sort();
        let json = serde_json::to_string_pretty(&list)?;
        fs::write(&self.path, json)
            .with_context(|| format!("failed to write exclude list {}", self.path.display()))
    }
}

/// Per-run link counts, one CSV row per scrape.
#[derive(Debug, Default)]
pub struct LinkStats {
    pub total_links: usize,
    pub client_side_links: usize,
    pub excluded_links: usize,
    pub video_links: usize,
    pub minutes_links: usize,
}

impl LinkStats {
    /// Attribute a filter's removal count to its stats bucket. Buckets the
    /// schema doesn't know about are dropped on the floor.
    pub fn record_removed(&mut self, bucket: &str, count: usize) {
        match bucket {
            "client_side_links" => self.client_side_links += count,
            "excluded_links" => self.excluded_links += count,
            _ => {}
        }
    }

    pub fn log(&self) {
        info!("Link stats:");
        info!("total_links: {}", self.total_links);
        info!("client_side_links: {}", self.client_side_links);
        info!("excluded_links: {}", self.excluded_links);
        info!("video_links: {}", self.video_links);
        info!("minutes_links: {}", self.minutes_links);
    }
}

const STATS_COLUMNS: [&str; 6] = [
    "run_date",
    "total_links",
    "client_side_links",
    "excluded_links",
    "video_links",
    "minutes_links",
];

/// Append-only CSV log of per-run stats. Column order is fixed; the header
/// is written once when the file is created.
pub struct StatsLog {
    path: PathBuf,
}

impl StatsLog {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn append(&self, stats: &LinkStats, run_date: &str) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let existed = self.path.exists();
        let mut file = fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .with_context(|| format!("failed to open stats log {}", self.path.display()))?;
        if !existed {
            writeln!(file, "{}", STATS_COLUMNS.join(","))?;
        }
        writeln!(
            file,
            "{},{},{},{},{},{}",
            run_date,
            stats.total_links,
            stats.client_side_links,
            stats.excluded_links,
            stats.video_links,
            stats.minutes_links,
        )?;
        info!("Stats logged to {}", self.path.display());
        Ok(())
    }

    /// Last `n` data rows, most recent last. Empty if the log doesn't exist.
    pub fn tail(&self, n: usize) -> Result<Vec<String>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let text = fs::read_to_string(&self.path)?;
        let rows: Vec<String> = text
            .lines()
            .skip(1)
            .map(str::to_string)
            .collect();
        let start = rows.len().saturating_sub(n);
        Ok(rows[start..].to_vec())
    }
}

// ── Tests ──
