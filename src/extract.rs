use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use rayon::prelude::*;
use tracing::{info, warn};

/// Extraction stats returned after completion.
#[derive(Default)]
pub struct ExtractStats {
    pub total: usize,
    pub extracted: usize,
    pub errors: usize,
}

/// Extract text from every PDF in `pdf_dir` into `<stem>.txt` files under
/// `text_dir`. Files are independent, so this is the one stage that fans
/// out across cores.
pub fn run(pdf_dir: &Path, text_dir: &Path) -> Result<ExtractStats> {
    if !pdf_dir.exists() {
        warn!(
            "No PDF directory at {} — run `download` first",
            pdf_dir.display()
        );
        return Ok(ExtractStats::default());
    }
    fs::create_dir_all(text_dir)
        .with_context(|| format!("failed to create {}", text_dir.display()))?;

    let files = collect_pdf_files(pdf_dir)?;
    let extracted = files
        .par_iter()
        .filter(|path| extract_one(path, text_dir))
        .count();

    let stats = ExtractStats {
        total: files.len(),
        extracted,
        errors: files.len() - extracted,
    };
    info!(
        "Extraction done: {} of {} PDFs extracted ({} errors)",
        stats.extracted, stats.total, stats.errors
    );
    Ok(stats)
}

/// All `*.pdf` files in `dir`, sorted by filename.
fn collect_pdf_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files: Vec<PathBuf> = fs::read_dir(dir)
        .with_context(|| format!("failed to read {}", dir.display()))?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| {
            path.extension()
                .map(|ext| ext.eq_ignore_ascii_case("pdf"))
                .unwrap_or(false)
        })
        .collect();
    files.sort();
    Ok(files)
}

fn extract_one(pdf: &Path, text_dir: &Path) -> bool {
    let text = match pdf_extract::extract_text(pdf) {
        Ok(text) => text,
        Err(e) => {
            warn!("Failed to extract text from {}: {}", pdf.display(), e);
            return false;
        }
    };

    let stem = match pdf.file_stem() {
        Some(stem) => stem.to_string_lossy().into_owned(),
        None => return false,
    };
    let out = text_dir.join(format!("{stem}.txt"));
    match fs::write(&out, text) {
        Ok(()) => {
            info!("Extracted {} -> {}.txt", display_name(pdf), stem);
            true
        }
        Err(e) => {
            warn!("Failed to write {}: {}", out.display(), e);
            false
        }
    }
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

// ── Tests ──
