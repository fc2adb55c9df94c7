use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use sha2::{Digest, Sha256};
use tracing::info;

/// Content-addressed PDF store. One file per distinct content hash per
/// date: `voting_minutes_<date>.pdf`, then `_v2`, `_v3`, … for later
/// revisions with different bytes.
pub struct PdfStore {
    dir: PathBuf,
}

/// Where the bytes ended up, and whether anything was written.
pub struct SaveOutcome {
    pub path: PathBuf,
    pub written: bool,
}

impl PdfStore {
    pub fn new(dir: &Path) -> Result<Self> {
        fs::create_dir_all(dir)
            .with_context(|| format!("failed to create PDF directory {}", dir.display()))?;
        Ok(Self {
            dir: dir.to_path_buf(),
        })
    }

    /// Persist `content` under `date_str`, deduplicating against every file
    /// already stored for that date.
    ///
    /// The probe scans version slots in increasing order and stops at the
    /// first empty slot (write) or the first hash match (no write), so the
    /// destination is deterministic across reruns and the loop is bounded
    /// by the number of versions on disk.
    pub fn save(&self, content: &[u8], date_str: &str) -> Result<SaveOutcome> {
        let incoming: [u8; 32] = Sha256::digest(content).into();
        let base = self.dir.join(format!("voting_minutes_{date_str}.pdf"));

        if base.exists() && file_digest(&base)? == incoming {
            info!("No change detected — {} already up to date", display_name(&base));
            return Ok(SaveOutcome {
                path: base,
                written: false,
            });
        }

        let mut index = 1usize;
        loop {
            let candidate = if index == 1 {
                base.clone()
            } else {
                self.dir
                    .join(format!("voting_minutes_{date_str}_v{index}.pdf"))
            };

            if !candidate.exists() {
                fs::write(&candidate, content)
                    .with_context(|| format!("failed to write {}", candidate.display()))?;
                info!("Saved {}", display_name(&candidate));
                return Ok(SaveOutcome {
                    path: candidate,
                    written: true,
                });
            }

            if file_digest(&candidate)? == incoming {
                info!(
                    "Duplicate content detected — matches {}",
                    display_name(&candidate)
                );
                return Ok(SaveOutcome {
                    path: candidate,
                    written: false,
                });
            }

            index += 1;
        }
    }
}

fn file_digest(path: &Path) -> Result<[u8; 32]> {
    let mut file =
        File::open(path).with_context(|| format!("failed to open {}", path.display()))?;
    let mut hasher = Sha256::new();
    io::copy(&mut file, &mut hasher)
        .with_context(|| format!("failed to hash {}", path.display()))?;
    Ok(hasher.finalize().into())
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

// ── Tests ──
