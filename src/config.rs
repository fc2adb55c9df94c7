use std::path::PathBuf;
use std::time::Duration;

pub const TARGET_URL: &str =
    "https://www.boston.gov/departments/licensing-board/licensing-board-information-and-members";
pub const BASE_URL: &str = "https://www.boston.gov";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

pub const DATA_DIR: &str = "data";
pub const PDF_DIR: &str = "voting_minutes_pdfs";
pub const TEXT_DIR: &str = "voting_minutes_txt";

const VIDEO_LINKS_FILE: &str = "hearing_video_links.json";
const MINUTES_LINKS_FILE: &str = "voting_minutes_links.json";
const URL_EXCLUDE_LIST_FILE: &str = "url_exclude_list.json";
const STATS_LOG_FILE: &str = "link_stats_log.csv";

/// Resolved run configuration. Built once in `main` from CLI flags and
/// passed by reference to every stage.
pub struct Config {
    pub target_url: String,
    pub base_url: String,
    pub timeout: Duration,
    pub data_dir: PathBuf,
    pub pdf_dir: PathBuf,
    pub text_dir: PathBuf,
}

impl Config {
    pub fn new(
        target_url: String,
        base_url: String,
        timeout_secs: u64,
        data_dir: PathBuf,
        pdf_dir: PathBuf,
        text_dir: PathBuf,
    ) -> Self {
        Self {
            target_url,
            base_url,
            timeout: Duration::from_secs(timeout_secs),
            data_dir,
            pdf_dir,
            text_dir,
        }
    }

    pub fn video_links_file(&self) -> PathBuf {
        self.data_dir.join(VIDEO_LINKS_FILE)
    }

    pub fn minutes_links_file(&self) -> PathBuf {
        self.data_dir.join(MINUTES_LINKS_FILE)
    }

    pub fn exclude_list_file(&self) -> PathBuf {
        self.data_dir.join(URL_EXCLUDE_LIST_FILE)
    }

    pub fn stats_log_file(&self) -> PathBuf {
        self.data_dir.join(STATS_LOG_FILE)
    }
}
