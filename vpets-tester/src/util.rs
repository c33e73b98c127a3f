use chrono::Utc;
use std::path::{Path, PathBuf};

pub fn split_csv(s: &str) -> Vec<String> {
    s.split(',')
        .map(|x| x.trim().to_string())
        .filter(|x| !x.is_empty())
        .collect()
}

/// Timestamped directory under `base` so runs never share checkpoint files.
pub fn run_save_dir(base: &Path) -> PathBuf {
    base.join(Utc::now().format("run-%Y%m%dT%H%M%S%.3f").to_string())
}
