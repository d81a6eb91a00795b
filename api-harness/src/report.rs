//! Timestamped report files under a reports directory.

use crate::error::Result;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

/// Writes reports into one directory, creating it on demand
#[derive(Debug, Clone)]
pub struct ReportWriter {
    dir: PathBuf,
}

impl ReportWriter {
    pub fn new<P: AsRef<Path>>(dir: P) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// `<dir>/<prefix>-<unix millis>.<extension>`
    pub fn timestamped_path(&self, prefix: &str, extension: &str) -> PathBuf {
        let timestamp = chrono::Utc::now().timestamp_millis();
        self.dir.join(format!("{}-{}.{}", prefix, timestamp, extension))
    }

    /// Like [`Self::timestamped_path`], with a `-<n>` suffix when that file already exists
    fn unused_path(&self, prefix: &str, extension: &str) -> PathBuf {
        let path = self.timestamped_path(prefix, extension);
        if !path.exists() {
            return path;
        }

        let stem = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| prefix.to_string());
        (1u32..)
            .map(|n| self.dir.join(format!("{}-{}.{}", stem, n, extension)))
            .find(|candidate| !candidate.exists())
            .unwrap_or(path)
    }

    /// Serialize `report` as pretty JSON to a fresh timestamped file; never replaces an existing report
    pub fn write_json<T: Serialize>(&self, prefix: &str, report: &T) -> Result<PathBuf> {
        let path = self.unused_path(prefix, "json");
        let content = serde_json::to_vec_pretty(report)?;
        write_file_atomic(&path, content)?;
        info!(path = %path.display(), "Report written");
        Ok(path)
    }
}

/// Write through a sibling temp file and rename, so readers never see a partial file
pub fn write_file_atomic<P: AsRef<Path>, C: AsRef<[u8]>>(path: P, content: C) -> Result<()> {
    let path = path.as_ref();

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let temp_path = path.with_extension(format!(
        "{}.tmp",
        path.extension().and_then(|s| s.to_str()).unwrap_or("temp")
    ));

    fs::write(&temp_path, content)?;
    fs::rename(&temp_path, path)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};
    use tempfile::TempDir;

    #[test]
    fn test_timestamped_path_shape() {
        let writer = ReportWriter::new("/tmp/reports");
        let path = writer.timestamped_path("test-report", "json");
        let name = path.file_name().unwrap().to_string_lossy().to_string();

        assert!(path.starts_with("/tmp/reports"));
        assert!(name.starts_with("test-report-"));
        assert!(name.ends_with(".json"));
        let stamp = name
            .trim_start_matches("test-report-")
            .trim_end_matches(".json");
        assert!(stamp.parse::<i64>().is_ok());
    }

    #[test]
    fn test_write_json_creates_directory() {
        let temp_dir = TempDir::new().unwrap();
        let writer = ReportWriter::new(temp_dir.path().join("nested").join("reports"));

        let path = writer
            .write_json("test-report", &json!({"passed": 3}))
            .unwrap();

        let written: Value = serde_json::from_slice(&fs::read(&path).unwrap()).unwrap();
        assert_eq!(written, json!({"passed": 3}));
        assert!(!path.with_extension("json.tmp").exists());
    }

    #[test]
    fn test_back_to_back_writes_keep_both_reports() {
        let temp_dir = TempDir::new().unwrap();
        let writer = ReportWriter::new(temp_dir.path());

        let first = writer.write_json("test-report", &json!({"run": 1})).unwrap();
        let second = writer.write_json("test-report", &json!({"run": 2})).unwrap();

        assert_ne!(first, second);
        assert_eq!(fs::read_dir(temp_dir.path()).unwrap().count(), 2);
        let first_body: Value = serde_json::from_slice(&fs::read(&first).unwrap()).unwrap();
        assert_eq!(first_body, json!({"run": 1}));
    }
}
