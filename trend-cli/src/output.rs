//! Writing rendered reports to disk

use std::path::{Path, PathBuf};
use tracing::info;
use trend_core::{TrendError, TrendResult};
use trend_services::{ReportFormat, TrendReport};

/// Render `report` in every format and write each to `out_dir`
///
/// Returns the paths written, in format order.
pub async fn write_reports(
    report: &TrendReport,
    out_dir: &Path,
    formats: &[ReportFormat],
) -> TrendResult<Vec<PathBuf>> {
    tokio::fs::create_dir_all(out_dir).await.map_err(|e| {
        TrendError::io(format!("Failed to create {}: {}", out_dir.display(), e))
    })?;

    let mut written = Vec::with_capacity(formats.len());
    for format in formats {
        let path = out_dir.join(format.file_name());
        let body = format.render(report)?;
        tokio::fs::write(&path, body)
            .await
            .map_err(|e| TrendError::io(format!("Failed to write {}: {}", path.display(), e)))?;
        info!("Wrote {} report to {}", format, path.display());
        written.push(path);
    }

    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn empty_report() -> TrendReport {
        TrendReport {
            generated_at: "2020-11-06T09:00:00Z".parse().unwrap(),
            latest_capture: None,
            captures: 0,
            races: Vec::new(),
        }
    }

    #[tokio::test]
    async fn test_writes_every_format() {
        let dir = tempfile::tempdir().unwrap();
        let out_dir = dir.path().join("reports");

        let written = write_reports(&empty_report(), &out_dir, &ReportFormat::ALL)
            .await
            .unwrap();

        assert_eq!(written.len(), 3);
        for path in &written {
            assert!(path.exists(), "{} missing", path.display());
        }

        let json = std::fs::read_to_string(out_dir.join("battleground-state-changes.json")).unwrap();
        assert!(json.contains("\"captures\": 0"));
        let text = std::fs::read_to_string(out_dir.join("battleground-state-changes.txt")).unwrap();
        assert!(text.starts_with("Election trends"));
    }
}
