//! JSON snapshots of scrape runs.
//!
//! # Output Structure
//!
//! Files are organized by UTC date, one file per run:
//! ```text
//! json_output_dir/
//! └── 2025-05-06/
//!     ├── 081500.json
//!     └── 201033.json
//! ```

use chrono::{DateTime, Utc};
use std::path::PathBuf;
use tokio::fs;
use tracing::{error, info, instrument};

use crate::BoxError;
use crate::models::ScrapeReport;

/// Write a [`ScrapeReport`] to `{json_output_dir}/{date}/{HHMMSS}.json`.
///
/// Returns the path written.
#[instrument(level = "info", skip_all, fields(json_output_dir = %json_output_dir))]
pub async fn write_report(
    report: &ScrapeReport,
    json_output_dir: &str,
    at: DateTime<Utc>,
) -> Result<PathBuf, BoxError> {
    let json = serde_json::to_string_pretty(report)?;

    let full_json_dir = PathBuf::from(json_output_dir).join(at.format("%Y-%m-%d").to_string());
    info!(full_json_dir = %full_json_dir.display(), "Ensuring JSON directory exists");
    if let Err(e) = fs::create_dir_all(&full_json_dir).await {
        error!(full_json_dir = %full_json_dir.display(), error = %e, "Failed to create JSON dir");
        return Err(e.into());
    }

    let output_json_filename = full_json_dir.join(format!("{}.json", at.format("%H%M%S")));
    fs::write(&output_json_filename, json).await?;
    info!(path = %output_json_filename.display(), "Wrote scrape report");

    Ok(output_json_filename)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ScrapeStats;
    use chrono::TimeZone;

    #[tokio::test]
    async fn test_write_report_layout() {
        let dir = std::env::temp_dir().join(format!(
            "news_ticker_json_{}",
            crate::utils::random_token(8)
        ));
        let report = ScrapeReport {
            stats: ScrapeStats {
                total_scraped: 3,
                unique_articles: 2,
                inserted: 2,
            },
            articles: Vec::new(),
        };
        let at = Utc.with_ymd_and_hms(2025, 5, 6, 20, 10, 33).unwrap();

        let path = write_report(&report, dir.to_str().unwrap(), at).await.unwrap();
        assert_eq!(path, dir.join("2025-05-06").join("201033.json"));

        let written: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(written["stats"]["unique_articles"], 2);
        let _ = std::fs::remove_dir_all(&dir);
    }
}
