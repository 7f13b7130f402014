use std::collections::HashSet;
use std::time::Duration;

use listing_core::{ErrorKind, ExtractionError, VehicleRecord};
use listing_logging::{listing_info, listing_warn};
use serde::{Deserialize, Serialize};

use crate::fetch::ProgressSink;
use crate::pipeline::ListingPipeline;

pub const DEFAULT_PACING: Duration = Duration::from_secs(1);

/// Result of a batch import: successes in input order plus one entry per
/// failed URL.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BatchSummary {
    pub imported: usize,
    pub failed: usize,
    pub data: Vec<VehicleRecord>,
    pub errors: Vec<BatchFailure>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchFailure {
    pub url: String,
    pub kind: ErrorKind,
    pub error: String,
}

/// Error body for a failed single import.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorPayload {
    pub error: String,
    pub kind: ErrorKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub debug: Option<String>,
}

impl ErrorPayload {
    pub fn from_error(err: &ExtractionError, debug: bool) -> Self {
        Self {
            error: err.to_string(),
            kind: err.kind(),
            debug: debug.then(|| format!("{err:?}")),
        }
    }
}

/// Runs imports one after another, pausing between consecutive URLs.
pub struct BatchCoordinator {
    pipeline: ListingPipeline,
    pacing: Duration,
}

impl BatchCoordinator {
    pub fn new(pipeline: ListingPipeline) -> Self {
        Self {
            pipeline,
            pacing: DEFAULT_PACING,
        }
    }

    pub fn with_pacing(mut self, pacing: Duration) -> Self {
        self.pacing = pacing;
        self
    }

    pub fn pipeline(&self) -> &ListingPipeline {
        &self.pipeline
    }

    pub async fn run(&self, urls: &[String], sink: &dyn ProgressSink) -> BatchSummary {
        let mut summary = BatchSummary::default();

        for (index, url) in urls.iter().enumerate() {
            if index > 0 && !self.pacing.is_zero() {
                tokio::time::sleep(self.pacing).await;
            }

            let job_id = index as u64 + 1;
            match self.pipeline.import(job_id, url, sink).await {
                Ok(record) => {
                    summary.imported += 1;
                    summary.data.push(record);
                }
                Err(err) => {
                    listing_warn!("batch: {url} failed: {err}");
                    summary.failed += 1;
                    summary.errors.push(BatchFailure {
                        url: url.clone(),
                        kind: err.kind(),
                        error: err.to_string(),
                    });
                }
            }
        }

        listing_info!(
            "batch finished: {} imported, {} failed",
            summary.imported,
            summary.failed
        );
        summary
    }
}

/// Splits pasted input into URLs: one per line, trimmed, blank lines and
/// `#` comments skipped, duplicates dropped.
pub fn parse_url_list(raw: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    raw.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .filter(|line| seen.insert(*line))
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn url_list_skips_blanks_comments_and_duplicates() {
        let raw = "  https://a.example/1 \n\n# later\nhttps://a.example/2\nhttps://a.example/1\n";
        assert_eq!(
            parse_url_list(raw),
            vec![
                "https://a.example/1".to_string(),
                "https://a.example/2".to_string()
            ]
        );
    }

    #[test]
    fn payload_carries_debug_only_on_request() {
        let payload = ErrorPayload::from_error(&ExtractionError::MissingPrice, false);
        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(json["error"], "listing has no price");
        assert_eq!(json["kind"], "missingPrice");
        assert!(json.get("debug").is_none());

        let payload = ErrorPayload::from_error(&ExtractionError::MissingPrice, true);
        assert_eq!(payload.debug.as_deref(), Some("MissingPrice"));
    }
}
