use std::sync::Arc;

use chrono::{DateTime, Utc};
use listing_core::{validate_url, ExtractionError, ListingExtractor, VehicleRecord};

use crate::fetch::{DocumentProvider, ProgressSink};
use crate::{EngineEvent, JobId, JobProgress, Stage};

/// Source of the `extractedAt` timestamp.
pub type Clock = Arc<dyn Fn() -> DateTime<Utc> + Send + Sync>;

/// Load one listing and turn it into a record.
pub struct ListingPipeline {
    provider: Arc<dyn DocumentProvider>,
    extractor: ListingExtractor,
    clock: Clock,
}

impl ListingPipeline {
    pub fn new(provider: Arc<dyn DocumentProvider>, extractor: ListingExtractor) -> Self {
        Self {
            provider,
            extractor,
            clock: Arc::new(Utc::now),
        }
    }

    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    pub fn extractor(&self) -> &ListingExtractor {
        &self.extractor
    }

    /// Runs one import and reports its completion to `sink`.
    pub async fn import(
        &self,
        job_id: JobId,
        url: &str,
        sink: &dyn ProgressSink,
    ) -> Result<VehicleRecord, ExtractionError> {
        let outcome = self.run(job_id, url, sink).await;
        sink.emit(EngineEvent::JobCompleted {
            job_id,
            url: url.to_string(),
            outcome: outcome
                .as_ref()
                .map(|record| record.id().to_string())
                .map_err(Clone::clone),
        });
        outcome
    }

    async fn run(
        &self,
        job_id: JobId,
        url: &str,
        sink: &dyn ProgressSink,
    ) -> Result<VehicleRecord, ExtractionError> {
        emit_stage(sink, job_id, Stage::Queued);
        let page_url = validate_url(url)?;

        let page = self.provider.load(job_id, page_url.as_str(), sink).await?;

        emit_stage(sink, job_id, Stage::Extracting);
        let record = self
            .extractor
            .extract_html(page_url.as_str(), &page.html, (self.clock)())?;
        emit_stage(sink, job_id, Stage::Done);
        Ok(record)
    }
}

fn emit_stage(sink: &dyn ProgressSink, job_id: JobId, stage: Stage) {
    sink.emit(EngineEvent::Progress(JobProgress {
        job_id,
        stage,
        bytes: None,
    }));
}
