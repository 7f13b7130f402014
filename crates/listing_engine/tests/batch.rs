use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::{TimeZone, Utc};
use listing_core::{ErrorKind, ExtractionError, ExtractorSettings, ListingExtractor};
use listing_engine::{
    BatchCoordinator, DocumentProvider, EngineEvent, FetchError, FetchSettings,
    HttpDocumentProvider, JobId, ListingPipeline, LoadedPage, NullProgressSink, ProgressSink,
};
use pretty_assertions::assert_eq;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const LISTING: &str = r#"<html><body>
    <h1>Volkswagen Golf</h1>
    <div class="PriceInfo">15.000 €</div>
    <dl><dt>Leistung</dt><dd>110 kW</dd><dt>Kilometerstand</dt><dd>42.000 km</dd></dl>
</body></html>"#;

fn pipeline(provider: Arc<dyn DocumentProvider>) -> ListingPipeline {
    listing_logging::initialize_for_tests();
    let extractor = ListingExtractor::new(&ExtractorSettings::default()).unwrap();
    ListingPipeline::new(provider, extractor)
        .with_clock(Arc::new(|| Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()))
}

fn http_pipeline() -> ListingPipeline {
    pipeline(Arc::new(HttpDocumentProvider::new(FetchSettings::default())))
}

async fn serve(server: &MockServer, route: &str, response: ResponseTemplate) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(response)
        .mount(server)
        .await;
}

#[derive(Default)]
struct CountingProvider {
    calls: AtomicUsize,
}

#[async_trait::async_trait]
impl DocumentProvider for CountingProvider {
    async fn load(
        &self,
        _job_id: JobId,
        url: &str,
        _sink: &dyn ProgressSink,
    ) -> Result<LoadedPage, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        panic!("no load expected for {url}");
    }
}

#[derive(Default)]
struct CompletionSink {
    completed: Mutex<Vec<(JobId, bool)>>,
}

impl ProgressSink for CompletionSink {
    fn emit(&self, event: EngineEvent) {
        if let EngineEvent::JobCompleted { job_id, outcome, .. } = event {
            self.completed.lock().unwrap().push((job_id, outcome.is_ok()));
        }
    }
}

#[tokio::test]
async fn batch_records_failures_without_aborting() {
    let server = MockServer::start().await;
    serve(&server, "/a", ResponseTemplate::new(200).set_body_raw(LISTING, "text/html")).await;
    serve(&server, "/b", ResponseTemplate::new(404)).await;
    serve(&server, "/c", ResponseTemplate::new(200).set_body_raw(LISTING, "text/html")).await;

    let urls: Vec<String> = ["/a", "/b", "/c"]
        .iter()
        .map(|route| format!("{}{route}", server.uri()))
        .collect();
    let coordinator = BatchCoordinator::new(http_pipeline()).with_pacing(Duration::ZERO);
    let sink = CompletionSink::default();

    let summary = coordinator.run(&urls, &sink).await;

    assert_eq!(summary.imported, 2);
    assert_eq!(summary.failed, 1);
    assert_eq!(summary.data.len(), 2);
    assert_eq!(summary.errors.len(), 1);
    assert_eq!(summary.errors[0].url, urls[1]);
    assert_eq!(summary.errors[0].kind, ErrorKind::DocumentLoadFailure);
    assert!(summary.errors[0].error.contains("404"));
    assert_eq!(
        *sink.completed.lock().unwrap(),
        vec![(1, true), (2, false), (3, true)]
    );

    let json = serde_json::to_value(&summary).unwrap();
    assert_eq!(json["imported"], 2);
    assert_eq!(json["data"][0]["power"], 150);
    assert_eq!(json["errors"][0]["url"], urls[1].as_str());
}

#[tokio::test]
async fn batch_paces_consecutive_imports() {
    let server = MockServer::start().await;
    serve(&server, "/a", ResponseTemplate::new(200).set_body_raw(LISTING, "text/html")).await;

    let urls = vec![format!("{}/a", server.uri()), format!("{}/a", server.uri())];
    let coordinator =
        BatchCoordinator::new(http_pipeline()).with_pacing(Duration::from_millis(100));

    let started = std::time::Instant::now();
    let summary = coordinator.run(&urls, &NullProgressSink).await;

    assert_eq!(summary.imported, 2);
    assert!(started.elapsed() >= Duration::from_millis(100));
}

#[tokio::test]
async fn pipeline_rejects_invalid_url_before_loading() {
    let provider = Arc::new(CountingProvider::default());
    let pipeline = pipeline(provider.clone());

    let err = pipeline
        .import(1, "ftp://example.com/car", &NullProgressSink)
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::InvalidInput);
    assert_eq!(provider.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn pipeline_reports_missing_price() {
    let server = MockServer::start().await;
    serve(
        &server,
        "/no-price",
        ResponseTemplate::new(200).set_body_raw("<h1>Fiat 500</h1><p>Preis auf Anfrage</p>", "text/html"),
    )
    .await;

    let err = http_pipeline()
        .import(1, &format!("{}/no-price", server.uri()), &NullProgressSink)
        .await
        .unwrap_err();

    assert_eq!(err, ExtractionError::MissingPrice);
}

#[tokio::test]
async fn pipeline_stamps_records_with_injected_clock() {
    let server = MockServer::start().await;
    serve(&server, "/golf", ResponseTemplate::new(200).set_body_raw(LISTING, "text/html")).await;
    let url = format!("{}/golf", server.uri());

    let record = http_pipeline().import(1, &url, &NullProgressSink).await.unwrap();

    assert_eq!(record.title(), "Volkswagen Golf");
    assert_eq!(record.price(), 15_000);
    assert_eq!(record.mileage(), 42_000);
    assert_eq!(record.source_url(), url);
    assert_eq!(
        record.extracted_at(),
        Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()
    );
}
