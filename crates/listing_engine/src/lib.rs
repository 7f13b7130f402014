//! Listing engine: page loading, single imports and paced batches.
mod batch;
mod decode;
mod fetch;
mod pipeline;
mod types;

pub use batch::{
    parse_url_list, BatchCoordinator, BatchFailure, BatchSummary, ErrorPayload, DEFAULT_PACING,
};
pub use decode::{decode_html, DecodeError, DecodedHtml};
pub use fetch::{
    DocumentProvider, FetchSettings, HttpDocumentProvider, LogProgressSink, NullProgressSink,
    ProgressSink, DEFAULT_USER_AGENT,
};
pub use pipeline::{Clock, ListingPipeline};
pub use types::{
    EngineEvent, FailureKind, FetchError, FetchMetadata, JobId, JobProgress, LoadedPage, Stage,
};
