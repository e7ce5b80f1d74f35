//! In-memory transport and tracer doubles

use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::header::HeaderMap;
use unillm::LlmError;
use unillm::execution::{
    HttpTransport, HttpTransportRequest, HttpTransportResponse, HttpTransportStreamResponse,
};
use unillm::observability::{TraceEvent, Tracer};

/// Serves one canned status and body for every call and records the requests.
pub struct FakeTransport {
    status: u16,
    json_body: String,
    sse_chunks: Vec<Bytes>,
    calls: AtomicUsize,
    requests: Mutex<Vec<HttpTransportRequest>>,
}

impl FakeTransport {
    pub fn json(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            json_body: body.into(),
            sse_chunks: Vec::new(),
            calls: AtomicUsize::new(0),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn sse(chunks: Vec<Bytes>) -> Self {
        Self {
            status: 200,
            json_body: String::new(),
            sse_chunks: chunks,
            calls: AtomicUsize::new(0),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn requests(&self) -> Vec<HttpTransportRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn last_body(&self) -> serde_json::Value {
        self.requests().last().expect("no request sent").body.clone()
    }

    fn record(&self, request: HttpTransportRequest) {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().unwrap().push(request);
    }
}

#[async_trait]
impl HttpTransport for FakeTransport {
    async fn execute_json(
        &self,
        request: HttpTransportRequest,
    ) -> Result<HttpTransportResponse, LlmError> {
        self.record(request);
        Ok(HttpTransportResponse {
            status: self.status,
            headers: HeaderMap::new(),
            body: self.json_body.as_bytes().to_vec(),
        })
    }

    async fn execute_stream(
        &self,
        request: HttpTransportRequest,
    ) -> Result<HttpTransportStreamResponse, LlmError> {
        self.record(request);
        let chunks: Vec<Result<Bytes, LlmError>> =
            self.sse_chunks.iter().cloned().map(Ok).collect();
        Ok(HttpTransportStreamResponse {
            status: self.status,
            headers: HeaderMap::new(),
            body: Box::pin(futures::stream::iter(chunks)),
        })
    }
}

#[derive(Default)]
pub struct RecordingTracer {
    events: Mutex<Vec<TraceEvent>>,
}

impl RecordingTracer {
    pub fn events(&self) -> Vec<TraceEvent> {
        self.events.lock().unwrap().clone()
    }
}

impl Tracer for RecordingTracer {
    fn record(&self, event: &TraceEvent) {
        self.events.lock().unwrap().push(event.clone());
    }
}
