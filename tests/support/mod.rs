//! Shared helpers for integration tests
#![allow(dead_code)]

pub mod fake_transport;
pub mod stream_fixture;

pub use fake_transport::{FakeTransport, RecordingTracer};
pub use stream_fixture::{fixture, load_sse_fixture_as_chunks};
