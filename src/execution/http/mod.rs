//! HTTP plumbing shared by all adapters

pub mod headers;
pub mod transport;

pub use headers::HttpHeaderBuilder;
pub use transport::{
    ByteStream, HttpTransport, HttpTransportRequest, HttpTransportResponse,
    HttpTransportStreamResponse, ReqwestTransport, classify_status, extract_error_message,
};
