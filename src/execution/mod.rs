//! Execution layer
//!
//! Everything between a built request body and a parsed response: the HTTP
//! transport seam, header construction and admission control.

pub mod http;
pub mod rate_limit;

pub use http::{
    ByteStream, HttpHeaderBuilder, HttpTransport, HttpTransportRequest, HttpTransportResponse,
    HttpTransportStreamResponse, ReqwestTransport,
};
pub use rate_limit::{IntervalRateLimiter, RateLimiter};
