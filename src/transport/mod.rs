//! 传输层：唯一的出站 HTTP 通道，负责基础地址、凭据与错误归一化。
//!
//! Transport client.
//!
//! | Component | Description |
//! |-----------|-------------|
//! | [`HttpTransport`] | reqwest client with cookie store, base URL and interceptor pipeline |
//! | [`RequestBody`] | JSON, empty or single-part multipart body |
//! | [`RequestConfig`] | Query parameters and per-request timeout |
//! | [`ApiError`] | Normalized failure: message, optional status, optional field errors |

mod error;
mod http;

pub use error::{ApiError, StatusClass, DEFAULT_ERROR_MESSAGE};
pub use http::{HttpTransport, RawResponse, RequestBody, RequestConfig};
