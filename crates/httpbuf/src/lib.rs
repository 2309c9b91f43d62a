//! Capture HTTP request and response bodies without losing them.
//!
//! Reading an `http_body::Body` consumes it: once a middleware has looked at the payload, the
//! handler after it has nothing left to read. This crate reads the body into a caller supplied
//! [`BytesMut`](bytes::BytesMut), drops the original stream and installs a replay of the captured
//! bytes on the same message, so it stays usable downstream.
//!
//! # Example
//!
//! ```
//! use bytes::BytesMut;
//! use http::{Response, StatusCode};
//! use micro_httpbuf::{BufBody, CallError, HttpBuf};
//! use std::io;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! async fn call() -> Result<Response<BufBody>, io::Error> {
//!     Ok(Response::new(BufBody::from("OK")))
//! }
//!
//! let mut buf = BytesMut::new();
//! let response = HttpBuf::new(&mut buf)
//!     .read_call(call().await.map_err(CallError::request))
//!     .await
//!     .unwrap();
//!
//! assert_eq!(response.status(), StatusCode::OK);
//! assert_eq!(&buf[..], b"OK");
//! # }
//! ```
//!
//! # Components
//!
//! - [`HttpBuf`]: the capturing buffer with its three read operations,
//!   [`read_request`](HttpBuf::read_request), [`read_response`](HttpBuf::read_response) and
//!   [`read_call`](HttpBuf::read_call).
//! - [`BufBody`]: the body type of captured messages. Any body yielding `Bytes` can be put into it
//!   with [`BufBody::new`], e.g. `request.map(BufBody::new)`.
//! - [`body::Truncated`]: the wrapper enforcing the request size limit.
//!
//! # Errors
//!
//! - [`BodyError`]: reading the body failed, or the body had already been closed.
//! - [`CallError`]: the request-issuing call failed, or its response body could not be read.
//!
//! Exceeding the limit is not an error, the captured bytes are silently truncated.

pub mod body;

mod buffer;
mod error;

pub use body::BufBody;
pub use buffer::HttpBuf;
pub use error::BodyError;
pub use error::BoxError;
pub use error::CallError;
