use crate::body::BufBody;
use http::Response;
use std::error::Error as StdError;
use thiserror::Error;

pub type BoxError = Box<dyn StdError + Send + Sync>;

/// Errors produced while reading a [`BufBody`].
#[derive(Debug, Error)]
pub enum BodyError {
    /// The underlying body stream failed, the original error is kept as the source.
    #[error("body stream error: {source}")]
    Stream { source: BoxError },

    #[error("body has been closed")]
    Closed,
}

impl BodyError {
    pub fn stream<E: Into<BoxError>>(e: E) -> Self {
        Self::Stream { source: e.into() }
    }

    pub fn closed() -> Self {
        Self::Closed
    }

    pub fn is_closed(&self) -> bool {
        matches!(self, Self::Closed)
    }

    /// Returns the error the underlying stream failed with, if any.
    pub fn into_source(self) -> Option<BoxError> {
        match self {
            Self::Stream { source } => Some(source),
            Self::Closed => None,
        }
    }
}

/// The failure of a request-issuing call, optionally carrying the response it managed to produce.
///
/// `Request` is what the caller builds from its client's error, `Body` is what
/// [`HttpBuf::read_call`](crate::HttpBuf::read_call) returns when the call itself succeeded
/// but its response body could not be read.
#[derive(Debug, Error)]
pub enum CallError<E> {
    #[error("request error: {source}")]
    Request { source: E, response: Option<Response<BufBody>> },

    #[error("response body error: {source}")]
    Body { source: BodyError, response: Response<BufBody> },
}

impl<E> CallError<E> {
    pub fn request(source: E) -> Self {
        Self::Request { source, response: None }
    }

    pub fn partial(source: E, response: Response<BufBody>) -> Self {
        Self::Request { source, response: Some(response) }
    }

    pub fn response(&self) -> Option<&Response<BufBody>> {
        match self {
            Self::Request { response, .. } => response.as_ref(),
            Self::Body { response, .. } => Some(response),
        }
    }

    pub fn into_response(self) -> Option<Response<BufBody>> {
        match self {
            Self::Request { response, .. } => response,
            Self::Body { response, .. } => Some(response),
        }
    }
}
