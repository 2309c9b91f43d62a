use crate::error::{BodyError, BoxError};
use bytes::Bytes;
use http_body::{Body, Frame, SizeHint};
use http_body_util::BodyExt;
use http_body_util::combinators::UnsyncBoxBody;
use std::fmt;
use std::pin::Pin;
use std::task::{Context, Poll};

/// The body carried by requests and responses that an [`HttpBuf`](crate::HttpBuf) captures.
///
/// A `BufBody` is a slot that can be swapped in place. It is in one of three states:
///
/// - a *stream*: any `http_body::Body` yielding [`Bytes`], typically the body a server or client
///   handed us;
/// - a *replay*: bytes already held in memory, which can be rewound and read again;
/// - *closed*: the stream was released and must not be read again, polling yields
///   [`BodyError::Closed`].
///
/// Closing a stream means dropping it. A replay owns nothing but its bytes, so closing it is a
/// no-op.
pub struct BufBody {
    kind: Kind,
}

enum Kind {
    Stream(UnsyncBoxBody<Bytes, BodyError>),
    Replay { bytes: Bytes, read: bool },
    Closed,
}

impl BufBody {
    /// Wraps an arbitrary body as a stream.
    pub fn new<B>(body: B) -> Self
    where
        B: Body<Data = Bytes> + Send + 'static,
        B::Error: Into<BoxError>,
    {
        Self { kind: Kind::Stream(body.map_err(BodyError::stream).boxed_unsync()) }
    }

    pub fn empty() -> Self {
        Self::replay(Bytes::new())
    }

    /// A re-readable body replaying `bytes` from the beginning.
    pub fn replay(bytes: Bytes) -> Self {
        Self { kind: Kind::Replay { bytes, read: false } }
    }

    pub fn closed() -> Self {
        Self { kind: Kind::Closed }
    }

    pub fn is_replay(&self) -> bool {
        matches!(self.kind, Kind::Replay { .. })
    }

    pub fn is_closed(&self) -> bool {
        matches!(self.kind, Kind::Closed)
    }

    /// Drops the underlying stream and leaves the body closed.
    ///
    /// Closing a replay or an already closed body does nothing: a replay holds no stream, and
    /// stays readable.
    pub fn close(&mut self) {
        if let Kind::Stream(_) = self.kind {
            self.kind = Kind::Closed;
        }
    }

    /// Moves the current body out, leaving this one closed.
    pub fn take(&mut self) -> BufBody {
        std::mem::replace(self, BufBody::closed())
    }

    /// Resets a replay body to its first byte.
    ///
    /// Returns `false` for stream and closed bodies, which cannot be rewound.
    pub fn rewind(&mut self) -> bool {
        match &mut self.kind {
            Kind::Replay { read, .. } => {
                *read = false;
                true
            }
            _ => false,
        }
    }

    /// Creates an independent handle over the same replayed bytes, starting from the beginning.
    pub fn try_clone(&self) -> Option<BufBody> {
        self.replay_bytes().cloned().map(BufBody::replay)
    }

    pub fn replay_bytes(&self) -> Option<&Bytes> {
        match &self.kind {
            Kind::Replay { bytes, .. } => Some(bytes),
            _ => None,
        }
    }
}

impl Default for BufBody {
    fn default() -> Self {
        Self::empty()
    }
}

impl fmt::Debug for BufBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            Kind::Stream(_) => f.write_str("BufBody::Stream"),
            Kind::Replay { bytes, read } => f.debug_struct("BufBody::Replay").field("len", &bytes.len()).field("read", read).finish(),
            Kind::Closed => f.write_str("BufBody::Closed"),
        }
    }
}

impl From<Bytes> for BufBody {
    fn from(bytes: Bytes) -> Self {
        Self::replay(bytes)
    }
}

impl From<Vec<u8>> for BufBody {
    fn from(vec: Vec<u8>) -> Self {
        Self::replay(Bytes::from(vec))
    }
}

impl From<String> for BufBody {
    fn from(value: String) -> Self {
        Self::replay(Bytes::from(value))
    }
}

impl From<&'static str> for BufBody {
    fn from(value: &'static str) -> Self {
        Self::replay(Bytes::from_static(value.as_bytes()))
    }
}

impl Body for BufBody {
    type Data = Bytes;
    type Error = BodyError;

    fn poll_frame(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Result<Frame<Self::Data>, Self::Error>>> {
        match &mut self.get_mut().kind {
            Kind::Stream(body) => Pin::new(body).poll_frame(cx),
            Kind::Replay { read: true, .. } => Poll::Ready(None),
            Kind::Replay { bytes, read } => {
                *read = true;
                if bytes.is_empty() { Poll::Ready(None) } else { Poll::Ready(Some(Ok(Frame::data(bytes.clone())))) }
            }
            Kind::Closed => Poll::Ready(Some(Err(BodyError::Closed))),
        }
    }

    fn is_end_stream(&self) -> bool {
        match &self.kind {
            Kind::Stream(body) => body.is_end_stream(),
            Kind::Replay { bytes, read } => *read || bytes.is_empty(),
            Kind::Closed => false,
        }
    }

    fn size_hint(&self) -> SizeHint {
        match &self.kind {
            Kind::Stream(body) => body.size_hint(),
            Kind::Replay { read: true, .. } => SizeHint::with_exact(0),
            Kind::Replay { bytes, .. } => SizeHint::with_exact(bytes.len() as u64),
            // polling yields an error, not an empty body
            Kind::Closed => SizeHint::default(),
        }
    }
}
