use bytes::Bytes;
use http_body::{Body, Frame, SizeHint};
use pin_project_lite::pin_project;
use std::pin::Pin;
use std::task::{Context, Poll, ready};

pin_project! {
    /// A body that ends after yielding `limit` bytes of data.
    ///
    /// Unlike `http_body_util::Limited`, reaching the limit is not an error: the stream simply
    /// ends, and whatever the inner body still holds is left unread.
    #[derive(Debug)]
    pub struct Truncated<B> {
        #[pin]
        inner: B,
        limit: u64,
        remaining: u64,
    }
}

impl<B> Truncated<B> {
    pub fn new(inner: B, limit: u64) -> Self {
        Self { inner, limit, remaining: limit }
    }

    pub fn limit(&self) -> u64 {
        self.limit
    }

    /// Number of data bytes that may still be yielded.
    pub fn remaining(&self) -> u64 {
        self.remaining
    }

    /// Returns the inner body. The unread part of a frame cut at the limit is not part of it.
    pub fn into_inner(self) -> B {
        self.inner
    }
}

impl<B> Body for Truncated<B>
where
    B: Body<Data = Bytes>,
{
    type Data = Bytes;
    type Error = B::Error;

    fn poll_frame(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Result<Frame<Self::Data>, Self::Error>>> {
        let this = self.project();

        // never poll the inner body once the limit is reached
        if *this.remaining == 0 {
            return Poll::Ready(None);
        }

        let frame = match ready!(this.inner.poll_frame(cx)) {
            Some(Ok(frame)) => frame,
            other => return Poll::Ready(other),
        };

        let frame = match frame.into_data() {
            Ok(mut data) => {
                match usize::try_from(*this.remaining) {
                    Ok(remaining) if remaining < data.len() => {
                        data.truncate(remaining);
                        *this.remaining = 0;
                    }
                    _ => *this.remaining -= data.len() as u64,
                }
                Frame::data(data)
            }
            Err(frame) => frame,
        };

        Poll::Ready(Some(Ok(frame)))
    }

    fn is_end_stream(&self) -> bool {
        self.remaining == 0 || self.inner.is_end_stream()
    }

    fn size_hint(&self) -> SizeHint {
        let inner = self.inner.size_hint();
        let mut hint = SizeHint::new();
        hint.set_lower(inner.lower().min(self.remaining));
        match inner.upper() {
            Some(upper) => hint.set_upper(upper.min(self.remaining)),
            None => hint.set_upper(self.remaining),
        }
        hint
    }
}
