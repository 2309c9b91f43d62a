use crate::body::{BufBody, Truncated};
use crate::error::{BodyError, CallError};
use bytes::{Bytes, BytesMut};
use http::{Request, Response};
use http_body::Body;
use http_body_util::BodyExt;
use tracing::{debug, trace};

/// Captures request and response bodies into a caller supplied buffer.
///
/// Every read operation:
///
/// 1. clears the buffer,
/// 2. takes the body out of the message and reads it into the buffer,
/// 3. drops the original body, whether reading succeeded or not,
/// 4. on success installs a [`BufBody`] replaying a copy of the captured bytes, so the message
///    can be read again by whoever handles it next. On failure the body is left closed.
///
/// The message is mutated in place: swapping its body is the point of the operation.
///
/// A limit set with [`HttpBuf::limited`] applies to request bodies only. Response bodies are
/// always read to the end.
///
/// # Example
///
/// ```
/// use bytes::BytesMut;
/// use http::Request;
/// use http_body_util::BodyExt;
/// use micro_httpbuf::{BufBody, HttpBuf};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
/// let mut request = Request::new(BufBody::from(r#"{"key":7}"#));
///
/// let mut buf = BytesMut::new();
/// HttpBuf::new(&mut buf).read_request(&mut request).await?;
/// assert_eq!(&buf[..], br#"{"key":7}"#);
///
/// // the body is still there for the next reader
/// let body = request.into_body().collect().await?.to_bytes();
/// assert_eq!(&body[..], br#"{"key":7}"#);
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct HttpBuf<'a> {
    contents: &'a mut BytesMut,
    limit: Option<u64>,
}

impl<'a> HttpBuf<'a> {
    /// Creates a buffer capturing bodies of any size.
    pub fn new(contents: &'a mut BytesMut) -> Self {
        Self { contents, limit: None }
    }

    /// Creates a buffer that stops reading request bodies after `n` bytes.
    ///
    /// A negative `n` is treated as zero: nothing is captured.
    pub fn limited(contents: &'a mut BytesMut, n: i64) -> Self {
        Self { contents, limit: Some(u64::try_from(n).unwrap_or(0)) }
    }

    pub fn limit(&self) -> Option<u64> {
        self.limit
    }

    /// The bytes captured by the last read operation.
    pub fn contents(&self) -> &[u8] {
        self.contents.as_ref()
    }

    /// Reads the request body into the buffer, up to the limit if one is set, and replaces it
    /// with a replay of the captured bytes.
    ///
    /// Bytes past the limit are left unread in the original body, which is dropped.
    ///
    /// # Errors
    ///
    /// Returns the [`BodyError`] the request body failed with. The body is then left closed and
    /// the buffer holds the bytes read before the failure.
    pub async fn read_request(&mut self, request: &mut Request<BufBody>) -> Result<(), BodyError> {
        let limit = self.limit;
        self.capture(request.body_mut(), limit).await?;

        let size = self.contents.len() as u64;
        if limit.is_some_and(|limit| size == limit) {
            debug!(limit = size, "request body capture reached limit");
        }
        trace!(size, "captured request body");
        Ok(())
    }

    /// Reads the whole response body into the buffer and replaces it with a replay of the
    /// captured bytes. The limit is not applied.
    ///
    /// # Errors
    ///
    /// Returns the [`BodyError`] the response body failed with. The body is then left closed and
    /// the buffer holds the bytes read before the failure.
    pub async fn read_response(&mut self, response: &mut Response<BufBody>) -> Result<(), BodyError> {
        self.capture(response.body_mut(), None).await?;

        trace!(size = self.contents.len(), "captured response body");
        Ok(())
    }

    /// Takes the result of a request-issuing call and reads its response.
    ///
    /// - If the call failed with a partial response, that response's body is closed and the
    ///   error is returned unchanged. A body that is already a replay is left readable.
    /// - If the call succeeded, the response is read with [`HttpBuf::read_response`].
    ///
    /// # Errors
    ///
    /// - [`CallError::Request`] and [`CallError::Body`] passed in are returned as they are.
    /// - A failure reading the response body is returned as [`CallError::Body`] together with the
    ///   response, whose body is then closed.
    pub async fn read_call<E>(&mut self, result: Result<Response<BufBody>, CallError<E>>) -> Result<Response<BufBody>, CallError<E>> {
        match result {
            Ok(mut response) => match self.read_response(&mut response).await {
                Ok(()) => Ok(response),
                Err(source) => Err(CallError::Body { source, response }),
            },

            Err(CallError::Request { source, response: Some(mut response) }) => {
                debug!(status = %response.status(), "closing response body of failed request");
                response.body_mut().close();
                Err(CallError::Request { source, response: Some(response) })
            }

            Err(e) => Err(e),
        }
    }

    async fn capture(&mut self, slot: &mut BufBody, limit: Option<u64>) -> Result<(), BodyError> {
        self.contents.clear();

        // the slot stays closed until reading succeeds, drain drops the original on every path
        let original = slot.take();
        match limit {
            Some(limit) => drain(Truncated::new(original, limit), self.contents).await?,
            None => drain(original, self.contents).await?,
        }

        *slot = BufBody::replay(Bytes::copy_from_slice(self.contents.as_ref()));
        Ok(())
    }
}

/// Appends every data frame of `body` to `contents`. Trailers are skipped.
async fn drain<B>(mut body: B, contents: &mut BytesMut) -> Result<(), B::Error>
where
    B: Body<Data = Bytes> + Unpin,
{
    while let Some(frame) = body.frame().await {
        if let Ok(data) = frame?.into_data() {
            contents.extend_from_slice(&data);
        }
    }
    Ok(())
}
