//! Standard body and the stream adapters around it.
//!
//! [`Body`] is the body type of the standard request/response pair: empty,
//! a single buffered payload, a boxed frame stream (the translated inbound
//! body), or a chunked file read. [`OutboundBody`] is what actually goes
//! back out through hyper: either one buffered payload or the piped stream
//! adapter pulling frames from a standard body.
//!
//! Both adapters are strictly pull-based. Nothing is read from the
//! underlying source until the consumer polls, and at most one frame is in
//! flight.

use std::pin::Pin;
use std::task::{Context, Poll};

use bytes::Bytes;
use http_body_util::combinators::BoxBody;
use http_body_util::{BodyExt, Full};
use hyper::body::{Body as HttpBody, Frame, SizeHint};
use tokio::fs::File;
use tokio::io::{AsyncRead, ReadBuf};

/// Error type carried by body streams and delegate calls.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Bytes read from the file per consumer pull.
const FILE_CHUNK: usize = 64 * 1024;

// ── Standard body ─────────────────────────────────────────────────────────────

/// Body of a standard request or response.
pub struct Body(Inner);

enum Inner {
    Empty,
    Full(Full<Bytes>),
    Boxed(BoxBody<Bytes, BoxError>),
    File(FileStream),
}

impl Body {
    /// A body with no payload.
    pub fn empty() -> Self {
        Self(Inner::Empty)
    }

    /// A single buffered payload.
    pub fn full(data: impl Into<Bytes>) -> Self {
        Self(Inner::Full(Full::new(data.into())))
    }

    /// Wraps any frame-based body as a standard body stream. This is how
    /// the inbound hyper body is attached to a translated request.
    pub fn wrap<B>(body: B) -> Self
    where
        B: HttpBody<Data = Bytes> + Send + Sync + 'static,
        B::Error: Into<BoxError>,
    {
        Self(Inner::Boxed(BoxBody::new(body.map_err(Into::into))))
    }

    pub(crate) fn file(stream: FileStream) -> Self {
        Self(Inner::File(stream))
    }

    /// Drains the remaining frames into one contiguous buffer.
    pub async fn collect_bytes(self) -> Result<Bytes, BoxError> {
        Ok(self.collect().await?.to_bytes())
    }
}

impl HttpBody for Body {
    type Data = Bytes;
    type Error = BoxError;

    fn poll_frame(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
    ) -> Poll<Option<Result<Frame<Bytes>, BoxError>>> {
        match &mut self.get_mut().0 {
            Inner::Empty => Poll::Ready(None),
            Inner::Full(full) => Pin::new(full)
                .poll_frame(cx)
                .map(|opt| opt.map(|res| res.map_err(Into::into))),
            Inner::Boxed(boxed) => Pin::new(boxed).poll_frame(cx),
            Inner::File(file) => Pin::new(file).poll_frame(cx),
        }
    }

    fn is_end_stream(&self) -> bool {
        match &self.0 {
            Inner::Empty => true,
            Inner::Full(full) => full.is_end_stream(),
            Inner::Boxed(boxed) => boxed.is_end_stream(),
            Inner::File(file) => file.is_end_stream(),
        }
    }

    fn size_hint(&self) -> SizeHint {
        match &self.0 {
            Inner::Empty => SizeHint::with_exact(0),
            Inner::Full(full) => full.size_hint(),
            Inner::Boxed(boxed) => boxed.size_hint(),
            Inner::File(file) => HttpBody::size_hint(file),
        }
    }
}

// ── File stream ───────────────────────────────────────────────────────────────

/// Pull-based chunked reader over an open file.
///
/// Each consumer poll issues at most one read of [`FILE_CHUNK`] bytes; a
/// zero-byte read signals end-of-stream.
pub(crate) struct FileStream {
    file: File,
    buf: Box<[u8]>,
    remaining: u64,
    done: bool,
}

impl FileStream {
    /// `len` is the file size reported by the metadata check that preceded
    /// the open; it only feeds the size hint.
    pub(crate) fn new(file: File, len: u64) -> Self {
        Self {
            file,
            buf: vec![0; FILE_CHUNK].into_boxed_slice(),
            remaining: len,
            done: false,
        }
    }
}

impl HttpBody for FileStream {
    type Data = Bytes;
    type Error = BoxError;

    fn poll_frame(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
    ) -> Poll<Option<Result<Frame<Bytes>, BoxError>>> {
        let this = self.get_mut();
        if this.done {
            return Poll::Ready(None);
        }

        let mut read_buf = ReadBuf::new(&mut this.buf);
        match Pin::new(&mut this.file).poll_read(cx, &mut read_buf) {
            Poll::Pending => Poll::Pending,
            Poll::Ready(Err(e)) => {
                this.done = true;
                this.remaining = 0;
                Poll::Ready(Some(Err(e.into())))
            }
            Poll::Ready(Ok(())) => {
                let filled = read_buf.filled();
                if filled.is_empty() {
                    this.done = true;
                    this.remaining = 0;
                    return Poll::Ready(None);
                }
                this.remaining = this.remaining.saturating_sub(filled.len() as u64);
                Poll::Ready(Some(Ok(Frame::data(Bytes::copy_from_slice(filled)))))
            }
        }
    }

    fn is_end_stream(&self) -> bool {
        self.done
    }

    fn size_hint(&self) -> SizeHint {
        SizeHint::with_exact(self.remaining)
    }
}

// ── Outbound body ─────────────────────────────────────────────────────────────

/// Body of the outbound response handed to hyper.
pub struct OutboundBody(OutboundKind);

enum OutboundKind {
    Buffered(Full<Bytes>),
    Streamed(Piped),
}

impl OutboundBody {
    /// A single buffered payload. Zero-length payloads are valid and send
    /// an empty body.
    pub(crate) fn buffered(data: Bytes) -> Self {
        Self(OutboundKind::Buffered(Full::new(data)))
    }

    /// Pipes a standard body out as a stream.
    pub(crate) fn streamed(body: Body) -> Self {
        Self(OutboundKind::Streamed(Piped { inner: body }))
    }
}

impl HttpBody for OutboundBody {
    type Data = Bytes;
    type Error = BoxError;

    fn poll_frame(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
    ) -> Poll<Option<Result<Frame<Bytes>, BoxError>>> {
        match &mut self.get_mut().0 {
            OutboundKind::Buffered(full) => Pin::new(full)
                .poll_frame(cx)
                .map(|opt| opt.map(|res| res.map_err(Into::into))),
            OutboundKind::Streamed(piped) => Pin::new(piped).poll_frame(cx),
        }
    }

    fn is_end_stream(&self) -> bool {
        match &self.0 {
            OutboundKind::Buffered(full) => full.is_end_stream(),
            OutboundKind::Streamed(piped) => piped.inner.is_end_stream(),
        }
    }

    fn size_hint(&self) -> SizeHint {
        match &self.0 {
            OutboundKind::Buffered(full) => full.size_hint(),
            OutboundKind::Streamed(piped) => piped.inner.size_hint(),
        }
    }
}

/// The stream adapter of the response path: forwards exactly one frame
/// from the wrapped standard body per consumer poll. Completion is the
/// inner body's completion; backpressure is the consumer's poll cadence.
struct Piped {
    inner: Body,
}

impl HttpBody for Piped {
    type Data = Bytes;
    type Error = BoxError;

    fn poll_frame(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
    ) -> Poll<Option<Result<Frame<Bytes>, BoxError>>> {
        Pin::new(&mut self.get_mut().inner).poll_frame(cx)
    }

    fn is_end_stream(&self) -> bool {
        self.inner.is_end_stream()
    }

    fn size_hint(&self) -> SizeHint {
        self.inner.size_hint()
    }
}
