use std::pin::Pin;
use std::task::{Context, Poll};

use bytes::{Buf, Bytes};
use http_body::{Body as HttpBody, Frame, SizeHint};
use pin_project::pin_project;

/// Response body produced by [`OfflineCacheService`](crate::OfflineCacheService).
///
/// - [`Complete`](OfflineBody::Complete): the response went through the
///   router and was fully buffered (live, cached or synthesized)
/// - [`Passthrough`](OfflineBody::Passthrough): the request was bypassed and
///   the inner service's body is streamed untouched
#[pin_project(project = OfflineBodyProj)]
#[derive(Debug)]
pub enum OfflineBody<B> {
    /// Buffered body. The `Option` yields the data once, then ends the stream.
    Complete(Option<Bytes>),
    /// Untouched body of the inner service.
    Passthrough(#[pin] B),
}

impl<B> OfflineBody<B> {
    /// Creates a buffered body. Empty bodies end immediately.
    pub fn complete(bytes: Bytes) -> Self {
        if bytes.is_empty() {
            OfflineBody::Complete(None)
        } else {
            OfflineBody::Complete(Some(bytes))
        }
    }
}

impl<B> HttpBody for OfflineBody<B>
where
    B: HttpBody,
{
    type Data = Bytes;
    type Error = B::Error;

    fn poll_frame(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
    ) -> Poll<Option<Result<Frame<Self::Data>, Self::Error>>> {
        match self.project() {
            OfflineBodyProj::Complete(data) => match data.take() {
                Some(bytes) => Poll::Ready(Some(Ok(Frame::data(bytes)))),
                None => Poll::Ready(None),
            },
            OfflineBodyProj::Passthrough(body) => match body.poll_frame(cx) {
                Poll::Ready(Some(Ok(frame))) => {
                    let frame = frame.map_data(|mut data| data.copy_to_bytes(data.remaining()));
                    Poll::Ready(Some(Ok(frame)))
                }
                Poll::Ready(Some(Err(e))) => Poll::Ready(Some(Err(e))),
                Poll::Ready(None) => Poll::Ready(None),
                Poll::Pending => Poll::Pending,
            },
        }
    }

    fn size_hint(&self) -> SizeHint {
        match self {
            OfflineBody::Complete(Some(bytes)) => SizeHint::with_exact(bytes.len() as u64),
            OfflineBody::Complete(None) => SizeHint::with_exact(0),
            OfflineBody::Passthrough(body) => body.size_hint(),
        }
    }

    fn is_end_stream(&self) -> bool {
        match self {
            OfflineBody::Complete(data) => data.is_none(),
            OfflineBody::Passthrough(body) => body.is_end_stream(),
        }
    }
}

#[cfg(test)]
mod tests {
    use http_body_util::{BodyExt, Full};

    use super::*;

    #[tokio::test]
    async fn complete_body_yields_once() {
        let body: OfflineBody<Full<Bytes>> = OfflineBody::complete(Bytes::from_static(b"[]"));
        assert_eq!(body.size_hint().exact(), Some(2));

        let collected = body.collect().await.unwrap().to_bytes();
        assert_eq!(collected, Bytes::from_static(b"[]"));
    }

    #[tokio::test]
    async fn passthrough_streams_inner_body() {
        let body = OfflineBody::Passthrough(Full::new(Bytes::from_static(b"created")));
        assert!(!body.is_end_stream());

        let collected = body.collect().await.unwrap().to_bytes();
        assert_eq!(collected, Bytes::from_static(b"created"));
    }

    #[test]
    fn empty_complete_body_is_finished() {
        let body: OfflineBody<Full<Bytes>> = OfflineBody::complete(Bytes::new());
        assert!(body.is_end_stream());
    }
}
