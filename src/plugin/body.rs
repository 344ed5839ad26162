use super::RequestRecorder;
use crate::domain::{RequestLabels, RequestSample};
use axum::body::{Body, Bytes};
use http_body::{Frame, SizeHint};
use std::pin::Pin;
use std::task::{Context, Poll};
use std::time::Instant;

/// Records one request sample, at the latest when dropped.
pub(crate) struct RecordGuard {
    recorder: RequestRecorder,
    start: Instant,
    labels: Option<RequestLabels>,
    request_length: Option<u64>,
    sent: u64,
}

impl RecordGuard {
    // ---
    pub(crate) fn new(
        recorder: RequestRecorder,
        start: Instant,
        labels: RequestLabels,
        request_length: Option<u64>,
    ) -> Self {
        // ---
        Self {
            recorder,
            start,
            labels: Some(labels),
            request_length,
            sent: 0,
        }
    }

    fn add_sent(&mut self, bytes: usize) {
        self.sent += bytes as u64;
    }

    fn finish(&mut self) {
        // ---
        if let Some(labels) = self.labels.take() {
            self.recorder.record_sample(&RequestSample {
                labels,
                duration: self.start.elapsed(),
                request_content_length: self.request_length,
                response_content_length: Some(self.sent),
            });
        }
    }
}

impl Drop for RecordGuard {
    fn drop(&mut self) {
        self.finish();
    }
}

/// Response body that records the request once it is fully streamed.
///
/// Bodies abandoned mid-stream (client disconnects) are recorded on drop
/// with the bytes sent so far.
pub(crate) struct RecordingBody {
    inner: Body,
    guard: RecordGuard,
}

impl RecordingBody {
    pub(crate) fn new(inner: Body, guard: RecordGuard) -> Self {
        Self { inner, guard }
    }
}

impl http_body::Body for RecordingBody {
    type Data = Bytes;
    type Error = axum::Error;

    fn poll_frame(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
    ) -> Poll<Option<Result<Frame<Self::Data>, Self::Error>>> {
        // ---
        let this = self.get_mut();
        let polled = Pin::new(&mut this.inner).poll_frame(cx);

        match &polled {
            Poll::Ready(Some(Ok(frame))) => {
                if let Some(data) = frame.data_ref() {
                    this.guard.add_sent(data.len());
                }
                if this.inner.is_end_stream() {
                    this.guard.finish();
                }
            }
            Poll::Ready(None) => this.guard.finish(),
            Poll::Ready(Some(Err(_))) | Poll::Pending => {}
        }

        polled
    }

    fn is_end_stream(&self) -> bool {
        self.inner.is_end_stream()
    }

    fn size_hint(&self) -> SizeHint {
        self.inner.size_hint()
    }
}
