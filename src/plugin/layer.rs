use super::body::{RecordGuard, RecordingBody};
use super::Promster;
use crate::domain::{content_length, RecordOn, RequestInfo, RequestStart};
use axum::body::Body;
use axum::extract::Request;
use axum::response::Response;
use futures::future::BoxFuture;
use http_body::Body as _;
use std::task::{Context, Poll};
use tower::{Layer, Service};

/// Layer applying [`PromsterService`] to every route it wraps.
///
/// Add it with `Router::layer` so the matched route template is available
/// for the `path` label.
#[derive(Clone)]
pub struct PromsterLayer {
    promster: Promster,
}

impl PromsterLayer {
    pub fn new(promster: Promster) -> Self {
        Self { promster }
    }
}

impl<S> Layer<S> for PromsterLayer {
    type Service = PromsterService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        PromsterService {
            inner,
            promster: self.promster.clone(),
        }
    }
}

/// Middleware timing each request from arrival to response finish.
#[derive(Clone)]
pub struct PromsterService<S> {
    inner: S,
    promster: Promster,
}

impl<S> Service<Request> for PromsterService<S>
where
    S: Service<Request, Response = Response> + Clone + Send + 'static,
    S::Future: Send + 'static,
    S::Error: Send + 'static,
{
    type Response = Response;
    type Error = S::Error;
    type Future = BoxFuture<'static, Result<Response, S::Error>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut req: Request) -> Self::Future {
        // ---
        // Request-start hook: stamp the start time and expose the plugin.
        let start = RequestStart::now();
        req.extensions_mut().insert(start);
        req.extensions_mut().insert(self.promster.clone());
        req.extensions_mut().insert(self.promster.recorder());

        let info = RequestInfo::from_request(&req);
        let request_length = info
            .content_length()
            .or_else(|| req.body().size_hint().exact());

        // The clone left behind has not been polled; the ready one handles this request.
        let clone = self.inner.clone();
        let mut inner = std::mem::replace(&mut self.inner, clone);
        let promster = self.promster.clone();

        Box::pin(async move {
            match inner.call(req).await {
                Ok(response) => Ok(on_response(&promster, &info, start, request_length, response)),
                Err(err) => {
                    on_error(&promster, &info, start, request_length);
                    Err(err)
                }
            }
        })
    }
}

/// Response-finish hook.
fn on_response(
    promster: &Promster,
    info: &RequestInfo,
    start: RequestStart,
    request_length: Option<u64>,
    response: Response,
) -> Response {
    // ---
    let status = response.status();
    let labels = promster.labels_for(info, Some(status));

    if !promster.should_record(info, Some(status), &labels) {
        return response;
    }

    match promster.options().record_on {
        RecordOn::Headers => {
            let response_length = content_length(response.headers())
                .or_else(|| response.body().size_hint().exact());
            promster.recorder().record_with_lengths(start.0, labels, request_length, response_length);
            response
        }
        RecordOn::BodyEnd => {
            let guard = RecordGuard::new(promster.recorder(), start.0, labels, request_length);
            response.map(|body| Body::new(RecordingBody::new(body, guard)))
        }
    }
}

/// The inner service failed before producing a response.
fn on_error(promster: &Promster, info: &RequestInfo, start: RequestStart, request_length: Option<u64>) {
    // ---
    let labels = promster.labels_for(info, None);
    if promster.should_record(info, None, &labels) {
        tracing::debug!(path = labels.path(), "Recording request that failed without a response");
        promster
            .recorder()
            .record_with_lengths(start.0, labels, request_length, None);
    }
}

