//! Request span middleware.
//!
//! Wraps every request in a `submission_request` span carrying the method,
//! path, fake flag, caller trace id and final status. The TAN header is
//! never recorded.

use crate::domain::headers::FAKE_HEADER;
use axum::{
    body::Body,
    http::{HeaderMap, Request},
    response::Response,
};
use std::task::{Context, Poll};
use tower::{Layer, Service};
use tracing::{debug, info_span, Instrument, Span};

/// Tracing layer that creates spans for each request
#[derive(Clone, Default)]
pub struct TracingLayer;

impl TracingLayer {
    pub fn new() -> Self {
        Self
    }
}

impl<S> Layer<S> for TracingLayer {
    type Service = TracingService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        TracingService { inner }
    }
}

/// Tracing service
#[derive(Clone)]
pub struct TracingService<S> {
    inner: S,
}

impl<S> Service<Request<Body>> for TracingService<S>
where
    S: Service<Request<Body>, Response = Response> + Clone + Send + 'static,
    S::Future: Send,
{
    type Response = Response;
    type Error = S::Error;
    type Future = std::pin::Pin<
        Box<dyn std::future::Future<Output = Result<Self::Response, Self::Error>> + Send>,
    >;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, req: Request<Body>) -> Self::Future {
        let mut inner = self.inner.clone();

        let trace_id = traceparent_trace_id(req.headers()).unwrap_or("-").to_string();
        let fake = req
            .headers()
            .get(FAKE_HEADER)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("-")
            .to_string();

        let span = info_span!(
            "submission_request",
            http.method = %req.method(),
            http.target = %req.uri().path(),
            cwa.fake = %fake,
            trace_id = %trace_id,
            http.status_code = tracing::field::Empty,
            otel.kind = "server",
            otel.status_code = tracing::field::Empty,
        );

        Box::pin(
            async move {
                let result = inner.call(req).await;

                let current = Span::current();
                match &result {
                    Ok(response) => {
                        let status = response.status();
                        current.record("http.status_code", status.as_u16());
                        current.record(
                            "otel.status_code",
                            if status.is_server_error() { "ERROR" } else { "OK" },
                        );
                        debug!(status = status.as_u16(), "Request completed");
                    }
                    Err(_) => {
                        current.record("otel.status_code", "ERROR");
                    }
                }

                result
            }
            .instrument(span),
        )
    }
}

/// Trace id of a well-formed W3C `traceparent` header.
fn traceparent_trace_id(headers: &HeaderMap) -> Option<&str> {
    let traceparent = headers.get("traceparent")?.to_str().ok()?;

    // version-trace_id-parent_id-trace_flags
    let mut parts = traceparent.split('-');
    let (_version, trace_id, parent_id, _flags) =
        (parts.next()?, parts.next()?, parts.next()?, parts.next()?);
    if parts.next().is_some()
        || trace_id.len() != 32
        || parent_id.len() != 16
        || !trace_id.bytes().all(|b| b.is_ascii_hexdigit())
    {
        return None;
    }
    Some(trace_id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use tower::ServiceExt;

    fn headers_with(traceparent: &'static str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert("traceparent", traceparent.parse().unwrap());
        headers
    }

    #[test]
    fn test_trace_id_from_traceparent() {
        let headers = headers_with("00-0af7651916cd43dd8448eb211c80319c-b7ad6b7169203331-01");
        assert_eq!(traceparent_trace_id(&headers), Some("0af7651916cd43dd8448eb211c80319c"));
    }

    #[test]
    fn test_malformed_traceparent_is_ignored() {
        for value in [
            "invalid",
            "00-0af7651916cd43dd8448eb211c80319c-b7ad6b7169203331",
            "00-short-b7ad6b7169203331-01",
            "00-0af7651916cd43dd8448eb211c80319c-b7ad6b7169203331-01-extra",
        ] {
            assert_eq!(traceparent_trace_id(&headers_with(value)), None, "{}", value);
        }
    }

    #[test]
    fn test_no_traceparent() {
        assert_eq!(traceparent_trace_id(&HeaderMap::new()), None);
    }

    #[tokio::test]
    async fn test_layer_passes_response_through() {
        let inner = tower::service_fn(|_req: Request<Body>| async {
            Ok::<_, std::convert::Infallible>(
                Response::builder()
                    .status(StatusCode::FORBIDDEN)
                    .body(Body::empty())
                    .unwrap(),
            )
        });
        let service = TracingLayer::new().layer(inner);

        let response = service
            .oneshot(
                Request::builder()
                    .header(FAKE_HEADER, "0")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }
}
