//! Response relaying and transformation.
//!
//! # Responsibilities
//! - Relay the upstream response to the client, streaming the body
//! - Strip hop-by-hop headers from the relayed response
//! - Map forwarding failures to well-formed HTTP error responses
//!
//! # Design Decisions
//! - The body is streamed frame by frame; large or slow responses never
//!   buffer in the gateway
//! - The upstream capacity guard rides inside the streamed body, so the
//!   per-target bound holds until the last byte
//! - A mid-body upstream failure surfaces as a body error, which aborts the
//!   client connection instead of fabricating a clean end of stream

use std::pin::Pin;
use std::task::{Context, Poll};

use axum::body::Body;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use hyper::body::{Body as HttpBody, Bytes, Frame, Incoming, SizeHint};

use crate::security::headers as security_headers;
use crate::upstream::{ForwardError, UpstreamGuard};

/// Relay an upstream response to the client.
///
/// Copies status and headers (minus hop-by-hop), and hands the body over as
/// a stream that keeps `guard` alive until it is fully consumed or dropped.
pub fn relay(upstream: hyper::Response<Incoming>, guard: UpstreamGuard) -> Response {
    let (mut parts, body) = upstream.into_parts();
    security_headers::strip_hop_by_hop(&mut parts.headers);
    Response::from_parts(parts, Body::new(GuardedBody::new(body, guard)))
}

/// Map a forwarding failure to the status code sent to the client.
pub fn status_for(error: &ForwardError) -> StatusCode {
    match error {
        ForwardError::Connect { .. } => StatusCode::BAD_GATEWAY,
        ForwardError::Timeout { .. } => StatusCode::GATEWAY_TIMEOUT,
        ForwardError::Protocol { .. } => StatusCode::BAD_GATEWAY,
        ForwardError::Exhausted { .. } => StatusCode::SERVICE_UNAVAILABLE,
        ForwardError::InvalidRequest(_) => StatusCode::BAD_GATEWAY,
        ForwardError::Unregistered(_) => StatusCode::BAD_GATEWAY,
    }
}

/// Build the client-facing response for a forwarding failure.
pub fn error_response(error: &ForwardError) -> Response {
    let status = status_for(error);
    let message = match error {
        ForwardError::Timeout { .. } => "Upstream request timed out",
        ForwardError::Exhausted { .. } => "Upstream at capacity",
        _ => "Upstream request failed",
    };
    (status, message).into_response()
}

/// Streamed upstream body that owns its capacity guard.
struct GuardedBody {
    inner: Pin<Box<Incoming>>,
    _guard: UpstreamGuard,
}

impl GuardedBody {
    fn new(inner: Incoming, guard: UpstreamGuard) -> Self {
        Self {
            inner: Box::pin(inner),
            _guard: guard,
        }
    }
}

impl HttpBody for GuardedBody {
    type Data = Bytes;
    type Error = hyper::Error;

    fn poll_frame(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
    ) -> Poll<Option<Result<Frame<Self::Data>, Self::Error>>> {
        self.get_mut().inner.as_mut().poll_frame(cx)
    }

    fn is_end_stream(&self) -> bool {
        self.inner.is_end_stream()
    }

    fn size_hint(&self) -> SizeHint {
        self.inner.size_hint()
    }
}
