//! Request context extraction.
//!
//! Builds the [`OperationContext`] every catalog operation is traced with,
//! so handlers never set HTTP span attributes by hand.

use std::convert::Infallible;
use std::net::SocketAddr;

use axum::extract::{ConnectInfo, FromRequestParts};
use axum::http::{header, request::Parts};
use url::Url;

use crate::observability::OperationContext;

pub const X_REQUEST_ID: &str = "x-request-id";

impl<S> FromRequestParts<S> for OperationContext
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(context_from_parts(parts))
    }
}

/// Read method, absolute URL, peer address and request ID from a request.
pub fn context_from_parts(parts: &Parts) -> OperationContext {
    let host = parts
        .headers
        .get(header::HOST)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("localhost");
    let path = parts
        .uri
        .path_and_query()
        .map(|pq| pq.as_str())
        .unwrap_or("/");
    let url = Url::parse(&format!("http://{}{}", host, path))
        .map(String::from)
        .unwrap_or_else(|_| parts.uri.to_string());

    OperationContext {
        method: Some(parts.method.to_string()),
        url: Some(url),
        client_ip: parts
            .extensions
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| addr.ip()),
        request_id: parts
            .headers
            .get(X_REQUEST_ID)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string),
    }
}
