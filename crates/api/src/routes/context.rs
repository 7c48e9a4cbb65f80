//! Caller identity taken from request headers.

use std::convert::Infallible;

use axum::extract::FromRequestParts;
use axum::http::HeaderMap;
use axum::http::request::Parts;
use common::{Actor, CorrelationId, RequestContext};

pub const USER_ID_HEADER: &str = "x-user-id";
pub const USER_NAME_HEADER: &str = "x-user-name";
pub const USER_EMAIL_HEADER: &str = "x-user-email";
pub const CORRELATION_ID_HEADER: &str = "x-correlation-id";

/// Extracts a [`RequestContext`] for the caller.
///
/// Without an `x-user-id` header the request runs as the system actor.
/// A missing or malformed `x-correlation-id` gets a fresh id.
#[derive(Debug, Clone)]
pub struct Caller(pub RequestContext);

impl<S: Send + Sync> FromRequestParts<S> for Caller {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Caller(context_from_headers(&parts.headers)))
    }
}

fn header<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
}

fn context_from_headers(headers: &HeaderMap) -> RequestContext {
    let actor = match header(headers, USER_ID_HEADER) {
        Some(id) => {
            let name = header(headers, USER_NAME_HEADER).unwrap_or(id);
            let actor = Actor::new(id, name);
            match header(headers, USER_EMAIL_HEADER) {
                Some(email) => actor.with_email(email),
                None => actor,
            }
        }
        None => Actor::system(),
    };

    let ctx = RequestContext::new(actor);
    match header(headers, CORRELATION_ID_HEADER).and_then(|v| v.parse::<CorrelationId>().ok()) {
        Some(correlation_id) => ctx.with_correlation_id(correlation_id),
        None => ctx,
    }
}

#[cfg(test)]
mod tests {
    use axum::http::HeaderValue;

    use super::*;

    #[test]
    fn no_headers_means_system_actor() {
        let ctx = context_from_headers(&HeaderMap::new());
        assert!(ctx.actor().is_system());
    }

    #[test]
    fn user_headers_build_the_actor() {
        let mut headers = HeaderMap::new();
        headers.insert(USER_ID_HEADER, HeaderValue::from_static("u-7"));
        headers.insert(USER_NAME_HEADER, HeaderValue::from_static("Grace"));
        headers.insert(USER_EMAIL_HEADER, HeaderValue::from_static("grace@example.com"));

        let ctx = context_from_headers(&headers);
        assert_eq!(ctx.actor().id, "u-7");
        assert_eq!(ctx.actor().name, "Grace");
        assert_eq!(ctx.actor().email.as_deref(), Some("grace@example.com"));
    }

    #[test]
    fn name_defaults_to_user_id() {
        let mut headers = HeaderMap::new();
        headers.insert(USER_ID_HEADER, HeaderValue::from_static("u-7"));

        let ctx = context_from_headers(&headers);
        assert_eq!(ctx.actor().name, "u-7");
        assert_eq!(ctx.actor().email, None);
    }

    #[test]
    fn correlation_id_is_taken_from_header() {
        let id = CorrelationId::new();
        let mut headers = HeaderMap::new();
        headers.insert(
            CORRELATION_ID_HEADER,
            HeaderValue::from_str(&id.to_string()).unwrap(),
        );

        assert_eq!(context_from_headers(&headers).correlation_id(), id);
    }

    #[test]
    fn malformed_correlation_id_is_replaced() {
        let mut headers = HeaderMap::new();
        headers.insert(CORRELATION_ID_HEADER, HeaderValue::from_static("not-a-uuid"));

        let ctx = context_from_headers(&headers);
        assert_ne!(ctx.correlation_id().to_string(), "not-a-uuid");
    }
}
