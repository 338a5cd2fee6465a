//! Outgoing HTTP response handle.
//!
//! Unlike a handler return value, a [`Response`] here is a *live handle*: the
//! router creates one per request and every middleware in the chain writes
//! into it. Once [`Response::end`] is called the response is final and later
//! writes are ignored.

use bytes::Bytes;
use http::header::{CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue};
use http::StatusCode;
use http_body_util::Full;
use serde::Serialize;
use tracing::warn;

// ── ContentType ───────────────────────────────────────────────────────────────

/// Common content-type values for use with [`Response::write_head`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ContentType {
    FormData,     // application/x-www-form-urlencoded
    Html,         // text/html; charset=utf-8
    Json,         // application/json
    OctetStream,  // application/octet-stream
    Text,         // text/plain; charset=utf-8
}

impl ContentType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::FormData    => "application/x-www-form-urlencoded",
            Self::Html        => "text/html; charset=utf-8",
            Self::Json        => "application/json",
            Self::OctetStream => "application/octet-stream",
            Self::Text        => "text/plain; charset=utf-8",
        }
    }

    fn header_value(self) -> HeaderValue {
        HeaderValue::from_static(self.as_str())
    }
}

// ── Response ─────────────────────────────────────────────────────────────────

/// An outgoing HTTP response under construction.
///
/// ```rust
/// use tsu_act::{ContentType, Response};
/// use http::StatusCode;
///
/// let mut res = Response::new();
/// res.write_head(StatusCode::CREATED, ContentType::Json);
/// res.end(r#"{"id":42}"#);
/// assert!(res.is_ended());
/// ```
#[derive(Debug)]
pub struct Response {
    status: StatusCode,
    headers: HeaderMap,
    body: Bytes,
    ended: bool,
}

impl Response {
    /// A fresh, untouched response: `200 OK`, no headers, no body.
    pub fn new() -> Self {
        Self {
            status: StatusCode::OK,
            headers: HeaderMap::new(),
            body: Bytes::new(),
            ended: false,
        }
    }

    /// An already-ended response with no body.
    pub fn with_status(status: StatusCode) -> Self {
        let mut res = Self::new();
        res.status = status;
        res.ended = true;
        res
    }

    pub fn status(&self) -> StatusCode { self.status }
    pub fn headers(&self) -> &HeaderMap { &self.headers }
    pub fn body(&self) -> &[u8] { &self.body }
    pub fn is_ended(&self) -> bool { self.ended }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    pub fn set_status(&mut self, status: StatusCode) {
        if self.guard_ended() {
            self.status = status;
        }
    }

    pub fn set_header(&mut self, name: HeaderName, value: HeaderValue) {
        if self.guard_ended() {
            self.headers.insert(name, value);
        }
    }

    /// Sets the status and the content type in one go.
    pub fn write_head(&mut self, status: StatusCode, content_type: ContentType) {
        if self.guard_ended() {
            self.status = status;
            self.headers.insert(CONTENT_TYPE, content_type.header_value());
        }
    }

    /// Writes the body and finalises the response.
    pub fn end(&mut self, body: impl Into<Bytes>) {
        if self.guard_ended() {
            self.body = body.into();
            self.ended = true;
        }
    }

    /// `200 OK`, `application/json`, body = `value` serialised, ended.
    pub fn json<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<(), serde_json::Error> {
        let bytes = serde_json::to_vec(value)?;
        self.write_head(StatusCode::OK, ContentType::Json);
        self.end(bytes);
        Ok(())
    }

    /// Ends the response with a plain-text body and the given status.
    pub fn text(&mut self, status: StatusCode, body: impl Into<String>) {
        self.write_head(status, ContentType::Text);
        self.end(body.into());
    }

    // Returns true while the response may still be written to.
    fn guard_ended(&self) -> bool {
        if self.ended {
            warn!(status = self.status.as_u16(), "write after response ended ignored");
        }
        !self.ended
    }

    pub(crate) fn into_inner(self) -> http::Response<Full<Bytes>> {
        let mut res = http::Response::new(Full::new(self.body));
        *res.status_mut() = self.status;
        *res.headers_mut() = self.headers;
        res
    }
}

impl Default for Response {
    fn default() -> Self { Self::new() }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_response_is_untouched() {
        let res = Response::new();
        assert_eq!(res.status(), StatusCode::OK);
        assert!(res.headers().is_empty());
        assert!(res.body().is_empty());
        assert!(!res.is_ended());
    }

    #[test]
    fn json_sets_status_type_and_body() {
        let mut res = Response::new();
        res.json(&serde_json::json!({ "res": "pong!" })).unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(res.header("content-type"), Some("application/json"));
        assert_eq!(res.body(), br#"{"res":"pong!"}"#);
        assert!(res.is_ended());
    }

    #[test]
    fn writes_after_end_are_ignored() {
        let mut res = Response::new();
        res.text(StatusCode::UNAUTHORIZED, "nope");
        res.set_status(StatusCode::OK);
        res.end("again");
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(res.body(), b"nope");
    }

    #[test]
    fn converts_into_http_response() {
        let mut res = Response::new();
        res.set_header(HeaderName::from_static("x-trace"), HeaderValue::from_static("abc"));
        res.end("hi");
        let inner = res.into_inner();
        assert_eq!(inner.status(), StatusCode::OK);
        assert_eq!(inner.headers()["x-trace"], "abc");
    }
}
