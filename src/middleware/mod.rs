//! Middleware layer.
//!
//! Middleware intercept a request before it reaches the dispatch bridge and
//! are the right place for cross-cutting concerns: authentication-header
//! inspection, request-id injection, body parsing.
//!
//! - [`from_fn`] — wrap an async closure as a middleware
//! - [`Chain`] — run members in order, short-circuiting on halt or error
//! - [`MiddlewareRegistry`] — named middleware that route descriptors refer to by key
//! - [`body_parser`] — attach a parsed body for the members that follow

mod chain;
mod registry;

use std::sync::Arc;

pub use chain::Chain;
pub use registry::{MiddlewareRef, MiddlewareRegistry};

use crate::body::BodyParser;
use crate::handler::{BoxFuture, BoxedMiddleware, FnMiddleware, Flow, Middleware, Outcome};
use crate::request::Request;
use crate::response::Response;

/// Turns an async closure into a shareable middleware.
///
/// ```rust
/// use tsu_act::middleware::from_fn;
/// use tsu_act::{Flow, HttpError};
/// use http::StatusCode;
///
/// let require_token = from_fn(|req, _res| Box::pin(async move {
///     match req.header("x-token") {
///         Some(_) => Ok(Flow::Continue),
///         None => Err(HttpError::new(StatusCode::UNAUTHORIZED, "missing token").into()),
///     }
/// }));
/// # let _ = require_token;
/// ```
pub fn from_fn<F>(f: F) -> BoxedMiddleware
where
    F: for<'a> Fn(&'a mut Request, &'a mut Response) -> BoxFuture<'a, Outcome>
        + Send
        + Sync
        + 'static,
{
    Arc::new(FnMiddleware(f))
}

/// A middleware that reads the body with `parser` and attaches it to the
/// request. A parse failure fails the request.
///
/// Pair it with `AdapterOptions::parse_body(false)` to parse once, upstream.
pub fn body_parser<P: BodyParser>(parser: P) -> BoxedMiddleware {
    Arc::new(AttachBody(parser))
}

struct AttachBody<P>(P);

impl<P: BodyParser> Middleware for AttachBody<P> {
    fn handle<'a>(&'a self, req: &'a mut Request, _res: &'a mut Response) -> BoxFuture<'a, Outcome> {
        Box::pin(async move {
            let body = self.0.read(req).await?;
            req.set_body(body);
            Ok(Flow::Continue)
        })
    }
}

#[cfg(test)]
mod tests {
    use http::Uri;
    use serde_json::json;

    use super::*;
    use crate::body::JsonBody;
    use crate::method::Method;

    #[tokio::test]
    async fn body_parser_attaches_parsed_body() {
        let mw = body_parser(JsonBody);
        let mut req = Request::new(Method::Post, Uri::from_static("/users"))
            .with_raw_body(r#"{"name":"alice"}"#);
        let mut res = Response::new();

        let flow = mw.handle(&mut req, &mut res).await.unwrap();

        assert_eq!(flow, Flow::Continue);
        assert_eq!(req.body(), Some(&json!({ "name": "alice" })));
    }

    #[tokio::test]
    async fn body_parser_fails_on_garbage() {
        let mw = body_parser(JsonBody);
        let mut req = Request::new(Method::Post, Uri::from_static("/users")).with_raw_body("{nope");
        let mut res = Response::new();

        assert!(mw.handle(&mut req, &mut res).await.is_err());
        assert!(req.body().is_none());
    }
}
