//! The terminal middleware that turns an HTTP request into a message.

use std::sync::Arc;

use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::adapter::AdapterOptions;
use crate::dispatch::{Args, Dispatcher, Message};
use crate::handler::{BoxFuture, Flow, Middleware, Outcome};
use crate::query;
use crate::request::Request;
use crate::response::Response;
use crate::route::Route;

/// Last member of every route chain.
///
/// 1. Requests whose method the route does not accept pass through untouched.
/// 2. The body comes from the configured parser, or from whatever upstream
///    middleware attached, or is `{}`.
/// 3. The query string is parsed into a flat object.
/// 4. The message is dispatched under the route's pattern.
/// 5. On success with autoreply the result is written as a `200` JSON
///    response; without autoreply the response is left alone.
///
/// Failures are returned to the chain; the bridge never renders errors.
pub(crate) struct Bridge {
    route: Arc<Route>,
    options: Arc<AdapterOptions>,
    dispatcher: Arc<dyn Dispatcher>,
}

impl Bridge {
    pub(crate) fn new(route: Arc<Route>, options: Arc<AdapterOptions>, dispatcher: Arc<dyn Dispatcher>) -> Self {
        Self { route, options, dispatcher }
    }

    async fn run(&self, req: &mut Request, res: &mut Response) -> Outcome {
        let route = &self.route;
        if !route.accepts(req.method()) {
            debug!(method = %req.method(), path = %route.path, "method not routed, passing through");
            return Ok(Flow::Continue);
        }

        let body = if self.options.parse_body {
            self.options.body_parser.read(req).await?
        } else {
            req.body().cloned().unwrap_or_else(|| Value::Object(Map::new()))
        };
        let query = query::parse(req.query())?;

        let msg = Message {
            request: req,
            response: res,
            args: Args { body, route: Arc::clone(route), query },
        };

        debug!(pattern = %route.pattern, path = %route.path, "dispatching");
        let result = match self.dispatcher.act(&route.pattern, msg).await {
            Ok(result) => result,
            Err(e) => {
                warn!(pattern = %route.pattern, error = %e, "dispatch failed");
                return Err(e);
            }
        };

        if route.autoreply {
            res.json(&result)?;
        }
        Ok(Flow::Halt)
    }
}

impl Middleware for Bridge {
    fn handle<'a>(&'a self, req: &'a mut Request, res: &'a mut Response) -> BoxFuture<'a, Outcome> {
        Box::pin(self.run(req, res))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use http::{StatusCode, Uri};
    use serde_json::json;

    use super::*;
    use crate::dispatch;
    use crate::error::{BoxError, HttpError};
    use crate::method::Method;

    /// What the dispatcher saw, per call.
    #[derive(Clone, Debug, PartialEq)]
    struct Seen {
        pattern: String,
        body: Value,
        query: Value,
        path: String,
    }

    type Calls = Arc<Mutex<Vec<Seen>>>;

    fn recording(calls: &Calls, reply: Result<Value, &'static str>) -> Arc<dyn Dispatcher> {
        let calls = Arc::clone(calls);
        Arc::new(dispatch::from_fn(move |pattern, msg| {
            let calls = Arc::clone(&calls);
            let reply = reply.clone();
            Box::pin(async move {
                calls.lock().unwrap().push(Seen {
                    pattern: pattern.to_string(),
                    body: msg.args.body,
                    query: Value::Object(msg.args.query),
                    path: msg.args.route.path.clone(),
                });
                reply.map_err(BoxError::from)
            })
        }))
    }

    fn bridge(route: Route, options: AdapterOptions, dispatcher: Arc<dyn Dispatcher>) -> Bridge {
        Bridge::new(Arc::new(route), Arc::new(options), dispatcher)
    }

    async fn call(bridge: &Bridge, mut req: Request) -> (Outcome, Response) {
        let mut res = Response::new();
        let outcome = bridge.handle(&mut req, &mut res).await;
        (outcome, res)
    }

    #[tokio::test]
    async fn autoreply_writes_json() {
        let calls = Calls::default();
        let b = bridge(
            Route::new("/ping", "role:test,cmd:ping"),
            AdapterOptions::new(),
            recording(&calls, Ok(json!({ "res": "pong!" }))),
        );

        let (outcome, res) = call(&b, Request::new(Method::Get, Uri::from_static("/ping"))).await;

        assert_eq!(outcome.unwrap(), Flow::Halt);
        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(res.header("content-type"), Some("application/json"));
        assert_eq!(res.body(), br#"{"res":"pong!"}"#);
        assert!(res.is_ended());
        assert_eq!(calls.lock().unwrap()[0].pattern, "role:test,cmd:ping");
    }

    #[tokio::test]
    async fn without_autoreply_response_is_untouched() {
        let calls = Calls::default();
        let b = bridge(
            Route::new("/ping", "cmd:ping").autoreply(false),
            AdapterOptions::new(),
            recording(&calls, Ok(json!({ "res": "pong!" }))),
        );

        let (outcome, res) = call(&b, Request::new(Method::Get, Uri::from_static("/ping"))).await;

        assert_eq!(outcome.unwrap(), Flow::Halt);
        assert!(!res.is_ended());
        assert!(res.headers().is_empty());
        assert!(res.body().is_empty());
        assert_eq!(calls.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn other_methods_pass_through_without_dispatch() {
        let calls = Calls::default();
        let b = bridge(
            Route::new("/ping", "cmd:ping"),
            AdapterOptions::new(),
            recording(&calls, Ok(json!(null))),
        );

        let (outcome, res) = call(&b, Request::new(Method::Post, Uri::from_static("/ping"))).await;

        assert_eq!(outcome.unwrap(), Flow::Continue);
        assert!(!res.is_ended());
        assert!(calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn dispatch_error_is_returned() {
        let calls = Calls::default();
        let b = bridge(
            Route::new("/ping", "cmd:ping"),
            AdapterOptions::new(),
            recording(&calls, Err("aw snap!")),
        );

        let (outcome, res) = call(&b, Request::new(Method::Get, Uri::from_static("/ping"))).await;

        assert_eq!(outcome.unwrap_err().to_string(), "aw snap!");
        assert!(!res.is_ended());
    }

    #[tokio::test]
    async fn parses_body_and_query() {
        let calls = Calls::default();
        let b = bridge(
            Route::new("/users", "role:user,cmd:create").methods([Method::Post]),
            AdapterOptions::new(),
            recording(&calls, Ok(json!({}))),
        );
        let req = Request::new(Method::Post, Uri::from_static("/users?dry=1&dry=0"))
            .with_raw_body(r#"{"name":"alice"}"#);

        call(&b, req).await.0.unwrap();

        let seen = calls.lock().unwrap()[0].clone();
        assert_eq!(seen.body, json!({ "name": "alice" }));
        assert_eq!(seen.query, json!({ "dry": "0" }));
        assert_eq!(seen.path, "/users");
    }

    #[tokio::test]
    async fn body_parse_failure_skips_dispatch() {
        let calls = Calls::default();
        let b = bridge(
            Route::new("/users", "cmd:create").methods([Method::Post]),
            AdapterOptions::new(),
            recording(&calls, Ok(json!({}))),
        );
        let req = Request::new(Method::Post, Uri::from_static("/users")).with_raw_body("{");

        let err = call(&b, req).await.0.unwrap_err();

        assert!(err.downcast_ref::<HttpError>().is_some());
        assert!(calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn without_parse_body_the_body_defaults_to_empty() {
        let calls = Calls::default();
        let b = bridge(
            Route::new("/users", "cmd:create").methods([Method::Post]),
            AdapterOptions::new().parse_body(false),
            recording(&calls, Ok(json!({}))),
        );
        let req = Request::new(Method::Post, Uri::from_static("/users")).with_raw_body(r#"{"ignored":1}"#);

        call(&b, req).await.0.unwrap();

        assert_eq!(calls.lock().unwrap()[0].body, json!({}));
    }

    #[tokio::test]
    async fn without_parse_body_an_attached_body_is_used() {
        let calls = Calls::default();
        let b = bridge(
            Route::new("/users", "cmd:create").methods([Method::Post]),
            AdapterOptions::new().parse_body(false),
            recording(&calls, Ok(json!({}))),
        );
        let mut req = Request::new(Method::Post, Uri::from_static("/users"));
        req.set_body(json!({ "from": "upstream" }));

        call(&b, req).await.0.unwrap();

        assert_eq!(calls.lock().unwrap()[0].body, json!({ "from": "upstream" }));
    }

    #[tokio::test]
    async fn handler_may_write_the_response_itself() {
        let writer: Arc<dyn Dispatcher> = Arc::new(dispatch::from_fn(|_pattern, msg| Box::pin(async move {
            msg.response.text(StatusCode::ACCEPTED, "queued");
            Ok(Value::Null)
        })));
        let b = bridge(Route::new("/jobs", "cmd:enqueue").autoreply(false), AdapterOptions::new(), writer);

        let (outcome, res) = call(&b, Request::new(Method::Get, Uri::from_static("/jobs"))).await;

        assert_eq!(outcome.unwrap(), Flow::Halt);
        assert_eq!(res.status(), StatusCode::ACCEPTED);
        assert_eq!(res.body(), b"queued");
    }
}
