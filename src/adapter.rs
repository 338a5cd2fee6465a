//! Route registration: the adapter's entry point.
//!
//! ```rust
//! use tsu_act::{dispatch, Adapter, AdapterOptions, Route, Router};
//! use serde_json::json;
//!
//! let actor = dispatch::from_fn(|_pattern, _msg| Box::pin(async { Ok(json!({ "res": "pong!" })) }));
//! let adapter = Adapter::new(AdapterOptions::new(), actor);
//!
//! let mut router = Router::new();
//! let reg = adapter
//!     .register(Some(&mut router), vec![Route::new("/ping", "role:test,cmd:ping")])
//!     .unwrap();
//! assert_eq!(reg.routes.len(), 1);
//! ```

use std::fmt;
use std::sync::Arc;

use tracing::{debug, info};

use crate::body::{BodyParser, JsonBody};
use crate::bridge::Bridge;
use crate::dispatch::Dispatcher;
use crate::error::Error;
use crate::handler::{BoxFuture, BoxedMiddleware, Flow, Middleware, Outcome};
use crate::middleware::{Chain, MiddlewareRegistry};
use crate::request::Request;
use crate::response::Response;
use crate::route::Route;
use crate::router::Router;

/// Adapter-wide settings, fixed before any route is registered.
#[derive(Clone)]
pub struct AdapterOptions {
    pub(crate) middleware: MiddlewareRegistry,
    pub(crate) parse_body: bool,
    pub(crate) body_parser: Arc<dyn BodyParser>,
}

impl AdapterOptions {
    /// Empty registry, body parsing on with [`JsonBody`].
    pub fn new() -> Self {
        Self {
            middleware: MiddlewareRegistry::new(),
            parse_body: true,
            body_parser: Arc::new(JsonBody),
        }
    }

    /// Whether the bridge reads the body itself before dispatching.
    pub fn parse_body(mut self, on: bool) -> Self {
        self.parse_body = on;
        self
    }

    /// Adds a named middleware that routes can refer to by `name`.
    pub fn middleware(mut self, name: impl Into<String>, mw: BoxedMiddleware) -> Self {
        self.middleware.insert(name, mw);
        self
    }

    /// Replaces the whole named-middleware registry.
    pub fn registry(mut self, registry: MiddlewareRegistry) -> Self {
        self.middleware = registry;
        self
    }

    pub fn body_parser(mut self, parser: impl BodyParser) -> Self {
        self.body_parser = Arc::new(parser);
        self
    }
}

impl Default for AdapterOptions {
    fn default() -> Self { Self::new() }
}

impl fmt::Debug for AdapterOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AdapterOptions")
            .field("middleware", &self.middleware)
            .field("parse_body", &self.parse_body)
            .finish_non_exhaustive()
    }
}

/// Summary of a successful registration.
#[derive(Clone, Debug)]
pub struct Registration {
    /// The registered routes, in input order.
    pub routes: Vec<Arc<Route>>,
}

/// Mounts actor-system routes onto a [`Router`].
pub struct Adapter {
    options: Arc<AdapterOptions>,
    dispatcher: Arc<dyn Dispatcher>,
}

impl Adapter {
    pub fn new(options: AdapterOptions, dispatcher: impl Dispatcher) -> Self {
        Self { options: Arc::new(options), dispatcher: Arc::new(dispatcher) }
    }

    /// Registers every route on `context`.
    ///
    /// Each route becomes one chain: its resolved middleware in order, then
    /// the dispatch bridge, mounted at `route.path`. The chain is only entered
    /// for methods the route accepts, so routes sharing a path never run each
    /// other's middleware. Registration is
    /// all-or-nothing: on any error `context` is left exactly as it was.
    ///
    /// # Errors
    ///
    /// - [`Error::MissingContext`] when `context` is `None`
    /// - [`Error::UnknownMiddleware`] when a route names a middleware the
    ///   registry does not hold
    /// - [`Error::InvalidPath`] when the router rejects a path
    pub fn register(&self, context: Option<&mut Router>, routes: Vec<Route>) -> Result<Registration, Error> {
        let router = context.ok_or(Error::MissingContext)?;
        let routes: Vec<Arc<Route>> = routes.into_iter().map(Arc::new).collect();

        let mut chains = Vec::with_capacity(routes.len());
        for route in &routes {
            let mut members = self.options.middleware.resolve(&route.path, &route.middleware)?;
            members.push(Arc::new(Bridge::new(
                Arc::clone(route),
                Arc::clone(&self.options),
                Arc::clone(&self.dispatcher),
            )));
            chains.push(RouteLayer { route: Arc::clone(route), chain: Chain::new(members) });
        }

        let mut staged = router.clone();
        for layer in chains {
            let route = Arc::clone(&layer.route);
            debug!(path = %route.path, pattern = %route.pattern, members = layer.chain.len(), "mounting route");
            staged.mount(&route.path, layer)?;
        }
        *router = staged;

        info!(count = routes.len(), "routes registered");
        Ok(Registration { routes })
    }
}

/// One mounted route. Requests with other methods skip the whole chain.
struct RouteLayer {
    route: Arc<Route>,
    chain: Chain,
}

impl Middleware for RouteLayer {
    fn handle<'a>(&'a self, req: &'a mut Request, res: &'a mut Response) -> BoxFuture<'a, Outcome> {
        if !self.route.accepts(req.method()) {
            return Box::pin(async { Ok(Flow::Continue) });
        }
        self.chain.handle(req, res)
    }
}
