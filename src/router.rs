//! The host router: path-keyed middleware stacks.
//!
//! One radix tree maps a path to a stack of *layers*. A layer is any
//! [`Middleware`]; the adapter mounts one composed chain per route, and
//! several routes may share a path. Lookup is O(path-length).
//!
//! Per request the layers of the matched path run in mount order:
//!
//! | layer returns | router does |
//! |---|---|
//! | `Ok(Flow::Continue)` | runs the next layer |
//! | `Ok(Flow::Halt)` | sends the response as it stands |
//! | `Err(e)` | hands `e` to the error handler, sends what it wrote |
//!
//! An error handler that leaves the response unended falls back to
//! [`default_error_handler`], so a failed request is never sent as a bare `200`.
//!
//! When every layer continued, an ended response is sent; otherwise the
//! request gets `404 Not Found`, as does any path with no layers.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use http::StatusCode;
use matchit::Router as MatchitRouter;
use tracing::{error, warn};

use crate::error::{BoxError, Error, HttpError};
use crate::handler::{BoxedMiddleware, Flow, Middleware};
use crate::request::Request;
use crate::response::Response;

/// Renders a request-time error into the response.
pub type ErrorHandler = Arc<dyn Fn(&BoxError, &Request, &mut Response) + Send + Sync + 'static>;

/// The application router.
///
/// Build it once at startup, let the adapter [`mount`](Router::mount) onto
/// it, then pass it to [`Server::serve`](crate::Server::serve).
#[derive(Clone)]
pub struct Router {
    tree: MatchitRouter<usize>,
    slots: HashMap<String, usize>,
    stacks: Vec<Vec<BoxedMiddleware>>,
    on_error: ErrorHandler,
}

impl Router {
    pub fn new() -> Self {
        Self {
            tree: MatchitRouter::new(),
            slots: HashMap::new(),
            stacks: Vec::new(),
            on_error: Arc::new(default_error_handler),
        }
    }

    /// Appends `layer` to the stack at `path`.
    ///
    /// Path parameters use `{name}` syntax; `req.param("name")` retrieves them.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidPath`] when the path is malformed or conflicts with an
    /// already mounted one.
    pub fn mount(&mut self, path: &str, layer: impl Middleware) -> Result<&mut Self, Error> {
        let slot = match self.slots.get(path) {
            Some(&slot) => slot,
            None => {
                let slot = self.stacks.len();
                self.tree.insert(path, slot).map_err(|e| Error::InvalidPath {
                    path: path.to_owned(),
                    reason: e.to_string(),
                })?;
                self.slots.insert(path.to_owned(), slot);
                self.stacks.push(Vec::new());
                slot
            }
        };
        self.stacks[slot].push(Arc::new(layer));
        Ok(self)
    }

    /// Replaces the error handler.
    pub fn on_error<F>(&mut self, handler: F) -> &mut Self
    where
        F: Fn(&BoxError, &Request, &mut Response) + Send + Sync + 'static,
    {
        self.on_error = Arc::new(handler);
        self
    }

    /// Runs `req` through the layers mounted at its path.
    pub async fn handle(&self, mut req: Request) -> Response {
        let Some((layers, params)) = self.lookup(req.path()) else {
            return Response::with_status(StatusCode::NOT_FOUND);
        };
        req.params = params;

        let mut res = Response::new();
        for layer in layers {
            match layer.handle(&mut req, &mut res).await {
                Ok(Flow::Continue) => {}
                Ok(Flow::Halt) => return res,
                Err(e) => {
                    (self.on_error)(&e, &req, &mut res);
                    // A handler that only observes must not turn a failure into a 200.
                    if !res.is_ended() {
                        default_error_handler(&e, &req, &mut res);
                    }
                    return res;
                }
            }
        }

        if res.is_ended() {
            res
        } else {
            Response::with_status(StatusCode::NOT_FOUND)
        }
    }

    fn lookup(&self, path: &str) -> Option<(&[BoxedMiddleware], HashMap<String, String>)> {
        let matched = self.tree.at(path).ok()?;
        let layers = self.stacks.get(*matched.value)?;
        let params = matched.params.iter()
            .map(|(k, v)| (k.to_owned(), v.to_owned()))
            .collect();
        Some((layers, params))
    }
}

impl fmt::Debug for Router {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut paths: Vec<_> = self.slots.iter()
            .map(|(path, &slot)| (path.as_str(), self.stacks[slot].len()))
            .collect();
        paths.sort_unstable();
        f.debug_struct("Router").field("layers", &paths).finish_non_exhaustive()
    }
}

impl Default for Router {
    fn default() -> Self { Self::new() }
}

/// Renders [`HttpError`]s with their own status and message, anything else
/// as `500 Internal Server Error`.
///
/// Also runs after a custom handler that left the response unended.
pub fn default_error_handler(err: &BoxError, req: &Request, res: &mut Response) {
    if let Some(http) = err.downcast_ref::<HttpError>() {
        warn!(method = %req.method(), path = req.path(), status = http.status.as_u16(), "{}", http.message);
        res.text(http.status, http.message.clone());
    } else {
        error!(method = %req.method(), path = req.path(), "request failed: {err}");
        res.text(StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error");
    }
}
