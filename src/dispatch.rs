//! The seam to the actor system.
//!
//! The adapter does not route messages itself. It builds a [`Message`] per
//! request and hands it to a [`Dispatcher`] together with the route's
//! [`Pattern`]. Whatever the dispatcher resolves to is the message result.

use std::sync::Arc;

use serde_json::{Map, Value};

use crate::error::BoxError;
use crate::handler::BoxFuture;
use crate::request::Request;
use crate::response::Response;
use crate::route::{Pattern, Route};

/// The data half of a dispatch payload.
#[derive(Clone, Debug)]
pub struct Args {
    /// Parsed request body; `{}` when there is none.
    pub body: Value,
    /// The full descriptor of the route that matched.
    pub route: Arc<Route>,
    /// Parsed query string.
    pub query: Map<String, Value>,
}

/// A dispatch payload: the live request and response handles plus [`Args`].
///
/// Handlers that own the response themselves (routes without autoreply) write
/// into `response` directly.
pub struct Message<'a> {
    pub request: &'a Request,
    pub response: &'a mut Response,
    pub args: Args,
}

/// Sends a message to the actor system and waits for its result.
pub trait Dispatcher: Send + Sync + 'static {
    fn act<'a>(&'a self, pattern: &'a Pattern, msg: Message<'a>) -> BoxFuture<'a, Result<Value, BoxError>>;
}

impl<D: Dispatcher + ?Sized> Dispatcher for Arc<D> {
    fn act<'a>(&'a self, pattern: &'a Pattern, msg: Message<'a>) -> BoxFuture<'a, Result<Value, BoxError>> {
        (**self).act(pattern, msg)
    }
}

/// Turns an async closure into a [`Dispatcher`].
///
/// ```rust
/// use tsu_act::dispatch;
/// use serde_json::json;
///
/// let actor = dispatch::from_fn(|pattern, _msg| Box::pin(async move {
///     match pattern.get("cmd") {
///         Some("ping") => Ok(json!({ "res": "pong!" })),
///         _ => Err("no handler".into()),
///     }
/// }));
/// # let _ = actor;
/// ```
pub fn from_fn<F>(f: F) -> FnDispatcher<F>
where
    F: for<'a> Fn(&'a Pattern, Message<'a>) -> BoxFuture<'a, Result<Value, BoxError>>
        + Send
        + Sync
        + 'static,
{
    FnDispatcher(f)
}

/// A closure acting as a [`Dispatcher`]. Built by [`from_fn`].
pub struct FnDispatcher<F>(F);

impl<F> Dispatcher for FnDispatcher<F>
where
    F: for<'a> Fn(&'a Pattern, Message<'a>) -> BoxFuture<'a, Result<Value, BoxError>>
        + Send
        + Sync
        + 'static,
{
    fn act<'a>(&'a self, pattern: &'a Pattern, msg: Message<'a>) -> BoxFuture<'a, Result<Value, BoxError>> {
        (self.0)(pattern, msg)
    }
}
