//! The middleware trait and type erasure.
//!
//! # How a chain member is stored
//!
//! A route's chain mixes middleware of *different* types: user closures,
//! registry entries, the built-in body parser and the dispatch bridge. They
//! all live in one `Vec`, so each is hidden behind `Arc<dyn Middleware>`.
//!
//! ```text
//! |req, res| Box::pin(async move { … })      ← user writes this
//!        ↓ middleware::from_fn(f)
//! FnMiddleware(f)                            ← newtype implementing Middleware
//!        ↓ Arc::new(…) as BoxedMiddleware
//! mw.handle(&mut req, &mut res)              ← one vtable dispatch per member
//! ```
//!
//! # Continuations
//!
//! A middleware does not receive a `next` callback. Its returned [`Outcome`]
//! says what it would have done with one:
//!
//! | returns | continuation equivalent |
//! |---|---|
//! | `Ok(Flow::Continue)` | called `next()` |
//! | `Ok(Flow::Halt)` | never called `next` |
//! | `Err(e)` | called `next(e)` |

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use crate::error::BoxError;
use crate::request::Request;
use crate::response::Response;

/// A heap-allocated, type-erased future borrowing from its caller for `'a`.
///
/// `Send` lets tokio move the request task across worker threads.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// What a middleware asks the chain to do next.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Flow {
    /// Run the next member of the chain.
    Continue,
    /// Stop here; the response is considered handled.
    Halt,
}

/// The result of one middleware invocation.
pub type Outcome = Result<Flow, BoxError>;

/// A member of a middleware chain.
///
/// Implement it directly on a struct when the middleware carries
/// configuration, or wrap a closure with [`middleware::from_fn`](crate::middleware::from_fn).
pub trait Middleware: Send + Sync + 'static {
    fn handle<'a>(&'a self, req: &'a mut Request, res: &'a mut Response) -> BoxFuture<'a, Outcome>;
}

/// A type-erased middleware shared across concurrent requests.
///
/// `Arc` because the same registry entry may sit in many route chains.
pub type BoxedMiddleware = Arc<dyn Middleware>;

impl<M: Middleware + ?Sized> Middleware for Arc<M> {
    fn handle<'a>(&'a self, req: &'a mut Request, res: &'a mut Response) -> BoxFuture<'a, Outcome> {
        (**self).handle(req, res)
    }
}

/// Newtype that lets a closure act as a [`Middleware`].
pub(crate) struct FnMiddleware<F>(pub(crate) F);

impl<F> Middleware for FnMiddleware<F>
where
    F: for<'a> Fn(&'a mut Request, &'a mut Response) -> BoxFuture<'a, Outcome>
        + Send
        + Sync
        + 'static,
{
    fn handle<'a>(&'a self, req: &'a mut Request, res: &'a mut Response) -> BoxFuture<'a, Outcome> {
        (self.0)(req, res)
    }
}
