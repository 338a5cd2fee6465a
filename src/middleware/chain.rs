//! Sequential middleware composition.

use tracing::trace;

use crate::handler::{BoxFuture, BoxedMiddleware, Flow, Middleware, Outcome};
use crate::request::Request;
use crate::response::Response;

/// An ordered list of middleware folded into a single middleware.
///
/// Members run strictly in list order, each one only after the previous
/// returned `Ok(Flow::Continue)`. The first `Err` or `Flow::Halt` is returned
/// as the chain's own outcome and no later member runs. An empty chain
/// continues.
#[derive(Clone, Default)]
pub struct Chain {
    members: Vec<BoxedMiddleware>,
}

impl Chain {
    pub fn new(members: Vec<BoxedMiddleware>) -> Self {
        Self { members }
    }

    pub fn len(&self) -> usize { self.members.len() }
    pub fn is_empty(&self) -> bool { self.members.is_empty() }
}

impl FromIterator<BoxedMiddleware> for Chain {
    fn from_iter<I: IntoIterator<Item = BoxedMiddleware>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl Middleware for Chain {
    fn handle<'a>(&'a self, req: &'a mut Request, res: &'a mut Response) -> BoxFuture<'a, Outcome> {
        Box::pin(async move {
            for (i, member) in self.members.iter().enumerate() {
                match member.handle(req, res).await {
                    Ok(Flow::Continue) => {}
                    Ok(Flow::Halt) => {
                        trace!(member = i, "chain halted");
                        return Ok(Flow::Halt);
                    }
                    Err(e) => {
                        trace!(member = i, error = %e, "chain short-circuited");
                        return Err(e);
                    }
                }
            }
            Ok(Flow::Continue)
        })
    }
}
