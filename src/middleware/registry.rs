//! Named middleware and their resolution.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Deserializer};

use crate::error::Error;
use crate::handler::BoxedMiddleware;

/// One entry of a route's middleware list.
#[derive(Clone)]
pub enum MiddlewareRef {
    /// A key into the adapter's [`MiddlewareRegistry`].
    Named(String),
    /// A middleware supplied directly.
    Inline(BoxedMiddleware),
}

impl fmt::Debug for MiddlewareRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Named(name) => f.debug_tuple("Named").field(name).finish(),
            Self::Inline(_) => f.write_str("Inline(..)"),
        }
    }
}

impl From<&str> for MiddlewareRef {
    fn from(name: &str) -> Self { Self::Named(name.to_owned()) }
}

impl From<String> for MiddlewareRef {
    fn from(name: String) -> Self { Self::Named(name) }
}

impl From<BoxedMiddleware> for MiddlewareRef {
    fn from(mw: BoxedMiddleware) -> Self { Self::Inline(mw) }
}

/// Only names can come from a route table.
impl<'de> Deserialize<'de> for MiddlewareRef {
    fn deserialize<D: Deserializer<'de>>(de: D) -> Result<Self, D::Error> {
        String::deserialize(de).map(Self::Named)
    }
}

/// Process-wide mapping from middleware names to middleware.
///
/// Filled once while building [`AdapterOptions`](crate::AdapterOptions) and
/// read-only afterwards.
#[derive(Clone, Default)]
pub struct MiddlewareRegistry {
    entries: HashMap<String, BoxedMiddleware>,
}

impl MiddlewareRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `mw` under `name`, replacing any previous entry.
    pub fn insert(&mut self, name: impl Into<String>, mw: BoxedMiddleware) {
        self.entries.insert(name.into(), mw);
    }

    pub fn get(&self, name: &str) -> Option<&BoxedMiddleware> {
        self.entries.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Resolves every reference in `refs` to a middleware, in order.
    ///
    /// `path` only labels the error. The first unknown name aborts resolution.
    pub fn resolve(&self, path: &str, refs: &[MiddlewareRef]) -> Result<Vec<BoxedMiddleware>, Error> {
        refs.iter()
            .map(|r| match r {
                MiddlewareRef::Inline(mw) => Ok(BoxedMiddleware::clone(mw)),
                MiddlewareRef::Named(name) => self.entries.get(name).cloned().ok_or_else(|| {
                    Error::UnknownMiddleware { path: path.to_owned(), name: name.clone() }
                }),
            })
            .collect()
    }
}

impl fmt::Debug for MiddlewareRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<_> = self.entries.keys().collect();
        names.sort();
        f.debug_struct("MiddlewareRegistry").field("names", &names).finish()
    }
}
