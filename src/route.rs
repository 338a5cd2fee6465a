//! Route descriptors.
//!
//! A [`Route`] binds one HTTP path to one message pattern. Routes are built
//! upstream (by hand or deserialised from a route table) and never change once
//! handed to the adapter.

use std::fmt;

use serde::Deserialize;

use crate::method::Method;
use crate::middleware::MiddlewareRef;

/// A message-pattern identifier such as `role:user,cmd:get`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Deserialize)]
#[serde(transparent)]
pub struct Pattern(String);

impl Pattern {
    pub fn new(pattern: impl Into<String>) -> Self {
        Self(pattern.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Iterates the `key:value` pairs of the pattern, trimmed.
    ///
    /// Segments without a `:` yield an empty value.
    pub fn pairs(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0
            .split(',')
            .map(str::trim)
            .filter(|seg| !seg.is_empty())
            .map(|seg| match seg.split_once(':') {
                Some((k, v)) => (k.trim(), v.trim()),
                None => (seg, ""),
            })
    }

    /// The value paired with `key`, if present.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs().find(|(k, _)| *k == key).map(|(_, v)| v)
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Pattern {
    fn from(s: &str) -> Self { Self::new(s) }
}

/// One HTTP-route-to-message-pattern binding.
///
/// ```rust
/// use tsu_act::{Method, Route};
///
/// let route = Route::new("/ping", "role:test,cmd:ping")
///     .methods([Method::Get, Method::Head])
///     .middleware("auth")
///     .autoreply(true);
/// assert!(route.accepts(Method::Head));
/// ```
#[derive(Clone, Debug, Deserialize)]
pub struct Route {
    pub path: String,
    pub methods: Vec<Method>,
    pub pattern: Pattern,
    #[serde(default)]
    pub middleware: Vec<MiddlewareRef>,
    #[serde(default = "autoreply_default")]
    pub autoreply: bool,
}

fn autoreply_default() -> bool { true }

impl Route {
    /// A `GET` route with no middleware and autoreply on.
    pub fn new(path: impl Into<String>, pattern: impl Into<Pattern>) -> Self {
        Self {
            path: path.into(),
            methods: vec![Method::Get],
            pattern: pattern.into(),
            middleware: Vec::new(),
            autoreply: true,
        }
    }

    /// Replaces the accepted methods.
    pub fn methods(mut self, methods: impl IntoIterator<Item = Method>) -> Self {
        self.methods = methods.into_iter().collect();
        self
    }

    /// Appends one middleware reference: a registry name or an inline middleware.
    pub fn middleware(mut self, mw: impl Into<MiddlewareRef>) -> Self {
        self.middleware.push(mw.into());
        self
    }

    pub fn autoreply(mut self, on: bool) -> Self {
        self.autoreply = on;
        self
    }

    pub fn accepts(&self, method: Method) -> bool {
        self.methods.contains(&method)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pattern_pairs() {
        let p = Pattern::new("role:test, cmd:ping,flag");
        let pairs: Vec<_> = p.pairs().collect();
        assert_eq!(pairs, [("role", "test"), ("cmd", "ping"), ("flag", "")]);
        assert_eq!(p.get("cmd"), Some("ping"));
        assert_eq!(p.get("missing"), None);
    }

    #[test]
    fn deserializes_with_defaults() {
        let route: Route = serde_json::from_str(
            r#"{ "path": "/ping", "methods": ["get"], "pattern": "role:test,cmd:ping" }"#,
        )
        .unwrap();

        assert_eq!(route.path, "/ping");
        assert_eq!(route.methods, [Method::Get]);
        assert_eq!(route.pattern.as_str(), "role:test,cmd:ping");
        assert!(route.middleware.is_empty());
        assert!(route.autoreply);
    }

    #[test]
    fn deserializes_named_middleware() {
        let route: Route = serde_json::from_str(
            r#"{ "path": "/a", "methods": ["POST"], "pattern": "x:1",
                 "middleware": ["auth", "audit"], "autoreply": false }"#,
        )
        .unwrap();

        let names: Vec<_> = route
            .middleware
            .iter()
            .map(|m| match m {
                MiddlewareRef::Named(n) => n.as_str(),
                MiddlewareRef::Inline(_) => "<inline>",
            })
            .collect();
        assert_eq!(names, ["auth", "audit"]);
        assert!(!route.autoreply);
    }

    #[test]
    fn accepts_only_listed_methods() {
        let route = Route::new("/a", "x:1").methods([Method::Post]);
        assert!(route.accepts(Method::Post));
        assert!(!route.accepts(Method::Get));
    }
}
