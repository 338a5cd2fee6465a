//! # tsu-act
//!
//! Expose an actor system's message patterns as HTTP routes.
//!
//! ## The contract
//!
//! The actor system owns the business logic: it receives a message under a
//! pattern such as `role:user,cmd:get` and replies with JSON. tsu-act owns
//! the HTTP side, and nothing else:
//!
//! - Route table → one middleware chain per route, mounted on a [`Router`]
//! - Request → [`Message`] with parsed body, parsed query and the route itself
//! - Result → `200 application/json`, when the route asks for autoreply
//! - Failure → handed to the router's error handler, never rendered here
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use tsu_act::{dispatch, Adapter, AdapterOptions, Method, Route, Router, Server};
//! use serde_json::json;
//!
//! #[tokio::main]
//! async fn main() {
//!     let actor = dispatch::from_fn(|pattern, msg| Box::pin(async move {
//!         match pattern.get("cmd") {
//!             Some("ping") => Ok(json!({ "res": "pong!" })),
//!             Some("echo") => Ok(msg.args.body),
//!             _ => Err("no handler".into()),
//!         }
//!     }));
//!
//!     let mut app = Router::new();
//!     Adapter::new(AdapterOptions::new(), actor)
//!         .register(Some(&mut app), vec![
//!             Route::new("/ping", "role:test,cmd:ping"),
//!             Route::new("/echo", "role:test,cmd:echo").methods([Method::Post]),
//!         ])
//!         .unwrap();
//!
//!     Server::bind("0.0.0.0:3000").serve(app).await.unwrap();
//! }
//! ```

mod adapter;
mod body;
mod bridge;
mod error;
mod handler;
mod method;
mod query;
mod request;
mod response;
mod route;
mod router;
mod server;

pub mod dispatch;
pub mod middleware;

pub use adapter::{Adapter, AdapterOptions, Registration};
pub use body::{BodyParser, JsonBody};
pub use dispatch::{Args, Dispatcher, Message};
pub use error::{BoxError, Error, HttpError};
pub use handler::{BoxFuture, BoxedMiddleware, Flow, Middleware, Outcome};
pub use method::{Method, UnknownMethod};
pub use request::Request;
pub use response::{ContentType, Response};
pub use route::{Pattern, Route};
pub use router::{ErrorHandler, Router, default_error_handler};
pub use server::Server;
