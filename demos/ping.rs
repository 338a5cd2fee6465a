//! Minimal tsu-act demo: a toy actor behind three routes.
//!
//! Run with:
//!   RUST_LOG=debug cargo run --example ping
//!
//! Try:
//!   curl http://localhost:3000/ping
//!   curl -X POST http://localhost:3000/echo?loud=1 \
//!        -H 'content-type: application/json' \
//!        -d '{"name":"alice"}'
//!   curl -H 'x-token: s3cret' http://localhost:3000/admin/stats
//!   curl http://localhost:3000/boom

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use http::StatusCode;
use serde_json::json;
use tsu_act::middleware::from_fn;
use tsu_act::{dispatch, Adapter, AdapterOptions, Flow, HttpError, Method, Route, Router, Server};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let pings = Arc::new(AtomicU64::new(0));
    let counter = Arc::clone(&pings);

    // role:demo,cmd:*
    let actor = dispatch::from_fn(move |pattern, msg| {
        let counter = Arc::clone(&counter);
        Box::pin(async move {
            match pattern.get("cmd") {
                Some("ping") => {
                    counter.fetch_add(1, Ordering::Relaxed);
                    Ok(json!({ "res": "pong!" }))
                }
                Some("echo") => Ok(json!({ "body": msg.args.body, "query": msg.args.query })),
                Some("stats") => Ok(json!({ "pings": counter.load(Ordering::Relaxed) })),
                Some("boom") => Err("aw snap!".into()),
                _ => Err(HttpError::new(StatusCode::NOT_IMPLEMENTED, "no handler").into()),
            }
        })
    });

    let require_token = from_fn(|req, _res| Box::pin(async move {
        match req.header("x-token") {
            Some("s3cret") => Ok(Flow::Continue),
            _ => Err(HttpError::new(StatusCode::UNAUTHORIZED, "missing or bad x-token").into()),
        }
    }));

    let options = AdapterOptions::new().middleware("auth", require_token);

    let mut app = Router::new();
    let registration = Adapter::new(options, actor)
        .register(
            Some(&mut app),
            vec![
                Route::new("/ping", "role:demo,cmd:ping"),
                Route::new("/echo", "role:demo,cmd:echo").methods([Method::Post]),
                Route::new("/admin/stats", "role:demo,cmd:stats").middleware("auth"),
                Route::new("/boom", "role:demo,cmd:boom"),
            ],
        )
        .expect("route registration");

    tracing::info!(routes = registration.routes.len(), "demo routes ready");

    Server::bind("0.0.0.0:3000")
        .serve(app)
        .await
        .expect("server error");
}
