//! Request body parsing.
//!
//! The server hands every request over with its body already collected as
//! bytes. A [`BodyParser`] turns those bytes into a JSON value for the
//! dispatch payload.

use serde_json::{Map, Value};

use crate::error::{BoxError, HttpError};
use crate::handler::BoxFuture;
use crate::request::Request;

/// Reads a request body into a JSON value.
pub trait BodyParser: Send + Sync + 'static {
    fn read<'a>(&'a self, req: &'a Request) -> BoxFuture<'a, Result<Value, BoxError>>;
}

/// The default parser.
///
/// | body | result |
/// |---|---|
/// | empty | `{}` |
/// | `application/x-www-form-urlencoded` | flat object of strings |
/// | anything else | parsed as JSON |
///
/// Malformed input fails with `400 Bad Request`.
#[derive(Clone, Copy, Debug, Default)]
pub struct JsonBody;

impl BodyParser for JsonBody {
    fn read<'a>(&'a self, req: &'a Request) -> BoxFuture<'a, Result<Value, BoxError>> {
        Box::pin(async move { parse(req).map_err(BoxError::from) })
    }
}

fn parse(req: &Request) -> Result<Value, HttpError> {
    let raw = req.raw_body();
    if raw.is_empty() {
        return Ok(Value::Object(Map::new()));
    }

    let is_form = req
        .header("content-type")
        .is_some_and(|ct| ct.starts_with("application/x-www-form-urlencoded"));

    if is_form {
        let pairs: Vec<(String, String)> = serde_urlencoded::from_bytes(raw)
            .map_err(|e| HttpError::bad_request(format!("invalid form body: {e}")))?;
        return Ok(Value::Object(
            pairs.into_iter().map(|(k, v)| (k, Value::String(v))).collect(),
        ));
    }

    serde_json::from_slice(raw).map_err(|e| HttpError::bad_request(format!("invalid json body: {e}")))
}

#[cfg(test)]
mod tests {
    use http::header::{CONTENT_TYPE, HeaderValue};
    use http::{StatusCode, Uri};
    use serde_json::json;

    use super::*;
    use crate::method::Method;

    fn post(body: &'static str) -> Request {
        Request::new(Method::Post, Uri::from_static("/")).with_raw_body(body)
    }

    #[tokio::test]
    async fn empty_body_is_an_empty_object() {
        assert_eq!(JsonBody.read(&post("")).await.unwrap(), json!({}));
    }

    #[tokio::test]
    async fn parses_json() {
        let body = JsonBody.read(&post(r#"{"a":[1,2]}"#)).await.unwrap();
        assert_eq!(body, json!({ "a": [1, 2] }));
    }

    #[tokio::test]
    async fn parses_forms() {
        let req = post("name=alice&tag=x+y").with_header(
            CONTENT_TYPE,
            HeaderValue::from_static("application/x-www-form-urlencoded; charset=utf-8"),
        );
        let body = JsonBody.read(&req).await.unwrap();
        assert_eq!(body, json!({ "name": "alice", "tag": "x y" }));
    }

    #[tokio::test]
    async fn malformed_json_is_a_bad_request() {
        let err = JsonBody.read(&post("{")).await.unwrap_err();
        let http = err.downcast_ref::<HttpError>().expect("HttpError");
        assert_eq!(http.status, StatusCode::BAD_REQUEST);
    }
}
