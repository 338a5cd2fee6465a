//! Query-string parsing.

use serde_json::{Map, Value};

use crate::error::HttpError;

/// Parses a raw query string into a flat object of strings.
///
/// A missing query is an empty object. Repeated keys keep the last value.
pub(crate) fn parse(query: Option<&str>) -> Result<Map<String, Value>, HttpError> {
    let Some(query) = query else {
        return Ok(Map::new());
    };
    let pairs: Vec<(String, String)> = serde_urlencoded::from_str(query)
        .map_err(|e| HttpError::bad_request(format!("invalid query string: {e}")))?;

    Ok(pairs.into_iter().map(|(k, v)| (k, Value::String(v))).collect())
}
