//! Parse-or-reject adapter between raw JSON and the strict entity shapes.
//!
//! Nothing untyped gets past this module: list payloads must be arrays, and
//! every element must deserialize into its entity shape or it is dropped.

use log::warn;
use serde::de::DeserializeOwned;
use serde_json::Value;

use super::error::{ApiError, ApiResult};

/// Parse a list payload. A non-array payload is rejected as a whole; malformed
/// elements are logged and skipped.
pub fn parse_list<T: DeserializeOwned>(what: &str, payload: Value) -> ApiResult<Vec<T>> {
	let Value::Array(items) = payload else {
		return Err(ApiError::Invalid(format!("expected a {what} list")));
	};
	let total = items.len();
	let parsed: Vec<T> = items
		.into_iter()
		.enumerate()
		.filter_map(|(i, item)| match serde_json::from_value(item) {
			Ok(entity) => Some(entity),
			Err(err) => {
				warn!("dropping {what} #{i}: {err}");
				None
			}
		})
		.collect();
	if parsed.len() < total {
		warn!("{what}: kept {} of {total} records", parsed.len());
	}
	Ok(parsed)
}

/// Parse a single entity payload.
pub fn parse_one<T: DeserializeOwned>(what: &str, payload: Value) -> ApiResult<T> {
	serde_json::from_value(payload).map_err(|err| ApiError::Invalid(format!("{what}: {err}")))
}

/// Parse an optional entity payload; `null` or an empty body is `None`.
pub fn parse_optional<T: DeserializeOwned>(what: &str, payload: Value) -> ApiResult<Option<T>> {
	match payload {
		Value::Null => Ok(None),
		Value::Object(ref map) if map.is_empty() => Ok(None),
		other => parse_one(what, other).map(Some),
	}
}
