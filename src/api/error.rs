use thiserror::Error;

/// Failures crossing the task-service boundary.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ApiError {
	#[error("request failed: {0}")]
	Transport(String),
	#[error("server responded {status}: {body}")]
	Status { status: u16, body: String },
	#[error("could not decode response: {0}")]
	Decode(String),
	#[error("rejected payload: {0}")]
	Invalid(String),
}

pub type ApiResult<T> = Result<T, ApiError>;

impl From<reqwest::Error> for ApiError {
	fn from(err: reqwest::Error) -> Self {
		if err.is_decode() {
			ApiError::Decode(err.to_string())
		} else {
			ApiError::Transport(err.to_string())
		}
	}
}

impl From<serde_json::Error> for ApiError {
	fn from(err: serde_json::Error) -> Self {
		ApiError::Decode(err.to_string())
	}
}
