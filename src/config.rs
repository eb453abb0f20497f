//! Build-time configuration for the board.

/// Fallback when `TASKBOARD_API_URL` is not set at build time.
pub const DEFAULT_API_BASE_URL: &str = "http://localhost:3000";
pub const DEFAULT_TOAST_DURATION_MS: u64 = 3000;

#[derive(Clone, Debug, PartialEq)]
pub struct BoardConfig {
	/// Base URL of the task service, without a trailing slash.
	pub api_base_url: String,
	/// Bearer token sent with every request, if any.
	pub auth_token: Option<String>,
	/// How long a toast stays on screen.
	pub toast_duration_ms: u64,
}

impl Default for BoardConfig {
	fn default() -> Self {
		Self::from_values(
			option_env!("TASKBOARD_API_URL"),
			option_env!("TASKBOARD_API_TOKEN"),
		)
	}
}

impl BoardConfig {
	/// Build from optional raw values; blank values fall back to defaults.
	pub fn from_values(base_url: Option<&str>, token: Option<&str>) -> Self {
		let base_url = base_url
			.map(str::trim)
			.filter(|url| !url.is_empty())
			.unwrap_or(DEFAULT_API_BASE_URL);
		Self {
			api_base_url: base_url.trim_end_matches('/').to_string(),
			auth_token: token
				.map(str::trim)
				.filter(|t| !t.is_empty())
				.map(str::to_string),
			toast_duration_ms: DEFAULT_TOAST_DURATION_MS,
		}
	}
}
