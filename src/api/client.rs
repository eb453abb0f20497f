use async_trait::async_trait;
use log::debug;
use reqwest::{Method, RequestBuilder};
use serde_json::{Value, json};

use super::error::{ApiError, ApiResult};
use super::ingest::{parse_list, parse_one, parse_optional};
use super::models::{Group, Task, User};
use super::BoardApi;
use crate::config::BoardConfig;

/// JSON-over-HTTP client for the task service.
#[derive(Clone, Debug)]
pub struct RestClient {
	base_url: String,
	token: Option<String>,
	http: reqwest::Client,
}

impl RestClient {
	pub fn new(config: &BoardConfig) -> Self {
		Self {
			base_url: config.api_base_url.clone(),
			token: config.auth_token.clone(),
			http: reqwest::Client::new(),
		}
	}

	fn url(&self, path: &str) -> String {
		format!("{}{}", self.base_url, path)
	}

	fn request(&self, method: Method, path: &str) -> RequestBuilder {
		let builder = self.http.request(method, self.url(path));
		match &self.token {
			Some(token) => builder.bearer_auth(token),
			None => builder,
		}
	}

	/// Send and read the body as JSON; an empty body reads as `null`.
	async fn send(&self, builder: RequestBuilder) -> ApiResult<Value> {
		let response = builder.send().await?;
		let status = response.status();
		let body = response.text().await?;
		if !status.is_success() {
			return Err(ApiError::Status {
				status: status.as_u16(),
				body,
			});
		}
		if body.trim().is_empty() {
			return Ok(Value::Null);
		}
		Ok(serde_json::from_str(&body)?)
	}

	async fn get(&self, path: &str) -> ApiResult<Value> {
		debug!("GET {path}");
		self.send(self.request(Method::GET, path)).await
	}

	async fn mutate(&self, method: Method, path: &str, body: Option<Value>) -> ApiResult<Value> {
		debug!("{method} {path}");
		let builder = self.request(method, path);
		let builder = match body {
			Some(body) => builder.json(&body),
			None => builder,
		};
		self.send(builder).await
	}
}

#[async_trait(?Send)]
impl BoardApi for RestClient {
	async fn list_tasks(&self) -> ApiResult<Vec<Task>> {
		parse_list("task", self.get("/task").await?)
	}

	async fn list_users(&self) -> ApiResult<Vec<User>> {
		parse_list("user", self.get("/users").await?)
	}

	async fn list_groups(&self) -> ApiResult<Vec<Group>> {
		parse_list("group", self.get("/groups").await?)
	}

	async fn get_task(&self, id: &str) -> ApiResult<Task> {
		parse_one("task", self.get(&format!("/task/{id}")).await?)
	}

	async fn get_user(&self, id: &str) -> ApiResult<User> {
		parse_one("user", self.get(&format!("/users/{id}")).await?)
	}

	async fn get_group(&self, id: &str) -> ApiResult<Group> {
		parse_one("group", self.get(&format!("/groups/{id}")).await?)
	}

	async fn assign_user_to_task(&self, task_id: &str, user_id: &str) -> ApiResult<Option<Task>> {
		let path = format!("/task/{task_id}/users/{user_id}");
		parse_optional("task", self.mutate(Method::POST, &path, None).await?)
	}

	async fn unassign_user_from_task(
		&self,
		task_id: &str,
		user_id: &str,
	) -> ApiResult<Option<Task>> {
		let path = format!("/task/{task_id}/users/{user_id}");
		parse_optional("task", self.mutate(Method::DELETE, &path, None).await?)
	}

	async fn assign_group_to_task(
		&self,
		task_id: &str,
		group_id: &str,
	) -> ApiResult<Option<Task>> {
		let path = format!("/task/{task_id}/groups/{group_id}");
		parse_optional("task", self.mutate(Method::POST, &path, None).await?)
	}

	async fn unassign_group_from_task(
		&self,
		task_id: &str,
		group_id: &str,
	) -> ApiResult<Option<Task>> {
		let path = format!("/task/{task_id}/groups/{group_id}");
		parse_optional("task", self.mutate(Method::DELETE, &path, None).await?)
	}

	async fn add_user_to_group(&self, group_id: &str, user_id: &str) -> ApiResult<Option<Group>> {
		let path = format!("/groups/{group_id}/members");
		let body = json!({ "memberIds": [user_id] });
		parse_optional("group", self.mutate(Method::PATCH, &path, Some(body)).await?)
	}

	async fn remove_user_from_group(
		&self,
		group_id: &str,
		user_id: &str,
	) -> ApiResult<Option<Group>> {
		let path = format!("/groups/{group_id}/members/{user_id}");
		parse_optional("group", self.mutate(Method::DELETE, &path, None).await?)
	}
}
