//! Task-service boundary: entity shapes, ingestion, and the HTTP client.

mod client;
mod error;
pub mod ingest;
pub mod models;

use async_trait::async_trait;

pub use client::RestClient;
pub use error::{ApiError, ApiResult};
pub use models::{Entity, EntityKind, EntitySnapshot, Group, Task, TaskStatus, User};

/// Everything the board needs from the task service.
///
/// Mutations resolve to the updated parent entity when the service returns one,
/// or `None` for an empty body.
#[async_trait(?Send)]
pub trait BoardApi {
	async fn list_tasks(&self) -> ApiResult<Vec<Task>>;
	async fn list_users(&self) -> ApiResult<Vec<User>>;
	async fn list_groups(&self) -> ApiResult<Vec<Group>>;

	async fn get_task(&self, id: &str) -> ApiResult<Task>;
	async fn get_user(&self, id: &str) -> ApiResult<User>;
	async fn get_group(&self, id: &str) -> ApiResult<Group>;

	async fn assign_user_to_task(&self, task_id: &str, user_id: &str) -> ApiResult<Option<Task>>;
	async fn unassign_user_from_task(&self, task_id: &str, user_id: &str)
	-> ApiResult<Option<Task>>;
	async fn assign_group_to_task(&self, task_id: &str, group_id: &str)
	-> ApiResult<Option<Task>>;
	async fn unassign_group_from_task(
		&self,
		task_id: &str,
		group_id: &str,
	) -> ApiResult<Option<Task>>;
	async fn add_user_to_group(&self, group_id: &str, user_id: &str) -> ApiResult<Option<Group>>;
	async fn remove_user_from_group(&self, group_id: &str, user_id: &str)
	-> ApiResult<Option<Group>>;
}
