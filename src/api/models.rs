//! Strict entity shapes accepted from the task service.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Lifecycle status of a task.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
	#[default]
	Pending,
	InProgress,
	Completed,
	Archived,
}

impl TaskStatus {
	/// Every status, in display order.
	pub const ALL: [TaskStatus; 4] = [
		TaskStatus::Pending,
		TaskStatus::InProgress,
		TaskStatus::Completed,
		TaskStatus::Archived,
	];

	/// Wire/search representation (`in_progress`, ...).
	pub fn as_str(self) -> &'static str {
		match self {
			TaskStatus::Pending => "pending",
			TaskStatus::InProgress => "in_progress",
			TaskStatus::Completed => "completed",
			TaskStatus::Archived => "archived",
		}
	}

	pub fn label(self) -> &'static str {
		match self {
			TaskStatus::Pending => "Pending",
			TaskStatus::InProgress => "In progress",
			TaskStatus::Completed => "Completed",
			TaskStatus::Archived => "Archived",
		}
	}
}

impl fmt::Display for TaskStatus {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

fn default_active() -> bool {
	true
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
	pub id: String,
	pub name: String,
	#[serde(default)]
	pub description: Option<String>,
	#[serde(default)]
	pub status: TaskStatus,
	#[serde(default)]
	pub assigned_user_ids: Vec<String>,
	#[serde(default)]
	pub assigned_group_ids: Vec<String>,
	#[serde(default)]
	pub is_validated: bool,
	#[serde(default)]
	pub admin_complete: bool,
	#[serde(default)]
	pub start_at: Option<DateTime<Utc>>,
	#[serde(default)]
	pub due_at: Option<DateTime<Utc>>,
}

impl Task {
	/// Only validated tasks that an admin has not closed belong on the board.
	pub fn is_placeable(&self) -> bool {
		self.is_validated && !self.admin_complete
	}
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
	pub id: String,
	pub username: String,
	#[serde(default)]
	pub email: String,
	#[serde(default = "default_active")]
	pub is_active: bool,
	#[serde(default)]
	pub roles: Vec<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Group {
	pub id: String,
	pub name: String,
	#[serde(default)]
	pub description: Option<String>,
	#[serde(default)]
	pub manager_id: Option<String>,
	#[serde(default)]
	pub member_ids: Vec<String>,
	#[serde(default = "default_active")]
	pub is_active: bool,
}

/// The three kinds of entity the board projects.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
	Task,
	User,
	Group,
}

impl EntityKind {
	pub const ALL: [EntityKind; 3] = [EntityKind::Task, EntityKind::User, EntityKind::Group];

	pub fn as_str(self) -> &'static str {
		match self {
			EntityKind::Task => "task",
			EntityKind::User => "user",
			EntityKind::Group => "group",
		}
	}
}

impl fmt::Display for EntityKind {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

/// A snapshot of one remote entity.
#[derive(Clone, Debug, PartialEq)]
pub enum Entity {
	Task(Task),
	User(User),
	Group(Group),
}

impl Entity {
	pub fn kind(&self) -> EntityKind {
		match self {
			Entity::Task(_) => EntityKind::Task,
			Entity::User(_) => EntityKind::User,
			Entity::Group(_) => EntityKind::Group,
		}
	}

	pub fn id(&self) -> &str {
		match self {
			Entity::Task(t) => &t.id,
			Entity::User(u) => &u.id,
			Entity::Group(g) => &g.id,
		}
	}

	/// Display label: username for users, name otherwise.
	pub fn label(&self) -> &str {
		match self {
			Entity::Task(t) => &t.name,
			Entity::User(u) => &u.username,
			Entity::Group(g) => &g.name,
		}
	}
}

/// The three entity lists that make up one board load.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct EntitySnapshot {
	pub tasks: Vec<Task>,
	pub users: Vec<User>,
	pub groups: Vec<Group>,
}
