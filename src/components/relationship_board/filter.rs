//! Multi-criteria filtering over the board's node set.

use std::collections::BTreeSet;

use chrono::NaiveDate;

use super::node::{BoardNode, NodeId, NodeStore};
use crate::api::{Entity, EntityKind, Group, Task, TaskStatus, User};

/// A set of specific selections with an implicit `all`.
///
/// `all` holds exactly when nothing specific is selected, so the two can never
/// be set together and clearing the last selection restores `all`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StatusToggle<T: Ord> {
	selected: BTreeSet<T>,
}

impl<T: Ord> Default for StatusToggle<T> {
	fn default() -> Self {
		Self {
			selected: BTreeSet::new(),
		}
	}
}

impl<T: Ord + Copy> StatusToggle<T> {
	pub fn is_all(&self) -> bool {
		self.selected.is_empty()
	}

	pub fn is_selected(&self, value: T) -> bool {
		self.selected.contains(&value)
	}

	pub fn toggle(&mut self, value: T) {
		if !self.selected.remove(&value) {
			self.selected.insert(value);
		}
	}

	pub fn select_all(&mut self) {
		self.selected.clear();
	}

	pub fn admits(&self, value: T) -> bool {
		self.is_all() || self.selected.contains(&value)
	}
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ActivityStatus {
	Active,
	Inactive,
}

impl ActivityStatus {
	pub const ALL: [ActivityStatus; 2] = [ActivityStatus::Active, ActivityStatus::Inactive];

	pub fn of(is_active: bool) -> Self {
		if is_active {
			ActivityStatus::Active
		} else {
			ActivityStatus::Inactive
		}
	}

	pub fn label(self) -> &'static str {
		match self {
			ActivityStatus::Active => "Active",
			ActivityStatus::Inactive => "Inactive",
		}
	}
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum AssignmentFilter {
	#[default]
	All,
	Assigned,
	Unassigned,
}

impl AssignmentFilter {
	pub const ALL: [AssignmentFilter; 3] = [
		AssignmentFilter::All,
		AssignmentFilter::Assigned,
		AssignmentFilter::Unassigned,
	];

	pub fn as_str(self) -> &'static str {
		match self {
			AssignmentFilter::All => "all",
			AssignmentFilter::Assigned => "assigned",
			AssignmentFilter::Unassigned => "unassigned",
		}
	}

	pub fn label(self) -> &'static str {
		match self {
			AssignmentFilter::All => "Any assignment",
			AssignmentFilter::Assigned => "Assigned",
			AssignmentFilter::Unassigned => "Unassigned",
		}
	}

	/// Inverse of [`AssignmentFilter::as_str`]; unknown values mean `All`.
	pub fn from_value(value: &str) -> Self {
		Self::ALL
			.into_iter()
			.find(|filter| filter.as_str() == value)
			.unwrap_or_default()
	}

	fn admits(self, task: &Task) -> bool {
		let assigned = !task.assigned_user_ids.is_empty() || !task.assigned_group_ids.is_empty();
		match self {
			AssignmentFilter::All => true,
			AssignmentFilter::Assigned => assigned,
			AssignmentFilter::Unassigned => !assigned,
		}
	}
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct NodeTypeToggles {
	pub task: bool,
	pub user: bool,
	pub group: bool,
}

impl Default for NodeTypeToggles {
	fn default() -> Self {
		Self {
			task: true,
			user: true,
			group: true,
		}
	}
}

impl NodeTypeToggles {
	pub fn enabled(&self, kind: EntityKind) -> bool {
		match kind {
			EntityKind::Task => self.task,
			EntityKind::User => self.user,
			EntityKind::Group => self.group,
		}
	}

	pub fn toggle(&mut self, kind: EntityKind) {
		let flag = match kind {
			EntityKind::Task => &mut self.task,
			EntityKind::User => &mut self.user,
			EntityKind::Group => &mut self.group,
		};
		*flag = !*flag;
	}

	fn is_restricted(&self) -> bool {
		!(self.task && self.user && self.group)
	}
}

/// Inclusive date bounds matched against a task's start/due span.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DateRange {
	pub from: Option<NaiveDate>,
	pub to: Option<NaiveDate>,
}

impl DateRange {
	pub fn is_set(&self) -> bool {
		self.from.is_some() || self.to.is_some()
	}

	/// A task passes when its span overlaps the range. Undated tasks fail any
	/// set bound; a single date is treated as a one-day span.
	fn admits(&self, task: &Task) -> bool {
		if !self.is_set() {
			return true;
		}
		let start = task.start_at.or(task.due_at).map(|d| d.date_naive());
		let end = task.due_at.or(task.start_at).map(|d| d.date_naive());
		let (Some(start), Some(end)) = (start, end) else {
			return false;
		};
		self.from.is_none_or(|from| end >= from) && self.to.is_none_or(|to| start <= to)
	}
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct BoardFilters {
	pub node_types: NodeTypeToggles,
	pub search: String,
	pub task_status: StatusToggle<TaskStatus>,
	pub user_status: StatusToggle<ActivityStatus>,
	pub group_status: StatusToggle<ActivityStatus>,
	pub assignment: AssignmentFilter,
	pub dates: DateRange,
}

impl BoardFilters {
	fn search_term(&self) -> Option<String> {
		let term = self.search.trim();
		(!term.is_empty()).then(|| term.to_lowercase())
	}

	/// Number of filter categories that currently restrict the board.
	pub fn active_count(&self) -> usize {
		[
			self.node_types.is_restricted(),
			self.search_term().is_some(),
			!self.task_status.is_all(),
			!self.user_status.is_all(),
			!self.group_status.is_all(),
			self.assignment != AssignmentFilter::All,
			self.dates.is_set(),
		]
		.into_iter()
		.filter(|&active| active)
		.count()
	}

	pub fn matches(&self, node: &BoardNode) -> bool {
		self.matches_with(node, self.search_term().as_deref())
	}

	fn matches_with(&self, node: &BoardNode, term: Option<&str>) -> bool {
		if !self.node_types.enabled(node.kind()) {
			return false;
		}
		if let Some(term) = term {
			if !matches_search(node, term) {
				return false;
			}
		}
		match node.data() {
			Entity::Task(task) => self.admits_task(task),
			Entity::User(user) => self.admits_user(user),
			Entity::Group(group) => self.admits_group(group),
		}
	}

	fn admits_task(&self, task: &Task) -> bool {
		self.task_status.admits(task.status) && self.assignment.admits(task) && self.dates.admits(task)
	}

	fn admits_user(&self, user: &User) -> bool {
		self.user_status.admits(ActivityStatus::of(user.is_active))
	}

	fn admits_group(&self, group: &Group) -> bool {
		self.group_status.admits(ActivityStatus::of(group.is_active))
	}

	/// Ids of every node that passes, in node-set order.
	pub fn apply(&self, store: &NodeStore) -> Vec<NodeId> {
		let term = self.search_term();
		store
			.all()
			.iter()
			.filter(|node| self.matches_with(node, term.as_deref()))
			.map(|node| node.id().clone())
			.collect()
	}
}

/// Label plus the kind-specific searchable fields. A term must match within a
/// single field.
fn search_fields(node: &BoardNode) -> Vec<&str> {
	let mut fields = vec![node.label()];
	match node.data() {
		Entity::Task(task) => {
			fields.extend(task.description.as_deref());
			fields.push(task.status.as_str());
		}
		Entity::User(user) => {
			fields.push(&user.email);
			fields.extend(user.roles.iter().map(String::as_str));
		}
		Entity::Group(group) => fields.extend(group.description.as_deref()),
	}
	fields
}

fn matches_search(node: &BoardNode, term: &str) -> bool {
	search_fields(node)
		.into_iter()
		.any(|field| field.to_lowercase().contains(term))
}

#[cfg(test)]
mod tests {
	use chrono::{TimeZone, Utc};

	use super::*;
	use crate::api::EntitySnapshot;
	use crate::components::relationship_board::node::build_nodes;

	fn store() -> NodeStore {
		let task = |id: &str, status, users: &[&str]| Task {
			id: id.into(),
			name: format!("Task {id}"),
			description: Some("quarterly report".into()),
			status,
			assigned_user_ids: users.iter().map(|u| u.to_string()).collect(),
			assigned_group_ids: vec![],
			is_validated: true,
			admin_complete: false,
			start_at: None,
			due_at: None,
		};
		let snapshot = EntitySnapshot {
			tasks: vec![
				task("t1", TaskStatus::Pending, &[]),
				task("t2", TaskStatus::Completed, &["u1"]),
			],
			users: vec![
				User {
					id: "u1".into(),
					username: "Alice".into(),
					email: "alice@example.com".into(),
					is_active: true,
					roles: vec!["admin".into()],
				},
				User {
					id: "u2".into(),
					username: "Bob".into(),
					email: "bob@example.com".into(),
					is_active: false,
					roles: vec![],
				},
			],
			groups: vec![Group {
				id: "g1".into(),
				name: "Ops".into(),
				description: Some("night shift".into()),
				manager_id: None,
				member_ids: vec![],
				is_active: true,
			}],
		};
		NodeStore::new(build_nodes(&snapshot, 800.0, 600.0))
	}

	fn ids(v: &[NodeId]) -> Vec<&str> {
		v.iter().map(NodeId::as_str).collect()
	}

	#[test]
	fn defaults_admit_everything() {
		let store = store();
		let filters = BoardFilters::default();
		assert_eq!(filters.apply(&store).len(), store.len());
		assert_eq!(filters.active_count(), 0);
	}

	#[test]
	fn search_overrides_type_admission() {
		let store = store();
		let filters = BoardFilters {
			search: "alice".into(),
			..BoardFilters::default()
		};
		assert_eq!(ids(&filters.apply(&store)), ["user_u1"]);
	}

	#[test]
	fn search_covers_kind_specific_fields() {
		let store = store();
		let by = |term: &str| {
			let filters = BoardFilters {
				search: term.into(),
				..BoardFilters::default()
			};
			filters.apply(&store)
		};
		assert_eq!(ids(&by("ADMIN")), ["user_u1"]);
		assert_eq!(ids(&by("night")), ["group_g1"]);
		assert_eq!(ids(&by("completed")), ["task_t2"]);
		assert_eq!(by("quarterly").len(), 2);
	}

	#[test]
	fn search_terms_do_not_span_fields() {
		let store = store();
		let by = |term: &str| {
			let filters = BoardFilters {
				search: term.into(),
				..BoardFilters::default()
			};
			filters.apply(&store)
		};
		// email ends in "com", the next field is the "admin" role
		assert!(by("com admin").is_empty());
		assert!(by("alice admin").is_empty());
		assert_eq!(ids(&by("example.com")), ["user_u1", "user_u2"]);
	}

	#[test]
	fn task_predicates_leave_other_kinds_alone() {
		let store = store();
		let mut filters = BoardFilters::default();
		filters.task_status.toggle(TaskStatus::Completed);
		filters.assignment = AssignmentFilter::Assigned;
		assert_eq!(
			ids(&filters.apply(&store)),
			["task_t2", "user_u1", "user_u2", "group_g1"]
		);
	}

	#[test]
	fn activity_and_type_toggles() {
		let store = store();
		let mut filters = BoardFilters::default();
		filters.user_status.toggle(ActivityStatus::Inactive);
		filters.node_types.toggle(EntityKind::Task);
		assert_eq!(ids(&filters.apply(&store)), ["user_u2", "group_g1"]);
		assert_eq!(filters.active_count(), 2);
	}

	#[test]
	fn apply_is_idempotent() {
		let store = store();
		let mut filters = BoardFilters::default();
		filters.search = "o".into();
		assert_eq!(filters.apply(&store), filters.apply(&store));
	}

	#[test]
	fn toggle_all_exclusivity_holds() {
		let mut toggle = StatusToggle::<TaskStatus>::default();
		let sequence = [
			TaskStatus::Pending,
			TaskStatus::Archived,
			TaskStatus::Pending,
			TaskStatus::InProgress,
			TaskStatus::Archived,
			TaskStatus::InProgress,
		];
		for status in sequence {
			toggle.toggle(status);
			let any_specific = TaskStatus::ALL.iter().any(|&s| toggle.is_selected(s));
			assert_ne!(toggle.is_all(), any_specific);
		}
		assert!(toggle.is_all());
		toggle.toggle(TaskStatus::Completed);
		toggle.select_all();
		assert!(toggle.is_all());
		assert!(!toggle.is_selected(TaskStatus::Completed));
	}

	#[test]
	fn count_is_per_category() {
		let mut filters = BoardFilters::default();
		filters.task_status.toggle(TaskStatus::Pending);
		filters.task_status.toggle(TaskStatus::Archived);
		filters.search = "  ".into();
		assert_eq!(filters.active_count(), 1);
		filters.dates.from = NaiveDate::from_ymd_opt(2026, 1, 1);
		filters.dates.to = NaiveDate::from_ymd_opt(2026, 2, 1);
		filters.group_status.toggle(ActivityStatus::Active);
		assert_eq!(filters.active_count(), 3);
	}

	#[test]
	fn date_range_overlaps_task_span() {
		let day = |d| Utc.with_ymd_and_hms(2026, 3, d, 12, 0, 0).single();
		let mut task = Task {
			id: "t".into(),
			name: "t".into(),
			description: None,
			status: TaskStatus::Pending,
			assigned_user_ids: vec![],
			assigned_group_ids: vec![],
			is_validated: true,
			admin_complete: false,
			start_at: day(5),
			due_at: day(10),
		};
		let range = |from, to| DateRange {
			from: NaiveDate::from_ymd_opt(2026, 3, from),
			to: NaiveDate::from_ymd_opt(2026, 3, to),
		};
		assert!(range(1, 5).admits(&task));
		assert!(range(10, 20).admits(&task));
		assert!(!range(11, 20).admits(&task));
		assert!(!range(1, 4).admits(&task));
		task.start_at = None;
		task.due_at = None;
		assert!(!range(1, 31).admits(&task));
		assert!(DateRange::default().admits(&task));
	}
}
