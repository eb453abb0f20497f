use std::collections::HashSet;

use log::{debug, info};

use super::filter::BoardFilters;
use super::geometry::ViewTransform;
use super::interaction::{Action, PointerInput, PointerMachine};
use super::node::{NodeId, NodeStore, build_nodes};
use super::resolver::{Relation, RelationChange, apply_change};
use super::sync::BatchOutcome;
use crate::api::{Entity, EntitySnapshot};

/// Everything the canvas draws and the pointer edits.
pub struct BoardState {
	pub store: NodeStore,
	pub view: ViewTransform,
	pub pointer: PointerMachine,
	pub width: f64,
	pub height: f64,
	filters: BoardFilters,
	in_flight: HashSet<(Relation, String, String)>,
	dirty: bool,
}

impl BoardState {
	pub fn new(width: f64, height: f64) -> Self {
		Self {
			store: NodeStore::default(),
			view: ViewTransform::default(),
			pointer: PointerMachine::default(),
			width,
			height,
			filters: BoardFilters::default(),
			in_flight: HashSet::new(),
			dirty: true,
		}
	}

	/// Rebuild every node from a fresh load and re-filter.
	pub fn load(&mut self, snapshot: &EntitySnapshot) {
		let nodes = build_nodes(snapshot, self.width, self.height);
		self.store.rebuild(nodes);
		self.pointer.reset();
		self.apply_filters();
		info!("board rebuilt with {} nodes", self.store.len());
	}

	pub fn filters(&self) -> &BoardFilters {
		&self.filters
	}

	/// Replace the filter criteria and recompute the visible set. Returns the
	/// active filter count.
	pub fn set_filters(&mut self, filters: BoardFilters) -> usize {
		self.filters = filters;
		self.apply_filters()
	}

	pub fn apply_filters(&mut self) -> usize {
		let visible = self.filters.apply(&self.store);
		debug!("filters admit {} of {} nodes", visible.len(), self.store.len());
		self.store.set_visible(visible);
		self.dirty = true;
		self.filters.active_count()
	}

	pub fn handle(&mut self, input: PointerInput) -> Vec<Action> {
		let actions = self.pointer.handle(input, &mut self.store, &mut self.view);
		if actions.contains(&Action::RenderNeeded) {
			self.dirty = true;
		}
		actions
	}

	/// Claim the (owner, member) pair for a request. `false` when a request for
	/// the same pair is still in flight.
	pub fn begin_change(&mut self, change: &RelationChange) -> bool {
		self.in_flight.insert(change.pair())
	}

	/// Release the pair and, on success, record the change on the owner node.
	/// Returns the patched node.
	pub fn finish_change(
		&mut self,
		change: &RelationChange,
		confirmed: Option<Option<Entity>>,
	) -> Option<NodeId> {
		self.in_flight.remove(&change.pair());
		let snapshot = confirmed?;
		let patched = apply_change(&mut self.store, change, snapshot);
		self.apply_filters();
		patched
	}

	/// Record the edits of a batch that went through. Only lists are patched:
	/// responses arrive in any order and must not overwrite one another.
	pub fn apply_batch(&mut self, outcome: &BatchOutcome) -> Vec<NodeId> {
		let mut patched: Vec<NodeId> = Vec::new();
		for change in &outcome.applied {
			if let Some(id) = apply_change(&mut self.store, change, None) {
				if !patched.contains(&id) {
					patched.push(id);
				}
			}
		}
		self.apply_filters();
		patched
	}

	/// Swap in a fresher snapshot for the node showing this entity. Node data
	/// feeds the filters, so the visible set is recomputed.
	pub fn apply_snapshot(&mut self, entity: Entity) -> bool {
		let id = NodeId::new(entity.kind(), entity.id());
		let replaced = self
			.store
			.get_mut(&id)
			.is_some_and(|node| node.replace_data(entity));
		if replaced {
			self.apply_filters();
		}
		replaced
	}

	pub fn entity(&self, id: &NodeId) -> Option<&Entity> {
		self.store.get(id).map(|node| node.data())
	}

	pub fn resize(&mut self, width: f64, height: f64) {
		self.width = width;
		self.height = height;
		self.dirty = true;
	}

	pub fn reset_view(&mut self) {
		self.view.reset();
		self.dirty = true;
	}

	pub fn mark_dirty(&mut self) {
		self.dirty = true;
	}

	/// Whether a redraw is due; clears the flag.
	pub fn take_dirty(&mut self) -> bool {
		std::mem::take(&mut self.dirty)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::api::{EntityKind, Group, Task, TaskStatus, User};
	use crate::components::relationship_board::resolver::MembershipOp;

	fn snapshot() -> EntitySnapshot {
		EntitySnapshot {
			tasks: vec![Task {
				id: "t1".into(),
				name: "Deploy".into(),
				description: None,
				status: TaskStatus::Pending,
				assigned_user_ids: vec![],
				assigned_group_ids: vec![],
				is_validated: true,
				admin_complete: false,
				start_at: None,
				due_at: None,
			}],
			users: vec![User {
				id: "u1".into(),
				username: "Alice".into(),
				email: String::new(),
				is_active: true,
				roles: vec![],
			}],
			groups: vec![Group {
				id: "g1".into(),
				name: "Ops".into(),
				description: None,
				manager_id: None,
				member_ids: vec![],
				is_active: true,
			}],
		}
	}

	fn change(op: MembershipOp) -> RelationChange {
		RelationChange {
			relation: Relation::TaskUser,
			op,
			owner_id: "t1".into(),
			member_id: "u1".into(),
		}
	}

	#[test]
	fn in_flight_pairs_are_exclusive() {
		let mut state = BoardState::new(800.0, 600.0);
		state.load(&snapshot());
		assert!(state.begin_change(&change(MembershipOp::Add)));
		assert!(!state.begin_change(&change(MembershipOp::Remove)));
		state.finish_change(&change(MembershipOp::Add), None);
		assert!(state.begin_change(&change(MembershipOp::Remove)));
	}

	#[test]
	fn failed_change_leaves_data_untouched() {
		let mut state = BoardState::new(800.0, 600.0);
		state.load(&snapshot());
		let before = state.store.all().to_vec();
		assert!(state.begin_change(&change(MembershipOp::Add)));
		assert_eq!(state.finish_change(&change(MembershipOp::Add), None), None);
		assert_eq!(state.store.all(), before.as_slice());
		assert!(state.store.connections().is_empty());
	}

	#[test]
	fn confirmed_change_draws_connection() {
		let mut state = BoardState::new(800.0, 600.0);
		state.load(&snapshot());
		state.begin_change(&change(MembershipOp::Add));
		let patched = state.finish_change(&change(MembershipOp::Add), Some(None));
		assert_eq!(patched, Some(NodeId::new(EntityKind::Task, "t1")));
		assert_eq!(state.store.connections().len(), 1);
	}

	#[test]
	fn filters_recompute_synchronously() {
		let mut state = BoardState::new(800.0, 600.0);
		state.load(&snapshot());
		let mut filters = state.filters().clone();
		filters.node_types.toggle(EntityKind::User);
		assert_eq!(state.set_filters(filters), 1);
		let visible: Vec<_> = state.store.visible_ids().iter().map(NodeId::as_str).collect();
		assert_eq!(visible, ["task_t1", "group_g1"]);
		assert!(state.take_dirty());
		assert!(!state.take_dirty());
	}

	#[test]
	fn data_changes_refilter_the_board() {
		use crate::components::relationship_board::filter::AssignmentFilter;

		let mut state = BoardState::new(800.0, 600.0);
		state.load(&snapshot());
		let t1 = NodeId::new(EntityKind::Task, "t1");
		let mut filters = state.filters().clone();
		filters.assignment = AssignmentFilter::Unassigned;
		state.set_filters(filters);
		assert!(state.store.is_visible(&t1));

		state.begin_change(&change(MembershipOp::Add));
		state.finish_change(&change(MembershipOp::Add), Some(None));
		assert!(!state.store.is_visible(&t1));

		let mut task = snapshot().tasks.remove(0);
		task.assigned_user_ids.clear();
		assert!(state.apply_snapshot(Entity::Task(task)));
		assert!(state.store.is_visible(&t1));

		let outcome = BatchOutcome {
			applied: vec![change(MembershipOp::Add)],
			failed: vec![],
		};
		assert_eq!(state.apply_batch(&outcome), vec![t1.clone()]);
		assert!(!state.store.is_visible(&t1));
	}

	#[test]
	fn snapshots_replace_node_data() {
		let mut state = BoardState::new(800.0, 600.0);
		state.load(&snapshot());
		let mut user = snapshot().users.remove(0);
		user.username = "Alice B.".into();
		assert!(state.apply_snapshot(Entity::User(user)));
		let id = NodeId::new(EntityKind::User, "u1");
		assert_eq!(state.entity(&id).map(Entity::label), Some("Alice B."));
	}
}
