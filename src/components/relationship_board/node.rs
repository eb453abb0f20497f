//! On-canvas projection of tasks, users and groups, and the spiral layout.

use std::collections::{HashMap, HashSet};
use std::fmt;

use log::warn;

use crate::api::{Entity, EntityKind, EntitySnapshot};

pub const SPIRAL_ANGLE_STEP: f64 = 2.4;
pub const SPIRAL_ANGLE_SKEW: f64 = 0.5;
pub const SPIRAL_BASE_RADIUS: f64 = 80.0;
pub const SPIRAL_RADIUS_STEP: f64 = 15.0;
/// Spiral radius cap as a fraction of the smaller canvas side.
pub const SPIRAL_MAX_FRACTION: f64 = 0.3;

/// Fixed visual attributes per node kind.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct NodeStyle {
	pub radius: f64,
	pub color: &'static str,
	pub shadow_color: &'static str,
}

pub fn style_for(kind: EntityKind) -> NodeStyle {
	match kind {
		EntityKind::Task => NodeStyle {
			radius: 32.0,
			color: "#4299e1",
			shadow_color: "rgba(66, 153, 225, 0.6)",
		},
		EntityKind::User => NodeStyle {
			radius: 26.0,
			color: "#48bb78",
			shadow_color: "rgba(72, 187, 120, 0.6)",
		},
		EntityKind::Group => NodeStyle {
			radius: 38.0,
			color: "#ed8936",
			shadow_color: "rgba(237, 137, 54, 0.6)",
		},
	}
}

/// Composite of kind and entity id, e.g. `task_t1`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(String);

impl NodeId {
	pub fn new(kind: EntityKind, entity_id: &str) -> Self {
		Self(format!("{}_{}", kind.as_str(), entity_id))
	}

	pub fn as_str(&self) -> &str {
		&self.0
	}
}

impl fmt::Display for NodeId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.0)
	}
}

#[derive(Clone, Debug, PartialEq)]
pub struct BoardNode {
	pub x: f64,
	pub y: f64,
	id: NodeId,
	kind: EntityKind,
	style: NodeStyle,
	data: Entity,
}

impl BoardNode {
	pub fn new(data: Entity, x: f64, y: f64) -> Self {
		let kind = data.kind();
		Self {
			x,
			y,
			id: NodeId::new(kind, data.id()),
			kind,
			style: style_for(kind),
			data,
		}
	}

	pub fn id(&self) -> &NodeId {
		&self.id
	}

	pub fn kind(&self) -> EntityKind {
		self.kind
	}

	pub fn entity_id(&self) -> &str {
		self.data.id()
	}

	pub fn label(&self) -> &str {
		self.data.label()
	}

	pub fn radius(&self) -> f64 {
		self.style.radius
	}

	pub fn color(&self) -> &'static str {
		self.style.color
	}

	pub fn shadow_color(&self) -> &'static str {
		self.style.shadow_color
	}

	pub fn data(&self) -> &Entity {
		&self.data
	}

	pub(crate) fn data_mut(&mut self) -> &mut Entity {
		&mut self.data
	}

	/// Swap in a fresher snapshot of the same entity. Snapshots for a different
	/// entity are refused.
	pub fn replace_data(&mut self, data: Entity) -> bool {
		if data.kind() != self.kind || data.id() != self.data.id() {
			warn!("refusing snapshot {}_{} for node {}", data.kind(), data.id(), self.id);
			return false;
		}
		self.data = data;
		true
	}

	pub fn contains(&self, wx: f64, wy: f64, tolerance: f64) -> bool {
		let (dx, dy) = (self.x - wx, self.y - wy);
		(dx * dx + dy * dy).sqrt() < self.style.radius + tolerance
	}
}

/// Position of the `i`-th node on the layout spiral.
pub fn spiral_position(i: usize, width: f64, height: f64) -> (f64, f64) {
	let i = i as f64;
	let angle = i * SPIRAL_ANGLE_STEP + i * SPIRAL_ANGLE_SKEW;
	let radius = (SPIRAL_BASE_RADIUS + i * SPIRAL_RADIUS_STEP)
		.min(SPIRAL_MAX_FRACTION * width.min(height));
	(
		width / 2.0 + radius * angle.cos(),
		height / 2.0 + radius * angle.sin(),
	)
}

/// Build the full node set: placeable tasks, then users, then groups, laid out
/// on one spiral.
pub fn build_nodes(snapshot: &EntitySnapshot, width: f64, height: f64) -> Vec<BoardNode> {
	let entities = snapshot
		.tasks
		.iter()
		.filter(|t| t.is_placeable())
		.cloned()
		.map(Entity::Task)
		.chain(snapshot.users.iter().cloned().map(Entity::User))
		.chain(snapshot.groups.iter().cloned().map(Entity::Group));

	let mut seen = HashSet::new();
	let mut nodes = Vec::new();
	for entity in entities {
		if seen.insert(NodeId::new(entity.kind(), entity.id())) {
			let (x, y) = spiral_position(nodes.len(), width, height);
			nodes.push(BoardNode::new(entity, x, y));
		} else {
			warn!("duplicate {} {} skipped", entity.kind(), entity.id());
		}
	}
	nodes
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ConnectionKind {
	TaskUser,
	TaskGroup,
	GroupMember,
}

/// A derived edge; never stored between render passes.
#[derive(Clone, Debug, PartialEq)]
pub struct Connection<'a> {
	pub kind: ConnectionKind,
	pub from: &'a BoardNode,
	pub to: &'a BoardNode,
}

/// Owns every node; tracks the drawn/interactive subset by id.
#[derive(Clone, Debug, Default)]
pub struct NodeStore {
	all: Vec<BoardNode>,
	index: HashMap<NodeId, usize>,
	/// Draw order of the visible subset.
	visible: Vec<NodeId>,
	shown: HashSet<NodeId>,
}

impl NodeStore {
	pub fn new(nodes: Vec<BoardNode>) -> Self {
		let mut store = Self::default();
		store.rebuild(nodes);
		store
	}

	/// Replace every node. The visible set resets to all nodes.
	pub fn rebuild(&mut self, nodes: Vec<BoardNode>) {
		self.all = nodes;
		self.reindex();
		self.visible = self.all.iter().map(|n| n.id().clone()).collect();
		self.shown = self.visible.iter().cloned().collect();
	}

	fn reindex(&mut self) {
		self.index = self
			.all
			.iter()
			.enumerate()
			.map(|(i, n)| (n.id().clone(), i))
			.collect();
	}

	pub fn all(&self) -> &[BoardNode] {
		&self.all
	}

	pub fn len(&self) -> usize {
		self.all.len()
	}

	pub fn is_empty(&self) -> bool {
		self.all.is_empty()
	}

	pub fn get(&self, id: &NodeId) -> Option<&BoardNode> {
		self.index.get(id).map(|&i| &self.all[i])
	}

	pub fn get_mut(&mut self, id: &NodeId) -> Option<&mut BoardNode> {
		self.index.get(id).map(|&i| &mut self.all[i])
	}

	pub fn by_entity(&self, kind: EntityKind, entity_id: &str) -> Option<&BoardNode> {
		self.get(&NodeId::new(kind, entity_id))
	}

	pub fn visible_ids(&self) -> &[NodeId] {
		&self.visible
	}

	/// Visible nodes in draw order (last is topmost).
	pub fn visible(&self) -> impl DoubleEndedIterator<Item = &BoardNode> + '_ {
		self.visible.iter().filter_map(|id| self.get(id))
	}

	pub fn is_visible(&self, id: &NodeId) -> bool {
		self.shown.contains(id)
	}

	/// Replace the visible subset. Unknown ids are ignored.
	pub fn set_visible(&mut self, ids: Vec<NodeId>) {
		self.visible = ids.into_iter().filter(|id| self.index.contains_key(id)).collect();
		self.shown = self.visible.iter().cloned().collect();
	}

	/// Move a visible node to the end of the draw order. The node set is
	/// reordered too, so re-filtering keeps it on top.
	pub fn bring_to_front(&mut self, id: &NodeId) -> bool {
		let Some(pos) = self.visible.iter().position(|v| v == id) else {
			return false;
		};
		let id = self.visible.remove(pos);
		if let Some(i) = self.index.get(&id).copied() {
			if i + 1 != self.all.len() {
				let node = self.all.remove(i);
				self.all.push(node);
				self.reindex();
			}
		}
		self.visible.push(id);
		true
	}

	/// Connections between visible nodes, recomputed from node data.
	pub fn connections(&self) -> Vec<Connection<'_>> {
		let mut out = Vec::new();
		for node in self.visible() {
			match node.data() {
				Entity::Task(task) => {
					let users = (EntityKind::User, ConnectionKind::TaskUser);
					let groups = (EntityKind::Group, ConnectionKind::TaskGroup);
					self.link(&mut out, node, users, &task.assigned_user_ids);
					self.link(&mut out, node, groups, &task.assigned_group_ids);
				}
				Entity::Group(group) => {
					let members = (EntityKind::User, ConnectionKind::GroupMember);
					self.link(&mut out, node, members, &group.member_ids);
				}
				Entity::User(_) => {}
			}
		}
		out
	}

	fn link<'a>(
		&'a self,
		out: &mut Vec<Connection<'a>>,
		from: &'a BoardNode,
		(kind, connection): (EntityKind, ConnectionKind),
		ids: &[String],
	) {
		for id in ids {
			let target_id = NodeId::new(kind, id);
			if !self.is_visible(&target_id) {
				continue;
			}
			if let Some(to) = self.get(&target_id) {
				out.push(Connection {
					kind: connection,
					from,
					to,
				});
			}
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::api::{Group, Task, TaskStatus, User};

	fn task(id: &str, validated: bool, complete: bool) -> Task {
		Task {
			id: id.into(),
			name: format!("Task {id}"),
			description: None,
			status: TaskStatus::Pending,
			assigned_user_ids: vec![],
			assigned_group_ids: vec![],
			is_validated: validated,
			admin_complete: complete,
			start_at: None,
			due_at: None,
		}
	}

	fn user(id: &str, name: &str) -> User {
		User {
			id: id.into(),
			username: name.into(),
			email: String::new(),
			is_active: true,
			roles: vec![],
		}
	}

	fn group(id: &str, members: &[&str]) -> Group {
		Group {
			id: id.into(),
			name: format!("Group {id}"),
			description: None,
			manager_id: None,
			member_ids: members.iter().map(|m| m.to_string()).collect(),
			is_active: true,
		}
	}

	#[test]
	fn only_placeable_tasks_become_nodes() {
		let snapshot = EntitySnapshot {
			tasks: vec![task("t1", true, false), task("t2", false, false), task("t3", true, true)],
			users: vec![user("u1", "Alice")],
			groups: vec![],
		};
		let nodes = build_nodes(&snapshot, 800.0, 600.0);
		let ids: Vec<_> = nodes.iter().map(|n| n.id().as_str()).collect();
		assert_eq!(ids, ["task_t1", "user_u1"]);
		assert_eq!(nodes[1].label(), "Alice");
		assert_eq!(nodes[1].radius(), style_for(EntityKind::User).radius);
	}

	#[test]
	fn layout_is_deterministic() {
		let snapshot = EntitySnapshot {
			tasks: vec![task("t1", true, false)],
			users: vec![user("u1", "a"), user("u2", "b")],
			groups: vec![group("g1", &[])],
		};
		let a = build_nodes(&snapshot, 1024.0, 768.0);
		let b = build_nodes(&snapshot, 1024.0, 768.0);
		assert_eq!(a, b);
	}

	#[test]
	fn spiral_radius_is_capped() {
		let (x, y) = spiral_position(0, 1000.0, 500.0);
		assert!((x - 580.0).abs() < 1e-9 && (y - 250.0).abs() < 1e-9);
		let (x, y) = spiral_position(50, 1000.0, 500.0);
		let r = ((x - 500.0).powi(2) + (y - 250.0).powi(2)).sqrt();
		assert!((r - 150.0).abs() < 1e-9);
	}

	#[test]
	fn duplicate_entities_are_skipped() {
		let snapshot = EntitySnapshot {
			tasks: vec![],
			users: vec![user("u1", "a"), user("u1", "again")],
			groups: vec![],
		};
		let nodes = build_nodes(&snapshot, 800.0, 600.0);
		assert_eq!(nodes.len(), 1);
		assert_eq!(nodes[0].label(), "a");
	}

	#[test]
	fn bring_to_front_moves_node_last() {
		let snapshot = EntitySnapshot {
			tasks: vec![],
			users: vec![user("u1", "a"), user("u2", "b"), user("u3", "c")],
			groups: vec![],
		};
		let mut store = NodeStore::new(build_nodes(&snapshot, 800.0, 600.0));
		let first = NodeId::new(EntityKind::User, "u1");
		assert!(store.bring_to_front(&first));
		let order: Vec<String> = store.visible_ids().iter().map(|id| id.as_str().to_owned()).collect();
		assert_eq!(order, ["user_u2", "user_u3", "user_u1"]);
		assert!(store.bring_to_front(&first));
		let again: Vec<String> = store.visible_ids().iter().map(|id| id.as_str().to_owned()).collect();
		assert_eq!(order, again);
	}

	#[test]
	fn front_order_survives_refiltering() {
		let snapshot = EntitySnapshot {
			tasks: vec![],
			users: vec![user("u1", "a"), user("u2", "b"), user("u3", "c")],
			groups: vec![],
		};
		let mut store = NodeStore::new(build_nodes(&snapshot, 800.0, 600.0));
		let first = NodeId::new(EntityKind::User, "u1");
		store.bring_to_front(&first);
		let everything: Vec<NodeId> = store.all().iter().map(|n| n.id().clone()).collect();
		store.set_visible(everything);
		let order: Vec<_> = store.visible_ids().iter().map(NodeId::as_str).collect();
		assert_eq!(order, ["user_u2", "user_u3", "user_u1"]);
		assert_eq!(store.get(&first).map(BoardNode::label), Some("a"));

		store.set_visible(vec![NodeId::new(EntityKind::User, "u3")]);
		assert!(!store.is_visible(&first));
		assert!(store.is_visible(&NodeId::new(EntityKind::User, "u3")));
	}

	#[test]
	fn connections_follow_node_data_and_visibility() {
		let mut t = task("t1", true, false);
		t.assigned_user_ids = vec!["u1".into(), "ghost".into()];
		t.assigned_group_ids = vec!["g1".into()];
		let snapshot = EntitySnapshot {
			tasks: vec![t],
			users: vec![user("u1", "a"), user("u2", "b")],
			groups: vec![group("g1", &["u2"])],
		};
		let mut store = NodeStore::new(build_nodes(&snapshot, 800.0, 600.0));
		let kinds: Vec<_> = store.connections().iter().map(|c| c.kind).collect();
		assert_eq!(
			kinds,
			[ConnectionKind::TaskUser, ConnectionKind::TaskGroup, ConnectionKind::GroupMember]
		);

		store.set_visible(vec![
			NodeId::new(EntityKind::Task, "t1"),
			NodeId::new(EntityKind::User, "u1"),
		]);
		assert_eq!(store.connections().len(), 1);
	}

	#[test]
	fn replace_data_requires_same_entity() {
		let mut node = BoardNode::new(Entity::User(user("u1", "a")), 0.0, 0.0);
		assert!(!node.replace_data(Entity::User(user("u2", "b"))));
		assert!(node.replace_data(Entity::User(user("u1", "renamed"))));
		assert_eq!(node.label(), "renamed");
	}
}
