//! Which drops are legal, and whether a drop assigns or unassigns.

use log::debug;

use super::node::{BoardNode, NodeId, NodeStore};
use crate::api::{Entity, EntityKind};

/// Extra world-space slack when hit-testing for a drop target.
pub const DROP_TOLERANCE: f64 = 20.0;

/// A relationship the board can edit, named owner-first.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Relation {
	/// `task.assignedUserIds`
	TaskUser,
	/// `task.assignedGroupIds`
	TaskGroup,
	/// `group.memberIds`
	UserGroup,
}

impl Relation {
	/// Compatibility table: task→user, task→group, user→group.
	pub fn between(dragged: EntityKind, target: EntityKind) -> Option<Relation> {
		match (dragged, target) {
			(EntityKind::Task, EntityKind::User) => Some(Relation::TaskUser),
			(EntityKind::Task, EntityKind::Group) => Some(Relation::TaskGroup),
			(EntityKind::User, EntityKind::Group) => Some(Relation::UserGroup),
			_ => None,
		}
	}

	/// Kinds that start a relationship drag rather than a free move.
	pub fn starts_from(kind: EntityKind) -> bool {
		matches!(kind, EntityKind::Task | EntityKind::User)
	}

	/// Kind of the entity whose list holds the relationship.
	pub fn owner_kind(self) -> EntityKind {
		match self {
			Relation::TaskUser | Relation::TaskGroup => EntityKind::Task,
			Relation::UserGroup => EntityKind::Group,
		}
	}

	pub fn member_kind(self) -> EntityKind {
		match self {
			Relation::TaskUser | Relation::UserGroup => EntityKind::User,
			Relation::TaskGroup => EntityKind::Group,
		}
	}
}

/// The membership list `relation` lives in, if `entity` owns it.
pub fn membership(entity: &Entity, relation: Relation) -> Option<&[String]> {
	match (entity, relation) {
		(Entity::Task(t), Relation::TaskUser) => Some(&t.assigned_user_ids),
		(Entity::Task(t), Relation::TaskGroup) => Some(&t.assigned_group_ids),
		(Entity::Group(g), Relation::UserGroup) => Some(&g.member_ids),
		_ => None,
	}
}

fn membership_mut(entity: &mut Entity, relation: Relation) -> Option<&mut Vec<String>> {
	match (entity, relation) {
		(Entity::Task(t), Relation::TaskUser) => Some(&mut t.assigned_user_ids),
		(Entity::Task(t), Relation::TaskGroup) => Some(&mut t.assigned_group_ids),
		(Entity::Group(g), Relation::UserGroup) => Some(&mut g.member_ids),
		_ => None,
	}
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MembershipOp {
	Add,
	Remove,
}

/// One membership edit against the task service.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct RelationChange {
	pub relation: Relation,
	pub op: MembershipOp,
	pub owner_id: String,
	pub member_id: String,
}

impl RelationChange {
	pub fn owner_node(&self) -> NodeId {
		NodeId::new(self.relation.owner_kind(), &self.owner_id)
	}

	pub fn member_node(&self) -> NodeId {
		NodeId::new(self.relation.member_kind(), &self.member_id)
	}

	/// Key of the (owner, member) pair, ignoring the operation.
	pub fn pair(&self) -> (Relation, String, String) {
		(self.relation, self.owner_id.clone(), self.member_id.clone())
	}
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DropOperation {
	Assign,
	Unassign,
	/// User already in the group; nothing is sent.
	AlreadyMember,
}

/// A resolved drop of one node onto another.
#[derive(Clone, Debug, PartialEq)]
pub struct DropPlan {
	pub dragged: NodeId,
	pub target: NodeId,
	pub relation: Relation,
	pub operation: DropOperation,
	pub owner_id: String,
	pub member_id: String,
	/// Preview text shown while hovering the target.
	pub message: String,
	/// Toast text once the service confirms.
	pub success_message: String,
}

impl DropPlan {
	/// The edit to send, or `None` for a guarded no-op.
	pub fn change(&self) -> Option<RelationChange> {
		let op = match self.operation {
			DropOperation::Assign => MembershipOp::Add,
			DropOperation::Unassign => MembershipOp::Remove,
			DropOperation::AlreadyMember => return None,
		};
		Some(RelationChange {
			relation: self.relation,
			op,
			owner_id: self.owner_id.clone(),
			member_id: self.member_id.clone(),
		})
	}
}

/// Resolve dropping `dragged` onto `target`. `None` when the pair is not compatible.
pub fn plan_drop(dragged: &BoardNode, target: &BoardNode) -> Option<DropPlan> {
	let relation = Relation::between(dragged.kind(), target.kind())?;
	let (owner, member) = if relation.owner_kind() == dragged.kind() {
		(dragged, target)
	} else {
		(target, dragged)
	};
	let present = membership(owner.data(), relation)?
		.iter()
		.any(|id| id == member.entity_id());

	let operation = match (relation, present) {
		(Relation::UserGroup, true) => DropOperation::AlreadyMember,
		(_, true) => DropOperation::Unassign,
		(_, false) => DropOperation::Assign,
	};
	let (m, o) = (member.label(), owner.label());
	let (message, success_message) = match (relation, operation) {
		(Relation::UserGroup, DropOperation::AlreadyMember) => {
			let text = format!("{m} is already a member of {o}");
			(text.clone(), text)
		}
		(Relation::UserGroup, _) => (format!("Add {m} to {o}"), format!("Added {m} to {o}")),
		(_, DropOperation::Unassign) => (
			format!("Unassign {m} from {o}"),
			format!("Unassigned {m} from {o}"),
		),
		(_, _) => (format!("Assign {m} to {o}"), format!("Assigned {m} to {o}")),
	};

	Some(DropPlan {
		dragged: dragged.id().clone(),
		target: target.id().clone(),
		relation,
		operation,
		owner_id: owner.entity_id().to_string(),
		member_id: member.entity_id().to_string(),
		message,
		success_message,
	})
}

/// Record a confirmed change on the owner node. A snapshot returned by the
/// service replaces the node's data; otherwise the list that decided the
/// operation is patched. Returns the patched node's id.
pub fn apply_change(
	store: &mut NodeStore,
	change: &RelationChange,
	snapshot: Option<Entity>,
) -> Option<NodeId> {
	let owner_id = change.owner_node();
	let node = store.get_mut(&owner_id)?;
	if let Some(snapshot) = snapshot {
		if node.replace_data(snapshot) {
			return Some(owner_id);
		}
	}
	let list = membership_mut(node.data_mut(), change.relation)?;
	match change.op {
		MembershipOp::Add => {
			if !list.contains(&change.member_id) {
				list.push(change.member_id.clone());
			}
		}
		MembershipOp::Remove => list.retain(|id| id != &change.member_id),
	}
	debug!("{owner_id}: {:?} {:?} {}", change.op, change.relation, change.member_id);
	Some(owner_id)
}
