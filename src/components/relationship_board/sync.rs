//! Calls into the task service on behalf of the board.
//!
//! Nothing here touches board state; callers apply the returned results.

use futures::future::join_all;
use log::{info, warn};

use super::resolver::{MembershipOp, Relation, RelationChange};
use crate::api::{ApiError, ApiResult, BoardApi, Entity, EntityKind, EntitySnapshot};

/// Outcome of loading the three entity lists.
#[derive(Debug, Default)]
pub struct LoadReport {
	pub snapshot: EntitySnapshot,
	/// Lists that failed and were replaced by an empty list.
	pub failures: Vec<(EntityKind, ApiError)>,
}

fn degrade<T>(
	kind: EntityKind,
	result: ApiResult<Vec<T>>,
	failures: &mut Vec<(EntityKind, ApiError)>,
) -> Vec<T> {
	result.unwrap_or_else(|err| {
		warn!("loading {kind} list failed: {err}");
		failures.push((kind, err));
		Vec::new()
	})
}

/// Fetch tasks, users and groups concurrently. A failed list degrades to empty.
pub async fn load_entities(api: &dyn BoardApi) -> LoadReport {
	let (tasks, users, groups) =
		futures::join!(api.list_tasks(), api.list_users(), api.list_groups());
	let mut failures = Vec::new();
	let snapshot = EntitySnapshot {
		tasks: degrade(EntityKind::Task, tasks, &mut failures),
		users: degrade(EntityKind::User, users, &mut failures),
		groups: degrade(EntityKind::Group, groups, &mut failures),
	};
	info!(
		"loaded {} tasks, {} users, {} groups",
		snapshot.tasks.len(),
		snapshot.users.len(),
		snapshot.groups.len()
	);
	LoadReport { snapshot, failures }
}

/// Fresh snapshot for a detail panel.
pub async fn fetch_entity(api: &dyn BoardApi, kind: EntityKind, id: &str) -> ApiResult<Entity> {
	match kind {
		EntityKind::Task => api.get_task(id).await.map(Entity::Task),
		EntityKind::User => api.get_user(id).await.map(Entity::User),
		EntityKind::Group => api.get_group(id).await.map(Entity::Group),
	}
}

/// Send one membership edit; resolves to the updated owner when the service returns it.
pub async fn execute_change(
	api: &dyn BoardApi,
	change: &RelationChange,
) -> ApiResult<Option<Entity>> {
	let (owner, member) = (change.owner_id.as_str(), change.member_id.as_str());
	info!("{:?} {:?} owner={owner} member={member}", change.op, change.relation);
	let result = match (change.relation, change.op) {
		(Relation::TaskUser, MembershipOp::Add) => api
			.assign_user_to_task(owner, member)
			.await
			.map(|t| t.map(Entity::Task)),
		(Relation::TaskUser, MembershipOp::Remove) => api
			.unassign_user_from_task(owner, member)
			.await
			.map(|t| t.map(Entity::Task)),
		(Relation::TaskGroup, MembershipOp::Add) => api
			.assign_group_to_task(owner, member)
			.await
			.map(|t| t.map(Entity::Task)),
		(Relation::TaskGroup, MembershipOp::Remove) => api
			.unassign_group_from_task(owner, member)
			.await
			.map(|t| t.map(Entity::Task)),
		(Relation::UserGroup, MembershipOp::Add) => api
			.add_user_to_group(owner, member)
			.await
			.map(|g| g.map(Entity::Group)),
		(Relation::UserGroup, MembershipOp::Remove) => api
			.remove_user_from_group(owner, member)
			.await
			.map(|g| g.map(Entity::Group)),
	};
	if let Err(err) = &result {
		warn!("{:?} {:?} owner={owner} member={member} failed: {err}", change.op, change.relation);
	}
	result
}

/// Edits needed to turn `original` membership into `desired`, adds first.
pub fn diff_membership(
	relation: Relation,
	owner_id: &str,
	original: &[String],
	desired: &[String],
) -> Vec<RelationChange> {
	let change = |op, member_id: &String| RelationChange {
		relation,
		op,
		owner_id: owner_id.to_string(),
		member_id: member_id.clone(),
	};
	let adds = desired
		.iter()
		.filter(|id| !original.contains(id))
		.map(|id| change(MembershipOp::Add, id));
	let removes = original
		.iter()
		.filter(|id| !desired.contains(id))
		.map(|id| change(MembershipOp::Remove, id));
	adds.chain(removes).collect()
}

/// Aggregated result of a batch of edits.
#[derive(Debug, Default)]
pub struct BatchOutcome {
	pub applied: Vec<RelationChange>,
	pub failed: Vec<(RelationChange, ApiError)>,
}

impl BatchOutcome {
	/// The batch counts as succeeded only if every edit did.
	pub fn is_success(&self) -> bool {
		self.failed.is_empty()
	}
}

/// Issue one call per edit, all in flight at once, and collect the results.
pub async fn run_batch(api: &dyn BoardApi, changes: Vec<RelationChange>) -> BatchOutcome {
	let results = join_all(changes.iter().map(|change| execute_change(api, change))).await;
	let mut outcome = BatchOutcome::default();
	for (change, result) in changes.into_iter().zip(results) {
		match result {
			Ok(_) => outcome.applied.push(change),
			Err(err) => outcome.failed.push((change, err)),
		}
	}
	outcome
}
