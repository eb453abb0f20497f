use leptos::prelude::*;

use super::component::BoardHandle;
use super::node::NodeId;
use super::resolver::Relation;
use super::state::BoardState;
use crate::api::{Entity, EntityKind, Group, Task, User};

/// What the detail panel is showing.
#[derive(Clone, Debug, PartialEq)]
pub struct DetailView {
	pub node: NodeId,
	/// Last-known snapshot, replaced once the fresh copy arrives.
	pub entity: Entity,
	pub loading: bool,
	/// A membership batch is in flight.
	pub saving: bool,
}

impl DetailView {
	pub fn new(node: NodeId, entity: Entity) -> Self {
		Self {
			node,
			entity,
			loading: true,
			saving: false,
		}
	}

	/// Settle the fetch started on open. A failed fetch keeps the last-known
	/// snapshot on screen.
	pub fn finish_fetch(&mut self, fresh: Option<Entity>) {
		self.loading = false;
		if let Some(fresh) = fresh {
			self.entity = fresh;
		}
	}

	/// Pick up the board's copy of the shown node if a confirmed change patched it.
	pub fn refresh_from(&mut self, patched: &[NodeId], state: &BoardState) -> bool {
		if !patched.contains(&self.node) {
			return false;
		}
		let Some(entity) = state.entity(&self.node) else {
			return false;
		};
		self.entity = entity.clone();
		true
	}
}

type Board = StoredValue<BoardHandle, LocalStorage>;

fn same_members(a: &[String], b: &[String]) -> bool {
	a.len() == b.len() && a.iter().all(|id| b.contains(id))
}

fn toggle_member(members: &mut Vec<String>, id: &str) {
	if members.iter().any(|m| m == id) {
		members.retain(|m| m != id);
	} else {
		members.push(id.to_string());
	}
}

fn yes_no(flag: bool) -> &'static str {
	if flag { "Yes" } else { "No" }
}

fn date_or_dash(date: Option<chrono::DateTime<chrono::Utc>>) -> String {
	date.map_or_else(|| "-".to_string(), |d| d.format("%Y-%m-%d %H:%M").to_string())
}

#[component]
fn MembershipEditor(
	title: &'static str,
	relation: Relation,
	owner_id: String,
	original: Vec<String>,
	candidates: Vec<(String, String)>,
	board: Board,
	saving: Signal<bool>,
) -> impl IntoView {
	let desired = RwSignal::new(original.clone());
	let original = StoredValue::new(original);
	let changed = move || original.with_value(|o| desired.with(|d| !same_members(o, d)));

	let save = move |_| {
		let (original, desired) = (original.get_value(), desired.get_untracked());
		board.with_value(|b| b.save_membership(relation, owner_id.clone(), original, desired));
	};
	let reset = move |_| desired.set(original.get_value());

	view! {
		<section class="membership-editor">
			<h3>{title}</h3>
			{if candidates.is_empty() {
				view! { <p class="membership-empty">"Nothing to choose from"</p> }.into_any()
			} else {
				candidates
					.into_iter()
					.map(|(id, label)| {
						let checked_id = id.clone();
						view! {
							<label class="membership-option">
								<input
									type="checkbox"
									prop:checked=move || desired.with(|d| d.contains(&checked_id))
									on:change=move |_| desired.update(|d| toggle_member(d, &id))
								/>
								{label}
							</label>
						}
					})
					.collect_view()
					.into_any()
			}}
			<div class="membership-actions">
				<button disabled=move || saving.get() || !changed() on:click=save>
					{move || if saving.get() { "Saving…" } else { "Save" }}
				</button>
				<button disabled=move || saving.get() || !changed() on:click=reset>
					"Revert"
				</button>
			</div>
		</section>
	}
}

fn task_details(task: Task, board: Board, saving: Signal<bool>) -> impl IntoView {
	let users = board.with_value(|b| b.candidates(EntityKind::User));
	let groups = board.with_value(|b| b.candidates(EntityKind::Group));
	view! {
		<dl class="detail-fields">
			<dt>"Status"</dt>
			<dd>{task.status.label()}</dd>
			<dt>"Description"</dt>
			<dd>{task.description.clone().unwrap_or_default()}</dd>
			<dt>"Validated"</dt>
			<dd>{yes_no(task.is_validated)}</dd>
			<dt>"Admin complete"</dt>
			<dd>{yes_no(task.admin_complete)}</dd>
			<dt>"Starts"</dt>
			<dd>{date_or_dash(task.start_at)}</dd>
			<dt>"Due"</dt>
			<dd>{date_or_dash(task.due_at)}</dd>
		</dl>
		<MembershipEditor
			title="Assigned users"
			relation=Relation::TaskUser
			owner_id=task.id.clone()
			original=task.assigned_user_ids
			candidates=users
			board=board
			saving=saving
		/>
		<MembershipEditor
			title="Assigned groups"
			relation=Relation::TaskGroup
			owner_id=task.id
			original=task.assigned_group_ids
			candidates=groups
			board=board
			saving=saving
		/>
	}
}

fn user_details(user: User, board: Board) -> impl IntoView {
	let groups = board.with_value(|b| b.groups_of(&user.id));
	view! {
		<dl class="detail-fields">
			<dt>"Email"</dt>
			<dd>{user.email}</dd>
			<dt>"Roles"</dt>
			<dd>{user.roles.join(", ")}</dd>
			<dt>"Active"</dt>
			<dd>{yes_no(user.is_active)}</dd>
		</dl>
		<section class="membership-editor">
			<h3>"Groups"</h3>
			<ul>{groups.into_iter().map(|name| view! { <li>{name}</li> }).collect_view()}</ul>
		</section>
	}
}

fn group_details(group: Group, board: Board, saving: Signal<bool>) -> impl IntoView {
	let users = board.with_value(|b| b.candidates(EntityKind::User));
	let manager = group
		.manager_id
		.as_deref()
		.map(|id| board.with_value(|b| b.label_of(EntityKind::User, id)))
		.unwrap_or_default();
	view! {
		<dl class="detail-fields">
			<dt>"Description"</dt>
			<dd>{group.description.clone().unwrap_or_default()}</dd>
			<dt>"Manager"</dt>
			<dd>{manager}</dd>
			<dt>"Active"</dt>
			<dd>{yes_no(group.is_active)}</dd>
		</dl>
		<MembershipEditor
			title="Members"
			relation=Relation::UserGroup
			owner_id=group.id
			original=group.member_ids
			candidates=users
			board=board
			saving=saving
		/>
	}
}

/// Side panel for the node opened by double-click.
#[component]
pub fn DetailPanel(detail: RwSignal<Option<DetailView>>, board: Board) -> impl IntoView {
	let saving = Signal::derive(move || detail.with(|d| d.as_ref().is_some_and(|v| v.saving)));

	move || {
		detail.get().map(|shown| {
			let DetailView {
				entity, loading, ..
			} = shown;
			let (kind, label) = (entity.kind(), entity.label().to_string());
			let body = match entity {
				Entity::Task(task) => task_details(task, board, saving).into_any(),
				Entity::User(user) => user_details(user, board).into_any(),
				Entity::Group(group) => group_details(group, board, saving).into_any(),
			};
			view! {
				<aside class="detail-panel">
					<header class="detail-header">
						<span class="detail-kind">{kind.as_str()}</span>
						<h2>{label}</h2>
						<button class="detail-close" on:click=move |_| detail.set(None)>
							"Close"
						</button>
					</header>
					{loading.then(|| view! { <p class="detail-loading">"Loading latest…"</p> })}
					{body}
				</aside>
			}
		})
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::api::{EntitySnapshot, TaskStatus};
	use crate::components::relationship_board::resolver::{MembershipOp, RelationChange};

	fn task(users: &[&str]) -> Task {
		Task {
			id: "t1".into(),
			name: "Deploy".into(),
			description: None,
			status: TaskStatus::Pending,
			assigned_user_ids: ids(users),
			assigned_group_ids: vec![],
			is_validated: true,
			admin_complete: false,
			start_at: None,
			due_at: None,
		}
	}

	fn board_with(task: Task) -> BoardState {
		let mut state = BoardState::new(800.0, 600.0);
		state.load(&EntitySnapshot {
			tasks: vec![task],
			users: vec![User {
				id: "u1".into(),
				username: "Alice".into(),
				email: String::new(),
				is_active: true,
				roles: vec![],
			}],
			groups: vec![],
		});
		state
	}

	fn shown_task(view: &DetailView) -> &Task {
		match &view.entity {
			Entity::Task(task) => task,
			other => panic!("expected a task, got {other:?}"),
		}
	}

	#[test]
	fn failed_fetch_keeps_last_known_snapshot() {
		let node = NodeId::new(EntityKind::Task, "t1");
		let mut view = DetailView::new(node, Entity::Task(task(&["u1"])));
		assert!(view.loading);
		view.finish_fetch(None);
		assert!(!view.loading);
		assert_eq!(shown_task(&view).assigned_user_ids, ids(&["u1"]));

		view.loading = true;
		view.finish_fetch(Some(Entity::Task(task(&[]))));
		assert!(!view.loading);
		assert!(shown_task(&view).assigned_user_ids.is_empty());
	}

	#[test]
	fn confirmed_change_refreshes_open_panel() {
		let mut state = board_with(task(&[]));
		let node = NodeId::new(EntityKind::Task, "t1");
		let mut view = DetailView::new(node.clone(), Entity::Task(task(&[])));
		view.finish_fetch(None);

		let change = RelationChange {
			relation: Relation::TaskUser,
			op: MembershipOp::Add,
			owner_id: "t1".into(),
			member_id: "u1".into(),
		};
		assert!(state.begin_change(&change));
		let patched = state.finish_change(&change, Some(None));
		assert_eq!(patched.as_ref(), Some(&node));

		let other = NodeId::new(EntityKind::User, "u1");
		assert!(!view.refresh_from(&[other], &state));
		assert!(shown_task(&view).assigned_user_ids.is_empty());

		assert!(view.refresh_from(&[node], &state));
		assert_eq!(shown_task(&view).assigned_user_ids, ids(&["u1"]));
	}

	fn ids(v: &[&str]) -> Vec<String> {
		v.iter().map(|s| s.to_string()).collect()
	}

	#[test]
	fn membership_order_does_not_count_as_a_change() {
		assert!(same_members(&ids(&["u1", "u2"]), &ids(&["u2", "u1"])));
		assert!(!same_members(&ids(&["u1"]), &ids(&["u1", "u2"])));
	}

	#[test]
	fn toggling_twice_restores_membership() {
		let mut members = ids(&["u1"]);
		toggle_member(&mut members, "u2");
		assert_eq!(members, ids(&["u1", "u2"]));
		toggle_member(&mut members, "u1");
		toggle_member(&mut members, "u1");
		assert!(same_members(&members, &ids(&["u2", "u1"])));
	}
}
