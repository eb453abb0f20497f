use std::cell::RefCell;
use std::rc::Rc;

use leptos::prelude::*;
use leptos::task::spawn_local;
use log::warn;
use wasm_bindgen::prelude::*;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, MouseEvent, WheelEvent, Window};

use super::detail_panel::{DetailPanel, DetailView};
use super::filter::BoardFilters;
use super::filter_panel::FilterPanel;
use super::interaction::{Action, Cursor, PointerInput};
use super::node::NodeId;
use super::render;
use super::resolver::{DropPlan, Relation};
use super::state::BoardState;
use super::sync::{diff_membership, execute_change, fetch_entity, load_entities, run_batch};
use crate::api::{BoardApi, Entity, EntityKind};
use crate::components::toast::ToastQueue;

const FALLBACK_WIDTH: f64 = 800.0;
const FALLBACK_HEIGHT: f64 = 600.0;

/// Glue between DOM events, the board state and the task service.
#[derive(Clone)]
pub struct BoardHandle {
	state: Rc<RefCell<BoardState>>,
	api: Rc<dyn BoardApi>,
	toasts: ToastQueue,
	detail: RwSignal<Option<DetailView>>,
	cursor: RwSignal<Cursor>,
	loading: RwSignal<bool>,
	/// (visible, total) node counts.
	counts: RwSignal<(usize, usize)>,
}

impl BoardHandle {
	/// Feed one pointer input through the state machine and carry out its actions.
	pub fn dispatch(&self, input: PointerInput) {
		let actions = self.state.borrow_mut().handle(input);
		for action in actions {
			match action {
				Action::RenderNeeded => {}
				Action::SetCursor(cursor) => self.cursor.set(cursor),
				Action::Drop(plan) => self.execute_drop(plan),
				Action::OpenDetail(node) => self.open_detail(node),
			}
		}
	}

	pub fn reload(&self) {
		if self.loading.get_untracked() {
			return;
		}
		self.loading.set(true);
		let board = self.clone();
		spawn_local(async move {
			let report = load_entities(board.api.as_ref()).await;
			for (kind, err) in &report.failures {
				board.toasts.warning(format!("Could not load {kind}s: {err}"));
			}
			board.state.borrow_mut().load(&report.snapshot);
			board.detail.set(None);
			board.sync_counts();
			board.loading.set(false);
		});
	}

	pub fn set_filters(&self, filters: BoardFilters) {
		self.state.borrow_mut().set_filters(filters);
		self.sync_counts();
	}

	fn sync_counts(&self) {
		let counts = {
			let state = self.state.borrow();
			(state.store.visible_ids().len(), state.store.len())
		};
		self.counts.set(counts);
	}

	pub fn reset_view(&self) {
		self.state.borrow_mut().reset_view();
	}

	fn execute_drop(&self, plan: DropPlan) {
		let Some(change) = plan.change() else {
			self.toasts.info(plan.message);
			return;
		};
		if !self.state.borrow_mut().begin_change(&change) {
			self.toasts.info(format!("Still saving: {}", plan.message));
			return;
		}
		let board = self.clone();
		spawn_local(async move {
			let result = execute_change(board.api.as_ref(), &change).await;
			let confirmed = result.as_ref().ok().cloned();
			let patched = board.state.borrow_mut().finish_change(&change, confirmed);
			board.sync_counts();
			match result {
				Ok(_) => board.toasts.success(plan.success_message),
				Err(err) => board.toasts.error(format!("{} failed: {err}", plan.message)),
			}
			if let Some(owner) = patched {
				board.refresh_detail(&[owner, change.member_node()]);
			}
		});
	}

	/// Show the node's snapshot at once, then swap in a fresh copy from the service.
	pub fn open_detail(&self, node: NodeId) {
		let Some(entity) = self.state.borrow().entity(&node).cloned() else {
			return;
		};
		let (kind, entity_id) = (entity.kind(), entity.id().to_string());
		self.detail.set(Some(DetailView::new(node.clone(), entity)));
		let board = self.clone();
		spawn_local(async move {
			let fresh = match fetch_entity(board.api.as_ref(), kind, &entity_id).await {
				Ok(fresh) => {
					if board.state.borrow_mut().apply_snapshot(fresh.clone()) {
						board.sync_counts();
					}
					Some(fresh)
				}
				Err(err) => {
					warn!("detail fetch for {node} failed: {err}");
					None
				}
			};
			board.detail.update(|detail| {
				if let Some(view) = detail.as_mut().filter(|view| view.node == node) {
					view.finish_fetch(fresh);
				}
			});
		});
	}

	/// Reconcile one membership list against the checked set in the detail panel.
	pub fn save_membership(
		&self,
		relation: Relation,
		owner_id: String,
		original: Vec<String>,
		desired: Vec<String>,
	) {
		let changes = diff_membership(relation, &owner_id, &original, &desired);
		if changes.is_empty() {
			self.toasts.info("Nothing to save");
			return;
		}
		self.set_saving(true);
		let board = self.clone();
		spawn_local(async move {
			let total = changes.len();
			let outcome = run_batch(board.api.as_ref(), changes).await;
			let patched = board.state.borrow_mut().apply_batch(&outcome);
			board.sync_counts();
			board.refresh_detail(&patched);
			board.set_saving(false);
			if outcome.is_success() {
				board.toasts.success(format!("Saved {total} membership changes"));
			} else {
				board.toasts.error(format!(
					"{} of {total} membership changes failed",
					outcome.failed.len()
				));
			}
		});
	}

	fn set_saving(&self, saving: bool) {
		self.detail.update(|detail| {
			if let Some(view) = detail.as_mut() {
				view.saving = saving;
			}
		});
	}

	fn refresh_detail(&self, patched: &[NodeId]) {
		let state = self.state.borrow();
		let touches_shown = self.detail.with_untracked(|detail| {
			detail.as_ref().is_some_and(|view| patched.contains(&view.node))
		});
		if touches_shown {
			self.detail.update(|detail| {
				if let Some(view) = detail.as_mut() {
					view.refresh_from(patched, &state);
				}
			});
		}
	}

	/// `(entity id, label)` of every loaded entity of `kind`, sorted by label.
	pub fn candidates(&self, kind: EntityKind) -> Vec<(String, String)> {
		let state = self.state.borrow();
		let mut options: Vec<(String, String)> = state
			.store
			.all()
			.iter()
			.filter(|node| node.kind() == kind)
			.map(|node| (node.entity_id().to_string(), node.label().to_string()))
			.collect();
		options.sort_by_key(|(_, label)| label.to_lowercase());
		options
	}

	pub fn label_of(&self, kind: EntityKind, entity_id: &str) -> String {
		self.state
			.borrow()
			.store
			.by_entity(kind, entity_id)
			.map_or_else(|| entity_id.to_string(), |node| node.label().to_string())
	}

	/// Names of the loaded groups that list `user_id` as a member.
	pub fn groups_of(&self, user_id: &str) -> Vec<String> {
		let state = self.state.borrow();
		state
			.store
			.all()
			.iter()
			.filter_map(|node| match node.data() {
				Entity::Group(group) if group.member_ids.iter().any(|m| m == user_id) => {
					Some(group.name.clone())
				}
				_ => None,
			})
			.collect()
	}
}

fn parent_size(canvas: &HtmlCanvasElement) -> (f64, f64) {
	canvas
		.parent_element()
		.map(|p| (p.client_width() as f64, p.client_height() as f64))
		.filter(|&(w, h)| w > 0.0 && h > 0.0)
		.unwrap_or((FALLBACK_WIDTH, FALLBACK_HEIGHT))
}

fn canvas_point(canvas_ref: NodeRef<leptos::html::Canvas>, ev: &MouseEvent) -> Option<(f64, f64)> {
	let canvas: HtmlCanvasElement = canvas_ref.get()?;
	let rect = canvas.get_bounding_client_rect();
	Some((
		ev.client_x() as f64 - rect.left(),
		ev.client_y() as f64 - rect.top(),
	))
}

#[component]
pub fn RelationshipBoard(api: Rc<dyn BoardApi>, toasts: ToastQueue) -> impl IntoView {
	let canvas_ref = NodeRef::<leptos::html::Canvas>::new();
	let filters = RwSignal::new(BoardFilters::default());
	let board = BoardHandle {
		state: Rc::new(RefCell::new(BoardState::new(FALLBACK_WIDTH, FALLBACK_HEIGHT))),
		api,
		toasts,
		detail: RwSignal::new(None),
		cursor: RwSignal::new(Cursor::Grab),
		loading: RwSignal::new(false),
		counts: RwSignal::new((0, 0)),
	};
	let (detail, cursor, loading, counts) = (board.detail, board.cursor, board.loading, board.counts);
	let animate: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));
	let resize_cb: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));

	let board_init = board.clone();
	Effect::new(move |_| {
		let Some(canvas) = canvas_ref.get() else {
			return;
		};
		let window: Window = web_sys::window().unwrap();

		let (w, h) = parent_size(&canvas);
		canvas.set_width(w as u32);
		canvas.set_height(h as u32);
		board_init.state.borrow_mut().resize(w, h);

		let ctx: CanvasRenderingContext2d = canvas
			.get_context("2d")
			.unwrap()
			.unwrap()
			.dyn_into()
			.unwrap();

		let (state_resize, canvas_resize) = (board_init.state.clone(), canvas.clone());
		*resize_cb.borrow_mut() = Some(Closure::new(move || {
			let (nw, nh) = parent_size(&canvas_resize);
			canvas_resize.set_width(nw as u32);
			canvas_resize.set_height(nh as u32);
			state_resize.borrow_mut().resize(nw, nh);
		}));
		if let Some(ref cb) = *resize_cb.borrow() {
			let _ = window.add_event_listener_with_callback("resize", cb.as_ref().unchecked_ref());
		}

		let (state_anim, animate_inner) = (board_init.state.clone(), animate.clone());
		*animate.borrow_mut() = Some(Closure::new(move || {
			{
				let mut state = state_anim.borrow_mut();
				if state.take_dirty() {
					render::render(&state, &ctx);
				}
			}
			if let Some(ref cb) = *animate_inner.borrow() {
				let _ = web_sys::window()
					.unwrap()
					.request_animation_frame(cb.as_ref().unchecked_ref());
			}
		}));
		if let Some(ref cb) = *animate.borrow() {
			let _ = window.request_animation_frame(cb.as_ref().unchecked_ref());
		}

		board_init.reload();
	});

	let board_filters = board.clone();
	Effect::new(move |_| {
		let current = filters.get();
		board_filters.set_filters(current);
	});

	let board_md = board.clone();
	let on_mousedown = move |ev: MouseEvent| {
		if let Some((x, y)) = canvas_point(canvas_ref, &ev) {
			board_md.dispatch(PointerInput::Down { x, y });
		}
	};

	let board_mm = board.clone();
	let on_mousemove = move |ev: MouseEvent| {
		if let Some((x, y)) = canvas_point(canvas_ref, &ev) {
			board_mm.dispatch(PointerInput::Move { x, y });
		}
	};

	let board_mu = board.clone();
	let on_mouseup = move |_: MouseEvent| board_mu.dispatch(PointerInput::Up);

	let board_ml = board.clone();
	let on_mouseleave = move |_: MouseEvent| board_ml.dispatch(PointerInput::Leave);

	let board_wh = board.clone();
	let on_wheel = move |ev: WheelEvent| {
		ev.prevent_default();
		if let Some((x, y)) = canvas_point(canvas_ref, &ev) {
			board_wh.dispatch(PointerInput::Wheel {
				x,
				y,
				delta_y: ev.delta_y(),
			});
		}
	};

	let board_dc = board.clone();
	let on_dblclick = move |ev: MouseEvent| {
		if let Some((x, y)) = canvas_point(canvas_ref, &ev) {
			board_dc.dispatch(PointerInput::DoubleClick { x, y });
		}
	};

	let board_refresh = board.clone();
	let board_reset = board.clone();
	let panel_board = StoredValue::new_local(board);

	view! {
		<div class="relationship-board">
			<FilterPanel filters=filters counts=counts />
			<div class="board-canvas-wrap">
				<div class="board-toolbar">
					<button
						disabled=move || loading.get()
						on:click=move |_| board_refresh.reload()
					>
						{move || if loading.get() { "Loading…" } else { "Refresh" }}
					</button>
					<button on:click=move |_| board_reset.reset_view()>"Reset view"</button>
				</div>
				<canvas
					node_ref=canvas_ref
					class="relationship-board-canvas"
					on:mousedown=on_mousedown
					on:mousemove=on_mousemove
					on:mouseup=on_mouseup
					on:mouseleave=on_mouseleave
					on:wheel=on_wheel
					on:dblclick=on_dblclick
					style:display="block"
					style:cursor=move || cursor.get().as_css()
				/>
				<Show when=move || loading.get()>
					<div class="board-loading">"Loading board…"</div>
				</Show>
			</div>
			<DetailPanel detail=detail board=panel_board />
		</div>
	}
}
