//! Pointer state machine: select, pan, drag, hover and zoom.
//!
//! [`PointerMachine::handle`] is the only code that writes the selection, drag,
//! pan and hover fields. The canvas component translates DOM events into
//! [`PointerInput`]s and carries out the returned [`Action`]s.

use super::geometry::ViewTransform;
use super::node::{BoardNode, NodeId, NodeStore};
use super::resolver::{DROP_TOLERANCE, DropOperation, DropPlan, Relation, plan_drop};

/// Screen-space pointer events, already relative to the canvas.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PointerInput {
	Down { x: f64, y: f64 },
	Move { x: f64, y: f64 },
	Up,
	Leave,
	Wheel { x: f64, y: f64, delta_y: f64 },
	DoubleClick { x: f64, y: f64 },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DragKind {
	/// Repositioning only (groups).
	FreeMove,
	/// Tasks and users: may be dropped onto a compatible node.
	Relationship,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub enum PointerMode {
	#[default]
	Idle,
	Panning,
	Dragging { node: NodeId, kind: DragKind },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Cursor {
	Grab,
	Grabbing,
	Pointer,
	Copy,
	NotAllowed,
}

impl Cursor {
	pub fn as_css(self) -> &'static str {
		match self {
			Cursor::Grab => "grab",
			Cursor::Grabbing => "grabbing",
			Cursor::Pointer => "pointer",
			Cursor::Copy => "copy",
			Cursor::NotAllowed => "not-allowed",
		}
	}
}

/// Side effects requested from the host.
#[derive(Clone, Debug, PartialEq)]
pub enum Action {
	RenderNeeded,
	SetCursor(Cursor),
	/// A relationship drag ended on a compatible target.
	Drop(DropPlan),
	OpenDetail(NodeId),
}

/// Topmost visible node under a world-space point.
pub fn hit_test(store: &NodeStore, wx: f64, wy: f64) -> Option<&BoardNode> {
	store.visible().rev().find(|node| node.contains(wx, wy, 0.0))
}

/// Topmost visible node `dragged` may be dropped on, with tolerance.
pub fn drop_target<'a>(
	store: &'a NodeStore,
	dragged: &BoardNode,
	wx: f64,
	wy: f64,
) -> Option<&'a BoardNode> {
	store.visible().rev().find(|node| {
		node.id() != dragged.id()
			&& Relation::between(dragged.kind(), node.kind()).is_some()
			&& node.contains(wx, wy, DROP_TOLERANCE)
	})
}

#[derive(Clone, Debug, Default)]
pub struct PointerMachine {
	mode: PointerMode,
	last_x: f64,
	last_y: f64,
	selected: Option<NodeId>,
	hovered: Option<NodeId>,
	preview: Option<DropPlan>,
}

impl PointerMachine {
	pub fn mode(&self) -> &PointerMode {
		&self.mode
	}

	pub fn selected(&self) -> Option<&NodeId> {
		self.selected.as_ref()
	}

	pub fn hovered(&self) -> Option<&NodeId> {
		self.hovered.as_ref()
	}

	/// The node in a relationship drag, if any.
	pub fn dragged(&self) -> Option<&NodeId> {
		match &self.mode {
			PointerMode::Dragging {
				node,
				kind: DragKind::Relationship,
			} => Some(node),
			_ => None,
		}
	}

	pub fn drop_target(&self) -> Option<&NodeId> {
		self.preview.as_ref().map(|plan| &plan.target)
	}

	/// Pending operation and message for the current drop target.
	pub fn preview(&self) -> Option<&DropPlan> {
		self.preview.as_ref()
	}

	/// Drop all gesture state, e.g. after the node set is rebuilt.
	pub fn reset(&mut self) {
		self.mode = PointerMode::Idle;
		self.selected = None;
		self.hovered = None;
		self.preview = None;
	}

	pub fn handle(
		&mut self,
		input: PointerInput,
		store: &mut NodeStore,
		view: &mut ViewTransform,
	) -> Vec<Action> {
		match input {
			PointerInput::Down { x, y } => self.pointer_down(x, y, store, view),
			PointerInput::Move { x, y } => self.pointer_move(x, y, store, view),
			PointerInput::Up => self.pointer_up(store),
			PointerInput::Leave => {
				self.reset();
				vec![Action::RenderNeeded, Action::SetCursor(Cursor::Grab)]
			}
			PointerInput::Wheel { x, y, delta_y } => {
				if self.mode != PointerMode::Idle {
					return Vec::new();
				}
				view.wheel_zoom(x, y, delta_y);
				vec![Action::RenderNeeded]
			}
			PointerInput::DoubleClick { x, y } => {
				let (wx, wy) = view.screen_to_world(x, y);
				hit_test(store, wx, wy)
					.map(|node| vec![Action::OpenDetail(node.id().clone())])
					.unwrap_or_default()
			}
		}
	}

	fn pointer_down(
		&mut self,
		x: f64,
		y: f64,
		store: &mut NodeStore,
		view: &ViewTransform,
	) -> Vec<Action> {
		let (wx, wy) = view.screen_to_world(x, y);
		(self.last_x, self.last_y) = (x, y);
		self.hovered = None;
		self.preview = None;

		let hit = hit_test(store, wx, wy).map(|node| (node.id().clone(), node.kind()));
		self.mode = match hit {
			Some((id, kind)) => {
				store.bring_to_front(&id);
				self.selected = Some(id.clone());
				let kind = if Relation::starts_from(kind) {
					DragKind::Relationship
				} else {
					DragKind::FreeMove
				};
				PointerMode::Dragging { node: id, kind }
			}
			None => {
				self.selected = None;
				PointerMode::Panning
			}
		};
		vec![Action::RenderNeeded, Action::SetCursor(Cursor::Grabbing)]
	}

	fn pointer_move(
		&mut self,
		x: f64,
		y: f64,
		store: &mut NodeStore,
		view: &mut ViewTransform,
	) -> Vec<Action> {
		let (dx, dy) = (x - self.last_x, y - self.last_y);
		(self.last_x, self.last_y) = (x, y);

		match self.mode.clone() {
			PointerMode::Dragging { node, kind } => {
				let Some(dragged) = store.get_mut(&node) else {
					self.reset();
					return vec![Action::RenderNeeded, Action::SetCursor(Cursor::Grab)];
				};
				dragged.x += dx / view.scale;
				dragged.y += dy / view.scale;
				if kind == DragKind::FreeMove {
					return vec![Action::RenderNeeded];
				}

				let (wx, wy) = view.screen_to_world(x, y);
				let Some(dragged) = store.get(&node) else {
					return vec![Action::RenderNeeded];
				};
				self.preview =
					drop_target(store, dragged, wx, wy).and_then(|target| plan_drop(dragged, target));
				let cursor = match self.preview.as_ref().map(|plan| plan.operation) {
					Some(DropOperation::Assign | DropOperation::Unassign) => Cursor::Copy,
					Some(DropOperation::AlreadyMember) => Cursor::NotAllowed,
					None => Cursor::Grabbing,
				};
				vec![Action::RenderNeeded, Action::SetCursor(cursor)]
			}
			PointerMode::Panning => {
				view.pan_by(dx, dy);
				vec![Action::RenderNeeded]
			}
			PointerMode::Idle => {
				let (wx, wy) = view.screen_to_world(x, y);
				let hovered = hit_test(store, wx, wy).map(|node| node.id().clone());
				if hovered == self.hovered {
					return Vec::new();
				}
				let cursor = if hovered.is_some() {
					Cursor::Pointer
				} else {
					Cursor::Grab
				};
				self.hovered = hovered;
				vec![Action::RenderNeeded, Action::SetCursor(cursor)]
			}
		}
	}

	/// Ends the gesture. A pending drop is planned again from the membership
	/// lists as they stand now, since snapshots may land after the last move.
	fn pointer_up(&mut self, store: &NodeStore) -> Vec<Action> {
		let relationship = self.dragged().is_some();
		let drop = self
			.preview
			.take()
			.filter(|_| relationship)
			.and_then(|plan| plan_drop(store.get(&plan.dragged)?, store.get(&plan.target)?))
			.map(Action::Drop);
		self.reset();
		let mut actions = vec![Action::RenderNeeded, Action::SetCursor(Cursor::Grab)];
		actions.extend(drop);
		actions
	}
}
