use std::f64::consts::PI;

use wasm_bindgen::JsValue;
use web_sys::CanvasRenderingContext2d;

use super::interaction::PointerMode;
use super::node::{BoardNode, ConnectionKind};
use super::resolver::DropOperation;
use super::state::BoardState;
use crate::api::Entity;

const BACKGROUND: &str = "#1a1a2e";
const HOVER_SCALE: f64 = 1.1;
const SELECTED_SCALE: f64 = 1.15;
const DROP_TARGET_SCALE: f64 = 1.2;
/// Labels may span this multiple of the drawn radius.
const LABEL_WIDTH_FACTOR: f64 = 1.6;
const TOOLTIP_FONT: &str = "12px Inter, sans-serif";
const TOOLTIP_LINE_HEIGHT: f64 = 16.0;
const TOOLTIP_PADDING: f64 = 8.0;
const TOOLTIP_GAP: f64 = 12.0;
const ELLIPSIS: char = '…';

#[derive(Clone, Copy, PartialEq)]
enum Emphasis {
	None,
	Hovered,
	Selected,
	DropTarget,
}

impl Emphasis {
	fn scale(self) -> f64 {
		match self {
			Emphasis::None => 1.0,
			Emphasis::Hovered => HOVER_SCALE,
			Emphasis::Selected => SELECTED_SCALE,
			Emphasis::DropTarget => DROP_TARGET_SCALE,
		}
	}
}

fn emphasis(state: &BoardState, node: &BoardNode) -> Emphasis {
	let id = Some(node.id());
	if state.pointer.drop_target() == id {
		Emphasis::DropTarget
	} else if state.pointer.selected() == id {
		Emphasis::Selected
	} else if state.pointer.hovered() == id {
		Emphasis::Hovered
	} else {
		Emphasis::None
	}
}

pub fn render(state: &BoardState, ctx: &CanvasRenderingContext2d) {
	ctx.set_fill_style_str(BACKGROUND);
	ctx.fill_rect(0.0, 0.0, state.width, state.height);
	ctx.save();
	let _ = ctx.translate(state.view.offset_x, state.view.offset_y);
	let _ = ctx.scale(state.view.scale, state.view.scale);
	draw_connections(state, ctx);
	draw_drag_preview(state, ctx);
	for node in state.store.visible() {
		draw_node(state, ctx, node);
	}
	ctx.restore();

	let tooltip = state
		.pointer
		.hovered()
		.filter(|id| state.store.is_visible(id))
		.and_then(|id| state.store.get(id));
	if let (Some(node), PointerMode::Idle) = (tooltip, state.pointer.mode()) {
		draw_tooltip(state, ctx, node);
	}
}

/// Segment between two node rims, or `None` when they overlap.
fn rim_segment(a: &BoardNode, b: &BoardNode) -> Option<(f64, f64, f64, f64)> {
	let (dx, dy) = (b.x - a.x, b.y - a.y);
	let dist = (dx * dx + dy * dy).sqrt();
	if dist <= a.radius() + b.radius() {
		return None;
	}
	let (ux, uy) = (dx / dist, dy / dist);
	Some((
		a.x + ux * a.radius(),
		a.y + uy * a.radius(),
		b.x - ux * b.radius(),
		b.y - uy * b.radius(),
	))
}

fn set_dash(ctx: &CanvasRenderingContext2d, dash: f64, gap: f64) {
	let _ = ctx.set_line_dash(&js_sys::Array::of2(
		&JsValue::from_f64(dash),
		&JsValue::from_f64(gap),
	));
}

fn clear_dash(ctx: &CanvasRenderingContext2d) {
	let _ = ctx.set_line_dash(&js_sys::Array::new());
}

fn draw_connections(state: &BoardState, ctx: &CanvasRenderingContext2d) {
	let k = state.view.scale;
	for connection in state.store.connections() {
		let Some((x1, y1, x2, y2)) = rim_segment(connection.from, connection.to) else {
			continue;
		};
		let color = match connection.kind {
			ConnectionKind::TaskUser => "rgba(72, 187, 120, 0.7)",
			ConnectionKind::TaskGroup => "rgba(237, 137, 54, 0.7)",
			ConnectionKind::GroupMember => "rgba(160, 174, 192, 0.6)",
		};
		if connection.kind == ConnectionKind::GroupMember {
			set_dash(ctx, 6.0 / k, 4.0 / k);
		}
		ctx.set_stroke_style_str(color);
		ctx.set_line_width(2.0 / k);
		ctx.begin_path();
		ctx.move_to(x1, y1);
		ctx.line_to(x2, y2);
		ctx.stroke();
		clear_dash(ctx);
	}
}

fn draw_drag_preview(state: &BoardState, ctx: &CanvasRenderingContext2d) {
	let Some(plan) = state.pointer.preview() else {
		return;
	};
	let (Some(from), Some(to)) = (state.store.get(&plan.dragged), state.store.get(&plan.target))
	else {
		return;
	};
	let k = state.view.scale;
	let color = match plan.operation {
		DropOperation::Assign => "#48bb78",
		DropOperation::Unassign => "#f56565",
		DropOperation::AlreadyMember => "#a0aec0",
	};

	if let Some((x1, y1, x2, y2)) = rim_segment(from, to) {
		set_dash(ctx, 10.0 / k, 6.0 / k);
		ctx.set_stroke_style_str(color);
		ctx.set_line_width(3.0 / k);
		ctx.begin_path();
		ctx.move_to(x1, y1);
		ctx.line_to(x2, y2);
		ctx.stroke();
		clear_dash(ctx);
	}

	ctx.set_font(&format!("{}px Inter, sans-serif", 13.0 / k.max(0.5)));
	ctx.set_text_align("center");
	ctx.set_text_baseline("bottom");
	ctx.set_fill_style_str(color);
	let _ = ctx.fill_text(
		&plan.message,
		to.x,
		to.y - to.radius() * DROP_TARGET_SCALE - 8.0 / k,
	);
}

fn draw_node(state: &BoardState, ctx: &CanvasRenderingContext2d, node: &BoardNode) {
	let k = state.view.scale;
	let emphasis = emphasis(state, node);
	let (x, y) = (node.x, node.y);
	let radius = node.radius() * emphasis.scale();

	if emphasis != Emphasis::None {
		let glow_radius = radius * 1.6;
		let alpha = if emphasis == Emphasis::DropTarget { 0.45 } else { 0.3 };
		if let Ok(gradient) = ctx.create_radial_gradient(x, y, radius * 0.5, x, y, glow_radius) {
			let _ = gradient.add_color_stop(0.0, &format!("rgba(255, 255, 255, {alpha})"));
			let _ = gradient.add_color_stop(0.6, &format!("rgba(200, 220, 255, {})", alpha * 0.3));
			let _ = gradient.add_color_stop(1.0, "rgba(255, 255, 255, 0)");
			ctx.begin_path();
			let _ = ctx.arc(x, y, glow_radius, 0.0, 2.0 * PI);
			#[allow(deprecated)]
			ctx.set_fill_style(&gradient);
			ctx.fill();
		}
	}

	ctx.save();
	ctx.set_shadow_color(node.shadow_color());
	ctx.set_shadow_blur(if emphasis == Emphasis::None { 8.0 } else { 18.0 });
	ctx.begin_path();
	let _ = ctx.arc(x, y, radius, 0.0, 2.0 * PI);
	ctx.set_fill_style_str(node.color());
	ctx.fill();
	ctx.restore();

	if emphasis != Emphasis::None {
		ctx.begin_path();
		let _ = ctx.arc(x, y, radius + 2.0 / k, 0.0, 2.0 * PI);
		ctx.set_stroke_style_str("rgba(255, 255, 255, 0.8)");
		ctx.set_line_width(1.5 / k);
		ctx.stroke();
	}

	ctx.set_fill_style_str("white");
	ctx.set_font("12px Inter, sans-serif");
	ctx.set_text_align("center");
	ctx.set_text_baseline("middle");
	let label = truncate_label(node.label(), radius * LABEL_WIDTH_FACTOR, |text| {
		ctx.measure_text(text).map(|m| m.width()).unwrap_or(0.0)
	});
	let _ = ctx.fill_text(&label, x, y);
}

fn draw_tooltip(state: &BoardState, ctx: &CanvasRenderingContext2d, node: &BoardNode) {
	let lines = tooltip_lines(node.data());
	ctx.set_font(TOOLTIP_FONT);
	let text_width = lines
		.iter()
		.map(|line| ctx.measure_text(line).map(|m| m.width()).unwrap_or(0.0))
		.fold(0.0, f64::max);
	let (width, height) = (
		text_width + 2.0 * TOOLTIP_PADDING,
		lines.len() as f64 * TOOLTIP_LINE_HEIGHT + 2.0 * TOOLTIP_PADDING,
	);

	let drawn_radius = node.radius() * HOVER_SCALE * state.view.scale;
	let (sx, sy) = state.view.world_to_screen(node.x, node.y);
	let (left, top) = (sx + drawn_radius + TOOLTIP_GAP, sy - height / 2.0);

	ctx.set_fill_style_str("rgba(26, 32, 44, 0.92)");
	ctx.fill_rect(left, top, width, height);
	ctx.set_stroke_style_str(node.color());
	ctx.set_line_width(1.0);
	ctx.stroke_rect(left, top, width, height);

	ctx.set_fill_style_str("#e2e8f0");
	ctx.set_text_align("left");
	ctx.set_text_baseline("top");
	for (i, line) in lines.iter().enumerate() {
		let _ = ctx.fill_text(
			line,
			left + TOOLTIP_PADDING,
			top + TOOLTIP_PADDING + i as f64 * TOOLTIP_LINE_HEIGHT,
		);
	}
}

/// Shorten `label` with an ellipsis until `measure` fits it in `max_width`.
pub fn truncate_label(label: &str, max_width: f64, measure: impl Fn(&str) -> f64) -> String {
	if measure(label) <= max_width {
		return label.to_string();
	}
	let mut chars: Vec<char> = label.chars().collect();
	while !chars.is_empty() {
		chars.pop();
		let candidate: String = chars.iter().chain([ELLIPSIS].iter()).collect();
		if measure(&candidate) <= max_width {
			return candidate;
		}
	}
	ELLIPSIS.to_string()
}

pub fn tooltip_lines(entity: &Entity) -> Vec<String> {
	let mut lines = vec![entity.label().to_string()];
	match entity {
		Entity::Task(task) => {
			lines.push(format!("Status: {}", task.status.label()));
			lines.push(format!(
				"Users: {}, Groups: {}",
				task.assigned_user_ids.len(),
				task.assigned_group_ids.len()
			));
			if let Some(due) = task.due_at {
				lines.push(format!("Due: {}", due.format("%Y-%m-%d")));
			}
		}
		Entity::User(user) => {
			if !user.email.is_empty() {
				lines.push(user.email.clone());
			}
			if !user.roles.is_empty() {
				lines.push(format!("Roles: {}", user.roles.join(", ")));
			}
			lines.push(if user.is_active { "Active" } else { "Inactive" }.to_string());
		}
		Entity::Group(group) => {
			if let Some(description) = group.description.as_deref().filter(|d| !d.is_empty()) {
				lines.push(description.to_string());
			}
			lines.push(format!("Members: {}", group.member_ids.len()));
			lines.push(if group.is_active { "Active" } else { "Inactive" }.to_string());
		}
	}
	lines
}
