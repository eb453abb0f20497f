//! Pan/zoom transform between screen space and world space.

pub const MIN_SCALE: f64 = 0.3;
pub const MAX_SCALE: f64 = 3.0;
/// Multiplicative change per wheel event.
pub const ZOOM_STEP: f64 = 0.1;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ViewTransform {
	pub offset_x: f64,
	pub offset_y: f64,
	pub scale: f64,
}

impl Default for ViewTransform {
	fn default() -> Self {
		Self {
			offset_x: 0.0,
			offset_y: 0.0,
			scale: 1.0,
		}
	}
}

impl ViewTransform {
	pub fn screen_to_world(&self, sx: f64, sy: f64) -> (f64, f64) {
		(
			(sx - self.offset_x) / self.scale,
			(sy - self.offset_y) / self.scale,
		)
	}

	pub fn world_to_screen(&self, wx: f64, wy: f64) -> (f64, f64) {
		(
			wx * self.scale + self.offset_x,
			wy * self.scale + self.offset_y,
		)
	}

	/// Screen-space pan; no scale division.
	pub fn pan_by(&mut self, dx: f64, dy: f64) {
		self.offset_x += dx;
		self.offset_y += dy;
	}

	/// Set a new scale (clamped) keeping the world point under `(sx, sy)` fixed.
	pub fn zoom_at(&mut self, sx: f64, sy: f64, new_scale: f64) {
		let new_scale = new_scale.clamp(MIN_SCALE, MAX_SCALE);
		let (wx, wy) = self.screen_to_world(sx, sy);
		self.scale = new_scale;
		self.offset_x = sx - wx * new_scale;
		self.offset_y = sy - wy * new_scale;
	}

	/// One wheel notch: zoom out for positive `delta_y`, in otherwise.
	pub fn wheel_zoom(&mut self, sx: f64, sy: f64, delta_y: f64) {
		let factor = if delta_y > 0.0 {
			1.0 - ZOOM_STEP
		} else {
			1.0 + ZOOM_STEP
		};
		self.zoom_at(sx, sy, self.scale * factor);
	}

	pub fn reset(&mut self) {
		*self = Self::default();
	}
}
