//! Transient status messages that dismiss themselves.

use std::time::Duration;

use leptos::prelude::*;
use log::debug;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ToastSeverity {
	Info,
	Success,
	Warning,
	Error,
}

impl ToastSeverity {
	fn class(self) -> &'static str {
		match self {
			ToastSeverity::Info => "toast toast-info",
			ToastSeverity::Success => "toast toast-success",
			ToastSeverity::Warning => "toast toast-warning",
			ToastSeverity::Error => "toast toast-error",
		}
	}
}

#[derive(Clone, Debug, PartialEq)]
pub struct Toast {
	pub id: u64,
	pub severity: ToastSeverity,
	pub message: String,
}

/// Handle to the on-screen toast stack. Fire and forget: nothing waits on a toast.
#[derive(Clone, Copy)]
pub struct ToastQueue {
	items: RwSignal<Vec<Toast>>,
	next_id: StoredValue<u64>,
	duration: Duration,
}

impl ToastQueue {
	pub fn new(duration_ms: u64) -> Self {
		Self {
			items: RwSignal::new(Vec::new()),
			next_id: StoredValue::new(0),
			duration: Duration::from_millis(duration_ms),
		}
	}

	pub fn notify(&self, severity: ToastSeverity, message: impl Into<String>) {
		let message = message.into();
		debug!("toast {severity:?}: {message}");
		let id = self.next_id.get_value();
		self.next_id.set_value(id + 1);
		self.items.update(|items| {
			items.push(Toast {
				id,
				severity,
				message,
			})
		});
		let items = self.items;
		set_timeout(
			move || {
				let _ = items.try_update(|items| items.retain(|toast| toast.id != id));
			},
			self.duration,
		);
	}

	pub fn info(&self, message: impl Into<String>) {
		self.notify(ToastSeverity::Info, message);
	}

	pub fn success(&self, message: impl Into<String>) {
		self.notify(ToastSeverity::Success, message);
	}

	pub fn warning(&self, message: impl Into<String>) {
		self.notify(ToastSeverity::Warning, message);
	}

	pub fn error(&self, message: impl Into<String>) {
		self.notify(ToastSeverity::Error, message);
	}

	pub fn dismiss(&self, id: u64) {
		self.items.update(|items| items.retain(|toast| toast.id != id));
	}
}

#[component]
pub fn ToastHost(toasts: ToastQueue) -> impl IntoView {
	view! {
		<div class="toast-stack">
			<For
				each=move || toasts.items.get()
				key=|toast| toast.id
				children=move |toast| {
					let id = toast.id;
					view! {
						<div class=toast.severity.class() on:click=move |_| toasts.dismiss(id)>
							{toast.message}
						</div>
					}
				}
			/>
		</div>
	}
}
