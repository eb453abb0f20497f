use std::rc::Rc;

use leptos::prelude::*;
use log::info;

use crate::api::{BoardApi, RestClient};
use crate::components::relationship_board::RelationshipBoard;
use crate::components::toast::{ToastHost, ToastQueue};
use crate::config::BoardConfig;

/// Admin page hosting the relationship board.
#[component]
pub fn BoardPage() -> impl IntoView {
	let config = BoardConfig::default();
	info!("task service at {}", config.api_base_url);
	let api: Rc<dyn BoardApi> = Rc::new(RestClient::new(&config));
	let api = StoredValue::new_local(api);
	let toasts = ToastQueue::new(config.toast_duration_ms);

	view! {
		<ErrorBoundary fallback=|errors| {
			view! {
				<h1>"Uh oh! Something went wrong!"</h1>

				<p>"Errors: "</p>
				<ul>
					{move || {
						errors
							.get()
							.into_iter()
							.map(|(_, e)| view! { <li>{e.to_string()}</li> })
							.collect_view()
					}}
				</ul>
			}
		}>
			<div class="board-page">
				<header class="board-title">
					<h1>"Relationships"</h1>
					<p class="subtitle">
						"Drag a task onto a user or group to assign it. Drag a user onto a group to add them. Double-click for details."
					</p>
				</header>
				<RelationshipBoard api=api.get_value() toasts=toasts />
				<ToastHost toasts=toasts />
			</div>
		</ErrorBoundary>
	}
}
