use chrono::NaiveDate;
use leptos::prelude::*;

use super::filter::{ActivityStatus, AssignmentFilter, BoardFilters, StatusToggle};
use crate::api::{EntityKind, TaskStatus};

fn parse_date(value: &str) -> Option<NaiveDate> {
	NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").ok()
}

/// "All" plus one checkbox per value of a status filter.
fn status_toggles<T>(
	filters: RwSignal<BoardFilters>,
	title: &'static str,
	options: Vec<(T, &'static str)>,
	get: fn(&BoardFilters) -> &StatusToggle<T>,
	get_mut: fn(&mut BoardFilters) -> &mut StatusToggle<T>,
) -> impl IntoView
where
	T: Ord + Copy + Send + Sync + 'static,
{
	view! {
		<fieldset class="filter-group">
			<legend>{title}</legend>
			<label>
				<input
					type="checkbox"
					prop:checked=move || filters.with(|f| get(f).is_all())
					on:change=move |_| filters.update(|f| get_mut(f).select_all())
				/>
				"All"
			</label>
			{options
				.into_iter()
				.map(|(value, label)| {
					view! {
						<label>
							<input
								type="checkbox"
								prop:checked=move || filters.with(|f| get(f).is_selected(value))
								on:change=move |_| filters.update(|f| get_mut(f).toggle(value))
							/>
							{label}
						</label>
					}
				})
				.collect_view()}
		</fieldset>
	}
}

#[component]
pub fn FilterPanel(
	filters: RwSignal<BoardFilters>,
	/// (visible, total) node counts.
	counts: RwSignal<(usize, usize)>,
) -> impl IntoView {
	let active = move || filters.with(BoardFilters::active_count);
	let date_value = |date: Option<NaiveDate>| date.map(|d| d.to_string()).unwrap_or_default();

	view! {
		<aside class="filter-panel">
			<header class="filter-header">
				<h2>"Filters"</h2>
				<Show when=move || { active() > 0 }>
					<span class="filter-badge">{active}</span>
				</Show>
				<button
					disabled=move || active() == 0
					on:click=move |_| filters.set(BoardFilters::default())
				>
					"Reset filters"
				</button>
			</header>
			<p class="filter-counts">
				{move || {
					let (visible, total) = counts.get();
					format!("Showing {visible} of {total} nodes")
				}}
			</p>

			<input
				type="search"
				class="filter-search"
				placeholder="Search names, emails, roles…"
				prop:value=move || filters.with(|f| f.search.clone())
				on:input=move |ev| filters.update(|f| f.search = event_target_value(&ev))
			/>

			<fieldset class="filter-group">
				<legend>"Show"</legend>
				{EntityKind::ALL
					.into_iter()
					.map(|kind| {
						view! {
							<label>
								<input
									type="checkbox"
									prop:checked=move || filters.with(|f| f.node_types.enabled(kind))
									on:change=move |_| filters.update(|f| f.node_types.toggle(kind))
								/>
								{kind.as_str()}
							</label>
						}
					})
					.collect_view()}
			</fieldset>

			{status_toggles(
				filters,
				"Task status",
				TaskStatus::ALL.into_iter().map(|s| (s, s.label())).collect(),
				|f| &f.task_status,
				|f| &mut f.task_status,
			)}

			<fieldset class="filter-group">
				<legend>"Assignment"</legend>
				<select
					prop:value=move || filters.with(|f| f.assignment.as_str())
					on:change=move |ev| {
						let value = AssignmentFilter::from_value(&event_target_value(&ev));
						filters.update(|f| f.assignment = value);
					}
				>
					{AssignmentFilter::ALL
						.into_iter()
						.map(|a| view! { <option value=a.as_str()>{a.label()}</option> })
						.collect_view()}
				</select>
			</fieldset>

			<fieldset class="filter-group">
				<legend>"Task dates"</legend>
				<label>
					"From"
					<input
						type="date"
						prop:value=move || filters.with(|f| date_value(f.dates.from))
						on:change=move |ev| {
							let from = parse_date(&event_target_value(&ev));
							filters.update(|f| f.dates.from = from);
						}
					/>
				</label>
				<label>
					"To"
					<input
						type="date"
						prop:value=move || filters.with(|f| date_value(f.dates.to))
						on:change=move |ev| {
							let to = parse_date(&event_target_value(&ev));
							filters.update(|f| f.dates.to = to);
						}
					/>
				</label>
			</fieldset>

			{status_toggles(
				filters,
				"User status",
				ActivityStatus::ALL.into_iter().map(|s| (s, s.label())).collect(),
				|f| &f.user_status,
				|f| &mut f.user_status,
			)}
			{status_toggles(
				filters,
				"Group status",
				ActivityStatus::ALL.into_iter().map(|s| (s, s.label())).collect(),
				|f| &f.group_status,
				|f| &mut f.group_status,
			)}
		</aside>
	}
}
