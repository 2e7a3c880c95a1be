use leptos::{component, view, Callback, IntoView, Signal, SignalWith};
use crate::chips::map_filter_chips;
use super::filter_chips::FilterChips;
use super::filter_panel::FilterPanel;
use super::manual_match_bar::ManualMatchBar;
use super::map_canvas::MapCanvas;
use super::map_state::{LoadStatus, MapState};
use super::stop_popup::PopupLayer;
use super::toast::ToastNotification;

#[component]
#[must_use]
fn StatusBar(state: MapState) -> impl IntoView {
    let summary = move || {
        let count = state.records.with(Vec::len);
        match state.status.with(Clone::clone) {
            LoadStatus::Idle => format!("{count} entries in view"),
            LoadStatus::Loading => "Loading…".to_string(),
            LoadStatus::Failed(e) => format!("Loading failed: {e}"),
        }
    };
    let failed = move || state.status.with(|s| matches!(s, LoadStatus::Failed(_)));

    view! {
        <div class="status-bar" class:status-error=failed>
            <span>{summary}</span>
            {move || failed().then(|| view! {
                <button on:click=move |_| state.reload()>"Retry"</button>
            })}
        </div>
    }
}

/// Map page: filters on the left, the map with its popups on the right
#[component]
#[must_use]
pub fn MapPage() -> impl IntoView {
    let state = MapState::new();
    state.load_operators();

    let chips = Signal::derive(move || state.filters.with(|f| Some(map_filter_chips(f))));
    let on_remove = Callback::new(move |removal| state.remove_filter(removal));

    view! {
        <div class="map-page">
            <FilterPanel state=state/>
            <main class="map-main">
                <FilterChips expr=chips on_remove=on_remove/>
                <ManualMatchBar state=state/>
                <StatusBar state=state/>
                <div class="map-stage">
                    <MapCanvas state=state/>
                    <PopupLayer state=state/>
                </div>
            </main>
            <ToastNotification toast=state.toast/>
        </div>
    }
}
