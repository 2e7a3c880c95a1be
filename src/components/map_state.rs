use leptos::{
    batch, create_rw_signal, create_signal, spawn_local, store_value, ReadSignal, RwSignal, SignalGetUntracked, SignalSet,
    SignalUpdate, SignalWith, SignalWithUntracked, StoredValue, WriteSignal,
};
use leptos::logging::error;
use gloo_timers::future::TimeoutFuture;
use crate::api::{fetch_data, fetch_operators, fetch_route_stops, fetch_stop_popup, submit_manual_match, DataQuery, RequestGeneration};
use crate::constants::{FIT_BOUNDS_PADDING, MARKER_BATCH_SIZE, MAX_MAP_ZOOM, RELOAD_DEBOUNCE_MS};
use crate::geometry::{Bounds, MapViewport};
use crate::logging::log;
use crate::markers::{insert_in_batches, MarkerCluster, PlacedMarker, ScreenMarker};
use crate::models::{FilterError, FilterState, ManualMatch, MatchOutcome, MatchStep, RecomputeOutcome, RemoveFilter, RouteDirection, StopRecord, StopSide};
use crate::popup::{OpenPopups, PopupLoader};
use crate::settings;
use super::canvas_viewport::{create_viewport_signals, ViewportSignals};
use super::toast::{show_toast, Toast, ToastKind};

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum LoadStatus {
    #[default]
    Idle,
    Loading,
    /// Last reload failed; the previous markers stay on screen
    Failed(String),
}

/// Blocking notice for rejected input
pub fn alert(message: &str) {
    if let Some(window) = web_sys::window() {
        let _ = window.alert_with_message(message);
    }
}

/// Shared state of the map page. Every field is a signal handle, so the
/// struct is `Copy` and handed to each child component.
#[derive(Clone, Copy)]
pub struct MapState {
    pub filters: RwSignal<FilterState>,
    pub records: RwSignal<Vec<StopRecord>>,
    /// Laid out markers, filled in batches after every reload
    pub placed: RwSignal<Vec<PlacedMarker>>,
    pub view: ViewportSignals,
    pub popups: RwSignal<OpenPopups>,
    pub manual_match: RwSignal<ManualMatch>,
    pub status: RwSignal<LoadStatus>,
    pub operators: RwSignal<Vec<String>>,
    pub toast: ReadSignal<Toast>,
    set_toast: WriteSignal<Toast>,
    loader: StoredValue<PopupLoader>,
    generation: StoredValue<RequestGeneration>,
    debounce: StoredValue<u64>,
}

impl MapState {
    #[must_use]
    pub fn new() -> Self {
        let (toast, set_toast) = create_signal(Toast::default());
        Self {
            filters: create_rw_signal(FilterState::new()),
            records: create_rw_signal(Vec::new()),
            placed: create_rw_signal(Vec::new()),
            view: create_viewport_signals(settings::load_viewport()),
            popups: create_rw_signal(OpenPopups::new()),
            manual_match: create_rw_signal(ManualMatch::new()),
            status: create_rw_signal(LoadStatus::Idle),
            operators: create_rw_signal(Vec::new()),
            toast,
            set_toast,
            loader: store_value(PopupLoader::new()),
            generation: store_value(RequestGeneration::new()),
            debounce: store_value(0),
        }
    }

    pub fn notify(self, message: impl Into<String>, kind: ToastKind) {
        show_toast(self.toast, self.set_toast, message, kind);
    }

    /// Fetches the records for the current viewport and filters. Only the
    /// newest request applies its response.
    pub fn reload(self) {
        let viewport = self.view.viewport.get_untracked();
        if viewport.size.0 <= 0.0 || viewport.size.1 <= 0.0 {
            return;
        }
        let Some(generation) = self.generation.try_update_value(RequestGeneration::next) else { return };
        let query = self.filters.with_untracked(|f| DataQuery::from_state(f, &viewport.bounds(), viewport.zoom));
        self.status.set(LoadStatus::Loading);

        spawn_local(async move {
            let result = fetch_data(&query).await;
            let is_current = move || self.generation.try_with_value(|g| g.is_current(generation)).unwrap_or(false);
            if !is_current() {
                log!("Dropping superseded viewport response");
                return;
            }

            match result {
                Ok(records) => {
                    log!("Viewport reload returned {} stops", records.len());
                    let layout = MarkerCluster::from_records(&records).layout();
                    let capacity = layout.len();
                    self.loader.update_value(PopupLoader::reset);
                    batch(move || {
                        self.records.set(records);
                        self.placed.set(Vec::with_capacity(capacity));
                    });
                    insert_in_batches(&layout, MARKER_BATCH_SIZE, is_current, |chunk| {
                        self.placed.update(|placed| placed.extend_from_slice(chunk));
                    }).await;
                    if is_current() {
                        self.status.set(LoadStatus::Idle);
                    }
                }
                Err(e) => {
                    error!("Viewport reload failed: {e}");
                    self.status.set(LoadStatus::Failed(e));
                }
            }
        });
    }

    /// Reloads once pan or zoom input has been quiet for a moment
    pub fn schedule_reload(self) {
        let Some(ticket) = self.debounce.try_update_value(|d| {
            *d += 1;
            *d
        }) else { return };
        spawn_local(async move {
            TimeoutFuture::new(RELOAD_DEBOUNCE_MS).await;
            if self.debounce.try_get_value() == Some(ticket) {
                settings::save_viewport(&self.view.viewport.get_untracked());
                self.reload();
            }
        });
    }

    pub fn load_operators(self) {
        spawn_local(async move {
            match fetch_operators().await {
                Ok(operators) => self.operators.set(operators),
                Err(e) => error!("Loading operators failed: {e}"),
            }
        });
    }

    /// Runs an infallible store mutation, then refreshes the map
    pub fn mutate_filters(self, mutation: impl FnOnce(&mut FilterState) -> RecomputeOutcome) {
        let mut outcome = RecomputeOutcome::default();
        self.filters.update(|f| outcome = mutation(f));
        if outcome.top_n_cleared {
            self.notify("Top N was switched off because no matching method is selected", ToastKind::Info);
        }
        self.reload();
    }

    /// Plain edits that cannot disable Top-N
    pub fn edit_filters(self, edit: impl FnOnce(&mut FilterState)) {
        self.mutate_filters(|f| {
            edit(f);
            RecomputeOutcome::default()
        });
    }

    /// Runs a validated mutation on a copy. A rejection leaves the state
    /// untouched and is reported with a blocking notice.
    pub fn try_mutate_filters(self, mutation: impl FnOnce(&mut FilterState) -> Result<(), FilterError>) -> bool {
        let mut next = self.filters.get_untracked();
        match mutation(&mut next) {
            Ok(()) => {
                self.filters.set(next);
                self.reload();
                true
            }
            Err(e) => {
                alert(&e.to_string());
                false
            }
        }
    }

    pub fn remove_filter(self, removal: RemoveFilter) {
        self.mutate_filters(|f| f.apply_removal(&removal));
    }

    /// Moves the map onto the stops of a route that was just added as a filter
    pub fn focus_route(self, route_id: String, direction: RouteDirection) {
        spawn_local(async move {
            match fetch_route_stops(&route_id, direction).await {
                Ok(stops) => {
                    let points = stops.iter().flat_map(|s| s.sides().into_iter().filter_map(move |side| s.position(side)));
                    let Some(bounds) = Bounds::around(points) else {
                        self.notify(format!("Route {route_id} has no stops with coordinates"), ToastKind::Info);
                        return;
                    };
                    self.view.viewport.update(|vp| vp.fit_bounds(&bounds, FIT_BOUNDS_PADDING, MAX_MAP_ZOOM));
                    self.schedule_reload();
                }
                Err(e) => error!("Loading stops of route {route_id} failed: {e}"),
            }
        });
    }

    /// Opens the popup for a clicked marker with the data at hand and loads
    /// the full content on first use.
    pub fn open_popup(self, marker: ScreenMarker) {
        let Some(record) = self.records.with_untracked(|r| r.get(marker.record).cloned()) else { return };
        let anchor = marker.position;
        let key = marker.key;
        let cached = self.loader.with_value(|l| l.cached(key).cloned());
        let viewport = self.view.viewport.get_untracked();
        self.popups.update(|p| {
            p.open(key, anchor, cached.clone().unwrap_or(record));
            p.reposition_all(&viewport);
        });
        if cached.is_some() {
            return;
        }

        let Some(ticket) = self.loader.try_update_value(|l| l.begin(key)).flatten() else { return };
        spawn_local(async move {
            let result = fetch_stop_popup(key.stop_id, key.side).await;
            let loaded = self.loader.try_update_value(|l| l.finish(ticket, result).cloned()).flatten();
            if let Some(record) = loaded {
                self.popups.update(|p| {
                    p.replace_record(key, record);
                });
            }
        });
    }

    pub fn close_popup(self, id: uuid::Uuid) {
        self.popups.update(|p| {
            p.close(id);
        });
    }

    /// "Match to" button in a popup bubble
    pub fn match_click(self, side: StopSide, stop_id: i64) {
        let Some(step) = self.manual_match.try_update(|m| m.click(side, stop_id)) else { return };
        match step {
            MatchStep::Started(pending) => {
                self.notify(
                    format!("{} entry selected, choose the {} entry to match it with", pending.from.display_name(), pending.from.opposite().display_name()),
                    ToastKind::Info,
                );
            }
            MatchStep::Unchanged => {}
            MatchStep::Submit(request) => {
                spawn_local(async move {
                    let result = submit_manual_match(&request).await;
                    let Some(outcome) = self.manual_match.try_update(|m| m.complete(&request, result)) else { return };
                    match outcome {
                        MatchOutcome::Matched { is_persistent } => {
                            let message = if is_persistent { "Match saved and kept across imports" } else { "Match saved" };
                            self.notify(message, ToastKind::Info);
                            self.reload();
                        }
                        MatchOutcome::Failed(e) => {
                            error!("Manual match failed: {e}");
                            self.notify(format!("Matching failed: {e}"), ToastKind::Error);
                        }
                        MatchOutcome::Superseded => {
                            log!("Ignoring result for a cancelled match selection");
                        }
                    }
                });
            }
        }
    }

    pub fn cancel_match(self) {
        self.manual_match.update(ManualMatch::cancel);
    }

    /// Marker highlighted as the first half of a pending match
    #[must_use]
    pub fn pending_marker(self) -> Option<crate::models::MarkerKey> {
        self.manual_match.with(|m| m.pending().map(|p| crate::models::MarkerKey { side: p.from, stop_id: p.stop_id }))
    }

    #[must_use]
    pub fn viewport(self) -> MapViewport {
        self.view.viewport.get_untracked()
    }
}

impl Default for MapState {
    fn default() -> Self {
        Self::new()
    }
}
