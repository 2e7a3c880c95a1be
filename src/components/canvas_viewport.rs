use leptos::{batch, create_rw_signal, create_signal, ReadSignal, RwSignal, WriteSignal, SignalGetUntracked, SignalSet, SignalUpdate};
use web_sys::WheelEvent;
use crate::constants::{MAX_MAP_ZOOM, MIN_MAP_ZOOM};
use crate::geometry::MapViewport;

/// Zoom levels per wheel notch
const WHEEL_ZOOM_STEP: f64 = 0.5;

#[derive(Clone, Copy)]
pub struct ViewportSignals {
    pub viewport: RwSignal<MapViewport>,
    pub is_panning: ReadSignal<bool>,
    pub set_is_panning: WriteSignal<bool>,
    pub last_mouse_pos: ReadSignal<(f64, f64)>,
    pub set_last_mouse_pos: WriteSignal<(f64, f64)>,
    /// Pointer travel since the pan started, used to tell clicks from drags
    pub pan_distance: RwSignal<f64>,
}

#[must_use]
pub fn create_viewport_signals(initial: MapViewport) -> ViewportSignals {
    let (is_panning, set_is_panning) = create_signal(false);
    let (last_mouse_pos, set_last_mouse_pos) = create_signal((0.0, 0.0));

    ViewportSignals {
        viewport: create_rw_signal(initial),
        is_panning,
        set_is_panning,
        last_mouse_pos,
        set_last_mouse_pos,
        pan_distance: create_rw_signal(0.0),
    }
}

pub fn handle_pan_start(
    x: f64,
    y: f64,
    viewport: &ViewportSignals,
) {
    batch(move || {
        viewport.set_is_panning.set(true);
        viewport.set_last_mouse_pos.set((x, y));
        viewport.pan_distance.set(0.0);
    });
}

pub fn handle_pan_move(
    x: f64,
    y: f64,
    viewport: &ViewportSignals,
) {
    if !viewport.is_panning.get_untracked() {
        return;
    }

    let (last_x, last_y) = viewport.last_mouse_pos.get_untracked();
    let dx = x - last_x;
    let dy = y - last_y;

    batch(move || {
        viewport.viewport.update(|vp| vp.pan_by(dx, dy));
        viewport.pan_distance.update(|d| *d += dx.abs() + dy.abs());
        viewport.set_last_mouse_pos.set((x, y));
    });
}

/// Ends a pan; returns true when the pointer moved far enough to count as a drag
pub fn handle_pan_end(viewport: &ViewportSignals) -> bool {
    let was_panning = viewport.is_panning.get_untracked();
    viewport.set_is_panning.set(false);
    was_panning && viewport.pan_distance.get_untracked() > 3.0
}

pub fn handle_zoom(
    ev: &WheelEvent,
    mouse_x: f64,
    mouse_y: f64,
    viewport: &ViewportSignals,
) {
    let step = if ev.delta_y() < 0.0 { WHEEL_ZOOM_STEP } else { -WHEEL_ZOOM_STEP };
    viewport.viewport.update(|vp| {
        let target = vp.zoom + step;
        vp.zoom_around(target, (mouse_x, mouse_y), MIN_MAP_ZOOM, MAX_MAP_ZOOM);
    });
}

/// Keeps the viewport size in sync with the canvas element
pub fn sync_size(viewport: &ViewportSignals, width: f64, height: f64) {
    if viewport.viewport.get_untracked().size != (width, height) {
        viewport.viewport.update(|vp| vp.size = (width, height));
    }
}
