pub mod marker_renderer;
pub mod tile_renderer;

use leptos::{component, create_effect, ev, on_cleanup, window_event_listener, create_node_ref, create_rw_signal, store_value, view, IntoView, SignalGet, SignalGetUntracked, SignalSet, SignalUpdate, SignalWith};
use wasm_bindgen::JsCast;
use web_sys::{CanvasRenderingContext2d, MouseEvent, WheelEvent};
use crate::markers::{find_marker_at, IconCache, ScreenMarker};
use super::canvas_viewport;
use super::map_state::MapState;
use marker_renderer::draw_markers;
use tile_renderer::{draw_tiles, tile_loaded_callback, TileCache};

fn pointer_position(canvas: &web_sys::HtmlCanvasElement, ev: &MouseEvent) -> (f64, f64) {
    let rect = canvas.get_bounding_client_rect();
    (f64::from(ev.client_x()) - rect.left(), f64::from(ev.client_y()) - rect.top())
}

#[component]
#[must_use]
#[allow(clippy::too_many_lines)]
pub fn MapCanvas(state: MapState) -> impl IntoView {
    let canvas_ref = create_node_ref::<leptos::html::Canvas>();
    let tiles = store_value(TileCache::default());
    let icons = store_value(IconCache::new());
    let screen_markers = store_value(Vec::<ScreenMarker>::new());
    let tile_tick = create_rw_signal(0u32);
    let hovering = create_rw_signal(false);
    let on_tile_load = store_value(tile_loaded_callback(move || {
        let _ = tile_tick.try_update(|t| *t = t.wrapping_add(1));
    }));
    let viewport = state.view;

    let resize_handle = window_event_listener(ev::resize, move |_| {
        tile_tick.update(|t| *t = t.wrapping_add(1));
        state.schedule_reload();
    });
    on_cleanup(move || resize_handle.remove());

    // Redraw on viewport, marker or tile changes
    create_effect(move |_| {
        let _ = tile_tick.get();
        let pending = state.pending_marker();
        let vp = viewport.viewport.get();

        let Some(canvas) = canvas_ref.get() else { return };
        let canvas_elem: &web_sys::HtmlCanvasElement = &canvas;
        let width = canvas_elem.client_width();
        let height = canvas_elem.client_height();
        if width <= 0 || height <= 0 {
            return;
        }
        #[allow(clippy::cast_sign_loss)]
        let (pixel_width, pixel_height) = (width as u32, height as u32);
        if canvas_elem.width() != pixel_width || canvas_elem.height() != pixel_height {
            canvas_elem.set_width(pixel_width);
            canvas_elem.set_height(pixel_height);
        }
        let size = (f64::from(width), f64::from(height));
        if vp.size != size {
            let first_sizing = vp.size == (0.0, 0.0);
            canvas_viewport::sync_size(&viewport, size.0, size.1);
            if first_sizing {
                state.reload();
            }
            // The size update re-runs this effect
            return;
        }

        let Some(ctx) = canvas
            .get_context("2d")
            .ok()
            .flatten()
            .and_then(|ctx| ctx.dyn_into::<CanvasRenderingContext2d>().ok())
        else {
            return;
        };

        on_tile_load.with_value(|on_load| tiles.update_value(|cache| draw_tiles(&ctx, &vp, cache, on_load)));
        let drawn = state.records.with(|records| {
            state.placed.with(|placed| {
                icons.try_update_value(|icons| draw_markers(&ctx, &vp, records, placed, icons, pending))
            })
        });
        if let Some(drawn) = drawn {
            screen_markers.set_value(drawn);
        }
    });

    let handle_mouse_down = move |ev: MouseEvent| {
        if ev.button() != 0 {
            return;
        }
        if let Some(canvas) = canvas_ref.get() {
            let (x, y) = pointer_position(&canvas, &ev);
            canvas_viewport::handle_pan_start(x, y, &viewport);
        }
    };

    let handle_mouse_move = move |ev: MouseEvent| {
        let Some(canvas) = canvas_ref.get() else { return };
        let (x, y) = pointer_position(&canvas, &ev);
        if viewport.is_panning.get_untracked() {
            canvas_viewport::handle_pan_move(x, y, &viewport);
        } else {
            let over = screen_markers.with_value(|m| find_marker_at(m, x, y).is_some());
            if hovering.get_untracked() != over {
                hovering.set(over);
            }
        }
    };

    let handle_mouse_up = move |ev: MouseEvent| {
        let dragged = canvas_viewport::handle_pan_end(&viewport);
        if dragged {
            state.schedule_reload();
            return;
        }
        let Some(canvas) = canvas_ref.get() else { return };
        let (x, y) = pointer_position(&canvas, &ev);
        if let Some(marker) = screen_markers.with_value(|m| find_marker_at(m, x, y).copied()) {
            state.open_popup(marker);
        }
    };

    let handle_mouse_leave = move |_ev: MouseEvent| {
        if canvas_viewport::handle_pan_end(&viewport) {
            state.schedule_reload();
        }
        hovering.set(false);
    };

    let handle_wheel = move |ev: WheelEvent| {
        ev.prevent_default();
        if let Some(canvas) = canvas_ref.get() {
            let (x, y) = pointer_position(&canvas, &ev);
            canvas_viewport::handle_zoom(&ev, x, y, &viewport);
            state.schedule_reload();
        }
    };

    let cursor = move || {
        if viewport.is_panning.get() {
            "cursor: grabbing;"
        } else if hovering.get() {
            "cursor: pointer;"
        } else {
            "cursor: grab;"
        }
    };

    let zoom_by = move |step: f64| {
        viewport.viewport.update(|vp| {
            let center = (vp.size.0 / 2.0, vp.size.1 / 2.0);
            let target = vp.zoom + step;
            vp.zoom_around(target, center, crate::constants::MIN_MAP_ZOOM, crate::constants::MAX_MAP_ZOOM);
        });
        state.schedule_reload();
    };

    view! {
        <div class="map-canvas-container">
            <canvas
                node_ref=canvas_ref
                class="map-canvas"
                style=cursor
                on:mousedown=handle_mouse_down
                on:mousemove=handle_mouse_move
                on:mouseup=handle_mouse_up
                on:mouseleave=handle_mouse_leave
                on:wheel=handle_wheel
                on:contextmenu=|ev| ev.prevent_default()
            />
            <div class="map-zoom-controls">
                <button title="Zoom in" on:click=move |_| zoom_by(1.0)>"+"</button>
                <button title="Zoom out" on:click=move |_| zoom_by(-1.0)>"−"</button>
            </div>
            <div class="map-attribution">
                "© "
                <a href="https://www.openstreetmap.org/copyright" target="_blank" rel="noopener">"OpenStreetMap"</a>
                " contributors"
            </div>
            <div class="map-zoom-level">
                {move || format!("z{:.1}", viewport.viewport.with(|vp| vp.zoom))}
            </div>
        </div>
    }
}
