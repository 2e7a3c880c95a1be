use leptos::{
    component, create_effect, create_memo, create_node_ref, create_signal, ev, html, on_cleanup, request_animation_frame,
    view, window_event_listener, CollectView, For, IntoView, SignalGet, SignalGetUntracked, SignalSet, SignalUpdate,
    SignalWith, SignalWithUntracked,
};
use uuid::Uuid;
use crate::constants::{POPUP_HANDLE_HEIGHT, POPUP_RESIZE_MARGIN};
use crate::models::{FilterKind, RouteDirection};
use crate::popup::{build_bubbles, drag_handle_rect, resize_edge_at, Bubble, BubbleField, GroupedRoute, PopupView, Rect, ResizeEdge};
use super::map_state::MapState;

fn client_pos(ev: &web_sys::MouseEvent) -> (f64, f64) {
    (f64::from(ev.client_x()), f64::from(ev.client_y()))
}

fn field_row(field: BubbleField) -> impl IntoView {
    let value = match field.link {
        Some(href) => view! { <a href=href target="_blank" rel="noopener">{field.value}</a> }.into_view(),
        None => field.value.into_view(),
    };
    view! {
        <tr>
            <th>{field.label}</th>
            <td>
                {value}
                {field.annotation.map(|a| view! { <span class="field-annotation">{a}</span> })}
            </td>
        </tr>
    }
}

fn route_list(state: MapState, routes: Vec<GroupedRoute>) -> impl IntoView {
    if routes.is_empty() {
        return ().into_view();
    }
    let count = routes.len();
    let items = routes.into_iter().map(|route| {
        let direction = match route.directions.as_slice() {
            [only] => RouteDirection::parse(only),
            _ => RouteDirection::Any,
        };
        let label = route.name.clone().unwrap_or_else(|| route.route_id.clone());
        let directions = if route.directions.is_empty() {
            String::new()
        } else {
            format!(" ({})", route.directions.join(", "))
        };
        let route_id = route.route_id;
        let add_filter = move |_| {
            let id = route_id.clone();
            let added = state.try_mutate_filters(|f| f.add_station_filter(&id, FilterKind::Route, direction));
            if added {
                state.focus_route(id, direction);
            }
        };
        view! {
            <li>
                <span class="route-name">{label}</span>
                <span class="route-directions">{directions}</span>
                <button class="link-button" title="Filter the map by this route" on:click=add_filter>"Filter"</button>
            </li>
        }
    }).collect_view();

    view! {
        <details class="bubble-routes">
            <summary>{format!("Routes ({count})")}</summary>
            <ul>{items}</ul>
        </details>
    }.into_view()
}

fn bubble_view(state: MapState, bubble: Bubble) -> impl IntoView {
    let side = bubble.side;
    let stop_id = bubble.stop_id;
    let label = move || state.manual_match.with(|m| m.button_label(side));
    let is_selected = move || state.manual_match.with(|m| m.pending().is_some_and(|p| p.from == side && p.stop_id == stop_id));

    view! {
        <div class=format!("bubble bubble-{}", side.as_str())>
            <div class="bubble-title">{bubble.title}</div>
            <table class="bubble-fields">
                {bubble.fields.into_iter().map(field_row).collect_view()}
            </table>
            {route_list(state, bubble.routes)}
            <button
                class="match-button"
                class:selected=is_selected
                on:click=move |_| state.match_click(side, stop_id)
            >
                {label}
            </button>
        </div>
    }
}

#[component]
#[must_use]
#[allow(clippy::too_many_lines)]
pub fn StopPopup(state: MapState, id: Uuid) -> impl IntoView {
    let panel_ref = create_node_ref::<html::Div>();
    let (cursor, set_cursor) = create_signal(ResizeEdge::empty().cursor());

    let frame = create_memo(move |_| {
        let vp = state.view.viewport.get();
        state.popups.with(|p| {
            p.get(id).map(|popup| {
                let g = &popup.geometry;
                (g.panel_rect(vp.to_screen(popup.anchor)), g.pinned_width(), g.explicit_height(), g.max_width())
            })
        })
    });
    let content = create_memo(move |_| {
        state.popups.with(|p| p.get(id).map(|popup| (popup.key.side, popup.view, build_bubbles(&popup.record, popup.view))))
    });

    // Measure the natural size after every content change
    create_effect(move |_| {
        content.with(|_| ());
        request_animation_frame(move || {
            let Some(panel) = panel_ref.get_untracked() else { return };
            let width = f64::from(panel.offset_width());
            let height = f64::from(panel.offset_height());
            let viewport = state.viewport();
            let _ = state.popups.try_update(|p| {
                if let Some(popup) = p.get_mut(id) {
                    if popup.geometry.is_idle() {
                        popup.geometry.set_content_size(width, height);
                        popup.reposition(&viewport);
                    }
                }
            });
        });
    });

    let style = move || {
        let Some((rect, pinned, height, max_width)) = frame.get() else { return String::new() };
        let width = pinned.map_or_else(|| format!("max-width: {max_width}px;"), |w| format!("width: {w}px;"));
        let height = height.map(|h| format!("height: {h}px;")).unwrap_or_default();
        format!("left: {}px; top: {}px; {width} {height} cursor: {};", rect.x, rect.y, cursor.get())
    };

    // The handle drags except within the resize band along the top
    let handle_style = move || {
        let edge_cursor = cursor.get();
        let cursor = if edge_cursor == ResizeEdge::empty().cursor() { "move" } else { edge_cursor };
        format!("height: {POPUP_HANDLE_HEIGHT}px; cursor: {cursor};")
    };

    let local_point = move |ev: &web_sys::MouseEvent| -> Option<((f64, f64), Rect)> {
        let (rect, ..) = frame.get_untracked()?;
        let (x, y) = client_pos(ev);
        let panel = panel_ref.get_untracked()?;
        let bounds = panel.get_bounding_client_rect();
        Some(((x - bounds.left(), y - bounds.top()), Rect { x: 0.0, y: 0.0, width: rect.width, height: rect.height }))
    };

    let edge_at = move |ev: &web_sys::MouseEvent| -> ResizeEdge {
        let Some((point, content_box)) = local_point(ev) else { return ResizeEdge::empty() };
        resize_edge_at(point, content_box, drag_handle_rect(content_box.width))
    };

    let on_panel_move = move |ev: web_sys::MouseEvent| {
        if state.popups.with_untracked(|p| p.interacting().is_none()) {
            set_cursor.set(edge_at(&ev).cursor());
        }
    };

    let on_panel_down = move |ev: web_sys::MouseEvent| {
        state.popups.update(|p| p.bring_to_front(id));
        let edge = edge_at(&ev);
        if edge.is_empty() {
            return;
        }
        ev.prevent_default();
        ev.stop_propagation();
        let pointer = client_pos(&ev);
        state.popups.update(|p| {
            if let Some(popup) = p.get_mut(id) {
                if let Err(e) = popup.geometry.begin_resize(edge, pointer) {
                    leptos::logging::warn!("Resize rejected: {e:?}");
                }
            }
        });
    };

    let on_handle_down = move |ev: web_sys::MouseEvent| {
        let pointer = client_pos(&ev);
        if edge_at(&ev).is_empty() {
            ev.prevent_default();
            ev.stop_propagation();
            state.popups.update(|p| {
                p.bring_to_front(id);
                if let Some(popup) = p.get_mut(id) {
                    let _ = popup.geometry.begin_drag(pointer);
                }
            });
        }
    };

    let toggle_view = move |_| {
        state.popups.update(|p| {
            let next = p.get(id).map(|popup| popup.view.toggle(popup.key.side));
            if let Some(view) = next {
                p.set_view(id, view);
            }
        });
    };

    let title = move || {
        content.with(|c| c.as_ref().and_then(|(_, _, bubbles)| bubbles.first().map(|b| b.title.clone())).unwrap_or_default())
    };
    let toggle_label = move || match content.with(|c| c.as_ref().map(|(_, view, _)| *view)) {
        Some(PopupView::Unified) => "Show clicked entry",
        _ => "Show all matches",
    };

    view! {
        <div
            class="stop-popup"
            node_ref=panel_ref
            style=style
            on:mousemove=on_panel_move
            on:mousedown=on_panel_down
        >
            <div class="stop-popup-handle" style=handle_style on:mousedown=on_handle_down>
                <span class="stop-popup-title">{title}</span>
                <button class="link-button" on:mousedown=|ev| ev.stop_propagation() on:click=toggle_view>{toggle_label}</button>
                <button class="close-button" title="Close" on:mousedown=|ev| ev.stop_propagation() on:click=move |_| state.close_popup(id)>"×"</button>
            </div>
            <div class="stop-popup-body">
                {move || content.get().map(|(_, _, bubbles)| {
                    bubbles.into_iter().map(|b| bubble_view(state, b)).collect_view()
                })}
            </div>
        </div>
    }
}

/// Floating popups plus the pointer listeners that drive drag and resize
#[component]
#[must_use]
pub fn PopupLayer(state: MapState) -> impl IntoView {
    let move_handle = window_event_listener(ev::mousemove, move |ev| {
        if state.popups.with_untracked(|p| p.interacting().is_none()) {
            return;
        }
        let pointer = client_pos(&ev);
        let viewport = state.viewport();
        state.popups.update(|p| {
            if let Some(popup) = p.interacting().and_then(|id| p.get_mut(id)) {
                popup.geometry.pointer_move(pointer);
            }
            p.reposition_all(&viewport);
        });
    });
    let up_handle = window_event_listener(ev::mouseup, move |_| {
        if state.popups.with_untracked(|p| p.interacting().is_none()) {
            return;
        }
        let viewport = state.viewport();
        state.popups.update(|p| {
            if let Some(popup) = p.interacting().and_then(|id| p.get_mut(id)) {
                popup.geometry.end_interaction();
            }
            p.reposition_all(&viewport);
        });
    });
    on_cleanup(move || {
        move_handle.remove();
        up_handle.remove();
    });

    // Pan and zoom move every connector
    create_effect(move |_| {
        let viewport = state.view.viewport.get();
        state.popups.update(|p| p.reposition_all(&viewport));
    });

    let ids = move || state.popups.with(|p| p.iter().map(|popup| popup.id).collect::<Vec<_>>());

    let connectors = move || {
        state.popups.with(|p| {
            p.iter()
                .filter_map(|popup| popup.connector)
                .map(|line| view! {
                    <line x1=line.from.0 y1=line.from.1 x2=line.to.0 y2=line.to.1 class="popup-connector"/>
                })
                .collect_view()
        })
    };

    view! {
        <div class="popup-layer" style=format!("--resize-margin: {POPUP_RESIZE_MARGIN}px;")>
            <svg class="popup-connectors">{connectors}</svg>
            <For each=ids key=|id| *id children=move |id| view! { <StopPopup state=state id=id/> }/>
        </div>
    }
}
