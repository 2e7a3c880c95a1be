use leptos::{component, event_target_checked, view, IntoView, Show, SignalUpdate, SignalWith};
use super::map_state::MapState;

/// Banner shown while the first half of a manual match is selected
#[component]
#[must_use]
pub fn ManualMatchBar(state: MapState) -> impl IntoView {
    let pending = move || state.manual_match.with(|m| m.pending());
    let description = move || {
        pending().map(|p| {
            format!(
                "{} entry #{} selected. Click \"Match to this entry\" on an {} entry to pair them.",
                p.from.display_name(),
                p.stop_id,
                p.from.opposite().display_name(),
            )
        })
    };

    view! {
        <Show when=move || pending().is_some()>
            <div class="manual-match-bar">
                <span>{description}</span>
                <label>
                    <input
                        type="checkbox"
                        prop:checked=move || state.manual_match.with(|m| m.make_persistent())
                        on:change=move |ev| {
                            let value = event_target_checked(&ev);
                            state.manual_match.update(|m| m.set_make_persistent(value));
                        }
                    />
                    "Keep across imports"
                </label>
                <button on:click=move |_| state.cancel_match()>"Cancel"</button>
            </div>
        </Show>
    }
}
