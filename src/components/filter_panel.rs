use leptos::{
    component, create_effect, create_signal, event_target_checked, event_target_value, view, Callable, Callback, CollectView, For,
    IntoView, SignalGet, SignalSet, SignalWith, SignalWithUntracked, View,
};
use crate::constants::{NODE_TYPE_OPTIONS, TRANSPORT_TYPE_OPTIONS};
use crate::models::{CheckNode, FilterError, FilterKind, FilterState, MatchedNode, RemoveFilter, RouteDirection, StationFilter, TriState, UnmatchedNode};
use super::map_state::MapState;

const DIRECTIONS: [RouteDirection; 3] = [RouteDirection::Any, RouteDirection::Outbound, RouteDirection::Return];

/// Nested checkboxes; group boxes show the mixed state of their children
fn check_tree_view<K: Copy + PartialEq + 'static>(
    node: &CheckNode<K>,
    label: fn(K) -> &'static str,
    state_of: Callback<K, TriState>,
    on_set: Callback<(K, bool)>,
) -> View {
    let key = node.key();
    let children = node.children().iter().map(|child| check_tree_view(child, label, state_of, on_set)).collect_view();
    let nested = (!node.is_leaf()).then(|| view! { <ul class="check-tree">{children}</ul> });
    view! {
        <li>
            <label>
                <input
                    type="checkbox"
                    prop:checked=move || state_of.call(key).is_checked()
                    prop:indeterminate=move || state_of.call(key) == TriState::Mixed
                    on:change=move |ev| on_set.call((key, event_target_checked(&ev)))
                />
                {label(key)}
            </label>
            {nested}
        </li>
    }.into_view()
}

fn option_checkboxes(
    options: &'static [(&'static str, &'static str)],
    is_checked: impl Fn(&str) -> bool + Copy + 'static,
    on_toggle: impl Fn(&'static str) + Copy + 'static,
) -> impl IntoView {
    options.iter().map(|&(value, label)| view! {
        <label class="filter-option">
            <input type="checkbox" prop:checked=move || is_checked(value) on:change=move |_| on_toggle(value)/>
            {label}
        </label>
    }).collect_view()
}

fn parse_top_n(input: &str) -> Result<Option<u32>, FilterError> {
    let input = input.trim();
    if input.is_empty() {
        return Ok(None);
    }
    input.parse::<u32>().map(Some).map_err(|_| FilterError::InvalidTopN)
}

fn top_n_text(filters: &FilterState) -> String {
    filters.top_n().map(|n| n.to_string()).unwrap_or_default()
}

#[component]
#[must_use]
fn StationFilterInput(state: MapState) -> impl IntoView {
    let (value, set_value) = create_signal(String::new());
    let (kind, set_kind) = create_signal(FilterKind::Station);
    let (direction, set_direction) = create_signal(RouteDirection::Any);

    let add = move || {
        let kind = kind.get();
        let added = state.try_mutate_filters(|f| f.add_station_filter(&value.get(), kind, direction.get()));
        if added {
            if kind.is_route() {
                state.focus_route(value.get().trim().to_string(), direction.get());
            }
            set_value.set(String::new());
        }
    };

    view! {
        <div class="station-filter-input">
            <input
                type="text"
                placeholder="UIC, SLOID, node id, route or text"
                prop:value=value
                on:input=move |ev| set_value.set(event_target_value(&ev))
                on:keydown=move |ev| {
                    if ev.key() == "Enter" {
                        add();
                    }
                }
            />
            <select on:change=move |ev| set_kind.set(FilterKind::parse(&event_target_value(&ev)).unwrap_or(FilterKind::Station))>
                {FilterKind::ALL.into_iter().map(|k| view! {
                    <option value=k.as_str() selected=move || kind.get() == k>{k.label()}</option>
                }).collect_view()}
            </select>
            <select
                prop:disabled=move || !kind.get().is_route()
                on:change=move |ev| set_direction.set(RouteDirection::parse(&event_target_value(&ev)))
            >
                {DIRECTIONS.into_iter().map(|d| view! {
                    <option value=d.as_str() selected=move || direction.get() == d>{d.label()}</option>
                }).collect_view()}
            </select>
            <button on:click=move |_| add()>"Add"</button>
        </div>
    }
}

fn station_filter_row(state: MapState, index: usize, filter: StationFilter) -> impl IntoView {
    let direction = filter.kind.is_route().then(|| view! {
        <button
            class="link-button"
            title="Cycle direction"
            on:click=move |_| state.edit_filters(|f| {
                f.cycle_route_direction(index);
            })
        >
            {filter.direction.label()}
        </button>
    });
    view! {
        <li class="station-filter">
            <span>{format!("{}: {}", filter.kind.label(), filter.value)}</span>
            {direction}
            <button class="chip-remove" title="Remove" on:click=move |_| state.remove_filter(RemoveFilter::StationFilter(index))>"×"</button>
        </li>
    }
}

#[component]
#[must_use]
fn TopNInput(state: MapState) -> impl IntoView {
    let (draft, set_draft) = create_signal(String::new());
    // Follow the store, so an automatic clear also empties the field
    create_effect(move |_| set_draft.set(state.filters.with(top_n_text)));

    let apply = move || {
        let parsed = parse_top_n(&draft.get());
        let _ = state.try_mutate_filters(|f| f.set_top_n(parsed?));
    };

    view! {
        <div class="top-n">
            <label>
                "Top N by distance "
                <input
                    type="number"
                    min="1"
                    prop:value=draft
                    prop:disabled=move || state.filters.with(|f| !f.has_matched_method())
                    on:input=move |ev| set_draft.set(event_target_value(&ev))
                />
            </label>
            <button on:click=move |_| apply()>"Apply"</button>
        </div>
    }
}

/// Sidebar with every map filter
#[component]
#[must_use]
#[allow(clippy::too_many_lines)]
pub fn FilterPanel(state: MapState) -> impl IntoView {
    let matched_tree = state.filters.with_untracked(|f| f.matched().clone());
    let unmatched_tree = state.filters.with_untracked(|f| f.unmatched().clone());

    let matched_state = Callback::new(move |node: MatchedNode| state.filters.with(|f| f.matched_state(node)));
    let set_matched = Callback::new(move |(node, value): (MatchedNode, bool)| state.mutate_filters(|f| f.set_matched(node, value)));
    let unmatched_state = Callback::new(move |node: UnmatchedNode| state.filters.with(|f| f.unmatched_state(node)));
    let set_unmatched =
        Callback::new(move |(node, value): (UnmatchedNode, bool)| state.mutate_filters(|f| f.set_unmatched(node, value)));

    let station_filters = move || {
        state.filters.with(|f| f.station_filters().iter().cloned().enumerate().collect::<Vec<_>>())
    };
    let operators = move || state.operators.get();

    view! {
        <aside class="filter-panel">
            <section>
                <h3>"Stations and routes"</h3>
                <StationFilterInput state=state/>
                <ul class="station-filters">
                    <For
                        each=station_filters
                        key=|entry| entry.clone()
                        children=move |(index, filter)| station_filter_row(state, index, filter)
                    />
                </ul>
            </section>

            <section>
                <h3>"Match status"</h3>
                <ul class="check-tree">{check_tree_view(&matched_tree, MatchedNode::label, matched_state, set_matched)}</ul>
                <ul class="check-tree">{check_tree_view(&unmatched_tree, UnmatchedNode::label, unmatched_state, set_unmatched)}</ul>
            </section>

            <section>
                <h3>"Node type"</h3>
                {option_checkboxes(
                    &NODE_TYPE_OPTIONS,
                    move |v| state.filters.with(|f| f.node_types().contains(v)),
                    move |v| state.edit_filters(|f| f.toggle_node_type(v)),
                )}
            </section>

            <section>
                <h3>"Transport type"</h3>
                {option_checkboxes(
                    &TRANSPORT_TYPE_OPTIONS,
                    move |v| state.filters.with(|f| f.transport_types().contains(v)),
                    move |v| state.edit_filters(|f| f.toggle_transport_type(v)),
                )}
            </section>

            <section>
                <h3>"ATLAS operator"</h3>
                <div class="operator-list">
                    <For
                        each=operators
                        key=|op| op.clone()
                        children=move |op| {
                            let value = op.clone();
                            let checked = move || state.filters.with(|f| f.atlas_operators().contains(&value));
                            let toggled = op.clone();
                            view! {
                                <label class="filter-option">
                                    <input
                                        type="checkbox"
                                        prop:checked=checked
                                        on:change=move |_| state.edit_filters(|f| f.toggle_operator(&toggled))
                                    />
                                    {op}
                                </label>
                            }
                        }
                    />
                </div>
            </section>

            <section>
                <h3>"Ranking"</h3>
                <TopNInput state=state/>
                <label class="filter-option">
                    <input
                        type="checkbox"
                        prop:checked=move || state.filters.with(|f| f.show_duplicates_only())
                        on:change=move |ev| {
                            let value = event_target_checked(&ev);
                            state.edit_filters(|f| f.set_show_duplicates_only(value));
                        }
                    />
                    "Only ATLAS duplicates"
                </label>
            </section>

            <button class="reset-filters" on:click=move |_| state.edit_filters(|f| f.reset())>"Reset filters"</button>
        </aside>
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_top_n() {
        assert_eq!(parse_top_n(""), Ok(None));
        assert_eq!(parse_top_n(" 25 "), Ok(Some(25)));
        assert_eq!(parse_top_n("abc"), Err(FilterError::InvalidTopN));
        assert_eq!(parse_top_n("-3"), Err(FilterError::InvalidTopN));
    }

    #[test]
    fn test_top_n_field_empties_when_auto_cleared() {
        let mut filters = FilterState::new();
        filters.set_matched(MatchedNode::Exact, true);
        filters.set_top_n(Some(7)).expect("matched method selected");
        assert_eq!(top_n_text(&filters), "7");

        assert!(filters.set_matched(MatchedNode::Exact, false).top_n_cleared);
        assert_eq!(top_n_text(&filters), "");
        // Re-enabling a method does not bring the old number back
        filters.set_matched(MatchedNode::Exact, true);
        assert_eq!(top_n_text(&filters), "");
        assert_eq!(parse_top_n(&top_n_text(&filters)), Ok(None));
    }
}
