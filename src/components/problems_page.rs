use leptos::{
    component, create_effect, create_rw_signal, create_signal, event_target_value, spawn_local, store_value, view,
    Callback, CollectView, For, IntoView, Signal, SignalGet, SignalSet, SignalUpdate, SignalWith,
};
use leptos::logging::error;
use crate::api::{fetch_operators, fetch_problems, RequestGeneration};
use crate::chips::problem_filter_chips;
use crate::logging::log;
use crate::models::{Priority, Problem, ProblemType, ProblemsFilter, SolutionFilter};
use super::filter_chips::FilterChips;

fn problem_row(problem: Problem) -> impl IntoView {
    let priority = problem.priority.and_then(Priority::from_level).map_or("", Priority::label);
    let solution = problem.solution.unwrap_or_else(|| "Open".to_string());
    let persistent = problem.is_persistent.then_some("Persistent");
    view! {
        <tr>
            <td>{problem.problem_type}</td>
            <td>{priority}</td>
            <td>{problem.sloid.unwrap_or_default()}</td>
            <td>{problem.name.unwrap_or_default()}</td>
            <td>{problem.operator.unwrap_or_default()}</td>
            <td>{solution}" "{persistent}</td>
        </tr>
    }
}

/// Problem list with its own filters, independent of the map
#[component]
#[must_use]
#[allow(clippy::too_many_lines)]
pub fn ProblemsPage() -> impl IntoView {
    let filter = create_rw_signal(ProblemsFilter::default());
    let problems = create_rw_signal(Vec::<Problem>::new());
    let operators = create_rw_signal(Vec::<String>::new());
    let (error_message, set_error_message) = create_signal(None::<String>);
    let generation = store_value(RequestGeneration::new());

    spawn_local(async move {
        match fetch_operators().await {
            Ok(list) => operators.set(list),
            Err(e) => error!("Loading operators failed: {e}"),
        }
    });

    create_effect(move |_| {
        let current = filter.get();
        let Some(ticket) = generation.try_update_value(RequestGeneration::next) else { return };
        spawn_local(async move {
            let result = fetch_problems(&current).await;
            if !generation.try_with_value(|g| g.is_current(ticket)).unwrap_or(false) {
                return;
            }
            match result {
                Ok(list) => {
                    log!("Loaded {} problems", list.len());
                    problems.set(list);
                    set_error_message.set(None);
                }
                Err(e) => {
                    error!("Loading problems failed: {e}");
                    set_error_message.set(Some(e));
                }
            }
        });
    });

    let chips = Signal::derive(move || filter.with(problem_filter_chips));
    let on_remove = Callback::new(move |removal| filter.update(|f| f.apply_removal(&removal)));

    view! {
        <div class="problems-page">
            <div class="problems-filters">
                <select on:change=move |ev| {
                    let value = event_target_value(&ev);
                    filter.update(|f| f.problem_type = ProblemType::parse(&value).unwrap_or_default());
                }>
                    {ProblemType::ALL.into_iter().map(|t| view! {
                        <option value=t.as_str() selected=move || filter.with(|f| f.problem_type == t)>{t.label()}</option>
                    }).collect_view()}
                </select>
                <select on:change=move |ev| {
                    let value = event_target_value(&ev);
                    filter.update(|f| f.solution = SolutionFilter::parse(&value).unwrap_or_default());
                }>
                    {SolutionFilter::ALL.into_iter().map(|s| view! {
                        <option value=s.as_str() selected=move || filter.with(|f| f.solution == s)>{s.label()}</option>
                    }).collect_view()}
                </select>
                <select on:change=move |ev| {
                    let level = event_target_value(&ev).parse::<u8>().ok();
                    filter.update(|f| f.priority = level.and_then(Priority::from_level));
                }>
                    <option value="" selected=move || filter.with(|f| f.priority.is_none())>"Any priority"</option>
                    {Priority::ALL.into_iter().map(|p| view! {
                        <option value=p.level().to_string() selected=move || filter.with(|f| f.priority == Some(p))>{p.label()}</option>
                    }).collect_view()}
                </select>
                <details class="operator-picker">
                    <summary>"Operators"</summary>
                    <For
                        each=move || operators.get()
                        key=|op| op.clone()
                        children=move |op| {
                            let checked = op.clone();
                            let toggled = op.clone();
                            view! {
                                <label class="filter-option">
                                    <input
                                        type="checkbox"
                                        prop:checked=move || filter.with(|f| f.operators.contains(&checked))
                                        on:change=move |_| filter.update(|f| f.toggle_operator(&toggled))
                                    />
                                    {op}
                                </label>
                            }
                        }
                    />
                </details>
            </div>
            <FilterChips expr=chips on_remove=on_remove/>
            {move || error_message.get().map(|e| view! { <div class="status-bar status-error">{format!("Loading failed: {e}")}</div> })}
            <table class="problems-table">
                <thead>
                    <tr>
                        <th>"Problem"</th>
                        <th>"Priority"</th>
                        <th>"SLOID"</th>
                        <th>"Name"</th>
                        <th>"Operator"</th>
                        <th>"Solution"</th>
                    </tr>
                </thead>
                <tbody>
                    <For each=move || problems.get() key=|p| p.id children=problem_row/>
                </tbody>
            </table>
        </div>
    }
}
