use leptos::{component, view, Callable, Callback, CollectView, IntoView, Signal, SignalWith};
use crate::chips::{ChipExpr, ChipRemoval, ChipToken, EVERYTHING_LABEL};

fn render_tokens<A: ChipRemoval + 'static>(expr: &ChipExpr<A>, on_remove: Callback<A>) -> leptos::View {
    expr.tokens().into_iter().map(|token| match token {
        ChipToken::Everything => view! { <span class="chip chip-everything">{EVERYTHING_LABEL}</span> }.into_view(),
        ChipToken::Chip(chip) => {
            let removal = chip.removal.clone();
            view! {
                <span class=format!("chip chip-{}", chip.category().as_str())>
                    {chip.label.clone()}
                    <button
                        class="chip-remove"
                        title="Remove this filter"
                        on:click=move |_| on_remove.call(removal.clone())
                    >
                        "×"
                    </button>
                </span>
            }.into_view()
        }
        ChipToken::Separator(sep) => view! { <span class="chip-separator">{sep.as_str()}</span> }.into_view(),
        ChipToken::Open => view! { <span class="chip-paren">"("</span> }.into_view(),
        ChipToken::Close => view! { <span class="chip-paren">")"</span> }.into_view(),
    }).collect_view()
}

/// Active filters as removable badges joined by AND/OR
#[component]
#[must_use]
pub fn FilterChips<A: ChipRemoval + 'static>(
    #[prop(into)] expr: Signal<Option<ChipExpr<A>>>,
    on_remove: Callback<A>,
) -> impl IntoView {
    view! {
        <div class="filter-chips">
            {move || expr.with(|e| e.as_ref().map(|e| render_tokens(e, on_remove)))}
        </div>
    }
}
