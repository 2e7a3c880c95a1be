use leptos::*;
use leptos_meta::*;
use leptos_router::{Route, Router, Routes, A};
use crate::components::map_page::MapPage;
use crate::components::problems_page::ProblemsPage;

#[component]
pub fn App() -> impl IntoView {
    provide_meta_context();

    view! {
        <Stylesheet id="leptos" href="/pkg/stop_reconciler.css"/>
        <Title text="ATLAS / OSM stop reconciliation"/>

        <Router>
            <nav class="app-nav">
                <A href="/" exact=true>"Map"</A>
                <A href="/problems">"Problems"</A>
            </nav>
            <div class="app">
                <Routes>
                    <Route path="/" view=MapPage/>
                    <Route path="/problems" view=ProblemsPage/>
                </Routes>
            </div>
        </Router>
    }
}
