use crate::pages::{AppLayout, PlatformsPage, PromptsPage, ResumeManagerPage, ResumePreviewPage};
use crate::state::{AppContext, AppState};
use leptos::prelude::*;
use leptos_router::components::{Route, Router, Routes};
use leptos_router::path;

#[component]
pub fn App() -> impl IntoView {
    provide_context(AppContext(AppState::new()));

    view! {
        <Router>
            <Routes fallback=|| view! { <div class="px-4 py-8 text-xs text-muted-foreground">"页面不存在"</div> }>
                <Route path=path!("") view=move || view! {
                    <AppLayout>
                        <ResumePreviewPage />
                    </AppLayout>
                } />
                <Route path=path!("resumes") view=move || view! {
                    <AppLayout>
                        <ResumeManagerPage />
                    </AppLayout>
                } />
                <Route path=path!("prompts") view=move || view! {
                    <AppLayout>
                        <PromptsPage />
                    </AppLayout>
                } />
                <Route path=path!("platforms") view=move || view! {
                    <AppLayout>
                        <PlatformsPage />
                    </AppLayout>
                } />
            </Routes>
        </Router>
    }
}
