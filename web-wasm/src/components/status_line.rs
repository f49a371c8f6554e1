//! ステータス行コンポーネント

use leptos::prelude::*;
use card_scan_common::AppState;

#[component]
pub fn StatusLine(state: RwSignal<AppState>) -> impl IntoView {
    let is_error = move || state.with(|s| s.status().error_message().is_some());

    view! {
        <Show when=move || state.with(|s| s.is_busy())>
            <p class="status loading">"Loading..."</p>
        </Show>
        {move || {
            state
                .with(|s| s.status_line())
                .map(|line| view! { <p class="status" class:error=is_error>{line}</p> })
        }}
    }
}
