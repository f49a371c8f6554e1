//! 保存ボタンコンポーネント

use leptos::prelude::*;
use card_scan_common::AppState;

#[component]
pub fn SaveButtons<FS>(state: RwSignal<AppState>, on_save: FS) -> impl IntoView
where
    FS: Fn(bool) + 'static + Clone + Send + Sync,
{
    let is_busy = move || state.with(|s| s.is_busy());

    view! {
        <div class="save-buttons">
            <button
                class="btn btn-secondary"
                disabled=is_busy
                on:click={
                    let on_save = on_save.clone();
                    move |_| on_save(false)
                }
            >
                "Save to CSV"
            </button>

            <button
                class="btn btn-secondary"
                disabled=is_busy
                on:click={
                    let on_save = on_save.clone();
                    move |_| on_save(true)
                }
            >
                "Save to CSV + Google Sheet"
            </button>
        </div>
    }
}
