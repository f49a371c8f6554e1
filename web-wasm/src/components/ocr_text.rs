//! OCRテキスト表示（空のときは出さない）

use leptos::prelude::*;
use card_scan_common::AppState;

#[component]
pub fn OcrText(state: RwSignal<AppState>) -> impl IntoView {
    view! {
        <Show when=move || state.with(|s| !s.ocr_text().is_empty())>
            <details class="ocr-text">
                <summary>"OCR Text"</summary>
                <pre>{move || state.with(|s| s.ocr_text().to_string())}</pre>
            </details>
        </Show>
    }
}
