//! ヘッダーコンポーネント

use leptos::prelude::*;

#[component]
pub fn Header() -> impl IntoView {
    view! {
        <header class="header">
            <h1>"Business Card OCR"</h1>
            <p>
                "Upload a visiting card image or scan with your camera, extract fields with OCR and Gemini, then review and save."
            </p>
        </header>
    }
}
