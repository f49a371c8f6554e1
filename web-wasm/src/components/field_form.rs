//! 抽出項目の編集フォーム

use leptos::prelude::*;
use card_scan_common::{AppState, FieldKey};

#[component]
pub fn FieldForm(state: RwSignal<AppState>) -> impl IntoView {
    view! {
        <div class="field-grid">
            {FieldKey::ALL
                .into_iter()
                .map(|field| view! { <FieldInput state=state field=field /> })
                .collect_view()}
        </div>
    }
}

#[component]
fn FieldInput(state: RwSignal<AppState>, field: FieldKey) -> impl IntoView {
    view! {
        <div class="form-group">
            <label for=field.form_key()>{field.label()}</label>
            <input
                type="text"
                id=field.form_key()
                name=field.form_key()
                prop:value=move || state.with(|s| s.fields().get(field).to_string())
                on:input=move |ev| {
                    let value = event_target_value(&ev);
                    state.update(|s| s.edit_field(field, value));
                }
            />
        </div>
    }
}
