//! 画像入力パネル（カメラ切替・ファイル選択・Gemini切替・抽出ボタン）

use leptos::prelude::*;
use wasm_bindgen::prelude::*;
use web_sys::{File, HtmlInputElement};
use card_scan_common::{AppState, ImageBlob, SelectedFile};

use crate::api::fetch::read_blob;
use crate::api::js_error_message;

#[component]
pub fn SourcePanel<FC, FF, FE>(
    state: RwSignal<AppState>,
    on_toggle_camera: FC,
    on_file_change: FF,
    on_extract: FE,
) -> impl IntoView
where
    FC: Fn(bool) + 'static + Clone + Send + Sync,
    FF: Fn(Option<File>) + 'static + Clone + Send + Sync,
    FE: Fn(()) + 'static + Clone + Send + Sync,
{
    let is_camera = move || state.with(|s| s.mode().is_camera());

    view! {
        <div class="source-panel">
            <label class="checkbox">
                <input
                    type="checkbox"
                    prop:checked=is_camera
                    on:change={
                        let on_toggle_camera = on_toggle_camera.clone();
                        move |ev| on_toggle_camera(event_target_checked(&ev))
                    }
                />
                " Use Camera"
            </label>

            <Show when=move || !is_camera()>
                <input
                    type="file"
                    accept="image/*"
                    on:change={
                        let on_file_change = on_file_change.clone();
                        move |ev: web_sys::Event| {
                            let file = ev
                                .target()
                                .and_then(|t| t.dyn_into::<HtmlInputElement>().ok())
                                .and_then(|input| input.files())
                                .and_then(|files| files.get(0));
                            on_file_change(file);
                        }
                    }
                />
            </Show>

            <label class="checkbox">
                <input
                    type="checkbox"
                    prop:checked=move || state.with(|s| s.use_gemini())
                    on:change=move |ev| {
                        let enabled = event_target_checked(&ev);
                        state.update(|s| s.set_use_gemini(enabled));
                    }
                />
                " Use Gemini"
            </label>

            <button
                class="btn btn-primary"
                disabled=move || state.with(|s| s.is_busy())
                on:click={
                    let on_extract = on_extract.clone();
                    move |_| on_extract(())
                }
            >
                {move || if state.with(|s| s.is_busy()) { "Working..." } else { "Extract" }}
            </button>
        </div>
    }
}

/// 選択されたファイルを読み込む
pub async fn read_file(file: &File) -> Result<SelectedFile, String> {
    let bytes = read_blob(file)
        .await
        .map_err(|e| format!("{}: {}", file.name(), js_error_message(&e)))?;
    Ok(SelectedFile {
        blob: ImageBlob::new(bytes, file.type_()),
        file_name: file.name(),
    })
}
