//! メインアプリケーションコンポーネント
//!
//! 画面状態は `AppState` 1つにまとめ、各ハンドラは遷移の適用と
//! 非同期処理の起動だけを行う。カメラのセッションは `MediaCapture` が保持し、
//! アンマウント時に必ず解放する。

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use card_scan_common::{
    extract, save, AppState, CameraBackend, CameraCommand, Error, Facing, ImageBlob, MediaCapture,
    JPEG_QUALITY,
};
use gloo::console;
use leptos::html::Video;
use leptos::prelude::*;
use leptos::task::spawn_local;
use web_sys::File;

use crate::api::FetchApi;
use crate::camera::WebCamera;
use crate::components::{
    camera_panel::CameraPanel,
    field_form::FieldForm,
    header::Header,
    ocr_text::OcrText,
    save_buttons::SaveButtons,
    source_panel::{read_file, SourcePanel},
    status_line::StatusLine,
};
use crate::config;

/// 撮影画像のプレビュー用Data URL
pub fn to_data_url(blob: &ImageBlob) -> String {
    format!("data:{};base64,{}", blob.mime_type, STANDARD.encode(&blob.bytes))
}

#[component]
pub fn App() -> impl IntoView {
    let state = RwSignal::new(AppState::new());
    let (preview, set_preview) = signal(None::<String>);
    let video_ref = NodeRef::<Video>::new();
    let camera = StoredValue::new_local(MediaCapture::new(WebCamera::new(video_ref)));
    let api = StoredValue::new(FetchApi::new(config::api_base()));

    // アンマウント時にカメラを解放
    on_cleanup(move || {
        camera.try_update_value(|c| c.stop());
    });

    let stop_camera = move || {
        camera.try_update_value(|c| c.stop());
    };

    // 失敗時はセッションなしに戻し、残っているストリームを止める
    let fail_camera = move |err: &Error| {
        let mut command = None;
        state.update(|s| command = s.camera_error(err));
        if command == Some(CameraCommand::Release) {
            stop_camera();
        }
    };

    // カメラ開始（許可待ちの間は借用を持たない）
    let start_camera = move || {
        let Some(backend) = camera.try_with_value(|c| *c.backend()) else {
            return;
        };
        spawn_local(async move {
            match backend.open(Facing::Rear).await {
                Ok(stream) => {
                    let mut live = false;
                    state.update(|s| live = s.camera_started());
                    let mut pending = Some(stream);
                    if live {
                        camera.try_update_value(|c| {
                            if let Some(stream) = pending.take() {
                                c.attach(stream);
                            }
                        });
                    }
                    // 待っている間にカメラモードを抜けた・アンマウントされた
                    if let Some(mut stream) = pending {
                        backend.release(&mut stream);
                    }
                }
                Err(err) => {
                    console::error!("Camera error:", err.to_string());
                    fail_camera(&err);
                }
            }
        });
    };

    let on_toggle_camera = move |enabled: bool| {
        let mut command = None;
        state.update(|s| command = s.set_camera_enabled(enabled));
        set_preview.set(None);
        if command == Some(CameraCommand::Release) {
            stop_camera();
        }
    };

    let on_file_change = move |file: Option<File>| {
        let Some(file) = file else {
            state.update(|s| s.clear_file());
            return;
        };
        let mut id = 0;
        state.update(|s| id = s.begin_file_read());
        spawn_local(async move {
            match read_file(&file).await {
                Ok(selected) => state.update(|s| {
                    if let Err(err) = s.finish_file_read(id, selected) {
                        console::warn!("File ignored:", err.to_string());
                    }
                }),
                Err(message) => console::error!("File read failed:", message),
            }
        });
    };

    let on_start = move |_: ()| start_camera();

    let on_capture = move |_: ()| {
        let Some(raster) = camera.try_with_value(|c| c.draw_frame()).flatten() else {
            return;
        };
        let Some(backend) = camera.try_with_value(|c| *c.backend()) else {
            return;
        };
        spawn_local(async move {
            let encoded = match raster {
                Ok(raster) => backend.encode_jpeg(raster, JPEG_QUALITY).await,
                Err(err) => Err(err),
            };
            match encoded {
                Ok(blob) => {
                    let url = to_data_url(&blob);
                    let mut captured = false;
                    state.update(|s| captured = s.frame_captured(blob));
                    if captured {
                        set_preview.set(Some(url));
                    }
                }
                Err(err) => {
                    console::error!("Capture failed:", err.to_string());
                    fail_camera(&err);
                }
            }
        });
    };

    let on_retake = move |_: ()| {
        let mut command = None;
        state.update(|s| command = s.retake());
        set_preview.set(None);
        if command == Some(CameraCommand::Restart) {
            stop_camera();
            start_camera();
        }
    };

    let on_extract = move |_: ()| {
        let mut ticket = None;
        state.update(|s| ticket = Some(s.begin_extract()));
        let ticket = match ticket {
            Some(Ok(ticket)) => ticket,
            Some(Err(err)) => {
                if err.is_input_error() {
                    console::warn!("Extract blocked:", err.to_string());
                } else {
                    console::error!("Extract blocked:", err.to_string());
                }
                return;
            }
            None => return,
        };
        let Some(api) = api.try_get_value() else {
            return;
        };
        spawn_local(async move {
            let result = extract(&api, &ticket.source, ticket.use_gemini).await;
            if let Err(err) = &result {
                console::error!("Extract failed:", err.to_string());
            }
            state.update(|s| s.finish_extract(ticket.id, result));
        });
    };

    let on_save = move |to_sheet: bool| {
        let mut ticket = None;
        state.update(|s| ticket = Some(s.begin_save(to_sheet)));
        let (Some(ticket), Some(api)) = (ticket, api.try_get_value()) else {
            return;
        };
        spawn_local(async move {
            let result = save(&api, &ticket.form.fields, ticket.form.to_sheet).await;
            if let Err(err) = &result {
                console::error!("Save failed:", err.to_string());
            }
            state.update(|s| s.finish_save(ticket.id, result));
        });
    };

    view! {
        <div class="container">
            <Header />

            <SourcePanel
                state=state
                on_toggle_camera=on_toggle_camera
                on_file_change=on_file_change
                on_extract=on_extract
            />

            <Show when=move || state.with(|s| s.mode().is_camera())>
                <CameraPanel
                    state=state
                    video_ref=video_ref
                    preview=preview
                    on_start=on_start
                    on_capture=on_capture
                    on_retake=on_retake
                />
            </Show>

            <OcrText state=state />

            <FieldForm state=state />

            <SaveButtons state=state on_save=on_save />

            <StatusLine state=state />
        </div>
    }
}
