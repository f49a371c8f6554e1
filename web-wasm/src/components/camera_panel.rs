//! カメラパネルコンポーネント
//!
//! `<video>` はカメラモード中ずっとマウントしておき、撮影後は非表示にして
//! 撮影画像を重ねる。撮り直しでプレビュー要素が入れ替わらないようにするため。

use leptos::html::Video;
use leptos::prelude::*;
use card_scan_common::{AcquisitionMode, AppState};

#[component]
pub fn CameraPanel<FS, FC, FR>(
    state: RwSignal<AppState>,
    video_ref: NodeRef<Video>,
    preview: ReadSignal<Option<String>>,
    on_start: FS,
    on_capture: FC,
    on_retake: FR,
) -> impl IntoView
where
    FS: Fn(()) + 'static + Clone + Send + Sync,
    FC: Fn(()) + 'static + Clone + Send + Sync,
    FR: Fn(()) + 'static + Clone + Send + Sync,
{
    let mode = move || state.with(|s| s.mode());
    let is_captured = move || mode() == AcquisitionMode::CameraCaptured;

    view! {
        <div class="camera-panel">
            <div class="camera-preview">
                <video
                    node_ref=video_ref
                    style:display=move || if is_captured() { "none" } else { "block" }
                />
                <Show when=is_captured>
                    <img alt="capture" src=move || preview.get().unwrap_or_default() />
                </Show>
            </div>

            <div class="camera-actions">
                <Show when=move || mode() == AcquisitionMode::CameraIdle>
                    <button
                        class="btn btn-secondary"
                        on:click={
                            let on_start = on_start.clone();
                            move |_| on_start(())
                        }
                    >
                        "Start Camera"
                    </button>
                </Show>
                <Show when=move || mode() == AcquisitionMode::CameraLive>
                    <button
                        class="btn btn-primary"
                        on:click={
                            let on_capture = on_capture.clone();
                            move |_| on_capture(())
                        }
                    >
                        "Capture"
                    </button>
                </Show>
                <Show when=move || {
                    matches!(mode(), AcquisitionMode::CameraLive | AcquisitionMode::CameraCaptured)
                }>
                    <button
                        class="btn btn-tertiary"
                        on:click={
                            let on_retake = on_retake.clone();
                            move |_| on_retake(())
                        }
                    >
                        "Stop/Retake"
                    </button>
                </Show>
            </div>

            <small class="text-muted">"Tip: Use the rear camera on mobile for better OCR accuracy."</small>
        </div>
    }
}
