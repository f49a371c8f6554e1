//! getUserMedia によるカメラ実装

use async_trait::async_trait;
use card_scan_common::{CameraBackend, Error, Facing, FrameSize, ImageBlob, Result, JPEG_MIME};
use leptos::html::Video;
use leptos::prelude::*;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::JsFuture;
use web_sys::{
    Blob, CanvasRenderingContext2d, HtmlCanvasElement, HtmlVideoElement, MediaStream,
    MediaStreamConstraints, MediaStreamTrack,
};

use crate::api::fetch::read_blob;
use crate::api::js_error_message;

/// プレビュー用 `<video>` に接続するカメラ
#[derive(Clone, Copy)]
pub struct WebCamera {
    video: NodeRef<Video>,
}

/// 取得中のメディアストリームと接続先のプレビュー
pub struct WebStream {
    stream: MediaStream,
    video: HtmlVideoElement,
}

impl WebCamera {
    pub fn new(video: NodeRef<Video>) -> Self {
        Self { video }
    }
}

fn device_error(value: JsValue) -> Error {
    Error::Device(js_error_message(&value))
}

fn stop_tracks(stream: &MediaStream) {
    for track in stream.get_tracks().iter() {
        if let Ok(track) = track.dyn_into::<MediaStreamTrack>() {
            track.stop();
        }
    }
}

async fn request_stream(facing: Facing) -> std::result::Result<MediaStream, JsValue> {
    let window = web_sys::window().ok_or_else(|| JsValue::from_str("window is not available"))?;
    let devices = window.navigator().media_devices()?;

    let video = js_sys::Object::new();
    js_sys::Reflect::set(&video, &"facingMode".into(), &facing.facing_mode().into())?;

    let constraints = MediaStreamConstraints::new();
    constraints.set_video(&video);
    constraints.set_audio(&JsValue::FALSE);

    let stream = JsFuture::from(devices.get_user_media_with_constraints(&constraints)?).await?;
    stream.dyn_into::<MediaStream>()
}

#[async_trait(?Send)]
impl CameraBackend for WebCamera {
    type Stream = WebStream;
    type Raster = HtmlCanvasElement;

    async fn open(&self, facing: Facing) -> Result<WebStream> {
        let stream = request_stream(facing).await.map_err(device_error)?;

        // 許可ダイアログの間にプレビューが外れていることがある
        let Some(video) = self.video.get_untracked() else {
            stop_tracks(&stream);
            return Err(Error::Device("camera preview is not mounted".to_string()));
        };

        video.set_muted(true);
        let _ = video.set_attribute("playsinline", "");
        video.set_src_object(Some(&stream));

        let played = match video.play() {
            Ok(promise) => JsFuture::from(promise).await.map(|_| ()),
            Err(err) => Err(err),
        };
        let mut session = WebStream { stream, video };
        if let Err(err) = played {
            self.release(&mut session);
            return Err(device_error(err));
        }
        Ok(session)
    }

    fn release(&self, stream: &mut WebStream) {
        stop_tracks(&stream.stream);
        let _ = stream.video.pause();
        stream.video.set_src_object(None);
    }

    fn native_size(&self, stream: &WebStream) -> Option<FrameSize> {
        Some(FrameSize {
            width: stream.video.video_width(),
            height: stream.video.video_height(),
        })
    }

    fn draw(&self, stream: &WebStream, size: FrameSize) -> Result<HtmlCanvasElement> {
        let document = web_sys::window()
            .and_then(|w| w.document())
            .ok_or_else(|| Error::Device("document is not available".to_string()))?;

        let canvas: HtmlCanvasElement = document
            .create_element("canvas")
            .map_err(device_error)?
            .dyn_into()
            .map_err(|_| Error::Device("canvas is not available".to_string()))?;
        canvas.set_width(size.width);
        canvas.set_height(size.height);

        let context: CanvasRenderingContext2d = canvas
            .get_context("2d")
            .map_err(device_error)?
            .ok_or_else(|| Error::Device("2d context is not available".to_string()))?
            .dyn_into()
            .map_err(|_| Error::Device("2d context is not available".to_string()))?;

        context
            .draw_image_with_html_video_element_and_dw_and_dh(
                &stream.video,
                0.0,
                0.0,
                f64::from(size.width),
                f64::from(size.height),
            )
            .map_err(device_error)?;

        Ok(canvas)
    }

    async fn encode_jpeg(&self, canvas: HtmlCanvasElement, quality: f64) -> Result<ImageBlob> {
        let promise = js_sys::Promise::new(&mut |resolve, reject| {
            let callback = Closure::once_into_js(move |blob: JsValue| {
                let _ = resolve.call1(&JsValue::NULL, &blob);
            });
            if let Err(err) = canvas.to_blob_with_type_and_encoder_options(
                callback.unchecked_ref(),
                JPEG_MIME,
                &JsValue::from_f64(quality),
            ) {
                let _ = reject.call1(&JsValue::NULL, &err);
            }
        });

        let blob = JsFuture::from(promise).await.map_err(device_error)?;
        if blob.is_null() || blob.is_undefined() {
            return Err(Error::Device("frame encoding failed".to_string()));
        }
        let blob: Blob = blob
            .dyn_into()
            .map_err(|_| Error::Device("frame encoding failed".to_string()))?;

        let bytes = read_blob(&blob).await.map_err(device_error)?;
        Ok(ImageBlob::jpeg(bytes))
    }
}
