//! fetch による抽出・保存エンドポイント呼び出し
//!
//! どちらも multipart/form-data (FormData) で送信する

use async_trait::async_trait;
use card_scan_common::{
    flag_value, ApiBase, CardApi, Error, ExtractResponse, ImageUpload, Result, SaveForm,
};
use serde_json::Value;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::JsFuture;
use web_sys::{Blob, BlobPropertyBag, FormData, Request, RequestInit, RequestMode, Response};

use super::js_error_message;

#[derive(Debug, Clone)]
pub struct FetchApi {
    base: ApiBase,
}

impl FetchApi {
    pub fn new(base: ApiBase) -> Self {
        Self { base }
    }
}

fn network_error(value: JsValue) -> Error {
    Error::Network(js_error_message(&value))
}

/// バイト列からBlobを作成
pub fn blob_from_bytes(bytes: &[u8], mime_type: &str) -> std::result::Result<Blob, JsValue> {
    let array = js_sys::Uint8Array::from(bytes);
    let parts = js_sys::Array::of1(&array);
    let options = BlobPropertyBag::new();
    if !mime_type.is_empty() {
        options.set_type(mime_type);
    }
    Blob::new_with_u8_array_sequence_and_options(&parts, &options)
}

/// Blobの中身を読み出す
pub async fn read_blob(blob: &Blob) -> std::result::Result<Vec<u8>, JsValue> {
    let buffer = JsFuture::from(blob.array_buffer()).await?;
    Ok(js_sys::Uint8Array::new(&buffer).to_vec())
}

fn extract_form(upload: &ImageUpload, use_gemini: bool) -> std::result::Result<FormData, JsValue> {
    let form = FormData::new()?;
    let blob = blob_from_bytes(&upload.bytes, &upload.mime_type)?;
    form.append_with_blob_and_filename("file", &blob, &upload.file_name)?;
    form.append_with_str("use_gemini", flag_value(use_gemini))?;
    Ok(form)
}

fn save_form(save: &SaveForm) -> std::result::Result<FormData, JsValue> {
    let form = FormData::new()?;
    for (key, value) in save.pairs() {
        form.append_with_str(key, &value)?;
    }
    Ok(form)
}

/// POSTして本文を返す。成功以外のステータスは本文ごと `Error::Remote`
async fn post_form(url: &str, form: &FormData) -> Result<String> {
    let opts = RequestInit::new();
    opts.set_method("POST");
    opts.set_mode(RequestMode::Cors);
    opts.set_body(form.as_ref());

    let request = Request::new_with_str_and_init(url, &opts).map_err(network_error)?;

    let window = web_sys::window().ok_or_else(|| Error::Network("window is not available".to_string()))?;
    let resp_value = JsFuture::from(window.fetch_with_request(&request))
        .await
        .map_err(network_error)?;
    let resp: Response = resp_value.dyn_into().map_err(network_error)?;

    let text = JsFuture::from(resp.text().map_err(network_error)?)
        .await
        .map_err(network_error)?
        .as_string()
        .unwrap_or_default();

    if !resp.ok() {
        return Err(Error::Remote { status: resp.status(), body: text });
    }
    Ok(text)
}

#[async_trait(?Send)]
impl CardApi for FetchApi {
    async fn post_extract(&self, upload: &ImageUpload, use_gemini: bool) -> Result<ExtractResponse> {
        let form = extract_form(upload, use_gemini).map_err(network_error)?;
        let text = post_form(&self.base.extract_url(), &form).await?;
        ExtractResponse::from_json(&text)
    }

    async fn post_save(&self, save: &SaveForm) -> Result<Value> {
        let form = save_form(save).map_err(network_error)?;
        let text = post_form(&self.base.save_url(), &form).await?;
        Ok(serde_json::from_str(&text)?)
    }
}
