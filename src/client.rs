//! 抽出・保存エンドポイントのネイティブクライアント（reqwest）

use async_trait::async_trait;
use card_scan_common::{
    flag_value, CardApi, Error, ExtractResponse, ImageUpload, SaveForm,
};
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Response};
use serde_json::Value;
use std::time::Duration;

use crate::config::ClientConfig;
use crate::error::{CardScanError, Result};

#[derive(Debug, Clone)]
pub struct HttpCardApi {
    client: Client,
    config: ClientConfig,
}

impl HttpCardApi {
    pub fn new(config: ClientConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| CardScanError::HttpClient(e.to_string()))?;
        Ok(Self { client, config })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// `GET /health` が `{"status":"ok"}` を返すか
    pub async fn check_health(&self) -> card_scan_common::Result<bool> {
        let response = self
            .client
            .get(self.config.api_base.health_url())
            .send()
            .await
            .map_err(network_error)?;
        let text = success_body(response).await?;
        let value: Value = serde_json::from_str(&text)?;
        Ok(value.get("status").and_then(Value::as_str) == Some("ok"))
    }
}

fn network_error(err: reqwest::Error) -> Error {
    tracing::warn!(error = %err, "request did not complete");
    Error::Network(err.to_string())
}

/// 成功以外のステータスは本文ごと `Error::Remote` にする
async fn success_body(response: Response) -> card_scan_common::Result<String> {
    let status = response.status();
    let body = response.text().await.map_err(network_error)?;
    if !status.is_success() {
        tracing::warn!(status = status.as_u16(), "remote returned error");
        return Err(Error::Remote { status: status.as_u16(), body });
    }
    Ok(body)
}

/// MIMEタイプが不正・空の場合は Content-Type なしで送る
fn file_part(upload: &ImageUpload) -> Part {
    let part = || Part::bytes(upload.bytes.clone()).file_name(upload.file_name.clone());
    part().mime_str(&upload.mime_type).unwrap_or_else(|_| part())
}

#[async_trait(?Send)]
impl CardApi for HttpCardApi {
    async fn post_extract(
        &self,
        upload: &ImageUpload,
        use_gemini: bool,
    ) -> card_scan_common::Result<ExtractResponse> {
        let form = Form::new()
            .part("file", file_part(upload))
            .text("use_gemini", flag_value(use_gemini));

        let response = self
            .client
            .post(self.config.api_base.extract_url())
            .multipart(form)
            .send()
            .await
            .map_err(network_error)?;

        let text = success_body(response).await?;
        ExtractResponse::from_json(&text)
    }

    async fn post_save(&self, save: &SaveForm) -> card_scan_common::Result<Value> {
        let form = save
            .pairs()
            .into_iter()
            .fold(Form::new(), |form, (key, value)| form.text(key, value));

        let response = self
            .client
            .post(self.config.api_base.save_url())
            .multipart(form)
            .send()
            .await
            .map_err(network_error)?;

        let text = success_body(response).await?;
        Ok(serde_json::from_str(&text)?)
    }
}
