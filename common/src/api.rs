//! 抽出・保存エンドポイントとの契約
//!
//! - `POST {base}/api/extract`: multipart (`file`, `use_gemini`)
//! - `POST {base}/api/save`: multipart (6項目 + `to_csv`, `to_sheet`)
//!
//! 通信手段は `CardApi` の実装（ブラウザは fetch、ネイティブは reqwest）に任せる。

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{Map, Value};

use crate::error::{Error, Result};
use crate::types::{FieldKey, FieldSet, ImageSource, ImageUpload};

pub const EXTRACT_PATH: &str = "/api/extract";
pub const SAVE_PATH: &str = "/api/save";
pub const HEALTH_PATH: &str = "/health";

/// APIのベースURL（空文字は同一オリジン）
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ApiBase(String);

impl ApiBase {
    /// 末尾のスラッシュを取り除いて保持する
    pub fn new(raw: &str) -> Self {
        Self(raw.trim().trim_end_matches('/').to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_same_origin(&self) -> bool {
        self.0.is_empty()
    }

    pub fn extract_url(&self) -> String {
        format!("{}{}", self.0, EXTRACT_PATH)
    }

    pub fn save_url(&self) -> String {
        format!("{}{}", self.0, SAVE_PATH)
    }

    pub fn health_url(&self) -> String {
        format!("{}{}", self.0, HEALTH_PATH)
    }
}

/// 抽出エンドポイントのレスポンス
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ExtractResponse {
    #[serde(deserialize_with = "string_or_default")]
    pub ocr_text: String,
    #[serde(deserialize_with = "map_or_default")]
    pub fields: Map<String, Value>,
}

impl ExtractResponse {
    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// 既知の6キーをそれぞれ独立に読み出す
    ///
    /// 欠けたキーは空文字になる（前回値とはマージしない）
    pub fn into_extraction(self) -> Extraction {
        let mut fields = FieldSet::default();
        for key in FieldKey::ALL {
            if let Some(value) = get_string(&self.fields, key.label()) {
                fields.set(key, value);
            }
        }
        Extraction { ocr_text: self.ocr_text, fields }
    }
}

/// 抽出結果
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Extraction {
    pub ocr_text: String,
    pub fields: FieldSet,
}

fn string_or_default<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::String(s)) => s,
        Some(Value::Null) | None => String::new(),
        Some(other) => other.to_string(),
    })
}

fn map_or_default<'de, D>(deserializer: D) -> std::result::Result<Map<String, Value>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::Object(map)) => map,
        _ => Map::new(),
    })
}

fn get_string(map: &Map<String, Value>, key: &str) -> Option<String> {
    let value = map.get(key)?;
    if let Some(s) = value.as_str() {
        return Some(s.to_string());
    }
    if value.is_null() {
        return None;
    }
    Some(value.to_string())
}

/// 保存エンドポイントへ送るフォーム
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveForm {
    pub fields: FieldSet,
    pub to_sheet: bool,
}

impl SaveForm {
    pub fn new(fields: FieldSet, to_sheet: bool) -> Self {
        Self { fields, to_sheet }
    }

    /// 送信順の (キー, 値)。`to_csv` は常に `"true"`
    pub fn pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs: Vec<(&'static str, String)> = self
            .fields
            .iter()
            .map(|(key, value)| (key.form_key(), value.to_string()))
            .collect();
        pairs.push(("to_csv", "true".to_string()));
        pairs.push(("to_sheet", self.to_sheet.to_string()));
        pairs
    }
}

/// `use_gemini` フォーム値
pub fn flag_value(flag: bool) -> &'static str {
    if flag { "true" } else { "false" }
}

/// エンドポイントへの送信手段
///
/// 実装は成功以外のステータスを `Error::Remote`、
/// 通信失敗を `Error::Network` として返すこと。
#[async_trait(?Send)]
pub trait CardApi {
    async fn post_extract(&self, upload: &ImageUpload, use_gemini: bool) -> Result<ExtractResponse>;

    async fn post_save(&self, form: &SaveForm) -> Result<Value>;
}

/// 画像から項目を抽出
///
/// 画像がなければネットワークに出る前に `Error::NoImage` を返す
pub async fn extract<A>(api: &A, source: &ImageSource, use_gemini: bool) -> Result<Extraction>
where
    A: CardApi + ?Sized,
{
    let upload = source.upload().ok_or(Error::NoImage)?;
    tracing::debug!(file_name = %upload.file_name, bytes = upload.bytes.len(), use_gemini, "extract request");
    let response = api.post_extract(&upload, use_gemini).await?;
    Ok(response.into_extraction())
}

/// 項目を保存（再試行なし）
pub async fn save<A>(api: &A, fields: &FieldSet, to_sheet: bool) -> Result<Value>
where
    A: CardApi + ?Sized,
{
    let form = SaveForm::new(fields.clone(), to_sheet);
    tracing::debug!(to_sheet, "save request");
    api.post_save(&form).await
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::types::{ImageBlob, SelectedFile};
    use futures::executor::block_on;
    use std::cell::RefCell;

    /// 呼び出しを記録するフェイク
    #[derive(Default)]
    pub(crate) struct FakeApi {
        pub extract_response: Option<String>,
        pub remote_error: Option<(u16, String)>,
        pub save_response: Value,
        pub extract_calls: RefCell<Vec<(ImageUpload, bool)>>,
        pub save_calls: RefCell<Vec<SaveForm>>,
    }

    #[async_trait(?Send)]
    impl CardApi for FakeApi {
        async fn post_extract(&self, upload: &ImageUpload, use_gemini: bool) -> Result<ExtractResponse> {
            self.extract_calls.borrow_mut().push((upload.clone(), use_gemini));
            if let Some((status, body)) = &self.remote_error {
                return Err(Error::Remote { status: *status, body: body.clone() });
            }
            ExtractResponse::from_json(self.extract_response.as_deref().unwrap_or("{}"))
        }

        async fn post_save(&self, form: &SaveForm) -> Result<Value> {
            self.save_calls.borrow_mut().push(form.clone());
            if let Some((status, body)) = &self.remote_error {
                return Err(Error::Remote { status: *status, body: body.clone() });
            }
            Ok(self.save_response.clone())
        }
    }

    fn selected() -> ImageSource {
        ImageSource::SelectedFile(SelectedFile {
            blob: ImageBlob::new(vec![9, 9, 9], "image/png"),
            file_name: "card.png".to_string(),
        })
    }

    #[test]
    fn test_api_base_trims_trailing_slashes() {
        let base = ApiBase::new("https://api.example.com///");
        assert_eq!(base.extract_url(), "https://api.example.com/api/extract");
        assert_eq!(base.save_url(), "https://api.example.com/api/save");
        assert_eq!(base.health_url(), "https://api.example.com/health");
    }

    #[test]
    fn test_api_base_empty_is_same_origin() {
        let base = ApiBase::new("");
        assert!(base.is_same_origin());
        assert_eq!(base.extract_url(), "/api/extract");
    }

    #[test]
    fn test_extract_partial_fields_resets_others() {
        let response = ExtractResponse::from_json(r#"{"fields":{"Name":"Jane"}}"#).unwrap();
        let extraction = response.into_extraction();
        assert_eq!(extraction.fields.name, "Jane");
        for key in FieldKey::ALL.into_iter().skip(1) {
            assert_eq!(extraction.fields.get(key), "");
        }
        assert_eq!(extraction.ocr_text, "");
    }

    #[test]
    fn test_extract_missing_fields_is_all_empty() {
        let extraction = ExtractResponse::from_json(r#"{"ocr_text":"JANE DOE"}"#)
            .unwrap()
            .into_extraction();
        assert!(extraction.fields.is_empty());
        assert_eq!(extraction.ocr_text, "JANE DOE");
    }

    #[test]
    fn test_extract_ignores_unknown_and_lowercase_keys() {
        let extraction = ExtractResponse::from_json(
            r#"{"fields":{"Designation":"CTO","name":"lower","Email":"a@b.c"}}"#,
        )
        .unwrap()
        .into_extraction();
        assert_eq!(extraction.fields.name, "");
        assert_eq!(extraction.fields.email, "a@b.c");
    }

    #[test]
    fn test_extract_null_and_non_string_values() {
        let extraction = ExtractResponse::from_json(
            r#"{"ocr_text":null,"fields":{"Name":null,"Phone":5551234}}"#,
        )
        .unwrap()
        .into_extraction();
        assert_eq!(extraction.ocr_text, "");
        assert_eq!(extraction.fields.name, "");
        assert_eq!(extraction.fields.phone, "5551234");
    }

    #[test]
    fn test_extract_fields_not_an_object() {
        let extraction = ExtractResponse::from_json(r#"{"fields":"oops"}"#)
            .unwrap()
            .into_extraction();
        assert!(extraction.fields.is_empty());
    }

    #[test]
    fn test_extract_invalid_json() {
        let result = ExtractResponse::from_json("<html>");
        assert!(matches!(result, Err(Error::Json(_))));
    }

    #[test]
    fn test_save_form_pairs() {
        let mut fields = FieldSet::default();
        fields.name = "Jane".to_string();
        let pairs = SaveForm::new(fields, false).pairs();
        let keys: Vec<&str> = pairs.iter().map(|(k, _)| *k).collect();
        assert_eq!(
            keys,
            vec!["name", "phone", "email", "company", "address", "website", "to_csv", "to_sheet"]
        );
        assert_eq!(pairs[0].1, "Jane");
        assert_eq!(pairs[6].1, "true");
        assert_eq!(pairs[7].1, "false");
    }

    #[test]
    fn test_save_form_to_sheet_true() {
        let pairs = SaveForm::new(FieldSet::default(), true).pairs();
        assert!(pairs.contains(&("to_csv", "true".to_string())));
        assert!(pairs.contains(&("to_sheet", "true".to_string())));
    }

    #[test]
    fn test_extract_without_image_makes_no_call() {
        let api = FakeApi::default();
        let result = block_on(extract(&api, &ImageSource::None, true));
        assert!(matches!(result, Err(Error::NoImage)));
        assert!(api.extract_calls.borrow().is_empty());
    }

    #[test]
    fn test_extract_sends_upload_and_flag() {
        let api = FakeApi {
            extract_response: Some(r#"{"ocr_text":"t","fields":{"Company":"Acme"}}"#.to_string()),
            ..Default::default()
        };
        let extraction = block_on(extract(&api, &selected(), false)).expect("抽出失敗");
        assert_eq!(extraction.fields.company, "Acme");

        let calls = api.extract_calls.borrow();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0.file_name, "card.png");
        assert!(!calls[0].1);
    }

    #[test]
    fn test_extract_remote_error_passthrough() {
        let api = FakeApi {
            remote_error: Some((500, "ocr timeout".to_string())),
            ..Default::default()
        };
        let err = block_on(extract(&api, &selected(), true)).unwrap_err();
        assert!(matches!(err, Error::Remote { status: 500, .. }));
        assert_eq!(err.to_string(), "ocr timeout");
    }

    #[test]
    fn test_save_single_attempt() {
        let api = FakeApi {
            remote_error: Some((400, "Google credentials missing".to_string())),
            ..Default::default()
        };
        let result = block_on(save(&api, &FieldSet::default(), true));
        assert!(result.is_err());
        let calls = api.save_calls.borrow();
        assert_eq!(calls.len(), 1);
        assert!(calls[0].to_sheet);
    }

    #[test]
    fn test_flag_value() {
        assert_eq!(flag_value(true), "true");
        assert_eq!(flag_value(false), "false");
    }
}
