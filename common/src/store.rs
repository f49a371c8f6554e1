//! アプリケーション状態ストア
//!
//! 画像入力・項目・ステータスを1か所に集め、取得ステートマシンの不変条件を守る。
//! 非同期操作は `begin_*` でチケットを受け取り、完了時に `finish_*` へ結果を渡す。
//!
//! 後から始めた操作の表示を古い応答で上書きしないよう、チケットには単調増加の
//! 番号を振る。ステータスは最後に開始した操作の完了だけが書き換え、抽出結果は
//! 最後に開始した抽出のものだけを反映する。実行中の通信は取り消さない。

use serde_json::Value;

use crate::acquisition::{Acquisition, AcquisitionMode, CameraCommand};
use crate::api::{Extraction, SaveForm};
use crate::error::{Error, Result};
use crate::types::{FieldKey, FieldSet, ImageBlob, ImageSource, OperationStatus, SelectedFile};

/// 操作ごとの通し番号
pub type RequestId = u64;

/// 開始済みの抽出
#[derive(Debug, Clone)]
pub struct ExtractTicket {
    pub id: RequestId,
    pub source: ImageSource,
    pub use_gemini: bool,
}

/// 開始済みの保存
#[derive(Debug, Clone)]
pub struct SaveTicket {
    pub id: RequestId,
    pub form: SaveForm,
}

#[derive(Debug, Clone)]
pub struct AppState {
    acquisition: Acquisition,
    fields: FieldSet,
    ocr_text: String,
    use_gemini: bool,
    status: OperationStatus,
    notice: Option<String>,
    last_request: RequestId,
    last_extract: RequestId,
    last_file_read: RequestId,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            acquisition: Acquisition::default(),
            fields: FieldSet::default(),
            ocr_text: String::new(),
            use_gemini: true,
            status: OperationStatus::Idle,
            notice: None,
            last_request: 0,
            last_extract: 0,
            last_file_read: 0,
        }
    }
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn acquisition(&self) -> &Acquisition {
        &self.acquisition
    }

    pub fn mode(&self) -> AcquisitionMode {
        self.acquisition.mode()
    }

    pub fn source(&self) -> &ImageSource {
        self.acquisition.source()
    }

    pub fn fields(&self) -> &FieldSet {
        &self.fields
    }

    pub fn ocr_text(&self) -> &str {
        &self.ocr_text
    }

    pub fn use_gemini(&self) -> bool {
        self.use_gemini
    }

    pub fn status(&self) -> &OperationStatus {
        &self.status
    }

    /// 操作中はアクションボタンを無効にする
    pub fn is_busy(&self) -> bool {
        self.status.is_loading()
    }

    /// 画面下部に出すステータス行
    pub fn status_line(&self) -> Option<String> {
        match &self.status {
            OperationStatus::Error(message) => Some(message.clone()),
            OperationStatus::Loading => None,
            OperationStatus::Idle => self.notice.clone(),
        }
    }

    pub fn edit_field(&mut self, key: FieldKey, value: impl Into<String>) {
        self.fields.set(key, value);
    }

    pub fn set_use_gemini(&mut self, enabled: bool) {
        self.use_gemini = enabled;
    }

    pub fn select_file(&mut self, file: SelectedFile) -> Result<()> {
        self.acquisition.select_file(file)?;
        self.notice = None;
        Ok(())
    }

    /// ファイル読み込みを開始
    ///
    /// 読み込みは非同期なので、後から選んだファイルが先に終わっても
    /// 古い読み込み結果で上書きしないよう番号を振る。
    pub fn begin_file_read(&mut self) -> RequestId {
        self.last_file_read += 1;
        self.last_file_read
    }

    /// ファイル読み込み完了。最新の読み込みでなければ捨てて `Ok(false)`
    pub fn finish_file_read(&mut self, id: RequestId, file: SelectedFile) -> Result<bool> {
        if id != self.last_file_read {
            tracing::warn!(id, latest = self.last_file_read, "stale file read dropped");
            return Ok(false);
        }
        self.select_file(file)?;
        Ok(true)
    }

    pub fn clear_file(&mut self) {
        // 読み込み中のファイルも無効にする
        self.last_file_read += 1;
        self.acquisition.clear_file();
        self.notice = None;
    }

    pub fn set_camera_enabled(&mut self, enabled: bool) -> Option<CameraCommand> {
        self.notice = None;
        self.acquisition.set_camera_enabled(enabled)
    }

    /// カメラ開始成功。ステータスをクリアする
    ///
    /// `false` の場合は取得したストリームを解放すること
    pub fn camera_started(&mut self) -> bool {
        let live = self.acquisition.camera_started();
        if live {
            self.clear_status();
        }
        live
    }

    /// カメラの取得・撮影に失敗した
    ///
    /// `Some(Release)` の場合は残っているセッションを解放すること
    pub fn camera_error(&mut self, err: &Error) -> Option<CameraCommand> {
        let command = self.acquisition.camera_failed();
        tracing::warn!(error = %err, "camera failed");
        self.status = OperationStatus::Error(format!("Camera error: {}", err));
        self.notice = None;
        command
    }

    pub fn frame_captured(&mut self, blob: ImageBlob) -> bool {
        let captured = self.acquisition.frame_captured(blob);
        if captured {
            self.notice = None;
        }
        captured
    }

    pub fn retake(&mut self) -> Option<CameraCommand> {
        self.notice = None;
        self.acquisition.retake()
    }

    /// 抽出を開始
    ///
    /// 画像がなければ通信せずに `Error::NoImage` を返し、ステータスに表示する
    pub fn begin_extract(&mut self) -> Result<ExtractTicket> {
        if !self.acquisition.has_image() {
            let err = Error::NoImage;
            self.status = OperationStatus::Error(err.to_string());
            self.notice = None;
            return Err(err);
        }
        let id = self.next_request();
        self.last_extract = id;
        Ok(ExtractTicket {
            id,
            source: self.acquisition.source().clone(),
            use_gemini: self.use_gemini,
        })
    }

    /// 抽出完了。成功時は項目を丸ごと置き換える
    pub fn finish_extract(&mut self, id: RequestId, result: Result<Extraction>) {
        if id == self.last_extract {
            if let Ok(extraction) = &result {
                self.fields = extraction.fields.clone();
                self.ocr_text = extraction.ocr_text.clone();
            }
        } else {
            tracing::warn!(id, latest = self.last_extract, "stale extract response dropped");
        }
        if let Err(err) = &result {
            if err.is_input_error() {
                tracing::debug!(error = %err, "extract rejected");
            } else {
                tracing::warn!(error = %err, "extract failed");
            }
        }

        if id == self.last_request {
            self.status = match result {
                Ok(_) => OperationStatus::Idle,
                Err(err) => OperationStatus::Error(format!("Extract failed: {}", err)),
            };
        }
    }

    /// 保存を開始（現在の項目のスナップショットを送る）
    pub fn begin_save(&mut self, to_sheet: bool) -> SaveTicket {
        let id = self.next_request();
        SaveTicket { id, form: SaveForm::new(self.fields.clone(), to_sheet) }
    }

    /// 保存完了。応答本文はそのまま表示する
    pub fn finish_save(&mut self, id: RequestId, result: Result<Value>) {
        if id != self.last_request {
            tracing::warn!(id, latest = self.last_request, "stale save response dropped");
            return;
        }
        match result {
            Ok(payload) => {
                self.status = OperationStatus::Idle;
                self.notice = Some(format!("Saved: {}", payload));
            }
            Err(err) => {
                self.status = OperationStatus::Error(format!("Save failed: {}", err));
            }
        }
    }

    fn next_request(&mut self) -> RequestId {
        self.last_request += 1;
        self.status = OperationStatus::Loading;
        self.notice = None;
        tracing::debug!(id = self.last_request, "operation started");
        self.last_request
    }

    fn clear_status(&mut self) {
        self.status = OperationStatus::Idle;
        self.notice = None;
    }
}
