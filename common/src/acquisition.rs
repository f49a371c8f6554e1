//! 画像取得ステートマシン
//!
//! ファイル選択モードとカメラモードを切り替え、有効な画像入力を1つに保つ。
//! 遷移がカメラ操作を必要とする場合は `CameraCommand` を返すので、
//! 呼び出し側が `MediaCapture` に適用する。

use crate::error::{Error, Result};
use crate::types::{ImageBlob, ImageSource, SelectedFile};

/// 取得モード
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AcquisitionMode {
    #[default]
    FilePicker,
    CameraIdle,
    CameraLive,
    CameraCaptured,
}

impl AcquisitionMode {
    pub fn is_camera(&self) -> bool {
        !matches!(self, AcquisitionMode::FilePicker)
    }
}

/// 遷移に伴って呼び出し側が行うカメラ操作
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CameraCommand {
    /// セッションを解放する
    Release,
    /// セッションを解放してから再取得する
    Restart,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Acquisition {
    mode: AcquisitionMode,
    source: ImageSource,
}

impl Acquisition {
    pub fn mode(&self) -> AcquisitionMode {
        self.mode
    }

    pub fn source(&self) -> &ImageSource {
        &self.source
    }

    pub fn has_image(&self) -> bool {
        !self.source.is_none()
    }

    /// ファイルを選択（ファイル選択モードのみ）
    pub fn select_file(&mut self, file: SelectedFile) -> Result<()> {
        if self.mode != AcquisitionMode::FilePicker {
            return Err(Error::InvalidState("file selection requires file picker mode"));
        }
        tracing::debug!(file_name = %file.file_name, bytes = file.blob.len(), "file selected");
        self.source = ImageSource::SelectedFile(file);
        Ok(())
    }

    /// ファイル入力が空にされた
    pub fn clear_file(&mut self) {
        if self.mode == AcquisitionMode::FilePicker {
            self.source = ImageSource::None;
        }
    }

    /// カメラモードの切り替え
    pub fn set_camera_enabled(&mut self, enabled: bool) -> Option<CameraCommand> {
        if enabled == self.mode.is_camera() {
            return None;
        }
        self.source = ImageSource::None;
        if enabled {
            self.mode = AcquisitionMode::CameraIdle;
            None
        } else {
            self.mode = AcquisitionMode::FilePicker;
            Some(CameraCommand::Release)
        }
    }

    /// カメラの取得に成功した
    ///
    /// 取得待ちの間にカメラモードを抜けていた場合は `false` を返す。
    /// その場合、呼び出し側は取得したストリームを解放すること。
    pub fn camera_started(&mut self) -> bool {
        match self.mode {
            AcquisitionMode::CameraIdle => {
                self.mode = AcquisitionMode::CameraLive;
                true
            }
            AcquisitionMode::CameraLive => true,
            AcquisitionMode::FilePicker | AcquisitionMode::CameraCaptured => false,
        }
    }

    /// カメラの取得・撮影に失敗した
    ///
    /// セッションなしの状態に戻す。ライブ中・撮影後だった場合は
    /// 残っているセッションの解放を求める。
    pub fn camera_failed(&mut self) -> Option<CameraCommand> {
        let command = match self.mode {
            AcquisitionMode::CameraLive | AcquisitionMode::CameraCaptured => {
                Some(CameraCommand::Release)
            }
            AcquisitionMode::FilePicker | AcquisitionMode::CameraIdle => None,
        };
        if self.mode.is_camera() {
            self.mode = AcquisitionMode::CameraIdle;
            self.source = ImageSource::None;
        }
        command
    }

    /// フレームを撮影した（ライブ中のみ有効）
    pub fn frame_captured(&mut self, blob: ImageBlob) -> bool {
        if self.mode != AcquisitionMode::CameraLive {
            return false;
        }
        tracing::debug!(bytes = blob.len(), "frame captured");
        self.mode = AcquisitionMode::CameraCaptured;
        self.source = ImageSource::CapturedFrame(blob);
        true
    }

    /// 撮り直し
    ///
    /// 撮影フレームを破棄し、セッションを張り直す。
    /// 再取得に成功すれば `camera_started` でライブに戻る。
    pub fn retake(&mut self) -> Option<CameraCommand> {
        match self.mode {
            AcquisitionMode::CameraLive | AcquisitionMode::CameraCaptured => {
                self.mode = AcquisitionMode::CameraIdle;
                self.source = ImageSource::None;
                Some(CameraCommand::Restart)
            }
            AcquisitionMode::FilePicker | AcquisitionMode::CameraIdle => None,
        }
    }
}
