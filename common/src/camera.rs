//! カメラ取得アダプタ
//!
//! カメラデバイスへのアクセスは `CameraBackend` に抽象化し、
//! セッション（ストリーム）の排他所有と解放は `MediaCapture` が受け持つ。
//! `MediaCapture` を破棄すると必ずセッションが解放される。

use async_trait::async_trait;

use crate::error::Result;
use crate::types::ImageBlob;

/// ネイティブ解像度が取れない場合のフレームサイズ
pub const FALLBACK_FRAME_SIZE: FrameSize = FrameSize { width: 1280, height: 720 };

/// 撮影フレームのJPEG品質
pub const JPEG_QUALITY: f64 = 0.92;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameSize {
    pub width: u32,
    pub height: u32,
}

impl FrameSize {
    /// 幅・高さのどちらかが0ならフォールバックを使う
    pub fn or_fallback(size: Option<FrameSize>) -> FrameSize {
        match size {
            Some(size) if size.width > 0 && size.height > 0 => size,
            _ => FALLBACK_FRAME_SIZE,
        }
    }
}

/// カメラの向き
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Facing {
    #[default]
    Rear,
    Front,
}

impl Facing {
    /// getUserMedia の facingMode 値
    pub fn facing_mode(&self) -> &'static str {
        match self {
            Facing::Rear => "environment",
            Facing::Front => "user",
        }
    }
}

/// プラットフォームごとのカメラ実装
#[async_trait(?Send)]
pub trait CameraBackend {
    type Stream;
    type Raster;

    /// ストリームを取得してプレビューに接続する
    async fn open(&self, facing: Facing) -> Result<Self::Stream>;

    /// すべてのトラックを停止し、プレビューから切り離す
    fn release(&self, stream: &mut Self::Stream);

    fn native_size(&self, stream: &Self::Stream) -> Option<FrameSize>;

    /// 現在のフレームをラスタ面に描画する
    fn draw(&self, stream: &Self::Stream, size: FrameSize) -> Result<Self::Raster>;

    async fn encode_jpeg(&self, raster: Self::Raster, quality: f64) -> Result<ImageBlob>;
}

pub struct MediaCapture<B: CameraBackend> {
    backend: B,
    session: Option<B::Stream>,
}

impl<B: CameraBackend> MediaCapture<B> {
    pub fn new(backend: B) -> Self {
        Self { backend, session: None }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn is_live(&self) -> bool {
        self.session.is_some()
    }

    /// 背面カメラでセッションを開始
    ///
    /// 既存のセッションは先に解放する。失敗時はセッションなしのまま。
    pub async fn start(&mut self) -> Result<()> {
        self.stop();
        let stream = self.backend.open(Facing::Rear).await?;
        self.attach(stream);
        Ok(())
    }

    /// 取得済みのストリームをセッションとして保持する
    pub fn attach(&mut self, stream: B::Stream) {
        self.stop();
        tracing::debug!("camera session attached");
        self.session = Some(stream);
    }

    /// セッションを解放（セッションがなければ何もしない）
    pub fn stop(&mut self) {
        if let Some(mut stream) = self.session.take() {
            self.backend.release(&mut stream);
            tracing::debug!("camera session released");
        }
    }

    /// 現在のフレームをネイティブ解像度で描画（セッションがなければ `None`）
    pub fn draw_frame(&self) -> Option<Result<B::Raster>> {
        let stream = self.session.as_ref()?;
        let size = FrameSize::or_fallback(self.backend.native_size(stream));
        Some(self.backend.draw(stream, size))
    }

    /// フレームを撮影してJPEGにエンコード
    pub async fn capture_frame(&self) -> Result<Option<ImageBlob>> {
        let Some(raster) = self.draw_frame().transpose()? else {
            return Ok(None);
        };
        let blob = self.backend.encode_jpeg(raster, JPEG_QUALITY).await?;
        Ok(Some(blob))
    }
}

impl<B: CameraBackend> Drop for MediaCapture<B> {
    fn drop(&mut self) {
        self.stop();
    }
}
