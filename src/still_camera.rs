//! 静止画カメラ
//!
//! 画像ファイルの内容をライブ映像とみなして返す `CameraBackend`。
//! カメラのない環境で撮影フローを通すために使う。

use async_trait::async_trait;
use card_scan_common::{CameraBackend, Error, Facing, FrameSize, ImageBlob};
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::{DynamicImage, RgbImage};
use std::path::Path;
use std::sync::Arc;

use crate::error::{CardScanError, Result};

#[derive(Clone)]
pub struct StillCamera {
    frame: Arc<DynamicImage>,
}

/// 取得中のストリーム
pub struct StillStream {
    frame: Arc<DynamicImage>,
    released: bool,
}

impl StillStream {
    pub fn is_released(&self) -> bool {
        self.released
    }
}

impl StillCamera {
    pub fn new(frame: DynamicImage) -> Self {
        Self { frame: Arc::new(frame) }
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        if !path.is_file() {
            return Err(CardScanError::FileNotFound(path.display().to_string()));
        }
        let frame = image::open(path)
            .map_err(|e| CardScanError::ImageLoad(format!("{}: {}", path.display(), e)))?;
        Ok(Self::new(frame))
    }
}

#[async_trait(?Send)]
impl CameraBackend for StillCamera {
    type Stream = StillStream;
    type Raster = RgbImage;

    async fn open(&self, facing: Facing) -> card_scan_common::Result<StillStream> {
        tracing::debug!(facing = facing.facing_mode(), "still camera opened");
        Ok(StillStream { frame: Arc::clone(&self.frame), released: false })
    }

    fn release(&self, stream: &mut StillStream) {
        stream.released = true;
    }

    fn native_size(&self, stream: &StillStream) -> Option<FrameSize> {
        Some(FrameSize { width: stream.frame.width(), height: stream.frame.height() })
    }

    fn draw(&self, stream: &StillStream, size: FrameSize) -> card_scan_common::Result<RgbImage> {
        if stream.released {
            return Err(Error::Device("stream already released".to_string()));
        }
        let rgb = stream.frame.to_rgb8();
        if rgb.width() == size.width && rgb.height() == size.height {
            return Ok(rgb);
        }
        Ok(image::imageops::resize(&rgb, size.width, size.height, FilterType::Triangle))
    }

    async fn encode_jpeg(&self, raster: RgbImage, quality: f64) -> card_scan_common::Result<ImageBlob> {
        let quality = (quality * 100.0).round().clamp(1.0, 100.0) as u8;
        let mut bytes = Vec::new();
        JpegEncoder::new_with_quality(&mut bytes, quality)
            .encode_image(&raster)
            .map_err(|e| Error::Device(format!("frame encoding failed: {}", e)))?;
        Ok(ImageBlob::jpeg(bytes))
    }
}
