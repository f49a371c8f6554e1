//! 画像ファイルの読み込み（ファイルピッカー相当）

use card_scan_common::{ImageBlob, SelectedFile};
use image::ImageFormat;
use std::path::Path;

use crate::error::{CardScanError, Result};

/// 画像ファイルを読み込み、中身からMIMEタイプを判定する
pub fn load_image_file(path: &Path) -> Result<SelectedFile> {
    if !path.is_file() {
        return Err(CardScanError::FileNotFound(path.display().to_string()));
    }

    let bytes = std::fs::read(path)?;
    let format = image::guess_format(&bytes)
        .map_err(|e| CardScanError::ImageLoad(format!("{}: {}", path.display(), e)))?;

    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| "image".to_string());

    Ok(SelectedFile {
        blob: ImageBlob::new(bytes, mime_type(format)),
        file_name,
    })
}

pub fn mime_type(format: ImageFormat) -> &'static str {
    format.to_mime_type()
}
