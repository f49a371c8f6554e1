//! エラー型定義
//!
//! すべてのエラーは操作の境界（抽出・保存・カメラ起動）でステータス文字列に変換される。

use thiserror::Error;

/// 共通エラー型
#[derive(Error, Debug)]
pub enum Error {
    /// 画像が未選択・未撮影（ネットワークI/Oの前に弾く）
    #[error("Choose an image or capture from camera")]
    NoImage,

    /// カメラの権限拒否・ハードウェア障害
    #[error("{0}")]
    Device(String),

    /// エンドポイントが成功以外のステータスを返した（本文をそのまま表示）
    #[error("{body}")]
    Remote { status: u16, body: String },

    /// リクエスト自体が完了しなかった
    #[error("{0}")]
    Network(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// 現在の取得状態では許可されない操作
    #[error("Invalid state: {0}")]
    InvalidState(&'static str),
}

impl Error {
    /// ユーザー操作で解消できる入力エラーか
    pub fn is_input_error(&self) -> bool {
        matches!(self, Error::NoImage)
    }
}

/// Result型エイリアス
pub type Result<T> = std::result::Result<T, Error>;
