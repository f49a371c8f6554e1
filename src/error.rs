use thiserror::Error;

#[derive(Error, Debug)]
pub enum CardScanError {
    #[error("設定エラー: {0}")]
    Config(String),

    #[error("APIのベースURLが設定されていません。環境変数 `CARD_SCAN_API_BASE` を設定してください")]
    MissingApiBase,

    #[error("ファイルが見つかりません: {0}")]
    FileNotFound(String),

    #[error("画像読み込みエラー: {0}")]
    ImageLoad(String),

    #[error("HTTPクライアントの初期化に失敗: {0}")]
    HttpClient(String),

    #[error("IOエラー: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Common(#[from] card_scan_common::Error),
}

pub type Result<T> = std::result::Result<T, CardScanError>;
