//! ビルド時設定

use card_scan_common::ApiBase;

/// APIのベースURL（未設定なら同一オリジン）
///
/// `CARD_SCAN_API_BASE=https://api.example.com trunk build` のようにビルド時に与える
pub fn api_base() -> ApiBase {
    ApiBase::new(option_env!("CARD_SCAN_API_BASE").unwrap_or(""))
}
