use crate::error::{CardScanError, Result};
use card_scan_common::ApiBase;

pub const API_BASE_ENV: &str = "CARD_SCAN_API_BASE";
pub const TIMEOUT_ENV: &str = "CARD_SCAN_TIMEOUT_SECS";

const DEFAULT_TIMEOUT_SECONDS: u64 = 120;

#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub api_base: ApiBase,
    pub timeout_seconds: u64,
}

impl ClientConfig {
    pub fn new(api_base: &str) -> Result<Self> {
        let api_base = ApiBase::new(api_base);
        // ネイティブでは同一オリジンが存在しない
        if api_base.is_same_origin() {
            return Err(CardScanError::MissingApiBase);
        }
        if !api_base.as_str().starts_with("http://") && !api_base.as_str().starts_with("https://") {
            return Err(CardScanError::Config(format!(
                "APIのベースURLは http(s):// で始めてください: {}",
                api_base.as_str()
            )));
        }
        Ok(Self { api_base, timeout_seconds: DEFAULT_TIMEOUT_SECONDS })
    }

    /// 環境変数から読み込む
    pub fn from_env() -> Result<Self> {
        let base = std::env::var(API_BASE_ENV).map_err(|_| CardScanError::MissingApiBase)?;
        let mut config = Self::new(&base)?;

        if let Ok(raw) = std::env::var(TIMEOUT_ENV) {
            config.timeout_seconds = raw.trim().parse().map_err(|_| {
                CardScanError::Config(format!("{} は秒数で指定してください: {}", TIMEOUT_ENV, raw))
            })?;
        }

        Ok(config)
    }

    pub fn with_timeout(mut self, seconds: u64) -> Self {
        self.timeout_seconds = seconds;
        self
    }
}
