//! 名刺スキャンのネイティブクライアント
//!
//! 画面はブラウザ版（web-wasm）が持ち、ここでは同じAPI契約を reqwest で実装する。

pub mod client;
pub mod config;
pub mod error;
pub mod image_file;
pub mod still_camera;

pub use card_scan_common as common;
pub use client::HttpCardApi;
pub use config::ClientConfig;
pub use error::{CardScanError, Result};
pub use image_file::load_image_file;
pub use still_camera::StillCamera;
