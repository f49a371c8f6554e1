//! Card Scan Common Library
//!
//! ブラウザ(WASM)とネイティブクライアントで共有される型・状態機械・API契約

pub mod types;
pub mod error;
pub mod acquisition;
pub mod camera;
pub mod api;
pub mod store;

pub use types::{
    FieldKey, FieldSet, ImageBlob, ImageSource, ImageUpload, OperationStatus, SelectedFile,
    CAPTURE_FILE_NAME, JPEG_MIME,
};
pub use error::{Error, Result};
pub use acquisition::{Acquisition, AcquisitionMode, CameraCommand};
pub use camera::{CameraBackend, Facing, FrameSize, MediaCapture, FALLBACK_FRAME_SIZE, JPEG_QUALITY};
pub use api::{extract, flag_value, save, ApiBase, CardApi, ExtractResponse, Extraction, SaveForm};
pub use store::{AppState, ExtractTicket, RequestId, SaveTicket};
