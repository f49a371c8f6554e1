//! 名刺スキャンの型定義
//!
//! ブラウザ(WASM)とネイティブクライアントで共有される型:
//! - ImageSource: 現在有効な画像入力（選択ファイル or 撮影フレーム）
//! - FieldSet: 抽出・編集対象の6項目
//! - OperationStatus: 非同期操作の状態表示

/// 撮影フレームをアップロードする際のファイル名
pub const CAPTURE_FILE_NAME: &str = "capture.jpg";

/// 撮影フレームのMIMEタイプ
pub const JPEG_MIME: &str = "image/jpeg";

/// エンコード済み画像データ
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageBlob {
    pub bytes: Vec<u8>,
    pub mime_type: String,
}

impl ImageBlob {
    pub fn new(bytes: Vec<u8>, mime_type: impl Into<String>) -> Self {
        Self { bytes, mime_type: mime_type.into() }
    }

    pub fn jpeg(bytes: Vec<u8>) -> Self {
        Self::new(bytes, JPEG_MIME)
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// ファイルピッカーで選ばれた画像
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedFile {
    pub blob: ImageBlob,
    pub file_name: String,
}

/// 現在有効な画像入力。同時に有効なのは1つだけ
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ImageSource {
    #[default]
    None,
    SelectedFile(SelectedFile),
    CapturedFrame(ImageBlob),
}

impl ImageSource {
    pub fn is_none(&self) -> bool {
        matches!(self, ImageSource::None)
    }

    pub fn selected_file(&self) -> Option<&SelectedFile> {
        match self {
            ImageSource::SelectedFile(file) => Some(file),
            _ => None,
        }
    }

    pub fn captured_frame(&self) -> Option<&ImageBlob> {
        match self {
            ImageSource::CapturedFrame(blob) => Some(blob),
            _ => None,
        }
    }

    /// アップロード用データを作成
    ///
    /// 撮影フレームは常に `capture.jpg` として送信する
    pub fn upload(&self) -> Option<ImageUpload> {
        match self {
            ImageSource::None => None,
            ImageSource::SelectedFile(file) => Some(ImageUpload {
                file_name: file.file_name.clone(),
                mime_type: file.blob.mime_type.clone(),
                bytes: file.blob.bytes.clone(),
            }),
            ImageSource::CapturedFrame(blob) => Some(ImageUpload {
                file_name: CAPTURE_FILE_NAME.to_string(),
                mime_type: JPEG_MIME.to_string(),
                bytes: blob.bytes.clone(),
            }),
        }
    }
}

/// 抽出エンドポイントへ送るマルチパートの `file` パート
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageUpload {
    pub file_name: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

/// 名刺の項目キー（表示順）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldKey {
    Name,
    Phone,
    Email,
    Company,
    Address,
    Website,
}

impl FieldKey {
    pub const ALL: [FieldKey; 6] = [
        FieldKey::Name,
        FieldKey::Phone,
        FieldKey::Email,
        FieldKey::Company,
        FieldKey::Address,
        FieldKey::Website,
    ];

    /// 表示ラベル兼、抽出レスポンスのキー
    pub fn label(&self) -> &'static str {
        match self {
            FieldKey::Name => "Name",
            FieldKey::Phone => "Phone",
            FieldKey::Email => "Email",
            FieldKey::Company => "Company",
            FieldKey::Address => "Address",
            FieldKey::Website => "Website",
        }
    }

    /// 保存エンドポイントのフォームキー（小文字）
    pub fn form_key(&self) -> &'static str {
        match self {
            FieldKey::Name => "name",
            FieldKey::Phone => "phone",
            FieldKey::Email => "email",
            FieldKey::Company => "company",
            FieldKey::Address => "address",
            FieldKey::Website => "website",
        }
    }
}

/// 名刺の6項目
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldSet {
    pub name: String,
    pub phone: String,
    pub email: String,
    pub company: String,
    pub address: String,
    pub website: String,
}

impl FieldSet {
    pub fn get(&self, key: FieldKey) -> &str {
        match key {
            FieldKey::Name => &self.name,
            FieldKey::Phone => &self.phone,
            FieldKey::Email => &self.email,
            FieldKey::Company => &self.company,
            FieldKey::Address => &self.address,
            FieldKey::Website => &self.website,
        }
    }

    pub fn set(&mut self, key: FieldKey, value: impl Into<String>) {
        let slot = match key {
            FieldKey::Name => &mut self.name,
            FieldKey::Phone => &mut self.phone,
            FieldKey::Email => &mut self.email,
            FieldKey::Company => &mut self.company,
            FieldKey::Address => &mut self.address,
            FieldKey::Website => &mut self.website,
        };
        *slot = value.into();
    }

    /// 表示順に (キー, 値) を返す
    pub fn iter(&self) -> impl Iterator<Item = (FieldKey, &str)> + '_ {
        FieldKey::ALL.into_iter().map(move |key| (key, self.get(key)))
    }

    pub fn is_empty(&self) -> bool {
        self.iter().all(|(_, value)| value.is_empty())
    }
}

/// 非同期操作の状態（単一のグローバル値）
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum OperationStatus {
    #[default]
    Idle,
    Loading,
    Error(String),
}

impl OperationStatus {
    pub fn is_loading(&self) -> bool {
        matches!(self, OperationStatus::Loading)
    }

    pub fn error_message(&self) -> Option<&str> {
        match self {
            OperationStatus::Error(message) => Some(message),
            _ => None,
        }
    }
}
