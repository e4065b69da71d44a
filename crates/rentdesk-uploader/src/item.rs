//! Media items tracked by the coordinator.

use std::fmt;
use std::path::{Component, Path, PathBuf};

use bytes::Bytes;
use rand::Rng;

const BASE36: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Identifier of an item within one coordinator session.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ItemId(String);

impl ItemId {
    /// `existing-<7 base36 chars>`
    pub fn existing() -> Self {
        Self(format!("existing-{}", random_base36(7)))
    }

    /// `file-<unix millis>-<13 base36 chars>`
    pub fn new_file() -> Self {
        Self(format!(
            "file-{}-{}",
            chrono::Utc::now().timestamp_millis(),
            random_base36(13)
        ))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

fn random_base36(len: usize) -> String {
    let mut rng = rand::rng();
    (0..len)
        .map(|_| BASE36[rng.random_range(0..BASE36.len())] as char)
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadState {
    Pending,
    Uploaded,
    Failed,
}

/// What an item currently displays: a local preview while the upload has not
/// succeeded, the remote URL afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DisplayUrl {
    Preview(String),
    Remote(String),
}

impl DisplayUrl {
    pub fn as_str(&self) -> &str {
        match self {
            DisplayUrl::Preview(s) | DisplayUrl::Remote(s) => s,
        }
    }
}

/// A locally selected file.
#[derive(Debug, Clone, PartialEq)]
pub struct MediaFile {
    pub name: String,
    pub content_type: Option<String>,
    pub data: Bytes,
    pub path: Option<PathBuf>,
}

impl MediaFile {
    pub fn new(name: impl Into<String>, data: impl Into<Bytes>) -> Self {
        Self {
            name: name.into(),
            content_type: None,
            data: data.into(),
            path: None,
        }
    }

    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    /// Read a file from disk. The content type is guessed from the extension
    /// for common image formats. Paths with `..` components are refused.
    pub async fn from_path(path: impl AsRef<Path>) -> std::io::Result<Self> {
        let path = path.as_ref();
        if path.components().any(|c| c == Component::ParentDir) {
            return Err(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                format!("Invalid input: {}", path.display()),
            ));
        }
        let data = tokio::fs::read(path).await?;
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("upload.bin")
            .to_string();
        Ok(Self {
            content_type: guess_content_type(path).map(str::to_string),
            name,
            data: Bytes::from(data),
            path: Some(path.to_path_buf()),
        })
    }

    /// Local reference shown while the item is not uploaded.
    pub fn preview(&self) -> String {
        match &self.path {
            Some(path) => path.display().to_string(),
            None => self.name.clone(),
        }
    }

    pub fn size(&self) -> usize {
        self.data.len()
    }
}

fn guess_content_type(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    match ext.as_str() {
        "jpg" | "jpeg" => Some("image/jpeg"),
        "png" => Some("image/png"),
        "gif" => Some("image/gif"),
        "webp" => Some("image/webp"),
        "avif" => Some("image/avif"),
        "svg" => Some("image/svg+xml"),
        _ => None,
    }
}

/// One entry of the coordinator's ordered list.
#[derive(Debug, Clone, PartialEq)]
pub struct MediaItem {
    pub id: ItemId,
    pub display: DisplayUrl,
    pub state: UploadState,
    /// Present while pending or failed; dropped once uploaded.
    pub file: Option<MediaFile>,
}

impl MediaItem {
    /// An already-stored URL.
    pub fn existing(url: impl Into<String>) -> Self {
        Self {
            id: ItemId::existing(),
            display: DisplayUrl::Remote(url.into()),
            state: UploadState::Uploaded,
            file: None,
        }
    }

    pub fn pending(id: ItemId, file: MediaFile) -> Self {
        Self {
            id,
            display: DisplayUrl::Preview(file.preview()),
            state: UploadState::Pending,
            file: Some(file),
        }
    }

    /// The URL this item contributes to the reported value.
    pub fn uploaded_url(&self) -> Option<&str> {
        match (&self.state, &self.display) {
            (UploadState::Uploaded, DisplayUrl::Remote(url)) => Some(url),
            _ => None,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.state == UploadState::Pending
    }
}
