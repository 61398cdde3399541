//! Image field values and their preview addresses.
//!
//! An image is either absent, a URL the backend already knows about, or a
//! file picked locally. The two non-empty representations are mutually
//! exclusive, so every edit swaps the whole value.
//!
//! Local files get a transient preview address from a [`PreviewStore`]. The
//! address is owned by a [`PreviewHandle`] and released when the handle is
//! dropped: on replacement, on `clear()`, on submit and on form teardown.

use std::collections::HashSet;
use std::fmt;
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use tracing::debug;

use crate::validation::{Reason, ValidationError};

/// A file picked from the local machine.
#[derive(Clone, PartialEq, Eq)]
pub struct LocalFile {
    pub file_name: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

impl LocalFile {
    pub fn new(file_name: &str, mime_type: &str, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.to_string(),
            mime_type: mime_type.to_string(),
            bytes,
        }
    }

    /// Read a file from disk, guessing its MIME type from the extension.
    pub fn from_path(path: &Path) -> std::io::Result<Self> {
        let bytes = std::fs::read(path)?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "upload".to_string());
        let mime_type = mime_guess::from_path(path)
            .first_or_octet_stream()
            .to_string();

        Ok(Self {
            file_name,
            mime_type,
            bytes,
        })
    }

    pub fn byte_len(&self) -> usize {
        self.bytes.len()
    }
}

// Byte payloads are not printed
impl fmt::Debug for LocalFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LocalFile")
            .field("file_name", &self.file_name)
            .field("mime_type", &self.mime_type)
            .field("byte_len", &self.bytes.len())
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ImageValue {
    #[default]
    None,
    RemoteUrl(String),
    LocalFile(LocalFile),
}

impl ImageValue {
    pub fn is_none(&self) -> bool {
        matches!(self, ImageValue::None)
    }
}

/// Resolve a stored image path into an absolute address.
///
/// Absolute (`http://`, `https://`) and `data:` addresses pass through
/// verbatim; anything else is treated as a path on the API server.
pub fn resolve_image_url(path: &str, base_url: &str) -> String {
    if path.is_empty() {
        return String::new();
    }

    if path.starts_with("http://") || path.starts_with("https://") || path.starts_with("data:") {
        return path.to_string();
    }

    let base = base_url.trim_end_matches('/');
    if path.starts_with('/') {
        format!("{}{}", base, path)
    } else {
        format!("{}/{}", base, path)
    }
}

/// Allocates and releases transient preview addresses for local files.
pub trait PreviewStore: fmt::Debug + Send + Sync {
    fn allocate(&self, file: &LocalFile) -> String;
    fn release(&self, address: &str);
}

/// In-process preview store handing out `blob:` style addresses.
#[derive(Debug, Default)]
pub struct ObjectUrlStore {
    next_id: AtomicU64,
    live: Mutex<HashSet<String>>,
}

impl ObjectUrlStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of addresses allocated and not yet released
    pub fn live_count(&self) -> usize {
        self.live.lock().map(|live| live.len()).unwrap_or(0)
    }

    pub fn is_live(&self, address: &str) -> bool {
        self.live
            .lock()
            .map(|live| live.contains(address))
            .unwrap_or(false)
    }
}

impl PreviewStore for ObjectUrlStore {
    fn allocate(&self, file: &LocalFile) -> String {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let address = format!("blob:cms-admin/{:08x}", id);
        debug!("Allocated preview {} for {}", address, file.file_name);
        if let Ok(mut live) = self.live.lock() {
            live.insert(address.clone());
        }
        address
    }

    fn release(&self, address: &str) {
        if let Ok(mut live) = self.live.lock() {
            live.remove(address);
        }
        debug!("Released preview {}", address);
    }
}

/// Owns one preview address; releases it exactly once on drop.
#[derive(Debug)]
pub struct PreviewHandle {
    address: String,
    store: Arc<dyn PreviewStore>,
}

impl PreviewHandle {
    pub fn address(&self) -> &str {
        &self.address
    }
}

impl Drop for PreviewHandle {
    fn drop(&mut self) {
        self.store.release(&self.address);
    }
}

/// Base address and preview store shared by every image field of a session.
#[derive(Debug, Clone)]
pub struct ImageResolver {
    pub base_url: String,
    pub store: Arc<dyn PreviewStore>,
}

impl ImageResolver {
    pub fn new(base_url: &str, store: Arc<dyn PreviewStore>) -> Self {
        Self {
            base_url: base_url.to_string(),
            store,
        }
    }

    /// An empty image field.
    pub fn field(&self) -> ImageField {
        ImageField {
            value: ImageValue::None,
            preview: None,
            base_url: self.base_url.clone(),
            store: Arc::clone(&self.store),
        }
    }

    /// A field initialised from a persisted path, normalised to an absolute
    /// address.
    pub fn field_from_path(&self, path: Option<&str>) -> ImageField {
        let mut field = self.field();
        if let Some(path) = path {
            field.set_from_url(&resolve_image_url(path, &self.base_url));
        }
        field
    }
}

/// The image input of one form.
#[derive(Debug)]
pub struct ImageField {
    value: ImageValue,
    preview: Option<PreviewHandle>,
    base_url: String,
    store: Arc<dyn PreviewStore>,
}

impl ImageField {
    pub fn value(&self) -> &ImageValue {
        &self.value
    }

    pub fn set_from_file(&mut self, file: LocalFile) {
        let address = self.store.allocate(&file);
        // Assigning drops the previous handle, releasing its address
        self.preview = Some(PreviewHandle {
            address,
            store: Arc::clone(&self.store),
        });
        self.value = ImageValue::LocalFile(file);
    }

    /// An empty URL is the same as no image.
    pub fn set_from_url(&mut self, url: &str) {
        self.preview = None;
        self.value = if url.is_empty() {
            ImageValue::None
        } else {
            ImageValue::RemoteUrl(url.to_string())
        };
    }

    pub fn clear(&mut self) {
        self.preview = None;
        self.value = ImageValue::None;
    }

    pub fn preview_address(&self) -> Option<String> {
        match &self.value {
            ImageValue::None => None,
            ImageValue::RemoteUrl(url) => Some(resolve_image_url(url, &self.base_url)),
            ImageValue::LocalFile(_) => self.preview.as_ref().map(|h| h.address().to_string()),
        }
    }

    pub fn validate(&self, required: bool) -> Result<(), ValidationError> {
        if required && self.value.is_none() {
            return Err(ValidationError::new("image", Reason::Required));
        }
        Ok(())
    }

    /// Consume the field for submission, releasing any preview address.
    pub fn into_value(self) -> ImageValue {
        let ImageField { value, preview, .. } = self;
        drop(preview);
        value
    }
}
