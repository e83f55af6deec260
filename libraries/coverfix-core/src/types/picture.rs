//! Embedded picture types

/// Raw picture bytes pulled out of an audio container
///
/// The mime type is whatever the container declared; the bytes are not
/// sniffed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PictureRecord {
    /// Raw image bytes
    pub data: Vec<u8>,
    /// Declared MIME type (e.g., "image/jpeg", "image/png")
    pub mime: String,
}

impl PictureRecord {
    /// Create a new picture record
    pub fn new(data: Vec<u8>, mime: impl Into<String>) -> Self {
        Self {
            data,
            mime: mime.into(),
        }
    }

    /// File extension used when the picture is written to disk
    pub fn extension(&self) -> &'static str {
        extension_for_mime(&self.mime)
    }

    /// Size of the image payload in bytes
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// Map a declared MIME type to a file extension
///
/// Unknown types fall back to `jpeg`.
pub fn extension_for_mime(mime: &str) -> &'static str {
    match mime {
        "image/png" => "png",
        "image/gif" => "gif",
        _ => "jpeg",
    }
}
