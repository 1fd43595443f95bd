// src/image/mod.rs — Image payloads: bytes in, self-describing base64 out

pub mod mime;

use base64::{engine::general_purpose::STANDARD, Engine};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::infra::errors::PixelScribeError;

/// An image held as a base64 payload plus the MIME type it was detected as.
///
/// Equivalent to a `data:<mime>;base64,<data>` URI, but the two halves are
/// kept apart so the gateway never has to parse the prefix back out.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncodedImage {
    pub mime_type: String,
    pub data: String,
    pub byte_len: usize,
}

impl EncodedImage {
    /// Encode raw bytes. The MIME type is sniffed from the content.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, PixelScribeError> {
        Self::from_bytes_with_hint(bytes, None)
    }

    /// Encode raw bytes, falling back to `hint` (usually the file name)
    /// when the content signature is unknown.
    pub fn from_bytes_with_hint(
        bytes: &[u8],
        hint: Option<&Path>,
    ) -> Result<Self, PixelScribeError> {
        if bytes.is_empty() {
            return Err(PixelScribeError::EmptyImage);
        }
        let mime_type = mime::detect_mime(bytes)
            .or_else(|| hint.and_then(mime::mime_from_extension))
            .unwrap_or(mime::OCTET_STREAM);

        Ok(Self {
            mime_type: mime_type.to_string(),
            data: STANDARD.encode(bytes),
            byte_len: bytes.len(),
        })
    }

    /// Read a file and encode it.
    pub async fn from_file(path: &Path) -> Result<Self, PixelScribeError> {
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|source| PixelScribeError::Decode {
                path: path.to_path_buf(),
                source,
            })?;
        tracing::debug!(path = %path.display(), bytes = bytes.len(), "read image file");
        Self::from_bytes_with_hint(&bytes, Some(path))
    }

    /// Parse a `data:<mime>;base64,<payload>` URI.
    pub fn from_data_uri(uri: &str) -> Result<Self, PixelScribeError> {
        let rest = uri
            .strip_prefix("data:")
            .ok_or_else(|| PixelScribeError::DataUri("missing `data:` scheme".into()))?;
        let (header, payload) = rest
            .split_once(',')
            .ok_or_else(|| PixelScribeError::DataUri("missing `,` separator".into()))?;
        let header_mime = header
            .strip_suffix(";base64")
            .ok_or_else(|| PixelScribeError::DataUri("only base64 payloads are supported".into()))?;

        let decoded = STANDARD
            .decode(payload)
            .map_err(|e| PixelScribeError::DataUri(e.to_string()))?;
        if decoded.is_empty() {
            return Err(PixelScribeError::EmptyImage);
        }

        // The decoded bytes decide; the header only covers formats we can't sniff.
        let mime_type = mime::detect_mime(&decoded).unwrap_or(if header_mime.is_empty() {
            mime::OCTET_STREAM
        } else {
            header_mime
        });

        Ok(Self {
            mime_type: mime_type.to_string(),
            data: payload.to_string(),
            byte_len: decoded.len(),
        })
    }

    /// Self-describing form, suitable for previews.
    pub fn data_uri(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, self.data)
    }

    /// The base64 payload without any scheme prefix.
    pub fn payload(&self) -> &str {
        &self.data
    }

    pub fn is_recognized_image(&self) -> bool {
        mime::is_image(&self.mime_type)
    }
}
