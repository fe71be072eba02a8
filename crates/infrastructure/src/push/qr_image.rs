//! Data-URL pairing images.

use std::path::Path;

use base64::Engine;
use groupguard_application::events::QrCode;
use groupguard_domain::QrEncoding;

/// Errors decoding a pairing image.
#[derive(Debug, thiserror::Error)]
pub enum QrImageError {
    /// The code is a raw pairing string, not an image.
    #[error("pairing code is raw text, not an image")]
    NotAnImage,

    /// Not a `data:<mime>;base64,<data>` URL.
    #[error("malformed data URL")]
    MalformedDataUrl,

    /// The base64 payload does not decode.
    #[error("invalid base64 payload: {0}")]
    Base64(#[from] base64::DecodeError),

    /// Writing the image failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// A decoded image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QrImage {
    /// Media type from the data URL.
    pub mime_type: String,
    /// Image bytes.
    pub bytes: Vec<u8>,
}

impl QrImage {
    /// Decodes a `data:image/...;base64,...` URL.
    ///
    /// # Errors
    ///
    /// Returns `MalformedDataUrl` for anything that is not a base64 data URL.
    pub fn from_data_url(url: &str) -> Result<Self, QrImageError> {
        let rest = url
            .trim()
            .strip_prefix("data:")
            .ok_or(QrImageError::MalformedDataUrl)?;
        let (meta, payload) = rest.split_once(',').ok_or(QrImageError::MalformedDataUrl)?;
        let mime_type = meta
            .strip_suffix(";base64")
            .ok_or(QrImageError::MalformedDataUrl)?;

        let bytes = base64::engine::general_purpose::STANDARD.decode(payload)?;
        Ok(Self {
            mime_type: mime_type.to_string(),
            bytes,
        })
    }

    /// Decodes the image carried by a pairing code.
    ///
    /// # Errors
    ///
    /// Returns `NotAnImage` for raw codes, otherwise as [`Self::from_data_url`].
    pub fn from_code(code: &QrCode) -> Result<Self, QrImageError> {
        match code.encoding {
            QrEncoding::DataUrl => Self::from_data_url(&code.data),
            QrEncoding::Raw => Err(QrImageError::NotAnImage),
        }
    }

    /// File extension matching the media type.
    #[must_use]
    pub fn extension(&self) -> &str {
        mime_guess::get_mime_extensions_str(&self.mime_type)
            .and_then(|exts| exts.first().copied())
            .unwrap_or("bin")
    }

    /// Writes the image to `path`, replacing any previous code.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the file cannot be written.
    pub fn write_to(&self, path: &Path) -> Result<(), QrImageError> {
        std::fs::write(path, &self.bytes)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn decodes_png_data_url() {
        let image = QrImage::from_data_url("data:image/png;base64,iVBORw0K").unwrap();
        assert_eq!(image.mime_type, "image/png");
        assert_eq!(&image.bytes[..4], &[0x89, b'P', b'N', b'G']);
        assert_eq!(image.extension(), "png");
    }

    #[test]
    fn rejects_non_base64_urls() {
        assert!(matches!(
            QrImage::from_data_url("data:image/svg+xml,<svg/>"),
            Err(QrImageError::MalformedDataUrl)
        ));
        assert!(matches!(
            QrImage::from_data_url("2@abc,def"),
            Err(QrImageError::MalformedDataUrl)
        ));
        assert!(matches!(
            QrImage::from_data_url("data:image/png;base64,%%%"),
            Err(QrImageError::Base64(_))
        ));
    }

    #[test]
    fn writes_image_bytes() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("qr.png");
        let image = QrImage::from_data_url("data:image/png;base64,iVBORw0K").unwrap();

        image.write_to(&path).unwrap();
        assert_eq!(std::fs::read(&path).unwrap(), image.bytes);
    }

    #[test]
    fn raw_codes_are_not_images() {
        let code = QrCode {
            data: "2@abc".to_string(),
            encoding: QrEncoding::Raw,
        };
        assert!(matches!(QrImage::from_code(&code), Err(QrImageError::NotAnImage)));
    }
}
