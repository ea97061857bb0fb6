//! Condition icons fetched from the weather provider's CDN.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IconFormat {
    Png,
    Jpeg,
    Gif,
    Webp,
}

impl IconFormat {
    /// Detect the image format from its leading magic bytes.
    pub fn sniff(bytes: &[u8]) -> Option<Self> {
        if bytes.starts_with(b"\x89PNG\r\n\x1a\n") {
            Some(IconFormat::Png)
        } else if bytes.starts_with(&[0xFF, 0xD8, 0xFF]) {
            Some(IconFormat::Jpeg)
        } else if bytes.starts_with(b"GIF87a") || bytes.starts_with(b"GIF89a") {
            Some(IconFormat::Gif)
        } else if bytes.len() >= 12 && &bytes[..4] == b"RIFF" && &bytes[8..12] == b"WEBP" {
            Some(IconFormat::Webp)
        } else {
            None
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            IconFormat::Png => "png",
            IconFormat::Jpeg => "jpeg",
            IconFormat::Gif => "gif",
            IconFormat::Webp => "webp",
        }
    }
}

impl fmt::Display for IconFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raw icon bytes plus whatever could be learned about them.
///
/// Bytes that are not a recognised image still produce an `Icon` with
/// `format: None`; the panel then shows nothing for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Icon {
    pub url: String,
    pub bytes: Vec<u8>,
    pub format: Option<IconFormat>,
    pub dimensions: Option<(u32, u32)>,
}

impl Icon {
    pub fn decode(url: impl Into<String>, bytes: Vec<u8>) -> Self {
        let format = IconFormat::sniff(&bytes);
        let dimensions = match format {
            Some(IconFormat::Png) => png_dimensions(&bytes),
            _ => None,
        };

        Self { url: url.into(), bytes, format, dimensions }
    }

    pub fn is_image(&self) -> bool {
        self.format.is_some()
    }
}

/// Resolve a provider icon reference to a fetchable URL.
///
/// weatherapi.com hands out scheme-relative references (`//cdn...`), which get
/// an explicit `http:` scheme.
pub fn icon_url(reference: &str) -> String {
    if reference.starts_with("//") {
        format!("http:{reference}")
    } else {
        reference.to_string()
    }
}

// Width and height are the first two fields of IHDR, right after the signature
// and the chunk length/type.
fn png_dimensions(bytes: &[u8]) -> Option<(u32, u32)> {
    let ihdr = bytes.get(12..24)?;
    if &ihdr[..4] != b"IHDR" {
        return None;
    }
    let width = u32::from_be_bytes(ihdr[4..8].try_into().ok()?);
    let height = u32::from_be_bytes(ihdr[8..12].try_into().ok()?);
    Some((width, height))
}
