//! Image sniffing helpers
//!
//! Icon payloads arrive without trustworthy content types, so both the MIME
//! type served by `/icondata` and the dimensions reported for each icon are
//! derived from the bytes themselves.

use image::ImageReader;
use std::io::Cursor;

const FALLBACK_MIME_TYPE: &str = "application/octet-stream";

pub struct ImageUtils;

impl ImageUtils {
    /// MIME type detected from the magic bytes of `data`
    pub fn mime_type(data: &[u8]) -> &'static str {
        if let Some(kind) = infer::get(data)
            && kind.matcher_type() == infer::MatcherType::Image
        {
            return kind.mime_type();
        }

        image::guess_format(data)
            .map(|format| format.to_mime_type())
            .unwrap_or(FALLBACK_MIME_TYPE)
    }

    /// Pixel dimensions of an encoded image, or `None` if it is not a
    /// format we can read. For ICO files this is the largest entry.
    pub fn dimensions(data: &[u8]) -> Option<(u32, u32)> {
        ImageReader::new(Cursor::new(data))
            .with_guessed_format()
            .ok()?
            .into_dimensions()
            .ok()
    }
}
