//! Image encoding for the script-generation request.
//!
//! Slides are rendered at video resolution (300 DPI by default), which is far
//! more than a vision model needs to read a slide. Before base64 encoding the
//! page is downscaled so its longest edge is at most [`LLM_MAX_EDGE`] pixels;
//! larger images are resized server-side anyway and only cost upload time.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use edgequake_llm::ImageData;
use image::imageops::FilterType;
use image::DynamicImage;
use std::io::Cursor;
use tracing::debug;

/// Longest edge of an image sent to the script model.
pub const LLM_MAX_EDGE: u32 = 1568;

/// Encode a slide as a base64 PNG attachment for the LLM.
pub fn encode_slide(img: &DynamicImage) -> Result<ImageData, image::ImageError> {
    let scaled;
    let img = if img.width().max(img.height()) > LLM_MAX_EDGE {
        scaled = img.resize(LLM_MAX_EDGE, LLM_MAX_EDGE, FilterType::Triangle);
        &scaled
    } else {
        img
    };

    let mut buf = Vec::new();
    img.write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)?;

    let b64 = STANDARD.encode(&buf);
    debug!(
        "Encoded slide {}x{} → {} bytes base64",
        img.width(),
        img.height(),
        b64.len()
    );

    Ok(ImageData::new(b64, "image/png"))
}
