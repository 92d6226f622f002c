//! PNG export for rendered frames.

use std::io::Cursor;
use std::path::Path;

use image::{ImageFormat, RgbaImage};
use vizcanvas_core::{FrameBuffer, VizError, VizResult};

fn to_image(fb: &FrameBuffer) -> VizResult<RgbaImage> {
    RgbaImage::from_raw(fb.width, fb.height, fb.data.clone()).ok_or_else(|| {
        VizError::InvalidArgument(format!(
            "frame data does not match {}x{} RGBA",
            fb.width, fb.height
        ))
    })
}

/// Encode a frame as PNG bytes.
pub fn encode_png(fb: &FrameBuffer) -> VizResult<Vec<u8>> {
    let mut out = Cursor::new(Vec::new());
    to_image(fb)?
        .write_to(&mut out, ImageFormat::Png)
        .map_err(|e| VizError::Other(format!("failed to encode PNG: {}", e)))?;
    Ok(out.into_inner())
}

/// Write a frame to `path` as PNG.
pub fn save_png(fb: &FrameBuffer, path: &Path) -> VizResult<()> {
    let bytes = encode_png(fb)?;
    std::fs::write(path, bytes)?;
    Ok(())
}
