use std::path::{Path, PathBuf};

use image::{ImageFormat, RgbaImage};

use super::ExportError;
use crate::gfx::{GraphicsContext, TextureId};

/// `<textureId>.png`, or `<textureId>(<label>).png` with a label.
pub fn export_file_name(texture: TextureId, label: &str) -> String {
    if label.is_empty() {
        format!("{texture}.png")
    } else {
        format!("{texture}({label}).png")
    }
}

/// Reads `texture` back and writes it as PNG into `dir`.
pub fn write_texture(
    ctx: &dyn GraphicsContext,
    texture: TextureId,
    dir: &Path,
    label: &str,
) -> Result<PathBuf, ExportError> {
    let (width, height, pixels) = ctx.read_texture_rgba8(texture)?;
    let len = pixels.len();
    let image = RgbaImage::from_raw(width, height, pixels).ok_or(ExportError::BufferSize {
        width,
        height,
        len,
    })?;

    let path = dir.join(export_file_name(texture, label));
    image
        .save_with_format(&path, ImageFormat::Png)
        .map_err(|source| ExportError::Write {
            path: path.clone(),
            source,
        })?;
    Ok(path)
}
