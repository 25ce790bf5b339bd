use std::path::Path;

use super::{LoadError, LoadErrorKind};

/// Reads and decodes `path` into straight-alpha RGBA8.
pub(crate) fn decode_rgba(path: &Path) -> Result<image::RgbaImage, LoadError> {
    let reader = image::ImageReader::open(path)
        .and_then(|r| r.with_guessed_format())
        .map_err(|e| LoadError::from_io(path, e))?;

    let decoded = reader
        .decode()
        .map_err(|e| LoadError::new(path, LoadErrorKind::Decode(e)))?;

    let rgba = decoded.to_rgba8();
    if rgba.width() == 0 || rgba.height() == 0 {
        return Err(LoadError::new(path, LoadErrorKind::Empty));
    }
    Ok(rgba)
}

/// Rejects images wider or taller than `max_side`, the device's 2D texture limit.
pub(crate) fn check_texture_fits(
    path: &Path,
    width: u32,
    height: u32,
    max_side: u32,
) -> Result<(), LoadError> {
    if width > max_side || height > max_side {
        return Err(LoadError::new(
            path,
            LoadErrorKind::TooLarge { width, height, max: max_side },
        ));
    }
    Ok(())
}
