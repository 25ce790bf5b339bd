use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

/// Why an image could not be loaded.
#[derive(Debug)]
pub enum LoadErrorKind {
    /// No file at the path.
    NotFound,
    /// The file exists but could not be read.
    Io(io::Error),
    /// The bytes are not a supported or valid image.
    Decode(image::ImageError),
    /// The image decoded to zero width or height.
    Empty,
    /// The image is bigger than the device can hold in one texture.
    TooLarge { width: u32, height: u32, max: u32 },
}

/// Failure to load an image resource.
#[derive(Debug)]
pub struct LoadError {
    pub path: PathBuf,
    pub kind: LoadErrorKind,
}

impl LoadError {
    pub fn new(path: impl Into<PathBuf>, kind: LoadErrorKind) -> Self {
        Self { path: path.into(), kind }
    }

    pub(super) fn from_io(path: &Path, err: io::Error) -> Self {
        let kind = match err.kind() {
            io::ErrorKind::NotFound => LoadErrorKind::NotFound,
            _ => LoadErrorKind::Io(err),
        };
        Self::new(path, kind)
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self.kind, LoadErrorKind::NotFound)
    }
}

impl fmt::Display for LoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let path = self.path.display();
        match &self.kind {
            LoadErrorKind::NotFound => write!(f, "unable to load image {path}: file not found"),
            LoadErrorKind::Io(e) => write!(f, "unable to load image {path}: {e}"),
            LoadErrorKind::Decode(e) => write!(f, "unable to decode image {path}: {e}"),
            LoadErrorKind::Empty => write!(f, "unable to load image {path}: image is empty"),
            LoadErrorKind::TooLarge { width, height, max } => write!(
                f,
                "unable to load image {path}: {width}x{height} exceeds the {max} px texture limit"
            ),
        }
    }
}

impl std::error::Error for LoadError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match &self.kind {
            LoadErrorKind::Io(e) => Some(e),
            LoadErrorKind::Decode(e) => Some(e),
            LoadErrorKind::NotFound | LoadErrorKind::Empty | LoadErrorKind::TooLarge { .. } => None,
        }
    }
}
