use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::rc::{Rc, Weak};

/// Surface-assigned identifier of a loaded image.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub struct ImageId(pub u64);

impl fmt::Display for ImageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "image#{}", self.0)
    }
}

#[derive(Debug)]
struct ImageInfo {
    id: ImageId,
    width: u32,
    height: u32,
    path: PathBuf,
}

/// Shared handle to an image loaded by a [`RenderSurface`](super::RenderSurface).
///
/// Cloning is cheap and shares the image. The surface only keeps a weak
/// reference, so an image lives exactly as long as some handle does.
#[derive(Debug, Clone)]
pub struct ImageHandle(Rc<ImageInfo>);

impl ImageHandle {
    pub fn new(id: ImageId, width: u32, height: u32, path: impl Into<PathBuf>) -> Self {
        Self(Rc::new(ImageInfo {
            id,
            width,
            height,
            path: path.into(),
        }))
    }

    pub fn id(&self) -> ImageId {
        self.0.id
    }

    /// Native size `(width, height)` in pixels.
    pub fn size(&self) -> (u32, u32) {
        (self.0.width, self.0.height)
    }

    pub fn path(&self) -> &Path {
        &self.0.path
    }

    /// Number of live handles sharing this image.
    pub fn share_count(&self) -> usize {
        Rc::strong_count(&self.0)
    }

    fn downgrade(&self) -> Weak<ImageInfo> {
        Rc::downgrade(&self.0)
    }
}

impl PartialEq for ImageHandle {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl Eq for ImageHandle {}

struct Entry<T> {
    owner: Weak<ImageInfo>,
    data: T,
}

/// Backend storage for loaded images, keyed by [`ImageId`].
///
/// Each entry watches its handle weakly; [`ImageRegistry::collect_released`]
/// drops backend data (textures, decoded pixels) whose handles are all gone.
pub struct ImageRegistry<T> {
    next_id: u64,
    entries: HashMap<ImageId, Entry<T>>,
}

impl<T> Default for ImageRegistry<T> {
    fn default() -> Self {
        Self {
            next_id: 1,
            entries: HashMap::new(),
        }
    }
}

impl<T> ImageRegistry<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `data` and returns the first handle to it.
    pub fn insert(&mut self, width: u32, height: u32, path: &Path, data: T) -> ImageHandle {
        let id = ImageId(self.next_id);
        self.next_id += 1;

        let handle = ImageHandle::new(id, width, height, path);
        self.entries.insert(
            id,
            Entry {
                owner: handle.downgrade(),
                data,
            },
        );
        handle
    }

    /// Backend data for a live handle.
    ///
    /// Returns `None` for handles minted by a different registry.
    pub fn get(&self, handle: &ImageHandle) -> Option<&T> {
        self.entries
            .get(&handle.id())
            .filter(|e| Weak::ptr_eq(&e.owner, &handle.downgrade()))
            .map(|e| &e.data)
    }

    /// Drops entries whose handles were all released. Returns how many went.
    pub fn collect_released(&mut self) -> usize {
        let before = self.entries.len();
        self.entries.retain(|id, e| {
            let alive = e.owner.strong_count() > 0;
            if !alive {
                log::debug!("released {id}");
            }
            alive
        });
        before - self.entries.len()
    }

    /// Number of images still held by the registry.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_assigns_distinct_ids() {
        let mut reg = ImageRegistry::new();
        let a = reg.insert(1, 1, Path::new("a.png"), ());
        let b = reg.insert(1, 1, Path::new("b.png"), ());
        assert_ne!(a.id(), b.id());
        assert_eq!(reg.len(), 2);
    }

    #[test]
    fn entry_survives_while_any_clone_lives() {
        let mut reg = ImageRegistry::new();
        let a = reg.insert(8, 4, Path::new("a.png"), "texture");
        let shared = a.clone();
        drop(a);

        assert_eq!(reg.collect_released(), 0);
        assert_eq!(reg.get(&shared), Some(&"texture"));
        assert_eq!(shared.size(), (8, 4));

        drop(shared);
        assert_eq!(reg.collect_released(), 1);
        assert!(reg.is_empty());
    }

    #[test]
    fn foreign_handle_is_not_found() {
        let mut reg = ImageRegistry::new();
        let _own = reg.insert(1, 1, Path::new("a.png"), ());
        let foreign = ImageHandle::new(ImageId(1), 1, 1, "a.png");
        assert!(reg.get(&foreign).is_none());
    }

    #[test]
    fn handles_compare_by_identity() {
        let a = ImageHandle::new(ImageId(3), 2, 2, "x.png");
        let b = ImageHandle::new(ImageId(3), 2, 2, "x.png");
        assert_eq!(a, a.clone());
        assert_ne!(a, b);
        assert_eq!(a.clone().share_count(), 2);
    }
}
