//! Picking photos and turning picks back into readable files.
//!
//! A pick produces a [`ContentRef`], an opaque handle that says nothing
//! about where the photo lives. [`ContentResolver`] maps handles back to
//! paths and may decline: a handle can outlive the file it points at.
//! [`MediaIndex`] implements resolution over a flat directory of photos,
//! and [`DirAccess`] stands in for the permission gate guarding it.

use async_trait::async_trait;
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

const MEDIA_SCHEME: &str = "media://";

const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "webp", "bmp"];

fn is_image(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| IMAGE_EXTENSIONS.iter().any(|known| ext.eq_ignore_ascii_case(known)))
}

/// Opaque reference to a picked photo.
///
/// Consumers must not parse it; only the resolver that minted it knows
/// what the contents mean.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ContentRef(String);

impl ContentRef {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ContentRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Source of picks. `None` means the user dismissed the chooser without
/// selecting anything.
#[async_trait]
pub trait MediaPicker: Send + Sync {
    async fn pick(&self) -> Option<ContentRef>;
}

/// Maps picked references back to readable paths.
pub trait ContentResolver: Send + Sync {
    /// `None` when the reference is unknown or the file has gone away
    /// since it was indexed.
    fn resolve(&self, content: &ContentRef) -> Option<PathBuf>;
}

/// Gate in front of the photo library.
pub trait StorageAccess: Send + Sync {
    /// Whether the library can currently be read.
    fn granted(&self) -> bool;

    /// Try to obtain access; returns the state afterwards.
    fn request(&self) -> bool;
}

/// One indexed photo.
#[derive(Debug, Clone)]
pub struct MediaEntry {
    pub content: ContentRef,
    pub path: PathBuf,
}

impl MediaEntry {
    /// Display name for choosers. Indexed entries always end in a file
    /// component, so this is the bare filename.
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.path.display().to_string())
    }
}

/// Snapshot of a photo directory, addressable through [`ContentRef`]s.
#[derive(Debug, Clone)]
pub struct MediaIndex {
    root: PathBuf,
    entries: Vec<MediaEntry>,
}

impl MediaIndex {
    /// Index every image file directly under `root`. Subdirectories are
    /// not descended into. Entries are sorted by path so the minted
    /// references are stable across runs of an unchanged library.
    pub fn scan(root: impl Into<PathBuf>) -> io::Result<Self> {
        let root = root.into();
        let mut paths = Vec::new();
        for entry in std::fs::read_dir(&root)? {
            let path = entry?.path();
            if path.is_file() && is_image(&path) {
                paths.push(path);
            }
        }
        paths.sort();

        let entries = paths
            .into_iter()
            .enumerate()
            .map(|(i, path)| MediaEntry {
                content: ContentRef::new(format!("{MEDIA_SCHEME}{i}")),
                path,
            })
            .collect();
        Ok(Self { root, entries })
    }

    /// An index with no entries, for when the library directory is
    /// missing or unreadable at startup.
    pub fn empty(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            entries: Vec::new(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn entries(&self) -> &[MediaEntry] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

impl ContentResolver for MediaIndex {
    fn resolve(&self, content: &ContentRef) -> Option<PathBuf> {
        let entry = self.entries.iter().find(|e| &e.content == content)?;
        // The file may have been deleted since the scan
        entry.path.is_file().then(|| entry.path.clone())
    }
}

/// [`StorageAccess`] backed by plain directory readability.
#[derive(Debug, Clone)]
pub struct DirAccess {
    dir: PathBuf,
}

impl DirAccess {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

impl StorageAccess for DirAccess {
    fn granted(&self) -> bool {
        std::fs::read_dir(&self.dir).is_ok()
    }

    fn request(&self) -> bool {
        if let Err(e) = std::fs::create_dir_all(&self.dir) {
            tracing::warn!(dir = %self.dir.display(), error = %e, "Could not create photo directory");
        }
        self.granted()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn photo_dir(files: &[&str]) -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        for name in files {
            fs::write(dir.path().join(name), b"jpeg bytes").unwrap();
        }
        dir
    }

    #[test]
    fn scan_indexes_images_in_name_order() {
        let dir = photo_dir(&["b.jpg", "a.jpg", "selfie.PNG"]);
        fs::create_dir(dir.path().join("albums")).unwrap();

        let index = MediaIndex::scan(dir.path()).unwrap();

        let names: Vec<String> = index.entries().iter().map(|e| e.file_name()).collect();
        assert_eq!(
            names,
            vec![
                "a.jpg".to_string(),
                "b.jpg".to_string(),
                "selfie.PNG".to_string()
            ]
        );
    }

    #[test]
    fn scan_skips_non_image_files() {
        let dir = photo_dir(&["a.jpg", "notes.txt", "backup.db"]);

        let index = MediaIndex::scan(dir.path()).unwrap();

        assert_eq!(index.len(), 1);
        assert_eq!(index.entries()[0].file_name(), "a.jpg");
    }

    #[test]
    fn scan_of_missing_directory_fails() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope");
        assert!(MediaIndex::scan(&missing).is_err());
    }

    #[test]
    fn resolve_maps_known_refs_to_paths() {
        let dir = photo_dir(&["a.jpg"]);
        let index = MediaIndex::scan(dir.path()).unwrap();

        let content = index.entries()[0].content.clone();
        assert_eq!(index.resolve(&content), Some(dir.path().join("a.jpg")));
    }

    #[test]
    fn resolve_declines_unknown_refs() {
        let dir = photo_dir(&["a.jpg"]);
        let index = MediaIndex::scan(dir.path()).unwrap();

        assert_eq!(index.resolve(&ContentRef::new("media://999")), None);
    }

    #[test]
    fn resolve_declines_deleted_files() {
        let dir = photo_dir(&["a.jpg"]);
        let index = MediaIndex::scan(dir.path()).unwrap();
        let content = index.entries()[0].content.clone();

        fs::remove_file(dir.path().join("a.jpg")).unwrap();
        assert_eq!(index.resolve(&content), None);
    }

    #[test]
    fn empty_index_resolves_nothing() {
        let index = MediaIndex::empty("./photos");
        assert!(index.is_empty());
        assert_eq!(index.resolve(&ContentRef::new("media://0")), None);
    }

    #[test]
    fn dir_access_tracks_readability() {
        let dir = tempfile::tempdir().unwrap();
        let library = dir.path().join("photos");

        let access = DirAccess::new(&library);
        assert!(!access.granted());
        assert!(access.request());
        assert!(access.granted());
    }
}
