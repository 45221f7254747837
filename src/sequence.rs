use anyhow::{Context, Result};
use log::debug;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

const PICTURE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "webp", "bmp"];

const TIFF_EXTENSIONS: &[&str] = if cfg!(feature = "image-tiff") {
    &["tif", "tiff"]
} else {
    &[]
};

const AVIF_EXTENSIONS: &[&str] = if cfg!(feature = "image-avif") {
    &["avif"]
} else {
    &[]
};

/// Ordered, immutable list of the pictures being browsed
#[derive(Clone, Debug)]
pub struct SequenceIndex {
    paths: Arc<[PathBuf]>,
}

impl SequenceIndex {
    /// Pictures directly inside `dir`, sorted by file name
    pub fn from_dir(dir: &Path) -> Result<Self> {
        let entries = fs::read_dir(dir)
            .with_context(|| format!("Failed to read picture directory: {:?}", dir))?;

        let mut paths = Vec::new();
        for entry in entries {
            let entry = entry.with_context(|| format!("Failed to list directory: {:?}", dir))?;
            let path = entry.path();
            if path.is_file() && is_picture(&path) {
                paths.push(path);
            }
        }
        paths.sort_by(|a, b| a.file_name().cmp(&b.file_name()));

        debug!("Found {} pictures in {:?}", paths.len(), dir);
        Ok(Self::from_paths(paths))
    }

    pub fn from_paths(paths: Vec<PathBuf>) -> Self {
        Self {
            paths: paths.into(),
        }
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    pub fn get(&self, pos: usize) -> Option<&Path> {
        self.paths.get(pos).map(PathBuf::as_path)
    }

    /// File name of the picture at `pos`, for status lines
    pub fn file_name(&self, pos: usize) -> Option<String> {
        self.get(pos)
            .and_then(Path::file_name)
            .map(|name| name.to_string_lossy().into_owned())
    }

    pub fn paths(&self) -> Arc<[PathBuf]> {
        self.paths.clone()
    }
}

fn is_picture(path: &Path) -> bool {
    path.extension()
        .map(|ext| ext.to_string_lossy().to_lowercase())
        .is_some_and(|ext| {
            let ext = ext.as_str();
            PICTURE_EXTENSIONS.contains(&ext)
                || TIFF_EXTENSIONS.contains(&ext)
                || AVIF_EXTENSIONS.contains(&ext)
        })
}
