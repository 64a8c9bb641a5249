//! Rendered page images on disk.

use std::path::{Path, PathBuf};

use labelforge_core::{GeometryError, page_order_key};
use thiserror::Error;

use crate::detector::DetectError;

/// File extensions accepted as rendered pages.
pub const PAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg"];

/// Failure to turn one page into a task. Never aborts a batch.
#[derive(Debug, Error)]
pub enum PageError {
    #[error("cannot read image {}: {source}", .path.display())]
    Image {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error(transparent)]
    Detect(#[from] DetectError),

    #[error("{}: {source}", .path.display())]
    Geometry {
        path: PathBuf,
        #[source]
        source: GeometryError,
    },
}

/// A page image whose pixel dimensions are known.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageImage {
    pub path: PathBuf,
    pub width: u32,
    pub height: u32,
}

impl PageImage {
    pub fn new(path: impl Into<PathBuf>, width: u32, height: u32) -> Self {
        Self {
            path: path.into(),
            width,
            height,
        }
    }

    /// Read the dimensions from the image header without decoding pixels.
    pub fn open(path: &Path) -> Result<Self, PageError> {
        let (width, height) =
            image::image_dimensions(path).map_err(|source| PageError::Image {
                path: path.to_path_buf(),
                source,
            })?;
        Ok(Self::new(path, width, height))
    }
}

/// Page images in `dir`, in document order.
pub fn collect_page_images(dir: &Path) -> std::io::Result<Vec<PathBuf>> {
    let mut pages = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_file() && is_page_image(&path) {
            pages.push(path);
        }
    }
    pages.sort_by_cached_key(|p| {
        page_order_key(&p.file_name().unwrap_or_default().to_string_lossy())
    });
    Ok(pages)
}

fn is_page_image(path: &Path) -> bool {
    path.extension()
        .map(|e| e.to_string_lossy().to_ascii_lowercase())
        .is_some_and(|e| PAGE_EXTENSIONS.contains(&e.as_str()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collects_pages_in_document_order() {
        let tmp = tempfile::TempDir::new().unwrap();
        for name in ["page_10.png", "page_2.png", "page_1.PNG", "notes.txt", "page_3.jpg"] {
            std::fs::write(tmp.path().join(name), b"").unwrap();
        }
        std::fs::create_dir(tmp.path().join("page_4.png")).unwrap();

        let pages = collect_page_images(tmp.path()).unwrap();
        let names: Vec<_> = pages
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, ["page_1.PNG", "page_2.png", "page_3.jpg", "page_10.png"]);
    }

    #[test]
    fn open_reads_dimensions() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("page_1.png");
        image::RgbImage::new(100, 200).save(&path).unwrap();

        let page = PageImage::open(&path).unwrap();
        assert_eq!((page.width, page.height), (100, 200));
    }

    #[test]
    fn open_missing_file_errors() {
        let err = PageImage::open(Path::new("/nonexistent/page_1.png")).unwrap_err();
        assert!(matches!(err, PageError::Image { .. }));
    }
}
