//! Seam to the external OCR engine.
//!
//! The engine runs out of process. It hands its results over as a sidecar
//! JSON file per page: `page_1.png` → `page_1.ocr.json`, an array of
//! `{polygon, text, score?}` objects in reading order.

use std::path::{Path, PathBuf};

use labelforge_core::Detection;
use thiserror::Error;

use crate::page::PageImage;

/// Suffix replacing the image extension for sidecar detection files.
pub const SIDECAR_SUFFIX: &str = "ocr.json";

#[derive(Debug, Error)]
pub enum DetectError {
    #[error("no detections for {}: {} not found", .page.display(), .sidecar.display())]
    Missing { page: PathBuf, sidecar: PathBuf },

    #[error("cannot read detections {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed detections {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Anything that turns a page image into ordered text detections.
pub trait TextDetector: Send + Sync {
    fn detect(&self, page: &PageImage) -> Result<Vec<Detection>, DetectError>;
}

/// Reads detections written by the OCR engine next to each page, or into
/// a separate directory.
#[derive(Debug, Clone, Default)]
pub struct SidecarDetector {
    dir: Option<PathBuf>,
}

impl SidecarDetector {
    /// Look for sidecars beside each page image.
    pub fn beside_pages() -> Self {
        Self { dir: None }
    }

    /// Look for sidecars in `dir`, matched by page file stem.
    pub fn in_dir(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: Some(dir.into()),
        }
    }

    pub fn sidecar_path(&self, page: &Path) -> PathBuf {
        let stem = page.file_stem().unwrap_or_default().to_string_lossy();
        let name = format!("{stem}.{SIDECAR_SUFFIX}");
        match &self.dir {
            Some(dir) => dir.join(name),
            None => page.with_file_name(name),
        }
    }
}

impl TextDetector for SidecarDetector {
    fn detect(&self, page: &PageImage) -> Result<Vec<Detection>, DetectError> {
        let sidecar = self.sidecar_path(&page.path);
        if !sidecar.exists() {
            return Err(DetectError::Missing {
                page: page.path.clone(),
                sidecar,
            });
        }
        let raw = std::fs::read_to_string(&sidecar).map_err(|source| DetectError::Io {
            path: sidecar.clone(),
            source,
        })?;
        serde_json::from_str(&raw).map_err(|source| DetectError::Parse {
            path: sidecar,
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sidecar_beside_page() {
        let d = SidecarDetector::beside_pages();
        assert_eq!(
            d.sidecar_path(Path::new("image/doc/page_3.png")),
            PathBuf::from("image/doc/page_3.ocr.json")
        );
    }

    #[test]
    fn sidecar_in_separate_dir() {
        let d = SidecarDetector::in_dir("ocr/doc");
        assert_eq!(
            d.sidecar_path(Path::new("image/doc/page_3.png")),
            PathBuf::from("ocr/doc/page_3.ocr.json")
        );
    }

    #[test]
    fn reads_detections_in_order() {
        let tmp = tempfile::TempDir::new().unwrap();
        let page = PageImage::new(tmp.path().join("page_1.png"), 100, 100);
        std::fs::write(
            tmp.path().join("page_1.ocr.json"),
            r#"[
                {"polygon": [[1,1],[9,1],[9,4],[1,4]], "text": "NOME", "score": 0.98},
                {"polygon": [[1,5],[9,5],[9,8],[1,8]], "text": "CPF"}
            ]"#,
        )
        .unwrap();

        let detections = SidecarDetector::beside_pages().detect(&page).unwrap();
        assert_eq!(detections.len(), 2);
        assert_eq!(detections[0].text, "NOME");
        assert_eq!(detections[0].score, Some(0.98));
        assert_eq!(detections[1].text, "CPF");
    }

    #[test]
    fn missing_sidecar_errors() {
        let tmp = tempfile::TempDir::new().unwrap();
        let page = PageImage::new(tmp.path().join("page_9.png"), 100, 100);
        let err = SidecarDetector::beside_pages().detect(&page).unwrap_err();
        assert!(matches!(err, DetectError::Missing { .. }));
    }

    #[test]
    fn malformed_sidecar_errors() {
        let tmp = tempfile::TempDir::new().unwrap();
        let page = PageImage::new(tmp.path().join("page_1.png"), 100, 100);
        std::fs::write(tmp.path().join("page_1.ocr.json"), r#"[{"text": "x"}]"#).unwrap();
        let err = SidecarDetector::beside_pages().detect(&page).unwrap_err();
        assert!(matches!(err, DetectError::Parse { .. }));
    }
}
