//! Mapping from page image paths to the URLs a labelling tool loads.
//!
//! The labelling tool fetches images over HTTP from a static file server
//! rooted at the folder the pages were rendered into.
//!
//! # Rules
//!
//! - Absolute path with a component named `base_folder`: keep everything
//!   after the first such component. `imagery` does not match `image`.
//! - Absolute path without `base_folder`: keep only the file name.
//! - Relative path: keep as-is.
//! - Backslashes become `/` and leading `/` is stripped before joining.

use std::path::Path;

pub const DEFAULT_BASE_URL: &str = "http://localhost:8080";
pub const DEFAULT_BASE_FOLDER: &str = "image";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageUrlConfig {
    pub base_url: String,
    pub base_folder: String,
}

impl Default for ImageUrlConfig {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL, DEFAULT_BASE_FOLDER)
    }
}

impl ImageUrlConfig {
    pub fn new(base_url: impl Into<String>, base_folder: impl Into<String>) -> Self {
        let base_url: String = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            base_folder: base_folder.into(),
        }
    }

    /// URL under which `image_path` is served.
    pub fn url_for(&self, image_path: &Path) -> String {
        format!("{}/{}", self.base_url, self.relative_path(image_path))
    }

    fn relative_path(&self, image_path: &Path) -> String {
        let rel = if image_path.is_absolute() {
            // Everything after the first component named exactly `base_folder`.
            let mut components = image_path.components();
            let found = !self.base_folder.is_empty()
                && components
                    .by_ref()
                    .any(|c| c.as_os_str() == self.base_folder.as_str());
            if found {
                components.as_path().to_string_lossy().into_owned()
            } else {
                image_path
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_default()
            }
        } else {
            image_path.to_string_lossy().into_owned()
        };

        rel.replace('\\', "/").trim_start_matches('/').to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cfg() -> ImageUrlConfig {
        ImageUrlConfig::default()
    }

    #[test]
    fn relative_path_kept() {
        assert_eq!(
            cfg().url_for(Path::new("image/decl_2023/page_1.png")),
            "http://localhost:8080/image/decl_2023/page_1.png"
        );
    }

    #[test]
    fn absolute_path_cut_after_base_folder() {
        assert_eq!(
            cfg().url_for(Path::new("/srv/work/image/decl_2023/page_3.png")),
            "http://localhost:8080/decl_2023/page_3.png"
        );
    }

    #[test]
    fn base_folder_matches_whole_components_only() {
        assert_eq!(
            cfg().url_for(Path::new("/home/imagery/image/doc/page_1.png")),
            "http://localhost:8080/doc/page_1.png"
        );
        assert_eq!(
            cfg().url_for(Path::new("/srv/images/doc/page_1.png")),
            "http://localhost:8080/page_1.png"
        );
    }

    #[test]
    fn absolute_path_outside_base_folder_uses_file_name() {
        assert_eq!(
            cfg().url_for(Path::new("/tmp/scans/page_7.png")),
            "http://localhost:8080/page_7.png"
        );
    }

    #[test]
    fn backslashes_normalised() {
        assert_eq!(
            cfg().url_for(Path::new("decl\\page_2.png")),
            "http://localhost:8080/decl/page_2.png"
        );
    }

    #[test]
    fn trailing_slash_on_base_url_trimmed() {
        let c = ImageUrlConfig::new("http://files.local:9000/", "pages");
        assert_eq!(c.base_url, "http://files.local:9000");
        assert_eq!(
            c.url_for(Path::new("/data/pages/a/page_1.png")),
            "http://files.local:9000/a/page_1.png"
        );
    }
}
