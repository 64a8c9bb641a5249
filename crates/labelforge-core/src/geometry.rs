//! Pixel-space OCR detections and their percentage-space boxes.
//!
//! The OCR collaborator reports each text span as a polygon in pixel
//! coordinates, corners ordered top-left, top-right, bottom-right,
//! bottom-left. Labelling tools address regions as percentages of the image
//! size, so every polygon is reduced to a [`NormalizedBox`] before it enters
//! the interchange format.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A 2-D point in pixel space, `[x, y]`.
pub type Point = [f64; 2];

/// Index of the top-left corner in a detector polygon.
const TOP_LEFT: usize = 0;
/// Index of the bottom-right corner in a detector polygon.
const BOTTOM_RIGHT: usize = 2;
/// Detector polygons are quadrilaterals at minimum.
pub const MIN_POLYGON_POINTS: usize = 4;

#[derive(Debug, Error, PartialEq)]
pub enum GeometryError {
    #[error("image has zero area ({width}x{height}); cannot normalise boxes")]
    EmptyImage { width: u32, height: u32 },

    #[error("polygon has {points} points, need at least {MIN_POLYGON_POINTS}")]
    MalformedPolygon { points: usize },

    #[error("polygon point {index} is not finite: {point:?}")]
    NonFiniteCoordinate { index: usize, point: Point },
}

/// One OCR-recognised text span.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    pub polygon: Vec<Point>,
    pub text: String,
    /// Recognition confidence, when the detector reports one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<f32>,
}

impl Detection {
    pub fn new(polygon: Vec<Point>, text: impl Into<String>) -> Self {
        Self {
            polygon,
            text: text.into(),
            score: None,
        }
    }

    /// Whether the recognised text carries anything but whitespace.
    pub fn has_text(&self) -> bool {
        !self.text.trim().is_empty()
    }
}

/// An axis-aligned box as percentages (0-100) of the image width/height.
///
/// `rotation` is always `0` for boxes derived from detections. No clamping
/// is applied: a polygon whose corners are out of order yields a negative
/// `width` or `height`, and that value is carried through untouched.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NormalizedBox {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    #[serde(default)]
    pub rotation: f64,
}

impl NormalizedBox {
    /// Reduce a detector polygon to a percentage box.
    ///
    /// `(x, y)` is the top-left corner and `(width, height)` is bottom-right
    /// minus top-left, each divided by the image dimension and scaled by 100.
    pub fn from_polygon(
        polygon: &[Point],
        image_width: u32,
        image_height: u32,
    ) -> Result<Self, GeometryError> {
        if image_width == 0 || image_height == 0 {
            return Err(GeometryError::EmptyImage {
                width: image_width,
                height: image_height,
            });
        }
        if polygon.len() < MIN_POLYGON_POINTS {
            return Err(GeometryError::MalformedPolygon {
                points: polygon.len(),
            });
        }
        if let Some((index, point)) = polygon
            .iter()
            .enumerate()
            .find(|(_, p)| !(p[0].is_finite() && p[1].is_finite()))
        {
            return Err(GeometryError::NonFiniteCoordinate {
                index,
                point: *point,
            });
        }

        let [left, top] = polygon[TOP_LEFT];
        let [right, bottom] = polygon[BOTTOM_RIGHT];
        let w = f64::from(image_width);
        let h = f64::from(image_height);

        Ok(Self {
            x: 100.0 * left / w,
            y: 100.0 * top / h,
            width: 100.0 * (right - left) / w,
            height: 100.0 * (bottom - top) / h,
            rotation: 0.0,
        })
    }

    /// `[x, y, width, height]`, the layout used by the flattened dataset.
    pub fn to_array(&self) -> [f64; 4] {
        [self.x, self.y, self.width, self.height]
    }
}
