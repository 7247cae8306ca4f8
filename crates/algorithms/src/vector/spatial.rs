//! Axis-aligned bounding boxes for the pairwise prefilter

use geo::{BoundingRect, Rect};

/// Axis-aligned bounding box
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl BoundingBox {
    pub fn new(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Self {
        Self { min_x, min_y, max_x, max_y }
    }

    /// True when the boxes overlap or touch
    pub fn intersects(&self, other: &BoundingBox) -> bool {
        self.min_x <= other.max_x
            && self.max_x >= other.min_x
            && self.min_y <= other.max_y
            && self.max_y >= other.min_y
    }

    /// Grow the box by `margin` on every side
    pub fn expand(&self, margin: f64) -> BoundingBox {
        BoundingBox {
            min_x: self.min_x - margin,
            min_y: self.min_y - margin,
            max_x: self.max_x + margin,
            max_y: self.max_y + margin,
        }
    }

    /// True when the boxes are no further than `tolerance` apart.
    ///
    /// Two geometries whose boxes fail this test cannot be within
    /// `tolerance` of each other.
    pub fn within_distance(&self, other: &BoundingBox, tolerance: f64) -> bool {
        self.expand(tolerance).intersects(other)
    }
}

impl From<Rect<f64>> for BoundingBox {
    fn from(rect: Rect<f64>) -> Self {
        BoundingBox::new(rect.min().x, rect.min().y, rect.max().x, rect.max().y)
    }
}

/// Bounding box of a geometry, `None` when it has no coordinates
pub fn bounding_box<G: BoundingRect<f64>>(geom: &G) -> Option<BoundingBox> {
    let rect: Option<Rect<f64>> = geom.bounding_rect().into();
    rect.map(BoundingBox::from)
}
