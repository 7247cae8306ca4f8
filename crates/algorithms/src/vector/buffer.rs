//! Point buffering
//!
//! Creates a buffer zone around a point as a regular polygon approximating
//! the disc of the requested radius.

use geo::{LineString, Point, Polygon};
use geopair_core::{Error, Result};
use std::f64::consts::PI;

/// Default buffer radius, in CRS units
pub const DEFAULT_BUFFER_DISTANCE: f64 = 0.01;

/// Default number of segments per quarter circle
pub const DEFAULT_QUADRANT_SEGMENTS: usize = 16;

/// Parameters for buffer operations
#[derive(Debug, Clone, PartialEq)]
pub struct BufferParams {
    /// Buffer radius (must be positive)
    pub distance: f64,
    /// Number of segments used to approximate a quarter circle (default: 16,
    /// so a full disc has 64 boundary segments)
    pub quadrant_segments: usize,
}

impl Default for BufferParams {
    fn default() -> Self {
        Self {
            distance: DEFAULT_BUFFER_DISTANCE,
            quadrant_segments: DEFAULT_QUADRANT_SEGMENTS,
        }
    }
}

impl BufferParams {
    pub fn new(distance: f64) -> Self {
        Self {
            distance,
            ..Self::default()
        }
    }

    /// Total number of boundary segments of a buffered point
    pub fn segments(&self) -> usize {
        4 * self.quadrant_segments
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.distance.is_finite() && self.distance > 0.0) {
            return Err(Error::InvalidParameter {
                name: "distance",
                value: self.distance.to_string(),
                reason: "must be a positive finite number".to_string(),
            });
        }
        if self.quadrant_segments == 0 {
            return Err(Error::InvalidParameter {
                name: "quadrant_segments",
                value: "0".to_string(),
                reason: "at least one segment per quarter circle is required".to_string(),
            });
        }
        Ok(())
    }
}

/// Create a circular buffer around a point.
///
/// The ring is counter-clockwise, starts at angle 0 and has
/// `4 * quadrant_segments + 1` coordinates (closed). Callers are expected to
/// pass validated parameters.
pub fn buffer_point(point: &Point<f64>, params: &BufferParams) -> Polygon<f64> {
    let n = params.segments().max(4);
    let r = params.distance;
    let (cx, cy) = point.x_y();

    let mut coords = Vec::with_capacity(n + 1);
    for i in 0..n {
        let angle = 2.0 * PI * i as f64 / n as f64;
        coords.push((cx + r * angle.cos(), cy + r * angle.sin()));
    }
    coords.push(coords[0]);

    Polygon::new(LineString::from(coords), vec![])
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::{Area, Centroid};

    #[test]
    fn test_buffer_point_area() {
        let point = Point::new(0.0, 0.0);
        let params = BufferParams {
            distance: 10.0,
            quadrant_segments: 16,
        };

        let polygon = buffer_point(&point, &params);

        let expected_area = PI * 100.0;
        let actual_area = polygon.unsigned_area();

        let error = (actual_area - expected_area).abs() / expected_area;
        assert!(
            error < 0.01,
            "Circle area error {:.2}% (expected {:.1}, got {:.1})",
            error * 100.0,
            expected_area,
            actual_area
        );
    }

    #[test]
    fn test_buffer_point_centroid() {
        let point = Point::new(4.5, 0.5);
        let polygon = buffer_point(&point, &BufferParams::default());
        let c = polygon.centroid().unwrap();

        assert!((c.x() - 4.5).abs() < 1e-6);
        assert!((c.y() - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_buffer_point_vertex_count() {
        let point = Point::new(5.0, 5.0);
        let params = BufferParams {
            distance: 1.0,
            quadrant_segments: 8,
        };

        let polygon = buffer_point(&point, &params);
        let ring = polygon.exterior();

        assert_eq!(ring.0.len(), 33);
        assert_eq!(ring.0.first(), ring.0.last());
    }

    #[test]
    fn test_buffer_vertices_on_circle() {
        let point = Point::new(-3.0, 2.0);
        let params = BufferParams::new(0.5);
        let polygon = buffer_point(&point, &params);

        for c in polygon.exterior().0.iter() {
            let d = ((c.x + 3.0).powi(2) + (c.y - 2.0).powi(2)).sqrt();
            assert!((d - 0.5).abs() < 1e-12);
        }
    }

    #[test]
    fn test_buffer_distance_affects_size() {
        let point = Point::new(0.0, 0.0);

        let small = buffer_point(&point, &BufferParams::new(1.0));
        let big = buffer_point(&point, &BufferParams::new(5.0));

        assert!(
            big.unsigned_area() > small.unsigned_area() * 20.0,
            "Bigger buffer should have ~25x the area"
        );
    }

    #[test]
    fn test_buffer_params_validation() {
        assert!(BufferParams::default().validate().is_ok());
        assert!(BufferParams::new(0.0).validate().is_err());
        assert!(BufferParams::new(f64::NAN).validate().is_err());
        let params = BufferParams {
            distance: 1.0,
            quadrant_segments: 0,
        };
        assert!(params.validate().is_err());
    }
}
