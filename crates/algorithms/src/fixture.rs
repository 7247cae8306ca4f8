//! Sample dataset used by the CLI `fixture` command, tests and benches
//!
//! 19 polygons after normalization:
//! - 5 unit squares on the x axis, none touching
//! - 5 unit squares above them, forming two overlapping pairs and one loner
//! - 2 multipolygons, each made of two overlapping discs
//! - 5 points, the last one inside the third square

use crate::vector::{buffer_point, BufferParams};
use geo::{LineString, MultiPolygon, Point, Polygon};
use geopair_core::{Shape, ShapeCollection, CRS};

/// EPSG code the sample dataset is tagged with
pub const SAMPLE_EPSG: u32 = 3857;

fn square(x0: f64, y0: f64, size: f64) -> Polygon<f64> {
    let (x1, y1) = (x0 + size, y0 + size);
    Polygon::new(
        LineString::from(vec![(x0, y0), (x1, y0), (x1, y1), (x0, y1), (x0, y0)]),
        vec![],
    )
}

fn disc(x: f64, y: f64, radius: f64) -> Polygon<f64> {
    buffer_point(&Point::new(x, y), &BufferParams::new(radius))
}

/// Standalone unit squares at x = 0, 2, 4, 6, 8
pub fn standalone_polygons() -> Vec<Polygon<f64>> {
    (0..5).map(|i| square(2.0 * i as f64, 0.0, 1.0)).collect()
}

/// Squares forming two overlapping pairs plus one without partner
pub fn intersecting_polygons() -> Vec<Polygon<f64>> {
    vec![
        square(0.0, 2.0, 1.0),
        square(0.5, 1.5, 1.0),
        square(2.0, 2.0, 1.0),
        square(2.5, 1.5, 1.0),
        square(4.0, 2.0, 1.0),
    ]
}

/// Two multipolygons of two overlapping discs each
pub fn multipolygons() -> Vec<MultiPolygon<f64>> {
    vec![
        MultiPolygon::new(vec![disc(6.0, 2.0, 0.05), disc(6.05, 2.0, 0.09)]),
        MultiPolygon::new(vec![disc(8.5, 1.5, 0.05), disc(8.55, 1.5, 0.09)]),
    ]
}

/// Sample points; the last lies inside the third standalone square
pub fn points() -> Vec<Point<f64>> {
    vec![
        Point::new(0.5, 4.0),
        Point::new(3.0, 4.0),
        Point::new(6.5, 4.0),
        Point::new(9.0, 4.0),
        Point::new(4.5, 0.5),
    ]
}

/// The full sample collection, tagged EPSG:3857
pub fn sample_collection() -> ShapeCollection {
    let shapes = standalone_polygons()
        .into_iter()
        .chain(intersecting_polygons())
        .map(Shape::Polygon)
        .chain(multipolygons().into_iter().map(Shape::MultiPolygon))
        .chain(points().into_iter().map(Shape::Point))
        .collect();
    ShapeCollection::new(shapes, CRS::from_epsg(SAMPLE_EPSG))
}
