//! Geometry normalization
//!
//! Turns a mixed point / polygon / multipolygon collection into a
//! polygon-only collection:
//! 1. multipolygons are exploded into their parts (in place, part order kept)
//! 2. points are buffered into discs
//! 3. polygons pass through unchanged
//!
//! Geometric well-formedness is not checked here.

use super::buffer::{buffer_point, BufferParams};
use geo::{Point, Polygon};
use geopair_core::{Algorithm, Error, PolygonCollection, Result, Shape, ShapeCollection};
use tracing::debug;

/// Parameters for normalization
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NormalizeParams {
    /// How points are turned into polygons
    pub buffer: BufferParams,
}

impl NormalizeParams {
    pub fn validate(&self) -> Result<()> {
        self.buffer.validate()
    }
}

/// A single-part shape, as produced by [`explode`]
#[derive(Debug, Clone, PartialEq)]
pub enum Fragment {
    Point(Point<f64>),
    Polygon(Polygon<f64>),
}

/// Normalization algorithm
#[derive(Debug, Clone, Default)]
pub struct Normalize;

impl Algorithm for Normalize {
    type Input = ShapeCollection;
    type Output = PolygonCollection;
    type Params = NormalizeParams;
    type Error = Error;

    fn name(&self) -> &'static str {
        "Normalize"
    }

    fn description(&self) -> &'static str {
        "Explode multipolygons and buffer points into a polygon-only collection"
    }

    fn execute(&self, input: Self::Input, params: Self::Params) -> Result<Self::Output> {
        normalize(&input, &params)
    }
}

/// Split every multipolygon into its parts.
///
/// Each input entry is replaced in place by its fragments, so the relative
/// order of everything is preserved. Input indices are not kept.
pub fn explode(shapes: &[Shape]) -> Vec<Fragment> {
    let mut out = Vec::with_capacity(shapes.len());
    for shape in shapes {
        match shape {
            Shape::Point(p) => out.push(Fragment::Point(*p)),
            Shape::Polygon(p) => out.push(Fragment::Polygon(p.clone())),
            Shape::MultiPolygon(mp) => {
                out.extend(mp.0.iter().cloned().map(Fragment::Polygon));
            }
        }
    }
    out
}

/// Normalize a collection into polygons only.
///
/// Multipolygons are exploded first, then every point is buffered with
/// `params.buffer`. The CRS is carried over.
pub fn normalize(input: &ShapeCollection, params: &NormalizeParams) -> Result<PolygonCollection> {
    params.validate()?;

    let fragments = explode(&input.shapes);
    let mut buffered = 0usize;

    let polygons: Vec<Polygon<f64>> = fragments
        .into_iter()
        .map(|fragment| match fragment {
            Fragment::Point(p) => {
                buffered += 1;
                buffer_point(&p, &params.buffer)
            }
            Fragment::Polygon(p) => p,
        })
        .collect();

    debug!(
        input = input.len(),
        output = polygons.len(),
        buffered,
        "normalized collection"
    );

    Ok(PolygonCollection::new(polygons, input.crs.clone()))
}

/// Keep only the entries that already are simple polygons, dropping points
/// and multipolygons.
pub fn retain_polygons(input: &ShapeCollection) -> ShapeCollection {
    let shapes = input
        .shapes
        .iter()
        .filter(|s| matches!(s, Shape::Polygon(_)))
        .cloned()
        .collect();
    ShapeCollection::new(shapes, input.crs.clone())
}
