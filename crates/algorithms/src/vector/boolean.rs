//! Boolean overlay of polygon pairs
//!
//! - Intersection: the region common to both polygons, together with any
//!   shared boundary (lines and/or points) lying outside that region.
//! - Difference: the region of the first polygon not covered by the second.
//!
//! Area operations use `geo::BooleanOps`. Inputs are validated before each
//! pairwise operation; invalid polygons are reported, never repaired.

use super::relation::AdjacencyRelation;
use super::validate::validate_polygon;
use crate::maybe_rayon::*;
use geo::line_intersection::{line_intersection, LineIntersection};
use geo::{
    BooleanOps, Coord, Distance, Euclidean, Geometry, GeometryCollection, Intersects, Line,
    LineString, MultiLineString, MultiPoint, MultiPolygon, Point, Polygon,
};
use geopair_core::{Algorithm, Error, PolygonCollection, Result};
use std::fmt;
use tracing::{debug, warn};

/// Overlay operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum BooleanOp {
    Intersection,
    #[default]
    Difference,
}

impl BooleanOp {
    pub fn as_str(&self) -> &'static str {
        match self {
            BooleanOp::Intersection => "intersection",
            BooleanOp::Difference => "difference",
        }
    }
}

impl fmt::Display for BooleanOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What to do when a pair cannot be processed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ErrorPolicy {
    /// Stop at the first failing pair
    #[default]
    Abort,
    /// Log the failure and continue with the next pair
    Skip,
}

/// Parameters for pairwise overlay
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OverlayParams {
    pub op: BooleanOp,
    pub on_error: ErrorPolicy,
}

/// Result of one pairwise operation
#[derive(Debug, Clone, PartialEq)]
pub struct BooleanResult {
    /// Index of the first operand
    pub left: usize,
    /// Index of the second operand
    pub right: usize,
    pub op: BooleanOp,
    pub geometry: Geometry<f64>,
}

impl BooleanResult {
    /// True when the operation produced nothing
    pub fn is_empty(&self) -> bool {
        is_empty_geometry(&self.geometry)
    }
}

/// Pairwise overlay algorithm
#[derive(Debug, Clone, Default)]
pub struct Overlay;

impl Algorithm for Overlay {
    type Input = (PolygonCollection, AdjacencyRelation);
    type Output = Vec<BooleanResult>;
    type Params = OverlayParams;
    type Error = Error;

    fn name(&self) -> &'static str {
        "Overlay"
    }

    fn description(&self) -> &'static str {
        "Compute the intersection or difference of every related polygon pair"
    }

    fn execute(&self, input: Self::Input, params: Self::Params) -> Result<Self::Output> {
        let (collection, relation) = input;
        overlay_pairs(&collection, &relation, params.op, params.on_error)
    }
}

/// True for geometries without any coordinates
pub fn is_empty_geometry(geom: &Geometry<f64>) -> bool {
    match geom {
        Geometry::Point(_) | Geometry::Line(_) | Geometry::Rect(_) | Geometry::Triangle(_) => false,
        Geometry::LineString(ls) => ls.0.is_empty(),
        Geometry::Polygon(p) => p.exterior().0.is_empty(),
        Geometry::MultiPoint(mp) => mp.0.is_empty(),
        Geometry::MultiLineString(mls) => mls.0.iter().all(|ls| ls.0.is_empty()),
        Geometry::MultiPolygon(mp) => mp.0.iter().all(|p| p.exterior().0.is_empty()),
        Geometry::GeometryCollection(gc) => gc.0.iter().all(is_empty_geometry),
    }
}

/// Intersection of two polygons.
///
/// The common area comes first. Shared edges (MultiLineString) and isolated
/// contact vertices (Point/MultiPoint) outside that area are added to it; an
/// area plus such contacts is returned as a GeometryCollection. No contact at
/// all gives an empty GeometryCollection.
pub fn intersection(a: &Polygon<f64>, b: &Polygon<f64>) -> Geometry<f64> {
    let area = a.intersection(b);
    let (mut lines, mut points) = boundary_contact(a, b);

    if !area.0.is_empty() {
        let tolerance = snap_tolerance(a, b);
        lines.retain(|l| !on_area(&area, l.start + l.delta() / 2.0, tolerance));
        points.retain(|c| !on_area(&area, *c, tolerance));
    }

    let contact = contact_geometry(lines, points);
    if area.0.is_empty() {
        return contact;
    }
    let area = collapse(area);
    match contact {
        Geometry::GeometryCollection(gc) if gc.0.is_empty() => area,
        Geometry::GeometryCollection(gc) => {
            let mut parts = vec![area];
            parts.extend(gc.0);
            Geometry::GeometryCollection(GeometryCollection(parts))
        }
        other => Geometry::GeometryCollection(GeometryCollection(vec![area, other])),
    }
}

/// Region of `a` not covered by `b`; an empty MultiPolygon when `b` covers `a`
pub fn difference(a: &Polygon<f64>, b: &Polygon<f64>) -> Geometry<f64> {
    collapse(a.difference(b))
}

/// Apply `op` to a polygon pair without validating the inputs
pub fn boolean_op(a: &Polygon<f64>, b: &Polygon<f64>, op: BooleanOp) -> Geometry<f64> {
    match op {
        BooleanOp::Intersection => intersection(a, b),
        BooleanOp::Difference => difference(a, b),
    }
}

/// Validate polygons `left` and `right` of the collection and apply `op`.
///
/// Errors carry both indices so a failing pair can be identified.
pub fn overlay_pair(
    collection: &PolygonCollection,
    left: usize,
    right: usize,
    op: BooleanOp,
) -> Result<BooleanResult> {
    let pair_error = |reason: String| Error::BooleanOp {
        left,
        right,
        op: op.to_string(),
        reason,
    };

    let a = collection
        .get(left)
        .ok_or_else(|| pair_error(format!("index {} out of range", left)))?;
    let b = collection
        .get(right)
        .ok_or_else(|| pair_error(format!("index {} out of range", right)))?;

    validate_polygon(a, left).map_err(|e| pair_error(e.to_string()))?;
    validate_polygon(b, right).map_err(|e| pair_error(e.to_string()))?;

    Ok(BooleanResult {
        left,
        right,
        op,
        geometry: boolean_op(a, b, op),
    })
}

/// Run `op` on every pair recorded in `relation`, in relation order.
///
/// Pairs are processed in parallel when the `parallel` feature is enabled;
/// the output order does not depend on it.
pub fn overlay_pairs(
    collection: &PolygonCollection,
    relation: &AdjacencyRelation,
    op: BooleanOp,
    on_error: ErrorPolicy,
) -> Result<Vec<BooleanResult>> {
    let pairs: Vec<(usize, usize)> = relation.pairs().collect();

    let outcomes: Vec<Result<BooleanResult>> = pairs
        .par_iter()
        .map(|&(i, j)| overlay_pair(collection, i, j, op))
        .collect();

    let mut results = Vec::with_capacity(outcomes.len());
    let mut failed = 0usize;
    for outcome in outcomes {
        match outcome {
            Ok(result) => results.push(result),
            Err(e) => match on_error {
                ErrorPolicy::Abort => return Err(e),
                ErrorPolicy::Skip => {
                    warn!("skipping pair: {}", e);
                    failed += 1;
                }
            },
        }
    }

    debug!(%op, pairs = pairs.len(), failed, "overlay finished");
    Ok(results)
}

/// Write a single-part MultiPolygon as a Polygon
fn collapse(mut mp: MultiPolygon<f64>) -> Geometry<f64> {
    if mp.0.len() == 1 {
        if let Some(p) = mp.0.pop() {
            return Geometry::Polygon(p);
        }
    }
    Geometry::MultiPolygon(mp)
}

fn edges(p: &Polygon<f64>) -> Vec<Line<f64>> {
    std::iter::once(p.exterior())
        .chain(p.interiors().iter())
        .flat_map(|ring| ring.lines())
        .collect()
}

/// Distance below which a contact counts as lying on the area result.
///
/// The overlay snaps coordinates to a grid relative to the largest
/// coordinate, so the bound scales with it.
fn snap_tolerance(a: &Polygon<f64>, b: &Polygon<f64>) -> f64 {
    let largest = std::iter::once(a.exterior())
        .chain(a.interiors())
        .chain(std::iter::once(b.exterior()))
        .chain(b.interiors())
        .flat_map(|ring| ring.0.iter())
        .fold(1.0_f64, |m, c| m.max(c.x.abs()).max(c.y.abs()));
    1e-7 * largest
}

fn on_area(area: &MultiPolygon<f64>, c: Coord<f64>, tolerance: f64) -> bool {
    let p = Point::from(c);
    area.0.iter().any(|poly| Euclidean.distance(&p, poly) <= tolerance)
}

/// Edges and vertices where the boundaries of `a` and `b` meet.
///
/// Vertices already lying on a returned edge are left out.
fn boundary_contact(a: &Polygon<f64>, b: &Polygon<f64>) -> (Vec<Line<f64>>, Vec<Coord<f64>>) {
    let edges_b = edges(b);
    let mut lines: Vec<Line<f64>> = Vec::new();
    let mut points: Vec<Coord<f64>> = Vec::new();

    for ea in edges(a) {
        for eb in &edges_b {
            match line_intersection(ea, *eb) {
                Some(LineIntersection::Collinear { intersection }) => {
                    if !lines.contains(&intersection) {
                        lines.push(intersection);
                    }
                }
                Some(LineIntersection::SinglePoint { intersection, .. }) => {
                    if !points.contains(&intersection) {
                        points.push(intersection);
                    }
                }
                None => {}
            }
        }
    }

    points.retain(|c| !lines.iter().any(|l| l.intersects(c)));
    (lines, points)
}

fn contact_geometry(lines: Vec<Line<f64>>, points: Vec<Coord<f64>>) -> Geometry<f64> {
    let lines = MultiLineString::new(
        lines
            .into_iter()
            .map(|l| LineString::new(vec![l.start, l.end]))
            .collect(),
    );
    let points: Vec<Point<f64>> = points.into_iter().map(Point::from).collect();

    match (lines.0.is_empty(), points.len()) {
        (true, 0) => Geometry::GeometryCollection(GeometryCollection(vec![])),
        (true, 1) => Geometry::Point(points[0]),
        (true, _) => Geometry::MultiPoint(MultiPoint::new(points)),
        (false, 0) => Geometry::MultiLineString(lines),
        (false, _) => Geometry::GeometryCollection(GeometryCollection(vec![
            Geometry::MultiLineString(lines),
            Geometry::MultiPoint(MultiPoint::new(points)),
        ])),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vector::buffer::{buffer_point, BufferParams};
    use crate::vector::relation::{find_intersecting_pairs, RelationParams};
    use geo::Area;
    use geopair_core::CRS;

    fn rect(x0: f64, y0: f64, x1: f64, y1: f64) -> Polygon<f64> {
        Polygon::new(
            LineString::from(vec![(x0, y0), (x1, y0), (x1, y1), (x0, y1), (x0, y0)]),
            vec![],
        )
    }

    fn area(geom: &Geometry<f64>) -> f64 {
        match geom {
            Geometry::Polygon(p) => p.unsigned_area(),
            Geometry::MultiPolygon(mp) => mp.unsigned_area(),
            _ => 0.0,
        }
    }

    #[test]
    fn test_intersection_of_overlapping_squares() {
        let a = rect(0.0, 2.0, 1.0, 3.0);
        let b = rect(0.5, 1.5, 1.5, 2.5);

        let inter = intersection(&a, &b);
        assert!(matches!(inter, Geometry::Polygon(_)));
        assert!((area(&inter) - 0.25).abs() < 1e-6);
    }

    #[test]
    fn test_difference_is_not_symmetric() {
        let a = rect(0.0, 0.0, 2.0, 2.0);
        let b = rect(1.0, 0.0, 4.0, 2.0);

        let ab = difference(&a, &b);
        let ba = difference(&b, &a);
        assert!((area(&ab) - 2.0).abs() < 1e-6);
        assert!((area(&ba) - 4.0).abs() < 1e-6);
    }

    #[test]
    fn test_difference_plus_intersection_rebuilds_operand() {
        let a = buffer_point(&Point::new(6.0, 2.0), &BufferParams::new(0.05));
        let b = buffer_point(&Point::new(6.05, 2.0), &BufferParams::new(0.09));

        let inter = area(&intersection(&a, &b));
        let diff = area(&difference(&a, &b));
        let total = a.unsigned_area();
        assert!(inter > 0.0);
        assert!(diff > 0.0);
        assert!((inter + diff - total).abs() / total < 1e-6);
    }

    #[test]
    fn test_difference_of_covered_polygon_is_empty() {
        let inner = buffer_point(&Point::new(4.5, 0.5), &BufferParams::default());
        let outer = rect(4.0, 0.0, 5.0, 1.0);

        let diff = difference(&inner, &outer);
        assert!(is_empty_geometry(&diff));

        let ring = difference(&outer, &inner);
        match ring {
            Geometry::Polygon(p) => assert_eq!(p.interiors().len(), 1),
            other => panic!("expected polygon with hole, got {:?}", other),
        }
    }

    #[test]
    fn test_edge_touching_intersection_is_line() {
        let a = rect(0.0, 0.0, 1.0, 1.0);
        let b = rect(1.0, 0.0, 2.0, 1.0);

        match intersection(&a, &b) {
            Geometry::MultiLineString(mls) => {
                assert_eq!(mls.0.len(), 1);
                let ls = &mls.0[0];
                assert!(ls.0.iter().all(|c| (c.x - 1.0).abs() < 1e-12));
            }
            other => panic!("expected shared edge, got {:?}", other),
        }
    }

    #[test]
    fn test_overlap_and_touch_keeps_both() {
        // U with arms x in [0, 1] and [2, 3]
        let u = Polygon::new(
            LineString::from(vec![
                (0.0, 0.0),
                (3.0, 0.0),
                (3.0, 3.0),
                (2.0, 3.0),
                (2.0, 1.0),
                (1.0, 1.0),
                (1.0, 3.0),
                (0.0, 3.0),
                (0.0, 0.0),
            ]),
            vec![],
        );
        let bar = rect(0.5, 2.0, 2.0, 2.5);

        match intersection(&u, &bar) {
            Geometry::GeometryCollection(gc) => {
                assert_eq!(gc.0.len(), 2);
                assert!((area(&gc.0[0]) - 0.25).abs() < 1e-6);
                match &gc.0[1] {
                    Geometry::MultiLineString(mls) => {
                        assert_eq!(mls.0.len(), 1);
                        assert!(mls.0[0].0.iter().all(|c| (c.x - 2.0).abs() < 1e-12
                            && c.y >= 2.0 - 1e-12
                            && c.y <= 2.5 + 1e-12));
                    }
                    other => panic!("expected shared edge, got {:?}", other),
                }
            }
            other => panic!("expected area and edge, got {:?}", other),
        }
    }

    #[test]
    fn test_edges_on_area_boundary_not_repeated() {
        let a = rect(0.0, 0.0, 2.0, 1.0);
        let b = rect(1.0, 0.0, 3.0, 1.0);

        let inter = intersection(&a, &b);
        assert!(matches!(inter, Geometry::Polygon(_)), "{:?}", inter);
        assert!((area(&inter) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_vertex_touching_intersection_is_point() {
        let a = rect(0.0, 0.0, 1.0, 1.0);
        let b = rect(1.0, 1.0, 2.0, 2.0);
        assert_eq!(intersection(&a, &b), Geometry::Point(Point::new(1.0, 1.0)));
    }

    #[test]
    fn test_disjoint_intersection_is_empty() {
        let a = rect(0.0, 0.0, 1.0, 1.0);
        let b = rect(2.0, 0.0, 3.0, 1.0);
        assert!(is_empty_geometry(&intersection(&a, &b)));
    }

    #[test]
    fn test_zero_distance_iff_non_empty_intersection() {
        let polygons = vec![
            rect(0.0, 0.0, 1.0, 1.0),
            rect(1.0, 0.0, 2.0, 1.0),
            rect(1.0, 1.0, 3.0, 3.0),
            rect(0.5, 0.5, 1.5, 1.5),
            rect(5.0, 5.0, 6.0, 6.0),
        ];
        let collection = PolygonCollection::new(polygons.clone(), CRS::web_mercator());
        let relation = find_intersecting_pairs(&collection, &RelationParams::default()).unwrap();

        for i in 0..polygons.len() {
            for j in 0..polygons.len() {
                if i == j {
                    continue;
                }
                let non_empty = !is_empty_geometry(&intersection(&polygons[i], &polygons[j]));
                assert_eq!(relation.contains(i, j), non_empty, "pair ({}, {})", i, j);
            }
        }
    }

    #[test]
    fn test_overlay_pair_reports_invalid_operand() {
        let bowtie = Polygon::new(
            LineString::from(vec![(0.0, 0.0), (1.0, 1.0), (1.0, 0.0), (0.0, 1.0), (0.0, 0.0)]),
            vec![],
        );
        let collection =
            PolygonCollection::new(vec![rect(0.0, 0.0, 1.0, 1.0), bowtie], CRS::web_mercator());

        let err = overlay_pair(&collection, 0, 1, BooleanOp::Difference).unwrap_err();
        assert_eq!(err.pair(), Some((0, 1)));
        assert!(err.to_string().contains("self-intersection"));
    }

    #[test]
    fn test_overlay_pair_out_of_range() {
        let collection = PolygonCollection::new(vec![rect(0.0, 0.0, 1.0, 1.0)], CRS::web_mercator());
        assert!(overlay_pair(&collection, 0, 3, BooleanOp::Intersection).is_err());
    }

    #[test]
    fn test_overlay_pairs_error_policy() {
        let bowtie = Polygon::new(
            LineString::from(vec![(0.0, 0.0), (1.0, 1.0), (1.0, 0.0), (0.0, 1.0), (0.0, 0.0)]),
            vec![],
        );
        let collection = PolygonCollection::new(
            vec![
                rect(0.0, 0.0, 1.0, 1.0),
                rect(0.5, 0.0, 2.0, 1.0),
                bowtie,
            ],
            CRS::web_mercator(),
        );
        let relation: AdjacencyRelation = vec![(0, 1), (1, 0), (0, 2)].into_iter().collect();

        let aborted = overlay_pairs(&collection, &relation, BooleanOp::Difference, ErrorPolicy::Abort);
        assert!(aborted.is_err());

        let skipped =
            overlay_pairs(&collection, &relation, BooleanOp::Difference, ErrorPolicy::Skip).unwrap();
        let pairs: Vec<_> = skipped.iter().map(|r| (r.left, r.right)).collect();
        assert_eq!(pairs, vec![(0, 1), (1, 0)]);
    }

    #[test]
    fn test_overlay_algorithm_trait() {
        let collection = PolygonCollection::new(
            vec![rect(0.0, 0.0, 1.0, 1.0), rect(0.5, 0.5, 1.5, 1.5)],
            CRS::web_mercator(),
        );
        let relation = find_intersecting_pairs(&collection, &RelationParams::default()).unwrap();
        let params = OverlayParams {
            op: BooleanOp::Intersection,
            on_error: ErrorPolicy::Abort,
        };

        let results = Overlay.execute((collection, relation), params).unwrap();
        assert_eq!(results.len(), 2);
        assert!(results.iter().all(|r| r.op == BooleanOp::Intersection && !r.is_empty()));
    }
}
