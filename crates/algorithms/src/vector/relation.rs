//! Pairwise intersection detection
//!
//! Finds every ordered pair `(i, j)`, `i != j`, of polygons whose planar
//! distance is zero within a tolerance. Polygons that only share an edge or
//! a vertex count as intersecting, the same as overlapping ones.
//!
//! The scan compares all pairs (O(n²)). Rows are processed in parallel when
//! the `parallel` feature is enabled; a bounding-box gap larger than the
//! tolerance rejects a pair before the exact distance is computed.

use super::spatial::{bounding_box, BoundingBox};
use crate::maybe_rayon::*;
use geo::{Distance, Euclidean, Polygon};
use geopair_core::{Algorithm, Error, PolygonCollection, Result};
use std::collections::BTreeMap;
use tracing::debug;

/// Default distance below which two geometries are considered intersecting
pub const DEFAULT_TOLERANCE: f64 = 1e-9;

/// Parameters for the pairwise relation scan
#[derive(Debug, Clone, PartialEq)]
pub struct RelationParams {
    /// Maximum planar distance still counted as "touching" (default: 1e-9)
    pub tolerance: f64,
}

impl Default for RelationParams {
    fn default() -> Self {
        Self {
            tolerance: DEFAULT_TOLERANCE,
        }
    }
}

impl RelationParams {
    pub fn validate(&self) -> Result<()> {
        if !(self.tolerance.is_finite() && self.tolerance >= 0.0) {
            return Err(Error::InvalidParameter {
                name: "tolerance",
                value: self.tolerance.to_string(),
                reason: "must be a non-negative finite number".to_string(),
            });
        }
        Ok(())
    }
}

/// Which geometries intersect which.
///
/// Maps a geometry index to the indices recorded against it. Entries are
/// kept in ascending source index; partners stay in recording order, which
/// for [`find_intersecting_pairs`] is ascending as well. Duplicates are not
/// filtered.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AdjacencyRelation {
    partners: BTreeMap<usize, Vec<usize>>,
}

impl AdjacencyRelation {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `j` as intersecting `i`
    pub fn insert(&mut self, i: usize, j: usize) {
        self.partners.entry(i).or_default().push(j);
    }

    /// Indices recorded against `i`
    pub fn partners(&self, i: usize) -> &[usize] {
        self.partners.get(&i).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Indices that have at least one partner, ascending
    pub fn sources(&self) -> impl Iterator<Item = usize> + '_ {
        self.partners.keys().copied()
    }

    /// Every recorded ordered pair
    pub fn pairs(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.partners
            .iter()
            .flat_map(|(&i, js)| js.iter().map(move |&j| (i, j)))
    }

    /// Recorded pairs with `i < j`, i.e. each symmetric pair once
    pub fn unordered_pairs(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.pairs().filter(|(i, j)| i < j)
    }

    pub fn contains(&self, i: usize, j: usize) -> bool {
        self.partners(i).contains(&j)
    }

    /// Number of recorded ordered pairs
    pub fn len(&self) -> usize {
        self.partners.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// True when every `(i, j)` has a matching `(j, i)`
    pub fn is_symmetric(&self) -> bool {
        self.pairs().all(|(i, j)| self.contains(j, i))
    }
}

impl FromIterator<(usize, usize)> for AdjacencyRelation {
    fn from_iter<T: IntoIterator<Item = (usize, usize)>>(iter: T) -> Self {
        let mut relation = AdjacencyRelation::new();
        for (i, j) in iter {
            relation.insert(i, j);
        }
        relation
    }
}

/// Pairwise relation algorithm
#[derive(Debug, Clone, Default)]
pub struct PairwiseRelation;

impl Algorithm for PairwiseRelation {
    type Input = PolygonCollection;
    type Output = AdjacencyRelation;
    type Params = RelationParams;
    type Error = Error;

    fn name(&self) -> &'static str {
        "PairwiseRelation"
    }

    fn description(&self) -> &'static str {
        "Find all ordered pairs of polygons at zero planar distance"
    }

    fn execute(&self, input: Self::Input, params: Self::Params) -> Result<Self::Output> {
        find_intersecting_pairs(&input, &params)
    }
}

/// Planar Euclidean distance between two polygons (0 when they intersect)
pub fn planar_distance(a: &Polygon<f64>, b: &Polygon<f64>) -> f64 {
    Euclidean.distance(a, b)
}

/// True when the two polygons are no more than `tolerance` apart
pub fn is_adjacent(a: &Polygon<f64>, b: &Polygon<f64>, tolerance: f64) -> bool {
    match (bounding_box(a), bounding_box(b)) {
        (Some(ba), Some(bb)) => boxed_adjacent(a, &ba, b, &bb, tolerance),
        _ => false,
    }
}

fn boxed_adjacent(
    a: &Polygon<f64>,
    ba: &BoundingBox,
    b: &Polygon<f64>,
    bb: &BoundingBox,
    tolerance: f64,
) -> bool {
    ba.within_distance(bb, tolerance) && planar_distance(a, b) <= tolerance
}

/// Scan every ordered pair of the collection and record those at zero
/// distance.
///
/// Both `(i, j)` and `(j, i)` are recorded, since the scan visits each
/// ordered pair on its own; the result is therefore symmetric. Empty
/// polygons never intersect anything.
pub fn find_intersecting_pairs(
    collection: &PolygonCollection,
    params: &RelationParams,
) -> Result<AdjacencyRelation> {
    params.validate()?;

    let polygons = collection.polygons();
    let n = polygons.len();
    let tolerance = params.tolerance;
    let boxes: Vec<Option<BoundingBox>> = polygons.iter().map(bounding_box).collect();

    let pairs: Vec<(usize, usize)> = (0..n)
        .into_par_iter()
        .flat_map(|i| {
            let mut hits = Vec::new();
            let Some(bi) = boxes[i] else {
                return hits;
            };
            for j in 0..n {
                if i == j {
                    continue;
                }
                if let Some(bj) = boxes[j] {
                    if boxed_adjacent(&polygons[i], &bi, &polygons[j], &bj, tolerance) {
                        hits.push((i, j));
                    }
                }
            }
            hits
        })
        .collect();

    debug!(geometries = n, pairs = pairs.len(), tolerance, "pairwise scan finished");

    Ok(pairs.into_iter().collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vector::buffer::{buffer_point, BufferParams};
    use geo::{LineString, Point};
    use geopair_core::CRS;

    fn rect(x0: f64, y0: f64, x1: f64, y1: f64) -> Polygon<f64> {
        Polygon::new(
            LineString::from(vec![(x0, y0), (x1, y0), (x1, y1), (x0, y1), (x0, y0)]),
            vec![],
        )
    }

    fn collection(polygons: Vec<Polygon<f64>>) -> PolygonCollection {
        PolygonCollection::new(polygons, CRS::web_mercator())
    }

    #[test]
    fn test_overlapping_pair_recorded_both_ways() {
        let c = collection(vec![
            rect(0.0, 2.0, 1.0, 3.0),
            rect(0.5, 1.5, 1.5, 2.5),
            rect(5.0, 5.0, 6.0, 6.0),
        ]);
        let rel = find_intersecting_pairs(&c, &RelationParams::default()).unwrap();

        assert_eq!(rel.pairs().collect::<Vec<_>>(), vec![(0, 1), (1, 0)]);
        assert_eq!(rel.len(), 2);
        assert!(rel.is_symmetric());
        assert_eq!(rel.partners(2), &[] as &[usize]);
        assert_eq!(rel.unordered_pairs().collect::<Vec<_>>(), vec![(0, 1)]);
    }

    #[test]
    fn test_edge_touching_counts() {
        let c = collection(vec![rect(0.0, 0.0, 1.0, 1.0), rect(1.0, 0.0, 2.0, 1.0)]);
        let rel = find_intersecting_pairs(&c, &RelationParams::default()).unwrap();
        assert_eq!(rel.len(), 2);
    }

    #[test]
    fn test_vertex_touching_counts() {
        let c = collection(vec![rect(0.0, 0.0, 1.0, 1.0), rect(1.0, 1.0, 2.0, 2.0)]);
        let rel = find_intersecting_pairs(&c, &RelationParams::default()).unwrap();
        assert!(rel.contains(0, 1));
        assert!(rel.contains(1, 0));
    }

    #[test]
    fn test_disjoint_not_recorded() {
        let c = collection(vec![rect(0.0, 0.0, 1.0, 1.0), rect(2.0, 0.0, 3.0, 1.0)]);
        let rel = find_intersecting_pairs(&c, &RelationParams::default()).unwrap();
        assert!(rel.is_empty());
    }

    #[test]
    fn test_tolerance_widens_relation() {
        let a = rect(0.0, 0.0, 1.0, 1.0);
        let b = rect(1.001, 0.0, 2.0, 1.0);
        assert!(!is_adjacent(&a, &b, DEFAULT_TOLERANCE));
        assert!(is_adjacent(&a, &b, 0.01));
        assert!((planar_distance(&a, &b) - 0.001).abs() < 1e-9);
    }

    #[test]
    fn test_contained_polygon_is_adjacent() {
        let outer = rect(4.0, 0.0, 5.0, 1.0);
        let disc = buffer_point(&Point::new(4.5, 0.5), &BufferParams::default());
        assert_eq!(planar_distance(&outer, &disc), 0.0);
        assert!(is_adjacent(&disc, &outer, DEFAULT_TOLERANCE));
    }

    #[test]
    fn test_empty_polygon_never_adjacent() {
        let empty = Polygon::new(LineString::new(vec![]), vec![]);
        let c = collection(vec![empty, rect(0.0, 0.0, 1.0, 1.0)]);
        let rel = find_intersecting_pairs(&c, &RelationParams::default()).unwrap();
        assert!(rel.is_empty());
    }

    #[test]
    fn test_negative_tolerance_rejected() {
        let c = collection(vec![]);
        let params = RelationParams { tolerance: -1.0 };
        assert!(find_intersecting_pairs(&c, &params).is_err());
    }

    #[test]
    fn test_relation_from_iter_keeps_duplicates() {
        let rel: AdjacencyRelation = vec![(2, 1), (0, 3), (2, 1)].into_iter().collect();
        assert_eq!(rel.len(), 3);
        assert_eq!(rel.sources().collect::<Vec<_>>(), vec![0, 2]);
        assert_eq!(rel.partners(2), &[1, 1]);
        assert!(!rel.is_symmetric());
    }

    #[test]
    fn test_algorithm_trait() {
        let c = collection(vec![rect(0.0, 0.0, 1.0, 1.0), rect(0.5, 0.5, 2.0, 2.0)]);
        let rel = PairwiseRelation.execute_default(c).unwrap();
        assert_eq!(rel.len(), 2);
    }
}
