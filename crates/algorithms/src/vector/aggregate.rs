//! Collecting produced geometries into one output collection

use super::boolean::BooleanResult;
use geo::{Geometry, Polygon};
use geopair_core::{Error, Feature, FeatureCollection, Result, CRS};
use tracing::debug;

/// Append-only builder of an output FeatureCollection.
///
/// Geometries are kept in the order they are pushed; nothing is sorted or
/// deduplicated. Empty overlay results are skipped unless `keep_empty` is
/// set, in which case they become features without geometry.
#[derive(Debug, Clone)]
pub struct ResultAggregator {
    collection: FeatureCollection,
    keep_empty: bool,
    skipped: usize,
}

impl ResultAggregator {
    pub fn new(crs: CRS) -> Self {
        Self {
            collection: FeatureCollection::new(crs),
            keep_empty: false,
            skipped: 0,
        }
    }

    /// Keep empty overlay results as null-geometry features
    pub fn keep_empty(mut self, keep: bool) -> Self {
        self.keep_empty = keep;
        self
    }

    /// Append a geometry as-is
    pub fn push(&mut self, geometry: Geometry<f64>) {
        self.collection.push(Feature::new(geometry));
    }

    /// Append every polygon of a slice
    pub fn extend_polygons<'a, I>(&mut self, polygons: I)
    where
        I: IntoIterator<Item = &'a Polygon<f64>>,
    {
        for p in polygons {
            self.push(Geometry::Polygon(p.clone()));
        }
    }

    /// Append every feature of another collection, which must share the
    /// aggregator's CRS
    pub fn extend_features(&mut self, other: FeatureCollection) -> Result<()> {
        if !self.collection.crs.is_equivalent(&other.crs) {
            return Err(Error::CrsMismatch(
                self.collection.crs.identifier(),
                other.crs.identifier(),
            ));
        }
        self.collection.features.extend(other.features);
        Ok(())
    }

    /// Append an overlay result, tagged with the pair and operation.
    ///
    /// Returns `false` (and counts it as skipped) when the result is empty
    /// and empty results are not kept.
    pub fn push_result(&mut self, result: BooleanResult) -> bool {
        let empty = result.is_empty();
        if empty && !self.keep_empty {
            debug!(left = result.left, right = result.right, op = %result.op, "empty result skipped");
            self.skipped += 1;
            return false;
        }
        let base = if empty {
            Feature::empty()
        } else {
            Feature::new(result.geometry)
        };
        let feature = base
            .with_property("left", result.left)
            .with_property("right", result.right)
            .with_property("op", result.op.as_str());
        self.collection.push(feature);
        true
    }

    /// Append a sequence of overlay results in order
    pub fn extend_results<I>(&mut self, results: I)
    where
        I: IntoIterator<Item = BooleanResult>,
    {
        for result in results {
            self.push_result(result);
        }
    }

    pub fn len(&self) -> usize {
        self.collection.len()
    }

    pub fn is_empty(&self) -> bool {
        self.collection.is_empty()
    }

    /// Number of empty results that were not added
    pub fn skipped(&self) -> usize {
        self.skipped
    }

    pub fn finish(self) -> FeatureCollection {
        self.collection
    }
}

/// Aggregate overlay results into a collection carrying `crs`
pub fn aggregate<I>(crs: CRS, results: I) -> FeatureCollection
where
    I: IntoIterator<Item = BooleanResult>,
{
    let mut aggregator = ResultAggregator::new(crs);
    aggregator.extend_results(results);
    debug!(
        features = aggregator.len(),
        skipped = aggregator.skipped(),
        "aggregated results"
    );
    aggregator.finish()
}
