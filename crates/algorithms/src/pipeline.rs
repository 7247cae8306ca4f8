//! End-to-end processing of a mixed shape collection
//!
//! Three stages, each usable on its own:
//! 1. [`only_polygons`]: normalize into a polygon-only collection
//! 2. [`intersections`]: intersection of every related pair
//! 3. [`differences`]: difference of every related pair
//!
//! [`run_pipeline`] runs all three while normalizing and scanning only once.

use crate::vector::{
    find_intersecting_pairs, normalize, overlay_pairs, AdjacencyRelation, BooleanOp, ErrorPolicy,
    NormalizeParams, RelationParams, ResultAggregator,
};
use geopair_core::{Algorithm, Error, FeatureCollection, PolygonCollection, Result, ShapeCollection};
use tracing::info;

/// Parameters for the whole pipeline
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PipelineParams {
    pub normalize: NormalizeParams,
    pub relation: RelationParams,
    /// Behaviour when a related pair cannot be overlaid
    pub on_error: ErrorPolicy,
    /// Write empty overlay results as features without geometry
    pub keep_empty: bool,
}

impl PipelineParams {
    pub fn validate(&self) -> Result<()> {
        self.normalize.validate()?;
        self.relation.validate()
    }
}

/// Everything the pipeline produces
#[derive(Debug, Clone)]
pub struct PipelineOutput {
    pub polygons: PolygonCollection,
    pub relation: AdjacencyRelation,
    pub intersections: FeatureCollection,
    pub differences: FeatureCollection,
}

impl PipelineOutput {
    /// The normalized polygons as an output collection
    pub fn polygon_features(&self) -> FeatureCollection {
        self.polygons.to_features()
    }
}

/// Pipeline algorithm
#[derive(Debug, Clone, Default)]
pub struct Pipeline;

impl Algorithm for Pipeline {
    type Input = ShapeCollection;
    type Output = PipelineOutput;
    type Params = PipelineParams;
    type Error = Error;

    fn name(&self) -> &'static str {
        "Pipeline"
    }

    fn description(&self) -> &'static str {
        "Normalize, find intersecting pairs, then compute their intersections and differences"
    }

    fn execute(&self, input: Self::Input, params: Self::Params) -> Result<Self::Output> {
        run_pipeline(&input, &params)
    }
}

/// Stage 1: the polygon-only version of `input`
pub fn only_polygons(input: &ShapeCollection, params: &PipelineParams) -> Result<FeatureCollection> {
    params.validate()?;
    Ok(normalize(input, &params.normalize)?.to_features())
}

/// Stage 2: intersections of every intersecting pair of `input`
pub fn intersections(input: &ShapeCollection, params: &PipelineParams) -> Result<FeatureCollection> {
    overlay_stage(input, params, BooleanOp::Intersection)
}

/// Stage 3: differences of every intersecting pair of `input`
pub fn differences(input: &ShapeCollection, params: &PipelineParams) -> Result<FeatureCollection> {
    overlay_stage(input, params, BooleanOp::Difference)
}

fn overlay_stage(
    input: &ShapeCollection,
    params: &PipelineParams,
    op: BooleanOp,
) -> Result<FeatureCollection> {
    params.validate()?;
    let polygons = normalize(input, &params.normalize)?;
    let relation = find_intersecting_pairs(&polygons, &params.relation)?;
    overlay_to_features(&polygons, &relation, op, params)
}

fn overlay_to_features(
    polygons: &PolygonCollection,
    relation: &AdjacencyRelation,
    op: BooleanOp,
    params: &PipelineParams,
) -> Result<FeatureCollection> {
    let results = overlay_pairs(polygons, relation, op, params.on_error)?;
    let mut aggregator =
        ResultAggregator::new(polygons.crs().clone()).keep_empty(params.keep_empty);
    aggregator.extend_results(results);
    info!(
        %op,
        pairs = relation.len(),
        features = aggregator.len(),
        skipped = aggregator.skipped(),
        "overlay stage done"
    );
    Ok(aggregator.finish())
}

/// Run every stage, sharing normalization and the pairwise scan
pub fn run_pipeline(input: &ShapeCollection, params: &PipelineParams) -> Result<PipelineOutput> {
    params.validate()?;

    let polygons = normalize(input, &params.normalize)?;
    info!(input = input.len(), polygons = polygons.len(), "normalized");

    let relation = find_intersecting_pairs(&polygons, &params.relation)?;
    info!(pairs = relation.len(), "intersecting pairs found");

    let intersections = overlay_to_features(&polygons, &relation, BooleanOp::Intersection, params)?;
    let differences = overlay_to_features(&polygons, &relation, BooleanOp::Difference, params)?;

    Ok(PipelineOutput {
        polygons,
        relation,
        intersections,
        differences,
    })
}
