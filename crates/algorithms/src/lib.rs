//! # geopair Algorithms
//!
//! Polygon overlay algorithms for geopair.
//!
//! ## Modules
//!
//! - **vector**: buffer, normalization, pairwise relation, boolean overlay,
//!   result aggregation
//! - **pipeline**: the three processing stages wired together
//! - **fixture**: the sample dataset

pub mod fixture;
pub(crate) mod maybe_rayon;
pub mod pipeline;
pub mod vector;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::pipeline::{
        differences, intersections, only_polygons, run_pipeline, Pipeline, PipelineOutput,
        PipelineParams,
    };
    pub use crate::vector::{
        buffer_point, find_intersecting_pairs, normalize, overlay_pair, overlay_pairs,
        AdjacencyRelation, BooleanOp, BooleanResult, BufferParams, ErrorPolicy, Normalize,
        NormalizeParams, Overlay, OverlayParams, PairwiseRelation, RelationParams,
        ResultAggregator,
    };
    pub use geopair_core::prelude::*;
}
