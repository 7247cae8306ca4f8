//! Vector algorithms
//!
//! - Buffer: approximate a point by a regular polygon
//! - Normalize: turn points and multipolygons into single polygons
//! - Relation: find every pair of polygons at zero distance
//! - Boolean: intersection / difference of related pairs
//! - Aggregate: collect results into one output collection

mod aggregate;
mod boolean;
mod buffer;
mod normalize;
mod relation;
mod spatial;
mod validate;

pub use aggregate::{aggregate, ResultAggregator};
pub use boolean::{
    boolean_op, difference, intersection, is_empty_geometry, overlay_pair, overlay_pairs,
    BooleanOp, BooleanResult, ErrorPolicy, Overlay, OverlayParams,
};
pub use buffer::{buffer_point, BufferParams, DEFAULT_BUFFER_DISTANCE, DEFAULT_QUADRANT_SEGMENTS};
pub use normalize::{explode, normalize, retain_polygons, Fragment, Normalize, NormalizeParams};
pub use relation::{
    find_intersecting_pairs, is_adjacent, planar_distance, AdjacencyRelation, PairwiseRelation,
    RelationParams, DEFAULT_TOLERANCE,
};
pub use spatial::{bounding_box, BoundingBox};
pub use validate::validate_polygon;
