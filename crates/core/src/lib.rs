//! # geopair Core
//!
//! Core types, traits and I/O for the geopair overlay toolkit.
//!
//! This crate provides:
//! - `Shape` / `ShapeCollection`: point, polygon and multipolygon inputs
//! - `PolygonCollection`: the normalized, polygon-only collection
//! - `Feature` / `FeatureCollection`: geometry + attributes for output
//! - `CRS`: Coordinate Reference System identifiers
//! - Algorithm trait for a consistent API
//! - GeoJSON I/O

pub mod crs;
pub mod error;
pub mod io;
pub mod vector;

pub use crs::CRS;
pub use error::{Error, Result};
pub use vector::{
    AttributeValue, Feature, FeatureCollection, PolygonCollection, Shape, ShapeCollection,
    ShapeKind,
};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::crs::CRS;
    pub use crate::error::{Error, Result};
    pub use crate::vector::{
        Feature, FeatureCollection, PolygonCollection, Shape, ShapeCollection, ShapeKind,
    };
    pub use crate::Algorithm;
}

/// Core trait for all algorithms in geopair.
///
/// Algorithms are pure functions that transform input data according to parameters.
pub trait Algorithm {
    /// Input type for the algorithm
    type Input;
    /// Output type for the algorithm
    type Output;
    /// Parameters controlling algorithm behavior
    type Params: Default;
    /// Error type for algorithm execution
    type Error: std::error::Error;

    /// Returns the algorithm name
    fn name(&self) -> &'static str;

    /// Returns a description of what the algorithm does
    fn description(&self) -> &'static str;

    /// Execute the algorithm
    fn execute(&self, input: Self::Input, params: Self::Params) -> std::result::Result<Self::Output, Self::Error>;

    /// Execute with default parameters
    fn execute_default(&self, input: Self::Input) -> std::result::Result<Self::Output, Self::Error> {
        self.execute(input, Self::Params::default())
    }
}
