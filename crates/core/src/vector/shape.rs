//! Input shapes and the polygon-only collection produced by normalization

use super::{geometry_kind, Feature, FeatureCollection};
use crate::crs::CRS;
use crate::error::{Error, Result};
use geo_types::{Geometry, MultiPolygon, Point, Polygon};
use std::fmt;

/// Geometry kinds accepted by the overlay pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShapeKind {
    Point,
    Polygon,
    MultiPolygon,
}

impl fmt::Display for ShapeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ShapeKind::Point => "Point",
            ShapeKind::Polygon => "Polygon",
            ShapeKind::MultiPolygon => "MultiPolygon",
        };
        f.write_str(s)
    }
}

/// A point, polygon or multipolygon in planar coordinates
#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    Point(Point<f64>),
    Polygon(Polygon<f64>),
    MultiPolygon(MultiPolygon<f64>),
}

impl Shape {
    pub fn kind(&self) -> ShapeKind {
        match self {
            Shape::Point(_) => ShapeKind::Point,
            Shape::Polygon(_) => ShapeKind::Polygon,
            Shape::MultiPolygon(_) => ShapeKind::MultiPolygon,
        }
    }

    /// Convert a generic geometry, rejecting kinds the pipeline does not handle.
    ///
    /// `index` is only used to label the error.
    pub fn from_geometry(geom: Geometry<f64>, index: usize) -> Result<Self> {
        match geom {
            Geometry::Point(p) => Ok(Shape::Point(p)),
            Geometry::Polygon(p) => Ok(Shape::Polygon(p)),
            Geometry::MultiPolygon(mp) => Ok(Shape::MultiPolygon(mp)),
            Geometry::Rect(r) => Ok(Shape::Polygon(r.to_polygon())),
            Geometry::Triangle(t) => Ok(Shape::Polygon(t.to_polygon())),
            other => Err(Error::UnsupportedGeometry {
                index,
                kind: geometry_kind(&other).to_string(),
            }),
        }
    }
}

impl From<Shape> for Geometry<f64> {
    fn from(shape: Shape) -> Self {
        match shape {
            Shape::Point(p) => Geometry::Point(p),
            Shape::Polygon(p) => Geometry::Polygon(p),
            Shape::MultiPolygon(mp) => Geometry::MultiPolygon(mp),
        }
    }
}

/// Ordered input collection of shapes sharing one CRS
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ShapeCollection {
    pub shapes: Vec<Shape>,
    pub crs: CRS,
}

impl ShapeCollection {
    pub fn new(shapes: Vec<Shape>, crs: CRS) -> Self {
        Self { shapes, crs }
    }

    /// Build from a feature collection. Features without geometry and
    /// unsupported geometry kinds are errors, labelled with the feature index.
    pub fn from_features(fc: &FeatureCollection) -> Result<Self> {
        let shapes = fc
            .features
            .iter()
            .enumerate()
            .map(|(index, feature)| match &feature.geometry {
                Some(geom) => Shape::from_geometry(geom.clone(), index),
                None => Err(Error::InvalidGeometry {
                    index,
                    reason: "feature has no geometry".to_string(),
                }),
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            shapes,
            crs: fc.crs.clone(),
        })
    }

    pub fn to_features(&self) -> FeatureCollection {
        FeatureCollection {
            features: self
                .shapes
                .iter()
                .map(|s| Feature::new(s.clone().into()))
                .collect(),
            crs: self.crs.clone(),
        }
    }

    pub fn len(&self) -> usize {
        self.shapes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Shape> {
        self.shapes.iter()
    }

    /// Number of shapes of the given kind
    pub fn count_kind(&self, kind: ShapeKind) -> usize {
        self.shapes.iter().filter(|s| s.kind() == kind).count()
    }
}

/// Polygon-only collection produced by normalization. Read-only afterwards.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PolygonCollection {
    polygons: Vec<Polygon<f64>>,
    crs: CRS,
}

impl PolygonCollection {
    pub fn new(polygons: Vec<Polygon<f64>>, crs: CRS) -> Self {
        Self { polygons, crs }
    }

    pub fn polygons(&self) -> &[Polygon<f64>] {
        &self.polygons
    }

    pub fn get(&self, index: usize) -> Option<&Polygon<f64>> {
        self.polygons.get(index)
    }

    pub fn crs(&self) -> &CRS {
        &self.crs
    }

    pub fn len(&self) -> usize {
        self.polygons.len()
    }

    pub fn is_empty(&self) -> bool {
        self.polygons.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Polygon<f64>> {
        self.polygons.iter()
    }

    pub fn to_features(&self) -> FeatureCollection {
        FeatureCollection {
            features: self
                .polygons
                .iter()
                .map(|p| Feature::new(Geometry::Polygon(p.clone())))
                .collect(),
            crs: self.crs.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo_types::{polygon, LineString};

    #[test]
    fn test_shape_from_geometry() {
        let poly = polygon![(x: 0.0, y: 0.0), (x: 1.0, y: 0.0), (x: 1.0, y: 1.0)];
        let shape = Shape::from_geometry(Geometry::Polygon(poly), 0).unwrap();
        assert_eq!(shape.kind(), ShapeKind::Polygon);

        let line = Geometry::LineString(LineString::from(vec![(0.0, 0.0), (1.0, 1.0)]));
        match Shape::from_geometry(line, 7) {
            Err(Error::UnsupportedGeometry { index, kind }) => {
                assert_eq!(index, 7);
                assert_eq!(kind, "LineString");
            }
            other => panic!("expected UnsupportedGeometry, got {:?}", other),
        }
    }

    #[test]
    fn test_shape_collection_rejects_missing_geometry() {
        let mut fc = FeatureCollection::new(CRS::web_mercator());
        fc.push(Feature::new(Geometry::Point(Point::new(0.0, 0.0))));
        fc.push(Feature::empty());

        let err = ShapeCollection::from_features(&fc).unwrap_err();
        assert!(matches!(err, Error::InvalidGeometry { index: 1, .. }));
    }

    #[test]
    fn test_shape_collection_roundtrip_keeps_crs() {
        let shapes = vec![
            Shape::Point(Point::new(1.0, 2.0)),
            Shape::MultiPolygon(MultiPolygon::new(vec![])),
        ];
        let sc = ShapeCollection::new(shapes, CRS::web_mercator());
        let fc = sc.to_features();
        assert_eq!(fc.crs, CRS::web_mercator());

        let back = ShapeCollection::from_features(&fc).unwrap();
        assert_eq!(back, sc);
        assert_eq!(back.count_kind(ShapeKind::Point), 1);
        assert_eq!(back.count_kind(ShapeKind::MultiPolygon), 1);
    }
}
