//! GeoJSON reading/writing
//!
//! Lightweight serde models covering FeatureCollection, Feature, all seven
//! geometry types and the legacy `crs` member written by GDAL/geopandas for
//! projected data (`{"type": "name", "properties": {"name": "urn:ogc:def:crs:EPSG::3857"}}`).

use crate::crs::CRS;
use crate::error::{Error, Result};
use crate::vector::{AttributeValue, Feature, FeatureCollection};
use geo_types::{
    Coord, Geometry, GeometryCollection, LineString, MultiLineString, MultiPoint, MultiPolygon,
    Point, Polygon,
};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

// ---------------------------------------------------------------------------
// Serde models
// ---------------------------------------------------------------------------

type Position = Vec<f64>;

#[derive(Debug, Serialize, Deserialize)]
struct RawCollection {
    #[serde(rename = "type")]
    type_: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    crs: Option<RawCrs>,

    #[serde(default)]
    features: Vec<RawFeature>,
}

#[derive(Debug, Serialize, Deserialize)]
struct RawCrs {
    #[serde(rename = "type")]
    type_: String,
    properties: RawCrsProperties,
}

#[derive(Debug, Serialize, Deserialize)]
struct RawCrsProperties {
    name: String,
}

#[derive(Debug, Serialize, Deserialize)]
struct RawFeature {
    #[serde(rename = "type")]
    type_: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    id: Option<Value>,

    #[serde(default)]
    properties: Option<Map<String, Value>>,

    geometry: Option<RawGeometry>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "type")]
enum RawGeometry {
    Point { coordinates: Position },
    MultiPoint { coordinates: Vec<Position> },
    LineString { coordinates: Vec<Position> },
    MultiLineString { coordinates: Vec<Vec<Position>> },
    Polygon { coordinates: Vec<Vec<Position>> },
    MultiPolygon { coordinates: Vec<Vec<Vec<Position>>> },
    GeometryCollection { geometries: Vec<RawGeometry> },
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Read a GeoJSON FeatureCollection from a file
pub fn read_geojson<P: AsRef<Path>>(path: P) -> Result<FeatureCollection> {
    let file = File::open(path.as_ref())?;
    let raw: RawCollection = serde_json::from_reader(BufReader::new(file))?;
    collection_from_raw(raw)
}

/// Parse a GeoJSON FeatureCollection from a string
pub fn read_geojson_from_str(data: &str) -> Result<FeatureCollection> {
    let raw: RawCollection = serde_json::from_str(data)?;
    collection_from_raw(raw)
}

/// Write a FeatureCollection as GeoJSON, creating parent directories as needed
pub fn write_geojson<P: AsRef<Path>>(fc: &FeatureCollection, path: P) -> Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    let mut writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer(&mut writer, &collection_to_raw(fc))?;
    writer.flush()?;
    Ok(())
}

/// Serialize a FeatureCollection to a GeoJSON string
pub fn write_geojson_to_string(fc: &FeatureCollection) -> Result<String> {
    Ok(serde_json::to_string(&collection_to_raw(fc))?)
}

// ---------------------------------------------------------------------------
// Decoding
// ---------------------------------------------------------------------------

fn collection_from_raw(raw: RawCollection) -> Result<FeatureCollection> {
    if raw.type_ != "FeatureCollection" {
        return Err(Error::InvalidGeoJson {
            reason: format!("expected FeatureCollection, found {}", raw.type_),
        });
    }

    let crs = raw
        .crs
        .map(|c| CRS::from_name(&c.properties.name))
        .unwrap_or_default();

    let features = raw
        .features
        .into_iter()
        .enumerate()
        .map(|(index, f)| {
            feature_from_raw(f).map_err(|e| match e {
                Error::InvalidGeoJson { reason } => Error::InvalidGeoJson {
                    reason: format!("feature {}: {}", index, reason),
                },
                other => other,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(FeatureCollection { features, crs })
}

fn feature_from_raw(raw: RawFeature) -> Result<Feature> {
    if raw.type_ != "Feature" {
        return Err(Error::InvalidGeoJson {
            reason: format!("expected Feature, found {}", raw.type_),
        });
    }

    let geometry = raw.geometry.map(geometry_from_raw).transpose()?;

    let properties = raw
        .properties
        .unwrap_or_default()
        .into_iter()
        .map(|(k, v)| (k, attribute_from_json(v)))
        .collect();

    let id = raw.id.and_then(|v| match v {
        Value::String(s) => Some(s),
        Value::Null => None,
        other => Some(other.to_string()),
    });

    Ok(Feature {
        geometry,
        properties,
        id,
    })
}

fn geometry_from_raw(raw: RawGeometry) -> Result<Geometry<f64>> {
    let geom = match raw {
        RawGeometry::Point { coordinates } => Geometry::Point(Point(coord(&coordinates)?)),
        RawGeometry::MultiPoint { coordinates } => Geometry::MultiPoint(MultiPoint::new(
            coordinates
                .iter()
                .map(|p| coord(p).map(Point))
                .collect::<Result<_>>()?,
        )),
        RawGeometry::LineString { coordinates } => Geometry::LineString(line(&coordinates)?),
        RawGeometry::MultiLineString { coordinates } => Geometry::MultiLineString(
            MultiLineString::new(coordinates.iter().map(|l| line(l)).collect::<Result<_>>()?),
        ),
        RawGeometry::Polygon { coordinates } => Geometry::Polygon(polygon(&coordinates)?),
        RawGeometry::MultiPolygon { coordinates } => Geometry::MultiPolygon(MultiPolygon::new(
            coordinates.iter().map(|p| polygon(p)).collect::<Result<_>>()?,
        )),
        RawGeometry::GeometryCollection { geometries } => {
            Geometry::GeometryCollection(GeometryCollection(
                geometries
                    .into_iter()
                    .map(geometry_from_raw)
                    .collect::<Result<_>>()?,
            ))
        }
    };
    Ok(geom)
}

fn coord(position: &[f64]) -> Result<Coord<f64>> {
    match position {
        [x, y, ..] if x.is_finite() && y.is_finite() => Ok(Coord { x: *x, y: *y }),
        [_, _, ..] => Err(Error::InvalidGeoJson {
            reason: "non-finite coordinate".to_string(),
        }),
        _ => Err(Error::InvalidGeoJson {
            reason: format!("position needs at least 2 values, got {}", position.len()),
        }),
    }
}

fn line(positions: &[Position]) -> Result<LineString<f64>> {
    positions
        .iter()
        .map(|p| coord(p))
        .collect::<Result<Vec<_>>>()
        .map(LineString::new)
}

fn polygon(rings: &[Vec<Position>]) -> Result<Polygon<f64>> {
    let mut rings = rings.iter();
    let exterior = match rings.next() {
        Some(ring) => line(ring)?,
        None => LineString::new(vec![]),
    };
    let interiors = rings.map(|r| line(r)).collect::<Result<Vec<_>>>()?;
    Ok(Polygon::new(exterior, interiors))
}

fn attribute_from_json(value: Value) -> AttributeValue {
    match value {
        Value::Null => AttributeValue::Null,
        Value::Bool(b) => AttributeValue::Bool(b),
        Value::Number(n) => match n.as_i64() {
            Some(i) => AttributeValue::Int(i),
            None => AttributeValue::Float(n.as_f64().unwrap_or(f64::NAN)),
        },
        Value::String(s) => AttributeValue::String(s),
        // Nested values are flattened to their JSON text
        other => AttributeValue::String(other.to_string()),
    }
}

// ---------------------------------------------------------------------------
// Encoding
// ---------------------------------------------------------------------------

fn collection_to_raw(fc: &FeatureCollection) -> RawCollection {
    RawCollection {
        type_: "FeatureCollection".to_string(),
        crs: Some(RawCrs {
            type_: "name".to_string(),
            properties: RawCrsProperties { name: fc.crs.urn() },
        }),
        features: fc.features.iter().map(feature_to_raw).collect(),
    }
}

fn feature_to_raw(f: &Feature) -> RawFeature {
    RawFeature {
        type_: "Feature".to_string(),
        id: f.id.clone().map(Value::String),
        properties: Some(
            f.properties
                .iter()
                .map(|(k, v)| (k.clone(), attribute_to_json(v)))
                .collect(),
        ),
        geometry: f.geometry.as_ref().map(geometry_to_raw),
    }
}

fn geometry_to_raw(geom: &Geometry<f64>) -> RawGeometry {
    match geom {
        Geometry::Point(p) => RawGeometry::Point {
            coordinates: position(p.0),
        },
        Geometry::MultiPoint(mp) => RawGeometry::MultiPoint {
            coordinates: mp.0.iter().map(|p| position(p.0)).collect(),
        },
        Geometry::Line(l) => RawGeometry::LineString {
            coordinates: vec![position(l.start), position(l.end)],
        },
        Geometry::LineString(ls) => RawGeometry::LineString {
            coordinates: positions(ls),
        },
        Geometry::MultiLineString(mls) => RawGeometry::MultiLineString {
            coordinates: mls.0.iter().map(positions).collect(),
        },
        Geometry::Polygon(p) => RawGeometry::Polygon {
            coordinates: rings(p),
        },
        Geometry::MultiPolygon(mp) => RawGeometry::MultiPolygon {
            coordinates: mp.0.iter().map(rings).collect(),
        },
        Geometry::GeometryCollection(gc) => RawGeometry::GeometryCollection {
            geometries: gc.0.iter().map(geometry_to_raw).collect(),
        },
        Geometry::Rect(r) => RawGeometry::Polygon {
            coordinates: rings(&r.to_polygon()),
        },
        Geometry::Triangle(t) => RawGeometry::Polygon {
            coordinates: rings(&t.to_polygon()),
        },
    }
}

fn position(c: Coord<f64>) -> Position {
    vec![c.x, c.y]
}

fn positions(ls: &LineString<f64>) -> Vec<Position> {
    ls.0.iter().map(|c| position(*c)).collect()
}

fn rings(p: &Polygon<f64>) -> Vec<Vec<Position>> {
    if p.exterior().0.is_empty() {
        return Vec::new();
    }
    std::iter::once(p.exterior())
        .chain(p.interiors().iter())
        .map(positions)
        .collect()
}

fn attribute_to_json(value: &AttributeValue) -> Value {
    match value {
        AttributeValue::Null => Value::Null,
        AttributeValue::Bool(b) => Value::Bool(*b),
        AttributeValue::Int(i) => Value::Number((*i).into()),
        AttributeValue::Float(f) => Number::from_f64(*f).map(Value::Number).unwrap_or(Value::Null),
        AttributeValue::String(s) => Value::String(s.clone()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "type": "FeatureCollection",
        "crs": { "type": "name", "properties": { "name": "urn:ogc:def:crs:EPSG::3857" } },
        "features": [
            { "type": "Feature", "id": 0, "properties": { "name": "square", "rank": 2 },
              "geometry": { "type": "Polygon",
                            "coordinates": [[[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0], [0.0, 0.0]]] } },
            { "type": "Feature", "properties": null,
              "geometry": { "type": "Point", "coordinates": [0.5, 4.0, 12.0] } },
            { "type": "Feature", "properties": {}, "geometry": null }
        ]
    }"#;

    #[test]
    fn test_read_sample() {
        let fc = read_geojson_from_str(SAMPLE).unwrap();
        assert_eq!(fc.crs, CRS::web_mercator());
        assert_eq!(fc.len(), 3);

        let first = &fc.features[0];
        assert_eq!(first.id.as_deref(), Some("0"));
        assert_eq!(
            first.get_property("name"),
            Some(&AttributeValue::String("square".into()))
        );
        assert_eq!(first.get_property("rank"), Some(&AttributeValue::Int(2)));
        match &first.geometry {
            Some(Geometry::Polygon(p)) => assert_eq!(p.exterior().0.len(), 5),
            other => panic!("expected polygon, got {:?}", other),
        }

        // Z values are dropped
        assert_eq!(
            fc.features[1].geometry,
            Some(Geometry::Point(Point::new(0.5, 4.0)))
        );
        assert!(fc.features[2].geometry.is_none());
    }

    #[test]
    fn test_missing_crs_defaults_to_wgs84() {
        let fc = read_geojson_from_str(r#"{"type": "FeatureCollection", "features": []}"#).unwrap();
        assert_eq!(fc.crs, CRS::wgs84());
        assert!(fc.is_empty());
    }

    #[test]
    fn test_rejects_wrong_type() {
        let err = read_geojson_from_str(r#"{"type": "Feature", "features": []}"#).unwrap_err();
        assert!(matches!(err, Error::InvalidGeoJson { .. }));
    }

    #[test]
    fn test_rejects_short_position() {
        let data = r#"{"type": "FeatureCollection", "features": [
            {"type": "Feature", "properties": {}, "geometry": {"type": "Point", "coordinates": [1.0]}}
        ]}"#;
        match read_geojson_from_str(data) {
            Err(Error::InvalidGeoJson { reason }) => assert!(reason.starts_with("feature 0")),
            other => panic!("expected InvalidGeoJson, got {:?}", other),
        }
    }

    #[test]
    fn test_rejects_malformed_json() {
        let err = read_geojson_from_str("{ not json").unwrap_err();
        assert!(matches!(err, Error::Json(_)));
    }

    #[test]
    fn test_write_then_read_preserves_collection() {
        let fc = read_geojson_from_str(SAMPLE).unwrap();
        let text = write_geojson_to_string(&fc).unwrap();
        assert!(text.contains("urn:ogc:def:crs:EPSG::3857"));

        let back = read_geojson_from_str(&text).unwrap();
        assert_eq!(back, fc);
    }

    #[test]
    fn test_write_multipolygon_and_collection() {
        let square = Polygon::new(
            LineString::from(vec![(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 0.0)]),
            vec![],
        );
        let mut fc = FeatureCollection::new(CRS::web_mercator());
        fc.push(Feature::new(Geometry::MultiPolygon(MultiPolygon::new(vec![square]))));
        fc.push(Feature::new(Geometry::GeometryCollection(GeometryCollection(vec![]))));

        let text = write_geojson_to_string(&fc).unwrap();
        let value: Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["features"][0]["geometry"]["type"], "MultiPolygon");
        assert_eq!(value["features"][1]["geometry"]["type"], "GeometryCollection");
        assert_eq!(value["features"][1]["geometry"]["geometries"], Value::Array(vec![]));
    }
}
