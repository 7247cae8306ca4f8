//! Polygon well-formedness checks used before overlay operations
//!
//! A ring is accepted when all its coordinates are finite, it has at least
//! three distinct vertices and no two non-adjacent edges touch. Repeated
//! consecutive vertices are ignored. Interactions between different rings of
//! the same polygon are not checked.

use geo::line_intersection::{line_intersection, LineIntersection};
use geo::{Coord, Line, LineString, Polygon};
use geopair_core::{Error, Result};

/// Check a polygon, labelling any problem with `index`
pub fn validate_polygon(polygon: &Polygon<f64>, index: usize) -> Result<()> {
    let rings = std::iter::once(polygon.exterior()).chain(polygon.interiors().iter());
    for (ring_no, ring) in rings.enumerate() {
        if let Err(reason) = check_ring(ring) {
            let which = if ring_no == 0 {
                "exterior ring".to_string()
            } else {
                format!("interior ring {}", ring_no - 1)
            };
            return Err(Error::InvalidGeometry {
                index,
                reason: format!("{}: {}", which, reason),
            });
        }
    }
    Ok(())
}

fn check_ring(ring: &LineString<f64>) -> std::result::Result<(), String> {
    if let Some(c) = ring.0.iter().find(|c| !(c.x.is_finite() && c.y.is_finite())) {
        return Err(format!("non-finite coordinate ({}, {})", c.x, c.y));
    }

    let mut coords: Vec<Coord<f64>> = ring.0.clone();
    coords.dedup();
    if coords.len() > 1 && coords.first() != coords.last() {
        coords.push(coords[0]);
    }
    if coords.len() < 4 {
        return Err(format!(
            "needs at least 3 distinct vertices, found {}",
            coords.len().saturating_sub(1)
        ));
    }

    let edges: Vec<Line<f64>> = coords.windows(2).map(|w| Line::new(w[0], w[1])).collect();
    let n = edges.len();

    for i in 0..n {
        for j in (i + 1)..n {
            let adjacent = j == i + 1 || (i == 0 && j == n - 1);
            match line_intersection(edges[i], edges[j]) {
                None => {}
                Some(LineIntersection::Collinear { intersection }) => {
                    return Err(format!(
                        "edges {} and {} overlap between ({}, {}) and ({}, {})",
                        i,
                        j,
                        intersection.start.x,
                        intersection.start.y,
                        intersection.end.x,
                        intersection.end.y
                    ));
                }
                Some(LineIntersection::SinglePoint { intersection, .. }) => {
                    if !adjacent {
                        return Err(format!(
                            "self-intersection at ({}, {})",
                            intersection.x, intersection.y
                        ));
                    }
                }
            }
        }
    }
    Ok(())
}
