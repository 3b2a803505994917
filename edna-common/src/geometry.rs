//! GeoJSON centroid
//!
//! Site polygons are plain GeoJSON documents. The list view only needs a
//! marker position, computed as the mean of every vertex. The closing vertex
//! of a polygon ring repeats the first one and is left out.

use serde_json::{json, Value};

use crate::{Error, Result};

/// Point geometry at the mean vertex of `geojson`
pub fn centroid(geojson: &Value) -> Result<Value> {
    let mut sum = (0.0_f64, 0.0_f64);
    let mut count = 0usize;

    visit(geojson, &mut |x, y| {
        sum.0 += x;
        sum.1 += y;
        count += 1;
    })?;

    if count == 0 {
        return Err(Error::Geometry("no coordinates".to_string()));
    }

    let n = count as f64;
    Ok(json!({
        "type": "Point",
        "coordinates": [sum.0 / n, sum.1 / n],
    }))
}

fn visit(value: &Value, emit: &mut impl FnMut(f64, f64)) -> Result<()> {
    let kind = value
        .get("type")
        .and_then(Value::as_str)
        .ok_or_else(|| Error::Geometry("missing GeoJSON type".to_string()))?;

    match kind {
        "FeatureCollection" => {
            let features = value
                .get("features")
                .and_then(Value::as_array)
                .ok_or_else(|| Error::Geometry("FeatureCollection without features".to_string()))?;
            for feature in features {
                visit(feature, emit)?;
            }
            Ok(())
        }
        "Feature" => match value.get("geometry") {
            Some(Value::Null) | None => Ok(()),
            Some(geometry) => visit(geometry, emit),
        },
        "GeometryCollection" => {
            let geometries = value
                .get("geometries")
                .and_then(Value::as_array)
                .ok_or_else(|| {
                    Error::Geometry("GeometryCollection without geometries".to_string())
                })?;
            for geometry in geometries {
                visit(geometry, emit)?;
            }
            Ok(())
        }
        "Point" | "MultiPoint" | "LineString" | "MultiLineString" => {
            walk_positions(coordinates(value)?, false, emit)
        }
        "Polygon" => walk_rings(coordinates(value)?, emit),
        "MultiPolygon" => {
            for polygon in as_array(coordinates(value)?)? {
                walk_rings(polygon, emit)?;
            }
            Ok(())
        }
        other => Err(Error::Geometry(format!("unsupported GeoJSON type {}", other))),
    }
}

fn coordinates(value: &Value) -> Result<&Value> {
    value
        .get("coordinates")
        .ok_or_else(|| Error::Geometry("geometry without coordinates".to_string()))
}

fn as_array(value: &Value) -> Result<&Vec<Value>> {
    value
        .as_array()
        .ok_or_else(|| Error::Geometry("coordinates must be arrays".to_string()))
}

fn walk_rings(rings: &Value, emit: &mut impl FnMut(f64, f64)) -> Result<()> {
    for ring in as_array(rings)? {
        walk_positions(ring, true, emit)?;
    }
    Ok(())
}

/// Emit every position nested in `value`
///
/// With `closed`, the last position of the innermost list is skipped.
fn walk_positions(value: &Value, closed: bool, emit: &mut impl FnMut(f64, f64)) -> Result<()> {
    if let Some((x, y)) = position(value) {
        emit(x, y);
        return Ok(());
    }

    let items = as_array(value)?;
    let innermost = items.first().map(|first| position(first).is_some()).unwrap_or(false);
    let take = if closed && innermost {
        items.len().saturating_sub(1)
    } else {
        items.len()
    };

    for item in &items[..take] {
        walk_positions(item, closed, emit)?;
    }
    Ok(())
}

fn position(value: &Value) -> Option<(f64, f64)> {
    let coords = value.as_array()?;
    let x = coords.first()?.as_f64()?;
    let y = coords.get(1)?.as_f64()?;
    Some((x, y))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn coords(point: &Value) -> (f64, f64) {
        let c = point["coordinates"].as_array().unwrap();
        (c[0].as_f64().unwrap(), c[1].as_f64().unwrap())
    }

    #[test]
    fn test_square_polygon_ignores_closing_vertex() {
        let polygon = json!({
            "type": "Polygon",
            "coordinates": [[[0.0, 0.0], [4.0, 0.0], [4.0, 2.0], [0.0, 2.0], [0.0, 0.0]]]
        });
        let point = centroid(&polygon).unwrap();
        assert_eq!(point["type"], "Point");
        assert_eq!(coords(&point), (2.0, 1.0));
    }

    #[test]
    fn test_feature_collection() {
        let collection = json!({
            "type": "FeatureCollection",
            "features": [
                {"type": "Feature", "properties": {}, "geometry": {"type": "Point", "coordinates": [1.0, 1.0]}},
                {"type": "Feature", "properties": {}, "geometry": {"type": "Point", "coordinates": [3.0, 5.0]}},
                {"type": "Feature", "properties": {}, "geometry": null}
            ]
        });
        assert_eq!(coords(&centroid(&collection).unwrap()), (2.0, 3.0));
    }

    #[test]
    fn test_multipolygon() {
        let multi = json!({
            "type": "MultiPolygon",
            "coordinates": [
                [[[0.0, 0.0], [2.0, 0.0], [2.0, 2.0], [0.0, 0.0]]],
                [[[10.0, 10.0], [12.0, 10.0], [12.0, 12.0], [10.0, 10.0]]]
            ]
        });
        let (x, y) = coords(&centroid(&multi).unwrap());
        assert!((x - 6.333333).abs() < 1e-5);
        assert!((y - 5.666666).abs() < 1e-5);
    }

    #[test]
    fn test_linestring_keeps_every_vertex() {
        let line = json!({"type": "LineString", "coordinates": [[0.0, 0.0], [2.0, 0.0], [0.0, 0.0]]});
        let (x, _) = coords(&centroid(&line).unwrap());
        assert!((x - 2.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_malformed_geometry() {
        assert!(centroid(&json!({"foo": 1})).is_err());
        assert!(centroid(&json!({"type": "Polygon"})).is_err());
        assert!(centroid(&json!({"type": "Polygon", "coordinates": "x"})).is_err());
        assert!(centroid(&json!({"type": "FeatureCollection", "features": []})).is_err());
        assert!(centroid(&json!({"type": "Circle", "coordinates": [0, 0]})).is_err());
    }
}
