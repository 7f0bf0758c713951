//! Paint palette and derived geometry for managed layers.

use serde_json::{json, Value};

use crate::engine::Properties;
use crate::geojson::Feature;
use crate::isochrone::Band;
use crate::keys::{StreetCategory, TravelMode};

pub const BACKGROUND_COLOR: &str = "#666";
pub const ASSIGNED_COLOR: &str = "#ff9100";
pub const LIMIT_COLOR: &str = "#00BFFF";
/// Fill of the outside-boundary mask; matches the dark base map.
pub const MAP_DARK_BG: &str = "#0e0e0e";

pub fn category_color(category: StreetCategory) -> &'static str {
    match category {
        StreetCategory::BikeLane => "#00FF88",
        StreetCategory::ReservedParking => "#F50057",
        StreetCategory::IllegalParking => "#FFD600",
    }
}

pub fn stroke_color(mode: TravelMode) -> &'static str {
    match mode {
        TravelMode::Walk => "#ADFF2F",
        TravelMode::Cycle => "#FF00FF",
    }
}

/// Fill color of a band for a travel mode.
pub fn band_color(mode: TravelMode, band: Band) -> &'static str {
    match (mode, band) {
        (TravelMode::Walk, Band::UpTo5 | Band::UpTo10) => "#A7FFEB",
        (TravelMode::Walk, Band::UpTo15 | Band::Over15) => "#64FFDA",
        (TravelMode::Cycle, Band::UpTo5 | Band::UpTo10) => "#B388FF",
        (TravelMode::Cycle, Band::UpTo15 | Band::Over15) => "#7C4DFF",
    }
}

pub fn band_opacity(band: Band) -> f64 {
    match band {
        Band::UpTo5 => 0.65,
        Band::UpTo10 => 0.55,
        Band::UpTo15 => 0.45,
        Band::Over15 => 0.35,
    }
}

fn props(value: Value) -> Properties {
    match value {
        Value::Object(map) => map,
        _ => Properties::new(),
    }
}

/// `match` expression over the feature's band property.
fn band_match(arms: impl Fn(Band) -> Value, fallback: Value) -> Value {
    let mut expr = vec![json!("match"), json!(["get", "band"])];
    for band in Band::ALL {
        expr.push(json!(band.label()));
        expr.push(arms(band));
    }
    expr.push(fallback);
    Value::Array(expr)
}

pub fn line_paint(color: &str, width: f64, opacity: f64) -> Properties {
    props(json!({"line-color": color, "line-width": width, "line-opacity": opacity}))
}

pub fn rounded_line_layout() -> Properties {
    props(json!({"line-cap": "round", "line-join": "round"}))
}

pub fn background_paint() -> Properties {
    line_paint(BACKGROUND_COLOR, 4.0, 0.8)
}

pub fn category_paint(category: StreetCategory) -> Properties {
    line_paint(category_color(category), 5.0, 0.9)
}

pub fn assigned_paint() -> Properties {
    line_paint(ASSIGNED_COLOR, 8.0, 0.8)
}

pub fn limit_paint() -> Properties {
    line_paint(LIMIT_COLOR, 10.0, 0.9)
}

pub fn mask_paint() -> Properties {
    props(json!({"fill-color": MAP_DARK_BG, "fill-opacity": 1.0}))
}

pub fn iso_fill_paint(mode: TravelMode) -> Properties {
    let color = band_match(
        |b| json!(band_color(mode, b)),
        json!(band_color(mode, Band::UpTo5)),
    );
    let opacity = band_match(|b| json!(band_opacity(b)), json!(0.5));
    props(json!({"fill-color": color, "fill-opacity": opacity}))
}

pub fn iso_fill_layout() -> Properties {
    let sort_key = band_match(|b| json!(b.sort_key()), json!(0));
    props(json!({"fill-sort-key": sort_key}))
}

pub fn iso_stroke_paint(mode: TravelMode) -> Properties {
    props(json!({"line-color": stroke_color(mode), "line-width": 2.5}))
}

/// World polygon with the boundary's outer ring cut out as a hole.
///
/// `None` when the boundary has no polygonal geometry.
pub fn mask_around(boundary: &Feature) -> Option<Feature> {
    let ring = boundary.outer_ring()?.clone();
    let world = json!([[-180, -90], [180, -90], [180, 90], [-180, 90], [-180, -90]]);
    let geometry = json!({"type": "Polygon", "coordinates": [world, ring]});
    Some(Feature::new(Some(geometry), Properties::new()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn boundary(geometry: Value) -> Feature {
        Feature::new(Some(geometry), Properties::new())
    }

    #[test]
    fn test_mask_around_polygon_uses_outer_ring() {
        let ring = json!([[24.0, 45.0], [24.1, 45.0], [24.1, 45.1], [24.0, 45.0]]);
        let hole = json!([[24.02, 45.02], [24.03, 45.02], [24.03, 45.03], [24.02, 45.02]]);
        let feature = boundary(json!({"type": "Polygon", "coordinates": [ring, hole]}));

        let mask = mask_around(&feature).unwrap();
        let coords = mask.geometry.as_ref().unwrap()["coordinates"].as_array().unwrap();
        assert_eq!(coords.len(), 2);
        assert_eq!(coords[0][0], json!([-180, -90]));
        assert_eq!(coords[1], ring);
    }

    #[test]
    fn test_mask_around_multipolygon_uses_first_polygon() {
        let ring = json!([[1, 1], [2, 1], [2, 2], [1, 1]]);
        let feature = boundary(json!({"type": "MultiPolygon", "coordinates": [[ring], [[[5, 5], [6, 5], [6, 6], [5, 5]]]]}));
        let mask = mask_around(&feature).unwrap();
        assert_eq!(mask.geometry.unwrap()["coordinates"][1], ring);
    }

    #[test]
    fn test_no_mask_without_polygon() {
        assert!(mask_around(&boundary(json!({"type": "Point", "coordinates": [1, 1]}))).is_none());
        assert!(mask_around(&Feature::new(None, Properties::new())).is_none());
    }

    #[test]
    fn test_iso_fill_paint_matches_bands() {
        let paint = iso_fill_paint(TravelMode::Cycle);
        let color = paint["fill-color"].as_array().unwrap();
        assert_eq!(color[0], json!("match"));
        assert_eq!(color[2], json!("0-5"));
        assert_eq!(color[3], json!("#B388FF"));
        assert_eq!(color[8], json!("15+"));
        assert_eq!(color[9], json!("#7C4DFF"));

        let opacity = paint["fill-opacity"].as_array().unwrap();
        assert_eq!(opacity[3], json!(0.65));
        assert_eq!(opacity.last(), Some(&json!(0.5)));
    }

    #[test]
    fn test_sort_key_layout() {
        let layout = iso_fill_layout();
        let expr = layout["fill-sort-key"].as_array().unwrap();
        assert_eq!(expr[3], json!(3));
        assert_eq!(expr[9], json!(0));
    }
}
