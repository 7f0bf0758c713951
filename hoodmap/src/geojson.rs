//! Minimal GeoJSON model for the datasets this crate consumes.
//!
//! Geometry is carried through untouched as JSON; only the pieces the indexer
//! reads (point coordinates, the outer ring of a boundary) are inspected.
//! Deserialization is lenient: a missing `features` array is an empty
//! collection and a non-object `properties` bag is treated as empty.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// A longitude/latitude pair.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LonLat {
    pub lon: f64,
    pub lat: f64,
}

impl LonLat {
    pub fn new(lon: f64, lat: f64) -> Self {
        Self { lon, lat }
    }
}

/// A single GeoJSON feature.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Feature {
    #[serde(rename = "type", default = "feature_type")]
    kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Value>,
    #[serde(default)]
    pub geometry: Option<Value>,
    #[serde(default, deserialize_with = "object_or_empty")]
    pub properties: Map<String, Value>,
}

impl Feature {
    /// Create a feature from geometry and properties.
    pub fn new(geometry: Option<Value>, properties: Map<String, Value>) -> Self {
        Self {
            kind: feature_type(),
            id: None,
            geometry,
            properties,
        }
    }

    /// Non-empty string property.
    pub fn str_prop(&self, key: &str) -> Option<&str> {
        match self.properties.get(key) {
            Some(Value::String(s)) if !s.is_empty() => Some(s.as_str()),
            _ => None,
        }
    }

    /// Boolean property that is literally `true`.
    pub fn flag(&self, key: &str) -> bool {
        matches!(self.properties.get(key), Some(Value::Bool(true)))
    }

    /// Numeric property.
    pub fn number(&self, key: &str) -> Option<f64> {
        self.properties.get(key).and_then(Value::as_f64)
    }

    pub fn set_prop(&mut self, key: &str, value: impl Into<Value>) {
        self.properties.insert(key.to_string(), value.into());
    }

    /// Geometry type string, if any.
    pub fn geometry_type(&self) -> Option<&str> {
        self.geometry.as_ref()?.get("type")?.as_str()
    }

    /// Coordinates of a `Point` geometry.
    pub fn point(&self) -> Option<LonLat> {
        if self.geometry_type()? != "Point" {
            return None;
        }
        let coords = self.geometry.as_ref()?.get("coordinates")?.as_array()?;
        match coords.as_slice() {
            [lon, lat, ..] => Some(LonLat::new(lon.as_f64()?, lat.as_f64()?)),
            _ => None,
        }
    }

    /// Outer ring of a polygonal geometry.
    ///
    /// `Polygon` yields its first ring, `MultiPolygon` the first ring of its
    /// first polygon.
    pub fn outer_ring(&self) -> Option<&Value> {
        let coords = self.geometry.as_ref()?.get("coordinates")?;
        let ring = match self.geometry_type()? {
            "Polygon" => coords.get(0)?,
            "MultiPolygon" => coords.get(0)?.get(0)?,
            _ => return None,
        };
        ring.is_array().then_some(ring)
    }
}

/// A GeoJSON feature collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureCollection {
    #[serde(rename = "type", default = "feature_collection_type")]
    kind: String,
    #[serde(default)]
    pub features: Vec<Feature>,
}

impl FeatureCollection {
    pub fn new(features: Vec<Feature>) -> Self {
        Self {
            kind: feature_collection_type(),
            features,
        }
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Feature> {
        self.features.iter()
    }
}

impl Default for FeatureCollection {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl FromIterator<Feature> for FeatureCollection {
    fn from_iter<I: IntoIterator<Item = Feature>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

/// Data payload of an engine source.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum GeoJson {
    Feature(Feature),
    FeatureCollection(FeatureCollection),
}

impl GeoJson {
    /// Number of features carried.
    pub fn feature_count(&self) -> usize {
        match self {
            GeoJson::Feature(_) => 1,
            GeoJson::FeatureCollection(fc) => fc.len(),
        }
    }

    pub fn features(&self) -> Vec<&Feature> {
        match self {
            GeoJson::Feature(f) => vec![f],
            GeoJson::FeatureCollection(fc) => fc.iter().collect(),
        }
    }
}

fn feature_type() -> String {
    "Feature".to_string()
}

fn feature_collection_type() -> String {
    "FeatureCollection".to_string()
}

fn object_or_empty<'de, D>(deserializer: D) -> Result<Map<String, Value>, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::Object(map) => Ok(map),
        _ => Ok(Map::new()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_lenient_collection() {
        let fc: FeatureCollection = serde_json::from_str(r#"{"type":"FeatureCollection"}"#).unwrap();
        assert!(fc.is_empty());

        let fc: FeatureCollection = serde_json::from_value(json!({
            "type": "FeatureCollection",
            "features": [
                {"type": "Feature", "geometry": null, "properties": null},
                {"type": "Feature", "geometry": null, "properties": "junk"}
            ]
        }))
        .unwrap();
        assert_eq!(fc.len(), 2);
        assert!(fc.features[0].properties.is_empty());
        assert!(fc.features[1].properties.is_empty());
    }

    #[test]
    fn test_property_accessors() {
        let f: Feature = serde_json::from_value(json!({
            "type": "Feature",
            "geometry": null,
            "properties": {"cartier": "dtn", "empty": "", "bike_lane": true, "illgl_park": "true", "cost_level": 300}
        }))
        .unwrap();
        assert_eq!(f.str_prop("cartier"), Some("dtn"));
        assert_eq!(f.str_prop("empty"), None);
        assert_eq!(f.str_prop("missing"), None);
        assert!(f.flag("bike_lane"));
        assert!(!f.flag("illgl_park"));
        assert_eq!(f.number("cost_level"), Some(300.0));
        assert_eq!(f.number("cartier"), None);
    }

    #[test]
    fn test_point_coordinates() {
        let f = Feature::new(
            Some(json!({"type": "Point", "coordinates": [24.16, 45.79]})),
            Map::new(),
        );
        assert_eq!(f.point(), Some(LonLat::new(24.16, 45.79)));

        let line = Feature::new(
            Some(json!({"type": "LineString", "coordinates": [[0, 0], [1, 1]]})),
            Map::new(),
        );
        assert_eq!(line.point(), None);
        assert_eq!(Feature::new(None, Map::new()).point(), None);
    }

    #[test]
    fn test_outer_ring() {
        let ring = json!([[0, 0], [1, 0], [1, 1], [0, 0]]);
        let polygon = Feature::new(
            Some(json!({"type": "Polygon", "coordinates": [ring.clone()]})),
            Map::new(),
        );
        assert_eq!(polygon.outer_ring(), Some(&ring));

        let multi = Feature::new(
            Some(json!({"type": "MultiPolygon", "coordinates": [[ring.clone()]]})),
            Map::new(),
        );
        assert_eq!(multi.outer_ring(), Some(&ring));

        let point = Feature::new(
            Some(json!({"type": "Point", "coordinates": [0, 0]})),
            Map::new(),
        );
        assert_eq!(point.outer_ring(), None);
    }

    #[test]
    fn test_serializes_as_geojson() {
        let fc = FeatureCollection::new(vec![Feature::new(None, Map::new())]);
        let value = serde_json::to_value(GeoJson::FeatureCollection(fc)).unwrap();
        assert_eq!(value["type"], "FeatureCollection");
        assert_eq!(value["features"][0]["type"], "Feature");
    }
}
