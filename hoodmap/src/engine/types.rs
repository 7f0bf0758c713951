//! Layer, source and marker descriptions passed to a map engine.

use serde_json::{Map, Value};
use thiserror::Error;

use crate::geojson::{Feature, GeoJson, LonLat};
use crate::keys::LayerKey;

/// Rendering type of a style layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LayerKind {
    Background,
    Raster,
    Line,
    Fill,
    Symbol,
}

/// Feature filter of a layer.
#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    /// Property equals a literal value.
    PropertyEquals { property: String, value: Value },
}

impl Filter {
    pub fn property_equals(property: &str, value: impl Into<Value>) -> Self {
        Filter::PropertyEquals {
            property: property.to_string(),
            value: value.into(),
        }
    }

    pub fn matches(&self, feature: &Feature) -> bool {
        match self {
            Filter::PropertyEquals { property, value } => {
                feature.properties.get(property) == Some(value)
            }
        }
    }
}

/// Paint or layout properties, keyed by style property name.
pub type Properties = Map<String, Value>;

/// A layer to add to the engine.
#[derive(Debug, Clone, PartialEq)]
pub struct LayerSpec {
    pub id: LayerKey,
    pub source: LayerKey,
    pub kind: LayerKind,
    pub filter: Option<Filter>,
    pub paint: Properties,
    pub layout: Properties,
    /// Initial visibility.
    pub visible: bool,
}

/// A GeoJSON source to add to the engine.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceSpec {
    pub id: LayerKey,
    pub data: GeoJson,
}

/// A layer as listed by the current style, managed or not.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StyleLayer {
    pub id: String,
    pub kind: LayerKind,
}

impl StyleLayer {
    pub fn new(id: impl Into<String>, kind: LayerKind) -> Self {
        Self {
            id: id.into(),
            kind,
        }
    }
}

/// A point marker to place on the map.
#[derive(Debug, Clone, PartialEq)]
pub struct MarkerSpec {
    pub coordinate: LonLat,
    pub title: String,
}

/// Engine-issued handle of a live marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MarkerHandle(pub u64);

/// Pixel position on the rendered map.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScreenPoint {
    pub x: f64,
    pub y: f64,
}

impl ScreenPoint {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// A feature hit by a rendered-feature query.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedFeature {
    pub layer: String,
    pub feature: Feature,
}

/// Lifecycle notification from the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MapEvent {
    /// Initial style finished loading.
    Load,
    /// The style changed; every managed layer and source may be gone.
    StyleData,
    /// Rendering settled.
    Idle,
}

/// Engine mutation failures.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum EngineError {
    #[error("Layer '{0}' does not exist")]
    MissingLayer(String),

    #[error("Source '{0}' does not exist")]
    MissingSource(String),

    #[error("Marker {0} does not exist")]
    MissingMarker(u64),

    #[error("Layer '{0}' already exists")]
    DuplicateLayer(String),

    #[error("Source '{0}' already exists")]
    DuplicateSource(String),

    #[error("Style is not loaded")]
    StyleNotLoaded,

    #[error("Engine rejected the request: {0}")]
    Rejected(String),
}

impl EngineError {
    /// Failures caused by engine state drifting from ours (a style reset
    /// dropped something). These heal on the next reinstallation.
    pub fn is_missing(&self) -> bool {
        matches!(
            self,
            EngineError::MissingLayer(_) | EngineError::MissingSource(_) | EngineError::MissingMarker(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_filter_property_equals() {
        let feature: Feature = serde_json::from_value(json!({
            "type": "Feature", "geometry": null, "properties": {"arondat": "s1", "bike_lane": true}
        }))
        .unwrap();

        assert!(Filter::property_equals("arondat", "s1").matches(&feature));
        assert!(!Filter::property_equals("arondat", "s2").matches(&feature));
        assert!(Filter::property_equals("bike_lane", true).matches(&feature));
        assert!(!Filter::property_equals("illgl_park", true).matches(&feature));
    }

    #[test]
    fn test_missing_errors() {
        assert!(EngineError::MissingLayer("x".into()).is_missing());
        assert!(EngineError::MissingSource("x".into()).is_missing());
        assert!(!EngineError::DuplicateLayer("x".into()).is_missing());
        assert!(!EngineError::StyleNotLoaded.is_missing());
    }
}
