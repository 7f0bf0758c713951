//! In-process map engine.
//!
//! Keeps the style as an ordered layer list plus a source table, the way a
//! real renderer's style object does, without drawing anything. Used by the
//! CLI and by tests, which also use it to simulate style resets and to place
//! features under the cursor for rendered-feature queries.

use std::collections::{BTreeMap, HashMap};

use tracing::trace;

use super::basemap::BaseMap;
use super::types::{
    EngineError, Filter, LayerKind, LayerSpec, MarkerHandle, MarkerSpec, Properties,
    RenderedFeature, ScreenPoint, SourceSpec, StyleLayer,
};
use super::MapEngine;
use crate::geojson::{Feature, GeoJson};

/// Pixel tolerance when matching placed features to a query point.
const HIT_TOLERANCE: f64 = 0.5;

/// A layer in the memory engine's style.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineLayer {
    pub id: String,
    pub kind: LayerKind,
    /// `None` for base-map layers.
    pub source: Option<String>,
    pub filter: Option<Filter>,
    pub paint: Properties,
    pub layout: Properties,
    pub visible: bool,
}

impl EngineLayer {
    fn base(layer: &StyleLayer) -> Self {
        Self {
            id: layer.id.clone(),
            kind: layer.kind,
            source: None,
            filter: None,
            paint: Properties::new(),
            layout: Properties::new(),
            visible: true,
        }
    }
}

#[derive(Debug, Clone)]
struct Placement {
    point: ScreenPoint,
    source: String,
    feature: Feature,
}

/// Map engine that keeps all state in memory.
#[derive(Debug, Clone)]
pub struct MemoryEngine {
    style_loaded: bool,
    base: Vec<StyleLayer>,
    layers: Vec<EngineLayer>,
    sources: HashMap<String, GeoJson>,
    markers: BTreeMap<MarkerHandle, MarkerSpec>,
    next_marker: u64,
    placements: Vec<Placement>,
    layer_additions: HashMap<String, usize>,
    style_generation: u64,
}

impl MemoryEngine {
    /// Engine with the default base map loaded.
    pub fn new() -> Self {
        Self::with_base_map(BaseMap::default())
    }

    pub fn with_base_map(base: BaseMap) -> Self {
        Self::with_base_layers(base.style_layers())
    }

    /// Engine with a loaded style made of the given base layers.
    pub fn with_base_layers(base: Vec<StyleLayer>) -> Self {
        let layers = base.iter().map(EngineLayer::base).collect();
        Self {
            style_loaded: true,
            base,
            layers,
            sources: HashMap::new(),
            markers: BTreeMap::new(),
            next_marker: 1,
            placements: Vec::new(),
            layer_additions: HashMap::new(),
            style_generation: 0,
        }
    }

    /// Replace the style with its base layers, dropping every added layer
    /// and source. Markers are kept.
    pub fn reset_style(&mut self) {
        self.layers = self.base.iter().map(EngineLayer::base).collect();
        self.sources.clear();
        self.style_loaded = true;
        self.style_generation += 1;
        trace!(generation = self.style_generation, "Style reset");
    }

    /// Switch base map, dropping added layers and sources.
    pub fn set_base_map(&mut self, base: BaseMap) {
        self.base = base.style_layers();
        self.reset_style();
    }

    pub fn set_style_loaded(&mut self, loaded: bool) {
        self.style_loaded = loaded;
    }

    /// Number of style resets so far.
    pub fn style_generation(&self) -> u64 {
        self.style_generation
    }

    /// Make `feature` of `source` render at `point`.
    pub fn place_feature(&mut self, point: ScreenPoint, source: &str, feature: Feature) {
        self.placements.push(Placement {
            point,
            source: source.to_string(),
            feature,
        });
    }

    /// Layer ids bottom to top.
    pub fn layer_ids(&self) -> Vec<&str> {
        self.layers.iter().map(|l| l.id.as_str()).collect()
    }

    pub fn layer(&self, id: &str) -> Option<&EngineLayer> {
        self.layers.iter().find(|l| l.id == id)
    }

    /// Visibility of a layer; `None` when the layer does not exist.
    pub fn is_visible(&self, id: &str) -> Option<bool> {
        self.layer(id).map(|l| l.visible)
    }

    pub fn source(&self, id: &str) -> Option<&GeoJson> {
        self.sources.get(id)
    }

    pub fn source_count(&self) -> usize {
        self.sources.len()
    }

    /// Live markers in creation order.
    pub fn markers(&self) -> impl Iterator<Item = (&MarkerHandle, &MarkerSpec)> {
        self.markers.iter()
    }

    pub fn marker_count(&self) -> usize {
        self.markers.len()
    }

    /// How many times a layer id has been added over the engine's lifetime.
    pub fn layer_additions(&self, id: &str) -> usize {
        self.layer_additions.get(id).copied().unwrap_or(0)
    }

    fn position(&self, id: &str) -> Result<usize, EngineError> {
        self.layers
            .iter()
            .position(|l| l.id == id)
            .ok_or_else(|| EngineError::MissingLayer(id.to_string()))
    }
}

impl Default for MemoryEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl MapEngine for MemoryEngine {
    fn is_style_loaded(&self) -> bool {
        self.style_loaded
    }

    fn has_source(&self, id: &str) -> bool {
        self.sources.contains_key(id)
    }

    fn add_source(&mut self, spec: SourceSpec) -> Result<(), EngineError> {
        if !self.style_loaded {
            return Err(EngineError::StyleNotLoaded);
        }
        let id = spec.id.as_str().to_string();
        if self.sources.contains_key(&id) {
            return Err(EngineError::DuplicateSource(id));
        }
        self.sources.insert(id, spec.data);
        Ok(())
    }

    fn remove_source(&mut self, id: &str) -> Result<(), EngineError> {
        if self.layers.iter().any(|l| l.source.as_deref() == Some(id)) {
            return Err(EngineError::Rejected(format!(
                "Source '{}' is in use by a layer",
                id
            )));
        }
        self.sources
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| EngineError::MissingSource(id.to_string()))
    }

    fn has_layer(&self, id: &str) -> bool {
        self.layers.iter().any(|l| l.id == id)
    }

    fn add_layer(&mut self, spec: LayerSpec) -> Result<(), EngineError> {
        if !self.style_loaded {
            return Err(EngineError::StyleNotLoaded);
        }
        let id = spec.id.as_str().to_string();
        if self.has_layer(&id) {
            return Err(EngineError::DuplicateLayer(id));
        }
        let source = spec.source.as_str().to_string();
        if !self.sources.contains_key(&source) {
            return Err(EngineError::MissingSource(source));
        }
        *self.layer_additions.entry(id.clone()).or_insert(0) += 1;
        self.layers.push(EngineLayer {
            id,
            kind: spec.kind,
            source: Some(source),
            filter: spec.filter,
            paint: spec.paint,
            layout: spec.layout,
            visible: spec.visible,
        });
        Ok(())
    }

    fn remove_layer(&mut self, id: &str) -> Result<(), EngineError> {
        let index = self.position(id)?;
        self.layers.remove(index);
        Ok(())
    }

    fn set_layer_visibility(&mut self, id: &str, visible: bool) -> Result<(), EngineError> {
        let index = self.position(id)?;
        self.layers[index].visible = visible;
        Ok(())
    }

    fn move_layer(&mut self, id: &str, before: Option<&str>) -> Result<(), EngineError> {
        let from = self.position(id)?;
        match before {
            Some(anchor) if anchor == id => Ok(()),
            Some(anchor) => {
                self.position(anchor)?;
                let layer = self.layers.remove(from);
                let to = self.position(anchor)?;
                self.layers.insert(to, layer);
                Ok(())
            }
            None => {
                let layer = self.layers.remove(from);
                self.layers.push(layer);
                Ok(())
            }
        }
    }

    fn style_layers(&self) -> Vec<StyleLayer> {
        self.layers
            .iter()
            .map(|l| StyleLayer::new(l.id.clone(), l.kind))
            .collect()
    }

    fn query_rendered_features(&self, point: ScreenPoint, layers: &[String]) -> Vec<RenderedFeature> {
        let mut hits = Vec::new();
        for layer in self.layers.iter().rev() {
            if !layer.visible || !layers.iter().any(|id| id == &layer.id) {
                continue;
            }
            let Some(source) = layer.source.as_deref() else {
                continue;
            };
            for placement in &self.placements {
                let under_cursor = (placement.point.x - point.x).abs() <= HIT_TOLERANCE
                    && (placement.point.y - point.y).abs() <= HIT_TOLERANCE;
                let passes = layer
                    .filter
                    .as_ref()
                    .map_or(true, |f| f.matches(&placement.feature));
                if under_cursor && placement.source == source && passes {
                    hits.push(RenderedFeature {
                        layer: layer.id.clone(),
                        feature: placement.feature.clone(),
                    });
                }
            }
        }
        hits
    }

    fn add_marker(&mut self, spec: MarkerSpec) -> Result<MarkerHandle, EngineError> {
        let handle = MarkerHandle(self.next_marker);
        self.next_marker += 1;
        self.markers.insert(handle, spec);
        Ok(handle)
    }

    fn remove_marker(&mut self, handle: MarkerHandle) -> Result<(), EngineError> {
        self.markers
            .remove(&handle)
            .map(|_| ())
            .ok_or(EngineError::MissingMarker(handle.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geojson::{FeatureCollection, LonLat};
    use crate::keys::LayerKey;
    use serde_json::json;

    fn key(parts: &[&str]) -> LayerKey {
        LayerKey::build(parts).unwrap()
    }

    fn source(id: &LayerKey) -> SourceSpec {
        SourceSpec {
            id: id.clone(),
            data: GeoJson::FeatureCollection(FeatureCollection::default()),
        }
    }

    fn layer(id: &LayerKey, source: &LayerKey) -> LayerSpec {
        LayerSpec {
            id: id.clone(),
            source: source.clone(),
            kind: LayerKind::Line,
            filter: None,
            paint: Properties::new(),
            layout: Properties::new(),
            visible: false,
        }
    }

    fn labelled_engine() -> MemoryEngine {
        MemoryEngine::with_base_layers(vec![
            StyleLayer::new("base", LayerKind::Raster),
            StyleLayer::new("labels", LayerKind::Symbol),
        ])
    }

    #[test]
    fn test_layer_requires_source() {
        let mut engine = MemoryEngine::new();
        let src = key(&["src", "a"]);
        let lyr = key(&["a", "bg"]);

        assert_eq!(
            engine.add_layer(layer(&lyr, &src)),
            Err(EngineError::MissingSource(src.to_string()))
        );
        engine.add_source(source(&src)).unwrap();
        engine.add_layer(layer(&lyr, &src)).unwrap();
        assert_eq!(engine.is_visible(lyr.as_str()), Some(false));
        assert_eq!(
            engine.add_layer(layer(&lyr, &src)),
            Err(EngineError::DuplicateLayer(lyr.to_string()))
        );
    }

    #[test]
    fn test_reset_style_drops_added_state_but_keeps_markers() {
        let mut engine = labelled_engine();
        let src = key(&["src", "a"]);
        engine.add_source(source(&src)).unwrap();
        engine.add_layer(layer(&key(&["a", "bg"]), &src)).unwrap();
        engine
            .add_marker(MarkerSpec {
                coordinate: LonLat::new(24.1, 45.7),
                title: "Școala 1".into(),
            })
            .unwrap();

        engine.reset_style();

        assert_eq!(engine.layer_ids(), vec!["base", "labels"]);
        assert!(!engine.has_source(src.as_str()));
        assert_eq!(engine.marker_count(), 1);
        assert_eq!(engine.style_generation(), 1);
    }

    #[test]
    fn test_move_layer_before_anchor_and_to_top() {
        let mut engine = labelled_engine();
        let src = key(&["src", "a"]);
        engine.add_source(source(&src)).unwrap();
        let a = key(&["a", "bg"]);
        let b = key(&["a", "bike"]);
        engine.add_layer(layer(&a, &src)).unwrap();
        engine.add_layer(layer(&b, &src)).unwrap();

        engine.move_layer(a.as_str(), Some("labels")).unwrap();
        assert_eq!(engine.layer_ids(), vec!["base", "nb__a__bg", "labels", "nb__a__bike"]);

        engine.move_layer("labels", None).unwrap();
        assert_eq!(engine.layer_ids(), vec!["base", "nb__a__bg", "nb__a__bike", "labels"]);

        assert_eq!(
            engine.move_layer("ghost", None),
            Err(EngineError::MissingLayer("ghost".into()))
        );
        assert_eq!(
            engine.move_layer(a.as_str(), Some("ghost")),
            Err(EngineError::MissingLayer("ghost".into()))
        );
        assert_eq!(engine.layer_ids(), vec!["base", "nb__a__bg", "nb__a__bike", "labels"]);
    }

    #[test]
    fn test_style_not_loaded_rejects_additions() {
        let mut engine = MemoryEngine::new();
        engine.set_style_loaded(false);
        assert_eq!(
            engine.add_source(source(&key(&["src", "a"]))),
            Err(EngineError::StyleNotLoaded)
        );
    }

    #[test]
    fn test_query_returns_visible_filtered_hits() {
        let mut engine = MemoryEngine::new();
        let src = key(&["src", "a"]);
        engine.add_source(source(&src)).unwrap();
        let bg = key(&["a", "bg"]);
        let bike = key(&["a", "bike"]);
        engine.add_layer(layer(&bg, &src)).unwrap();
        let mut bike_spec = layer(&bike, &src);
        bike_spec.filter = Some(Filter::property_equals("bike_lane", true));
        engine.add_layer(bike_spec).unwrap();

        let street: Feature = serde_json::from_value(json!({
            "type": "Feature", "geometry": null, "properties": {"name": "Str. Lungă", "bike_lane": false}
        }))
        .unwrap();
        engine.place_feature(ScreenPoint::new(10.0, 10.0), src.as_str(), street);

        let layers = vec![bg.to_string(), bike.to_string()];
        assert!(engine
            .query_rendered_features(ScreenPoint::new(10.0, 10.0), &layers)
            .is_empty());

        engine.set_layer_visibility(bg.as_str(), true).unwrap();
        engine.set_layer_visibility(bike.as_str(), true).unwrap();
        let hits = engine.query_rendered_features(ScreenPoint::new(10.2, 9.9), &layers);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].layer, bg.to_string());
        assert!(engine
            .query_rendered_features(ScreenPoint::new(50.0, 50.0), &layers)
            .is_empty());
    }

    #[test]
    fn test_remove_marker_twice_is_missing() {
        let mut engine = MemoryEngine::new();
        let handle = engine
            .add_marker(MarkerSpec {
                coordinate: LonLat::new(0.0, 0.0),
                title: "x".into(),
            })
            .unwrap();
        engine.remove_marker(handle).unwrap();
        assert_eq!(
            engine.remove_marker(handle),
            Err(EngineError::MissingMarker(handle.0))
        );
    }
}
