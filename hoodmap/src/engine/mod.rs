//! Map engine interface.
//!
//! The overlay never renders anything itself. It drives an engine through
//! [`MapEngine`] and reacts to [`MapEvent`]s the engine emits. Layers and
//! sources live in separate id namespaces; managed ids are [`LayerKey`]s,
//! base-map layers are arbitrary strings.
//!
//! A style change silently drops every layer and source that is not part of
//! the base style. Markers survive style changes.
//!
//! [`LayerKey`]: crate::keys::LayerKey

mod basemap;
mod memory;
mod types;

pub use basemap::BaseMap;
pub use memory::{EngineLayer, MemoryEngine};
pub use types::{
    EngineError, Filter, LayerKind, LayerSpec, MapEvent, MarkerHandle, MarkerSpec, Properties,
    RenderedFeature, ScreenPoint, SourceSpec, StyleLayer,
};

/// Operations the overlay needs from a map engine.
pub trait MapEngine: Send {
    /// Whether the current style has finished loading.
    fn is_style_loaded(&self) -> bool;

    fn has_source(&self, id: &str) -> bool;

    /// Add a source; fails with [`EngineError::DuplicateSource`] if the id exists.
    fn add_source(&mut self, spec: SourceSpec) -> Result<(), EngineError>;

    fn remove_source(&mut self, id: &str) -> Result<(), EngineError>;

    fn has_layer(&self, id: &str) -> bool;

    /// Add a layer on top of the stack. The referenced source must exist.
    fn add_layer(&mut self, spec: LayerSpec) -> Result<(), EngineError>;

    fn remove_layer(&mut self, id: &str) -> Result<(), EngineError>;

    fn set_layer_visibility(&mut self, id: &str, visible: bool) -> Result<(), EngineError>;

    /// Move a layer directly below `before`, or to the top when `None`.
    fn move_layer(&mut self, id: &str, before: Option<&str>) -> Result<(), EngineError>;

    /// Every layer of the current style, bottom to top.
    fn style_layers(&self) -> Vec<StyleLayer>;

    /// Features rendered at `point` on any of `layers`, topmost first.
    fn query_rendered_features(&self, point: ScreenPoint, layers: &[String]) -> Vec<RenderedFeature>;

    fn add_marker(&mut self, spec: MarkerSpec) -> Result<MarkerHandle, EngineError>;

    fn remove_marker(&mut self, handle: MarkerHandle) -> Result<(), EngineError>;
}
