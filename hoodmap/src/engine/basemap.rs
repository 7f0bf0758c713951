//! Selectable base map styles.

use std::fmt;
use std::str::FromStr;

use super::types::{LayerKind, StyleLayer};

/// Base map styles offered by the style switcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BaseMap {
    OpenStreetMap,
    GoogleLike,
    #[default]
    Dark,
    None,
}

impl BaseMap {
    pub const ALL: [BaseMap; 4] = [
        BaseMap::OpenStreetMap,
        BaseMap::GoogleLike,
        BaseMap::Dark,
        BaseMap::None,
    ];

    /// Name shown in the switcher.
    pub fn name(self) -> &'static str {
        match self {
            BaseMap::OpenStreetMap => "OpenStreetMap",
            BaseMap::GoogleLike => "Google-like",
            BaseMap::Dark => "Dark (OSM / CARTO)",
            BaseMap::None => "None",
        }
    }

    /// Short identifier for configuration and the command line.
    pub fn id(self) -> &'static str {
        match self {
            BaseMap::OpenStreetMap => "osm",
            BaseMap::GoogleLike => "light",
            BaseMap::Dark => "dark",
            BaseMap::None => "none",
        }
    }

    /// Layers of the style, bottom to top.
    ///
    /// Only the vector style carries labels; the raster styles have a single
    /// tile layer and the empty style has nothing.
    pub fn style_layers(self) -> Vec<StyleLayer> {
        match self {
            BaseMap::OpenStreetMap => vec![
                StyleLayer::new("background", LayerKind::Background),
                StyleLayer::new("water", LayerKind::Fill),
                StyleLayer::new("roads", LayerKind::Line),
                StyleLayer::new("road-labels", LayerKind::Symbol),
                StyleLayer::new("place-labels", LayerKind::Symbol),
            ],
            BaseMap::GoogleLike => vec![StyleLayer::new("cartoLight", LayerKind::Raster)],
            BaseMap::Dark => vec![StyleLayer::new("cartoDark", LayerKind::Raster)],
            BaseMap::None => Vec::new(),
        }
    }
}

impl fmt::Display for BaseMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for BaseMap {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        BaseMap::ALL
            .into_iter()
            .find(|b| b.id() == wanted)
            .ok_or_else(|| {
                let ids: Vec<&str> = BaseMap::ALL.iter().map(|b| b.id()).collect();
                format!("unknown base map '{}', expected one of: {}", s, ids.join(", "))
            })
    }
}
