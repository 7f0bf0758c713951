//! Marker synchronizer.
//!
//! A school marker exists exactly when the school's effective visibility is
//! on and the school has a coordinate. Markers are keyed by the school's
//! layer key, so the same school listed in two neighborhoods gets one marker
//! per neighborhood.

use std::collections::HashMap;

use tracing::{debug, error};

use crate::engine::{MapEngine, MarkerHandle, MarkerSpec};
use crate::index::SpatialIndex;
use crate::keys::{LayerKey, LayerPath, Slug};
use crate::visibility::FlagTree;

/// Marker title when the school has no display name.
pub const DEFAULT_MARKER_TITLE: &str = "Școală";

/// What a sync did to one marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkerChange {
    Created,
    Removed,
    Unchanged,
}

/// Totals over a full resync.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MarkerSummary {
    pub created: usize,
    pub removed: usize,
}

/// Live markers keyed by school layer key.
#[derive(Debug, Clone, Default)]
pub struct MarkerSet {
    live: HashMap<LayerKey, MarkerHandle>,
}

impl MarkerSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, key: &LayerKey) -> bool {
        self.live.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.live.len()
    }

    pub fn is_empty(&self) -> bool {
        self.live.is_empty()
    }

    /// Reconcile the marker of one school in one neighborhood.
    pub fn sync<E: MapEngine>(
        &mut self,
        engine: &mut E,
        index: &SpatialIndex,
        flags: &FlagTree,
        hood: &Slug,
        school: &Slug,
    ) -> MarkerChange {
        let path = LayerPath::School(hood.clone(), school.clone());
        let Some(coordinate) = index.school(school).and_then(|s| s.coordinate) else {
            return MarkerChange::Unchanged;
        };
        let key = path.key();
        let effective = flags.all(&path.required_flags());

        match (effective, self.live.get(&key).copied()) {
            (true, None) => {
                let title = index
                    .school(school)
                    .map(|s| s.display_name.as_str())
                    .filter(|name| !name.is_empty())
                    .unwrap_or(DEFAULT_MARKER_TITLE)
                    .to_string();
                match engine.add_marker(MarkerSpec { coordinate, title }) {
                    Ok(handle) => {
                        debug!(key = %key, "Marker added");
                        self.live.insert(key, handle);
                        MarkerChange::Created
                    }
                    Err(e) => {
                        error!(key = %key, error = %e, "Failed to add marker");
                        MarkerChange::Unchanged
                    }
                }
            }
            (false, Some(handle)) => {
                self.live.remove(&key);
                if let Err(e) = engine.remove_marker(handle) {
                    if e.is_missing() {
                        debug!(key = %key, "Marker was already gone");
                    } else {
                        error!(key = %key, error = %e, "Failed to remove marker");
                    }
                }
                MarkerChange::Removed
            }
            _ => MarkerChange::Unchanged,
        }
    }

    /// Reconcile every school of every neighborhood.
    pub fn sync_all<E: MapEngine>(
        &mut self,
        engine: &mut E,
        index: &SpatialIndex,
        flags: &FlagTree,
    ) -> MarkerSummary {
        let mut summary = MarkerSummary::default();
        for hood in index.neighborhoods() {
            for school in index.schools_in(&hood.slug) {
                match self.sync(engine, index, flags, &hood.slug, school) {
                    MarkerChange::Created => summary.created += 1,
                    MarkerChange::Removed => summary.removed += 1,
                    MarkerChange::Unchanged => {}
                }
            }
        }
        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::MemoryEngine;
    use crate::geojson::FeatureCollection;
    use serde_json::{json, Value};

    fn collection(features: Vec<Value>) -> FeatureCollection {
        serde_json::from_value(json!({"type": "FeatureCollection", "features": features})).unwrap()
    }

    fn index() -> SpatialIndex {
        let boundaries = collection(vec![
            json!({"type": "Feature", "geometry": null, "properties": {"denumire": "Downtown", "slug": "dtn"}}),
        ]);
        let streets = collection(vec![
            json!({"type": "Feature", "geometry": null, "properties": {"cartier": "dtn", "arondat": "s1"}}),
            json!({"type": "Feature", "geometry": null, "properties": {"cartier": "dtn", "arondat": "s2"}}),
            json!({"type": "Feature", "geometry": null, "properties": {"cartier": "dtn", "arondat": "s3"}}),
        ]);
        let schools = collection(vec![
            json!({"type": "Feature", "geometry": {"type": "Point", "coordinates": [24.1, 45.7]}, "properties": {"slug": "s1", "denumire": "Școala Gimnazială nr. 4"}}),
            json!({"type": "Feature", "geometry": {"type": "Point", "coordinates": [24.2, 45.8]}, "properties": {"slug": "s2"}}),
            json!({"type": "Feature", "geometry": null, "properties": {"slug": "s3", "denumire": "Fără coordonate"}}),
        ]);
        SpatialIndex::build(Some(&streets), Some(&schools), Some(&boundaries), None)
    }

    fn all_on(index: &SpatialIndex) -> FlagTree {
        let mut flags = FlagTree::new();
        for hood in index.neighborhoods() {
            flags.set(LayerPath::Neighborhood(hood.slug.clone()).key(), true);
            flags.set(LayerPath::Schools(hood.slug.clone()).key(), true);
            for school in index.schools_in(&hood.slug) {
                flags.set(LayerPath::School(hood.slug.clone(), school.clone()).key(), true);
            }
        }
        flags
    }

    #[test]
    fn test_markers_follow_effective_visibility() {
        let index = index();
        let mut engine = MemoryEngine::new();
        let mut markers = MarkerSet::new();
        let mut flags = all_on(&index);

        let summary = markers.sync_all(&mut engine, &index, &flags);
        assert_eq!(summary, MarkerSummary { created: 2, removed: 0 });
        assert_eq!(engine.marker_count(), 2);

        flags.set(LayerKey::build(&["dtn", "schools"]).unwrap(), false);
        let summary = markers.sync_all(&mut engine, &index, &flags);
        assert_eq!(summary, MarkerSummary { created: 0, removed: 2 });
        assert_eq!(engine.marker_count(), 0);
        assert!(markers.is_empty());
    }

    #[test]
    fn test_marker_titles() {
        let index = index();
        let mut engine = MemoryEngine::new();
        let mut markers = MarkerSet::new();
        markers.sync_all(&mut engine, &index, &all_on(&index));

        let titles: Vec<&str> = engine.markers().map(|(_, m)| m.title.as_str()).collect();
        assert_eq!(titles, vec!["Școala Gimnazială nr. 4", DEFAULT_MARKER_TITLE]);
    }

    #[test]
    fn test_sync_is_stable() {
        let index = index();
        let mut engine = MemoryEngine::new();
        let mut markers = MarkerSet::new();
        let flags = all_on(&index);
        markers.sync_all(&mut engine, &index, &flags);

        let hood = Slug::new("dtn").unwrap();
        let s1 = Slug::new("s1").unwrap();
        assert_eq!(
            markers.sync(&mut engine, &index, &flags, &hood, &s1),
            MarkerChange::Unchanged
        );
        assert_eq!(engine.marker_count(), 2);
    }

    #[test]
    fn test_school_without_coordinate_never_gets_marker() {
        let index = index();
        let mut engine = MemoryEngine::new();
        let mut markers = MarkerSet::new();
        let hood = Slug::new("dtn").unwrap();
        let s3 = Slug::new("s3").unwrap();
        assert_eq!(
            markers.sync(&mut engine, &index, &all_on(&index), &hood, &s3),
            MarkerChange::Unchanged
        );
        assert!(!markers.contains(&LayerPath::School(hood, s3).key()));
    }
}
