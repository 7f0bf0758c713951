//! The coordinating object of one map session.

use std::collections::HashSet;

use tracing::{debug, error, info, warn};

use super::flags::{ExpansionState, FlagTree};
use super::install::{install_base_layers, install_isochrone_layers, InstallReport};
use crate::engine::{EngineError, MapEngine, MapEvent, ScreenPoint};
use crate::index::{AmenityReport, SpatialIndex};
use crate::inspect::StreetSummary;
use crate::isochrone::IsochroneIndex;
use crate::keys::{IsoPart, KeyError, LayerKey, LayerPath, Slug, TravelMode};
use crate::markers::{MarkerSet, MarkerSummary};
use crate::order::{self, OrderReport};
use crate::panel::{self, Panel};
use crate::scheduler::{Scheduler, Task, Trigger};

/// Lifecycle of the managed layers in the current style.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstallState {
    Uninstalled,
    Installing,
    Installed,
}

/// Engine-side bookkeeping. Only valid for the style generation it was
/// built in; cleared at every reinstallation.
#[derive(Debug, Clone)]
pub struct Installation {
    state: InstallState,
    generation: u64,
    iso_loaded: HashSet<LayerKey>,
    street_layers: Vec<String>,
}

impl Installation {
    fn new() -> Self {
        Self {
            state: InstallState::Uninstalled,
            generation: 0,
            iso_loaded: HashSet::new(),
            street_layers: Vec::new(),
        }
    }

    pub fn state(&self) -> InstallState {
        self.state
    }

    /// Number of completed or started installations.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Whether the isochrone layers behind `fill` were created this generation.
    pub fn is_iso_loaded(&self, fill: &LayerKey) -> bool {
        self.iso_loaded.contains(fill)
    }

    pub fn iso_loaded_count(&self) -> usize {
        self.iso_loaded.len()
    }

    /// Street layer ids queried by feature inspection.
    pub fn street_layers(&self) -> &[String] {
        &self.street_layers
    }
}

/// Outcome of a visibility pass.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ApplyReport {
    pub applied: usize,
    /// Layers that vanished between listing and update.
    pub missing: usize,
    pub failed: Vec<(String, EngineError)>,
}

/// Outcome of a reinstallation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReinstallReport {
    pub generation: u64,
    pub install: InstallReport,
    pub apply: ApplyReport,
    pub markers: MarkerSummary,
}

/// Owns the index, flags, installation state and markers of one session and
/// keeps them in agreement with the engine.
pub struct OverlayController<E: MapEngine> {
    engine: E,
    index: SpatialIndex,
    isochrones: IsochroneIndex,
    flags: FlagTree,
    expansion: ExpansionState,
    installation: Installation,
    markers: MarkerSet,
    scheduler: Scheduler,
}

impl<E: MapEngine> OverlayController<E> {
    /// Create a controller with the panel's default flags.
    ///
    /// Nothing is installed until [`reinstall`](Self::reinstall) runs or a
    /// load notification arrives.
    pub fn new(engine: E, index: SpatialIndex, isochrones: IsochroneIndex) -> Self {
        let mut flags = FlagTree::new();
        panel::init_default_flags(&index, &mut flags);
        Self {
            engine,
            index,
            isochrones,
            flags,
            expansion: ExpansionState::default(),
            installation: Installation::new(),
            markers: MarkerSet::new(),
            scheduler: Scheduler::new(),
        }
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut E {
        &mut self.engine
    }

    pub fn index(&self) -> &SpatialIndex {
        &self.index
    }

    pub fn isochrones(&self) -> &IsochroneIndex {
        &self.isochrones
    }

    pub fn flags(&self) -> &FlagTree {
        &self.flags
    }

    pub fn expansion(&self) -> &ExpansionState {
        &self.expansion
    }

    pub fn installation(&self) -> &Installation {
        &self.installation
    }

    pub fn markers(&self) -> &MarkerSet {
        &self.markers
    }

    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    /// Stored flag of a node.
    pub fn flag(&self, path: &LayerPath) -> bool {
        self.flags.get(&path.key())
    }

    /// Effective visibility: the conjunction of the node's required flags.
    pub fn is_visible(&self, path: &LayerPath) -> bool {
        self.flags.all(&path.required_flags())
    }

    pub fn statistics(&self) -> Option<&AmenityReport> {
        self.index.report()
    }

    pub fn panel(&self) -> Panel {
        panel::build(&self.index, &self.flags, &self.expansion)
    }

    // =========================================================================
    // Installation
    // =========================================================================

    /// Rebuild every managed source and layer in the current style.
    ///
    /// Clears the isochrone guard, installs the base layers, materializes
    /// isochrones already switched on, schedules a reorder for the next idle
    /// notification, applies visibility and resyncs markers. Returns `None`
    /// when the style is not loaded yet.
    ///
    /// A reinstall queued by the same burst is dropped.
    pub fn reinstall(&mut self) -> Option<ReinstallReport> {
        if !self.engine.is_style_loaded() {
            debug!("Style not loaded, deferring installation");
            return None;
        }
        self.scheduler.cancel(Task::Reinstall);

        self.installation.state = InstallState::Installing;
        self.installation.generation += 1;
        self.installation.iso_loaded.clear();

        let mut install = InstallReport::default();
        self.installation.street_layers =
            install_base_layers(&mut self.engine, &self.index, &mut install);

        for (hood, school) in self.school_pairs() {
            if self.wants_isochrones(&hood, &school) {
                install.merge(self.ensure_isochrone_layers(&hood, &school));
            }
        }

        self.scheduler.schedule(Task::ReorderLayers);
        let apply = self.apply_visibility();
        let markers = self
            .markers
            .sync_all(&mut self.engine, &self.index, &self.flags);
        self.installation.state = InstallState::Installed;

        info!(
            generation = self.installation.generation,
            layers_added = install.layers_added,
            sources_added = install.sources_added,
            markers_created = markers.created,
            "Overlays installed"
        );
        Some(ReinstallReport {
            generation: self.installation.generation,
            install,
            apply,
            markers,
        })
    }

    /// Create the isochrone layers of one school in one neighborhood, at most
    /// once per style generation.
    ///
    /// New layers land on top of the stack, so a reorder is queued for the
    /// next idle notification whenever any were added.
    pub fn ensure_isochrone_layers(&mut self, hood: &Slug, school: &Slug) -> InstallReport {
        let mut report = InstallReport::default();
        install_isochrone_layers(
            &mut self.engine,
            &self.isochrones,
            &mut self.installation.iso_loaded,
            hood,
            school,
            &mut report,
        );
        if report.layers_added > 0 {
            self.scheduler.schedule(Task::ReorderLayers);
        }
        report
    }

    /// Set every managed layer's engine visibility from the flags.
    pub fn apply_visibility(&mut self) -> ApplyReport {
        let mut report = ApplyReport::default();
        for layer in self.engine.style_layers() {
            let Some(path) = LayerKey::parse(&layer.id)
                .ok()
                .and_then(|key| LayerPath::parse(&key))
            else {
                continue;
            };
            let visible = self.flags.all(&path.required_flags());
            match self.engine.set_layer_visibility(&layer.id, visible) {
                Ok(()) => report.applied += 1,
                Err(e) if e.is_missing() => {
                    warn!(layer = %layer.id, error = %e, "Layer vanished before visibility update");
                    report.missing += 1;
                }
                Err(e) => {
                    error!(layer = %layer.id, error = %e, "Failed to set layer visibility");
                    report.failed.push((layer.id, e));
                }
            }
        }
        report
    }

    /// Move managed layers into paint order.
    pub fn resolve_order(&mut self) -> OrderReport {
        order::resolve(&mut self.engine)
    }

    fn school_pairs(&self) -> Vec<(Slug, Slug)> {
        self.index
            .neighborhoods()
            .iter()
            .flat_map(|hood| {
                self.index
                    .schools_in(&hood.slug)
                    .iter()
                    .map(move |school| (hood.slug.clone(), school.clone()))
            })
            .collect()
    }

    /// Isochrone group on and at least one mode's fill on.
    fn wants_isochrones(&self, hood: &Slug, school: &Slug) -> bool {
        let group = LayerPath::Isochrones(hood.clone(), school.clone()).key();
        self.flags.get(&group)
            && TravelMode::ALL.into_iter().any(|mode| {
                self.flags.get(
                    &LayerPath::Isochrone(hood.clone(), school.clone(), mode, IsoPart::Fill).key(),
                )
            })
    }

    // =========================================================================
    // Toggles
    // =========================================================================

    /// Flags written by one panel toggle.
    fn linked_keys(&self, path: &LayerPath) -> Vec<LayerKey> {
        match path {
            LayerPath::Streets(h) => vec![path.key(), LayerPath::Background(h.clone()).key()],
            LayerPath::Isochrone(h, s, mode, _) => vec![
                LayerPath::Isochrone(h.clone(), s.clone(), *mode, IsoPart::Fill).key(),
                LayerPath::Isochrone(h.clone(), s.clone(), *mode, IsoPart::Stroke).key(),
            ],
            LayerPath::School(h, _) if self.index.schools_in(h).len() == 1 => {
                vec![path.key(), LayerPath::Schools(h.clone()).key()]
            }
            _ => vec![path.key()],
        }
    }

    /// Switch a node on or off and bring the engine in line.
    ///
    /// Writes the node's flag (plus the panel's linked flags), materializes
    /// isochrones if the toggle made them needed, reapplies visibility and
    /// resyncs markers. Engine failures are logged, never returned.
    pub fn set_visible(&mut self, path: &LayerPath, on: bool) -> ApplyReport {
        for key in self.linked_keys(path) {
            self.flags.set(key, on);
        }
        debug!(key = %path, on, "Visibility toggled");

        if let Some(school) = path.school() {
            let hood = path.neighborhood().clone();
            let school = school.clone();
            if self.installation.state != InstallState::Uninstalled
                && self.wants_isochrones(&hood, &school)
            {
                self.ensure_isochrone_layers(&hood, &school);
            }
        }

        let report = self.apply_visibility();
        self.markers
            .sync_all(&mut self.engine, &self.index, &self.flags);
        report
    }

    /// [`set_visible`](Self::set_visible) by raw key.
    pub fn set_visible_key(&mut self, id: &str, on: bool) -> Result<ApplyReport, KeyError> {
        let key = LayerKey::parse(id)?;
        let path = LayerPath::parse(&key).ok_or_else(|| KeyError::NotManaged(id.to_string()))?;
        Ok(self.set_visible(&path, on))
    }

    pub fn set_expanded(&mut self, key: LayerKey, expanded: bool) {
        self.expansion.set(key, expanded);
    }

    pub fn toggle_expansion(&mut self, key: LayerKey) -> bool {
        self.expansion.toggle(key)
    }

    // =========================================================================
    // Engine events
    // =========================================================================

    /// Background layer of the first neighborhood; its absence means the
    /// style was replaced behind our back.
    fn sentinel(&self) -> Option<LayerKey> {
        self.index
            .neighborhoods()
            .first()
            .map(|hood| LayerPath::Background(hood.slug.clone()).key())
    }

    /// React to an engine lifecycle notification.
    pub fn handle_event(&mut self, event: MapEvent) {
        match event {
            MapEvent::Load => {
                self.reinstall();
            }
            MapEvent::StyleData => {
                self.scheduler.schedule(Task::Reinstall);
            }
            MapEvent::Idle => {
                if let Some(sentinel) = self.sentinel() {
                    if !self.engine.has_layer(sentinel.as_str()) {
                        info!(sentinel = %sentinel, "Managed layers missing, reinstalling");
                        self.reinstall();
                    }
                }
                for task in self.scheduler.take(Trigger::Idle) {
                    self.run_task(task);
                }
            }
        }
    }

    /// Run tasks due on the next tick.
    pub fn run_pending(&mut self) {
        for task in self.scheduler.take(Trigger::NextTick) {
            self.run_task(task);
        }
    }

    fn run_task(&mut self, task: Task) {
        match task {
            Task::Reinstall => {
                self.reinstall();
            }
            Task::ReorderLayers => {
                self.resolve_order();
            }
        }
    }

    // =========================================================================
    // Inspection
    // =========================================================================

    /// Summary of the topmost street rendered at `point`.
    pub fn inspect_at(&self, point: ScreenPoint) -> Option<StreetSummary> {
        let hits = self
            .engine
            .query_rendered_features(point, self.installation.street_layers());
        let first = hits.into_iter().next()?;
        Some(StreetSummary::from_feature(&first.feature, &self.index))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::MemoryEngine;
    use crate::geojson::FeatureCollection;
    use crate::isochrone::bucket_isochrones;
    use serde_json::{json, Value};

    fn collection(features: Vec<Value>) -> FeatureCollection {
        serde_json::from_value(json!({"type": "FeatureCollection", "features": features})).unwrap()
    }

    fn slug(s: &str) -> Slug {
        Slug::new(s).unwrap()
    }

    fn cycle_fill(hood: &str, school: &str) -> LayerPath {
        LayerPath::Isochrone(slug(hood), slug(school), TravelMode::Cycle, IsoPart::Fill)
    }

    /// Downtown with one school (s1), Uptown with two (s2, s3).
    fn controller() -> OverlayController<MemoryEngine> {
        let boundaries = collection(vec![
            json!({"type": "Feature", "geometry": {"type": "Polygon", "coordinates": [[[0,0],[1,0],[1,1],[0,0]]]}, "properties": {"denumire": "Downtown", "slug": "dtn"}}),
            json!({"type": "Feature", "geometry": null, "properties": {"denumire": "Uptown", "slug": "upt"}}),
        ]);
        let streets = collection(vec![
            json!({"type": "Feature", "geometry": null, "properties": {"cartier": "dtn", "arondat": "s1", "bike_lane": true}}),
            json!({"type": "Feature", "geometry": null, "properties": {"cartier": "upt", "arondat": "s2"}}),
            json!({"type": "Feature", "geometry": null, "properties": {"cartier": "upt", "arondat": "s3"}}),
        ]);
        let schools = collection(vec![
            json!({"type": "Feature", "geometry": {"type": "Point", "coordinates": [24.1, 45.7]}, "properties": {"slug": "s1", "denumire": "Școala 1"}}),
            json!({"type": "Feature", "geometry": {"type": "Point", "coordinates": [24.2, 45.8]}, "properties": {"slug": "s2", "denumire": "Școala 2"}}),
            json!({"type": "Feature", "geometry": {"type": "Point", "coordinates": [24.3, 45.9]}, "properties": {"slug": "s3", "denumire": "Școala 3"}}),
        ]);
        let index = SpatialIndex::build(Some(&streets), Some(&schools), Some(&boundaries), None);
        let iso = collection(vec![
            json!({"type": "Feature", "geometry": null, "properties": {"den_scoala": "s1", "tip": "walking", "cost_level": 200}}),
            json!({"type": "Feature", "geometry": null, "properties": {"den_scoala": "s1", "tip": "cycling", "cost_level": 800}}),
            json!({"type": "Feature", "geometry": null, "properties": {"den_scoala": "s2", "tip": "walking", "cost_level": 200}}),
        ]);
        let isochrones = bucket_isochrones(iso, &index.school_slugs());
        OverlayController::new(MemoryEngine::new(), index, isochrones)
    }

    #[test]
    fn test_reinstall_installs_and_applies_defaults() {
        let mut c = controller();
        let report = c.reinstall().unwrap();

        assert_eq!(report.generation, 1);
        assert!(report.install.failed.is_empty());
        assert!(report.apply.failed.is_empty());
        assert_eq!(c.installation().state(), InstallState::Installed);

        assert_eq!(c.engine().is_visible("nb__dtn__bg"), Some(true));
        assert_eq!(c.engine().is_visible("nb__dtn__bike"), Some(true));
        assert_eq!(c.engine().is_visible("nb__dtn__schools__s1__assigned"), Some(false));
        assert_eq!(c.engine().is_visible("nb__dtn__mask"), Some(false));
        assert_eq!(c.engine().is_visible("nb__dtn__limit"), Some(true));

        // Cycle isochrones default on, which materializes every mode with data.
        assert_eq!(c.engine().is_visible("nb__dtn__schools__s1__iso__cycle_fill"), Some(true));
        assert_eq!(c.engine().is_visible("nb__dtn__schools__s1__iso__walk_fill"), Some(false));
        assert_eq!(c.engine().is_visible("nb__upt__schools__s2__iso__walk_fill"), Some(false));
        assert!(!c.engine().has_layer("nb__upt__schools__s2__iso__cycle_fill"));

        assert_eq!(c.engine().marker_count(), 3);
        assert!(c.scheduler().is_pending(Task::ReorderLayers));
    }

    #[test]
    fn test_reinstall_waits_for_style() {
        let mut c = controller();
        c.engine_mut().set_style_loaded(false);
        assert!(c.reinstall().is_none());
        assert_eq!(c.installation().state(), InstallState::Uninstalled);
    }

    #[test]
    fn test_streets_toggle_writes_background() {
        let mut c = controller();
        c.reinstall();

        c.set_visible(&LayerPath::Streets(slug("dtn")), false);
        assert!(!c.flag(&LayerPath::Background(slug("dtn"))));
        assert_eq!(c.engine().is_visible("nb__dtn__bg"), Some(false));
        assert_eq!(c.engine().is_visible("nb__dtn__bike"), Some(false));

        c.set_visible(&LayerPath::Streets(slug("dtn")), true);
        assert_eq!(c.engine().is_visible("nb__dtn__bg"), Some(true));
        assert_eq!(c.engine().is_visible("nb__dtn__bike"), Some(true));
    }

    #[test]
    fn test_mode_toggle_writes_fill_and_stroke_and_materializes() {
        let mut c = controller();
        c.set_visible(&cycle_fill("upt", "s2"), false);
        c.reinstall();
        let walk_stroke = LayerPath::Isochrone(slug("upt"), slug("s2"), TravelMode::Walk, IsoPart::Stroke);
        assert!(!c.engine().has_layer(walk_stroke.key().as_str()));

        let walk_fill = LayerPath::Isochrone(slug("upt"), slug("s2"), TravelMode::Walk, IsoPart::Fill);
        c.set_visible(&walk_fill, true);

        assert!(c.flag(&walk_stroke));
        assert_eq!(c.engine().is_visible(walk_fill.key().as_str()), Some(true));
        assert_eq!(c.engine().is_visible(walk_stroke.key().as_str()), Some(true));
    }

    #[test]
    fn test_lazy_isochrones_queue_reorder() {
        let mut c = controller();
        c.set_visible(&cycle_fill("upt", "s2"), false);
        c.handle_event(MapEvent::Idle);
        assert!(!c.scheduler().is_pending(Task::ReorderLayers));

        let walk_fill = LayerPath::Isochrone(slug("upt"), slug("s2"), TravelMode::Walk, IsoPart::Fill);
        c.set_visible(&walk_fill, true);
        assert!(c.scheduler().is_pending(Task::ReorderLayers));

        c.handle_event(MapEvent::Idle);
        assert!(c.scheduler().is_empty());

        // Already materialized; nothing new to order.
        c.set_visible(&walk_fill, false);
        c.set_visible(&walk_fill, true);
        assert!(!c.scheduler().is_pending(Task::ReorderLayers));
    }

    #[test]
    fn test_reinstall_drops_queued_reinstall() {
        let mut c = controller();
        c.handle_event(MapEvent::Load);
        c.engine_mut().reset_style();

        c.handle_event(MapEvent::StyleData);
        c.handle_event(MapEvent::Idle);
        assert_eq!(c.installation().generation(), 2);
        assert!(!c.scheduler().is_pending(Task::Reinstall));

        c.run_pending();
        assert_eq!(c.installation().generation(), 2);
        assert!(c.scheduler().is_empty());
    }

    #[test]
    fn test_single_school_row_writes_schools_group() {
        let mut c = controller();
        c.reinstall();

        c.set_visible(&LayerPath::School(slug("dtn"), slug("s1")), false);
        assert!(!c.flag(&LayerPath::Schools(slug("dtn"))));

        // Uptown lists two schools; its group flag is independent.
        c.set_visible(&LayerPath::School(slug("upt"), slug("s2")), false);
        assert!(c.flag(&LayerPath::Schools(slug("upt"))));
        assert_eq!(c.engine().marker_count(), 1);
    }

    #[test]
    fn test_set_visible_key_rejects_foreign_ids() {
        let mut c = controller();
        assert!(matches!(
            c.set_visible_key("waterway-label", true),
            Err(KeyError::NotManaged(_))
        ));
        assert!(matches!(
            c.set_visible_key("nb__dtn__nonsense", true),
            Err(KeyError::NotManaged(_))
        ));
        assert!(c.set_visible_key("nb__dtn__bike", false).is_ok());
        assert!(!c.flag(&LayerPath::Category(slug("dtn"), crate::keys::StreetCategory::BikeLane)));
    }

    #[test]
    fn test_toggle_before_install_only_writes_flags() {
        let mut c = controller();
        let walk_fill = LayerPath::Isochrone(slug("dtn"), slug("s1"), TravelMode::Walk, IsoPart::Fill);
        c.set_visible(&walk_fill, true);
        assert!(c.flag(&walk_fill));
        assert_eq!(c.installation().iso_loaded_count(), 0);
        assert!(!c.engine().has_layer(walk_fill.key().as_str()));
    }

    #[test]
    fn test_styledata_burst_coalesces_into_one_reinstall() {
        let mut c = controller();
        c.handle_event(MapEvent::Load);
        assert_eq!(c.installation().generation(), 1);

        c.engine_mut().reset_style();
        for _ in 0..5 {
            c.handle_event(MapEvent::StyleData);
        }
        c.run_pending();

        assert_eq!(c.installation().generation(), 2);
        assert_eq!(c.engine().layer_additions("nb__dtn__bg"), 2);
    }

    #[test]
    fn test_idle_reinstalls_when_sentinel_missing_and_reorders() {
        let mut c = controller();
        c.handle_event(MapEvent::Idle);
        assert_eq!(c.installation().generation(), 1);
        assert!(!c.scheduler().is_pending(Task::ReorderLayers));

        c.handle_event(MapEvent::Idle);
        assert_eq!(c.installation().generation(), 1);
    }

    #[test]
    fn test_expansion_is_independent_of_flags() {
        let mut c = controller();
        let hood = LayerPath::Neighborhood(slug("dtn")).key();
        assert!(c.toggle_expansion(hood.clone()));
        assert!(c.expansion().is_expanded(&hood));
        assert!(c.flag(&LayerPath::Neighborhood(slug("dtn"))));
        c.set_expanded(hood.clone(), false);
        assert!(!c.expansion().is_expanded(&hood));
    }
}
