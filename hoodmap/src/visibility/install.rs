//! Idempotent creation of engine sources and layers.
//!
//! Every function here skips ids that already exist, so running it against a
//! partially installed style fills in only what is missing. Layers are always
//! created hidden; visibility is applied afterwards in one pass.

use std::collections::HashSet;

use tracing::{debug, error, warn};

use super::style;
use crate::engine::{EngineError, Filter, LayerKind, LayerSpec, MapEngine, Properties, SourceSpec};
use crate::geojson::{FeatureCollection, GeoJson};
use crate::index::{props, SpatialIndex};
use crate::isochrone::IsochroneIndex;
use crate::keys::{IsoPart, LayerKey, LayerPath, Slug, SourcePath, StreetCategory, TravelMode};

/// Tally of engine mutations made by an installation pass.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InstallReport {
    pub sources_added: usize,
    pub layers_added: usize,
    /// Mutations that failed because the engine lost track of an id.
    pub missing: usize,
    /// Any other failed mutation.
    pub failed: Vec<(String, EngineError)>,
}

impl InstallReport {
    pub fn merge(&mut self, other: InstallReport) {
        self.sources_added += other.sources_added;
        self.layers_added += other.layers_added;
        self.missing += other.missing;
        self.failed.extend(other.failed);
    }

    fn source(&mut self, id: &LayerKey, result: Result<(), EngineError>) -> bool {
        let ok = self.record(id, result);
        if ok {
            self.sources_added += 1;
        }
        ok
    }

    fn layer(&mut self, id: &LayerKey, result: Result<(), EngineError>) -> bool {
        let ok = self.record(id, result);
        if ok {
            self.layers_added += 1;
        }
        ok
    }

    fn record(&mut self, id: &LayerKey, result: Result<(), EngineError>) -> bool {
        match result {
            Ok(()) => true,
            Err(e) if e.is_missing() => {
                warn!(id = %id, error = %e, "Engine state changed under the installer");
                self.missing += 1;
                false
            }
            Err(e) => {
                error!(id = %id, error = %e, "Engine rejected an installation step");
                self.failed.push((id.to_string(), e));
                false
            }
        }
    }
}

fn line_layer(id: LayerKey, source: LayerKey, paint: Properties, filter: Option<Filter>) -> LayerSpec {
    LayerSpec {
        id,
        source,
        kind: LayerKind::Line,
        filter,
        paint,
        layout: style::rounded_line_layout(),
        visible: false,
    }
}

fn ensure_source<E: MapEngine>(
    engine: &mut E,
    report: &mut InstallReport,
    id: LayerKey,
    data: impl FnOnce() -> GeoJson,
) -> bool {
    if engine.has_source(id.as_str()) {
        return true;
    }
    let result = engine.add_source(SourceSpec {
        id: id.clone(),
        data: data(),
    });
    report.source(&id, result)
}

fn ensure_layer<E: MapEngine>(engine: &mut E, report: &mut InstallReport, spec: LayerSpec) {
    if engine.has_layer(spec.id.as_str()) {
        return;
    }
    let id = spec.id.clone();
    let result = engine.add_layer(spec);
    report.layer(&id, result);
}

/// Install every neighborhood's street, assigned, limit and mask layers.
///
/// Returns the ids of the street layers (background, categories, assigned)
/// in installation order, for rendered-feature queries.
pub fn install_base_layers<E: MapEngine>(
    engine: &mut E,
    index: &SpatialIndex,
    report: &mut InstallReport,
) -> Vec<String> {
    let mut street_layers = Vec::new();

    for hood in index.neighborhoods() {
        let h = &hood.slug;
        let Some(bucket) = index.bucket(h) else {
            continue;
        };

        let src = SourcePath::Neighborhood(h.clone()).key();
        ensure_source(engine, report, src.clone(), || {
            GeoJson::FeatureCollection(FeatureCollection::new(bucket.street_features.clone()))
        });

        let bg = LayerPath::Background(h.clone()).key();
        street_layers.push(bg.to_string());
        ensure_layer(
            engine,
            report,
            line_layer(bg, src.clone(), style::background_paint(), None),
        );

        for category in StreetCategory::ALL {
            let id = LayerPath::Category(h.clone(), category).key();
            street_layers.push(id.to_string());
            ensure_layer(
                engine,
                report,
                line_layer(
                    id,
                    src.clone(),
                    style::category_paint(category),
                    Some(Filter::property_equals(category.property(), true)),
                ),
            );
        }

        for school in &bucket.school_slugs {
            let id = LayerPath::Assigned(h.clone(), school.clone()).key();
            street_layers.push(id.to_string());
            ensure_layer(
                engine,
                report,
                line_layer(
                    id,
                    src.clone(),
                    style::assigned_paint(),
                    Some(Filter::property_equals(props::SCHOOL_REF, school.as_str())),
                ),
            );
        }

        if let Some(boundary) = index.boundary(h) {
            let limit_src = SourcePath::Limit(h.clone()).key();
            ensure_source(engine, report, limit_src.clone(), || {
                GeoJson::Feature(boundary.clone())
            });

            match style::mask_around(boundary) {
                Some(mask) => {
                    let mask_src = SourcePath::Mask(h.clone()).key();
                    if ensure_source(engine, report, mask_src.clone(), || GeoJson::Feature(mask)) {
                        ensure_layer(
                            engine,
                            report,
                            LayerSpec {
                                id: LayerPath::Mask(h.clone()).key(),
                                source: mask_src,
                                kind: LayerKind::Fill,
                                filter: None,
                                paint: style::mask_paint(),
                                layout: Properties::new(),
                                visible: false,
                            },
                        );
                    }
                }
                None => debug!(neighborhood = %h, "Boundary has no polygon ring, no mask"),
            }

            ensure_layer(
                engine,
                report,
                LayerSpec {
                    id: LayerPath::Limit(h.clone()).key(),
                    source: limit_src,
                    kind: LayerKind::Line,
                    filter: None,
                    paint: style::limit_paint(),
                    layout: Properties::new(),
                    visible: false,
                },
            );
        }
    }

    street_layers
}

/// Create the isochrone source and layers of one school in one neighborhood.
///
/// Per mode with data: the `(school, mode)` source, shared by every
/// neighborhood listing the school, plus this neighborhood's fill and stroke
/// layers. `loaded` holds the fill keys already handled in the current style
/// generation; those modes are skipped without touching the engine.
pub fn install_isochrone_layers<E: MapEngine>(
    engine: &mut E,
    isochrones: &IsochroneIndex,
    loaded: &mut HashSet<LayerKey>,
    hood: &Slug,
    school: &Slug,
    report: &mut InstallReport,
) {
    for mode in TravelMode::ALL {
        let Some(collection) = isochrones.collection(school, mode) else {
            continue;
        };
        let fill = LayerPath::Isochrone(hood.clone(), school.clone(), mode, IsoPart::Fill).key();
        if loaded.contains(&fill) {
            continue;
        }

        let src = SourcePath::Isochrone(school.clone(), mode).key();
        if !ensure_source(engine, report, src.clone(), || {
            GeoJson::FeatureCollection(collection.clone())
        }) {
            continue;
        }

        ensure_layer(
            engine,
            report,
            LayerSpec {
                id: fill.clone(),
                source: src.clone(),
                kind: LayerKind::Fill,
                filter: None,
                paint: style::iso_fill_paint(mode),
                layout: style::iso_fill_layout(),
                visible: false,
            },
        );
        ensure_layer(
            engine,
            report,
            LayerSpec {
                id: LayerPath::Isochrone(hood.clone(), school.clone(), mode, IsoPart::Stroke).key(),
                source: src,
                kind: LayerKind::Line,
                filter: None,
                paint: style::iso_stroke_paint(mode),
                layout: Properties::new(),
                visible: false,
            },
        );
        debug!(neighborhood = %hood, school = %school, mode = mode.segment(), "Isochrone layers installed");
        loaded.insert(fill);
    }
}
