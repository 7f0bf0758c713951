//! Spatial index built once from the four core datasets.

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use std::sync::LazyLock;

use regex::Regex;
use tracing::{debug, info, warn};

use super::collate::compare_names;
use super::props;
use super::stats::AmenityReport;
use crate::geojson::{Feature, FeatureCollection, LonLat};
use crate::keys::Slug;

static FIRST_NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new("[0-9]+").expect("static pattern"));

/// A neighborhood as listed in the boundary dataset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Neighborhood {
    pub name: String,
    pub slug: Slug,
}

/// Everything known about one neighborhood.
#[derive(Debug, Clone, Default)]
pub struct NeighborhoodBucket {
    /// Street features referencing the neighborhood.
    pub street_features: Vec<Feature>,
    /// Distinct schools the streets are assigned to, sorted.
    pub school_slugs: Vec<Slug>,
    /// Buildings referencing the neighborhood.
    pub building_count: usize,
}

/// A school from the schools dataset.
#[derive(Debug, Clone, PartialEq)]
pub struct School {
    pub display_name: String,
    /// Absent coordinate means no marker is ever created.
    pub coordinate: Option<LonLat>,
    /// First run of digits in the display name.
    pub numeric_label: Option<String>,
}

/// Counters for features skipped or dropped while indexing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IndexDiagnostics {
    /// Boundary features without a name, with a missing or invalid slug, or duplicated.
    pub boundaries_skipped: usize,
    /// Street features referencing no or an unknown neighborhood.
    pub streets_dropped: usize,
    /// School references on streets that are not valid slugs.
    pub school_refs_rejected: usize,
    /// Building features referencing no or an unknown neighborhood.
    pub buildings_dropped: usize,
    /// School features without a usable slug.
    pub schools_skipped: usize,
}

/// Read-only view over the indexed datasets.
///
/// Rebuilt in full from the raw collections; never mutated incrementally.
#[derive(Debug, Clone, Default)]
pub struct SpatialIndex {
    neighborhoods: Vec<Neighborhood>,
    buckets: HashMap<Slug, NeighborhoodBucket>,
    schools: BTreeMap<Slug, School>,
    boundaries: HashMap<Slug, Feature>,
    report: Option<AmenityReport>,
    diagnostics: IndexDiagnostics,
}

impl SpatialIndex {
    /// Index the raw collections.
    ///
    /// Any collection may be absent; the matching stage then sees no features.
    pub fn build(
        streets: Option<&FeatureCollection>,
        schools: Option<&FeatureCollection>,
        boundaries: Option<&FeatureCollection>,
        buildings: Option<&FeatureCollection>,
    ) -> Self {
        let mut index = SpatialIndex::default();
        index.index_boundaries(features_of(boundaries));
        index.index_streets(features_of(streets));
        index.count_buildings(features_of(buildings));
        index.index_schools(features_of(schools));
        index.report = AmenityReport::compute(features_of(streets), &index.neighborhoods);

        info!(
            neighborhoods = index.neighborhoods.len(),
            schools = index.schools.len(),
            diagnostics = ?index.diagnostics,
            "Spatial index built"
        );
        index
    }

    fn index_boundaries(&mut self, features: &[Feature]) {
        for feature in features {
            let (Some(name), Some(raw_slug)) =
                (feature.str_prop(props::NAME), feature.str_prop(props::SLUG))
            else {
                self.diagnostics.boundaries_skipped += 1;
                continue;
            };
            let slug = match Slug::new(raw_slug) {
                Ok(slug) => slug,
                Err(e) => {
                    warn!(slug = raw_slug, error = %e, "Boundary feature has an unusable slug, skipping");
                    self.diagnostics.boundaries_skipped += 1;
                    continue;
                }
            };
            if self.boundaries.contains_key(&slug) {
                warn!(slug = %slug, "Duplicate neighborhood boundary, keeping the first");
                self.diagnostics.boundaries_skipped += 1;
                continue;
            }
            self.neighborhoods.push(Neighborhood {
                name: name.to_string(),
                slug: slug.clone(),
            });
            self.boundaries.insert(slug.clone(), feature.clone());
            self.buckets.insert(slug, NeighborhoodBucket::default());
        }
        self.neighborhoods
            .sort_by(|a, b| compare_names(&a.name, &b.name));
    }

    fn index_streets(&mut self, features: &[Feature]) {
        let mut school_sets: HashMap<Slug, BTreeSet<Slug>> = HashMap::new();

        for feature in features {
            let Some(bucket_slug) = self.known_neighborhood(feature) else {
                debug!(
                    cartier = ?feature.str_prop(props::NEIGHBORHOOD_REF),
                    "Street references an unknown neighborhood, dropping"
                );
                self.diagnostics.streets_dropped += 1;
                continue;
            };
            if let Some(school_ref) = feature.str_prop(props::SCHOOL_REF) {
                match Slug::new(school_ref) {
                    Ok(school) => {
                        school_sets
                            .entry(bucket_slug.clone())
                            .or_default()
                            .insert(school);
                    }
                    Err(e) => {
                        warn!(arondat = school_ref, error = %e, "Street has an unusable school reference");
                        self.diagnostics.school_refs_rejected += 1;
                    }
                }
            }
            if let Some(bucket) = self.buckets.get_mut(&bucket_slug) {
                bucket.street_features.push(feature.clone());
            }
        }

        for (slug, bucket) in &mut self.buckets {
            if let Some(set) = school_sets.remove(slug) {
                bucket.school_slugs = set.into_iter().collect();
            }
            debug!(
                neighborhood = %slug,
                streets = bucket.street_features.len(),
                schools = bucket.school_slugs.len(),
                "Neighborhood bucketed"
            );
        }
    }

    fn count_buildings(&mut self, features: &[Feature]) {
        for feature in features {
            match self.known_neighborhood(feature) {
                Some(slug) => {
                    if let Some(bucket) = self.buckets.get_mut(&slug) {
                        bucket.building_count += 1;
                    }
                }
                None => self.diagnostics.buildings_dropped += 1,
            }
        }
    }

    fn index_schools(&mut self, features: &[Feature]) {
        for feature in features {
            let Some(raw_slug) = feature.str_prop(props::SLUG) else {
                warn!(properties = ?feature.properties, "School feature is missing a slug, skipping");
                self.diagnostics.schools_skipped += 1;
                continue;
            };
            let slug = match Slug::new(raw_slug) {
                Ok(slug) => slug,
                Err(e) => {
                    warn!(slug = raw_slug, error = %e, "School feature has an unusable slug, skipping");
                    self.diagnostics.schools_skipped += 1;
                    continue;
                }
            };
            let display_name = feature
                .str_prop(props::NAME)
                .or_else(|| feature.str_prop(props::ALT_NAME))
                .unwrap_or_default()
                .to_string();
            let numeric_label = FIRST_NUMBER
                .find(&display_name)
                .map(|m| m.as_str().to_string());

            self.schools.insert(
                slug,
                School {
                    coordinate: feature.point(),
                    numeric_label,
                    display_name,
                },
            );
        }
    }

    fn known_neighborhood(&self, feature: &Feature) -> Option<Slug> {
        let raw = feature.str_prop(props::NEIGHBORHOOD_REF)?;
        let slug = Slug::new(raw).ok()?;
        self.buckets.contains_key(&slug).then_some(slug)
    }

    /// Neighborhoods sorted by display name.
    pub fn neighborhoods(&self) -> &[Neighborhood] {
        &self.neighborhoods
    }

    pub fn bucket(&self, neighborhood: &Slug) -> Option<&NeighborhoodBucket> {
        self.buckets.get(neighborhood)
    }

    /// Schools assigned to streets of a neighborhood.
    pub fn schools_in(&self, neighborhood: &Slug) -> &[Slug] {
        self.buckets
            .get(neighborhood)
            .map(|b| b.school_slugs.as_slice())
            .unwrap_or_default()
    }

    pub fn school(&self, slug: &Slug) -> Option<&School> {
        self.schools.get(slug)
    }

    /// Every indexed school.
    pub fn schools(&self) -> impl Iterator<Item = (&Slug, &School)> {
        self.schools.iter()
    }

    pub fn school_slugs(&self) -> HashSet<Slug> {
        self.schools.keys().cloned().collect()
    }

    pub fn boundary(&self, neighborhood: &Slug) -> Option<&Feature> {
        self.boundaries.get(neighborhood)
    }

    /// Amenity statistics; `None` when there are no street features at all.
    pub fn report(&self) -> Option<&AmenityReport> {
        self.report.as_ref()
    }

    pub fn diagnostics(&self) -> IndexDiagnostics {
        self.diagnostics
    }

    pub fn is_empty(&self) -> bool {
        self.neighborhoods.is_empty()
    }
}

fn features_of(collection: Option<&FeatureCollection>) -> &[Feature] {
    collection.map(|c| c.features.as_slice()).unwrap_or_default()
}
