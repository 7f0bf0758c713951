//! Fetching and bucketing isochrone polygons per school.

use std::collections::{HashMap, HashSet};

use tracing::{debug, info, warn};

use super::band::Band;
use crate::geojson::{Feature, FeatureCollection};
use crate::index::props;
use crate::keys::{Slug, TravelMode};
use crate::source::{Dataset, DatasetSource};

/// Isochrone collections of one school.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IsochroneBucket {
    pub walk: Option<FeatureCollection>,
    pub cycle: Option<FeatureCollection>,
}

impl IsochroneBucket {
    pub fn get(&self, mode: TravelMode) -> Option<&FeatureCollection> {
        match mode {
            TravelMode::Walk => self.walk.as_ref(),
            TravelMode::Cycle => self.cycle.as_ref(),
        }
    }

    /// True when neither mode has any polygon.
    pub fn is_empty(&self) -> bool {
        self.walk.is_none() && self.cycle.is_none()
    }

    fn push(&mut self, mode: TravelMode, feature: Feature) {
        let slot = match mode {
            TravelMode::Walk => &mut self.walk,
            TravelMode::Cycle => &mut self.cycle,
        };
        slot.get_or_insert_with(FeatureCollection::default)
            .features
            .push(feature);
    }
}

/// Whether the isochrone dataset could be fetched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Availability {
    Available,
    Unavailable { reason: String },
}

/// Isochrone buckets keyed by school slug.
///
/// Every known school has a bucket, possibly empty.
#[derive(Debug, Clone, PartialEq)]
pub struct IsochroneIndex {
    buckets: HashMap<Slug, IsochroneBucket>,
    availability: Availability,
    skipped: usize,
}

impl IsochroneIndex {
    /// Index with an empty bucket for every school, marked unavailable.
    pub fn unavailable(schools: &HashSet<Slug>, reason: impl Into<String>) -> Self {
        Self {
            buckets: seed(schools),
            availability: Availability::Unavailable {
                reason: reason.into(),
            },
            skipped: 0,
        }
    }

    pub fn bucket(&self, school: &Slug) -> Option<&IsochroneBucket> {
        self.buckets.get(school)
    }

    /// Collection for one school and mode; `None` when absent.
    pub fn collection(&self, school: &Slug, mode: TravelMode) -> Option<&FeatureCollection> {
        self.buckets.get(school)?.get(mode)
    }

    pub fn availability(&self) -> &Availability {
        &self.availability
    }

    /// Features skipped for missing or unusable properties.
    pub fn skipped(&self) -> usize {
        self.skipped
    }
}

impl Default for IsochroneIndex {
    fn default() -> Self {
        Self {
            buckets: HashMap::new(),
            availability: Availability::Available,
            skipped: 0,
        }
    }
}

fn seed(schools: &HashSet<Slug>) -> HashMap<Slug, IsochroneBucket> {
    schools
        .iter()
        .map(|s| (s.clone(), IsochroneBucket::default()))
        .collect()
}

/// Bucket a fetched isochrone collection by school and mode.
///
/// Features need a school reference, a known mode tag and a numeric cost;
/// anything else is skipped. The cost band is written to the `band` property.
/// References to schools outside `schools` are ignored.
pub fn bucket_isochrones(collection: FeatureCollection, schools: &HashSet<Slug>) -> IsochroneIndex {
    let mut index = IsochroneIndex {
        buckets: seed(schools),
        ..IsochroneIndex::default()
    };

    for mut feature in collection.features {
        let (Some(school_ref), Some(tag), Some(cost)) = (
            feature.str_prop(props::ISO_SCHOOL_REF),
            feature.str_prop(props::ISO_MODE),
            feature.number(props::ISO_COST),
        ) else {
            index.skipped += 1;
            continue;
        };
        let Some(mode) = TravelMode::from_tag(tag) else {
            debug!(tip = tag, "Isochrone with unknown travel mode, skipping");
            index.skipped += 1;
            continue;
        };
        let Some(bucket) = Slug::new(school_ref)
            .ok()
            .and_then(|slug| index.buckets.get_mut(&slug))
        else {
            debug!(den_scoala = school_ref, "Isochrone references an unknown school");
            continue;
        };

        feature.set_prop(props::ISO_BAND, Band::from_cost(cost).label());
        bucket.push(mode, feature);
    }

    info!(
        schools = index.buckets.values().filter(|b| !b.is_empty()).count(),
        skipped = index.skipped,
        "Isochrones bucketed"
    );
    index
}

/// Fetch and bucket the isochrone dataset.
///
/// Never fails: a transport or parse failure yields an index where every
/// bucket is empty and [`IsochroneIndex::availability`] carries the reason.
pub async fn load_isochrones<S: DatasetSource>(
    source: &S,
    schools: &HashSet<Slug>,
) -> IsochroneIndex {
    match source.fetch(Dataset::SchoolIsochrones).await {
        Ok(collection) => bucket_isochrones(collection, schools),
        Err(e) => {
            warn!(error = %e, "Isochrones unavailable");
            IsochroneIndex::unavailable(schools, e.to_string())
        }
    }
}
