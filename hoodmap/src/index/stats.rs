//! Street amenity statistics for the display-only report.

use std::collections::BTreeMap;

use super::props;
use super::spatial::Neighborhood;
use crate::geojson::Feature;
use crate::keys::{Slug, StreetCategory};

/// Amenity counts over a set of street features.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AmenityStats {
    street_count: usize,
    with_amenity: BTreeMap<StreetCategory, usize>,
}

impl AmenityStats {
    /// Count amenities over the given streets.
    pub fn from_streets<'a>(streets: impl IntoIterator<Item = &'a Feature>) -> Self {
        let mut stats = AmenityStats::default();
        for street in streets {
            stats.street_count += 1;
            for category in StreetCategory::ALL {
                if street.flag(category.property()) {
                    *stats.with_amenity.entry(category).or_insert(0) += 1;
                }
            }
        }
        stats
    }

    pub fn street_count(&self) -> usize {
        self.street_count
    }

    /// Streets carrying the amenity.
    pub fn count(&self, category: StreetCategory) -> usize {
        self.with_amenity.get(&category).copied().unwrap_or(0)
    }

    /// Share of streets with the amenity, in percent. Zero for no streets.
    pub fn percentage(&self, category: StreetCategory) -> f64 {
        if self.street_count == 0 {
            return 0.0;
        }
        self.count(category) as f64 / self.street_count as f64 * 100.0
    }

    /// Percentage rendered with one decimal, as shown in the report.
    pub fn percentage_label(&self, category: StreetCategory) -> String {
        format!("{:.1}", self.percentage(category))
    }
}

/// Statistics for one neighborhood.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NeighborhoodStats {
    pub name: String,
    pub slug: Slug,
    pub stats: AmenityStats,
}

/// City-wide and per-neighborhood amenity statistics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AmenityReport {
    /// Over every street feature, including those outside known neighborhoods.
    pub city: AmenityStats,
    /// One entry per neighborhood, in display order.
    pub neighborhoods: Vec<NeighborhoodStats>,
}

impl AmenityReport {
    /// Compute the report; `None` when there are no street features.
    pub fn compute(streets: &[Feature], neighborhoods: &[Neighborhood]) -> Option<Self> {
        if streets.is_empty() {
            return None;
        }
        let city = AmenityStats::from_streets(streets);
        let neighborhoods = neighborhoods
            .iter()
            .map(|hood| NeighborhoodStats {
                name: hood.name.clone(),
                slug: hood.slug.clone(),
                stats: AmenityStats::from_streets(
                    streets
                        .iter()
                        .filter(|f| f.str_prop(props::NEIGHBORHOOD_REF) == Some(hood.slug.as_str())),
                ),
            })
            .collect();
        Some(Self { city, neighborhoods })
    }

    pub fn neighborhood(&self, slug: &Slug) -> Option<&AmenityStats> {
        self.neighborhoods
            .iter()
            .find(|n| &n.slug == slug)
            .map(|n| &n.stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn street(cartier: &str, bike: bool, illegal: bool) -> Feature {
        serde_json::from_value(json!({
            "type": "Feature",
            "geometry": null,
            "properties": {"cartier": cartier, "bike_lane": bike, "illgl_park": illegal}
        }))
        .unwrap()
    }

    fn hood(name: &str, slug: &str) -> Neighborhood {
        Neighborhood {
            name: name.to_string(),
            slug: Slug::new(slug).unwrap(),
        }
    }

    #[test]
    fn test_city_and_neighborhood_percentages() {
        let streets = vec![
            street("dtn", true, false),
            street("dtn", false, true),
            street("dtn", false, false),
            street("upt", true, true),
            street("elsewhere", false, false),
        ];
        let hoods = vec![hood("Downtown", "dtn"), hood("Uptown", "upt")];

        let report = AmenityReport::compute(&streets, &hoods).unwrap();

        assert_eq!(report.city.street_count(), 5);
        assert_eq!(report.city.percentage_label(StreetCategory::BikeLane), "40.0");
        assert_eq!(report.city.percentage_label(StreetCategory::IllegalParking), "40.0");

        let dtn = report.neighborhood(&Slug::new("dtn").unwrap()).unwrap();
        assert_eq!(dtn.street_count(), 3);
        assert_eq!(dtn.percentage_label(StreetCategory::BikeLane), "33.3");
        assert_eq!(dtn.percentage_label(StreetCategory::ReservedParking), "0.0");

        let upt = report.neighborhood(&Slug::new("upt").unwrap()).unwrap();
        assert_eq!(upt.percentage_label(StreetCategory::IllegalParking), "100.0");
    }

    #[test]
    fn test_neighborhood_without_streets_reports_zero() {
        let streets = vec![street("dtn", true, false)];
        let hoods = vec![hood("Empty", "empty")];
        let report = AmenityReport::compute(&streets, &hoods).unwrap();
        let empty = report.neighborhood(&Slug::new("empty").unwrap()).unwrap();
        assert_eq!(empty.street_count(), 0);
        assert_eq!(empty.percentage_label(StreetCategory::BikeLane), "0.0");
    }

    #[test]
    fn test_no_streets_no_report() {
        assert!(AmenityReport::compute(&[], &[hood("A", "a")]).is_none());
    }
}
