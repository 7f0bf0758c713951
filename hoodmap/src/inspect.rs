//! Summary of a clicked street.

use std::fmt;

use crate::geojson::Feature;
use crate::index::{props, SpatialIndex};
use crate::keys::{Slug, StreetCategory};

/// Title when the street has no name.
pub const DEFAULT_STREET_TITLE: &str = "Stradă";

/// What the popup shows for one street feature.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreetSummary {
    pub title: String,
    pub bike_lane: bool,
    pub illegal_parking: bool,
    pub reserved_parking: bool,
    /// Display name of the assigned school, when the school is known.
    pub assigned_school: Option<String>,
}

impl StreetSummary {
    pub fn from_feature(feature: &Feature, index: &SpatialIndex) -> Self {
        let title = feature
            .str_prop(props::ALT_NAME)
            .or_else(|| feature.str_prop(props::NAME))
            .unwrap_or(DEFAULT_STREET_TITLE)
            .to_string();
        let assigned_school = feature
            .str_prop(props::SCHOOL_REF)
            .and_then(|raw| Slug::new(raw).ok())
            .and_then(|slug| index.school(&slug))
            .map(|school| school.display_name.clone());

        Self {
            title,
            bike_lane: feature.flag(StreetCategory::BikeLane.property()),
            illegal_parking: feature.flag(StreetCategory::IllegalParking.property()),
            reserved_parking: feature.flag(StreetCategory::ReservedParking.property()),
            assigned_school,
        }
    }

    /// Detail lines in popup order.
    pub fn lines(&self) -> Vec<String> {
        let mut lines = vec![format!(
            "Pistă de biciclete: {}",
            if self.bike_lane { "Da" } else { "Nu" }
        )];
        if self.illegal_parking {
            lines.push("Parcări ilegale pe trotuar: Da".to_string());
        }
        if self.reserved_parking {
            lines.push("Parcări amenajate pe trotuar: Da".to_string());
        }
        if let Some(school) = &self.assigned_school {
            lines.push(format!("Arondată la: {}", school));
        }
        lines
    }
}

impl fmt::Display for StreetSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.title)?;
        for line in self.lines() {
            writeln!(f, "  {}", line)?;
        }
        Ok(())
    }
}
