//! Travel-time bands.

use std::fmt;

/// Ordinal travel-time class of an isochrone polygon.
///
/// Costs are seconds; each band upper bound is inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Band {
    UpTo5,
    UpTo10,
    UpTo15,
    Over15,
}

impl Band {
    pub const ALL: [Band; 4] = [Band::UpTo5, Band::UpTo10, Band::UpTo15, Band::Over15];

    pub fn from_cost(cost: f64) -> Band {
        if cost <= 300.0 {
            Band::UpTo5
        } else if cost <= 600.0 {
            Band::UpTo10
        } else if cost <= 900.0 {
            Band::UpTo15
        } else {
            Band::Over15
        }
    }

    /// Label stored in the feature's `band` property.
    pub fn label(self) -> &'static str {
        match self {
            Band::UpTo5 => "0-5",
            Band::UpTo10 => "5-10",
            Band::UpTo15 => "10-15",
            Band::Over15 => "15+",
        }
    }

    pub fn from_label(label: &str) -> Option<Band> {
        Self::ALL.into_iter().find(|b| b.label() == label)
    }

    /// Fill sort key: nearer bands draw on top.
    pub fn sort_key(self) -> u8 {
        match self {
            Band::UpTo5 => 3,
            Band::UpTo10 => 2,
            Band::UpTo15 => 1,
            Band::Over15 => 0,
        }
    }
}

impl fmt::Display for Band {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cost_ladder() {
        let labels: Vec<&str> = [250.0, 450.0, 750.0, 1000.0]
            .into_iter()
            .map(|c| Band::from_cost(c).label())
            .collect();
        assert_eq!(labels, vec!["0-5", "5-10", "10-15", "15+"]);
    }

    #[test]
    fn test_ties_fall_into_lower_band() {
        assert_eq!(Band::from_cost(300.0).label(), "0-5");
        assert_eq!(Band::from_cost(301.0).label(), "5-10");
        assert_eq!(Band::from_cost(600.0), Band::UpTo10);
        assert_eq!(Band::from_cost(900.0), Band::UpTo15);
        assert_eq!(Band::from_cost(0.0), Band::UpTo5);
    }

    #[test]
    fn test_label_round_trip() {
        for band in Band::ALL {
            assert_eq!(Band::from_label(band.label()), Some(band));
        }
        assert_eq!(Band::from_label("20+"), None);
    }
}
