//! Typed addresses for every node in the overlay hierarchy.
//!
//! [`LayerPath`] names flag keys and engine layers; [`SourcePath`] names
//! engine sources. Both render to a [`LayerKey`]. Layers and sources live in
//! separate engine namespaces, so only layer paths are ever parsed back.
//!
//! ```text
//! nb__<hood>                                  neighborhood
//! nb__<hood>__clipping                        clip-to-boundary flag
//! nb__<hood>__streets                         streets group
//! nb__<hood>__bg                              background street layer
//! nb__<hood>__bike | reserved_parking | illegal_parking
//! nb__<hood>__limit | mask                    boundary outline / outside mask
//! nb__<hood>__schools                         schools group
//! nb__<hood>__schools__<school>               school (marker)
//! nb__<hood>__schools__<school>__assigned     assigned streets layer
//! nb__<hood>__schools__<school>__iso          isochrone group
//! nb__<hood>__schools__<school>__iso__walk_fill (walk_stroke, cycle_fill, cycle_stroke)
//! ```

use std::fmt;

use super::key::{LayerKey, Slug};

const CLIPPING: &str = "clipping";
const STREETS: &str = "streets";
const BACKGROUND: &str = "bg";
const LIMIT: &str = "limit";
const MASK: &str = "mask";
const SCHOOLS: &str = "schools";
const ASSIGNED: &str = "assigned";
const ISO: &str = "iso";
const SOURCE: &str = "src";
const LIMIT_SOURCE: &str = "limit_src";
const MASK_SOURCE: &str = "mask_src";
const ISO_SOURCE: &str = "iso_src";

/// Boolean street amenities, each drawn as its own filtered line layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum StreetCategory {
    BikeLane,
    ReservedParking,
    IllegalParking,
}

impl StreetCategory {
    /// All categories in panel order.
    pub const ALL: [StreetCategory; 3] = [
        StreetCategory::BikeLane,
        StreetCategory::ReservedParking,
        StreetCategory::IllegalParking,
    ];

    /// Key segment for the category.
    pub fn segment(self) -> &'static str {
        match self {
            StreetCategory::BikeLane => "bike",
            StreetCategory::ReservedParking => "reserved_parking",
            StreetCategory::IllegalParking => "illegal_parking",
        }
    }

    /// Street feature property holding the amenity flag.
    pub fn property(self) -> &'static str {
        match self {
            StreetCategory::BikeLane => "bike_lane",
            StreetCategory::ReservedParking => "rsrvd_park",
            StreetCategory::IllegalParking => "illgl_park",
        }
    }

    fn from_segment(segment: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.segment() == segment)
    }
}

/// Travel mode of an isochrone set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TravelMode {
    Walk,
    Cycle,
}

impl TravelMode {
    /// Modes in installation order.
    pub const ALL: [TravelMode; 2] = [TravelMode::Cycle, TravelMode::Walk];

    pub fn segment(self) -> &'static str {
        match self {
            TravelMode::Walk => "walk",
            TravelMode::Cycle => "cycle",
        }
    }

    /// Value of the `tip` property in the isochrone dataset.
    pub fn tag(self) -> &'static str {
        match self {
            TravelMode::Walk => "walking",
            TravelMode::Cycle => "cycling",
        }
    }

    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "walking" => Some(TravelMode::Walk),
            "cycling" => Some(TravelMode::Cycle),
            _ => None,
        }
    }
}

/// Fill or stroke half of an isochrone mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum IsoPart {
    Fill,
    Stroke,
}

impl IsoPart {
    fn suffix(self) -> &'static str {
        match self {
            IsoPart::Fill => "fill",
            IsoPart::Stroke => "stroke",
        }
    }
}

/// Paint class used to order managed layers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LayerClass {
    Isochrones,
    Streets,
    Masks,
    Limits,
}

/// Address of a flag key or an engine layer.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum LayerPath {
    Neighborhood(Slug),
    Clipping(Slug),
    Streets(Slug),
    Background(Slug),
    Category(Slug, StreetCategory),
    Limit(Slug),
    Mask(Slug),
    Schools(Slug),
    School(Slug, Slug),
    Assigned(Slug, Slug),
    Isochrones(Slug, Slug),
    Isochrone(Slug, Slug, TravelMode, IsoPart),
}

impl LayerPath {
    /// Neighborhood slug at the root of this path.
    pub fn neighborhood(&self) -> &Slug {
        match self {
            LayerPath::Neighborhood(h)
            | LayerPath::Clipping(h)
            | LayerPath::Streets(h)
            | LayerPath::Background(h)
            | LayerPath::Category(h, _)
            | LayerPath::Limit(h)
            | LayerPath::Mask(h)
            | LayerPath::Schools(h)
            | LayerPath::School(h, _)
            | LayerPath::Assigned(h, _)
            | LayerPath::Isochrones(h, _)
            | LayerPath::Isochrone(h, _, _, _) => h,
        }
    }

    /// School slug, for paths under a school.
    pub fn school(&self) -> Option<&Slug> {
        match self {
            LayerPath::School(_, s)
            | LayerPath::Assigned(_, s)
            | LayerPath::Isochrones(_, s)
            | LayerPath::Isochrone(_, s, _, _) => Some(s),
            _ => None,
        }
    }

    /// Render the path as a key.
    pub fn key(&self) -> LayerKey {
        let mode_part;
        let segments: Vec<&str> = match self {
            LayerPath::Neighborhood(h) => vec![h.as_str()],
            LayerPath::Clipping(h) => vec![h.as_str(), CLIPPING],
            LayerPath::Streets(h) => vec![h.as_str(), STREETS],
            LayerPath::Background(h) => vec![h.as_str(), BACKGROUND],
            LayerPath::Category(h, c) => vec![h.as_str(), c.segment()],
            LayerPath::Limit(h) => vec![h.as_str(), LIMIT],
            LayerPath::Mask(h) => vec![h.as_str(), MASK],
            LayerPath::Schools(h) => vec![h.as_str(), SCHOOLS],
            LayerPath::School(h, s) => vec![h.as_str(), SCHOOLS, s.as_str()],
            LayerPath::Assigned(h, s) => vec![h.as_str(), SCHOOLS, s.as_str(), ASSIGNED],
            LayerPath::Isochrones(h, s) => vec![h.as_str(), SCHOOLS, s.as_str(), ISO],
            LayerPath::Isochrone(h, s, mode, part) => {
                mode_part = format!("{}_{}", mode.segment(), part.suffix());
                vec![h.as_str(), SCHOOLS, s.as_str(), ISO, mode_part.as_str()]
            }
        };
        LayerKey::from_valid(segments)
    }

    /// Parse a key back into a path; `None` for keys outside the hierarchy.
    pub fn parse(key: &LayerKey) -> Option<LayerPath> {
        let segments: Vec<&str> = key.segments().collect();
        let hood = Slug::new(*segments.first()?).ok()?;
        match segments.as_slice() {
            [_] => Some(LayerPath::Neighborhood(hood)),
            [_, CLIPPING] => Some(LayerPath::Clipping(hood)),
            [_, STREETS] => Some(LayerPath::Streets(hood)),
            [_, BACKGROUND] => Some(LayerPath::Background(hood)),
            [_, LIMIT] => Some(LayerPath::Limit(hood)),
            [_, MASK] => Some(LayerPath::Mask(hood)),
            [_, SCHOOLS] => Some(LayerPath::Schools(hood)),
            [_, other] => StreetCategory::from_segment(other).map(|c| LayerPath::Category(hood, c)),
            [_, SCHOOLS, school, rest @ ..] => {
                let school = Slug::new(*school).ok()?;
                match rest {
                    [] => Some(LayerPath::School(hood, school)),
                    [ASSIGNED] => Some(LayerPath::Assigned(hood, school)),
                    [ISO] => Some(LayerPath::Isochrones(hood, school)),
                    [ISO, sub] => {
                        let (mode, part) = parse_iso_sub(sub)?;
                        Some(LayerPath::Isochrone(hood, school, mode, part))
                    }
                    _ => None,
                }
            }
            _ => None,
        }
    }

    /// Flags whose conjunction decides this node's effective visibility.
    ///
    /// Layers follow their containment chain; the background layer does not
    /// consult its own flag, and limit/mask hang directly off the neighborhood.
    /// Group nodes use the chain from the neighborhood down to themselves.
    pub fn required_flags(&self) -> Vec<LayerKey> {
        let h = self.neighborhood();
        let hood = LayerPath::Neighborhood(h.clone()).key();
        match self {
            LayerPath::Neighborhood(_) | LayerPath::Limit(_) => vec![hood],
            LayerPath::Clipping(_) | LayerPath::Mask(_) => {
                vec![hood, LayerPath::Clipping(h.clone()).key()]
            }
            LayerPath::Streets(_) | LayerPath::Background(_) => {
                vec![hood, LayerPath::Streets(h.clone()).key()]
            }
            LayerPath::Category(_, _) => {
                vec![hood, LayerPath::Streets(h.clone()).key(), self.key()]
            }
            LayerPath::Schools(_) => vec![hood, LayerPath::Schools(h.clone()).key()],
            LayerPath::School(_, s) => school_chain(h, s),
            LayerPath::Assigned(_, s) | LayerPath::Isochrones(_, s) => {
                let mut keys = school_chain(h, s);
                keys.push(self.key());
                keys
            }
            LayerPath::Isochrone(_, s, _, _) => {
                let mut keys = school_chain(h, s);
                keys.push(LayerPath::Isochrones(h.clone(), s.clone()).key());
                keys.push(self.key());
                keys
            }
        }
    }

    /// Paint class of an engine layer.
    pub fn class(&self) -> LayerClass {
        match self {
            LayerPath::Isochrone(..) => LayerClass::Isochrones,
            LayerPath::Mask(_) => LayerClass::Masks,
            LayerPath::Limit(_) => LayerClass::Limits,
            _ => LayerClass::Streets,
        }
    }
}

impl fmt::Display for LayerPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.key())
    }
}

fn school_chain(h: &Slug, s: &Slug) -> Vec<LayerKey> {
    vec![
        LayerPath::Neighborhood(h.clone()).key(),
        LayerPath::Schools(h.clone()).key(),
        LayerPath::School(h.clone(), s.clone()).key(),
    ]
}

fn parse_iso_sub(sub: &str) -> Option<(TravelMode, IsoPart)> {
    let (mode, part) = sub.split_once('_')?;
    let mode = match mode {
        "walk" => TravelMode::Walk,
        "cycle" => TravelMode::Cycle,
        _ => return None,
    };
    let part = match part {
        "fill" => IsoPart::Fill,
        "stroke" => IsoPart::Stroke,
        _ => return None,
    };
    Some((mode, part))
}

/// Address of an engine source.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SourcePath {
    /// All street features of a neighborhood.
    Neighborhood(Slug),
    /// Boundary feature of a neighborhood.
    Limit(Slug),
    /// World polygon with the neighborhood cut out.
    Mask(Slug),
    /// Isochrone features of one school and mode, shared by every neighborhood.
    Isochrone(Slug, TravelMode),
}

impl SourcePath {
    pub fn key(&self) -> LayerKey {
        match self {
            SourcePath::Neighborhood(h) => LayerKey::from_valid([SOURCE, h.as_str()]),
            SourcePath::Limit(h) => LayerKey::from_valid([h.as_str(), LIMIT_SOURCE]),
            SourcePath::Mask(h) => LayerKey::from_valid([h.as_str(), MASK_SOURCE]),
            SourcePath::Isochrone(s, mode) => {
                LayerKey::from_valid([ISO_SOURCE, s.as_str(), mode.segment()])
            }
        }
    }
}
