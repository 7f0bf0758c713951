//! Layer panel model.
//!
//! The toggle tree as plain data: one row per checkbox, in display order,
//! with the flag it shows and whether its parent groups are expanded. Widget
//! code renders rows and feeds clicks back through
//! [`OverlayController::set_visible`](crate::visibility::OverlayController::set_visible).
//!
//! ```text
//! Cartierul Downtown            [clip]
//!   Străzi
//!     Pistă de biciclete
//!     Parcări amenajate pe trotuar
//!     Parcări ilegale pe trotuar
//!   Școli                        (only with two or more schools)
//!     <school>
//!       Străzi arondate
//!       Izocrone
//!         Pietonal
//!         Ciclopietonal
//! ```

use crate::index::SpatialIndex;
use crate::isochrone::Band;
use crate::keys::{IsoPart, LayerKey, LayerPath, Slug, StreetCategory, TravelMode};
use crate::source::PRELOAD_FAILURE_MESSAGE;
use crate::visibility::style;
use crate::visibility::{ExpansionState, FlagTree};

/// One checkbox row.
#[derive(Debug, Clone, PartialEq)]
pub struct PanelRow {
    pub path: LayerPath,
    pub label: String,
    pub depth: usize,
    pub checked: bool,
    /// Group rows have a caret and children.
    pub group: bool,
    pub expanded: bool,
    /// Every ancestor group is expanded.
    pub shown: bool,
    pub chip: Option<&'static str>,
    /// State of the clip-to-boundary button, on neighborhood rows with a boundary.
    pub clip: Option<bool>,
}

impl PanelRow {
    pub fn key(&self) -> LayerKey {
        self.path.key()
    }
}

/// The whole panel.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Panel {
    pub rows: Vec<PanelRow>,
    /// Shown instead of rows when loading failed.
    pub message: Option<&'static str>,
}

impl Panel {
    /// Panel of a session whose datasets could not be loaded.
    pub fn failed() -> Self {
        Self {
            rows: Vec::new(),
            message: Some(PRELOAD_FAILURE_MESSAGE),
        }
    }

    pub fn row(&self, path: &LayerPath) -> Option<&PanelRow> {
        self.rows.iter().find(|r| &r.path == path)
    }
}

pub fn category_label(category: StreetCategory) -> &'static str {
    match category {
        StreetCategory::BikeLane => "Pistă de biciclete",
        StreetCategory::ReservedParking => "Parcări amenajate pe trotuar",
        StreetCategory::IllegalParking => "Parcări ilegale pe trotuar",
    }
}

pub fn mode_label(mode: TravelMode) -> &'static str {
    match mode {
        TravelMode::Walk => "Pietonal",
        TravelMode::Cycle => "Ciclopietonal",
    }
}

/// Human label from a slug: underscores become spaces, words are capitalized.
pub fn pretty(slug: &str) -> String {
    let mut out = String::with_capacity(slug.len());
    let mut at_word_start = true;
    for c in slug.chars() {
        let c = if c == '_' { ' ' } else { c };
        if at_word_start && c.is_alphanumeric() {
            out.extend(c.to_uppercase());
        } else {
            out.push(c);
        }
        at_word_start = !c.is_alphanumeric();
    }
    out
}

/// Store the panel's default flag for every node that has none yet.
pub fn init_default_flags(index: &SpatialIndex, flags: &mut FlagTree) {
    for hood in index.neighborhoods() {
        let h = &hood.slug;
        flags.init_default(LayerPath::Neighborhood(h.clone()).key(), true);
        if index.boundary(h).is_some() {
            flags.init_default(LayerPath::Clipping(h.clone()).key(), false);
        }
        flags.init_default(LayerPath::Streets(h.clone()).key(), true);
        flags.init_default(LayerPath::Background(h.clone()).key(), true);
        for category in StreetCategory::ALL {
            flags.init_default(LayerPath::Category(h.clone(), category).key(), true);
        }

        let schools = index.schools_in(h);
        if schools.is_empty() {
            continue;
        }
        flags.init_default(LayerPath::Schools(h.clone()).key(), true);
        for s in schools {
            flags.init_default(LayerPath::School(h.clone(), s.clone()).key(), true);
            flags.init_default(LayerPath::Assigned(h.clone(), s.clone()).key(), false);
            flags.init_default(LayerPath::Isochrones(h.clone(), s.clone()).key(), true);
            for mode in TravelMode::ALL {
                let on = mode == TravelMode::Cycle;
                for part in [IsoPart::Fill, IsoPart::Stroke] {
                    flags.init_default(
                        LayerPath::Isochrone(h.clone(), s.clone(), mode, part).key(),
                        on,
                    );
                }
            }
        }
    }
}

struct Builder<'a> {
    flags: &'a FlagTree,
    expansion: &'a ExpansionState,
    rows: Vec<PanelRow>,
}

impl Builder<'_> {
    fn push(
        &mut self,
        path: LayerPath,
        label: String,
        depth: usize,
        group: bool,
        chip: Option<&'static str>,
        shown: bool,
    ) {
        let key = path.key();
        self.rows.push(PanelRow {
            checked: self.flags.get(&key),
            expanded: group && self.expansion.is_expanded(&key),
            path,
            label,
            depth,
            group,
            shown,
            chip,
            clip: None,
        });
    }

    fn expanded(&self, path: &LayerPath) -> bool {
        self.expansion.is_expanded(&path.key())
    }

    fn school(&mut self, index: &SpatialIndex, h: &Slug, s: &Slug, depth: usize, shown: bool) {
        let label = index
            .school(s)
            .map(|school| school.display_name.clone())
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| pretty(s.as_str()));
        let school_path = LayerPath::School(h.clone(), s.clone());
        let inner = shown && self.expanded(&school_path);
        self.push(school_path, label, depth, true, None, shown);

        self.push(
            LayerPath::Assigned(h.clone(), s.clone()),
            "Străzi arondate".to_string(),
            depth + 1,
            false,
            Some(style::ASSIGNED_COLOR),
            inner,
        );

        let iso_path = LayerPath::Isochrones(h.clone(), s.clone());
        let iso_inner = inner && self.expanded(&iso_path);
        self.push(iso_path, "Izocrone".to_string(), depth + 1, true, None, inner);
        for mode in [TravelMode::Walk, TravelMode::Cycle] {
            self.push(
                LayerPath::Isochrone(h.clone(), s.clone(), mode, IsoPart::Fill),
                mode_label(mode).to_string(),
                depth + 2,
                false,
                Some(style::band_color(mode, Band::UpTo15)),
                iso_inner,
            );
        }
    }
}

/// Build the panel from the index and current state.
pub fn build(index: &SpatialIndex, flags: &FlagTree, expansion: &ExpansionState) -> Panel {
    let mut b = Builder {
        flags,
        expansion,
        rows: Vec::new(),
    };

    for hood in index.neighborhoods() {
        let h = &hood.slug;
        let has_boundary = index.boundary(h).is_some();
        let hood_path = LayerPath::Neighborhood(h.clone());
        let hood_open = b.expanded(&hood_path);
        b.push(
            hood_path,
            format!("Cartierul {}", hood.name),
            0,
            true,
            has_boundary.then_some(style::LIMIT_COLOR),
            true,
        );
        if has_boundary {
            let clipping = flags.get(&LayerPath::Clipping(h.clone()).key());
            if let Some(row) = b.rows.last_mut() {
                row.clip = Some(clipping);
            }
        }

        let streets = LayerPath::Streets(h.clone());
        let streets_open = hood_open && b.expanded(&streets);
        b.push(streets, "Străzi".to_string(), 1, true, Some(style::BACKGROUND_COLOR), hood_open);
        for category in StreetCategory::ALL {
            b.push(
                LayerPath::Category(h.clone(), category),
                category_label(category).to_string(),
                2,
                false,
                Some(style::category_color(category)),
                streets_open,
            );
        }

        match index.schools_in(h) {
            [] => {}
            [only] => b.school(index, h, only, 1, hood_open),
            many => {
                let group = LayerPath::Schools(h.clone());
                let group_open = hood_open && b.expanded(&group);
                b.push(group, "Școli".to_string(), 1, true, None, hood_open);
                for s in many {
                    b.school(index, h, s, 2, group_open);
                }
            }
        }
    }

    Panel {
        rows: b.rows,
        message: None,
    }
}
