//! Visibility engine.
//!
//! Three pieces of state must agree at all times: the user's flags, the
//! engine's layer visibility, and the school markers. The engine side is
//! untrustworthy: any style change drops every managed layer and source.
//!
//! ```text
//!            set_visible(path, on)
//!                    │
//!                    ▼
//!   FlagTree ──► required_flags(layer) ──► AND ──► set_layer_visibility
//!                    │
//!                    └──► MarkerSet::sync_all
//!
//!   Load / StyleData (coalesced) / Idle with sentinel missing
//!                    │
//!                    ▼
//!   reinstall: base layers ─► checked isochrones ─► apply ─► markers
//!                                                   └─► reorder on next idle
//! ```
//!
//! Flags never change as a side effect of installation; a reinstall
//! reproduces the exact effective visibility that existed before the reset.

mod controller;
mod flags;
mod install;
pub mod style;

pub use controller::{
    ApplyReport, InstallState, Installation, OverlayController, ReinstallReport,
};
pub use flags::{ExpansionState, FlagTree};
pub use install::{install_base_layers, install_isochrone_layers, InstallReport};
