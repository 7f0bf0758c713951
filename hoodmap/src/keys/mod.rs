//! Key space for managed layers, sources and visibility flags.
//!
//! Every identifier this crate hands to the map engine is a [`LayerKey`]: the
//! `nb` namespace followed by `__`-separated segments. Keys can be split back
//! into their segments, and [`LayerKey::is_managed`] tells our identifiers
//! apart from whatever the base map style brings along.
//!
//! [`LayerPath`] and [`SourcePath`] are the typed view over the same space.
//! Code outside this module builds keys through them rather than by string
//! concatenation.

mod key;
mod path;

pub use key::{validate_segment, KeyError, LayerKey, Slug, NAMESPACE};
pub use path::{IsoPart, LayerClass, LayerPath, SourcePath, StreetCategory, TravelMode};
