//! Layer order resolver.
//!
//! Managed layers are painted in a fixed class order, all below the base
//! map's labels:
//!
//! ```text
//! top     base-map labels (first non-managed symbol layer)
//!         limits
//!         masks
//!         streets (background, categories, assigned)
//! bottom  isochrones
//! ```
//!
//! Each managed layer is moved, class by class, directly below the label
//! anchor. With no anchor, layers are moved to the top in the same order.

use tracing::{debug, warn};

use crate::engine::{LayerKind, MapEngine};
use crate::keys::{LayerClass, LayerKey, LayerPath};

/// Result of one ordering pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrderReport {
    pub moved: usize,
    pub skipped: usize,
    pub anchor: Option<String>,
}

fn class_of(id: &str) -> Option<LayerClass> {
    let key = LayerKey::parse(id).ok()?;
    Some(
        LayerPath::parse(&key)
            .map(|p| p.class())
            .unwrap_or(LayerClass::Streets),
    )
}

/// Reorder every managed layer currently in the style.
pub fn resolve<E: MapEngine>(engine: &mut E) -> OrderReport {
    let layers = engine.style_layers();
    let anchor = layers
        .iter()
        .find(|l| l.kind == LayerKind::Symbol && !LayerKey::is_managed(&l.id))
        .map(|l| l.id.clone());

    let mut managed: Vec<(LayerClass, String)> = layers
        .into_iter()
        .filter_map(|l| class_of(&l.id).map(|class| (class, l.id)))
        .collect();
    managed.sort_by_key(|(class, _)| *class);

    let mut report = OrderReport {
        anchor: anchor.clone(),
        ..OrderReport::default()
    };
    for (_, id) in managed {
        if !engine.has_layer(&id) {
            report.skipped += 1;
            continue;
        }
        match engine.move_layer(&id, anchor.as_deref()) {
            Ok(()) => report.moved += 1,
            Err(e) => {
                warn!(layer = %id, error = %e, "Could not move layer");
                report.skipped += 1;
            }
        }
    }

    debug!(moved = report.moved, anchor = ?report.anchor, "Layer order resolved");
    report
}
