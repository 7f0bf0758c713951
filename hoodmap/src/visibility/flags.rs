//! User-controlled visibility flags and panel expansion state.

use std::collections::{HashMap, HashSet};

use crate::keys::LayerKey;

/// Boolean flag per key. Unset keys read as `false`.
///
/// Flags are independent: turning a parent off leaves its children's stored
/// values alone, so turning the parent back on restores them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FlagTree {
    flags: HashMap<LayerKey, bool>,
}

impl FlagTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stored value, failing closed.
    pub fn get(&self, key: &LayerKey) -> bool {
        self.flags.get(key).copied().unwrap_or(false)
    }

    pub fn is_set(&self, key: &LayerKey) -> bool {
        self.flags.contains_key(key)
    }

    pub fn set(&mut self, key: LayerKey, on: bool) {
        self.flags.insert(key, on);
    }

    /// Store `on` unless the key already has a value. Returns whether it was stored.
    pub fn init_default(&mut self, key: LayerKey, on: bool) -> bool {
        if self.flags.contains_key(&key) {
            return false;
        }
        self.flags.insert(key, on);
        true
    }

    /// Conjunction over `keys`.
    pub fn all(&self, keys: &[LayerKey]) -> bool {
        keys.iter().all(|k| self.get(k))
    }

    pub fn len(&self) -> usize {
        self.flags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.flags.is_empty()
    }
}

/// Which panel groups are expanded. Collapsed unless set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExpansionState {
    expanded: HashSet<LayerKey>,
}

impl ExpansionState {
    pub fn is_expanded(&self, key: &LayerKey) -> bool {
        self.expanded.contains(key)
    }

    pub fn set(&mut self, key: LayerKey, expanded: bool) {
        if expanded {
            self.expanded.insert(key);
        } else {
            self.expanded.remove(&key);
        }
    }

    /// Flip and return the new state.
    pub fn toggle(&mut self, key: LayerKey) -> bool {
        let now = !self.is_expanded(&key);
        self.set(key, now);
        now
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(parts: &[&str]) -> LayerKey {
        LayerKey::build(parts).unwrap()
    }

    #[test]
    fn test_unset_reads_false() {
        let flags = FlagTree::new();
        assert!(!flags.get(&key(&["a"])));
        assert!(!flags.all(&[key(&["a"])]));
        assert!(flags.all(&[]));
    }

    #[test]
    fn test_init_default_never_overwrites() {
        let mut flags = FlagTree::new();
        assert!(flags.init_default(key(&["a"]), true));
        flags.set(key(&["a"]), false);
        assert!(!flags.init_default(key(&["a"]), true));
        assert!(!flags.get(&key(&["a"])));
    }

    #[test]
    fn test_conjunction() {
        let mut flags = FlagTree::new();
        flags.set(key(&["a"]), true);
        flags.set(key(&["a", "streets"]), true);
        assert!(flags.all(&[key(&["a"]), key(&["a", "streets"])]));
        flags.set(key(&["a"]), false);
        assert!(!flags.all(&[key(&["a"]), key(&["a", "streets"])]));
        assert!(flags.get(&key(&["a", "streets"])));
    }

    #[test]
    fn test_expansion_toggle() {
        let mut expansion = ExpansionState::default();
        assert!(!expansion.is_expanded(&key(&["a"])));
        assert!(expansion.toggle(key(&["a"])));
        assert!(expansion.is_expanded(&key(&["a"])));
        assert!(!expansion.toggle(key(&["a"])));
    }
}
