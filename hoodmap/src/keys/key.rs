//! Namespaced layer keys and validated path segments.

use std::fmt;

use thiserror::Error;

/// Prefix shared by every identifier this crate puts into the map engine.
pub const NAMESPACE: &str = "nb";

/// Separator between path segments.
const SEPARATOR: &str = "__";

/// Errors raised when building a key from segments.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum KeyError {
    /// No segments were supplied.
    #[error("a layer key needs at least one segment")]
    NoSegments,

    /// A segment was the empty string.
    #[error("empty key segment")]
    EmptySegment,

    /// A segment contains the separator sequence.
    #[error("key segment '{0}' contains the separator '__'")]
    ContainsSeparator(String),

    /// A segment starts or ends with an underscore, which would make splitting ambiguous.
    #[error("key segment '{0}' starts or ends with '_'")]
    UnderscoreEdge(String),

    /// The identifier was not produced by [`LayerKey::build`].
    #[error("'{0}' is not a managed layer key")]
    NotManaged(String),
}

/// Check that a segment can be joined and split back without loss.
///
/// A segment must be non-empty, must not contain `__`, and must not start or
/// end with `_`. Within a valid key every run of underscores is then either a
/// single underscore inside a segment or exactly the separator.
pub fn validate_segment(segment: &str) -> Result<(), KeyError> {
    if segment.is_empty() {
        return Err(KeyError::EmptySegment);
    }
    if segment.contains(SEPARATOR) {
        return Err(KeyError::ContainsSeparator(segment.to_string()));
    }
    if segment.starts_with('_') || segment.ends_with('_') {
        return Err(KeyError::UnderscoreEdge(segment.to_string()));
    }
    Ok(())
}

/// A slug taken from external data, validated as a key segment.
///
/// Neighborhood and school slugs arrive from GeoJSON properties. They are
/// checked once at ingestion so every key built from them is well formed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Slug(String);

impl Slug {
    /// Validate and wrap a slug.
    pub fn new(value: impl Into<String>) -> Result<Self, KeyError> {
        let value = value.into();
        validate_segment(&value)?;
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Slug {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Slug {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Identifier of one addressable node in the layer hierarchy.
///
/// Doubles as a visibility-flag key and as the engine-side layer or source id.
/// Two keys are equal iff their segment sequences are equal.
///
/// # Example
///
/// ```
/// use hoodmap::keys::LayerKey;
///
/// let key = LayerKey::build(&["dtn", "schools", "scoala_1"]).unwrap();
/// assert_eq!(key.as_str(), "nb__dtn__schools__scoala_1");
/// assert_eq!(LayerKey::split(key.as_str()), vec!["dtn", "schools", "scoala_1"]);
/// assert!(!LayerKey::is_managed("waterway-label"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LayerKey(String);

impl LayerKey {
    /// Join segments under the namespace.
    pub fn build<S: AsRef<str>>(segments: &[S]) -> Result<Self, KeyError> {
        if segments.is_empty() {
            return Err(KeyError::NoSegments);
        }
        for segment in segments {
            validate_segment(segment.as_ref())?;
        }
        Ok(Self::join(segments.iter().map(AsRef::as_ref)))
    }

    /// Join segments already known to be valid.
    pub(crate) fn from_valid<'a>(segments: impl IntoIterator<Item = &'a str>) -> Self {
        let key = Self::join(segments);
        debug_assert!(Self::is_managed(&key.0), "invalid segment in {}", key.0);
        key
    }

    fn join<'a>(segments: impl IntoIterator<Item = &'a str>) -> Self {
        let mut id = String::from(NAMESPACE);
        for segment in segments {
            id.push_str(SEPARATOR);
            id.push_str(segment);
        }
        Self(id)
    }

    /// Parse an engine identifier back into a key.
    ///
    /// Returns an error for anything [`LayerKey::build`] could not have produced.
    pub fn parse(id: &str) -> Result<Self, KeyError> {
        if Self::is_managed(id) {
            Ok(Self(id.to_string()))
        } else {
            Err(KeyError::NotManaged(id.to_string()))
        }
    }

    /// Whether `id` is a key produced by this namespace.
    pub fn is_managed(id: &str) -> bool {
        match Self::body(id) {
            Some(body) => body.split(SEPARATOR).all(|s| validate_segment(s).is_ok()),
            None => false,
        }
    }

    /// Recover the segments of a managed key; empty for anything else.
    pub fn split(id: &str) -> Vec<String> {
        if !Self::is_managed(id) {
            return Vec::new();
        }
        Self::body(id)
            .map(|body| body.split(SEPARATOR).map(str::to_string).collect())
            .unwrap_or_default()
    }

    /// Segments of this key.
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        Self::body(&self.0).into_iter().flat_map(|b| b.split(SEPARATOR))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    fn body(id: &str) -> Option<&str> {
        id.strip_prefix(NAMESPACE)?.strip_prefix(SEPARATOR)
    }
}

impl fmt::Display for LayerKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for LayerKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
