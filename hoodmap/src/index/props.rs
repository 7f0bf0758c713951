//! Property names used by the source datasets.

/// Display name on boundaries and schools.
pub const NAME: &str = "denumire";
/// Fallback display name on schools, and street name.
pub const ALT_NAME: &str = "name";
/// Slug on boundaries and schools.
pub const SLUG: &str = "slug";
/// Neighborhood reference on streets and buildings.
pub const NEIGHBORHOOD_REF: &str = "cartier";
/// School reference on streets.
pub const SCHOOL_REF: &str = "arondat";
/// School reference on isochrone features.
pub const ISO_SCHOOL_REF: &str = "den_scoala";
/// Travel mode tag on isochrone features.
pub const ISO_MODE: &str = "tip";
/// Travel cost on isochrone features.
pub const ISO_COST: &str = "cost_level";
/// Band label written onto isochrone features.
pub const ISO_BAND: &str = "band";
