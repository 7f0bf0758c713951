//! INI serialization: `ConfigFile` to the commented text written to disk.

use super::settings::ConfigFile;

/// Convert a `ConfigFile` to a commented INI string for saving.
pub(super) fn to_config_string(config: &ConfigFile) -> String {
    format!(
        r#"[data]
; Where the GeoJSON datasets are read from: an http(s) base URL or a directory.
; Expected files: streets.geojson, schools.geojson, neighborhood_limits.geojson,
; buildings.geojson and, optionally, school_isochrones.geojson
source = {}
; Timeout in seconds for HTTP requests (default: 30)
timeout = {}

[map]
; Base map style: osm, light, dark or none (default: dark)
basemap = {}

[logging]
; Log file path (default: ~/.hoodmap/logs/hoodmap.log)
file = {}
"#,
        config.data.source,
        config.data.timeout,
        config.map.base.id(),
        config.logging.file.display(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_writes_every_section() {
        let text = to_config_string(&ConfigFile::default());
        for section in ["[data]", "[map]", "[logging]"] {
            assert!(text.contains(section), "missing {section}");
        }
        assert!(text.contains("timeout = 30"));
        assert!(text.contains("basemap = dark"));
    }
}
