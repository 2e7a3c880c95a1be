use crate::constants::{DEFAULT_MAP_CENTER, DEFAULT_MAP_ZOOM, MAX_MAP_ZOOM, MIN_MAP_ZOOM};
use crate::geometry::MapViewport;

const SETTINGS_KEY_PREFIX: &str = "stop_reconciler_";
const VIEWPORT_KEY: &str = "map_viewport";

fn storage() -> Option<web_sys::Storage> {
    web_sys::window()?.local_storage().ok()?
}

/// Parses a stored viewport, rejecting out of range values
#[must_use]
pub fn parse_viewport(json: &str) -> Option<MapViewport> {
    let viewport: MapViewport = serde_json::from_str(json).ok()?;
    let valid = (-85.0..=85.0).contains(&viewport.center.lat)
        && (-180.0..=180.0).contains(&viewport.center.lon)
        && (MIN_MAP_ZOOM..=MAX_MAP_ZOOM).contains(&viewport.zoom);
    valid.then_some(viewport)
}

/// Last map view, or the default view over Switzerland
#[must_use]
pub fn load_viewport() -> MapViewport {
    let stored = storage()
        .and_then(|s| s.get_item(&format!("{SETTINGS_KEY_PREFIX}{VIEWPORT_KEY}")).ok().flatten())
        .and_then(|json| parse_viewport(&json));
    stored.unwrap_or(MapViewport::new(DEFAULT_MAP_CENTER, DEFAULT_MAP_ZOOM, (0.0, 0.0)))
}

pub fn save_viewport(viewport: &MapViewport) {
    let Some(storage) = storage() else { return };
    let Ok(json) = serde_json::to_string(viewport) else { return };
    let _ = storage.set_item(&format!("{SETTINGS_KEY_PREFIX}{VIEWPORT_KEY}"), &json);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_viewport() {
        let vp = parse_viewport(r#"{"center": {"lat": 47.0, "lon": 8.0}, "zoom": 12.5}"#).expect("valid");
        assert_eq!(vp.zoom, 12.5);
        assert_eq!(vp.size, (0.0, 0.0));
        assert!(parse_viewport(r#"{"center": {"lat": 47.0, "lon": 8.0}, "zoom": 40}"#).is_none());
        assert!(parse_viewport("not json").is_none());
    }
}

#[cfg(all(test, target_arch = "wasm32"))]
mod wasm_tests {
    use super::*;
    use crate::geometry::LatLon;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    #[wasm_bindgen_test]
    fn test_viewport_survives_reload() {
        let viewport = MapViewport::new(LatLon::new(46.5, 6.6), 14.0, (800.0, 600.0));
        save_viewport(&viewport);
        let loaded = load_viewport();
        assert_eq!(loaded.center, viewport.center);
        assert_eq!(loaded.zoom, 14.0);
    }
}
