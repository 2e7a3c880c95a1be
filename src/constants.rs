use crate::geometry::LatLon;

/// Coordinates closer than this (in degrees, roughly one metre) share a cluster bucket
pub const CLUSTER_TOLERANCE_DEG: f64 = 1e-5;

/// Distance of spread-out markers from their bucket centre, in metres
pub const CLUSTER_RADIUS_M: f64 = 3.0;

/// Zoom level from which markers are drawn as glyph icons instead of dots
pub const ICON_ZOOM_THRESHOLD: f64 = 16.0;

/// Dot radius for low zoom markers (px)
pub const CIRCLE_MARKER_RADIUS: f64 = 5.0;

/// Icon edge length for high zoom markers (px)
pub const ICON_MARKER_SIZE: u32 = 22;

/// Markers handed to the map layer per batch before yielding to the event loop
pub const MARKER_BATCH_SIZE: usize = 250;

/// Width of the edge band that starts a popup resize (px)
pub const POPUP_RESIZE_MARGIN: f64 = 10.0;

pub const POPUP_MIN_WIDTH: f64 = 220.0;
pub const POPUP_MIN_HEIGHT: f64 = 120.0;

/// Widest useful popup when a single bubble is shown
pub const POPUP_SINGLE_BUBBLE_MAX_WIDTH: f64 = 460.0;

/// Widest useful popup when ATLAS and OSM bubbles sit side by side
pub const POPUP_MULTI_BUBBLE_MAX_WIDTH: f64 = 920.0;

/// Default popup placement relative to its anchor marker (px)
pub const POPUP_DEFAULT_OFFSET: (f64, f64) = (-160.0, -260.0);

/// Height of the popup title bar used as drag handle (px)
pub const POPUP_HANDLE_HEIGHT: f64 = 28.0;

pub const MIN_MAP_ZOOM: f64 = 3.0;
pub const MAX_MAP_ZOOM: f64 = 19.0;

/// Initial map view (centre of Switzerland)
pub const DEFAULT_MAP_CENTER: LatLon = LatLon { lat: 46.8182, lon: 8.2275 };
pub const DEFAULT_MAP_ZOOM: f64 = 8.0;

pub const TILE_URL_TEMPLATE: &str = "https://tile.openstreetmap.org/{z}/{x}/{y}.png";

/// How long transient notices stay visible (ms)
pub const TOAST_DURATION_MS: u32 = 3500;

/// Quiet period after the last wheel or pan step before the map reloads
pub const RELOAD_DEBOUNCE_MS: u32 = 250;

/// Padding around a route's stops when the map zooms to them
pub const FIT_BOUNDS_PADDING: f64 = 40.0;

pub const NODE_TYPE_OPTIONS: [(&str, &str); 4] = [
    ("platform", "Platform"),
    ("stop_position", "Stop position"),
    ("station", "Station"),
    ("ferry_terminal", "Ferry terminal"),
];

pub const TRANSPORT_TYPE_OPTIONS: [(&str, &str); 7] = [
    ("bus", "Bus"),
    ("tram", "Tram"),
    ("train", "Train"),
    ("ferry", "Ferry"),
    ("funicular", "Funicular"),
    ("aerialway", "Cable car"),
    ("metro", "Metro"),
];
