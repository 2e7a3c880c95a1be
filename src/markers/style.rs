use std::collections::HashMap;
use crate::constants::{CIRCLE_MARKER_RADIUS, ICON_MARKER_SIZE, ICON_ZOOM_THRESHOLD};
use crate::models::{StopRecord, StopSide};

pub const ATLAS_MATCHED_COLOR: &str = "#2e7d32";
pub const ATLAS_UNMATCHED_COLOR: &str = "#c62828";
pub const OSM_MATCHED_COLOR: &str = "#1565c0";
pub const OSM_UNMATCHED_COLOR: &str = "#757575";

#[must_use]
pub fn marker_color(record: &StopRecord, side: StopSide) -> &'static str {
    match (side, record.is_matched()) {
        (StopSide::Atlas, true) => ATLAS_MATCHED_COLOR,
        (StopSide::Atlas, false) => ATLAS_UNMATCHED_COLOR,
        (StopSide::Osm, true) => OSM_MATCHED_COLOR,
        (StopSide::Osm, false) => OSM_UNMATCHED_COLOR,
    }
}

/// Letter drawn inside a high zoom marker
#[must_use]
pub fn marker_glyph(record: &StopRecord, side: StopSide) -> Option<char> {
    match side {
        StopSide::Atlas => record.is_duplicate().then_some('D'),
        StopSide::Osm => {
            let kind = record.osm_public_transport.as_deref().or(record.osm_node_type.as_deref())?;
            match kind {
                k if k.eq_ignore_ascii_case("platform") => Some('P'),
                k if k.eq_ignore_ascii_case("station") => Some('S'),
                _ => None,
            }
        }
    }
}

/// Everything that makes two icons look the same
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct IconKey {
    pub side: StopSide,
    pub color: &'static str,
    pub glyph: Option<char>,
    pub size: u32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MarkerStyle {
    Circle { color: &'static str, radius: f64 },
    Icon(IconKey),
}

impl MarkerStyle {
    /// Dots below the icon threshold, glyph icons from it on
    #[must_use]
    pub fn for_marker(record: &StopRecord, side: StopSide, zoom: f64) -> Self {
        let color = marker_color(record, side);
        if zoom < ICON_ZOOM_THRESHOLD {
            Self::Circle { color, radius: CIRCLE_MARKER_RADIUS }
        } else {
            Self::Icon(IconKey { side, color, glyph: marker_glyph(record, side), size: ICON_MARKER_SIZE })
        }
    }

    /// Radius used for hit testing
    #[must_use]
    pub fn hit_radius(&self) -> f64 {
        match self {
            Self::Circle { radius, .. } => *radius + 2.0,
            Self::Icon(key) => f64::from(key.size) / 2.0,
        }
    }
}

/// Builds each distinct icon once and hands out the cached instance afterwards
#[derive(Debug)]
pub struct IconCache<T> {
    icons: HashMap<IconKey, T>,
    hits: usize,
    misses: usize,
}

impl<T> Default for IconCache<T> {
    fn default() -> Self {
        Self { icons: HashMap::new(), hits: 0, misses: 0 }
    }
}

impl<T> IconCache<T> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_or_insert_with(&mut self, key: IconKey, build: impl FnOnce(&IconKey) -> T) -> &T {
        if self.icons.contains_key(&key) {
            self.hits += 1;
        } else {
            self.misses += 1;
        }
        self.icons.entry(key).or_insert_with(|| build(&key))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.icons.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.icons.is_empty()
    }

    /// (hits, misses)
    #[must_use]
    pub fn stats(&self) -> (usize, usize) {
        (self.hits, self.misses)
    }
}
