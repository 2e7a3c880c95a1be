use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// Edge length of a Web-Mercator raster tile in pixels
pub const TILE_SIZE: f64 = 256.0;

const EARTH_RADIUS_M: f64 = 6_371_008.8;
const MAX_MERCATOR_LAT: f64 = 85.051_128_78;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLon {
    pub lat: f64,
    pub lon: f64,
}

impl LatLon {
    #[must_use]
    pub const fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }
}

/// Geographic bounding box
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub south: f64,
    pub west: f64,
    pub north: f64,
    pub east: f64,
}

impl Bounds {
    /// Smallest box containing all points, `None` for an empty iterator
    #[must_use]
    pub fn around(points: impl IntoIterator<Item = LatLon>) -> Option<Self> {
        points.into_iter().fold(None, |acc, p| {
            Some(match acc {
                None => Self { south: p.lat, west: p.lon, north: p.lat, east: p.lon },
                Some(b) => Self {
                    south: b.south.min(p.lat),
                    west: b.west.min(p.lon),
                    north: b.north.max(p.lat),
                    east: b.east.max(p.lon),
                },
            })
        })
    }

    #[must_use]
    pub fn contains(&self, p: LatLon) -> bool {
        (self.south..=self.north).contains(&p.lat) && (self.west..=self.east).contains(&p.lon)
    }

    #[must_use]
    pub fn center(&self) -> LatLon {
        LatLon::new((self.south + self.north) / 2.0, (self.west + self.east) / 2.0)
    }
}

fn world_size(zoom: f64) -> f64 {
    TILE_SIZE * zoom.exp2()
}

/// Projects a coordinate into Web-Mercator world pixels at the given zoom.
#[must_use]
pub fn project(p: LatLon, zoom: f64) -> (f64, f64) {
    let size = world_size(zoom);
    let lat = p.lat.clamp(-MAX_MERCATOR_LAT, MAX_MERCATOR_LAT).to_radians();
    let x = (p.lon + 180.0) / 360.0 * size;
    let y = (1.0 - (lat.tan() + 1.0 / lat.cos()).ln() / PI) / 2.0 * size;
    (x, y)
}

/// Inverse of [`project`].
#[must_use]
pub fn unproject(world: (f64, f64), zoom: f64) -> LatLon {
    let size = world_size(zoom);
    let lon = world.0 / size * 360.0 - 180.0;
    let n = PI - 2.0 * PI * world.1 / size;
    let lat = n.sinh().atan().to_degrees();
    LatLon::new(lat, lon)
}

/// Moves a coordinate by a small distance in metres (flat-earth approximation).
#[must_use]
pub fn offset_by_meters(origin: LatLon, east_m: f64, north_m: f64) -> LatLon {
    let dlat = (north_m / EARTH_RADIUS_M).to_degrees();
    let dlon = (east_m / (EARTH_RADIUS_M * origin.lat.to_radians().cos())).to_degrees();
    LatLon::new(origin.lat + dlat, origin.lon + dlon)
}

/// Great-circle distance in metres
#[must_use]
pub fn haversine_m(a: LatLon, b: LatLon) -> f64 {
    let dlat = (b.lat - a.lat).to_radians();
    let dlon = (b.lon - a.lon).to_radians();
    let h = (dlat / 2.0).sin().powi(2)
        + a.lat.to_radians().cos() * b.lat.to_radians().cos() * (dlon / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_M * h.sqrt().asin()
}

#[must_use]
pub fn screen_distance(a: (f64, f64), b: (f64, f64)) -> f64 {
    let dx = a.0 - b.0;
    let dy = a.1 - b.1;
    (dx * dx + dy * dy).sqrt()
}

/// The visible part of the map: a centre, a fractional zoom and the canvas size.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MapViewport {
    pub center: LatLon,
    pub zoom: f64,
    #[serde(skip, default)]
    pub size: (f64, f64),
}

impl MapViewport {
    #[must_use]
    pub const fn new(center: LatLon, zoom: f64, size: (f64, f64)) -> Self {
        Self { center, zoom, size }
    }

    fn top_left_world(&self) -> (f64, f64) {
        let (cx, cy) = project(self.center, self.zoom);
        (cx - self.size.0 / 2.0, cy - self.size.1 / 2.0)
    }

    #[must_use]
    pub fn to_screen(&self, p: LatLon) -> (f64, f64) {
        let (x, y) = project(p, self.zoom);
        let (ox, oy) = self.top_left_world();
        (x - ox, y - oy)
    }

    #[must_use]
    pub fn to_latlon(&self, screen: (f64, f64)) -> LatLon {
        let (ox, oy) = self.top_left_world();
        unproject((screen.0 + ox, screen.1 + oy), self.zoom)
    }

    /// Shift the map so that content follows a pointer moved by (dx, dy) pixels
    pub fn pan_by(&mut self, dx: f64, dy: f64) {
        let (cx, cy) = project(self.center, self.zoom);
        self.center = unproject((cx - dx, cy - dy), self.zoom);
    }

    /// Change zoom while keeping the coordinate under `anchor` fixed on screen
    pub fn zoom_around(&mut self, new_zoom: f64, anchor: (f64, f64), min: f64, max: f64) {
        let new_zoom = new_zoom.clamp(min, max);
        let fixed = self.to_latlon(anchor);
        self.zoom = new_zoom;
        let (fx, fy) = project(fixed, new_zoom);
        let cx = fx - anchor.0 + self.size.0 / 2.0;
        let cy = fy - anchor.1 + self.size.1 / 2.0;
        self.center = unproject((cx, cy), new_zoom);
    }

    #[must_use]
    pub fn bounds(&self) -> Bounds {
        let nw = self.to_latlon((0.0, 0.0));
        let se = self.to_latlon(self.size);
        Bounds { south: se.lat, west: nw.lon, north: nw.lat, east: se.lon }
    }

    /// Centre on `bounds` with the largest integer zoom that still shows all of it.
    pub fn fit_bounds(&mut self, bounds: &Bounds, padding: f64, max_zoom: f64) {
        self.center = bounds.center();
        let mut zoom = max_zoom.floor();
        while zoom > 0.0 {
            let (x1, y1) = project(LatLon::new(bounds.north, bounds.west), zoom);
            let (x2, y2) = project(LatLon::new(bounds.south, bounds.east), zoom);
            if (x2 - x1) + 2.0 * padding <= self.size.0 && (y2 - y1) + 2.0 * padding <= self.size.1 {
                break;
            }
            zoom -= 1.0;
        }
        self.zoom = zoom;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn viewport() -> MapViewport {
        MapViewport::new(LatLon::new(46.948, 7.4474), 14.0, (800.0, 600.0))
    }

    #[test]
    fn test_center_projects_to_canvas_middle() {
        let vp = viewport();
        let (x, y) = vp.to_screen(vp.center);
        assert!((x - 400.0).abs() < 1e-6);
        assert!((y - 300.0).abs() < 1e-6);
    }

    #[test]
    fn test_screen_and_latlon_are_inverse() {
        let vp = viewport();
        let p = vp.to_latlon((123.0, 456.0));
        let (x, y) = vp.to_screen(p);
        assert!((x - 123.0).abs() < 1e-6);
        assert!((y - 456.0).abs() < 1e-6);
    }

    #[test]
    fn test_pan_moves_content_with_pointer() {
        let mut vp = viewport();
        let p = vp.to_latlon((100.0, 100.0));
        vp.pan_by(50.0, -20.0);
        let (x, y) = vp.to_screen(p);
        assert!((x - 150.0).abs() < 1e-6);
        assert!((y - 80.0).abs() < 1e-6);
    }

    #[test]
    fn test_zoom_around_keeps_anchor_fixed() {
        let mut vp = viewport();
        let anchor = (200.0, 150.0);
        let before = vp.to_latlon(anchor);
        vp.zoom_around(15.5, anchor, 3.0, 19.0);
        let (x, y) = vp.to_screen(before);
        assert!((x - 200.0).abs() < 1e-6);
        assert!((y - 150.0).abs() < 1e-6);
        assert_eq!(vp.zoom, 15.5);
    }

    #[test]
    fn test_offset_by_meters_matches_haversine() {
        let origin = LatLon::new(47.0, 8.0);
        let moved = offset_by_meters(origin, 3.0, 4.0);
        assert!((haversine_m(origin, moved) - 5.0).abs() < 0.01);
    }

    #[test]
    fn test_bounds_around_points() {
        let b = Bounds::around([LatLon::new(47.0, 8.0), LatLon::new(46.5, 8.5)]).expect("bounds");
        assert_eq!(b.south, 46.5);
        assert_eq!(b.north, 47.0);
        assert!(b.contains(LatLon::new(46.7, 8.2)));
        assert!(Bounds::around(std::iter::empty()).is_none());
    }

    #[test]
    fn test_fit_bounds_shows_whole_box() {
        let mut vp = viewport();
        let b = Bounds { south: 46.9, west: 7.3, north: 47.0, east: 7.5 };
        vp.fit_bounds(&b, 20.0, 18.0);
        let visible = vp.bounds();
        assert!(visible.south <= b.south && visible.north >= b.north);
        assert!(visible.west <= b.west && visible.east >= b.east);
    }
}
