use std::collections::HashMap;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys::{CanvasRenderingContext2d, HtmlImageElement};
use crate::constants::{MAX_MAP_ZOOM, TILE_URL_TEMPLATE};
use crate::geometry::{project, MapViewport, TILE_SIZE};

const TILE_BACKGROUND_COLOR: &str = "#e8e4dc";
/// Beyond this many tiles the oldest entries are evicted
const MAX_CACHED_TILES: usize = 512;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TileCoord {
    pub z: u32,
    pub x: i64,
    pub y: i64,
}

impl TileCoord {
    /// Tile URL with x wrapped around the antimeridian
    #[must_use]
    pub fn url(&self) -> String {
        let n = 1_i64 << self.z;
        TILE_URL_TEMPLATE
            .replace("{z}", &self.z.to_string())
            .replace("{x}", &self.x.rem_euclid(n).to_string())
            .replace("{y}", &self.y.to_string())
    }
}

/// A tile to draw: where it goes on screen and at which edge length
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlacedTile {
    pub coord: TileCoord,
    pub screen: (f64, f64),
    pub size: f64,
}

/// Tiles covering the viewport at the nearest integer zoom, scaled to the
/// fractional zoom.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_precision_loss)]
pub fn visible_tiles(viewport: &MapViewport) -> Vec<PlacedTile> {
    let z = viewport.zoom.round().clamp(0.0, MAX_MAP_ZOOM);
    let size = TILE_SIZE * 2f64.powf(viewport.zoom - z);
    let (cx, cy) = project(viewport.center, viewport.zoom);
    let left = cx - viewport.size.0 / 2.0;
    let top = cy - viewport.size.1 / 2.0;
    let n = 2f64.powf(z) as i64;

    let x0 = (left / size).floor() as i64;
    let x1 = ((left + viewport.size.0) / size).floor() as i64;
    let y0 = ((top / size).floor() as i64).max(0);
    let y1 = (((top + viewport.size.1) / size).floor() as i64).min(n - 1);

    let mut tiles = Vec::new();
    for y in y0..=y1 {
        for x in x0..=x1 {
            tiles.push(PlacedTile {
                coord: TileCoord { z: z as u32, x, y },
                screen: (x as f64 * size - left, y as f64 * size - top),
                size,
            });
        }
    }
    tiles
}

/// Raster tile images by coordinate
#[derive(Default)]
pub struct TileCache {
    images: HashMap<TileCoord, HtmlImageElement>,
    order: Vec<TileCoord>,
}

impl TileCache {
    /// Image for `coord`, starting the download on first use. `on_load` runs
    /// once the image arrives so the map can be redrawn.
    fn image(&mut self, coord: TileCoord, on_load: &js_sys::Function) -> Option<&HtmlImageElement> {
        if !self.images.contains_key(&coord) {
            let image = HtmlImageElement::new().ok()?;
            image.set_cross_origin(Some("anonymous"));
            image.set_onload(Some(on_load));
            image.set_src(&coord.url());
            self.images.insert(coord, image);
            self.order.push(coord);
            if self.order.len() > MAX_CACHED_TILES {
                let evicted = self.order.remove(0);
                self.images.remove(&evicted);
            }
        }
        self.images.get(&coord)
    }
}

/// Builds the shared onload callback once; it lives as long as the page.
pub fn tile_loaded_callback(redraw: impl Fn() + 'static) -> js_sys::Function {
    let closure = Closure::<dyn Fn()>::new(redraw);
    let function: js_sys::Function = closure.as_ref().unchecked_ref::<js_sys::Function>().clone();
    closure.forget();
    function
}

pub fn draw_tiles(ctx: &CanvasRenderingContext2d, viewport: &MapViewport, cache: &mut TileCache, on_load: &js_sys::Function) {
    ctx.set_fill_style_str(TILE_BACKGROUND_COLOR);
    ctx.fill_rect(0.0, 0.0, viewport.size.0, viewport.size.1);

    for tile in visible_tiles(viewport) {
        let Some(image) = cache.image(tile.coord, on_load) else { continue };
        if !image.complete() || image.natural_width() == 0 {
            continue;
        }
        let _ = ctx.draw_image_with_html_image_element_and_dw_and_dh(
            image,
            tile.screen.0.floor(),
            tile.screen.1.floor(),
            tile.size.ceil() + 1.0,
            tile.size.ceil() + 1.0,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::LatLon;

    #[test]
    fn test_tiles_cover_viewport() {
        let vp = MapViewport::new(LatLon::new(46.95, 7.44), 12.0, (800.0, 600.0));
        let tiles = visible_tiles(&vp);
        assert!(!tiles.is_empty());
        assert!(tiles.iter().all(|t| t.coord.z == 12 && (t.size - TILE_SIZE).abs() < 1e-9));

        let min_x = tiles.iter().map(|t| t.screen.0).fold(f64::INFINITY, f64::min);
        let max_x = tiles.iter().map(|t| t.screen.0 + t.size).fold(f64::NEG_INFINITY, f64::max);
        let min_y = tiles.iter().map(|t| t.screen.1).fold(f64::INFINITY, f64::min);
        let max_y = tiles.iter().map(|t| t.screen.1 + t.size).fold(f64::NEG_INFINITY, f64::max);
        assert!(min_x <= 0.0 && max_x >= 800.0);
        assert!(min_y <= 0.0 && max_y >= 600.0);
    }

    #[test]
    fn test_fractional_zoom_scales_tiles() {
        let vp = MapViewport::new(LatLon::new(46.95, 7.44), 12.4, (800.0, 600.0));
        let tiles = visible_tiles(&vp);
        assert!(tiles.iter().all(|t| t.coord.z == 12));
        assert!((tiles[0].size - TILE_SIZE * 2f64.powf(0.4)).abs() < 1e-9);
    }

    #[test]
    fn test_url_wraps_x() {
        let coord = TileCoord { z: 2, x: -1, y: 1 };
        assert_eq!(coord.url(), "https://tile.openstreetmap.org/2/3/1.png");
    }
}
