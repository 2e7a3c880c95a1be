use std::f64::consts::TAU;
use wasm_bindgen::JsCast;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement};
use crate::constants::ICON_ZOOM_THRESHOLD;
use crate::geometry::MapViewport;
use crate::markers::{IconCache, IconKey, MarkerStyle, PlacedMarker, ScreenMarker};
use crate::models::{MarkerKey, StopRecord, StopSide};

const MARKER_OUTLINE_COLOR: &str = "#ffffff";
const MARKER_OUTLINE_WIDTH: f64 = 1.5;
const MATCH_LINE_COLOR: &str = "rgba(46, 125, 50, 0.7)";
const MATCH_LINE_WIDTH: f64 = 2.0;
const SPREAD_LINE_COLOR: &str = "rgba(0, 0, 0, 0.35)";
const SELECTION_RING_COLOR: &str = "#ff9800";
const SELECTION_RING_WIDTH: f64 = 3.0;
const SELECTION_RING_OFFSET: f64 = 4.0;
const GLYPH_COLOR: &str = "#ffffff";
/// Markers this far outside the canvas are skipped
const CULL_MARGIN: f64 = 32.0;

pub type MarkerIcons = IconCache<Option<HtmlCanvasElement>>;

fn on_canvas(viewport: &MapViewport, p: (f64, f64)) -> bool {
    p.0 >= -CULL_MARGIN && p.1 >= -CULL_MARGIN && p.0 <= viewport.size.0 + CULL_MARGIN && p.1 <= viewport.size.1 + CULL_MARGIN
}

/// Renders one icon into an offscreen canvas. ATLAS icons are round, OSM
/// icons square, so both datasets stay apart when they overlap.
fn build_icon(key: &IconKey) -> Option<HtmlCanvasElement> {
    let document = web_sys::window()?.document()?;
    let canvas = document.create_element("canvas").ok()?.dyn_into::<HtmlCanvasElement>().ok()?;
    canvas.set_width(key.size);
    canvas.set_height(key.size);
    let ctx = canvas
        .get_context("2d")
        .ok()
        .flatten()
        .and_then(|ctx| ctx.dyn_into::<CanvasRenderingContext2d>().ok())?;

    let size = f64::from(key.size);
    let half = size / 2.0;
    ctx.set_fill_style_str(key.color);
    ctx.set_stroke_style_str(MARKER_OUTLINE_COLOR);
    ctx.set_line_width(MARKER_OUTLINE_WIDTH);
    ctx.begin_path();
    match key.side {
        StopSide::Atlas => {
            let _ = ctx.arc(half, half, half - MARKER_OUTLINE_WIDTH, 0.0, TAU);
        }
        StopSide::Osm => {
            let inset = MARKER_OUTLINE_WIDTH + 1.0;
            ctx.rect(inset, inset, size - 2.0 * inset, size - 2.0 * inset);
        }
    }
    ctx.fill();
    ctx.stroke();

    if let Some(glyph) = key.glyph {
        ctx.set_fill_style_str(GLYPH_COLOR);
        ctx.set_font(&format!("bold {}px sans-serif", (size * 0.55).round()));
        ctx.set_text_align("center");
        ctx.set_text_baseline("middle");
        let _ = ctx.fill_text(&glyph.to_string(), half, half + 1.0);
    }
    Some(canvas)
}

fn draw_match_lines(ctx: &CanvasRenderingContext2d, viewport: &MapViewport, records: &[StopRecord]) {
    ctx.save();
    ctx.set_stroke_style_str(MATCH_LINE_COLOR);
    ctx.set_line_width(MATCH_LINE_WIDTH);
    ctx.begin_path();
    for record in records.iter().filter(|r| r.is_matched()) {
        let (Some(atlas), Some(osm)) = (record.position(StopSide::Atlas), record.position(StopSide::Osm)) else { continue };
        let a = viewport.to_screen(atlas);
        let b = viewport.to_screen(osm);
        if !on_canvas(viewport, a) && !on_canvas(viewport, b) {
            continue;
        }
        ctx.move_to(a.0, a.1);
        ctx.line_to(b.0, b.1);
    }
    ctx.stroke();
    ctx.restore();
}

/// Thin spokes from a shared coordinate to the markers fanned out around it
fn draw_spread_lines(ctx: &CanvasRenderingContext2d, viewport: &MapViewport, placed: &[PlacedMarker]) {
    ctx.save();
    ctx.set_stroke_style_str(SPREAD_LINE_COLOR);
    ctx.set_line_width(1.0);
    ctx.begin_path();
    for marker in placed.iter().filter(|m| m.position != m.center) {
        let c = viewport.to_screen(marker.center);
        let p = viewport.to_screen(marker.position);
        ctx.move_to(c.0, c.1);
        ctx.line_to(p.0, p.1);
    }
    ctx.stroke();
    ctx.restore();
}

/// Draws all markers and returns them in screen space, in drawing order, for
/// hit testing.
pub fn draw_markers(
    ctx: &CanvasRenderingContext2d,
    viewport: &MapViewport,
    records: &[StopRecord],
    placed: &[PlacedMarker],
    icons: &mut MarkerIcons,
    selected: Option<MarkerKey>,
) -> Vec<ScreenMarker> {
    let high_zoom = viewport.zoom >= ICON_ZOOM_THRESHOLD;
    if high_zoom {
        draw_match_lines(ctx, viewport, records);
        draw_spread_lines(ctx, viewport, placed);
    }

    let mut drawn = Vec::with_capacity(placed.len());
    for marker in placed {
        let Some(record) = records.get(marker.datum.record) else { continue };
        let screen = viewport.to_screen(marker.position);
        if !on_canvas(viewport, screen) {
            continue;
        }

        let style = MarkerStyle::for_marker(record, marker.datum.side, viewport.zoom);
        match style {
            MarkerStyle::Circle { color, radius } => {
                ctx.set_fill_style_str(color);
                ctx.set_stroke_style_str(MARKER_OUTLINE_COLOR);
                ctx.set_line_width(MARKER_OUTLINE_WIDTH);
                ctx.begin_path();
                let _ = ctx.arc(screen.0, screen.1, radius, 0.0, TAU);
                ctx.fill();
                ctx.stroke();
            }
            MarkerStyle::Icon(key) => {
                if let Some(icon) = icons.get_or_insert_with(key, build_icon) {
                    let half = f64::from(key.size) / 2.0;
                    let _ = ctx.draw_image_with_html_canvas_element(icon, screen.0 - half, screen.1 - half);
                }
            }
        }

        let drawn_marker = ScreenMarker::drawn(marker, screen, style.hit_radius());
        if selected == Some(drawn_marker.key) {
            ctx.set_stroke_style_str(SELECTION_RING_COLOR);
            ctx.set_line_width(SELECTION_RING_WIDTH);
            ctx.begin_path();
            let _ = ctx.arc(screen.0, screen.1, style.hit_radius() + SELECTION_RING_OFFSET, 0.0, TAU);
            ctx.stroke();
        }

        drawn.push(drawn_marker);
    }
    drawn
}
