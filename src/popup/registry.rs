use uuid::Uuid;
use crate::geometry::{LatLon, MapViewport};
use crate::models::{MarkerKey, StopRecord};
use super::content::{build_bubbles, PopupView};
use super::geometry::PopupGeometry;

/// Screen-space segment from a marker to its popup
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConnectorLine {
    pub from: (f64, f64),
    pub to: (f64, f64),
}

#[derive(Debug, Clone)]
pub struct PopupInstance {
    pub id: Uuid,
    pub key: MarkerKey,
    pub anchor: LatLon,
    pub record: StopRecord,
    pub view: PopupView,
    pub geometry: PopupGeometry,
    /// Present while the popup is open and has been positioned at least once
    pub connector: Option<ConnectorLine>,
}

impl PopupInstance {
    #[must_use]
    pub fn bubble_count(&self) -> usize {
        build_bubbles(&self.record, self.view).len()
    }

    /// Recomputes the connector from the anchor marker to the panel tip
    pub fn reposition(&mut self, viewport: &MapViewport) {
        let anchor = viewport.to_screen(self.anchor);
        self.connector = Some(ConnectorLine { from: anchor, to: self.geometry.tip(anchor) });
    }
}

/// All popups currently on screen, in stacking order (last is on top)
#[derive(Debug, Clone, Default)]
pub struct OpenPopups {
    popups: Vec<PopupInstance>,
}

impl OpenPopups {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Opens a popup for `key`, or brings the existing one to the front and
    /// refreshes its record.
    pub fn open(&mut self, key: MarkerKey, anchor: LatLon, record: StopRecord) -> Uuid {
        if let Some(index) = self.popups.iter().position(|p| p.key == key) {
            let mut popup = self.popups.remove(index);
            popup.anchor = anchor;
            popup.record = record;
            let bubbles = popup.bubble_count();
            popup.geometry.invalidate_layout(bubbles);
            let id = popup.id;
            self.popups.push(popup);
            return id;
        }

        let view = PopupView::Initial(key.side);
        let bubbles = build_bubbles(&record, view).len();
        let id = Uuid::new_v4();
        self.popups.push(PopupInstance {
            id,
            key,
            anchor,
            record,
            view,
            geometry: PopupGeometry::new(bubbles),
            connector: None,
        });
        id
    }

    /// Removes the popup together with its connector. Returns false for an
    /// unknown id.
    pub fn close(&mut self, id: Uuid) -> bool {
        let before = self.popups.len();
        self.popups.retain(|p| p.id != id);
        self.popups.len() != before
    }

    pub fn close_all(&mut self) {
        self.popups.clear();
    }

    /// Pan/zoom tick: only popups still in the list are touched
    pub fn reposition_all(&mut self, viewport: &MapViewport) {
        for popup in &mut self.popups {
            popup.reposition(viewport);
        }
    }

    pub fn bring_to_front(&mut self, id: Uuid) {
        if let Some(index) = self.popups.iter().position(|p| p.id == id) {
            let popup = self.popups.remove(index);
            self.popups.push(popup);
        }
    }

    /// Swaps in lazily loaded content without changing the stacking order
    pub fn replace_record(&mut self, key: MarkerKey, record: StopRecord) -> bool {
        let Some(popup) = self.popups.iter_mut().find(|p| p.key == key) else { return false };
        popup.record = record;
        let bubbles = popup.bubble_count();
        popup.geometry.invalidate_layout(bubbles);
        true
    }

    /// Switches a popup's view and forces its layout to be recomputed
    pub fn set_view(&mut self, id: Uuid, view: PopupView) -> bool {
        let Some(popup) = self.get_mut(id) else { return false };
        popup.view = view;
        let bubbles = popup.bubble_count();
        popup.geometry.invalidate_layout(bubbles);
        true
    }

    #[must_use]
    pub fn get(&self, id: Uuid) -> Option<&PopupInstance> {
        self.popups.iter().find(|p| p.id == id)
    }

    pub fn get_mut(&mut self, id: Uuid) -> Option<&mut PopupInstance> {
        self.popups.iter_mut().find(|p| p.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &PopupInstance> {
        self.popups.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.popups.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.popups.is_empty()
    }

    /// Id of an active drag or resize, if any
    #[must_use]
    pub fn interacting(&self) -> Option<Uuid> {
        self.popups.iter().find(|p| !p.geometry.is_idle()).map(|p| p.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{StopKind, StopSide};

    fn record(id: i64) -> StopRecord {
        StopRecord {
            id,
            stop_type: StopKind::Matched,
            atlas_lat: Some(46.95),
            atlas_lon: Some(7.44),
            osm_lat: Some(46.951),
            osm_lon: Some(7.441),
            ..StopRecord::default()
        }
    }

    fn key(stop_id: i64) -> MarkerKey {
        MarkerKey { side: StopSide::Atlas, stop_id }
    }

    fn viewport() -> MapViewport {
        MapViewport::new(LatLon::new(46.95, 7.44), 15.0, (1000.0, 800.0))
    }

    #[test]
    fn test_multiple_popups_and_reopen_brings_to_front() {
        let mut popups = OpenPopups::new();
        let a = popups.open(key(1), LatLon::new(46.95, 7.44), record(1));
        let b = popups.open(key(2), LatLon::new(46.96, 7.45), record(2));
        assert_eq!(popups.len(), 2);

        let again = popups.open(key(1), LatLon::new(46.95, 7.44), record(1));
        assert_eq!(again, a);
        assert_eq!(popups.len(), 2);
        let order: Vec<Uuid> = popups.iter().map(|p| p.id).collect();
        assert_eq!(order, vec![b, a]);

        popups.bring_to_front(b);
        assert_eq!(popups.iter().last().map(|p| p.id), Some(b));
    }

    #[test]
    fn test_closed_popup_is_not_repositioned() {
        let mut popups = OpenPopups::new();
        let a = popups.open(key(1), LatLon::new(46.95, 7.44), record(1));
        let b = popups.open(key(2), LatLon::new(46.96, 7.45), record(2));
        popups.reposition_all(&viewport());
        assert!(popups.close(a));
        assert!(!popups.close(a));

        let mut moved = viewport();
        moved.pan_by(50.0, 0.0);
        popups.reposition_all(&moved);

        assert!(popups.get(a).is_none());
        assert_eq!(popups.iter().count(), 1);
        let line = popups.get(b).and_then(|p| p.connector).expect("connector");
        assert!((line.from.0 - moved.to_screen(LatLon::new(46.96, 7.45)).0).abs() < 1e-9);
    }

    #[test]
    fn test_connector_tracks_drag() {
        let mut popups = OpenPopups::new();
        let id = popups.open(key(1), LatLon::new(46.95, 7.44), record(1));
        popups.reposition_all(&viewport());
        let before = popups.get(id).and_then(|p| p.connector).expect("connector");

        let popup = popups.get_mut(id).expect("open");
        popup.geometry.begin_drag((0.0, 0.0)).expect("idle");
        popup.geometry.pointer_move((30.0, -20.0));
        assert_eq!(popups.interacting(), Some(id));
        popups.reposition_all(&viewport());

        let after = popups.get(id).and_then(|p| p.connector).expect("connector");
        assert_eq!(before.from, after.from);
        assert!((after.to.0 - before.to.0 - 30.0).abs() < 1e-9);
        assert!((after.to.1 - before.to.1 + 20.0).abs() < 1e-9);
    }

    #[test]
    fn test_loaded_content_replaces_record_in_place() {
        let mut popups = OpenPopups::new();
        let a = popups.open(key(1), LatLon::new(46.95, 7.44), record(1));
        let b = popups.open(key(2), LatLon::new(46.96, 7.45), record(2));

        let mut loaded = record(1);
        loaded.osm_name = Some("Loaded".to_string());
        assert!(popups.replace_record(key(1), loaded));
        assert!(!popups.replace_record(key(3), record(3)));

        let order: Vec<Uuid> = popups.iter().map(|p| p.id).collect();
        assert_eq!(order, vec![a, b]);
        assert_eq!(popups.get(a).and_then(|p| p.record.osm_name.clone()).as_deref(), Some("Loaded"));
    }

    #[test]
    fn test_view_switch_recalculates_layout() {
        let mut popups = OpenPopups::new();
        let id = popups.open(key(1), LatLon::new(46.95, 7.44), record(1));
        assert_eq!(popups.get(id).map(PopupInstance::bubble_count), Some(1));

        assert!(popups.set_view(id, PopupView::Unified));
        let popup = popups.get(id).expect("open");
        assert_eq!(popup.bubble_count(), 2);
        assert_eq!(popup.geometry.max_width(), crate::constants::POPUP_MULTI_BUBBLE_MAX_WIDTH);
    }
}
