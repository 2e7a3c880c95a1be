use indexmap::IndexMap;
use crate::models::{RouteInfo, StopRecord, StopSide};

/// Which bubbles a popup shows
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PopupView {
    /// Only the side that was clicked
    Initial(StopSide),
    /// Both sides plus all correlated matches
    Unified,
}

impl PopupView {
    #[must_use]
    pub fn toggle(self, clicked: StopSide) -> Self {
        match self {
            Self::Initial(_) => Self::Unified,
            Self::Unified => Self::Initial(clicked),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BubbleField {
    pub label: &'static str,
    pub value: String,
    /// Shown next to the value, e.g. a disagreeing operator on the other side
    pub annotation: Option<String>,
    pub link: Option<String>,
}

impl BubbleField {
    fn new(label: &'static str, value: impl Into<String>) -> Self {
        Self { label, value: value.into(), annotation: None, link: None }
    }
}

/// All directions seen for one route id
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupedRoute {
    pub route_id: String,
    pub name: Option<String>,
    pub directions: Vec<String>,
}

/// Rendered content for one dataset side of one record
#[derive(Debug, Clone, PartialEq)]
pub struct Bubble {
    pub side: StopSide,
    pub stop_id: i64,
    pub title: String,
    pub fields: Vec<BubbleField>,
    pub routes: Vec<GroupedRoute>,
}

/// Merges routes sharing an id. Groups keep first-seen order, as do the
/// directions inside a group.
#[must_use]
pub fn group_routes(routes: &[RouteInfo]) -> Vec<GroupedRoute> {
    let mut groups: IndexMap<&str, GroupedRoute> = IndexMap::new();
    for route in routes {
        let group = groups.entry(route.route_id.as_str()).or_insert_with(|| GroupedRoute {
            route_id: route.route_id.clone(),
            name: None,
            directions: Vec::new(),
        });
        if group.name.is_none() {
            group.name.clone_from(&route.route_name);
        }
        if let Some(direction) = &route.direction_id {
            if !group.directions.contains(direction) {
                group.directions.push(direction.clone());
            }
        }
    }
    groups.into_values().collect()
}

fn push_opt(fields: &mut Vec<BubbleField>, label: &'static str, value: Option<&str>) {
    if let Some(v) = value.filter(|v| !v.is_empty()) {
        fields.push(BubbleField::new(label, v));
    }
}

fn note_field(note: Option<&str>, author: Option<&str>) -> Option<BubbleField> {
    let note = note.filter(|n| !n.is_empty())?;
    let mut field = BubbleField::new("Note", note);
    field.annotation = author.filter(|a| !a.is_empty()).map(|a| format!("by {a}"));
    Some(field)
}

#[must_use]
pub fn build_bubble(record: &StopRecord, side: StopSide) -> Bubble {
    let mut fields = Vec::new();
    match side {
        StopSide::Atlas => {
            push_opt(&mut fields, "SLOID", record.sloid.as_deref());
            push_opt(&mut fields, "UIC", record.uic_ref.as_deref());
            push_opt(&mut fields, "Official name", record.atlas_designation_official.as_deref());
            push_opt(&mut fields, "Local ref", record.atlas_designation.as_deref());
            if let Some(op) = record.atlas_business_org_abbr.as_deref().filter(|o| !o.is_empty()) {
                let mut field = BubbleField::new("Operator", op);
                if record.operator_mismatch() {
                    field.annotation = record.osm_operator.as_ref().map(|o| format!("OSM says {o}"));
                }
                fields.push(field);
            }
            push_opt(&mut fields, "Duplicate of", record.atlas_duplicate_sloid.as_deref());
        }
        StopSide::Osm => {
            if let Some(node) = record.osm_node_id.as_deref().filter(|n| !n.is_empty()) {
                let mut field = BubbleField::new("Node", node);
                field.link = Some(format!("https://www.openstreetmap.org/node/{node}"));
                fields.push(field);
            }
            push_opt(&mut fields, "Name", record.osm_name.as_deref());
            push_opt(&mut fields, "Local ref", record.osm_local_ref.as_deref());
            if let Some(op) = record.osm_operator.as_deref().filter(|o| !o.is_empty()) {
                let mut field = BubbleField::new("Operator", op);
                if record.operator_mismatch() {
                    field.annotation = record.atlas_business_org_abbr.as_ref().map(|a| format!("ATLAS says {a}"));
                }
                fields.push(field);
            }
            push_opt(&mut fields, "Type", record.osm_public_transport.as_deref().or(record.osm_node_type.as_deref()));
        }
    }

    if let Some(p) = record.position(side) {
        fields.push(BubbleField::new("Coordinates", format!("{:.6}, {:.6}", p.lat, p.lon)));
    }
    if record.is_matched() {
        if let Some(d) = record.distance_m {
            fields.push(BubbleField::new("Distance", format!("{d:.1} m")));
        }
        push_opt(&mut fields, "Match method", record.match_type.as_deref());
    }
    let note = match side {
        StopSide::Atlas => note_field(record.atlas_note.as_deref(), record.atlas_note_author.as_deref()),
        StopSide::Osm => note_field(record.osm_note.as_deref(), record.osm_note_author.as_deref()),
    };
    fields.extend(note);

    let name = record.name(side);
    let title = if name.is_empty() {
        format!("{} entry", side.display_name())
    } else {
        format!("{}: {name}", side.display_name())
    };

    Bubble { side, stop_id: record.id, title, fields, routes: group_routes(record.routes(side)) }
}

fn side_identifier(record: &StopRecord, side: StopSide) -> Option<&str> {
    match side {
        StopSide::Atlas => record.sloid.as_deref(),
        StopSide::Osm => record.osm_node_id.as_deref(),
    }
}

/// Bubbles for a popup. The initial view holds the clicked side only; the
/// unified view holds both sides and every correlated record, each dataset
/// entry shown once.
#[must_use]
pub fn build_bubbles(record: &StopRecord, view: PopupView) -> Vec<Bubble> {
    match view {
        PopupView::Initial(side) => {
            let side = if record.sides().contains(&side) { Some(side) } else { record.sides().first().copied() };
            side.map(|s| build_bubble(record, s)).into_iter().collect()
        }
        PopupView::Unified => {
            let mut seen: Vec<(StopSide, String)> = Vec::new();
            let mut bubbles = Vec::new();
            for r in std::iter::once(record).chain(record.matches.iter()) {
                for side in r.sides() {
                    let identity = side_identifier(r, side).map_or_else(|| format!("#{}", r.id), str::to_string);
                    if seen.contains(&(side, identity.clone())) {
                        continue;
                    }
                    seen.push((side, identity));
                    bubbles.push(build_bubble(r, side));
                }
            }
            bubbles
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::StopKind;

    fn route(id: &str, dir: Option<&str>) -> RouteInfo {
        RouteInfo { route_id: id.to_string(), route_name: None, direction_id: dir.map(str::to_string) }
    }

    fn matched() -> StopRecord {
        StopRecord {
            id: 1,
            stop_type: StopKind::Matched,
            sloid: Some("ch:1:sloid:7000:1".to_string()),
            atlas_designation_official: Some("Bern".to_string()),
            atlas_business_org_abbr: Some("SBB".to_string()),
            atlas_lat: Some(46.948_8),
            atlas_lon: Some(7.439_1),
            osm_node_id: Some("42".to_string()),
            osm_name: Some("Bern Bahnhof".to_string()),
            osm_operator: Some("BLS".to_string()),
            osm_lat: Some(46.948_9),
            osm_lon: Some(7.439_2),
            distance_m: Some(12.34),
            match_type: Some("exact".to_string()),
            atlas_note: Some("checked on site".to_string()),
            atlas_note_author: Some("mk".to_string()),
            ..StopRecord::default()
        }
    }

    #[test]
    fn test_route_grouping_keeps_first_seen_order() {
        let routes = [route("R2", Some("0")), route("R1", Some("1")), route("R2", Some("1")), route("R2", Some("0")), route("R3", None)];
        let grouped = group_routes(&routes);
        assert_eq!(grouped.iter().map(|g| g.route_id.as_str()).collect::<Vec<_>>(), vec!["R2", "R1", "R3"]);
        assert_eq!(grouped[0].directions, vec!["0", "1"]);
        assert!(grouped[2].directions.is_empty());
    }

    #[test]
    fn test_atlas_bubble_fields() {
        let bubble = build_bubble(&matched(), StopSide::Atlas);
        assert_eq!(bubble.title, "ATLAS: Bern");
        let labels: Vec<&str> = bubble.fields.iter().map(|f| f.label).collect();
        assert_eq!(labels, vec!["SLOID", "Official name", "Operator", "Coordinates", "Distance", "Match method", "Note"]);

        let operator = &bubble.fields[2];
        assert_eq!(operator.annotation.as_deref(), Some("OSM says BLS"));
        assert_eq!(bubble.fields[4].value, "12.3 m");
        assert_eq!(bubble.fields[6].annotation.as_deref(), Some("by mk"));
    }

    #[test]
    fn test_osm_bubble_links_node() {
        let bubble = build_bubble(&matched(), StopSide::Osm);
        assert_eq!(bubble.fields[0].link.as_deref(), Some("https://www.openstreetmap.org/node/42"));
    }

    #[test]
    fn test_view_modes() {
        let mut record = matched();
        assert_eq!(build_bubbles(&record, PopupView::Initial(StopSide::Osm)).len(), 1);
        assert_eq!(build_bubbles(&record, PopupView::Unified).len(), 2);

        let mut other = matched();
        other.id = 2;
        other.osm_node_id = Some("43".to_string());
        record.matches = vec![other];
        let bubbles = build_bubbles(&record, PopupView::Unified);
        // Same ATLAS entry twice, two different OSM nodes
        assert_eq!(bubbles.len(), 3);
        assert_eq!(bubbles.iter().filter(|b| b.side == StopSide::Atlas).count(), 1);
    }

    #[test]
    fn test_initial_view_falls_back_to_available_side() {
        let record = StopRecord { id: 3, stop_type: StopKind::Osm, ..StopRecord::default() };
        let bubbles = build_bubbles(&record, PopupView::Initial(StopSide::Atlas));
        assert_eq!(bubbles.len(), 1);
        assert_eq!(bubbles[0].side, StopSide::Osm);
        assert_eq!(PopupView::Unified.toggle(StopSide::Atlas), PopupView::Initial(StopSide::Atlas));
    }
}
