use crate::constants::{
    POPUP_DEFAULT_OFFSET, POPUP_HANDLE_HEIGHT, POPUP_MIN_HEIGHT, POPUP_MIN_WIDTH, POPUP_MULTI_BUBBLE_MAX_WIDTH,
    POPUP_RESIZE_MARGIN, POPUP_SINGLE_BUBBLE_MAX_WIDTH,
};

bitflags::bitflags! {
    /// Edges moved by a resize; corners are two edges combined
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ResizeEdge: u8 {
        const NORTH = 0b0001;
        const SOUTH = 0b0010;
        const EAST  = 0b0100;
        const WEST  = 0b1000;
    }
}

impl ResizeEdge {
    /// CSS cursor for hovering this edge
    #[must_use]
    pub fn cursor(self) -> &'static str {
        let ns = self.intersection(Self::NORTH | Self::SOUTH);
        let ew = self.intersection(Self::EAST | Self::WEST);
        match (ns, ew) {
            (n, e) if n == Self::NORTH && e == Self::EAST => "nesw-resize",
            (s, w) if s == Self::SOUTH && w == Self::WEST => "nesw-resize",
            (n, w) if n == Self::NORTH && w == Self::WEST => "nwse-resize",
            (s, e) if s == Self::SOUTH && e == Self::EAST => "nwse-resize",
            (ns, _) if !ns.is_empty() => "ns-resize",
            (_, ew) if !ew.is_empty() => "ew-resize",
            _ => "default",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    #[must_use]
    pub fn contains(&self, p: (f64, f64)) -> bool {
        p.0 >= self.x && p.0 <= self.x + self.width && p.1 >= self.y && p.1 <= self.y + self.height
    }
}

/// Drag handle across the top of a popup `width` wide. It is inset by the
/// resize margin so the top edge and corners stay resizable.
#[must_use]
pub fn drag_handle_rect(width: f64) -> Rect {
    let m = POPUP_RESIZE_MARGIN;
    Rect { x: m, y: m, width: (width - 2.0 * m).max(0.0), height: (POPUP_HANDLE_HEIGHT - m).max(0.0) }
}

/// Which edges a pointer at `p` would resize. Empty when the pointer is not
/// within the margin band of the content box or sits on the drag handle.
#[must_use]
pub fn resize_edge_at(p: (f64, f64), content: Rect, handle: Rect) -> ResizeEdge {
    if handle.contains(p) {
        return ResizeEdge::empty();
    }
    let m = POPUP_RESIZE_MARGIN;
    let outer = Rect { x: content.x - m, y: content.y - m, width: content.width + 2.0 * m, height: content.height + 2.0 * m };
    if !outer.contains(p) {
        return ResizeEdge::empty();
    }

    let mut edge = ResizeEdge::empty();
    if (p.1 - content.y).abs() <= m {
        edge |= ResizeEdge::NORTH;
    } else if (p.1 - (content.y + content.height)).abs() <= m {
        edge |= ResizeEdge::SOUTH;
    }
    if (p.0 - content.x).abs() <= m {
        edge |= ResizeEdge::WEST;
    } else if (p.0 - (content.x + content.width)).abs() <= m {
        edge |= ResizeEdge::EAST;
    }
    edge
}

/// Widest useful popup for the number of bubbles shown
#[must_use]
pub fn max_width_for_bubbles(bubbles: usize) -> f64 {
    if bubbles <= 1 { POPUP_SINGLE_BUBBLE_MAX_WIDTH } else { POPUP_MULTI_BUBBLE_MAX_WIDTH }
}

#[must_use]
pub fn clamp_width(width: f64, bubbles: usize) -> f64 {
    width.clamp(POPUP_MIN_WIDTH, max_width_for_bubbles(bubbles))
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Interaction {
    Idle,
    Dragging {
        last: (f64, f64),
    },
    Resizing {
        edge: ResizeEdge,
        start_pointer: (f64, f64),
        start_offset: (f64, f64),
        start_size: (f64, f64),
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InteractionError {
    /// Another drag or resize is in progress
    Busy,
    /// Resize requested without an edge
    NoEdge,
}

/// Screen-space state of one floating popup, independent of the DOM.
///
/// The panel sits at `anchor + offset`. Width is pinned once the user resizes
/// horizontally; height only holds a value while a vertical resize is active
/// and otherwise follows the content.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PopupGeometry {
    offset: (f64, f64),
    width: Option<f64>,
    height: Option<f64>,
    content_size: (f64, f64),
    bubbles: usize,
    interaction: Interaction,
}

impl PopupGeometry {
    #[must_use]
    pub fn new(bubbles: usize) -> Self {
        Self {
            offset: POPUP_DEFAULT_OFFSET,
            width: None,
            height: None,
            content_size: (POPUP_MIN_WIDTH, POPUP_MIN_HEIGHT),
            bubbles,
            interaction: Interaction::Idle,
        }
    }

    #[must_use]
    pub fn offset(&self) -> (f64, f64) {
        self.offset
    }

    #[must_use]
    pub fn pinned_width(&self) -> Option<f64> {
        self.width
    }

    #[must_use]
    pub fn explicit_height(&self) -> Option<f64> {
        self.height
    }

    #[must_use]
    pub fn interaction(&self) -> Interaction {
        self.interaction
    }

    #[must_use]
    pub fn is_idle(&self) -> bool {
        self.interaction == Interaction::Idle
    }

    #[must_use]
    pub fn max_width(&self) -> f64 {
        max_width_for_bubbles(self.bubbles)
    }

    /// Current panel size
    #[must_use]
    pub fn size(&self) -> (f64, f64) {
        (
            self.width.unwrap_or_else(|| clamp_width(self.content_size.0, self.bubbles)),
            self.height.unwrap_or(self.content_size.1),
        )
    }

    /// Natural size as measured after the last render
    pub fn set_content_size(&mut self, width: f64, height: f64) {
        self.content_size = (width, height.max(POPUP_MIN_HEIGHT));
    }

    #[must_use]
    pub fn panel_rect(&self, anchor: (f64, f64)) -> Rect {
        let (width, height) = self.size();
        Rect { x: anchor.0 + self.offset.0, y: anchor.1 + self.offset.1, width, height }
    }

    /// Point where the connector line meets the panel (bottom centre)
    #[must_use]
    pub fn tip(&self, anchor: (f64, f64)) -> (f64, f64) {
        let rect = self.panel_rect(anchor);
        (rect.x + rect.width / 2.0, rect.y + rect.height)
    }

    /// # Errors
    ///
    /// `Busy` while a resize is active.
    pub fn begin_drag(&mut self, pointer: (f64, f64)) -> Result<(), InteractionError> {
        if !self.is_idle() {
            return Err(InteractionError::Busy);
        }
        self.interaction = Interaction::Dragging { last: pointer };
        Ok(())
    }

    /// # Errors
    ///
    /// `Busy` while a drag is active, `NoEdge` for an empty edge set.
    pub fn begin_resize(&mut self, edge: ResizeEdge, pointer: (f64, f64)) -> Result<(), InteractionError> {
        if !self.is_idle() {
            return Err(InteractionError::Busy);
        }
        if edge.is_empty() {
            return Err(InteractionError::NoEdge);
        }
        self.interaction = Interaction::Resizing {
            edge,
            start_pointer: pointer,
            start_offset: self.offset,
            start_size: self.size(),
        };
        Ok(())
    }

    pub fn pointer_move(&mut self, pointer: (f64, f64)) {
        match self.interaction {
            Interaction::Idle => {}
            Interaction::Dragging { last } => {
                self.offset.0 += pointer.0 - last.0;
                self.offset.1 += pointer.1 - last.1;
                self.interaction = Interaction::Dragging { last: pointer };
            }
            Interaction::Resizing { edge, start_pointer, start_offset, start_size } => {
                let dx = pointer.0 - start_pointer.0;
                let dy = pointer.1 - start_pointer.1;

                if edge.intersects(ResizeEdge::EAST | ResizeEdge::WEST) {
                    let requested = if edge.contains(ResizeEdge::WEST) { start_size.0 - dx } else { start_size.0 + dx };
                    let width = clamp_width(requested, self.bubbles);
                    if edge.contains(ResizeEdge::WEST) {
                        self.offset.0 = start_offset.0 + (start_size.0 - width);
                    }
                    self.width = Some(width);
                }
                if edge.intersects(ResizeEdge::NORTH | ResizeEdge::SOUTH) {
                    let requested = if edge.contains(ResizeEdge::NORTH) { start_size.1 - dy } else { start_size.1 + dy };
                    let height = requested.max(POPUP_MIN_HEIGHT);
                    if edge.contains(ResizeEdge::NORTH) {
                        self.offset.1 = start_offset.1 + (start_size.1 - height);
                    }
                    self.height = Some(height);
                }
            }
        }
    }

    /// Finishes any drag or resize. Height goes back to following the content
    /// while a resized width stays pinned.
    pub fn end_interaction(&mut self) {
        if self.is_idle() {
            return;
        }
        self.interaction = Interaction::Idle;
        self.height = None;
    }

    /// Content changed between single and multi bubble layouts
    pub fn invalidate_layout(&mut self, bubbles: usize) {
        self.bubbles = bubbles;
        self.width = self.width.map(|w| clamp_width(w, bubbles));
        self.height = None;
    }
}
