use alloc::string::String;

use crate::{Flattened, Grid, Point, Rect, View, VisibleSet};

/// A scroll anchor that preserves visual position across data changes.
///
/// Typical use cases:
/// - chat/timeline "prepend" (load older messages above) without content jumping
/// - any reorder/replace where the viewport should stay on an item identity
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ScrollAnchor {
    /// Flattened identifier of the anchor item.
    pub identifier: String,
    /// The content offset minus the anchor item's origin.
    pub offset_in_viewport: Point,
}

/// The first visible item inside `region` that sits at its laid-out frame.
///
/// Pinned items move with the viewport, so they are skipped.
pub(crate) fn capture<V>(
    visible: &VisibleSet<V>,
    flat: &Flattened,
    region: Rect,
    content_offset: Point,
) -> Option<ScrollAnchor> {
    for (identifier, frame) in visible.identifiers().iter().zip(visible.frames()) {
        if !frame.intersects(&region) {
            continue;
        }
        let Some(laid_out) = flat.frame_of(identifier) else {
            continue;
        };
        if laid_out != *frame {
            continue;
        }
        return Some(ScrollAnchor {
            identifier: identifier.clone(),
            offset_in_viewport: content_offset - laid_out.origin,
        });
    }
    None
}

/// The content offset that puts the anchor item back where it was, before clamping.
pub(crate) fn target_offset(flat: &Flattened, anchor: &ScrollAnchor) -> Option<Point> {
    let frame = flat.frame_of(&anchor.identifier)?;
    Some(frame.origin + anchor.offset_in_viewport)
}

/// Captures an anchor for the first visible item (by identifier).
///
/// Returns `None` when nothing is visible.
pub fn capture_first_visible_anchor<V: View>(grid: &Grid<V>) -> Option<ScrollAnchor> {
    capture(
        grid.visible_set(),
        grid.flattened(),
        grid.visible_frame_less_inset(),
        grid.content_offset(),
    )
}

/// Applies a previously captured anchor by moving the content offset (clamped).
///
/// Returns `true` when the anchor item still exists.
pub fn apply_anchor<V: View>(grid: &mut Grid<V>, anchor: &ScrollAnchor) -> bool {
    let Some(target) = target_offset(grid.flattened(), anchor) else {
        return false;
    };
    let clamped = grid.clamp_content_offset(target);
    grid.set_content_offset(clamped);
    true
}
