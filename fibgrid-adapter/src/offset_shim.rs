use fibgrid::{Point, Size};

/// What a shim may look at when deciding whether to correct a content offset.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct OffsetContext {
    pub min: Point,
    pub max: Point,
    pub content_size: Size,
    pub viewport: Size,
    /// The user's finger (or pointer) is still driving the scroll container.
    pub is_tracking: bool,
}

/// A platform hook that corrects content offsets the native scroll container reports or
/// applies incorrectly.
///
/// The contract is narrow: given a proposed offset, return the offset to use instead, or
/// `None` to keep it. Implementations are per platform and must be pure.
pub trait ContentOffsetShim {
    fn adjust(&self, proposed: Point, context: &OffsetContext) -> Option<Point>;
}

/// Leaves every offset alone.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct NoShim;

impl ContentOffsetShim for NoShim {
    fn adjust(&self, _proposed: Point, _context: &OffsetContext) -> Option<Point> {
        None
    }
}

/// Clamps offsets into `[min, max]` once the user lets go.
///
/// While tracking, overscroll is kept so the platform can rubber-band.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ClampingShim;

impl ContentOffsetShim for ClampingShim {
    fn adjust(&self, proposed: Point, context: &OffsetContext) -> Option<Point> {
        if context.is_tracking {
            return None;
        }
        let clamped = Point::new(
            proposed.x.clamp(context.min.x, context.max.x),
            proposed.y.clamp(context.min.y, context.max.y),
        );
        (clamped != proposed).then_some(clamped)
    }
}
