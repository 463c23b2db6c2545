//! Rubber-band selection over the desktop surface.

use std::collections::BTreeSet;

use crate::{
    config::GridMetrics,
    grid::{cell_box, CellBox},
    model::{DesktopIcon, IconId, PointerPosition, SurfaceRect},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Normalized marquee rectangle in surface coordinates.
pub struct MarqueeRect {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

impl MarqueeRect {
    /// Spans two surface-space points, each clamped to the surface.
    pub fn from_points(a: PointerPosition, b: PointerPosition, surface: SurfaceRect) -> Self {
        let clamp_x = |x: i32| x.clamp(0, surface.w.max(0));
        let clamp_y = |y: i32| y.clamp(0, surface.h.max(0));
        let (ax, bx) = (clamp_x(a.x), clamp_x(b.x));
        let (ay, by) = (clamp_y(a.y), clamp_y(b.y));
        Self {
            left: ax.min(bx),
            top: ay.min(by),
            right: ax.max(bx),
            bottom: ay.max(by),
        }
    }

    pub fn width(self) -> i32 {
        self.right - self.left
    }

    pub fn height(self) -> i32 {
        self.bottom - self.top
    }

    /// Axis-aligned overlap; touching edges do not count.
    pub fn intersects(self, cell: CellBox) -> bool {
        cell.left < self.right
            && cell.right > self.left
            && cell.top < self.bottom
            && cell.bottom > self.top
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Live marquee gesture.
pub struct MarqueeSession {
    pub surface: SurfaceRect,
    /// Surface-space drag origin.
    pub origin: PointerPosition,
    /// Surface-space pointer.
    pub current: PointerPosition,
    /// Toggle mode (ctrl/cmd held at start).
    pub additive: bool,
    /// Selection when the gesture started.
    pub snapshot: BTreeSet<IconId>,
}

impl MarqueeSession {
    pub fn begin(
        pointer: PointerPosition,
        surface: SurfaceRect,
        additive: bool,
        selection: &BTreeSet<IconId>,
    ) -> Self {
        let origin = surface.local(pointer);
        Self {
            surface,
            origin,
            current: origin,
            additive,
            snapshot: selection.clone(),
        }
    }

    pub fn update(&mut self, pointer: PointerPosition) {
        self.current = self.surface.local(pointer);
    }

    pub fn rect(&self) -> MarqueeRect {
        MarqueeRect::from_points(self.origin, self.current, self.surface)
    }

    /// Too small in both dimensions to be anything but a click.
    pub fn is_click(&self, threshold_px: i32) -> bool {
        let rect = self.rect();
        rect.width() < threshold_px && rect.height() < threshold_px
    }

    /// Selection implied by the current rectangle.
    pub fn selection(
        &self,
        icons: &[DesktopIcon],
        metrics: &GridMetrics,
        threshold_px: i32,
    ) -> BTreeSet<IconId> {
        if self.is_click(threshold_px) {
            return self.snapshot.clone();
        }
        let hits = intersected_icons(icons, metrics, self.rect());
        merge_selection(&self.snapshot, &hits, self.additive)
    }
}

/// Icons whose cell box overlaps `rect`.
pub fn intersected_icons(
    icons: &[DesktopIcon],
    metrics: &GridMetrics,
    rect: MarqueeRect,
) -> BTreeSet<IconId> {
    icons
        .iter()
        .filter(|icon| rect.intersects(cell_box(metrics, icon.position)))
        .map(|icon| icon.id.clone())
        .collect()
}

/// Toggle mode flips membership of every hit; replace mode selects exactly the hits.
pub fn merge_selection(
    snapshot: &BTreeSet<IconId>,
    hits: &BTreeSet<IconId>,
    additive: bool,
) -> BTreeSet<IconId> {
    if additive {
        snapshot.symmetric_difference(hits).cloned().collect()
    } else {
        hits.clone()
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::model::{GridPosition, IconKind};

    const METRICS: GridMetrics = GridMetrics {
        cell_width: 100,
        cell_height: 100,
        padding: 0,
    };
    const SURFACE: SurfaceRect = SurfaceRect {
        x: 10,
        y: 20,
        w: 500,
        h: 400,
    };

    fn icon(id: &str, col: u32, row: u32) -> DesktopIcon {
        DesktopIcon {
            id: IconId::new(id),
            label: id.to_string(),
            icon: "i".to_string(),
            color: "c".to_string(),
            kind: IconKind::Prompt,
            position: GridPosition::new(col, row),
        }
    }

    fn ids(raw: &[&str]) -> BTreeSet<IconId> {
        raw.iter().map(|id| IconId::new(*id)).collect()
    }

    #[test]
    fn rect_is_normalized_and_clamped_to_surface() {
        let rect = MarqueeRect::from_points(
            PointerPosition::new(600, 50),
            PointerPosition::new(-20, 10),
            SURFACE,
        );
        assert_eq!(
            rect,
            MarqueeRect {
                left: 0,
                top: 10,
                right: 500,
                bottom: 50
            }
        );
    }

    #[test]
    fn touching_edges_do_not_intersect() {
        let rect = MarqueeRect {
            left: 0,
            top: 0,
            right: 100,
            bottom: 100,
        };
        assert!(!rect.intersects(cell_box(&METRICS, GridPosition::new(1, 0))));
        assert!(rect.intersects(cell_box(&METRICS, GridPosition::new(0, 0))));
    }

    #[test]
    fn replace_mode_selects_exactly_the_hits() {
        let icons = vec![icon("a", 0, 0), icon("b", 1, 0), icon("c", 3, 3)];
        let mut session = MarqueeSession::begin(
            PointerPosition::new(15, 25),
            SURFACE,
            false,
            &ids(&["c"]),
        );
        session.update(PointerPosition::new(160, 70));

        assert_eq!(session.selection(&icons, &METRICS, 5), ids(&["a", "b"]));
    }

    #[test]
    fn toggle_mode_is_symmetric_difference_and_self_inverse() {
        let icons = vec![icon("a", 0, 0), icon("b", 1, 0), icon("c", 3, 3)];
        let start = ids(&["a", "c"]);

        let mut first = MarqueeSession::begin(PointerPosition::new(15, 25), SURFACE, true, &start);
        first.update(PointerPosition::new(160, 70));
        let after_first = first.selection(&icons, &METRICS, 5);
        assert_eq!(after_first, ids(&["b", "c"]));

        let mut second =
            MarqueeSession::begin(PointerPosition::new(15, 25), SURFACE, true, &after_first);
        second.update(PointerPosition::new(160, 70));
        assert_eq!(second.selection(&icons, &METRICS, 5), start);
    }

    #[test]
    fn click_sized_marquee_keeps_snapshot() {
        let icons = vec![icon("a", 0, 0)];
        let mut session = MarqueeSession::begin(
            PointerPosition::new(20, 30),
            SURFACE,
            false,
            &ids(&["z"]),
        );
        session.update(PointerPosition::new(24, 34));

        assert!(session.is_click(5));
        assert_eq!(session.selection(&icons, &METRICS, 5), ids(&["z"]));
    }
}
