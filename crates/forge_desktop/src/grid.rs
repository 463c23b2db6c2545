//! Grid geometry and icon placement used by the desktop reducer.
//!
//! Positions are cell addresses; pixel geometry is derived from [`GridMetrics`]. All searches walk
//! cells column-major so new icons fill the left edge top-down first.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::{
    config::GridMetrics,
    model::{DesktopIcon, GridPosition, IconId, IconKind},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
/// Visible grid size in cells. Both dimensions are at least one.
pub struct GridBounds {
    /// Visible columns.
    pub cols: u32,
    /// Visible rows.
    pub rows: u32,
}

impl GridBounds {
    /// Creates bounds, clamping each dimension to at least one cell.
    pub fn new(cols: u32, rows: u32) -> Self {
        Self {
            cols: cols.max(1),
            rows: rows.max(1),
        }
    }

    /// Number of whole cells that fit a viewport of `width` x `height` px.
    pub fn from_viewport(metrics: &GridMetrics, width: i32, height: i32) -> Self {
        let usable_w = (width - 2 * metrics.padding).max(0);
        let usable_h = (height - 2 * metrics.padding).max(0);
        Self::new(
            (usable_w / metrics.cell_width) as u32,
            (usable_h / metrics.cell_height) as u32,
        )
    }

    /// Largest visible column index.
    pub fn max_col(self) -> u32 {
        self.cols - 1
    }

    /// Largest visible row index.
    pub fn max_row(self) -> u32 {
        self.rows - 1
    }

    /// Whether `pos` is visible.
    pub fn contains(self, pos: GridPosition) -> bool {
        pos.col < self.cols && pos.row < self.rows
    }

    /// Nearest visible cell to `pos`.
    pub fn clamp(self, pos: GridPosition) -> GridPosition {
        GridPosition::new(pos.col.min(self.max_col()), pos.row.min(self.max_row()))
    }

    /// Visible cells in column-major order.
    pub fn cells(self) -> impl Iterator<Item = GridPosition> {
        let rows = self.rows;
        (0..self.cols).flat_map(move |col| (0..rows).map(move |row| GridPosition::new(col, row)))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Pixel box of a cell in surface coordinates; `right`/`bottom` are exclusive.
pub struct CellBox {
    /// Left edge.
    pub left: i32,
    /// Top edge.
    pub top: i32,
    /// Right edge.
    pub right: i32,
    /// Bottom edge.
    pub bottom: i32,
}

impl CellBox {
    /// Whether a surface-space point falls inside the box.
    pub fn contains(self, x: i32, y: i32) -> bool {
        x >= self.left && x < self.right && y >= self.top && y < self.bottom
    }
}

/// Pixel box of `pos`.
pub fn cell_box(metrics: &GridMetrics, pos: GridPosition) -> CellBox {
    let left = metrics.padding + pos.col as i32 * metrics.cell_width;
    let top = metrics.padding + pos.row as i32 * metrics.cell_height;
    CellBox {
        left,
        top,
        right: left + metrics.cell_width,
        bottom: top + metrics.cell_height,
    }
}

/// Cell whose origin is nearest to an icon drawn with its top-left corner at (`x`, `y`),
/// clamped to `bounds`.
pub fn cell_at_point(metrics: &GridMetrics, bounds: GridBounds, x: i32, y: i32) -> GridPosition {
    let col = (x - metrics.padding + metrics.cell_width / 2).div_euclid(metrics.cell_width);
    let row = (y - metrics.padding + metrics.cell_height / 2).div_euclid(metrics.cell_height);
    GridPosition::new(
        (col.max(0) as u32).min(bounds.max_col()),
        (row.max(0) as u32).min(bounds.max_row()),
    )
}

/// Topmost icon under a surface-space point. Later icons paint over earlier ones.
pub fn hit_test<'a>(
    icons: &'a [DesktopIcon],
    metrics: &GridMetrics,
    x: i32,
    y: i32,
) -> Option<&'a DesktopIcon> {
    icons
        .iter()
        .rev()
        .find(|icon| cell_box(metrics, icon.position).contains(x, y))
}

/// Whether any icon other than `ignore` sits on `pos`.
pub fn is_occupied(icons: &[DesktopIcon], pos: GridPosition, ignore: Option<&IconId>) -> bool {
    icons
        .iter()
        .any(|icon| icon.position == pos && Some(&icon.id) != ignore)
}

fn occupied_cells(icons: &[DesktopIcon]) -> BTreeSet<GridPosition> {
    icons.iter().map(|icon| icon.position).collect()
}

/// First free visible cell in column-major order.
pub fn first_free_cell(icons: &[DesktopIcon], bounds: GridBounds) -> Option<GridPosition> {
    let occupied = occupied_cells(icons);
    bounds.cells().find(|cell| !occupied.contains(cell))
}

/// Free visible cell closest to `target` (euclidean), ties broken column-major.
pub fn nearest_free_cell(
    occupied: &BTreeSet<GridPosition>,
    bounds: GridBounds,
    target: GridPosition,
) -> Option<GridPosition> {
    bounds
        .cells()
        .filter(|cell| !occupied.contains(cell))
        .min_by_key(|cell| {
            let dc = i64::from(cell.col) - i64::from(target.col);
            let dr = i64::from(cell.row) - i64::from(target.row);
            (dc * dc + dr * dr, *cell)
        })
}

/// Cell just right of the visible grid that no other off-grid icon uses.
pub fn off_grid_cell(icons: &[DesktopIcon], bounds: GridBounds) -> GridPosition {
    let occupied = occupied_cells(icons);
    (0..)
        .map(|row| GridPosition::new(bounds.cols, row))
        .find(|cell| !occupied.contains(cell))
        .unwrap_or(GridPosition::new(bounds.cols, 0))
}

/// Preferred cell when it is visible and free, otherwise the first free cell, otherwise an
/// off-grid cell. The flag is `true` for off-grid placement.
pub fn place_new_icon(
    icons: &[DesktopIcon],
    bounds: GridBounds,
    preferred: Option<GridPosition>,
) -> (GridPosition, bool) {
    if let Some(pos) = preferred {
        if bounds.contains(pos) && !is_occupied(icons, pos, None) {
            return (pos, false);
        }
    }
    match first_free_cell(icons, bounds) {
        Some(pos) => (pos, false),
        None => (off_grid_cell(icons, bounds), true),
    }
}

/// Moves every icon outside `bounds` to the nearest free visible cell. When the grid is full the
/// icon is clamped onto the edge even if that cell is taken. Returns the moved icon ids.
pub fn reclamp(icons: &mut [DesktopIcon], bounds: GridBounds) -> Vec<IconId> {
    let mut occupied: BTreeSet<GridPosition> = icons
        .iter()
        .map(|icon| icon.position)
        .filter(|pos| bounds.contains(*pos))
        .collect();
    let mut moved = Vec::new();
    for icon in icons.iter_mut() {
        if bounds.contains(icon.position) {
            continue;
        }
        let target = bounds.clamp(icon.position);
        let cell = nearest_free_cell(&occupied, bounds, target).unwrap_or(target);
        occupied.insert(cell);
        icon.position = cell;
        moved.push(icon.id.clone());
    }
    moved
}

/// [`reclamp`] plus separation of icons that share a cell; the first icon keeps the cell.
pub fn settle_positions(icons: &mut [DesktopIcon], bounds: GridBounds) -> Vec<IconId> {
    let mut moved = reclamp(icons, bounds);
    let mut occupied = BTreeSet::new();
    let mut collided = Vec::new();
    for (idx, icon) in icons.iter().enumerate() {
        if !occupied.insert(icon.position) {
            collided.push(idx);
        }
    }
    for idx in collided {
        let target = icons[idx].position;
        if let Some(cell) = nearest_free_cell(&occupied, bounds, target) {
            occupied.insert(cell);
            icons[idx].position = cell;
            moved.push(icons[idx].id.clone());
        }
    }
    moved
}

/// Lays icons out column-major: system icons first in their current order, then folders and
/// prompts by label. Icons that do not fit go off-grid.
pub fn arrange(icons: &mut [DesktopIcon], bounds: GridBounds) {
    let mut order: Vec<usize> = (0..icons.len()).collect();
    order.sort_by(|&a, &b| {
        let (left, right) = (&icons[a], &icons[b]);
        kind_rank(left.kind)
            .cmp(&kind_rank(right.kind))
            .then_with(|| {
                if left.is_system() {
                    a.cmp(&b)
                } else {
                    let left_label = left.label.to_lowercase();
                    left_label
                        .cmp(&right.label.to_lowercase())
                        .then_with(|| left.id.cmp(&right.id))
                }
            })
    });
    let mut cells = bounds.cells();
    let mut overflow_row = 0;
    for idx in order {
        icons[idx].position = match cells.next() {
            Some(cell) => cell,
            None => {
                overflow_row += 1;
                GridPosition::new(bounds.cols, overflow_row - 1)
            }
        };
    }
}

fn kind_rank(kind: IconKind) -> u8 {
    match kind {
        IconKind::System => 0,
        IconKind::Folder => 1,
        IconKind::Prompt => 2,
    }
}
