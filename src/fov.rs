//! # Field of View
//!
//! Recursive shadowcasting visibility computation.
//!
//! The map is divided into 8 octants around the observer and each octant
//! is scanned row by row, tracking the slopes of shadows cast by opaque
//! cells. This catches corners that simple raycasting misses and touches
//! only cells that are potentially visible.
//!
//! The [`FovMap`] is an acceleration structure derived from tile
//! transparency. It is never persisted; after loading a saved game it is
//! rebuilt from the tile grid and recomputed at the player's position.

/// Per-cell transparency map plus the current-frame visible set.
#[derive(Debug, Clone, Default)]
pub struct FovMap {
    width: i32,
    height: i32,
    transparent: Vec<bool>,
    visible: Vec<bool>,
}

impl FovMap {
    /// Creates a map of the given size with every cell opaque.
    pub fn new(width: i32, height: i32) -> Self {
        let len = (width.max(0) * height.max(0)) as usize;
        Self {
            width,
            height,
            transparent: vec![false; len],
            visible: vec![false; len],
        }
    }

    fn idx(&self, x: i32, y: i32) -> usize {
        (y * self.width + x) as usize
    }

    /// Whether the coordinate lies inside the map.
    pub fn in_bounds(&self, x: i32, y: i32) -> bool {
        x >= 0 && y >= 0 && x < self.width && y < self.height
    }

    /// Sets whether light passes through the cell.
    pub fn set_transparent(&mut self, x: i32, y: i32, transparent: bool) {
        let idx = self.idx(x, y);
        self.transparent[idx] = transparent;
    }

    /// Whether light passes through the cell. Out-of-bounds cells are opaque.
    pub fn is_transparent(&self, x: i32, y: i32) -> bool {
        self.in_bounds(x, y) && self.transparent[self.idx(x, y)]
    }

    /// Whether the cell was visible in the most recent [`compute`](Self::compute).
    pub fn is_visible(&self, x: i32, y: i32) -> bool {
        self.in_bounds(x, y) && self.visible[self.idx(x, y)]
    }

    /// Computes the set of cells visible from `(origin_x, origin_y)`.
    ///
    /// Cells farther than `radius` are never visible. Opaque cells are
    /// included only when `light_walls` is set. The origin itself is
    /// always visible. Calling this twice with identical inputs and an
    /// unchanged transparency map yields an identical visible set.
    pub fn compute(&mut self, origin_x: i32, origin_y: i32, radius: i32, light_walls: bool) {
        for cell in self.visible.iter_mut() {
            *cell = false;
        }

        if !self.in_bounds(origin_x, origin_y) {
            return;
        }
        let origin_idx = self.idx(origin_x, origin_y);
        self.visible[origin_idx] = true;

        for octant in 0..8 {
            self.cast_light(origin_x, origin_y, radius, light_walls, 1, 1.0, 0.0, octant);
        }
    }

    /// Scans one octant from `row` outward between `start_slope` and
    /// `end_slope`, recursing past each opaque run.
    #[allow(clippy::too_many_arguments)]
    fn cast_light(
        &mut self,
        origin_x: i32,
        origin_y: i32,
        radius: i32,
        light_walls: bool,
        row: i32,
        mut start_slope: f64,
        end_slope: f64,
        octant: u8,
    ) {
        if start_slope < end_slope || row > radius {
            return;
        }

        let mut prev_blocked = false;
        let mut saved_start_slope = start_slope;

        let min_col = (row as f64 * end_slope).floor() as i32;
        let max_col = (row as f64 * start_slope).ceil() as i32;

        for col in (min_col..=max_col).rev() {
            let (dx, dy) = octant_transform(octant, row, col);
            let x = origin_x + dx;
            let y = origin_y + dy;

            if dx * dx + dy * dy > radius * radius {
                continue;
            }

            let left_slope = (col as f64 + 0.5) / (row as f64 - 0.5);
            let right_slope = (col as f64 - 0.5) / (row as f64 + 0.5);

            if right_slope > start_slope {
                continue;
            }
            if left_slope < end_slope {
                break;
            }

            let blocked = !self.is_transparent(x, y);

            if self.in_bounds(x, y) && (!blocked || light_walls) {
                let idx = self.idx(x, y);
                self.visible[idx] = true;
            }

            if prev_blocked {
                if blocked {
                    saved_start_slope = right_slope;
                } else {
                    prev_blocked = false;
                    start_slope = saved_start_slope;
                }
            } else if blocked {
                prev_blocked = true;
                self.cast_light(
                    origin_x,
                    origin_y,
                    radius,
                    light_walls,
                    row + 1,
                    start_slope,
                    left_slope,
                    octant,
                );
                saved_start_slope = right_slope;
            }
        }

        if !prev_blocked {
            self.cast_light(
                origin_x,
                origin_y,
                radius,
                light_walls,
                row + 1,
                start_slope,
                end_slope,
                octant,
            );
        }
    }

    /// Snapshot of the currently visible cells, for comparison in tests.
    pub fn visible_cells(&self) -> Vec<(i32, i32)> {
        let mut cells = Vec::new();
        for y in 0..self.height {
            for x in 0..self.width {
                if self.visible[self.idx(x, y)] {
                    cells.push((x, y));
                }
            }
        }
        cells
    }
}

/// Maps octant-local (row, col) to a world-space delta.
///
/// Octants are numbered 0-7 clockwise from north-northwest.
#[inline]
fn octant_transform(octant: u8, row: i32, col: i32) -> (i32, i32) {
    match octant {
        0 => (-col, -row),
        1 => (-row, -col),
        2 => (-row, col),
        3 => (col, -row),
        4 => (col, row),
        5 => (row, col),
        6 => (row, -col),
        7 => (-col, row),
        _ => unreachable!("octant out of range"),
    }
}
