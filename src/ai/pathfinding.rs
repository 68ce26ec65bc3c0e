//! A* pathfinding on the world's tile grid
//!
//! The grid owns per-tile walkability and the affine mapping between tile
//! coordinates and world positions. `find_path` runs a fresh search on every
//! call: the grid is mutated between calls (editor edits, new obstacles), so
//! no incremental state is kept.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use glam::{IVec2, Vec2};
use rustc_hash::FxHashMap;
use smallvec::SmallVec;

/// A 2D navigation grid
#[derive(Debug, Clone)]
pub struct Grid {
    /// Width in tiles
    width: i32,
    /// Height in tiles
    height: i32,
    /// Tile size in world units
    tile_size: f32,
    /// Walkable tiles (true = walkable)
    cells: Vec<bool>,
    /// World origin offset
    origin: Vec2,
}

impl Grid {
    /// Create a new grid (all tiles walkable by default)
    #[must_use]
    pub fn new(width: i32, height: i32, tile_size: f32) -> Self {
        Self::with_origin(width, height, tile_size, Vec2::ZERO)
    }

    /// Create a new grid with a world origin offset
    #[must_use]
    pub fn with_origin(width: i32, height: i32, tile_size: f32, origin: Vec2) -> Self {
        let width = width.max(0);
        let height = height.max(0);
        Self {
            width,
            height,
            tile_size,
            cells: vec![true; (width * height) as usize],
            origin,
        }
    }

    /// Width in tiles
    #[must_use]
    pub fn width(&self) -> i32 {
        self.width
    }

    /// Height in tiles
    #[must_use]
    pub fn height(&self) -> i32 {
        self.height
    }

    /// Tile edge length in world units
    #[must_use]
    pub fn tile_size(&self) -> f32 {
        self.tile_size
    }

    /// World-space origin of tile (0, 0)
    #[must_use]
    pub fn origin(&self) -> Vec2 {
        self.origin
    }

    fn index(&self, coord: IVec2) -> usize {
        (coord.y * self.width + coord.x) as usize
    }

    /// Check whether a coordinate lies inside the grid
    #[must_use]
    pub fn is_valid_coord(&self, coord: IVec2) -> bool {
        coord.x >= 0 && coord.x < self.width && coord.y >= 0 && coord.y < self.height
    }

    /// Check if a tile is walkable. Out-of-range coordinates are not.
    #[must_use]
    pub fn is_walkable(&self, coord: IVec2) -> bool {
        self.is_valid_coord(coord) && self.cells[self.index(coord)]
    }

    /// Set a tile's walkability. Out-of-range coordinates are ignored.
    pub fn set_walkable(&mut self, coord: IVec2, walkable: bool) {
        if self.is_valid_coord(coord) {
            let index = self.index(coord);
            self.cells[index] = walkable;
        }
    }

    /// Convert a world position to the tile coordinate containing it
    #[must_use]
    pub fn position_to_tile(&self, position: Vec2) -> IVec2 {
        let local = (position - self.origin) / self.tile_size;
        IVec2::new(local.x.floor() as i32, local.y.floor() as i32)
    }

    /// Convert a tile coordinate to the world position of its center
    #[must_use]
    pub fn tile_to_position(&self, coord: IVec2) -> Vec2 {
        self.origin + (coord.as_vec2() + Vec2::splat(0.5)) * self.tile_size
    }

    /// Walkable neighbors of a tile (4-directional)
    fn neighbors(&self, coord: IVec2) -> SmallVec<[IVec2; 4]> {
        const DIRECTIONS: [IVec2; 4] = [
            IVec2::new(0, -1),
            IVec2::new(0, 1),
            IVec2::new(-1, 0),
            IVec2::new(1, 0),
        ];

        let mut result = SmallVec::new();
        for d in DIRECTIONS {
            let next = coord + d;
            if self.is_walkable(next) {
                result.push(next);
            }
        }
        result
    }
}

/// A* node for the priority queue.
///
/// Ordered so the heap pops the lowest `f` first, with ties broken by
/// insertion order (first pushed wins).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Node {
    coord: IVec2,
    g_cost: u32,
    f_cost: u32,
    sequence: u32,
}

impl Ord for Node {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse for min-heap
        other
            .f_cost
            .cmp(&self.f_cost)
            .then_with(|| other.sequence.cmp(&self.sequence))
    }
}

impl PartialOrd for Node {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

fn heuristic(from: IVec2, to: IVec2) -> u32 {
    ((from.x - to.x).abs() + (from.y - to.y).abs()) as u32
}

/// Find a tile path using A* with unit step costs and a Manhattan heuristic.
///
/// The returned sequence starts at `start` and ends at `goal`. An empty
/// vector means the goal is unreachable or an endpoint is invalid; callers
/// treat that as "cannot proceed" and fall back to a default behavior.
#[must_use]
pub fn find_path(grid: &Grid, start: IVec2, goal: IVec2) -> Vec<IVec2> {
    if !grid.is_walkable(start) || !grid.is_walkable(goal) {
        return Vec::new();
    }

    let mut open_set = BinaryHeap::new();
    let mut came_from: FxHashMap<IVec2, IVec2> = FxHashMap::default();
    let mut g_score: FxHashMap<IVec2, u32> = FxHashMap::default();
    let mut sequence = 0u32;

    g_score.insert(start, 0);
    open_set.push(Node {
        coord: start,
        g_cost: 0,
        f_cost: heuristic(start, goal),
        sequence,
    });

    while let Some(current) = open_set.pop() {
        if current.coord == goal {
            // Reconstruct path back to the start tile
            let mut path = vec![goal];
            let mut coord = goal;
            while let Some(&previous) = came_from.get(&coord) {
                path.push(previous);
                coord = previous;
            }
            path.reverse();
            return path;
        }

        // Stale heap entry superseded by a cheaper route
        if g_score.get(&current.coord).is_some_and(|&g| g < current.g_cost) {
            continue;
        }

        for neighbor in grid.neighbors(current.coord) {
            let tentative_g = current.g_cost + 1;
            if tentative_g < g_score.get(&neighbor).copied().unwrap_or(u32::MAX) {
                came_from.insert(neighbor, current.coord);
                g_score.insert(neighbor, tentative_g);
                sequence += 1;
                open_set.push(Node {
                    coord: neighbor,
                    g_cost: tentative_g,
                    f_cost: tentative_g + heuristic(neighbor, goal),
                    sequence,
                });
            }
        }
    }

    // No path found
    Vec::new()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_grid_path_is_manhattan_optimal() {
        let grid = Grid::new(10, 10, 32.0);

        let start = IVec2::new(1, 2);
        let goal = IVec2::new(7, 5);
        let path = find_path(&grid, start, goal);

        // |dx| + |dy| + 1 tiles, start first, goal last
        assert_eq!(path.len(), 6 + 3 + 1);
        assert_eq!(path.first(), Some(&start));
        assert_eq!(path.last(), Some(&goal));
    }

    #[test]
    fn test_path_routes_around_wall() {
        let mut grid = Grid::new(10, 10, 32.0);
        for y in 2..8 {
            grid.set_walkable(IVec2::new(5, y), false);
        }

        let path = find_path(&grid, IVec2::new(2, 5), IVec2::new(8, 5));

        assert!(!path.is_empty());
        assert!(path.len() > 7); // longer than the straight line
        assert!(path.iter().all(|&c| grid.is_walkable(c)));
    }

    #[test]
    fn test_consecutive_tiles_are_adjacent() {
        let mut grid = Grid::new(8, 8, 32.0);
        grid.set_walkable(IVec2::new(3, 3), false);
        grid.set_walkable(IVec2::new(3, 4), false);

        let path = find_path(&grid, IVec2::new(0, 3), IVec2::new(6, 4));
        for pair in path.windows(2) {
            let step = (pair[1] - pair[0]).abs();
            assert_eq!(step.x + step.y, 1);
        }
    }

    #[test]
    fn test_walled_off_goal_returns_empty() {
        let mut grid = Grid::new(5, 5, 32.0);
        grid.set_walkable(IVec2::new(3, 2), false);
        grid.set_walkable(IVec2::new(3, 4), false);
        grid.set_walkable(IVec2::new(2, 3), false);
        grid.set_walkable(IVec2::new(4, 3), false);

        let path = find_path(&grid, IVec2::new(0, 0), IVec2::new(3, 3));

        assert!(path.is_empty());
    }

    #[test]
    fn test_invalid_endpoints_return_empty() {
        let mut grid = Grid::new(5, 5, 32.0);
        grid.set_walkable(IVec2::new(2, 2), false);

        assert!(find_path(&grid, IVec2::new(-1, 0), IVec2::new(2, 0)).is_empty());
        assert!(find_path(&grid, IVec2::new(0, 0), IVec2::new(9, 9)).is_empty());
        assert!(find_path(&grid, IVec2::new(0, 0), IVec2::new(2, 2)).is_empty());
    }

    #[test]
    fn test_start_equals_goal() {
        let grid = Grid::new(4, 4, 32.0);
        let path = find_path(&grid, IVec2::new(1, 1), IVec2::new(1, 1));
        assert_eq!(path, vec![IVec2::new(1, 1)]);
    }

    #[test]
    fn test_tile_position_round_trip() {
        let grid = Grid::with_origin(20, 15, 32.0, Vec2::new(48.0, 32.0));

        for y in 0..15 {
            for x in 0..20 {
                let coord = IVec2::new(x, y);
                assert_eq!(grid.position_to_tile(grid.tile_to_position(coord)), coord);
            }
        }
    }

    #[test]
    fn test_out_of_range_lookups_are_false() {
        let grid = Grid::new(3, 3, 32.0);
        assert!(!grid.is_valid_coord(IVec2::new(3, 0)));
        assert!(!grid.is_valid_coord(IVec2::new(0, -1)));
        assert!(!grid.is_walkable(IVec2::new(100, 100)));
    }
}
