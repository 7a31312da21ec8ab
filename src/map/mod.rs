pub mod generator;

use bracket_geometry::prelude::Point;
use bracket_pathfinding::prelude::{Algorithm2D, BaseMap, DistanceAlg};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

pub use generator::{GeneratedLayout, MapGenerator, RoomParams};

pub const DEFAULT_MAP_WIDTH: i32 = 80;
pub const DEFAULT_MAP_HEIGHT: i32 = 43;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tile {
    pub blocked: bool,
    pub blocks_sight: bool,
    pub explored: bool,
}

impl Default for Tile {
    fn default() -> Self {
        Tile::wall()
    }
}

impl Tile {
    pub fn wall() -> Self {
        Self {
            blocked: true,
            blocks_sight: true,
            explored: false,
        }
    }

    pub fn floor() -> Self {
        Self {
            blocked: false,
            blocks_sight: false,
            explored: false,
        }
    }
}

/// The tile grid of one dungeon level. Row-major, `width * height` tiles.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Map {
    pub width: i32,
    pub height: i32,
    pub tiles: Vec<Tile>,
}

impl Map {
    /// A grid of solid rock.
    pub fn solid(width: i32, height: i32) -> Self {
        let size = (width.max(0) * height.max(0)) as usize;
        Self {
            width,
            height,
            tiles: vec![Tile::wall(); size],
        }
    }

    fn idx(&self, x: i32, y: i32) -> Option<usize> {
        if self.in_bounds(Point::new(x, y)) {
            Some((y * self.width + x) as usize)
        } else {
            None
        }
    }

    pub fn in_bounds(&self, point: Point) -> bool {
        point.x >= 0 && point.x < self.width && point.y >= 0 && point.y < self.height
    }

    pub fn tile_at(&self, point: Point) -> Option<&Tile> {
        self.idx(point.x, point.y).map(|idx| &self.tiles[idx])
    }

    pub fn tile_at_mut(&mut self, point: Point) -> Option<&mut Tile> {
        self.idx(point.x, point.y).map(|idx| &mut self.tiles[idx])
    }

    pub fn carve(&mut self, point: Point) {
        if let Some(tile) = self.tile_at_mut(point) {
            tile.blocked = false;
            tile.blocks_sight = false;
        }
    }

    pub fn reveal_point(&mut self, point: Point) {
        if let Some(tile) = self.tile_at_mut(point) {
            tile.explored = true;
        }
    }

    pub fn is_explored(&self, point: Point) -> bool {
        self.tile_at(point).is_some_and(|tile| tile.explored)
    }

    /// Out-of-bounds cells count as blocked.
    pub fn is_tile_blocked(&self, point: Point) -> bool {
        self.tile_at(point).is_none_or(|tile| tile.blocked)
    }

    pub fn blocks_sight(&self, point: Point) -> bool {
        self.tile_at(point).is_none_or(|tile| tile.blocks_sight)
    }

    pub fn walkable_points(&self) -> Vec<Point> {
        let mut points = Vec::new();
        for y in 0..self.height {
            for x in 0..self.width {
                let point = Point::new(x, y);
                if !self.is_tile_blocked(point) {
                    points.push(point);
                }
            }
        }
        points
    }
}

impl BaseMap for Map {
    fn is_opaque(&self, idx: usize) -> bool {
        self.tiles.get(idx).is_none_or(|tile| tile.blocks_sight)
    }

    fn get_available_exits(&self, idx: usize) -> SmallVec<[(usize, f32); 10]> {
        let mut exits = SmallVec::new();
        let point = self.index_to_point2d(idx);
        for dy in -1..=1 {
            for dx in -1..=1 {
                if dx == 0 && dy == 0 {
                    continue;
                }
                let dest = Point::new(point.x + dx, point.y + dy);
                if !self.is_tile_blocked(dest) {
                    let cost = if dx != 0 && dy != 0 { 1.45 } else { 1.0 };
                    exits.push((self.point2d_to_index(dest), cost));
                }
            }
        }
        exits
    }

    fn get_pathing_distance(&self, idx1: usize, idx2: usize) -> f32 {
        let p1 = self.index_to_point2d(idx1);
        let p2 = self.index_to_point2d(idx2);
        DistanceAlg::Pythagoras.distance2d(p1, p2)
    }
}

impl Algorithm2D for Map {
    fn dimensions(&self) -> Point {
        Point::new(self.width, self.height)
    }

    fn in_bounds(&self, point: Point) -> bool {
        Map::in_bounds(self, point)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn solid_map_blocks_everything() {
        let map = Map::solid(4, 3);
        assert_eq!(map.tiles.len(), 12);
        assert!(map.walkable_points().is_empty());
        assert!(map.is_tile_blocked(Point::new(-1, 0)));
        assert!(map.blocks_sight(Point::new(4, 0)));
    }

    #[test]
    fn carving_clears_both_flags() {
        let mut map = Map::solid(4, 3);
        map.carve(Point::new(2, 1));
        let idx = map.point2d_to_index(Point::new(2, 1));
        assert!(!map.is_tile_blocked(Point::new(2, 1)));
        assert!(!map.is_opaque(idx));
        assert_eq!(map.walkable_points(), vec![Point::new(2, 1)]);
    }

    #[test]
    fn exploration_sticks() {
        let mut map = Map::solid(2, 2);
        map.reveal_point(Point::new(1, 1));
        assert!(map.is_explored(Point::new(1, 1)));
        assert!(!map.is_explored(Point::new(0, 0)));
    }
}
