//! Symmetric shadowcasting.
//!
//! Floor tiles are visible from each other both ways: if `b` is in the field
//! of view computed from `a`, then `a` is in the field computed from `b`.
//! Monster AI leans on this to decide whether it can see the player.

use bracket_geometry::prelude::Point;
use bracket_pathfinding::prelude::{Algorithm2D, BaseMap};

/// Per-cell visibility for one origin.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FovMask {
    width: i32,
    height: i32,
    cells: Vec<bool>,
}

impl FovMask {
    pub fn new(width: i32, height: i32) -> Self {
        Self {
            width,
            height,
            cells: vec![false; (width.max(0) * height.max(0)) as usize],
        }
    }

    fn idx(&self, point: Point) -> Option<usize> {
        if point.x >= 0 && point.x < self.width && point.y >= 0 && point.y < self.height {
            Some((point.y * self.width + point.x) as usize)
        } else {
            None
        }
    }

    pub fn is_visible(&self, point: Point) -> bool {
        self.idx(point).is_some_and(|idx| self.cells[idx])
    }

    fn mark(&mut self, point: Point) {
        if let Some(idx) = self.idx(point) {
            self.cells[idx] = true;
        }
    }

    pub fn visible_points(&self) -> impl Iterator<Item = Point> + '_ {
        self.cells
            .iter()
            .enumerate()
            .filter(|(_, visible)| **visible)
            .map(|(idx, _)| Point::new(idx as i32 % self.width, idx as i32 / self.width))
    }

    pub fn count(&self) -> usize {
        self.cells.iter().filter(|visible| **visible).count()
    }
}

/// Slope `num / den` with `den > 0`.
#[derive(Clone, Copy, Debug)]
struct Slope {
    num: i32,
    den: i32,
}

impl Slope {
    const fn new(num: i32, den: i32) -> Self {
        Self { num, den }
    }

    /// Slope through the left edge of `col` at `depth`.
    fn of_tile(depth: i32, col: i32) -> Self {
        Self::new(2 * col - 1, 2 * depth)
    }
}

#[derive(Clone, Copy)]
struct Row {
    depth: i32,
    start: Slope,
    end: Slope,
}

impl Row {
    fn min_col(&self) -> i32 {
        // floor(depth * start + 1/2)
        let num = 2 * self.depth * self.start.num + self.start.den;
        num.div_euclid(2 * self.start.den)
    }

    fn max_col(&self) -> i32 {
        // ceil(depth * end - 1/2)
        let num = 2 * self.depth * self.end.num - self.end.den;
        -(-num).div_euclid(2 * self.end.den)
    }

    fn is_symmetric(&self, col: i32) -> bool {
        col * self.start.den >= self.depth * self.start.num
            && col * self.end.den <= self.depth * self.end.num
    }

    fn next(&self) -> Row {
        Row {
            depth: self.depth + 1,
            ..*self
        }
    }
}

#[derive(Clone, Copy)]
enum Cardinal {
    North,
    East,
    South,
    West,
}

impl Cardinal {
    fn transform(self, origin: Point, depth: i32, col: i32) -> Point {
        match self {
            Cardinal::North => Point::new(origin.x + col, origin.y - depth),
            Cardinal::South => Point::new(origin.x + col, origin.y + depth),
            Cardinal::East => Point::new(origin.x + depth, origin.y + col),
            Cardinal::West => Point::new(origin.x - depth, origin.y + col),
        }
    }
}

struct Caster<'a, M> {
    map: &'a M,
    origin: Point,
    radius: i32,
    light_walls: bool,
    mask: FovMask,
}

impl<M: BaseMap + Algorithm2D> Caster<'_, M> {
    /// Out-of-bounds cells behave as walls.
    fn is_wall(&self, point: Point) -> bool {
        !self.map.in_bounds(point) || self.map.is_opaque(self.map.point2d_to_index(point))
    }

    fn in_radius(&self, point: Point) -> bool {
        let dx = point.x - self.origin.x;
        let dy = point.y - self.origin.y;
        dx * dx + dy * dy <= self.radius * self.radius
    }

    fn reveal(&mut self, point: Point) {
        if self.map.in_bounds(point) && self.in_radius(point) {
            self.mask.mark(point);
        }
    }

    fn scan(&mut self, quadrant: Cardinal, mut row: Row) {
        if row.depth > self.radius {
            return;
        }
        let mut prev_wall: Option<bool> = None;
        for col in row.min_col()..=row.max_col() {
            let point = quadrant.transform(self.origin, row.depth, col);
            let wall = self.is_wall(point);
            if wall {
                if self.light_walls {
                    self.reveal(point);
                }
            } else if row.is_symmetric(col) {
                self.reveal(point);
            }
            if prev_wall == Some(true) && !wall {
                row.start = Slope::of_tile(row.depth, col);
            }
            if prev_wall == Some(false) && wall {
                let mut next = row.next();
                next.end = Slope::of_tile(row.depth, col);
                self.scan(quadrant, next);
            }
            prev_wall = Some(wall);
        }
        if prev_wall == Some(false) {
            self.scan(quadrant, row.next());
        }
    }
}

/// Computes the set of cells visible from `origin` within `radius`.
///
/// With `light_walls` set, opaque cells bordering the lit area are included;
/// otherwise only transparent cells are.
pub fn compute_fov<M>(map: &M, origin: Point, radius: i32, light_walls: bool) -> FovMask
where
    M: BaseMap + Algorithm2D,
{
    let dims = map.dimensions();
    let mut caster = Caster {
        map,
        origin,
        radius,
        light_walls,
        mask: FovMask::new(dims.x, dims.y),
    };
    if !map.in_bounds(origin) {
        return caster.mask;
    }
    caster.mask.mark(origin);
    let first = Row {
        depth: 1,
        start: Slope::new(-1, 1),
        end: Slope::new(1, 1),
    };
    for quadrant in [
        Cardinal::North,
        Cardinal::East,
        Cardinal::South,
        Cardinal::West,
    ] {
        caster.scan(quadrant, first);
    }
    caster.mask
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::map::Map;

    fn open_room(width: i32, height: i32) -> Map {
        let mut map = Map::solid(width, height);
        for y in 1..height - 1 {
            for x in 1..width - 1 {
                map.carve(Point::new(x, y));
            }
        }
        map
    }

    #[test]
    fn open_room_is_fully_lit_inside_radius() {
        let map = open_room(9, 9);
        let fov = compute_fov(&map, Point::new(4, 4), 10, true);
        for y in 0..9 {
            for x in 0..9 {
                assert!(fov.is_visible(Point::new(x, y)), "{x},{y} should be visible");
            }
        }
    }

    #[test]
    fn walls_stay_dark_without_light_walls() {
        let map = open_room(9, 9);
        let fov = compute_fov(&map, Point::new(4, 4), 10, false);
        assert!(fov.is_visible(Point::new(1, 1)));
        assert!(!fov.is_visible(Point::new(0, 0)));
        assert!(!fov.is_visible(Point::new(4, 0)));
    }

    #[test]
    fn radius_limits_sight() {
        let map = open_room(21, 5);
        let fov = compute_fov(&map, Point::new(2, 2), 3, true);
        assert!(fov.is_visible(Point::new(5, 2)));
        assert!(!fov.is_visible(Point::new(6, 2)));
    }

    #[test]
    fn pillar_casts_shadow() {
        let mut map = open_room(11, 11);
        if let Some(tile) = map.tile_at_mut(Point::new(5, 3)) {
            *tile = crate::map::Tile::wall();
        }
        let fov = compute_fov(&map, Point::new(5, 5), 10, true);
        assert!(fov.is_visible(Point::new(5, 3)));
        assert!(!fov.is_visible(Point::new(5, 1)));
        assert!(fov.is_visible(Point::new(3, 1)));
    }

    #[test]
    fn wall_between_rooms_hides_the_other_side() {
        let mut map = open_room(11, 5);
        for y in 0..5 {
            if let Some(tile) = map.tile_at_mut(Point::new(5, y)) {
                *tile = crate::map::Tile::wall();
            }
        }
        let fov = compute_fov(&map, Point::new(2, 2), 10, true);
        assert!(fov.is_visible(Point::new(5, 2)));
        assert!(!fov.is_visible(Point::new(7, 2)));
    }
}
