use bracket_geometry::prelude::{Point, Rect};
use bracket_random::prelude::RandomNumberGenerator;

use super::Map;
use crate::random::{coin_flip, uniform_int};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RoomParams {
    pub max_rooms: i32,
    pub room_min_size: i32,
    pub room_max_size: i32,
}

impl Default for RoomParams {
    fn default() -> Self {
        Self {
            max_rooms: 30,
            room_min_size: 6,
            room_max_size: 10,
        }
    }
}

#[derive(Clone, Debug)]
pub struct GeneratedLayout {
    pub rooms: Vec<Rect>,
    pub player_start: Point,
    pub stairs: Point,
}

pub struct MapGenerator {
    pub width: i32,
    pub height: i32,
    pub params: RoomParams,
}

impl MapGenerator {
    pub fn new(width: i32, height: i32, params: RoomParams) -> Self {
        Self {
            width,
            height,
            params,
        }
    }

    /// Carves rooms and tunnels into solid rock.
    ///
    /// `on_room` runs right after each accepted room is carved and connected,
    /// with the room's acceptance index. Spawning hooks in here so that the
    /// random stream interleaves exactly as room placement proceeds.
    pub fn generate<F>(&self, rng: &mut RandomNumberGenerator, mut on_room: F) -> (Map, GeneratedLayout)
    where
        F: FnMut(&Map, usize, &Rect, &mut RandomNumberGenerator),
    {
        let mut map = Map::solid(self.width, self.height);
        let mut rooms: Vec<Rect> = Vec::new();

        for _ in 0..self.params.max_rooms {
            let w = uniform_int(rng, self.params.room_min_size, self.params.room_max_size);
            let h = uniform_int(rng, self.params.room_min_size, self.params.room_max_size);
            let x = uniform_int(rng, 0, self.width - w - 1);
            let y = uniform_int(rng, 0, self.height - h - 1);
            let candidate = Rect::with_size(x, y, w, h);

            if rooms.iter().any(|room| room.intersect(&candidate)) {
                continue;
            }

            carve_room(&mut map, &candidate);
            let new_center = candidate.center();
            if let Some(prev_center) = rooms.last().map(|room| room.center()) {
                if coin_flip(rng) {
                    carve_h_tunnel(&mut map, prev_center.x, new_center.x, prev_center.y);
                    carve_v_tunnel(&mut map, prev_center.y, new_center.y, new_center.x);
                } else {
                    carve_v_tunnel(&mut map, prev_center.y, new_center.y, prev_center.x);
                    carve_h_tunnel(&mut map, prev_center.x, new_center.x, new_center.y);
                }
            }

            on_room(&map, rooms.len(), &candidate, rng);
            rooms.push(candidate);
        }

        let player_start = rooms
            .first()
            .map(|room| room.center())
            .unwrap_or(Point::new(self.width / 2, self.height / 2));
        let stairs = rooms.last().map(|room| room.center()).unwrap_or(player_start);
        log::debug!(
            "carved {} rooms in {}x{}, stairs at {},{}",
            rooms.len(),
            self.width,
            self.height,
            stairs.x,
            stairs.y
        );

        (
            map,
            GeneratedLayout {
                rooms,
                player_start,
                stairs,
            },
        )
    }
}

/// Only the interior is opened; the rectangle's edge stays wall.
fn carve_room(map: &mut Map, room: &Rect) {
    for y in (room.y1 + 1)..room.y2 {
        for x in (room.x1 + 1)..room.x2 {
            map.carve(Point::new(x, y));
        }
    }
}

fn carve_h_tunnel(map: &mut Map, x1: i32, x2: i32, y: i32) {
    for x in x1.min(x2)..=x1.max(x2) {
        map.carve(Point::new(x, y));
    }
}

fn carve_v_tunnel(map: &mut Map, y1: i32, y2: i32, x: i32) {
    for y in y1.min(y2)..=y1.max(y2) {
        map.carve(Point::new(x, y));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn generate(seed: u64) -> (Map, GeneratedLayout) {
        let mut rng = RandomNumberGenerator::seeded(seed);
        MapGenerator::new(80, 43, RoomParams::default()).generate(&mut rng, |_, _, _, _| {})
    }

    #[test]
    fn first_room_hosts_player_and_last_room_hosts_stairs() {
        let (map, layout) = generate(42);
        assert!(!layout.rooms.is_empty());
        assert_eq!(layout.player_start, layout.rooms[0].center());
        assert_eq!(layout.stairs, layout.rooms[layout.rooms.len() - 1].center());
        assert!(!map.is_tile_blocked(layout.player_start));
        assert!(!map.is_tile_blocked(layout.stairs));
    }

    #[test]
    fn room_edges_stay_solid_interiors_open() {
        let mut map = Map::solid(12, 12);
        let room = Rect::with_size(2, 2, 6, 6);
        carve_room(&mut map, &room);
        assert!(map.is_tile_blocked(Point::new(2, 2)));
        assert!(map.is_tile_blocked(Point::new(8, 5)));
        assert!(!map.is_tile_blocked(Point::new(3, 3)));
        assert!(!map.is_tile_blocked(Point::new(7, 7)));
    }

    #[test]
    fn tunnels_are_inclusive_in_either_direction() {
        let mut map = Map::solid(10, 10);
        carve_h_tunnel(&mut map, 7, 2, 4);
        carve_v_tunnel(&mut map, 1, 3, 2);
        for x in 2..=7 {
            assert!(!map.is_tile_blocked(Point::new(x, 4)));
        }
        for y in 1..=3 {
            assert!(!map.is_tile_blocked(Point::new(2, y)));
        }
        assert!(map.is_tile_blocked(Point::new(8, 4)));
    }

    #[test]
    fn callback_sees_every_accepted_room_in_order() {
        let mut rng = RandomNumberGenerator::seeded(9);
        let mut seen = Vec::new();
        let (_, layout) = MapGenerator::new(80, 43, RoomParams::default())
            .generate(&mut rng, |map, idx, room, _| {
                assert!(!map.is_tile_blocked(room.center()));
                seen.push((idx, *room));
            });
        assert_eq!(seen.len(), layout.rooms.len());
        for (expected, (idx, room)) in seen.iter().enumerate() {
            assert_eq!(*idx, expected);
            assert_eq!(*room, layout.rooms[expected]);
        }
    }
}
