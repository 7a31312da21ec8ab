use specs::prelude::*;

use super::components::{PlayerTag, Position, Viewshed};
use crate::{fov::compute_fov, map::Map};

/// Recomputes dirty viewsheds. Whatever the player sees becomes explored.
#[derive(Default)]
pub struct FovSystem;

impl<'a> System<'a> for FovSystem {
    type SystemData = (
        WriteExpect<'a, Map>,
        WriteStorage<'a, Viewshed>,
        ReadStorage<'a, Position>,
        ReadStorage<'a, PlayerTag>,
    );

    fn run(&mut self, (mut map, mut viewsheds, positions, players): Self::SystemData) {
        for (viewshed, pos, player) in (&mut viewsheds, &positions, players.maybe()).join() {
            if !viewshed.dirty {
                continue;
            }
            viewshed.visible = compute_fov(&*map, pos.point, viewshed.radius, viewshed.light_walls);
            if player.is_some() {
                let seen: Vec<_> = viewshed.visible.visible_points().collect();
                for point in seen {
                    map.reveal_point(point);
                }
            }
            viewshed.dirty = false;
        }
    }
}
