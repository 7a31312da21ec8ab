use bracket_geometry::prelude::Point;
use bracket_terminal::prelude::{BLACK, BTerm, RGB, to_cp437};

use crate::{
    data::palette,
    ecs::{GameWorld, resources::LogLine},
    menu::Menu,
};

pub const SCREEN_WIDTH: i32 = 80;
pub const SCREEN_HEIGHT: i32 = 50;
pub const BAR_WIDTH: i32 = 20;
pub const PANEL_HEIGHT: i32 = 7;
pub const PANEL_Y: i32 = SCREEN_HEIGHT - PANEL_HEIGHT;
pub const MSG_X: i32 = BAR_WIDTH + 2;

const LIGHT_RED: (u8, u8, u8) = (255, 115, 115);
const DARKER_RED: (u8, u8, u8) = (127, 0, 0);

pub fn draw_map(ctx: &mut BTerm, world: &GameWorld) {
    let map = world.map();
    let fov = world.player_fov();
    for y in 0..map.height.min(PANEL_Y) {
        for x in 0..map.width.min(SCREEN_WIDTH) {
            let point = Point::new(x, y);
            let Some(tile) = map.tile_at(point) else {
                continue;
            };
            let color = match (fov.is_visible(point), tile.explored, tile.blocks_sight) {
                (true, _, true) => palette::LIGHT_WALL,
                (true, _, false) => palette::LIGHT_GROUND,
                (false, true, true) => palette::DARK_WALL,
                (false, true, false) => palette::DARK_GROUND,
                (false, false, _) => continue,
            };
            ctx.set_bg(x, y, RGB::named(color));
        }
    }
}

pub fn draw_objects(ctx: &mut BTerm, world: &GameWorld) {
    let fov = world.player_fov();
    let map = world.map();
    for object in world.visible_objects() {
        let bg = match (fov.is_visible(object.point), map.blocks_sight(object.point)) {
            (true, true) => palette::LIGHT_WALL,
            (true, false) => palette::LIGHT_GROUND,
            (false, true) => palette::DARK_WALL,
            (false, false) => palette::DARK_GROUND,
        };
        ctx.set(
            object.point.x,
            object.point.y,
            object.color,
            RGB::named(bg),
            to_cp437(object.glyph),
        );
    }
}

pub fn draw_log(ctx: &mut BTerm, log: &[LogLine]) {
    for (row, line) in log.iter().enumerate() {
        ctx.print_color(
            MSG_X,
            PANEL_Y + 1 + row as i32,
            line.color,
            RGB::named(BLACK),
            &line.text,
        );
    }
}

pub fn draw_panel(ctx: &mut BTerm, world: &GameWorld, mouse: Point) {
    for y in PANEL_Y..SCREEN_HEIGHT {
        for x in 0..SCREEN_WIDTH {
            ctx.set(x, y, RGB::named(BLACK), RGB::named(BLACK), to_cp437(' '));
        }
    }

    let player = world.player();
    let hp = world.fighter(player).map(|f| f.hp).unwrap_or(0);
    let max_hp = world.max_hp(player);
    ctx.draw_bar_horizontal(
        1,
        PANEL_Y + 1,
        BAR_WIDTH,
        hp.max(0),
        max_hp.max(1),
        RGB::named(LIGHT_RED),
        RGB::named(DARKER_RED),
    );
    let label = format!("HP: {hp}/{max_hp}");
    let label_x = 1 + (BAR_WIDTH - label.len() as i32).max(0) / 2;
    ctx.print_color(
        label_x,
        PANEL_Y + 1,
        RGB::named(palette::WHITE),
        RGB::named(DARKER_RED),
        &label,
    );
    ctx.print_color(
        1,
        PANEL_Y + 3,
        RGB::named(palette::WHITE),
        RGB::named(BLACK),
        format!("Dungeon level: {}", world.depth()),
    );
    ctx.print_color(
        1,
        PANEL_Y,
        RGB::named(palette::LIGHT_GRAY),
        RGB::named(BLACK),
        world.names_at(mouse),
    );

    draw_log(ctx, &world.messages());
}

pub fn draw_menu(ctx: &mut BTerm, menu: &Menu) {
    let width = menu.width as i32;
    let height = menu.height() as i32;
    let x = SCREEN_WIDTH / 2 - width / 2;
    let y = SCREEN_HEIGHT / 2 - height / 2;
    ctx.draw_box(
        x - 1,
        y - 1,
        width + 1,
        height + 1,
        RGB::named(palette::LIGHT_GRAY),
        RGB::named(BLACK),
    );
    let mut row = y;
    for line in &menu.header {
        ctx.print_color(x, row, RGB::named(palette::WHITE), RGB::named(BLACK), line);
        row += 1;
    }
    for line in menu.labelled_options() {
        ctx.print_color(x, row, RGB::named(palette::WHITE), RGB::named(BLACK), &line);
        row += 1;
    }
}

pub fn draw_main_menu(ctx: &mut BTerm, menu: &Menu) {
    ctx.print_color_centered(
        SCREEN_HEIGHT / 2 - 8,
        RGB::named(palette::LIGHT_YELLOW),
        RGB::named(BLACK),
        "HIDEOUS TRUTHS",
    );
    ctx.print_color_centered(
        SCREEN_HEIGHT - 2,
        RGB::named(palette::LIGHT_YELLOW),
        RGB::named(BLACK),
        "A descent into the dark",
    );
    draw_menu(ctx, menu);
}

pub fn draw_cursor(ctx: &mut BTerm, cursor: Point, accepted: bool) {
    let color = if accepted {
        palette::LIGHT_GREEN
    } else {
        palette::RED
    };
    ctx.set_bg(cursor.x, cursor.y, RGB::named(color));
}
