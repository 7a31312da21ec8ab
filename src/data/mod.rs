pub mod items;
pub mod monsters;

/// Message and glyph colors, as `(r, g, b)` for `RGB::named`.
pub mod palette {
    pub type Color = (u8, u8, u8);

    pub const WHITE: Color = (255, 255, 255);
    pub const RED: Color = (255, 0, 0);
    pub const DARK_RED: Color = (191, 0, 0);
    pub const ORANGE: Color = (255, 127, 0);
    pub const YELLOW: Color = (255, 255, 0);
    pub const LIGHT_YELLOW: Color = (255, 255, 115);
    pub const GREEN: Color = (0, 255, 0);
    pub const LIGHT_GREEN: Color = (115, 255, 115);
    pub const DESATURATED_GREEN: Color = (63, 127, 63);
    pub const DARKER_GREEN: Color = (0, 127, 0);
    pub const LIGHT_CYAN: Color = (115, 255, 255);
    pub const LIGHT_BLUE: Color = (115, 185, 255);
    pub const SKY: Color = (0, 191, 255);
    pub const VIOLET: Color = (127, 0, 255);
    pub const LIGHT_VIOLET: Color = (185, 115, 255);
    pub const PURPLE: Color = (191, 0, 255);
    pub const DARKER_ORANGE: Color = (127, 63, 0);
    pub const LIGHT_GRAY: Color = (159, 159, 159);

    pub const DARK_WALL: Color = (0, 0, 100);
    pub const LIGHT_WALL: Color = (130, 110, 50);
    pub const DARK_GROUND: Color = (50, 50, 150);
    pub const LIGHT_GROUND: Color = (200, 180, 50);
}
