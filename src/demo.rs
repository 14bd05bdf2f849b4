//! Text rendering of a level for the debugging front end.
//!
//! `?` is a hidden tile, `*` a hidden tile the player could step onto, `@` the player, and
//! `~` a revealed tile whose hint is jammed. Revealed empty tiles show their enemy count,
//! or `.` for zero. Everything else uses the layout glyphs.

use std::fmt::Write;

use level_core::level_data::tile_type_glyph;
use level_core::prelude::*;

pub fn render_level(level: &mut Level, player: UVec2) -> String {
    let range = level.movement_range(player);
    let mut out = String::new();
    for y in 0..level.height() {
        let row: Vec<String> = (0..level.width())
            .map(|x| {
                let pt = UVec2::new(x, y);
                cell_glyph(level, pt, player, range.contains(&pt)).to_string()
            })
            .collect();
        let _ = writeln!(out, "{}", row.join(" ").trim_end());
    }
    out
}

fn cell_glyph(level: &Level, pt: UVec2, player: UVec2, in_range: bool) -> char {
    let Some(tile) = level.tile(pt) else {
        return ' ';
    };
    if pt == player {
        return '@';
    }
    if !tile.is_revealed() {
        return if in_range { '*' } else { '?' };
    }
    if tile.is_wall() || !tile.is_currently_blank() {
        return tile_type_glyph(Some(tile.tile_type()));
    }
    match level.neighbor_hint(pt) {
        None => '~',
        Some(0) => '.',
        Some(count) => char::from_digit(count, 10).unwrap_or('9'),
    }
}

pub fn render_summary(level: &Level, store: &GameStore) -> String {
    let revealed = level.tiles().filter(|tile| tile.is_revealed()).count();
    let total = level.tiles().count();
    let door_state = |door: &Door| if door.is_open() { "open" } else { "closed" };
    format!(
        "{revealed}/{total} revealed, entrance {}, exit {}, gold {} ammo {} keys {}",
        door_state(level.entrance()),
        door_state(level.exit()),
        store.gold(),
        store.ammo(),
        store.keys(),
    )
}
