use serde::{Deserialize, Serialize};

/// Grid coordinate as `(row, col)`.
pub type Coord = (usize, usize);

/// Tile encodings shared with the Sokoban engine:
/// 0: Wall, 1: Empty, 2: Target, 3: BoxOnTarget, 4: Box, 5: Player
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[repr(u8)]
pub enum Tile {
    Wall = 0,
    Empty = 1,
    Target = 2,
    BoxOnTarget = 3,
    Box = 4,
    Player = 5,
}

impl Tile {
    pub fn from_code(code: u8) -> Option<Tile> {
        match code {
            0 => Some(Tile::Wall),
            1 => Some(Tile::Empty),
            2 => Some(Tile::Target),
            3 => Some(Tile::BoxOnTarget),
            4 => Some(Tile::Box),
            5 => Some(Tile::Player),
            _ => None,
        }
    }
    pub fn code(self) -> u8 { self as u8 }

    /// `(fixed, state)` layer pair for a level file symbol. Unknown symbols are floor.
    pub fn layers_for_symbol(symbol: char) -> (Tile, Tile) {
        match symbol {
            '#' => (Tile::Wall, Tile::Wall),
            '@' => (Tile::Empty, Tile::Player),
            '$' => (Tile::Empty, Tile::Box),
            '.' => (Tile::Target, Tile::Target),
            _ => (Tile::Empty, Tile::Empty),
        }
    }
}

/// A room built from one level record, ready to hand to the simulation engine.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Room {
    pub width: usize,
    pub height: usize,
    /// Immovable terrain, row-major. Uses codes 0,1,2.
    pub room_fixed: Vec<u8>,
    /// Dynamic occupancy, row-major. Adds 4 (box) and 5 (player).
    pub room_state: Vec<u8>,
    pub player_position: Coord,
    /// Boxes in reading order.
    pub boxes: Vec<Coord>,
    pub targets: Vec<Coord>,
    /// Box-to-target pairs used when replaying procedurally generated rooms.
    /// Pre-generated levels never fill it.
    pub box_mapping: Vec<(Coord, Coord)>,
}

impl Room {
    #[inline]
    pub fn idx(&self, row: usize, col: usize) -> usize { row * self.width + col }

    pub fn in_bounds(&self, row: usize, col: usize) -> bool { row < self.height && col < self.width }

    pub fn fixed_at(&self, row: usize, col: usize) -> Option<Tile> {
        if !self.in_bounds(row, col) { return None; }
        Tile::from_code(self.room_fixed[self.idx(row, col)])
    }

    pub fn state_at(&self, row: usize, col: usize) -> Option<Tile> {
        if !self.in_bounds(row, col) { return None; }
        Tile::from_code(self.room_state[self.idx(row, col)])
    }

    /// Nested copy of the fixed layer for consumers that take `Vec<Vec<u8>>` grids.
    pub fn fixed_rows(&self) -> Vec<Vec<u8>> { to_rows(&self.room_fixed, self.width) }

    pub fn state_rows(&self) -> Vec<Vec<u8>> { to_rows(&self.room_state, self.width) }

    pub fn num_boxes(&self) -> usize {
        self.room_state.iter().filter(|&&c| c == Tile::Box.code() || c == Tile::BoxOnTarget.code()).count()
    }

    pub fn num_targets(&self) -> usize {
        self.room_fixed.iter().filter(|&&c| c == Tile::Target.code()).count()
    }

    /// Level-file symbols for the room, one line per row.
    pub fn room_text(&self) -> String {
        fn symbol(fixed: Option<Tile>, state: Option<Tile>) -> char {
            match (fixed, state) {
                (Some(Tile::Wall), _) => '#',
                (_, Some(Tile::Player)) => '@',
                (_, Some(Tile::Box)) | (_, Some(Tile::BoxOnTarget)) => '$',
                (Some(Tile::Target), _) => '.',
                _ => ' ',
            }
        }
        let mut out = String::with_capacity((self.width + 1) * self.height);
        for row in 0..self.height {
            for col in 0..self.width {
                out.push(symbol(self.fixed_at(row, col), self.state_at(row, col)));
            }
            if row + 1 < self.height { out.push('\n'); }
        }
        out
    }
}

fn to_rows(flat: &[u8], width: usize) -> Vec<Vec<u8>> {
    if width == 0 { return Vec::new(); }
    flat.chunks(width).map(<[u8]>::to_vec).collect()
}
