//! Boxoban level file format.
//!
//! A file holds several maps. Lines containing `;` separate maps (the first one is
//! usually a record-count header) and only lines starting with `#` are map rows:
//!
//! ```text
//! ; 0
//! ##########
//! #@ $  .  #
//! ##########
//!
//! ; 1
//! ...
//! ```

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::board::{Coord, Room, Tile};
use crate::error::LevelError;

pub const RECORD_MARKER: char = ';';
pub const WALL_SYMBOL: char = '#';

/// One map from a level file, as stripped row strings.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelRecord {
    pub rows: Vec<String>,
}

impl LevelRecord {
    pub fn new<S: Into<String>>(rows: impl IntoIterator<Item = S>) -> Self {
        Self { rows: rows.into_iter().map(Into::into).collect() }
    }
    pub fn is_empty(&self) -> bool { self.rows.is_empty() }
    pub fn height(&self) -> usize { self.rows.len() }
}

/// Split level file text into records.
///
/// The final accumulator is always emitted, so a file that ends right after a
/// marker line yields a trailing empty record. Callers pick with
/// [`crate::select_record`], which skips empty records.
pub fn parse_records(text: &str) -> Vec<LevelRecord> {
    let mut records = Vec::new();
    let mut current: Vec<String> = Vec::new();
    for line in text.lines() {
        if line.contains(RECORD_MARKER) && !current.is_empty() {
            records.push(LevelRecord { rows: std::mem::take(&mut current) });
        }
        if line.starts_with(WALL_SYMBOL) {
            current.push(line.trim().to_string());
        }
    }
    records.push(LevelRecord { rows: current });
    records
}

/// Read and parse a whole level file.
pub fn load_records(path: &Path) -> Result<Vec<LevelRecord>, LevelError> {
    let text = fs::read_to_string(path).map_err(LevelError::fs(path))?;
    Ok(parse_records(&text))
}

/// Convert a record into fixed/state grids plus entity coordinates.
pub fn build_room(record: &LevelRecord) -> Result<Room, LevelError> {
    let height = record.height();
    let width = match record.rows.first() {
        Some(row) => row.chars().count(),
        None => return Err(LevelError::MalformedLevel("record has no rows".into())),
    };
    if width == 0 {
        return Err(LevelError::MalformedLevel("record has an empty row".into()));
    }
    let n = width * height;
    let mut room_fixed = Vec::with_capacity(n);
    let mut room_state = Vec::with_capacity(n);
    let mut player: Option<Coord> = None;
    let mut boxes = Vec::new();
    let mut targets = Vec::new();

    for (row, line) in record.rows.iter().enumerate() {
        let row_width = line.chars().count();
        if row_width != width {
            return Err(LevelError::MalformedLevel(format!(
                "row {row} has width {row_width}, expected {width}"
            )));
        }
        for (col, symbol) in line.chars().enumerate() {
            let (fixed, state) = Tile::layers_for_symbol(symbol);
            match state {
                // last one wins
                Tile::Player => player = Some((row, col)),
                Tile::Box => boxes.push((row, col)),
                Tile::Target => targets.push((row, col)),
                _ => {}
            }
            room_fixed.push(fixed.code());
            room_state.push(state.code());
        }
    }

    let player_position = player.ok_or_else(|| LevelError::MalformedLevel("record has no player".into()))?;
    Ok(Room { width, height, room_fixed, room_state, player_position, boxes, targets, box_mapping: Vec::new() })
}

#[cfg(test)]
mod tests {
    use super::*;

    const TWO_LEVELS: &str = "; 0\n\
##########\n\
#@ $  .  #\n\
##########\n\
\n\
; 1\n\
#######\n\
# .$@ #\n\
#######\n";

    #[test]
    fn two_records_parse_verbatim() {
        let text = "##########\n#@ $  .  #\n##########\n;\n#######\n# .$@ #\n#######\n";
        let records = parse_records(text);
        assert_eq!(records.len(), 2);
        assert_eq!(records[0], LevelRecord::new(["##########", "#@ $  .  #", "##########"]));
        assert_eq!(records[1], LevelRecord::new(["#######", "# .$@ #", "#######"]));
    }

    #[test]
    fn leading_header_marker_is_a_noop_boundary() {
        let records = parse_records(TWO_LEVELS);
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].height(), 3);
        assert_eq!(records[1].rows[1], "# .$@ #");
    }

    #[test]
    fn trailing_marker_yields_empty_last_record() {
        let text = format!("{TWO_LEVELS}; 2\n");
        let records = parse_records(&text);
        assert_eq!(records.len(), 3);
        assert!(records[2].is_empty());
    }

    #[test]
    fn non_row_lines_are_discarded_and_rows_stripped() {
        let text = "; header\ncomment\n  #### \n#@.#  \n####\n";
        let records = parse_records(text);
        // indented line does not start with a wall
        assert_eq!(records, vec![LevelRecord::new(["#@.#", "####"])]);
    }

    #[test]
    fn empty_text_parses_to_single_empty_record() {
        assert_eq!(parse_records(""), vec![LevelRecord::default()]);
    }

    #[test]
    fn builds_reference_room() {
        let room = build_room(&LevelRecord::new(["#####", "#@$.#", "#####"])).unwrap();
        assert_eq!((room.height, room.width), (3, 5));
        assert_eq!(room.fixed_rows(), vec![vec![0, 0, 0, 0, 0], vec![0, 1, 1, 2, 0], vec![0, 0, 0, 0, 0]]);
        assert_eq!(room.state_rows(), vec![vec![0, 0, 0, 0, 0], vec![0, 5, 4, 2, 0], vec![0, 0, 0, 0, 0]]);
        assert_eq!(room.player_position, (1, 1));
        assert_eq!(room.boxes, vec![(1, 2)]);
        assert_eq!(room.targets, vec![(1, 3)]);
        assert!(room.box_mapping.is_empty());
    }

    #[test]
    fn last_player_symbol_wins_and_boxes_keep_reading_order() {
        let room = build_room(&LevelRecord::new(["######", "#@$ @#", "#$..$#", "######"])).unwrap();
        assert_eq!(room.player_position, (1, 4));
        assert_eq!(room.boxes, vec![(1, 2), (2, 1), (2, 4)]);
        assert_eq!(room.num_boxes(), 3);
        assert_eq!(room.num_targets(), 2);
    }

    #[test]
    fn unknown_symbols_become_floor() {
        let room = build_room(&LevelRecord::new(["####", "#@x#", "####"])).unwrap();
        assert_eq!(room.fixed_at(1, 2), Some(Tile::Empty));
        assert_eq!(room.state_at(1, 2), Some(Tile::Empty));
    }

    #[test]
    fn build_is_deterministic() {
        let record = LevelRecord::new(["#######", "#@ $. #", "# $.  #", "#######"]);
        assert_eq!(build_room(&record).unwrap(), build_room(&record).unwrap());
    }

    #[test]
    fn malformed_records_are_rejected() {
        let empty = build_room(&LevelRecord::default());
        assert!(matches!(empty, Err(LevelError::MalformedLevel(_))), "{empty:?}");

        let ragged = build_room(&LevelRecord::new(["#####", "#@#", "#####"]));
        assert!(matches!(ragged, Err(LevelError::MalformedLevel(ref m)) if m.contains("row 1")), "{ragged:?}");

        let no_player = build_room(&LevelRecord::new(["####", "#$.#", "####"]));
        assert!(matches!(no_player, Err(LevelError::MalformedLevel(_))), "{no_player:?}");
    }

    mod properties {
        use proptest::prelude::*;

        use super::*;

        fn block() -> impl Strategy<Value = Vec<String>> {
            prop::collection::vec("#[#@$. ]{0,8}", 1..6)
        }

        proptest! {
            #[test]
            fn n_blocks_give_n_records(blocks in prop::collection::vec(block(), 1..8), trailing_marker in any::<bool>()) {
                let mut text = String::from("; header\n");
                for (i, rows) in blocks.iter().enumerate() {
                    if i > 0 { text.push_str(&format!("; {i}\n")); }
                    for row in rows { text.push_str(row); text.push('\n'); }
                    text.push('\n');
                }
                if trailing_marker { text.push_str("; end\n"); }

                let records = parse_records(&text);
                if trailing_marker {
                    prop_assert_eq!(records.len(), blocks.len() + 1);
                    prop_assert!(records.last().unwrap().is_empty());
                } else {
                    prop_assert_eq!(records.len(), blocks.len());
                }
                for (record, rows) in records.iter().zip(&blocks) {
                    let stripped: Vec<String> = rows.iter().map(|r| r.trim().to_string()).collect();
                    prop_assert_eq!(&record.rows, &stripped);
                }
            }

            #[test]
            fn box_and_target_counts_match_symbols(body in prop::collection::vec("[ $.]{6}", 1..6)) {
                let mut rows = vec!["########".to_string()];
                rows.push("#@     #".to_string());
                rows.extend(body.iter().map(|r| format!("#{r}#")));
                rows.push("########".to_string());
                let record = LevelRecord::new(rows.clone());
                let room = build_room(&record).unwrap();

                let count = |c: char| rows.iter().map(|r| r.matches(c).count()).sum::<usize>();
                prop_assert_eq!(room.height * room.width, room.room_fixed.len());
                prop_assert_eq!(room.room_fixed.len(), room.room_state.len());
                prop_assert_eq!(room.num_targets(), count('.'));
                prop_assert_eq!(room.targets.len(), count('.'));
                prop_assert_eq!(room.num_boxes(), count('$'));
                prop_assert_eq!(room.boxes.len(), count('$'));
            }
        }
    }
}
